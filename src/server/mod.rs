mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};

use crate::api::{DynAPI, API};
use crate::error::{server_error, Error};
use crate::server::handlers::{health, pricing, quotes};

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/health", get(health::check))
        .route("/pricing", post(pricing::create))
        .route("/pricing/defaults", get(pricing::defaults))
        .route("/quotes", post(quotes::create))
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let api = Arc::new(api) as DynAPI;
    let app = router(api);

    tracing::info!("listening on {}", addr);

    axum::Server::try_bind(&addr)
        .map_err(server_error)?
        .serve(app.into_make_service())
        .await
        .map_err(server_error)
}

#[cfg(test)]
use axum::body::Body;
#[cfg(test)]
use axum::http::{Request, StatusCode};
#[cfg(test)]
use serde_json::{json, Value};
#[cfg(test)]
use tower::ServiceExt;

#[cfg(test)]
use crate::engine::Engine;
#[cfg(test)]
use crate::pricing::PricingParameters;

#[cfg(test)]
fn app() -> Router {
    let engine = Engine::new(PricingParameters::default()).unwrap();

    router(Arc::new(engine) as DynAPI)
}

#[cfg(test)]
async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();

    (status, serde_json::from_slice(&bytes).unwrap())
}

#[cfg(test)]
fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn defaults_are_exposed() {
    let request = Request::builder()
        .uri("/pricing/defaults")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["flagfall"], json!(2.0));
    assert_eq!(body["surge_cap"], json!(1.8));
    assert_eq!(body["uncertainty_fee_per_min"], json!(0.02));
}

#[tokio::test]
async fn pricing_returns_breakdown() {
    let request = post_json(
        "/pricing",
        json!({
            "distance_km": 5.0,
            "eta_minutes": 18.0,
            "demand_index": 1.2,
            "supply_index": 0.9,
            "interval_width": 3.0
        }),
    );

    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "components": {
                "flagfall": 2.0,
                "per_km": 6.0,
                "per_min": 2.7,
                "surge_multiplier": 1.15,
                "uncertainty_fee": 0.06
            },
            "price": 12.42
        })
    );
}

#[tokio::test]
async fn pricing_applies_overrides() {
    let request = post_json(
        "/pricing",
        json!({
            "distance_km": 10.0,
            "eta_minutes": 20.0,
            "demand_index": 10.0,
            "supply_index": 0.5,
            "interval_width": 0.0,
            "params": { "surge_cap": 1.0 }
        }),
    );

    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["components"]["surge_multiplier"], json!(1.0));
    assert_eq!(body["price"], json!(17.0));
}

#[tokio::test]
async fn pricing_rejects_invalid_overrides() {
    let request = post_json(
        "/pricing",
        json!({
            "distance_km": 5.0,
            "eta_minutes": 18.0,
            "demand_index": 1.0,
            "supply_index": 1.0,
            "interval_width": 0.0,
            "params": { "surge_floor": 2.5 }
        }),
    );

    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "code": 101, "error": "invalid input" }));
}

#[tokio::test]
async fn quote_reports_eta_band_and_price() {
    let request = post_json(
        "/quotes",
        json!({
            "distance_km": 0.0,
            "eta_minutes": { "p10": 9.0, "p50": 4.0, "p90": 7.0 },
            "demand_index": 0.01,
            "supply_index": 100.0
        }),
    );

    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["eta_minutes"],
        json!({ "p10": 9.0, "p50": 4.0, "p90": 7.0, "width": 0.0 })
    );
    assert_eq!(body["price"], json!(5.0));
    assert_eq!(body["price_components"]["surge_multiplier"], json!(0.8));
    assert_eq!(body["params"]["min_fare"], json!(5.0));
    assert!(body["token"].is_string());
    assert!(body["created_at"].is_string());
}
