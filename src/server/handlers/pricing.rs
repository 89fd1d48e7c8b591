use axum::extract::{Extension, Json};

use crate::api::{DynAPI, PriceRequest, QuoteAPI};
use crate::error::Error;
use crate::pricing::{PricingParameters, QuoteResult};

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<PriceRequest>,
) -> Result<Json<QuoteResult>, Error> {
    let result = api.price(params).await?;

    Ok(result.into())
}

pub async fn defaults(Extension(api): Extension<DynAPI>) -> Json<PricingParameters> {
    api.default_parameters().into()
}
