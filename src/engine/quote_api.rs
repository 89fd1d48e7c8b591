use super::Engine;

use async_trait::async_trait;

use crate::{
    api::{PriceRequest, QuoteAPI, QuoteRequest},
    entities::{Quote, QuoteInput},
    error::Error,
    pricing::{compute_price, compute_quote, PricingParameters, QuoteResult},
};

#[async_trait]
impl QuoteAPI for Engine {
    fn default_parameters(&self) -> PricingParameters {
        self.defaults
    }

    #[tracing::instrument(skip(self))]
    async fn price(&self, request: PriceRequest) -> Result<QuoteResult, Error> {
        let params = self.parameters(request.params.as_ref())?;

        Ok(compute_price(
            request.distance_km,
            request.eta_minutes,
            request.demand_index,
            request.supply_index,
            request.interval_width,
            &params,
        ))
    }

    #[tracing::instrument(skip(self))]
    async fn create_quote(&self, request: QuoteRequest) -> Result<Quote, Error> {
        let params = self.parameters(request.params.as_ref())?;

        let input = QuoteInput::from_quantiles(
            request.distance_km,
            &request.eta_minutes,
            request.demand_index,
            request.supply_index,
        );

        let result = compute_quote(&input, &params);
        let quote = Quote::new(&request.eta_minutes, result, params);

        tracing::info!(
            token = %quote.token,
            price = quote.price,
            surge = quote.price_components.surge_multiplier,
            "quote created"
        );

        Ok(quote)
    }
}

#[test]
fn price_matches_pricing_rules() {
    use tokio_test::block_on;

    let engine = Engine::new(PricingParameters::default()).unwrap();

    let result = block_on(engine.price(PriceRequest {
        distance_km: 5.0,
        eta_minutes: 18.0,
        demand_index: 1.2,
        supply_index: 0.9,
        interval_width: 3.0,
        params: None,
    }))
    .unwrap();

    assert_eq!(result.price, 12.42);
}

#[test]
fn create_quote_uses_quantile_band() {
    use crate::entities::EtaQuantiles;
    use crate::pricing::PricingOverrides;
    use tokio_test::block_on;

    let engine = Engine::new(PricingParameters::default()).unwrap();

    let quote = block_on(engine.create_quote(QuoteRequest {
        distance_km: 5.0,
        eta_minutes: EtaQuantiles {
            p10: 15.0,
            p50: 18.0,
            p90: 18.0,
        },
        demand_index: 1.2,
        supply_index: 0.9,
        params: Some(PricingOverrides {
            min_fare: Some(20.0),
            ..PricingOverrides::default()
        }),
    }))
    .unwrap();

    assert_eq!(quote.eta_minutes.width, 3.0);
    assert_eq!(quote.price_components.uncertainty_fee, 0.06);
    assert_eq!(quote.price, 20.0);
    assert_eq!(quote.params.min_fare, 20.0);
}

#[test]
fn create_quote_rejects_invalid_overrides() {
    use crate::entities::EtaQuantiles;
    use crate::pricing::PricingOverrides;
    use tokio_test::block_on;

    let engine = Engine::new(PricingParameters::default()).unwrap();

    let err = block_on(engine.create_quote(QuoteRequest {
        distance_km: 5.0,
        eta_minutes: EtaQuantiles {
            p10: 15.0,
            p50: 18.0,
            p90: 21.0,
        },
        demand_index: 1.0,
        supply_index: 1.0,
        params: Some(PricingOverrides {
            surge_floor: Some(3.0),
            ..PricingOverrides::default()
        }),
    }))
    .unwrap_err();

    assert_eq!(err.code, 101);
}
