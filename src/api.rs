use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::entities::{EtaQuantiles, Quote};
use crate::error::Error;
use crate::pricing::{PricingOverrides, PricingParameters, QuoteResult};

/// Inputs of a raw pricing call, ETA and interval width already derived.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriceRequest {
    pub distance_km: f64,
    pub eta_minutes: f64,
    pub demand_index: f64,
    pub supply_index: f64,
    pub interval_width: f64,
    #[serde(default)]
    pub params: Option<PricingOverrides>,
}

/// A quote for a ride whose ETA quantiles were predicted upstream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub distance_km: f64,
    pub eta_minutes: EtaQuantiles,
    pub demand_index: f64,
    pub supply_index: f64,
    #[serde(default)]
    pub params: Option<PricingOverrides>,
}

#[async_trait]
pub trait QuoteAPI {
    fn default_parameters(&self) -> PricingParameters;
    async fn price(&self, request: PriceRequest) -> Result<QuoteResult, Error>;
    async fn create_quote(&self, request: QuoteRequest) -> Result<Quote, Error>;
}

pub trait API: QuoteAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
