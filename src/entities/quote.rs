use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::{round_cents, PriceComponents, PricingParameters, QuoteResult};

/// Arrival-time quantiles in minutes, as predicted upstream.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EtaQuantiles {
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

impl EtaQuantiles {
    /// Width of the p10..p90 band. Crossed quantiles give 0.
    pub fn width(&self) -> f64 {
        (self.p90 - self.p10).max(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuoteInput {
    pub distance_km: f64,
    pub eta_minutes: f64,
    pub demand_index: f64,
    pub supply_index: f64,
    pub interval_width: f64,
}

impl QuoteInput {
    pub fn from_quantiles(
        distance_km: f64,
        eta: &EtaQuantiles,
        demand_index: f64,
        supply_index: f64,
    ) -> Self {
        Self {
            distance_km,
            eta_minutes: eta.p50.max(0.0),
            demand_index,
            supply_index,
            interval_width: eta.width(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EtaSummary {
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub width: f64,
}

impl From<&EtaQuantiles> for EtaSummary {
    fn from(eta: &EtaQuantiles) -> Self {
        Self {
            p10: round_cents(eta.p10),
            p50: round_cents(eta.p50),
            p90: round_cents(eta.p90),
            width: round_cents(eta.width()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quote {
    pub token: Uuid,
    pub created_at: DateTime<Utc>,
    pub eta_minutes: EtaSummary,
    pub price: f64,
    pub price_components: PriceComponents,
    pub params: PricingParameters,
}

impl Quote {
    pub fn new(eta: &EtaQuantiles, result: QuoteResult, params: PricingParameters) -> Self {
        Self {
            token: Uuid::new_v4(),
            created_at: Utc::now(),
            eta_minutes: eta.into(),
            price: result.price,
            price_components: result.components,
            params,
        }
    }
}

#[test]
fn quote_input_from_quantiles() {
    let eta = EtaQuantiles {
        p10: 14.0,
        p50: 18.0,
        p90: 23.5,
    };

    let input = QuoteInput::from_quantiles(5.0, &eta, 1.2, 0.9);

    assert_eq!(input.eta_minutes, 18.0);
    assert_eq!(input.interval_width, 9.5);
    assert_eq!(input.distance_km, 5.0);
}

#[test]
fn crossed_quantiles_have_no_width() {
    let eta = EtaQuantiles {
        p10: 20.0,
        p50: -1.0,
        p90: 12.0,
    };

    let input = QuoteInput::from_quantiles(3.0, &eta, 1.0, 1.0);

    assert_eq!(input.interval_width, 0.0);
    assert_eq!(input.eta_minutes, 0.0);
}

#[test]
fn quote_rounds_eta_for_display() {
    use crate::pricing::compute_quote;

    let eta = EtaQuantiles {
        p10: 14.123,
        p50: 18.456,
        p90: 23.789,
    };
    let params = PricingParameters::default();
    let result = compute_quote(&QuoteInput::from_quantiles(5.0, &eta, 1.0, 1.0), &params);

    let quote = Quote::new(&eta, result.clone(), params);

    assert_eq!(quote.eta_minutes.p10, 14.12);
    assert_eq!(quote.eta_minutes.p50, 18.46);
    assert_eq!(quote.eta_minutes.p90, 23.79);
    assert_eq!(quote.eta_minutes.width, 9.67);
    assert_eq!(quote.price, result.price);
    assert_eq!(quote.params, params);
}

#[test]
fn eta_summary_does_not_round_up_below_half_cent() {
    // 0.015 is stored as 0.01499...
    let eta = EtaQuantiles {
        p10: 0.015,
        p50: 1.0,
        p90: 2.0,
    };

    let summary = EtaSummary::from(&eta);

    assert_eq!(summary.p10, 0.01);
    assert_eq!(summary.p50, 1.0);
}
