//! Fare rules: turns an ETA estimate, its uncertainty band and the market
//! demand/supply signal into a priced breakdown.
//!
//! Everything here is a pure function of its arguments. Inputs are clamped
//! rather than rejected, so none of these functions can fail.

use serde::{Deserialize, Serialize};

use crate::entities::QuoteInput;
use crate::error::{invalid_input_error, Error};

/// Smallest value a market index may take before it is used as a divisor.
const MIN_MARKET_INDEX: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingParameters {
    pub flagfall: f64,
    pub per_km: f64,
    pub per_min: f64,
    pub surge_cap: f64,
    pub surge_floor: f64,
    pub min_fare: f64,
    pub uncertainty_fee_per_min: f64,
}

impl Default for PricingParameters {
    fn default() -> Self {
        Self {
            flagfall: 2.0,
            per_km: 1.2,
            per_min: 0.15,
            surge_cap: 1.8,
            surge_floor: 0.8,
            min_fare: 5.0,
            uncertainty_fee_per_min: 0.02,
        }
    }
}

impl PricingParameters {
    /// Checks the field constraints: every field finite and non-negative,
    /// and `surge_cap >= surge_floor`.
    pub fn validate(&self) -> Result<(), Error> {
        let fields = [
            self.flagfall,
            self.per_km,
            self.per_min,
            self.surge_cap,
            self.surge_floor,
            self.min_fare,
            self.uncertainty_fee_per_min,
        ];

        if fields.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(invalid_input_error());
        }

        if self.surge_cap < self.surge_floor {
            return Err(invalid_input_error());
        }

        Ok(())
    }

    pub fn with_overrides(&self, overrides: &PricingOverrides) -> Self {
        Self {
            flagfall: overrides.flagfall.unwrap_or(self.flagfall),
            per_km: overrides.per_km.unwrap_or(self.per_km),
            per_min: overrides.per_min.unwrap_or(self.per_min),
            surge_cap: overrides.surge_cap.unwrap_or(self.surge_cap),
            surge_floor: overrides.surge_floor.unwrap_or(self.surge_floor),
            min_fare: overrides.min_fare.unwrap_or(self.min_fare),
            uncertainty_fee_per_min: overrides
                .uncertainty_fee_per_min
                .unwrap_or(self.uncertainty_fee_per_min),
        }
    }
}

/// Per-call replacement values for [`PricingParameters`]. Absent fields keep
/// the base value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingOverrides {
    pub flagfall: Option<f64>,
    pub per_km: Option<f64>,
    pub per_min: Option<f64>,
    pub surge_cap: Option<f64>,
    pub surge_floor: Option<f64>,
    pub min_fare: Option<f64>,
    pub uncertainty_fee_per_min: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceComponents {
    pub flagfall: f64,
    pub per_km: f64,
    pub per_min: f64,
    pub surge_multiplier: f64,
    pub uncertainty_fee: f64,
}

/// Display-ready fare: every value is rounded to cents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub components: PriceComponents,
    pub price: f64,
}

/// Surge multiplier for the given market state, within
/// `[surge_floor, surge_cap]`. When the bounds are inverted
/// (`surge_floor > surge_cap`) the floor wins.
pub fn surge_from_market(
    demand_index: f64,
    supply_index: f64,
    params: &PricingParameters,
) -> f64 {
    // f64::max ignores NaN, so a NaN index counts as MIN_MARKET_INDEX
    let ratio = demand_index.max(MIN_MARKET_INDEX) / supply_index.max(MIN_MARKET_INDEX);
    let raw = ratio.sqrt();

    // floor wins when floor > cap (f64::clamp would panic there)
    params.surge_floor.max(params.surge_cap.min(raw))
}

pub fn compute_price(
    distance_km: f64,
    eta_minutes: f64,
    demand_index: f64,
    supply_index: f64,
    interval_width: f64,
    params: &PricingParameters,
) -> QuoteResult {
    let distance_km = distance_km.max(0.0);
    let eta_minutes = eta_minutes.max(0.0);
    let interval_width = interval_width.max(0.0);

    let distance_charge = params.per_km * distance_km;
    let time_charge = params.per_min * eta_minutes;
    let base = params.flagfall + distance_charge + time_charge;

    let surge = surge_from_market(demand_index, supply_index, params);

    // added after surge, never surged itself
    let uncertainty_fee = params.uncertainty_fee_per_min * interval_width;

    let total = (base * surge + uncertainty_fee).max(params.min_fare);

    QuoteResult {
        components: PriceComponents {
            flagfall: round_cents(params.flagfall),
            per_km: round_cents(distance_charge),
            per_min: round_cents(time_charge),
            surge_multiplier: round_cents(surge),
            uncertainty_fee: round_cents(uncertainty_fee),
        },
        price: round_cents(total),
    }
}

pub fn compute_quote(input: &QuoteInput, params: &PricingParameters) -> QuoteResult {
    compute_price(
        input.distance_km,
        input.eta_minutes,
        input.demand_index,
        input.supply_index,
        input.interval_width,
        params,
    )
}

/// Rounds to two decimals from the exact binary value, so a value just
/// below a half cent is never carried up. Overflowed values saturate to the
/// largest finite f64 and NaN becomes 0, keeping every output a JSON number.
pub(crate) fn round_cents(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }

    let value = value.clamp(f64::MIN, f64::MAX);

    format!("{:.2}", value).parse().unwrap_or(value)
}

#[cfg(test)]
use proptest::prelude::*;

#[cfg(test)]
fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn prices_a_typical_ride() {
    let params = PricingParameters::default();
    let result = compute_price(5.0, 18.0, 1.2, 0.9, 3.0, &params);

    assert_close(result.components.flagfall, 2.0);
    assert_close(result.components.per_km, 6.0);
    assert_close(result.components.per_min, 2.7);
    assert_close(result.components.surge_multiplier, 1.15);
    assert_close(result.components.uncertainty_fee, 0.06);
    // 10.7 * sqrt(4/3) + 0.06 = 12.4153...
    assert_close(result.price, 12.42);
}

#[test]
fn surge_is_capped_for_extreme_demand() {
    let params = PricingParameters::default();

    assert_close(surge_from_market(10.0, 0.5, &params), 1.8);
}

#[test]
fn surge_is_unclamped_inside_bounds() {
    let params = PricingParameters::default();
    let surge = surge_from_market(1.2, 0.9, &params);

    assert_close(surge, (1.2f64 / 0.9).sqrt());
}

#[test]
fn min_fare_applies_to_cheap_rides() {
    let params = PricingParameters::default();
    let result = compute_price(0.0, 0.0, 0.01, 100.0, 0.0, &params);

    assert_close(result.components.surge_multiplier, 0.8);
    assert_close(result.price, 5.0);
}

#[test]
fn min_fare_covers_uncertainty_fee() {
    let params = PricingParameters {
        uncertainty_fee_per_min: 1.0,
        ..PricingParameters::default()
    };

    // 2.0 * 0.8 + 2.0 = 3.6, still below the floor
    let result = compute_price(0.0, 0.0, 0.01, 100.0, 2.0, &params);
    assert_close(result.price, 5.0);

    // 2.0 * 0.8 + 4.0 = 5.6
    let result = compute_price(0.0, 0.0, 0.01, 100.0, 4.0, &params);
    assert_close(result.price, 5.6);
}

#[test]
fn uncertainty_fee_is_not_surged() {
    let params = PricingParameters {
        min_fare: 0.0,
        ..PricingParameters::default()
    };

    let narrow = compute_price(5.0, 10.0, 10.0, 0.5, 0.0, &params);
    let wide = compute_price(5.0, 10.0, 10.0, 0.5, 10.0, &params);

    assert_close(wide.price - narrow.price, 0.2);
}

#[test]
fn negative_inputs_price_like_zero() {
    let params = PricingParameters::default();

    let negative = compute_price(-5.0, -3.0, 1.0, 1.0, -2.0, &params);
    let zero = compute_price(0.0, 0.0, 1.0, 1.0, 0.0, &params);

    assert_eq!(negative, zero);
}

#[test]
fn degenerate_market_indices_are_floored() {
    let params = PricingParameters::default();

    assert_close(surge_from_market(0.0, 0.0, &params), 1.0);
    assert_close(surge_from_market(-4.0, 1.0, &params), 0.8);
    assert_close(surge_from_market(1.0, -4.0, &params), 1.8);
    assert_close(surge_from_market(f64::NAN, 1.0, &params), 0.8);
    assert_close(surge_from_market(f64::INFINITY, 1.0, &params), 1.8);
}

#[test]
fn inverted_surge_bounds_resolve_to_floor() {
    let params = PricingParameters {
        surge_cap: 1.0,
        surge_floor: 1.5,
        ..PricingParameters::default()
    };

    assert_close(surge_from_market(1.0, 1.0, &params), 1.5);
    assert_close(surge_from_market(100.0, 1.0, &params), 1.5);
}

#[test]
fn rounding_happens_once() {
    let params = PricingParameters {
        flagfall: 0.0,
        per_km: 0.004,
        per_min: 0.004,
        min_fare: 0.0,
        uncertainty_fee_per_min: 0.0,
        ..PricingParameters::default()
    };

    // each component rounds to 0.00 but the total keeps the unrounded sum
    let result = compute_price(1.0, 1.0, 1.0, 1.0, 0.0, &params);
    assert_close(result.components.per_km, 0.0);
    assert_close(result.components.per_min, 0.0);
    assert_close(result.price, 0.01);
}

#[test]
fn validate_accepts_defaults() {
    assert!(PricingParameters::default().validate().is_ok());
}

#[test]
fn validate_rejects_bad_parameters() {
    let defaults = PricingParameters::default();

    let inverted = PricingParameters {
        surge_cap: 0.5,
        ..defaults
    };
    assert_eq!(inverted.validate().unwrap_err().code, 101);

    let negative = PricingParameters {
        per_km: -1.0,
        ..defaults
    };
    assert!(negative.validate().is_err());

    let infinite = PricingParameters {
        min_fare: f64::INFINITY,
        ..defaults
    };
    assert!(infinite.validate().is_err());
}

#[test]
fn overrides_replace_only_present_fields() {
    let defaults = PricingParameters::default();
    let overrides = PricingOverrides {
        per_km: Some(2.0),
        surge_cap: Some(3.0),
        ..PricingOverrides::default()
    };

    let params = defaults.with_overrides(&overrides);

    assert_eq!(
        params,
        PricingParameters {
            per_km: 2.0,
            surge_cap: 3.0,
            ..defaults
        }
    );
}

#[test]
fn overrides_deserialize_from_partial_json() {
    let overrides: PricingOverrides =
        serde_json::from_str(r#"{"min_fare": 7.5}"#).unwrap();

    assert_eq!(overrides.min_fare, Some(7.5));
    assert_eq!(overrides.flagfall, None);
}

#[test]
fn result_serializes_as_breakdown() {
    let params = PricingParameters::default();
    let result = compute_price(5.0, 18.0, 1.2, 0.9, 3.0, &params);

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["price"], serde_json::json!(12.42));
    assert_eq!(value["components"]["surge_multiplier"], serde_json::json!(1.15));
    assert_eq!(value["components"]["per_km"], serde_json::json!(6.0));
}

#[test]
fn rounds_from_the_exact_binary_value() {
    let params = PricingParameters::default();

    // 0.15 * 0.1 is 0.01499... in binary, so it stays at one cent
    let result = compute_price(0.0, 0.1, 1.0, 1.0, 0.0, &params);
    assert_eq!(result.components.per_min, 0.01);

    // unrounded total is 42.024999...
    let result = compute_price(29.4, 30.3, 1.0, 1.0, 10.0, &params);
    assert_eq!(result.price, 42.02);
}

#[test]
fn huge_distances_price_to_a_finite_fare() {
    let params = PricingParameters::default();
    let result = compute_price(1e308, 0.0, 1.0, 1.0, 0.0, &params);

    assert!(result.price.is_finite());
    assert_eq!(result.price, f64::MAX);
    assert!(result.components.per_km.is_finite());

    let value = serde_json::to_value(&result).unwrap();
    assert!(value["price"].is_f64());
    assert!(value["components"]["per_km"].is_f64());
}

#[cfg(test)]
proptest! {
    #[test]
    fn surge_stays_within_bounds(demand in 0.0001f64..1000.0, supply in 0.0001f64..1000.0) {
        let params = PricingParameters::default();
        let surge = surge_from_market(demand, supply, &params);

        prop_assert!(surge >= params.surge_floor);
        prop_assert!(surge <= params.surge_cap);
    }

    #[test]
    fn surge_never_falls_with_demand(
        demand in 0.0001f64..1000.0,
        extra in 0.0f64..1000.0,
        supply in 0.0001f64..1000.0
    ) {
        let params = PricingParameters::default();

        prop_assert!(
            surge_from_market(demand + extra, supply, &params)
                >= surge_from_market(demand, supply, &params)
        );
    }

    #[test]
    fn surge_never_rises_with_supply(
        demand in 0.0001f64..1000.0,
        supply in 0.0001f64..1000.0,
        extra in 0.0f64..1000.0
    ) {
        let params = PricingParameters::default();

        prop_assert!(
            surge_from_market(demand, supply + extra, &params)
                <= surge_from_market(demand, supply, &params)
        );
    }

    #[test]
    fn price_never_below_min_fare(
        distance in -50.0f64..500.0,
        eta in -50.0f64..500.0,
        demand in 0.0001f64..1000.0,
        supply in 0.0001f64..1000.0,
        width in -50.0f64..500.0
    ) {
        let params = PricingParameters::default();
        let result = compute_price(distance, eta, demand, supply, width, &params);

        prop_assert!(result.price >= params.min_fare);
    }

    #[test]
    fn pricing_is_deterministic(
        distance in 0.0f64..500.0,
        eta in 0.0f64..500.0,
        demand in 0.0001f64..1000.0,
        supply in 0.0001f64..1000.0,
        width in 0.0f64..500.0
    ) {
        let params = PricingParameters::default();
        let first = compute_price(distance, eta, demand, supply, width, &params);
        let second = compute_price(distance, eta, demand, supply, width, &params);

        prop_assert_eq!(first.price.to_bits(), second.price.to_bits());
        prop_assert_eq!(first, second);
    }
}
