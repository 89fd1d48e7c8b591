//! Service configuration, read from `FAREBAND_*` environment variables.
//!
//! `main` loads a `.env` file first, so local overrides can live there.

use std::env;
use std::net::SocketAddr;

use crate::error::Error;
use crate::pricing::PricingParameters;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub pricing: PricingParameters,
}

impl Config {
    #[tracing::instrument(name = "Config::from_env")]
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(err) => Err(err.into()),
        })
    }

    /// Builds the config from an arbitrary variable source. Missing variables
    /// take their defaults, present ones must parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Result<Option<String>, Error>,
    {
        let bind_addr: SocketAddr = lookup("FAREBAND_BIND_ADDR")?
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.into())
            .trim()
            .parse()?;

        let defaults = PricingParameters::default();
        let number = |key: &str, default: f64| -> Result<f64, Error> {
            match lookup(key)? {
                Some(value) => Ok(value.trim().parse::<f64>()?),
                None => Ok(default),
            }
        };

        let pricing = PricingParameters {
            flagfall: number("FAREBAND_FLAGFALL", defaults.flagfall)?,
            per_km: number("FAREBAND_PER_KM", defaults.per_km)?,
            per_min: number("FAREBAND_PER_MIN", defaults.per_min)?,
            surge_cap: number("FAREBAND_SURGE_CAP", defaults.surge_cap)?,
            surge_floor: number("FAREBAND_SURGE_FLOOR", defaults.surge_floor)?,
            min_fare: number("FAREBAND_MIN_FARE", defaults.min_fare)?,
            uncertainty_fee_per_min: number(
                "FAREBAND_UNCERTAINTY_FEE_PER_MIN",
                defaults.uncertainty_fee_per_min,
            )?,
        };

        Ok(Self { bind_addr, pricing })
    }
}

#[cfg(test)]
use std::collections::HashMap;

#[cfg(test)]
fn lookup_from(
    vars: &[(&str, &str)],
) -> impl Fn(&str) -> Result<Option<String>, Error> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    move |key: &str| Ok(vars.get(key).cloned())
}

#[test]
fn empty_environment_uses_defaults() {
    let config = Config::from_lookup(lookup_from(&[])).unwrap();

    assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
    assert_eq!(config.pricing, PricingParameters::default());
}

#[test]
fn variables_override_defaults() {
    let config = Config::from_lookup(lookup_from(&[
        ("FAREBAND_BIND_ADDR", "0.0.0.0:8080"),
        ("FAREBAND_PER_KM", "1.5"),
        ("FAREBAND_MIN_FARE", " 7 "),
    ]))
    .unwrap();

    assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
    assert_eq!(config.pricing.per_km, 1.5);
    assert_eq!(config.pricing.min_fare, 7.0);
    assert_eq!(config.pricing.flagfall, 2.0);
}

#[test]
fn unparsable_number_is_a_config_error() {
    let err = Config::from_lookup(lookup_from(&[("FAREBAND_SURGE_CAP", "high")])).unwrap_err();

    assert_eq!(err.code, 6);
}

#[test]
fn unparsable_address_is_a_config_error() {
    let err =
        Config::from_lookup(lookup_from(&[("FAREBAND_BIND_ADDR", "localhost")])).unwrap_err();

    assert_eq!(err.code, 6);
}

#[test]
fn lookup_failures_propagate() {
    let err = Config::from_lookup(|_| Err(env::VarError::NotPresent.into())).unwrap_err();

    assert_eq!(err.code, 1);
}
