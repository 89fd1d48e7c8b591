mod quote_api;

use crate::{
    api::API,
    error::{config_error, Error},
    pricing::{PricingOverrides, PricingParameters},
};

#[derive(Debug)]
pub struct Engine {
    defaults: PricingParameters,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new")]
    pub fn new(defaults: PricingParameters) -> Result<Self, Error> {
        defaults
            .validate()
            .map_err(|_| config_error("invalid default pricing parameters"))?;

        Ok(Self { defaults })
    }

    /// Defaults with the per-call overrides applied. Overrides that break a
    /// parameter constraint are rejected as invalid input.
    pub fn parameters(
        &self,
        overrides: Option<&PricingOverrides>,
    ) -> Result<PricingParameters, Error> {
        let params = match overrides {
            Some(overrides) => self.defaults.with_overrides(overrides),
            None => self.defaults,
        };

        params.validate()?;

        Ok(params)
    }
}

impl API for Engine {}

#[test]
fn new_engine() {
    let engine = Engine::new(PricingParameters::default()).unwrap();

    assert_eq!(engine.parameters(None).unwrap(), PricingParameters::default());
}

#[test]
fn new_engine_rejects_invalid_defaults() {
    let defaults = PricingParameters {
        surge_floor: 2.0,
        surge_cap: 1.0,
        ..PricingParameters::default()
    };

    assert_eq!(Engine::new(defaults).unwrap_err().code, 6);
}

#[test]
fn overrides_are_validated() {
    let engine = Engine::new(PricingParameters::default()).unwrap();

    let overrides = PricingOverrides {
        min_fare: Some(-1.0),
        ..PricingOverrides::default()
    };
    assert_eq!(engine.parameters(Some(&overrides)).unwrap_err().code, 101);

    let overrides = PricingOverrides {
        min_fare: Some(8.0),
        ..PricingOverrides::default()
    };
    assert_eq!(engine.parameters(Some(&overrides)).unwrap().min_fare, 8.0);
}
