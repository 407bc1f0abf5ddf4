//! Feature construction for crop scoring.
//!
//! This module turns a raw request into the fixed-order feature vector the
//! classifier consumes.

use serde_json::Value;
use soil_data::{EnvironmentalDefaults, FeatureVector, SoilSample, ValidationError};

/// Validates soil input and merges it with the deployment's climate values.
///
/// Pure: the output depends only on the input and the injected
/// [`EnvironmentalDefaults`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureBuilder {
    environment: EnvironmentalDefaults,
}

impl FeatureBuilder {
    /// Create a new FeatureBuilder.
    pub fn new(environment: EnvironmentalDefaults) -> Self {
        Self { environment }
    }

    pub fn environment(&self) -> &EnvironmentalDefaults {
        &self.environment
    }

    /// Validate a raw request and build its feature vector.
    ///
    /// # Returns
    /// * `Ok(FeatureVector)` - columns `N, P, K, temperature, humidity, ph, rainfall`
    /// * `Err(ValidationError)` - if any present field is not a usable number
    pub fn build(&self, raw: &Value) -> Result<FeatureVector, ValidationError> {
        let sample = self.sample(raw)?;
        Ok(self.assemble(&sample))
    }

    /// Validate a raw request into a [`SoilSample`] (defaults applied).
    pub fn sample(&self, raw: &Value) -> Result<SoilSample, ValidationError> {
        soil_data::parse_soil_sample(raw)
    }

    /// Combine an already validated sample with the climate values.
    pub fn assemble(&self, sample: &SoilSample) -> FeatureVector {
        FeatureVector::from_sample(sample, &self.environment)
    }
}
