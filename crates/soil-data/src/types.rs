//! Core domain types for the crop advisory pipeline.
//!
//! Everything here is plain data: a validated soil sample, the fixed-order
//! feature vector handed to the classifier, the ranked crop list, and the
//! final advisory report.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

// =============================================================================
// Constants
// =============================================================================

/// Location used when the request does not name one
pub const DEFAULT_LOCATION: &str = "Maharashtra";

/// pH assumed when the request does not carry one (neutral soil)
pub const DEFAULT_PH: f64 = 7.0;

/// Number of columns in a [`FeatureVector`]
pub const FEATURE_COUNT: usize = 7;

/// Column names of a [`FeatureVector`], in the order the classifier was
/// trained on. Changing this order requires retraining the artifact.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] =
    ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

// =============================================================================
// Soil input
// =============================================================================

/// A validated set of soil readings for one plot.
///
/// Fields are private so a sample cannot change after validation; use the
/// accessors to read them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoilSample {
    nitrogen: f64,
    phosphorus: f64,
    potassium: f64,
    ph: f64,
    location: String,
}

impl SoilSample {
    /// Build a sample, checking the range invariants.
    ///
    /// Nutrients must be finite and non-negative, pH must lie in `[0, 14]`.
    pub fn new(
        nitrogen: f64,
        phosphorus: f64,
        potassium: f64,
        ph: f64,
        location: impl Into<String>,
    ) -> Result<Self> {
        check_non_negative("n", nitrogen)?;
        check_non_negative("p", phosphorus)?;
        check_non_negative("k", potassium)?;
        check_range("ph", ph, 0.0, 14.0)?;

        Ok(Self {
            nitrogen,
            phosphorus,
            potassium,
            ph,
            location: location.into(),
        })
    }

    pub fn nitrogen(&self) -> f64 {
        self.nitrogen
    }

    pub fn phosphorus(&self) -> f64 {
        self.phosphorus
    }

    pub fn potassium(&self) -> f64 {
        self.potassium
    }

    pub fn ph(&self) -> f64 {
        self.ph
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::Negative { field, value })
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

// =============================================================================
// Environment
// =============================================================================

/// Climate values standing in for a live weather feed.
///
/// The same values are used for every request in a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentalDefaults {
    /// Mean temperature in °C
    pub temperature: f64,
    /// Relative humidity in %
    pub humidity: f64,
    /// Annual rainfall in mm
    pub rainfall: f64,
}

impl Default for EnvironmentalDefaults {
    fn default() -> Self {
        Self {
            temperature: 28.5,
            humidity: 75.0,
            rainfall: 1100.0,
        }
    }
}

// =============================================================================
// Feature vector
// =============================================================================

/// The numeric input of the crop classifier.
///
/// Use [`FeatureVector::to_array`] to get the values in [`FEATURE_COLUMNS`]
/// order; never build the array by hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl FeatureVector {
    /// Combine a soil sample with the deployment's climate values.
    pub fn from_sample(sample: &SoilSample, environment: &EnvironmentalDefaults) -> Self {
        Self {
            nitrogen: sample.nitrogen(),
            phosphorus: sample.phosphorus(),
            potassium: sample.potassium(),
            temperature: environment.temperature,
            humidity: environment.humidity,
            ph: sample.ph(),
            rainfall: environment.rainfall,
        }
    }

    /// Values ordered as `N, P, K, temperature, humidity, ph, rainfall`.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }
}

// =============================================================================
// Ranking
// =============================================================================

/// Where a ranking came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingSource {
    /// Scored by the trained classifier
    Classifier,
    /// Static default list, used when no classifier is available
    Fallback,
}

/// One entry of a [`CropRanking`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCrop {
    /// Uppercase crop label
    pub label: String,
    /// Class probability in `[0, 1]`; `None` for fallback entries
    pub probability: Option<f64>,
}

/// Crops ordered from most to least suitable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropRanking {
    entries: Vec<RankedCrop>,
    source: RankingSource,
}

impl CropRanking {
    pub fn new(entries: Vec<RankedCrop>, source: RankingSource) -> Self {
        Self { entries, source }
    }

    pub fn entries(&self) -> &[RankedCrop] {
        &self.entries
    }

    pub fn source(&self) -> RankingSource {
        self.source
    }

    /// Crop labels in rank order
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.label.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Report
// =============================================================================

/// Official reference sites returned with every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLinks {
    /// Meteorological authority
    pub weather: String,
    /// Agricultural market price authority
    pub market: String,
    /// Soil health authority
    pub soil: String,
}

impl SourceLinks {
    /// `(category, url)` pairs in a stable order
    pub fn categories(&self) -> [(&'static str, &str); 3] {
        [
            ("weather", self.weather.as_str()),
            ("market", self.market.as_str()),
            ("soil", self.soil.as_str()),
        ]
    }
}

impl Default for SourceLinks {
    fn default() -> Self {
        Self {
            weather: "https://mausam.imd.gov.in/".to_string(),
            market: "https://agmarknet.gov.in/".to_string(),
            soil: "https://soilhealth.dac.gov.in/".to_string(),
        }
    }
}

/// Whether the narrative came from the text service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeStatus {
    Generated,
    Degraded,
}

/// The final result of one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryReport {
    pub location: String,
    pub crops: Vec<String>,
    pub narrative: String,
    pub source_links: SourceLinks,
    pub narrative_status: NarrativeStatus,
    pub ranking_source: RankingSource,
}

impl AdvisoryReport {
    pub fn is_degraded(&self) -> bool {
        self.narrative_status == NarrativeStatus::Degraded
            || self.ranking_source == RankingSource::Fallback
    }
}
