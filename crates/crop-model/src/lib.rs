//! Crop classifier artifact loading and scoring.
//!
//! This crate owns everything about the pre-trained crop classifier:
//! - The JSON artifact format exported from training
//! - Load-time validation, including the feature-column schema check
//! - Probability scoring through the [`Classifier`] trait
//!
//! It knows nothing about soil samples; callers pass plain feature slices in
//! the column order they declared at load time.

pub mod artifact;
pub mod error;
pub mod models;

pub use artifact::{load_classifier, parse_classifier, ClassifierLoad};
pub use error::{ClassifierUnavailable, ModelLoadError};
pub use models::{GaussianNb, LogisticRegression};

/// A multi-class model that scores a feature vector against every class.
///
/// `Send + Sync` lets one loaded model be shared across concurrent requests.
pub trait Classifier: Send + Sync {
    /// Short model family name (for logging)
    fn kind(&self) -> &'static str;

    /// Class labels, in the model's inherent order
    fn classes(&self) -> &[String];

    /// One probability per entry of [`Classifier::classes`], same order.
    ///
    /// `features` must have the length and column order the artifact was
    /// validated against.
    fn predict_proba(&self, features: &[f64]) -> Vec<f64>;
}
