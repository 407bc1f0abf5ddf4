//! Classifier artifact format and loading.
//!
//! An artifact is a JSON document exported from the training environment:
//!
//! ```json
//! {
//!   "feature_names": ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"],
//!   "classes": ["rice", "maize"],
//!   "model": { "kind": "gaussian_nb", "class_prior": [...], "theta": [[...]], "var": [[...]] }
//! }
//! ```
//!
//! Loading checks the artifact against the column order the caller builds
//! feature vectors in. A mismatch is fatal.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{ClassifierUnavailable, ModelLoadError};
use crate::models::{GaussianNb, LogisticRegression, Standardizer};
use crate::Classifier;

/// Result of a successful artifact load
#[derive(Clone)]
pub enum ClassifierLoad {
    /// A probability-capable classifier is ready for scoring
    Ready(Arc<dyn Classifier>),
    /// Run in fallback mode for the given reason
    Unavailable(ClassifierUnavailable),
}

impl ClassifierLoad {
    pub fn classifier(&self) -> Option<Arc<dyn Classifier>> {
        match self {
            ClassifierLoad::Ready(classifier) => Some(classifier.clone()),
            ClassifierLoad::Unavailable(_) => None,
        }
    }
}

impl fmt::Debug for ClassifierLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierLoad::Ready(classifier) => f
                .debug_struct("Ready")
                .field("kind", &classifier.kind())
                .field("classes", &classifier.classes().len())
                .finish(),
            ClassifierLoad::Unavailable(reason) => {
                f.debug_tuple("Unavailable").field(reason).finish()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArtifactFile {
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    classes: Vec<String>,
    model: ModelSpec,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ModelSpec {
    GaussianNb {
        class_prior: Vec<f64>,
        theta: Vec<Vec<f64>>,
        var: Vec<Vec<f64>>,
    },
    LogisticRegression {
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
        #[serde(default)]
        scaler: Option<ScalerSpec>,
    },
    /// Label-only model; kept loadable so it can be reported as unavailable
    NearestCentroid {
        #[allow(dead_code)]
        centroids: Vec<Vec<f64>>,
    },
}

#[derive(Debug, Deserialize)]
struct ScalerSpec {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Load a classifier artifact from disk.
///
/// A missing file yields [`ClassifierLoad::Unavailable`]; every other I/O or
/// format problem is a [`ModelLoadError`].
pub fn load_classifier(
    path: &Path,
    expected_columns: &[&str],
) -> Result<ClassifierLoad, ModelLoadError> {
    info!("Loading classifier artifact from {}", path.display());

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let reason = ClassifierUnavailable::Missing {
                path: path.display().to_string(),
            };
            warn!("{}; using fallback crop list", reason);
            return Ok(ClassifierLoad::Unavailable(reason));
        }
        Err(source) => {
            return Err(ModelLoadError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };

    parse_classifier(&contents, expected_columns)
}

/// Parse and validate an artifact already read into memory.
pub fn parse_classifier(
    json: &str,
    expected_columns: &[&str],
) -> Result<ClassifierLoad, ModelLoadError> {
    let artifact: ArtifactFile = serde_json::from_str(json)?;

    check_feature_names(artifact.feature_names.as_deref(), expected_columns)?;
    check_classes(&artifact.classes)?;

    let n_classes = artifact.classes.len();
    let n_features = expected_columns.len();

    let classifier: Arc<dyn Classifier> = match artifact.model {
        ModelSpec::GaussianNb {
            class_prior,
            theta,
            var,
        } => {
            check_len("class_prior", class_prior.len(), n_classes)?;
            check_matrix("theta", &theta, n_classes, n_features)?;
            check_matrix("var", &var, n_classes, n_features)?;
            check_positive("class_prior", class_prior.iter())?;
            check_positive("var", var.iter().flatten())?;

            Arc::new(GaussianNb {
                classes: artifact.classes,
                class_prior,
                theta,
                var,
            })
        }
        ModelSpec::LogisticRegression {
            coef,
            intercept,
            scaler,
        } => {
            check_matrix("coef", &coef, n_classes, n_features)?;
            check_len("intercept", intercept.len(), n_classes)?;
            check_finite("intercept", intercept.iter())?;

            let scaler = match scaler {
                Some(spec) => {
                    check_len("scaler.mean", spec.mean.len(), n_features)?;
                    check_len("scaler.scale", spec.scale.len(), n_features)?;
                    check_finite("scaler.mean", spec.mean.iter())?;
                    check_positive("scaler.scale", spec.scale.iter())?;
                    Some(Standardizer {
                        mean: spec.mean,
                        scale: spec.scale,
                    })
                }
                None => None,
            };

            Arc::new(LogisticRegression {
                classes: artifact.classes,
                coef,
                intercept,
                scaler,
            })
        }
        ModelSpec::NearestCentroid { .. } => {
            let reason = ClassifierUnavailable::NoProbabilityScoring {
                kind: "nearest_centroid".to_string(),
            };
            warn!("{}; using fallback crop list", reason);
            return Ok(ClassifierLoad::Unavailable(reason));
        }
    };

    info!(
        "Loaded {} classifier with {} classes",
        classifier.kind(),
        classifier.classes().len()
    );
    Ok(ClassifierLoad::Ready(classifier))
}

fn check_feature_names(
    found: Option<&[String]>,
    expected: &[&str],
) -> Result<(), ModelLoadError> {
    let Some(found) = found else {
        debug!("Artifact carries no feature names; checking arity only");
        return Ok(());
    };

    if found.len() != expected.len() || found.iter().zip(expected).any(|(f, e)| f != e) {
        return Err(ModelLoadError::FeatureSchema {
            expected: expected.iter().map(|c| c.to_string()).collect(),
            found: found.to_vec(),
        });
    }
    Ok(())
}

/// Labels must be non-empty and distinct once uppercased for display
fn check_classes(classes: &[String]) -> Result<(), ModelLoadError> {
    if classes.is_empty() {
        return Err(ModelLoadError::Invalid("artifact lists no classes".into()));
    }

    let mut seen = HashSet::new();
    for label in classes {
        let normalized = label.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(ModelLoadError::Invalid("empty class label".into()));
        }
        if !seen.insert(normalized) {
            return Err(ModelLoadError::Invalid(format!(
                "duplicate class label '{}'",
                label
            )));
        }
    }
    Ok(())
}

fn check_len(field: &str, found: usize, expected: usize) -> Result<(), ModelLoadError> {
    if found == expected {
        Ok(())
    } else {
        Err(ModelLoadError::Invalid(format!(
            "{} has {} entries, expected {}",
            field, found, expected
        )))
    }
}

fn check_matrix(
    field: &str,
    rows: &[Vec<f64>],
    n_rows: usize,
    n_cols: usize,
) -> Result<(), ModelLoadError> {
    check_len(field, rows.len(), n_rows)?;
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_cols {
            // Wrong arity means the model was trained on another feature layout
            return Err(ModelLoadError::Invalid(format!(
                "{}[{}] has {} columns, feature vector has {}",
                field,
                i,
                row.len(),
                n_cols
            )));
        }
    }
    check_finite(field, rows.iter().flatten())
}

fn check_finite<'a>(
    field: &str,
    mut values: impl Iterator<Item = &'a f64>,
) -> Result<(), ModelLoadError> {
    match values.find(|v| !v.is_finite()) {
        Some(v) => Err(ModelLoadError::Invalid(format!(
            "{} contains non-finite value {}",
            field, v
        ))),
        None => Ok(()),
    }
}

fn check_positive<'a>(
    field: &str,
    mut values: impl Iterator<Item = &'a f64>,
) -> Result<(), ModelLoadError> {
    match values.find(|v| !(v.is_finite() && **v > 0.0)) {
        Some(v) => Err(ModelLoadError::Invalid(format!(
            "{} must be strictly positive, found {}",
            field, v
        ))),
        None => Ok(()),
    }
}
