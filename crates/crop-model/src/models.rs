//! Probability-capable classifier implementations.
//!
//! Both models are built by the artifact loader after their dimensions have
//! been validated, so scoring never has to re-check shapes.

use std::f64::consts::PI;

use crate::Classifier;

/// Gaussian naive Bayes with per-class means and variances.
#[derive(Debug, Clone)]
pub struct GaussianNb {
    pub(crate) classes: Vec<String>,
    pub(crate) class_prior: Vec<f64>,
    pub(crate) theta: Vec<Vec<f64>>,
    pub(crate) var: Vec<Vec<f64>>,
}

impl GaussianNb {
    /// Log of the joint likelihood `P(class) * P(x | class)` for every class
    fn joint_log_likelihood(&self, features: &[f64]) -> Vec<f64> {
        self.class_prior
            .iter()
            .zip(self.theta.iter().zip(&self.var))
            .map(|(prior, (means, variances))| {
                let mut acc = prior.ln();
                for ((x, mean), var) in features.iter().zip(means).zip(variances) {
                    let diff = x - mean;
                    acc -= 0.5 * (2.0 * PI * var).ln() + diff * diff / (2.0 * var);
                }
                acc
            })
            .collect()
    }
}

impl Classifier for GaussianNb {
    fn kind(&self) -> &'static str {
        "gaussian_nb"
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        softmax(&self.joint_log_likelihood(features))
    }
}

/// Optional per-column standardisation applied before a linear model
#[derive(Debug, Clone)]
pub struct Standardizer {
    pub(crate) mean: Vec<f64>,
    pub(crate) scale: Vec<f64>,
}

impl Standardizer {
    fn transform(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect()
    }
}

/// Multinomial logistic regression: one weight row per class, softmax output.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    pub(crate) classes: Vec<String>,
    pub(crate) coef: Vec<Vec<f64>>,
    pub(crate) intercept: Vec<f64>,
    pub(crate) scaler: Option<Standardizer>,
}

impl Classifier for LogisticRegression {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let scaled;
        let x = match &self.scaler {
            Some(scaler) => {
                scaled = scaler.transform(features);
                scaled.as_slice()
            }
            None => features,
        };

        let logits: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(weights, bias)| {
                bias + weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>()
            })
            .collect();

        softmax(&logits)
    }
}

/// Numerically stable softmax (log-sum-exp shift by the maximum)
pub(crate) fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        // Every class is impossible or the input overflowed; spread evenly
        let uniform = 1.0 / logits.len() as f64;
        return vec![uniform; logits.len()];
    }

    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_class_nb() -> GaussianNb {
        GaussianNb {
            classes: vec!["rice".to_string(), "maize".to_string()],
            class_prior: vec![0.5, 0.5],
            theta: vec![vec![80.0, 6.5], vec![20.0, 6.5]],
            var: vec![vec![25.0, 0.25], vec![25.0, 0.25]],
        }
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let total: f64 = probs.iter().sum();

        assert!((total - 1.0).abs() < 1e-12);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_handles_large_logits() {
        let probs = softmax(&[1000.0, 999.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn test_softmax_all_negative_infinity_is_uniform() {
        let probs = softmax(&[f64::NEG_INFINITY, f64::NEG_INFINITY]);
        assert_eq!(probs, vec![0.5, 0.5]);
    }

    #[test]
    fn test_gaussian_nb_prefers_nearest_mean() {
        let model = two_class_nb();

        let probs = model.predict_proba(&[78.0, 6.4]);
        assert!(probs[0] > 0.99, "rice should dominate, got {:?}", probs);

        let probs = model.predict_proba(&[22.0, 6.4]);
        assert!(probs[1] > 0.99, "maize should dominate, got {:?}", probs);
    }

    #[test]
    fn test_gaussian_nb_midpoint_is_a_tie() {
        let model = two_class_nb();
        let probs = model.predict_proba(&[50.0, 6.5]);

        assert!((probs[0] - probs[1]).abs() < 1e-12);
    }

    #[test]
    fn test_logistic_regression_with_scaler() {
        let model = LogisticRegression {
            classes: vec!["a".to_string(), "b".to_string()],
            coef: vec![vec![1.0], vec![-1.0]],
            intercept: vec![0.0, 0.0],
            scaler: Some(Standardizer {
                mean: vec![10.0],
                scale: vec![2.0],
            }),
        };

        // (12 - 10) / 2 = 1 → logits [1, -1]
        let probs = model.predict_proba(&[12.0]);
        let expected = 1.0 / (1.0 + (-2.0f64).exp());
        assert!((probs[0] - expected).abs() < 1e-12);
        assert!((probs[0] + probs[1] - 1.0).abs() < 1e-12);
    }
}
