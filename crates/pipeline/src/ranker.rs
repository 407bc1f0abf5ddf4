//! Crop ranking on top of the loaded classifier.
//!
//! With a classifier, every class is scored and the best [`TOP_K`] are kept.
//! Without one, the fixed [`FALLBACK_CROPS`] list is returned.

use std::fmt;
use std::sync::Arc;

use crop_model::{Classifier, ClassifierLoad};
use soil_data::{CropRanking, FeatureVector, RankedCrop, RankingSource};
use tracing::{debug, error, warn};

/// Number of crops in a ranking
pub const TOP_K: usize = 5;

/// Returned, in this order, when no classifier is available
pub const FALLBACK_CROPS: [&str; TOP_K] = ["Soybean", "Cotton", "Rice", "Pigeonpeas", "Gram"];

/// Ranks crops for a feature vector.
///
/// Cheap to clone; the classifier is shared.
#[derive(Clone)]
pub struct CropRanker {
    classifier: Option<Arc<dyn Classifier>>,
    top_k: usize,
}

impl CropRanker {
    /// Ranker backed by a probability-capable classifier
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier: Some(classifier),
            top_k: TOP_K,
        }
    }

    /// Ranker that always returns [`FALLBACK_CROPS`]
    pub fn fallback() -> Self {
        Self {
            classifier: None,
            top_k: TOP_K,
        }
    }

    /// Ranker for whatever the artifact loader produced.
    pub fn from_load(load: &ClassifierLoad) -> Self {
        match load.classifier() {
            Some(classifier) => Self::new(classifier),
            None => Self::fallback(),
        }
    }

    /// Override how many crops a classifier ranking keeps (at least one).
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Rank crops for one feature vector.
    ///
    /// ## Algorithm
    /// 1. Score every class with the classifier
    /// 2. Stable sort by probability DESC (class order breaks exact ties)
    /// 3. Keep the first `top_k` and uppercase the labels
    ///
    /// Falls back to [`FALLBACK_CROPS`] when no classifier is loaded.
    pub fn rank(&self, features: &FeatureVector) -> CropRanking {
        match &self.classifier {
            Some(classifier) => self.rank_with(classifier.as_ref(), features),
            None => {
                debug!("No classifier loaded; returning fallback crops");
                fallback_ranking()
            }
        }
    }

    fn rank_with(&self, classifier: &dyn Classifier, features: &FeatureVector) -> CropRanking {
        let classes = classifier.classes();
        let probs = classifier.predict_proba(&features.to_array());

        if probs.len() != classes.len() {
            error!(
                "Classifier returned {} probabilities for {} classes",
                probs.len(),
                classes.len()
            );
        }

        let mut scored: Vec<(&String, f64)> = classes
            .iter()
            .zip(probs)
            .map(|(label, p)| (label, sanitize_probability(p)))
            .collect();

        if scored.is_empty() {
            warn!("Classifier produced no scores; returning fallback crops");
            return fallback_ranking();
        }

        // sort_by is stable, so equal scores keep the classifier's class order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.top_k);

        let entries = scored
            .into_iter()
            .map(|(label, p)| RankedCrop {
                label: label.trim().to_uppercase(),
                probability: Some(p),
            })
            .collect();

        CropRanking::new(entries, RankingSource::Classifier)
    }
}

impl fmt::Debug for CropRanker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CropRanker")
            .field("classifier", &self.classifier.as_ref().map(|c| c.kind()))
            .field("top_k", &self.top_k)
            .finish()
    }
}

/// The fixed degraded-mode ranking
pub fn fallback_ranking() -> CropRanking {
    let entries = FALLBACK_CROPS
        .iter()
        .map(|label| RankedCrop {
            label: label.to_uppercase(),
            probability: None,
        })
        .collect();
    CropRanking::new(entries, RankingSource::Fallback)
}

fn sanitize_probability(p: f64) -> f64 {
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soil_data::{EnvironmentalDefaults, SoilSample};

    /// Classifier returning fixed probabilities regardless of input
    struct FixedClassifier {
        classes: Vec<String>,
        probs: Vec<f64>,
    }

    impl FixedClassifier {
        fn new(pairs: &[(&str, f64)]) -> Arc<dyn Classifier> {
            Arc::new(Self {
                classes: pairs.iter().map(|(c, _)| c.to_string()).collect(),
                probs: pairs.iter().map(|(_, p)| *p).collect(),
            })
        }
    }

    impl Classifier for FixedClassifier {
        fn kind(&self) -> &'static str {
            "fixed"
        }

        fn classes(&self) -> &[String] {
            &self.classes
        }

        fn predict_proba(&self, _features: &[f64]) -> Vec<f64> {
            self.probs.clone()
        }
    }

    /// Classifier whose scores depend on nitrogen, to check inputs flow through
    struct NitrogenClassifier {
        classes: Vec<String>,
    }

    impl Classifier for NitrogenClassifier {
        fn kind(&self) -> &'static str {
            "nitrogen"
        }

        fn classes(&self) -> &[String] {
            &self.classes
        }

        fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
            if features[0] > 50.0 { vec![0.8, 0.2] } else { vec![0.2, 0.8] }
        }
    }

    fn features(n: f64) -> FeatureVector {
        let sample = SoilSample::new(n, 40.0, 40.0, 6.5, "Nashik").unwrap();
        FeatureVector::from_sample(&sample, &EnvironmentalDefaults::default())
    }

    fn probabilities(ranking: &CropRanking) -> Vec<f64> {
        ranking
            .entries()
            .iter()
            .map(|e| e.probability.unwrap())
            .collect()
    }

    #[test]
    fn test_rank_sorts_descending_and_truncates() {
        let ranker = CropRanker::new(FixedClassifier::new(&[
            ("apple", 0.01),
            ("rice", 0.40),
            ("maize", 0.05),
            ("jute", 0.25),
            ("cotton", 0.10),
            ("banana", 0.15),
            ("grapes", 0.04),
        ]));

        let ranking = ranker.rank(&features(90.0));

        assert_eq!(ranking.source(), RankingSource::Classifier);
        assert_eq!(ranking.labels(), vec!["RICE", "JUTE", "BANANA", "COTTON", "MAIZE"]);
        assert_eq!(probabilities(&ranking), vec![0.40, 0.25, 0.15, 0.10, 0.05]);
    }

    #[test]
    fn test_ties_keep_class_order() {
        let ranker = CropRanker::new(FixedClassifier::new(&[
            ("mungbean", 0.2),
            ("lentil", 0.2),
            ("coffee", 0.3),
            ("papaya", 0.2),
            ("orange", 0.05),
            ("mango", 0.05),
        ]));

        let ranking = ranker.rank(&features(10.0));

        assert_eq!(
            ranking.labels(),
            vec!["COFFEE", "MUNGBEAN", "LENTIL", "PAPAYA", "ORANGE"]
        );
    }

    #[test]
    fn test_fewer_classes_than_top_k() {
        let ranker = CropRanker::new(FixedClassifier::new(&[("rice", 0.3), ("jute", 0.7)]));

        let ranking = ranker.rank(&features(10.0));

        assert_eq!(ranking.labels(), vec!["JUTE", "RICE"]);
    }

    #[test]
    fn test_non_finite_scores_are_sanitized() {
        let ranker = CropRanker::new(FixedClassifier::new(&[
            ("rice", f64::NAN),
            ("jute", 0.6),
            ("maize", 1.5),
        ]));

        let ranking = ranker.rank(&features(10.0));

        assert_eq!(ranking.labels(), vec!["MAIZE", "JUTE", "RICE"]);
        assert_eq!(probabilities(&ranking), vec![1.0, 0.6, 0.0]);
    }

    #[test]
    fn test_fallback_is_constant() {
        let ranker = CropRanker::fallback();

        let low = ranker.rank(&features(0.0));
        let high = ranker.rank(&features(140.0));

        assert_eq!(low, high);
        assert_eq!(low.source(), RankingSource::Fallback);
        assert_eq!(
            low.labels(),
            vec!["SOYBEAN", "COTTON", "RICE", "PIGEONPEAS", "GRAM"]
        );
        assert!(low.entries().iter().all(|e| e.probability.is_none()));
    }

    #[test]
    fn test_empty_scores_fall_back() {
        let ranker = CropRanker::new(FixedClassifier::new(&[]));
        let ranking = ranker.rank(&features(10.0));

        assert_eq!(ranking.source(), RankingSource::Fallback);
        assert_eq!(ranking.len(), 5);
    }

    #[test]
    fn test_features_reach_the_classifier() {
        let ranker = CropRanker::new(Arc::new(NitrogenClassifier {
            classes: vec!["rice".to_string(), "chickpea".to_string()],
        }));

        assert_eq!(ranker.rank(&features(90.0)).labels()[0], "RICE");
        assert_eq!(ranker.rank(&features(10.0)).labels()[0], "CHICKPEA");
    }

    #[test]
    fn test_rank_is_deterministic() {
        let ranker = CropRanker::new(FixedClassifier::new(&[
            ("rice", 0.3),
            ("jute", 0.3),
            ("maize", 0.4),
        ]));

        let first = ranker.rank(&features(55.0));
        let second = ranker.rank(&features(55.0));

        assert_eq!(first, second);
    }

    #[test]
    fn test_with_top_k() {
        let ranker = CropRanker::new(FixedClassifier::new(&[
            ("rice", 0.5),
            ("jute", 0.3),
            ("maize", 0.2),
        ]))
        .with_top_k(0);

        // Never fewer than one crop
        assert_eq!(ranker.rank(&features(10.0)).labels(), vec!["RICE"]);
    }
}
