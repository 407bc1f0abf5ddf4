//! Advisory report composition.
//!
//! The composer makes exactly one call to the generative text provider per
//! report. Any failure of that call is absorbed: the report still carries
//! the ranked crops and source links, with [`DEGRADED_NARRATIVE`] in place
//! of the generated text.

use std::sync::Arc;
use std::time::Instant;

use genai_client::TextGenerator;
use soil_data::{AdvisoryReport, CropRanking, NarrativeStatus, SoilSample, SourceLinks};
use tracing::{debug, info, warn};

use crate::prompt::{DEFAULT_LANGUAGE, advisory_prompt};

/// Narrative used when the text provider cannot produce one
pub const DEGRADED_NARRATIVE: &str = "The detailed advisory report is temporarily unavailable. \
The recommended crops listed above are still valid; please try again later for the full \
market and weather analysis.";

/// Builds the advisory prompt, calls the text provider and assembles the report.
#[derive(Clone)]
pub struct ReportComposer {
    generator: Arc<dyn TextGenerator>,
    source_links: SourceLinks,
    language: String,
}

impl ReportComposer {
    /// Create a composer writing in [`DEFAULT_LANGUAGE`].
    pub fn new(generator: Arc<dyn TextGenerator>, source_links: SourceLinks) -> Self {
        Self {
            generator,
            source_links,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Language the narrative is requested in.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn source_links(&self) -> &SourceLinks {
        &self.source_links
    }

    /// The prompt [`ReportComposer::compose`] would send for these inputs.
    pub fn prompt_for(&self, sample: &SoilSample, ranking: &CropRanking) -> String {
        advisory_prompt(
            sample,
            &ranking.labels(),
            &self.language,
            &self.source_links.weather,
        )
    }

    /// Compose the report for one sample and its ranking.
    ///
    /// Never fails: a provider error or an empty reply yields a report with
    /// [`NarrativeStatus::Degraded`].
    pub async fn compose(&self, sample: &SoilSample, ranking: &CropRanking) -> AdvisoryReport {
        let prompt = self.prompt_for(sample, ranking);
        debug!("Composed prompt of {} chars for {}", prompt.len(), sample.location());

        let start = Instant::now();
        let (narrative, narrative_status) = match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                info!(
                    "Generated narrative with {} in {:.2?}",
                    self.generator.model(),
                    start.elapsed()
                );
                (text, NarrativeStatus::Generated)
            }
            Ok(_) => {
                warn!("Text provider returned an empty narrative; using degraded message");
                (DEGRADED_NARRATIVE.to_string(), NarrativeStatus::Degraded)
            }
            Err(e) => {
                warn!(
                    "Narrative generation failed after {:.2?}: {}; using degraded message",
                    start.elapsed(),
                    e
                );
                (DEGRADED_NARRATIVE.to_string(), NarrativeStatus::Degraded)
            }
        };

        AdvisoryReport {
            location: sample.location().to_string(),
            crops: ranking.labels(),
            narrative,
            source_links: self.source_links.clone(),
            narrative_status,
            ranking_source: ranking.source(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use genai_client::GenerationError;
    use soil_data::{RankedCrop, RankingSource};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ============================================================================
    // Mock Text Generator
    // ============================================================================

    /// Replies with `reply`, or fails with HTTP 503 when it is `None`
    struct MockGenerator {
        reply: Option<String>,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    impl MockGenerator {
        fn new(reply: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for MockGenerator {
        fn model(&self) -> &str {
            "mock-model"
        }

        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(GenerationError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                }),
            }
        }
    }

    fn sample() -> SoilSample {
        SoilSample::new(90.0, 40.0, 40.0, 6.5, "Nashik").unwrap()
    }

    fn ranking() -> CropRanking {
        CropRanking::new(
            ["RICE", "JUTE", "COCONUT", "PAPAYA", "MAIZE"]
                .iter()
                .enumerate()
                .map(|(i, label)| RankedCrop {
                    label: label.to_string(),
                    probability: Some(0.5 - i as f64 * 0.1),
                })
                .collect(),
            RankingSource::Classifier,
        )
    }

    #[tokio::test]
    async fn test_compose_success_uses_text_verbatim() {
        let generator = MockGenerator::new(Some("  • तांदूळ: उत्तम पर्याय\n"));
        let composer = ReportComposer::new(generator.clone(), SourceLinks::default());

        let report = composer.compose(&sample(), &ranking()).await;

        assert_eq!(report.narrative, "  • तांदूळ: उत्तम पर्याय\n");
        assert_eq!(report.narrative_status, NarrativeStatus::Generated);
        assert_eq!(report.location, "Nashik");
        assert_eq!(report.crops, vec!["RICE", "JUTE", "COCONUT", "PAPAYA", "MAIZE"]);
        assert_eq!(report.ranking_source, RankingSource::Classifier);
        assert!(!report.is_degraded());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_compose_failure_degrades() {
        let generator = MockGenerator::new(None);
        let composer = ReportComposer::new(generator.clone(), SourceLinks::default());

        let report = composer.compose(&sample(), &ranking()).await;

        assert_eq!(report.narrative, DEGRADED_NARRATIVE);
        assert_eq!(report.narrative_status, NarrativeStatus::Degraded);
        assert_eq!(report.crops, ranking().labels());
        assert_eq!(report.source_links, SourceLinks::default());
        // No retry
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_compose_empty_reply_degrades() {
        let generator = MockGenerator::new(Some("   "));
        let composer = ReportComposer::new(generator, SourceLinks::default());

        let report = composer.compose(&sample(), &ranking()).await;

        assert_eq!(report.narrative, DEGRADED_NARRATIVE);
        assert!(report.is_degraded());
    }

    #[tokio::test]
    async fn test_source_links_always_attached() {
        let links = SourceLinks {
            weather: "https://weather.example/".to_string(),
            market: "https://market.example/".to_string(),
            soil: "https://soil.example/".to_string(),
        };

        for reply in [Some("ok"), None] {
            let composer = ReportComposer::new(MockGenerator::new(reply), links.clone());
            let report = composer.compose(&sample(), &ranking()).await;

            assert_eq!(report.source_links, links);
            assert_eq!(report.source_links.categories().len(), 3);
        }
    }

    #[tokio::test]
    async fn test_prompt_sent_to_generator() {
        let generator = MockGenerator::new(Some("ok"));
        let composer = ReportComposer::new(generator.clone(), SourceLinks::default())
            .with_language("Hindi");

        composer.compose(&sample(), &ranking()).await;

        let prompt = generator.last_prompt.lock().unwrap().clone().unwrap();
        assert_eq!(prompt, composer.prompt_for(&sample(), &ranking()));
        assert!(prompt.contains("RICE, JUTE, COCONUT, PAPAYA, MAIZE"));
        assert!(prompt.contains("report in Hindi"));
        assert!(prompt.contains("N=90, P=40, K=40, pH=6.5"));
    }
}
