//! # Advisory Orchestrator
//!
//! Runs one analysis request through the pipeline:
//! 1. Validate the raw input and build the feature vector
//! 2. Rank crops with the classifier (on the blocking pool)
//! 3. Compose the advisory report with the text provider
//!
//! Only step 1 can fail for a caller-visible reason. A missing classifier
//! and a failing text provider both still produce a report.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use crop_model::load_classifier;
use pipeline::{CropRanker, FeatureBuilder, ReportComposer};
use serde_json::Value;
use soil_data::{
    AdvisoryReport, CropRanking, FEATURE_COLUMNS, FeatureVector, SoilSample, ValidationError,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AdvisorConfig;
use crate::response::AnalyzeResponse;

/// Why an analysis request produced no report
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid soil input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Analysis failed: {0}")]
    Internal(String),
}

/// Coordinates the three pipeline stages for each request.
///
/// Cheap to clone; all components are shared and read-only.
#[derive(Clone)]
pub struct AdvisoryOrchestrator {
    feature_builder: FeatureBuilder,
    ranker: Arc<CropRanker>,
    composer: Arc<ReportComposer>,
}

impl AdvisoryOrchestrator {
    pub fn new(feature_builder: FeatureBuilder, ranker: CropRanker, composer: ReportComposer) -> Self {
        Self {
            feature_builder,
            ranker: Arc::new(ranker),
            composer: Arc::new(composer),
        }
    }

    /// Build every component from configuration.
    ///
    /// A missing classifier artifact starts the service in fallback mode;
    /// a malformed one is an error.
    pub fn from_config(config: &AdvisorConfig) -> anyhow::Result<Self> {
        let load = load_classifier(&config.model_path, &FEATURE_COLUMNS).with_context(|| {
            format!(
                "Failed to load classifier from {}",
                config.model_path.display()
            )
        })?;
        let ranker = CropRanker::from_load(&load);
        if !ranker.has_classifier() {
            warn!("Crop ranking will use the fallback list: {:?}", load);
        }

        let generator = config.generative.build_generator()?;
        info!("Using text model {}", generator.model());

        let composer = ReportComposer::new(generator, config.sources.clone())
            .with_language(config.report_language.clone());

        Ok(Self::new(
            FeatureBuilder::new(config.environment),
            ranker,
            composer,
        ))
    }

    pub fn ranker(&self) -> &CropRanker {
        &self.ranker
    }

    /// Main entry point: analyze one raw request body.
    pub async fn analyze(&self, raw: &Value) -> Result<AdvisoryReport, AnalysisError> {
        let start_time = Instant::now();

        let (sample, ranking) = self.rank(raw).await?;

        let report = self.composer.compose(&sample, &ranking).await;
        if report.is_degraded() {
            warn!("Serving degraded advisory for {}", report.location);
        }

        info!(
            "Total time to analyze soil for {}: {:.2?}",
            report.location,
            start_time.elapsed()
        );
        Ok(report)
    }

    /// [`AdvisoryOrchestrator::analyze`] wrapped in the JSON response envelope.
    pub async fn analyze_response(&self, raw: &Value) -> AnalyzeResponse {
        match self.analyze(raw).await {
            Ok(report) => AnalyzeResponse::from(report),
            Err(e) => {
                warn!("Analysis request rejected: {}", e);
                AnalyzeResponse::from(&e)
            }
        }
    }

    /// The prompt the text provider would receive, without calling it.
    pub async fn preview_prompt(&self, raw: &Value) -> Result<String, AnalysisError> {
        let (sample, ranking) = self.rank(raw).await?;
        Ok(self.composer.prompt_for(&sample, &ranking))
    }

    /// Validate and rank, stopping before the text provider.
    pub async fn rank(&self, raw: &Value) -> Result<(SoilSample, CropRanking), AnalysisError> {
        let sample = self.feature_builder.sample(raw)?;
        debug!(
            "Validated soil sample for {}: N={}, P={}, K={}, pH={}",
            sample.location(),
            sample.nitrogen(),
            sample.phosphorus(),
            sample.potassium(),
            sample.ph()
        );

        let features = self.feature_builder.assemble(&sample);
        let ranking = self.rank_features(features).await?;
        info!(
            "Ranked {} crops for {} ({:?})",
            ranking.len(),
            sample.location(),
            ranking.source()
        );

        Ok((sample, ranking))
    }

    /// Score on the blocking pool so classifier work never stalls the runtime
    async fn rank_features(&self, features: FeatureVector) -> Result<CropRanking, AnalysisError> {
        let start = Instant::now();
        let ranker = self.ranker.clone();

        let ranking = tokio::task::spawn_blocking(move || ranker.rank(&features))
            .await
            .map_err(|e| AnalysisError::Internal(format!("Crop ranking task failed: {}", e)))?;

        debug!("Crop ranking took {:.2?}", start.elapsed());
        Ok(ranking)
    }
}
