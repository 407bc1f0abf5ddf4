//! Crop recommendation and advisory report pipeline.
//!
//! This crate provides the three per-request stages:
//! - FeatureBuilder validates soil input and builds the classifier's feature vector
//! - CropRanker scores crops with the loaded classifier (or a fixed fallback list)
//! - ReportComposer turns the ranking into a prompt, calls the text provider
//!   and assembles the advisory report
//!
//! ## Architecture
//! Stages run in order and share nothing mutable:
//! 1. Raw JSON input → `SoilSample` → `FeatureVector`
//! 2. `FeatureVector` → top-5 `CropRanking`
//! 3. `SoilSample` + `CropRanking` → `AdvisoryReport`
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{CropRanker, FeatureBuilder, ReportComposer};
//!
//! let builder = FeatureBuilder::new(EnvironmentalDefaults::default());
//! let ranker = CropRanker::from_load(&load_classifier(path, &FEATURE_COLUMNS)?);
//! let composer = ReportComposer::new(generator, SourceLinks::default());
//!
//! let sample = builder.sample(&raw)?;
//! let ranking = ranker.rank(&builder.assemble(&sample));
//! let report = composer.compose(&sample, &ranking).await;
//! ```

pub mod features;
pub mod prompt;
pub mod ranker;
pub mod report;

// Re-export main types
pub use features::FeatureBuilder;
pub use prompt::{DEFAULT_LANGUAGE, advisory_prompt};
pub use ranker::{CropRanker, FALLBACK_CROPS, TOP_K, fallback_ranking};
pub use report::{DEGRADED_NARRATIVE, ReportComposer};
