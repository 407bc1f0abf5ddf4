//! Server crate for the crop advisory service.
//!
//! This crate contains the orchestrator that runs each analysis request
//! through the pipeline, the deployment configuration, and the JSON
//! response envelope handed back to callers.

pub mod config;
pub mod orchestrator;
pub mod response;

pub use config::{AdvisorConfig, GenerativeConfig};
pub use orchestrator::{AdvisoryOrchestrator, AnalysisError};
pub use response::AnalyzeResponse;
