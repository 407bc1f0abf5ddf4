//! JSON response envelope returned to API callers.

use serde::Serialize;
use soil_data::{AdvisoryReport, NarrativeStatus, RankingSource, SourceLinks};

use crate::orchestrator::AnalysisError;

/// `{"status": "success", ...}` or `{"status": "error", "message": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalyzeResponse {
    Success {
        location: String,
        crops: Vec<String>,
        ai_advice: String,
        links: SourceLinks,
        narrative_status: NarrativeStatus,
        ranking_source: RankingSource,
    },
    Error {
        message: String,
        /// Offending input field, for validation failures
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },
}

impl AnalyzeResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalyzeResponse::Success { .. })
    }
}

impl From<AdvisoryReport> for AnalyzeResponse {
    fn from(report: AdvisoryReport) -> Self {
        AnalyzeResponse::Success {
            location: report.location,
            crops: report.crops,
            ai_advice: report.narrative,
            links: report.source_links,
            narrative_status: report.narrative_status,
            ranking_source: report.ranking_source,
        }
    }
}

impl From<&AnalysisError> for AnalyzeResponse {
    fn from(err: &AnalysisError) -> Self {
        let field = match err {
            AnalysisError::Validation(e) => e.field().map(str::to_string),
            AnalysisError::Internal(_) => None,
        };
        AnalyzeResponse::Error {
            message: err.to_string(),
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use soil_data::ValidationError;

    #[test]
    fn test_success_envelope_shape() {
        let report = AdvisoryReport {
            location: "Nashik".to_string(),
            crops: vec!["RICE".to_string(), "JUTE".to_string()],
            narrative: "advice".to_string(),
            source_links: SourceLinks::default(),
            narrative_status: NarrativeStatus::Generated,
            ranking_source: RankingSource::Classifier,
        };

        let value = serde_json::to_value(AnalyzeResponse::from(report)).unwrap();

        assert_eq!(
            value,
            json!({
                "status": "success",
                "location": "Nashik",
                "crops": ["RICE", "JUTE"],
                "ai_advice": "advice",
                "links": {
                    "weather": "https://mausam.imd.gov.in/",
                    "market": "https://agmarknet.gov.in/",
                    "soil": "https://soilhealth.dac.gov.in/"
                },
                "narrative_status": "generated",
                "ranking_source": "classifier"
            })
        );
    }

    #[test]
    fn test_validation_error_envelope() {
        let err = AnalysisError::Validation(ValidationError::NotANumber {
            field: "n",
            value: "abc".to_string(),
        });

        let response = AnalyzeResponse::from(&err);
        assert!(!response.is_success());

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["field"], "n");
        assert!(value["message"].as_str().unwrap().contains("abc"));
    }

    #[test]
    fn test_internal_error_has_no_field() {
        let err = AnalysisError::Internal("ranking task panicked".to_string());
        let value = serde_json::to_value(AnalyzeResponse::from(&err)).unwrap();

        assert_eq!(value["status"], "error");
        assert!(value.get("field").is_none());
    }
}
