//! # Soil Data Crate
//!
//! Domain types and input validation for the crop advisory pipeline.
//!
//! ## Main Components
//!
//! - **types**: SoilSample, FeatureVector, CropRanking, AdvisoryReport and
//!   the static deployment values (EnvironmentalDefaults, SourceLinks)
//! - **parser**: turn a loosely typed JSON request into a SoilSample
//! - **error**: ValidationError
//!
//! ## Example Usage
//!
//! ```ignore
//! use soil_data::{parse_soil_sample, EnvironmentalDefaults, FeatureVector};
//!
//! let sample = parse_soil_sample(&serde_json::json!({ "n": 90, "ph": "6.5" }))?;
//! let features = FeatureVector::from_sample(&sample, &EnvironmentalDefaults::default());
//! assert_eq!(features.to_array()[5], 6.5);
//! ```

pub mod error;
pub mod parser;
pub mod types;

pub use error::{Result, ValidationError};
pub use parser::{parse_soil_map, parse_soil_sample};
pub use types::{
    AdvisoryReport, CropRanking, DEFAULT_LOCATION, DEFAULT_PH, EnvironmentalDefaults,
    FEATURE_COLUMNS, FEATURE_COUNT, FeatureVector, NarrativeStatus, RankedCrop, RankingSource,
    SoilSample, SourceLinks,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_column_order() {
        let sample = SoilSample::new(90.0, 40.0, 41.0, 6.5, "Nashik").unwrap();
        let environment = EnvironmentalDefaults::default();

        let features = FeatureVector::from_sample(&sample, &environment);

        assert_eq!(
            FEATURE_COLUMNS,
            ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"]
        );
        assert_eq!(
            features.to_array(),
            [90.0, 40.0, 41.0, 28.5, 75.0, 6.5, 1100.0]
        );
    }

    #[test]
    fn test_source_links_have_three_categories() {
        let links = SourceLinks::default();
        let categories: Vec<_> = links.categories().iter().map(|(c, _)| *c).collect();

        assert_eq!(categories, vec!["weather", "market", "soil"]);
        assert!(links.categories().iter().all(|(_, url)| url.starts_with("https://")));
    }

    #[test]
    fn test_source_links_serialize_as_mapping() {
        let value = serde_json::to_value(SourceLinks::default()).unwrap();
        let map = value.as_object().unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map["weather"], "https://mausam.imd.gov.in/");
        assert_eq!(map["market"], "https://agmarknet.gov.in/");
        assert_eq!(map["soil"], "https://soilhealth.dac.gov.in/");
    }

    #[test]
    fn test_ranking_labels_preserve_order() {
        let ranking = CropRanking::new(
            vec![
                RankedCrop { label: "RICE".to_string(), probability: Some(0.6) },
                RankedCrop { label: "JUTE".to_string(), probability: Some(0.3) },
            ],
            RankingSource::Classifier,
        );

        assert_eq!(ranking.labels(), vec!["RICE", "JUTE"]);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking.source(), RankingSource::Classifier);
    }
}
