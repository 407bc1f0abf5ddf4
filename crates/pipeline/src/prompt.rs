//! Prompt text sent to the generative text provider.

use soil_data::SoilSample;

/// Language the advisory is written in unless configured otherwise
pub const DEFAULT_LANGUAGE: &str = "Marathi";

/// Build the advisory prompt for a sample and its ranked crops.
///
/// `weather_source` is the meteorological authority the weather commentary
/// must rely on.
pub fn advisory_prompt(
    sample: &SoilSample,
    crops: &[String],
    language: &str,
    weather_source: &str,
) -> String {
    format!(
        r#"User location: {location}.
Top {count} recommended crops: {crops}.
Soil: N={n}, P={p}, K={k}, pH={ph}.

Provide a detailed agricultural report in {language}:
1. Why each of these crops suits this soil.
2. Market price history of these crops over the last two years and the trend it shows.
3. Future weather suitability based on official India Meteorological Department trends ({weather_source}).
4. Clear reasoning for each crop's profit potential.
Format with bullet points. Keep it professional and encouraging."#,
        location = sample.location(),
        count = crops.len(),
        crops = crops.join(", "),
        n = sample.nitrogen(),
        p = sample.phosphorus(),
        k = sample.potassium(),
        ph = sample.ph(),
        language = language,
        weather_source = weather_source,
    )
}
