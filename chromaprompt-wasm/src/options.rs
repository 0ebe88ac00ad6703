use chromaprompt_core::AnalyzerConfig;
use wasm_bindgen::prelude::*;

/// Read analyzer options from a plain JS object, e.g. `{ maxDimension: 200 }`.
/// `undefined` / `null` give the defaults; missing keys keep their defaults.
pub fn config_from_js(options: JsValue) -> Result<AnalyzerConfig, JsError> {
    if options.is_undefined() || options.is_null() {
        return Ok(AnalyzerConfig::default());
    }
    let config: AnalyzerConfig = serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsError::new(&format!("Invalid analyzer options: {}", e)))?;
    Ok(normalize(config))
}

/// Apply the same lower bounds as the builder methods.
fn normalize(config: AnalyzerConfig) -> AnalyzerConfig {
    let AnalyzerConfig {
        max_dimension,
        palette_sample_target,
        tone_sample_target,
        palette_size,
        apply_exif_orientation,
    } = config;
    AnalyzerConfig::default()
        .with_max_dimension(max_dimension)
        .with_palette_sample_target(palette_sample_target)
        .with_tone_sample_target(tone_sample_target)
        .with_palette_size(palette_size)
        .with_exif_orientation(apply_exif_orientation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_clamps_zero_bounds() {
        let config = AnalyzerConfig {
            max_dimension: 0,
            tone_sample_target: 0,
            ..AnalyzerConfig::default()
        };
        let normalized = normalize(config);
        assert_eq!(normalized.max_dimension, 1);
        assert_eq!(normalized.tone_sample_target, 1);
        assert_eq!(normalized.palette_size, 5);
    }
}
