use chromaprompt_core::{AnalysisResult, AnalyzeError, ImageAnalyzer, PixelBuffer};
use wasm_bindgen::prelude::*;

use crate::options::config_from_js;
use crate::utils::console_warn;

/// Image analyzer exposed to JavaScript as `ImageAnalyzer`.
#[wasm_bindgen(js_name = ImageAnalyzer)]
pub struct WasmImageAnalyzer {
    inner: ImageAnalyzer,
}

#[wasm_bindgen(js_class = ImageAnalyzer)]
impl WasmImageAnalyzer {
    /// Create an analyzer. `options` is an optional object with any of
    /// `maxDimension`, `paletteSampleTarget`, `toneSampleTarget`,
    /// `paletteSize`, `applyExifOrientation`.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<WasmImageAnalyzer, JsError> {
        Ok(Self {
            inner: ImageAnalyzer::new(config_from_js(options)?),
        })
    }

    /// Analyze encoded image bytes (PNG, JPEG, WebP, ...).
    ///
    /// # Returns
    /// The analysis as a plain object:
    /// `{ colors, brightness, saturation, contrast, composition, stats, timestamp }`
    #[wasm_bindgen(js_name = analyzeImage)]
    pub fn analyze_image(&self, image_bytes: &[u8]) -> Result<JsValue, JsError> {
        let result = self.inner.analyze(image_bytes).map_err(to_js_error)?;
        to_js(&result)
    }

    /// Analyze pixels already drawn to a canvas (`ImageData.data`).
    ///
    /// `width` / `height` describe the RGBA data; `originalWidth` /
    /// `originalHeight` are the image's natural size before any scaling.
    #[wasm_bindgen(js_name = analyzeImageData)]
    pub fn analyze_image_data(
        &self,
        data: &js_sys::Uint8ClampedArray,
        width: u32,
        height: u32,
        original_width: u32,
        original_height: u32,
    ) -> Result<JsValue, JsError> {
        let pixels = PixelBuffer::new(width, height, data.to_vec()).map_err(to_js_error)?;
        let result = self
            .inner
            .analyze_pixels(&pixels, original_width, original_height)
            .map_err(to_js_error)?;
        to_js(&result)
    }

    /// Analyze with the shared default analyzer.
    #[wasm_bindgen(js_name = analyzeDefault)]
    pub fn analyze_default(image_bytes: &[u8]) -> Result<JsValue, JsError> {
        let result = chromaprompt_core::analyze(image_bytes).map_err(to_js_error)?;
        to_js(&result)
    }
}

fn to_js(result: &AnalysisResult) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(result)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

fn to_js_error(err: AnalyzeError) -> JsError {
    console_warn!("image analysis failed: {}", err);
    JsError::new(&error_message(&err))
}

/// Message prefixed with the error kind so callers can tell them apart.
fn error_message(err: &AnalyzeError) -> String {
    match err {
        AnalyzeError::Decode(_) => format!("DecodeError: {}", err),
        AnalyzeError::Render(_) => format!("RenderError: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_names_kind() {
        let msg = error_message(&AnalyzeError::Decode("bad header".into()));
        assert_eq!(msg, "DecodeError: Failed to decode image: bad header");
        let msg = error_message(&AnalyzeError::Render("0x0".into()));
        assert!(msg.starts_with("RenderError: "));
    }
}
