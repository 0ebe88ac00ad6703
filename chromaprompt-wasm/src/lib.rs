use wasm_bindgen::prelude::*;

mod analyzer;
mod options;
mod utils;

pub use analyzer::WasmImageAnalyzer;

/// Initialize the WASM module (sets up panic hook).
#[wasm_bindgen(start)]
pub fn init() {
    utils::set_panic_hook();
}
