use wasm_bindgen::JsValue;

/// Set panic hook for better error messages in browser console
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Write a warning to the browser console.
pub fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

macro_rules! console_warn {
    ($($t:tt)*) => (crate::utils::warn(&format_args!($($t)*).to_string()))
}

pub(crate) use console_warn;
