//! WASM bindings for the PDF merge page
//!
//! The page's event handlers drive a [`MergeSession`]; the ordered file
//! list, the merge and the download name all live in Rust.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { MergeSession, outputFilename } from './pkg/pdfmerge_wasm.js';
//!
//! await init();
//!
//! const session = new MergeSession();
//! session.setProgressCallback((current, total, msg) => updateUI(current, total, msg));
//! for (const file of input.files) {
//!     session.addFile(file.name, file.type, new Uint8Array(await file.arrayBuffer()));
//! }
//! session.dropOnto(draggedId, targetId);
//! const result = session.execute();
//! downloadBlob(result, outputFilename(nameInput.value));
//! ```

pub mod session;

use wasm_bindgen::prelude::*;

pub use session::MergeSession;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Quick validation check for a PDF file
/// Returns Ok(()) if valid, Err with message if not
#[wasm_bindgen]
pub fn quick_validate(bytes: &[u8]) -> Result<(), JsValue> {
    pdfmerge_core::inspect::quick_validate(bytes).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Get page count from PDF bytes (convenience function)
#[wasm_bindgen]
pub fn get_page_count(bytes: &[u8]) -> Result<u32, JsValue> {
    pdfmerge_core::inspect::page_count(bytes).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Download name for the merged file
/// An empty or blank name gives "merged-document.pdf"
#[wasm_bindgen(js_name = outputFilename)]
pub fn output_filename(name: Option<String>) -> String {
    pdfmerge_core::output_filename(name.as_deref())
}
