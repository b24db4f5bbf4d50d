//! Stateful merge session
//!
//! Holds the page's only `FileCollection` in Rust memory. JavaScript hands
//! over dropped or picked files and calls back with row ids; it never keeps
//! its own copy of the order.

use std::collections::HashMap;

use pdfmerge_core::{
    inspect, merge_collection, EntryId, FileCollection, LopdfExecutor, MemoryCandidate,
    MergeError, MergeExecutor, EMPTY_COLLECTION_NOTICE, MERGE_FAILED_NOTICE,
};
use wasm_bindgen::prelude::*;

/// Entry info for JS serialization
#[derive(Debug, Clone, serde::Serialize)]
struct EntryInfoJs {
    position: usize,
    id: String,
    name: String,
    size_bytes: usize,
    /// None when the file could not be parsed; the merge will report it
    page_count: Option<u32>,
}

/// Merge session driven by the page's event handlers
#[wasm_bindgen]
pub struct MergeSession {
    collection: FileCollection,
    executor: Box<dyn MergeExecutor>,
    page_counts: HashMap<EntryId, Option<u32>>,
    progress_callback: Option<js_sys::Function>,
}

impl Default for MergeSession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl MergeSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::with_executor(Box::new(LopdfExecutor::new()))
    }

    /// Set a progress callback function
    /// Callback signature: (current: number, total: number, message: string) => void
    #[wasm_bindgen(js_name = setProgressCallback)]
    pub fn set_progress_callback(&mut self, callback: js_sys::Function) {
        self.progress_callback = Some(callback);
    }

    /// Offer a picked or dropped file
    /// Returns the new row id, or undefined if the file was not a PDF
    #[wasm_bindgen(js_name = addFile)]
    pub fn add_file(&mut self, name: &str, media_type: &str, bytes: &[u8]) -> Option<String> {
        self.add_file_internal(name, media_type, bytes)
            .map(|id| id.to_string())
    }

    #[wasm_bindgen(js_name = removeAt)]
    pub fn remove_at(&mut self, index: usize) -> Result<(), JsValue> {
        self.remove_at_internal(index).map_err(to_js)
    }

    #[wasm_bindgen(js_name = moveTo)]
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<(), JsValue> {
        self.collection.move_to(from, to).map_err(to_js)
    }

    /// Remove the row with `id` (the handler attached to the row's button)
    #[wasm_bindgen(js_name = removeById)]
    pub fn remove_by_id(&mut self, id: &str) -> Result<(), JsValue> {
        let id = parse_id(id)?;
        self.remove_by_id_internal(id).map_err(to_js)
    }

    #[wasm_bindgen(js_name = moveById)]
    pub fn move_by_id(&mut self, id: &str, to: usize) -> Result<(), JsValue> {
        let id = parse_id(id)?;
        self.collection.move_entry(id, to).map_err(to_js)
    }

    /// Drop the dragged row onto the target row
    #[wasm_bindgen(js_name = dropOnto)]
    pub fn drop_onto(&mut self, dragged: &str, target: &str) -> Result<(), JsValue> {
        let dragged = parse_id(dragged)?;
        let target = parse_id(target)?;
        self.collection.drop_onto(dragged, target).map_err(to_js)
    }

    /// new_order is an array of current indices in the desired new order
    pub fn reorder(&mut self, new_order: &[usize]) -> Result<(), JsValue> {
        self.collection.reorder(new_order).map_err(to_js)
    }

    pub fn clear(&mut self) {
        self.collection.clear();
        self.page_counts.clear();
    }

    /// Rows in merge order
    #[wasm_bindgen(js_name = getEntries)]
    pub fn get_entries(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.entry_infos())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = getCount)]
    pub fn get_count(&self) -> usize {
        self.collection.len()
    }

    #[wasm_bindgen(js_name = getTotalSize)]
    pub fn get_total_size(&self) -> usize {
        self.collection.total_size()
    }

    #[wasm_bindgen(js_name = canExecute)]
    pub fn can_execute(&self) -> bool {
        !self.collection.is_empty()
    }

    /// Merge every row, in order, and return the PDF as Uint8Array
    pub fn execute(&self) -> Result<js_sys::Uint8Array, JsValue> {
        self.report_progress(0, 100, "Starting...");
        self.report_progress(
            10,
            100,
            &format!("Merging {} documents...", self.collection.len()),
        );

        let result = match self.execute_internal() {
            Ok(result) => result,
            Err(MergeError::EmptyCollection) => {
                return Err(JsValue::from_str(EMPTY_COLLECTION_NOTICE));
            }
            Err(e) => {
                web_sys::console::error_1(&JsValue::from_str(&format!(
                    "Error merging PDFs: {}",
                    e
                )));
                return Err(JsValue::from_str(MERGE_FAILED_NOTICE));
            }
        };

        self.report_progress(100, 100, "Complete");

        let array = js_sys::Uint8Array::new_with_length(result.len() as u32);
        array.copy_from(&result);
        Ok(array)
    }
}

impl MergeSession {
    /// Session with a custom executor (tests inject doubles here)
    pub fn with_executor(executor: Box<dyn MergeExecutor>) -> Self {
        Self {
            collection: FileCollection::new(),
            executor,
            page_counts: HashMap::new(),
            progress_callback: None,
        }
    }

    fn add_file_internal(&mut self, name: &str, media_type: &str, bytes: &[u8]) -> Option<EntryId> {
        let report = self
            .collection
            .add([MemoryCandidate::new(name, media_type, bytes.to_vec())]);
        let id = report.added.first().copied()?;

        let page_count = inspect(bytes).ok().map(|info| info.page_count);
        self.page_counts.insert(id, page_count);
        Some(id)
    }

    fn remove_at_internal(&mut self, index: usize) -> Result<(), MergeError> {
        let entry = self.collection.remove_at(index)?;
        self.page_counts.remove(&entry.id());
        Ok(())
    }

    fn remove_by_id_internal(&mut self, id: EntryId) -> Result<(), MergeError> {
        self.collection.remove(id)?;
        self.page_counts.remove(&id);
        Ok(())
    }

    fn entry_infos(&self) -> Vec<EntryInfoJs> {
        self.collection
            .summaries()
            .into_iter()
            .map(|s| EntryInfoJs {
                position: s.position,
                id: s.id.to_string(),
                page_count: self.page_counts.get(&s.id).copied().flatten(),
                name: s.name,
                size_bytes: s.size_bytes,
            })
            .collect()
    }

    fn execute_internal(&self) -> Result<Vec<u8>, MergeError> {
        merge_collection(&self.collection, self.executor.as_ref()).map(|m| m.into_bytes())
    }

    /// Report progress to JavaScript callback
    fn report_progress(&self, current: u32, total: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            let this = JsValue::null();
            let _ = callback.call3(
                &this,
                &JsValue::from(current),
                &JsValue::from(total),
                &JsValue::from_str(message),
            );
        }
    }
}

fn parse_id(id: &str) -> Result<EntryId, JsValue> {
    EntryId::parse(id).ok_or_else(|| JsValue::from_str(&format!("Invalid row id: {}", id)))
}

fn to_js(e: MergeError) -> JsValue {
    JsValue::from_str(&e.to_string())
}
