//! Merge executors
//!
//! A `MergeExecutor` turns an ordered list of PDF buffers into one PDF whose
//! pages are the concatenation, in order, of every input's pages. The
//! collection code only ever talks to the trait, so tests can substitute a
//! double and front ends can swap implementations.

use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::{MergeError, Result};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against cyclic `Parent` chains in malformed files
const MAX_TREE_DEPTH: usize = 64;

/// Combines ordered PDF buffers into a single PDF
pub trait MergeExecutor {
    fn merge(&self, documents: &[&[u8]]) -> Result<Vec<u8>>;
}

impl<F> MergeExecutor for F
where
    F: Fn(&[&[u8]]) -> Result<Vec<u8>>,
{
    fn merge(&self, documents: &[&[u8]]) -> Result<Vec<u8>> {
        self(documents)
    }
}

/// Executor backed by lopdf
#[derive(Debug, Clone)]
pub struct LopdfExecutor {
    compress: bool,
}

impl Default for LopdfExecutor {
    fn default() -> Self {
        Self { compress: true }
    }
}

impl LopdfExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether streams are compressed before the result is serialized
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

impl MergeExecutor for LopdfExecutor {
    /// Merge PDFs by importing every source object into the first document
    ///
    /// 1. Parse every input; any failure aborts naming the input's position
    /// 2. A single input is returned verbatim
    /// 3. Shift each source's object ids past the destination's `max_id`
    /// 4. Flatten all pages under the destination's root page node,
    ///    copying inherited attributes onto each page first
    /// 5. Drop unreachable objects, optionally compress, serialize
    fn merge(&self, documents: &[&[u8]]) -> Result<Vec<u8>> {
        if documents.is_empty() {
            return Err(MergeError::EmptyCollection);
        }

        let mut loaded = Vec::with_capacity(documents.len());
        for (i, bytes) in documents.iter().enumerate() {
            let doc = Document::load_mem(bytes).map_err(|e| {
                MergeError::ParseError(format!("document {}: {}", i + 1, e))
            })?;
            if doc.get_pages().is_empty() {
                return Err(MergeError::ParseError(format!(
                    "document {} has no pages",
                    i + 1
                )));
            }
            loaded.push(doc);
        }

        if documents.len() == 1 {
            return Ok(documents[0].to_vec());
        }

        let mut dest = loaded.remove(0);
        let pages_id = page_tree_root(&dest)?;
        let mut page_refs: Vec<ObjectId> = dest.get_pages().into_values().collect();
        let mut max_id = dest.max_id;

        for source in loaded {
            let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();
            let offset = max_id;

            for (old_id, mut object) in source.objects {
                remap_refs(&mut object, offset);
                dest.objects.insert((old_id.0 + offset, old_id.1), object);
            }

            page_refs.extend(source_pages.iter().map(|id| (id.0 + offset, id.1)));
            max_id = max_id.max(source.max_id + offset);
        }
        dest.max_id = max_id;

        for &page_id in &page_refs {
            let inherited = inherited_attributes(&dest, page_id);
            if let Ok(page) = dest.get_dictionary_mut(page_id) {
                for (key, value) in inherited {
                    page.set(key, value);
                }
                page.set("Parent", Object::Reference(pages_id));
            }
        }

        update_page_tree(&mut dest, pages_id, &page_refs)?;
        dest.prune_objects();

        if self.compress {
            dest.compress();
        }

        debug!(
            "Merged {} documents into {} pages",
            documents.len(),
            page_refs.len()
        );

        let mut buffer = Vec::new();
        dest.save_to(&mut buffer)
            .map_err(|e| MergeError::MergeExecution(format!("failed to save merged PDF: {}", e)))?;
        Ok(buffer)
    }
}

/// Shift every indirect reference inside `obj` by `offset`
fn remap_refs(obj: &mut Object, offset: u32) {
    match obj {
        Object::Reference(id) => id.0 += offset,
        Object::Array(items) => items.iter_mut().for_each(|o| remap_refs(o, offset)),
        Object::Dictionary(dict) => dict.iter_mut().for_each(|(_, v)| remap_refs(v, offset)),
        Object::Stream(stream) => stream
            .dict
            .iter_mut()
            .for_each(|(_, v)| remap_refs(v, offset)),
        _ => {}
    }
}

/// Id of the catalog's root `Pages` node
fn page_tree_root(doc: &Document) -> Result<ObjectId> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| MergeError::MergeExecution("no Root in trailer".into()))?;

    doc.get_dictionary(catalog_id)
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|_| MergeError::MergeExecution("catalog has no Pages reference".into()))
}

/// Attributes `page_id` inherits and does not set itself, nearest ancestor wins
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(Vec<u8>, Object)> {
    let mut found = Vec::new();
    let Ok(page) = doc.get_dictionary(page_id) else {
        return found;
    };

    let mut missing: Vec<&[u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(node_id) = parent {
        if missing.is_empty() || depth >= MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    found
}

/// Point the root page node at exactly `page_refs`, in order
fn update_page_tree(doc: &mut Document, pages_id: ObjectId, page_refs: &[ObjectId]) -> Result<()> {
    let pages = doc
        .get_dictionary_mut(pages_id)
        .map_err(|_| MergeError::MergeExecution("invalid pages dictionary".into()))?;

    // Every page now carries its own copy; leaving them here would leak the
    // first document's attributes into the others.
    for key in INHERITABLE {
        pages.remove(key);
    }

    let kids = page_refs.iter().map(|&id| Object::Reference(id)).collect();
    pages.set("Kids", Object::Array(kids));
    pages.set("Count", Object::Integer(page_refs.len() as i64));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Dictionary, Stream};

    /// Build a PDF with `num_pages` pages whose content names the page
    ///
    /// The MediaBox lives on the `Pages` node so merging has to carry it down.
    fn create_test_pdf(num_pages: u32, prefix: &str, width: i64) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        for page_num in 1..=num_pages {
            let content = format!("BT /F1 12 Tf 50 700 Td ({}-Page-{}) Tj ET", prefix, page_num);
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
            let page_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
            ]));
            kids.push(Object::Reference(page_id));
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(num_pages as i64)),
            ("Kids", Object::Array(kids)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(width),
                    Object::Integer(792),
                ]),
            ),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn page_texts(bytes: &[u8]) -> Vec<String> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|&id| String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned())
            .collect()
    }

    fn media_box_width(doc: &Document, page_id: ObjectId) -> i64 {
        let page = doc.get_dictionary(page_id).unwrap();
        page.get(b"MediaBox").unwrap().as_array().unwrap()[2]
            .as_i64()
            .unwrap()
    }

    /// Two-level page tree: root `Pages` carries `Rotate` and `Resources`,
    /// an intermediate `Pages` node carries a 500-wide MediaBox
    fn create_nested_pdf(num_pages: u32, prefix: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let root_id = doc.new_object_id();
        let middle_id = doc.new_object_id();

        let mut kids = Vec::new();
        for page_num in 1..=num_pages {
            let content = format!("BT /F1 12 Tf 50 700 Td ({}-Page-{}) Tj ET", prefix, page_num);
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
            let page_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(middle_id)),
                ("Contents", Object::Reference(content_id)),
            ]));
            kids.push(Object::Reference(page_id));
        }

        let middle = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Parent", Object::Reference(root_id)),
            ("Count", Object::Integer(num_pages as i64)),
            ("Kids", Object::Array(kids)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(500),
                    Object::Integer(700),
                ]),
            ),
        ]);
        doc.objects.insert(middle_id, Object::Dictionary(middle));

        let font = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ]);
        let resources = Dictionary::from_iter(vec![(
            "Font",
            Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Dictionary(font))])),
        )]);
        let root = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(num_pages as i64)),
            ("Kids", Object::Array(vec![Object::Reference(middle_id)])),
            ("Rotate", Object::Integer(90)),
            ("Resources", Object::Dictionary(resources)),
        ]);
        doc.objects.insert(root_id, Object::Dictionary(root));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(root_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn rotation(doc: &Document, page_id: ObjectId) -> Option<i64> {
        let page = doc.get_dictionary(page_id).unwrap();
        page.get(b"Rotate").ok().map(|r| r.as_i64().unwrap())
    }

    fn has_font_resource(doc: &Document, page_id: ObjectId) -> bool {
        let page = doc.get_dictionary(page_id).unwrap();
        page.get(b"Resources")
            .and_then(Object::as_dict)
            .and_then(|res| res.get(b"Font"))
            .and_then(Object::as_dict)
            .map(|fonts| fonts.has(b"F1"))
            .unwrap_or(false)
    }

    fn pages_node_count(doc: &Document) -> usize {
        doc.objects
            .values()
            .filter_map(|obj| obj.as_dict().ok())
            .filter(|dict| {
                dict.get(b"Type")
                    .and_then(Object::as_name)
                    .map(|name| name == b"Pages")
                    .unwrap_or(false)
            })
            .count()
    }

    #[test]
    fn test_empty_input_fails() {
        let result = LopdfExecutor::new().merge(&[]);
        assert!(matches!(result, Err(MergeError::EmptyCollection)));
    }

    #[test]
    fn test_single_document_returned_verbatim() {
        let pdf = create_test_pdf(2, "Single", 612);
        let merged = LopdfExecutor::new().merge(&[&pdf]).unwrap();
        assert_eq!(merged, pdf);
    }

    #[test]
    fn test_single_invalid_document_fails() {
        let invalid: &[u8] = b"not a pdf";
        let result = LopdfExecutor::new().merge(&[invalid]);
        assert!(matches!(result, Err(MergeError::ParseError(_))));
    }

    #[test]
    fn test_invalid_document_names_position() {
        let good = create_test_pdf(1, "Good", 612);
        let garbage: &[u8] = b"%PDF-1.7 garbage";
        let err = LopdfExecutor::new().merge(&[&good, garbage]).unwrap_err();
        assert!(err.to_string().contains("document 2"), "{}", err);
    }

    #[test]
    fn test_merge_concatenates_pages_in_order() {
        let doc_a = create_test_pdf(2, "DocA", 612);
        let doc_b = create_test_pdf(3, "DocB", 612);

        let merged = LopdfExecutor::new().merge(&[&doc_a, &doc_b]).unwrap();
        let texts = page_texts(&merged);

        assert_eq!(texts.len(), 5);
        let expected = ["DocA-Page-1", "DocA-Page-2", "DocB-Page-1", "DocB-Page-2", "DocB-Page-3"];
        for (text, label) in texts.iter().zip(expected) {
            assert!(text.contains(label), "expected {} in {:?}", label, text);
        }
    }

    #[test]
    fn test_merge_without_compression() {
        let docs: Vec<Vec<u8>> = (0..4)
            .map(|i| create_test_pdf(i + 1, &format!("Doc{}", i), 612))
            .collect();
        let refs: Vec<&[u8]> = docs.iter().map(Vec::as_slice).collect();

        let merged = LopdfExecutor::new()
            .with_compression(false)
            .merge(&refs)
            .unwrap();
        assert_eq!(page_texts(&merged).len(), 10);
    }

    #[test]
    fn test_merge_keeps_each_documents_inherited_media_box() {
        let letter = create_test_pdf(1, "Letter", 612);
        let wide = create_test_pdf(2, "Wide", 1000);

        let merged = LopdfExecutor::new().merge(&[&letter, &wide]).unwrap();
        let doc = Document::load_mem(&merged).unwrap();
        let widths: Vec<i64> = doc
            .get_pages()
            .values()
            .map(|&id| media_box_width(&doc, id))
            .collect();

        assert_eq!(widths, vec![612, 1000, 1000]);
    }

    #[test]
    fn test_nested_destination_tree_is_flattened() {
        let nested = create_nested_pdf(2, "Nested");
        let letter = create_test_pdf(1, "Letter", 612);

        let merged = LopdfExecutor::new()
            .with_compression(false)
            .merge(&[&nested, &letter])
            .unwrap();
        let doc = Document::load_mem(&merged).unwrap();
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

        assert_eq!(pages.len(), 3);
        let texts = page_texts(&merged);
        let expected = ["Nested-Page-1", "Nested-Page-2", "Letter-Page-1"];
        for (text, label) in texts.iter().zip(expected) {
            assert!(text.contains(label), "expected {} in {:?}", label, text);
        }

        let rotations: Vec<Option<i64>> = pages.iter().map(|&id| rotation(&doc, id)).collect();
        assert_eq!(rotations, vec![Some(90), Some(90), None]);
        let fonts: Vec<bool> = pages.iter().map(|&id| has_font_resource(&doc, id)).collect();
        assert_eq!(fonts, vec![true, true, false]);
        let widths: Vec<i64> = pages.iter().map(|&id| media_box_width(&doc, id)).collect();
        assert_eq!(widths, vec![500, 500, 612]);

        // Intermediate node and the second document's tree are pruned
        assert_eq!(pages_node_count(&doc), 1);
        let root_id = page_tree_root(&doc).unwrap();
        let root = doc.get_dictionary(root_id).unwrap();
        assert!(!root.has(b"Rotate"));
        assert!(!root.has(b"Resources"));
        assert_eq!(root.get(b"Count").unwrap().as_i64().unwrap(), 3);
        for &id in &pages {
            let parent = doc
                .get_dictionary(id)
                .unwrap()
                .get(b"Parent")
                .unwrap()
                .as_reference()
                .unwrap();
            assert_eq!(parent, root_id);
        }
    }

    #[test]
    fn test_nested_source_keeps_inherited_rotate_and_resources() {
        let letter = create_test_pdf(1, "Letter", 612);
        let nested = create_nested_pdf(2, "Nested");

        let merged = LopdfExecutor::new().merge(&[&letter, &nested]).unwrap();
        let doc = Document::load_mem(&merged).unwrap();
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

        let rotations: Vec<Option<i64>> = pages.iter().map(|&id| rotation(&doc, id)).collect();
        assert_eq!(rotations, vec![None, Some(90), Some(90)]);
        let fonts: Vec<bool> = pages.iter().map(|&id| has_font_resource(&doc, id)).collect();
        assert_eq!(fonts, vec![false, true, true]);
        let widths: Vec<i64> = pages.iter().map(|&id| media_box_width(&doc, id)).collect();
        assert_eq!(widths, vec![612, 500, 500]);
    }

    #[test]
    fn test_closure_executor() {
        let executor = |docs: &[&[u8]]| -> Result<Vec<u8>> { Ok(docs.concat()) };
        let docs: [&[u8]; 2] = [b"ab", b"c"];
        assert_eq!(executor.merge(&docs).unwrap(), b"abc".to_vec());
    }
}
