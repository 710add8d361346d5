//! crates/study_assistant_core/src/document_store.rs
//!
//! The in-memory list of uploaded study material, and the context assembler
//! that joins it into the text every prompt is grounded on.

use crate::domain::{DocumentKind, UploadedDocument};
use chrono::Utc;
use uuid::Uuid;

/// Separator placed between documents when building the combined context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Holds uploaded documents in insertion order.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: Vec<UploadedDocument>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a document with a fresh id and upload timestamp.
    /// Content is stored verbatim; no format validation happens here.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        content: impl Into<String>,
        kind: DocumentKind,
    ) -> &UploadedDocument {
        let document = UploadedDocument {
            id: Uuid::new_v4(),
            name: name.into(),
            content: content.into(),
            kind,
            uploaded_at: Utc::now(),
        };
        self.documents.push(document);
        &self.documents[self.documents.len() - 1]
    }

    /// Removes the document with the given id. Returns `false` when nothing matched.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.documents.len();
        self.documents.retain(|doc| doc.id != id);
        self.documents.len() != before
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    pub fn list(&self) -> &[UploadedDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All document contents in insertion order, separated by a blank line.
    /// Empty when the store is empty.
    pub fn combined_content(&self) -> String {
        self.documents
            .iter()
            .map(|doc| doc.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_content_joins_in_insertion_order() {
        let mut store = DocumentStore::new();
        store.add("a.txt", "alpha", DocumentKind::Text);
        store.add("b.pdf", "beta", DocumentKind::Pdf);
        store.add("Pasted Text", "gamma", DocumentKind::Text);

        assert_eq!(store.combined_content(), "alpha\n\nbeta\n\ngamma");
    }

    #[test]
    fn empty_store_yields_empty_context() {
        let store = DocumentStore::new();
        assert!(store.is_empty());
        assert_eq!(store.combined_content(), "");
    }

    #[test]
    fn clear_empties_the_store() {
        let mut store = DocumentStore::new();
        store.add("a.txt", "alpha", DocumentKind::Text);
        store.add("b.txt", "beta", DocumentKind::Text);
        store.clear();

        assert_eq!(store.len(), 0);
        assert_eq!(store.combined_content(), "");
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let mut store = DocumentStore::new();
        store.add("a.txt", "alpha", DocumentKind::Text);

        assert!(!store.remove(Uuid::new_v4()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.combined_content(), "alpha");
    }

    #[test]
    fn remove_drops_only_the_matching_document() {
        let mut store = DocumentStore::new();
        store.add("a.txt", "alpha", DocumentKind::Text);
        let middle = store.add("b.txt", "beta", DocumentKind::Text).id;
        store.add("c.txt", "gamma", DocumentKind::Text);

        assert!(store.remove(middle));
        assert_eq!(store.combined_content(), "alpha\n\ngamma");
    }

    #[test]
    fn ids_are_unique() {
        let mut store = DocumentStore::new();
        for i in 0..50 {
            store.add(format!("{i}.txt"), "same content", DocumentKind::Text);
        }
        let mut ids: Vec<_> = store.list().iter().map(|d| d.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn content_is_stored_verbatim() {
        let mut store = DocumentStore::new();
        let doc = store.add("notes.txt", "  {not json} \n\n", DocumentKind::Text);
        assert_eq!(doc.content, "  {not json} \n\n");
        assert_eq!(doc.kind, DocumentKind::Text);
    }
}
