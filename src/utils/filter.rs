//! Client-side search over already-fetched lists
//!
//! Case-insensitive substring match; a blank query matches everything.

use crate::models::types::{EvidenceItem, FrozenWalletEntry, UnfrozenWalletEntry};

/// Rows that can be matched by a free-text query
pub trait Searchable {
    /// Fields the query is matched against
    fn haystack(&self) -> Vec<&str>;

    fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty()
            || self
                .haystack()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }
}

impl Searchable for FrozenWalletEntry {
    fn haystack(&self) -> Vec<&str> {
        let mut fields = vec![self.address.as_str()];
        fields.extend(self.frozen_by.as_deref());
        fields.extend(self.freeze_reason.as_deref());
        fields
    }
}

impl Searchable for UnfrozenWalletEntry {
    fn haystack(&self) -> Vec<&str> {
        let mut fields = vec![self.address.as_str()];
        fields.extend(self.unfrozen_by.as_deref());
        fields.extend(self.unfreeze_reason.as_deref());
        fields
    }
}

impl Searchable for EvidenceItem {
    fn haystack(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.evidence_id.as_deref());
        fields.extend(self.uploaded_by.as_deref());
        fields
    }
}

/// Rows of `items` matching `query`, in original order
pub fn filter_rows<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    items.iter().filter(|item| item.matches(query)).collect()
}
