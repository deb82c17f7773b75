//! User-attachable metadata with stable identity.

use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

static ELASTIC: Lazy<SyntaxAnnotation> = Lazy::new(|| SyntaxAnnotation::with_kind("elastic"));

/// An annotation that can be attached to green nodes and survives tree edits
/// and serialization.
///
/// Identity is the `id`: two annotations compare equal exactly when their ids
/// match, regardless of `kind`/`data`. Fresh annotations draw their id from a
/// process-wide monotonic counter; deserialization restores the stored id
/// verbatim so a round-tripped annotation still compares equal to the live
/// instance it was created from.
#[derive(Debug, Clone)]
pub struct SyntaxAnnotation {
    id: u64,
    kind: Option<Box<str>>,
    data: Option<Box<str>>,
}

impl SyntaxAnnotation {
    pub fn new() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            kind: None,
            data: None,
        }
    }

    pub fn with_kind(kind: impl Into<Box<str>>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::new()
        }
    }

    pub fn with_kind_and_data(kind: impl Into<Box<str>>, data: impl Into<Box<str>>) -> Self {
        Self {
            kind: Some(kind.into()),
            data: Some(data.into()),
            ..Self::new()
        }
    }

    pub(crate) fn from_raw_parts(id: u64, kind: Option<Box<str>>, data: Option<Box<str>>) -> Self {
        Self { id, kind, data }
    }

    /// The shared annotation marking trivia whose whitespace a formatter may
    /// rewrite.
    pub fn elastic() -> &'static SyntaxAnnotation {
        &ELASTIC
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

impl Default for SyntaxAnnotation {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for SyntaxAnnotation {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SyntaxAnnotation {}

impl std::hash::Hash for SyntaxAnnotation {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_monotonic() {
        let a = SyntaxAnnotation::new();
        let b = SyntaxAnnotation::new();
        assert!(b.id() > a.id());
        assert_ne!(a, b);
    }

    #[test]
    fn equality_is_by_id_only() {
        let a = SyntaxAnnotation::with_kind_and_data("kind", "data");
        let restored = SyntaxAnnotation::from_raw_parts(a.id(), None, None);
        assert_eq!(a, restored);
    }

    #[test]
    fn elastic_is_shared() {
        assert_eq!(SyntaxAnnotation::elastic(), SyntaxAnnotation::elastic());
        assert_eq!(SyntaxAnnotation::elastic().kind(), Some("elastic"));
    }
}
