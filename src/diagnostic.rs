//! Diagnostics attached to green nodes and surfaced from syntax trees.
//!
//! Green nodes are position independent, so the diagnostics they carry
//! ([`DiagnosticInfo`]) store spans relative to the node's own full start.
//! [`crate::syntax::SyntaxTree::diagnostics`] rebases them while walking the
//! tree and yields absolute [`Diagnostic`]s.

use std::fmt;

use text_size::TextRange;

use crate::text::FileLinePositionSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Hidden,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Hidden => f.write_str("hidden"),
            Severity::Info => f.write_str("info"),
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A diagnostic as stored on a green node: the span is relative to the full
/// start of the node that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticInfo {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    /// Span relative to the carrying node's full start.
    pub span: TextRange,
}

impl DiagnosticInfo {
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        span: TextRange,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
        }
    }

    pub fn error(id: impl Into<String>, message: impl Into<String>, span: TextRange) -> Self {
        Self::new(id, Severity::Error, message, span)
    }

    pub fn warning(id: impl Into<String>, message: impl Into<String>, span: TextRange) -> Self {
        Self::new(id, Severity::Warning, message, span)
    }
}

/// Where a [`Diagnostic`] points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// The diagnostic has no location.
    None,
    /// An absolute span inside the tree's source text.
    Source { span: TextRange },
    /// A span in some other file.
    External {
        path: String,
        span: TextRange,
        line_span: FileLinePositionSpan,
    },
}

impl Location {
    pub fn span(&self) -> Option<TextRange> {
        match self {
            Location::None => None,
            Location::Source { span } => Some(*span),
            Location::External { span, .. } => Some(*span),
        }
    }
}

/// A user-facing diagnostic with an absolute location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
    pub custom_tags: Vec<String>,
}

impl Diagnostic {
    pub(crate) fn from_info(info: &DiagnosticInfo, span: TextRange) -> Self {
        Self {
            id: info.id.clone(),
            severity: info.severity,
            message: info.message.clone(),
            location: Location::Source { span },
            custom_tags: Vec::new(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location.span() {
            Some(span) => write!(
                f,
                "{} {} at {:?}: {}",
                self.severity, self.id, span, self.message
            ),
            None => write!(f, "{} {}: {}", self.severity, self.id, self.message),
        }
    }
}

#[cfg(feature = "serde1")]
mod severity_serde {
    use super::Severity;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Severity {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_u8(match self {
                Severity::Hidden => 0,
                Severity::Info => 1,
                Severity::Warning => 2,
                Severity::Error => 3,
            })
        }
    }

    impl<'de> Deserialize<'de> for Severity {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            match u8::deserialize(deserializer)? {
                0 => Ok(Severity::Hidden),
                1 => Ok(Severity::Info),
                2 => Ok(Severity::Warning),
                3 => Ok(Severity::Error),
                other => Err(serde::de::Error::custom(format!(
                    "invalid severity tag {other}"
                ))),
            }
        }
    }
}
