//! Serialization and deserialization for green trees and syntax trees.
//!
//! Green nodes serialize as `(kind, missing, diagnostics, annotations,
//! payload)` records; the payload tag selects which constructor rebuilds the
//! node on the way back in, and every structural invariant is re-validated
//! so a corrupted stream fails the read instead of producing a broken tree.
//! Annotation ids are written and restored verbatim, which is what makes a
//! deserialized annotation compare equal to the live instance it came from.

use serde::{de, Deserialize, Serialize};

use crate::{
    annotation::SyntaxAnnotation,
    diagnostic::DiagnosticInfo,
    green::{GreenDetail, GreenList, GreenNode, GreenTokenData, TokenValue},
    kind::SyntaxKind,
    options::LuaSyntaxOptions,
    syntax::SyntaxTree,
    text::SourceText,
};

#[derive(Serialize, Deserialize)]
struct NodeRepr {
    kind: u16,
    missing: bool,
    diagnostics: Vec<DiagnosticInfo>,
    annotations: Vec<AnnotationRepr>,
    payload: PayloadRepr,
}

#[derive(Serialize, Deserialize)]
struct AnnotationRepr {
    id: u64,
    kind: Option<String>,
    data: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
enum PayloadRepr {
    Node(Vec<NodeRepr>),
    Token {
        text: String,
        value: ValueRepr,
        leading: Option<Box<NodeRepr>>,
        trailing: Option<Box<NodeRepr>>,
    },
    Trivia(String),
    List(Vec<NodeRepr>),
}

#[derive(Serialize, Deserialize)]
enum ValueRepr {
    None,
    Nil,
    Bool(bool),
    /// `f64` bit pattern, so the exact value (NaN included) round-trips in
    /// any format.
    Number(u64),
    Integer(i64),
    Str(String),
}

fn to_repr(green: &GreenNode) -> NodeRepr {
    let payload = match green.detail() {
        GreenDetail::Node { children } => PayloadRepr::Node(children.iter().map(to_repr).collect()),
        GreenDetail::List(list) => PayloadRepr::List(list.slots().iter().map(to_repr).collect()),
        GreenDetail::Trivia { text } => PayloadRepr::Trivia(text.to_string()),
        GreenDetail::Token(token) => PayloadRepr::Token {
            text: token.text.to_string(),
            value: match &token.value {
                TokenValue::None => ValueRepr::None,
                TokenValue::Nil => ValueRepr::Nil,
                TokenValue::Bool(value) => ValueRepr::Bool(*value),
                TokenValue::Number(value) => ValueRepr::Number(value.to_bits()),
                TokenValue::Integer(value) => ValueRepr::Integer(*value),
                TokenValue::Str(value) => ValueRepr::Str(value.to_string()),
            },
            leading: token.leading.as_ref().map(|green| Box::new(to_repr(green))),
            trailing: token.trailing.as_ref().map(|green| Box::new(to_repr(green))),
        },
    };
    NodeRepr {
        kind: green.kind().into_raw(),
        missing: green.is_missing(),
        diagnostics: green.diagnostics().to_vec(),
        annotations: green
            .annotations()
            .iter()
            .map(|annotation| AnnotationRepr {
                id: annotation.id(),
                kind: annotation.kind().map(str::to_owned),
                data: annotation.data().map(str::to_owned),
            })
            .collect(),
        payload,
    }
}

fn from_repr(repr: NodeRepr) -> Result<GreenNode, String> {
    let kind = SyntaxKind::from_raw(repr.kind)
        .ok_or_else(|| format!("unknown syntax kind {}", repr.kind))?;
    let annotations = repr
        .annotations
        .into_iter()
        .map(|annotation| {
            SyntaxAnnotation::from_raw_parts(
                annotation.id,
                annotation.kind.map(Into::into),
                annotation.data.map(Into::into),
            )
        })
        .collect();

    let detail = match repr.payload {
        PayloadRepr::Node(children) => {
            if !kind.is_node() || kind == SyntaxKind::List {
                return Err(format!("{kind:?} cannot be an interior node"));
            }
            let children = children
                .into_iter()
                .map(from_repr)
                .collect::<Result<Vec<_>, _>>()?;
            GreenDetail::Node {
                children: children.into_boxed_slice(),
            }
        }
        PayloadRepr::List(children) => {
            if kind != SyntaxKind::List {
                return Err(format!("{kind:?} cannot be a list"));
            }
            let children = children
                .into_iter()
                .map(from_repr)
                .collect::<Result<Vec<_>, _>>()?;
            GreenDetail::List(GreenList::new(children))
        }
        PayloadRepr::Trivia(text) => {
            if !kind.is_trivia() {
                return Err(format!("{kind:?} cannot be trivia"));
            }
            GreenDetail::Trivia { text: text.into() }
        }
        PayloadRepr::Token {
            text,
            value,
            leading,
            trailing,
        } => {
            if !kind.is_token() {
                return Err(format!("{kind:?} cannot be a token"));
            }
            let decode_trivia = |repr: Option<Box<NodeRepr>>| -> Result<Option<GreenNode>, String> {
                match repr {
                    None => Ok(None),
                    Some(repr) => {
                        let green = from_repr(*repr)?;
                        if !green.is_trivia()
                            && !(green.is_list() && green.slots().iter().all(GreenNode::is_trivia))
                        {
                            return Err("token trivia must be trivia or a trivia list".to_owned());
                        }
                        Ok(Some(green))
                    }
                }
            };
            GreenDetail::Token(GreenTokenData {
                text: text.into(),
                value: match value {
                    ValueRepr::None => TokenValue::None,
                    ValueRepr::Nil => TokenValue::Nil,
                    ValueRepr::Bool(value) => TokenValue::Bool(value),
                    ValueRepr::Number(bits) => TokenValue::Number(f64::from_bits(bits)),
                    ValueRepr::Integer(value) => TokenValue::Integer(value),
                    ValueRepr::Str(value) => TokenValue::Str(value.into()),
                },
                leading: decode_trivia(leading)?,
                trailing: decode_trivia(trailing)?,
            })
        }
    };

    Ok(GreenNode::restore(
        kind,
        detail,
        repr.diagnostics,
        annotations,
        repr.missing,
    ))
}

impl Serialize for GreenNode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_repr(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GreenNode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = NodeRepr::deserialize(deserializer)?;
        from_repr(repr).map_err(de::Error::custom)
    }
}

impl Serialize for SyntaxAnnotation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        AnnotationRepr {
            id: self.id(),
            kind: self.kind().map(str::to_owned),
            data: self.data().map(str::to_owned),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SyntaxAnnotation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = AnnotationRepr::deserialize(deserializer)?;
        Ok(SyntaxAnnotation::from_raw_parts(
            repr.id,
            repr.kind.map(Into::into),
            repr.data.map(Into::into),
        ))
    }
}

#[derive(Serialize, Deserialize)]
struct TreeRepr {
    text: String,
    path: Option<String>,
    options: LuaSyntaxOptions,
    root: NodeRepr,
}

impl Serialize for SyntaxTree {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TreeRepr {
            text: self.source().as_str().to_owned(),
            path: self.source().path().map(str::to_owned),
            options: self.options().clone(),
            root: to_repr(self.green_root()),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SyntaxTree {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = TreeRepr::deserialize(deserializer)?;
        let root = from_repr(repr.root).map_err(de::Error::custom)?;
        let source = match repr.path {
            Some(path) => SourceText::with_path(repr.text, path),
            None => SourceText::new(repr.text),
        };
        if root.full_width() != source.len() {
            return Err(de::Error::custom(
                "tree does not cover the serialized source text",
            ));
        }
        Ok(SyntaxTree::from_parts(source, repr.options, root))
    }
}
