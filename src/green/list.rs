//! List payloads.
//!
//! `create_list` picks the cheapest representation for the child count; the
//! choice never leaks to callers, who only see slots. A `Many` list whose
//! slots alternate `node, token, node, token, ...` starting with a node is
//! flagged *separated* so element/separator indexing is available.

use super::GreenNode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GreenList {
    One([GreenNode; 1]),
    Two([GreenNode; 2]),
    Three([GreenNode; 3]),
    Many {
        separated: bool,
        children: Box<[GreenNode]>,
    },
}

impl GreenList {
    pub(crate) fn new(children: Vec<GreenNode>) -> Self {
        match children.len() {
            1 => GreenList::One(to_array(children)),
            2 => GreenList::Two(to_array(children)),
            3 => GreenList::Three(to_array(children)),
            _ => {
                let separated = is_separated_shape(&children);
                GreenList::Many {
                    separated,
                    children: children.into_boxed_slice(),
                }
            }
        }
    }

    pub(crate) fn slots(&self) -> &[GreenNode] {
        match self {
            GreenList::One(children) => children,
            GreenList::Two(children) => children,
            GreenList::Three(children) => children,
            GreenList::Many { children, .. } => children,
        }
    }

    pub(crate) fn is_separated(&self) -> bool {
        matches!(self, GreenList::Many { separated: true, .. })
    }
}

fn to_array<const N: usize>(children: Vec<GreenNode>) -> [GreenNode; N] {
    match <[GreenNode; N]>::try_from(children) {
        Ok(array) => array,
        Err(_) => unreachable!("list arity checked by caller"),
    }
}

fn is_separated_shape(children: &[GreenNode]) -> bool {
    children.len() > 1
        && children.iter().enumerate().all(|(index, child)| {
            if index % 2 == 0 {
                !child.is_token()
            } else {
                child.is_token()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::SyntaxKind;

    fn node() -> GreenNode {
        GreenNode::node(SyntaxKind::NameExpression, vec![token()])
    }

    fn token() -> GreenNode {
        GreenNode::token(SyntaxKind::Identifier, "x")
    }

    #[test]
    fn picks_small_representations() {
        assert!(matches!(GreenList::new(vec![node()]), GreenList::One(_)));
        assert!(matches!(
            GreenList::new(vec![node(), node()]),
            GreenList::Two(_)
        ));
        assert!(matches!(
            GreenList::new(vec![node(), node(), node()]),
            GreenList::Three(_)
        ));
        assert!(matches!(
            GreenList::new(vec![node(), node(), node(), node()]),
            GreenList::Many { .. }
        ));
    }

    #[test]
    fn detects_separated_shape() {
        let list = GreenList::new(vec![node(), token(), node(), token(), node()]);
        assert!(list.is_separated());
        let not = GreenList::new(vec![node(), node(), node(), node()]);
        assert!(!not.is_separated());
        // Small lists never report separated, even with the right shape.
        let small = GreenList::new(vec![node(), token(), node()]);
        assert!(!small.is_separated());
    }
}
