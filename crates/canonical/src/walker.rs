//! Language-polymorphic tree walk.
//!
//! Each language implements [`LanguageBackend`]; [`walk`] drives the shared
//! pre-order traversal and assembles [`CanonicalFeatures`].

use std::collections::{BTreeMap, BTreeSet};

use ingest::Language;
use tree_sitter::{Node, Parser, Tree};

use crate::error::{ParseError, SourcePosition};
use crate::features::{CanonicalFeatures, LineRange, FEATURES_VERSION};
use crate::kind::NodeKind;
use crate::operator::Operator;

/// Capabilities a language must provide to be reduced to canonical features.
///
/// Backends are stateless apart from their ignore set and are shared freely
/// across worker threads.
pub trait LanguageBackend: Send + Sync {
    fn language(&self) -> Language;

    /// Tree-sitter grammar for this language.
    fn grammar(&self) -> tree_sitter::Language;

    /// Map a named native node onto the canonical vocabulary.
    ///
    /// `None` marks the node transparent: it contributes no token, but its
    /// children are still visited.
    fn classify(&self, node: Node<'_>, src: &[u8]) -> Option<NodeKind>;

    /// Whether subtrees rooted at `kind` are skipped entirely.
    fn is_ignored(&self, kind: NodeKind) -> bool;

    /// Normalized operators carried by `node` itself (not its children).
    fn extract_operators(&self, node: Node<'_>, src: &[u8]) -> Vec<Operator>;

    /// Tagged literal value for a node already classified as a literal kind.
    fn extract_literal(&self, node: Node<'_>, kind: NodeKind, src: &[u8]) -> Option<String>;

    /// Collect unit-wide context from the whole tree before [`walk`] runs.
    fn prepare(&mut self, _tree: &Tree, _src: &[u8]) {}

    fn parse(&self, origin: &str, text: &str) -> Result<Tree, ParseError> {
        let parser_error = |reason: String| ParseError::Parser {
            origin: origin.to_string(),
            language: self.language(),
            reason,
        };
        let mut parser = Parser::new();
        parser
            .set_language(&self.grammar())
            .map_err(|err| parser_error(err.to_string()))?;
        parser
            .parse(text, None)
            .ok_or_else(|| parser_error("parser produced no tree".into()))
    }

    /// Children visited after `node`, in source order.
    fn children<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor).collect()
    }

    /// 1-based inclusive line range covered by `node`.
    fn position(&self, node: Node<'_>) -> LineRange {
        let start = node.start_position();
        let end = node.end_position();
        // A node ending at column 0 stops at the previous line's newline.
        let end_line = if end.column == 0 && end.row > start.row {
            end.row
        } else {
            end.row + 1
        };
        LineRange::new(start.row + 1, end_line)
    }
}

/// Pre-order walk of `tree`, skipping ignored subtrees.
///
/// Iterative with an explicit stack so deeply nested sources cannot overflow
/// the thread stack.
pub fn walk(backend: &dyn LanguageBackend, tree: &Tree, src: &[u8]) -> CanonicalFeatures {
    let mut head_sequence = Vec::new();
    let mut position_index = Vec::new();
    let mut operator_set: BTreeMap<Operator, u32> = BTreeMap::new();
    let mut literal_set = BTreeSet::new();

    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        if let Some(kind) = backend.classify(node, src) {
            if backend.is_ignored(kind) {
                continue;
            }
            head_sequence.push(kind);
            position_index.push(backend.position(node));
            for op in backend.extract_operators(node, src) {
                *operator_set.entry(op).or_insert(0) += 1;
            }
            if kind.is_literal() {
                if let Some(value) = backend.extract_literal(node, kind, src) {
                    literal_set.insert(value);
                }
                continue;
            }
        }
        let children = backend.children(node);
        stack.extend(children.into_iter().rev());
    }

    let unique_node_count = head_sequence.iter().collect::<BTreeSet<_>>().len();
    CanonicalFeatures {
        language: backend.language(),
        total_node_count: head_sequence.len(),
        unique_node_count,
        head_sequence,
        operator_set,
        literal_set,
        position_index,
        features_version: FEATURES_VERSION,
    }
}

/// Position of the first ERROR or MISSING node in pre-order, if any.
pub fn first_syntax_error(tree: &Tree) -> Option<SourcePosition> {
    let root = tree.root_node();
    if !root.has_error() {
        return None;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let point = node.start_position();
            return Some(SourcePosition {
                line: point.row + 1,
                column: point.column + 1,
            });
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

/// Operators spelled by the anonymous children of `node`, in source order.
pub(crate) fn anonymous_operators(node: Node<'_>) -> Vec<Operator> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| !child.is_named())
        .flat_map(|child| crate::operator::normalize_operator(child.kind()).iter().copied())
        .collect()
}

/// Operators spelled by the `operator` field of `node`.
pub(crate) fn field_operator(node: Node<'_>) -> Vec<Operator> {
    node.child_by_field_name("operator")
        .map(|op| crate::operator::normalize_operator(op.kind()).to_vec())
        .unwrap_or_default()
}

pub(crate) fn node_text<'s>(node: Node<'_>, src: &'s [u8]) -> &'s str {
    node.utf8_text(src).unwrap_or_default()
}
