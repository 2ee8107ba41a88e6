use std::collections::BTreeSet;

use ingest::Language;
use tree_sitter::Node;

use crate::kind::NodeKind;
use crate::literal;
use crate::operator::Operator;
use crate::walker::{anonymous_operators, field_operator, node_text, LanguageBackend};

/// Python backend over `tree-sitter-python`.
#[derive(Debug, Clone)]
pub struct PythonBackend {
    ignore: BTreeSet<NodeKind>,
}

impl PythonBackend {
    pub fn new(ignore: BTreeSet<NodeKind>) -> Self {
        Self { ignore }
    }
}

impl LanguageBackend for PythonBackend {
    fn language(&self) -> Language {
        Language::Py
    }

    fn grammar(&self) -> tree_sitter::Language {
        tree_sitter_python::LANGUAGE.into()
    }

    fn classify(&self, node: Node<'_>, _src: &[u8]) -> Option<NodeKind> {
        use NodeKind::*;
        let kind = match node.kind() {
            "module" => Module,
            "function_definition" => FunctionDef,
            "lambda" => Lambda,
            "class_definition" => ClassDef,
            "decorator" => Decorator,
            "type_alias_statement" => TypeAlias,
            "parameters" | "lambda_parameters" => Parameters,
            "default_parameter"
            | "typed_parameter"
            | "typed_default_parameter"
            | "list_splat_pattern"
            | "dictionary_splat_pattern" => Parameter,

            "block" => Block,
            "expression_statement" if is_docstring(node) => Docstring,
            "expression_statement" => ExpressionStatement,
            "assignment" | "named_expression" => Assignment,
            "augmented_assignment" => AugmentedAssignment,
            "if_statement" => If,
            "elif_clause" => ElseIf,
            "else_clause" => Else,
            "for_statement" => For,
            "while_statement" => While,
            "break_statement" => Break,
            "continue_statement" => Continue,
            "return_statement" => Return,
            "pass_statement" => Pass,
            "match_statement" => Switch,
            "case_clause" => Case,
            "try_statement" => Try,
            "except_clause" | "except_group_clause" => Catch,
            "finally_clause" => Finally,
            "raise_statement" => Throw,
            "with_statement" => With,
            "assert_statement" => Assert,
            "global_statement" | "nonlocal_statement" => Global,
            "delete_statement" => Delete,
            "import_statement" | "import_from_statement" | "future_import_statement" => Import,
            "comment" => Comment,

            "call" => Call,
            "argument_list" => Arguments,
            "keyword_argument" => KeywordArgument,
            "attribute" => Attribute,
            "subscript" => Subscript,
            "slice" => Slice,
            "binary_operator" => BinaryOp,
            "boolean_operator" => BooleanOp,
            "comparison_operator" => Comparison,
            "not_operator" | "unary_operator" => UnaryOp,
            "conditional_expression" => Conditional,
            "yield" => Yield,
            "await" => Await,
            "list_comprehension"
            | "dictionary_comprehension"
            | "set_comprehension"
            | "generator_expression" => Comprehension,
            "list" | "list_pattern" => ListLiteral,
            "tuple" | "expression_list" | "pattern_list" | "tuple_pattern" => TupleLiteral,
            "dictionary" => DictLiteral,
            "set" => SetLiteral,
            "pair" => Pair,
            "identifier" | "keyword_identifier" => Identifier,
            "type" => TypeName,

            "integer" | "float" => NumberLiteral,
            "string" | "concatenated_string" => StringLiteral,
            "true" | "false" => BoolLiteral,
            "none" => NullLiteral,

            "parenthesized_expression"
            | "decorated_definition"
            | "with_clause"
            | "with_item"
            | "ERROR" => return None,
            _ => Other,
        };
        Some(kind)
    }

    fn is_ignored(&self, kind: NodeKind) -> bool {
        self.ignore.contains(&kind)
    }

    fn extract_operators(&self, node: Node<'_>, _src: &[u8]) -> Vec<Operator> {
        match node.kind() {
            "binary_operator" | "boolean_operator" | "unary_operator" | "augmented_assignment" => {
                field_operator(node)
            }
            "comparison_operator" | "not_operator" | "assignment" => anonymous_operators(node),
            "named_expression" => vec![Operator::Assign],
            _ => Vec::new(),
        }
    }

    fn extract_literal(&self, node: Node<'_>, kind: NodeKind, src: &[u8]) -> Option<String> {
        match kind {
            NodeKind::NumberLiteral => Some(literal::number(node_text(node, src))),
            NodeKind::StringLiteral => Some(literal::tagged_string(&string_body(node, src))),
            _ => None,
        }
    }
}

/// An expression statement holding a lone string, before any other statement
/// of a module, class or function body.
fn is_docstring(node: Node<'_>) -> bool {
    let documented = match node.parent() {
        Some(parent) if parent.kind() == "module" => true,
        Some(parent) if parent.kind() == "block" => parent
            .parent()
            .is_some_and(|owner| matches!(owner.kind(), "function_definition" | "class_definition")),
        _ => false,
    };
    if !documented {
        return false;
    }
    let mut cursor = node.walk();
    let mut named = node.named_children(&mut cursor);
    let only_string = matches!(
        (named.next(), named.next()),
        (Some(child), None) if matches!(child.kind(), "string" | "concatenated_string")
    );
    if !only_string {
        return false;
    }
    let mut prev = node.prev_named_sibling();
    while let Some(sibling) = prev {
        if sibling.kind() != "comment" {
            return false;
        }
        prev = sibling.prev_named_sibling();
    }
    true
}

fn string_body(node: Node<'_>, src: &[u8]) -> String {
    if node.kind() == "concatenated_string" {
        let mut cursor = node.walk();
        return node
            .named_children(&mut cursor)
            .filter(|part| part.kind() == "string")
            .map(|part| literal::python_string_body(node_text(part, src)))
            .collect();
    }
    literal::python_string_body(node_text(node, src)).to_string()
}
