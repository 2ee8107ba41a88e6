use std::collections::BTreeSet;

use ingest::Language;
use tree_sitter::{Node, Tree};

use crate::kind::NodeKind;
use crate::literal;
use crate::operator::Operator;
use crate::walker::{anonymous_operators, field_operator, node_text, LanguageBackend};

/// C/C++ backend over `tree-sitter-cpp`.
///
/// Plain C parses with the same grammar; the C++ grammar is a superset for
/// everything the walker distinguishes.
#[derive(Debug, Clone)]
pub struct CppBackend {
    ignore: BTreeSet<NodeKind>,
    /// Names bound by `#define` anywhere in the current unit.
    macros: BTreeSet<String>,
}

impl CppBackend {
    pub fn new(ignore: BTreeSet<NodeKind>) -> Self {
        Self {
            ignore,
            macros: BTreeSet::new(),
        }
    }

    /// A call is a macro invocation only when its callee is a name the
    /// unit itself `#define`s.
    fn is_macro_call(&self, node: Node<'_>, src: &[u8]) -> bool {
        node.child_by_field_name("function")
            .filter(|callee| callee.kind() == "identifier")
            .is_some_and(|callee| self.macros.contains(node_text(callee, src)))
    }
}

impl LanguageBackend for CppBackend {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn grammar(&self) -> tree_sitter::Language {
        tree_sitter_cpp::LANGUAGE.into()
    }

    fn classify(&self, node: Node<'_>, src: &[u8]) -> Option<NodeKind> {
        use NodeKind::*;
        let kind = match node.kind() {
            "translation_unit" => Module,
            "function_definition" => FunctionDef,
            "lambda_expression" => Lambda,
            "class_specifier" | "struct_specifier" | "union_specifier" => ClassDef,
            "enum_specifier" => EnumDef,
            "type_definition" => TypeAlias,
            "template_declaration" => Template,
            "namespace_definition" => Namespace,
            "parameter_list" | "template_parameter_list" => Parameters,
            "parameter_declaration"
            | "optional_parameter_declaration"
            | "variadic_parameter_declaration" => Parameter,
            "declaration" => Declaration,
            "init_declarator"
            | "function_declarator"
            | "pointer_declarator"
            | "reference_declarator"
            | "array_declarator" => Declarator,
            "field_declaration" => FieldDeclaration,

            "compound_statement" | "declaration_list" | "field_declaration_list" => Block,
            "expression_statement" => ExpressionStatement,
            "assignment_expression" if is_plain_assignment(node) => Assignment,
            "assignment_expression" => AugmentedAssignment,
            "if_statement" => If,
            "else_clause" => Else,
            "for_statement" => For,
            "for_range_loop" => ForEach,
            "while_statement" => While,
            "do_statement" => DoWhile,
            "break_statement" => Break,
            "continue_statement" => Continue,
            "return_statement" => Return,
            "switch_statement" => Switch,
            "case_statement" => Case,
            "try_statement" => Try,
            "catch_clause" => Catch,
            "throw_statement" => Throw,
            "labeled_statement" => Label,
            "goto_statement" => Goto,
            "static_assert_declaration" => Assert,
            "comment" => Comment,
            "preproc_include" => Include,
            "preproc_def" | "preproc_function_def" | "preproc_call" => Preprocessor,
            "using_declaration" | "alias_declaration" => Using,
            "namespace_alias_definition" => NamespaceAlias,

            "call_expression" if self.is_macro_call(node, src) => MacroInvocation,
            "call_expression" => Call,
            "argument_list" => Arguments,
            "field_expression" => Attribute,
            "subscript_expression" => Subscript,
            "binary_expression" => binary_kind(node),
            "unary_expression" => UnaryOp,
            "update_expression" => Update,
            "conditional_expression" => Conditional,
            "cast_expression" => Cast,
            "sizeof_expression" => SizeOf,
            "new_expression" => New,
            "delete_expression" => Delete,
            "pointer_expression" if is_address_of(node) => Reference,
            "pointer_expression" => Pointer,
            "initializer_list" => ListLiteral,
            "identifier" | "field_identifier" | "namespace_identifier" | "qualified_identifier" => {
                Identifier
            }
            "type_identifier" | "primitive_type" | "sized_type_specifier" | "template_type" => {
                TypeName
            }

            "number_literal" => NumberLiteral,
            "string_literal" | "raw_string_literal" | "concatenated_string" => StringLiteral,
            "char_literal" => CharLiteral,
            "true" | "false" => BoolLiteral,
            "null" | "nullptr" => NullLiteral,

            "parenthesized_expression"
            | "condition_clause"
            | "preproc_if"
            | "preproc_ifdef"
            | "preproc_else"
            | "preproc_elif"
            | "preproc_elifdef"
            | "ERROR" => return None,
            _ => Other,
        };
        Some(kind)
    }

    fn is_ignored(&self, kind: NodeKind) -> bool {
        self.ignore.contains(&kind)
    }

    fn prepare(&mut self, tree: &Tree, src: &[u8]) {
        self.macros.clear();
        let mut stack = vec![tree.root_node()];
        while let Some(node) = stack.pop() {
            if matches!(node.kind(), "preproc_def" | "preproc_function_def") {
                if let Some(name) = node.child_by_field_name("name") {
                    self.macros.insert(node_text(name, src).to_string());
                }
            }
            let mut cursor = node.walk();
            stack.extend(node.named_children(&mut cursor));
        }
    }

    fn extract_operators(&self, node: Node<'_>, _src: &[u8]) -> Vec<Operator> {
        match node.kind() {
            "binary_expression"
            | "assignment_expression"
            | "unary_expression"
            | "update_expression" => field_operator(node),
            "init_declarator" => anonymous_operators(node),
            _ => Vec::new(),
        }
    }

    fn extract_literal(&self, node: Node<'_>, kind: NodeKind, src: &[u8]) -> Option<String> {
        match kind {
            NodeKind::NumberLiteral => Some(literal::number(node_text(node, src))),
            NodeKind::StringLiteral => Some(literal::tagged_string(&string_body(node, src))),
            NodeKind::CharLiteral => Some(literal::tagged_char(node_text(node, src))),
            _ => None,
        }
    }

    /// Preprocessor conditionals are walked for their branches only; the
    /// condition expression itself is not program structure.
    fn children<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let skipped = match node.kind() {
            "preproc_ifdef" | "preproc_elifdef" => node.child_by_field_name("name"),
            "preproc_if" | "preproc_elif" => node.child_by_field_name("condition"),
            _ => None,
        };
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| Some(*child) != skipped)
            .collect()
    }
}

fn is_plain_assignment(node: Node<'_>) -> bool {
    node.child_by_field_name("operator")
        .is_none_or(|op| op.kind() == "=")
}

fn is_address_of(node: Node<'_>) -> bool {
    node.child_by_field_name("operator")
        .is_some_and(|op| op.kind() == "&")
}

/// Logical and relational binary expressions get the same kinds the Python
/// grammar gives them, so the skeletons line up.
fn binary_kind(node: Node<'_>) -> NodeKind {
    let op = node
        .child_by_field_name("operator")
        .map(|op| op.kind())
        .unwrap_or_default();
    match op {
        "&&" | "||" | "and" | "or" => NodeKind::BooleanOp,
        "==" | "!=" | "<" | "<=" | ">" | ">=" | "not_eq" | "<=>" => NodeKind::Comparison,
        _ => NodeKind::BinaryOp,
    }
}

fn string_body(node: Node<'_>, src: &[u8]) -> String {
    match node.kind() {
        "raw_string_literal" => literal::c_raw_string_body(node_text(node, src)).to_string(),
        "concatenated_string" => {
            let mut cursor = node.walk();
            node.named_children(&mut cursor)
                .filter_map(|part| match part.kind() {
                    "string_literal" => Some(literal::c_string_body(node_text(part, src))),
                    "raw_string_literal" => Some(literal::c_raw_string_body(node_text(part, src))),
                    _ => None,
                })
                .collect()
        }
        _ => literal::c_string_body(node_text(node, src)).to_string(),
    }
}
