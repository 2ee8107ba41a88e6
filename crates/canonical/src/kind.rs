//! Closed vocabulary of syntax-node categories.
//!
//! Every language backend maps its native tree-sitter node kinds onto
//! [`NodeKind`]. Two works written in different surface syntax but with the
//! same control-flow and expression shape produce the same sequence of kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Language-independent category of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    // --- Units and definitions ---
    Module,
    FunctionDef,
    Lambda,
    ClassDef,
    EnumDef,
    TypeAlias,
    Decorator,
    Template,
    Namespace,
    Parameters,
    Parameter,
    Declaration,
    Declarator,
    FieldDeclaration,

    // --- Statements ---
    Block,
    ExpressionStatement,
    Assignment,
    AugmentedAssignment,
    If,
    ElseIf,
    Else,
    For,
    ForEach,
    While,
    DoWhile,
    Break,
    Continue,
    Return,
    Pass,
    Switch,
    Case,
    Try,
    Catch,
    Finally,
    Throw,
    With,
    Assert,
    Global,
    Delete,
    Label,
    Goto,

    // --- Expressions ---
    Call,
    Arguments,
    KeywordArgument,
    Attribute,
    Subscript,
    Slice,
    BinaryOp,
    BooleanOp,
    Comparison,
    UnaryOp,
    Update,
    Conditional,
    Cast,
    SizeOf,
    New,
    Pointer,
    Reference,
    Yield,
    Await,
    Comprehension,
    ListLiteral,
    TupleLiteral,
    DictLiteral,
    SetLiteral,
    Pair,
    Identifier,
    TypeName,

    // --- Literals (leaves of the walk) ---
    NumberLiteral,
    StringLiteral,
    CharLiteral,
    BoolLiteral,
    NullLiteral,

    // --- Structure-free kinds (default ignore candidates) ---
    Comment,
    Docstring,
    Import,
    Include,
    Preprocessor,
    MacroInvocation,
    Using,
    NamespaceAlias,

    /// Named native node with no dedicated category.
    Other,
}

impl NodeKind {
    /// Stable snake_case name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        use NodeKind::*;
        match self {
            Module => "module",
            FunctionDef => "function_def",
            Lambda => "lambda",
            ClassDef => "class_def",
            EnumDef => "enum_def",
            TypeAlias => "type_alias",
            Decorator => "decorator",
            Template => "template",
            Namespace => "namespace",
            Parameters => "parameters",
            Parameter => "parameter",
            Declaration => "declaration",
            Declarator => "declarator",
            FieldDeclaration => "field_declaration",
            Block => "block",
            ExpressionStatement => "expression_statement",
            Assignment => "assignment",
            AugmentedAssignment => "augmented_assignment",
            If => "if",
            ElseIf => "else_if",
            Else => "else",
            For => "for",
            ForEach => "for_each",
            While => "while",
            DoWhile => "do_while",
            Break => "break",
            Continue => "continue",
            Return => "return",
            Pass => "pass",
            Switch => "switch",
            Case => "case",
            Try => "try",
            Catch => "catch",
            Finally => "finally",
            Throw => "throw",
            With => "with",
            Assert => "assert",
            Global => "global",
            Delete => "delete",
            Label => "label",
            Goto => "goto",
            Call => "call",
            Arguments => "arguments",
            KeywordArgument => "keyword_argument",
            Attribute => "attribute",
            Subscript => "subscript",
            Slice => "slice",
            BinaryOp => "binary_op",
            BooleanOp => "boolean_op",
            Comparison => "comparison",
            UnaryOp => "unary_op",
            Update => "update",
            Conditional => "conditional",
            Cast => "cast",
            SizeOf => "size_of",
            New => "new",
            Pointer => "pointer",
            Reference => "reference",
            Yield => "yield",
            Await => "await",
            Comprehension => "comprehension",
            ListLiteral => "list_literal",
            TupleLiteral => "tuple_literal",
            DictLiteral => "dict_literal",
            SetLiteral => "set_literal",
            Pair => "pair",
            Identifier => "identifier",
            TypeName => "type_name",
            NumberLiteral => "number_literal",
            StringLiteral => "string_literal",
            CharLiteral => "char_literal",
            BoolLiteral => "bool_literal",
            NullLiteral => "null_literal",
            Comment => "comment",
            Docstring => "docstring",
            Import => "import",
            Include => "include",
            Preprocessor => "preprocessor",
            MacroInvocation => "macro_invocation",
            Using => "using",
            NamespaceAlias => "namespace_alias",
            Other => "other",
        }
    }

    /// Literal kinds are leaves: the walker records them but never descends
    /// into their native children (string fragments, escape sequences).
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            NodeKind::NumberLiteral
                | NodeKind::StringLiteral
                | NodeKind::CharLiteral
                | NodeKind::BoolLiteral
                | NodeKind::NullLiteral
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
