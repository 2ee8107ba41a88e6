//! Operator normalization.
//!
//! Compound assignments split into two buckets: the assignment itself and the
//! underlying arithmetic or bitwise operator. `a += b` and `a = a + b` then
//! share both `Assign` and `Add` evidence. Relational, logical and bitwise
//! operators each keep their own bucket.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized operator bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    // assignment
    Assign,
    // logical
    Not,
    And,
    Or,
    // relational
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // bitwise
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Shl,
    Shr,
}

impl Operator {
    /// Conventional spelling used in reports.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Pow => "**",
            Operator::Assign => "=",
            Operator::Not => "!",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::BitAnd => "&",
            Operator::BitOr => "|",
            Operator::BitXor => "^",
            Operator::BitNot => "~",
            Operator::Shl => "<<",
            Operator::Shr => ">>",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Map a native operator token onto its buckets.
///
/// Returns an empty slice for tokens outside the vocabulary (`in`, `is`,
/// member access, pointer dereference).
pub fn normalize_operator(token: &str) -> &'static [Operator] {
    use Operator::*;
    match token {
        "+" => &[Add],
        "-" => &[Sub],
        "*" => &[Mul],
        "/" | "//" => &[Div],
        "%" => &[Mod],
        "**" => &[Pow],

        "=" => &[Assign],
        "+=" => &[Assign, Add],
        "-=" => &[Assign, Sub],
        "*=" => &[Assign, Mul],
        "/=" | "//=" => &[Assign, Div],
        "%=" => &[Assign, Mod],
        "**=" => &[Assign, Pow],
        "&=" | "and_eq" => &[Assign, BitAnd],
        "|=" | "or_eq" => &[Assign, BitOr],
        "^=" | "xor_eq" => &[Assign, BitXor],
        "<<=" => &[Assign, Shl],
        ">>=" => &[Assign, Shr],
        "++" => &[Assign, Add],
        "--" => &[Assign, Sub],

        "!" | "not" => &[Not],
        "&&" | "and" => &[And],
        "||" | "or" => &[Or],

        "==" => &[Eq],
        "!=" | "<>" | "not_eq" => &[Ne],
        "<" => &[Lt],
        "<=" => &[Le],
        ">" => &[Gt],
        ">=" => &[Ge],

        "&" | "bitand" => &[BitAnd],
        "|" | "bitor" => &[BitOr],
        "^" | "xor" => &[BitXor],
        "~" | "compl" => &[BitNot],
        "<<" => &[Shl],
        ">>" => &[Shr],

        _ => &[],
    }
}
