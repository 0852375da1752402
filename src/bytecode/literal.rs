use serde::{Deserialize, Serialize};
use std::fmt;

/// A constant referenced by an instruction operand.
///
/// The kind is fixed when the pool is built; opcodes that expect a number or
/// a string check it at the use site instead of reinterpreting raw words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Literal {
    Number(i64),
    String(String),
}

impl Literal {
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Number(_) => "number",
            Literal::String(_) => "string",
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Literal::Number(n) => Some(*n),
            Literal::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            Literal::Number(_) => None,
        }
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Number(n)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// Read-only, index-addressed table of literals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralPool {
    slots: Vec<Literal>,
}

impl LiteralPool {
    pub fn new(slots: Vec<Literal>) -> Self {
        Self { slots }
    }

    pub fn get(&self, index: u8) -> Option<&Literal> {
        self.slots.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.slots.iter()
    }
}

impl<L: Into<Literal>> FromIterator<L> for LiteralPool {
    fn from_iter<I: IntoIterator<Item = L>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}
