//! Semantic labels attached to children of a node.

use std::fmt;
use std::str::FromStr;

/// Name of the role a child plays inside its parent.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum FieldName {
    Keyword,
    Value,
    Condition,
    Modifier,
    Route,
    Body,
    Variable,
    Name,
    Key,
    Status,
    Level,
}

impl FieldName {
    pub const ALL: [Self; 11] = [
        Self::Keyword,
        Self::Value,
        Self::Condition,
        Self::Modifier,
        Self::Route,
        Self::Body,
        Self::Variable,
        Self::Name,
        Self::Key,
        Self::Status,
        Self::Level,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Value => "value",
            Self::Condition => "condition",
            Self::Modifier => "modifier",
            Self::Route => "route",
            Self::Body => "body",
            Self::Variable => "variable",
            Self::Name => "name",
            Self::Key => "key",
            Self::Status => "status",
            Self::Level => "level",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field name `{}`", self.0)
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for FieldName {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_owned()))
    }
}
