//! Comparison operators recognized in filter keys.

use once_cell::sync::Lazy;
use regex::Regex;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Matches a flat bracket key such as `price[gte]` or `tags[$in]`.
static BRACKET_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<field>.+)\[(?P<op>\$?[A-Za-z]+)\]$").expect("valid regex"));

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Operator {
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Member of a list.
    In,
    /// Not a member of a list.
    Nin,
}

impl Operator {
    /// Storage-engine token, e.g. `$gte`.
    pub fn token(&self) -> String {
        format!("${}", self.as_ref())
    }

    /// Whether the operand is a comma-separated list.
    pub fn takes_list(&self) -> bool {
        matches!(self, Operator::In | Operator::Nin)
    }

    /// Parse a bare keyword (`gte`) or an already-prefixed token (`$gte`).
    pub fn parse_token(s: &str) -> Option<Self> {
        s.strip_prefix('$').unwrap_or(s).parse().ok()
    }
}

/// Rewrite a single object key into its storage form.
///
/// Bare operator keywords become `$`-prefixed tokens and flat bracket keys
/// have their operator segment rewritten (`price[gte]` → `price[$gte]`).
/// Anything else is returned unchanged.
pub fn rewrite_key(key: &str) -> String {
    if let Ok(op) = key.parse::<Operator>() {
        return op.token();
    }

    if let Some(caps) = BRACKET_KEY.captures(key) {
        if let Ok(op) = caps["op"].parse::<Operator>() {
            return format!("{}[{}]", &caps["field"], op.token());
        }
    }

    key.to_string()
}

/// Operator named by a key that has already been rewritten, if any.
pub fn key_operator(key: &str) -> Option<Operator> {
    if key.starts_with('$') {
        return Operator::parse_token(key);
    }

    BRACKET_KEY
        .captures(key)
        .and_then(|caps| caps["op"].strip_prefix('$').and_then(|op| op.parse().ok()))
}
