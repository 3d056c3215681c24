//! Sort and projection specifications.

use std::fmt;

use serde::Serialize;
use strum::Display;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    /// Ascending (no marker).
    Asc,
    /// Descending (leading `-`).
    Desc,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortField {
    /// Field name without the direction marker.
    pub field: String,
    /// Sort direction.
    pub direction: SortDirection,
}

impl SortField {
    /// Parse `-price` / `price`.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_string(),
                direction: SortDirection::Desc,
            },
            None => Self {
                field: raw.to_string(),
                direction: SortDirection::Asc,
            },
        }
    }

    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Asc => write!(f, "{}", self.field),
            SortDirection::Desc => write!(f, "-{}", self.field),
        }
    }
}

/// Ordered sort keys. Displays as a space-joined list (`-price name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SortSpec(Vec<SortField>);

impl SortSpec {
    /// Parse a comma-separated list, skipping empty segments.
    pub fn parse(list: &str) -> Self {
        Self(split_list(list).map(SortField::parse).collect())
    }

    /// Sort keys in order.
    pub fn fields(&self) -> &[SortField] {
        &self.0
    }

    /// Whether there are no sort keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, self.0.iter())
    }
}

/// Field projection. Always an ordered list of tokens; the default list is
/// the single exclusion token `-__v`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Projection(Vec<String>);

impl Projection {
    /// Token excluding the internal version field.
    pub const EXCLUDE_VERSION: &'static str = "-__v";

    /// Parse a comma-separated list, skipping empty segments.
    pub fn parse(list: &str) -> Self {
        Self(split_list(list).map(str::to_string).collect())
    }

    /// Everything except the internal version field.
    pub fn exclude_version() -> Self {
        Self(vec![Self::EXCLUDE_VERSION.to_string()])
    }

    /// Field tokens in order.
    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, self.0.iter())
    }
}

/// Split a comma-separated list, trimming and skipping empty segments.
pub(crate) fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
