//! Validated SQL identifiers.
//!
//! Table names end up spliced into statement text (bind parameters cannot stand in
//! for identifiers), so they are restricted to plain lowercase identifiers with an
//! optional schema qualifier.

use std::fmt;

use crate::errors::{EtlError, EtlResult};

/// A table name safe to interpolate into SQL, e.g. `orders` or `sales.orders`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    /// Validates `raw` as `[a-z_][a-z0-9_]*`, optionally dotted into schema and table.
    pub fn parse(raw: &str) -> EtlResult<Self> {
        let parts: Vec<&str> = raw.split('.').collect();
        if parts.len() > 2 || !parts.iter().all(|p| is_identifier(p)) {
            return Err(EtlError::InvalidTableName(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// The validated name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_lowercase() => {}
        _ => return false,
    }
    s.len() <= 63 && chars.all(|c| c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit())
}
