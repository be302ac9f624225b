//! Column whitelist for client-supplied field names.

use std::collections::BTreeSet;

use crate::error::{DomainError, DomainResult};

/// Closed set of column names a client may filter or sort on.
///
/// Built once at startup from the resource's schema and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnWhitelist {
    columns: BTreeSet<String>,
    primary_key: String,
}

impl ColumnWhitelist {
    /// Build a whitelist; the primary key must be one of the columns.
    pub fn new<I, S>(columns: I, primary_key: &str) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: BTreeSet<String> = columns.into_iter().map(Into::into).collect();

        if !columns.contains(primary_key) {
            return Err(DomainError::UnknownPrimaryKey(primary_key.to_string()));
        }

        Ok(Self {
            columns,
            primary_key: primary_key.to_string(),
        })
    }

    pub fn contains(&self, field: &str) -> bool {
        self.columns.contains(field)
    }

    /// Column used for default ordering, tiebreaks and cursors
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_only_listed_columns() {
        let whitelist = ColumnWhitelist::new(["id", "email"], "id").unwrap();

        assert!(whitelist.contains("id"));
        assert!(whitelist.contains("email"));
        assert!(!whitelist.contains("Email"));
        assert!(!whitelist.contains("email; DROP TABLE users"));
        assert_eq!(whitelist.len(), 2);
        assert_eq!(whitelist.primary_key(), "id");
    }

    #[test]
    fn test_primary_key_must_be_whitelisted() {
        let result = ColumnWhitelist::new(["email"], "id");
        assert_eq!(result, Err(DomainError::UnknownPrimaryKey("id".to_string())));
    }

    #[test]
    fn test_iter_is_sorted() {
        let whitelist = ColumnWhitelist::new(["updated_at", "id", "email"], "id").unwrap();
        let columns: Vec<&str> = whitelist.iter().collect();
        assert_eq!(columns, vec!["email", "id", "updated_at"]);
    }
}
