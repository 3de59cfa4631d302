//! Operations exposed to the HTTP layer.
//!
//! Each mutating operation runs as one database transaction: the permission
//! checks, the locked read of current state, the version bump and the ledger
//! append commit or roll back together.

use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};

pub mod bids;
pub mod directory;
pub mod tenders;

pub const NAME_MAX_LEN: usize = 100;
pub const SERVICE_TYPE_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 1000;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }

    /// Pages are zero-based.
    pub fn offset(&self) -> i64 {
        self.page.unwrap_or(0).max(0).saturating_mul(self.limit())
    }
}

pub(crate) fn required_text(field: &str, value: &str, max_len: usize) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max_len {
        return Err(ServiceError::validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn optional_text(
    field: &str,
    value: Option<String>,
    max_len: usize,
) -> ServiceResult<Option<String>> {
    match value {
        Some(text) if text.chars().count() > max_len => Err(ServiceError::validation(format!(
            "{field} must be at most {max_len} characters"
        ))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_caps() {
        let default = Pagination::default();
        assert_eq!(default.limit(), 10);
        assert_eq!(default.offset(), 0);

        let capped = Pagination {
            page: Some(2),
            limit: Some(500),
        };
        assert_eq!(capped.limit(), 100);
        assert_eq!(capped.offset(), 200);

        let negative = Pagination {
            page: Some(-3),
            limit: Some(0),
        };
        assert_eq!(negative.limit(), 1);
        assert_eq!(negative.offset(), 0);

        let huge = Pagination {
            page: Some(i64::MAX),
            limit: Some(10),
        };
        assert_eq!(huge.offset(), i64::MAX);
    }

    #[test]
    fn required_text_trims_and_bounds() {
        assert_eq!(required_text("name", "  Road  ", 100).unwrap(), "Road");
        assert!(matches!(
            required_text("name", "   ", 100),
            Err(ServiceError::Validation(_))
        ));
        let long = "x".repeat(101);
        assert!(matches!(
            required_text("name", &long, 100),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn optional_text_passes_absent_values() {
        assert_eq!(optional_text("description", None, 10).unwrap(), None);
        assert!(optional_text("description", Some("y".repeat(11)), 10).is_err());
    }
}
