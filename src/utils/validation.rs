// file: src/utils/validation.rs
// description: input validation for tool arguments and scaffold options
// reference: bounds mirror the declared tool schemas

use crate::error::{RefServeError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z][a-z0-9_-]*$").expect("invalid slug regex");
}

pub const MAX_ITEM_COUNT: usize = 10_000;
pub const MAX_SECRET_NAME_LEN: usize = 100;
pub const MAX_PAGE_SIZE: usize = 100;

pub struct Validator;

impl Validator {
    /// `generate_items` count bound: 1..=10000.
    pub fn validate_item_count(count: usize) -> Result<()> {
        if count == 0 || count > MAX_ITEM_COUNT {
            return Err(RefServeError::Validation(format!(
                "count must be between 1 and {}, got {}",
                MAX_ITEM_COUNT, count
            )));
        }
        Ok(())
    }

    /// Secret name bound: 1..=100 characters.
    pub fn validate_secret_name(name: &str) -> Result<()> {
        let len = name.chars().count();
        if len == 0 {
            return Err(RefServeError::Validation(
                "secret name must not be empty".to_string(),
            ));
        }
        if len > MAX_SECRET_NAME_LEN {
            return Err(RefServeError::Validation(format!(
                "secret name must be at most {} characters, got {}",
                MAX_SECRET_NAME_LEN, len
            )));
        }
        Ok(())
    }

    /// Pagination: page is 1-indexed, page_size capped at 100,
    /// max_size must be positive when given.
    pub fn validate_cache_query(
        page: Option<usize>,
        page_size: Option<usize>,
        max_size: Option<usize>,
    ) -> Result<()> {
        if let Some(page) = page
            && page == 0
        {
            return Err(RefServeError::Validation(
                "page must be 1 or greater".to_string(),
            ));
        }

        if let Some(size) = page_size {
            if size == 0 {
                return Err(RefServeError::Validation(
                    "page_size must be 1 or greater".to_string(),
                ));
            }
            if size > MAX_PAGE_SIZE {
                return Err(RefServeError::Validation(format!(
                    "page_size must be at most {}, got {}",
                    MAX_PAGE_SIZE, size
                )));
            }
        }

        if let Some(size) = max_size
            && size == 0
        {
            return Err(RefServeError::Validation(
                "max_size must be 1 or greater".to_string(),
            ));
        }

        Ok(())
    }

    pub fn validate_ref_id(ref_id: &str) -> Result<()> {
        if ref_id.trim().is_empty() {
            return Err(RefServeError::Validation(
                "ref_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Generated project slugs: lowercase, digits, `_`/`-`, letter first.
    pub fn validate_project_slug(slug: &str) -> Result<()> {
        if !SLUG_RE.is_match(slug) {
            return Err(RefServeError::Validation(format!(
                "invalid project slug '{}' (expected lowercase letters, digits, '_' or '-', starting with a letter)",
                slug
            )));
        }
        Ok(())
    }

    pub fn validate_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(RefServeError::Validation(format!(
                "Directory does not exist: {}",
                path.display()
            )));
        }

        if !path.is_dir() {
            return Err(RefServeError::Validation(format!(
                "Path is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }

    pub fn truncate_text(text: &str, max_length: usize) -> String {
        if text.chars().count() <= max_length {
            text.to_string()
        } else {
            let cut: String = text.chars().take(max_length).collect();
            format!("{}...", cut)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_count_bounds() {
        assert!(Validator::validate_item_count(1).is_ok());
        assert!(Validator::validate_item_count(10_000).is_ok());
        assert!(Validator::validate_item_count(0).is_err());
        assert!(Validator::validate_item_count(10_001).is_err());
    }

    #[test]
    fn test_validate_secret_name_bounds() {
        assert!(Validator::validate_secret_name("api_key_hash").is_ok());
        assert!(Validator::validate_secret_name(&"a".repeat(100)).is_ok());
        assert!(Validator::validate_secret_name("").is_err());
        assert!(Validator::validate_secret_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_cache_query_bounds() {
        assert!(Validator::validate_cache_query(Some(1), Some(100), Some(16)).is_ok());
        assert!(Validator::validate_cache_query(None, None, None).is_ok());
        assert!(Validator::validate_cache_query(Some(0), None, None).is_err());
        assert!(Validator::validate_cache_query(None, Some(0), None).is_err());
        assert!(Validator::validate_cache_query(None, Some(101), None).is_err());
        assert!(Validator::validate_cache_query(None, None, Some(0)).is_err());
    }

    #[test]
    fn test_validate_ref_id() {
        assert!(Validator::validate_ref_id("ref-abc123").is_ok());
        assert!(Validator::validate_ref_id("").is_err());
        assert!(Validator::validate_ref_id("   ").is_err());
    }

    #[test]
    fn test_validate_project_slug() {
        assert!(Validator::validate_project_slug("my-server").is_ok());
        assert!(Validator::validate_project_slug("srv_01").is_ok());
        assert!(Validator::validate_project_slug("My-Server").is_err());
        assert!(Validator::validate_project_slug("1server").is_err());
        assert!(Validator::validate_project_slug("").is_err());
        assert!(Validator::validate_project_slug("bad name").is_err());
    }

    #[test]
    fn test_validate_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(Validator::validate_directory(temp.path()).is_ok());
        assert!(Validator::validate_directory(Path::new("/nonexistent")).is_err());
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(
            Validator::truncate_text("this is a very long text", 10),
            "this is a ..."
        );
    }
}
