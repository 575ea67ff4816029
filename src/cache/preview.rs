// file: src/cache/preview.rs
// description: preview generation and pagination for cached values
// reference: sample, truncate and paginate strategies over json values

use crate::error::{RefServeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a large value is reduced to a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewStrategy {
    /// Keep leading items/fields that fit the size budget.
    Sample,
    /// Serialize and cut at the size budget.
    Truncate,
    /// Slice collections into fixed pages.
    Paginate,
}

impl PreviewStrategy {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "sample" => Ok(PreviewStrategy::Sample),
            "truncate" => Ok(PreviewStrategy::Truncate),
            "paginate" => Ok(PreviewStrategy::Paginate),
            other => Err(RefServeError::Validation(format!(
                "Unknown preview strategy: {}",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewStrategy::Sample => "sample",
            PreviewStrategy::Truncate => "truncate",
            PreviewStrategy::Paginate => "paginate",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PreviewConfig {
    /// Size budget in approximate tokens.
    pub max_size: usize,
    pub default_strategy: PreviewStrategy,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_size: 64,
            default_strategy: PreviewStrategy::Sample,
        }
    }
}

/// A generated preview plus its measured size.
#[derive(Debug, Clone)]
pub struct Preview {
    pub value: Value,
    pub strategy: PreviewStrategy,
    pub size: usize,
}

/// One page of a paginated collection.
#[derive(Debug, Clone)]
pub struct Page {
    pub value: Value,
    pub page: usize,
    pub total_pages: usize,
}

const CHARS_PER_TOKEN: usize = 4;

/// Approximate token count of a value's serialized form.
pub fn estimate_size(value: &Value) -> usize {
    let serialized = value.to_string();
    serialized.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Number of addressable items in a value (1 for scalars).
pub fn item_count(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => 1,
    }
}

/// Whether a value fits the size budget without reduction.
pub fn fits(value: &Value, max_size: usize) -> bool {
    estimate_size(value) <= max_size
}

/// Reduce a value to a preview honoring the size budget.
pub fn build_preview(value: &Value, strategy: PreviewStrategy, max_size: usize) -> Preview {
    if fits(value, max_size) {
        return Preview {
            value: value.clone(),
            strategy,
            size: estimate_size(value),
        };
    }

    let reduced = match (strategy, value) {
        (PreviewStrategy::Truncate, _) => truncate_value(value, max_size),
        (PreviewStrategy::Sample | PreviewStrategy::Paginate, Value::Array(items)) => {
            sample_array(items, max_size)
        }
        (PreviewStrategy::Sample | PreviewStrategy::Paginate, Value::Object(map)) => {
            sample_object(map, max_size)
        }
        // Scalars have no structure to sample; fall back to truncation.
        (_, other) => truncate_value(other, max_size),
    };

    let size = estimate_size(&reduced);
    Preview {
        value: reduced,
        strategy,
        size,
    }
}

/// Extract one page of a collection. Pages are 1-indexed.
pub fn paginate(value: &Value, page: usize, page_size: usize) -> Result<Page> {
    if page == 0 {
        return Err(RefServeError::Validation(
            "page must be 1 or greater".to_string(),
        ));
    }
    if page_size == 0 {
        return Err(RefServeError::Validation(
            "page_size must be 1 or greater".to_string(),
        ));
    }

    let items: Vec<Value> = match value {
        Value::Array(items) => items.clone(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| serde_json::json!({ "key": k, "value": v }))
            .collect(),
        scalar => vec![scalar.clone()],
    };

    let total_pages = items.len().div_ceil(page_size).max(1);
    if page > total_pages {
        return Err(RefServeError::Validation(format!(
            "page {} out of range (total pages: {})",
            page, total_pages
        )));
    }

    let start = (page - 1) * page_size;
    let slice: Vec<Value> = items.into_iter().skip(start).take(page_size).collect();

    Ok(Page {
        value: Value::Array(slice),
        page,
        total_pages,
    })
}

fn sample_array(items: &[Value], max_size: usize) -> Value {
    let mut kept: Vec<Value> = Vec::new();
    let mut used = 0usize;

    for item in items {
        let cost = estimate_size(item);
        if !kept.is_empty() && used + cost > max_size {
            break;
        }
        used += cost;
        kept.push(item.clone());
        if used >= max_size {
            break;
        }
    }

    Value::Array(kept)
}

fn sample_object(map: &serde_json::Map<String, Value>, max_size: usize) -> Value {
    let mut kept = serde_json::Map::new();
    let mut used = 0usize;

    for (key, item) in map {
        let cost = estimate_size(item) + key.chars().count().div_ceil(CHARS_PER_TOKEN);
        if !kept.is_empty() && used + cost > max_size {
            break;
        }
        used += cost;
        kept.insert(key.clone(), item.clone());
        if used >= max_size {
            break;
        }
    }

    Value::Object(kept)
}

fn truncate_value(value: &Value, max_size: usize) -> Value {
    let serialized = value.to_string();
    let budget = max_size * CHARS_PER_TOKEN;
    let cut: String = serialized.chars().take(budget).collect();
    Value::String(format!("{}...", cut))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn items(n: usize) -> Value {
        json!(
            (0..n)
                .map(|i| json!({ "id": i, "name": format!("item_{}", i) }))
                .collect::<Vec<_>>()
        )
    }

    #[test]
    fn test_small_value_passes_through() {
        let value = json!({ "message": "hi" });
        let preview = build_preview(&value, PreviewStrategy::Sample, 64);
        assert_eq!(preview.value, value);
    }

    #[test]
    fn test_sample_keeps_leading_items_within_budget() {
        let value = items(500);
        let preview = build_preview(&value, PreviewStrategy::Sample, 32);

        let sampled = preview.value.as_array().unwrap();
        assert!(!sampled.is_empty());
        assert!(sampled.len() < 500);
        assert_eq!(sampled[0]["id"], json!(0));
        assert!(preview.size <= 40); // one item of slack past the budget
    }

    #[test]
    fn test_truncate_cuts_serialized_form() {
        let value = items(500);
        let preview = build_preview(&value, PreviewStrategy::Truncate, 16);

        let text = preview.value.as_str().unwrap();
        assert!(text.ends_with("..."));
        assert!(text.chars().count() <= 16 * 4 + 3);
    }

    #[test]
    fn test_paginate_slices_and_counts_pages() {
        let value = items(45);
        let page = paginate(&value, 2, 20).unwrap();

        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
        let slice = page.value.as_array().unwrap();
        assert_eq!(slice.len(), 20);
        assert_eq!(slice[0]["id"], json!(20));
    }

    #[test]
    fn test_paginate_last_page_is_short() {
        let value = items(45);
        let page = paginate(&value, 3, 20).unwrap();
        assert_eq!(page.value.as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_paginate_rejects_out_of_range() {
        let value = items(10);
        assert!(paginate(&value, 0, 5).is_err());
        assert!(paginate(&value, 4, 5).is_err());
        assert!(paginate(&value, 1, 0).is_err());
    }

    #[test]
    fn test_paginate_object_as_key_value_pairs() {
        let value = json!({ "a": 1, "b": 2, "c": 3 });
        let page = paginate(&value, 1, 2).unwrap();

        assert_eq!(page.total_pages, 2);
        let slice = page.value.as_array().unwrap();
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[0]["key"], json!("a"));
    }

    #[test]
    fn test_strategy_parse_round_trip() {
        for name in ["sample", "truncate", "paginate"] {
            assert_eq!(PreviewStrategy::parse(name).unwrap().as_str(), name);
        }
        assert!(PreviewStrategy::parse("summarize").is_err());
    }

    #[test]
    fn test_estimate_size_scales_with_content() {
        let small = json!("hi");
        let large = json!("a very long string that costs considerably more tokens");
        assert!(estimate_size(&large) > estimate_size(&small));
    }
}
