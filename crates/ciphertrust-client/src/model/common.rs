// Common model types shared across endpoints

use serde::{Deserialize, Serialize};

/// Paged listing returned by every collection endpoint
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Page<T> {
    pub skip: i64,
    pub limit: i64,
    pub total: i64,
    pub resources: Vec<T>,
}

/// Query parameters accepted by most listing endpoints
#[derive(Clone, Debug, Default, Serialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ListQuery {
    pub fn named(name: Option<&str>, limit: i64) -> Self {
        Self {
            skip: None,
            limit: Some(limit),
            name: name.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_tolerates_missing_fields() {
        let page: Page<serde_json::Value> =
            serde_json::from_value(json!({"total": 2, "resources": [{"a": 1}, {"a": 2}]}))
                .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.skip, 0);
        assert_eq!(page.resources.len(), 2);
    }
}
