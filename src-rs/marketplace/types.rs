use serde::Serialize;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

#[derive(Clone, Debug, Default, Serialize)]
pub struct AppQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SubmissionQuery {
    pub app_id: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct TemplateQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub public_only: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SearchFilters {
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub min_rating: Option<f64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct RecommendQuery {
    pub based_on: Option<String>,
    pub limit: Option<u32>,
    pub exclude: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct PopularQuery {
    pub time_range: Option<String>,
    pub category: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub app_id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AdminAppQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Flattens a query struct into `(key, value)` pairs in field order.
/// Nulls, `false`, zero, empty strings and empty lists are skipped; lists are comma-joined.
pub fn query_pairs<T: Serialize>(query: &T) -> ClientResult<Vec<(String, String)>> {
    let value = serde_json::to_value(query).map_err(|e| ClientError::validation(e.to_string()))?;
    let map = match value {
        Value::Object(map) => map,
        _ => return Err(ClientError::validation("query must serialize to an object")),
    };
    let mut pairs = Vec::new();
    for (key, value) in map {
        let rendered = match value {
            Value::Null | Value::Bool(false) => continue,
            Value::Bool(true) => "true".to_string(),
            Value::Number(n) if n.as_f64() == Some(0.0) => continue,
            Value::Number(n) => n.to_string(),
            Value::String(s) if s.is_empty() => continue,
            Value::String(s) => s,
            Value::Array(items) if items.is_empty() => continue,
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => continue,
        };
        pairs.push((key, rendered));
    }
    Ok(pairs)
}

pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    let rounded = (size * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, UNITS[unit])
    }
}

pub fn validate_file_type(file_name: &str, allowed: &[&str]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let ext = match file_name.rsplit_once('.') {
        Some((_, ext)) => format!(".{}", ext.to_lowercase()),
        None => format!(".{}", file_name.to_lowercase()),
    };
    allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_skipped() {
        let q = AppQuery {
            category: Some("writing".to_string()),
            page: Some(2),
            ..Default::default()
        };
        assert_eq!(
            query_pairs(&q).unwrap(),
            vec![("category".to_string(), "writing".to_string()), ("page".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn lists_are_comma_joined() {
        let q = SearchFilters {
            tags: vec!["ai".to_string(), "docs".to_string()],
            min_rating: Some(4.5),
            ..Default::default()
        };
        assert_eq!(
            query_pairs(&q).unwrap(),
            vec![("tags".to_string(), "ai,docs".to_string()), ("min_rating".to_string(), "4.5".to_string())]
        );
        assert!(query_pairs(&RecommendQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn public_only_flag() {
        let q = TemplateQuery {
            public_only: Some(true),
            ..Default::default()
        };
        assert_eq!(query_pairs(&q).unwrap(), vec![("public_only".to_string(), "true".to_string())]);
    }

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024), "1 MB");
    }

    #[test]
    fn file_types() {
        assert!(validate_file_type("report.PDF", &[".pdf", ".docx"]));
        assert!(!validate_file_type("image.png", &[".pdf"]));
        assert!(validate_file_type("anything", &[]));
    }
}
