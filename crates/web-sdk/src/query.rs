//! URL query-string (de)serialization for filter state.

use std::fmt;

use indexmap::IndexMap;
use url::form_urlencoded;

/// Parsed query parameters. Keys are unique; iteration follows the order
/// in which keys first appeared.
pub type QueryParams = IndexMap<String, String>;

/// A single value handed to [`build_query_string`]. `Null` entries are
/// skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Null => Ok(()),
            QueryValue::Bool(b) => write!(f, "{b}"),
            QueryValue::Int(n) => write!(f, "{n}"),
            QueryValue::Float(x) => write!(f, "{x}"),
            QueryValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::Text(value.clone())
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::Null, Into::into)
    }
}

/// Parse `key=value&...`, with or without a leading `?`. Percent-escapes
/// and `+` are decoded; a repeated key keeps its last value.
pub fn parse_query_params(query: &str) -> QueryParams {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut params = QueryParams::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        params.insert(key.into_owned(), value.into_owned());
    }
    params
}

/// Serialize pairs in the given order, skipping `Null` values. Returns an
/// empty string when nothing remains.
pub fn build_query_string<K, V, I>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<QueryValue>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        let value = value.into();
        if value == QueryValue::Null {
            continue;
        }
        serializer.append_pair(key.as_ref(), &value.to_string());
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_params() {
        let params = parse_query_params("?page=1&size=10&active=true");
        assert_eq!(params.len(), 3);
        assert_eq!(params["page"], "1");
        assert_eq!(params["size"], "10");
        assert_eq!(params["active"], "true");
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_query_params("").is_empty());
        assert!(parse_query_params("?").is_empty());
    }

    #[test]
    fn test_parse_repeated_key_keeps_last() {
        let params = parse_query_params("tag=a&tag=b&tag=c");
        assert_eq!(params.len(), 1);
        assert_eq!(params["tag"], "c");
    }

    #[test]
    fn test_parse_decodes_escapes() {
        let params = parse_query_params("q=spring+sale&name=caf%C3%A9");
        assert_eq!(params["q"], "spring sale");
        assert_eq!(params["name"], "café");
    }

    #[test]
    fn test_build_query_string() {
        let query = build_query_string([
            ("page", QueryValue::from(1)),
            ("size", QueryValue::from(10)),
            ("active", QueryValue::from(true)),
        ]);
        assert_eq!(query, "page=1&size=10&active=true");
    }

    #[test]
    fn test_build_skips_missing_values() {
        let query = build_query_string([("q", Some("shoes")), ("channel", None)]);
        assert_eq!(query, "q=shoes");
        assert_eq!(build_query_string(Vec::<(&str, QueryValue)>::new()), "");
    }

    #[test]
    fn test_round_trip() {
        let mut params = QueryParams::new();
        params.insert("search".to_string(), "black friday & more".to_string());
        params.insert("page".to_string(), "3".to_string());
        params.insert("ratio".to_string(), "0.25".to_string());
        params.insert("empty".to_string(), String::new());

        let query = build_query_string(&params);
        assert_eq!(parse_query_params(&query), params);
    }
}
