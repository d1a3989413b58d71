//! URL template interpolation and query string serialization.
//!
//! Templates use `:name` placeholders:
//!
//! ```
//! use courier::template::interpolate;
//! use serde_json::json;
//!
//! let params = json!({"id": 5, "name": "x"}).as_object().cloned().unwrap();
//! let out = interpolate("/user/:id", params);
//! assert_eq!(out.url, "/user/5");
//! assert_eq!(out.residual.get("name"), Some(&json!("x")));
//! ```
//!
//! Keys that name a placeholder are consumed; everything else is returned as
//! residual parameters, which end up in the query string (GET) or the body.

use crate::error::RequestError;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;

/// Insertion-ordered parameter bag.
pub type Params = serde_json::Map<String, Value>;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r":(\w+)").unwrap())
}

/// Result of [`interpolate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolated {
    pub url: String,
    pub residual: Params,
}

/// Substitute `:name` placeholders in `url` from `params`.
///
/// Keys are visited in insertion order. A key naming a placeholder fills the
/// first occurrence of that placeholder not yet filled and is dropped from
/// the residual bag. Placeholders without a key stay in the URL verbatim.
/// Values are not escaped.
pub fn interpolate(url: &str, params: Params) -> Interpolated {
    let regex = placeholder_regex();

    // (range, name, substituted value)
    let mut slots: Vec<(std::ops::Range<usize>, &str, Option<String>)> = regex
        .captures_iter(url)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some((whole.range(), name.as_str(), None))
        })
        .collect();

    if slots.is_empty() {
        return Interpolated {
            url: url.to_string(),
            residual: params,
        };
    }

    let mut residual = Params::new();
    for (key, value) in params {
        if !slots.iter().any(|(_, name, _)| *name == key) {
            residual.insert(key, value);
            continue;
        }
        if let Some(slot) = slots
            .iter_mut()
            .find(|(_, name, filled)| *name == key && filled.is_none())
        {
            slot.2 = Some(param_to_string(&value));
        }
    }

    let mut resolved = String::with_capacity(url.len());
    let mut cursor = 0;
    for (range, _, filled) in &slots {
        if let Some(value) = filled {
            resolved.push_str(&url[cursor..range.start]);
            resolved.push_str(value);
            cursor = range.end;
        }
    }
    resolved.push_str(&url[cursor..]);

    Interpolated {
        url: resolved,
        residual,
    }
}

/// String form of a parameter value: strings verbatim, anything else as JSON.
pub fn param_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Serialize params as `application/x-www-form-urlencoded` pairs.
pub fn to_query_string(params: &Params) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(&param_to_string(value))
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Append params to `url` as a query string. Empty params leave `url` as is.
pub fn append_query(url: &str, params: &Params) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{}", to_query_string(params))
}

/// Convert caller parameters into a [`Params`] bag.
///
/// `null` (e.g. `()` or `None`) becomes an empty bag; anything other than an
/// object is rejected.
pub fn to_params<P: Serialize + ?Sized>(params: &P) -> Result<Params, RequestError> {
    match serde_json::to_value(params).map_err(|e| RequestError::Encode(e.to_string()))? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Params::new()),
        other => Err(RequestError::Encode(format!(
            "parameters must serialize to an object, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_interpolate_consumes_matched_key() {
        let out = interpolate("/user/:id", params(json!({"id": 5, "name": "x"})));
        assert_eq!(out.url, "/user/5");
        assert_eq!(out.residual, params(json!({"name": "x"})));
    }

    #[test]
    fn test_unmatched_placeholder_stays_literal() {
        let out = interpolate("/user/:id", params(json!({"name": "x"})));
        assert_eq!(out.url, "/user/:id");
        assert_eq!(out.residual, params(json!({"name": "x"})));
    }

    #[test]
    fn test_no_placeholders_returns_everything() {
        let input = params(json!({"a": 1, "b": [1, 2]}));
        let out = interpolate("/items", input.clone());
        assert_eq!(out.url, "/items");
        assert_eq!(out.residual, input);
    }

    #[test]
    fn test_multiple_placeholders() {
        let out = interpolate(
            "/users/:user_id/posts/:post_id",
            params(json!({"post_id": "p9", "user_id": 3, "draft": true})),
        );
        assert_eq!(out.url, "/users/3/posts/p9");
        assert_eq!(out.residual, params(json!({"draft": true})));
    }

    #[test]
    fn test_placeholder_prefix_is_not_confused() {
        let out = interpolate("/a/:idx/:id", params(json!({"id": 1, "idx": 2})));
        assert_eq!(out.url, "/a/2/1");
        assert!(out.residual.is_empty());
    }

    #[test]
    fn test_repeated_placeholder_fills_first_occurrence() {
        let out = interpolate("/:id/copy/:id", params(json!({"id": 7})));
        assert_eq!(out.url, "/7/copy/:id");
    }

    #[test]
    fn test_values_are_not_escaped_or_rescanned() {
        let out = interpolate("/f/:a/:b", params(json!({"a": ":b x", "b": "y"})));
        assert_eq!(out.url, "/f/:b x/y");
    }

    #[test]
    fn test_port_in_base_url_is_untouched() {
        let out = interpolate("http://localhost:8080/u/:id", params(json!({"id": 1})));
        assert_eq!(out.url, "http://localhost:8080/u/1");
    }

    #[test]
    fn test_param_coercion() {
        assert_eq!(param_to_string(&json!("s")), "s");
        assert_eq!(param_to_string(&json!(1.5)), "1.5");
        assert_eq!(param_to_string(&json!(null)), "null");
        assert_eq!(param_to_string(&json!(false)), "false");
    }

    #[test]
    fn test_query_string_escapes() {
        let q = to_query_string(&params(json!({"name": "foo bar", "q": "a&b=c"})));
        assert_eq!(q, "name=foo%20bar&q=a%26b%3Dc");
    }

    #[test]
    fn test_append_query() {
        let p = params(json!({"name": "foo"}));
        assert_eq!(append_query("/items", &p), "/items?name=foo");
        assert_eq!(append_query("/items?x=1", &p), "/items?x=1&name=foo");
        assert_eq!(append_query("/items", &Params::new()), "/items");
    }

    #[test]
    fn test_to_params() {
        #[derive(Serialize)]
        struct Query {
            page: u32,
        }
        assert_eq!(to_params(&Query { page: 2 }).unwrap(), params(json!({"page": 2})));
        assert!(to_params(&()).unwrap().is_empty());
        assert!(matches!(to_params(&[1, 2]), Err(RequestError::Encode(_))));
    }
}
