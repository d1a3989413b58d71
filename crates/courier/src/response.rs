//! Response body decoding.
//!
//! Each request declares a [`ResponseShape`]; the buffered body is decoded
//! into the matching [`ResponseData`] variant, passed through the response
//! interceptors, and finally converted into the caller's type via
//! [`FromResponse`].

use crate::error::RequestError;
use crate::transport::TransportResponse;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// How a response body should be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseShape {
    #[default]
    Json,
    Text,
    Blob,
    ArrayBuffer,
    FormData,
}

impl ResponseShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseShape::Json => "json",
            ResponseShape::Text => "text",
            ResponseShape::Blob => "blob",
            ResponseShape::ArrayBuffer => "arrayBuffer",
            ResponseShape::FormData => "formData",
        }
    }
}

impl fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ResponseShape::Json),
            "text" => Ok(ResponseShape::Text),
            "blob" => Ok(ResponseShape::Blob),
            "arrayBuffer" => Ok(ResponseShape::ArrayBuffer),
            "formData" => Ok(ResponseShape::FormData),
            other => Err(format!(
                "unknown response shape '{other}' (expected json, text, blob, arrayBuffer or formData)"
            )),
        }
    }
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    Json(Value),
    Text(String),
    Binary(Bytes),
    Form(Vec<(String, String)>),
}

impl ResponseData {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseData::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_json_mut(&mut self) -> Option<&mut Value> {
        match self {
            ResponseData::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(s) => Some(s),
            _ => None,
        }
    }

    /// JSON view of any variant, for display.
    pub fn to_json(&self) -> Value {
        match self {
            ResponseData::Json(v) => v.clone(),
            ResponseData::Text(s) => Value::String(s.clone()),
            ResponseData::Binary(b) => Value::Array(b.iter().map(|byte| Value::from(*byte)).collect()),
            ResponseData::Form(pairs) => Value::Object(
                pairs
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        }
    }
}

impl TransportResponse {
    /// Decode the body per the declared shape.
    pub fn decode(&self, shape: ResponseShape) -> Result<ResponseData, RequestError> {
        let decode_error = |message: String| RequestError::Decode {
            shape: shape.to_string(),
            message,
        };

        match shape {
            ResponseShape::Json => serde_json::from_slice(&self.body)
                .map(ResponseData::Json)
                .map_err(|e| decode_error(e.to_string())),
            ResponseShape::Text => String::from_utf8(self.body.to_vec())
                .map(ResponseData::Text)
                .map_err(|e| decode_error(e.to_string())),
            ResponseShape::Blob | ResponseShape::ArrayBuffer => {
                Ok(ResponseData::Binary(self.body.clone()))
            }
            ResponseShape::FormData => {
                let text = std::str::from_utf8(&self.body).map_err(|e| decode_error(e.to_string()))?;
                parse_form(text).map(ResponseData::Form).map_err(decode_error)
            }
        }
    }
}

fn parse_form(body: &str) -> Result<Vec<(String, String)>, String> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let decode = |s: &str| {
                urlencoding::decode(&s.replace('+', " "))
                    .map(|c| c.into_owned())
                    .map_err(|e| e.to_string())
            };
            Ok((decode(key)?, decode(value)?))
        })
        .collect()
}

/// Conversion from decoded response data into a caller type.
pub trait FromResponse: Sized {
    fn from_response(data: ResponseData) -> Result<Self, RequestError>;
}

impl FromResponse for ResponseData {
    fn from_response(data: ResponseData) -> Result<Self, RequestError> {
        Ok(data)
    }
}

impl FromResponse for Value {
    fn from_response(data: ResponseData) -> Result<Self, RequestError> {
        Ok(match data {
            ResponseData::Json(v) => v,
            other => other.to_json(),
        })
    }
}

impl FromResponse for String {
    fn from_response(data: ResponseData) -> Result<Self, RequestError> {
        match data {
            ResponseData::Text(s) => Ok(s),
            ResponseData::Json(Value::String(s)) => Ok(s),
            ResponseData::Json(v) => Ok(v.to_string()),
            ResponseData::Binary(b) => String::from_utf8(b.to_vec()).map_err(|e| RequestError::Decode {
                shape: "text".to_string(),
                message: e.to_string(),
            }),
            other => Ok(other.to_json().to_string()),
        }
    }
}

impl FromResponse for Bytes {
    fn from_response(data: ResponseData) -> Result<Self, RequestError> {
        Ok(match data {
            ResponseData::Binary(b) => b,
            ResponseData::Text(s) => Bytes::from(s),
            other => Bytes::from(other.to_json().to_string()),
        })
    }
}

/// Typed JSON response: `client.get::<Json<User>>(...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned> FromResponse for Json<T> {
    fn from_response(data: ResponseData) -> Result<Self, RequestError> {
        let value = Value::from_response(data)?;
        serde_json::from_value(value)
            .map(Json)
            .map_err(|e| RequestError::Decode {
                shape: ResponseShape::Json.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn test_shape_names() {
        for shape in [
            ResponseShape::Json,
            ResponseShape::Text,
            ResponseShape::Blob,
            ResponseShape::ArrayBuffer,
            ResponseShape::FormData,
        ] {
            assert_eq!(shape.as_str().parse::<ResponseShape>().unwrap(), shape);
        }
        assert!("xml".parse::<ResponseShape>().is_err());
    }

    #[test]
    fn test_decode_json() {
        let resp = TransportResponse::json(&json!({"value": 2}));
        assert_eq!(
            resp.decode(ResponseShape::Json).unwrap(),
            ResponseData::Json(json!({"value": 2}))
        );
    }

    #[test]
    fn test_decode_invalid_json() {
        let resp = TransportResponse::new(StatusCode::OK, "not json");
        let err = resp.decode(ResponseShape::Json).unwrap_err();
        assert!(matches!(err, RequestError::Decode { ref shape, .. } if shape == "json"));
    }

    #[test]
    fn test_decode_text_and_binary() {
        let resp = TransportResponse::new(StatusCode::OK, "hello");
        assert_eq!(
            resp.decode(ResponseShape::Text).unwrap(),
            ResponseData::Text("hello".into())
        );
        assert_eq!(
            resp.decode(ResponseShape::Blob).unwrap(),
            ResponseData::Binary(Bytes::from_static(b"hello"))
        );
    }

    #[test]
    fn test_decode_form() {
        let resp = TransportResponse::new(StatusCode::OK, "a=1&b=hello+world&c=%26");
        assert_eq!(
            resp.decode(ResponseShape::FormData).unwrap(),
            ResponseData::Form(vec![
                ("a".into(), "1".into()),
                ("b".into(), "hello world".into()),
                ("c".into(), "&".into()),
            ])
        );
    }

    #[test]
    fn test_typed_json() {
        #[derive(Deserialize)]
        struct Item {
            value: i64,
        }
        let Json(item) = Json::<Item>::from_response(ResponseData::Json(json!({"value": 4}))).unwrap();
        assert_eq!(item.value, 4);

        let err = Json::<Item>::from_response(ResponseData::Json(json!({"other": 1})));
        assert!(matches!(err, Err(RequestError::Decode { .. })));
    }

    #[test]
    fn test_string_from_json_string() {
        let s = String::from_response(ResponseData::Json(json!("plain"))).unwrap();
        assert_eq!(s, "plain");
    }
}
