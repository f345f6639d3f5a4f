//! Request body decoding.
//!
//! Follows the lenient rules of the service's existing clients: only the
//! first JSON value in the body is read, field names match regardless of
//! case, and `null` fields count as absent.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// The body was not a JSON object of the expected request shape.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed request body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request body is empty")]
    Empty,

    #[error("request body is not a JSON object")]
    NotAnObject,
}

/// Decodes the first JSON object in `body` into `T`.
///
/// Empty bodies, non-JSON input, non-object values and wrong field types all
/// fail. Anything after the first value is ignored.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    let first = serde_json::Deserializer::from_slice(body)
        .into_iter::<Value>()
        .next()
        .ok_or(DecodeError::Empty)??;

    let Value::Object(fields) = first else {
        return Err(DecodeError::NotAnObject);
    };

    let folded: Map<String, Value> = fields
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(name, value)| (name.to_lowercase(), value))
        .collect();

    Ok(serde_json::from_value(Value::Object(folded))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpireRequest, GetRequest, SetRequest};

    #[test]
    fn test_decode_get_request() {
        let req: GetRequest = decode(br#"{"Key":"a"}"#).unwrap();
        assert_eq!(req.key, "a");
    }

    #[test]
    fn test_decode_empty_body() {
        assert!(matches!(decode::<GetRequest>(b""), Err(DecodeError::Empty)));
        assert!(matches!(decode::<SetRequest>(b"  \n"), Err(DecodeError::Empty)));
        assert!(decode::<ExpireRequest>(b"").is_err());
    }

    #[test]
    fn test_decode_not_json() {
        assert!(decode::<GetRequest>(b"Key=a").is_err());
        assert!(decode::<SetRequest>(br#"{"Key":"a","Value":"#).is_err());
    }

    #[test]
    fn test_decode_non_object() {
        assert!(matches!(
            decode::<GetRequest>(br#"["a"]"#),
            Err(DecodeError::NotAnObject)
        ));
        assert!(matches!(
            decode::<GetRequest>(b"\"a\""),
            Err(DecodeError::NotAnObject)
        ));
    }

    #[test]
    fn test_decode_wrong_type() {
        assert!(decode::<ExpireRequest>(br#"{"Key":"a","Expiration":"30"}"#).is_err());
        assert!(decode::<ExpireRequest>(br#"{"Key":"a","Expiration":1.5}"#).is_err());
        assert!(decode::<GetRequest>(br#"{"Key":1}"#).is_err());
    }

    #[test]
    fn test_decode_ignores_trailing_data() {
        let req: GetRequest = decode(br#"{"Key":"a"} {"Key":"b"}"#).unwrap();
        assert_eq!(req.key, "a");

        let req: GetRequest = decode(br#"{"Key":"a"} garbage"#).unwrap();
        assert_eq!(req.key, "a");
    }

    #[test]
    fn test_decode_null_field_is_absent() {
        let req: SetRequest = decode(br#"{"Key":"a","Value":null}"#).unwrap();
        assert_eq!(req.value, "");
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let req: GetRequest = decode(br#"{"Key":"a","Extra":true}"#).unwrap();
        assert_eq!(req.key, "a");
    }
}
