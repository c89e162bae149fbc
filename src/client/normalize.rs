//! Upstream bodies come back either bare or wrapped in an envelope.
//!
//! Contract of [`unwrap_envelope`]: a JSON object with a `data` key yields
//! that value; otherwise an object with a `user` key yields that value;
//! anything else is returned unchanged. Nothing past this module looks at
//! response shapes.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ServiceError;

pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) => {
            if let Some(inner) = map.remove("data") {
                inner
            } else if let Some(inner) = map.remove("user") {
                inner
            } else {
                Value::Object(map)
            }
        }
        other => other,
    }
}

pub fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ServiceError> {
    serde_json::from_value(unwrap_envelope(body)).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
}
