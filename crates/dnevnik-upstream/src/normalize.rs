//! Shape normalization for upstream payloads.

use serde_json::{Map, Value};

use crate::classify::RawUpstreamError;
use crate::resource::Resource;

/// Fields lifted out of the contingent record next to `additionalInfo`.
const CONTINGENT_NAME_FIELDS: [&str; 2] = ["firstName", "lastName"];

/// Normalize a successful upstream payload for `resource`.
///
/// Only the contingent record is reshaped; other documents pass through.
pub fn normalize(resource: &Resource, payload: Value) -> Result<Value, RawUpstreamError> {
    match resource {
        Resource::Contingent => flatten_contingent(payload),
        _ => Ok(payload),
    }
}

/// Flatten a contingent record into `{ ...additionalInfo, firstName, lastName }`.
///
/// Name fields win over same-named keys inside `additionalInfo`.
pub fn flatten_contingent(payload: Value) -> Result<Value, RawUpstreamError> {
    let Value::Object(mut record) = payload else {
        return Err(RawUpstreamError::Decode(
            "contingent record is not an object".to_string(),
        ));
    };

    let mut flat = match record.remove("additionalInfo") {
        Some(Value::Object(info)) => info,
        None | Some(Value::Null) => Map::new(),
        Some(_) => {
            return Err(RawUpstreamError::Decode(
                "additionalInfo is not an object".to_string(),
            ));
        }
    };

    for field in CONTINGENT_NAME_FIELDS {
        let value = record
            .remove(field)
            .filter(Value::is_string)
            .ok_or_else(|| RawUpstreamError::Decode(format!("contingent record lacks {}", field)))?;
        flat.insert(field.to_string(), value);
    }

    Ok(Value::Object(flat))
}
