// src/validator.rs
use serde_json::Value;

use crate::errors::{MalformedResponse, Result};
use crate::models::HomeworkRecord;

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Checks the payload shape and returns the homework records, most recent first.
///
/// The checks run in a fixed order: the payload is an object, it carries a
/// `homeworks` key, and that key holds an array of objects.
pub fn check_response(response: &Value) -> Result<Vec<HomeworkRecord>> {
    let map = response.as_object().ok_or(MalformedResponse::NotAMapping {
        found: type_name(response),
    })?;

    let homeworks = map
        .get("homeworks")
        .ok_or(MalformedResponse::MissingKey("homeworks"))?;

    let items = homeworks
        .as_array()
        .ok_or_else(|| MalformedResponse::WrongValueType {
            key: "homeworks".to_string(),
            expected: "an array",
            found: type_name(homeworks),
        })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| -> Result<HomeworkRecord> {
            if !item.is_object() {
                return Err(MalformedResponse::WrongValueType {
                    key: format!("homeworks[{}]", i),
                    expected: "an object",
                    found: type_name(item),
                }
                .into());
            }
            // Name and status are optional strings; anything else is a shape error.
            serde_json::from_value::<HomeworkRecord>(item.clone()).map_err(|_| {
                MalformedResponse::WrongValueType {
                    key: format!("homeworks[{}]", i),
                    expected: "an object with string fields",
                    found: "mistyped fields",
                }
                .into()
            })
        })
        .collect()
}

/// Extracts the server-reported `current_date` used as the next cursor.
pub fn server_cursor(response: &Value) -> Result<i64> {
    let map = response.as_object().ok_or(MalformedResponse::NotAMapping {
        found: type_name(response),
    })?;

    let value = map
        .get("current_date")
        .ok_or(MalformedResponse::MissingKey("current_date"))?;

    value.as_i64().ok_or_else(|| {
        MalformedResponse::WrongValueType {
            key: "current_date".to_string(),
            expected: "an integer",
            found: type_name(value),
        }
        .into()
    })
}
