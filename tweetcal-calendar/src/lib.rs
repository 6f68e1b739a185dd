//! Google Calendar "add event" links.
//!
//! The model's JSON answer is turned into query parameters as-is: no field
//! allow-list, no defaults for missing fields, no validation of `dates`.
use serde_json::{Map, Value};
use thiserror::Error;
use url::form_urlencoded;

pub const BASE_URL: &str = "http://www.google.com/calendar/event";

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("event description is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("event description must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Build the calendar link from the model's JSON text.
///
/// ```
/// let url = tweetcal_calendar::calendar_url(
///     r#"{"action":"TEMPLATE","text":"Meetup","dates":"20240101T090000Z/20240101T100000Z"}"#,
/// )
/// .unwrap();
/// assert_eq!(
///     url,
///     "http://www.google.com/calendar/event?action=TEMPLATE&text=Meetup&dates=20240101T090000Z%2F20240101T100000Z"
/// );
/// ```
pub fn calendar_url(json: &str) -> Result<String, CalendarError> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(fields) => Ok(calendar_url_from_fields(&fields)),
        other => Err(CalendarError::NotAnObject(kind_of(&other))),
    }
}

/// Build the calendar link from an already-parsed object, keeping field order.
pub fn calendar_url_from_fields(fields: &Map<String, Value>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in fields {
        query.append_pair(key, &coerce(value));
    }
    format!("{BASE_URL}?{}", query.finish())
}

/// String form of a JSON value, matching JavaScript's `String(value)`.
fn coerce(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                // Array.prototype.join renders null as an empty string.
                Value::Null => String::new(),
                other => coerce(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
