//! Namespace façades over [`crate::ApiClient`]
//!
//! One module per remote namespace. Methods map one-to-one onto remote calls;
//! the only logic they carry is parameter shaping and light response
//! reshaping (extracting a field from each element of a returned list).

pub mod activation_keys;
pub mod audit;
pub mod channels;
pub mod schedules;
pub mod users;

use serde_json::Value;

/// Extract a string field from every element of a JSON array, skipping
/// elements that lack it.
pub(crate) fn pluck_strings(list: &Value, field: &str) -> Vec<String> {
    list.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get(field).and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
