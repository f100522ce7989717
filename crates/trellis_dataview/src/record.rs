//! Field access for sortable, groupable items

use std::cmp::Ordering;

use serde_json::Value;

/// An item whose fields can be read by name
///
/// Names may be dotted paths (`"address.city"`).
pub trait Record {
    fn field(&self, name: &str) -> Option<Value>;
}

impl Record for Value {
    fn field(&self, name: &str) -> Option<Value> {
        name.split('.')
            .try_fold(self, |value, segment| value.get(segment))
            .cloned()
    }
}

/// Sort rank of a value's kind: missing/null < bool < number < string < array < object
fn kind_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

/// Order two field values
///
/// Values of different kinds order by kind rank (missing fields first).
/// Numbers, strings and booleans compare within their kind; arrays and
/// objects are equal to others of their kind.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let a = a.as_f64().unwrap_or(0.0);
            let b = b.as_f64().unwrap_or(0.0);
            a.total_cmp(&b)
        }
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

/// Key used to group a record by one of its fields
///
/// Strings are used as is, other values by their JSON text, missing fields as `""`.
pub fn group_key(record: &impl Record, name: &str) -> String {
    match record.field(name) {
        Some(Value::String(key)) => key,
        Some(value) => value.to_string(),
        None => String::new(),
    }
}
