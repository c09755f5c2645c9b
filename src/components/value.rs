//! Dynamic component values.
//!
//! Component data is schemaless: any JSON value can be attached to an entity
//! under a component name. Filters test component values by truthiness, with
//! the rules a scripting host would apply: `null`, `false`, zero and the empty
//! string are falsy, everything else (including empty arrays and objects) is
//! truthy.

use serde_json::{Map, Value};

/// A full set of components keyed by component name.
pub type Components = Map<String, Value>;

/// Whether a component value counts as "set" for filtering purposes.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_none_or(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_values() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
    }

    #[test]
    fn truthy_values() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!(0.5)));
        assert!(is_truthy(&json!("hidden")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }
}
