// Numeric coercion for query result values
use serde_json::Value;

/// Coerce a JSON value to a number. Query results from the gateway's
/// tenant store frequently carry numerics as strings, so strings are
/// parsed after trimming. Anything else is absent.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Coercion with the chart policy applied: unparseable or missing values
/// chart as zero. This is deliberate - zero is visible and explainable,
/// NaN silently breaks downstream aggregation.
pub fn number_or_zero(value: &Value) -> f64 {
    coerce_number(value).unwrap_or(0.0)
}

/// A field's display label: strings pass through, everything else is
/// rendered via its JSON form.
pub fn label_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_plain_number() {
        assert_eq!(coerce_number(&json!(42)), Some(42.0));
        assert_eq!(coerce_number(&json!(3.5)), Some(3.5));
    }

    #[test]
    fn test_coerce_numeric_string() {
        assert_eq!(coerce_number(&json!("42")), Some(42.0));
        assert_eq!(coerce_number(&json!("  7.25 ")), Some(7.25));
        assert_eq!(coerce_number(&json!("-3")), Some(-3.0));
    }

    #[test]
    fn test_unparseable_is_absent() {
        assert_eq!(coerce_number(&json!("n/a")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!(["1"])), None);
        assert_eq!(number_or_zero(&json!("garbage")), 0.0);
    }

    #[test]
    fn test_label_of() {
        assert_eq!(label_of(&json!("A")), "A");
        assert_eq!(label_of(&json!(12)), "12");
    }
}
