//! Coarse type inference over sampled field values.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::record::value_to_string;
use crate::schema::FieldType;

/// Layout accepted for zone-less date-plus-time values. RFC3339 parsing
/// separately covers zoned values, fractional and whole-second.
const DATETIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// Layouts accepted for date-only values.
const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

fn parses_as_datetime(text: &str) -> bool {
    if DateTime::parse_from_rfc3339(text).is_ok() {
        return true;
    }
    if NaiveDateTime::parse_from_str(text, DATETIME_LAYOUT).is_ok() {
        return true;
    }
    DATE_LAYOUTS
        .iter()
        .any(|layout| NaiveDate::parse_from_str(text, layout).is_ok())
}

/// Classify a field from its sampled values.
///
/// Precedence is fixed: object, array, numeric, datetime, string. Each
/// category must hold for every non-null value; a single non-conforming
/// value disqualifies the category for the whole field. Numeric and
/// datetime checks run on the value's canonical textual form, so a field
/// mixing native numbers and numeric-looking strings still classifies as
/// numeric. No non-null values at all means `unknown`.
pub fn infer_type(values: &[Value]) -> FieldType {
    let mut non_null = 0usize;
    let mut all_objects = true;
    let mut all_arrays = true;
    let mut all_numeric = true;
    let mut all_datetime = true;

    for value in values {
        if value.is_null() {
            continue;
        }
        non_null += 1;

        if !value.is_object() {
            all_objects = false;
        }
        if !value.is_array() {
            all_arrays = false;
        }

        let text = value_to_string(value);
        if text.parse::<f64>().is_err() {
            all_numeric = false;
        }
        if !parses_as_datetime(&text) {
            all_datetime = false;
        }
    }

    if non_null == 0 {
        FieldType::Unknown
    } else if all_objects {
        FieldType::Object
    } else if all_arrays {
        FieldType::Array
    } else if all_numeric {
        FieldType::Numeric
    } else if all_datetime {
        FieldType::Datetime
    } else {
        FieldType::String
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_or_all_null_is_unknown() {
        assert_eq!(infer_type(&[]), FieldType::Unknown);
        assert_eq!(infer_type(&[Value::Null, Value::Null]), FieldType::Unknown);
    }

    #[test]
    fn mixed_native_and_string_numbers_are_numeric() {
        let values = vec![json!(1), json!("2.5"), json!("300")];
        assert_eq!(infer_type(&values), FieldType::Numeric);
    }

    #[test]
    fn one_non_numeric_value_disqualifies_numeric() {
        let values = vec![json!(1), json!("2"), json!("abc")];
        assert_eq!(infer_type(&values), FieldType::String);
    }

    #[test]
    fn all_datetime_layouts_are_accepted() {
        let values = vec![
            json!("2024-03-01T10:00:00Z"),
            json!("2024-03-01T10:00:00.123Z"),
            json!("2024-03-01 10:00:00"),
            json!("2024-03-01"),
            json!("03/01/2024"),
        ];
        assert_eq!(infer_type(&values), FieldType::Datetime);
    }

    #[test]
    fn date_layouts_do_not_accept_time_suffixes() {
        // Date-plus-time parses only through the dedicated layout; the
        // date-only layouts reject trailing text.
        assert_eq!(
            infer_type(&[json!("2024-03-01 10:00:00")]),
            FieldType::Datetime
        );
        assert_eq!(
            infer_type(&[json!("03/01/2024 10:00:00")]),
            FieldType::String
        );
    }

    #[test]
    fn containers_classify_before_scalars() {
        assert_eq!(
            infer_type(&[json!({"a": 1}), json!({"b": 2})]),
            FieldType::Object
        );
        assert_eq!(infer_type(&[json!([1]), json!([2, 3])]), FieldType::Array);
        // A mix of containers and scalars falls through to string.
        assert_eq!(infer_type(&[json!({"a": 1}), json!("x")]), FieldType::String);
    }

    #[test]
    fn nulls_do_not_disqualify_a_category() {
        let values = vec![Value::Null, json!("42"), Value::Null];
        assert_eq!(infer_type(&values), FieldType::Numeric);
    }

    #[test]
    fn booleans_fall_through_to_string() {
        // No boolean rule in the precedence chain; "true" is neither
        // numeric nor datetime.
        assert_eq!(infer_type(&[json!(true), json!(false)]), FieldType::String);
    }
}
