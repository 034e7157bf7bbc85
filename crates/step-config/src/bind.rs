//! Type binder
//!
//! Converts every resolved value to its parameter's declared type. A value
//! that cannot be converted is reported as a type mismatch and the
//! parameter is skipped; the others are still bound.

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use step_meta::{ParamType, ParameterSpec};

use crate::report::{ValidationReport, Violation, ViolationKind};
use crate::resolved::ResolvedConfig;

const TRUE_TOKENS: [&str; 6] = ["1", "t", "T", "TRUE", "true", "True"];
const FALSE_TOKENS: [&str; 6] = ["0", "f", "F", "FALSE", "false", "False"];

/// A value that cannot be converted to the requested type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch;

/// Typed values ready to deserialize into an options structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bound {
    pub values: Map<String, Value>,
    /// Parameters whose value failed to convert
    pub skipped: BTreeSet<String>,
}

/// Convert one value to `param_type`.
///
/// `delimited` says whether the value's source writes lists as delimited
/// strings. `Ok(None)` means the value is `null` and counts as absent.
pub fn coerce(
    param_type: ParamType,
    value: &Value,
    delimited: bool,
    delimiter: char,
) -> Result<Option<Value>, Mismatch> {
    if value.is_null() {
        return Ok(None);
    }

    let coerced = match param_type {
        ParamType::String => match value {
            Value::String(_) => value.clone(),
            Value::Number(n) => Value::String(n.to_string()),
            Value::Bool(b) => Value::String(b.to_string()),
            _ => return Err(Mismatch),
        },
        ParamType::Bool => match value {
            Value::Bool(_) => value.clone(),
            Value::String(s) if TRUE_TOKENS.contains(&s.as_str()) => Value::Bool(true),
            Value::String(s) if FALSE_TOKENS.contains(&s.as_str()) => Value::Bool(false),
            _ => return Err(Mismatch),
        },
        ParamType::Int => match value {
            Value::Number(n) => n.as_i64().map(Value::from).ok_or(Mismatch)?,
            Value::String(s) => s.parse::<i64>().map(Value::from).map_err(|_| Mismatch)?,
            _ => return Err(Mismatch),
        },
        ParamType::StringList => match value {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(scalar_to_string)
                    .collect::<Option<Vec<_>>>()
                    .ok_or(Mismatch)?,
            ),
            Value::String(s) if s.is_empty() => Value::Array(Vec::new()),
            Value::String(s) if delimited => Value::Array(
                s.split(delimiter)
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| Value::String(item.to_string()))
                    .collect(),
            ),
            Value::String(_) => Value::Array(vec![value.clone()]),
            Value::Number(_) | Value::Bool(_) => {
                Value::Array(vec![scalar_to_string(value).ok_or(Mismatch)?])
            }
            _ => return Err(Mismatch),
        },
        ParamType::Map => match value {
            Value::Object(_) => value.clone(),
            _ => return Err(Mismatch),
        },
    };
    Ok(Some(coerced))
}

fn scalar_to_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(n) => Some(Value::String(n.to_string())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        _ => None,
    }
}

/// Bind every resolved parameter of `params`.
///
/// Conversion failures are pushed to `report`.
pub fn bind(
    params: &[ParameterSpec],
    resolved: &ResolvedConfig,
    delimiter: char,
    report: &mut ValidationReport,
) -> Bound {
    let mut bound = Bound::default();

    for spec in params {
        let Some(entry) = resolved.get(&spec.name) else {
            continue;
        };

        match coerce(
            spec.param_type,
            &entry.value,
            entry.provenance.delimited_lists(),
            delimiter,
        ) {
            Ok(Some(value)) => {
                bound.values.insert(spec.name.clone(), value);
            }
            Ok(None) => {}
            Err(Mismatch) => {
                let message = if entry.secret {
                    format!(
                        "parameter '{}' from {} cannot be read as {}",
                        spec.name, entry.provenance, spec.param_type
                    )
                } else {
                    format!(
                        "parameter '{}' from {} expects {}, got {}",
                        spec.name, entry.provenance, spec.param_type, entry.value
                    )
                };
                report.push(Violation::new(
                    spec.name.clone(),
                    ViolationKind::TypeMismatch {
                        expected: spec.param_type,
                    },
                    message,
                ));
                bound.skipped.insert(spec.name.clone());
            }
        }
    }

    bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolved::{Provenance, ResolvedValue};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("true"), json!(true))]
    #[case(json!("T"), json!(true))]
    #[case(json!("1"), json!(true))]
    #[case(json!("False"), json!(false))]
    #[case(json!("0"), json!(false))]
    #[case(json!(false), json!(false))]
    fn test_bool_tokens(#[case] input: Value, #[case] expected: Value) {
        assert_eq!(coerce(ParamType::Bool, &input, true, ','), Ok(Some(expected)));
    }

    #[rstest]
    #[case(json!("yes"))]
    #[case(json!("tRuE"))]
    #[case(json!(""))]
    #[case(json!(1))]
    fn test_bool_rejects(#[case] input: Value) {
        assert_eq!(coerce(ParamType::Bool, &input, true, ','), Err(Mismatch));
    }

    #[rstest]
    #[case(json!("300"), Ok(Some(json!(300))))]
    #[case(json!(-5), Ok(Some(json!(-5))))]
    #[case(json!("3.5"), Err(Mismatch))]
    #[case(json!(3.5), Err(Mismatch))]
    #[case(json!(" 1"), Err(Mismatch))]
    fn test_int(#[case] input: Value, #[case] expected: Result<Option<Value>, Mismatch>) {
        assert_eq!(coerce(ParamType::Int, &input, false, ','), expected);
    }

    #[rstest]
    #[case(json!("a, b,,c"), true, json!(["a", "b", "c"]))]
    #[case(json!("a, b"), false, json!(["a, b"]))]
    #[case(json!(["a", 1, true]), true, json!(["a", "1", "true"]))]
    #[case(json!(""), true, json!([]))]
    #[case(json!(""), false, json!([]))]
    fn test_string_list(#[case] input: Value, #[case] delimited: bool, #[case] expected: Value) {
        assert_eq!(
            coerce(ParamType::StringList, &input, delimited, ','),
            Ok(Some(expected))
        );
    }

    #[test]
    fn test_string_list_custom_delimiter() {
        assert_eq!(
            coerce(ParamType::StringList, &json!("a;b,c"), true, ';'),
            Ok(Some(json!(["a", "b,c"])))
        );
    }

    #[test]
    fn test_string_list_rejects_nested() {
        assert_eq!(coerce(ParamType::StringList, &json!([["a"]]), false, ','), Err(Mismatch));
    }

    #[test]
    fn test_map_rejects_flat_string() {
        assert_eq!(coerce(ParamType::Map, &json!("a=b"), true, ','), Err(Mismatch));
        assert_eq!(
            coerce(ParamType::Map, &json!({"a": "b"}), false, ','),
            Ok(Some(json!({"a": "b"})))
        );
    }

    #[test]
    fn test_string_from_scalars() {
        assert_eq!(coerce(ParamType::String, &json!(42), false, ','), Ok(Some(json!("42"))));
        assert_eq!(coerce(ParamType::String, &json!(["a"]), false, ','), Err(Mismatch));
    }

    #[test]
    fn test_null_is_absent() {
        assert_eq!(coerce(ParamType::Int, &Value::Null, false, ','), Ok(None));
    }

    #[test]
    fn test_bind_continues_after_mismatch() {
        let params = vec![
            ParameterSpec::new("dumpLogs").with_type(ParamType::Bool),
            ParameterSpec::new("wait").with_type(ParamType::Int),
        ];
        let mut resolved = ResolvedConfig::new();
        resolved.insert(
            "dumpLogs",
            ResolvedValue {
                value: json!("maybe"),
                provenance: Provenance::Flag,
                secret: false,
            },
        );
        resolved.insert(
            "wait",
            ResolvedValue {
                value: json!("10"),
                provenance: Provenance::Flag,
                secret: false,
            },
        );
        let mut report = ValidationReport::new("demo");

        let bound = bind(&params, &resolved, ',', &mut report);

        assert_eq!(report.len(), 1);
        assert!(bound.skipped.contains("dumpLogs"));
        assert_eq!(bound.values.get("wait"), Some(&json!(10)));
    }

    #[test]
    fn test_secret_value_not_echoed_in_mismatch() {
        let params = vec![ParameterSpec::new("pin").with_type(ParamType::Int).secret()];
        let mut resolved = ResolvedConfig::new();
        resolved.insert(
            "pin",
            ResolvedValue {
                value: json!("hunter2"),
                provenance: Provenance::General,
                secret: true,
            },
        );
        let mut report = ValidationReport::new("demo");

        bind(&params, &resolved, ',', &mut report);

        let message = &report.violations()[0].message;
        assert!(!message.contains("hunter2"), "{message}");
    }
}
