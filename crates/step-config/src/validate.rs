//! Validator
//!
//! Runs once binding has finished for every parameter and checks mandatory
//! and allowed-value constraints on the bound values.

use serde_json::Value;
use step_meta::ParameterSpec;

use crate::bind::Bound;
use crate::report::{ValidationReport, Violation, ViolationKind};

/// An absent value, or one that is present but empty
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

fn is_required(spec: &ParameterSpec, bound: &Bound) -> bool {
    spec.mandatory
        || spec
            .mandatory_if
            .iter()
            .any(|condition| bound.values.get(&condition.name) == Some(&condition.value))
}

fn render_allowed(allowed: &[Value]) -> String {
    allowed
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check every parameter and push violations to `report`.
///
/// Parameters that already failed to bind are not checked again.
pub fn validate(params: &[ParameterSpec], bound: &Bound, report: &mut ValidationReport) {
    for spec in params {
        if bound.skipped.contains(&spec.name) {
            continue;
        }
        let value = bound.values.get(&spec.name);

        if is_missing(value) {
            if is_required(spec, bound) {
                let message = if spec.mandatory {
                    format!("parameter '{}' is mandatory but was not set", spec.name)
                } else {
                    format!(
                        "parameter '{}' is mandatory for the configured {} but was not set",
                        spec.name,
                        spec.mandatory_if
                            .iter()
                            .map(|c| format!("{}={}", c.name, c.value))
                            .collect::<Vec<_>>()
                            .join(" or ")
                    )
                };
                report.push(Violation::new(
                    spec.name.clone(),
                    ViolationKind::MissingMandatory,
                    message,
                ));
            }
            continue;
        }

        if spec.possible_values.is_empty() {
            continue;
        }
        let Some(value) = value else { continue };

        let candidates: Vec<&Value> = match value {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        let rejected: Vec<&Value> = candidates
            .into_iter()
            .filter(|v| !spec.possible_values.contains(v))
            .collect();

        if rejected.is_empty() {
            continue;
        }

        let allowed = render_allowed(&spec.possible_values);
        let message = if spec.is_secret() {
            format!("value of parameter '{}' is not allowed; allowed values: {allowed}", spec.name)
        } else {
            let shown = rejected.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
            format!(
                "value {shown} of parameter '{}' is not allowed; allowed values: {allowed}",
                spec.name
            )
        };
        report.push(Violation::new(
            spec.name.clone(),
            ViolationKind::NotAllowed {
                allowed: spec.possible_values.clone(),
            },
            message,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use step_meta::ParamType;

    fn bound(values: Value) -> Bound {
        let Value::Object(values) = values else {
            panic!("bound fixture must be an object")
        };
        Bound {
            values,
            skipped: Default::default(),
        }
    }

    #[test]
    fn test_missing_mandatory() {
        let params = vec![ParameterSpec::new("token").mandatory()];
        let mut report = ValidationReport::new("demo");

        validate(&params, &bound(json!({})), &mut report);

        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].kind, ViolationKind::MissingMandatory);
        assert_eq!(report.violations()[0].parameter, "token");
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let params = vec![ParameterSpec::new("token").mandatory()];
        let mut report = ValidationReport::new("demo");

        validate(&params, &bound(json!({"token": ""})), &mut report);

        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_mandatory_if_condition() {
        let params = vec![
            ParameterSpec::new("helmCommand"),
            ParameterSpec::new("deploymentName")
                .mandatory_if("helmCommand", "upgrade")
                .mandatory_if("helmCommand", "install"),
        ];

        let mut report = ValidationReport::new("helmExecute");
        validate(&params, &bound(json!({"helmCommand": "install"})), &mut report);
        assert_eq!(report.len(), 1);
        assert!(report.violations()[0].message.contains("helmCommand=\"upgrade\""));

        let mut report = ValidationReport::new("helmExecute");
        validate(&params, &bound(json!({"helmCommand": "lint"})), &mut report);
        assert!(report.is_valid());
    }

    #[test]
    fn test_not_allowed_lists_permitted_set() {
        let params = vec![ParameterSpec::new("dependency").with_possible_values(["build", "list", "update"])];
        let mut report = ValidationReport::new("helmExecute");

        validate(&params, &bound(json!({"dependency": "deploy"})), &mut report);

        assert_eq!(report.len(), 1);
        let violation = &report.violations()[0];
        assert_eq!(
            violation.kind,
            ViolationKind::NotAllowed {
                allowed: vec![json!("build"), json!("list"), json!("update")]
            }
        );
        assert_eq!(
            violation.message,
            "value \"deploy\" of parameter 'dependency' is not allowed; allowed values: build, list, update"
        );
    }

    #[test]
    fn test_list_elements_checked_individually() {
        let params = vec![
            ParameterSpec::new("targets")
                .with_type(ParamType::StringList)
                .with_possible_values(["a", "b"]),
        ];

        let mut report = ValidationReport::new("demo");
        validate(&params, &bound(json!({"targets": ["a", "b"]})), &mut report);
        assert!(report.is_valid());

        let mut report = ValidationReport::new("demo");
        validate(&params, &bound(json!({"targets": ["a", "c"]})), &mut report);
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_empty_optional_value_skips_allowed_check() {
        let params = vec![ParameterSpec::new("dependency").with_possible_values(["build"])];
        let mut report = ValidationReport::new("demo");

        validate(&params, &bound(json!({"dependency": ""})), &mut report);

        assert!(report.is_valid());
    }

    #[test]
    fn test_skipped_parameter_not_reported_again() {
        let params = vec![ParameterSpec::new("wait").with_type(ParamType::Int).mandatory()];
        let mut bound = bound(json!({}));
        bound.skipped.insert("wait".to_string());
        let mut report = ValidationReport::new("demo");

        validate(&params, &bound, &mut report);

        assert!(report.is_valid());
    }
}
