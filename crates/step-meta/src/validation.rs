//! Invariant checks for step parameter tables

use std::collections::HashMap;

use crate::schema::{ParamType, StepMetadata};
use crate::{Error, Result};

impl StepMetadata {
    /// Check the parameter table invariants.
    ///
    /// - canonical names are unique
    /// - an alias never collides with a canonical name or another alias
    /// - declared defaults and allowed values have the declared type
    /// - allowed values are only declared on scalar and string-list parameters
    /// - `mandatoryIf` conditions refer to declared parameters
    ///
    /// Every problem is collected into one [`Error::InvalidMetadata`].
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        let params = self.parameters();

        // Owner of every canonical name and alias seen so far
        let mut owners: HashMap<&str, &str> = HashMap::new();

        for param in params {
            if param.name.trim().is_empty() {
                problems.push("parameter name cannot be empty".to_string());
                continue;
            }
            if owners.insert(param.name.as_str(), param.name.as_str()).is_some() {
                problems.push(format!("parameter '{}' is declared more than once", param.name));
            }
        }

        for param in params {
            for alias in &param.aliases {
                match owners.get(alias.name.as_str()) {
                    Some(owner) if *owner == alias.name => problems.push(format!(
                        "alias '{}' of '{}' collides with a parameter name",
                        alias.name, param.name
                    )),
                    Some(owner) => problems.push(format!(
                        "alias '{}' of '{}' is already used by '{}'",
                        alias.name, param.name, owner
                    )),
                    None => {
                        owners.insert(alias.name.as_str(), param.name.as_str());
                    }
                }
            }
        }

        for param in params {
            if let Some(default) = &param.default {
                if !default.is_null() && !param.param_type.accepts_native(default) {
                    problems.push(format!(
                        "default of '{}' is not a {} value",
                        param.name, param.param_type
                    ));
                }
            }

            if !param.possible_values.is_empty() {
                let element_type = match param.param_type {
                    ParamType::StringList => Some(ParamType::String),
                    ParamType::Map => None,
                    scalar => Some(scalar),
                };
                match element_type {
                    None => problems.push(format!(
                        "'{}' is a map and cannot declare possible values",
                        param.name
                    )),
                    Some(element_type) => {
                        for value in &param.possible_values {
                            if !element_type.accepts_native(value) {
                                problems.push(format!(
                                    "possible value {} of '{}' is not a {} value",
                                    value, param.name, element_type
                                ));
                            }
                        }
                    }
                }
            }

            for condition in &param.mandatory_if {
                if self.parameter(&condition.name).is_none() {
                    problems.push(format!(
                        "mandatoryIf of '{}' refers to unknown parameter '{}'",
                        param.name, condition.name
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidMetadata {
                step: self.name().to_string(),
                problems,
            })
        }
    }
}
