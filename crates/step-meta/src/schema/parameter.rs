//! Parameter declarations
//!
//! # Example YAML
//!
//! ```yaml
//! - name: token
//!   type: string
//!   scope: [GENERAL, PARAMETERS, STAGES, STEPS]
//!   mandatory: true
//!   secret: true
//!   aliases:
//!     - name: githubToken
//!     - name: access_token
//!       deprecated: true
//!   resourceRef:
//!     - type: secret
//!       name: githubTokenCredentialsId
//!     - type: vaultSecret
//!       name: githubVaultSecretName
//!       default: github
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which kind of configuration layer may supply a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Scope {
    /// The `general` section of a configuration document
    General,
    /// Parameters handed directly to the step (command-line flags)
    Parameters,
    /// The `stages.<stage>` section of a configuration document
    Stages,
    /// The `steps.<step>` section of a configuration document
    Steps,
}

impl Scope {
    /// All scopes, the visibility of a parameter that declares none.
    pub const ALL: [Scope; 4] = [Scope::General, Scope::Parameters, Scope::Stages, Scope::Steps];
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Scope::General => "GENERAL",
            Scope::Parameters => "PARAMETERS",
            Scope::Stages => "STAGES",
            Scope::Steps => "STEPS",
        };
        f.write_str(label)
    }
}

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParamType {
    #[default]
    #[serde(rename = "string")]
    String,
    #[serde(rename = "bool", alias = "boolean")]
    Bool,
    #[serde(rename = "int", alias = "integer")]
    Int,
    #[serde(rename = "[]string", alias = "stringList")]
    StringList,
    #[serde(rename = "map[string]interface{}", alias = "map")]
    Map,
}

impl ParamType {
    /// Whether `value` is already a native value of this type.
    ///
    /// Used to check declared defaults and allowed values; no coercion applies.
    pub fn accepts_native(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Bool => value.is_boolean(),
            ParamType::Int => value.is_i64(),
            ParamType::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            ParamType::Map => value.is_object(),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ParamType::String => "string",
            ParamType::Bool => "bool",
            ParamType::Int => "int",
            ParamType::StringList => "[]string",
            ParamType::Map => "map[string]interface{}",
        };
        f.write_str(label)
    }
}

/// An alternative name for a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,
    /// Deprecated aliases still resolve but are reported in the log
    #[serde(default)]
    pub deprecated: bool,
}

impl Alias {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deprecated: false,
        }
    }

    pub fn deprecated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deprecated: true,
        }
    }
}

/// Condition under which a parameter becomes mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Canonical name of the parameter to inspect
    pub name: String,
    /// Value that triggers the condition
    pub value: Value,
}

/// Pointer to an external value source for a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResourceReference {
    /// Entry in the secret store.
    ///
    /// The entry name is taken from the configuration key `name` when the
    /// configuration sets it, otherwise from `default`, otherwise `name`.
    #[serde(alias = "vaultSecret")]
    Secret {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    /// Field written to the shared pipeline environment by an earlier step.
    #[serde(alias = "sharedEnvironment")]
    CommonPipelineEnvironment { param: String },
}

impl ResourceReference {
    pub fn secret(name: impl Into<String>) -> Self {
        Self::Secret {
            name: name.into(),
            default: None,
        }
    }

    pub fn shared_environment(param: impl Into<String>) -> Self {
        Self::CommonPipelineEnvironment {
            param: param.into(),
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Secret { .. })
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Secret { name, .. } => write!(f, "secret:{name}"),
            Self::CommonPipelineEnvironment { param } => write!(f, "commonPipelineEnvironment:{param}"),
        }
    }
}

fn default_scope() -> Vec<Scope> {
    Scope::ALL.to_vec()
}

/// One declared parameter of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    /// Canonical name, also the field name in the options structure
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type", default)]
    pub param_type: ParamType,

    #[serde(default)]
    pub mandatory: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mandatory_if: Vec<Condition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default = "default_scope")]
    pub scope: Vec<Scope>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<Alias>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub possible_values: Vec<Value>,

    #[serde(default, rename = "resourceRef", skip_serializing_if = "Vec::is_empty")]
    pub resource_refs: Vec<ResourceReference>,

    /// Value must never appear in logs
    #[serde(default)]
    pub secret: bool,
}

impl ParameterSpec {
    /// A new optional string parameter visible in every scope.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            param_type: ParamType::String,
            mandatory: false,
            mandatory_if: Vec::new(),
            default: None,
            scope: default_scope(),
            aliases: Vec::new(),
            possible_values: Vec::new(),
            resource_refs: Vec::new(),
            secret: false,
        }
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn mandatory_if(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.mandatory_if.push(Condition {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_scope(mut self, scope: &[Scope]) -> Self {
        self.scope = scope.to_vec();
        self
    }

    pub fn with_alias(mut self, alias: Alias) -> Self {
        self.aliases.push(alias);
        self
    }

    pub fn with_possible_values<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.possible_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_resource_ref(mut self, reference: ResourceReference) -> Self {
        self.resource_refs.push(reference);
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// Whether `scope` may supply a value for this parameter.
    pub fn is_visible_in(&self, scope: Scope) -> bool {
        self.scope.contains(&scope)
    }

    /// Whether resolved values of this parameter must be redacted.
    ///
    /// True for parameters flagged `secret` and for any parameter that can be
    /// fed from the secret store.
    pub fn is_secret(&self) -> bool {
        self.secret || self.resource_refs.iter().any(ResourceReference::is_secret)
    }

    /// Look up one of this parameter's aliases.
    pub fn alias(&self, name: &str) -> Option<&Alias> {
        self.aliases.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scope_defaults_to_all_when_omitted() {
        let spec: ParameterSpec = serde_yaml::from_str("name: title\n").unwrap();
        assert_eq!(spec.scope, Scope::ALL.to_vec());
        assert_eq!(spec.param_type, ParamType::String);
        assert!(!spec.mandatory);
    }

    #[test]
    fn test_param_type_names() {
        let types: Vec<ParamType> =
            serde_yaml::from_str("[string, bool, int, '[]string', 'map[string]interface{}']").unwrap();
        assert_eq!(
            types,
            vec![
                ParamType::String,
                ParamType::Bool,
                ParamType::Int,
                ParamType::StringList,
                ParamType::Map
            ]
        );
    }

    #[test]
    fn test_vault_secret_is_a_secret_reference() {
        let reference: ResourceReference =
            serde_yaml::from_str("type: vaultSecret\nname: githubVaultSecretName\ndefault: github\n")
                .unwrap();
        assert_eq!(
            reference,
            ResourceReference::Secret {
                name: "githubVaultSecretName".into(),
                default: Some("github".into()),
            }
        );
    }

    #[test]
    fn test_shared_environment_reference() {
        let reference: ResourceReference =
            serde_yaml::from_str("type: commonPipelineEnvironment\nparam: github/owner\n").unwrap();
        assert_eq!(reference, ResourceReference::shared_environment("github/owner"));
        assert!(!reference.is_secret());
        assert_eq!(reference.to_string(), "commonPipelineEnvironment:github/owner");
    }

    #[test]
    fn test_is_secret_from_reference_or_flag() {
        let plain = ParameterSpec::new("owner")
            .with_resource_ref(ResourceReference::shared_environment("github/owner"));
        assert!(!plain.is_secret());

        let referenced = ParameterSpec::new("token").with_resource_ref(ResourceReference::secret("id"));
        assert!(referenced.is_secret());

        assert!(ParameterSpec::new("password").secret().is_secret());
    }

    #[test]
    fn test_accepts_native() {
        assert!(ParamType::StringList.accepts_native(&json!(["a", "b"])));
        assert!(!ParamType::StringList.accepts_native(&json!(["a", 1])));
        assert!(ParamType::Int.accepts_native(&json!(300)));
        assert!(!ParamType::Int.accepts_native(&json!("300")));
        assert!(ParamType::Map.accepts_native(&json!({"a": 1})));
    }
}
