//! Secret registrar
//!
//! Every secret value is handed to the log redaction facility before the
//! options reach the step, so no later log line can print it.

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::RwLock;

use crate::resolved::{REDACTED, ResolvedConfig};

/// Log redaction facility.
pub trait SecretRegistry: Send + Sync {
    /// Add a value that must never appear in output.
    fn register(&self, secret: &str);
}

/// Redaction registry that masks registered secrets in text.
#[derive(Debug, Default)]
pub struct Redactor {
    secrets: RwLock<BTreeSet<String>>,
}

impl Redactor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.secrets.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `text` with every registered secret replaced by `****`.
    ///
    /// Longer secrets are replaced first so a secret containing another
    /// is masked whole.
    pub fn redact(&self, text: &str) -> String {
        let Ok(secrets) = self.secrets.read() else {
            return text.to_string();
        };
        let mut ordered: Vec<&String> = secrets.iter().collect();
        ordered.sort_by(|a, b| b.len().cmp(&a.len()));

        let mut redacted = text.to_string();
        for secret in ordered {
            if redacted.contains(secret.as_str()) {
                redacted = redacted.replace(secret.as_str(), REDACTED);
            }
        }
        redacted
    }
}

impl SecretRegistry for Redactor {
    fn register(&self, secret: &str) {
        if secret.is_empty() {
            return;
        }
        if let Ok(mut secrets) = self.secrets.write() {
            secrets.insert(secret.to_string());
        }
    }
}

/// Shorter digit-only secrets are not masked; they would hide unrelated numbers
const MIN_NUMERIC_SECRET_LEN: usize = 4;

fn register_text(registry: &dyn SecretRegistry, text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    let numeric = text.bytes().all(|b| b.is_ascii_digit() || b == b'-' || b == b'.');
    if numeric && text.len() < MIN_NUMERIC_SECRET_LEN {
        tracing::debug!(length = text.len(), "Numeric secret too short to mask; not registered");
        return 0;
    }
    registry.register(text);
    1
}

fn register_value(registry: &dyn SecretRegistry, value: &Value) -> usize {
    match value {
        Value::String(s) => register_text(registry, s),
        Value::Number(n) => register_text(registry, &n.to_string()),
        Value::Array(items) => items.iter().map(|v| register_value(registry, v)).sum(),
        Value::Object(map) => map.values().map(|v| register_value(registry, v)).sum(),
        _ => 0,
    }
}

/// Register every secret entry, both as resolved and as bound.
///
/// Returns the number of values registered.
pub fn register_secrets(
    resolved: &ResolvedConfig,
    bound: &Map<String, Value>,
    registry: &dyn SecretRegistry,
) -> usize {
    let mut count = 0;
    for (name, entry) in resolved.secrets() {
        count += register_value(registry, &entry.value);
        if let Some(value) = bound.get(name) {
            if value != &entry.value {
                count += register_value(registry, value);
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolved::{Provenance, ResolvedValue};
    use serde_json::json;

    #[test]
    fn test_redact_registered_secrets() {
        let redactor = Redactor::new();
        redactor.register("s3cr3t");
        redactor.register("");

        assert_eq!(redactor.redact("token=s3cr3t done"), "token=**** done");
        assert_eq!(redactor.len(), 1);
    }

    #[test]
    fn test_longest_secret_masked_first() {
        let redactor = Redactor::new();
        redactor.register("abc");
        redactor.register("abcdef");

        assert_eq!(redactor.redact("x abcdef y abc"), "x **** y ****");
    }

    #[test]
    fn test_register_secrets_walks_lists() {
        let mut resolved = ResolvedConfig::new();
        resolved.insert(
            "creds",
            ResolvedValue {
                value: json!("alpha, beta"),
                provenance: Provenance::Flag,
                secret: true,
            },
        );
        resolved.insert(
            "owner",
            ResolvedValue {
                value: json!("octo"),
                provenance: Provenance::Flag,
                secret: false,
            },
        );
        let mut bound = Map::new();
        bound.insert("creds".into(), json!(["alpha", "beta"]));
        let redactor = Redactor::new();

        let count = register_secrets(&resolved, &bound, &redactor);

        assert_eq!(count, 3);
        assert_eq!(redactor.redact("alpha octo"), "**** octo");
    }

    #[test]
    fn test_short_numeric_secrets_not_registered() {
        let mut resolved = ResolvedConfig::new();
        for (name, value) in [("pin", json!(1)), ("code", json!("42")), ("port", json!(54321))] {
            resolved.insert(
                name,
                ResolvedValue {
                    value,
                    provenance: Provenance::Flag,
                    secret: true,
                },
            );
        }
        let redactor = Redactor::new();

        let count = register_secrets(&resolved, &Map::new(), &redactor);

        assert_eq!(count, 1);
        assert_eq!(redactor.redact("retry 1 of 42 on 54321"), "retry 1 of 42 on ****");
    }
}
