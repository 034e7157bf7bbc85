//! Typed options for the built-in steps
//!
//! Field names follow the canonical parameter names, so a bound
//! configuration map deserializes directly into these structures.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options of the `githubCreateIssue` step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GithubCreateIssueOptions {
    pub api_url: String,
    pub assignees: Vec<String>,
    pub body: String,
    pub body_file_path: String,
    pub owner: String,
    pub repository: String,
    pub title: String,
    pub update_existing: bool,
    pub token: String,
}

/// Options of the `helmExecute` step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HelmExecuteOptions {
    pub helm_command: String,
    pub chart_path: String,
    pub deployment_name: String,
    pub namespace: String,
    pub kube_context: String,
    pub kube_config: String,
    pub dependency: String,
    pub package_dependency_update: bool,
    pub dump_logs: bool,
    pub filter_test: String,
    pub helm_deploy_wait_seconds: i64,
    pub helm_values: Vec<String>,
    pub app_templates: Vec<String>,
    pub custom_tls_certificate_links: Vec<String>,
    pub values_mapping: Map<String, Value>,
    pub publish_version: String,
    #[serde(rename = "targetRepositoryURL")]
    pub target_repository_url: String,
    pub target_repository_name: String,
    pub target_repository_user: String,
    pub target_repository_password: String,
}
