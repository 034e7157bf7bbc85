//! Multi-step pipeline runs on real files
//!
//! Exercises the complete flow: stacked configuration documents ->
//! layers -> resolution against directory-backed stores, with one step
//! publishing values that a later step picks up.

use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};
use step_config::{
    Collaborators, ConfigDocument, ConfigResolver, DirectoryEnvironment, DirectorySecretStore,
    LayerSet, Provenance, Redactor, Resolution, ResolverOptions, SharedEnvironment,
    environment_layer, flags_layer,
};
use step_meta::options::{GithubCreateIssueOptions, HelmExecuteOptions};
use step_meta::{MetadataLoader, StepMetadata, StepRegistry};
use step_test_utils::TestWorkspace;
use step_test_utils::fixtures::{DEMO_CONFIG, DEMO_STEP_METADATA};

/// Stores of one pipeline run, shared by all its steps
struct PipelineRun {
    secrets: DirectorySecretStore,
    environment: DirectoryEnvironment,
    redactor: Redactor,
}

impl PipelineRun {
    fn new(ws: &TestWorkspace) -> Self {
        Self {
            secrets: DirectorySecretStore::new(ws.secrets_dir()),
            environment: DirectoryEnvironment::new(ws.environment_dir()),
            redactor: Redactor::new(),
        }
    }

    fn resolve<T: serde::de::DeserializeOwned>(
        &self,
        metadata: &StepMetadata,
        layers: LayerSet,
    ) -> step_config::Result<Resolution<T>> {
        ConfigResolver::new(
            metadata,
            ResolverOptions::default(),
            Collaborators::new(&self.secrets, &self.environment, &self.redactor),
        )?
        .resolve(layers)
    }
}

fn document_layers(document: &ConfigDocument, stage: &str, metadata: &StepMetadata) -> LayerSet {
    LayerSet::new()
        .with(document.general_layer())
        .with(document.stage_layer(stage))
        .with(document.step_layer(metadata))
}

#[test]
fn test_stacked_documents_in_mixed_formats() {
    let ws = TestWorkspace::new();
    let shipped = ws.write_file(
        "defaults/shipped.json",
        r#"{"general": {"helmDeployWaitSeconds": 120, "namespace": "shipped"},
            "steps": {"helmExecute": {"dumpLogs": true, "valuesMapping": {"image": {"tag": "1.0"}}}}}"#,
    );
    let team = ws.write_file(
        "defaults/team.toml",
        "[general]\nnamespace = \"team\"\n\n[steps.helmExecute.valuesMapping.image]\nrepository = \"registry/app\"\n",
    );
    ws.write_config(
        "stages:\n  Deploy:\n    helmCommand: upgrade\n    deploymentName: api\nsteps:\n  helmExecute:\n    dumpLogs: false\n",
    );

    let registry = StepRegistry::with_builtins().unwrap();
    let metadata = registry.require("helmExecute").unwrap();

    let mut document = ConfigDocument::default();
    for path in [shipped, team, ws.config_path()] {
        document.merge(&ConfigDocument::load(&path).unwrap(), metadata);
    }
    let run = PipelineRun::new(&ws);

    let resolution: Resolution<HelmExecuteOptions> = run
        .resolve(metadata, document_layers(&document, "Deploy", metadata))
        .unwrap();

    let options = resolution.options;
    assert_eq!(options.helm_command, "upgrade");
    assert_eq!(options.deployment_name, "api");
    assert!(!options.dump_logs);
    // namespace and helmDeployWaitSeconds are not visible in the general section
    assert_eq!(options.namespace, "default");
    assert_eq!(options.helm_deploy_wait_seconds, 300);
    assert_eq!(
        Value::Object(options.values_mapping),
        json!({"image": {"tag": "1.0", "repository": "registry/app"}})
    );
}

#[test]
fn test_later_step_reads_values_published_by_earlier_step() {
    let ws = TestWorkspace::new();
    ws.write_config(
        "steps:\n  githubCreateIssue:\n    title: Deployment failed\n  helmExecute:\n    helmCommand: publish\n",
    );
    ws.write_secret("github", "ghp_pipeline");
    let document = ConfigDocument::load(&ws.config_path()).unwrap();
    let registry = StepRegistry::with_builtins().unwrap();
    let run = PipelineRun::new(&ws);

    // A build step publishes its results
    run.environment.write("github/owner", &json!("octo")).unwrap();
    run.environment.write("github/repository", &json!("chart-repo")).unwrap();
    run.environment.write("artifactVersion", &json!("2.4.1")).unwrap();
    run.environment
        .write("custom/repositoryUrl", &json!("https://charts.example.com"))
        .unwrap();

    let helm = registry.require("helmExecute").unwrap();
    let helm_run: Resolution<HelmExecuteOptions> = run
        .resolve(helm, document_layers(&document, "Publish", helm))
        .unwrap();
    assert_eq!(helm_run.options.publish_version, "2.4.1");
    assert_eq!(helm_run.options.target_repository_url, "https://charts.example.com");

    let github = registry.require("githubCreateIssue").unwrap();
    let issue_run: Resolution<GithubCreateIssueOptions> = run
        .resolve(github, document_layers(&document, "Publish", github))
        .unwrap();
    assert_eq!(issue_run.options.owner, "octo");
    assert_eq!(issue_run.options.repository, "chart-repo");
    assert_eq!(issue_run.options.token, "ghp_pipeline");

    // Both runs leave the published values in place
    ws.assert_file_contains(".pipeline/commonPipelineEnvironment/artifactVersion", "2.4.1");
    assert_eq!(run.redactor.redact("ghp_pipeline"), "****");
}

#[test]
fn test_loaded_metadata_with_environment_and_flags() {
    let ws = TestWorkspace::new();
    ws.write_metadata("demo.yaml", DEMO_STEP_METADATA);
    ws.write_config(DEMO_CONFIG);
    ws.write_secret("demo-token", "t0k3n");

    let steps = MetadataLoader::new()
        .load_dir(&ws.path(".pipeline/metadata"))
        .unwrap();
    assert_eq!(steps.len(), 1);
    let metadata = &steps[0];
    let document = ConfigDocument::load(&ws.config_path()).unwrap();
    let run = PipelineRun::new(&ws);

    let layers = document_layers(&document, "Build", metadata)
        .with(environment_layer(
            [("PIPER_githubOrg", "env-org"), ("PIPER_labels", "x, y")],
            "PIPER_",
        ))
        .with(flags_layer([("verbose", json!("true")), ("retries", json!("9"))]));

    let resolution: Resolution<Map<String, Value>> = run.resolve(metadata, layers).unwrap();

    assert_eq!(resolution.options["owner"], json!("general-owner"));
    assert_eq!(resolution.options["labels"], json!(["build"]));
    assert_eq!(resolution.options["verbose"], json!(true));
    assert_eq!(resolution.options["retries"], json!(9));
    assert_eq!(resolution.options["token"], json!("t0k3n"));
    assert_eq!(resolution.resolved.get("retries").unwrap().provenance, Provenance::Flag);
    assert_eq!(resolution.resolved.get("owner").unwrap().provenance, Provenance::General);
}
