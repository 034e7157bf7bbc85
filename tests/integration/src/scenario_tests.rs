//! Acceptance scenarios driven from configuration files

use serde_json::{Map, Value, json};
use step_config::{
    Collaborators, ConfigDocument, ConfigResolver, DirectoryEnvironment, DirectorySecretStore,
    Error, LayerSet, MemorySecretStore, Redactor, ResolverOptions, ValidationReport,
    ViolationKind,
};
use step_meta::StepMetadata;
use step_test_utils::TestWorkspace;

fn metadata(yaml: &str) -> StepMetadata {
    StepMetadata::from_yaml(yaml, "scenario.yaml").unwrap()
}

fn run(
    ws: &TestWorkspace,
    metadata: &StepMetadata,
    secrets: &dyn step_config::SecretStore,
) -> Result<Map<String, Value>, ValidationReport> {
    let document = ConfigDocument::load(&ws.config_path()).unwrap();
    let environment = DirectoryEnvironment::new(ws.environment_dir());
    let redactor = Redactor::new();
    let layers = LayerSet::new()
        .with(document.general_layer())
        .with(document.step_layer(metadata));

    let resolver = ConfigResolver::new(
        metadata,
        ResolverOptions::default(),
        Collaborators::new(secrets, &environment, &redactor),
    )
    .unwrap();
    match resolver.resolve::<Map<String, Value>>(layers) {
        Ok(resolution) => Ok(resolution.options),
        Err(Error::Validation(report)) => Err(report),
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_mandatory_token_not_supplied() {
    let ws = TestWorkspace::new();
    ws.write_config("general: {}\n");
    let step = metadata(
        "metadata:\n  name: tokenStep\nspec:\n  inputs:\n    params:\n      - name: token\n        mandatory: true\n        scope: [GENERAL, PARAMETERS, STAGES, STEPS]\n",
    );

    let report = run(&ws, &step, &MemorySecretStore::new()).unwrap_err();

    assert_eq!(report.len(), 1);
    assert_eq!(report.violations()[0].parameter, "token");
    assert_eq!(report.violations()[0].kind, ViolationKind::MissingMandatory);
}

#[test]
fn test_dependency_outside_allowed_set() {
    let ws = TestWorkspace::new();
    ws.write_config("steps:\n  helmStep:\n    dependency: deploy\n");
    let step = metadata(
        "metadata:\n  name: helmStep\nspec:\n  inputs:\n    params:\n      - name: dependency\n        possibleValues: [build, list, update]\n",
    );

    let report = run(&ws, &step, &MemorySecretStore::new()).unwrap_err();

    assert_eq!(report.len(), 1);
    assert_eq!(
        report.violations()[0].kind,
        ViolationKind::NotAllowed {
            allowed: vec![json!("build"), json!("list"), json!("update")]
        }
    );
}

#[test]
fn test_secret_store_down_falls_back_to_shared_environment() {
    let ws = TestWorkspace::new();
    ws.write_config("general: {}\n");
    ws.write_env_field("deploy/token", "from-environment");
    let step = metadata(
        r#"metadata:
  name: deployStep
spec:
  inputs:
    params:
      - name: token
        mandatory: true
        resourceRef:
          - type: vaultSecret
            name: deployTokenSecret
            default: deploy-token
          - type: commonPipelineEnvironment
            param: deploy/token
"#,
    );
    // Secrets directory was never created
    let secrets = DirectorySecretStore::new(ws.secrets_dir());

    let options = run(&ws, &step, &secrets).unwrap();

    assert_eq!(options["token"], json!("from-environment"));
}

#[test]
fn test_alias_and_canonical_in_one_document_section() {
    let ws = TestWorkspace::new();
    ws.write_config("steps:\n  aliasStep:\n    chartPath: a\n    helmChartPath: b\n    namespace: ns\n");
    let step = metadata(
        r#"metadata:
  name: aliasStep
spec:
  inputs:
    params:
      - name: chartPath
        aliases: [{name: helmChartPath}]
      - name: namespace
        possibleValues: [prod]
"#,
    );

    let report = run(&ws, &step, &MemorySecretStore::new()).unwrap_err();

    let kinds: Vec<&str> = report.iter().map(|v| v.kind.label()).collect();
    assert_eq!(kinds, vec!["ambiguous", "not-allowed"]);
}

#[test]
fn test_empty_step_value_overrides_general() {
    let ws = TestWorkspace::new();
    ws.write_config("general:\n  proxy: http://proxy:8080\nsteps:\n  netStep:\n    proxy: \"\"\n");
    let step = metadata(
        "metadata:\n  name: netStep\nspec:\n  inputs:\n    params:\n      - name: proxy\n",
    );

    let options = run(&ws, &step, &MemorySecretStore::new()).unwrap();

    assert_eq!(options["proxy"], json!(""));
}

#[test]
fn test_stacked_documents_override_across_alias_names() {
    let ws = TestWorkspace::new();
    let shipped = ws.write_file(
        "defaults/shipped.yml",
        "general:\n  githubOrg: shipped-org\nsteps:\n  legacyRepoStep:\n    repoName: legacy\n",
    );
    ws.write_config("general:\n  owner: project-org\nsteps:\n  repoStep:\n    repository: current\n");
    let step = metadata(
        r#"metadata:
  name: repoStep
  aliases: [{name: legacyRepoStep, deprecated: true}]
spec:
  inputs:
    params:
      - name: owner
        aliases: [{name: githubOrg}]
      - name: repository
        aliases: [{name: repoName}]
"#,
    );

    let mut document = ConfigDocument::load(&shipped).unwrap();
    document.merge(&ConfigDocument::load(&ws.config_path()).unwrap(), &step);
    let environment = DirectoryEnvironment::new(ws.environment_dir());
    let secrets = MemorySecretStore::new();
    let redactor = Redactor::new();
    let resolver = ConfigResolver::new(
        &step,
        ResolverOptions::default(),
        Collaborators::new(&secrets, &environment, &redactor),
    )
    .unwrap();

    let resolution = resolver
        .resolve::<Map<String, Value>>(
            LayerSet::new()
                .with(document.general_layer())
                .with(document.step_layer(&step)),
        )
        .unwrap();

    assert_eq!(resolution.options["owner"], json!("project-org"));
    assert_eq!(resolution.options["repository"], json!("current"));
}
