//! Ready-made documents shared by several test suites.

/// Metadata of a small step exercising every parameter feature.
///
/// - `title`: mandatory string, steps only
/// - `owner`: alias `githubOrg`, shared environment `github/owner`
/// - `token`: mandatory secret, deprecated alias `access_token`, secret
///   reference with entry name configurable under `tokenSecretName`
/// - `labels`: string list
/// - `retries`: int, default 3
/// - `verbose`: bool, default false
/// - `mode`: one of `fast`, `safe`
/// - `extra`: map
pub const DEMO_STEP_METADATA: &str = r#"metadata:
  name: demoStep
  aliases:
    - name: demo
      deprecated: true
  description: Step used by tests.
spec:
  inputs:
    params:
      - name: title
        type: string
        scope: [STEPS]
        mandatory: true
      - name: owner
        type: string
        scope: [GENERAL, PARAMETERS, STAGES, STEPS]
        aliases:
          - name: githubOrg
        resourceRef:
          - type: commonPipelineEnvironment
            param: github/owner
      - name: token
        type: string
        scope: [GENERAL, PARAMETERS, STAGES, STEPS]
        mandatory: true
        secret: true
        aliases:
          - name: access_token
            deprecated: true
        resourceRef:
          - type: vaultSecret
            name: tokenSecretName
            default: demo-token
      - name: labels
        type: "[]string"
        scope: [PARAMETERS, STAGES, STEPS]
      - name: retries
        type: int
        scope: [GENERAL, PARAMETERS, STAGES, STEPS]
        default: 3
      - name: verbose
        type: bool
        scope: [GENERAL, PARAMETERS, STAGES, STEPS]
        default: false
      - name: mode
        type: string
        scope: [PARAMETERS, STAGES, STEPS]
        possibleValues: [fast, safe]
      - name: extra
        type: "map[string]interface{}"
        scope: [STEPS]
"#;

/// Project configuration covering general, stage and step sections.
pub const DEMO_CONFIG: &str = r#"general:
  owner: general-owner
  retries: 5
stages:
  Build:
    retries: 7
    labels: [build]
steps:
  demoStep:
    title: Nightly findings
    mode: safe
    extra:
      severity: high
"#;
