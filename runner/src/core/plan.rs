//! Built-in demonstration plan.
//!
//! Walks through the proxy generator's transform, render and mock commands and
//! deploys the rendered bundle with `apigeecli`. Tokens come from the operator's
//! `gcloud` login via `--default-token`.

use crate::core::types::Step;

pub const DEFAULT_REQUIRED_ENV: [&str; 3] = ["PROJECT_ID", "APIGEE_HOST", "APIGEE_ENV"];

const GEN: &str = "apigee-go-gen";
const APIGEECLI: &str = "apigeecli";

pub fn default_required_env() -> Vec<String> {
    DEFAULT_REQUIRED_ENV.iter().map(|s| s.to_string()).collect()
}

pub fn default_steps() -> Vec<Step> {
    vec![
        step(
            "export",
            "Export API proxy to YAML",
            GEN,
            &[
                "transform",
                "apiproxy-to-yaml",
                "--input",
                "./bundles/helloworld/apiproxy",
                "--output",
                "./out/yaml-first/helloworld/apiproxy.yaml",
            ],
            Some("./out/yaml-first/helloworld/apiproxy.yaml"),
        ),
        step(
            "import",
            "Import YAML to API proxy",
            GEN,
            &[
                "transform",
                "yaml-to-apiproxy",
                "--input",
                "./out/yaml-first/helloworld/apiproxy.yaml",
                "--output",
                "./out/apiproxies/helloworld.zip",
            ],
            Some("./out/apiproxies/helloworld.zip"),
        ),
        step(
            "render",
            "Render OpenAPI",
            GEN,
            &[
                "render",
                "apiproxy",
                "--template",
                "./templates/oas3/apiproxy.yaml",
                "--set-oas",
                "spec=./specs/oas3/petstore.yaml",
                "--include",
                "./templates/oas3/*.tmpl",
                "--set",
                "target_url=https://${APIGEE_HOST}",
                "--output",
                "./out/apiproxies/petstore.zip",
            ],
            Some("./out/apiproxies/petstore.zip"),
        ),
        step(
            "render-dir",
            "Render OpenAPI to directory",
            GEN,
            &[
                "render",
                "apiproxy",
                "--template",
                "./templates/oas3/apiproxy.yaml",
                "--set-oas",
                "spec=./specs/oas3/petstore.yaml",
                "--include",
                "./templates/oas3/*.tmpl",
                "--set",
                "target_url=https://${APIGEE_HOST}",
                "--output",
                "./out/apiproxies/petstore",
            ],
            Some("./out/apiproxies/petstore"),
        ),
        step(
            "deploy",
            "Deploy API proxy",
            APIGEECLI,
            &[
                "apis",
                "create",
                "bundle",
                "--name",
                "petstore",
                "--proxy-zip",
                "./out/apiproxies/petstore.zip",
                "--org",
                "${PROJECT_ID}",
                "--env",
                "${APIGEE_ENV}",
                "--ovr",
                "--wait",
                "--default-token",
            ],
            None,
        ),
        step(
            "mock",
            "Generate mock API proxy",
            GEN,
            &[
                "mock",
                "oas",
                "--input",
                "./specs/oas3/petstore.yaml",
                "--output",
                "./out/apiproxies/petstore-mock.zip",
            ],
            Some("./out/apiproxies/petstore-mock.zip"),
        ),
    ]
}

fn step(id: &str, label: &str, program: &str, args: &[&str], artifact: Option<&str>) -> Step {
    Step {
        id: id.to_string(),
        label: label.to_string(),
        program: program.to_string(),
        args: args.iter().map(|s| s.to_string()).collect(),
        workdir: None,
        artifact: artifact.map(str::to_string),
    }
}
