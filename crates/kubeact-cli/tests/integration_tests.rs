//! Integration tests for CLI commands
//!
//! `run` tests point `--kubectl` at a shell script that records its
//! arguments and the manifests it is handed.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value as JsonValue;
use tempfile::TempDir;

/// Helper to run kubeact command
fn kubeact(args: &[&str]) -> Output {
    kubeact_with_env(args, &[])
}

fn kubeact_with_env(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_kubeact"));
    command.args(args).env_remove("RUST_LOG").env_remove("KUBEACT_KUBECTL");
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().expect("Failed to execute kubeact")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

mod actions_command {
    use super::*;

    #[test]
    fn test_lists_ids_and_aliases() {
        let output = kubeact(&["actions"]);

        assert!(output.status.success());
        let stdout = stdout(&output);
        assert!(stdout.contains("get.one"));
        assert!(stdout.contains("com.fireblink.fbl.plugins.k8s.kubectl.apply.docker.secret"));
        assert!(stdout.contains("k8s.kubectl.wait"));
    }

    #[test]
    fn test_json_output() {
        let output = kubeact(&["actions", "--json"]);

        assert!(output.status.success());
        let actions: JsonValue =
            serde_json::from_str(&stdout(&output)).expect("Output should be valid JSON");
        let actions = actions.as_array().unwrap();
        assert_eq!(actions.len(), 7);
        assert_eq!(actions[0]["id"], "com.fireblink.fbl.plugins.k8s.kubectl.apply");
        assert_eq!(actions[0]["aliases"].as_array().unwrap().len(), 3);
    }
}

mod validate_command {
    use super::*;

    #[test]
    fn test_valid_options() {
        let dir = TempDir::new().unwrap();
        let options = write(
            dir.path(),
            "wait.yaml",
            "resource: deployment\nname: web\nfor:\n  condition: Available\n",
        );

        let output = kubeact(&["validate", "kubectl.wait", "-f", options.to_str().unwrap()]);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("Options are valid"));
    }

    #[test]
    fn test_invalid_options_exit_code() {
        let dir = TempDir::new().unwrap();
        let options = write(dir.path(), "wait.yaml", "resource: deployment\nname: web\n");

        let output = kubeact(&["validate", "kubectl.wait", "-f", options.to_str().unwrap()]);

        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn test_unknown_field_exit_code() {
        let dir = TempDir::new().unwrap();
        let options = write(dir.path(), "delete.yaml", "resources: [pods]\nforce: true\n");

        let output = kubeact(&["validate", "kubectl.delete", "-f", options.to_str().unwrap()]);

        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn test_unknown_action_exit_code() {
        let output = kubeact(&["validate", "kubectl.aply"]);

        assert_eq!(output.status.code(), Some(64));
        assert!(stderr(&output).contains("kubectl.aply"));
    }

    #[test]
    fn test_missing_options_file_exit_code() {
        let output = kubeact(&["validate", "kubectl.apply", "-f", "/nonexistent/options.yaml"]);

        assert_eq!(output.status.code(), Some(5));
    }
}

#[cfg(unix)]
mod run_command {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    const FAKE_KUBECTL: &str = r#"#!/bin/sh
here="$(dirname "$0")"
printf '%s\n' "$@" > "$here/args.log"
prev=""
for arg in "$@"; do
  if [ "$prev" = "-f" ]; then
    find "$arg" -type f -exec cat {} \; >> "$here/manifests.log"
  fi
  prev="$arg"
done
if [ -n "$FAKE_STDOUT" ]; then printf '%s\n' "$FAKE_STDOUT"; fi
if [ -n "$FAKE_STDERR" ]; then printf '%s\n' "$FAKE_STDERR" >&2; fi
exit "${FAKE_EXIT:-0}"
"#;

    struct Fixture {
        dir: TempDir,
        kubectl: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            std::fs::create_dir(dir.path().join("bin")).unwrap();
            let kubectl = write(dir.path(), "bin/kubectl", FAKE_KUBECTL);
            std::fs::set_permissions(&kubectl, std::fs::Permissions::from_mode(0o755)).unwrap();
            Self { dir, kubectl }
        }

        fn path(&self) -> &Path {
            self.dir.path()
        }

        fn run(&self, action: &str, options: &str, extra: &[&str], env: &[(&str, &str)]) -> Output {
            let options = write(self.path(), "options.yaml", options);
            let mut args = vec![
                "run",
                action,
                "-f",
                options.to_str().unwrap(),
                "--wd",
                self.path().to_str().unwrap(),
                "--kubectl",
                self.kubectl.to_str().unwrap(),
            ];
            args.extend_from_slice(extra);
            kubeact_with_env(&args, env)
        }

        fn args(&self) -> Vec<String> {
            std::fs::read_to_string(self.path().join("bin/args.log"))
                .unwrap()
                .lines()
                .map(String::from)
                .collect()
        }

        fn manifests(&self) -> String {
            std::fs::read_to_string(self.path().join("bin/manifests.log")).unwrap_or_default()
        }
    }

    #[test]
    fn test_apply_renders_templates_from_params() {
        let fixture = Fixture::new();
        write(
            fixture.path(),
            "manifests/cm.yaml",
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: <$= parameters.name $>\n",
        );

        let output = fixture.run(
            "kubectl.apply",
            "paths:\n  - manifests/*.yaml\nnamespace: dev\n",
            &["-p", "name=web"],
            &[],
        );

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let args = fixture.args();
        assert_eq!(&args[..5], ["apply", "-n", "dev", "-R", "-f"]);
        assert!(fixture.manifests().contains("name: web"));
    }

    #[test]
    fn test_get_one_prints_bound_context() {
        let fixture = Fixture::new();
        let context = write(fixture.path(), "context.yaml", "ctx:\n  cluster: dev\nsecrets:\n  token: hidden\n");

        let output = fixture.run(
            "k8s.kubectl.get.one",
            "resource: deployment\nname: web\nassignResourceTo: $.ctx.deployment\n",
            &["--context", context.to_str().unwrap(), "--print-context"],
            &[("FAKE_STDOUT", r#"{"kind":"Deployment","metadata":{"name":"web"}}"#)],
        );

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert_eq!(
            fixture.args(),
            ["get", "--chunk-size", "1", "deployment", "web", "-o", "json"]
        );

        let printed: JsonValue =
            serde_json::from_str(&stdout(&output)).expect("Output should be valid JSON");
        assert_eq!(printed["ctx"]["cluster"], "dev");
        assert_eq!(printed["ctx"]["deployment"]["metadata"]["name"], "web");
        assert!(printed.get("secrets").is_none());
        assert!(!stdout(&output).contains("hidden"));
    }

    #[test]
    fn test_get_one_not_found() {
        let fixture = Fixture::new();

        let output = fixture.run(
            "kubectl.get.one",
            "resource: pods\nlabels:\n  app: none\n",
            &[],
            &[("FAKE_STDOUT", r#"{"kind":"List","items":[]}"#)],
        );

        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Unable to find any resources"));
    }

    #[test]
    fn test_command_failure_exit_code() {
        let fixture = Fixture::new();

        let output = fixture.run(
            "kubectl.delete",
            "resources: [pods]\nnames: [web]\n",
            &[],
            &[("FAKE_EXIT", "1"), ("FAKE_STDERR", "pods \"web\" not found")],
        );

        assert_eq!(output.status.code(), Some(6));
        let stderr = stderr(&output);
        assert!(stderr.contains("command failed"));
        assert!(stderr.contains("not found"));
        assert_eq!(fixture.args(), ["delete", "pods", "web"]);
    }

    #[test]
    fn test_glob_without_match_exit_code() {
        let fixture = Fixture::new();

        let output = fixture.run("kubectl.create", "paths:\n  - missing/*.yaml\n", &[], &[]);

        assert_eq!(output.status.code(), Some(5));
        assert!(stderr(&output).contains("Unable to find any json or yaml files matching"));
        assert!(!fixture.path().join("bin/args.log").exists());
    }

    #[test]
    fn test_validation_runs_before_kubectl() {
        let fixture = Fixture::new();

        let output = fixture.run("kubectl.delete", "{}\n", &[], &[]);

        assert_eq!(output.status.code(), Some(2));
        assert!(!fixture.path().join("bin/args.log").exists());
    }
}
