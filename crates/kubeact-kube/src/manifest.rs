//! Manifest resolution
//!
//! Turns inline objects, manifest files and glob patterns into files the
//! tool can read. Files go through template resolution first:
//!
//! 1. the global template pass over the raw text
//! 2. YAML parsing (multi-document streams are supported)
//! 3. the local template pass over each document
//! 4. `$ref:` reference resolution
//!
//! A single document is written back as-is; several documents are each
//! prefixed with `---`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};

use kubeact_core::SharedContext;
use kubeact_engine::TemplateResolver;

use crate::error::{ActionError, Result};
use crate::temp::TempPathsRegistry;

/// Extensions picked up from glob matches
const MANIFEST_EXTENSIONS: &[&str] = &["json", "yml", "yaml"];

/// Where manifests come from
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestSource {
    /// Object given directly in the options
    Inline(JsonValue),
    /// A single manifest file
    Path(String),
    /// A glob pattern of manifest files
    Glob(String),
}

/// Resolves manifests relative to a working directory
pub struct ManifestResolver<'a> {
    wd: &'a Path,
    temp: &'a TempPathsRegistry,
    resolver: &'a dyn TemplateResolver,
    context: &'a SharedContext,
}

impl<'a> ManifestResolver<'a> {
    pub fn new(
        wd: &'a Path,
        temp: &'a TempPathsRegistry,
        resolver: &'a dyn TemplateResolver,
        context: &'a SharedContext,
    ) -> Self {
        Self {
            wd,
            temp,
            resolver,
            context,
        }
    }

    /// Absolute form of `path`, relative paths are taken from the working directory
    pub fn absolute_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.wd.join(path)
    }

    /// Resolve any source into the files to hand to the tool
    ///
    /// Inline objects and single files produce one file each; globs produce
    /// one file per matching manifest, all in a fresh directory.
    pub async fn resolve_source(&self, source: &ManifestSource) -> Result<Vec<PathBuf>> {
        match source {
            ManifestSource::Inline(value) => Ok(vec![self.write_yaml_to_temp_file(value).await?]),
            ManifestSource::Path(path) => {
                let source = self.absolute_path(path);
                let target = self.temp.create_temp_dir()?.join(file_name(&source));
                self.process_template_file(&source, &target).await?;
                Ok(vec![target])
            }
            ManifestSource::Glob(pattern) => {
                let target = self.temp.create_temp_dir()?;
                let files = self.process_glob_path(pattern, &target).await?;
                Ok(files)
            }
        }
    }

    /// Write a value as YAML into a new temp file
    pub async fn write_yaml_to_temp_file(&self, value: &JsonValue) -> Result<PathBuf> {
        let path = self.temp.create_temp_file("yaml")?;
        tokio::fs::write(&path, serde_yaml::to_string(value)?).await?;
        Ok(path)
    }

    /// Write a value as JSON into a new temp file
    pub async fn write_json_to_temp_file<T: serde::Serialize>(&self, value: &T) -> Result<PathBuf> {
        let path = self.temp.create_temp_file("json")?;
        tokio::fs::write(&path, serde_json::to_string(value)?).await?;
        Ok(path)
    }

    /// Expand `pattern` and resolve every manifest it matches
    ///
    /// Files land in `<target_dir>/<sha256 of the absolute pattern>/` as
    /// `<index>_<file name>`, the index counting manifest files only. Matches
    /// are processed in glob order, which is alphabetical.
    pub async fn process_glob_path(&self, pattern: &str, target_dir: &Path) -> Result<Vec<PathBuf>> {
        let absolute = self.absolute_path(pattern).to_string_lossy().into_owned();

        let matches = glob::glob(&absolute)
            .map_err(|e| ActionError::InvalidGlob {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?
            .collect::<std::result::Result<Vec<PathBuf>, _>>()
            .map_err(std::io::Error::from)?;

        let dir = target_dir.join(hex::encode(Sha256::digest(absolute.as_bytes())));
        tokio::fs::create_dir_all(&dir).await?;

        let mut written = Vec::new();
        for source in matches {
            if !is_manifest(&source) {
                continue;
            }

            let target = dir.join(format!("{}_{}", written.len(), file_name(&source)));
            self.process_template_file(&source, &target).await?;
            written.push(target);
        }

        if written.is_empty() {
            return Err(ActionError::NoMatch {
                pattern: pattern.to_string(),
            });
        }

        tracing::debug!(pattern, count = written.len(), dir = %dir.display(), "resolved glob");
        Ok(written)
    }

    /// Resolve templates and references in `source`, writing the result to `target`
    pub async fn process_template_file(&self, source: &Path, target: &Path) -> Result<()> {
        let source = self.absolute_path(source);
        let name = source.display().to_string();

        let text = tokio::fs::read_to_string(&source).await?;
        if text.trim().is_empty() {
            return Err(ActionError::EmptyFile { path: name });
        }

        let text = self.resolver.resolve_global(&text, &name, self.context)?;

        let mut documents = Vec::new();
        for document in parse_documents(&text)? {
            let document = self.resolver.resolve_local(document, &name, self.context)?;
            documents.push(self.resolver.resolve_references(document, self.context)?);
        }

        if documents.is_empty() {
            return Err(ActionError::EmptyFile { path: name });
        }

        tokio::fs::write(target, dump_documents(&documents)?).await?;
        Ok(())
    }
}

/// Parse a YAML stream, skipping empty documents
pub fn parse_documents(text: &str) -> Result<Vec<JsonValue>> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        let value = JsonValue::deserialize(document)?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// Serialize documents, separating them with `---` when there is more than one
pub fn dump_documents(documents: &[JsonValue]) -> Result<String> {
    if let [single] = documents {
        return Ok(serde_yaml::to_string(single)?);
    }

    let mut out = String::new();
    for document in documents {
        out.push_str("---\n");
        out.push_str(&serde_yaml::to_string(document)?);
    }
    Ok(out)
}

fn is_manifest(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MANIFEST_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubeact_engine::{JinjaResolver, NoopResolver};
    use serde_json::json;
    use tempfile::TempDir;

    struct Fixture {
        wd: TempDir,
        temp: TempPathsRegistry,
        context: SharedContext,
    }

    impl Fixture {
        fn new() -> Self {
            let mut context = SharedContext::new();
            context.ctx = json!({"app": "web", "port": 8080});
            Self {
                wd: TempDir::new().unwrap(),
                temp: TempPathsRegistry::new().unwrap(),
                context,
            }
        }

        fn write(&self, name: &str, content: &str) {
            let path = self.wd.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, content).unwrap();
        }

        fn resolver<'a>(&'a self, templates: &'a dyn TemplateResolver) -> ManifestResolver<'a> {
            ManifestResolver::new(self.wd.path(), &self.temp, templates, &self.context)
        }
    }

    #[tokio::test]
    async fn test_glob_filters_and_indexes_manifests() {
        let fx = Fixture::new();
        fx.write("m/a.yaml", "kind: A\n");
        fx.write("m/b.txt", "not a manifest");
        fx.write("m/c.JSON", "{\"kind\": \"C\"}");
        fx.write("m/d.yml", "kind: D\n");

        let target = TempDir::new().unwrap();
        let files = fx
            .resolver(&NoopResolver)
            .process_glob_path("m/*", target.path())
            .await
            .unwrap();

        let names: Vec<String> = files.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, ["0_a.yaml", "1_c.JSON", "2_d.yml"]);

        let absolute = fx.wd.path().join("m/*").to_string_lossy().into_owned();
        let hash = hex::encode(Sha256::digest(absolute.as_bytes()));
        assert!(files.iter().all(|f| f.parent().unwrap() == target.path().join(&hash)));
        assert_eq!(std::fs::read_to_string(&files[1]).unwrap(), "kind: C\n");
    }

    #[tokio::test]
    async fn test_glob_without_manifests_fails() {
        let fx = Fixture::new();
        fx.write("m/readme.md", "# docs");

        let target = TempDir::new().unwrap();
        let err = fx
            .resolver(&NoopResolver)
            .process_glob_path("m/*", target.path())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Unable to find any json or yaml files matching: m/*"
        );
    }

    #[tokio::test]
    async fn test_empty_file_fails_with_path() {
        let fx = Fixture::new();
        fx.write("empty.yaml", "  \n\n");
        let target = TempDir::new().unwrap();

        let err = fx
            .resolver(&NoopResolver)
            .process_template_file(Path::new("empty.yaml"), &target.path().join("out.yaml"))
            .await
            .unwrap_err();

        assert!(matches!(err, ActionError::EmptyFile { .. }));
        assert!(err.to_string().contains("empty.yaml"));
    }

    #[tokio::test]
    async fn test_single_document_has_no_separator() {
        let fx = Fixture::new();
        fx.write(
            "cm.yaml",
            "kind: ConfigMap\nmetadata:\n  name: <$= ctx.app $>\ndata:\n  port: '<%= ctx.port %>'\n  ref: $ref:ctx.app\n",
        );
        let templates = JinjaResolver::builder().build().unwrap();
        let target = TempDir::new().unwrap();
        let out = target.path().join("cm.yaml");

        fx.resolver(&templates)
            .process_template_file(Path::new("cm.yaml"), &out)
            .await
            .unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert!(!written.starts_with("---"));
        assert_eq!(
            parse_documents(&written).unwrap(),
            vec![json!({
                "kind": "ConfigMap",
                "metadata": {"name": "web"},
                "data": {"port": "8080", "ref": "web"}
            })]
        );
    }

    #[tokio::test]
    async fn test_multi_document_keeps_count_and_order() {
        let fx = Fixture::new();
        fx.write("all.yaml", "kind: A\n---\nkind: B\n---\nkind: C\n");
        let target = TempDir::new().unwrap();
        let out = target.path().join("all.yaml");

        fx.resolver(&NoopResolver)
            .process_template_file(Path::new("all.yaml"), &out)
            .await
            .unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written.matches("---\n").count(), 3);
        assert_eq!(
            parse_documents(&written).unwrap(),
            vec![json!({"kind": "A"}), json!({"kind": "B"}), json!({"kind": "C"})]
        );
    }

    #[tokio::test]
    async fn test_multi_document_resolves_each_document() {
        let fx = Fixture::new();
        fx.write(
            "stack.yaml",
            concat!(
                "kind: A\nmetadata:\n  name: <$= ctx.app $>-a\ndata:\n  port: $ref:ctx.port\n",
                "---\n",
                "kind: B\nmetadata:\n  name: '<%= ctx.app %>-b'\ndata:\n  app: $ref:ctx.app\n",
                "---\n",
                "kind: C\nmetadata:\n  name: <$= ctx.app $>-c\ndata:\n  port: '<%= ctx.port + 1 %>'\n",
            ),
        );
        let templates = JinjaResolver::builder().build().unwrap();
        let target = TempDir::new().unwrap();
        let out = target.path().join("stack.yaml");

        fx.resolver(&templates)
            .process_template_file(Path::new("stack.yaml"), &out)
            .await
            .unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written.matches("---\n").count(), 3);
        assert_eq!(
            parse_documents(&written).unwrap(),
            vec![
                json!({"kind": "A", "metadata": {"name": "web-a"}, "data": {"port": 8080}}),
                json!({"kind": "B", "metadata": {"name": "web-b"}, "data": {"app": "web"}}),
                json!({"kind": "C", "metadata": {"name": "web-c"}, "data": {"port": "8081"}}),
            ]
        );
    }

    #[tokio::test]
    async fn test_foreign_template_syntax_passes_through() {
        let fx = Fixture::new();
        let sources = [
            (
                "rule.yaml",
                "kind: PrometheusRule\nspec:\n  groups:\n    - rules:\n        - alert: Down\n          annotations:\n            summary: \"{{ $labels.instance }} is down\"\n",
            ),
            (
                "wf.yaml",
                "kind: Workflow\nspec:\n  templates:\n    - name: say\n      container:\n        args: [\"{{inputs.parameters.message}}\"]\n",
            ),
            (
                "cm.yaml",
                "kind: ConfigMap\nmetadata:\n  name: <$= ctx.app $>-scripts\ndata:\n  run.sh: |\n    ARGS=(a b)\n    echo ${#ARGS[@]} ${HOME}\n",
            ),
        ];
        let templates = JinjaResolver::builder().build().unwrap();
        let target = TempDir::new().unwrap();

        for (name, content) in sources {
            fx.write(name, content);
            let out = target.path().join(name);

            fx.resolver(&templates)
                .process_template_file(Path::new(name), &out)
                .await
                .unwrap();

            let expected = parse_documents(&content.replace("<$= ctx.app $>", "web")).unwrap();
            assert_eq!(
                parse_documents(&std::fs::read_to_string(&out).unwrap()).unwrap(),
                expected,
                "{}",
                name
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_sources() {
        let fx = Fixture::new();
        fx.write("deploy/app.yaml", "kind: Deployment\n");
        let resolver = fx.resolver(&NoopResolver);

        let inline = resolver
            .resolve_source(&ManifestSource::Inline(json!({"kind": "Secret"})))
            .await
            .unwrap();
        assert_eq!(inline.len(), 1);
        assert_eq!(std::fs::read_to_string(&inline[0]).unwrap(), "kind: Secret\n");

        let path = resolver
            .resolve_source(&ManifestSource::Path("deploy/app.yaml".to_string()))
            .await
            .unwrap();
        assert_eq!(file_name(&path[0]), "app.yaml");

        let glob = resolver
            .resolve_source(&ManifestSource::Glob("deploy/*.yaml".to_string()))
            .await
            .unwrap();
        assert_eq!(file_name(&glob[0]), "0_app.yaml");
    }

    #[tokio::test]
    async fn test_write_json_to_temp_file() {
        let fx = Fixture::new();
        let path = fx
            .resolver(&NoopResolver)
            .write_json_to_temp_file(&json!({"b": 1, "a": 2}))
            .await
            .unwrap();

        assert_eq!(path.extension().unwrap(), "json");
        assert_eq!(std::fs::read_to_string(path).unwrap(), r#"{"b":1,"a":2}"#);
    }

    #[test]
    fn test_dump_documents() {
        assert_eq!(dump_documents(&[json!({"a": 1})]).unwrap(), "a: 1\n");
        assert_eq!(
            dump_documents(&[json!({"a": 1}), json!({"b": 2})]).unwrap(),
            "---\na: 1\n---\nb: 2\n"
        );
    }
}
