//! `get.one`

use async_trait::async_trait;

use kubeact_core::SharedContext;

use super::{ActionProcessor, parse_items, validation};
use crate::args::{push_extra, push_labels, push_with_value};
use crate::binder::bind_result;
use crate::env::ActionEnv;
use crate::error::{ActionError, Result};
use crate::handlers::ActionKind;
use crate::manifest::ManifestSource;
use crate::options::GetOneOptions;

/// Fetches a single resource; the first one when several match
pub struct GetOneProcessor {
    options: GetOneOptions,
    env: ActionEnv,
}

impl GetOneProcessor {
    pub fn new(options: GetOneOptions, env: ActionEnv) -> Self {
        Self { options, env }
    }

    pub async fn prepare_args(&self, context: &SharedContext) -> Result<Vec<String>> {
        let manifests = self.env.manifests(context);
        let options = &self.options;
        let mut args = vec!["get".to_string()];

        push_with_value(&mut args, "-n", options.namespace.as_deref());
        push_with_value(&mut args, "--chunk-size", Some(1));
        push_labels(&mut args, options.labels.as_ref());
        push_extra(&mut args, options.extra.as_deref());
        args.extend(options.resource.clone());
        args.extend(options.name.clone());

        if let Some(path) = &options.path {
            let files = manifests
                .resolve_source(&ManifestSource::Path(path.clone()))
                .await?;
            for dir in files.iter().filter_map(|file| file.parent()) {
                args.push("-R".to_string());
                args.push("-f".to_string());
                args.push(dir.display().to_string());
            }
        }

        if let Some(inline) = &options.inline {
            let file = manifests.write_yaml_to_temp_file(inline).await?;
            push_with_value(&mut args, "-f", Some(file.display()));
        }

        push_with_value(&mut args, "-o", Some("json"));

        Ok(args)
    }
}

#[async_trait]
impl ActionProcessor for GetOneProcessor {
    fn kind(&self) -> ActionKind {
        ActionKind::GetOne
    }

    fn validate(&self) -> Result<()> {
        validation(ActionKind::GetOne, self.options.validate())
    }

    async fn execute(&self, context: &mut SharedContext) -> Result<()> {
        let args = self.prepare_args(context).await?;
        let stdout = self.env.exec(&args, self.options.debug, "\n").await?;

        let item = parse_items(&stdout)?
            .into_iter()
            .next()
            .ok_or(ActionError::NotFound)?;

        bind_result(
            context,
            self.options.assign_resource_to.as_ref(),
            self.options.push_resource_to.as_ref(),
            &item,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::testing::Harness;
    use crate::runner::ExecOutput;
    use serde_json::{Value as JsonValue, json};

    fn processor(harness: &Harness, value: JsonValue) -> GetOneProcessor {
        GetOneProcessor::new(serde_json::from_value(value).unwrap(), harness.env.clone())
    }

    #[tokio::test]
    async fn test_get_one_by_name_binds_object() {
        let harness = Harness::new([ExecOutput::success(
            r#"{"kind":"Deployment","metadata":{"name":"web"}}"#,
        )]);
        let processor = processor(
            &harness,
            json!({
                "namespace": "prod",
                "resource": "deployment",
                "name": "web",
                "assignResourceTo": "$.ctx.deployment",
                "pushResourceTo": "$.ctx.seen"
            }),
        );
        processor.validate().unwrap();

        let mut context = SharedContext::new();
        processor.execute(&mut context).await.unwrap();

        insta::assert_debug_snapshot!(harness.args(), @r###"
        [
            "get",
            "-n",
            "prod",
            "--chunk-size",
            "1",
            "deployment",
            "web",
            "-o",
            "json",
        ]
        "###);
        assert_eq!(context.ctx["deployment"]["metadata"]["name"], "web");
        assert_eq!(context.ctx["seen"], json!([{"kind": "Deployment", "metadata": {"name": "web"}}]));
    }

    #[tokio::test]
    async fn test_get_one_binds_first_list_item() {
        let harness = Harness::new([ExecOutput::success(
            r#"{"kind":"List","items":[{"metadata":{"name":"a"}},{"metadata":{"name":"b"}}]}"#,
        )]);
        let processor = processor(
            &harness,
            json!({"resource": "pods", "labels": {"app": "web"}, "assignResourceTo": "$.ctx.pod"}),
        );

        let mut context = SharedContext::new();
        processor.execute(&mut context).await.unwrap();

        assert_eq!(context.ctx["pod"], json!({"metadata": {"name": "a"}}));
    }

    #[tokio::test]
    async fn test_get_one_empty_list_is_not_found() {
        let harness = Harness::new([ExecOutput::success(r#"{"kind":"List","items":[]}"#)]);
        let processor = processor(
            &harness,
            json!({"resource": "pods", "labels": {"app": "none"}, "assignResourceTo": "$.ctx.pod"}),
        );

        let mut context = SharedContext::new();
        let err = processor.execute(&mut context).await.unwrap_err();

        assert!(matches!(err, ActionError::NotFound));
        assert_eq!(context.ctx, json!({}));
    }

    #[tokio::test]
    async fn test_get_one_by_path_resolves_template() {
        let harness = Harness::new([ExecOutput::success(r#"{"kind":"Service"}"#)]);
        harness.write("svc.yaml", "kind: Service\nmetadata:\n  name: <$= parameters.svc $>\n");
        let processor = processor(&harness, json!({"path": "svc.yaml"}));

        let mut context = SharedContext::new().with_parameters(json!({"svc": "api"}));
        processor.execute(&mut context).await.unwrap();

        let args = harness.args();
        assert_eq!(&args[..5], ["get", "--chunk-size", "1", "-R", "-f"]);
        assert_eq!(&args[6..], ["-o", "json"]);
        assert!(std::path::Path::new(&args[5]).join("svc.yaml").exists());
        assert_eq!(
            harness.recursive_files(),
            ["kind: Service\nmetadata:\n  name: api\n"]
        );
    }

    #[tokio::test]
    async fn test_get_one_inline() {
        let harness = Harness::new([ExecOutput::success(r#"{"kind":"ConfigMap"}"#)]);
        let processor = processor(
            &harness,
            json!({"inline": {"apiVersion": "v1", "kind": "ConfigMap", "metadata": {"name": "cm"}}}),
        );
        processor.validate().unwrap();

        processor.execute(&mut SharedContext::new()).await.unwrap();

        let args = harness.args();
        assert_eq!(args[3], "-f");
        assert!(args[4].ends_with(".yaml"));
        assert_eq!(args.len(), 7);
    }
}
