//! `get.all`

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use kubeact_core::SharedContext;

use super::{ActionProcessor, joined, parse_items, push_inline, push_paths, validation};
use crate::args::{push_extra, push_labels, push_with_value};
use crate::binder::bind_result;
use crate::env::ActionEnv;
use crate::error::Result;
use crate::handlers::ActionKind;
use crate::options::GetAllOptions;

/// Fetches every matching resource as one list
pub struct GetAllProcessor {
    options: GetAllOptions,
    env: ActionEnv,
}

impl GetAllProcessor {
    pub fn new(options: GetAllOptions, env: ActionEnv) -> Self {
        Self { options, env }
    }

    pub async fn prepare_args(&self, context: &SharedContext) -> Result<Vec<String>> {
        let manifests = self.env.manifests(context);
        let options = &self.options;
        let mut args = vec!["get".to_string()];

        push_with_value(&mut args, "-n", options.namespace.as_deref());
        push_labels(&mut args, options.labels.as_ref());
        push_extra(&mut args, options.extra.as_deref());
        args.extend(joined(options.resources.as_deref(), ","));
        args.extend(joined(options.names.as_deref(), " "));
        push_paths(&mut args, &self.env, &manifests, options.paths.as_deref()).await?;
        push_inline(&mut args, &manifests, options.inline.as_deref()).await?;
        push_with_value(&mut args, "-o", Some("json"));

        Ok(args)
    }
}

#[async_trait]
impl ActionProcessor for GetAllProcessor {
    fn kind(&self) -> ActionKind {
        ActionKind::GetAll
    }

    fn validate(&self) -> Result<()> {
        validation(ActionKind::GetAll, self.options.validate())
    }

    async fn execute(&self, context: &mut SharedContext) -> Result<()> {
        let args = self.prepare_args(context).await?;
        let stdout = self.env.exec(&args, self.options.debug, "").await?;

        let items = parse_items(&stdout)?;
        if items.is_empty() {
            tracing::warn!("Unable to find any resources");
        }

        bind_result(
            context,
            self.options.assign_resources_to.as_ref(),
            self.options.push_resources_to.as_ref(),
            &JsonValue::Array(items),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActionError;
    use crate::processors::testing::Harness;
    use crate::runner::ExecOutput;
    use serde_json::json;

    fn processor(harness: &Harness, value: JsonValue) -> GetAllProcessor {
        GetAllProcessor::new(serde_json::from_value(value).unwrap(), harness.env.clone())
    }

    #[tokio::test]
    async fn test_get_all_binds_list_items() {
        let stdout = "{\n  \"kind\": \"List\",\n  \"items\": [\n    {\"kind\": \"Pod\", \"metadata\": {\"name\": \"a\"}},\n    {\"kind\": \"Pod\", \"metadata\": {\"name\": \"b\"}}\n  ]\n}\n";
        let harness = Harness::new([ExecOutput::success(stdout)]);
        let processor = processor(
            &harness,
            json!({
                "resources": ["pods"],
                "labels": {"app": "web"},
                "assignResourcesTo": "$.ctx.pods",
                "pushResourcesTo": {"secrets": "$.pods", "children": true}
            }),
        );
        processor.validate().unwrap();

        let mut context = SharedContext::new();
        processor.execute(&mut context).await.unwrap();

        assert_eq!(
            harness.args(),
            ["get", "-l", "app=web", "pods", "-o", "json"]
        );
        assert_eq!(context.ctx["pods"].as_array().unwrap().len(), 2);
        assert_eq!(context.ctx["pods"][1]["metadata"]["name"], "b");
        assert_eq!(context.secrets["pods"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_all_empty_result_is_bound() {
        let harness = Harness::new([ExecOutput::success(r#"{"kind":"List","items":[]}"#)]);
        let processor = processor(
            &harness,
            json!({"resources": ["pods"], "names": ["missing"], "assignResourcesTo": "$.ctx.pods"}),
        );

        let mut context = SharedContext::new();
        processor.execute(&mut context).await.unwrap();

        assert_eq!(context.ctx["pods"], json!([]));
        assert_eq!(
            harness.args(),
            ["get", "pods", "missing", "-o", "json"]
        );
    }

    #[tokio::test]
    async fn test_get_all_single_object_is_wrapped() {
        let harness = Harness::new([ExecOutput::success(r#"{"kind":"Pod","metadata":{"name":"a"}}"#)]);
        let processor = processor(
            &harness,
            json!({"resources": ["pod"], "names": ["a"], "pushResourcesTo": "$.ctx.found"}),
        );

        let mut context = SharedContext::new();
        processor.execute(&mut context).await.unwrap();

        assert_eq!(context.ctx["found"], json!([[{"kind": "Pod", "metadata": {"name": "a"}}]]));
    }

    #[tokio::test]
    async fn test_get_all_invalid_json() {
        let harness = Harness::new([ExecOutput::success("No resources found")]);
        let processor = processor(&harness, json!({"resources": ["pods"]}));

        let err = processor.execute(&mut SharedContext::new()).await.unwrap_err();
        assert!(matches!(err, ActionError::Parse(_)));
    }
}
