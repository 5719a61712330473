//! `apply.docker.secret`

use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::Engine as _;
use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::json;

use kubeact_core::SharedContext;

use super::{ActionProcessor, validation};
use crate::args::push_extra;
use crate::env::ActionEnv;
use crate::error::Result;
use crate::handlers::ActionKind;
use crate::options::{DockerCredentials, DockerSecretOptions};

/// Secret type understood by the kubelet for image pulls
pub const DOCKER_CONFIG_JSON_TYPE: &str = "kubernetes.io/dockerconfigjson";
/// Data key holding the docker config
pub const DOCKER_CONFIG_JSON_KEY: &str = ".dockerconfigjson";

/// Applies an image pull secret built from credentials or a docker config file
pub struct ApplyDockerSecretProcessor {
    options: DockerSecretOptions,
    env: ActionEnv,
}

impl ApplyDockerSecretProcessor {
    pub fn new(options: DockerSecretOptions, env: ActionEnv) -> Self {
        Self { options, env }
    }

    /// Raw docker config: the given file, or an `auths` document for the credentials
    async fn docker_config(&self) -> Result<Vec<u8>> {
        match (&self.options.inline, &self.options.path) {
            (Some(credentials), _) => Ok(serde_json::to_vec(&auths(credentials))?),
            (None, Some(path)) => Ok(tokio::fs::read(self.env.wd().join(path)).await?),
            (None, None) => Ok(Vec::new()),
        }
    }

    pub async fn build_secret(&self) -> Result<Secret> {
        let data = BTreeMap::from([(
            DOCKER_CONFIG_JSON_KEY.to_string(),
            ByteString(self.docker_config().await?),
        )]);

        Ok(Secret {
            metadata: ObjectMeta {
                name: Some(self.options.name.clone()),
                namespace: self.options.namespace.clone(),
                labels: self
                    .options
                    .labels
                    .as_ref()
                    .map(|labels| labels.clone().into_iter().collect()),
                ..Default::default()
            },
            type_: Some(DOCKER_CONFIG_JSON_TYPE.to_string()),
            data: Some(data),
            ..Default::default()
        })
    }

    pub async fn prepare_args(&self, context: &SharedContext) -> Result<Vec<String>> {
        let secret = self.build_secret().await?;
        let file = self
            .env
            .manifests(context)
            .write_json_to_temp_file(&secret)
            .await?;

        let mut args = vec![
            "apply".to_string(),
            "-f".to_string(),
            file.display().to_string(),
        ];
        push_extra(&mut args, self.options.extra.as_deref());

        Ok(args)
    }
}

fn auths(credentials: &DockerCredentials) -> serde_json::Value {
    let auth = base64::engine::general_purpose::STANDARD.encode(format!(
        "{}:{}",
        credentials.username, credentials.password
    ));

    let mut servers = serde_json::Map::new();
    servers.insert(
        credentials.server.clone(),
        json!({
            "username": credentials.username,
            "password": credentials.password,
            "email": credentials.email,
            "auth": auth,
        }),
    );

    json!({ "auths": servers })
}

#[async_trait]
impl ActionProcessor for ApplyDockerSecretProcessor {
    fn kind(&self) -> ActionKind {
        ActionKind::ApplyDockerSecret
    }

    fn validate(&self) -> Result<()> {
        validation(ActionKind::ApplyDockerSecret, self.options.validate())
    }

    async fn execute(&self, context: &mut SharedContext) -> Result<()> {
        let args = self.prepare_args(context).await?;
        self.env.exec(&args, self.options.debug, "\n").await?;
        Ok(())
    }
}
