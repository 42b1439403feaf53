use alb_admission_core::{IngressClassInfo, ResolveIngressClass};
use alb_admission_k8s_api::{IngressClass, ResourceExt, DEFAULT_CLASS_ANNOTATION};
use anyhow::{anyhow, Context, Result};
use kube::{api::ListParams, Api, Client};

/// Resolves IngressClass references against the cluster.
#[derive(Clone)]
pub struct ClassResolver {
    api: Api<IngressClass>,
}

impl ClassResolver {
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }
}

#[async_trait::async_trait]
impl ResolveIngressClass for ClassResolver {
    async fn resolve(&self, name: &str) -> Result<IngressClassInfo> {
        let class = self
            .api
            .get_opt(name)
            .await
            .with_context(|| format!("failed to get ingressclass {name}"))?
            .ok_or_else(|| anyhow!("ingressclasses.networking.k8s.io {name:?} not found"))?;
        Ok(info(&class))
    }

    async fn default_class(&self) -> Result<Option<IngressClassInfo>> {
        let classes = self
            .api
            .list(&ListParams::default())
            .await
            .context("failed to list ingressclasses")?;
        Ok(classes
            .items
            .iter()
            .find(|class| {
                class
                    .annotations()
                    .get(DEFAULT_CLASS_ANNOTATION)
                    .is_some_and(|v| v == "true")
            })
            .map(info))
    }
}

fn info(class: &IngressClass) -> IngressClassInfo {
    IngressClassInfo {
        name: class.name_any(),
        controller: class
            .spec
            .as_ref()
            .and_then(|spec| spec.controller.clone())
            .unwrap_or_default(),
    }
}
