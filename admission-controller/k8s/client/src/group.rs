use alb_admission_core::{annotations, GroupId, IngressGroup, LoadGroup};
use alb_admission_k8s_api::{ingress_resource, Ingress};
use anyhow::{Context, Result};
use kube::{api::ListParams, Api, Client};
use tracing::debug;

/// Loads the full current membership of an ingress group from the cluster.
#[derive(Clone)]
pub struct GroupLoader {
    client: Client,
}

impl GroupLoader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl LoadGroup for GroupLoader {
    async fn load(&self, id: &GroupId) -> Result<IngressGroup> {
        let members = match id {
            GroupId::Explicit(name) => {
                let api: Api<Ingress> = Api::all(self.client.clone());
                let list = api
                    .list(&ListParams::default())
                    .await
                    .context("failed to list ingresses")?;
                list.items
                    .iter()
                    .map(ingress_resource)
                    .filter(|ing| {
                        annotations::parse_string(
                            annotations::SUFFIX_GROUP_NAME,
                            &ing.annotations,
                        ) == Some(name.as_str())
                    })
                    .collect()
            }
            GroupId::Implicit(ingress_ref) => {
                let api: Api<Ingress> = Api::namespaced(self.client.clone(), &ingress_ref.namespace);
                // The object may not be persisted yet on the create path.
                match api
                    .get_opt(&ingress_ref.name)
                    .await
                    .with_context(|| format!("failed to get ingress {ingress_ref}"))?
                {
                    Some(ing) => vec![ingress_resource(&ing)],
                    None => Vec::new(),
                }
            }
        };
        debug!(group = %id, members = members.len(), "Loaded group membership");
        Ok(IngressGroup::new(id.clone(), members))
    }
}
