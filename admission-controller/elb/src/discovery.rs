use crate::STACK_TAG;
use alb_admission_core::{
    DiscoverLoadBalancer, LiveLoadBalancerState, LoadBalancerIdentity, LoadBalancerType, Scheme,
};
use anyhow::{anyhow, Context, Result};
use aws_sdk_elasticloadbalancingv2::Client;
use std::collections::BTreeMap;
use tracing::debug;

// DescribeTags accepts at most 20 resource ARNs per call.
const DESCRIBE_TAGS_CHUNK: usize = 20;

/// Finds the live load balancer owned by a group by matching the stack tag
/// this controller stamps on every load balancer it provisions.
#[derive(Clone)]
pub struct ElbDiscovery {
    client: Client,
}

impl ElbDiscovery {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }

    async fn find_arn_by_stack(&self, stack: &str) -> Result<Option<String>> {
        let mut marker: Option<String> = None;
        loop {
            let mut req = self.client.describe_load_balancers();
            if let Some(m) = marker.take() {
                req = req.marker(m);
            }
            let page = req.send().await.context("DescribeLoadBalancers failed")?;

            let arns: Vec<String> = page
                .load_balancers()
                .iter()
                .filter_map(|lb| lb.load_balancer_arn().map(str::to_string))
                .collect();
            for chunk in arns.chunks(DESCRIBE_TAGS_CHUNK) {
                let tags = self
                    .client
                    .describe_tags()
                    .set_resource_arns(Some(chunk.to_vec()))
                    .send()
                    .await
                    .context("DescribeTags failed")?;
                for desc in tags.tag_descriptions() {
                    let matched = desc
                        .tags()
                        .iter()
                        .any(|tag| tag.key() == Some(STACK_TAG) && tag.value() == Some(stack));
                    if matched {
                        if let Some(arn) = desc.resource_arn() {
                            return Ok(Some(arn.to_string()));
                        }
                    }
                }
            }

            match page.next_marker() {
                Some(m) => marker = Some(m.to_string()),
                None => return Ok(None),
            }
        }
    }

    async fn describe(&self, arn: &str) -> Result<LiveLoadBalancerState> {
        let out = self
            .client
            .describe_load_balancers()
            .load_balancer_arns(arn)
            .send()
            .await
            .context("DescribeLoadBalancers failed")?;
        let lb = out
            .load_balancers()
            .first()
            .ok_or_else(|| anyhow!("load balancer {arn} disappeared during discovery"))?;

        let scheme: Scheme = lb
            .scheme()
            .map(|s| s.as_str())
            .unwrap_or_default()
            .parse()
            .with_context(|| format!("load balancer {arn}"))?;
        let lb_type: LoadBalancerType = lb
            .r#type()
            .map(|t| t.as_str())
            .unwrap_or_default()
            .parse()
            .with_context(|| format!("load balancer {arn}"))?;

        let attrs = self
            .client
            .describe_load_balancer_attributes()
            .load_balancer_arn(arn)
            .send()
            .await
            .context("DescribeLoadBalancerAttributes failed")?;
        let mut attributes = BTreeMap::new();
        for attr in attrs.attributes() {
            if let (Some(k), Some(v)) = (attr.key(), attr.value()) {
                attributes.insert(k.to_string(), v.to_string());
            }
        }

        Ok(LiveLoadBalancerState {
            arn: arn.to_string(),
            dns_name: lb.dns_name().unwrap_or_default().to_string(),
            scheme,
            lb_type,
            attributes,
        })
    }
}

#[async_trait::async_trait]
impl DiscoverLoadBalancer for ElbDiscovery {
    async fn find_by_identity(
        &self,
        identity: &LoadBalancerIdentity,
    ) -> Result<Option<LiveLoadBalancerState>> {
        let Some(arn) = self.find_arn_by_stack(&identity.0).await? else {
            debug!(%identity, "No live load balancer for stack");
            return Ok(None);
        };
        debug!(%identity, %arn, "Matched live load balancer");
        self.describe(&arn).await.map(Some)
    }
}
