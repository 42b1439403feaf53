use crate::IngressGroup;
use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Load balancer exposure mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scheme {
    Internal,
    InternetFacing,
}

/// Scheme assumed when an Ingress does not set the scheme annotation.
pub const DEFAULT_SCHEME: Scheme = Scheme::Internal;

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::InternetFacing => "internet-facing",
        }
    }
}

impl FromStr for Scheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "internal" => Ok(Self::Internal),
            "internet-facing" => Ok(Self::InternetFacing),
            s => bail!("unknown load balancer scheme: {s}"),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadBalancerType {
    Application,
    Network,
}

impl LoadBalancerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Network => "network",
        }
    }
}

impl FromStr for LoadBalancerType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "application" => Ok(Self::Application),
            "network" => Ok(Self::Network),
            s => bail!("unknown load balancer type: {s}"),
        }
    }
}

impl fmt::Display for LoadBalancerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deletion protection key within the flattened `load-balancer-attributes`
/// annotation map.
pub const ATTR_DELETION_PROTECTION: &str = "deletion_protection.enabled";

/// Stable identity token used to locate a group's live load balancer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LoadBalancerIdentity(pub String);

impl fmt::Display for LoadBalancerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenerSpec {
    pub protocol: String,
    pub port: u16,
}

/// The load balancer a group's combined configuration asks for. Produced
/// fresh per evaluation and never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DesiredLoadBalancerModel {
    pub identity: LoadBalancerIdentity,
    pub scheme: Scheme,
    pub lb_type: LoadBalancerType,
    pub attributes: BTreeMap<String, String>,
    pub listeners: Vec<ListenerSpec>,
    pub tags: BTreeMap<String, String>,
}

/// A discovered, currently-provisioned load balancer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveLoadBalancerState {
    pub arn: String,
    pub dns_name: String,
    pub scheme: Scheme,
    pub lb_type: LoadBalancerType,
    pub attributes: BTreeMap<String, String>,
}

/// One identity-defining attribute that differs between desired and live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeMismatch {
    pub attribute: &'static str,
    pub desired: String,
    pub live: String,
}

/// Whether the provider would have to destroy and recreate the load balancer
/// to satisfy the desired model, with the mismatches that triggered it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplacementDecision {
    pub requires_replacement: bool,
    pub mismatches: Vec<AttributeMismatch>,
}

impl ReplacementDecision {
    pub fn no_replacement() -> Self {
        Self::default()
    }

    /// Diffs the identity-defining attributes the provider cannot mutate in
    /// place. Any mismatch forces replacement.
    pub fn diff(desired: &DesiredLoadBalancerModel, live: &LiveLoadBalancerState) -> Self {
        let mut mismatches = Vec::new();
        if desired.scheme != live.scheme {
            mismatches.push(AttributeMismatch {
                attribute: "scheme",
                desired: desired.scheme.to_string(),
                live: live.scheme.to_string(),
            });
        }
        if desired.lb_type != live.lb_type {
            mismatches.push(AttributeMismatch {
                attribute: "type",
                desired: desired.lb_type.to_string(),
                live: live.lb_type.to_string(),
            });
        }
        Self {
            requires_replacement: !mismatches.is_empty(),
            mismatches,
        }
    }
}

/// Builds the desired load balancer model for a group's full membership.
#[async_trait::async_trait]
pub trait BuildModel {
    async fn build(&self, group: &IngressGroup) -> Result<DesiredLoadBalancerModel>;
}

/// Finds the live load balancer carrying a group's identity token, if any.
#[async_trait::async_trait]
pub trait DiscoverLoadBalancer {
    async fn find_by_identity(
        &self,
        identity: &LoadBalancerIdentity,
    ) -> Result<Option<LiveLoadBalancerState>>;
}
