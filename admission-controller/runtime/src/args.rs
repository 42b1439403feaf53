use crate::{admission::Admission, metrics::AdmissionMetrics};
use alb_admission_core::{IngressValidator, Scheme, ValidatorConfig};
use alb_admission_elb::{AnnotationModelBuilder, ElbDiscovery};
use alb_admission_k8s_client::{ClassResolver, GroupLoader};
use anyhow::{bail, Result};
use clap::Parser;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::time::Duration;

#[derive(Debug, Parser)]
#[clap(name = "alb-admission", about = "Admission guard for ALB Ingress resources")]
pub struct Args {
    #[clap(
        long,
        default_value = "alb_admission=info,warn",
        env = "ALB_ADMISSION_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    server: kubert::ServerArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// The IngressClass this controller serves.
    #[clap(long, default_value = "alb")]
    ingress_class: String,

    /// Forbids new usage of the legacy `kubernetes.io/ingress.class`
    /// annotation.
    #[clap(long)]
    disable_ingress_class_annotation: bool,

    /// Forbids new usage of the `group.name` annotation.
    #[clap(long)]
    disable_ingress_group_name_annotation: bool,

    /// Scheme assumed when an Ingress does not set the scheme annotation.
    #[clap(long, default_value = "internal")]
    default_scheme: Scheme,

    /// Per-request budget for collaborator calls during validation.
    #[clap(long, default_value = "5000")]
    validation_timeout_ms: u64,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            server,
            ingress_class,
            disable_ingress_class_annotation,
            disable_ingress_group_name_annotation,
            default_scheme,
            validation_timeout_ms,
        } = self;

        let mut prom = <Registry>::default();
        let metrics = AdmissionMetrics::register(prom.sub_registry_with_prefix("admission"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .with_optional_server(Some(server))
            .build()
            .await?;

        let validator = Arc::new(IngressValidator::new(
            ValidatorConfig {
                ingress_class,
                disable_ingress_class_annotation,
                disable_ingress_group_name_annotation,
                default_scheme,
            },
            Arc::new(ClassResolver::new(runtime.client())),
            Arc::new(GroupLoader::new(runtime.client())),
            Arc::new(AnnotationModelBuilder::new(default_scheme)),
            Arc::new(ElbDiscovery::from_env().await),
        ));

        let admission = Admission::new(
            validator,
            metrics,
            Duration::from_millis(validation_timeout_ms),
        );
        let runtime = runtime.spawn_server(move || admission);

        // Block on the shutdown signal, then wait for background tasks to
        // complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
