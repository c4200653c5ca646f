use crate::{admission::Admission, config, metrics::AdmissionMetrics};
use anyhow::{bail, Context, Result};
use clap::Parser;
use prometheus_client::registry::Registry;
use std::{path::PathBuf, sync::Arc};
use tracing::info;

#[derive(Debug, Parser)]
#[clap(
    name = "image-rewrite",
    about = "Rewrites pod container images to registry mirrors"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "image_rewrite=info,warn",
        env = "IMAGE_REWRITE_LOG"
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

    /// Path to the image mapping configuration.
    #[clap(
        long = "config",
        default_value = "/etc/image-rewrite/config.yaml",
        env = "IMAGE_REWRITE_CONFIG"
    )]
    config_path: PathBuf,
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
            config_path,
        } = self;

        let mut prom = <Registry>::default();
        let metrics = AdmissionMetrics::register(prom.sub_registry_with_prefix("image_rewrite"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .with_optional_server(Some(server))
            .build()
            .await?;

        // Loaded after the runtime so that logging is initialized.
        let config = config::load(&config_path)
            .with_context(|| format!("loading {}", config_path.display()))?;
        let config = Arc::new(config);
        info!(
            ignored_namespaces = ?config.ignored_namespaces.iter().collect::<Vec<_>>(),
            "Serving admission requests"
        );

        let runtime = runtime.spawn_server(move || Admission::new(config, metrics));

        // Block the main thread on the shutdown signal. Once it fires, wait for the background tasks to
        // complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
