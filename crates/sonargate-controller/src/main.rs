use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use sonargate_client::{DynQualityGates, HttpQualityGates, SonarConfig};
use sonargate_controller::scheduler::Controller;
use sonargate_controller::{cli::Cli, config::AppConfig, credentials, manifest, observability};
use sonargate_store::MemoryStore;

#[tokio::main]
async fn main() {
    // Optional .env for local development; a missing file is fine.
    if let Err(e) = dotenvy::dotenv()
        && !matches!(e, dotenvy::Error::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound)
    {
        eprintln!("Warning: failed to load .env file: {e}");
    }

    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    observability::init_tracing(&config.logging.level);
    tracing::info!(path = %cli.config.display(), "configuration loaded");

    if let Err(e) = run(config, cli.once).await {
        tracing::error!(error = %e, "controller failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig, once: bool) -> anyhow::Result<()> {
    let token =
        credentials::resolve_token(&config.sonarqube).context("cannot resolve SonarQube token")?;

    let sonar = SonarConfig::new(&config.sonarqube.base_url, token)
        .with_insecure_skip_verify(config.sonarqube.insecure_skip_verify)
        .with_request_timeout(Duration::from_millis(config.sonarqube.request_timeout_ms));
    let api: DynQualityGates =
        Arc::new(HttpQualityGates::new(&sonar).context("cannot build SonarQube client")?);

    let store = match &config.controller.state_file {
        Some(path) if path.exists() => {
            MemoryStore::load_snapshot(path).context("cannot load state snapshot")?
        }
        _ => MemoryStore::new(),
    };
    let store = Arc::new(store);

    if let Some(path) = &config.controller.manifest {
        let manifest = manifest::load(path)
            .with_context(|| format!("cannot load manifest {}", path.display()))?;
        manifest::apply(&manifest, store.as_ref())
            .await
            .context("cannot apply manifest")?;
        tracing::info!(path = %path.display(), entities = store.len().await, "manifest applied");
    }

    let controller = Controller::new(
        store,
        api,
        Duration::from_secs(config.controller.poll_interval_secs),
        config.controller.state_file.clone(),
    );

    if once {
        let summary = controller.sweep().await;
        tracing::info!(?summary, "single sweep finished");
        if summary.failed > 0 {
            anyhow::bail!("{} of {} cycles failed", summary.failed, summary.reconciled);
        }
    } else {
        controller.run().await;
    }

    Ok(())
}
