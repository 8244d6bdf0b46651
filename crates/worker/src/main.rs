mod config;

use anyhow::Context;
use chrono::Utc;
use maintai_core::machine::needs_attention;
use maintai_core::predictive::{dashboard_stats, failure_probability, predictive_summary, schedule};
use maintai_core::security::security_status;
use maintai_db::{MachineRepo, SecurityEventRepo};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maintai_worker=info,maintai_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env()?;
    tracing::info!(
        persistent = config.database_url.is_some(),
        seed = config.seed_demo_data,
        "Worker starting"
    );

    let store = maintai_db::open_store(config.database_url.as_deref())
        .await
        .context("Failed to open store")?;

    if config.seed_demo_data {
        maintai_db::seed::seed_if_empty(&*store)
            .await
            .context("Failed to seed demo data")?;
    }

    let machines = store.list_machines().await?;
    let events = store
        .list_security_events(Some(config.security_event_limit))
        .await?;
    let now = Utc::now();

    let stats = dashboard_stats(&machines, now);
    tracing::info!(report = %serde_json::to_string(&stats)?, "Dashboard stats");

    let summary = predictive_summary(&machines, now, &mut rand::rng());
    tracing::info!(report = %serde_json::to_string(&summary)?, "Predictive summary");

    for entry in schedule(&machines, now) {
        tracing::info!(
            machine = %entry.identifier,
            urgency = entry.urgency.as_str(),
            recommended_days = entry.recommended_days,
            estimated_cost = entry.estimated_cost,
            "Scheduled maintenance"
        );
    }

    for machine in machines.iter().filter(|m| needs_attention(*m)) {
        tracing::warn!(
            machine = %machine.identifier,
            status = %machine.status,
            efficiency = machine.efficiency,
            temperature = machine.temperature,
            vibration = machine.vibration,
            failure_probability = failure_probability(machine, now),
            "Machine needs attention"
        );
    }

    let security = security_status(&events, now);
    tracing::info!(report = %serde_json::to_string(&security)?, "Security status");

    Ok(())
}
