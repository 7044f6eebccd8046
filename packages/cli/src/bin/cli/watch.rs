// ABOUTME: Live monitoring of a diagram from the terminal
// ABOUTME: Mounts every node, runs the metrics batcher and logs status and metric changes until Ctrl-C

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use colored::*;
use diagram_cli::Workspace;
use diagram_client::{
    ConfigLoader, MetricValue, MetricsBatcher, NodeMount, NodeServices, StatusState,
};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

const REFRESH_INTERVAL: Duration = Duration::from_millis(500);

fn timestamp() -> ColoredString {
    Local::now().format("%H:%M:%S").to_string().dimmed()
}

fn status_label(state: StatusState) -> ColoredString {
    match state {
        StatusState::Up => "up".green(),
        StatusState::Down => "down".red(),
        StatusState::Unknown => "unknown".yellow(),
    }
}

fn metric_label(value: &MetricValue) -> String {
    match value {
        MetricValue::Loading => "loading".to_string(),
        MetricValue::Ready(value) => value.to_string(),
        MetricValue::Missing => "N/A".to_string(),
        MetricValue::Failed(error) => format!("error: {}", error),
    }
}

/// Print status and metric changes of the mounts every refresh until `shutdown` resolves
async fn report_changes<F: Future>(mounts: &[NodeMount], shutdown: F) {
    let mut last_status: BTreeMap<String, StatusState> = BTreeMap::new();
    let mut last_metrics: BTreeMap<(String, String), MetricValue> = BTreeMap::new();
    let mut ticker = interval(REFRESH_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // polled across every tick so a signal between ticks is not lost
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        for mount in mounts {
            if let Some(status) = mount.status() {
                if status.last_checked.is_some()
                    && last_status.get(mount.name()) != Some(&status.state)
                {
                    println!(
                        "{} {} {}",
                        timestamp(),
                        mount.name().cyan(),
                        status_label(status.state)
                    );
                    last_status.insert(mount.name().to_string(), status.state);
                }
            }

            for (label, value) in mount.metrics() {
                let key = (mount.name().to_string(), label);
                if value == MetricValue::Loading || last_metrics.get(&key) == Some(&value) {
                    continue;
                }
                println!(
                    "{} {} {}: {}",
                    timestamp(),
                    key.0.cyan(),
                    key.1,
                    metric_label(&value)
                );
                last_metrics.insert(key, value);
            }
        }
    }
}

pub async fn watch(workspace: &Workspace, diagram: &str, server: Option<&str>) -> anyhow::Result<()> {
    let api = workspace.api(server)?;
    let config = ConfigLoader::new(api.clone()).fetch(diagram).await?;

    let batcher = MetricsBatcher::new(Arc::new(api.clone()));
    let services = NodeServices {
        http: api.http().clone(),
        batcher: batcher.clone(),
        failure_policy: workspace.config.status_failure_policy,
    };
    let mounts: Vec<NodeMount> = config
        .nodes
        .iter()
        .map(|node| NodeMount::mount(node, &services))
        .collect();
    let schedule = batcher.start(
        workspace.config.metrics_initial_delay,
        workspace.config.metrics_interval,
    );

    println!(
        "{} '{}' ({} nodes), press Ctrl-C to stop",
        "Watching".blue().bold(),
        config.config.title,
        mounts.len()
    );

    report_changes(&mounts, tokio::signal::ctrl_c()).await;

    info!("Stopping watch of '{}'", diagram);
    for mount in mounts {
        mount.unmount();
    }
    schedule.abort();
    Ok(())
}
