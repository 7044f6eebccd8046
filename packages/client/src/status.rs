// ABOUTME: Per-node status polling
// ABOUTME: Maps a JSON field of a status endpoint to up/down/unknown and publishes it on a watch channel

use std::time::Duration;

use chrono::{DateTime, Utc};
use diagram_config::FailurePolicy;
use diagram_core::{lookup_field, scalar_matches, StatusConfig};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Up,
    Down,
    #[default]
    Unknown,
}

impl From<FailurePolicy> for StatusState {
    fn from(policy: FailurePolicy) -> Self {
        match policy {
            FailurePolicy::Up => StatusState::Up,
            FailurePolicy::Down => StatusState::Down,
            FailurePolicy::Unknown => StatusState::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    pub state: StatusState,
    pub last_checked: Option<DateTime<Utc>>,
}

/// Classify a status payload; anything that is neither the up nor the down value is unknown
pub fn evaluate_status(payload: &Value, config: &StatusConfig) -> StatusState {
    match lookup_field(payload, &config.value_field) {
        Some(value) if scalar_matches(value, &config.up_value) => StatusState::Up,
        Some(value) if scalar_matches(value, &config.down_value) => StatusState::Down,
        _ => StatusState::Unknown,
    }
}

/// One status check. Request failures (network or non-2xx) map through `policy`.
pub async fn check_status(
    client: &Client,
    config: &StatusConfig,
    policy: FailurePolicy,
) -> StatusState {
    let response = match client.get(&config.url).send().await {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            debug!("Status check {} answered {}", config.url, response.status());
            return policy.into();
        }
        Err(e) => {
            debug!("Status check {} failed: {}", config.url, e);
            return policy.into();
        }
    };

    match response.bytes().await {
        Ok(body) => match serde_json::from_slice::<Value>(&body) {
            Ok(payload) => evaluate_status(&payload, config),
            Err(_) => {
                debug!("Status body from {} is not JSON", config.url);
                StatusState::Unknown
            }
        },
        Err(e) => {
            debug!("Reading status body from {} failed: {}", config.url, e);
            policy.into()
        }
    }
}

/// Background poller owned by a mounted node; the task is aborted on drop
pub struct StatusPoller {
    receiver: watch::Receiver<NodeStatus>,
    handle: JoinHandle<()>,
}

impl StatusPoller {
    /// Start polling immediately, then every `config.update_interval` milliseconds
    pub fn spawn(client: Client, config: StatusConfig, policy: FailurePolicy) -> Self {
        let (sender, receiver) = watch::channel(NodeStatus::default());
        let period = Duration::from_millis(config.update_interval.max(1));

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let state = check_status(&client, &config, policy).await;
                let previous = sender.borrow().state;
                if previous != state {
                    info!("Status of {} changed: {:?} -> {:?}", config.url, previous, state);
                }

                let status = NodeStatus {
                    state,
                    last_checked: Some(Utc::now()),
                };
                if sender.send(status).is_err() {
                    break;
                }
            }
        });

        Self { receiver, handle }
    }

    pub fn status(&self) -> NodeStatus {
        self.receiver.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<NodeStatus> {
        self.receiver.clone()
    }

    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
