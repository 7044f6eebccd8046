// ABOUTME: Client runtime for Diagram Designer
// ABOUTME: Loads diagrams, polls node status, batches metric requests and resolves node details

pub mod details;
pub mod error;
pub mod http;
pub mod loader;
pub mod metrics;
pub mod node;
pub mod status;

pub use details::NodeDetailsResolver;
pub use error::{ClientError, Result};
pub use http::ApiClient;
pub use loader::{ConfigLoader, LoadedDiagram, LoaderError};
pub use metrics::{BatchTransport, MetricError, MetricHandle, MetricsBatcher};
pub use node::{MetricValue, NodeMount, NodeServices};
pub use status::{evaluate_status, NodeStatus, StatusPoller, StatusState};
