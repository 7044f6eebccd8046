// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Diagram Designer

// Server Configuration
pub const DIAGRAM_API_URL: &str = "DIAGRAM_API_URL";
pub const DIAGRAM_API_PORT: &str = "DIAGRAM_API_PORT";
pub const PORT: &str = "PORT"; // Legacy

// Content Directories
pub const DIAGRAM_CONFIGS_DIR: &str = "DIAGRAM_CONFIGS_DIR";
pub const DIAGRAM_DETAILS_DIR: &str = "DIAGRAM_DETAILS_DIR";
pub const DIAGRAM_DATA_DIR: &str = "DIAGRAM_DATA_DIR";

// Logging
pub const DIAGRAM_LOG_LEVEL: &str = "DIAGRAM_LOG_LEVEL";
pub const RUST_LOG: &str = "RUST_LOG";

// Metrics & Status Polling
pub const DIAGRAM_METRICS_INTERVAL_SECS: &str = "DIAGRAM_METRICS_INTERVAL_SECS";
pub const DIAGRAM_METRICS_INITIAL_DELAY_MS: &str = "DIAGRAM_METRICS_INITIAL_DELAY_MS";
pub const DIAGRAM_STATUS_FAILURE_POLICY: &str = "DIAGRAM_STATUS_FAILURE_POLICY";

// HTTP Client
pub const DIAGRAM_HTTP_REQUEST_TIMEOUT_SECS: &str = "DIAGRAM_HTTP_REQUEST_TIMEOUT_SECS";

// CORS Configuration
pub const DIAGRAM_CORS_ORIGIN: &str = "DIAGRAM_CORS_ORIGIN";
pub const CORS_ORIGIN: &str = "CORS_ORIGIN"; // Legacy

// Metric Credential Suffixes ({HOSTKEY}_{SUFFIX})
pub const USERNAME_SUFFIX: &str = "_USERNAME";
pub const PASSWORD_SUFFIX: &str = "_PASSWORD";
pub const API_KEY_SUFFIX: &str = "_API_KEY";
pub const API_HEADER_SUFFIX: &str = "_API_HEADER";
pub const BEARER_TOKEN_SUFFIX: &str = "_BEARER_TOKEN";
pub const CLIENT_ID_SUFFIX: &str = "_CLIENT_ID";
pub const CLIENT_HEADER_SUFFIX: &str = "_CLIENT_HEADER";

// System Environment Variables
pub const HOME: &str = "HOME";
