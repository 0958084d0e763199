//! Shared constants and invariants

/// Property holding the Wavefront api token.
pub const API_TOKEN_PROPERTY: &str = "management.metrics.export.wavefront.api-token";
/// Property holding the Wavefront cluster address.
pub const URI_PROPERTY: &str = "management.metrics.export.wavefront.uri";

pub const DEFAULT_CLUSTER_URI: &str = "https://wavefront.surf";
/// Cluster address scheme of a local Wavefront proxy, which needs no token.
pub const PROXY_SCHEME: &str = "proxy";

pub const PROVISIONING_PATH: &str = "/api/v2/trial/spring-boot-autoconfigure";

/// File name of the cached token, relative to the user's home directory.
pub const TOKEN_FILE_NAME: &str = ".wavefront_token";

// Property source names, highest priority first
pub const COMMAND_LINE_SOURCE: &str = "commandLineArgs";
pub const SYSTEM_ENVIRONMENT_SOURCE: &str = "systemEnvironment";
pub const APPLICATION_CONFIG_SOURCE: &str = "applicationConfig";
pub const WAVEFRONT_SOURCE: &str = "wavefront";
