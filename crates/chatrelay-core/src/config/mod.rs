//! Configuration for chatrelay
//!
//! Every field has a default, so the relay runs with no configuration at
//! all. Values are layered: defaults, then an optional TOML file, then
//! `CHATRELAY_*` environment variables.

mod loader;
mod model;
pub mod proxy;
pub mod timeouts;

pub use loader::{ENV_PREFIX, apply_env, load_config, load_from_file};
pub use model::{
    ContextConfig, LogFormat, LoggingConfig, RelayConfig, RetrySettings, ServerConfig,
    UpstreamConfig,
};
pub use proxy::{ProxyRegistry, ProxySettings};
