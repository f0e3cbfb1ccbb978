//! # ctxlog-config
//!
//! Logger configuration schema, env overrides, and file loading.
//! This crate depends on `ports` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use env::{
    ENV_COLORED_OUTPUT, ENV_DEV_MODE, ENV_FIELD_NAMES_MESSAGE, ENV_FIELD_NAMES_TIMESTAMP,
    ENV_LEVEL, ENV_OUTPUT, ENV_STRIP_TIME, EnvParseError, LogEnv, apply_env_overrides,
};
pub use load::{
    load_log_config_from_path, load_log_config_from_sources, load_log_config_std_env,
    to_pretty_json, to_pretty_toml,
};
pub use schema::{
    DEFAULT_CONFIG_LEVEL, DEFAULT_MESSAGE_KEY, DEFAULT_TIMESTAMP_KEY, FieldNames, LogConfig,
    OutputTarget, parse_log_config_json, parse_log_config_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
