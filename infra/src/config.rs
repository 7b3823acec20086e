//! Configuration loading
//!
//! Values are layered, later sources winning:
//! 1. presets for the detected environment plus the legacy variables read
//!    by [`AppConfig::from_env`]
//! 2. an optional `config.<environment>` file (toml, json, yaml, ...)
//! 3. `APP__` prefixed variables using `__` between nested keys, for example
//!    `APP__ACCOUNT__MAX_INVALID_LOGINS=10`

use config::{Config, File, Source};
use cms_shared::{AppConfig, Environment};

use crate::InfrastructureError;

/// Prefix of the environment variables overriding configuration keys
pub const ENV_PREFIX: &str = "APP";

/// Separator between nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

/// Load the application configuration for the current process
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok();
    let environment = Environment::from_env();
    dotenvy::from_filename(environment.env_file()).ok();

    let defaults = AppConfig::from_env();
    let config = layer(
        &defaults,
        File::with_name(environment.config_file()).required(false),
        Some(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        ),
    )?;

    config.account.validate().map_err(InfrastructureError::Config)?;

    tracing::debug!(
        environment = %config.environment,
        file = environment.config_file(),
        "Configuration loaded"
    );

    Ok(config)
}

/// Merge a file source and an optional environment source over `defaults`
fn layer<F>(
    defaults: &AppConfig,
    file: F,
    env: Option<config::Environment>,
) -> Result<AppConfig, InfrastructureError>
where
    F: Source + Send + Sync + 'static,
{
    let mut builder = Config::builder()
        .add_source(Config::try_from(defaults)?)
        .add_source(file);

    if let Some(env) = env {
        builder = builder.add_source(env);
    }

    Ok(builder.build()?.try_deserialize()?)
}
