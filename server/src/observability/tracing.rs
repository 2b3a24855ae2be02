use std::{collections::HashMap, error::Error, io::stdout};

use serde_json::Value;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use stylist_application::infrastructure_config::{Config, LogFormat};

const SERVICE_NAME: &str = "stylist-backend";

/// `RUST_LOG` wins over the configured level. Without it, connection-level
/// chatter from hyper and reqwest is held at warn.
fn build_env_filter(level: &str) -> Result<EnvFilter, Box<dyn Error>> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    Ok(EnvFilter::try_new(level)?
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?))
}

pub fn setup_logging(config: &Config) -> Result<(), Box<dyn Error>> {
    let env_filter = build_env_filter(&config.logging.level)?;

    match config.logging.format {
        LogFormat::Json => {
            let default_fields = HashMap::from([(
                "env".to_string(),
                Value::String(config.environment.env.clone()),
            )]);
            let formatting_layer = BunyanFormattingLayer::with_default_fields(
                SERVICE_NAME.to_string(),
                stdout,
                default_fields,
            );

            tracing_subscriber::registry()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(formatting_layer)
                .try_init()?;
        }
        LogFormat::Pretty => {
            let format = fmt::format().with_target(true).compact();

            tracing_subscriber::fmt()
                .event_format(format)
                .with_env_filter(env_filter)
                .with_file(config.logging.include_location)
                .with_line_number(config.logging.include_location)
                .try_init()
                .map_err(|e| e as Box<dyn Error>)?;
        }
    }

    Ok(())
}
