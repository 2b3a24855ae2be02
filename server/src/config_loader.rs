use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
    value::{Uncased, UncasedStr},
};
use std::fs;
use std::path::Path;
use stylist_application::error::{AppError, AppResult};
use stylist_application::infrastructure_config::Config;
use tracing::info;

const ENV_PREFIX: &str = "STYLIST_";

/// Plain variables the deployment already sets, without the prefix.
const LEGACY_ENV_KEYS: [&str; 4] = [
    "PORT",
    "RAZORPAY_KEY_ID",
    "RAZORPAY_KEY_SECRET",
    "REPLICATE_API_TOKEN",
];

pub fn load_config() -> AppResult<Config> {
    generate_env_template_if_missing()?;

    let config: Config = build_figment()
        .extract()
        .map_err(|e| AppError::ConfigError {
            message: format!("Failed to load configuration: {e}"),
        })?;

    config.validate()?;
    Ok(config)
}

fn build_figment() -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if Path::new("config.toml").exists() {
        figment = figment.merge(Toml::file("config.toml"));
    }

    if Path::new("config.json").exists() {
        figment = figment.merge(Json::file("config.json"));
    }

    figment
        .merge(Env::raw().only(&LEGACY_ENV_KEYS).map(legacy_key))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

fn legacy_key(key: &UncasedStr) -> Uncased<'_> {
    match key.as_str().to_ascii_uppercase().as_str() {
        "PORT" => "server.port".into(),
        "RAZORPAY_KEY_ID" => "payments.key_id".into(),
        "RAZORPAY_KEY_SECRET" => "payments.key_secret".into(),
        "REPLICATE_API_TOKEN" => "inference.api_token".into(),
        _ => key.into(),
    }
}

fn generate_env_template_if_missing() -> AppResult<()> {
    let env_file = ".env";
    let template_file = ".env.example";

    if Path::new(env_file).exists() {
        return Ok(());
    }

    if !Path::new(template_file).exists() {
        return Ok(());
    }

    fs::copy(template_file, env_file).map_err(|e| AppError::ConfigError {
        message: format!("Failed to generate .env file from template: {e}"),
    })?;

    info!("Generated .env from template. Fill in the Razorpay and Replicate credentials.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn set_required_secrets(jail: &mut Jail) {
        jail.set_env("RAZORPAY_KEY_ID", "rzp_legacy_key");
        jail.set_env("RAZORPAY_KEY_SECRET", "legacy_secret");
        jail.set_env("REPLICATE_API_TOKEN", "r8_legacy");
    }

    #[test]
    fn legacy_variables_fill_the_config_tree() {
        Jail::expect_with(|jail| {
            set_required_secrets(jail);
            jail.set_env("PORT", "8080");

            let config = load_config().map_err(|e| e.to_string())?;

            assert_eq!(config.server.port, 8080);
            assert_eq!(config.payments.key_id, "rzp_legacy_key");
            assert_eq!(config.payments.key_secret(), "legacy_secret");
            assert_eq!(config.inference.api_token(), "r8_legacy");
            Ok(())
        });
    }

    #[test]
    fn prefixed_variables_win_over_legacy_ones() {
        Jail::expect_with(|jail| {
            set_required_secrets(jail);
            jail.set_env("PORT", "8080");
            jail.set_env("STYLIST_SERVER__PORT", "9090");
            jail.set_env("STYLIST_PAYMENTS__CREDITS_PER_PAYMENT", "10");

            let config = load_config().map_err(|e| e.to_string())?;

            assert_eq!(config.server.port, 9090);
            assert_eq!(config.payments.credits_per_payment, 10);
            Ok(())
        });
    }

    #[test]
    fn config_toml_overrides_defaults() {
        Jail::expect_with(|jail| {
            set_required_secrets(jail);
            jail.create_file(
                "config.toml",
                r#"
                [payments]
                order_amount = 250
                currency = "USD"

                [uploads]
                staging_dir = "staging"
                "#,
            )?;

            let config = load_config().map_err(|e| e.to_string())?;

            assert_eq!(config.payments.order_amount, 250);
            assert_eq!(config.payments.currency, "USD");
            assert_eq!(config.uploads.staging_dir, "staging");
            assert_eq!(config.payments.credits_per_payment, 7);
            Ok(())
        });
    }

    #[test]
    fn missing_credentials_are_a_config_error() {
        Jail::expect_with(|_jail| {
            let result = load_config();
            assert!(matches!(result, Err(AppError::ConfigError { .. })));
            Ok(())
        });
    }

    #[test]
    fn env_file_is_generated_from_template() {
        Jail::expect_with(|jail| {
            set_required_secrets(jail);
            jail.create_file(".env.example", "PORT=5000\n")?;

            load_config().map_err(|e| e.to_string())?;

            assert_eq!(fs::read_to_string(".env").map_err(|e| e.to_string())?, "PORT=5000\n");
            Ok(())
        });
    }
}
