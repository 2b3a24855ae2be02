use stylist_application::infrastructure_config::{Config, InferenceConfig, PaymentsConfig};
use tracing::info;

pub fn print_api_info(config: &Config) {
    print_routes(config);
    print_provider_info(config);
    print_credit_pricing(&config.payments);
    info!("  📁 Upload staging: {}", config.uploads.staging_dir);
}

fn print_routes(config: &Config) {
    let base_url = format!("http://{}", config.server_address());
    info!("🛣️  Routes:");
    info!("  POST {}/api/pay", base_url);
    info!("  POST {}/api/verify", base_url);
    info!("  POST {}/api/generate", base_url);
    info!("  GET  {}/api/credits", base_url);
    info!("  GET  {}/health", base_url);

    if cfg!(feature = "docs") {
        info!("📋 API Documentation:");
        info!("  📖 Swagger UI: {}/docs", base_url);
        info!("  📄 OpenAPI JSON: {}/api-docs/openapi.json", base_url);
    }
}

fn print_provider_info(config: &Config) {
    info!("⚙️  Configuration:");
    print_payments_provider(&config.payments);
    print_inference_provider(&config.inference);
}

fn print_payments_provider(payments: &PaymentsConfig) {
    info!(
        "  💳 Payments: {} (key id {})",
        payments.api_base_url, payments.key_id
    );
}

fn print_inference_provider(inference: &InferenceConfig) {
    info!(
        "  🎨 Inference: {} model version {}, poll every {}ms, give up after {}s",
        inference.api_base_url,
        inference.model_version,
        inference.poll_interval_ms,
        inference.max_wait_secs
    );
}

fn print_credit_pricing(payments: &PaymentsConfig) {
    info!(
        "  🪙 Pricing: {} {} buys {} credits, one credit per image",
        payments.order_amount, payments.currency, payments.credits_per_payment
    );
}
