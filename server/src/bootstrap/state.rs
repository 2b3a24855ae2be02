use std::sync::Arc;
use std::time::Duration;

use stylist_adapters::outgoing::{
    hmac_sha2::signature_verifier_hmac::HmacSignatureVerifier,
    in_memory::{
        credit_ledger_memory::InMemoryCreditLedger, payment_record_memory::InMemoryPaymentRecord,
    },
    razorpay_reqwest::payment_gateway_razorpay::{RazorpayConfig, RazorpayPaymentGateway},
    replicate_reqwest::inference_replicate::{ReplicateConfig, ReplicateInferenceProvider},
    tokio_fs::upload_staging_fs::FsUploadStaging,
    tokio_spawn::task_spawn_tokio::TokioTaskSpawner,
};
use stylist_adapters::shared::app_state::AppState as AdaptersAppState;
use stylist_application::error::AppError;
use stylist_application::infrastructure_config::{Config, InferenceConfig, PaymentsConfig};
use stylist_application::ports::outgoing::{
    credit_ledger::DynCreditLedgerPort, inference_provider::DynInferenceProviderPort,
    payment_gateway::DynPaymentGatewayPort, upload_staging::DynUploadStagingPort,
};
use stylist_application::{
    credits::service::{CreditQueryService, DynCreditQueryUseCase},
    generation::service::{DynGenerationUseCase, GenerationService, GenerationServiceDeps},
    payments::service::{DynPaymentUseCase, PaymentService, PaymentServiceDeps},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub payment_service: DynPaymentUseCase,
    pub generation_service: DynGenerationUseCase,
    pub credit_query_service: DynCreditQueryUseCase,
    upload_staging: DynUploadStagingPort,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let config = Arc::new(config);

        let ledger: DynCreditLedgerPort = Arc::new(InMemoryCreditLedger::new());
        let upload_staging: DynUploadStagingPort = Arc::new(
            FsUploadStaging::open(
                &config.uploads.staging_dir,
                config.uploads.max_upload_bytes,
            )
            .await?,
        );

        let payment_service = Self::create_payment_service(&config.payments, &ledger)?;
        let generation_service =
            Self::create_generation_service(&config.inference, &ledger, &upload_staging)?;
        let credit_query_service: DynCreditQueryUseCase =
            Arc::new(CreditQueryService::new(Arc::clone(&ledger)));

        Ok(Self {
            config,
            payment_service,
            generation_service,
            credit_query_service,
            upload_staging,
        })
    }

    fn create_payment_service(
        payments: &PaymentsConfig,
        ledger: &DynCreditLedgerPort,
    ) -> Result<DynPaymentUseCase, AppError> {
        let gateway: DynPaymentGatewayPort =
            Arc::new(RazorpayPaymentGateway::new(RazorpayConfig {
                api_base_url: payments.api_base_url.clone(),
                key_id: payments.key_id.clone(),
                key_secret: payments.key_secret.clone(),
                request_timeout: Duration::from_secs(payments.request_timeout_secs),
            })?);

        Ok(Arc::new(PaymentService::new(
            PaymentServiceDeps {
                gateway,
                verifier: Arc::new(HmacSignatureVerifier::new(payments.key_secret.clone())),
                records: Arc::new(InMemoryPaymentRecord::new()),
                ledger: Arc::clone(ledger),
            },
            payments.pricing(),
            payments.currency.clone(),
        )))
    }

    fn create_generation_service(
        inference: &InferenceConfig,
        ledger: &DynCreditLedgerPort,
        upload_staging: &DynUploadStagingPort,
    ) -> Result<DynGenerationUseCase, AppError> {
        let provider: DynInferenceProviderPort =
            Arc::new(ReplicateInferenceProvider::new(ReplicateConfig {
                api_base_url: inference.api_base_url.clone(),
                api_token: inference.api_token.clone(),
                model_version: inference.model_version.clone(),
                poll_interval: Duration::from_millis(inference.poll_interval_ms),
                max_wait: Duration::from_secs(inference.max_wait_secs),
                request_timeout: Duration::from_secs(inference.request_timeout_secs),
            })?);

        Ok(Arc::new(GenerationService::new(GenerationServiceDeps {
            ledger: Arc::clone(ledger),
            inference: provider,
            staging: Arc::clone(upload_staging),
            task_spawn: Arc::new(TokioTaskSpawner::new()),
        })))
    }

    pub fn to_adapters_state(self) -> AdaptersAppState {
        AdaptersAppState::new(
            self.config,
            self.payment_service,
            self.generation_service,
            self.credit_query_service,
            self.upload_staging,
        )
    }
}
