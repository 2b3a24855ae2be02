use std::sync::Arc;

use stylist_application::{
    credits::service::DynCreditQueryUseCase, generation::service::DynGenerationUseCase,
    infrastructure_config::Config, payments::service::DynPaymentUseCase,
    ports::outgoing::upload_staging::DynUploadStagingPort,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub payment_service: DynPaymentUseCase,
    pub generation_service: DynGenerationUseCase,
    pub credit_query_service: DynCreditQueryUseCase,
    pub upload_staging: DynUploadStagingPort,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        payment_service: DynPaymentUseCase,
        generation_service: DynGenerationUseCase,
        credit_query_service: DynCreditQueryUseCase,
        upload_staging: DynUploadStagingPort,
    ) -> Self {
        Self {
            config,
            payment_service,
            generation_service,
            credit_query_service,
            upload_staging,
        }
    }
}
