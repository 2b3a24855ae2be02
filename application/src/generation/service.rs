use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::{
    error::{AppError, AppResult},
    ports::{
        incoming::generation::{GenerateImageCommand, GenerationUseCase},
        outgoing::{
            credit_ledger::DynCreditLedgerPort, inference_provider::DynInferenceProviderPort,
            task_spawn::DynTaskSpawnPort, upload_staging::DynUploadStagingPort,
        },
    },
};
use domain::{
    auth::UserId,
    credits::CreditBalance,
    generation::{GeneratedImage, GenerationInput, StagedUpload, style_prompt},
};

pub struct GenerationServiceDeps {
    pub ledger: DynCreditLedgerPort,
    pub inference: DynInferenceProviderPort,
    pub staging: DynUploadStagingPort,
    pub task_spawn: DynTaskSpawnPort,
}

/// Gate in front of the inference provider.
///
/// A credit is reserved with an atomic debit before the provider is called
/// and refunded if the call fails, so concurrent requests from one user can
/// never spend the same credit twice.
pub struct GenerationService {
    ledger: DynCreditLedgerPort,
    inference: DynInferenceProviderPort,
    staging: DynUploadStagingPort,
    task_spawn: DynTaskSpawnPort,
}

/// What one request still owes back: the reserved credit and the staged
/// upload. Anything left when it is dropped, e.g. because the client went
/// away mid-inference, is settled on a detached task.
struct PendingGeneration {
    ledger: DynCreditLedgerPort,
    staging: DynUploadStagingPort,
    task_spawn: DynTaskSpawnPort,
    user_id: UserId,
    upload: Option<StagedUpload>,
    reserved: bool,
}

impl PendingGeneration {
    async fn refund(&mut self) {
        if !self.reserved {
            return;
        }
        if let Err(e) = self.ledger.grant(&self.user_id, 1).await {
            error!(user_id = %self.user_id, error = %e, "Failed to refund reserved credit");
        }
        self.reserved = false;
    }

    /// The reserved credit is spent.
    fn commit(&mut self) {
        self.reserved = false;
    }

    // Discard is idempotent, so the handle is only dropped once it completed.
    async fn release_upload(&mut self) {
        if let Some(upload) = &self.upload {
            self.staging.discard(upload).await;
        }
        self.upload = None;
    }
}

impl Drop for PendingGeneration {
    fn drop(&mut self) {
        let refund_to = self.reserved.then(|| self.user_id.clone());
        let upload = self.upload.take();
        if refund_to.is_none() && upload.is_none() {
            return;
        }

        warn!(
            user_id = %self.user_id,
            refund = refund_to.is_some(),
            "Generation dropped before settling, settling in background"
        );

        let ledger = Arc::clone(&self.ledger);
        let staging = Arc::clone(&self.staging);
        self.task_spawn.spawn(Box::pin(async move {
            if let Some(user_id) = refund_to {
                match ledger.grant(&user_id, 1).await {
                    Ok(balance) => {
                        info!(user_id = %user_id, credits = balance.available, "Reserved credit refunded");
                    }
                    Err(e) => {
                        error!(user_id = %user_id, error = %e, "Failed to refund reserved credit");
                    }
                }
            }
            if let Some(upload) = upload {
                staging.discard(&upload).await;
            }
        }));
    }
}

impl GenerationService {
    pub fn new(deps: GenerationServiceDeps) -> Self {
        Self {
            ledger: deps.ledger,
            inference: deps.inference,
            staging: deps.staging,
            task_spawn: deps.task_spawn,
        }
    }

    fn pending(&self, user_id: &UserId, upload: Option<StagedUpload>) -> PendingGeneration {
        PendingGeneration {
            ledger: Arc::clone(&self.ledger),
            staging: Arc::clone(&self.staging),
            task_spawn: Arc::clone(&self.task_spawn),
            user_id: user_id.clone(),
            upload,
            reserved: false,
        }
    }

    async fn run_generation(
        &self,
        upload: &StagedUpload,
        style: Option<&str>,
    ) -> AppResult<String> {
        let payload = self.staging.load(upload).await?;

        let input = GenerationInput {
            prompt: style_prompt(style),
            image_data_uri: payload.to_data_uri(),
        };
        drop(payload);

        let output = self.inference.generate(&input).await?;

        output
            .into_first_url()
            .ok_or_else(|| AppError::GenerationProviderError {
                message: "Provider returned no output".to_string(),
            })
    }

    async fn remaining_after(&self, user_id: &UserId, reserved: CreditBalance) -> u64 {
        match self.ledger.balance_of(user_id).await {
            Ok(balance) => balance.available,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Falling back to reserved balance");
                reserved.available
            }
        }
    }
}

#[async_trait::async_trait]
impl GenerationUseCase for GenerationService {
    #[instrument(skip(self, command), fields(user_id = %command.user_id))]
    async fn generate(&self, command: GenerateImageCommand) -> AppResult<GeneratedImage> {
        let GenerateImageCommand {
            user_id,
            style,
            upload,
        } = command;
        let mut pending = self.pending(&user_id, upload);

        let reserved = match self.ledger.try_debit(&user_id).await {
            Ok(balance) => balance,
            Err(e) => {
                pending.release_upload().await;
                info!("Generation refused, no credits left");
                return Err(e);
            }
        };
        pending.reserved = true;

        let Some(upload) = pending.upload.clone() else {
            pending.refund().await;
            return Err(AppError::MissingInput {
                message: "No file uploaded".to_string(),
            });
        };

        match self.run_generation(&upload, style.as_deref()).await {
            Ok(url) => {
                pending.commit();
                pending.release_upload().await;
                let credits_left = self.remaining_after(&user_id, reserved).await;
                info!(credits_left, "Image generated");
                Ok(GeneratedImage { url, credits_left })
            }
            Err(e) => {
                pending.refund().await;
                pending.release_upload().await;
                warn!(error = %e, "Generation failed, reserved credit refunded");
                Err(e)
            }
        }
    }
}

pub type DynGenerationUseCase = Arc<dyn GenerationUseCase>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outgoing::upload_staging::UploadStagingPort;
    use crate::test_support::{FakeInference, FakeLedger, FakeStaging, TokioSpawner};
    use domain::generation::GenerationOutput;
    use std::time::Duration;
    use tokio::task::yield_now;
    use tokio::time::timeout;

    struct Harness {
        service: GenerationService,
        ledger: Arc<FakeLedger>,
        inference: Arc<FakeInference>,
        staging: Arc<FakeStaging>,
    }

    fn harness(ledger: FakeLedger, inference: FakeInference) -> Harness {
        let ledger = Arc::new(ledger);
        let inference = Arc::new(inference);
        let staging = Arc::new(FakeStaging::default());
        let service = GenerationService::new(GenerationServiceDeps {
            ledger: Arc::clone(&ledger) as DynCreditLedgerPort,
            inference: Arc::clone(&inference) as DynInferenceProviderPort,
            staging: Arc::clone(&staging) as DynUploadStagingPort,
            task_spawn: Arc::new(TokioSpawner),
        });
        Harness {
            service,
            ledger,
            inference,
            staging,
        }
    }

    fn urls(list: &[&str]) -> GenerationOutput {
        GenerationOutput::Many(list.iter().map(ToString::to_string).collect())
    }

    fn command(
        user: &str,
        style: Option<&str>,
        upload: Option<StagedUpload>,
    ) -> GenerateImageCommand {
        GenerateImageCommand {
            user_id: UserId::new(user),
            style: style.map(ToString::to_string),
            upload,
        }
    }

    #[tokio::test]
    async fn no_credits_refuses_without_calling_provider() {
        let h = harness(FakeLedger::default(), FakeInference::returning(urls(&["u"])));
        let upload = h.staging.stage(b"img", "image/png").await;

        let err = h
            .service
            .generate(command("bob", None, Some(upload.clone())))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InsufficientCredits { .. }));
        assert_eq!(h.inference.call_count(), 0);
        assert_eq!(h.ledger.available("bob"), 0);
        assert!(h.staging.was_discarded(&upload));
    }

    #[tokio::test]
    async fn missing_image_refunds_reservation() {
        let h = harness(
            FakeLedger::with_balance("alice", 2),
            FakeInference::returning(urls(&["u"])),
        );

        let err = h
            .service
            .generate(command("alice", None, None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MissingInput { .. }));
        assert_eq!(h.inference.call_count(), 0);
        assert_eq!(h.ledger.available("alice"), 2);
    }

    #[tokio::test]
    async fn success_consumes_one_credit_and_returns_first_url() {
        let h = harness(
            FakeLedger::with_balance("alice", 1),
            FakeInference::returning(urls(&["https://cdn/1.png", "https://cdn/2.png"])),
        );
        let upload = h.staging.stage(b"png!", "image/png").await;

        let image = h
            .service
            .generate(command("alice", Some("ghibli"), Some(upload.clone())))
            .await
            .unwrap();

        assert_eq!(image.url, "https://cdn/1.png");
        assert_eq!(image.credits_left, 0);
        assert_eq!(h.ledger.available("alice"), 0);
        assert!(h.staging.was_discarded(&upload));

        let inputs = h.inference.inputs.lock().unwrap();
        assert_eq!(inputs[0].prompt, "in ghibli style");
        assert_eq!(inputs[0].image_data_uri, "data:image/png;base64,cG5nIQ==");
    }

    #[tokio::test]
    async fn single_output_is_returned_as_is() {
        let h = harness(
            FakeLedger::with_balance("alice", 3),
            FakeInference::returning(GenerationOutput::Single("https://cdn/x.png".to_string())),
        );
        let upload = h.staging.stage(b"img", "image/jpeg").await;

        let image = h
            .service
            .generate(command("alice", None, Some(upload)))
            .await
            .unwrap();

        assert_eq!(image.url, "https://cdn/x.png");
        assert_eq!(image.credits_left, 2);
        assert_eq!(h.inference.inputs.lock().unwrap()[0].prompt, "in default style");
    }

    #[tokio::test]
    async fn provider_failure_refunds_and_cleans_up() {
        let h = harness(
            FakeLedger::with_balance("alice", 1),
            FakeInference::failing("model exploded"),
        );
        let upload = h.staging.stage(b"img", "image/png").await;

        let err = h
            .service
            .generate(command("alice", None, Some(upload.clone())))
            .await
            .unwrap_err();

        match err {
            AppError::GenerationProviderError { message } => assert_eq!(message, "model exploded"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(h.ledger.available("alice"), 1);
        assert!(h.staging.was_discarded(&upload));
    }

    #[tokio::test]
    async fn empty_output_is_a_provider_error() {
        let h = harness(
            FakeLedger::with_balance("alice", 1),
            FakeInference::returning(urls(&[])),
        );
        let upload = h.staging.stage(b"img", "image/png").await;

        let err = h
            .service
            .generate(command("alice", None, Some(upload)))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::GenerationProviderError { .. }));
        assert_eq!(h.ledger.available("alice"), 1);
    }

    #[tokio::test]
    async fn one_credit_cannot_pay_for_two_concurrent_generations() {
        let h = harness(
            FakeLedger::with_balance("alice", 1),
            FakeInference::returning(urls(&["https://cdn/1.png"])),
        );
        let first = h.staging.stage(b"a", "image/png").await;
        let second = h.staging.begin("image/png").await.unwrap();
        h.staging.append(&second, b"b").await.unwrap();

        let (a, b) = tokio::join!(
            h.service.generate(command("alice", None, Some(first))),
            h.service.generate(command("alice", None, Some(second))),
        );

        assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
        assert_eq!(h.inference.call_count(), 1);
        assert_eq!(h.ledger.available("alice"), 0);
    }

    #[tokio::test]
    async fn cancelled_generation_refunds_credit_and_discards_upload() {
        let h = harness(FakeLedger::with_balance("alice", 1), FakeInference::hanging());
        let upload = h.staging.stage(b"img", "image/png").await;

        let outcome = timeout(
            Duration::from_millis(50),
            h.service
                .generate(command("alice", None, Some(upload.clone()))),
        )
        .await;

        assert!(outcome.is_err());
        assert_eq!(h.inference.call_count(), 1);

        for _ in 0..20 {
            if h.staging.was_discarded(&upload) {
                break;
            }
            yield_now().await;
        }
        assert_eq!(h.ledger.available("alice"), 1);
        assert!(h.staging.was_discarded(&upload));
    }

    #[tokio::test]
    async fn settled_generation_leaves_nothing_for_the_background() {
        let h = harness(
            FakeLedger::with_balance("alice", 1),
            FakeInference::returning(urls(&["https://cdn/1.png"])),
        );
        let upload = h.staging.stage(b"img", "image/png").await;

        h.service
            .generate(command("alice", None, Some(upload)))
            .await
            .unwrap();
        for _ in 0..5 {
            yield_now().await;
        }

        assert_eq!(h.ledger.available("alice"), 0);
    }
}
