use std::collections::{HashMap, HashSet};
use std::future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use domain::{
    auth::UserId,
    credits::CreditBalance,
    generation::{GenerationInput, GenerationOutput, ImagePayload, StagedUpload},
    payment::{OrderDraft, OrderId, PaymentOrder, PaymentVerification},
};

use crate::error::{AppError, AppResult};
use crate::ports::outgoing::{
    credit_ledger::CreditLedgerPort, inference_provider::InferenceProviderPort,
    payment_gateway::PaymentGatewayPort, payment_record::PaymentRecordPort,
    signature_verifier::SignatureVerifierPort,
    task_spawn::{DetachedTask, TaskSpawnPort},
    upload_staging::UploadStagingPort,
};

pub struct TokioSpawner;

impl TaskSpawnPort for TokioSpawner {
    fn spawn(&self, task: DetachedTask) {
        tokio::spawn(task);
    }
}

#[derive(Default)]
pub struct FakeLedger {
    balances: Mutex<HashMap<UserId, CreditBalance>>,
}

impl FakeLedger {
    pub fn with_balance(user: &str, credits: u64) -> Self {
        let ledger = Self::default();
        ledger
            .balances
            .lock()
            .unwrap()
            .insert(UserId::new(user), CreditBalance::new(credits));
        ledger
    }

    pub fn available(&self, user: &str) -> u64 {
        self.balances
            .lock()
            .unwrap()
            .get(&UserId::new(user))
            .map_or(0, |b| b.available)
    }

    pub fn entry_count(&self) -> usize {
        self.balances.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl CreditLedgerPort for FakeLedger {
    async fn grant(&self, user_id: &UserId, amount: u64) -> AppResult<CreditBalance> {
        let mut balances = self.balances.lock().unwrap();
        let balance = balances.entry(user_id.clone()).or_default();
        balance.grant(amount)?;
        Ok(*balance)
    }

    async fn try_debit(&self, user_id: &UserId) -> AppResult<CreditBalance> {
        let mut balances = self.balances.lock().unwrap();
        let mut balance = balances.get(user_id).copied().unwrap_or_default();
        balance
            .try_debit()
            .map_err(|e| AppError::InsufficientCredits {
                message: e.to_string(),
            })?;
        balances.insert(user_id.clone(), balance);
        Ok(balance)
    }

    async fn balance_of(&self, user_id: &UserId) -> AppResult<CreditBalance> {
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(user_id)
            .copied()
            .unwrap_or_default())
    }
}

pub struct FakeGateway {
    pub fail: bool,
    pub drafts: Mutex<Vec<OrderDraft>>,
}

impl FakeGateway {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            drafts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl PaymentGatewayPort for FakeGateway {
    async fn create_order(&self, draft: &OrderDraft) -> AppResult<PaymentOrder> {
        if self.fail {
            return Err(AppError::PaymentProviderError {
                message: "provider unreachable".to_string(),
            });
        }
        self.drafts.lock().unwrap().push(draft.clone());
        Ok(PaymentOrder {
            id: OrderId::new("order_fake_1"),
            amount_minor: draft.amount_minor,
            currency: draft.currency.clone(),
        })
    }
}

/// Accepts exactly `sig(<orderId>|<paymentId>)`.
pub struct FakeVerifier;

impl FakeVerifier {
    pub fn sign(order_id: &str, payment_id: &str) -> String {
        format!("sig({order_id}|{payment_id})")
    }
}

impl SignatureVerifierPort for FakeVerifier {
    fn verify(&self, verification: &PaymentVerification) -> bool {
        verification.signature == format!("sig({})", verification.signed_payload())
    }
}

#[derive(Default)]
pub struct FakeRecords {
    orders: Mutex<HashMap<OrderId, UserId>>,
}

#[async_trait::async_trait]
impl PaymentRecordPort for FakeRecords {
    async fn record_if_new(
        &self,
        order_id: &OrderId,
        user_id: &UserId,
    ) -> AppResult<Option<UserId>> {
        let mut orders = self.orders.lock().unwrap();
        if let Some(existing) = orders.get(order_id) {
            return Ok(Some(existing.clone()));
        }
        orders.insert(order_id.clone(), user_id.clone());
        Ok(None)
    }
}

pub struct FakeInference {
    pub response: AppResult<GenerationOutput>,
    pub hang: bool,
    pub calls: AtomicUsize,
    pub inputs: Mutex<Vec<GenerationInput>>,
}

impl FakeInference {
    pub fn returning(output: GenerationOutput) -> Self {
        Self {
            response: Ok(output),
            hang: false,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(AppError::GenerationProviderError {
                message: message.to_string(),
            }),
            hang: false,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Never answers, like a prediction that outlives the request.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::returning(GenerationOutput::Many(Vec::new()))
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl InferenceProviderPort for FakeInference {
    async fn generate(&self, input: &GenerationInput) -> AppResult<GenerationOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().push(input.clone());
        if self.hang {
            return future::pending().await;
        }
        match &self.response {
            Ok(output) => Ok(output.clone()),
            Err(AppError::GenerationProviderError { message }) => {
                Err(AppError::GenerationProviderError {
                    message: message.clone(),
                })
            }
            Err(_) => Err(AppError::InternalServerError),
        }
    }
}

#[derive(Default)]
pub struct FakeStaging {
    files: Mutex<HashMap<uuid::Uuid, Vec<u8>>>,
    pub discarded: Mutex<HashSet<uuid::Uuid>>,
}

impl FakeStaging {
    pub async fn stage(&self, bytes: &[u8], media_type: &str) -> StagedUpload {
        let upload = self.begin(media_type).await.unwrap();
        self.append(&upload, bytes).await.unwrap();
        upload
    }

    pub fn was_discarded(&self, upload: &StagedUpload) -> bool {
        self.discarded.lock().unwrap().contains(&upload.id)
    }
}

#[async_trait::async_trait]
impl UploadStagingPort for FakeStaging {
    async fn begin(&self, media_type: &str) -> AppResult<StagedUpload> {
        let upload = StagedUpload::new(media_type);
        self.files.lock().unwrap().insert(upload.id, Vec::new());
        Ok(upload)
    }

    async fn append(&self, upload: &StagedUpload, chunk: &[u8]) -> AppResult<()> {
        self.files
            .lock()
            .unwrap()
            .entry(upload.id)
            .or_default()
            .extend_from_slice(chunk);
        Ok(())
    }

    async fn load(&self, upload: &StagedUpload) -> AppResult<ImagePayload> {
        let bytes = self
            .files
            .lock()
            .unwrap()
            .get(&upload.id)
            .cloned()
            .unwrap_or_default();
        Ok(ImagePayload::new(bytes, upload.media_type.clone())?)
    }

    async fn discard(&self, upload: &StagedUpload) {
        self.files.lock().unwrap().remove(&upload.id);
        self.discarded.lock().unwrap().insert(upload.id);
    }
}
