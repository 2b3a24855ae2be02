use dashmap::{DashMap, mapref::entry::Entry};

use domain::auth::UserId;
use domain::payment::OrderId;
use stylist_application::{error::AppResult, ports::outgoing::payment_record::PaymentRecordPort};

#[derive(Default)]
pub struct InMemoryPaymentRecord {
    credited: DashMap<OrderId, UserId>,
}

impl InMemoryPaymentRecord {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PaymentRecordPort for InMemoryPaymentRecord {
    async fn record_if_new(
        &self,
        order_id: &OrderId,
        user_id: &UserId,
    ) -> AppResult<Option<UserId>> {
        match self.credited.entry(order_id.clone()) {
            Entry::Occupied(existing) => Ok(Some(existing.get().clone())),
            Entry::Vacant(vacant) => {
                vacant.insert(user_id.clone());
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn first_record_wins() {
        let records = InMemoryPaymentRecord::new();
        let order = OrderId::new("order_1");

        let first = records
            .record_if_new(&order, &UserId::new("alice"))
            .await
            .unwrap();
        let second = records
            .record_if_new(&order, &UserId::new("bob"))
            .await
            .unwrap();

        assert_eq!(first, None);
        assert_eq!(second, Some(UserId::new("alice")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_records_admit_one() {
        let records = Arc::new(InMemoryPaymentRecord::new());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let records = Arc::clone(&records);
                tokio::spawn(async move {
                    records
                        .record_if_new(&OrderId::new("order_race"), &UserId::new(format!("u{i}")))
                        .await
                        .unwrap()
                        .is_none()
                })
            })
            .collect();

        let mut fresh = 0;
        for handle in handles {
            if handle.await.unwrap() {
                fresh += 1;
            }
        }
        assert_eq!(fresh, 1);
    }
}
