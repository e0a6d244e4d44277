use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MethodId, Service};

pub type SubscriptionId = Uuid;

/// A service the user has paid for during this session.
/// Subscriptions are append-only: nothing renews, expires or cancels them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSubscription {
    pub id: SubscriptionId,
    pub service: Service,
    /// Payment method that settled the purchase
    pub method_id: MethodId,
    pub activated_at: DateTime<Utc>,
}

impl ActiveSubscription {
    pub fn new(service: Service, method_id: MethodId, activated_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            service,
            method_id,
            activated_at,
        }
    }

    /// Date the subscription would next renew. Display only; no charge is scheduled.
    pub fn next_renewal(&self) -> DateTime<Utc> {
        self.service.period.advance(self.activated_at)
    }
}

/// The purchase awaiting confirmation in the payment modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPayment {
    pub service: Service,
    pub method_id: MethodId,
}
