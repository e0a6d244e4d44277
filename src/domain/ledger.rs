use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use super::{
    ActiveSubscription, Catalog, Cents, MethodId, MethodKind, PaymentMethod, PendingPayment,
    Service,
};

/// Where the purchase flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerState {
    /// No payment pending. Initial state.
    Browsing,
    /// A service has been picked and awaits a payment method and confirmation.
    PendingSelection,
    /// A confirmation is being settled. Never observable between calls.
    Confirming,
}

/// How a confirmed payment resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Paid from the stablecoin balance; the subscription is now active.
    Subscribed(ActiveSubscription),
    /// Handed off to an external payment account. The ledger is untouched.
    Redirected {
        service: Service,
        method: PaymentMethod,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: balance {balance}, required {required}")]
    InsufficientBalance { balance: Cents, required: Cents },

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Service not found: {0}")]
    UnknownService(String),

    #[error("Payment method not found: {0}")]
    UnknownPaymentMethod(String),

    #[error("No payment is pending")]
    NoPendingPayment,

    #[error("Invalid amount: {0}")]
    InvalidAmount(Cents),
}

/// In-memory ledger for one app session: the catalog, the stablecoin balance,
/// the active subscriptions and at most one pending payment.
///
/// The balance only moves through this type. A confirmed wallet payment
/// deducts exactly the service price once and appends exactly one
/// subscription; every failure leaves both untouched.
#[derive(Debug, Clone)]
pub struct SubscriptionLedger {
    catalog: Catalog,
    balance: Cents,
    subscriptions: Vec<ActiveSubscription>,
    pending: Option<PendingPayment>,
    /// Method preselected for the next purchase; follows the user's last choice
    preferred_method: MethodId,
    state: LedgerState,
}

impl SubscriptionLedger {
    /// Open a session ledger. The seed balance must not be negative.
    pub fn new(catalog: Catalog, seed_balance: Cents) -> Result<Self, LedgerError> {
        if seed_balance < 0 {
            return Err(LedgerError::InvalidAmount(seed_balance));
        }
        let preferred_method = catalog.default_method_id().to_string();
        Ok(Self {
            catalog,
            balance: seed_balance,
            subscriptions: Vec::new(),
            pending: None,
            preferred_method,
            state: LedgerState::Browsing,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn balance(&self) -> Cents {
        self.balance
    }

    pub fn subscriptions(&self) -> &[ActiveSubscription] {
        &self.subscriptions
    }

    pub fn pending(&self) -> Option<&PendingPayment> {
        self.pending.as_ref()
    }

    pub fn state(&self) -> LedgerState {
        self.state
    }

    pub fn preferred_method(&self) -> &str {
        &self.preferred_method
    }

    /// Start a purchase of `service_id`. Fails without any state change when
    /// the balance cannot cover the price. A request made while another
    /// payment is pending replaces it.
    pub fn request_subscribe(&mut self, service_id: &str) -> Result<&PendingPayment, LedgerError> {
        let service = self
            .catalog
            .service(service_id)
            .ok_or_else(|| LedgerError::UnknownService(service_id.to_string()))?;

        if self.balance < service.price {
            return Err(LedgerError::InsufficientBalance {
                balance: self.balance,
                required: service.price,
            });
        }

        let pending = PendingPayment {
            service: service.clone(),
            method_id: self.preferred_method.clone(),
        };
        debug!(service = %pending.service.id, method = %pending.method_id, "payment pending");
        self.state = LedgerState::PendingSelection;
        let pending = self.pending.insert(pending);
        Ok(&*pending)
    }

    /// Change the method of the pending payment. No state transition.
    pub fn select_payment_method(&mut self, method_id: &str) -> Result<(), LedgerError> {
        if self.catalog.payment_method(method_id).is_none() {
            return Err(LedgerError::UnknownPaymentMethod(method_id.to_string()));
        }
        let pending = self
            .pending
            .as_mut()
            .ok_or(LedgerError::NoPendingPayment)?;

        pending.method_id = method_id.to_string();
        self.preferred_method = method_id.to_string();
        Ok(())
    }

    /// Settle the pending payment. Returns `Ok(None)` when nothing is pending.
    ///
    /// Whatever the result, the pending payment is consumed and the ledger is
    /// back in `Browsing` when this returns.
    pub fn confirm_payment(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Option<PaymentOutcome>, LedgerError> {
        let Some(pending) = self.pending.take() else {
            return Ok(None);
        };

        self.state = LedgerState::Confirming;
        let result = self.settle(pending, now);
        self.state = LedgerState::Browsing;

        debug!(ok = result.is_ok(), "payment settled");
        result.map(Some)
    }

    fn settle(
        &mut self,
        pending: PendingPayment,
        now: DateTime<Utc>,
    ) -> Result<PaymentOutcome, LedgerError> {
        let method = self
            .catalog
            .payment_method(&pending.method_id)
            .cloned()
            .ok_or_else(|| {
                LedgerError::OperationFailed(format!(
                    "payment method {} is not available",
                    pending.method_id
                ))
            })?;

        match method.kind {
            MethodKind::External => Ok(PaymentOutcome::Redirected {
                service: pending.service,
                method,
            }),
            MethodKind::Wallet => {
                let price = pending.service.price;
                if self.balance < price {
                    // The balance was spent elsewhere after the request
                    return Err(LedgerError::InsufficientBalance {
                        balance: self.balance,
                        required: price,
                    });
                }
                let remaining = self
                    .balance
                    .checked_sub(price)
                    .filter(|remaining| *remaining >= 0)
                    .ok_or_else(|| {
                        LedgerError::OperationFailed("balance arithmetic overflow".to_string())
                    })?;

                // All checks passed: apply both mutations together
                let subscription = ActiveSubscription::new(pending.service, method.id, now);
                self.balance = remaining;
                self.subscriptions.push(subscription.clone());
                Ok(PaymentOutcome::Subscribed(subscription))
            }
        }
    }

    /// Discard the pending payment. Returns whether one was pending;
    /// calling it again is a no-op.
    pub fn cancel_payment(&mut self) -> bool {
        self.state = LedgerState::Browsing;
        let discarded = self.pending.take().is_some();
        if discarded {
            debug!("pending payment discarded");
        }
        discarded
    }

    /// Check that `amount` can be spent from the balance.
    pub fn ensure_funds(&self, amount: Cents) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if amount > self.balance {
            return Err(LedgerError::InsufficientBalance {
                balance: self.balance,
                required: amount,
            });
        }
        Ok(())
    }

    /// Deduct an amount sent out of the wallet. Never takes the balance below zero.
    pub fn withdraw(&mut self, amount: Cents) -> Result<Cents, LedgerError> {
        self.ensure_funds(amount)?;
        self.balance -= amount;
        debug!(amount, balance = self.balance, "balance withdrawn");
        Ok(self.balance)
    }
}
