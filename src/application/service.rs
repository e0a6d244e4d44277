use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::domain::{
    Chain, Cents, LedgerError, PaymentOutcome, PendingPayment, SubscriptionLedger, format_cents,
    parse_positive_cents,
};

use super::{Action, AppError, AppState, Notice, ProviderError, WalletProvider, reduce};

/// Application service for one PayFlow session.
/// This is the primary interface for any front-end (CLI, TUI, mobile bridge).
///
/// The service exclusively owns the subscription ledger and the app state.
/// The wallet provider is injected so the whole flow runs against a stub.
pub struct PayFlowService {
    ledger: SubscriptionLedger,
    state: AppState,
    provider: Arc<dyn WalletProvider>,
    token_symbol: String,
}

impl PayFlowService {
    pub fn new(
        ledger: SubscriptionLedger,
        provider: Arc<dyn WalletProvider>,
        chain: Chain,
        token_symbol: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            state: AppState::new(chain),
            provider,
            token_symbol: token_symbol.into(),
        }
    }

    /// Build a session from configuration: catalog, seed balance and network.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn WalletProvider>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let catalog = config.build_catalog()?;
        let ledger = SubscriptionLedger::new(catalog, config.seed_balance)?;
        Ok(Self::new(
            ledger,
            provider,
            config.chain,
            config.token_symbol.clone(),
        ))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn ledger(&self) -> &SubscriptionLedger {
        &self.ledger
    }

    pub fn token_symbol(&self) -> &str {
        &self.token_symbol
    }

    pub fn dispatch(&mut self, action: Action) {
        debug!(?action, "dispatch");
        self.state = reduce(&self.state, action);
    }

    // ========================
    // Wallet operations
    // ========================

    /// Load the session wallet's address and existence, as on app launch.
    pub async fn start(&mut self) -> Result<(), AppError> {
        let addresses = self.provider.addresses().await.map_err(|err| {
            warn!(%err, "failed to load wallet addresses");
            AppError::provider("Failed to load wallet", err)
        })?;

        if let Some(address) = addresses.solana {
            info!(%address, "solana address loaded");
            self.dispatch(Action::SetAddress(address));
        }

        self.check_wallet().await?;
        Ok(())
    }

    /// Ask the provider whether a wallet exists; refresh balances when it does.
    pub async fn check_wallet(&mut self) -> Result<bool, AppError> {
        let exists = self.provider.wallet_exists().await.map_err(|err| {
            warn!(%err, "failed to check wallet");
            AppError::provider("Failed to check wallet", err)
        })?;

        self.dispatch(Action::WalletStatus(exists));
        if exists && self.state.address.is_some() {
            self.refresh_balances().await;
        }
        Ok(exists)
    }

    pub async fn create_wallet(&mut self) -> Result<Notice, AppError> {
        let addresses = self.provider.create_wallet().await.map_err(|err| {
            error!(%err, "wallet creation failed");
            AppError::provider("Failed to create wallet", err)
        })?;

        let address = addresses
            .solana
            .ok_or_else(|| AppError::provider("Failed to create wallet", ProviderError::NoWallet))?;

        info!(%address, "wallet created");
        self.dispatch(Action::WalletCreated(address));
        Ok(Notice::new("Success", "Wallet created successfully!"))
    }

    /// Fetch the native balance for the current address and network.
    /// Failures are logged and leave the last known balance in place.
    pub async fn refresh_balances(&mut self) {
        let Some(address) = self.state.address.clone() else {
            return;
        };

        match self
            .provider
            .balances(&address, self.state.chain.is_devnet())
            .await
        {
            Ok(balances) => self.dispatch(Action::NativeBalance(balances.native_balance)),
            Err(err) => error!(%err, %address, "error fetching balances"),
        }
    }

    pub async fn select_chain(&mut self, chain: Chain) {
        self.dispatch(Action::SelectChain(chain));
        if self.state.has_wallet {
            self.refresh_balances().await;
        }
    }

    /// Send stablecoin from the wallet to `recipient`.
    ///
    /// The balance is withdrawn only after the provider accepted the transfer.
    pub async fn send_stablecoin(
        &mut self,
        recipient: &str,
        amount: &str,
    ) -> Result<Notice, AppError> {
        let recipient = recipient.trim();
        if recipient.is_empty() || amount.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Please enter recipient address and amount".to_string(),
            ));
        }

        let amount_cents: Cents = parse_positive_cents(amount)
            .map_err(|_| AppError::InvalidAmount("Please enter a valid amount".to_string()))?;

        self.ledger
            .ensure_funds(amount_cents)
            .map_err(transfer_error)?;

        let receipt = self
            .provider
            .transfer(
                self.state.chain,
                recipient,
                &self.token_symbol,
                amount_cents,
            )
            .await
            .map_err(|err| {
                error!(%err, recipient, "transfer failed");
                AppError::provider("Transaction failed", err)
            })?;

        self.ledger.withdraw(amount_cents).map_err(transfer_error)?;
        info!(
            tx = %receipt.tx_hash,
            amount = %format_cents(amount_cents),
            "stablecoin sent"
        );
        self.dispatch(Action::TransferSent(receipt.tx_hash));
        Ok(Notice::new("Success", "Transaction sent successfully!"))
    }

    // ========================
    // Subscription operations
    // ========================

    /// Open the payment flow for a service if the balance covers its price.
    pub fn request_subscribe(&mut self, service_id: &str) -> Result<&PendingPayment, AppError> {
        match self.ledger.request_subscribe(service_id) {
            Ok(pending) => Ok(pending),
            Err(err) => {
                debug!(%err, service_id, "subscribe rejected");
                Err(err.into())
            }
        }
    }

    pub fn select_payment_method(&mut self, method_id: &str) -> Result<(), AppError> {
        Ok(self.ledger.select_payment_method(method_id)?)
    }

    /// Confirm the pending payment. Returns `None` when nothing was pending.
    ///
    /// Subscription payments settle against the in-app balance only; no
    /// provider transfer is made.
    pub fn confirm_payment(&mut self, now: DateTime<Utc>) -> Result<Option<Notice>, AppError> {
        let outcome = self.ledger.confirm_payment(now).map_err(|err| {
            warn!(%err, "payment error");
            AppError::from(err)
        })?;

        let notice = match outcome {
            None => return Ok(None),
            Some(PaymentOutcome::Subscribed(subscription)) => {
                info!(
                    service = %subscription.service.id,
                    price = %format_cents(subscription.service.price),
                    balance = %format_cents(self.ledger.balance()),
                    "subscribed"
                );
                Notice::new(
                    "Success!",
                    format!("Successfully subscribed to {}", subscription.service.name),
                )
            }
            Some(PaymentOutcome::Redirected { service, method }) => {
                info!(service = %service.id, method = %method.id, "redirected to external payment");
                Notice::new(
                    method.name.as_str(),
                    format!("Redirecting to {}...", method.name),
                )
            }
        };
        Ok(Some(notice))
    }

    /// Dismiss the payment modal. Returns whether a payment was pending.
    pub fn cancel_payment(&mut self) -> bool {
        self.ledger.cancel_payment()
    }
}

/// Wallet sends report a shortfall with their own notice.
fn transfer_error(err: LedgerError) -> AppError {
    match err {
        LedgerError::InsufficientBalance { balance, required } => {
            AppError::TransferExceedsBalance { balance, required }
        }
        other => other.into(),
    }
}
