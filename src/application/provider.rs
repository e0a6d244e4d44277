use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{AssetBalances, Chain, Cents, TransferReceipt, WalletAddresses};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("no wallet exists for this session")]
    NoWallet,

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Capabilities of the MPC wallet provider the app depends on.
///
/// Key generation, address derivation, balance indexing and transaction
/// signing all happen behind this trait. Calls are not retried.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Addresses of the current session's wallet, if one exists.
    async fn addresses(&self) -> Result<WalletAddresses, ProviderError>;

    async fn create_wallet(&self) -> Result<WalletAddresses, ProviderError>;

    async fn wallet_exists(&self) -> Result<bool, ProviderError>;

    async fn balances(&self, address: &str, devnet: bool) -> Result<AssetBalances, ProviderError>;

    /// Send `amount` of `token` to `to` and return the transaction id.
    async fn transfer(
        &self,
        chain: Chain,
        to: &str,
        token: &str,
        amount: Cents,
    ) -> Result<TransferReceipt, ProviderError>;
}
