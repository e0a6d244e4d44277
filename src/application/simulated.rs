use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::domain::{AssetBalances, Chain, Cents, TransferReceipt, WalletAddresses};

use super::{ProviderError, WalletProvider};

/// Provider operations, used to arm failures in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderOp {
    Addresses,
    CreateWallet,
    WalletExists,
    Balances,
    Transfer,
}

/// A transfer accepted by the simulated provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTransfer {
    pub chain: Chain,
    pub to: String,
    pub token: String,
    pub amount: Cents,
    pub tx_hash: String,
}

#[derive(Debug, Default)]
struct SimState {
    address: Option<String>,
    devnet_native: String,
    mainnet_native: String,
    transfers: Vec<RecordedTransfer>,
    armed_failures: HashSet<ProviderOp>,
}

/// In-memory stand-in for the MPC wallet provider.
///
/// Generates Solana-style base58 addresses and transaction ids, reports a fixed
/// native balance and records transfers instead of broadcasting them.
#[derive(Debug)]
pub struct SimulatedProvider {
    state: Mutex<SimState>,
    latency: Duration,
}

impl SimulatedProvider {
    pub fn new(initial_native_balance: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(SimState {
                devnet_native: initial_native_balance.into(),
                mainnet_native: "0".to_string(),
                ..SimState::default()
            }),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Start with a wallet already provisioned at `address`.
    pub fn with_wallet(self, address: impl Into<String>) -> Self {
        self.lock().address = Some(address.into());
        self
    }

    /// Make the next call of `op` fail with `ProviderError::Unavailable`.
    pub fn fail_next(&self, op: ProviderOp) {
        self.lock().armed_failures.insert(op);
    }

    pub fn transfers(&self) -> Vec<RecordedTransfer> {
        self.lock().transfers.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn enter(&self, op: ProviderOp) -> Result<MutexGuard<'_, SimState>, ProviderError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let mut state = self.lock();
        if state.armed_failures.remove(&op) {
            return Err(ProviderError::Unavailable(format!("{:?} failed", op)));
        }
        Ok(state)
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new("0")
    }
}

#[async_trait]
impl WalletProvider for SimulatedProvider {
    async fn addresses(&self) -> Result<WalletAddresses, ProviderError> {
        let state = self.enter(ProviderOp::Addresses).await?;
        Ok(WalletAddresses {
            solana: state.address.clone(),
        })
    }

    async fn create_wallet(&self) -> Result<WalletAddresses, ProviderError> {
        let mut state = self.enter(ProviderOp::CreateWallet).await?;
        let address = state
            .address
            .get_or_insert_with(|| random_base58(32))
            .clone();
        Ok(WalletAddresses {
            solana: Some(address),
        })
    }

    async fn wallet_exists(&self) -> Result<bool, ProviderError> {
        let state = self.enter(ProviderOp::WalletExists).await?;
        Ok(state.address.is_some())
    }

    async fn balances(&self, address: &str, devnet: bool) -> Result<AssetBalances, ProviderError> {
        let state = self.enter(ProviderOp::Balances).await?;
        if state.address.as_deref() != Some(address) {
            return Err(ProviderError::Rejected(format!("unknown address {}", address)));
        }
        let native_balance = if devnet {
            state.devnet_native.clone()
        } else {
            state.mainnet_native.clone()
        };
        Ok(AssetBalances { native_balance })
    }

    async fn transfer(
        &self,
        chain: Chain,
        to: &str,
        token: &str,
        amount: Cents,
    ) -> Result<TransferReceipt, ProviderError> {
        let mut state = self.enter(ProviderOp::Transfer).await?;
        if state.address.is_none() {
            return Err(ProviderError::NoWallet);
        }
        if to.trim().is_empty() {
            return Err(ProviderError::Rejected("recipient address is empty".to_string()));
        }
        if amount <= 0 {
            return Err(ProviderError::Rejected("amount must be positive".to_string()));
        }

        let tx_hash = random_base58(64);
        state.transfers.push(RecordedTransfer {
            chain,
            to: to.to_string(),
            token: token.to_string(),
            amount,
            tx_hash: tx_hash.clone(),
        });
        Ok(TransferReceipt { tx_hash })
    }
}

/// Base58-encode `len` random bytes, the shape of Solana keys (32) and signatures (64).
fn random_base58(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill(bytes.as_mut_slice());
    bs58::encode(bytes).into_string()
}
