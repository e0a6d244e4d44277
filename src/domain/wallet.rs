use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Solana network the wallet talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    /// Production network with real funds
    Mainnet,
    /// Test network for development
    #[default]
    Devnet,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Mainnet => "mainnet",
            Chain::Devnet => "devnet",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Chain::Mainnet => "Mainnet",
            Chain::Devnet => "Devnet",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Chain::Mainnet => "Production network with real funds",
            Chain::Devnet => "Test network for development",
        }
    }

    pub fn is_devnet(&self) -> bool {
        matches!(self, Chain::Devnet)
    }

    pub fn all() -> [Chain; 2] {
        [Chain::Mainnet, Chain::Devnet]
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" => Ok(Chain::Mainnet),
            "devnet" => Ok(Chain::Devnet),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Addresses derived by the wallet provider, one per supported chain family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAddresses {
    pub solana: Option<String>,
}

/// Balances reported by the provider. Amounts are decimal strings as returned upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalances {
    pub native_balance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub tx_hash: String,
}

/// Shorten a long address or hash for display: first and last `keep` characters.
pub fn abbreviate(value: &str, keep: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= keep * 2 {
        return value.to_string();
    }
    let head: String = chars[..keep].iter().collect();
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_roundtrip() {
        for chain in Chain::all() {
            assert_eq!(chain.as_str().parse::<Chain>(), Ok(chain));
        }
        assert!("testnet".parse::<Chain>().is_err());
    }

    #[test]
    fn test_default_chain_is_devnet() {
        assert_eq!(Chain::default(), Chain::Devnet);
        assert!(Chain::default().is_devnet());
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("short", 8), "short");
        assert_eq!(
            abbreviate("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU", 8),
            "7xKXtg2C...uJosgAsU"
        );
    }
}
