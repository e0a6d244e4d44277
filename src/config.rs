use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    BillingPeriod, Catalog, CatalogError, Chain, Cents, MethodKind, PaymentMethod, Service,
    deserialize_cents, serialize_cents,
};

pub const DEFAULT_SEED_BALANCE: Cents = 12550;
pub const DEFAULT_TOKEN_SYMBOL: &str = "PYUSD";
pub const DEFAULT_PAYMENT_METHOD: &str = "pyusd";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("seed balance must not be negative")]
    NegativeSeedBalance,
}

/// Session configuration. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Stablecoin balance the session starts with
    #[serde(
        deserialize_with = "deserialize_cents",
        serialize_with = "serialize_cents"
    )]
    pub seed_balance: Cents,
    pub chain: Chain,
    pub token_symbol: String,
    pub provider: ProviderConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Native balance the simulated provider reports on devnet
    pub initial_native_balance: String,
    /// Artificial delay added to every simulated provider call
    pub latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub default_payment_method: String,
    pub services: Vec<Service>,
    pub payment_methods: Vec<PaymentMethod>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed_balance: DEFAULT_SEED_BALANCE,
            chain: Chain::default(),
            token_symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
            provider: ProviderConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            initial_native_balance: "0".to_string(),
            latency_ms: 0,
        }
    }
}

impl ProviderConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
            services: default_services(),
            payment_methods: default_payment_methods(),
        }
    }
}

impl AppConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seed_balance < 0 {
            return Err(ConfigError::NegativeSeedBalance);
        }
        self.build_catalog().map(|_| ())
    }

    pub fn build_catalog(&self) -> Result<Catalog, ConfigError> {
        Ok(Catalog::new(
            self.catalog.services.clone(),
            self.catalog.payment_methods.clone(),
            self.catalog.default_payment_method.clone(),
        )?)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_services() -> Vec<Service> {
    vec![
        Service {
            id: "prime-video".into(),
            name: "Prime Video".into(),
            description: "Stream thousands of movies and TV shows".into(),
            icon: "📺".into(),
            price: 899,
            period: BillingPeriod::Monthly,
            features: strings(&[
                "4K Ultra HD",
                "Ad-free streaming",
                "Download content",
                "Multi-device access",
            ]),
            savings: "15% off with PYUSD".into(),
        },
        Service {
            id: "ny-times".into(),
            name: "The New York Times".into(),
            description: "Premium journalism and breaking news".into(),
            icon: "📰".into(),
            price: 425,
            period: BillingPeriod::Weekly,
            features: strings(&[
                "Unlimited articles",
                "The Athletic included",
                "Crosswords & games",
                "Audio articles",
            ]),
            savings: "20% off with PYUSD".into(),
        },
        Service {
            id: "spotify".into(),
            name: "Spotify Premium".into(),
            description: "Music streaming without limits".into(),
            icon: "🎵".into(),
            price: 999,
            period: BillingPeriod::Monthly,
            features: strings(&[
                "Ad-free music",
                "Offline downloads",
                "High quality audio",
                "Spotify Connect",
            ]),
            savings: "10% off with PYUSD".into(),
        },
        Service {
            id: "starbucks".into(),
            name: "Starbucks Plus".into(),
            description: "Daily coffee subscription".into(),
            icon: "☕".into(),
            price: 1500,
            period: BillingPeriod::Monthly,
            features: strings(&[
                "One drink per day",
                "Skip the line ordering",
                "Bonus stars",
                "Exclusive offers",
            ]),
            savings: "25% off with PYUSD".into(),
        },
    ]
}

fn default_payment_methods() -> Vec<PaymentMethod> {
    vec![
        PaymentMethod {
            id: "pyusd".into(),
            name: "PYUSD Wallet".into(),
            description: "Pay with your stablecoin balance".into(),
            benefits: strings(&["Instant settlement", "Lower fees", "Exclusive discounts"]),
            kind: MethodKind::Wallet,
        },
        PaymentMethod {
            id: "paypal".into(),
            name: "PayPal Account".into(),
            description: "Pay with your PayPal balance".into(),
            benefits: strings(&["Buyer protection", "Easy refunds", "Familiar interface"]),
            kind: MethodKind::External,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();

        let catalog = config.build_catalog().unwrap();
        assert_eq!(catalog.services().len(), 4);
        assert_eq!(catalog.service("spotify").unwrap().price, 999);
        assert_eq!(catalog.default_method_id(), "pyusd");
        assert_eq!(config.seed_balance, 12550);
        assert_eq!(config.chain, Chain::Devnet);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = AppConfig::from_toml_str(
            r#"
            seed_balance = "5.00"
            chain = "mainnet"

            [provider]
            latency_ms = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.seed_balance, 500);
        assert_eq!(config.chain, Chain::Mainnet);
        assert_eq!(config.provider.latency(), Duration::from_millis(25));
        assert_eq!(config.provider.initial_native_balance, "0");
        assert_eq!(config.catalog.services.len(), 4);
    }

    #[test]
    fn test_custom_catalog_with_numeric_prices() {
        let config = AppConfig::from_toml_str(
            r#"
            seed_balance = 20

            [catalog]
            default_payment_method = "pyusd"

            [[catalog.services]]
            id = "gym"
            name = "Gym Pass"
            price = 12.5
            period = "weekly"

            [[catalog.payment_methods]]
            id = "pyusd"
            name = "PYUSD Wallet"
            kind = "wallet"
            "#,
        )
        .unwrap();

        let catalog = config.build_catalog().unwrap();
        assert_eq!(config.seed_balance, 2000);
        assert_eq!(catalog.services().len(), 1);
        assert_eq!(catalog.service("gym").unwrap().price, 1250);
        assert_eq!(catalog.service("gym").unwrap().period, BillingPeriod::Weekly);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            AppConfig::from_toml_str("seed_balance = \"-1\""),
            Err(ConfigError::NegativeSeedBalance)
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[catalog]\ndefault_payment_method = \"card\""),
            Err(ConfigError::Catalog(CatalogError::UnknownDefaultMethod(_)))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("colour = \"blue\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AppConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(AppConfig::from_toml_str(&text).unwrap(), config);
    }
}
