use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Cents, deserialize_cents, serialize_cents};

pub type ServiceId = String;
pub type MethodId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Weekly,
    Monthly,
}

impl BillingPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingPeriod::Weekly => "weekly",
            BillingPeriod::Monthly => "monthly",
        }
    }

    /// The instant one billing period after `from`.
    /// Monthly periods follow the calendar, clamping to the last day of short months.
    pub fn advance(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            BillingPeriod::Weekly => from + Duration::days(7),
            BillingPeriod::Monthly => from
                .checked_add_months(Months::new(1))
                .unwrap_or(from + Duration::days(30)),
        }
    }
}

impl FromStr for BillingPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(BillingPeriod::Weekly),
            "monthly" => Ok(BillingPeriod::Monthly),
            other => Err(format!("unknown billing period '{}'", other)),
        }
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A purchasable subscription service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(
        deserialize_with = "deserialize_cents",
        serialize_with = "serialize_cents"
    )]
    pub price: Cents,
    pub period: BillingPeriod,
    #[serde(default)]
    pub features: Vec<String>,
    /// Promotional label shown when paying with the stablecoin wallet
    #[serde(default)]
    pub savings: String,
}

/// How a payment method settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    /// Deducts from the in-app stablecoin balance
    Wallet,
    /// Hands off to an outside payment account; nothing is charged here
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: MethodId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub kind: MethodKind,
}

impl PaymentMethod {
    pub fn is_wallet(&self) -> bool {
        self.kind == MethodKind::Wallet
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog has no services")]
    NoServices,

    #[error("catalog has no payment methods")]
    NoPaymentMethods,

    #[error("duplicate service id: {0}")]
    DuplicateService(String),

    #[error("duplicate payment method id: {0}")]
    DuplicatePaymentMethod(String),

    #[error("service {0} must have a positive price")]
    NonPositivePrice(String),

    #[error("default payment method {0} is not in the catalog")]
    UnknownDefaultMethod(String),
}

/// The immutable set of services and payment methods offered in a session.
/// Entries keep their configured display order and are looked up by id.
#[derive(Debug, Clone)]
pub struct Catalog {
    services: Vec<Service>,
    payment_methods: Vec<PaymentMethod>,
    service_index: HashMap<ServiceId, usize>,
    default_method: MethodId,
}

impl Catalog {
    pub fn new(
        services: Vec<Service>,
        payment_methods: Vec<PaymentMethod>,
        default_method: impl Into<MethodId>,
    ) -> Result<Self, CatalogError> {
        let default_method = default_method.into();

        if services.is_empty() {
            return Err(CatalogError::NoServices);
        }
        if payment_methods.is_empty() {
            return Err(CatalogError::NoPaymentMethods);
        }

        let mut service_index = HashMap::with_capacity(services.len());
        for (position, service) in services.iter().enumerate() {
            if service.price <= 0 {
                return Err(CatalogError::NonPositivePrice(service.id.clone()));
            }
            if service_index.insert(service.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateService(service.id.clone()));
            }
        }

        for (position, method) in payment_methods.iter().enumerate() {
            if payment_methods[..position].iter().any(|m| m.id == method.id) {
                return Err(CatalogError::DuplicatePaymentMethod(method.id.clone()));
            }
        }
        if !payment_methods.iter().any(|m| m.id == default_method) {
            return Err(CatalogError::UnknownDefaultMethod(default_method));
        }

        Ok(Self {
            services,
            payment_methods,
            service_index,
            default_method,
        })
    }

    /// Services in display order.
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Payment methods in display order.
    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    pub fn service(&self, id: &str) -> Option<&Service> {
        self.service_index.get(id).map(|&i| &self.services[i])
    }

    pub fn payment_method(&self, id: &str) -> Option<&PaymentMethod> {
        self.payment_methods.iter().find(|m| m.id == id)
    }

    pub fn default_method_id(&self) -> &str {
        &self.default_method
    }
}
