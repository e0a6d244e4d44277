use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::PayFlowService;
use crate::domain::{ActiveSubscription, Chain, Cents, format_cents};

/// Point-in-time view of a session, for JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub chain: Chain,
    pub address: Option<String>,
    pub token_symbol: String,
    pub balance_cents: Cents,
    pub balance: String,
    pub subscriptions: Vec<ActiveSubscription>,
}

/// Exporter for writing session data out as CSV or JSON
pub struct Exporter<'a> {
    service: &'a PayFlowService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a PayFlowService) -> Self {
        Self { service }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        let ledger = self.service.ledger();
        let state = self.service.state();
        SessionSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: now,
            chain: state.chain,
            address: state.address.clone(),
            token_symbol: self.service.token_symbol().to_string(),
            balance_cents: ledger.balance(),
            balance: format_cents(ledger.balance()),
            subscriptions: ledger.subscriptions().to_vec(),
        }
    }

    /// Export active subscriptions to CSV format
    pub fn export_subscriptions_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "service_id",
            "service_name",
            "price",
            "period",
            "method",
            "activated_at",
            "next_renewal",
        ])?;

        let subscriptions = self.service.ledger().subscriptions();
        for subscription in subscriptions {
            csv_writer.write_record([
                subscription.id.to_string(),
                subscription.service.id.clone(),
                subscription.service.name.clone(),
                format_cents(subscription.service.price),
                subscription.service.period.to_string(),
                subscription.method_id.clone(),
                subscription.activated_at.to_rfc3339(),
                subscription.next_renewal().to_rfc3339(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(subscriptions.len())
    }

    /// Export the whole session as pretty-printed JSON
    pub fn export_session_json<W: Write>(
        &self,
        mut writer: W,
        now: DateTime<Utc>,
    ) -> Result<SessionSnapshot> {
        let snapshot = self.snapshot(now);
        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writeln!(writer)?;
        Ok(snapshot)
    }
}
