// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use payflow::application::{PayFlowService, SimulatedProvider};
use payflow::cli::Session;
use payflow::config::AppConfig;
use payflow::domain::Cents;

pub const TEST_ADDRESS: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
pub const RECIPIENT: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

/// Helper to create a service over the default catalog and a fresh simulated provider
pub fn test_service() -> Result<(PayFlowService, Arc<SimulatedProvider>)> {
    service_with(AppConfig::default(), SimulatedProvider::new("2.5"))
}

/// Helper to create a service with a given seed balance
pub fn service_with_balance(
    seed_balance: Cents,
) -> Result<(PayFlowService, Arc<SimulatedProvider>)> {
    let config = AppConfig {
        seed_balance,
        ..AppConfig::default()
    };
    service_with(config, SimulatedProvider::new("2.5"))
}

/// Helper to create a service whose wallet already exists and is loaded
pub async fn service_with_wallet() -> Result<(PayFlowService, Arc<SimulatedProvider>)> {
    let (mut service, provider) =
        service_with(AppConfig::default(), SimulatedProvider::new("2.5").with_wallet(TEST_ADDRESS))?;
    service.start().await?;
    Ok((service, provider))
}

pub fn service_with(
    config: AppConfig,
    provider: SimulatedProvider,
) -> Result<(PayFlowService, Arc<SimulatedProvider>)> {
    let provider = Arc::new(provider);
    let service = PayFlowService::from_config(&config, provider.clone())?;
    Ok((service, provider))
}

/// Run a script of session commands and return everything the session printed
pub async fn run_script(service: PayFlowService, script: &str) -> Result<String> {
    let mut session = Session::new(service, Vec::new());
    session.start().await?;
    session.run(script.as_bytes()).await?;
    Ok(String::from_utf8(session.into_output())?)
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}
