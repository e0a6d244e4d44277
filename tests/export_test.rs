mod common;

use anyhow::Result;
use common::*;
use payflow::io::{Exporter, SessionSnapshot};

#[tokio::test]
async fn test_export_subscriptions_csv() -> Result<()> {
    let (mut service, _provider) = test_service()?;
    let now = parse_date("2025-03-01");
    service.request_subscribe("spotify")?;
    service.confirm_payment(now)?;
    service.request_subscribe("ny-times")?;
    service.confirm_payment(now)?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&service).export_subscriptions_csv(&mut buffer)?;
    assert_eq!(count, 2);

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let headers = reader.headers()?.clone();
    assert_eq!(&headers[1], "service_id");

    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][1], "spotify");
    assert_eq!(&rows[0][3], "9.99");
    assert_eq!(&rows[0][4], "monthly");
    assert_eq!(&rows[0][5], "pyusd");
    assert_eq!(&rows[1][2], "The New York Times");
    assert!(rows[1][7].starts_with("2025-03-08"));
    Ok(())
}

#[tokio::test]
async fn test_export_empty_csv_has_header_only() -> Result<()> {
    let (service, _provider) = test_service()?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&service).export_subscriptions_csv(&mut buffer)?;
    assert_eq!(count, 0);
    assert_eq!(String::from_utf8(buffer)?.lines().count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_export_session_json() -> Result<()> {
    let (mut service, _provider) = service_with_wallet().await?;
    let now = parse_date("2025-03-01");
    service.request_subscribe("starbucks")?;
    service.confirm_payment(now)?;

    let mut buffer = Vec::new();
    let snapshot = Exporter::new(&service).export_session_json(&mut buffer, now)?;
    assert_eq!(snapshot.balance_cents, 11050);
    assert_eq!(snapshot.balance, "110.50");

    let parsed: SessionSnapshot = serde_json::from_slice(&buffer)?;
    assert_eq!(parsed.address.as_deref(), Some(TEST_ADDRESS));
    assert_eq!(parsed.subscriptions.len(), 1);
    assert_eq!(parsed.subscriptions[0].service.price, 1500);
    assert_eq!(parsed.exported_at, now);
    Ok(())
}
