mod common;

use anyhow::Result;
use common::*;
use payflow::application::AppError;
use payflow::domain::{BillingPeriod, LedgerState};

#[tokio::test]
async fn test_subscribe_with_wallet_debits_balance() -> Result<()> {
    let (mut service, provider) = test_service()?;
    let now = parse_date("2025-03-01");

    let pending = service.request_subscribe("spotify")?;
    assert_eq!(pending.service.id, "spotify");
    assert_eq!(pending.method_id, "pyusd");
    assert_eq!(service.ledger().state(), LedgerState::PendingSelection);

    let notice = service.confirm_payment(now)?.expect("payment was pending");
    assert_eq!(notice.title, "Success!");
    assert_eq!(notice.message, "Successfully subscribed to Spotify Premium");

    let ledger = service.ledger();
    assert_eq!(ledger.balance(), 11651);
    assert_eq!(ledger.subscriptions().len(), 1);
    assert_eq!(ledger.subscriptions()[0].activated_at, now);
    assert!(ledger.pending().is_none());
    assert_eq!(ledger.state(), LedgerState::Browsing);

    // Subscription payments never go through the provider
    assert!(provider.transfers().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_subscribe_rejected_when_balance_too_low() -> Result<()> {
    let (mut service, _provider) = service_with_balance(500)?;

    let err = service.request_subscribe("spotify").unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientBalance {
            balance: 500,
            required: 999
        }
    ));
    assert_eq!(err.notice().title, "Insufficient Balance");
    assert!(service.ledger().pending().is_none());
    assert_eq!(service.ledger().state(), LedgerState::Browsing);

    // A cheaper weekly service still fits
    let pending = service.request_subscribe("ny-times")?;
    assert_eq!(pending.service.period, BillingPeriod::Weekly);
    Ok(())
}

#[tokio::test]
async fn test_exact_balance_is_enough() -> Result<()> {
    let (mut service, _provider) = service_with_balance(899)?;

    service.request_subscribe("prime-video")?;
    service.confirm_payment(parse_date("2025-03-01"))?;

    assert_eq!(service.ledger().balance(), 0);
    assert_eq!(service.ledger().subscriptions().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unknown_service() -> Result<()> {
    let (mut service, _provider) = test_service()?;

    let err = service.request_subscribe("netflix").unwrap_err();
    assert!(matches!(err, AppError::ServiceNotFound(_)));
    assert!(service.ledger().pending().is_none());
    Ok(())
}

#[tokio::test]
async fn test_external_method_redirects_without_charging() -> Result<()> {
    let (mut service, _provider) = test_service()?;

    service.request_subscribe("prime-video")?;
    service.select_payment_method("paypal")?;

    let notice = service
        .confirm_payment(parse_date("2025-03-01"))?
        .expect("payment was pending");
    assert_eq!(notice.title, "PayPal Account");
    assert_eq!(notice.message, "Redirecting to PayPal Account...");

    let ledger = service.ledger();
    assert_eq!(ledger.balance(), 12550);
    assert!(ledger.subscriptions().is_empty());
    assert!(ledger.pending().is_none());
    Ok(())
}

#[tokio::test]
async fn test_method_choice_is_remembered() -> Result<()> {
    let (mut service, _provider) = test_service()?;

    service.request_subscribe("starbucks")?;
    service.select_payment_method("paypal")?;
    assert!(service.cancel_payment());

    let pending = service.request_subscribe("spotify")?;
    assert_eq!(pending.method_id, "paypal");
    Ok(())
}

#[tokio::test]
async fn test_select_method_requires_known_method_and_pending_payment() -> Result<()> {
    let (mut service, _provider) = test_service()?;

    let err = service.select_payment_method("paypal").unwrap_err();
    assert!(matches!(err, AppError::NoPendingPayment));

    service.request_subscribe("spotify")?;
    let err = service.select_payment_method("venmo").unwrap_err();
    assert!(matches!(err, AppError::PaymentMethodNotFound(_)));
    assert_eq!(service.ledger().pending().unwrap().method_id, "pyusd");
    Ok(())
}

#[tokio::test]
async fn test_cancel_is_idempotent() -> Result<()> {
    let (mut service, _provider) = test_service()?;

    service.request_subscribe("spotify")?;
    assert!(service.cancel_payment());
    assert!(!service.cancel_payment());

    assert_eq!(service.ledger().balance(), 12550);
    assert!(service.ledger().subscriptions().is_empty());
    assert_eq!(service.ledger().state(), LedgerState::Browsing);
    Ok(())
}

#[tokio::test]
async fn test_confirm_twice_charges_once() -> Result<()> {
    let (mut service, _provider) = test_service()?;
    let now = parse_date("2025-03-01");

    service.request_subscribe("spotify")?;
    assert!(service.confirm_payment(now)?.is_some());
    assert!(service.confirm_payment(now)?.is_none());

    assert_eq!(service.ledger().balance(), 11651);
    assert_eq!(service.ledger().subscriptions().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_rerequest_replaces_pending_payment() -> Result<()> {
    let (mut service, _provider) = test_service()?;

    service.request_subscribe("spotify")?;
    service.request_subscribe("ny-times")?;
    service.confirm_payment(parse_date("2025-03-01"))?;

    let subscriptions = service.ledger().subscriptions();
    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0].service.id, "ny-times");
    assert_eq!(service.ledger().balance(), 12550 - 425);
    Ok(())
}

#[tokio::test]
async fn test_subscribe_until_funds_run_out() -> Result<()> {
    let (mut service, _provider) = test_service()?;
    let now = parse_date("2025-03-01");

    // 125.50 covers eight Starbucks Plus months at 15.00
    for _ in 0..8 {
        service.request_subscribe("starbucks")?;
        service.confirm_payment(now)?;
    }
    assert_eq!(service.ledger().balance(), 550);
    assert_eq!(service.ledger().subscriptions().len(), 8);

    let err = service.request_subscribe("starbucks").unwrap_err();
    assert!(matches!(err, AppError::InsufficientBalance { .. }));
    Ok(())
}

#[tokio::test]
async fn test_balance_spent_while_pending_fails_confirm() -> Result<()> {
    let (mut service, _provider) = service_with_wallet().await?;

    service.request_subscribe("spotify")?;
    service.send_stablecoin(RECIPIENT, "120").await?;

    let err = service
        .confirm_payment(parse_date("2025-03-01"))
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientBalance {
            balance: 550,
            required: 999
        }
    ));
    assert!(service.ledger().subscriptions().is_empty());
    assert!(service.ledger().pending().is_none());
    assert_eq!(service.ledger().balance(), 550);
    Ok(())
}

#[tokio::test]
async fn test_renewal_dates_follow_billing_period() -> Result<()> {
    let (mut service, _provider) = test_service()?;
    let now = parse_date("2025-01-31");

    service.request_subscribe("ny-times")?;
    service.confirm_payment(now)?;
    service.request_subscribe("prime-video")?;
    service.confirm_payment(now)?;

    let subscriptions = service.ledger().subscriptions();
    assert_eq!(subscriptions[0].next_renewal(), parse_date("2025-02-07"));
    assert_eq!(subscriptions[1].next_renewal(), parse_date("2025-02-28"));
    Ok(())
}
