//! Text renderings of the app screens.
//!
//! Every function here is a pure function of the session state: it reads the
//! [`AppState`] and the [`SubscriptionLedger`] and returns the screen as text.
//! Transitions go through `PayFlowService::dispatch` and the ledger handlers.

use chrono::{DateTime, Utc};

use crate::application::{AppState, PayFlowService, Screen, SubscriptionsTab};
use crate::domain::{Chain, SubscriptionLedger, abbreviate, format_cents, format_usd};

const RULE_WIDTH: usize = 48;

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Render whichever screen is current, followed by the tab bar.
pub fn render(service: &PayFlowService, now: DateTime<Utc>) -> String {
    let state = service.state();
    let ledger = service.ledger();
    let token = service.token_symbol();

    let body = match state.screen {
        Screen::Home => home(state, ledger, token),
        Screen::Subscriptions => subscriptions(state, ledger, token, now),
        Screen::Wallet => wallet(state, ledger, token),
        Screen::Settings => settings(state, ledger, token),
    };
    format!("{}\n{}", body, tab_bar(state.screen))
}

pub fn tab_bar(current: Screen) -> String {
    let tabs: Vec<String> = Screen::all()
        .iter()
        .map(|screen| {
            if *screen == current {
                format!("[{} {}]", screen.icon(), screen.label())
            } else {
                format!(" {} {} ", screen.icon(), screen.label())
            }
        })
        .collect();
    format!("{}\n{}", rule(), tabs.join(" "))
}

pub fn home(state: &AppState, ledger: &SubscriptionLedger, token: &str) -> String {
    let mut lines = vec![
        "PayFlow".to_string(),
        format!("Subscription payments made simple with {}", token),
        String::new(),
        format!("{} Balance", token),
        format!("  {}", format_usd(ledger.balance())),
        "  Ready to spend on subscriptions".to_string(),
        String::new(),
        "Why PayFlow".to_string(),
    ];

    let features = [
        ("💳", format!("{} Payments", token), "Pay for subscriptions with stablecoins"),
        ("⚡", "Instant Settlement".to_string(), "No waiting for bank transfers"),
        ("🌍", "Global Access".to_string(), "Pay for services worldwide"),
        ("🔒", "Secure Wallet".to_string(), "Portal MPC technology"),
    ];
    for (icon, title, description) in features {
        lines.push(format!("  {} {} - {}", icon, title, description));
    }

    lines.push(String::new());
    lines.push("Quick Actions".to_string());
    lines.push("  🛍️ Browse Services - Find subscription services  (services)".to_string());
    lines.push("  👛 Manage Wallet - View balance & send funds     (wallet)".to_string());

    if !state.has_wallet {
        lines.push(String::new());
        lines.push("🚀 Getting Started".to_string());
        lines.push(format!(
            "  Create or recover your wallet to start paying for subscriptions with {}.",
            token
        ));
        lines.push("  Run `create-wallet` from the wallet screen.".to_string());
    }

    lines.join("\n")
}

pub fn subscriptions(
    state: &AppState,
    ledger: &SubscriptionLedger,
    token: &str,
    now: DateTime<Utc>,
) -> String {
    let services_tab = match state.subscriptions_tab {
        SubscriptionsTab::Services => "[Services]",
        SubscriptionsTab::MySubscriptions => " Services ",
    };
    let mine_label = format!("My Subscriptions ({})", ledger.subscriptions().len());
    let mine_tab = match state.subscriptions_tab {
        SubscriptionsTab::Services => format!(" {} ", mine_label),
        SubscriptionsTab::MySubscriptions => format!("[{}]", mine_label),
    };

    let content = match state.subscriptions_tab {
        SubscriptionsTab::Services => services_tab_content(ledger, token),
        SubscriptionsTab::MySubscriptions => my_subscriptions(ledger, now),
    };

    let mut out = vec![
        "Subscriptions".to_string(),
        format!("{} Balance: {}", token, format_usd(ledger.balance())),
        format!("{} | {}", services_tab, mine_tab),
        rule(),
        content,
    ];
    if let Some(modal) = payment_modal(ledger, token) {
        out.push(rule());
        out.push(modal);
    }
    out.join("\n")
}

pub fn services_tab_content(ledger: &SubscriptionLedger, token: &str) -> String {
    let mut lines = vec![
        format!("Why pay with {}?", token),
        "  ⚡ Instant settlement   🌍 Global acceptance".to_string(),
        String::new(),
    ];

    for service in ledger.catalog().services() {
        lines.push(format!("{} {}  ({})", service.icon, service.name, service.id));
        if !service.description.is_empty() {
            lines.push(format!("   {}", service.description));
        }
        lines.push(format!(
            "   {}/{}",
            format_usd(service.price),
            service.period
        ));
        for feature in &service.features {
            lines.push(format!("   ✓ {}", feature));
        }
        if !service.savings.is_empty() {
            lines.push(format!("   {}", service.savings));
        }
        lines.push(format!("   > subscribe {}", service.id));
        lines.push(String::new());
    }

    lines.join("\n")
}

pub fn my_subscriptions(ledger: &SubscriptionLedger, now: DateTime<Utc>) -> String {
    let subscriptions = ledger.subscriptions();
    if subscriptions.is_empty() {
        return [
            "No active subscriptions",
            "Start subscribing to services to see them here",
            "> services",
        ]
        .join("\n");
    }

    subscriptions
        .iter()
        .map(|subscription| {
            let service = &subscription.service;
            let renewal = subscription.next_renewal();
            let due = if renewal <= now { " (due)" } else { "" };
            format!(
                "{} {}\n   {}/{}  Next: {}{}",
                service.icon,
                service.name,
                format_usd(service.price),
                service.period,
                renewal.format("%Y-%m-%d"),
                due
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The confirmation modal, shown while a payment is pending.
pub fn payment_modal(ledger: &SubscriptionLedger, token: &str) -> Option<String> {
    let pending = ledger.pending()?;
    let service = &pending.service;

    let mut lines = vec![
        "Confirm Subscription".to_string(),
        format!(
            "{} {}  {}/{}",
            service.icon,
            service.name,
            format_usd(service.price),
            service.period
        ),
        String::new(),
        "Payment Method".to_string(),
    ];

    for method in ledger.catalog().payment_methods() {
        let marker = if method.id == pending.method_id { "(•)" } else { "( )" };
        lines.push(format!("  {} {}  ({})", marker, method.name, method.id));
        if !method.description.is_empty() {
            lines.push(format!("      {}", method.description));
        }
    }

    let selected_is_wallet = ledger
        .catalog()
        .payment_method(&pending.method_id)
        .is_some_and(|method| method.is_wallet());
    if selected_is_wallet {
        lines.push(String::new());
        lines.push(format!("🛡️ {} Benefits Applied", token));
        lines.push(format!(
            "  {} • Instant settlement • Lower network fees",
            service.savings
        ));
    }

    lines.push(String::new());
    lines.push(format!("Total: {}", format_usd(service.price)));
    lines.push("> method <id> | confirm | cancel".to_string());
    Some(lines.join("\n"))
}

pub fn wallet(state: &AppState, ledger: &SubscriptionLedger, token: &str) -> String {
    if !state.has_wallet {
        return [
            "Wallet".to_string(),
            format!("Get started with your {} wallet", token),
            String::new(),
            "🔐 Secure Wallet".to_string(),
            "  Create a secure wallet powered by Portal's MPC technology.".to_string(),
            "  Your wallet is protected with advanced cryptography and can be".to_string(),
            "  recovered with your password.".to_string(),
            "> create-wallet".to_string(),
        ]
        .join("\n");
    }

    let native = state.native_balance.as_deref().unwrap_or("0");
    let mut lines = vec![
        "Wallet".to_string(),
        format!("Network: {}", state.chain.display_name()),
        String::new(),
        format!("SOL Balance:   {}", native),
        format!("{} Balance: {}", token, format_usd(ledger.balance())),
        "  Available for subscriptions".to_string(),
    ];

    if let Some(address) = &state.address {
        lines.push(String::new());
        lines.push(format!("Address: {}", abbreviate(address, 12)));
    }

    lines.push(String::new());
    lines.push(format!("Send {}", token));
    lines.push("  > send <address> <amount>".to_string());

    if let Some(tx_hash) = &state.last_tx_hash {
        lines.push(String::new());
        lines.push(format!("Last transaction: {}", abbreviate(tx_hash, 12)));
    }

    lines.push(String::new());
    lines.push("Quick Actions (coming soon)".to_string());
    lines.push(format!("  💰 Add Funds - Deposit {} to your wallet", token));
    lines.push("  📋 Transaction History - View your past transactions".to_string());
    lines.push("  🔐 Backup Wallet - Secure your wallet with backup".to_string());

    lines.join("\n")
}

pub fn settings(state: &AppState, ledger: &SubscriptionLedger, token: &str) -> String {
    let mut lines = vec![
        "Settings".to_string(),
        String::new(),
        "Network".to_string(),
        "  Choose which Solana network to use for transactions".to_string(),
    ];

    for chain in Chain::all() {
        let marker = if chain == state.chain { "(•)" } else { "( )" };
        let icon = match chain {
            Chain::Mainnet => "🌐",
            Chain::Devnet => "🧪",
        };
        lines.push(format!(
            "  {} {} {} - {}",
            marker,
            icon,
            chain.display_name(),
            chain.description()
        ));
    }
    lines.push("  > network <mainnet|devnet>".to_string());

    let address = state
        .address
        .as_deref()
        .map(|address| abbreviate(address, 8))
        .unwrap_or_else(|| "No wallet connected".to_string());

    lines.push(String::new());
    lines.push("Wallet".to_string());
    lines.push(format!("  🏠 Wallet Address: {}", address));
    lines.push(format!(
        "  💰 Balance: {} {}",
        format_cents(ledger.balance()),
        token
    ));
    lines.push(format!(
        "  ℹ️ About PayFlow: Version {}",
        env!("CARGO_PKG_VERSION")
    ));
    lines.push(String::new());
    lines.push("PayFlow uses Portal's MPC technology for secure wallet management".to_string());

    lines.join("\n")
}
