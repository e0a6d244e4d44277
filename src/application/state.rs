use crate::domain::Chain;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Screen {
    #[default]
    Home,
    Subscriptions,
    Wallet,
    Settings,
}

impl Screen {
    pub fn all() -> [Screen; 4] {
        [
            Screen::Home,
            Screen::Subscriptions,
            Screen::Wallet,
            Screen::Settings,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Subscriptions => "Services",
            Screen::Wallet => "Wallet",
            Screen::Settings => "Settings",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Screen::Home => "🏠",
            Screen::Subscriptions => "📱",
            Screen::Wallet => "👛",
            Screen::Settings => "⚙️",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SubscriptionsTab {
    #[default]
    Services,
    MySubscriptions,
}

/// Everything the screens render from, apart from the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub screen: Screen,
    pub subscriptions_tab: SubscriptionsTab,
    pub chain: Chain,
    /// Solana address of the session wallet
    pub address: Option<String>,
    pub has_wallet: bool,
    /// Native (SOL) balance as last reported by the provider
    pub native_balance: Option<String>,
    /// Id of the last stablecoin transfer sent from the wallet screen
    pub last_tx_hash: Option<String>,
}

impl AppState {
    pub fn new(chain: Chain) -> Self {
        Self {
            chain,
            ..Self::default()
        }
    }
}

/// A state transition requested by a screen or by a completed provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(Screen),
    SelectTab(SubscriptionsTab),
    SelectChain(Chain),
    SetAddress(String),
    WalletStatus(bool),
    WalletCreated(String),
    NativeBalance(String),
    TransferSent(String),
}

/// Apply `action` to `state`, returning the next state.
pub fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::Navigate(screen) => next.screen = screen,
        Action::SelectTab(tab) => next.subscriptions_tab = tab,
        Action::SelectChain(chain) => {
            if chain != state.chain {
                // Balances are per network
                next.native_balance = None;
            }
            next.chain = chain;
        }
        Action::SetAddress(address) => next.address = Some(address),
        Action::WalletStatus(exists) => next.has_wallet = exists,
        Action::WalletCreated(address) => {
            next.has_wallet = true;
            next.address = Some(address);
        }
        Action::NativeBalance(balance) => next.native_balance = Some(balance),
        Action::TransferSent(tx_hash) => next.last_tx_hash = Some(tx_hash),
    }
    next
}
