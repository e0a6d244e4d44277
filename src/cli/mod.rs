use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::application::{
    Action, AppError, Notice, PayFlowService, Screen, SimulatedProvider, SubscriptionsTab,
};
use crate::config::AppConfig;
use crate::domain::{Chain, format_usd};
use crate::io::Exporter;
use crate::ui;

/// PayFlow - PYUSD subscription payments
#[derive(Parser)]
#[command(name = "payflow")]
#[command(about = "Pay for subscription services with a PYUSD stablecoin wallet")]
#[command(version)]
pub struct Cli {
    /// Config file path (TOML). Built-in defaults are used when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the subscription services on offer
    Catalog,

    /// List the accepted payment methods
    Methods,

    /// Print the effective configuration as TOML
    Config,

    /// Run a wallet session, reading commands from stdin or a script
    Session {
        /// Read commands from this file instead of stdin
        #[arg(long)]
        script: Option<PathBuf>,
    },
}

/// One command line typed during a session.
#[derive(Parser, Debug)]
#[command(name = "payflow>", no_binary_name = true, disable_version_flag = true)]
pub struct SessionLine {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    /// Go to the home screen
    Home,

    /// Browse the services catalog
    Services,

    /// Show your active subscriptions
    Subscriptions,

    /// Go to the wallet screen
    Wallet,

    /// Go to the settings screen
    Settings,

    /// Redraw the current screen
    Show,

    /// Start subscribing to a service
    Subscribe {
        /// Service id (see `services`)
        service: String,
    },

    /// Choose the payment method for the pending payment
    Method {
        /// Payment method id
        method: String,
    },

    /// Confirm the pending payment
    Confirm,

    /// Dismiss the pending payment
    Cancel,

    /// Create the MPC wallet for this session
    CreateWallet,

    /// Send stablecoin to an address
    Send {
        /// Recipient Solana address
        address: String,

        /// Amount to send (e.g., "10.00" or "10")
        amount: String,
    },

    /// Reload wallet status and balances
    Refresh,

    /// Switch Solana network: mainnet, devnet
    Network { chain: String },

    /// Export the session: csv (subscriptions) or json (full snapshot)
    Export {
        format: String,

        /// Output file (the session output if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// End the session
    #[command(alias = "exit")]
    Quit,
}

/// Whether the session keeps reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl Cli {
    fn load_config(&self) -> Result<AppConfig> {
        match &self.config {
            Some(path) => AppConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display())),
            None => Ok(AppConfig::default()),
        }
    }

    pub async fn run(self) -> Result<()> {
        let config = self.load_config()?;

        match self.command {
            Commands::Catalog => run_catalog_command(&config)?,

            Commands::Methods => run_methods_command(&config)?,

            Commands::Config => {
                print!("{}", config.to_toml_string()?);
            }

            Commands::Session { script } => {
                run_session_command(&config, script.as_deref()).await?;
            }
        }

        Ok(())
    }
}

fn run_catalog_command(config: &AppConfig) -> Result<()> {
    let catalog = config.build_catalog()?;

    println!(
        "{:<14} {:<22} {:>9} {:<8} {}",
        "ID", "NAME", "PRICE", "PERIOD", "SAVINGS"
    );
    println!("{}", "-".repeat(76));
    for service in catalog.services() {
        println!(
            "{:<14} {:<22} {:>9} {:<8} {}",
            truncate(&service.id, 14),
            truncate(&service.name, 22),
            format_usd(service.price),
            service.period,
            service.savings
        );
    }
    Ok(())
}

fn run_methods_command(config: &AppConfig) -> Result<()> {
    let catalog = config.build_catalog()?;

    println!("{:<10} {:<18} {:<9} {}", "ID", "NAME", "KIND", "BENEFITS");
    println!("{}", "-".repeat(70));
    for method in catalog.payment_methods() {
        let kind = if method.is_wallet() { "wallet" } else { "external" };
        let default = if method.id == catalog.default_method_id() {
            " (default)"
        } else {
            ""
        };
        println!(
            "{:<10} {:<18} {:<9} {}{}",
            method.id,
            truncate(&method.name, 18),
            kind,
            method.benefits.join(", "),
            default
        );
    }
    Ok(())
}

async fn run_session_command(config: &AppConfig, script: Option<&Path>) -> Result<()> {
    let provider = SimulatedProvider::new(config.provider.initial_native_balance.clone())
        .with_latency(config.provider.latency());
    let service = PayFlowService::from_config(config, Arc::new(provider))?;

    let mut session = Session::new(service, std::io::stdout());
    match script {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open script: {}", path.display()))?;
            session.echo = true;
            session.start().await?;
            session.run(BufReader::new(file)).await
        }
        None => {
            session.prompt = true;
            session.start().await?;
            session.run(BufReader::new(tokio::io::stdin())).await
        }
    }
}

/// A line-driven session over a [`PayFlowService`].
///
/// Each command is one user interaction. Failures are reported as notices
/// and never end the session.
pub struct Session<W: Write> {
    service: PayFlowService,
    out: W,
    /// Print a prompt before reading each line
    pub prompt: bool,
    /// Echo each command before its output
    pub echo: bool,
}

impl<W: Write> Session<W> {
    pub fn new(service: PayFlowService, out: W) -> Self {
        Self {
            service,
            out,
            prompt: false,
            echo: false,
        }
    }

    pub fn service(&self) -> &PayFlowService {
        &self.service
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Load the wallet, as on app launch, and draw the home screen.
    pub async fn start(&mut self) -> Result<()> {
        if let Err(err) = self.service.start().await {
            self.notice_error(&err)?;
        }
        self.render()
    }

    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, mut reader: R) -> Result<()> {
        let mut buf = Vec::new();
        loop {
            if self.prompt {
                write!(self.out, "payflow> ")?;
                self.out.flush()?;
            }
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            // A garbled line is skipped; the rest of the input still runs
            let Ok(line) = std::str::from_utf8(&buf) else {
                writeln!(self.out, "! Error: input line is not valid UTF-8")?;
                continue;
            };

            match self.execute(line).await {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(err) => writeln!(self.out, "! Error: {:#}", err)?,
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Execute a single command line.
    pub async fn execute(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Flow::Continue);
        }
        if self.echo {
            writeln!(self.out, "> {}", line)?;
        }

        let command = match SessionLine::try_parse_from(line.split_whitespace()) {
            Ok(parsed) => parsed.command,
            Err(err) => {
                write!(self.out, "{}", err)?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            SessionCommand::Home => self.navigate(Screen::Home)?,
            SessionCommand::Services => {
                self.service
                    .dispatch(Action::SelectTab(SubscriptionsTab::Services));
                self.navigate(Screen::Subscriptions)?;
            }
            SessionCommand::Subscriptions => {
                self.service
                    .dispatch(Action::SelectTab(SubscriptionsTab::MySubscriptions));
                self.navigate(Screen::Subscriptions)?;
            }
            SessionCommand::Wallet => self.navigate(Screen::Wallet)?,
            SessionCommand::Settings => self.navigate(Screen::Settings)?,
            SessionCommand::Show => self.render()?,

            SessionCommand::Subscribe { service } => {
                self.service
                    .dispatch(Action::SelectTab(SubscriptionsTab::Services));
                self.service.dispatch(Action::Navigate(Screen::Subscriptions));
                let requested = self.service.request_subscribe(&service).map(|_| ());
                match requested {
                    Ok(()) => self.render_modal()?,
                    Err(err) => self.notice_error(&err)?,
                }
            }

            SessionCommand::Method { method } => {
                match self.service.select_payment_method(&method) {
                    Ok(()) => self.render_modal()?,
                    Err(err) => self.notice_error(&err)?,
                }
            }

            SessionCommand::Confirm => match self.service.confirm_payment(Utc::now()) {
                Ok(Some(notice)) => {
                    self.notice(&notice)?;
                    writeln!(
                        self.out,
                        "Balance: {}",
                        format_usd(self.service.ledger().balance())
                    )?;
                }
                Ok(None) => writeln!(self.out, "No payment to confirm.")?,
                Err(err) => self.notice_error(&err)?,
            },

            SessionCommand::Cancel => {
                if self.service.cancel_payment() {
                    writeln!(self.out, "Payment cancelled.")?;
                } else {
                    writeln!(self.out, "No payment pending.")?;
                }
            }

            SessionCommand::CreateWallet => {
                self.service.dispatch(Action::Navigate(Screen::Wallet));
                match self.service.create_wallet().await {
                    Ok(notice) => {
                        self.notice(&notice)?;
                        self.service.refresh_balances().await;
                        self.render()?;
                    }
                    Err(err) => self.notice_error(&err)?,
                }
            }

            SessionCommand::Send { address, amount } => {
                match self.service.send_stablecoin(&address, &amount).await {
                    Ok(notice) => self.notice(&notice)?,
                    Err(err) => self.notice_error(&err)?,
                }
            }

            SessionCommand::Refresh => {
                if let Err(err) = self.service.check_wallet().await {
                    self.notice_error(&err)?;
                }
                self.render()?;
            }

            SessionCommand::Network { chain } => match chain.parse::<Chain>() {
                Ok(chain) => {
                    self.service.select_chain(chain).await;
                    writeln!(self.out, "Network set to {}", chain.display_name())?;
                }
                Err(err) => {
                    let err = AppError::InvalidInput(format!(
                        "{}. Valid networks: mainnet, devnet",
                        err
                    ));
                    self.notice_error(&err)?;
                }
            },

            SessionCommand::Export { format, output } => {
                self.export(&format, output.as_deref())?;
            }

            SessionCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    fn navigate(&mut self, screen: Screen) -> Result<()> {
        self.service.dispatch(Action::Navigate(screen));
        self.render()
    }

    fn render(&mut self) -> Result<()> {
        writeln!(self.out, "{}", ui::render(&self.service, Utc::now()))?;
        Ok(())
    }

    fn render_modal(&mut self) -> Result<()> {
        if let Some(modal) = ui::payment_modal(self.service.ledger(), self.service.token_symbol())
        {
            writeln!(self.out, "{}", modal)?;
        }
        Ok(())
    }

    fn notice(&mut self, notice: &Notice) -> Result<()> {
        writeln!(self.out, "* {}", notice)?;
        Ok(())
    }

    fn notice_error(&mut self, err: &AppError) -> Result<()> {
        writeln!(self.out, "! {}", err.notice())?;
        Ok(())
    }

    fn export(&mut self, format: &str, output: Option<&Path>) -> Result<()> {
        let as_csv = match format {
            "csv" => true,
            "json" => false,
            _ => anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format),
        };
        let exporter = Exporter::new(&self.service);

        let writer: Box<dyn Write + '_> = match output {
            Some(path) => {
                let file = std::fs::File::create(path)
                    .with_context(|| format!("Failed to create output file: {}", path.display()))?;
                Box::new(file)
            }
            None => Box::new(&mut self.out),
        };

        if as_csv {
            let count = exporter.export_subscriptions_csv(writer)?;
            if let Some(path) = output {
                writeln!(
                    self.out,
                    "Exported {} subscriptions to {}",
                    count,
                    path.display()
                )?;
            }
        } else {
            let snapshot = exporter.export_session_json(writer, Utc::now())?;
            if let Some(path) = output {
                writeln!(
                    self.out,
                    "Exported session ({} subscriptions) to {}",
                    snapshot.subscriptions.len(),
                    path.display()
                )?;
            }
        }

        Ok(())
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
