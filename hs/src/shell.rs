//! Interactive session over [`AppState`].
//!
//! Each input line is split into words and parsed with clap, so `help` and
//! `<command> --help` work the same way they do on the outer CLI.

use std::io::Write;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use hyperspace::auth::AuthStep;
use hyperspace::embed::youtube_embed_url;
use hyperspace::reseller;
use hyperspace::{AppState, Command, Currency, HyperError, Oracle, Outcome, Screen, ThreadKind};

use crate::error::{CliError, Result};
use crate::output;

/// Markup used for quotes before anyone has signed in.
const DEFAULT_QUOTE_MARKUP: i64 = 5;

#[derive(Parser, Debug)]
#[command(name = "hs", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ScreenArg {
    Landing,
    Feed,
    Dashboard,
}

impl From<ScreenArg> for Screen {
    fn from(s: ScreenArg) -> Self {
        match s {
            ScreenArg::Landing => Screen::Landing,
            ScreenArg::Feed => Screen::Feed,
            ScreenArg::Dashboard => Screen::Dashboard,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Sign in with a phone number (sends an OTP)
    Phone { number: Option<String> },
    /// Enter the OTP sent to your phone
    Otp { code: String },
    /// Sign in with email and password
    Email {
        email: Option<String>,
        password: Option<String>,
    },
    /// Sign in with Google
    Google,
    /// Reset a forgotten password
    Forgot,
    /// Back to the sign-in method picker
    Back,
    /// Finish onboarding
    Onboard {
        username: String,
        #[arg(long)]
        referral: Option<String>,
    },
    /// Sign out
    Logout,
    /// Switch screen
    Go {
        #[arg(value_enum)]
        screen: ScreenArg,
    },

    /// Profile and balances
    Status,
    /// Wallet ledger
    Ledger,
    /// Reward history
    Rewards,
    /// Follower milestones
    Milestones,

    /// Deposit NGN or USD
    Deposit {
        amount: Decimal,
        currency: Currency,
        #[arg(long)]
        method: Option<String>,
    },
    /// Send funds to another user
    Transfer {
        amount: Decimal,
        currency: Currency,
        to: String,
    },
    /// Request an NGN withdrawal to a bank
    Withdraw { amount: Decimal, bank: String },
    /// Approve a pending withdrawal
    Approve { id: String },
    /// Reject a pending withdrawal
    Reject { id: String },

    /// Claim the daily data bonus
    Daily,
    /// Watch an advert for $HY
    Ad,
    /// Claim a follower milestone
    Milestone { count: u64 },
    /// Convert data (MB) to $HY
    Convert { mb: u64 },

    /// Turn on reseller mode
    Reseller,
    /// Set the reseller markup percentage
    Markup {
        #[arg(allow_hyphen_values = true)]
        percent: Decimal,
    },
    /// Price a product at the current markup
    Quote { product: String },
    /// Buy a data bundle for a phone number
    Buy { product: String, phone: String },
    /// List top-up products
    Catalog {
        #[arg(long)]
        country: Option<String>,
    },

    /// Edit profile
    Profile {
        username: String,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Link a YouTube channel
    LinkYoutube {
        channel_id: String,
        channel_name: String,
        #[arg(default_value = "0")]
        subscribers: u64,
    },
    /// Unlink the YouTube channel
    UnlinkYoutube,
    /// Add followers
    Followers { count: u64 },

    /// Start a chat thread
    Thread {
        name: String,
        #[arg(long)]
        group: bool,
    },
    /// List chat threads
    Threads,
    /// Send a message to a thread
    Send {
        thread: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Ask the Oracle inside a thread (AI mode)
    Ai {
        thread: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Mark a thread read
    Open { thread: String },
    /// Delete a message
    Delete { thread: String, message: String },

    /// Talk to the assistant
    Oracle {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print a video embed URL
    Embed { video_id: String },

    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Split a line into words; double or single quotes group words.
pub fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quote.is_some() {
        return Err(CliError::Usage("unterminated quote".into()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

pub struct Shell<W: Write> {
    app: AppState,
    oracle: Box<dyn Oracle>,
    json: bool,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(app: AppState, oracle: Box<dyn Oracle>, json: bool, out: W) -> Self {
        Self {
            app,
            oracle,
            json,
            out,
        }
    }

    pub fn app(&self) -> &AppState {
        &self.app
    }

    pub fn out(&self) -> &W {
        &self.out
    }

    fn show(&mut self, outcome: &Outcome) -> Result<()> {
        output::outcome(&mut self.out, outcome, self.json)
    }

    fn apply(&mut self, command: Command) -> Result<Outcome> {
        let outcome = self.app.apply(command, Utc::now())?;
        self.show(&outcome)?;
        Ok(outcome)
    }

    /// Run one input line. Domain errors are printed and the shell carries
    /// on; only output failures are returned.
    pub async fn execute(&mut self, line: &str, cancel: &CancellationToken) -> Result<Flow> {
        let words = match split_words(line) {
            Ok(w) if w.is_empty() => return Ok(Flow::Continue),
            Ok(w) => w,
            Err(e) => {
                output::error(&mut self.out, &e, self.json)?;
                return Ok(Flow::Continue);
            }
        };
        let parsed = match ShellLine::try_parse_from(&words) {
            Ok(p) => p,
            Err(e) => {
                write!(self.out, "{}", e.render())?;
                return Ok(Flow::Continue);
            }
        };

        match self.dispatch(parsed.command, cancel).await {
            Ok(flow) => Ok(flow),
            Err(CliError::Hyper(e)) => {
                output::error(&mut self.out, &e, self.json)?;
                Ok(Flow::Continue)
            }
            Err(CliError::Usage(msg)) => {
                output::error(&mut self.out, &msg, self.json)?;
                Ok(Flow::Continue)
            }
            Err(e) => Err(e),
        }
    }

    async fn dispatch(&mut self, command: ShellCommand, cancel: &CancellationToken) -> Result<Flow> {
        debug!(?command, "shell command");
        match command {
            ShellCommand::Phone { number } => {
                if self.app.auth_step() == &AuthStep::Select {
                    self.apply(Command::ChoosePhone)?;
                }
                if let Some(phone) = number {
                    self.apply(Command::SubmitPhone { phone })?;
                }
            }
            ShellCommand::Otp { code } => {
                self.apply(Command::VerifyOtp { code })?;
            }
            ShellCommand::Email { email, password } => {
                if matches!(self.app.auth_step(), AuthStep::Select | AuthStep::Forgot) {
                    self.apply(Command::ChooseEmail)?;
                }
                if let Some(email) = email {
                    let password = password.unwrap_or_default();
                    self.apply(Command::SubmitEmail { email, password })?;
                }
            }
            ShellCommand::Google => {
                self.apply(Command::GoogleSignIn)?;
            }
            ShellCommand::Forgot => {
                self.apply(Command::ForgotPassword)?;
            }
            ShellCommand::Back => {
                self.apply(Command::AuthBack)?;
            }
            ShellCommand::Onboard { username, referral } => {
                self.apply(Command::CompleteOnboarding { username, referral })?;
            }
            ShellCommand::Logout => {
                self.apply(Command::Logout)?;
            }
            ShellCommand::Go { screen } => {
                self.apply(Command::Navigate(screen.into()))?;
            }

            ShellCommand::Status => {
                let user = self.app.user().ok_or(HyperError::NotSignedIn)?;
                output::status(&mut self.out, user, self.json)?;
            }
            ShellCommand::Ledger => {
                let user = self.app.user().ok_or(HyperError::NotSignedIn)?;
                output::ledger(&mut self.out, user, self.json)?;
            }
            ShellCommand::Rewards => {
                let user = self.app.user().ok_or(HyperError::NotSignedIn)?;
                output::rewards(&mut self.out, user, Utc::now(), self.json)?;
            }
            ShellCommand::Milestones => {
                let user = self.app.user().ok_or(HyperError::NotSignedIn)?;
                output::milestones(&mut self.out, user, self.json)?;
            }

            ShellCommand::Deposit { amount, currency, method } => {
                self.apply(Command::Deposit { amount, currency, method })?;
            }
            ShellCommand::Transfer { amount, currency, to } => {
                self.apply(Command::Transfer {
                    amount,
                    currency,
                    target: to,
                })?;
            }
            ShellCommand::Withdraw { amount, bank } => {
                self.apply(Command::Withdraw { amount, bank })?;
            }
            ShellCommand::Approve { id } => {
                self.apply(Command::ApproveWithdrawal { id })?;
            }
            ShellCommand::Reject { id } => {
                self.apply(Command::RejectWithdrawal { id })?;
            }

            ShellCommand::Daily => {
                self.apply(Command::ClaimDaily)?;
            }
            ShellCommand::Ad => {
                self.watch_ad(cancel).await?;
            }
            ShellCommand::Milestone { count } => {
                self.apply(Command::ClaimMilestone { count })?;
            }
            ShellCommand::Convert { mb } => {
                self.apply(Command::ConvertData { mb })?;
            }

            ShellCommand::Reseller => {
                self.apply(Command::EnableReseller)?;
            }
            ShellCommand::Markup { percent } => {
                self.apply(Command::SetMarkup(percent))?;
            }
            ShellCommand::Quote { product } => {
                let markup = self
                    .app
                    .user()
                    .map(|u| u.reseller_markup)
                    .unwrap_or(Decimal::from(DEFAULT_QUOTE_MARKUP));
                let q = reseller::quote(self.app.catalog(), &product, markup)?;
                output::quote(&mut self.out, &product, &q, self.json)?;
            }
            ShellCommand::Buy { product, phone } => {
                self.apply(Command::PurchaseData {
                    product_id: product,
                    phone,
                })?;
            }
            ShellCommand::Catalog { country } => {
                let markup = self
                    .app
                    .user()
                    .map(|u| u.reseller_markup)
                    .unwrap_or(Decimal::from(DEFAULT_QUOTE_MARKUP));
                output::catalog(
                    &mut self.out,
                    self.app.catalog(),
                    markup,
                    country.as_deref(),
                    self.json,
                )?;
            }

            ShellCommand::Profile { username, bio, location } => {
                self.apply(Command::UpdateProfile { username, bio, location })?;
            }
            ShellCommand::LinkYoutube { channel_id, channel_name, subscribers } => {
                self.apply(Command::LinkYoutube {
                    channel_id,
                    channel_name,
                    subscribers,
                })?;
            }
            ShellCommand::UnlinkYoutube => {
                self.apply(Command::UnlinkYoutube)?;
            }
            ShellCommand::Followers { count } => {
                self.apply(Command::FollowGained(count))?;
            }

            ShellCommand::Thread { name, group } => {
                let kind = if group { ThreadKind::Group } else { ThreadKind::Dm };
                self.apply(Command::CreateThread { name, kind })?;
            }
            ShellCommand::Threads => {
                for t in self.app.threads() {
                    let last = t.last_message().map(|m| m.content.as_str()).unwrap_or("");
                    writeln!(self.out, "{}\t{}\t{}\t{}", t.id, t.name, t.unread_count, last)?;
                }
            }
            ShellCommand::Send { thread, text } => {
                self.apply(Command::SendMessage {
                    thread_id: thread,
                    text: text.join(" "),
                })?;
            }
            ShellCommand::Ai { thread, text } => {
                let reply = self
                    .app
                    .ask_in_thread(self.oracle.as_ref(), &thread, &text.join(" "))
                    .await?;
                match reply {
                    Some(m) => self.show(&Outcome::Message(m))?,
                    None => output::error(&mut self.out, &"the Oracle did not answer", self.json)?,
                }
            }
            ShellCommand::Open { thread } => {
                self.apply(Command::OpenThread { thread_id: thread })?;
            }
            ShellCommand::Delete { thread, message } => {
                self.apply(Command::DeleteMessage {
                    thread_id: thread,
                    message_id: message,
                })?;
            }

            ShellCommand::Oracle { text } => {
                let reply = self
                    .app
                    .ask_assistant(self.oracle.as_ref(), &text.join(" "))
                    .await?;
                output::message(&mut self.out, &reply, self.json)?;
            }
            ShellCommand::Embed { video_id } => {
                let url = youtube_embed_url(&video_id)?;
                output::message(&mut self.out, &url, self.json)?;
            }

            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Play an advert: tick once a second until it can be redeemed, or stop
    /// without a reward when `cancel` fires.
    async fn watch_ad(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.apply(Command::StartAd)?;
        let Some(watch) = self.app.ad().copied() else {
            return Ok(());
        };

        let started = tokio::time::Instant::now();
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.apply(Command::CancelAd)?;
                    return Ok(());
                }
                _ = ticker.tick() => {
                    let elapsed = chrono::Duration::from_std(started.elapsed())
                        .unwrap_or_else(|_| chrono::Duration::zero());
                    let remaining = watch.remaining_secs(watch.started_at + elapsed);
                    if remaining == 0 {
                        break;
                    }
                    debug!(remaining, "advert playing");
                }
            }
        }

        let elapsed = chrono::Duration::from_std(started.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        let outcome = self
            .app
            .apply(Command::FinishAd, watch.started_at + elapsed)?;
        self.show(&outcome)
    }

    /// Read commands from stdin until `quit`, end of input or cancellation.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<()> {
        info!("shell started; type `help` for commands");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            eprint!("hs> ");
            tokio::select! {
                _ = cancel.cancelled() => break,
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if self.execute(&line, &cancel).await? == Flow::Quit {
                        break;
                    }
                    self.out.flush()?;
                }
            }
        }
        info!("shell closed");
        Ok(())
    }
}
