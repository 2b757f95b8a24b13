//! Application state and the command API.
//!
//! [`AppState`] owns everything the client knows: the signed-in user, the
//! current screen, the sign-in flow, chat threads and the assistant session.
//! Synchronous state changes go through [`AppState::apply`]; the two Oracle
//! calls are async methods because they wait on the network.
//!
//! A command either succeeds with an [`Outcome`] or fails with a
//! [`HyperError`] and leaves the user record as it was.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::auth::{AuthFlow, AuthStep, OtpProvider, StaticOtpProvider};
use crate::error::{HyperError, Result};
use crate::ledger;
use crate::oracle::{AssistantSession, Oracle};
use crate::profile;
use crate::reseller::{self, Purchase};
use crate::rewards::{self, AdWatch, AD_DURATION_SECS};
use crate::types::{
    Catalog, Currency, LinkedYoutube, Message, Milestone, Screen, Thread, ThreadKind,
    Transaction, User, UserSeed,
};
use crate::utils::new_id;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Sign-in
    ChoosePhone,
    ChooseEmail,
    GoogleSignIn,
    AuthBack,
    SubmitPhone { phone: String },
    VerifyOtp { code: String },
    SubmitEmail { email: String, password: String },
    ForgotPassword,
    CompleteOnboarding { username: String, referral: Option<String> },
    Logout,
    Navigate(Screen),

    // Wallet
    Deposit { amount: Decimal, currency: Currency, method: Option<String> },
    Transfer { amount: Decimal, currency: Currency, target: String },
    Withdraw { amount: Decimal, bank: String },
    ApproveWithdrawal { id: String },
    RejectWithdrawal { id: String },

    // Rewards
    ClaimDaily,
    StartAd,
    FinishAd,
    CancelAd,
    ClaimMilestone { count: u64 },
    ConvertData { mb: u64 },

    // Reseller
    EnableReseller,
    SetMarkup(Decimal),
    PurchaseData { product_id: String, phone: String },

    // Profile
    UpdateProfile { username: String, bio: Option<String>, location: Option<String> },
    LinkYoutube { channel_id: String, channel_name: String, subscribers: u64 },
    UnlinkYoutube,
    FollowGained(u64),

    // Chat
    CreateThread { name: String, kind: ThreadKind },
    SendMessage { thread_id: String, text: String },
    OpenThread { thread_id: String },
    DeleteMessage { thread_id: String, message_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Auth(AuthStep),
    SignedIn { username: String },
    SignedOut,
    Screen(Screen),
    Transaction(Transaction),
    DataClaimed { mb: u64 },
    AdStarted { seconds: i64 },
    AdReward { hy: Decimal },
    AdCancelled,
    Milestone(&'static Milestone),
    Converted { mb: u64, hy: u64 },
    ResellerEnabled,
    MarkupSet(Decimal),
    Purchase(Purchase),
    Profile,
    Youtube(Option<LinkedYoutube>),
    Followers(u64),
    ThreadCreated { id: String },
    Message(Message),
    ThreadOpened,
    MessageDeleted,
}

pub struct AppState {
    user: Option<User>,
    screen: Screen,
    auth: AuthFlow,
    otp: Box<dyn OtpProvider>,
    seed: UserSeed,
    catalog: Catalog,
    threads: Vec<Thread>,
    ad: Option<AdWatch>,
    assistant: AssistantSession,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Box::new(StaticOtpProvider::default()), UserSeed::default())
    }
}

impl AppState {
    pub fn new(otp: Box<dyn OtpProvider>, seed: UserSeed) -> Self {
        Self {
            user: None,
            screen: Screen::Landing,
            auth: AuthFlow::new(),
            otp,
            seed,
            catalog: Catalog::builtin(),
            threads: Vec::new(),
            ad: None,
            assistant: AssistantSession::new(),
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn auth_step(&self) -> &AuthStep {
        self.auth.step()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn thread(&self, id: &str) -> Option<&Thread> {
        self.threads.iter().find(|t| t.id == id)
    }

    pub fn ad(&self) -> Option<&AdWatch> {
        self.ad.as_ref()
    }

    pub fn assistant(&self) -> &AssistantSession {
        &self.assistant
    }

    fn user_mut(&mut self) -> Result<&mut User> {
        self.user.as_mut().ok_or(HyperError::NotSignedIn)
    }

    fn signed_out(&self) -> Result<()> {
        if self.user.is_some() {
            return Err(HyperError::AlreadySignedIn);
        }
        Ok(())
    }

    fn thread_mut(&mut self, id: &str) -> Result<&mut Thread> {
        self.threads
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| HyperError::Validation(format!("unknown thread: {id}")))
    }

    fn auth_outcome(&self) -> Outcome {
        Outcome::Auth(self.auth.step().clone())
    }

    /// Apply one command at time `now`.
    pub fn apply(&mut self, command: Command, now: DateTime<Utc>) -> Result<Outcome> {
        debug!(?command, "apply");
        match command {
            Command::ChoosePhone => {
                self.signed_out()?;
                self.auth.choose_phone()?;
                Ok(self.auth_outcome())
            }
            Command::ChooseEmail => {
                self.signed_out()?;
                self.auth.choose_email()?;
                Ok(self.auth_outcome())
            }
            Command::GoogleSignIn => {
                self.signed_out()?;
                self.auth.google()?;
                Ok(self.auth_outcome())
            }
            Command::AuthBack => {
                self.auth.back();
                Ok(self.auth_outcome())
            }
            Command::SubmitPhone { phone } => {
                self.signed_out()?;
                self.auth.submit_phone(&phone, self.otp.as_ref())?;
                Ok(self.auth_outcome())
            }
            Command::VerifyOtp { code } => {
                self.signed_out()?;
                self.auth.verify_otp(&code, self.otp.as_ref())?;
                Ok(self.auth_outcome())
            }
            Command::SubmitEmail { email, password } => {
                self.signed_out()?;
                self.auth.submit_email(&email, &password)?;
                Ok(self.auth_outcome())
            }
            Command::ForgotPassword => {
                self.signed_out()?;
                self.auth.forgot_password()?;
                Ok(self.auth_outcome())
            }
            Command::CompleteOnboarding { username, referral } => {
                self.signed_out()?;
                let user = self
                    .auth
                    .complete(&username, referral.as_deref(), self.seed.clone())?;
                let username = user.username.clone();
                self.user = Some(user);
                self.screen = Screen::Feed;
                Ok(Outcome::SignedIn { username })
            }
            Command::Logout => {
                let user = self.user.take().ok_or(HyperError::NotSignedIn)?;
                info!(username = %user.username, "signed out");
                self.screen = Screen::Landing;
                self.auth = AuthFlow::new();
                self.threads.clear();
                self.ad = None;
                self.assistant.reset();
                Ok(Outcome::SignedOut)
            }
            Command::Navigate(screen) => {
                if screen != Screen::Landing && self.user.is_none() {
                    return Err(HyperError::NotSignedIn);
                }
                self.screen = screen;
                Ok(Outcome::Screen(screen))
            }

            Command::Deposit { amount, currency, method } => {
                let user = self.user_mut()?;
                let tx = ledger::deposit(user, amount, currency, method.as_deref(), now)?;
                Ok(Outcome::Transaction(tx))
            }
            Command::Transfer { amount, currency, target } => {
                let tx = ledger::transfer(self.user_mut()?, amount, currency, &target, now)?;
                Ok(Outcome::Transaction(tx))
            }
            Command::Withdraw { amount, bank } => {
                let tx = ledger::withdraw(self.user_mut()?, amount, &bank, now)?;
                Ok(Outcome::Transaction(tx))
            }
            Command::ApproveWithdrawal { id } => {
                let tx = ledger::approve_withdrawal(self.user_mut()?, &id)?;
                Ok(Outcome::Transaction(tx))
            }
            Command::RejectWithdrawal { id } => {
                let tx = ledger::reject_withdrawal(self.user_mut()?, &id)?;
                Ok(Outcome::Transaction(tx))
            }

            Command::ClaimDaily => {
                let mb = rewards::claim_daily(self.user_mut()?, now)?;
                Ok(Outcome::DataClaimed { mb })
            }
            Command::StartAd => {
                self.user_mut()?;
                if let Some(watch) = &self.ad {
                    return Err(HyperError::AdNotFinished {
                        remaining_secs: watch.remaining_secs(now),
                    });
                }
                self.ad = Some(rewards::start_ad(now));
                Ok(Outcome::AdStarted {
                    seconds: AD_DURATION_SECS,
                })
            }
            Command::FinishAd => {
                let watch = self
                    .ad
                    .ok_or_else(|| HyperError::Validation("no advert is playing".into()))?;
                let hy = rewards::finish_ad(self.user_mut()?, watch, now)?;
                self.ad = None;
                Ok(Outcome::AdReward { hy })
            }
            Command::CancelAd => {
                self.ad
                    .take()
                    .ok_or_else(|| HyperError::Validation("no advert is playing".into()))?;
                Ok(Outcome::AdCancelled)
            }
            Command::ClaimMilestone { count } => {
                let milestone = rewards::claim_milestone(self.user_mut()?, count, now)?;
                Ok(Outcome::Milestone(milestone))
            }
            Command::ConvertData { mb } => {
                let hy = rewards::convert_data(self.user_mut()?, mb, now)?;
                Ok(Outcome::Converted { mb, hy })
            }

            Command::EnableReseller => {
                reseller::enable_reseller(self.user_mut()?);
                Ok(Outcome::ResellerEnabled)
            }
            Command::SetMarkup(markup) => {
                reseller::set_markup(self.user_mut()?, markup);
                Ok(Outcome::MarkupSet(markup))
            }
            Command::PurchaseData { product_id, phone } => {
                let user = self.user.as_mut().ok_or(HyperError::NotSignedIn)?;
                let purchase = reseller::purchase(user, &self.catalog, &product_id, &phone, now)?;
                Ok(Outcome::Purchase(purchase))
            }

            Command::UpdateProfile { username, bio, location } => {
                profile::update_profile(
                    self.user_mut()?,
                    &username,
                    bio.as_deref(),
                    location.as_deref(),
                )?;
                Ok(Outcome::Profile)
            }
            Command::LinkYoutube { channel_id, channel_name, subscribers } => {
                let linked =
                    profile::link_youtube(self.user_mut()?, &channel_id, &channel_name, subscribers)?
                        .clone();
                Ok(Outcome::Youtube(Some(linked)))
            }
            Command::UnlinkYoutube => {
                profile::unlink_youtube(self.user_mut()?);
                Ok(Outcome::Youtube(None))
            }
            Command::FollowGained(n) => {
                let total = profile::follow_gained(self.user_mut()?, n);
                Ok(Outcome::Followers(total))
            }

            Command::CreateThread { name, kind } => {
                self.user_mut()?;
                let name = name.trim();
                if name.is_empty() {
                    return Err(HyperError::MissingField("thread name"));
                }
                let id = new_id("th");
                self.threads.push(Thread::new(id.clone(), name, kind));
                Ok(Outcome::ThreadCreated { id })
            }
            Command::SendMessage { thread_id, text } => {
                let sender = self.user_mut()?.username.clone();
                let message = self.thread_mut(&thread_id)?.send_text(&sender, &text, now)?;
                Ok(Outcome::Message(message.clone()))
            }
            Command::OpenThread { thread_id } => {
                self.user_mut()?;
                self.thread_mut(&thread_id)?.open();
                Ok(Outcome::ThreadOpened)
            }
            Command::DeleteMessage { thread_id, message_id } => {
                self.user_mut()?;
                self.thread_mut(&thread_id)?.delete(&message_id)?;
                Ok(Outcome::MessageDeleted)
            }
        }
    }

    /// Post `query` to a thread in AI mode and append the Oracle's reply.
    pub async fn ask_in_thread(
        &mut self,
        oracle: &dyn Oracle,
        thread_id: &str,
        query: &str,
    ) -> Result<Option<Message>> {
        let sender = self.user_mut()?.username.clone();
        self.thread_mut(thread_id)?
            .ask_oracle(oracle, &sender, query)
            .await
    }

    /// Send a message to the assistant widget and return its reply.
    pub async fn ask_assistant(&mut self, oracle: &dyn Oracle, text: &str) -> Result<String> {
        self.assistant.send(oracle, text).await
    }
}
