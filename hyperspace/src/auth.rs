//! Sign-in flow and OTP verification.
//!
//! The flow is a small state machine:
//!
//! ```text
//! Select ─┬─ phone ──► Phone ── submit ──► Otp ── verify ──► Onboarding ── complete ──► User
//!         ├─ email ──► Email ── submit ─────────────────────► Onboarding
//!         │            Email ◄─► Forgot
//!         └─ google ────────────────────────────────────────► Onboarding
//! ```
//!
//! Code delivery and checking are delegated to an [`OtpProvider`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use rand::Rng;
use tracing::{debug, info};

use crate::error::{HyperError, Result};
use crate::types::{User, UserSeed};

/// Referral code applied when the user leaves the field untouched.
pub const DEFAULT_REFERRAL_CODE: &str = "hermeess";
/// Minimum username length accepted at onboarding and profile edit.
pub const MIN_USERNAME_LEN: usize = 3;

/// Sends and checks one-time passcodes for a destination (phone number).
pub trait OtpProvider: Send + Sync {
    fn send(&self, destination: &str) -> Result<()>;
    fn verify(&self, destination: &str, code: &str) -> Result<bool>;
}

/// Accepts a single fixed code for every destination.
#[derive(Debug, Clone)]
pub struct StaticOtpProvider {
    code: String,
}

impl StaticOtpProvider {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

impl Default for StaticOtpProvider {
    fn default() -> Self {
        Self::new("1234")
    }
}

impl OtpProvider for StaticOtpProvider {
    fn send(&self, destination: &str) -> Result<()> {
        debug!(destination, "static otp: nothing to send");
        Ok(())
    }

    fn verify(&self, _destination: &str, code: &str) -> Result<bool> {
        Ok(code.trim() == self.code)
    }
}

/// Issues a random 4-digit code per destination. Codes are single-use.
#[derive(Debug, Default)]
pub struct RandomOtpProvider {
    issued: Mutex<HashMap<String, String>>,
}

impl RandomOtpProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// The code currently outstanding for `destination`, if any.
    pub fn peek(&self, destination: &str) -> Option<String> {
        self.issued
            .lock()
            .ok()
            .and_then(|m| m.get(destination).cloned())
    }
}

impl OtpProvider for RandomOtpProvider {
    fn send(&self, destination: &str) -> Result<()> {
        let code = format!("{:04}", rand::thread_rng().gen_range(0..10_000));
        info!(destination, code = %code, "otp issued");
        self.issued
            .lock()
            .map_err(|_| HyperError::Validation("otp store poisoned".into()))?
            .insert(destination.to_string(), code);
        Ok(())
    }

    fn verify(&self, destination: &str, code: &str) -> Result<bool> {
        let mut issued = self
            .issued
            .lock()
            .map_err(|_| HyperError::Validation("otp store poisoned".into()))?;
        match issued.get(destination) {
            Some(expected) if expected == code.trim() => {
                issued.remove(destination);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Where the sign-in flow currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthStep {
    #[default]
    Select,
    Phone,
    Email,
    Forgot,
    Otp {
        phone: String,
    },
    Onboarding {
        email: Option<String>,
        phone: Option<String>,
    },
}

impl fmt::Display for AuthStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthStep::Select => "SELECT",
            AuthStep::Phone => "PHONE",
            AuthStep::Email => "EMAIL",
            AuthStep::Forgot => "FORGOT",
            AuthStep::Otp { .. } => "OTP",
            AuthStep::Onboarding { .. } => "ONBOARDING",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthFlow {
    step: AuthStep,
}

impl AuthFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> &AuthStep {
        &self.step
    }

    fn invalid(&self, action: &'static str) -> HyperError {
        HyperError::AuthStep {
            action,
            step: self.step.to_string(),
        }
    }

    pub fn choose_phone(&mut self) -> Result<()> {
        match self.step {
            AuthStep::Select => {
                self.step = AuthStep::Phone;
                Ok(())
            }
            _ => Err(self.invalid("choose phone")),
        }
    }

    pub fn choose_email(&mut self) -> Result<()> {
        match self.step {
            AuthStep::Select | AuthStep::Forgot => {
                self.step = AuthStep::Email;
                Ok(())
            }
            _ => Err(self.invalid("choose email")),
        }
    }

    /// Single sign-on: skips straight to onboarding.
    pub fn google(&mut self) -> Result<()> {
        match self.step {
            AuthStep::Select => {
                self.step = AuthStep::Onboarding {
                    email: None,
                    phone: None,
                };
                Ok(())
            }
            _ => Err(self.invalid("use google sign-in")),
        }
    }

    /// Go back to the method picker.
    pub fn back(&mut self) {
        self.step = AuthStep::Select;
    }

    pub fn submit_phone(&mut self, phone: &str, otp: &dyn OtpProvider) -> Result<()> {
        if self.step != AuthStep::Phone {
            return Err(self.invalid("submit phone"));
        }
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(HyperError::MissingField("phone number"));
        }
        otp.send(phone)?;
        self.step = AuthStep::Otp {
            phone: phone.to_string(),
        };
        Ok(())
    }

    pub fn verify_otp(&mut self, code: &str, otp: &dyn OtpProvider) -> Result<()> {
        let AuthStep::Otp { phone } = &self.step else {
            return Err(self.invalid("verify otp"));
        };
        if !otp.verify(phone, code)? {
            return Err(HyperError::InvalidOtp);
        }
        self.step = AuthStep::Onboarding {
            email: None,
            phone: Some(phone.clone()),
        };
        Ok(())
    }

    pub fn submit_email(&mut self, email: &str, password: &str) -> Result<()> {
        if self.step != AuthStep::Email {
            return Err(self.invalid("submit email"));
        }
        let email = email.trim();
        if email.is_empty() {
            return Err(HyperError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(HyperError::MissingField("password"));
        }
        self.step = AuthStep::Onboarding {
            email: Some(email.to_string()),
            phone: None,
        };
        Ok(())
    }

    pub fn forgot_password(&mut self) -> Result<()> {
        match self.step {
            AuthStep::Email => {
                self.step = AuthStep::Forgot;
                Ok(())
            }
            _ => Err(self.invalid("reset password")),
        }
    }

    /// Finish onboarding and produce the signed-in user.
    pub fn complete(
        &mut self,
        username: &str,
        referral: Option<&str>,
        seed: UserSeed,
    ) -> Result<User> {
        let AuthStep::Onboarding { email, phone } = &self.step else {
            return Err(self.invalid("complete onboarding"));
        };
        let username = validate_username(username)?;
        let referral = referral
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REFERRAL_CODE);

        let user = seed.into_user(username, email.clone(), phone.clone(), referral.to_string());
        self.step = AuthStep::Select;
        info!(username = %user.username, referral = %user.referral_code, "onboarding complete");
        Ok(user)
    }
}

pub fn validate_username(username: &str) -> Result<String> {
    let username = username.trim();
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(HyperError::UsernameTooShort);
    }
    Ok(username.to_string())
}
