// portal/src/login.rs
use common::config::DemoAccount;
use common::models::session::{ChangePasswordRequest, Credentials, Role};

use crate::routing::{resolve_pending, resolve_student_landing, Destination, PendingDestination};
use crate::session::SessionManager;

const MIN_PASSWORD_LENGTH: usize = 8;

const MISSING_CREDENTIALS_ERROR: &str =
    "Enter your credentials or select a demo profile to continue.";
const SHORT_PASSWORD_ERROR: &str = "New password must be at least 8 characters long.";
const MISMATCHED_PASSWORD_ERROR: &str = "Passwords do not match.";

/// Forced password change carried while the modal is open. Destroyed on
/// success or cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChangeRequest {
    pub email: String,
    pub current_password: String,
    /// Navigation resumed once the change succeeds
    pub pending: PendingDestination,
}

/// Where the current submission attempt stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStage {
    Idle,
    Submitting,
    AwaitingPasswordChange(PasswordChangeRequest),
    Routed(Destination),
}

/// Outcome of one submit call, for the rendering layer to act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation or authentication failed; the inline error explains why
    Rejected,
    /// The backend requires a password change before routing can finish
    PasswordChangeRequired,
    Routed(Destination),
}

/// Sequences one login attempt: credential collection (manual or demo
/// prefill), submission, role resolution, the forced password change
/// detour, and the final landing decision.
pub struct LoginFlow {
    accounts: Vec<DemoAccount>,
    active_account: Option<String>,
    username_or_email: String,
    password: String,
    error: Option<String>,
    password_error: Option<String>,
    stage: LoginStage,
    demo_prompt_open: bool,
}

impl LoginFlow {
    pub fn new(accounts: Vec<DemoAccount>) -> Self {
        Self {
            accounts,
            active_account: None,
            username_or_email: String::new(),
            password: String::new(),
            error: None,
            password_error: None,
            stage: LoginStage::Idle,
            // The quick-explore prompt shows until the user picks a
            // persona or starts typing
            demo_prompt_open: true,
        }
    }

    pub fn active_account(&self) -> Option<&DemoAccount> {
        let id = self.active_account.as_deref()?;
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn username_or_email(&self) -> &str {
        &self.username_or_email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn password_error(&self) -> Option<&str> {
        self.password_error.as_deref()
    }

    pub fn stage(&self) -> &LoginStage {
        &self.stage
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.stage, LoginStage::Submitting)
    }

    pub fn demo_prompt_open(&self) -> bool {
        self.demo_prompt_open
    }

    pub fn dismiss_demo_prompt(&mut self) {
        self.demo_prompt_open = false;
    }

    pub fn has_manual_credentials(&self) -> bool {
        self.active_account().is_none()
            && !self.username_or_email.trim().is_empty()
            && !self.password.trim().is_empty()
    }

    /// Submission needs either a selected demo account or a complete
    /// manual credential pair
    pub fn can_submit(&self) -> bool {
        self.active_account().is_some() || self.has_manual_credentials()
    }

    /// Toggle a demo account. Re-selecting the active account deselects it
    /// and resets the manual fields to empty; switching accounts prefills
    /// that account's preset pair. Both clear any prior error.
    pub fn select_account(&mut self, account_id: &str) {
        self.demo_prompt_open = false;
        self.error = None;

        if self.active_account.as_deref() == Some(account_id) {
            self.active_account = None;
            self.username_or_email.clear();
            self.password.clear();
            return;
        }

        match self.accounts.iter().find(|a| a.id == account_id) {
            Some(account) => {
                self.username_or_email = account.username_or_email.clone();
                self.password = account.password.clone();
                self.active_account = Some(account.id.clone());
            }
            None => {
                self.active_account = None;
                self.username_or_email.clear();
                self.password.clear();
            }
        }
    }

    pub fn set_username_or_email(&mut self, value: &str) {
        self.demo_prompt_open = false;
        self.username_or_email = value.to_string();
    }

    pub fn set_password(&mut self, value: &str) {
        self.demo_prompt_open = false;
        self.password = value.to_string();
    }

    fn credentials(&self) -> Credentials {
        Credentials {
            username_or_email: self.username_or_email.clone(),
            password: self.password.clone(),
            role: self.active_account().map(|account| account.role.clone()),
        }
    }

    // The email the principal signed in with: the demo account's preset
    // when one is active, the manual input otherwise.
    fn signed_in_email(&self) -> String {
        self.active_account()
            .map(|account| account.username_or_email.clone())
            .unwrap_or_else(|| self.username_or_email.clone())
    }

    /// Run one submission attempt through the session manager.
    ///
    /// Local validation failures never reach the network. Authentication
    /// errors surface inline and return the flow to idle; nothing retries
    /// automatically.
    pub async fn submit(&mut self, session: &mut SessionManager) -> SubmitOutcome {
        if matches!(
            self.stage,
            LoginStage::Submitting | LoginStage::AwaitingPasswordChange(_)
        ) {
            // A submission is already in flight or deferred
            return SubmitOutcome::Rejected;
        }

        self.error = None;

        if !self.can_submit() {
            self.error = Some(MISSING_CREDENTIALS_ERROR.to_string());
            return SubmitOutcome::Rejected;
        }

        self.stage = LoginStage::Submitting;
        let credentials = self.credentials();

        let response = match session.login(&credentials).await {
            Ok(response) => response,
            Err(e) => {
                self.error = Some(e.user_message());
                self.stage = LoginStage::Idle;
                return SubmitOutcome::Rejected;
            }
        };

        // Server-reported role wins; the demo preset fills in when the
        // response carries none.
        let role = response
            .role
            .clone()
            .filter(|role| !role.is_empty())
            .or_else(|| {
                response
                    .roles
                    .first()
                    .filter(|role| !role.is_empty())
                    .cloned()
            })
            .or_else(|| self.active_account().map(|account| account.role.clone()))
            .unwrap_or_default()
            .to_uppercase();

        // Widening match on purpose: tolerates prefixed role strings such
        // as ROLE_ADMIN.
        if Role::is_admin(&role) {
            return self.finish(Destination::AdminConsole);
        }

        let student_email = self.signed_in_email();
        let skip_prompt = self
            .active_account()
            .map(|account| account.skip_password_prompt)
            .unwrap_or(false);

        if response.must_change_password && !skip_prompt {
            self.stage = LoginStage::AwaitingPasswordChange(PasswordChangeRequest {
                email: student_email.clone(),
                current_password: credentials.password,
                pending: PendingDestination::Student {
                    email: student_email,
                },
            });
            return SubmitOutcome::PasswordChangeRequired;
        }

        let destination = resolve_student_landing(session.api(), &student_email).await;
        self.finish(destination)
    }

    /// Validate and submit the forced password change. Violations are
    /// reported without a network call; success resumes the deferred
    /// navigation; failure keeps the modal open for another attempt.
    pub async fn submit_password_change(
        &mut self,
        session: &SessionManager,
        new_password: &str,
        confirm_password: &str,
    ) -> SubmitOutcome {
        self.password_error = None;

        let request = match &self.stage {
            LoginStage::AwaitingPasswordChange(request) => request.clone(),
            _ => return SubmitOutcome::Rejected,
        };

        if new_password.chars().count() < MIN_PASSWORD_LENGTH {
            self.password_error = Some(SHORT_PASSWORD_ERROR.to_string());
            return SubmitOutcome::Rejected;
        }

        if new_password != confirm_password {
            self.password_error = Some(MISMATCHED_PASSWORD_ERROR.to_string());
            return SubmitOutcome::Rejected;
        }

        let change = ChangePasswordRequest {
            email: request.email.clone(),
            current_password: request.current_password.clone(),
            new_password: new_password.to_string(),
        };

        if let Err(e) = session.api().change_password(&change).await {
            self.password_error = Some(e.user_message());
            return SubmitOutcome::Rejected;
        }

        let destination = resolve_pending(session.api(), &request.pending).await;
        self.finish(destination)
    }

    /// Close the modal without completing routing
    pub fn cancel_password_change(&mut self) {
        if matches!(self.stage, LoginStage::AwaitingPasswordChange(_)) {
            self.stage = LoginStage::Idle;
        }
        self.password_error = None;
    }

    fn finish(&mut self, destination: Destination) -> SubmitOutcome {
        self.stage = LoginStage::Routed(destination.clone());
        SubmitOutcome::Routed(destination)
    }
}
