//! FlowController: coordinates flow state, the stores, and the auth backend.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info, warn};

use crate::auth::{AuthBackend, OTP_LENGTH, OtpDecision};
use crate::error::{AuthError, FlowError, Notice, StoreError};
use crate::route::Route;
use crate::session::{Identity, OAuthProvider, Session, SessionStore};
use crate::store::{Store, keys, load, save};
use crate::validation::{Field, FieldErrors};

use super::draft::DraftStore;
use super::forms::{AliasForm, LegalNameForm, LocationForm, LoginForm, SignUpForm};
use super::model::{DraftPatch, DraftProfile, ProfilePhoto};
use super::otp::OtpChallenge;
use super::state::FlowState;

/// A completed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: FlowState,
    pub to: FlowState,
}

impl Transition {
    /// Where the view should navigate.
    pub fn route(&self) -> Route {
        self.to.route()
    }
}

/// Snapshot of the flow for the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowStatus {
    pub state: FlowState,
    pub route: Route,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    pub authenticated: bool,
}

/// Where focus goes after editing one OTP slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OtpFocus {
    pub focus: usize,
    pub complete: bool,
}

/// What the dashboard shows.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub identity: Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<OAuthProvider>,
    pub avatar_initial: char,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<ProfilePhoto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub profile: DraftProfile,
    pub session: Session,
}

/// Drives one user's way through login, OTP, and onboarding.
///
/// One transition runs at a time; a second attempt while a backend call is
/// pending returns [`FlowError::Busy`].
pub struct FlowController {
    store: Arc<dyn Store>,
    sessions: SessionStore,
    drafts: DraftStore,
    auth: Arc<dyn AuthBackend>,
    state: RwLock<FlowState>,
    otp: RwLock<Option<OtpChallenge>>,
    transition: Mutex<()>,
}

impl FlowController {
    /// Start a fresh flow at the login screen.
    pub fn new(store: Arc<dyn Store>, auth: Arc<dyn AuthBackend>) -> Self {
        Self {
            sessions: SessionStore::new(Arc::clone(&store)),
            drafts: DraftStore::new(Arc::clone(&store)),
            store,
            auth,
            state: RwLock::new(FlowState::default()),
            otp: RwLock::new(None),
            transition: Mutex::new(()),
        }
    }

    /// Rebuild the flow from persisted records after a restart.
    ///
    /// A step that needs a session collapses to login when there is none.
    pub async fn restore(
        store: Arc<dyn Store>,
        auth: Arc<dyn AuthBackend>,
    ) -> Result<Self, StoreError> {
        let mut controller = Self::new(store, auth);
        let persisted: Option<FlowState> = load(controller.store.as_ref(), keys::FLOW_STATE).await?;
        let session = controller.sessions.current().await?;

        let mut state = persisted.unwrap_or_default();
        if state.requires_session() && session.is_none() {
            warn!(persisted = %state, "No session for persisted step, back to login");
            state = FlowState::AnonymousLogin;
        }
        if let (FlowState::AwaitingOtp, Some(session)) = (state, &session) {
            *controller.otp.get_mut() = Some(OtpChallenge::new(session.identity.display_email()));
        }
        *controller.state.get_mut() = state;

        info!(state = %state, "Flow restored");
        Ok(controller)
    }

    pub async fn state(&self) -> FlowState {
        *self.state.read().await
    }

    pub async fn status(&self) -> Result<FlowStatus, FlowError> {
        let state = self.state().await;
        Ok(FlowStatus {
            state,
            route: state.route(),
            progress: state.progress(),
            authenticated: self.sessions.current().await?.is_some(),
        })
    }

    /// Address the pending OTP was sent to.
    pub async fn otp_target(&self) -> Option<String> {
        self.otp
            .read()
            .await
            .as_ref()
            .map(|c| c.target_email().to_string())
    }

    pub async fn draft(&self) -> Result<DraftProfile, FlowError> {
        Ok(self.drafts.read().await?)
    }

    // ── Anonymous ───────────────────────────────────────────────────

    pub async fn login(&self, form: LoginForm) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self.require_state(&[FlowState::AnonymousLogin], "login").await?;
        form.validate().map_err(FlowError::Validation)?;

        let identity = self
            .auth
            .authenticate(form.username.trim(), &form.password)
            .await
            .map_err(|e| auth_failed("Login failed", &e))?;

        self.start_otp(identity, form.remember_password).await?;
        self.commit(from, FlowState::AwaitingOtp, "login").await
    }

    pub async fn sign_up(&self, form: SignUpForm) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self.require_state(&[FlowState::AnonymousSignUp], "sign_up").await?;
        form.validate().map_err(FlowError::Validation)?;

        let identity = self
            .auth
            .register(form.email.trim(), &form.password)
            .await
            .map_err(|e| auth_failed("Sign in failed", &e))?;

        self.start_otp(identity, false).await?;
        self.commit(from, FlowState::AwaitingOtp, "sign_up").await
    }

    pub async fn oauth(&self, provider: OAuthProvider) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self
            .require_state(&[FlowState::AnonymousLogin, FlowState::AnonymousSignUp], "oauth")
            .await?;

        let identity = self.auth.oauth_authenticate(provider).await.map_err(|e| {
            warn!(%provider, error = %e, "OAuth failed");
            FlowError::AuthenticationFailed {
                notice: Notice::new("Authentication failed", "Please try again"),
            }
        })?;

        self.start_otp(identity, false).await?;
        self.commit(from, FlowState::AwaitingOtp, "oauth").await
    }

    pub async fn show_sign_up(&self) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self.require_state(&[FlowState::AnonymousLogin], "show_sign_up").await?;
        self.commit(from, FlowState::AnonymousSignUp, "show_sign_up").await
    }

    pub async fn show_login(&self) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self.require_state(&[FlowState::AnonymousSignUp], "show_login").await?;
        self.commit(from, FlowState::AnonymousLogin, "show_login").await
    }

    // ── OTP ─────────────────────────────────────────────────────────

    /// Submit the OTP slots. Fewer than five digits never reaches the backend.
    ///
    /// An empty `digits` submits whatever was typed slot by slot.
    pub async fn submit_otp<S: AsRef<str>>(&self, digits: &[S]) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self.require_state(&[FlowState::AwaitingOtp], "submit_otp").await?;

        let (complete, code) = {
            let mut otp = self.otp.write().await;
            if !digits.is_empty() {
                let target = otp
                    .as_ref()
                    .map(|c| c.target_email().to_string())
                    .unwrap_or_default();
                *otp = Some(OtpChallenge::from_digits(target, digits));
            }
            otp.as_ref()
                .map(|c| (c.is_complete(), c.code()))
                .unwrap_or_default()
        };
        if !complete {
            return Err(FlowError::InvalidOtp);
        }

        if self.auth.verify_otp(&code).await == OtpDecision::Rejected {
            return Err(FlowError::InvalidOtp);
        }

        *self.otp.write().await = None;
        self.advance(from, "submit_otp").await
    }

    /// Type into one OTP slot. Anything but a single digit leaves it unchanged.
    pub async fn otp_input(&self, index: usize, value: &str) -> Result<OtpFocus, FlowError> {
        self.edit_otp("otp_input", |challenge| {
            let focus = challenge.set_digit(index, value)?;
            Some(OtpFocus {
                focus,
                complete: challenge.is_complete(),
            })
        })
        .await
    }

    /// Backspace in one slot: clears a filled slot, otherwise moves focus back.
    pub async fn otp_backspace(&self, index: usize) -> Result<OtpFocus, FlowError> {
        self.edit_otp("otp_backspace", |challenge| {
            if index >= OTP_LENGTH {
                return None;
            }
            let focus = challenge.backspace(index);
            if focus == index {
                challenge.set_digit(index, "");
            }
            Some(OtpFocus {
                focus,
                complete: challenge.is_complete(),
            })
        })
        .await
    }

    // ── Onboarding ──────────────────────────────────────────────────

    pub async fn submit_legal_name(&self, form: LegalNameForm) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self
            .require_state(&[FlowState::OnboardingLegalName], "submit_legal_name")
            .await?;
        form.validate().map_err(FlowError::Validation)?;
        self.drafts.merge_fields(form.into_patch()).await?;
        self.advance(from, "submit_legal_name").await
    }

    pub async fn submit_location(&self, form: LocationForm) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self
            .require_state(&[FlowState::OnboardingLocation], "submit_location")
            .await?;
        form.validate().map_err(FlowError::Validation)?;
        self.drafts.merge_fields(form.into_patch()).await?;
        self.advance(from, "submit_location").await
    }

    pub async fn submit_alias(&self, form: AliasForm) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self
            .require_state(&[FlowState::OnboardingAlias], "submit_alias")
            .await?;
        form.validate().map_err(FlowError::Validation)?;
        self.drafts.merge_fields(form.into_patch()).await?;
        self.advance(from, "submit_alias").await
    }

    pub async fn skip_alias(&self) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self.require_state(&[FlowState::OnboardingAlias], "skip_alias").await?;
        self.advance(from, "skip_alias").await
    }

    /// Photo as a data URI, the way a browser file reader produces it.
    pub async fn submit_photo(&self, data_uri: &str) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self
            .require_state(&[FlowState::OnboardingPhoto], "submit_photo")
            .await?;
        let photo = ProfilePhoto::from_data_uri(data_uri).map_err(photo_error)?;
        self.finish_with_photo(from, photo).await
    }

    /// Photo as raw bytes with their MIME type.
    pub async fn upload_photo(&self, mime: &str, bytes: &[u8]) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self
            .require_state(&[FlowState::OnboardingPhoto], "upload_photo")
            .await?;
        let photo = ProfilePhoto::from_bytes(mime, bytes).map_err(photo_error)?;
        self.finish_with_photo(from, photo).await
    }

    pub async fn skip_photo(&self) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self.require_state(&[FlowState::OnboardingPhoto], "skip_photo").await?;
        self.advance(from, "skip_photo").await
    }

    /// Step back one onboarding screen. Nothing is re-validated or discarded.
    pub async fn back(&self) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self.state().await;
        let to = from.previous().ok_or(FlowError::InvalidTransition {
            from,
            operation: "back",
        })?;
        if to == FlowState::AwaitingOtp {
            let target = self
                .sessions
                .current()
                .await?
                .map(|s| s.identity.display_email().to_string())
                .unwrap_or_default();
            *self.otp.write().await = Some(OtpChallenge::new(target));
        }
        self.commit(from, to, "back").await
    }

    // ── Authenticated ───────────────────────────────────────────────

    pub async fn dashboard(&self) -> Result<DashboardView, FlowError> {
        let session = self
            .sessions
            .current()
            .await?
            .ok_or(FlowError::NotAuthenticated)?;
        let state = self.state().await;
        if !state.is_verified() {
            return Err(FlowError::InvalidTransition {
                from: state,
                operation: "dashboard",
            });
        }
        let mut profile = self.drafts.read().await?;
        let photo = profile.photo_data.take();
        Ok(DashboardView {
            legal_name: profile.legal_name(),
            location: profile.location_line(),
            provider: session.identity.provider(),
            avatar_initial: session.identity.avatar_initial(),
            identity: session.identity.clone(),
            photo,
            profile,
            session,
        })
    }

    /// End the session. Session, photo and draft are all discarded.
    pub async fn logout(&self) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self.require_state(&[FlowState::Authenticated], "logout").await?;
        self.sessions.clear().await?;
        self.drafts.reset().await?;
        *self.otp.write().await = None;
        self.commit(from, FlowState::AnonymousLogin, "logout").await
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Direct navigation to a route. Never fails on an unknown target; the
    /// state stays where it is unless the route guard allows the move.
    ///
    /// Leaving the OTP screen for login or sign-up abandons the unverified
    /// session. The dashboard only opens once the OTP has been confirmed.
    pub async fn navigate(&self, route: Route) -> Result<Transition, FlowError> {
        let _guard = self.begin()?;
        let from = self.state().await;
        let target = FlowState::for_route(route);
        let has_session = self.sessions.current().await?.is_some();

        if !has_session && from.requires_session() {
            warn!(from = %from, route = %route, "Session gone, back to login");
            *self.otp.write().await = None;
            self.set_state(FlowState::AnonymousLogin).await?;
            return Ok(Transition {
                from,
                to: FlowState::AnonymousLogin,
            });
        }

        let to = match target {
            FlowState::Authenticated if has_session && from.is_verified() => target,
            FlowState::Authenticated if !has_session => FlowState::AnonymousLogin,
            FlowState::AnonymousLogin | FlowState::AnonymousSignUp
                if !has_session || from == FlowState::AwaitingOtp =>
            {
                target
            }
            _ => from,
        };

        if to == from {
            debug!(state = %from, route = %route, "Navigation kept state");
            return Ok(Transition { from, to });
        }
        if from == FlowState::AwaitingOtp {
            self.abandon_otp().await?;
        }
        self.commit(from, to, "navigate").await
    }

    // ── Internals ───────────────────────────────────────────────────

    fn begin(&self) -> Result<MutexGuard<'_, ()>, FlowError> {
        self.transition.try_lock().map_err(|_| FlowError::Busy)
    }

    async fn require_state(
        &self,
        allowed: &[FlowState],
        operation: &'static str,
    ) -> Result<FlowState, FlowError> {
        let current = self.state().await;
        if allowed.contains(&current) {
            Ok(current)
        } else {
            warn!(state = %current, operation, "Rejected transition");
            Err(FlowError::InvalidTransition {
                from: current,
                operation,
            })
        }
    }

    /// Move one step along the forward path.
    async fn advance(
        &self,
        from: FlowState,
        operation: &'static str,
    ) -> Result<Transition, FlowError> {
        let to = from
            .next()
            .ok_or(FlowError::InvalidTransition { from, operation })?;
        self.commit(from, to, operation).await
    }

    async fn edit_otp(
        &self,
        operation: &'static str,
        edit: impl FnOnce(&mut OtpChallenge) -> Option<OtpFocus>,
    ) -> Result<OtpFocus, FlowError> {
        self.require_state(&[FlowState::AwaitingOtp], operation)
            .await?;
        let mut otp = self.otp.write().await;
        let challenge = otp.as_mut().ok_or(FlowError::InvalidOtp)?;
        edit(challenge).ok_or(FlowError::InvalidOtp)
    }

    /// Drop the pending challenge and the session it was issued for.
    async fn abandon_otp(&self) -> Result<(), StoreError> {
        *self.otp.write().await = None;
        self.sessions.clear().await?;
        info!("OTP step abandoned");
        Ok(())
    }

    /// A fresh authentication starts onboarding from an empty draft.
    async fn start_otp(&self, identity: Identity, remember: bool) -> Result<(), StoreError> {
        self.drafts.reset().await?;
        let session = self.sessions.establish(identity, remember).await?;
        *self.otp.write().await = Some(OtpChallenge::new(session.identity.display_email()));
        Ok(())
    }

    async fn finish_with_photo(
        &self,
        from: FlowState,
        photo: ProfilePhoto,
    ) -> Result<Transition, FlowError> {
        info!(media_type = photo.media_type(), "Profile photo accepted");
        self.drafts
            .merge_fields(DraftPatch {
                photo_data: Some(photo),
                ..Default::default()
            })
            .await?;
        self.advance(from, "submit_photo").await
    }

    async fn commit(
        &self,
        from: FlowState,
        to: FlowState,
        operation: &'static str,
    ) -> Result<Transition, FlowError> {
        if !from.can_transition_to(to) {
            return Err(FlowError::InvalidTransition { from, operation });
        }
        self.set_state(to).await?;
        info!(from = %from, to = %to, operation, "Flow transition");
        Ok(Transition { from, to })
    }

    async fn set_state(&self, to: FlowState) -> Result<(), StoreError> {
        save(self.store.as_ref(), keys::FLOW_STATE, &to).await?;
        *self.state.write().await = to;
        Ok(())
    }
}

fn auth_failed(title: &str, error: &AuthError) -> FlowError {
    warn!(error = %error, "Authentication call failed");
    FlowError::AuthenticationFailed {
        notice: Notice::new(title, error.to_string()),
    }
}

fn photo_error(error: crate::validation::ValidationError) -> FlowError {
    let mut errors = FieldErrors::new();
    errors.insert(Field::Photo, error);
    FlowError::Validation(errors)
}
