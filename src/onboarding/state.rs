//! Flow state machine: which screen the user is on.

use serde::{Deserialize, Serialize};

use crate::route::Route;

/// Positions in the auth and onboarding flow.
///
/// Forward path: AnonymousLogin/AnonymousSignUp → AwaitingOtp →
/// OnboardingLegalName → OnboardingLocation → OnboardingAlias →
/// OnboardingPhoto → Authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    AnonymousLogin,
    AnonymousSignUp,
    AwaitingOtp,
    OnboardingLegalName,
    OnboardingLocation,
    OnboardingAlias,
    OnboardingPhoto,
    Authenticated,
}

impl FlowState {
    pub const ALL: [FlowState; 8] = [
        FlowState::AnonymousLogin,
        FlowState::AnonymousSignUp,
        FlowState::AwaitingOtp,
        FlowState::OnboardingLegalName,
        FlowState::OnboardingLocation,
        FlowState::OnboardingAlias,
        FlowState::OnboardingPhoto,
        FlowState::Authenticated,
    ];

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: FlowState) -> bool {
        use FlowState::*;
        matches!(
            (self, target),
            (AnonymousLogin, AwaitingOtp)
                | (AnonymousSignUp, AwaitingOtp)
                | (AnonymousLogin, AnonymousSignUp)
                | (AnonymousSignUp, AnonymousLogin)
                | (AwaitingOtp, AnonymousLogin)
                | (AwaitingOtp, AnonymousSignUp)
                | (AwaitingOtp, OnboardingLegalName)
                | (OnboardingLegalName, OnboardingLocation)
                | (OnboardingLocation, OnboardingAlias)
                | (OnboardingAlias, OnboardingPhoto)
                | (OnboardingPhoto, Authenticated)
                | (Authenticated, AnonymousLogin)
        ) || self.previous() == Some(target)
            || (self.is_onboarding() && target == Authenticated)
    }

    /// Whether this state is terminal (onboarding is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    pub fn is_onboarding(&self) -> bool {
        matches!(
            self,
            Self::OnboardingLegalName
                | Self::OnboardingLocation
                | Self::OnboardingAlias
                | Self::OnboardingPhoto
        )
    }

    /// Past the OTP check: the dashboard may be shown.
    pub fn is_verified(&self) -> bool {
        self.is_onboarding() || self.is_terminal()
    }

    /// Every state past login needs a session.
    pub fn requires_session(&self) -> bool {
        !matches!(self, Self::AnonymousLogin | Self::AnonymousSignUp)
    }

    /// The next state on the forward path, if any.
    pub fn next(&self) -> Option<FlowState> {
        use FlowState::*;
        match self {
            AnonymousLogin | AnonymousSignUp => Some(AwaitingOtp),
            AwaitingOtp => Some(OnboardingLegalName),
            OnboardingLegalName => Some(OnboardingLocation),
            OnboardingLocation => Some(OnboardingAlias),
            OnboardingAlias => Some(OnboardingPhoto),
            OnboardingPhoto => Some(Authenticated),
            Authenticated => None,
        }
    }

    /// Where `back` leads. Only onboarding steps can go back.
    pub fn previous(&self) -> Option<FlowState> {
        use FlowState::*;
        match self {
            OnboardingLegalName => Some(AwaitingOtp),
            OnboardingLocation => Some(OnboardingLegalName),
            OnboardingAlias => Some(OnboardingLocation),
            OnboardingPhoto => Some(OnboardingAlias),
            _ => None,
        }
    }

    pub fn route(&self) -> Route {
        match self {
            Self::AnonymousLogin => Route::Login,
            Self::AnonymousSignUp => Route::SignIn,
            Self::AwaitingOtp => Route::Otp,
            Self::OnboardingLegalName => Route::OnboardingName,
            Self::OnboardingLocation => Route::OnboardingLocation,
            Self::OnboardingAlias => Route::OnboardingUsername,
            Self::OnboardingPhoto => Route::OnboardingProfilePhoto,
            Self::Authenticated => Route::Dashboard,
        }
    }

    /// State whose screen lives at `route`.
    pub fn for_route(route: Route) -> FlowState {
        let canonical = route.canonical();
        Self::ALL
            .into_iter()
            .find(|s| s.route() == canonical)
            .unwrap_or(Self::AnonymousLogin)
    }

    /// Progress bar percentage for onboarding steps.
    pub fn progress(&self) -> Option<u8> {
        match self {
            Self::OnboardingLegalName => Some(25),
            Self::OnboardingLocation => Some(50),
            Self::OnboardingAlias => Some(75),
            Self::OnboardingPhoto => Some(100),
            _ => None,
        }
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::AnonymousLogin
    }
}

impl std::fmt::Display for FlowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AnonymousLogin => "anonymous_login",
            Self::AnonymousSignUp => "anonymous_sign_up",
            Self::AwaitingOtp => "awaiting_otp",
            Self::OnboardingLegalName => "onboarding_legal_name",
            Self::OnboardingLocation => "onboarding_location",
            Self::OnboardingAlias => "onboarding_alias",
            Self::OnboardingPhoto => "onboarding_photo",
            Self::Authenticated => "authenticated",
        };
        write!(f, "{s}")
    }
}
