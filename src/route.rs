//! Navigable routes. A route is a projection of the flow state, never its source.

use serde::{Serialize, Serializer};

/// Every path the view layer can be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Login,
    SignIn,
    Otp,
    OnboardingName,
    OnboardingLocation,
    OnboardingUsername,
    OnboardingProfilePhoto,
    ProfilePhoto,
    Dashboard,
}

impl Route {
    pub const ALL: [Route; 10] = [
        Route::Root,
        Route::Login,
        Route::SignIn,
        Route::Otp,
        Route::OnboardingName,
        Route::OnboardingLocation,
        Route::OnboardingUsername,
        Route::OnboardingProfilePhoto,
        Route::ProfilePhoto,
        Route::Dashboard,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
            Self::SignIn => "/signin",
            Self::Otp => "/otp",
            Self::OnboardingName => "/onboarding/name",
            Self::OnboardingLocation => "/onboarding/location",
            Self::OnboardingUsername => "/onboarding/username",
            Self::OnboardingProfilePhoto => "/onboarding/profile-photo",
            Self::ProfilePhoto => "/profile-photo",
            Self::Dashboard => "/dashboard",
        }
    }

    /// Parse a path, ignoring a trailing slash.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        Self::ALL.into_iter().find(|r| r.path() == trimmed)
    }

    /// The route a visit to `self` actually lands on before any state guard.
    pub fn canonical(&self) -> Self {
        match self {
            Self::Root => Self::Login,
            Self::ProfilePhoto => Self::OnboardingProfilePhoto,
            other => *other,
        }
    }
}

impl Serialize for Route {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
