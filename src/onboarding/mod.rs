//! Onboarding flow: login, OTP and the four profile steps.
//!
//! The [`FlowController`] owns the current [`FlowState`] and is the only
//! writer of the session and draft records while the flow runs. The view
//! layer calls one operation per user action and navigates to the route of
//! the returned transition.

pub mod controller;
pub mod draft;
pub mod forms;
pub mod model;
pub mod otp;
pub mod routes;
pub mod state;

pub use controller::{DashboardView, FlowController, FlowStatus, OtpFocus, Transition};
pub use draft::DraftStore;
pub use forms::{AliasForm, LegalNameForm, LocationForm, LoginForm, SignUpForm};
pub use model::{DraftPatch, DraftProfile, LocationOptions, ProfilePhoto};
pub use otp::OtpChallenge;
pub use routes::{FlowRouteState, flow_routes};
pub use state::FlowState;
