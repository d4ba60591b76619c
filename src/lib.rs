//! HeyPro Data: login, OTP and profile onboarding flow.

pub mod auth;
pub mod config;
pub mod error;
pub mod onboarding;
pub mod route;
pub mod session;
pub mod store;
pub mod validation;
