//! Authentication backends.
//!
//! The flow talks to an [`AuthBackend`]; the shipped implementation is a
//! timed mock that succeeds whenever the required fields are present.

pub mod backend;
pub mod mock;

pub use backend::{AuthBackend, OtpDecision, OTP_LENGTH};
pub use mock::MockAuthBackend;
