//! One-time-password entry state. Lives only as long as the OTP screen.

use crate::auth::OTP_LENGTH;

/// Five single-digit slots plus the address the code was sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    target_email: String,
    digits: [Option<char>; OTP_LENGTH],
}

impl OtpChallenge {
    pub fn new(target_email: impl Into<String>) -> Self {
        Self {
            target_email: target_email.into(),
            digits: [None; OTP_LENGTH],
        }
    }

    /// Build from submitted slot values. Entries past the fifth are ignored.
    pub fn from_digits<S: AsRef<str>>(target_email: impl Into<String>, digits: &[S]) -> Self {
        let mut challenge = Self::new(target_email);
        for (index, value) in digits.iter().take(OTP_LENGTH).enumerate() {
            challenge.set_digit(index, value.as_ref());
        }
        challenge
    }

    pub fn target_email(&self) -> &str {
        &self.target_email
    }

    /// Update one slot. Returns the slot that should take focus next.
    ///
    /// Accepts an empty value (clears the slot) or a single ASCII digit;
    /// anything else leaves the slot unchanged.
    pub fn set_digit(&mut self, index: usize, value: &str) -> Option<usize> {
        if index >= OTP_LENGTH {
            return None;
        }
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (None, _) => {
                self.digits[index] = None;
                Some(index)
            }
            (Some(c), None) if c.is_ascii_digit() => {
                self.digits[index] = Some(c);
                Some((index + 1).min(OTP_LENGTH - 1))
            }
            _ => Some(index),
        }
    }

    /// Backspace on an empty slot moves focus to the previous one.
    pub fn backspace(&self, index: usize) -> usize {
        if index > 0 && index < OTP_LENGTH && self.digits[index].is_none() {
            index - 1
        } else {
            index.min(OTP_LENGTH - 1)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.digits.iter().all(Option::is_some)
    }

    /// Concatenated digits entered so far.
    pub fn code(&self) -> String {
        self.digits.iter().flatten().collect()
    }

    pub fn clear(&mut self) {
        self.digits = [None; OTP_LENGTH];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_with_five_digits() {
        let c = OtpChallenge::from_digits("a@b.com", &["1", "2", "3", "4", "5"]);
        assert!(c.is_complete());
        assert_eq!(c.code(), "12345");
        assert_eq!(c.target_email(), "a@b.com");
    }

    #[test]
    fn four_digits_incomplete() {
        let c = OtpChallenge::from_digits("a@b.com", &["1", "2", "3", "4"]);
        assert!(!c.is_complete());
        assert_eq!(c.code(), "1234");
    }

    #[test]
    fn non_digits_ignored() {
        let mut c = OtpChallenge::new("x");
        assert_eq!(c.set_digit(0, "a"), Some(0));
        assert_eq!(c.set_digit(0, "12"), Some(0));
        assert_eq!(c.code(), "");
        assert_eq!(c.set_digit(0, "7"), Some(1));
        assert_eq!(c.code(), "7");
        assert_eq!(c.set_digit(9, "1"), None);
    }

    #[test]
    fn focus_moves() {
        let mut c = OtpChallenge::new("x");
        assert_eq!(c.set_digit(4, "9"), Some(4));
        assert_eq!(c.backspace(3), 2);
        assert_eq!(c.backspace(4), 4);
        assert_eq!(c.backspace(0), 0);
        c.set_digit(4, "");
        assert_eq!(c.backspace(4), 3);
    }

    #[test]
    fn clear_empties_slots() {
        let mut c = OtpChallenge::from_digits("x", &["1", "2", "3", "4", "5", "6"]);
        assert_eq!(c.code(), "12345");
        c.clear();
        assert!(!c.is_complete());
        assert_eq!(c.code(), "");
    }
}
