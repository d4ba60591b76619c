//! Form validators: pure predicates over user input.
//!
//! Validators never touch the stores. Steps collect their failures into a
//! [`FieldErrors`] map so every invalid field is reported at once.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde::ser::SerializeMap;

pub use crate::error::ValidationError;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Characters that satisfy the special-character password rule.
pub const SPECIAL_CHARS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;

/// Every input field the flow validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Username,
    Password,
    Email,
    LegalFirstName,
    LegalSurname,
    Country,
    StateRegion,
    City,
    AliasFirstName,
    AliasLastName,
    Photo,
}

impl Field {
    /// Wire name used in error maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::Email => "email",
            Self::LegalFirstName => "legalFirstName",
            Self::LegalSurname => "legalSurname",
            Self::Country => "country",
            Self::StateRegion => "stateRegion",
            Self::City => "city",
            Self::AliasFirstName => "aliasFirstName",
            Self::AliasLastName => "aliasLastName",
            Self::Photo => "photo",
        }
    }

    /// Message shown under this field for the given failure.
    pub fn message(&self, error: ValidationError) -> &'static str {
        match (self, error) {
            (Self::Country, ValidationError::EmptyField) => "Please select a country",
            (Self::StateRegion, ValidationError::EmptyField) => "Please select a state",
            (_, ValidationError::EmptyField) => "Please fill this field",
            (_, ValidationError::InvalidEmail) => "Please enter a valid email",
            (_, ValidationError::WeakPassword) => "Password does not meet all requirements",
            (_, ValidationError::MissingImage) => "Please select an image",
            (_, ValidationError::InvalidImage) => "Please select a valid image",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field validation failures for one submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<Field, ValidationError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one validator against `field`.
    pub fn check(&mut self, field: Field, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            self.errors.insert(field, e);
        }
    }

    pub fn insert(&mut self, field: Field, error: ValidationError) {
        self.errors.insert(field, error);
    }

    pub fn get(&self, field: Field) -> Option<ValidationError> {
        self.errors.get(&field).copied()
    }

    /// Drop the error for a field the user just edited.
    pub fn clear_field(&mut self, field: Field) {
        self.errors.remove(&field);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// One message per invalid field, in field order.
    pub fn messages(&self) -> Vec<(Field, &'static str)> {
        self.errors
            .iter()
            .map(|(field, error)| (*field, field.message(*error)))
            .collect()
    }

    /// `Ok(())` when nothing failed, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (field, message) in self.messages() {
            map.serialize_entry(field.as_str(), message)?;
        }
        map.end()
    }
}

/// Fails with `EmptyField` when the trimmed value is empty.
pub fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField)
    } else {
        Ok(())
    }
}

/// Checks the `local@domain.tld` shape. Blank input is `EmptyField`.
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    validate_required(value)?;
    if EMAIL_SHAPE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Which password rules a candidate satisfies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordStrength {
    pub has_uppercase: bool,
    pub has_number: bool,
    pub has_special_char: bool,
}

impl PasswordStrength {
    pub fn is_accepted(&self) -> bool {
        self.has_uppercase && self.has_number && self.has_special_char
    }
}

/// Evaluated on every keystroke for live feedback.
pub fn validate_password_strength(value: &str) -> PasswordStrength {
    PasswordStrength {
        has_uppercase: value.chars().any(|c| c.is_ascii_uppercase()),
        has_number: value.chars().any(|c| c.is_ascii_digit()),
        has_special_char: value.chars().any(|c| SPECIAL_CHARS.contains(c)),
    }
}

/// Blocking check for a new password on sign-up.
pub fn validate_new_password(value: &str) -> Result<(), ValidationError> {
    validate_required(value)?;
    if validate_password_strength(value).is_accepted() {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword)
    }
}
