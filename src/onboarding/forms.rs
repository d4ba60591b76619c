//! Step forms. Each one validates its own fields and yields the draft keys it owns.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::validation::{
    Field, FieldErrors, validate_email, validate_new_password, validate_required,
};

use super::model::DraftPatch;

/// Username/password login.
#[derive(Debug)]
pub struct LoginForm {
    pub username: String,
    pub password: SecretString,
    pub remember_password: bool,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            remember_password: false,
        }
    }

    pub fn remember(mut self, remember: bool) -> Self {
        self.remember_password = remember;
        self
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(Field::Username, validate_required(&self.username));
        errors.check(Field::Password, validate_required(self.password.expose_secret()));
        errors.into_result()
    }
}

/// Email/password registration.
#[derive(Debug)]
pub struct SignUpForm {
    pub email: String,
    pub password: SecretString,
}

impl SignUpForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(Field::Email, validate_email(&self.email));
        errors.check(Field::Password, validate_new_password(self.password.expose_secret()));
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalNameForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub surname: String,
}

impl LegalNameForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(Field::LegalFirstName, validate_required(&self.first_name));
        errors.check(Field::LegalSurname, validate_required(&self.surname));
        errors.into_result()
    }

    pub fn into_patch(self) -> DraftPatch {
        DraftPatch {
            legal_first_name: Some(self.first_name.trim().to_string()),
            legal_surname: Some(self.surname.trim().to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationForm {
    #[serde(default)]
    pub country: String,
    #[serde(default, alias = "state")]
    pub state_region: String,
    #[serde(default)]
    pub city: String,
}

impl LocationForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(Field::Country, validate_required(&self.country));
        errors.check(Field::StateRegion, validate_required(&self.state_region));
        errors.check(Field::City, validate_required(&self.city));
        errors.into_result()
    }

    pub fn into_patch(self) -> DraftPatch {
        DraftPatch {
            country: Some(self.country.trim().to_string()),
            state_region: Some(self.state_region.trim().to_string()),
            city: Some(self.city.trim().to_string()),
            ..Default::default()
        }
    }
}

/// Display name, distinct from the legal name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl AliasForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(Field::AliasFirstName, validate_required(&self.first_name));
        errors.check(Field::AliasLastName, validate_required(&self.last_name));
        errors.into_result()
    }

    pub fn into_patch(self) -> DraftPatch {
        DraftPatch {
            alias_first_name: Some(self.first_name.trim().to_string()),
            alias_last_name: Some(self.last_name.trim().to_string()),
            ..Default::default()
        }
    }
}
