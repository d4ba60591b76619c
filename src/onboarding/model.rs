//! Draft profile and onboarding data models.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Countries offered by the location step.
pub const COUNTRIES: &[&str] = &[
    "United States",
    "United Kingdom",
    "Canada",
    "Australia",
    "India",
    "Germany",
    "France",
];

/// States/regions offered by the location step.
pub const REGIONS: &[&str] = &[
    "California",
    "New York",
    "Texas",
    "Florida",
    "Illinois",
    "Pennsylvania",
];

/// Options for the location selects.
#[derive(Debug, Clone, Serialize)]
pub struct LocationOptions {
    pub countries: &'static [&'static str],
    pub regions: &'static [&'static str],
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            countries: COUNTRIES,
            regions: REGIONS,
        }
    }
}

/// A `data:image/...;base64,...` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfilePhoto(String);

impl ProfilePhoto {
    /// Validate a data URI as produced by a browser file reader.
    pub fn from_data_uri(uri: &str) -> Result<Self, ValidationError> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(ValidationError::MissingImage);
        }
        let rest = uri
            .strip_prefix("data:image/")
            .ok_or(ValidationError::InvalidImage)?;
        let (subtype, payload) = rest
            .split_once(";base64,")
            .ok_or(ValidationError::InvalidImage)?;
        if subtype.is_empty() || payload.is_empty() {
            return Err(ValidationError::InvalidImage);
        }
        BASE64
            .decode(payload)
            .map_err(|_| ValidationError::InvalidImage)?;
        Ok(Self(uri.to_string()))
    }

    /// Encode raw image bytes.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Result<Self, ValidationError> {
        if bytes.is_empty() {
            return Err(ValidationError::MissingImage);
        }
        let mime = mime.trim().to_ascii_lowercase();
        match mime.strip_prefix("image/") {
            Some(subtype) if !subtype.is_empty() => {}
            _ => return Err(ValidationError::InvalidImage),
        }
        Ok(Self(format!("data:{mime};base64,{}", BASE64.encode(bytes))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// e.g. `image/png`.
    pub fn media_type(&self) -> &str {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .unwrap_or_default()
    }
}

/// In-progress onboarding answers.
///
/// Stored under `onboardingDraft`; the photo is kept in its own record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_last_name: Option<String>,
    #[serde(skip)]
    pub photo_data: Option<ProfilePhoto>,
}

impl DraftProfile {
    /// Legal name joined for display, if both halves are known.
    pub fn legal_name(&self) -> Option<String> {
        match (&self.legal_first_name, &self.legal_surname) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            _ => None,
        }
    }

    /// "City, Region, Country" from whichever parts are known.
    pub fn location_line(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.city, &self.state_region, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        if parts.is_empty() { None } else { Some(parts.join(", ")) }
    }
}

/// Keys one step writes. Absent keys are left untouched by a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftPatch {
    pub legal_first_name: Option<String>,
    pub legal_surname: Option<String>,
    pub country: Option<String>,
    pub state_region: Option<String>,
    pub city: Option<String>,
    pub alias_first_name: Option<String>,
    pub alias_last_name: Option<String>,
    pub photo_data: Option<ProfilePhoto>,
}

impl DraftPatch {
    /// Shallow merge, last write wins per key.
    pub fn apply_to(self, draft: &mut DraftProfile) {
        fn set<T>(slot: &mut Option<T>, value: Option<T>) {
            if let Some(v) = value {
                *slot = Some(v);
            }
        }
        set(&mut draft.legal_first_name, self.legal_first_name);
        set(&mut draft.legal_surname, self.legal_surname);
        set(&mut draft.country, self.country);
        set(&mut draft.state_region, self.state_region);
        set(&mut draft.city, self.city);
        set(&mut draft.alias_first_name, self.alias_first_name);
        set(&mut draft.alias_last_name, self.alias_last_name);
        set(&mut draft.photo_data, self.photo_data);
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
