//! Data models
//!
//! Tournament settings and registrations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entity ID (ULID format)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Tournament settings managed by the admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSettings {
    pub name: String,
    pub registration_open: bool,
    /// `None` means unlimited
    pub max_participants: Option<u32>,
}

impl TournamentSettings {
    pub fn validate(&self) -> Result<(), crate::error::AppError> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
            return Err(crate::error::AppError::Validation(format!(
                "name must be 1 to {MAX_NAME_CHARS} characters"
            )));
        }
        if self.max_participants == Some(0) {
            return Err(crate::error::AppError::Validation(
                "max_participants must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// A participant registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Registration request as submitted
#[derive(Debug, Clone, Deserialize)]
pub struct NewRegistration {
    pub name: String,
    pub phone: String,
}

pub(crate) const MAX_NAME_CHARS: usize = 100;
const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 5..=20;

impl NewRegistration {
    /// Trim and check the submitted fields
    pub fn normalize(self) -> Result<NewRegistration, crate::error::AppError> {
        use crate::error::AppError;

        let name = self.name.trim().to_string();
        if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
            return Err(AppError::Validation(format!(
                "name must be 1 to {MAX_NAME_CHARS} characters"
            )));
        }

        let phone = self.phone.trim().to_string();
        let allowed = phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-'));
        if !allowed || !PHONE_DIGITS.contains(&phone.len()) {
            return Err(AppError::Validation(
                "phone must be 5 to 20 characters of digits, spaces, '+' or '-'".to_string(),
            ));
        }

        Ok(NewRegistration { name, phone })
    }
}
