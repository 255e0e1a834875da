//! In-memory tournament store
//!
//! Volatile; cleared on restart.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::models::{EntityId, NewRegistration, Registration, TournamentSettings};
use crate::error::AppError;
use crate::metrics::{REGISTRATIONS_ACTIVE, REGISTRATIONS_TOTAL};

/// Settings and registrations
pub struct Store {
    settings: RwLock<TournamentSettings>,
    registrations: RwLock<Vec<Registration>>,
}

impl Store {
    pub fn new(settings: TournamentSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
            registrations: RwLock::new(Vec::new()),
        }
    }

    pub async fn settings(&self) -> TournamentSettings {
        self.settings.read().await.clone()
    }

    pub async fn replace_settings(
        &self,
        settings: TournamentSettings,
    ) -> Result<TournamentSettings, AppError> {
        settings.validate()?;
        let settings = TournamentSettings {
            name: settings.name.trim().to_string(),
            ..settings
        };

        *self.settings.write().await = settings.clone();
        Ok(settings)
    }

    /// Register a participant
    ///
    /// Lock order is settings, then registrations.
    ///
    /// # Errors
    /// `Forbidden` when registration is closed or full
    pub async fn register(
        &self,
        request: NewRegistration,
        now: DateTime<Utc>,
    ) -> Result<Registration, AppError> {
        let request = request.normalize()?;
        // Held until the entry is pushed so a concurrent settings change waits
        let settings = self.settings.read().await;
        if !settings.registration_open {
            return Err(AppError::Forbidden("registration is closed".to_string()));
        }

        let mut registrations = self.registrations.write().await;
        if let Some(max) = settings.max_participants {
            if registrations.len() >= max as usize {
                return Err(AppError::Forbidden("tournament is full".to_string()));
            }
        }

        let registration = Registration {
            id: EntityId::new().0,
            name: request.name,
            phone: request.phone,
            created_at: now,
        };
        registrations.push(registration.clone());

        REGISTRATIONS_TOTAL.inc();
        REGISTRATIONS_ACTIVE.set(registrations.len() as i64);

        Ok(registration)
    }

    pub async fn registrations(&self) -> Vec<Registration> {
        self.registrations.read().await.clone()
    }

    pub async fn registration(&self, id: &str) -> Option<Registration> {
        self.registrations
            .read()
            .await
            .iter()
            .find(|registration| registration.id == id)
            .cloned()
    }

    pub async fn count(&self) -> usize {
        self.registrations.read().await.len()
    }

    pub async fn remove_registration(&self, id: &str) -> Result<Registration, AppError> {
        let mut registrations = self.registrations.write().await;
        let index = registrations
            .iter()
            .position(|registration| registration.id == id)
            .ok_or(AppError::NotFound)?;
        let removed = registrations.remove(index);
        REGISTRATIONS_ACTIVE.set(registrations.len() as i64);

        Ok(removed)
    }
}
