//! Key validation - the trust decision behind protected endpoints.
//!
//! A candidate key is valid when an active record holds exactly that key.
//! A miss is a normal negative result, not an error. On a hit, `last_used`
//! is stamped on a detached task whose failure is logged but never changes
//! the verdict. `usage_limit` is not consulted.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::AppError,
    models::api_key::{KeyData, ValidationOutcome},
    services::key_store::KeyStore,
};

/// Validates candidate keys against the key store.
#[derive(Clone)]
pub struct KeyValidator {
    store: Arc<KeyStore>,
}

impl KeyValidator {
    pub fn new(store: Arc<KeyStore>) -> Self {
        Self { store }
    }

    /// Decide whether `candidate` is a valid, active key.
    ///
    /// # Errors
    ///
    /// Only store failures are errors. Unknown or inactive keys yield
    /// `Ok` with `is_valid == false`.
    pub async fn validate(&self, candidate: &str) -> Result<ValidationOutcome, AppError> {
        let Some(record) = self.store.find_active(candidate).await? else {
            return Ok(ValidationOutcome::invalid());
        };

        self.spawn_touch(record.id);

        Ok(ValidationOutcome::valid(KeyData::from(&record)))
    }

    /// Same as [`validate`](Self::validate) but folds store failures into the value.
    pub async fn check(&self, candidate: &str) -> ValidationOutcome {
        match self.validate(candidate).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!("Error validating API key: {}", err);
                ValidationOutcome::failed(err.public_message())
            }
        }
    }

    // Not awaited and not cancelled when the request goes away
    fn spawn_touch(&self, id: Uuid) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(err) = store.touch_last_used(id).await {
                tracing::warn!("Failed to update last_used for API key {}: {}", id, err);
            }
        });
    }
}
