use std::sync::Arc;
use tokio::sync::watch;

use crate::session::SessionError;
use crate::storage::{Storage, StorageError};

/// Durable storage slot holding the API key
pub const CREDENTIAL_KEY: &str = "token";

/// Single credential slot, persisted and published to subscribers
pub struct CredentialStore {
    storage: Arc<dyn Storage>,
    current: watch::Sender<Option<String>>,
}

impl CredentialStore {
    /// Read the persisted credential once; later reads only touch memory
    pub fn hydrate(storage: Arc<dyn Storage>) -> Result<Self, StorageError> {
        let current = match storage.load(CREDENTIAL_KEY)? {
            Some(raw) => match serde_json::from_str::<String>(&raw) {
                Ok(token) if !token.trim().is_empty() => Some(token),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!("Discarding unreadable stored credential: {}", e);
                    None
                }
            },
            None => None,
        };

        let (current, _) = watch::channel(current);
        Ok(Self { storage, current })
    }

    pub fn save(&self, token: &str) -> Result<(), SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::EmptyCredential);
        }

        let raw = serde_json::to_string(token).map_err(StorageError::from)?;
        self.storage.save(CREDENTIAL_KEY, &raw)?;
        self.current.send_replace(Some(token.to_string()));
        Ok(())
    }

    /// Forget the credential. Memory is cleared even when storage fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        let removed = self.storage.remove(CREDENTIAL_KEY);
        self.current.send_replace(None);
        removed
    }

    pub fn current(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    pub fn is_present(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.current.subscribe()
    }
}
