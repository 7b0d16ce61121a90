//! Profile storage trait and implementations.
//!
//! Provides the `ProfileStore` trait for keeping recently collected request
//! profiles, and an `InMemoryProfileStore` implementation that holds a
//! bounded window of them.

use crate::collector::CollectedData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Default number of profiles kept by the in-memory store.
pub const DEFAULT_CAPACITY: usize = 100;

/// Errors that can occur during profile store operations.
#[derive(Debug, Error)]
pub enum ProfileStoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on profile store")]
    LockError,
}

/// The collected data of one profiled request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Identifier of the profile.
    pub token: String,
    /// When the data was collected.
    pub collected_at: DateTime<Utc>,
    /// HTTP method of the profiled request, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// URL of the profiled request, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// The collected query data.
    pub data: CollectedData,
}

impl Profile {
    /// Creates a profile with a fresh token and the current timestamp.
    #[must_use]
    pub fn new(data: CollectedData) -> Self {
        Self {
            token: generate_token(),
            collected_at: Utc::now(),
            method: None,
            url: None,
            data,
        }
    }

    /// Sets the request method and URL.
    #[must_use]
    pub fn with_request(mut self, method: impl Into<String>, url: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self.url = Some(url.into());
        self
    }

    /// Replaces the generated token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }
}

/// Generates a short hexadecimal profile token.
///
/// Tokens combine the current time with a process-wide sequence number, so
/// two tokens generated by the same process never repeat within a run.
#[must_use]
pub fn generate_token() -> String {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);

    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();

    let mut bytes = [0u8; 8];
    bytes[..5].copy_from_slice(&millis.to_be_bytes()[3..]);
    bytes[5..].copy_from_slice(&sequence.to_be_bytes()[5..]);
    hex::encode(bytes)
}

/// Trait for profile storage implementations.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait ProfileStore: Send + Sync {
    /// Stores a profile, replacing any profile with the same token.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert(&self, profile: Profile) -> Result<(), ProfileStoreError>;

    /// Returns the profile with the given token.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get(&self, token: &str) -> Result<Option<Profile>, ProfileStoreError>;

    /// Returns up to `limit` profiles, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn recent(&self, limit: usize) -> Result<Vec<Profile>, ProfileStoreError>;

    /// Returns the number of stored profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if the count operation fails.
    fn count(&self) -> Result<usize, ProfileStoreError>;

    /// Returns the maximum number of profiles kept.
    fn capacity(&self) -> usize;

    /// Removes every profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the clear operation fails.
    fn clear(&self) -> Result<(), ProfileStoreError>;
}

/// In-memory profile store holding at most `capacity` profiles.
///
/// When full, the oldest profile is evicted first.
#[derive(Debug, Clone)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<VecDeque<Profile>>>,
    capacity: usize,
}

impl InMemoryProfileStore {
    /// Creates a store with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a store holding at most `capacity` profiles (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            profiles: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Returns the maximum number of profiles kept.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn insert(&self, profile: Profile) -> Result<(), ProfileStoreError> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| ProfileStoreError::LockError)?;

        profiles.retain(|p| p.token != profile.token);
        while profiles.len() >= self.capacity {
            if let Some(evicted) = profiles.pop_front() {
                tracing::debug!(token = %evicted.token, "Evicted oldest profile");
            }
        }
        profiles.push_back(profile);
        Ok(())
    }

    fn get(&self, token: &str) -> Result<Option<Profile>, ProfileStoreError> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| ProfileStoreError::LockError)?;
        Ok(profiles.iter().find(|p| p.token == token).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<Profile>, ProfileStoreError> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| ProfileStoreError::LockError)?;
        Ok(profiles.iter().rev().take(limit).cloned().collect())
    }

    fn count(&self) -> Result<usize, ProfileStoreError> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| ProfileStoreError::LockError)?;
        Ok(profiles.len())
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&self) -> Result<(), ProfileStoreError> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| ProfileStoreError::LockError)?;
        profiles.clear();
        Ok(())
    }
}
