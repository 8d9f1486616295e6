//! Attack store built on a pluggable repository
//!
//! `AttackStore` records attacks through any `AttackRepository`,
//! notifies registered listeners after each confirmed write, and answers
//! criteria searches by filtering the full record set.

use crate::error::{AttackStoreError, Result};
use crate::notify::{Listener, ListenerRegistry};
use crate::repository::AttackRepository;
use crate::types::{Attack, AttackCounts, SearchCriteria};
use std::sync::Arc;

/// Listener for newly recorded attacks
pub type AttackListener = dyn Listener<Attack>;

/// Attack store backed by a pluggable repository
///
/// Thread-safe; share it as `Arc<AttackStore>` between detection sources
/// and query callers.
pub struct AttackStore {
    repository: Box<dyn AttackRepository>,

    /// Listeners notified on every new attack, in registration order
    listeners: ListenerRegistry<Attack>,
}

impl AttackStore {
    /// Create a new store from a repository
    pub fn new(repository: impl AttackRepository + 'static) -> Self {
        Self::from_boxed(Box::new(repository))
    }

    /// Create a new store from an already boxed repository
    pub fn from_boxed(repository: Box<dyn AttackRepository>) -> Self {
        Self {
            repository,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Get the repository name
    pub fn repository_name(&self) -> &str {
        self.repository.name()
    }

    /// Register a listener for new attacks
    pub async fn register_listener(&self, listener: Arc<AttackListener>) {
        self.listeners.register(listener).await;
    }

    /// Number of registered listeners
    pub async fn listener_count(&self) -> usize {
        self.listeners.len().await
    }

    /// Record a new attack
    ///
    /// The timestamp is truncated to milliseconds before anything else.
    /// Logs the attack, saves it, then notifies every listener in
    /// registration order before returning. A save failure is returned
    /// unchanged and no listener runs. Listener failures are collected
    /// into `AttackStoreError::Notification`; the attack stays stored.
    pub async fn add_attack(&self, attack: Attack) -> Result<Attack> {
        // Same millisecond resolution on every repository
        let timestamp = attack.timestamp;
        let attack = attack.with_timestamp(timestamp);

        tracing::warn!(
            detection_point = %attack.detection_point.label,
            user = %attack.user.username,
            detection_system_id = %attack.detection_system_id,
            "Security attack {} triggered by user: {}",
            attack.detection_point.label,
            attack.user.username
        );

        self.repository.save(&attack).await?;

        self.listeners
            .notify(&attack)
            .await
            .map_err(|failures| AttackStoreError::Notification {
                attack_id: attack.id.clone(),
                failures,
            })?;

        Ok(attack)
    }

    /// Find every stored attack matching `criteria`
    ///
    /// `None` is rejected with `InvalidArgument` before the repository is
    /// touched. Result order follows the repository and is not part of
    /// the contract.
    pub async fn find_attacks(&self, criteria: Option<&SearchCriteria>) -> Result<Vec<Attack>> {
        let criteria = criteria.ok_or_else(|| {
            AttackStoreError::InvalidArgument("criteria must be non-null".to_string())
        })?;

        let attacks = self.repository.find_all().await?;
        let scanned = attacks.len();
        let matches = criteria.filter(attacks);

        tracing::debug!(scanned, matched = matches.len(), "Attack search completed");
        Ok(matches)
    }

    /// Count matching attacks by detection point and detection system
    pub async fn count_attacks(&self, criteria: Option<&SearchCriteria>) -> Result<AttackCounts> {
        let matches = self.find_attacks(criteria).await?;
        Ok(AttackCounts::tally(&matches))
    }

    /// Total number of stored attacks
    pub async fn total(&self) -> Result<usize> {
        self.repository.count().await
    }
}
