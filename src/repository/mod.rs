//! Attack repository trait: the durable-storage abstraction
//!
//! All storage backends (in-memory, JSON Lines file, databases, etc.)
//! implement `AttackRepository`. The `AttackStore` performs every query
//! predicate itself, so a backend only needs to append a record and
//! return the complete record set.

use crate::error::Result;
use crate::types::Attack;
use async_trait::async_trait;

pub mod file;
pub mod memory;

/// Core trait for attack storage backends
///
/// Implementations are responsible for their own write atomicity: a
/// concurrent `find_all` must never observe a partially-written record.
#[async_trait]
pub trait AttackRepository: Send + Sync {
    /// Durably append an attack
    async fn save(&self, attack: &Attack) -> Result<()>;

    /// Load every stored attack
    async fn find_all(&self) -> Result<Vec<Attack>>;

    /// Repository name (e.g., "memory", "file")
    fn name(&self) -> &str;

    /// Number of stored attacks
    ///
    /// Default implementation loads every record. Backends that track a
    /// count should override this.
    async fn count(&self) -> Result<usize> {
        self.find_all().await.map(|attacks| attacks.len())
    }
}
