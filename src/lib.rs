//! # a3s-attack-store
//!
//! Append-only attack record store with listener notification and
//! criteria search for the A3S security stack.
//!
//! ## Overview
//!
//! Detection systems report attacks (a detection point firing for a user)
//! to an `AttackStore`. The store persists each attack through a pluggable
//! `AttackRepository`, then notifies every registered listener before the
//! call returns. Queries filter the full record set by user, detection
//! point, detection system ids, and an exclusive earliest time bound.
//!
//! ## Quick Start
//!
//! ```rust
//! use a3s_attack_store::{Attack, AttackStore, DetectionPoint, SearchCriteria, User};
//! use a3s_attack_store::repository::memory::MemoryRepository;
//!
//! # async fn example() -> a3s_attack_store::Result<()> {
//! let store = AttackStore::new(MemoryRepository::new());
//!
//! store
//!     .add_attack(Attack::new(
//!         DetectionPoint::new("Input Validation", "IE1"),
//!         User::new("alice"),
//!         "sensor-eu-1",
//!     ))
//!     .await?;
//!
//! let criteria = SearchCriteria::new().with_detection_system_id("sensor-eu-1");
//! let attacks = store.find_attacks(Some(&criteria)).await?;
//! assert_eq!(attacks.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Repositories
//!
//! - **memory**: In-memory repository for testing and single-process use
//! - **file**: Append-only JSON Lines file
//!
//! ## Architecture
//!
//! - **AttackRepository** trait: durable storage all backends implement
//! - **ListenerRegistry**: generic ordered listener dispatch
//! - **AttackStore**: records, notifies, and searches attacks
//! - **SearchCriteria**: optional multi-field filter

pub mod config;
mod criteria;
pub mod error;
pub mod notify;
pub mod repository;
pub mod store;
pub mod types;

// Re-export core types
pub use config::{RepositoryConfig, StoreConfig};
pub use error::{AttackStoreError, ListenerFailure, Result};
pub use notify::{FnListener, Listener, ListenerRegistry};
pub use repository::AttackRepository;
pub use store::{AttackListener, AttackStore};
pub use types::{
    format_timestamp, parse_timestamp, Attack, AttackCounts, DetectionPoint, SearchCriteria,
    User, ANONYMOUS_USERNAME,
};

// Re-export repositories for convenience
pub use repository::file::FileRepository;
pub use repository::memory::MemoryRepository;
