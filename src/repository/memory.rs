//! In-memory attack repository
//!
//! Keeps attacks in a `Vec` behind a `tokio::sync::RwLock`. Suitable
//! for tests and single-process deployments; contents are lost on drop.

use super::AttackRepository;
use crate::error::Result;
use crate::types::Attack;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-memory attack repository
#[derive(Default)]
pub struct MemoryRepository {
    attacks: RwLock<Vec<Attack>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with `attacks`
    pub fn with_attacks(attacks: Vec<Attack>) -> Self {
        Self {
            attacks: RwLock::new(attacks),
        }
    }
}

#[async_trait]
impl AttackRepository for MemoryRepository {
    async fn save(&self, attack: &Attack) -> Result<()> {
        let mut attacks = self.attacks.write().await;
        attacks.push(attack.clone());

        tracing::debug!(
            attack_id = %attack.id,
            total = attacks.len(),
            "Attack saved to memory"
        );
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Attack>> {
        Ok(self.attacks.read().await.clone())
    }

    fn name(&self) -> &str {
        "memory"
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.attacks.read().await.len())
    }
}
