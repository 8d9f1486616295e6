//! Predicate evaluation for `SearchCriteria`
//!
//! Each field of the criteria is an independent check. A check whose
//! field is absent (or an empty id set) passes every record. A record
//! matches only when all four checks pass.

use crate::types::{Attack, SearchCriteria};

impl SearchCriteria {
    /// Whether `attack` satisfies every supplied field of these criteria
    pub fn matches(&self, attack: &Attack) -> bool {
        self.user_matches(attack)
            && self.detection_system_matches(attack)
            && self.detection_point_matches(attack)
            && self.earliest_matches(attack)
    }

    /// Exact user equality
    pub fn user_matches(&self, attack: &Attack) -> bool {
        self.user.as_ref().map_or(true, |user| *user == attack.user)
    }

    /// Membership of the reporting system in the accepted id set
    pub fn detection_system_matches(&self, attack: &Attack) -> bool {
        self.detection_system_ids.is_empty()
            || self
                .detection_system_ids
                .contains(&attack.detection_system_id)
    }

    /// Detection point equality by label
    pub fn detection_point_matches(&self, attack: &Attack) -> bool {
        self.detection_point
            .as_ref()
            .map_or(true, |point| point.label == attack.detection_point.label)
    }

    /// Record strictly after the lower bound
    pub fn earliest_matches(&self, attack: &Attack) -> bool {
        self.earliest
            .map_or(true, |earliest| earliest < attack.timestamp)
    }

    /// Retain the matching attacks, preserving input order
    pub fn filter(&self, attacks: Vec<Attack>) -> Vec<Attack> {
        if self.is_unconstrained() {
            return attacks;
        }
        attacks.into_iter().filter(|a| self.matches(a)).collect()
    }
}
