//! Core attack types for the a3s-attack-store system
//!
//! All types use camelCase JSON serialization for wire compatibility.
//! Timestamps are encoded as fixed-width UTC strings so that their
//! lexicographic order matches their chronological order.

use crate::error::{AttackStoreError, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Username carried by the unauthenticated sentinel user
pub const ANONYMOUS_USERNAME: &str = "ANONYMOUS";

/// Identity of the actor that triggered a detection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Account name (or `ANONYMOUS` for unauthenticated traffic)
    pub username: String,

    /// Client address the request came from, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl User {
    /// Create a user with no known address
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ip_address: None,
        }
    }

    /// The unauthenticated sentinel user
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_USERNAME)
    }

    /// Attach a client address
    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.username == ANONYMOUS_USERNAME
    }
}

/// The rule or category that fired
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionPoint {
    /// Broad category (e.g., "Input Validation", "Authentication")
    pub category: String,

    /// Human-readable label identifying the rule (e.g., "IE1", "SQLi")
    pub label: String,
}

impl DetectionPoint {
    pub fn new(category: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            label: label.into(),
        }
    }
}

/// A single recorded attack
///
/// Created once by the caller, persisted by the store, and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attack {
    /// Unique attack identifier (atk-<uuid>)
    pub id: String,

    /// Rule that fired
    pub detection_point: DetectionPoint,

    /// Actor that triggered the rule
    pub user: User,

    /// Sensor instance that reported the attack
    pub detection_system_id: String,

    /// When the attack was recorded
    ///
    /// Stored at millisecond resolution; `AttackStore::add_attack`
    /// truncates finer values.
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Attacked resource (URL, endpoint, file), if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

impl Attack {
    /// Create a new attack with auto-generated id and the current time
    pub fn new(
        detection_point: DetectionPoint,
        user: User,
        detection_system_id: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("atk-{}", uuid::Uuid::new_v4()),
            detection_point,
            user,
            detection_system_id: detection_system_id.into(),
            timestamp: Utc::now().trunc_subsecs(3),
            resource: None,
        }
    }

    /// Override the recorded time
    ///
    /// Truncated to millisecond precision, the resolution of the storage format.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp.trunc_subsecs(3);
        self
    }

    /// Attach the attacked resource
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}

/// Query-time filter over stored attacks
///
/// Every field is optional; an absent field imposes no constraint.
/// A record matches when it satisfies all supplied fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// Exact user to match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    /// Detection point to match (compared by label)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_point: Option<DetectionPoint>,

    /// Accepted detection system ids; empty (or null) means any
    #[serde(
        default,
        skip_serializing_if = "BTreeSet::is_empty",
        deserialize_with = "null_as_empty"
    )]
    pub detection_system_ids: BTreeSet<String>,

    /// Exclusive lower time bound
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub earliest: Option<DateTime<Utc>>,
}

impl SearchCriteria {
    /// Criteria with no constraints (matches every record)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_detection_point(mut self, detection_point: DetectionPoint) -> Self {
        self.detection_point = Some(detection_point);
        self
    }

    /// Add one accepted detection system id
    pub fn with_detection_system_id(mut self, id: impl Into<String>) -> Self {
        self.detection_system_ids.insert(id.into());
        self
    }

    /// Add several accepted detection system ids
    pub fn with_detection_system_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.detection_system_ids
            .extend(ids.into_iter().map(Into::into));
        self
    }

    /// Only match records strictly after `earliest`
    pub fn with_earliest(mut self, earliest: DateTime<Utc>) -> Self {
        self.earliest = Some(earliest);
        self
    }

    /// True when no field constrains the result
    pub fn is_unconstrained(&self) -> bool {
        self.user.is_none()
            && self.detection_point.is_none()
            && self.detection_system_ids.is_empty()
            && self.earliest.is_none()
    }
}

/// Attack counts for a match set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackCounts {
    /// Counts per detection point label
    pub detection_points: HashMap<String, u64>,

    /// Counts per detection system id
    pub detection_systems: HashMap<String, u64>,

    /// Total attack count
    pub total: u64,
}

impl AttackCounts {
    /// Tally a set of attacks
    pub fn tally<'a>(attacks: impl IntoIterator<Item = &'a Attack>) -> Self {
        let mut counts = Self::default();
        for attack in attacks {
            *counts
                .detection_points
                .entry(attack.detection_point.label.clone())
                .or_insert(0) += 1;
            *counts
                .detection_systems
                .entry(attack.detection_system_id.clone())
                .or_insert(0) += 1;
            counts.total += 1;
        }
        counts
    }
}

fn null_as_empty<'de, D>(d: D) -> std::result::Result<BTreeSet<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<BTreeSet<String>>::deserialize(d)?.unwrap_or_default())
}

/// Render a timestamp in the fixed storage format (`YYYY-MM-DDTHH:MM:SS.mmmZ`)
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a timestamp string in the storage format or any RFC 3339 form
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            AttackStoreError::InvalidArgument(format!("invalid timestamp '{}': {}", value, e))
        })
}

/// Serde adapter for the fixed timestamp format
pub(crate) mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            ts: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => super::serialize(ts, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(d)?
                .map(|raw| super::super::parse_timestamp(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
