//! Type definitions for the escalation desk
//! Wire shapes of the wallet API plus the operator-side value types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Freeze status of a wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FreezeState {
    /// Wallet can transact
    Active,
    /// Wallet is blocked by an administrative freeze
    Frozen,
}

impl FreezeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FreezeState::Active => "ACTIVE",
            FreezeState::Frozen => "FROZEN",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            FreezeState::Active => "🔓",
            FreezeState::Frozen => "🔒",
        }
    }
}

/// A tracked wallet as returned by the API.
///
/// Only the most recent unfreeze is carried; no transition history is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub address: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default, deserialize_with = "score::deserialize")]
    pub risk_score: u8,
    #[serde(default)]
    pub is_frozen: bool,
    #[serde(default)]
    pub frozen_by: Option<String>,
    #[serde(default)]
    pub freeze_reason: Option<String>,
    #[serde(default, with = "timestamp")]
    pub frozen_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub unfrozen_by: Option<String>,
    #[serde(default)]
    pub unfreeze_reason: Option<String>,
    #[serde(default, with = "timestamp")]
    pub unfrozen_at: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

impl Wallet {
    pub fn freeze_state(&self) -> FreezeState {
        if self.is_frozen {
            FreezeState::Frozen
        } else {
            FreezeState::Active
        }
    }
}

/// Evidence linked to a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: i64,
    #[serde(default)]
    pub evidence_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub uploaded_by: Option<String>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

impl EvidenceItem {
    /// Display identifier: the human evidence id when present, else the row id
    pub fn display_id(&self) -> String {
        self.evidence_id
            .clone()
            .unwrap_or_else(|| format!("EV-{:03}", self.id))
    }
}

/// Transaction-level fraud aggregate attached to a search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudAnalysis {
    pub total_transactions: u64,
    pub fraud_count: u64,
    pub normal_count: u64,
    pub fraud_percentage: f64,
    pub risk_level: String,
    #[serde(default)]
    pub predictions_available: bool,
}

/// Search result: wallet record plus aggregated risk data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletData {
    pub wallet: Wallet,
    #[serde(default, deserialize_with = "score::deserialize")]
    pub risk_score: u8,
    #[serde(default)]
    pub ml_tags: Vec<String>,
    #[serde(default)]
    pub evidence: Vec<EvidenceItem>,
    #[serde(default)]
    pub complaints: Vec<serde_json::Value>,
    #[serde(default)]
    pub incident_reports: Vec<serde_json::Value>,
    #[serde(default)]
    pub complaints_count: u64,
    #[serde(default)]
    pub incident_reports_count: u64,
    #[serde(default)]
    pub evidence_count: u64,
    #[serde(default)]
    pub fraud_analysis: Option<FraudAnalysis>,
}

impl WalletData {
    /// Effective risk score: aggregate score, falling back to the wallet's own
    pub fn effective_risk_score(&self) -> u8 {
        if self.risk_score > 0 {
            self.risk_score
        } else {
            self.wallet.risk_score
        }
    }
}

/// Row of the frozen-wallets list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrozenWalletEntry {
    pub id: i64,
    pub address: String,
    #[serde(default, deserialize_with = "score::deserialize")]
    pub risk_score: u8,
    #[serde(default)]
    pub frozen_by: Option<String>,
    #[serde(default)]
    pub freeze_reason: Option<String>,
    #[serde(default, with = "timestamp")]
    pub frozen_at: Option<NaiveDateTime>,
}

/// Row of the unfrozen-wallets list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnfrozenWalletEntry {
    pub id: i64,
    pub address: String,
    #[serde(default, deserialize_with = "score::deserialize")]
    pub risk_score: u8,
    #[serde(default)]
    pub unfrozen_by: Option<String>,
    #[serde(default)]
    pub unfreeze_reason: Option<String>,
    #[serde(default, with = "timestamp")]
    pub unfrozen_at: Option<NaiveDateTime>,
}

/// Body of POST /wallets/{id}/freeze
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreezeRequest {
    pub freeze_reason: String,
    pub frozen_by: String,
}

/// Body of POST /wallets/{id}/unfreeze
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnfreezeRequest {
    pub unfreeze_reason: String,
    pub unfrozen_by: String,
}

/// Server confirmation of a freeze or unfreeze
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreezeAck {
    pub id: i64,
    #[serde(default)]
    pub address: Option<String>,
    pub is_frozen: bool,
    #[serde(default)]
    pub frozen_by: Option<String>,
    #[serde(default)]
    pub freeze_reason: Option<String>,
    #[serde(default, with = "timestamp")]
    pub frozen_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub unfrozen_by: Option<String>,
    #[serde(default)]
    pub unfreeze_reason: Option<String>,
    #[serde(default, with = "timestamp")]
    pub unfrozen_at: Option<NaiveDateTime>,
}

/// Operator performing an action. Passed explicitly into every mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor(String);

impl Actor {
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Police station reference data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoliceStation {
    pub name: String,
    pub zone: String,
    pub designation: String,
    pub mobile: String,
    pub email: String,
    pub telephone: String,
    pub location: String,
    pub specialization: String,
}

/// Lenient ISO-8601 timestamps: the API emits naive local times, but offsets
/// are accepted and normalized to UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(raw, FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
    }

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) => parse(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", s))),
        }
    }
}

/// Risk scores arrive as 0-100 integers or as 0.0-1.0 model probabilities.
/// Both are normalized to a 0-100 integer; null reads as 0.
pub(crate) mod score {
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;

    struct ScoreVisitor;

    fn clamp(value: f64) -> u8 {
        value.round().clamp(0.0, 100.0) as u8
    }

    impl<'de> Visitor<'de> for ScoreVisitor {
        type Value = u8;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a risk score between 0 and 100 or a probability between 0 and 1")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u8, E> {
            Ok(v.min(100) as u8)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u8, E> {
            Ok(v.clamp(0, 100) as u8)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u8, E> {
            if !v.is_finite() {
                return Err(E::custom(format!("invalid risk score {}", v)));
            }
            if (0.0..=1.0).contains(&v) {
                Ok(clamp(v * 100.0))
            } else {
                Ok(clamp(v))
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<u8, E> {
            Ok(0)
        }

        fn visit_none<E: de::Error>(self) -> Result<u8, E> {
            Ok(0)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<u8, D::Error> {
            d.deserialize_any(ScoreVisitor)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(ScoreVisitor)
    }
}
