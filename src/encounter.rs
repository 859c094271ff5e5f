//! Append-only encounter ledger records
use super::dragon::TimeStamp;
use chrono::Utc;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterType {
    #[n(0)]
    Negotiation,
    #[n(1)]
    Combat,
    #[n(2)]
    Bribe,
    #[n(3)]
    Observation,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncounterOutcome {
    #[n(0)]
    Success,
    #[n(1)]
    #[default]
    Neutral,
    #[n(2)]
    Fail,
}

/// One interaction with a dragon. Written exactly once by the transaction
/// coordinator, never mutated or deleted afterwards. `aggression_delta` is
/// the signed change applied at creation time, kept for audit and never
/// recomputed from `kind`.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq)]
pub struct Encounter {
    #[n(0)]
    pub id: String, // uuid7 as bech32, `enc1...`
    #[n(1)]
    pub dragon_id: String,
    #[n(2)]
    pub performed_by_id: String,
    #[n(3)]
    pub kind: EncounterType,
    #[n(4)]
    pub outcome: EncounterOutcome,
    #[n(5)]
    pub aggression_delta: i64,
    #[n(6)]
    pub notes: Option<String>,
    #[n(7)]
    pub created_at: TimeStamp<Utc>,
}
