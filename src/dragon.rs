//! Core dragon record and lifecycle state types
use super::error::LedgerError;
use super::utils;
use chrono::{DateTime, TimeZone, Utc};

/// Lifecycle state of a dragon record. `Closed` is terminal.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragonState {
    #[n(0)]
    Assigned,
    #[n(1)]
    InProgress,
    #[n(2)]
    AtRisk,
    #[n(3)]
    Closed,
}

/// Final outcome sealed into a dragon record on close.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragonOutcome {
    #[n(0)]
    Domesticated,
    #[n(1)]
    OneTimeDeal,
    #[n(2)]
    Eliminated,
}

// Ord is implemented by hand below: deriving it would demand `T: Ord`,
// which chrono's `Utc` marker does not provide.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .unwrap()
            .into()
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

// key is `dragon:<id>`, value is this struct encoded into cbor
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq)]
pub struct Dragon {
    #[n(0)]
    pub id: String, // uuid7 as bech32, `drgn1...`
    #[n(1)]
    pub name: String,
    #[n(2)]
    pub species_type: String,
    #[n(3)]
    pub aggression: i64, // always within [0, 100]
    #[n(4)]
    pub state: DragonState,
    #[n(5)]
    pub owner_hunter_id: Option<String>, // lookup key only, None = unassigned
    #[n(6)]
    pub outcome: Option<DragonOutcome>, // Some iff state == Closed
    #[n(7)]
    pub outcome_notes: Option<String>,
    #[n(8)]
    pub last_encounter_at: Option<TimeStamp<Utc>>,
    #[n(9)]
    pub closed_at: Option<TimeStamp<Utc>>,
    #[n(10)]
    pub created_at: TimeStamp<Utc>,
}

// Used for constructing new dragon records before they touch storage
#[derive(Debug, Default)]
pub struct DragonDraft {
    name: Option<String>,
    species_type: Option<String>,
    aggression: Option<i64>,
}

impl DragonDraft {
    /// Construct a new builder object, this becomes the basis for a draft
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }
    pub fn set_species_type(mut self, species_type: &str) -> Self {
        self.species_type = Some(species_type.to_owned());
        self
    }
    pub fn set_aggression(mut self, aggression: i64) -> Self {
        self.aggression = Some(aggression);
        self
    }
    // Checks fields, mints an id and returns the record ready for its first insert
    pub fn validate_and_finalise(&self) -> anyhow::Result<Dragon> {
        let name = match self.name.as_deref() {
            Some(n) if !n.trim().is_empty() => n.to_owned(),
            _ => return Err(LedgerError::Validation("name is required".into()).into()),
        };
        let species_type = match self.species_type.as_deref() {
            Some(s) if !s.trim().is_empty() => s.to_owned(),
            _ => return Err(LedgerError::Validation("species_type is required".into()).into()),
        };
        let aggression = self.aggression.unwrap_or(crate::engine::DEFAULT_AGGRESSION);
        if !(0..=100).contains(&aggression) {
            return Err(LedgerError::Validation(format!(
                "aggression {aggression} is outside [0, 100]"
            ))
            .into());
        }

        Ok(Dragon {
            id: utils::new_dragon_id()?,
            name,
            species_type,
            aggression,
            state: DragonState::Assigned,
            owner_hunter_id: None,
            outcome: None,
            outcome_notes: None,
            last_encounter_at: None,
            closed_at: None,
            created_at: TimeStamp::new(),
        })
    }
}

impl Dragon {
    pub fn is_closed(&self) -> bool {
        self.state == DragonState::Closed
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}
impl PartialOrd for TimeStamp<Utc> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for TimeStamp<Utc> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}
impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}
impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}
