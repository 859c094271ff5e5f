//! Key layout and CBOR plumbing for the sled keyspace.
//!
//! Everything lives in the default tree under a record-kind prefix:
//! `dragon:<id>`, `enc:<dragon_id>:<encounter_id>` and `hunter:<id>`.
//! Keeping dragons and their ledger rows in one tree is what lets the
//! transaction coordinator commit both sides of an encounter as one unit.
use super::dragon::Dragon;
use super::encounter::Encounter;
use super::error::LedgerError;
use super::identity::{Hunter, Role};

pub const DRAGON_PREFIX: &str = "dragon:";
pub const ENCOUNTER_PREFIX: &str = "enc:";
pub const HUNTER_PREFIX: &str = "hunter:";

pub fn dragon_key(dragon_id: &str) -> String {
    format!("{DRAGON_PREFIX}{dragon_id}")
}

pub fn encounter_scan_prefix(dragon_id: &str) -> String {
    format!("{ENCOUNTER_PREFIX}{dragon_id}:")
}

pub fn encounter_key(dragon_id: &str, encounter_id: &str) -> String {
    format!("{ENCOUNTER_PREFIX}{dragon_id}:{encounter_id}")
}

pub fn hunter_key(hunter_id: &str) -> String {
    format!("{HUNTER_PREFIX}{hunter_id}")
}

pub fn encode<T>(value: &T) -> Result<Vec<u8>, LedgerError>
where
    T: minicbor::Encode<()>,
{
    minicbor::to_vec(value).map_err(|e| LedgerError::Codec(e.to_string()))
}

pub fn decode<T>(bytes: &[u8]) -> Result<T, LedgerError>
where
    T: for<'b> minicbor::Decode<'b, ()>,
{
    minicbor::decode(bytes).map_err(|e| LedgerError::Codec(e.to_string()))
}

pub fn load_dragon(db: &sled::Db, dragon_id: &str) -> Result<Option<Dragon>, LedgerError> {
    match db.get(dragon_key(dragon_id).as_bytes())? {
        Some(bytes) => Ok(Some(decode(&bytes)?)),
        None => Ok(None),
    }
}

pub fn load_hunter(db: &sled::Db, hunter_id: &str) -> Result<Option<Hunter>, LedgerError> {
    match db.get(hunter_key(hunter_id).as_bytes())? {
        Some(bytes) => Ok(Some(decode(&bytes)?)),
        None => Ok(None),
    }
}

/// All dragons, newest-first by creation time.
pub fn scan_dragons(db: &sled::Db) -> Result<Vec<Dragon>, LedgerError> {
    let mut dragons = Vec::new();
    for entry in db.scan_prefix(DRAGON_PREFIX.as_bytes()) {
        let (_, bytes) = entry?;
        dragons.push(decode::<Dragon>(&bytes)?);
    }
    // bech32 keys do not sort chronologically, so order on the record itself
    dragons.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(dragons)
}

/// The ledger for one dragon, newest-first by creation time.
pub fn scan_encounters(db: &sled::Db, dragon_id: &str) -> Result<Vec<Encounter>, LedgerError> {
    let mut encounters = Vec::new();
    for entry in db.scan_prefix(encounter_scan_prefix(dragon_id).as_bytes()) {
        let (_, bytes) = entry?;
        encounters.push(decode::<Encounter>(&bytes)?);
    }
    encounters.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(encounters)
}

/// Hunter directory, optionally filtered by role, newest-first.
pub fn scan_hunters(db: &sled::Db, role: Option<Role>) -> Result<Vec<Hunter>, LedgerError> {
    let mut hunters = Vec::new();
    for entry in db.scan_prefix(HUNTER_PREFIX.as_bytes()) {
        let (_, bytes) = entry?;
        let hunter = decode::<Hunter>(&bytes)?;
        if role.is_none_or(|r| hunter.role == r) {
            hunters.push(hunter);
        }
    }
    hunters.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(hunters)
}
