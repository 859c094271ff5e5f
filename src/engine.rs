//! Pure lifecycle decisions: aggression deltas, state mapping and
//! authorization verdicts. Nothing in this module touches storage, so every
//! rule is testable against plain records.
use super::dragon::{Dragon, DragonState};
use super::encounter::EncounterType;
use super::error::LedgerError;
use super::identity::{Principal, Role};

/// Aggression a dragon enters the ledger with when the caller supplies none.
pub const DEFAULT_AGGRESSION: i64 = 30;
/// At or above this aggression a dragon is flagged `AtRisk`.
pub const AT_RISK_THRESHOLD: i64 = 70;
/// Upper bound on free-text notes, both on encounters and on close.
pub const MAX_NOTES_LEN: usize = 500;

/// Fixed signed aggression change per encounter type.
pub fn aggression_delta(kind: EncounterType) -> i64 {
    match kind {
        EncounterType::Negotiation => -10,
        EncounterType::Bribe => -20,
        EncounterType::Combat => 15,
        EncounterType::Observation => 0,
    }
}

pub fn clamp_aggression(v: i64) -> i64 {
    v.clamp(0, 100)
}

/// State a dragon lands in after an encounter. Never yields `Closed`.
pub fn state_after_encounter(new_aggression: i64, owner_hunter_id: Option<&str>) -> DragonState {
    if new_aggression >= AT_RISK_THRESHOLD {
        DragonState::AtRisk
    } else if owner_hunter_id.is_some() {
        DragonState::InProgress
    } else {
        DragonState::Assigned
    }
}

/// Authorization verdict for one principal acting on one dragon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Forbidden(&'static str),
}

impl Access {
    pub fn require(self) -> Result<(), LedgerError> {
        match self {
            Access::Allowed => Ok(()),
            Access::Forbidden(reason) => Err(LedgerError::Forbidden(reason)),
        }
    }
}

/// Admins may mutate any dragon; hunters only one assigned to them.
pub fn authorize_mutation(dragon: &Dragon, principal: &Principal) -> Access {
    match principal.role {
        Role::Admin => Access::Allowed,
        Role::Hunter => {
            if dragon.owner_hunter_id.as_deref() == Some(principal.id.as_str()) {
                Access::Allowed
            } else {
                Access::Forbidden("dragon is not assigned to this hunter")
            }
        }
    }
}

/// Read gate. Same ownership rule as mutation; listing filters instead.
pub fn can_view(dragon: &Dragon, principal: &Principal) -> bool {
    matches!(authorize_mutation(dragon, principal), Access::Allowed)
}

/// The computed effect of an encounter, decided before any write happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterPlan {
    pub delta: i64,
    pub new_aggression: i64,
    pub new_state: DragonState,
}

/// Decide what recording `kind` against `dragon` would do, or why it must
/// not happen. State check runs before the authorization check so a closed
/// dragon reports `InvalidState` to its owner rather than `Forbidden`.
pub fn plan_encounter(
    dragon: &Dragon,
    principal: &Principal,
    kind: EncounterType,
) -> Result<EncounterPlan, LedgerError> {
    if dragon.is_closed() {
        return Err(LedgerError::InvalidState(
            "cannot record an encounter on a closed dragon",
        ));
    }
    authorize_mutation(dragon, principal).require()?;

    let delta = aggression_delta(kind);
    let new_aggression = clamp_aggression(dragon.aggression + delta);

    Ok(EncounterPlan {
        delta,
        new_aggression,
        new_state: state_after_encounter(new_aggression, dragon.owner_hunter_id.as_deref()),
    })
}

/// Decide whether `principal` may seal `dragon` with a final outcome.
pub fn plan_close(dragon: &Dragon, principal: &Principal) -> Result<(), LedgerError> {
    if dragon.is_closed() {
        return Err(LedgerError::AlreadyClosed);
    }
    authorize_mutation(dragon, principal).require()
}

pub fn validate_notes(notes: Option<&str>) -> Result<(), LedgerError> {
    match notes {
        Some(n) if n.chars().count() > MAX_NOTES_LEN => Err(LedgerError::Validation(format!(
            "notes exceed {MAX_NOTES_LEN} characters"
        ))),
        _ => Ok(()),
    }
}
