//! Service layer API for dragon lifecycle and encounter ledger operations
use super::dragon::{Dragon, DragonDraft, DragonOutcome, DragonState, TimeStamp};
use super::encounter::{Encounter, EncounterOutcome, EncounterType};
use super::engine;
use super::error::LedgerError;
use super::identity::{Hunter, Principal, Role};
use super::store;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use std::sync::Arc;

pub struct DragonService {
    instance: Arc<sled::Db>,
    // in future we could add a config for the at-risk threshold
}

/// Fold a sled transaction result back into the crate's error surface.
/// Aborts carry the domain error; storage faults during the transaction roll
/// both writes back and surface as `LedgerError::Storage` with no retry
/// (a retry would double-apply an aggression delta).
fn commit<A>(res: Result<A, TransactionError<LedgerError>>) -> anyhow::Result<A> {
    match res {
        Ok(value) => Ok(value),
        Err(TransactionError::Abort(e)) => Err(e.into()),
        Err(TransactionError::Storage(e)) => Err(LedgerError::Storage(e).into()),
    }
}

impl DragonService {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self { instance }
    }

    /// Register a hunter (or admin) in the directory. Credential handling
    /// lives upstream; the directory only backs assignment and attribution.
    pub fn register_hunter(&self, display_name: &str, role: Role) -> anyhow::Result<Hunter> {
        let hunter = Hunter::new(display_name, role)?;

        self.instance
            .insert(store::hunter_key(&hunter.id).as_bytes(), store::encode(&hunter)?)?;

        tracing::debug!("registered hunter {} ({:?})", hunter.id, hunter.role);
        Ok(hunter)
    }

    pub fn get_hunter(&self, hunter_id: &str) -> anyhow::Result<Hunter> {
        store::load_hunter(&self.instance, hunter_id)?
            .ok_or_else(|| LedgerError::HunterNotFound(hunter_id.to_owned()).into())
    }

    pub fn list_hunters(&self, role: Option<Role>) -> anyhow::Result<Vec<Hunter>> {
        Ok(store::scan_hunters(&self.instance, role)?)
    }

    /// Create a new dragon record. Enters the lifecycle in `Assigned` with
    /// no owner; aggression defaults to 30 when the caller supplies none.
    pub fn create_dragon(
        &self,
        name: &str,
        species_type: &str,
        aggression: Option<i64>,
    ) -> anyhow::Result<Dragon> {
        let mut draft = DragonDraft::new()
            .set_name(name)
            .set_species_type(species_type);
        if let Some(aggression) = aggression {
            draft = draft.set_aggression(aggression);
        }
        let dragon = draft.validate_and_finalise()?;

        self.instance
            .insert(store::dragon_key(&dragon.id).as_bytes(), store::encode(&dragon)?)?;

        tracing::info!("created dragon {} ({})", dragon.id, dragon.species_type);
        Ok(dragon)
    }

    /// Assign a dragon to a hunter. Moves the dragon to `InProgress` even
    /// from `AtRisk` without re-checking aggression, matching the observed
    /// workflow. A closed record stays sealed.
    pub fn assign_dragon(&self, dragon_id: &str, hunter_id: &str) -> anyhow::Result<Dragon> {
        if store::load_hunter(&self.instance, hunter_id)?.is_none() {
            return Err(LedgerError::HunterNotFound(hunter_id.to_owned()).into());
        }

        let key = store::dragon_key(dragon_id);
        let now = TimeStamp::new();

        let result = commit(self.instance.transaction(|tx| {
            let bytes = tx.get(key.as_bytes())?.ok_or_else(|| {
                ConflictableTransactionError::Abort(LedgerError::DragonNotFound(
                    dragon_id.to_owned(),
                ))
            })?;
            let mut dragon: Dragon =
                store::decode(&bytes).map_err(ConflictableTransactionError::Abort)?;

            if dragon.is_closed() {
                return Err(ConflictableTransactionError::Abort(
                    LedgerError::InvalidState("cannot assign a closed dragon"),
                ));
            }

            dragon.owner_hunter_id = Some(hunter_id.to_owned());
            dragon.state = DragonState::InProgress;
            dragon.last_encounter_at = Some(now.clone());

            let encoded = store::encode(&dragon).map_err(ConflictableTransactionError::Abort)?;
            tx.insert(key.as_bytes(), encoded)?;

            Ok(dragon)
        }));

        if let Ok(dragon) = &result {
            tracing::info!("assigned dragon {} to hunter {}", dragon.id, hunter_id);
        }
        result
    }

    /// Clear a dragon's owner. State and aggression are left untouched, so
    /// an `InProgress` dragon does not revert to `Assigned`.
    pub fn unassign_dragon(&self, dragon_id: &str) -> anyhow::Result<Dragon> {
        let key = store::dragon_key(dragon_id);

        commit(self.instance.transaction(|tx| {
            let bytes = tx.get(key.as_bytes())?.ok_or_else(|| {
                ConflictableTransactionError::Abort(LedgerError::DragonNotFound(
                    dragon_id.to_owned(),
                ))
            })?;
            let mut dragon: Dragon =
                store::decode(&bytes).map_err(ConflictableTransactionError::Abort)?;

            if dragon.is_closed() {
                return Err(ConflictableTransactionError::Abort(
                    LedgerError::InvalidState("cannot unassign a closed dragon"),
                ));
            }

            dragon.owner_hunter_id = None;

            let encoded = store::encode(&dragon).map_err(ConflictableTransactionError::Abort)?;
            tx.insert(key.as_bytes(), encoded)?;

            Ok(dragon)
        }))
    }

    /// Record one encounter against a dragon. The ledger append and the
    /// dragon update commit together or not at all; the dragon is re-read
    /// inside the transaction so concurrent encounters on the same dragon
    /// apply their deltas sequentially.
    pub fn record_encounter(
        &self,
        dragon_id: &str,
        performed_by_id: &str,
        performed_by_role: Role,
        kind: EncounterType,
        outcome: Option<EncounterOutcome>,
        notes: Option<&str>,
    ) -> anyhow::Result<(Encounter, Dragon)> {
        engine::validate_notes(notes)?;

        let principal = Principal::new(performed_by_id, performed_by_role);
        let dragon_key = store::dragon_key(dragon_id);
        // minted once; only one transaction attempt ever commits
        let encounter_id = crate::utils::new_encounter_id()?;
        let now = TimeStamp::new();

        let result = commit(self.instance.transaction(|tx| {
            let bytes = tx.get(dragon_key.as_bytes())?.ok_or_else(|| {
                ConflictableTransactionError::Abort(LedgerError::DragonNotFound(
                    dragon_id.to_owned(),
                ))
            })?;
            let mut dragon: Dragon =
                store::decode(&bytes).map_err(ConflictableTransactionError::Abort)?;

            // fail fast before any write
            let plan = engine::plan_encounter(&dragon, &principal, kind)
                .map_err(ConflictableTransactionError::Abort)?;

            let encounter = Encounter {
                id: encounter_id.clone(),
                dragon_id: dragon.id.clone(),
                performed_by_id: principal.id.clone(),
                kind,
                outcome: outcome.unwrap_or_default(),
                aggression_delta: plan.delta,
                notes: notes.map(str::to_owned),
                created_at: now.clone(),
            };

            dragon.aggression = plan.new_aggression;
            dragon.state = plan.new_state;
            dragon.last_encounter_at = Some(now.clone());

            let encounter_bytes =
                store::encode(&encounter).map_err(ConflictableTransactionError::Abort)?;
            let dragon_bytes =
                store::encode(&dragon).map_err(ConflictableTransactionError::Abort)?;

            tx.insert(
                store::encounter_key(dragon_id, &encounter.id).as_bytes(),
                encounter_bytes,
            )?;
            tx.insert(dragon_key.as_bytes(), dragon_bytes)?;

            Ok((encounter, dragon))
        }));

        if let Ok((encounter, dragon)) = &result {
            tracing::info!(
                "recorded {:?} encounter {} on dragon {} (delta {}, aggression {}, state {:?})",
                encounter.kind,
                encounter.id,
                dragon.id,
                encounter.aggression_delta,
                dragon.aggression,
                dragon.state,
            );
        }
        result
    }

    /// Seal a dragon record with a final outcome. Terminal and irreversible.
    pub fn close_dragon(
        &self,
        dragon_id: &str,
        performed_by_id: &str,
        performed_by_role: Role,
        outcome: DragonOutcome,
        notes: Option<&str>,
    ) -> anyhow::Result<Dragon> {
        engine::validate_notes(notes)?;

        let principal = Principal::new(performed_by_id, performed_by_role);
        let key = store::dragon_key(dragon_id);
        let now = TimeStamp::new();

        let result = commit(self.instance.transaction(|tx| {
            let bytes = tx.get(key.as_bytes())?.ok_or_else(|| {
                ConflictableTransactionError::Abort(LedgerError::DragonNotFound(
                    dragon_id.to_owned(),
                ))
            })?;
            let mut dragon: Dragon =
                store::decode(&bytes).map_err(ConflictableTransactionError::Abort)?;

            engine::plan_close(&dragon, &principal).map_err(ConflictableTransactionError::Abort)?;

            dragon.state = DragonState::Closed;
            dragon.outcome = Some(outcome);
            dragon.outcome_notes = notes.map(str::to_owned);
            dragon.closed_at = Some(now.clone());

            let encoded = store::encode(&dragon).map_err(ConflictableTransactionError::Abort)?;
            tx.insert(key.as_bytes(), encoded)?;

            Ok(dragon)
        }));

        if let Ok(dragon) = &result {
            tracing::info!("closed dragon {} with outcome {:?}", dragon.id, outcome);
        }
        result
    }

    /// All dragons visible to the requester, newest-first. For hunters this
    /// is a pure ownership filter, never an error.
    pub fn list_dragons(
        &self,
        requester_id: &str,
        requester_role: Role,
    ) -> anyhow::Result<Vec<Dragon>> {
        let dragons = store::scan_dragons(&self.instance)?;

        Ok(match requester_role {
            Role::Admin => dragons,
            Role::Hunter => dragons
                .into_iter()
                .filter(|d| d.owner_hunter_id.as_deref() == Some(requester_id))
                .collect(),
        })
    }

    pub fn get_dragon(
        &self,
        dragon_id: &str,
        requester_id: &str,
        requester_role: Role,
    ) -> anyhow::Result<Dragon> {
        let dragon = store::load_dragon(&self.instance, dragon_id)?
            .ok_or_else(|| LedgerError::DragonNotFound(dragon_id.to_owned()))?;

        let principal = Principal::new(requester_id, requester_role);
        if !engine::can_view(&dragon, &principal) {
            return Err(LedgerError::Forbidden("dragon is not assigned to this hunter").into());
        }

        Ok(dragon)
    }

    /// The encounter ledger for one dragon, newest-first by creation time.
    pub fn list_encounters(
        &self,
        dragon_id: &str,
        requester_id: &str,
        requester_role: Role,
    ) -> anyhow::Result<Vec<Encounter>> {
        // read gate is the dragon's, the ledger has no acl of its own
        self.get_dragon(dragon_id, requester_id, requester_role)?;

        Ok(store::scan_encounters(&self.instance, dragon_id)?)
    }
}
