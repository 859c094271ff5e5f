//! Principals and the hunter directory
use super::dragon::TimeStamp;
use super::error::LedgerError;
use super::utils;
use chrono::Utc;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    #[n(0)]
    Admin,
    #[n(1)]
    Hunter,
}

/// The authenticated caller of an operation. Credential checks happen
/// upstream; the core only ever sees the resulting id and role.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}

// key is `hunter:<id>`, value is this struct encoded into cbor
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq)]
pub struct Hunter {
    #[n(0)]
    pub id: String, // uuid7 as bech32, `hunt1...`
    #[n(1)]
    pub display_name: String,
    #[n(2)]
    pub role: Role,
    #[n(3)]
    pub created_at: TimeStamp<Utc>,
}

impl Hunter {
    pub fn new(display_name: &str, role: Role) -> anyhow::Result<Self> {
        if display_name.trim().is_empty() {
            return Err(LedgerError::Validation("display_name is required".into()).into());
        }

        Ok(Self {
            id: utils::new_hunter_id()?,
            display_name: display_name.to_owned(),
            role,
            created_at: TimeStamp::new(),
        })
    }

    pub fn as_principal(&self) -> Principal {
        Principal::new(self.id.clone(), self.role)
    }
}
