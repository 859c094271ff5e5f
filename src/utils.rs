//! Identifier minting: uuid7 ids encoded as bech32 with a record-kind prefix

use bech32::Bech32m;
use uuid7::uuid7;

// construct a unique id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

pub fn new_dragon_id() -> anyhow::Result<String> {
    new_uuid_to_bech32("drgn")
}

pub fn new_hunter_id() -> anyhow::Result<String> {
    new_uuid_to_bech32("hunt")
}

pub fn new_encounter_id() -> anyhow::Result<String> {
    new_uuid_to_bech32("enc")
}
