//! The `info.json` manifest

use crate::entry::EntryRef;
use crate::extract::ExtractedFields;
use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Durable record of one archived entry
///
/// `total_battles` is always `wins + losses`: it is computed on construction
/// and a manifest that disagrees is rejected when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawRecord")]
pub struct ArchiveRecord {
    id: String,
    name: String,
    species: String,
    level: u64,
    exp: u64,
    wins: u64,
    losses: u64,
    total_battles: u64,
    hunting_exp: u64,
    description_html: String,
    source_url: String,
}

impl ArchiveRecord {
    /// Assembles the manifest from the entry and its (rewritten) fields
    pub fn new(entry: &EntryRef, fields: ExtractedFields) -> Result<Self, ParseError> {
        let total_battles = fields.total_battles().ok_or(ParseError::TotalOverflow {
            wins: fields.wins,
            losses: fields.losses,
        })?;

        Ok(Self {
            id: entry.id.clone(),
            name: fields.name,
            species: fields.species,
            level: fields.level,
            exp: fields.experience,
            wins: fields.wins,
            losses: fields.losses,
            total_battles,
            hunting_exp: fields.hunting_experience,
            description_html: fields.description_html,
            source_url: entry.url.clone(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    pub fn level(&self) -> u64 {
        self.level
    }

    pub fn exp(&self) -> u64 {
        self.exp
    }

    pub fn wins(&self) -> u64 {
        self.wins
    }

    pub fn losses(&self) -> u64 {
        self.losses
    }

    pub fn total_battles(&self) -> u64 {
        self.total_battles
    }

    pub fn hunting_exp(&self) -> u64 {
        self.hunting_exp
    }

    pub fn description_html(&self) -> &str {
        &self.description_html
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

/// Wire form of the manifest, validated into [`ArchiveRecord`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    id: String,
    name: String,
    species: String,
    level: u64,
    exp: u64,
    wins: u64,
    losses: u64,
    total_battles: u64,
    hunting_exp: u64,
    description_html: String,
    source_url: String,
}

/// A manifest whose derived total does not match its inputs
#[derive(Debug)]
pub struct InconsistentTotal {
    wins: u64,
    losses: u64,
    total_battles: u64,
}

impl fmt::Display for InconsistentTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "totalBattles is {} but wins + losses is {} + {}",
            self.total_battles, self.wins, self.losses
        )
    }
}

impl TryFrom<RawRecord> for ArchiveRecord {
    type Error = InconsistentTotal;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        if raw.wins.checked_add(raw.losses) != Some(raw.total_battles) {
            return Err(InconsistentTotal {
                wins: raw.wins,
                losses: raw.losses,
                total_battles: raw.total_battles,
            });
        }

        Ok(Self {
            id: raw.id,
            name: raw.name,
            species: raw.species,
            level: raw.level,
            exp: raw.exp,
            wins: raw.wins,
            losses: raw.losses,
            total_battles: raw.total_battles,
            hunting_exp: raw.hunting_exp,
            description_html: raw.description_html,
            source_url: raw.source_url,
        })
    }
}
