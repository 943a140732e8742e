//! The on-disk payload shape. Bumping `FORMAT_VERSION` is a breaking
//! change — `load` refuses to read a mismatched version rather than
//! guessing at a migration.

use dlrete_facts::{Fact, SourceLocation};
use serde::{Deserialize, Serialize};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
pub struct SnapshotData {
    pub version: u32,
    /// Id -> name, in id order, matching `SymbolTable::export_all`.
    pub symbols: Vec<(u32, String)>,
    /// Every live fact, asserted and derived alike; provenance on each
    /// `Fact` distinguishes the two.
    pub facts: Vec<Fact>,
    /// Fingerprint -> source location, for facts an ingestion pipeline
    /// tagged with a file position.
    pub provenance_locations: Vec<(u64, SourceLocation)>,
}
