//! Snapshot save/load: the symbol table and fact store serialize to a
//! single bincode payload, written atomically (temp file in the target
//! directory, then renamed over the destination) so a crash or a
//! concurrent reader never observes a half-written file.
//!
//! `load` only repopulates the fact store — it does not recompile OWL
//! RL productions. The caller (the engine facade) installs the template
//! catalogue afterward exactly as it would for a fresh network; since
//! `compile_production` seeds each alpha/join memory from whatever is
//! already in the fact store, this rebuilds every index and support
//! entry from scratch rather than persisting them directly, and dedupes
//! against the already-restored facts by fingerprint as it reseeds.

pub mod error;
pub mod format;
#[cfg(test)]
mod tests;

use std::io::Write;
use std::path::Path;

use dlrete_facts::SourceLocation;
use dlrete_lexicon::SymbolTable;
use dlrete_network::Network;
use tracing::{debug, info};

pub use error::SnapshotError;
use format::{SnapshotData, FORMAT_VERSION};

/// Serialize `net`'s symbol table and fact store to `path`, replacing
/// any existing file only once the new content is fully flushed.
pub fn save(net: &Network, path: &Path) -> Result<(), SnapshotError> {
    let symbols = net.symbols().export_all();
    let facts: Vec<_> = net.facts().iter().cloned().collect();
    let provenance_locations: Vec<_> = net
        .facts()
        .provenance_entries()
        .map(|(fp, loc)| (*fp, loc.clone()))
        .collect();

    let data = SnapshotData {
        version: FORMAT_VERSION,
        symbols,
        facts,
        provenance_locations,
    };
    let bytes = bincode::serialize(&data)?;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    info!(path = %path.display(), facts = data.facts.len(), "wrote snapshot");
    Ok(())
}

/// Read a snapshot into a fresh `Network` — symbol table and facts are
/// restored with their original ids, fingerprints and provenance intact,
/// but no productions are compiled yet.
pub fn load(path: &Path) -> Result<Network, SnapshotError> {
    let bytes = std::fs::read(path)?;
    let data: SnapshotData = bincode::deserialize(&bytes)?;
    if data.version != FORMAT_VERSION {
        return Err(SnapshotError::VersionMismatch { found: data.version, expected: FORMAT_VERSION });
    }

    let symbols = SymbolTable::new();
    symbols.restore_all(&data.symbols);

    let mut net = Network::new(symbols);
    for fact in data.facts {
        net.facts_mut().restore_fact(fact);
    }
    for (fingerprint, loc) in data.provenance_locations {
        net.facts_mut().set_provenance_location(fingerprint, loc);
    }

    debug!(path = %path.display(), facts = net.facts().len(), "restored snapshot");
    Ok(net)
}

/// Record a source-location tag for the fact with this fingerprint, for
/// callers (bulk ingestion) that want it captured before the next save.
pub fn tag_provenance(net: &mut Network, fingerprint: u64, loc: SourceLocation) {
    net.facts_mut().set_provenance_location(fingerprint, loc);
}
