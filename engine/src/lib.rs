//! The public facade: one [`Engine`] owns a network, its installed OWL RL
//! productions, and the interned vocabulary queries compile against. This
//! is the composing layer the CLI (and anything else embedding the
//! reasoner) is written against instead of reaching into `network`/`reql`
//! directly.

pub mod config;
pub mod error;
#[cfg(test)]
mod tests;

use std::path::Path;

use dlrete_facts::{Fact, FactId, FactRecord};
use dlrete_lexicon::{Symbol, SymbolTable, Value};
use dlrete_network::{Network, NetworkMetrics};
use dlrete_reql::result::QueryResult;
use dlrete_templates::{install_owl_rl, Vocab};
use tracing::info;

pub use config::Config;
pub use error::EngineError;

type ProgressCallback = Box<dyn FnMut(usize, usize, &str)>;

pub struct Engine {
    net: Network,
    vocab: Vocab,
    config: Config,
    progress: Option<ProgressCallback>,
}

impl Engine {
    pub fn new(config: Config) -> Result<Self, EngineError> {
        let symbols = SymbolTable::new();
        let mut net = Network::new(symbols).with_divergence_budget(config.divergence_budget as u64);
        let vocab = install_owl_rl(&mut net)?;
        Ok(Engine { net, vocab, config, progress: None })
    }

    /// Restore a previously saved network and reinstall the OWL RL
    /// production catalogue, exactly as a fresh [`Engine::new`] would —
    /// `snapshot::load` only repopulates facts, it never recompiles rules.
    pub fn load(path: &Path, config: Config) -> Result<Self, EngineError> {
        let mut net = dlrete_snapshot::load(path)?.with_divergence_budget(config.divergence_budget as u64);
        let vocab = install_owl_rl(&mut net)?;
        Ok(Engine { net, vocab, config, progress: None })
    }

    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        dlrete_snapshot::save(&self.net, path)?;
        Ok(())
    }

    /// Register a callback invoked at bulk-ingestion boundaries — once
    /// before a batch starts and once after it settles.
    pub fn set_progress_callback(&mut self, cb: impl FnMut(usize, usize, &str) + 'static) {
        self.progress = Some(Box::new(cb));
    }

    pub fn symbols(&self) -> &SymbolTable {
        self.net.symbols()
    }

    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn add_fact(&mut self, record: FactRecord) -> Result<(FactId, bool), EngineError> {
        Ok(self.net.add_fact(record)?)
    }

    pub fn remove_fact(&mut self, fact_id: FactId) -> Option<Fact> {
        self.net.remove_fact(fact_id)
    }

    pub fn add_facts_batch(&mut self, records: Vec<FactRecord>) -> Result<Vec<FactId>, EngineError> {
        let total = records.len();
        if let Some(cb) = self.progress.as_mut() {
            cb(0, total, "loading");
        }
        let ids = self.net.add_facts_batch(records)?;
        if let Some(cb) = self.progress.as_mut() {
            cb(total, total, "done");
        }
        Ok(ids)
    }

    /// Run a graph-pattern query. `timeout_ms` of `0` falls back to
    /// [`Config::default_query_timeout_ms`], itself `0` meaning "no
    /// deadline" unless the caller overrides it.
    pub fn query(&mut self, text: &str, timeout_ms: u64) -> Result<QueryResult, EngineError> {
        let timeout_ms = if timeout_ms == 0 { self.config.default_query_timeout_ms } else { timeout_ms };
        Ok(dlrete_reql::query(&mut self.net, &self.vocab, text, timeout_ms)?)
    }

    /// The fast path for a constant-valued partial fact template: no
    /// parsing, no join compilation, just an index probe.
    pub fn query_by_record_pattern(&mut self, constants: &[(Symbol, Value)]) -> QueryResult {
        let ids = self.net.facts_mut().lookup_by_pattern(constants);
        let mut columns: Vec<Symbol> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let facts: Vec<&Fact> = ids.iter().filter_map(|id| self.net.facts().get(*id)).collect();
        for f in &facts {
            for (k, _) in &f.attrs {
                if seen.insert(*k) {
                    columns.push(*k);
                }
            }
        }
        let symbols = self.net.symbols();
        let names: Vec<String> = columns.iter().map(|s| symbols.name(*s).to_string()).collect();
        let rows: Vec<Vec<Value>> = facts
            .iter()
            .map(|f| columns.iter().map(|k| f.get(*k).cloned().unwrap_or(Value::Null)).collect())
            .collect();
        QueryResult::new(names, rows)
    }

    pub fn instances_of(&self, class: Symbol) -> QueryResult {
        dlrete_reql::helpers::instances_of(self.net.facts(), &self.vocab, class)
    }

    pub fn property_value(&self, subject: Symbol, property: Symbol) -> QueryResult {
        dlrete_reql::helpers::property_value(self.net.facts(), &self.vocab, subject, property)
    }

    pub fn related(&self, property: Symbol) -> QueryResult {
        dlrete_reql::helpers::related(self.net.facts(), &self.vocab, property)
    }

    pub fn instances_with_property(&self, class: Symbol, property: Symbol) -> QueryResult {
        dlrete_reql::helpers::instances_with_property(self.net.facts(), &self.vocab, class, property)
    }

    pub fn all_assertions_of(&self, property: Symbol) -> QueryResult {
        dlrete_reql::helpers::all_assertions_of(self.net.facts(), &self.vocab, property)
    }

    pub fn get_metrics(&self) -> &NetworkMetrics {
        self.net.metrics()
    }

    pub fn print_metrics(&self) {
        let m = self.net.metrics();
        info!(
            alpha_memories = m.alpha_memories,
            alpha_sharing_ratio = m.alpha_sharing_ratio(),
            join_nodes = m.join_nodes,
            join_sharing_ratio = m.join_sharing_ratio(),
            join_nodes_cartesian = m.join_nodes_cartesian,
            productions = m.productions,
            facts_live = m.facts_live,
            fixpoint_runs = m.fixpoint_runs,
            divergence_aborts = m.divergence_aborts,
            "network metrics"
        );
    }

    /// Whether the `strict` flag is set and the store contains any
    /// un-retracted `inconsistency`/`violation` fact — the CLI's exit
    /// code hook.
    pub fn has_strict_violation(&self) -> bool {
        if !self.config.strict {
            return false;
        }
        let inconsistency = self.net.symbols().intern("inconsistency");
        let violation = self.net.symbols().intern("violation");
        self.net.facts().iter().any(|f| {
            let ty = f.type_value(self.vocab.type_key);
            ty == Some(inconsistency) || ty == Some(violation)
        })
    }
}
