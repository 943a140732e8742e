//! The RETE propagation network: alpha/beta/join memories, production
//! registry, and the incremental activation engine that keeps them
//! consistent as facts are asserted and retracted.

pub mod alpha;
pub mod binding;
pub mod condition;
mod engine;
pub mod filter;
pub mod join;
pub mod metrics;
pub mod production;
#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet, VecDeque};

use dlrete_facts::{FactError, FactId, FactStore};
use dlrete_lexicon::{Symbol, SymbolTable};
use thiserror::Error;
use tracing::debug;

pub use alpha::{AlphaMemoryId, AlphaNetwork};
pub use binding::Bindings;
pub use condition::{AlphaSignature, ConditionSpec};
pub use filter::{ArithOp, CompareOp, ConstValue, FilterExpr, JoinTest, JoinTestOp, Operand, StrOp};
pub use join::{BetaMemoryId, BetaNetwork, JoinNodeId, LeftParent, Token, TokenId};
pub use metrics::NetworkMetrics;
pub use production::{Action, AttrValueSpec, ConsequentSpec, ProductionData, ProductionRegistry};

pub type ProductionId = join::ProductionId;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error(transparent)]
    Fact(#[from] FactError),
    #[error("propagation exceeded divergence budget of {budget} activations; likely a non-terminating rule set")]
    DivergenceBudgetExceeded { budget: u64 },
}

/// Support key a production firing is indexed under: the production and
/// the exact set of facts whose join produced it. Two different tokens
/// (even under the same production) can derive the same fact — the
/// derived fact survives as long as at least one support remains.
type SupportKey = (ProductionId, Vec<FactId>);

/// Owns the fact store and the whole compiled network: alpha memories,
/// join/beta memories, and productions. Fact mutation and propagation
/// happen through the same struct so retraction can cascade synchronously
/// within one fixpoint loop, without callbacks across crate boundaries.
pub struct Network {
    facts: FactStore,
    alpha: AlphaNetwork,
    beta: BetaNetwork,
    productions: ProductionRegistry,
    metrics: NetworkMetrics,
    divergence_budget: u64,
    queue: VecDeque<engine::Activation>,
    pending_support: Vec<(SupportKey, dlrete_facts::FactRecord)>,
    pending_retractions: VecDeque<FactId>,
    support_index: HashMap<SupportKey, FactId>,
    derived_support: HashMap<FactId, HashSet<SupportKey>>,
    query_matches: HashMap<usize, Vec<Bindings>>,
}

impl Network {
    pub fn new(symbols: SymbolTable) -> Self {
        Network {
            facts: FactStore::new(symbols),
            alpha: AlphaNetwork::new(),
            beta: BetaNetwork::new(),
            productions: ProductionRegistry::new(),
            metrics: NetworkMetrics::default(),
            divergence_budget: 10_000,
            queue: VecDeque::new(),
            pending_support: Vec::new(),
            pending_retractions: VecDeque::new(),
            support_index: HashMap::new(),
            derived_support: HashMap::new(),
            query_matches: HashMap::new(),
        }
    }

    pub fn with_divergence_budget(mut self, budget: u64) -> Self {
        self.divergence_budget = budget;
        self
    }

    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    pub fn facts_mut(&mut self) -> &mut FactStore {
        &mut self.facts
    }

    pub fn symbols(&self) -> &SymbolTable {
        self.facts.symbols()
    }

    pub fn alpha(&self) -> &AlphaNetwork {
        &self.alpha
    }

    pub fn beta(&self) -> &BetaNetwork {
        &self.beta
    }

    pub fn productions(&self) -> &ProductionRegistry {
        &self.productions
    }

    pub fn metrics(&self) -> &NetworkMetrics {
        &self.metrics
    }

    pub fn take_query_matches(&mut self, sink: usize) -> Vec<Bindings> {
        self.query_matches.remove(&sink).unwrap_or_default()
    }

    /// Register a production: a chain of conditions, one join-step
    /// descriptor per condition (tests/filters evaluated when that
    /// condition is joined against the accumulated left token; the first
    /// step's `tests` are ignored since there is no left token yet, but
    /// its `filters` still apply to the lone condition's own bindings),
    /// and the action to run when a token reaches the end of the chain.
    ///
    /// Alpha memories and join/beta nodes are shared with any
    /// previously-compiled production whose leading conditions are
    /// structurally identical, and are seeded against facts already in
    /// the store so rules can be compiled lazily after data is loaded.
    pub fn compile_production(
        &mut self,
        name: Symbol,
        conditions: Vec<ConditionSpec>,
        joins: Vec<(Vec<JoinTest>, Vec<FilterExpr>)>,
        action: Action,
    ) -> Result<ProductionId, NetworkError> {
        assert_eq!(conditions.len(), joins.len(), "one join-step descriptor per condition");
        let mut left = LeftParent::Dummy;
        let mut final_beta = None;
        for (cond, (tests, filters)) in conditions.iter().zip(joins.into_iter()) {
            let (alpha_id, alpha_new) = self.alpha.get_or_create(cond);
            if alpha_new {
                self.metrics.alpha_memories += 1;
                self.seed_alpha(alpha_id, cond);
            } else {
                self.metrics.alpha_memories_shared += 1;
            }
            let (join_id, beta_id, join_new) =
                self.beta.get_or_create_join(left, alpha_id, tests, filters, cond.clone());
            self.alpha.add_downstream(alpha_id, join_id);
            if let LeftParent::Beta(parent_beta) = left {
                self.beta.beta_mut(parent_beta).add_downstream_join(join_id);
            }
            if join_new {
                self.metrics.join_nodes += 1;
                self.metrics.beta_memories += 1;
                if self.beta.join(join_id).is_cartesian {
                    self.metrics.join_nodes_cartesian += 1;
                }
                self.seed_join(join_id);
            } else {
                self.metrics.join_nodes_shared += 1;
            }
            left = LeftParent::Beta(beta_id);
            final_beta = Some(beta_id);
        }
        let final_beta = final_beta.expect("at least one condition");
        let prod_id = self.productions.register(name, final_beta, action);
        self.beta.beta_mut(final_beta).add_downstream_production(prod_id);
        self.metrics.productions += 1;
        debug!(production = ?name, beta = final_beta, "compiled production");

        // Newly attached: any tokens already sitting in the final beta
        // memory (from seeding above) fire immediately.
        let existing: Vec<Token> = self.beta.beta(final_beta).tokens().cloned().collect();
        for token in existing {
            self.fire(prod_id, &token);
        }
        self.run_fixpoint()?;
        Ok(prod_id)
    }
}
