use std::collections::HashMap;

use dlrete_facts::FactId;
use dlrete_lexicon::Value;

use crate::alpha::AlphaMemoryId;
use crate::binding::{merge, Bindings};
use crate::condition::ConditionSpec;
use crate::filter::{FilterExpr, JoinTest};

pub type JoinNodeId = usize;
pub type BetaMemoryId = usize;
pub type TokenId = usize;
pub type ProductionId = usize;

/// A join-node memory element: the facts matched so far plus the merged
/// binding environment. Stored as a single cumulative environment rather
/// than per-fact environments — equivalent for our purposes, since a
/// variable once bound is never rebound to a different value by a
/// well-formed join chain.
#[derive(Clone, Debug)]
pub struct Token {
    pub facts: Vec<FactId>,
    pub env: Bindings,
}

/// Left parent of a join node: either the synthetic "dummy top" memory
/// (for a production's first condition) or a real beta memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LeftParent {
    Dummy,
    Beta(BetaMemoryId),
}

pub struct BetaMemoryData {
    /// Tombstoned rather than compacted on retraction: a join downstream
    /// of this memory indexes left tokens by `TokenId` in its
    /// `left_index`, and compacting would shift every id after the
    /// removed one, silently invalidating that index.
    tokens: Vec<Option<Token>>,
    live: usize,
    present: std::collections::HashSet<Vec<FactId>>,
    pub downstream_joins: Vec<JoinNodeId>,
    pub downstream_productions: Vec<ProductionId>,
    /// Reverse index: fact id -> tokens that include it, used to cascade
    /// retraction when a supporting fact is removed.
    by_fact: HashMap<FactId, Vec<TokenId>>,
}

impl BetaMemoryData {
    fn new() -> Self {
        BetaMemoryData {
            tokens: Vec::new(),
            live: 0,
            present: std::collections::HashSet::new(),
            downstream_joins: Vec::new(),
            downstream_productions: Vec::new(),
            by_fact: HashMap::new(),
        }
    }

    /// Live tokens only, in insertion order; tombstoned slots are skipped.
    /// Does not preserve `TokenId`s — callers needing a specific id should
    /// use `get`.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> + '_ {
        self.tokens.iter().filter_map(|slot| slot.as_ref())
    }

    /// Look up a token by the stable id `insert` returned, `None` if it
    /// was since retracted.
    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(id).and_then(|slot| slot.as_ref())
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn add_downstream_join(&mut self, join_id: JoinNodeId) {
        if !self.downstream_joins.contains(&join_id) {
            self.downstream_joins.push(join_id);
        }
    }

    pub fn add_downstream_production(&mut self, prod_id: ProductionId) {
        if !self.downstream_productions.contains(&prod_id) {
            self.downstream_productions.push(prod_id);
        }
    }

    /// Insert a token if its supporting fact tuple isn't already present
    /// (defends against re-deriving the same join result via a different
    /// activation order). Returns the new token's id if inserted.
    pub fn insert(&mut self, token: Token) -> Option<TokenId> {
        if !self.present.insert(token.facts.clone()) {
            return None;
        }
        let id = self.tokens.len();
        for f in &token.facts {
            self.by_fact.entry(*f).or_default().push(id);
        }
        self.tokens.push(Some(token));
        self.live += 1;
        Some(id)
    }

    /// Remove every token supported by `fact_id`, returning their ids in
    /// removal order (reverse propagation order is the caller's
    /// responsibility: remove from the deepest beta memory first).
    /// Slots are tombstoned in place, never compacted, so every other
    /// token's `TokenId` — and any `left_index` entry referencing it —
    /// stays valid.
    pub fn retract_fact(&mut self, fact_id: FactId) -> Vec<Token> {
        let Some(ids) = self.by_fact.remove(&fact_id) else {
            return Vec::new();
        };
        let mut removed = Vec::with_capacity(ids.len());
        for idx in ids {
            if let Some(tok) = self.tokens.get_mut(idx).and_then(|slot| slot.take()) {
                self.present.remove(&tok.facts);
                self.live -= 1;
                removed.push(tok);
            }
        }
        removed
    }
}

/// A multi-way join step: left parent (beta memory or dummy top) joined
/// against an alpha memory's facts, gated by named-binding tests and
/// built-in filters.
pub struct JoinNodeData {
    pub left: LeftParent,
    pub right: AlphaMemoryId,
    pub tests: Vec<JoinTest>,
    pub filters: Vec<FilterExpr>,
    pub condition: ConditionSpec,
    pub output: BetaMemoryId,
    /// Index of left tokens by the values of the Eq-test left variables,
    /// used when a new right-side fact arrives. Empty key (no Eq tests)
    /// means every left token is a candidate — the degenerate/Cartesian
    /// case, tracked in metrics.
    left_index: HashMap<Vec<Value>, Vec<TokenId>>,
    pub is_cartesian: bool,
}

impl JoinNodeData {
    pub fn new(
        left: LeftParent,
        right: AlphaMemoryId,
        tests: Vec<JoinTest>,
        filters: Vec<FilterExpr>,
        condition: ConditionSpec,
        output: BetaMemoryId,
    ) -> Self {
        let has_eq_test = tests.iter().any(|t| matches!(t.op, crate::filter::JoinTestOp::Eq));
        // A join against the dummy top has at most one left token, so the
        // lack of an Eq test there is not the O(n*m) hazard it is between
        // two real beta/alpha memories.
        let is_cartesian = !has_eq_test && !matches!(left, LeftParent::Dummy);
        JoinNodeData {
            left,
            right,
            tests,
            filters,
            condition,
            output,
            left_index: HashMap::new(),
            is_cartesian,
        }
    }

    fn eq_key(&self, env: &Bindings) -> Option<Vec<Value>> {
        let mut key = Vec::new();
        for t in &self.tests {
            if matches!(t.op, crate::filter::JoinTestOp::Eq) {
                key.push(env.get(&t.left_var)?.clone());
            }
        }
        Some(key)
    }

    pub fn index_left_token(&mut self, token_id: TokenId, env: &Bindings) {
        if let Some(key) = self.eq_key(env) {
            self.left_index.entry(key).or_default().push(token_id);
        }
    }

    /// Candidate left token ids for a new right-side fact's bindings.
    /// `None` means "no Eq index available for this env" (degenerate
    /// join) — caller should fall back to scanning every left token id
    /// the parent beta memory currently holds.
    pub fn candidates_for_right(&self, right_env: &Bindings) -> Option<&[TokenId]> {
        if self.tests.iter().all(|t| !matches!(t.op, crate::filter::JoinTestOp::Eq)) {
            return None;
        }
        let mut key = Vec::new();
        for t in &self.tests {
            if matches!(t.op, crate::filter::JoinTestOp::Eq) {
                key.push(right_env.get(&t.right_var)?.clone());
            }
        }
        self.left_index.get(&key).map(|v| v.as_slice())
    }

    pub fn all_tests_hold(&self, left_env: &Bindings, right_env: &Bindings) -> bool {
        self.tests.iter().all(|t| t.holds(left_env, right_env))
    }

    pub fn all_filters_hold(&self, merged: &Bindings) -> bool {
        self.filters.iter().all(|f| f.eval_or_false(merged))
    }

    pub fn combine(&self, left: &Token, right_fact: FactId, right_env: &Bindings) -> Token {
        let mut facts = left.facts.clone();
        facts.push(right_fact);
        let env = merge(&left.env, right_env);
        Token { facts, env }
    }
}

pub struct BetaNetwork {
    joins: Vec<JoinNodeData>,
    beta_memories: Vec<BetaMemoryData>,
    join_sharing: HashMap<JoinShareKey, JoinNodeId>,
}

#[derive(PartialEq, Eq, Hash)]
struct JoinShareKey {
    left: LeftParent,
    right: AlphaMemoryId,
    tests: Vec<JoinTest>,
    filters: Vec<FilterExpr>,
}

impl Default for BetaNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl BetaNetwork {
    pub fn new() -> Self {
        BetaNetwork {
            joins: Vec::new(),
            beta_memories: Vec::new(),
            join_sharing: HashMap::new(),
        }
    }

    pub fn join(&self, id: JoinNodeId) -> &JoinNodeData {
        &self.joins[id]
    }

    pub fn join_mut(&mut self, id: JoinNodeId) -> &mut JoinNodeData {
        &mut self.joins[id]
    }

    pub fn beta(&self, id: BetaMemoryId) -> &BetaMemoryData {
        &self.beta_memories[id]
    }

    pub fn beta_mut(&mut self, id: BetaMemoryId) -> &mut BetaMemoryData {
        &mut self.beta_memories[id]
    }

    pub fn join_count(&self) -> usize {
        self.joins.len()
    }

    pub fn beta_count(&self) -> usize {
        self.beta_memories.len()
    }

    fn new_beta_memory(&mut self) -> BetaMemoryId {
        let id = self.beta_memories.len();
        self.beta_memories.push(BetaMemoryData::new());
        id
    }

    /// Returns (join id, its output beta memory id, whether freshly
    /// created). Two productions whose leading k conditions are identical
    /// share the first k join/beta nodes, because `left`/`right`/`tests`/
    /// `filters` together uniquely determine a join's share key.
    pub fn get_or_create_join(
        &mut self,
        left: LeftParent,
        right: AlphaMemoryId,
        tests: Vec<JoinTest>,
        filters: Vec<FilterExpr>,
        condition: ConditionSpec,
    ) -> (JoinNodeId, BetaMemoryId, bool) {
        let key = JoinShareKey {
            left,
            right,
            tests: tests.clone(),
            filters: filters.clone(),
        };
        if let Some(&id) = self.join_sharing.get(&key) {
            return (id, self.joins[id].output, false);
        }
        let output = self.new_beta_memory();
        let id = self.joins.len();
        self.joins
            .push(JoinNodeData::new(left, right, tests, filters, condition, output));
        self.join_sharing.insert(key, id);
        (id, output, true)
    }
}
