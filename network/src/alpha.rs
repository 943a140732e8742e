use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use dlrete_facts::{Fact, FactId};
use dlrete_lexicon::Symbol;

use crate::binding::Bindings;
use crate::condition::{AlphaSignature, ConditionSpec};
use crate::join::JoinNodeId;

pub type AlphaMemoryId = usize;

/// A set of facts matching one condition's constant pattern, plus the
/// bindings its variable keys extract. Node-shared: two conditions with
/// identical signature use the same `AlphaMemoryData`.
pub struct AlphaMemoryData {
    pub signature: AlphaSignature,
    order: Vec<FactId>,
    present: HashSet<FactId>,
    bindings: HashMap<FactId, Bindings>,
    pub downstream: Vec<JoinNodeId>,
}

fn empty_bindings() -> &'static Bindings {
    static EMPTY: OnceLock<Bindings> = OnceLock::new();
    EMPTY.get_or_init(Bindings::new)
}

impl AlphaMemoryData {
    fn new(signature: AlphaSignature) -> Self {
        AlphaMemoryData {
            signature,
            order: Vec::new(),
            present: HashSet::new(),
            bindings: HashMap::new(),
            downstream: Vec::new(),
        }
    }

    pub fn facts(&self) -> impl Iterator<Item = FactId> + '_ {
        self.order.iter().copied()
    }

    pub fn bindings_for(&self, fact_id: FactId) -> &Bindings {
        self.bindings.get(&fact_id).unwrap_or_else(|| empty_bindings())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }
}

/// Verifies a fact against a condition's constant filters (the type
/// constraint is expected to already be one of `cond.constants`, keyed on
/// the store's `type` attribute symbol — see `ConditionSpec::for_type`)
/// and, if it matches, extracts the bound variables.
pub fn match_condition(fact: &Fact, cond: &ConditionSpec) -> Option<Bindings> {
    match_pattern(fact, &cond.constants, &cond.bindings)
}

/// Same check against an already-canonicalized `AlphaSignature`, used on
/// the incremental activation path where only the signature (not the
/// originating `ConditionSpec`) is retained.
pub fn match_signature(fact: &Fact, sig: &AlphaSignature) -> Option<Bindings> {
    match_pattern(fact, &sig.constants, &sig.bindings)
}

fn match_pattern(fact: &Fact, constants: &[(Symbol, dlrete_lexicon::Value)], bindings: &[(Symbol, Symbol)]) -> Option<Bindings> {
    for (key, expected) in constants {
        match fact.get(*key) {
            Some(v) if v == expected => {}
            _ => return None,
        }
    }
    let mut env = Bindings::new();
    for (key, var) in bindings {
        let v = fact.get(*key)?;
        env.insert(*var, v.clone());
    }
    Some(env)
}

/// Registry of alpha memories plus the `type -> candidate alpha ids`
/// dispatch table used to route an incoming fact in O(1) average.
pub struct AlphaNetwork {
    memories: Vec<AlphaMemoryData>,
    by_signature: HashMap<AlphaSignature, AlphaMemoryId>,
    by_type: HashMap<Symbol, Vec<AlphaMemoryId>>,
}

impl Default for AlphaNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl AlphaNetwork {
    pub fn new() -> Self {
        AlphaNetwork {
            memories: Vec::new(),
            by_signature: HashMap::new(),
            by_type: HashMap::new(),
        }
    }

    pub fn get(&self, id: AlphaMemoryId) -> &AlphaMemoryData {
        &self.memories[id]
    }

    pub fn get_mut(&mut self, id: AlphaMemoryId) -> &mut AlphaMemoryData {
        &mut self.memories[id]
    }

    pub fn len(&self) -> usize {
        self.memories.len()
    }

    /// Returns the (possibly freshly created) alpha memory for `cond`'s
    /// signature, and whether it was newly created (for node-sharing
    /// metrics: a cache hit means a node was shared rather than built).
    pub fn get_or_create(&mut self, cond: &ConditionSpec) -> (AlphaMemoryId, bool) {
        let sig = cond.signature();
        if let Some(&id) = self.by_signature.get(&sig) {
            return (id, false);
        }
        let id = self.memories.len();
        self.memories.push(AlphaMemoryData::new(sig.clone()));
        self.by_signature.insert(sig, id);
        self.by_type.entry(cond.type_sym).or_default().push(id);
        (id, true)
    }

    pub fn candidates_for_type(&self, type_sym: Symbol) -> &[AlphaMemoryId] {
        self.by_type.get(&type_sym).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn add_downstream(&mut self, alpha_id: AlphaMemoryId, join_id: JoinNodeId) {
        let mem = &mut self.memories[alpha_id];
        if !mem.downstream.contains(&join_id) {
            mem.downstream.push(join_id);
        }
    }

    /// Insert `fact` into `alpha_id`'s memory if not already present,
    /// returning whether it was newly inserted (the caller already holds
    /// the extracted bindings and supplies them here for storage).
    pub fn insert(&mut self, alpha_id: AlphaMemoryId, fact_id: FactId, env: Bindings) -> bool {
        let mem = &mut self.memories[alpha_id];
        if !mem.present.insert(fact_id) {
            return false;
        }
        mem.order.push(fact_id);
        mem.bindings.insert(fact_id, env);
        true
    }

    pub fn remove(&mut self, alpha_id: AlphaMemoryId, fact_id: FactId) {
        let mem = &mut self.memories[alpha_id];
        if mem.present.remove(&fact_id) {
            mem.order.retain(|f| *f != fact_id);
            mem.bindings.remove(&fact_id);
        }
    }
}
