use dlrete_facts::{Fact, FactId, FactRecord};

use crate::alpha::{match_signature, AlphaMemoryId};
use crate::join::{JoinNodeId, LeftParent, Token};
use crate::production::Action;
use crate::{ConditionSpec, Network, NetworkError, ProductionId};

/// A unit of pending propagation work. Kept as data on an explicit queue
/// rather than recursive calls so a long derivation chain can't blow the
/// Rust call stack and so the divergence budget can be checked once per
/// step regardless of how deep the rule graph is.
pub(crate) enum Activation {
    /// A fact was (newly) inserted into an alpha memory that feeds `join_id`.
    RightActivate { join_id: JoinNodeId, fact_id: FactId },
    /// A token was (newly) inserted into the beta memory that feeds `join_id`
    /// on its left side.
    LeftActivate { join_id: JoinNodeId, token: Token },
}

impl Network {
    /// Insert a single fact and run the network to a fixpoint, returning
    /// its id. `is_new` tells the caller whether this triggered any
    /// propagation at all (a duplicate assertion is a no-op).
    pub fn add_fact(&mut self, record: FactRecord) -> Result<(FactId, bool), NetworkError> {
        let (fact_id, is_new) = self.facts.add(record)?;
        if is_new {
            self.metrics.facts_live = self.facts.len();
            self.activate_fact(fact_id);
            self.run_fixpoint()?;
        }
        Ok((fact_id, is_new))
    }

    /// Insert many facts before running a single shared fixpoint, which is
    /// considerably cheaper than fixpointing after each one when loading a
    /// batch of ground facts.
    pub fn add_facts_batch(&mut self, records: Vec<FactRecord>) -> Result<Vec<FactId>, NetworkError> {
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            let (fact_id, is_new) = self.facts.add(record)?;
            ids.push(fact_id);
            if is_new {
                self.activate_fact(fact_id);
            }
        }
        self.metrics.facts_live = self.facts.len();
        self.run_fixpoint()?;
        Ok(ids)
    }

    /// Remove a fact and retract every token (at any join depth) that was
    /// built using it, cascading to any derived facts whose last support
    /// disappears as a result.
    pub fn remove_fact(&mut self, fact_id: FactId) -> Option<Fact> {
        let fact = self.facts.remove(fact_id)?;
        self.pending_retractions.push_back(fact_id);
        self.drain_retractions();
        self.metrics.facts_live = self.facts.len();
        Some(fact)
    }

    fn drain_retractions(&mut self) {
        while let Some(fact_id) = self.pending_retractions.pop_front() {
            for alpha_id in 0..self.alpha.len() {
                self.alpha.remove(alpha_id, fact_id);
            }
            for beta_id in 0..self.beta.beta_count() {
                let removed = self.beta.beta_mut(beta_id).retract_fact(fact_id);
                if removed.is_empty() {
                    continue;
                }
                let prod_ids = self.beta.beta(beta_id).downstream_productions.clone();
                for token in &removed {
                    for prod_id in &prod_ids {
                        self.unsupport(*prod_id, token);
                    }
                }
            }
        }
    }

    /// Drop one support for `prod_id` firing on `token`. If that was the
    /// derived fact's last remaining support and it was never separately
    /// asserted, queue it for retraction too.
    fn unsupport(&mut self, prod_id: ProductionId, token: &Token) {
        let key = (prod_id, token.facts.clone());
        let Some(derived_id) = self.support_index.remove(&key) else {
            return;
        };
        let still_supported = match self.derived_support.get_mut(&derived_id) {
            Some(set) => {
                set.remove(&key);
                !set.is_empty()
            }
            None => false,
        };
        if still_supported {
            return;
        }
        self.derived_support.remove(&derived_id);
        let asserted = self
            .facts
            .provenance_for(derived_id)
            .map(|p| p.asserted)
            .unwrap_or(false);
        if !asserted {
            self.pending_retractions.push_back(derived_id);
            self.facts.remove(derived_id);
        }
    }

    /// Populate a freshly created alpha memory from facts already in the
    /// store, so compiling a production after data is loaded still finds
    /// its matches instead of only reacting to future inserts.
    pub(crate) fn seed_alpha(&mut self, alpha_id: AlphaMemoryId, cond: &ConditionSpec) {
        let candidates = self.facts.lookup_by_pattern(&cond.constants);
        for fact_id in candidates {
            let Some(fact) = self.facts.get(fact_id) else { continue };
            if let Some(env) = match_signature(fact, &self.alpha.get(alpha_id).signature) {
                self.alpha.insert(alpha_id, fact_id, env);
            }
        }
    }

    /// Populate a freshly created join's output beta memory from whatever
    /// is already sitting in its left and right parents.
    pub(crate) fn seed_join(&mut self, join_id: JoinNodeId) {
        let left_tokens = self.left_tokens(self.beta.join(join_id).left);
        let right_facts = self.right_facts_of(join_id);
        for left in &left_tokens {
            self.join_left_against_all_right(join_id, left, &right_facts);
        }
    }

    fn right_facts_of(&self, join_id: JoinNodeId) -> Vec<(FactId, crate::Bindings)> {
        let alpha_id = self.beta.join(join_id).right;
        let mem = self.alpha.get(alpha_id);
        mem.facts().map(|fid| (fid, mem.bindings_for(fid).clone())).collect()
    }

    fn left_tokens(&self, left: LeftParent) -> Vec<Token> {
        match left {
            LeftParent::Dummy => vec![Token {
                facts: Vec::new(),
                env: crate::Bindings::new(),
            }],
            LeftParent::Beta(id) => self.beta.beta(id).tokens().cloned().collect(),
        }
    }

    fn join_left_against_all_right(&mut self, join_id: JoinNodeId, left: &Token, right_facts: &[(FactId, crate::Bindings)]) {
        for (fact_id, right_env) in right_facts {
            self.try_combine(join_id, left, *fact_id, right_env);
        }
    }

    fn try_combine(&mut self, join_id: JoinNodeId, left: &Token, fact_id: FactId, right_env: &crate::Bindings) {
        let join = self.beta.join(join_id);
        if !join.all_tests_hold(&left.env, right_env) {
            return;
        }
        let token = join.combine(left, fact_id, right_env);
        if !join.all_filters_hold(&token.env) {
            return;
        }
        let output = join.output;
        if let Some(token_id) = self.beta.beta_mut(output).insert(token.clone()) {
            self.metrics.tokens_live += 1;
            for downstream in self.beta.beta(output).downstream_joins.clone() {
                self.beta.join_mut(downstream).index_left_token(token_id, &token.env);
                self.queue.push_back(Activation::LeftActivate {
                    join_id: downstream,
                    token: token.clone(),
                });
            }
            let prod_ids = self.beta.beta(output).downstream_productions.clone();
            for prod_id in prod_ids {
                self.fire(prod_id, &token);
            }
        }
    }

    fn activate_fact(&mut self, fact_id: FactId) {
        let Some(fact) = self.facts.get(fact_id) else { return };
        let Some(type_sym) = fact.type_value(self.facts.type_key()) else { return };
        let alpha_ids: Vec<AlphaMemoryId> = self.alpha.candidates_for_type(type_sym).to_vec();
        for alpha_id in alpha_ids {
            let sig = self.alpha.get(alpha_id).signature.clone();
            let Some(env) = match_signature(fact, &sig) else { continue };
            if self.alpha.insert(alpha_id, fact_id, env) {
                for join_id in self.alpha.get(alpha_id).downstream.clone() {
                    self.queue.push_back(Activation::RightActivate { join_id, fact_id });
                }
            }
        }
    }

    pub(crate) fn fire(&mut self, prod_id: ProductionId, token: &Token) {
        let action = self.productions.get(prod_id).action.clone_for_fire();
        self.productions.get_mut(prod_id).fire_count += 1;
        match action {
            FireAction::Derive(spec) => {
                let name = self.productions.get(prod_id).name;
                if let Some(record) = spec.instantiate(&token.env, name) {
                    let key = (prod_id, token.facts.clone());
                    self.pending_support.push((key, record));
                }
            }
            FireAction::RecordQueryMatch { sink } => {
                self.query_matches.entry(sink).or_default().push(token.env.clone());
            }
        }
    }

    pub(crate) fn run_fixpoint(&mut self) -> Result<(), NetworkError> {
        let mut steps = 0u64;
        loop {
            if let Some(act) = self.queue.pop_front() {
                steps += 1;
                if steps > self.divergence_budget {
                    self.queue.clear();
                    self.pending_support.clear();
                    self.metrics.divergence_aborts += 1;
                    return Err(NetworkError::DivergenceBudgetExceeded {
                        budget: self.divergence_budget,
                    });
                }
                self.metrics.activations_processed += 1;
                self.process(act);
                continue;
            }
            if let Some((key, record)) = self.pending_support.pop() {
                let (fact_id, is_new) = self.facts.add(record)?;
                self.support_index.insert(key.clone(), fact_id);
                self.derived_support.entry(fact_id).or_default().insert(key);
                if is_new {
                    self.metrics.facts_live = self.facts.len();
                    self.activate_fact(fact_id);
                }
                continue;
            }
            break;
        }
        self.metrics.fixpoint_runs += 1;
        Ok(())
    }

    fn process(&mut self, act: Activation) {
        match act {
            Activation::RightActivate { join_id, fact_id } => {
                let join = self.beta.join(join_id);
                let right_env = self.alpha.get(join.right).bindings_for(fact_id).clone();
                let candidate_ids = join.candidates_for_right(&right_env).map(|s| s.to_vec());
                let left_tokens: Vec<Token> = match candidate_ids {
                    Some(ids) => {
                        let left_beta = match join.left {
                            LeftParent::Beta(id) => id,
                            LeftParent::Dummy => unreachable!("dummy left has no Eq-indexed candidates"),
                        };
                        ids.into_iter()
                            .filter_map(|tid| self.beta.beta(left_beta).get(tid).cloned())
                            .collect()
                    }
                    None => self.left_tokens(join.left),
                };
                for left in &left_tokens {
                    self.try_combine(join_id, left, fact_id, &right_env);
                }
            }
            Activation::LeftActivate { join_id, token } => {
                let right_facts = self.right_facts_of(join_id);
                self.join_left_against_all_right(join_id, &token, &right_facts);
            }
        }
    }
}

/// Cloned view of an `Action` usable without holding a borrow of the
/// production registry while facts are being added.
enum FireAction {
    Derive(crate::ConsequentSpec),
    RecordQueryMatch { sink: usize },
}

impl Action {
    fn clone_for_fire(&self) -> FireAction {
        match self {
            Action::Derive(spec) => FireAction::Derive(spec.clone()),
            Action::RecordQueryMatch { sink } => FireAction::RecordQueryMatch { sink: *sink },
        }
    }
}
