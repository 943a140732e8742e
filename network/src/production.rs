use dlrete_facts::FactRecord;
use dlrete_lexicon::{Symbol, Value};

use crate::binding::Bindings;
use crate::join::{BetaMemoryId, ProductionId};

/// A single attribute slot of a derived fact: either a constant or a
/// variable resolved from the firing token's bindings.
#[derive(Clone, Debug)]
pub enum AttrValueSpec {
    Const(Value),
    Var(Symbol),
}

impl AttrValueSpec {
    fn resolve(&self, env: &Bindings) -> Option<Value> {
        match self {
            AttrValueSpec::Const(v) => Some(v.clone()),
            AttrValueSpec::Var(var) => env.get(var).cloned(),
        }
    }
}

/// Template for the fact a production derives when it fires: a `type`
/// plus a set of (key, value-spec) attribute slots.
#[derive(Clone, Debug)]
pub struct ConsequentSpec {
    pub type_key: Symbol,
    pub type_sym: Symbol,
    pub attrs: Vec<(Symbol, AttrValueSpec)>,
}

impl ConsequentSpec {
    pub fn new(type_key: Symbol, type_sym: Symbol) -> Self {
        ConsequentSpec {
            type_key,
            type_sym,
            attrs: Vec::new(),
        }
    }

    pub fn attr(mut self, key: Symbol, spec: AttrValueSpec) -> Self {
        self.attrs.push((key, spec));
        self
    }

    /// Instantiate this template against a firing token's bindings.
    /// Returns `None` if a bound variable slot isn't actually present in
    /// `env` — a malformed template, not a runtime condition, but we
    /// don't panic on it since templates are data, not code.
    pub fn instantiate(&self, env: &Bindings, rule: Symbol) -> Option<FactRecord> {
        let mut attrs = Vec::with_capacity(self.attrs.len() + 1);
        attrs.push((self.type_key, Value::Symbol(self.type_sym)));
        for (key, spec) in &self.attrs {
            attrs.push((*key, spec.resolve(env)?));
        }
        Some(FactRecord::new(attrs).inferred_by(rule))
    }
}

/// What a production does when its conditions are fully satisfied: derive
/// a new fact (the common OWL RL case), or record a match for a query —
/// query compilation reuses the same join network.
#[derive(Clone, Debug)]
pub enum Action {
    Derive(ConsequentSpec),
    RecordQueryMatch { sink: usize },
}

pub struct ProductionData {
    pub id: ProductionId,
    pub name: Symbol,
    pub parent: BetaMemoryId,
    pub action: Action,
    pub fire_count: u64,
}

impl ProductionData {
    pub fn new(id: ProductionId, name: Symbol, parent: BetaMemoryId, action: Action) -> Self {
        ProductionData {
            id,
            name,
            parent,
            action,
            fire_count: 0,
        }
    }
}

pub struct ProductionRegistry {
    productions: Vec<ProductionData>,
}

impl Default for ProductionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductionRegistry {
    pub fn new() -> Self {
        ProductionRegistry {
            productions: Vec::new(),
        }
    }

    pub fn register(&mut self, name: Symbol, parent: BetaMemoryId, action: Action) -> ProductionId {
        let id = self.productions.len();
        self.productions.push(ProductionData::new(id, name, parent, action));
        id
    }

    pub fn get(&self, id: ProductionId) -> &ProductionData {
        &self.productions[id]
    }

    pub fn get_mut(&mut self, id: ProductionId) -> &mut ProductionData {
        &mut self.productions[id]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductionData> {
        self.productions.iter()
    }

    pub fn len(&self) -> usize {
        self.productions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }
}
