use dlrete_lexicon::{Symbol, Value};

/// One production condition: a typed template matching facts of
/// `type_sym`, with a set of constant-valued attribute filters and a set
/// of attributes bound to pattern variables.
#[derive(Clone, Debug)]
pub struct ConditionSpec {
    pub type_sym: Symbol,
    pub constants: Vec<(Symbol, Value)>,
    pub bindings: Vec<(Symbol, Symbol)>,
}

impl ConditionSpec {
    pub fn new(type_sym: Symbol) -> Self {
        ConditionSpec {
            type_sym,
            constants: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Build a condition for facts of `type_sym`, with the `type` filter
    /// already installed as a constant so `match_condition` needs no
    /// special-cased type check.
    pub fn for_type(type_key: Symbol, type_sym: Symbol) -> Self {
        ConditionSpec::new(type_sym).constant(type_key, Value::Symbol(type_sym))
    }

    pub fn constant(mut self, key: Symbol, value: Value) -> Self {
        self.constants.push((key, value));
        self
    }

    pub fn bind(mut self, key: Symbol, var: Symbol) -> Self {
        self.bindings.push((key, var));
        self
    }

    /// The canonical signature two conditions share an alpha memory under:
    /// same type, same constant filters, same variable bindings —
    /// independent of the order they were declared in.
    pub fn signature(&self) -> AlphaSignature {
        let mut constants = self.constants.clone();
        constants.sort_by_key(|(k, _)| k.as_u32());
        let mut bindings = self.bindings.clone();
        bindings.sort_by_key(|(k, _)| k.as_u32());
        AlphaSignature {
            type_sym: self.type_sym,
            constants,
            bindings,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AlphaSignature {
    pub type_sym: Symbol,
    pub constants: Vec<(Symbol, Value)>,
    pub bindings: Vec<(Symbol, Symbol)>,
}
