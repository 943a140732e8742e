use std::collections::HashMap;

use dlrete_lexicon::{Symbol, Value};

/// A binding environment: variable symbol -> value. Cloned on each join
/// step; environments are small (one entry per distinct pattern variable)
/// so this is cheap relative to the hashing work the join already does.
pub type Bindings = HashMap<Symbol, Value>;

pub fn merge(base: &Bindings, extra: &Bindings) -> Bindings {
    let mut out = base.clone();
    out.extend(extra.iter().map(|(k, v)| (*k, v.clone())));
    out
}
