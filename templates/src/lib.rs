//! The OWL 2 RL + SWRL rule template catalogue: fixed-arity entailments
//! compiled into [`dlrete_network::Network`] productions, plus an
//! imperative pass (`structural`) for the handful of rules whose body
//! ranges over a variable-length member list.
//!
//! [`install_owl_rl`] is the single entry point: it interns the shared
//! vocabulary, compiles every fixed-arity production, and runs the
//! structural pass once against whatever facts are already loaded.
//! Callers that load data in batches after installation should call
//! [`structural::run_all`] again themselves — compiled productions stay
//! live and keep propagating incrementally, but the structural pass
//! does not re-trigger itself.

pub mod cax;
pub mod cls;
pub mod eq;
pub mod prp;
pub mod scm;
pub mod structural;
#[cfg(test)]
mod tests;
pub mod val;
pub mod vocab;

use dlrete_lexicon::SymbolTable;
use dlrete_network::{Network, NetworkError};
use tracing::debug;

pub use vocab::Vocab;

/// Compile the full OWL 2 RL + SWRL-relevant template catalogue into
/// `net` and run the structural pass once. Returns the interned
/// [`Vocab`] so callers (query compilation, the CLI's ontology loader)
/// can refer to the same fact-type and attribute symbols without
/// re-interning strings themselves.
pub fn install_owl_rl(net: &mut Network) -> Result<Vocab, NetworkError> {
    let symbols = net.symbols().clone();
    let v = Vocab::new(&symbols);

    cax::install(net, &symbols, &v)?;
    cls::install(net, &symbols, &v)?;
    prp::install(net, &symbols, &v)?;
    eq::install(net, &symbols, &v)?;
    scm::install(net, &symbols, &v)?;
    val::install(net, &symbols, &v)?;
    structural::run_all(net, &symbols, &v)?;

    debug!(productions = net.productions().len(), "installed OWL 2 RL template catalogue");
    Ok(v)
}
