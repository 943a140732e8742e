/// Tunables that don't belong on individual calls: how much runaway rule
/// firing to tolerate before giving up, how long an unspecified query may
/// run before it's handed back truncated, and whether the CLI's exit code
/// should reflect an un-retracted `inconsistency` fact.
#[derive(Clone, Debug)]
pub struct Config {
    pub divergence_budget: u32,
    pub default_query_timeout_ms: u64,
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            divergence_budget: 10_000,
            default_query_timeout_ms: 0,
            strict: false,
        }
    }
}
