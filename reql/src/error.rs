use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query syntax error: {0}")]
    Syntax(String),
    #[error("unknown variable `{0}` referenced in projection/HAVING/ORDER BY")]
    UnknownVariable(String),
    #[error("GROUP_CONCAT/aggregate used outside an aggregated projection")]
    MisplacedAggregate,
    #[error(transparent)]
    Network(#[from] dlrete_network::NetworkError),
}
