use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Network(#[from] dlrete_network::NetworkError),
    #[error(transparent)]
    Query(#[from] dlrete_reql::error::QueryError),
    #[error(transparent)]
    Snapshot(#[from] dlrete_snapshot::SnapshotError),
}
