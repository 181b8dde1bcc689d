use thiserror::Error;

/// Failures reported by a [`crate::MapOracle`] implementation.
///
/// Inside a resolution run every variant is recovered per pair and retried;
/// only [`crate::with_session`] turns a connect failure into a hard error.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The oracle endpoint could not be reached or rejected the handshake.
    #[error("oracle connection failed: {0}")]
    Connect(String),

    #[error("oracle is not connected")]
    NotConnected,

    /// Network or HTTP-level failure while a query was in flight.
    #[error("oracle transport error: {0}")]
    Transport(String),

    /// The oracle answered, but not in a shape the caller understands.
    #[error("oracle protocol error: {0}")]
    Protocol(String),

    #[error("oracle query exceeded the run deadline")]
    DeadlineExceeded,
}

/// Setup-time failures of a resolution session.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not open map oracle session: {0}")]
    Connect(#[source] OracleError),
}
