//! The seam between the pipeline and whatever answers map questions.

use std::future::Future;

use serde::Serialize;

use crate::OracleError;

/// A tool the oracle advertised during [`MapOracle::connect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

/// A natural-language map service.
///
/// Queries are free text ("从A到B的车辆行驶距离") and so are replies; no
/// structure is promised. Implementations hold a live connection between
/// [`connect`](Self::connect) and [`disconnect`](Self::disconnect), and the
/// pipeline only ever issues one query at a time.
pub trait MapOracle: Send {
    /// Opens the connection and returns the tools the service exposes.
    fn connect(
        &mut self,
    ) -> impl Future<Output = Result<Vec<ToolDescriptor>, OracleError>> + Send;

    /// Answers one query with free text.
    fn process_query(
        &mut self,
        query: &str,
    ) -> impl Future<Output = Result<String, OracleError>> + Send;

    /// Releases the connection. Must be safe to call more than once and on
    /// a connection that never opened.
    fn disconnect(&mut self) -> impl Future<Output = ()> + Send;
}
