//! Distance resolution against a natural-language map oracle.
//!
//! The oracle answers free-text questions ("从A到B的车辆行驶距离") with free
//! text. [`DistanceExtractor`] turns those replies into kilometres and
//! minutes, [`TextLocationResolver`] geocodes place names, and
//! [`DistancePipeline`] drives both across many origin/warehouse pairs with
//! per-pair retries. A failing pair never aborts a run: it shows up in the
//! report as a failed [`DistanceResult`].

pub mod error;
pub mod extract;
pub mod oracle;
pub mod pipeline;
pub mod report;
pub mod resolve;

mod retry;

pub use error::{OracleError, PipelineError};
pub use extract::{DistanceExtractor, Extraction, ExtractionStatus};
pub use oracle::{MapOracle, ToolDescriptor};
pub use pipeline::{with_session, DistancePipeline, PipelineOptions};
pub use report::{DistanceResult, Endpoint, OriginReport, PairReport};
pub use resolve::TextLocationResolver;
