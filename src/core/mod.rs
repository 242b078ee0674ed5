pub mod context;
pub mod extractor;
pub mod grouping;
pub mod recorder;
pub mod splitter;
pub mod writer;

pub use crate::domain::model::{
    GroupStatus, LogicalGroup, Markers, OutcomeRecord, PageScan, PageSpan, RunReport, RunSummary,
};
pub use crate::domain::ports::SourceDocument;
pub use crate::utils::error::Result;
