//! API documentation: operation builders, the fixed system fragments and the aggregator.

pub mod aggregator;
pub mod operation;
pub mod system;

pub use aggregator::{
    validate_plugin, AggregatedDocument, DocFragments, DocInfo, DocumentationAggregator, Omission, TagEntry,
};
pub use operation::{data_many, data_one, schema_of, schema_ref, OperationDoc};
pub use system::{system_fragments, SystemEndpoint, SYSTEM_ENDPOINTS, SYSTEM_TAG};
