//! Hybrid retrieval: concurrent backend fan-out, Reciprocal Rank Fusion,
//! and citation assembly

mod citation;
mod fusion;
mod hybrid;

pub use citation::{assemble_citations, metadata_citation, Citation};
pub use fusion::{reciprocal_rank_fusion, FusedHit, FusionConfig, FusionError};
pub use hybrid::{FusionRetriever, RetrievalOutcome};
