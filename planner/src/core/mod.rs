//! Core planning logic
//!
//! Allocation, validation and clustering are pure and synchronous with no
//! I/O. The pipeline is the only part that awaits, and only on export.

pub mod allocator;
pub mod clustering;
pub mod pipeline;
pub mod validator;

pub use allocator::SeedAllocator;
pub use clustering::{ClusterAssignment, ClusteringParams, KMeansAssigner, StaticAssigner};
pub use pipeline::{PipelineInput, PipelineRun, PipelineStage, SeedPipeline};
pub use validator::GuardrailValidator;
