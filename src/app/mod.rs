// Application layer - Use case interactors

pub mod artifacts;
pub mod assembly_interactor;
pub mod container;
pub mod describe_interactor;
pub mod narration_interactor;
pub mod script_interactor;
pub mod segment_interactor;
pub mod summarize_interactor;

// Re-export interactors
pub use assembly_interactor::AssemblyInteractor;
pub use describe_interactor::DescribeInteractor;
pub use narration_interactor::NarrationInteractor;
pub use script_interactor::ScriptInteractor;
pub use segment_interactor::SegmentInteractor;
pub use summarize_interactor::{MovieAvi, SummaryRequest};
