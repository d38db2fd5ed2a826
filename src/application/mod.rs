//! Application layer - scan orchestration

pub mod orchestrator;

pub use orchestrator::{
    DiagnosticSink, Orchestrator, PipelineConfig, PipelineEvent, ScanOutcome, SkippedContribution, TracingSink,
};
