//! shipway-pipeline — multi-stage delivery pipeline definition.
//!
//! Composes per-stage configuration into resolved [`StagePlan`]s,
//! sequences them into a [`PipelineSpec`] (staging first, production
//! behind a manual approval gate), and executes the sequence against a
//! [`PipelineEngine`]. Composition is pure; every side effect happens
//! in the engine when a plan is deployed.
//!
//! ```text
//! Manifest ──compose──▶ PipelineSpec
//!                         ├── staging       (StagePlan)
//!                         └── [approval] → production (StagePlan)
//! ```

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod stage;

pub use engine::{
    Approver, PipelineEngine, PipelineReport, ProvisionEngine, StageOutcome, StaticApprover,
    run_pipeline,
};
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{ApprovalGate, PipelineSpec, PipelineStage};
pub use stage::{StagePlan, compose};
