//! Selection-to-stack pipeline.
//!
//! [`StackPipeline`] watches the selection, drops changes that only touch
//! play-speed, defers incomplete selections, and turns every other change
//! into exactly one retrieval through a [`StackSource`]. Results fan out on
//! three replayable channels bundled in [`PipelineOutputs`].

pub mod source;
pub mod stack_pipeline;

pub use source::{AssetSource, StackSource};
pub use stack_pipeline::{PipelineEvent, PipelineOutputs, StackPipeline};
