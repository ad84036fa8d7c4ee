//! Collaborator traits consumed by the pipeline.
//!
//! Implementations live outside this crate (see `wildcam-client` for the
//! HTTP and file-backed ones). Any latency bound belongs inside the
//! implementation; the pipeline itself never times out or retries.

use async_trait::async_trait;
use wildcam_core::error::CoreError;
use wildcam_core::query::StackQuery;
use wildcam_core::stack::Stack;

/// Executes a stack query against the image backend.
#[async_trait]
pub trait StackSource: Send + Sync {
    /// Resolve `query` to an ordered stack.
    ///
    /// Called exactly once per accepted selection change. The error is
    /// treated as opaque by the caller.
    async fn fetch_stack(&self, query: StackQuery) -> Result<Stack, CoreError>;
}

/// Loads the fixed, statically known fallback stack.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch_fallback(&self) -> Result<Stack, CoreError>;
}
