//! In-process notification channels for the stack pipeline.
//!
//! - [`ReplayChannel`] — fan-out channel that remembers its latest value
//!   and replays it to every new subscriber. Consumers get a read-only
//!   [`ReplayView`].
//! - [`SelectionState`] — owner of the viewer's selection; broadcasts the
//!   full value on every update, without replay.
//! - [`Subscription`] — the receiving end handed out by both.

pub mod replay;
pub mod selection;
pub mod subscription;

pub use replay::{ReplayChannel, ReplayView};
pub use selection::SelectionState;
pub use subscription::Subscription;
