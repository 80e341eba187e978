//! The two-channel join subsystem.
//!
//! A joiner owns two labeled input channels, `left` and `right`. Every
//! arrival is appended to that channel's buffer as a [`Slot`] and handed,
//! together with the other channel's buffer, to a [`JoinPolicy`]. The policy
//! decides which buffered slots are consumed and what flows to the output,
//! returning its decisions as a [`Verdict`]. The synchronous engine lives in
//! [`JoinCore`]; [`Joiner`] wraps it in a spawned task wired to mpsc
//! channels, where dropping an input sender becomes that channel's end
//! marker.
//!
//! [`RightAfterLeft`] is the bundled concrete policy: it holds every left
//! value until the left channel completes, then folds each right arrival
//! against the full left sequence, using [`GroupBuffer`] to tag the terminal
//! batch of right values. [`ParallelJoin`] is the n-way fan-in sibling.

mod engine;
mod error;
mod group_buffer;
mod joiner;
mod parallel;
mod policy;
mod right_after_left;
mod slot;

pub use engine::{JoinCore, Step};
pub use error::CombineError;
pub use group_buffer::GroupBuffer;
pub use joiner::Joiner;
pub use parallel::ParallelJoin;
pub use policy::{JoinPolicy, Verdict};
pub use right_after_left::RightAfterLeft;
pub use slot::Slot;
