//! Where two streams meet. Composable push-based data-flow stages for Rust,
//! with a two-channel join engine at the core.
//!
//! A pipeline is a chain of stages. Each stage is a spawned task wired to its
//! neighbors with bounded [`tokio::sync::mpsc`] channels: items are pushed
//! downstream as soon as they are produced, end-of-stream is the channel
//! closing, and backpressure falls out of the bounded channel capacities.
//!
//! ```rust
//! use confluence::{Pipeline, Concurrency};
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let doubled = Pipeline::from_iter(vec![3, 1, 2])
//!     .map(|x| async move { x * 2 }, Concurrency::concurrent_ordered(4))
//!     .sort(|a, b| a.cmp(b))
//!     .collect()
//!     .await;
//!
//! assert_eq!(doubled, vec![2, 4, 6]);
//! # });
//! ```
//!
//! ## Stages
//!
//! Single-input stages cover the usual one-pass operations: [`Pipeline::map`],
//! [`Pipeline::filter`], [`Pipeline::filter_map`], [`Pipeline::scan`],
//! [`Pipeline::flatten`], [`Pipeline::sort`], [`Pipeline::first`],
//! [`Pipeline::last`] and [`Pipeline::collect_all`]. Stages that run user
//! futures take a [`Concurrency`] describing how many futures may be in
//! flight and whether input order is preserved.
//!
//! Errors travel in-band as `Result` items. [`Pipeline::try_filter`] turns a
//! failing predicate into an `Err` item, [`Pipeline::map_ok`] and
//! [`Pipeline::map_err`] transform either half, and [`Pipeline::catch`]
//! diverts `Err` items to a side channel. Several stages can catch into
//! clones of one sender; the side channel closes exactly when the last of
//! them finishes, which makes it a natural place to aggregate errors from a
//! whole pipeline.
//!
//! ## Joining
//!
//! The [`join`] module merges two independently-arriving, independently-
//! terminating channels under a pluggable [`join::JoinPolicy`]. The bundled
//! [`join::RightAfterLeft`] policy materializes the whole left channel first
//! and then folds every right arrival against it:
//!
//! ```rust
//! use confluence::Pipeline;
//! use confluence::join::RightAfterLeft;
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let lefts = Pipeline::from_iter(vec![1, 2, 3]);
//! let rights = Pipeline::from_iter(vec![10, 20]);
//!
//! let sums = lefts
//!     .join_with(rights, RightAfterLeft::new(|lefts: &[i32], right: &i32, _last| {
//!         vec![lefts.iter().sum::<i32>() + right]
//!     }))
//!     .try_collect()
//!     .await
//!     .unwrap();
//!
//! assert_eq!(sums, vec![16, 26]);
//! # });
//! ```
//!
//! [`join::ParallelJoin`] is the simpler sibling: it fans any number of
//! same-typed inputs into one output, completing when the last input does.
//!
//! ## Custom stages
//!
//! Anything implementing [`Stage`] can be attached with [`Pipeline::stage`]:
//!
//! ```rust
//! use confluence::{Pipeline, Stage};
//! use tokio::{sync::mpsc::{self, Receiver}, task::JoinHandle};
//!
//! pub struct Double;
//! impl Stage<i32, i32> for Double {
//!     fn spawn(self, mut input_receiver: Receiver<i32>) -> (Receiver<i32>, JoinHandle<()>) {
//!         let (output_sender, output_receiver) = mpsc::channel(1);
//!         let h = tokio::spawn(async move {
//!             while let Some(input) = input_receiver.recv().await {
//!                 if output_sender.send(input * 2).await.is_err() {
//!                     break;
//!                 }
//!             }
//!         });
//!         (output_receiver, h)
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let out = Pipeline::from_iter(vec![1, 2]).stage(Double).collect().await;
//! assert_eq!(out, vec![2, 4]);
//! # });
//! ```
//!
//! ## Panic handling
//!
//! Every stage wraps a spawned task. A panicking task closes its channels and
//! with them the rest of the pipeline; the join future returned by
//! [`Pipeline::build`] surfaces the panic.

mod concurrency;
pub mod join;
mod pipeline;
mod stages;

#[cfg(test)]
mod test_utils;

pub use concurrency::Concurrency;
pub use pipeline::Pipeline;
pub use stages::stage::Stage;
