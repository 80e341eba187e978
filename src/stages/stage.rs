use tokio::{sync::mpsc::Receiver, task::JoinHandle};

/// One processing step of a [`Pipeline`](crate::Pipeline).
///
/// A stage consumes items from an input channel and produces items into an
/// output channel, usually from a spawned task. Implement this trait to
/// attach custom behavior with [`Pipeline::stage`](crate::Pipeline::stage).
///
/// # Example
/// ```rust
/// use confluence::{Pipeline, Stage};
/// use tokio::sync::mpsc::{channel, Receiver};
/// use tokio::task::JoinHandle;
///
/// struct Double;
///
/// impl Stage<i32, i32> for Double {
///     fn spawn(self, mut input_receiver: Receiver<i32>) -> (Receiver<i32>, JoinHandle<()>) {
///         let (output_sender, output_receiver) = channel(1);
///
///         let h = tokio::spawn(async move {
///             while let Some(input) = input_receiver.recv().await {
///                 if output_sender.send(input * 2).await.is_err() {
///                     break;
///                 }
///             }
///         });
///
///         (output_receiver, h)
///     }
/// }
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let out = Pipeline::from_iter(vec![1, 2, 3]).stage(Double).collect().await;
/// assert_eq!(out, vec![2, 4, 6]);
/// # });
/// ```
pub trait Stage<In, Out> {
    fn spawn(self, input_receiver: Receiver<In>) -> (Receiver<Out>, JoinHandle<()>);
}
