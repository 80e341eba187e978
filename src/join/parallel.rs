use futures::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use tokio::{
    sync::mpsc::{self, Receiver, Sender},
    task::{JoinError, JoinHandle},
};

use crate::Pipeline;

/// Fans any number of same-typed inputs into one output.
///
/// Items keep their order relative to their own input; nothing is guaranteed
/// across inputs. The output completes exactly once, when every input has
/// completed.
///
/// ```rust
/// use confluence::join::ParallelJoin;
/// use confluence::Pipeline;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let mut merged = ParallelJoin::new();
/// merged.add(Pipeline::from_iter(vec![1, 2, 3]));
/// merged.add(Pipeline::from_iter(vec![4, 5, 6]));
///
/// let (mut output, _join) = merged.build();
///
/// let mut items = Vec::new();
/// while let Some(item) = output.recv().await {
///     items.push(item);
/// }
/// items.sort();
/// assert_eq!(items, vec![1, 2, 3, 4, 5, 6]);
/// # });
/// ```
pub struct ParallelJoin<T> {
    sender: Sender<T>,
    output: Receiver<T>,
    handles: FuturesUnordered<JoinHandle<()>>,
}

impl<T> ParallelJoin<T>
where
    T: Send + 'static,
{
    /// A merger whose output channel buffers one item.
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    /// A merger whose output channel buffers up to `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, output) = mpsc::channel(capacity);

        ParallelJoin {
            sender,
            output,
            handles: FuturesUnordered::new(),
        }
    }

    /// Allocates one more input. The input completes when the returned
    /// sender and all of its clones have been dropped.
    pub fn input(&self) -> Sender<T> {
        self.sender.clone()
    }

    /// Attaches a whole pipeline as one input.
    pub fn add(&mut self, pipeline: Pipeline<T>) {
        let input = self.input();
        let Pipeline {
            mut output_receiver,
            handles,
        } = pipeline;

        let h = tokio::spawn(async move {
            while let Some(item) = output_receiver.recv().await {
                if input.send(item).await.is_err() {
                    break;
                }
            }
        });

        self.handles.push(h);
        for handle in handles {
            self.handles.push(handle);
        }
    }

    /// Returns the merged output and a future that resolves when all inner
    /// tasks have finished.
    pub fn build(self) -> (Receiver<T>, BoxFuture<'static, Result<(), JoinError>>) {
        let ParallelJoin {
            sender,
            output,
            mut handles,
        } = self;

        // Only handed-out inputs keep the output open from here on.
        drop(sender);

        let join_result = async move {
            while let Some(res) = handles.next().await {
                res?;
            }

            Ok(())
        };

        (output, join_result.boxed())
    }
}

impl<T> Default for ParallelJoin<T>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
