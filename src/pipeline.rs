use std::{cmp::Ordering, future::Future};

use futures::{future::BoxFuture, stream::FuturesUnordered, FutureExt, Stream, StreamExt};
use tokio::{
    sync::mpsc::{self, Receiver, Sender},
    task::{JoinError, JoinHandle},
};

use crate::{
    join::{CombineError, JoinPolicy, Joiner},
    stages::{
        catch::CatchStage,
        collect_all::CollectAllStage,
        filter::FilterStage,
        filter_map::FilterMapStage,
        first::FirstStage,
        flatten::FlattenStage,
        last::LastStage,
        map::MapStage,
        map_err::MapErrStage,
        map_ok::MapOkStage,
        scan::ScanStage,
        sort::SortStage,
        try_filter::TryFilterStage,
    },
    Concurrency, Stage,
};

/// The builder API for a chain of [`Stage`] operations.
///
/// A pipeline starts from an `Iterator`, a `Stream` or a `Receiver`. Stages
/// attached to it transform the flowing data; [`Pipeline::build`] hands back
/// the output receiver together with a join future over all spawned tasks,
/// and [`Pipeline::collect`] / [`Pipeline::try_collect`] drain the output in
/// one call.
///
/// # Example
/// ```rust
/// use confluence::{Pipeline, Concurrency};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let (mut output, h) = Pipeline::from_iter(vec![1, 2, 3, 4, 5])
///     .filter_map(|x| async move { (x % 2 == 0).then_some(x) }, Concurrency::concurrent_ordered(8))
///     .map(|x| async move { x * 2 }, Concurrency::concurrent_ordered(8))
///     .build();
///
/// assert_eq!(output.recv().await, Some(4));
/// assert_eq!(output.recv().await, Some(8));
/// assert_eq!(output.recv().await, None);
/// # });
/// ```
///
/// ## Panic handling
/// Stages are spawned tasks and can panic. On panic all inner tasks and
/// channels close; the join future returned by [`Pipeline::build`] reports
/// the failure.
pub struct Pipeline<Out> {
    pub(crate) output_receiver: Receiver<Out>,
    pub(crate) handles: FuturesUnordered<JoinHandle<()>>,
}

impl<Out> From<Receiver<Out>> for Pipeline<Out> {
    fn from(receiver: Receiver<Out>) -> Self {
        Pipeline {
            output_receiver: receiver,
            handles: FuturesUnordered::new(),
        }
    }
}

impl<Out> Pipeline<Out>
where
    Out: Send + 'static,
{
    /// Constructs a [`Pipeline`] from a [`Stream`].
    pub fn from_stream(stream: impl Stream<Item = Out> + Send + 'static) -> Self {
        let (output_sender, output_receiver) = mpsc::channel(1);

        let h = tokio::spawn(async move {
            tokio::pin!(stream);
            while let Some(output) = stream.next().await {
                if output_sender.send(output).await.is_err() {
                    break;
                }
            }
        });

        Pipeline {
            output_receiver,
            handles: [h].into_iter().collect(),
        }
    }

    /// Constructs a [`Pipeline`] from an [`IntoIterator`].
    #[allow(clippy::should_implement_trait)]
    pub fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Out> + Send + 'static,
        <I as IntoIterator>::IntoIter: Send,
    {
        let (output_sender, output_receiver) = mpsc::channel(1);

        let h = tokio::spawn(async move {
            for output in iter {
                if output_sender.send(output).await.is_err() {
                    break;
                }
            }
        });

        Pipeline {
            output_receiver,
            handles: [h].into_iter().collect(),
        }
    }

    /// Attaches a custom [`Stage`] to the pipeline.
    pub fn stage<S, T>(self, stage: S) -> Pipeline<T>
    where
        S: Stage<Out, T>,
    {
        let (stage_output_receiver, join_handle) = stage.spawn(self.output_receiver);
        let handles = self.handles;
        handles.push(join_handle);

        Pipeline {
            output_receiver: stage_output_receiver,
            handles,
        }
    }

    /// Applies an async function to every item. Futures run according to the
    /// [`Concurrency`] configuration; their results flow downstream.
    ///
    /// # Example
    /// ```rust
    /// use confluence::{Pipeline, Concurrency};
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let out = Pipeline::from_iter(vec![1, 2, 3])
    ///     .map(|x| async move { x * 2 }, Concurrency::concurrent_ordered(8))
    ///     .collect()
    ///     .await;
    ///
    /// assert_eq!(out, vec![2, 4, 6]);
    /// # });
    /// ```
    pub fn map<F, Fut, T>(self, map_fn: F, concurrency: Concurrency) -> Pipeline<T>
    where
        F: FnMut(Out) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.stage(MapStage {
            map_fn,
            concurrency,
        })
    }

    /// Applies an async function to every item, dropping items for which it
    /// resolves to `None`.
    ///
    /// # Example
    /// ```rust
    /// use confluence::{Pipeline, Concurrency};
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let out = Pipeline::from_iter(vec![1, 2, 3])
    ///     .filter_map(|x| async move { (x % 2 == 0).then_some(x) }, Concurrency::serial())
    ///     .collect()
    ///     .await;
    ///
    /// assert_eq!(out, vec![2]);
    /// # });
    /// ```
    pub fn filter_map<F, Fut, T>(self, map_fn: F, concurrency: Concurrency) -> Pipeline<T>
    where
        F: FnMut(Out) -> Fut + Send + 'static,
        Fut: Future<Output = Option<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.stage(FilterMapStage {
            map_fn,
            concurrency,
        })
    }

    /// Keeps only items matching the predicate.
    pub fn filter<F>(self, predicate: F) -> Pipeline<Out>
    where
        F: FnMut(&Out) -> bool + Send + 'static,
    {
        self.stage(FilterStage {
            predicate,
            rejected: None,
        })
    }

    /// Keeps only items matching the predicate, sending the rejected ones to
    /// `rejected`. A dropped rejected receiver never stalls the main path;
    /// a retained one must be drained.
    ///
    /// # Example
    /// ```rust
    /// use confluence::Pipeline;
    /// use tokio::sync::mpsc;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let (rejected_tx, mut rejected_rx) = mpsc::channel(10);
    ///
    /// let kept = Pipeline::from_iter(vec![1, 2, 3, 4])
    ///     .filter_with_rejected(|x| x % 2 == 0, rejected_tx)
    ///     .collect()
    ///     .await;
    ///
    /// assert_eq!(kept, vec![2, 4]);
    /// assert_eq!(rejected_rx.recv().await, Some(1));
    /// assert_eq!(rejected_rx.recv().await, Some(3));
    /// assert_eq!(rejected_rx.recv().await, None);
    /// # });
    /// ```
    pub fn filter_with_rejected<F>(self, predicate: F, rejected: Sender<Out>) -> Pipeline<Out>
    where
        F: FnMut(&Out) -> bool + Send + 'static,
    {
        self.stage(FilterStage {
            predicate,
            rejected: Some(rejected),
        })
    }

    /// Folds items into an accumulator, emitting every intermediate value.
    ///
    /// # Example
    /// ```rust
    /// use confluence::Pipeline;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let sums = Pipeline::from_iter(vec![1, 2, 3])
    ///     .scan(0, |acc, x| acc + x)
    ///     .collect()
    ///     .await;
    ///
    /// assert_eq!(sums, vec![1, 3, 6]);
    /// # });
    /// ```
    pub fn scan<State, F>(self, seed: State, scan_fn: F) -> Pipeline<State>
    where
        State: Clone + Send + 'static,
        F: FnMut(State, Out) -> State + Send + 'static,
    {
        self.stage(ScanStage {
            state: seed,
            scan_fn,
        })
    }

    /// Turns every iterable item into a run of its elements.
    ///
    /// # Example
    /// ```rust
    /// use confluence::Pipeline;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let out = Pipeline::from_iter(vec![vec![1, 2], vec![], vec![3]])
    ///     .flatten()
    ///     .collect()
    ///     .await;
    ///
    /// assert_eq!(out, vec![1, 2, 3]);
    /// # });
    /// ```
    pub fn flatten<T>(self) -> Pipeline<T>
    where
        Out: IntoIterator<Item = T>,
        <Out as IntoIterator>::IntoIter: Send,
        T: Send + 'static,
    {
        self.stage(FlattenStage {})
    }

    /// Buffers the entire input, sorts it with the comparator once the input
    /// ends, and emits the sorted run.
    pub fn sort<F>(self, compare: F) -> Pipeline<Out>
    where
        F: FnMut(&Out, &Out) -> Ordering + Send + 'static,
    {
        self.stage(SortStage { compare })
    }

    /// Passes through only the very first item.
    pub fn first(self) -> Pipeline<Out> {
        self.stage(FirstStage)
    }

    /// Passes through only the very last item, once the input ends.
    pub fn last(self) -> Pipeline<Out> {
        self.stage(LastStage)
    }

    /// Gathers the entire input into one `Vec` item, emitted when the input
    /// ends. An empty input emits an empty `Vec`.
    pub fn collect_all(self) -> Pipeline<Vec<Out>> {
        self.stage(CollectAllStage)
    }

    /// Buffers up to `n` items between the previous stage and the next one,
    /// letting a fast producer run ahead of a momentarily slow consumer.
    pub fn backpressure(self, n: usize) -> Pipeline<Out> {
        self.stage(crate::stages::backpressure::Backpressure { n })
    }

    /// Joins this pipeline (the left channel) with another (the right
    /// channel) under the given [`JoinPolicy`].
    ///
    /// The joiner output carries `Ok` items and, if the policy fails, one
    /// terminal `Err`; [`Pipeline::try_collect`] resolves it in one call.
    ///
    /// # Example
    /// ```rust
    /// use confluence::Pipeline;
    /// use confluence::join::RightAfterLeft;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let lefts = Pipeline::from_iter(vec![1, 2]);
    /// let rights = Pipeline::from_iter(vec![10]);
    ///
    /// let out = lefts
    ///     .join_with(rights, RightAfterLeft::new(|lefts: &[i32], right: &i32, _last| {
    ///         vec![lefts.iter().sum::<i32>() * right]
    ///     }))
    ///     .try_collect()
    ///     .await
    ///     .unwrap();
    ///
    /// assert_eq!(out, vec![30]);
    /// # });
    /// ```
    pub fn join_with<R, O, P>(
        self,
        right: Pipeline<R>,
        policy: P,
    ) -> Pipeline<Result<O, CombineError>>
    where
        R: Send + 'static,
        O: Send + 'static,
        P: JoinPolicy<Out, R, O> + Send + 'static,
    {
        let Joiner {
            left: left_sender,
            right: right_sender,
            output,
            handle,
        } = Joiner::spawn(policy);

        let handles = self.handles;
        let mut left_receiver = self.output_receiver;
        handles.push(tokio::spawn(async move {
            while let Some(item) = left_receiver.recv().await {
                if left_sender.send(item).await.is_err() {
                    break;
                }
            }
        }));

        let Pipeline {
            output_receiver: mut right_receiver,
            handles: right_handles,
        } = right;
        for h in right_handles {
            handles.push(h);
        }
        handles.push(tokio::spawn(async move {
            while let Some(item) = right_receiver.recv().await {
                if right_sender.send(item).await.is_err() {
                    break;
                }
            }
        }));

        handles.push(handle);

        Pipeline {
            output_receiver: output,
            handles,
        }
    }

    /// Returns the output receiver and a join future that resolves when all
    /// inner tasks have finished.
    pub fn build(self) -> (Receiver<Out>, BoxFuture<'static, Result<(), JoinError>>) {
        let Pipeline {
            output_receiver,
            mut handles,
        } = self;

        let join_result = async move {
            while let Some(res) = handles.next().await {
                match res {
                    Ok(_) => continue,
                    Err(e) => return Err(e),
                }
            }

            Ok(())
        };

        (output_receiver, join_result.boxed())
    }

    /// Aborts all inner tasks.
    pub fn abort(self) {
        for handle in self.handles {
            handle.abort();
        }
    }

    /// Drains the pipeline into a `Vec`.
    pub async fn collect(self) -> Vec<Out> {
        let (mut output, _join_result) = self.build();

        let mut items = Vec::new();
        while let Some(item) = output.recv().await {
            items.push(item);
        }

        items
    }
}

impl<T, E> Pipeline<Result<T, E>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Drains a pipeline of `Result`s into a `Vec` of the `Ok` values, or
    /// fails with the first `Err` item. Settles at most once: data collected
    /// before the error is discarded, items after it are never read.
    pub async fn try_collect(self) -> Result<Vec<T>, E> {
        let (mut output, _join_result) = self.build();

        let mut items = Vec::new();
        while let Some(item) = output.recv().await {
            match item {
                Ok(value) => items.push(value),
                Err(e) => return Err(e),
            }
        }

        Ok(items)
    }

    /// Keeps `Ok` items matching the predicate; a failing predicate becomes
    /// an in-band `Err` item. Incoming `Err` items pass through untouched.
    ///
    /// # Example
    /// ```rust
    /// use confluence::Pipeline;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let (mut output, h) = Pipeline::from_iter(vec![Ok(1), Ok(2), Ok(3)])
    ///     .try_filter(|x| if *x == 2 { Err("two") } else { Ok(*x % 2 == 1) })
    ///     .build();
    ///
    /// assert_eq!(output.recv().await, Some(Ok(1)));
    /// assert_eq!(output.recv().await, Some(Err("two")));
    /// assert_eq!(output.recv().await, Some(Ok(3)));
    /// assert_eq!(output.recv().await, None);
    /// # });
    /// ```
    pub fn try_filter<F>(self, predicate: F) -> Pipeline<Result<T, E>>
    where
        F: FnMut(&T) -> Result<bool, E> + Send + 'static,
    {
        self.stage(TryFilterStage { predicate })
    }

    /// Diverts `Err` items to a separate channel; `Ok` values continue
    /// downstream unwrapped. The pipeline keeps processing after an error.
    ///
    /// Several stages may catch into clones of one sender - the error
    /// channel then closes exactly when the last of them finishes, which
    /// aggregates the errors of a whole pipeline into one sequence.
    ///
    /// # Notes
    /// - Dropping the error receiver does not stop the pipeline; undeliverable
    ///   errors are ignored.
    /// - If this stage's own output is dropped, the remaining input errors are
    ///   still forwarded to `error_sender`.
    ///
    /// ```rust
    /// use confluence::Pipeline;
    /// use tokio::sync::mpsc;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let (error_tx, mut error_rx) = mpsc::channel(10);
    ///
    /// let out = Pipeline::from_iter(vec![Ok(1), Err("first"), Ok(2), Err("second"), Ok(3)])
    ///     .catch(error_tx)
    ///     .collect()
    ///     .await;
    ///
    /// assert_eq!(out, vec![1, 2, 3]);
    /// assert_eq!(error_rx.recv().await, Some("first"));
    /// assert_eq!(error_rx.recv().await, Some("second"));
    /// assert_eq!(error_rx.recv().await, None);
    /// # });
    /// ```
    pub fn catch(self, error_sender: Sender<E>) -> Pipeline<T> {
        self.stage(CatchStage {
            error_sender,
            abort_on_error: false,
        })
    }

    /// Like [`Pipeline::catch`], but stops processing at the first `Err`
    /// item, forwarding at most one error.
    pub fn catch_abort(self, error_sender: Sender<E>) -> Pipeline<T> {
        self.stage(CatchStage {
            error_sender,
            abort_on_error: true,
        })
    }

    /// Applies an async function to the success value of every item.
    ///
    /// # Example
    /// ```rust
    /// use confluence::{Pipeline, Concurrency};
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let (mut output, h) = Pipeline::from_iter(vec![Ok(1), Err(()), Ok(2)])
    ///     .map_ok(|x| async move { x * 2 }, Concurrency::serial())
    ///     .build();
    ///
    /// assert_eq!(output.recv().await, Some(Ok(2)));
    /// assert_eq!(output.recv().await, Some(Err(())));
    /// assert_eq!(output.recv().await, Some(Ok(4)));
    /// assert_eq!(output.recv().await, None);
    /// # });
    /// ```
    pub fn map_ok<F, Fut, U>(self, map_fn: F, concurrency: Concurrency) -> Pipeline<Result<U, E>>
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = U> + Send + 'static,
        U: Send + 'static,
    {
        self.stage(MapOkStage {
            map_fn,
            concurrency,
        })
    }

    /// Applies an async function to the error value of every item.
    ///
    /// # Example
    /// ```rust
    /// use confluence::{Pipeline, Concurrency};
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let (mut output, h) = Pipeline::from_iter(vec![Ok(1), Err("oh no")])
    ///     .map_err(|e| async move { format!("{e}!") }, Concurrency::serial())
    ///     .build();
    ///
    /// assert_eq!(output.recv().await, Some(Ok(1)));
    /// assert_eq!(output.recv().await, Some(Err("oh no!".to_string())));
    /// assert_eq!(output.recv().await, None);
    /// # });
    /// ```
    pub fn map_err<F, Fut, U>(self, map_fn: F, concurrency: Concurrency) -> Pipeline<Result<T, U>>
    where
        F: FnMut(E) -> Fut + Send + 'static,
        Fut: Future<Output = U> + Send + 'static,
        U: Send + 'static,
    {
        self.stage(MapErrStage {
            map_fn,
            concurrency,
        })
    }
}
