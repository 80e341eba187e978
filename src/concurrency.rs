use std::future::Future;

use futures::{
    stream::{FuturesOrdered, FuturesUnordered},
    StreamExt,
};
use tokio::{
    sync::mpsc::{self, Receiver},
    task::JoinHandle,
};

/// Controls the concurrency characteristics of a stage.
///
/// Example:
///
/// ```rust
/// use confluence::Concurrency;
///
/// // ten concurrent futures, up to a hundred unconsumed results buffered
/// let concurrency = Concurrency::concurrent_ordered(10).backpressure(100);
/// ```
pub struct Concurrency {
    /// How many futures may run concurrently within the stage.
    pub concurrency: usize,
    /// How many results can sit in the output channel before the stage stops
    /// processing further input. Defaults to the concurrency number.
    pub backpressure: usize,
    /// Whether results keep the input order.
    pub preserve_order: bool,
}

impl Concurrency {
    /// Unordered execution with the given number of concurrent futures.
    pub fn concurrent_unordered(concurrency: usize) -> Self {
        Self {
            concurrency,
            backpressure: concurrency,
            preserve_order: false,
        }
    }

    /// Order-preserving execution with the given number of concurrent futures.
    pub fn concurrent_ordered(concurrency: usize) -> Self {
        Self {
            concurrency,
            backpressure: concurrency,
            preserve_order: true,
        }
    }

    /// One future at a time.
    pub fn serial() -> Self {
        Self {
            concurrency: 1,
            backpressure: 1,
            preserve_order: true,
        }
    }

    /// How many results may accumulate before a consumer drains the output
    /// channel (default = concurrency).
    pub fn backpressure(self, backpressure: usize) -> Self {
        Self {
            backpressure,
            ..self
        }
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Self::serial()
    }
}

/// `FuturesOrdered` / `FuturesUnordered` behind one interface, picked by the
/// `preserve_order` flag.
#[derive(Debug)]
pub(crate) enum FuturesContainer<T>
where
    T: Future,
{
    Ordered(FuturesOrdered<T>),
    Unordered(FuturesUnordered<T>),
}

impl<T> FuturesContainer<T>
where
    T: Future,
{
    pub(crate) fn new(preserve_order: bool) -> Self {
        match preserve_order {
            true => Self::Ordered(FuturesOrdered::new()),
            false => Self::Unordered(FuturesUnordered::new()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Ordered(futures) => futures.len(),
            Self::Unordered(futures) => futures.len(),
        }
    }

    pub(crate) fn push_back(&mut self, future: T) {
        match self {
            Self::Ordered(futures) => futures.push_back(future),
            Self::Unordered(futures) => futures.push(future),
        }
    }

    pub(crate) async fn next(&mut self) -> Option<T::Output> {
        match self {
            Self::Ordered(futures) => futures.next().await,
            Self::Unordered(futures) => futures.next().await,
        }
    }
}

/// The shared select loop behind every future-running stage.
///
/// `work` turns one input into a future; resolved `Some` values flow to the
/// output channel, `None` results are dropped. New input is only accepted
/// while fewer than `concurrency.concurrency` futures are in flight, and the
/// loop stalls once `concurrency.backpressure` results sit unconsumed.
pub(crate) fn spawn_concurrent_loop<In, Out, F, Fut>(
    mut input_receiver: Receiver<In>,
    concurrency: Concurrency,
    mut work: F,
) -> (Receiver<Out>, JoinHandle<()>)
where
    F: FnMut(In) -> Fut + Send + 'static,
    Fut: Future<Output = Option<Out>> + Send + 'static,
    In: Send + 'static,
    Out: Send + 'static,
{
    let (output_sender, output_receiver) = mpsc::channel(concurrency.backpressure);

    let join_handle = tokio::spawn(async move {
        let mut in_progress = FuturesContainer::new(concurrency.preserve_order);

        loop {
            let in_progress_len = in_progress.len();

            tokio::select! {
                biased;

                Some(input) = input_receiver.recv(), if in_progress_len < concurrency.concurrency => {
                    in_progress.push_back(work(input));
                },
                Some(output) = in_progress.next(), if in_progress_len > 0 => {
                    if let Some(output) = output {
                        if output_sender.send(output).await.is_err() {
                            break;
                        }
                    }
                },
                else => break,
            }
        }
    });

    (output_receiver, join_handle)
}
