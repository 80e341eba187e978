use tokio::{
    sync::mpsc::{self, Receiver, Sender},
    task::JoinHandle,
};

use super::{engine::JoinCore, CombineError, JoinPolicy, Slot, Step};

/// A spawned two-channel joiner.
///
/// Producers write to the `left` and `right` senders and signal completion by
/// dropping them; each channel's closure reaches the policy as one end-marker
/// slot. The output yields combined values and closes after the policy emits
/// its own end marker. A policy failure surfaces as a single terminal `Err`
/// item.
///
/// Writes arriving after the output has closed fail on the sender side and
/// are expected to be ignored by the producer, the way every stage in this
/// crate ignores a closed downstream.
pub struct Joiner<L, R, O> {
    /// Left channel input.
    pub left: Sender<L>,
    /// Right channel input.
    pub right: Sender<R>,
    /// Combined output. At most one `Err` item, always the last.
    pub output: Receiver<Result<O, CombineError>>,
    /// Handle to the joiner task.
    pub handle: JoinHandle<()>,
}

impl<L, R, O> Joiner<L, R, O>
where
    L: Send + 'static,
    R: Send + 'static,
    O: Send + 'static,
{
    /// Spawns a joiner whose channels buffer one item each.
    pub fn spawn<P>(policy: P) -> Self
    where
        P: JoinPolicy<L, R, O> + Send + 'static,
    {
        Self::with_capacity(policy, 1)
    }

    /// Spawns a joiner whose input and output channels buffer up to
    /// `capacity` items each.
    pub fn with_capacity<P>(policy: P, capacity: usize) -> Self
    where
        P: JoinPolicy<L, R, O> + Send + 'static,
    {
        let (left_sender, mut left_receiver) = mpsc::channel(capacity);
        let (right_sender, mut right_receiver) = mpsc::channel(capacity);
        let (output_sender, output_receiver) = mpsc::channel(capacity);

        let handle = tokio::spawn(async move {
            let mut core = JoinCore::new(policy);

            if !forward(core.activate(), &output_sender).await {
                return;
            }

            let mut left_open = true;
            let mut right_open = true;

            while left_open || right_open {
                let step = tokio::select! {
                    biased;

                    arrival = left_receiver.recv(), if left_open => {
                        core.push_left(match arrival {
                            Some(value) => Slot::Item(value),
                            None => {
                                left_open = false;
                                Slot::End
                            }
                        })
                    },
                    arrival = right_receiver.recv(), if right_open => {
                        core.push_right(match arrival {
                            Some(value) => Slot::Item(value),
                            None => {
                                right_open = false;
                                Slot::End
                            }
                        })
                    },
                };

                if !forward(step, &output_sender).await {
                    return;
                }
            }
        });

        Joiner {
            left: left_sender,
            right: right_sender,
            output: output_receiver,
            handle,
        }
    }
}

/// Sends one combine step's emissions downstream. Returns false when the
/// joiner task should stop: a terminal error, the output end marker, or a
/// dropped consumer.
async fn forward<O>(
    step: Result<Step<O>, CombineError>,
    output: &Sender<Result<O, CombineError>>,
) -> bool {
    match step {
        Err(e) => {
            // Best effort - the consumer may already be gone.
            let _ = output.send(Err(e)).await;
            false
        }
        Ok(step) => {
            for value in step.emit {
                if output.send(Ok(value)).await.is_err() {
                    return false;
                }
            }
            !step.finished
        }
    }
}
