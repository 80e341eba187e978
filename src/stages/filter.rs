use tokio::{
    sync::mpsc::{self, Receiver, Sender},
    task::JoinHandle,
};

use crate::Stage;

/// Synchronous filtering, optionally diverting rejected items to a side
/// channel.
pub struct FilterStage<T, F> {
    pub predicate: F,
    pub rejected: Option<Sender<T>>,
}

impl<T, F> Stage<T, T> for FilterStage<T, F>
where
    T: Send + 'static,
    F: FnMut(&T) -> bool + Send + 'static,
{
    fn spawn(mut self, mut input_receiver: Receiver<T>) -> (Receiver<T>, JoinHandle<()>) {
        let (output_sender, output_receiver) = mpsc::channel(1);

        let h = tokio::spawn(async move {
            while let Some(input) = input_receiver.recv().await {
                if (self.predicate)(&input) {
                    if output_sender.send(input).await.is_err() {
                        break;
                    }
                } else if let Some(rejected) = &self.rejected {
                    // a dropped rejected receiver must not stall the main path
                    let _ = rejected.send(input).await;
                }
            }
        });

        (output_receiver, h)
    }
}
