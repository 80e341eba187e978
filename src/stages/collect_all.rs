use tokio::{
    sync::mpsc::{self, Receiver},
    task::JoinHandle,
};

use crate::Stage;

/// Gathers all input into a single `Vec` item, emitted on input end. Always
/// emits exactly one item, empty input included.
pub struct CollectAllStage;

impl<T> Stage<T, Vec<T>> for CollectAllStage
where
    T: Send + 'static,
{
    fn spawn(self, mut input_receiver: Receiver<T>) -> (Receiver<Vec<T>>, JoinHandle<()>) {
        let (output_sender, output_receiver) = mpsc::channel(1);

        let h = tokio::spawn(async move {
            let mut buffer = Vec::new();
            while let Some(input) = input_receiver.recv().await {
                buffer.push(input);
            }

            let _ = output_sender.send(buffer).await;
        });

        (output_receiver, h)
    }
}
