use tokio::{
    sync::mpsc::{self, Receiver},
    task::JoinHandle,
};

use crate::Stage;

/// Emits the first item and ends. Dropping the input receiver afterwards
/// signals upstream stages to stop.
pub struct FirstStage;

impl<T> Stage<T, T> for FirstStage
where
    T: Send + 'static,
{
    fn spawn(self, mut input_receiver: Receiver<T>) -> (Receiver<T>, JoinHandle<()>) {
        let (output_sender, output_receiver) = mpsc::channel(1);

        let h = tokio::spawn(async move {
            if let Some(input) = input_receiver.recv().await {
                let _ = output_sender.send(input).await;
            }
        });

        (output_receiver, h)
    }
}
