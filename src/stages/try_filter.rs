use tokio::{
    sync::mpsc::{self, Receiver},
    task::JoinHandle,
};

use crate::Stage;

/// Filtering that can fail: a predicate error becomes an in-band `Err` item
/// and the stage keeps going.
pub struct TryFilterStage<F> {
    pub predicate: F,
}

impl<T, E, F> Stage<Result<T, E>, Result<T, E>> for TryFilterStage<F>
where
    T: Send + 'static,
    E: Send + 'static,
    F: FnMut(&T) -> Result<bool, E> + Send + 'static,
{
    fn spawn(
        mut self,
        mut input_receiver: Receiver<Result<T, E>>,
    ) -> (Receiver<Result<T, E>>, JoinHandle<()>) {
        let (output_sender, output_receiver) = mpsc::channel(1);

        let h = tokio::spawn(async move {
            while let Some(input) = input_receiver.recv().await {
                let output = match input {
                    Ok(value) => match (self.predicate)(&value) {
                        Ok(true) => Some(Ok(value)),
                        Ok(false) => None,
                        Err(e) => Some(Err(e)),
                    },
                    Err(e) => Some(Err(e)),
                };

                if let Some(output) = output {
                    if output_sender.send(output).await.is_err() {
                        break;
                    }
                }
            }
        });

        (output_receiver, h)
    }
}
