use tokio::{
    sync::mpsc::{self, Receiver, Sender},
    task::JoinHandle,
};

use crate::Stage;

/// Diverts `Err` items to the error channel; `Ok` values continue
/// downstream unwrapped.
pub struct CatchStage<E>
where
    E: Send + 'static,
{
    pub error_sender: Sender<E>,
    pub abort_on_error: bool,
}

impl<E, In> Stage<Result<In, E>, In> for CatchStage<E>
where
    E: Send + 'static,
    In: Send + 'static,
{
    fn spawn(
        self,
        mut input_receiver: Receiver<Result<In, E>>,
    ) -> (Receiver<In>, JoinHandle<()>) {
        let (output_sender, output_receiver) = mpsc::channel(1);

        let h = tokio::spawn(async move {
            while let Some(input) = input_receiver.recv().await {
                match input {
                    Err(e) => {
                        // Ignore send errors, we should not stop the
                        // flow of data if the error catcher closes
                        let _ = self.error_sender.send(e).await;

                        if self.abort_on_error {
                            break;
                        }
                    }

                    Ok(x) => {
                        if output_sender.send(x).await.is_err() {
                            // Collect remaining errors
                            input_receiver.close();
                            while let Ok(item) = input_receiver.try_recv() {
                                if let Err(e) = item {
                                    let _ = self.error_sender.send(e).await;

                                    // Only send one error if `abort_on_error` is true
                                    if self.abort_on_error {
                                        break;
                                    }
                                }
                            }

                            break;
                        }
                    }
                }
            }
        });

        (output_receiver, h)
    }
}
