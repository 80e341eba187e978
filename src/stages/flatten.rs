use tokio::{
    sync::mpsc::{self, Receiver},
    task::JoinHandle,
};

use crate::Stage;

pub struct FlattenStage {}

impl<In, Out> Stage<In, Out> for FlattenStage
where
    In: IntoIterator<Item = Out> + Send + 'static,
    <In as IntoIterator>::IntoIter: Send,
    Out: Send + 'static,
{
    fn spawn(self, mut input_receiver: Receiver<In>) -> (Receiver<Out>, JoinHandle<()>) {
        let (output_sender, output_receiver) = mpsc::channel(1);

        let h = tokio::spawn(async move {
            'outer: while let Some(input) = input_receiver.recv().await {
                for item in input {
                    if output_sender.send(item).await.is_err() {
                        break 'outer;
                    }
                }
            }
        });

        (output_receiver, h)
    }
}
