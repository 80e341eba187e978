use tokio::{
    sync::mpsc::{self, Receiver},
    task::JoinHandle,
};

use crate::Stage;

/// Holds the most recent item and emits it once the input ends.
pub struct LastStage;

impl<T> Stage<T, T> for LastStage
where
    T: Send + 'static,
{
    fn spawn(self, mut input_receiver: Receiver<T>) -> (Receiver<T>, JoinHandle<()>) {
        let (output_sender, output_receiver) = mpsc::channel(1);

        let h = tokio::spawn(async move {
            let mut last = None;
            while let Some(input) = input_receiver.recv().await {
                last = Some(input);
            }

            if let Some(last) = last {
                let _ = output_sender.send(last).await;
            }
        });

        (output_receiver, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_only_the_last_item() {
        let (input_sender, input_receiver) = mpsc::channel(100);

        let (mut output_receiver, _h) = LastStage.spawn(input_receiver);

        input_sender.send(10).await.unwrap();
        input_sender.send(20).await.unwrap();
        input_sender.send(30).await.unwrap();
        drop(input_sender);

        assert_eq!(output_receiver.recv().await, Some(30));
        assert_eq!(output_receiver.recv().await, None);
    }

    #[tokio::test]
    async fn empty_input_produces_empty_output() {
        let (input_sender, input_receiver) = mpsc::channel::<i32>(100);

        let (mut output_receiver, _h) = LastStage.spawn(input_receiver);
        drop(input_sender);

        assert_eq!(output_receiver.recv().await, None);
    }
}
