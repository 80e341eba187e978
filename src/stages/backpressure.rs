use tokio::{
    sync::mpsc::{self, Receiver},
    task::JoinHandle,
};

use crate::Stage;

pub struct Backpressure {
    pub n: usize,
}

impl<In> Stage<In, In> for Backpressure
where
    In: Send + 'static,
{
    fn spawn(self, mut input_receiver: Receiver<In>) -> (Receiver<In>, JoinHandle<()>) {
        // the stage is just an extra channel of capacity n between the
        // neighbors
        let (output_sender, output_receiver) = mpsc::channel::<In>(self.n);

        let h = tokio::spawn(async move {
            while let Some(input) = input_receiver.recv().await {
                if output_sender.send(input).await.is_err() {
                    break;
                }
            }
        });

        (output_receiver, h)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    #[tokio::test]
    async fn buffers_n_inputs_while_not_consumed() {
        let (input_sender, input_receiver) = mpsc::channel(1);

        let (mut output_receiver, join_handle) = crate::Pipeline::from(input_receiver)
            .backpressure(2)
            .build();

        async fn wait_for_capacity(sender: &mpsc::Sender<i32>) -> usize {
            tokio::time::sleep(Duration::from_millis(20)).await;
            sender.capacity()
        }

        input_sender.send(1).await.unwrap(); // this arrives to the output channel
        assert_eq!(wait_for_capacity(&input_sender).await, 1);

        input_sender.send(2).await.unwrap(); // buffers
        assert_eq!(wait_for_capacity(&input_sender).await, 1);

        input_sender.send(3).await.unwrap(); // buffers
        assert_eq!(wait_for_capacity(&input_sender).await, 1);

        input_sender.send(4).await.unwrap(); // stays in input_receiver
        assert_eq!(wait_for_capacity(&input_sender).await, 0);

        assert_eq!(output_receiver.recv().await, Some(1));
        assert_eq!(output_receiver.recv().await, Some(2));
        assert_eq!(output_receiver.recv().await, Some(3));
        assert_eq!(output_receiver.recv().await, Some(4));

        drop(input_sender);

        assert_eq!(output_receiver.recv().await, None);

        join_handle.await.unwrap();
    }

    #[tokio::test]
    async fn buffer_vacates_when_consumed() {
        let (input_sender, input_receiver) = mpsc::channel(1);

        let (mut output_receiver, join_handle) = crate::Pipeline::from(input_receiver)
            .backpressure(2)
            .build();

        input_sender.send(1).await.unwrap();
        input_sender.send(2).await.unwrap();
        input_sender.send(3).await.unwrap();
        input_sender.send(4).await.unwrap(); // buffer is full

        assert_eq!(output_receiver.recv().await, Some(1));

        input_sender.send(5).await.unwrap(); // can send thanks to the consumed 1
        assert_eq!(output_receiver.recv().await, Some(2));
        assert_eq!(output_receiver.recv().await, Some(3));
        assert_eq!(output_receiver.recv().await, Some(4));
        assert_eq!(output_receiver.recv().await, Some(5));

        drop(input_sender);

        assert_eq!(output_receiver.recv().await, None);

        join_handle.await.unwrap();
    }
}
