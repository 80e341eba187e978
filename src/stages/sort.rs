use tokio::{
    sync::mpsc::{self, Receiver},
    task::JoinHandle,
};

use crate::Stage;

/// Buffers the whole input and emits it sorted once the input ends. Memory
/// grows with the input, so this belongs after any reducing stages.
pub struct SortStage<F> {
    pub compare: F,
}

impl<T, F> Stage<T, T> for SortStage<F>
where
    T: Send + 'static,
    F: FnMut(&T, &T) -> std::cmp::Ordering + Send + 'static,
{
    fn spawn(mut self, mut input_receiver: Receiver<T>) -> (Receiver<T>, JoinHandle<()>) {
        let (output_sender, output_receiver) = mpsc::channel(1);

        let h = tokio::spawn(async move {
            let mut buffer = Vec::new();
            while let Some(input) = input_receiver.recv().await {
                buffer.push(input);
            }

            buffer.sort_by(&mut self.compare);

            for item in buffer {
                if output_sender.send(item).await.is_err() {
                    break;
                }
            }
        });

        (output_receiver, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emits_nothing_until_the_input_ends() {
        let (input_sender, input_receiver) = mpsc::channel(100);

        let stage = SortStage {
            compare: |a: &i32, b: &i32| a.cmp(b),
        };
        let (mut output_receiver, _h) = stage.spawn(input_receiver);

        for value in [3, 1, 2] {
            input_sender.send(value).await.unwrap();
        }

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(output_receiver.try_recv().is_err());

        drop(input_sender);

        assert_eq!(output_receiver.recv().await, Some(1));
        assert_eq!(output_receiver.recv().await, Some(2));
        assert_eq!(output_receiver.recv().await, Some(3));
        assert_eq!(output_receiver.recv().await, None);
    }

    #[tokio::test]
    async fn sorts_with_a_custom_comparator() {
        let (input_sender, input_receiver) = mpsc::channel(100);

        let stage = SortStage {
            compare: |a: &i32, b: &i32| b.cmp(a),
        };
        let (mut output_receiver, _h) = stage.spawn(input_receiver);

        for value in [2, 3, 1] {
            input_sender.send(value).await.unwrap();
        }
        drop(input_sender);

        assert_eq!(output_receiver.recv().await, Some(3));
        assert_eq!(output_receiver.recv().await, Some(2));
        assert_eq!(output_receiver.recv().await, Some(1));
        assert_eq!(output_receiver.recv().await, None);
    }
}
