use std::future::Future;

use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use crate::{concurrency::spawn_concurrent_loop, Concurrency, Stage};

pub struct MapStage<F> {
    pub map_fn: F,
    pub concurrency: Concurrency,
}

impl<In, Out, F, Fut> Stage<In, Out> for MapStage<F>
where
    F: FnMut(In) -> Fut + Send + 'static,
    Fut: Future<Output = Out> + Send + 'static,
    In: Send + 'static,
    Out: Send + 'static,
{
    fn spawn(mut self, input_receiver: Receiver<In>) -> (Receiver<Out>, JoinHandle<()>) {
        spawn_concurrent_loop(input_receiver, self.concurrency, move |input| {
            let fut = (self.map_fn)(input);
            async move { Some(fut.await) }
        })
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::test_utils::{FutureTimings, TestValue};

    #[tokio::test]
    async fn maps_each_item() {
        let (input_sender, input_receiver) = mpsc::channel(100);

        let stage = MapStage {
            map_fn: |x: i32| async move { x * 2 },
            concurrency: Concurrency::concurrent_unordered(2),
        };
        let (mut output_receiver, _h) = stage.spawn(input_receiver);

        input_sender.send(1).await.unwrap();
        input_sender.send(2).await.unwrap();
        drop(input_sender);

        let mut results = vec![
            output_receiver.recv().await.unwrap(),
            output_receiver.recv().await.unwrap(),
        ];
        results.sort();

        assert_eq!(results, vec![2, 4]);
        assert_eq!(output_receiver.recv().await, None);
    }

    #[tokio::test]
    async fn respects_the_concurrency_limit() {
        let (input_sender, input_receiver) = mpsc::channel(100);
        let timings = FutureTimings::new();

        let stage = MapStage {
            map_fn: timings.tracked_fn(|value: &TestValue| value.id),
            concurrency: Concurrency::concurrent_unordered(2),
        };
        let (mut output_receiver, _h) = stage.spawn(input_receiver);

        input_sender.send(TestValue::new(1, 30)).await.unwrap();
        input_sender.send(TestValue::new(2, 20)).await.unwrap();
        input_sender.send(TestValue::new(3, 10)).await.unwrap();

        // with a limit of 2, the third future starts only after one of the
        // first two completes
        assert_eq!(output_receiver.recv().await, Some(2));
        assert!(timings.run_in_parallel(1, 2).await);
        assert!(timings.run_after(3, 2).await);
    }
}
