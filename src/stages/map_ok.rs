use std::future::{ready, Future};

use futures::{future::Either, FutureExt};
use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use crate::{concurrency::spawn_concurrent_loop, Concurrency, Stage};

pub struct MapOkStage<F> {
    pub map_fn: F,
    pub concurrency: Concurrency,
}

impl<T, E, U, F, Fut> Stage<Result<T, E>, Result<U, E>> for MapOkStage<F>
where
    F: FnMut(T) -> Fut + Send + 'static,
    Fut: Future<Output = U> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    U: Send + 'static,
{
    fn spawn(
        mut self,
        input_receiver: Receiver<Result<T, E>>,
    ) -> (Receiver<Result<U, E>>, JoinHandle<()>) {
        spawn_concurrent_loop(input_receiver, self.concurrency, move |input| match input {
            Ok(value) => Either::Left((self.map_fn)(value).map(|output| Some(Ok(output)))),
            Err(e) => Either::Right(ready(Some(Err(e)))),
        })
    }
}
