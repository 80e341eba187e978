use std::future::{ready, Future};

use futures::{future::Either, FutureExt};
use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use crate::{concurrency::spawn_concurrent_loop, Concurrency, Stage};

pub struct MapErrStage<F> {
    pub map_fn: F,
    pub concurrency: Concurrency,
}

impl<T, E, U, F, Fut> Stage<Result<T, E>, Result<T, U>> for MapErrStage<F>
where
    F: FnMut(E) -> Fut + Send + 'static,
    Fut: Future<Output = U> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    U: Send + 'static,
{
    fn spawn(
        mut self,
        input_receiver: Receiver<Result<T, E>>,
    ) -> (Receiver<Result<T, U>>, JoinHandle<()>) {
        spawn_concurrent_loop(input_receiver, self.concurrency, move |input| match input {
            Ok(value) => Either::Left(ready(Some(Ok(value)))),
            Err(e) => Either::Right((self.map_fn)(e).map(|output| Some(Err(output)))),
        })
    }
}
