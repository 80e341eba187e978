use std::future::Future;

use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use crate::{concurrency::spawn_concurrent_loop, Concurrency, Stage};

pub struct FilterMapStage<F> {
    pub map_fn: F,
    pub concurrency: Concurrency,
}

impl<In, Out, F, Fut> Stage<In, Out> for FilterMapStage<F>
where
    F: FnMut(In) -> Fut + Send + 'static,
    Fut: Future<Output = Option<Out>> + Send + 'static,
    In: Send + 'static,
    Out: Send + 'static,
{
    fn spawn(self, input_receiver: Receiver<In>) -> (Receiver<Out>, JoinHandle<()>) {
        spawn_concurrent_loop(input_receiver, self.concurrency, self.map_fn)
    }
}
