use tokio::{
    sync::mpsc::{self, Receiver},
    task::JoinHandle,
};

use crate::Stage;

/// A running fold: every input advances the state, every new state is
/// emitted.
pub struct ScanStage<State, F> {
    pub state: State,
    pub scan_fn: F,
}

impl<In, State, F> Stage<In, State> for ScanStage<State, F>
where
    In: Send + 'static,
    State: Clone + Send + 'static,
    F: FnMut(State, In) -> State + Send + 'static,
{
    fn spawn(mut self, mut input_receiver: Receiver<In>) -> (Receiver<State>, JoinHandle<()>) {
        let (output_sender, output_receiver) = mpsc::channel(1);

        let h = tokio::spawn(async move {
            while let Some(input) = input_receiver.recv().await {
                self.state = (self.scan_fn)(self.state.clone(), input);

                if output_sender.send(self.state.clone()).await.is_err() {
                    break;
                }
            }
        });

        (output_receiver, h)
    }
}
