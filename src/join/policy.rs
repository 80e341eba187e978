use super::{CombineError, Slot};

/// The outcome of one combine step: which buffered slots are consumed and
/// what flows out.
#[derive(Debug)]
pub struct Verdict<O> {
    /// Indices into the left buffer the policy has fully consumed. Removed
    /// from the live buffer, highest index first.
    pub dead_left: Vec<usize>,
    /// Indices into the right buffer the policy has fully consumed.
    pub dead_right: Vec<usize>,
    /// Values to emit, in order. `Slot::End` closes the joiner output; any
    /// emission after it is dropped.
    pub emit: Vec<Slot<O>>,
}

impl<O> Verdict<O> {
    /// Take no action: nothing consumed, nothing emitted.
    pub fn hold() -> Self {
        Verdict {
            dead_left: Vec::new(),
            dead_right: Vec::new(),
            emit: Vec::new(),
        }
    }
}

/// A join strategy plugged into the join engine.
///
/// On every arrival the engine hands the policy snapshots of both channel
/// buffers, end markers included, and applies whatever the returned
/// [`Verdict`] dictates. A policy must not assume any particular left/right
/// interleaving; it can rely only on each side being internally ordered and
/// ending with at most one end marker, always last.
///
/// Returning an error is fatal for the joiner instance: buffers stay as they
/// were and the error propagates to the output.
pub trait JoinPolicy<L, R, O> {
    fn combine(&mut self, left: &[Slot<L>], right: &[Slot<R>])
        -> Result<Verdict<O>, CombineError>;
}
