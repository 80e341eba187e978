use std::marker::PhantomData;

use super::{CombineError, JoinPolicy, Slot};

/// Emissions produced by a single combine step.
#[derive(Debug)]
pub struct Step<O> {
    /// Values to forward downstream, in order.
    pub emit: Vec<O>,
    /// True when this step emitted the output end marker.
    pub finished: bool,
}

impl<O> Step<O> {
    fn empty() -> Self {
        Step {
            emit: Vec::new(),
            finished: false,
        }
    }
}

/// The synchronous two-channel join engine.
///
/// Owns one ordered buffer per channel and drives a [`JoinPolicy`] on every
/// arrival once activated. [`Joiner`](super::Joiner) wraps this in a spawned
/// task; the core is usable on its own when arrival order needs to be
/// scripted, as in tests.
///
/// The engine performs no combining work before [`JoinCore::activate`] is
/// called: arrivals only buffer. Once the policy emits its end marker the
/// instance is done - later arrivals still buffer (they are wasted, not
/// rejected) and later emissions are dropped silently.
pub struct JoinCore<L, R, O, P> {
    left: Vec<Slot<L>>,
    right: Vec<Slot<R>>,
    policy: P,
    started: bool,
    done: bool,
    _out: PhantomData<fn() -> O>,
}

impl<L, R, O, P> JoinCore<L, R, O, P>
where
    P: JoinPolicy<L, R, O>,
{
    pub fn new(policy: P) -> Self {
        JoinCore {
            left: Vec::new(),
            right: Vec::new(),
            policy,
            started: false,
            done: false,
            _out: PhantomData,
        }
    }

    /// Activates the output side and runs one combine step immediately,
    /// covering the case where both channels completed before anything
    /// consumed the output.
    pub fn activate(&mut self) -> Result<Step<O>, CombineError> {
        self.started = true;
        self.fire()
    }

    /// Appends an arrival to the left buffer and, once activated, combines.
    pub fn push_left(&mut self, slot: Slot<L>) -> Result<Step<O>, CombineError> {
        self.left.push(slot);
        self.fire()
    }

    /// Appends an arrival to the right buffer and, once activated, combines.
    pub fn push_right(&mut self, slot: Slot<R>) -> Result<Step<O>, CombineError> {
        self.right.push(slot);
        self.fire()
    }

    /// Number of slots currently buffered on the left channel.
    pub fn left_buffered(&self) -> usize {
        self.left.len()
    }

    /// Number of slots currently buffered on the right channel.
    pub fn right_buffered(&self) -> usize {
        self.right.len()
    }

    /// True once the output end marker has been emitted. One-shot: it never
    /// resets, and all emissions requested afterwards are dropped.
    pub fn is_done(&self) -> bool {
        self.done
    }

    fn fire(&mut self) -> Result<Step<O>, CombineError> {
        if !self.started {
            return Ok(Step::empty());
        }

        // On error the buffers stay untouched - the instance is dead anyway.
        let verdict = self.policy.combine(&self.left, &self.right)?;

        remove(&mut self.left, verdict.dead_left);
        remove(&mut self.right, verdict.dead_right);

        let mut step = Step::empty();
        for slot in verdict.emit {
            if self.done {
                break;
            }
            match slot {
                Slot::End => {
                    self.done = true;
                    step.finished = true;
                }
                Slot::Item(value) => step.emit.push(value),
            }
        }

        Ok(step)
    }
}

/// Removes the given indices from the live buffer, highest first, so earlier
/// removals do not shift the later ones.
fn remove<T>(buffer: &mut Vec<Slot<T>>, mut dead: Vec<usize>) {
    dead.sort_unstable();
    dead.dedup();
    for index in dead.into_iter().rev() {
        if index < buffer.len() {
            buffer.remove(index);
        }
    }
}
