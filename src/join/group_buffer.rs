use super::{CombineError, Slot};

/// Regroups successive runs of channel slots into batches tagged with
/// whether a value belongs to the terminal group.
///
/// Values observed in one call are held back until the next call, so a value
/// surfaces one step after it arrived - except on the call carrying the end
/// marker, which flushes everything held plus everything new and tags the
/// final value `true`. After that the buffer is exhausted and yields empty
/// batches forever; the exhausted state never resets, so an instance must
/// not be shared between joiners.
///
/// ```rust
/// use confluence::join::{GroupBuffer, Slot};
///
/// let mut groups = GroupBuffer::new();
/// assert_eq!(groups.advance(&[Slot::Item(1), Slot::Item(2)]).unwrap(), vec![]);
/// assert_eq!(groups.advance(&[Slot::Item(3)]).unwrap(), vec![(1, false), (2, false)]);
/// assert_eq!(groups.advance(&[Slot::End]).unwrap(), vec![(3, true)]);
/// ```
#[derive(Debug, Default)]
pub struct GroupBuffer<T> {
    pending: Vec<T>,
    exhausted: bool,
}

impl<T: Clone> GroupBuffer<T> {
    pub fn new() -> Self {
        GroupBuffer {
            pending: Vec::new(),
            exhausted: false,
        }
    }

    /// True once the end marker has been processed.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Feeds the slots observed since the previous call and returns the
    /// `(value, is_last)` pairs that are ready to be processed.
    ///
    /// Fails with [`CombineError::EmptyFinalGroup`] when the end marker
    /// arrives with neither held-back nor new values: no value exists to
    /// carry the `is_last` tag.
    pub fn advance(&mut self, slots: &[Slot<T>]) -> Result<Vec<(T, bool)>, CombineError> {
        if self.exhausted {
            return Ok(Vec::new());
        }

        let mut flushed: Vec<(T, bool)> = self.pending.drain(..).map(|v| (v, false)).collect();
        let ended = slots.iter().any(Slot::is_end);
        let new_values = slots.iter().filter_map(|s| s.item().cloned());

        if ended {
            self.exhausted = true;
            flushed.extend(new_values.map(|v| (v, false)));
            match flushed.last_mut() {
                Some(last) => last.1 = true,
                None => return Err(CombineError::EmptyFinalGroup),
            }
            Ok(flushed)
        } else {
            self.pending = new_values.collect();
            Ok(flushed)
        }
    }
}
