use super::{CombineError, GroupBuffer, JoinPolicy, Slot, Verdict};

/// A joiner policy that keeps every left value until the left channel ends,
/// then folds each right arrival against the complete left sequence.
///
/// The left channel is the build side: until its end marker shows up nothing
/// is consumed and nothing is emitted. From then on the mapper runs once per
/// right value with all left values, the right value, and a flag that is
/// true only for values in the terminal right group - the batch processed
/// together with the right end marker - giving the mapper exactly one chance
/// for final bookkeeping. The mapper may return any number of outputs,
/// including none.
///
/// A right channel that ends without any value produces no mapper calls and
/// just closes the output.
pub struct RightAfterLeft<R, F> {
    mapper: F,
    groups: GroupBuffer<R>,
}

impl<R: Clone, F> RightAfterLeft<R, F> {
    pub fn new(mapper: F) -> Self {
        RightAfterLeft {
            mapper,
            groups: GroupBuffer::new(),
        }
    }
}

impl<L, R, O, F> JoinPolicy<L, R, O> for RightAfterLeft<R, F>
where
    L: Clone,
    R: Clone,
    F: FnMut(&[L], &R, bool) -> Vec<O>,
{
    fn combine(
        &mut self,
        left: &[Slot<L>],
        right: &[Slot<R>],
    ) -> Result<Verdict<O>, CombineError> {
        // Build side not fully materialized yet.
        if !left.last().is_some_and(Slot::is_end) {
            return Ok(Verdict::hold());
        }

        let left_values: Vec<L> = left.iter().filter_map(|s| s.item().cloned()).collect();
        let right_ended = right.iter().any(Slot::is_end);

        let groups = match self.groups.advance(right) {
            Ok(groups) => groups,
            // The right channel ended with nothing left to tag as the final
            // group; there is no terminal mapper call to make.
            Err(CombineError::EmptyFinalGroup) => Vec::new(),
            Err(e) => return Err(e),
        };

        let mut emit: Vec<Slot<O>> = Vec::new();
        for (right_value, is_last) in groups {
            emit.extend(
                (self.mapper)(&left_values, &right_value, is_last)
                    .into_iter()
                    .map(Slot::Item),
            );
        }
        if right_ended {
            emit.push(Slot::End);
        }

        Ok(Verdict {
            // Left values stay put until the join completes.
            dead_left: if right_ended {
                (0..left.len()).collect()
            } else {
                Vec::new()
            },
            // The group buffer remembers what it has seen; the joiner-level
            // right buffer is cleared on every firing to bound its growth.
            dead_right: (0..right.len()).collect(),
            emit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::JoinCore;

    /// Sums all left values into each right value; a sum of exactly 10 is
    /// filtered out, and the terminal group gets a 0.5 bonus.
    fn sum_mapper(lefts: &[i32], right: &i32, last: bool) -> Vec<f64> {
        let sum = lefts.iter().sum::<i32>() + right;
        if sum == 10 {
            return vec![];
        }
        let mut value = sum as f64;
        if last {
            value += 0.5;
        }
        vec![value]
    }

    fn core() -> JoinCore<i32, i32, f64, RightAfterLeft<i32, impl FnMut(&[i32], &i32, bool) -> Vec<f64>>>
    {
        let mut core = JoinCore::new(RightAfterLeft::new(sum_mapper));
        core.activate().unwrap();
        core
    }

    #[test]
    fn no_output_before_the_left_end_marker() {
        let mut core = core();

        assert!(core.push_right(Slot::Item(5)).unwrap().emit.is_empty());
        assert!(core.push_right(Slot::Item(4)).unwrap().emit.is_empty());
        assert!(core.push_left(Slot::Item(1)).unwrap().emit.is_empty());
        assert!(core.push_right(Slot::Item(3)).unwrap().emit.is_empty());
        assert!(core.push_right(Slot::End).unwrap().emit.is_empty());
        assert!(core.push_left(Slot::Item(2)).unwrap().emit.is_empty());
        assert!(core.push_left(Slot::Item(3)).unwrap().emit.is_empty());

        // right arrivals were buffered, not dropped
        assert_eq!(core.right_buffered(), 4);

        let step = core.push_left(Slot::End).unwrap();
        assert_eq!(step.emit, vec![11.0, 9.5]);
        assert!(step.finished);
    }

    #[test]
    fn folds_each_right_arrival_against_all_left_values() {
        let mut core = core();

        for value in [1, 2, 3] {
            core.push_left(Slot::Item(value)).unwrap();
        }
        core.push_left(Slot::End).unwrap();

        assert!(core.push_right(Slot::Item(5)).unwrap().emit.is_empty());
        // 5 flushes one call late: 6 + 5 = 11
        assert_eq!(core.push_right(Slot::Item(4)).unwrap().emit, vec![11.0]);
        // 6 + 4 = 10 is filtered out by the mapper
        assert!(core.push_right(Slot::Item(3)).unwrap().emit.is_empty());

        let step = core.push_right(Slot::End).unwrap();
        // terminal group: 6 + 3 + 0.5
        assert_eq!(step.emit, vec![9.5]);
        assert!(step.finished);
    }

    #[test]
    fn buffers_drain_on_completion() {
        let mut core = core();

        for value in [1, 2, 3] {
            core.push_left(Slot::Item(value)).unwrap();
        }
        core.push_left(Slot::End).unwrap();
        for value in [5, 4, 3] {
            core.push_right(Slot::Item(value)).unwrap();
        }
        core.push_right(Slot::End).unwrap();

        assert!(core.is_done());
        assert_eq!(core.left_buffered(), 0);
        assert_eq!(core.right_buffered(), 0);
    }

    #[test]
    fn empty_right_channel_emits_only_the_end_marker() {
        let mut core = core();

        core.push_left(Slot::Item(1)).unwrap();
        core.push_left(Slot::End).unwrap();

        let step = core.push_right(Slot::End).unwrap();
        assert!(step.emit.is_empty());
        assert!(step.finished);
        assert_eq!(core.left_buffered(), 0);
        assert_eq!(core.right_buffered(), 0);
    }

    #[test]
    fn empty_left_channel_still_folds_every_right_value() {
        let calls = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let seen = calls.clone();
        let mapper = move |lefts: &[i32], right: &i32, last: bool| {
            seen.borrow_mut().push((lefts.to_vec(), *right, last));
            vec![*right]
        };

        let mut core = JoinCore::new(RightAfterLeft::new(mapper));
        core.activate().unwrap();

        core.push_left(Slot::End).unwrap();
        core.push_right(Slot::Item(7)).unwrap();
        core.push_right(Slot::Item(8)).unwrap();
        let step = core.push_right(Slot::End).unwrap();

        assert_eq!(step.emit, vec![8]);
        assert!(step.finished);
        assert_eq!(
            calls.borrow().as_slice(),
            &[(vec![], 7, false), (vec![], 8, true)]
        );
    }

    #[test]
    fn right_values_arriving_before_the_left_end_flush_together() {
        let mut core = core();

        for value in [5, 4, 3] {
            core.push_right(Slot::Item(value)).unwrap();
        }
        core.push_right(Slot::End).unwrap();

        for value in [1, 2, 3] {
            core.push_left(Slot::Item(value)).unwrap();
        }
        let step = core.push_left(Slot::End).unwrap();

        assert_eq!(step.emit, vec![11.0, 9.5]);
        assert!(step.finished);
        assert_eq!(core.left_buffered(), 0);
        assert_eq!(core.right_buffered(), 0);
    }
}
