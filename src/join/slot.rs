/// One position in a joiner channel buffer: a buffered item or the end
/// marker reifying the channel's completion.
///
/// A buffer holds at most one `End`, and when present it is the last slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<T> {
    Item(T),
    End,
}

impl<T> Slot<T> {
    pub fn is_end(&self) -> bool {
        matches!(self, Slot::End)
    }

    /// The buffered item, unless this slot is the end marker.
    pub fn item(&self) -> Option<&T> {
        match self {
            Slot::Item(value) => Some(value),
            Slot::End => None,
        }
    }
}
