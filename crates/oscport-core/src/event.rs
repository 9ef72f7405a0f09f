//! Read-only event views handed out to readers.

use crate::layout::Descriptor;

/// One timestamped OSC message as seen by a reader.
///
/// `data` borrows directly from the port buffer; no bytes are copied. The view
/// is only meaningful until the writer clears the buffer for the next cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event<'a> {
    /// Frame offset from the start of the cycle.
    pub time: u32,
    /// Raw message bytes.
    pub data: &'a [u8],
}

impl<'a> Event<'a> {
    /// Returns `None` if the descriptor's payload lies outside `bytes`.
    #[inline]
    pub(crate) fn from_descriptor(bytes: &'a [u8], desc: Descriptor) -> Option<Self> {
        let range = desc.payload_range(bytes.len())?;
        Some(Self {
            time: desc.time,
            data: &bytes[range],
        })
    }

    /// Number of payload bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Iterator over the events of a port buffer in time order.
///
/// Created by [`PortBufferRef::events()`](crate::PortBufferRef::events).
/// Iteration ends early at a descriptor whose payload lies outside the region.
#[derive(Clone, Debug)]
pub struct Events<'a> {
    bytes: &'a [u8],
    next: usize,
    count: usize,
}

impl<'a> Events<'a> {
    pub(crate) fn new(bytes: &'a [u8], count: usize) -> Self {
        Self {
            bytes,
            next: 0,
            count,
        }
    }
}

impl<'a> Iterator for Events<'a> {
    type Item = Event<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let desc = Descriptor::read(self.bytes, self.next);
        let event = Event::from_descriptor(self.bytes, desc);
        self.next = if event.is_some() {
            self.next + 1
        } else {
            self.count
        };
        event
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.count - self.next))
    }
}

impl core::iter::FusedIterator for Events<'_> {}
