//! Lost-event accounting.
//!
//! The lost counter records events that a merge step could not fit into a
//! shared destination buffer. Direct [`reserve()`](crate::PortBuffer::reserve)
//! failures never touch it: those are reported to the caller, who decides what
//! to do. A non-zero count means the destination ran out of space this cycle.
//!
//! The counter only grows within a cycle and is reset by
//! [`clear()`](crate::PortBuffer::clear).

use crate::buffer::{PortBuffer, PortBufferRef};
use crate::layout::Header;

impl PortBufferRef<'_> {
    /// Number of events dropped into this buffer during the current cycle.
    #[inline]
    pub fn lost_event_count(&self) -> u32 {
        self.header().lost_count
    }
}

impl PortBuffer<'_> {
    /// Number of events dropped into this buffer during the current cycle.
    #[inline]
    pub fn lost_event_count(&self) -> u32 {
        self.reader().lost_event_count()
    }

    /// Records `count` events that could not be delivered to this buffer.
    ///
    /// Intended for merge steps feeding several sources into one destination.
    /// Saturates at `u32::MAX`.
    #[inline]
    pub fn record_lost(&mut self, count: u32) {
        let mut header = Header::read(self.bytes);
        header.lost_count = header.lost_count.saturating_add(count);
        header.write(self.bytes);
    }
}
