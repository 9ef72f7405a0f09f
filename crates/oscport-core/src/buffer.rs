//! Port buffer handles.
//!
//! A port buffer is a fixed-size byte region owned by the graph's buffer pool
//! and bound to one port for one cycle. This module gives that region two
//! typed faces:
//!
//! - [`PortBuffer`]: the writer handle (`&mut [u8]`). One per buffer per
//!   cycle. Clears the buffer and appends events via
//!   [`reserve()`](PortBuffer::reserve) / [`write()`](PortBuffer::write).
//! - [`PortBufferRef`]: the reader handle (`&[u8]`). `Copy`, so any number of
//!   downstream readers can query the buffer once the writer phase is done.
//!
//! # Cycle contract
//!
//! ```text
//! Empty --clear--> Writable(0) --reserve/write ok--> Writable(k+1)
//!                  Writable(k) --reserve/write err--> Writable(k)   (unchanged)
//!                  Writable(k) --next cycle clear--> Writable(0)
//! ```
//!
//! The borrow checker enforces the single-writer rule within a process: a
//! `PortBuffer` holds the region mutably, so no reader can observe a
//! half-written cycle. Across threads, the graph scheduler must order the
//! writer phase before the reader phases; these handles do no synchronization.
//!
//! Reading a region whose writer has not cleared it this cycle returns the
//! previous cycle's events. That is a caller error; the handles cannot tell
//! the difference.

use crate::error::{EventError, LayoutError};
use crate::event::{Event, Events};
use crate::index;
use crate::layout::{self, Header};

/// Read-only handle to a formatted port buffer.
#[derive(Clone, Copy)]
pub struct PortBufferRef<'a> {
    pub(crate) bytes: &'a [u8],
}

impl<'a> PortBufferRef<'a> {
    /// Binds a reader to an already formatted region.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if the region was never formatted or its header
    /// is inconsistent with its size.
    pub fn attach(bytes: &'a [u8]) -> Result<Self, LayoutError> {
        layout::validate(bytes)?;
        Ok(Self { bytes })
    }

    #[inline]
    pub(crate) fn header(&self) -> Header {
        Header::read(self.bytes)
    }

    /// Total size of the region in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Cycle length in frames recorded at format time.
    #[inline]
    pub fn nframes(&self) -> u32 {
        self.header().nframes
    }

    /// Number of events in the buffer. O(1).
    #[inline]
    pub fn event_count(&self) -> u32 {
        self.header().event_count
    }

    /// Returns true if the buffer holds no events.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.event_count() == 0
    }

    /// Returns the `index`-th earliest event.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::NoData`] if `index >= event_count()`, which
    /// includes every index on an empty buffer.
    #[inline]
    pub fn event(&self, index: u32) -> Result<Event<'a>, EventError> {
        index::lookup(self.bytes, &self.header(), index)
    }

    /// Iterates all events in time order.
    pub fn events(&self) -> Events<'a> {
        Events::new(self.bytes, self.event_count() as usize)
    }

    /// Largest payload a further reservation could take, or 0 if full.
    #[inline]
    pub fn max_event_size(&self) -> usize {
        self.header().max_event_size()
    }
}

impl core::fmt::Debug for PortBufferRef<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let header = self.header();
        f.debug_struct("PortBufferRef")
            .field("capacity", &self.capacity())
            .field("nframes", &header.nframes)
            .field("event_count", &header.event_count)
            .field("lost_count", &header.lost_count)
            .finish()
    }
}

/// Writer handle to a port buffer.
///
/// Owns the region mutably for the duration of the writer phase. Query
/// operations are shared with [`PortBufferRef`] via [`reader()`](Self::reader).
pub struct PortBuffer<'a> {
    pub(crate) bytes: &'a mut [u8],
}

impl<'a> PortBuffer<'a> {
    /// Formats `bytes` as an empty port buffer for cycles of `nframes` frames.
    ///
    /// Called once when the allocator hands out a region. Per-cycle resets use
    /// [`clear()`](Self::clear).
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::TooSmall`] if the region cannot hold a header and
    /// one descriptor, or [`LayoutError::ZeroFrames`] if `nframes == 0`.
    pub fn format(bytes: &'a mut [u8], nframes: u32) -> Result<Self, LayoutError> {
        layout::format(bytes, nframes)?;
        #[cfg(feature = "tracing")]
        tracing::debug!("port_buffer_format: {} bytes, {nframes} frames", bytes.len());
        Ok(Self { bytes })
    }

    /// Binds a writer to an already formatted region.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if the region was never formatted or its header
    /// is inconsistent with its size.
    pub fn attach(bytes: &'a mut [u8]) -> Result<Self, LayoutError> {
        layout::validate(bytes)?;
        Ok(Self { bytes })
    }

    /// Borrows a read-only view of the buffer.
    #[inline]
    pub fn reader(&self) -> PortBufferRef<'_> {
        PortBufferRef { bytes: &*self.bytes }
    }

    /// Ends the writer phase, returning a reader with the full region lifetime.
    #[inline]
    pub fn into_reader(self) -> PortBufferRef<'a> {
        PortBufferRef { bytes: self.bytes }
    }

    /// Empties the buffer: no events, lost count 0, all payload space free.
    ///
    /// Must be called once per cycle before the first write to an output
    /// port's buffer. Never call it on a buffer another port is reading this
    /// cycle; that is not checked.
    #[inline]
    pub fn clear(&mut self) {
        layout::clear(self.bytes);
    }

    /// Total size of the region in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Cycle length in frames.
    #[inline]
    pub fn nframes(&self) -> u32 {
        self.reader().nframes()
    }

    /// Number of events in the buffer. O(1).
    #[inline]
    pub fn event_count(&self) -> u32 {
        self.reader().event_count()
    }

    /// Returns the `index`-th earliest event.
    #[inline]
    pub fn event(&self, index: u32) -> Result<Event<'_>, EventError> {
        self.reader().event(index)
    }

    /// Largest payload a further reservation could take, or 0 if full.
    #[inline]
    pub fn max_event_size(&self) -> usize {
        self.reader().max_event_size()
    }
}

impl core::fmt::Debug for PortBuffer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let header = self.reader().header();
        f.debug_struct("PortBuffer")
            .field("capacity", &self.capacity())
            .field("nframes", &header.nframes)
            .field("event_count", &header.event_count)
            .field("lost_count", &header.lost_count)
            .field("max_event_size", &header.max_event_size())
            .finish()
    }
}
