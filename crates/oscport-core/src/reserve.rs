//! Zero-copy reservation: the write path of a port buffer.
//!
//! A reservation checks the event time, carves `size` bytes off the top of the
//! payload region, appends a descriptor, and hands the carved bytes back to
//! the caller to fill in place. All checks run before the first store, so a
//! rejected reservation leaves the buffer untouched.

use crate::buffer::PortBuffer;
use crate::error::EventError;
use crate::index;
use crate::layout::{Descriptor, Header};

impl PortBuffer<'_> {
    /// Reserves `size` payload bytes for an event at frame `time`.
    ///
    /// Returns the reserved bytes, exactly `size` long, for the caller to
    /// fill. Events must be reserved in non-decreasing time order; the buffer
    /// never sorts.
    ///
    /// # Errors
    ///
    /// - [`EventError::TimeOutOfRange`] if `time >= nframes()`
    /// - [`EventError::OutOfOrder`] if `time` precedes the last event
    /// - [`EventError::InsufficientSpace`] if `size > max_event_size()`
    ///
    /// On error the buffer is unchanged.
    pub fn reserve(&mut self, time: u32, size: usize) -> Result<&mut [u8], EventError> {
        let mut header = Header::read(self.bytes);
        index::check_time(self.bytes, &header, time)?;

        match header.next_event_room() {
            Some(room) if size <= room => {}
            room => {
                return Err(EventError::InsufficientSpace {
                    requested: size,
                    available: room.unwrap_or(0),
                });
            }
        }

        let data_offset = header.data_cursor - size;
        Descriptor {
            time,
            size,
            data_offset,
        }
        .write(self.bytes, header.event_count as usize);

        header.data_cursor = data_offset;
        header.event_count += 1;
        header.write(self.bytes);

        Ok(&mut self.bytes[data_offset..data_offset + size])
    }

    /// Copies `data` into the buffer as an event at frame `time`.
    ///
    /// Equivalent to [`reserve()`](Self::reserve) with `data.len()` followed by
    /// a copy into the reserved bytes.
    ///
    /// # Errors
    ///
    /// Same as [`reserve()`](Self::reserve); on error the buffer is unchanged.
    #[inline]
    pub fn write(&mut self, time: u32, data: &[u8]) -> Result<(), EventError> {
        self.reserve(time, data.len())?.copy_from_slice(data);
        Ok(())
    }
}
