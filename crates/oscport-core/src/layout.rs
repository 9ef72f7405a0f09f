//! In-place layout of a port buffer region.
//!
//! A port buffer is a caller-owned `[u8]` region partitioned into three parts:
//!
//! ```text
//! 0        HEADER_SIZE                          data_cursor        capacity
//! | header | desc 0 | desc 1 | ... -->   free   <-- ... | data 1 | data 0 |
//! ```
//!
//! Descriptors are appended upward from the end of the header; payload bytes
//! are carved downward from the end of the region. The two bump regions grow
//! toward each other and never overlap, so resetting the buffer is a single
//! cursor store rather than per-event cleanup.
//!
//! All fields are stored in native byte order and accessed through byte
//! slices, which keeps the layout free of alignment requirements on the
//! region itself.

use crate::error::LayoutError;

/// Identifies a formatted port buffer region ("OSCP").
pub const MAGIC: u32 = 0x4F53_4350;

/// Size of the buffer header in bytes.
pub const HEADER_SIZE: usize = 32;

/// Size of one event descriptor in bytes.
pub const DESCRIPTOR_SIZE: usize = 24;

/// Smallest region that can hold a header and one zero-length event.
pub const MIN_CAPACITY: usize = HEADER_SIZE + DESCRIPTOR_SIZE;

const MAGIC_AT: usize = 0;
const NFRAMES_AT: usize = 4;
const COUNT_AT: usize = 8;
const LOST_AT: usize = 12;
const CURSOR_AT: usize = 16;
const CAPACITY_AT: usize = 24;

const DESC_TIME_AT: usize = 0;
const DESC_SIZE_AT: usize = 8;
const DESC_OFFSET_AT: usize = 16;

/// Returns the region size needed to hold `max_events` events carrying
/// `max_payload_bytes` bytes of payload in total.
///
/// Allocators use this to size a region for the worst-case load of one cycle.
/// Saturates at `usize::MAX`; see [`checked_required_capacity`].
pub const fn required_capacity(max_events: usize, max_payload_bytes: usize) -> usize {
    match checked_required_capacity(max_events, max_payload_bytes) {
        Some(capacity) => capacity,
        None => usize::MAX,
    }
}

/// Like [`required_capacity`], but returns `None` if the size overflows `usize`.
pub const fn checked_required_capacity(
    max_events: usize,
    max_payload_bytes: usize,
) -> Option<usize> {
    let Some(descriptors) = max_events.checked_mul(DESCRIPTOR_SIZE) else {
        return None;
    };
    let Some(fixed) = descriptors.checked_add(HEADER_SIZE) else {
        return None;
    };
    fixed.checked_add(max_payload_bytes)
}

#[inline]
fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[at..at + 4]);
    u32::from_ne_bytes(raw)
}

#[inline]
fn write_u32(bytes: &mut [u8], at: usize, value: u32) {
    bytes[at..at + 4].copy_from_slice(&value.to_ne_bytes());
}

#[inline]
fn read_len(bytes: &[u8], at: usize) -> usize {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[at..at + 8]);
    u64::from_ne_bytes(raw) as usize
}

#[inline]
fn write_len(bytes: &mut [u8], at: usize, value: usize) {
    bytes[at..at + 8].copy_from_slice(&(value as u64).to_ne_bytes());
}

/// Decoded buffer header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Header {
    pub magic: u32,
    /// Cycle length in frames; event times must be below this.
    pub nframes: u32,
    pub event_count: u32,
    pub lost_count: u32,
    /// Lowest payload byte in use. Equals the capacity when no payload is stored.
    pub data_cursor: usize,
    /// Region size recorded at format time.
    pub capacity: usize,
}

impl Header {
    #[inline]
    pub fn read(bytes: &[u8]) -> Self {
        Self {
            magic: read_u32(bytes, MAGIC_AT),
            nframes: read_u32(bytes, NFRAMES_AT),
            event_count: read_u32(bytes, COUNT_AT),
            lost_count: read_u32(bytes, LOST_AT),
            data_cursor: read_len(bytes, CURSOR_AT),
            capacity: read_len(bytes, CAPACITY_AT),
        }
    }

    #[inline]
    pub fn write(&self, bytes: &mut [u8]) {
        write_u32(bytes, MAGIC_AT, self.magic);
        write_u32(bytes, NFRAMES_AT, self.nframes);
        write_u32(bytes, COUNT_AT, self.event_count);
        write_u32(bytes, LOST_AT, self.lost_count);
        write_len(bytes, CURSOR_AT, self.data_cursor);
        write_len(bytes, CAPACITY_AT, self.capacity);
    }

    /// Free bytes left for the payload of one more event, after accounting
    /// for the descriptor that event would add. `None` when even the
    /// descriptor does not fit.
    #[inline]
    pub fn next_event_room(&self) -> Option<usize> {
        self.data_cursor
            .checked_sub(descriptor_end(self.event_count as usize + 1))
    }

    #[inline]
    pub fn max_event_size(&self) -> usize {
        self.next_event_room().unwrap_or(0)
    }
}

/// Decoded event descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Descriptor {
    pub time: u32,
    pub size: usize,
    /// Absolute offset of the payload from the start of the region.
    pub data_offset: usize,
}

impl Descriptor {
    /// Payload byte range, or `None` if it does not lie within `capacity`.
    #[inline]
    pub fn payload_range(&self, capacity: usize) -> Option<core::ops::Range<usize>> {
        let end = self.data_offset.checked_add(self.size)?;
        (end <= capacity).then_some(self.data_offset..end)
    }

    #[inline]
    pub fn read(bytes: &[u8], index: usize) -> Self {
        let at = descriptor_end(index);
        Self {
            time: read_u32(bytes, at + DESC_TIME_AT),
            size: read_len(bytes, at + DESC_SIZE_AT),
            data_offset: read_len(bytes, at + DESC_OFFSET_AT),
        }
    }

    #[inline]
    pub fn write(&self, bytes: &mut [u8], index: usize) {
        let at = descriptor_end(index);
        write_u32(bytes, at + DESC_TIME_AT, self.time);
        write_u32(bytes, at + DESC_TIME_AT + 4, 0);
        write_len(bytes, at + DESC_SIZE_AT, self.size);
        write_len(bytes, at + DESC_OFFSET_AT, self.data_offset);
    }
}

/// Byte offset just past the first `count` descriptors.
#[inline]
pub(crate) const fn descriptor_end(count: usize) -> usize {
    HEADER_SIZE + count * DESCRIPTOR_SIZE
}

/// Writes a fresh header into `bytes` and leaves the buffer empty.
pub(crate) fn format(bytes: &mut [u8], nframes: u32) -> Result<(), LayoutError> {
    if bytes.len() < MIN_CAPACITY {
        return Err(LayoutError::TooSmall {
            capacity: bytes.len(),
            required: MIN_CAPACITY,
        });
    }
    if nframes == 0 {
        return Err(LayoutError::ZeroFrames);
    }
    Header {
        magic: MAGIC,
        nframes,
        event_count: 0,
        lost_count: 0,
        data_cursor: bytes.len(),
        capacity: bytes.len(),
    }
    .write(bytes);
    Ok(())
}

/// Checks that `bytes` holds a formatted, internally consistent header.
///
/// The recorded capacity must match the slice length, so a region cannot be
/// attached through a shorter or longer view than the one it was formatted in.
pub(crate) fn validate(bytes: &[u8]) -> Result<Header, LayoutError> {
    if bytes.len() < MIN_CAPACITY {
        return Err(LayoutError::TooSmall {
            capacity: bytes.len(),
            required: MIN_CAPACITY,
        });
    }
    let header = Header::read(bytes);
    if header.magic != MAGIC {
        return Err(LayoutError::BadMagic(header.magic));
    }
    if header.nframes == 0
        || header.capacity != bytes.len()
        || header.data_cursor > bytes.len()
        || descriptor_end(header.event_count as usize) > header.data_cursor
    {
        return Err(LayoutError::Corrupt);
    }
    Ok(header)
}

/// Resets the buffer to the empty state. Only the header is touched.
#[inline]
pub(crate) fn clear(bytes: &mut [u8]) {
    let mut header = Header::read(bytes);
    header.event_count = 0;
    header.lost_count = 0;
    header.data_cursor = bytes.len();
    header.write(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_then_validate() {
        let mut region = [0xAAu8; 128];
        format(&mut region, 256).unwrap();
        let header = validate(&region).unwrap();
        assert_eq!(header.magic, MAGIC);
        assert_eq!(header.nframes, 256);
        assert_eq!(header.event_count, 0);
        assert_eq!(header.lost_count, 0);
        assert_eq!(header.data_cursor, 128);
        assert_eq!(header.capacity, 128);
    }

    #[test]
    fn format_rejects_tiny_region() {
        let mut region = [0u8; MIN_CAPACITY - 1];
        assert_eq!(
            format(&mut region, 64),
            Err(LayoutError::TooSmall {
                capacity: MIN_CAPACITY - 1,
                required: MIN_CAPACITY,
            })
        );
    }

    #[test]
    fn format_rejects_zero_frames() {
        let mut region = [0u8; 64];
        assert_eq!(format(&mut region, 0), Err(LayoutError::ZeroFrames));
    }

    #[test]
    fn validate_rejects_unformatted_region() {
        let region = [0u8; 64];
        assert_eq!(validate(&region), Err(LayoutError::BadMagic(0)));
    }

    #[test]
    fn validate_rejects_overlapping_regions() {
        let mut region = [0u8; 64];
        format(&mut region, 64).unwrap();
        let mut header = Header::read(&region);
        header.event_count = 2;
        header.write(&mut region);
        assert_eq!(validate(&region), Err(LayoutError::Corrupt));
    }

    #[test]
    fn validate_rejects_resized_view() {
        let mut region = [0u8; 256];
        format(&mut region, 64).unwrap();
        assert_eq!(validate(&region[..250]), Err(LayoutError::Corrupt));

        let mut larger = [0u8; 300];
        larger[..256].copy_from_slice(&region);
        assert_eq!(validate(&larger), Err(LayoutError::Corrupt));
    }

    #[test]
    fn payload_range_stays_inside_region() {
        let desc = Descriptor {
            time: 0,
            size: 10,
            data_offset: 246,
        };
        assert_eq!(desc.payload_range(256), Some(246..256));
        assert_eq!(desc.payload_range(250), None);

        let wrapping = Descriptor {
            time: 0,
            size: usize::MAX,
            data_offset: 2,
        };
        assert_eq!(wrapping.payload_range(256), None);
    }

    #[test]
    fn empty_buffer_space_reserves_one_descriptor() {
        let mut region = [0u8; 256];
        format(&mut region, 64).unwrap();
        let header = Header::read(&region);
        assert_eq!(header.max_event_size(), 256 - HEADER_SIZE - DESCRIPTOR_SIZE);
    }

    #[test]
    fn full_buffer_has_no_room_for_a_descriptor() {
        let mut region = [0u8; 128];
        format(&mut region, 64).unwrap();
        let mut header = Header::read(&region);
        header.event_count = 1;
        header.data_cursor = descriptor_end(1);
        assert_eq!(header.next_event_room(), None);
        assert_eq!(header.max_event_size(), 0);

        header.data_cursor = descriptor_end(2);
        assert_eq!(header.next_event_room(), Some(0));
    }

    #[test]
    fn descriptor_round_trip_in_place() {
        let mut region = [0u8; 128];
        format(&mut region, 64).unwrap();
        let desc = Descriptor {
            time: 17,
            size: 9,
            data_offset: 119,
        };
        desc.write(&mut region, 1);
        assert_eq!(Descriptor::read(&region, 1), desc);
    }

    #[test]
    fn clear_keeps_magic_and_cycle_length() {
        let mut region = [0u8; 128];
        format(&mut region, 32).unwrap();
        let mut header = Header::read(&region);
        header.event_count = 1;
        header.lost_count = 4;
        header.data_cursor = 100;
        header.write(&mut region);

        clear(&mut region);
        let header = Header::read(&region);
        assert_eq!(header.magic, MAGIC);
        assert_eq!(header.nframes, 32);
        assert_eq!(header.event_count, 0);
        assert_eq!(header.lost_count, 0);
        assert_eq!(header.data_cursor, 128);
        assert_eq!(header.capacity, 128);
    }

    #[test]
    fn required_capacity_matches_layout() {
        assert_eq!(required_capacity(0, 0), HEADER_SIZE);
        assert_eq!(required_capacity(1, 0), MIN_CAPACITY);
        assert_eq!(
            required_capacity(4, 100),
            HEADER_SIZE + 4 * DESCRIPTOR_SIZE + 100
        );
    }

    #[test]
    fn required_capacity_overflow() {
        let huge = usize::MAX / DESCRIPTOR_SIZE + 1;
        assert_eq!(checked_required_capacity(huge, 0), None);
        assert_eq!(checked_required_capacity(0, usize::MAX), None);
        assert_eq!(checked_required_capacity(1, 0), Some(MIN_CAPACITY));
        assert_eq!(required_capacity(huge, 8), usize::MAX);
    }
}
