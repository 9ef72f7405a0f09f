//! Event index: time-ordered descriptor lookup and the ordering rule.
//!
//! Descriptors are only ever appended, and an append is accepted only when its
//! time is not earlier than the last descriptor's time. The descriptor array
//! is therefore sorted at all times and index 0 is always the earliest event.
//! Nothing is ever re-sorted.

use crate::error::EventError;
use crate::event::Event;
use crate::layout::{Descriptor, Header};

/// Looks up the `index`-th earliest event.
#[inline]
pub(crate) fn lookup<'a>(
    bytes: &'a [u8],
    header: &Header,
    index: u32,
) -> Result<Event<'a>, EventError> {
    if index >= header.event_count {
        return Err(EventError::NoData {
            index,
            count: header.event_count,
        });
    }
    let desc = Descriptor::read(bytes, index as usize);
    Event::from_descriptor(bytes, desc).ok_or(EventError::Corrupt { index })
}

/// Time of the most recently appended event, if any.
#[inline]
pub(crate) fn last_time(bytes: &[u8], header: &Header) -> Option<u32> {
    header
        .event_count
        .checked_sub(1)
        .map(|last| Descriptor::read(bytes, last as usize).time)
}

/// Checks that an event at `time` may be appended.
///
/// The cycle range is checked first, then ordering against the last event.
/// The first event of a cycle has no ordering constraint.
#[inline]
pub(crate) fn check_time(bytes: &[u8], header: &Header, time: u32) -> Result<(), EventError> {
    if time >= header.nframes {
        return Err(EventError::TimeOutOfRange {
            time,
            nframes: header.nframes,
        });
    }
    match last_time(bytes, header) {
        Some(last) if time < last => Err(EventError::OutOfOrder { time, last }),
        _ => Ok(()),
    }
}
