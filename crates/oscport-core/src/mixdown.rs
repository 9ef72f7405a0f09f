//! Mixdown: merging several source port buffers into one destination.
//!
//! When more than one output port feeds an input port, the graph merges the
//! sources' events into the input port's buffer before the reader runs. The
//! merge is a k-way walk over the already sorted sources, so the destination
//! stays in time order without any sorting. Cursor state lives in a fixed-size
//! array; no allocation happens on the merge path.
//!
//! Events that do not fit are counted on the destination's lost counter, so a
//! non-zero lost count always means the destination filled up. Events the
//! destination rejects for any other reason are only reported to the caller.

use crate::buffer::{PortBuffer, PortBufferRef};
use crate::error::{EventError, MixdownError};
use crate::event::Event;

/// Maximum number of sources a single mixdown can merge.
///
/// Fixed-size cursor table keeps the merge allocation-free.
pub const MAX_MIXDOWN_SOURCES: usize = 16;

/// Outcome of a [`mixdown()`].
#[must_use]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MixdownReport {
    /// Events copied into the destination.
    pub written: u32,
    /// Events that did not fit and were added to the lost counter.
    pub lost: u32,
    /// Events dropped because the destination rejected their time. These do
    /// not touch the lost counter.
    pub skipped: u32,
}

/// Clears `dest` and merges every event of `sources` into it in time order.
///
/// Events with equal times keep source order: an event from `sources[0]`
/// lands before one from `sources[1]` at the same frame.
///
/// When the destination runs out of space, the event that failed and every
/// event not yet merged are recorded as lost and the merge stops. An event
/// outside the destination's cycle is counted in [`MixdownReport::skipped`]
/// and the merge continues.
///
/// # Errors
///
/// Returns [`MixdownError::TooManySources`] if more than
/// [`MAX_MIXDOWN_SOURCES`] sources are given. `dest` is not touched.
pub fn mixdown(
    dest: &mut PortBuffer<'_>,
    sources: &[PortBufferRef<'_>],
) -> Result<MixdownReport, MixdownError> {
    if sources.len() > MAX_MIXDOWN_SOURCES {
        return Err(MixdownError::TooManySources {
            count: sources.len(),
            max: MAX_MIXDOWN_SOURCES,
        });
    }

    dest.clear();

    let mut cursors = [0u32; MAX_MIXDOWN_SOURCES];
    let mut pending = sources
        .iter()
        .map(|src| src.event_count())
        .fold(0u32, u32::saturating_add);
    let mut report = MixdownReport::default();

    while let Some((src_idx, event)) = next_earliest(sources, &cursors) {
        cursors[src_idx] += 1;
        pending = pending.saturating_sub(1);

        match dest.write(event.time, event.data) {
            Ok(()) => report.written += 1,
            Err(EventError::InsufficientSpace { .. }) => {
                let lost = pending.saturating_add(1);
                dest.record_lost(lost);
                report.lost = report.lost.saturating_add(lost);
                break;
            }
            Err(_) => report.skipped = report.skipped.saturating_add(1),
        }
    }

    #[cfg(feature = "tracing")]
    if report.lost > 0 || report.skipped > 0 {
        tracing::debug!(
            "mixdown: {} sources, {} written, {} lost, {} skipped",
            sources.len(),
            report.written,
            report.lost,
            report.skipped
        );
    }

    Ok(report)
}

/// Finds the source whose next unread event is earliest. Ties go to the
/// lowest source index.
#[inline]
fn next_earliest<'a>(
    sources: &[PortBufferRef<'a>],
    cursors: &[u32; MAX_MIXDOWN_SOURCES],
) -> Option<(usize, Event<'a>)> {
    let mut best: Option<(usize, Event<'a>)> = None;
    for (i, src) in sources.iter().enumerate() {
        let Ok(event) = src.event(cursors[i]) else {
            continue;
        };
        if best.is_none_or(|(_, b)| event.time < b.time) {
            best = Some((i, event));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(region: &mut [u8], nframes: u32, events: &[(u32, &[u8])]) {
        let mut buf = PortBuffer::format(region, nframes).unwrap();
        for &(time, data) in events {
            buf.write(time, data).unwrap();
        }
    }

    #[test]
    fn merges_in_time_order() {
        let mut a = [0u8; 256];
        let mut b = [0u8; 256];
        let mut out = [0u8; 512];
        filled(&mut a, 64, &[(0, b"a0"), (10, b"a1"), (30, b"a2")]);
        filled(&mut b, 64, &[(5, b"b0"), (20, b"b1")]);

        let sources = [
            PortBufferRef::attach(&a).unwrap(),
            PortBufferRef::attach(&b).unwrap(),
        ];
        let mut dest = PortBuffer::format(&mut out, 64).unwrap();
        let report = mixdown(&mut dest, &sources).unwrap();

        assert_eq!(
            report,
            MixdownReport {
                written: 5,
                lost: 0,
                skipped: 0
            }
        );
        let times: Vec<u32> = dest.reader().events().map(|e| e.time).collect();
        assert_eq!(times, [0, 5, 10, 20, 30]);
        assert_eq!(dest.event(1).unwrap().data, b"b0");
        assert_eq!(dest.lost_event_count(), 0);
    }

    #[test]
    fn ties_keep_source_order() {
        let mut a = [0u8; 128];
        let mut b = [0u8; 128];
        let mut out = [0u8; 256];
        filled(&mut a, 64, &[(7, b"first")]);
        filled(&mut b, 64, &[(7, b"second")]);

        let sources = [
            PortBufferRef::attach(&a).unwrap(),
            PortBufferRef::attach(&b).unwrap(),
        ];
        let mut dest = PortBuffer::format(&mut out, 64).unwrap();
        let _ = mixdown(&mut dest, &sources).unwrap();
        assert_eq!(dest.event(0).unwrap().data, b"first");
        assert_eq!(dest.event(1).unwrap().data, b"second");
    }

    #[test]
    fn overflow_counts_remaining_events_as_lost() {
        let mut a = [0u8; 256];
        let mut b = [0u8; 256];
        filled(&mut a, 64, &[(0, &[1; 16]), (2, &[2; 16])]);
        filled(&mut b, 64, &[(1, &[3; 16]), (3, &[4; 16])]);

        // Room for exactly two 16-byte events.
        let mut out = [0u8; crate::layout::required_capacity(2, 32)];
        let sources = [
            PortBufferRef::attach(&a).unwrap(),
            PortBufferRef::attach(&b).unwrap(),
        ];
        let mut dest = PortBuffer::format(&mut out, 64).unwrap();
        let report = mixdown(&mut dest, &sources).unwrap();

        assert_eq!(
            report,
            MixdownReport {
                written: 2,
                lost: 2,
                skipped: 0
            }
        );
        assert_eq!(dest.event_count(), 2);
        assert_eq!(dest.lost_event_count(), 2);
        assert_eq!(dest.event(1).unwrap().time, 1);
    }

    #[test]
    fn event_outside_destination_cycle_is_skipped() {
        let mut a = [0u8; 256];
        let mut out = [0u8; 256];
        filled(&mut a, 128, &[(10, b"in"), (100, b"out")]);

        let sources = [PortBufferRef::attach(&a).unwrap()];
        let mut dest = PortBuffer::format(&mut out, 64).unwrap();
        let report = mixdown(&mut dest, &sources).unwrap();

        assert_eq!(
            report,
            MixdownReport {
                written: 1,
                lost: 0,
                skipped: 1
            }
        );
        assert_eq!(dest.lost_event_count(), 0);
        assert!(dest.max_event_size() > 0);
    }

    #[test]
    fn mixdown_clears_previous_contents() {
        let mut out = [0u8; 256];
        let mut dest = PortBuffer::format(&mut out, 64).unwrap();
        dest.write(3, b"stale").unwrap();
        dest.record_lost(9);

        let report = mixdown(&mut dest, &[]).unwrap();
        assert_eq!(report, MixdownReport::default());
        assert_eq!(dest.event_count(), 0);
        assert_eq!(dest.lost_event_count(), 0);
    }

    #[test]
    fn too_many_sources_leaves_destination_alone() {
        let mut src = [0u8; 64];
        filled(&mut src, 64, &[]);
        let reader = PortBufferRef::attach(&src).unwrap();
        let sources = [reader; MAX_MIXDOWN_SOURCES + 1];

        let mut out = [0u8; 128];
        let mut dest = PortBuffer::format(&mut out, 64).unwrap();
        dest.write(1, b"keep").unwrap();

        assert_eq!(
            mixdown(&mut dest, &sources),
            Err(MixdownError::TooManySources {
                count: MAX_MIXDOWN_SOURCES + 1,
                max: MAX_MIXDOWN_SOURCES,
            })
        );
        assert_eq!(dest.event_count(), 1);
    }
}
