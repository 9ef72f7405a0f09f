//! Property-based tests for oscport-core port buffers.
//!
//! Tests ordering, lookup fidelity, rejection atomicity, and capacity
//! accounting using proptest for randomized event streams.

use oscport_core::{EventError, MIN_CAPACITY, PortBuffer, required_capacity};
use proptest::prelude::*;

const NFRAMES: u32 = 1024;

/// Sorted event times paired with payloads of up to 48 bytes.
fn sorted_events() -> impl Strategy<Value = Vec<(u32, Vec<u8>)>> {
    prop::collection::vec(
        (0..NFRAMES, prop::collection::vec(any::<u8>(), 0..48)),
        0..32,
    )
    .prop_map(|mut events| {
        events.sort_by_key(|(time, _)| *time);
        events
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any in-order stream that fits is read back exactly, in write order.
    #[test]
    fn in_order_writes_read_back_exactly(events in sorted_events()) {
        let payload: usize = events.iter().map(|(_, d)| d.len()).sum();
        let capacity = required_capacity(events.len(), payload).max(MIN_CAPACITY);
        let mut region = vec![0u8; capacity];
        let mut buf = PortBuffer::format(&mut region, NFRAMES).unwrap();

        for (time, data) in &events {
            prop_assert!(buf.write(*time, data).is_ok());
        }
        prop_assert_eq!(buf.event_count() as usize, events.len());

        for (i, (time, data)) in events.iter().enumerate() {
            let event = buf.event(i as u32).unwrap();
            prop_assert_eq!(event.time, *time);
            prop_assert_eq!(event.size(), data.len());
            prop_assert_eq!(event.data, data.as_slice());
        }
        let count = buf.event_count();
        prop_assert!(
            matches!(buf.event(count), Err(EventError::NoData { .. })),
            "lookup past the end must fail"
        );
    }

    /// An earlier time after any accepted event is rejected and changes nothing.
    #[test]
    fn out_of_order_rejection_is_atomic(
        events in sorted_events(),
        step_back in 1u32..100,
    ) {
        prop_assume!(!events.is_empty());
        let last = events.last().unwrap().0;
        prop_assume!(last >= step_back);

        let mut region = vec![0u8; 4096];
        let mut buf = PortBuffer::format(&mut region, NFRAMES).unwrap();
        for (time, data) in &events {
            buf.write(*time, data).unwrap();
        }
        let count = buf.event_count();
        let space = buf.max_event_size();
        drop(buf);
        let snapshot = region.clone();

        let mut buf = PortBuffer::attach(&mut region).unwrap();
        let result = buf.write(last - step_back, b"/late");
        prop_assert_eq!(
            result,
            Err(EventError::OutOfOrder { time: last - step_back, last })
        );
        prop_assert_eq!(buf.event_count(), count);
        prop_assert_eq!(buf.max_event_size(), space);
        drop(buf);
        prop_assert_eq!(region, snapshot);
    }

    /// `max_event_size` is an exact admission threshold and never grows
    /// within a cycle.
    #[test]
    fn max_event_size_is_exact_and_monotonic(
        capacity in 48usize..1024,
        sizes in prop::collection::vec(0usize..200, 1..40),
    ) {
        let mut region = vec![0u8; capacity];
        let mut buf = PortBuffer::format(&mut region, NFRAMES).unwrap();
        let mut previous = buf.max_event_size();

        for (t, &size) in sizes.iter().enumerate() {
            let before = buf.max_event_size();
            prop_assert!(before <= previous);
            let count = buf.event_count();

            match buf.reserve(t as u32, size) {
                Ok(slot) => {
                    prop_assert!(size <= before);
                    prop_assert_eq!(slot.len(), size);
                    prop_assert_eq!(buf.event_count(), count + 1);
                }
                Err(EventError::InsufficientSpace { requested, .. }) => {
                    prop_assert!(size > before || before == 0);
                    prop_assert_eq!(requested, size);
                    prop_assert_eq!(buf.event_count(), count);
                    prop_assert_eq!(buf.max_event_size(), before);
                }
                Err(other) => prop_assert!(false, "unexpected rejection {:?}", other),
            }
            previous = before;
            prop_assert!(buf.max_event_size() <= before);
        }
        prop_assert_eq!(buf.lost_event_count(), 0);
    }

    /// Reserve-and-fill leaves the same bytes in the region as write.
    #[test]
    fn reserve_fill_equals_write(events in sorted_events()) {
        let mut a = vec![0u8; 2048];
        let mut b = vec![0u8; 2048];
        let mut via_write = PortBuffer::format(&mut a, NFRAMES).unwrap();
        let mut via_reserve = PortBuffer::format(&mut b, NFRAMES).unwrap();

        for (time, data) in &events {
            let wrote = via_write.write(*time, data);
            let reserved = via_reserve
                .reserve(*time, data.len())
                .map(|slot| slot.copy_from_slice(data));
            prop_assert_eq!(wrote, reserved);
        }
        drop(via_write);
        drop(via_reserve);
        prop_assert_eq!(a, b);
    }

    /// After clear, counts are zero whatever the previous cycle held.
    #[test]
    fn clear_always_empties(events in sorted_events(), lost in any::<u32>()) {
        let mut region = vec![0u8; 1024];
        let mut buf = PortBuffer::format(&mut region, NFRAMES).unwrap();
        for (time, data) in &events {
            let _ = buf.write(*time, data);
        }
        buf.record_lost(lost);

        buf.clear();
        prop_assert_eq!(buf.event_count(), 0);
        prop_assert_eq!(buf.lost_event_count(), 0);
        prop_assert!(buf.event(0).is_err());
    }
}
