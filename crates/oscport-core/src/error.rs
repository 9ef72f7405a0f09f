//! Error types for port buffer operations.
//!
//! Every failure is a synchronous return value. A rejected call leaves the
//! buffer exactly as it was before the call, so the caller can drop the event
//! (or defer it to the next cycle) and carry on with the rest of the cycle.

use thiserror::Error;

/// Rejection of a single read or write against a port buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EventError {
    /// The payload plus its descriptor does not fit in the remaining space.
    #[error("insufficient space: requested {requested} bytes, {available} available")]
    InsufficientSpace {
        /// Payload size that was requested.
        requested: usize,
        /// Largest payload that would have fit (`max_event_size`).
        available: usize,
    },

    /// The event time precedes the most recently written event.
    #[error("event at frame {time} precedes last written frame {last}")]
    OutOfOrder {
        /// Requested frame offset.
        time: u32,
        /// Frame offset of the last event in the buffer.
        last: u32,
    },

    /// The event time lies outside the current cycle.
    #[error("frame {time} is outside the cycle of {nframes} frames")]
    TimeOutOfRange {
        /// Requested frame offset.
        time: u32,
        /// Cycle length recorded in the buffer header.
        nframes: u32,
    },

    /// Indexed lookup past the last event.
    #[error("no event at index {index} (buffer holds {count})")]
    NoData {
        /// Requested index.
        index: u32,
        /// Number of events in the buffer.
        count: u32,
    },

    /// A descriptor points outside the region it was read from.
    #[error("descriptor {index} points outside the buffer")]
    Corrupt {
        /// Index of the bad descriptor.
        index: u32,
    },
}

/// Failure to format or attach to a raw memory region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The region cannot hold a header and a single descriptor.
    #[error("region of {capacity} bytes is too small, need at least {required}")]
    TooSmall {
        /// Size of the supplied region.
        capacity: usize,
        /// Minimum usable size.
        required: usize,
    },

    /// A cycle length of zero frames was requested.
    #[error("cycle length must be at least one frame")]
    ZeroFrames,

    /// The region was never formatted as a port buffer.
    #[error("bad port buffer magic {0:#010x}")]
    BadMagic(u32),

    /// Header fields are inconsistent with the region size.
    #[error("port buffer header is corrupt")]
    Corrupt,
}

/// Failure to start a mixdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MixdownError {
    /// More sources than the fixed merge cursor table can track.
    #[error("{count} mixdown sources exceed the maximum of {max}")]
    TooManySources {
        /// Number of sources supplied.
        count: usize,
        /// Maximum supported sources.
        max: usize,
    },
}

/// Failure of a pool-level operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The port index is not in the pool.
    #[error("no port at index {0}")]
    NoSuchPort(usize),

    /// A mixdown listed its destination among its sources.
    #[error("port {0} cannot be mixed into itself")]
    SourceIsDestination(usize),

    /// The mixdown itself was rejected.
    #[error(transparent)]
    Mixdown(#[from] MixdownError),
}
