//! oscport Core - OSC event port buffers for real-time audio graphs
//!
//! This crate defines the in-place layout of a fixed-capacity event buffer
//! that carries sample-accurately timestamped OSC messages between graph nodes
//! during one processing cycle. Every operation is bounded in time and none of
//! them allocates, blocks, or locks.
//!
//! # Core Abstractions
//!
//! - [`PortBuffer`] - Writer handle: clear, reserve, write, lost accounting
//! - [`PortBufferRef`] - Reader handle: count, indexed lookup, iteration
//! - [`Event`] - Borrowed view of one timestamped message
//! - [`mixdown()`] - Merge several sources into one destination in time order
//! - [`PortBufferPool`] - Owns one pre-allocated region per port
//!
//! # Layout
//!
//! Header, descriptor array and payload share one caller-owned region.
//! Descriptors grow up from the header, payload grows down from the end, and
//! a reset is a single cursor store. See [`layout`] for the byte format.
//!
//! # Example
//!
//! ```rust
//! use oscport_core::{EventError, PortBuffer};
//!
//! let mut region = [0u8; 256];
//! let mut buf = PortBuffer::format(&mut region, 128).unwrap();
//!
//! // Once per cycle, before the first write
//! buf.clear();
//!
//! // Zero-copy: fill the reserved bytes in place
//! buf.reserve(0, 4).unwrap().copy_from_slice(b"/hit");
//! buf.write(5, b"/note").unwrap();
//!
//! // Writes must be in time order
//! assert!(matches!(buf.write(3, b"/late"), Err(EventError::OutOfOrder { .. })));
//!
//! let reader = buf.into_reader();
//! assert_eq!(reader.event_count(), 2);
//! assert_eq!(reader.event(1).unwrap().data, b"/note");
//! ```
//!
//! # Concurrency
//!
//! One writer per buffer per cycle, then any number of readers. The graph
//! scheduler orders the two phases; the handles do no synchronization of
//! their own. Distinct buffers share nothing and can be processed on separate
//! threads.
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (with `alloc` for [`PortBufferPool`]).
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! oscport-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod buffer;
pub mod error;
pub mod event;
mod index;
pub mod layout;
mod lost;
pub mod mixdown;
pub mod pool;
mod reserve;

// Re-export main types at crate root
pub use buffer::{PortBuffer, PortBufferRef};
pub use error::{EventError, LayoutError, MixdownError, PoolError};
pub use event::{Event, Events};
pub use layout::{
    DESCRIPTOR_SIZE, HEADER_SIZE, MIN_CAPACITY, checked_required_capacity, required_capacity,
};
pub use mixdown::{MAX_MIXDOWN_SOURCES, MixdownReport, mixdown};
pub use pool::PortBufferPool;
