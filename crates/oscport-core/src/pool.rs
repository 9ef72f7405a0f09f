//! Pool of port buffer regions for the graph's OSC ports.
//!
//! The [`PortBufferPool`] owns one heap region per port. Regions are allocated
//! and formatted once at construction, on the setup thread; the cycle path
//! only hands out [`PortBuffer`] / [`PortBufferRef`] handles into them and
//! never allocates.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::buffer::{PortBuffer, PortBufferRef};
use crate::error::{LayoutError, MixdownError, PoolError};
use crate::layout;
use crate::mixdown::{MAX_MIXDOWN_SOURCES, MixdownReport, mixdown};

/// Pool of formatted port buffer regions, one per port.
///
/// Ports are addressed by index in construction order. Every region shares
/// the pool's cycle length.
pub struct PortBufferPool {
    regions: Vec<Vec<u8>>,
    nframes: u32,
}

impl PortBufferPool {
    /// Creates `count` regions of `capacity` bytes each.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if `capacity` is below
    /// [`MIN_CAPACITY`](crate::MIN_CAPACITY) or `nframes == 0`.
    pub fn new(count: usize, capacity: usize, nframes: u32) -> Result<Self, LayoutError> {
        let capacities = vec![capacity; count];
        Self::with_capacities(&capacities, nframes)
    }

    /// Creates one region per entry of `capacities`, sized accordingly.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if any capacity is below
    /// [`MIN_CAPACITY`](crate::MIN_CAPACITY) or `nframes == 0`.
    pub fn with_capacities(capacities: &[usize], nframes: u32) -> Result<Self, LayoutError> {
        let mut regions = Vec::with_capacity(capacities.len());
        for &capacity in capacities {
            let mut region = vec![0u8; capacity];
            layout::format(&mut region, nframes)?;
            regions.push(region);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "port_pool: {} regions, {} bytes total, {nframes} frames",
            regions.len(),
            capacities.iter().sum::<usize>()
        );
        Ok(Self { regions, nframes })
    }

    /// Returns the number of port regions.
    pub fn count(&self) -> usize {
        self.regions.len()
    }

    /// Returns the cycle length every region was formatted with.
    pub fn nframes(&self) -> u32 {
        self.nframes
    }

    /// Returns the size in bytes of the region at `idx`.
    pub fn capacity(&self, idx: usize) -> Option<usize> {
        self.regions.get(idx).map(Vec::len)
    }

    /// Returns the writer handle for the region at `idx`.
    #[inline]
    pub fn writer(&mut self, idx: usize) -> Option<PortBuffer<'_>> {
        self.regions
            .get_mut(idx)
            .map(|bytes| PortBuffer { bytes: bytes.as_mut_slice() })
    }

    /// Returns a reader handle for the region at `idx`.
    #[inline]
    pub fn reader(&self, idx: usize) -> Option<PortBufferRef<'_>> {
        self.regions
            .get(idx)
            .map(|bytes| PortBufferRef { bytes: bytes.as_slice() })
    }

    /// Clears every region at the start of a cycle.
    pub fn clear_all(&mut self) {
        for region in &mut self.regions {
            layout::clear(region);
        }
    }

    /// Merges the regions at `sources` into the region at `dest`.
    ///
    /// See [`mixdown()`] for ordering and loss semantics.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NoSuchPort`] for an unknown index,
    /// [`PoolError::SourceIsDestination`] if `dest` is also listed as a
    /// source, or [`PoolError::Mixdown`] for too many sources.
    pub fn mixdown_into(
        &mut self,
        dest: usize,
        sources: &[usize],
    ) -> Result<MixdownReport, PoolError> {
        if dest >= self.regions.len() {
            return Err(PoolError::NoSuchPort(dest));
        }
        for &src in sources {
            if src == dest {
                return Err(PoolError::SourceIsDestination(dest));
            }
            if src >= self.regions.len() {
                return Err(PoolError::NoSuchPort(src));
            }
        }
        if sources.len() > MAX_MIXDOWN_SOURCES {
            return Err(MixdownError::TooManySources {
                count: sources.len(),
                max: MAX_MIXDOWN_SOURCES,
            }
            .into());
        }

        // Take the destination out so the sources can be borrowed alongside it.
        // `Vec::new()` does not allocate.
        let mut dest_region = core::mem::take(&mut self.regions[dest]);
        let result = self.mix_sources(&mut dest_region, sources);
        self.regions[dest] = dest_region;
        result
    }

    fn mix_sources(
        &self,
        dest_region: &mut [u8],
        sources: &[usize],
    ) -> Result<MixdownReport, PoolError> {
        let mut dest_buf = PortBuffer { bytes: dest_region };
        let Some(&first) = sources.first() else {
            return Ok(mixdown(&mut dest_buf, &[])?);
        };

        let placeholder = PortBufferRef {
            bytes: &self.regions[first],
        };
        let mut refs = [placeholder; MAX_MIXDOWN_SOURCES];
        for (slot, &src) in refs.iter_mut().zip(sources) {
            *slot = PortBufferRef {
                bytes: &self.regions[src],
            };
        }
        Ok(mixdown(&mut dest_buf, &refs[..sources.len()])?)
    }
}
