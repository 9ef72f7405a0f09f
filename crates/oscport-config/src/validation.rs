//! Port configuration validation.
//!
//! Checks a [`GraphPortsConfig`] before any memory is allocated for it, so a
//! bad file is reported in full rather than failing on the first port.
//!
//! # Example
//!
//! ```rust
//! use oscport_config::{GraphPortsConfig, PortConfig, validate_ports};
//!
//! let config = GraphPortsConfig::new(256).with_port(PortConfig::new("osc_out"));
//! validate_ports(&config).expect("config should be valid");
//! ```

use std::collections::HashSet;

use oscport_core::MIN_CAPACITY;
use thiserror::Error;

use crate::ports::GraphPortsConfig;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Cycle length of zero frames.
    #[error("cycle length must be at least one frame")]
    ZeroFrames,

    /// Port with an empty name.
    #[error("port {0} has an empty name")]
    EmptyPortName(usize),

    /// Two ports share a name.
    #[error("duplicate port name '{0}'")]
    DuplicatePort(String),

    /// Effective buffer size is below the layout minimum.
    #[error("port '{port}' buffer of {capacity} bytes is below the minimum of {required}")]
    BufferTooSmall {
        /// Name of the port.
        port: String,
        /// Effective buffer size.
        capacity: usize,
        /// Minimum usable size.
        required: usize,
    },

    /// Worst-case sizing does not fit in `usize`.
    #[error("port '{0}' worst-case buffer size overflows")]
    CapacityOverflow(String),

    /// Only one of `max_events` / `max_payload_bytes` was given.
    #[error("port '{0}' must set both max_events and max_payload_bytes, or neither")]
    PartialSizing(String),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a port configuration, collecting every problem found.
pub fn validate_ports(config: &GraphPortsConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if config.nframes == 0 {
        errors.push(ValidationError::ZeroFrames);
    }

    let mut seen = HashSet::new();
    for (index, port) in config.ports.iter().enumerate() {
        if port.name.is_empty() {
            errors.push(ValidationError::EmptyPortName(index));
        } else if !seen.insert(port.name.as_str()) {
            errors.push(ValidationError::DuplicatePort(port.name.clone()));
        }

        if port.max_events.is_some() != port.max_payload_bytes.is_some() {
            errors.push(ValidationError::PartialSizing(port.name.clone()));
            continue;
        }

        let Some(capacity) = port.effective_capacity(config.default_buffer_size) else {
            errors.push(ValidationError::CapacityOverflow(port.name.clone()));
            continue;
        };
        if capacity < MIN_CAPACITY {
            errors.push(ValidationError::BufferTooSmall {
                port: port.name.clone(),
                capacity,
                required: MIN_CAPACITY,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else if errors.len() == 1 {
        Err(errors.pop().unwrap())
    } else {
        Err(ValidationError::Multiple(errors))
    }
}
