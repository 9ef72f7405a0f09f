//! Port configuration for oscport graphs.
//!
//! Describes the OSC ports of a processing graph in TOML, validates the
//! description, and allocates the matching [`PortBufferPool`] up front so the
//! real-time cycle never has to.
//!
//! # Features
//!
//! - **Port files**: Load and save port layouts as TOML
//! - **Worst-case sizing**: Size a port from its peak event count and payload
//! - **Validation**: Report every problem in a config at once
//! - **Pool setup**: Build a formatted [`PortBufferPool`] from a config
//!
//! # Example
//!
//! ```rust,no_run
//! use oscport_config::{GraphPortsConfig, PortConfig};
//!
//! // Load from file
//! let config = GraphPortsConfig::load("ports.toml").unwrap();
//!
//! // Or build programmatically
//! let config = GraphPortsConfig::new(256)
//!     .with_port(PortConfig::new("osc_out"))
//!     .with_port(PortConfig::new("osc_bus").with_worst_case(64, 8192));
//! config.save("ports.toml").unwrap();
//!
//! let mut pool = config.build_pool().unwrap();
//! let bus = config.port_index("osc_bus").unwrap();
//! pool.writer(bus).unwrap().write(0, b"/tempo").unwrap();
//! ```

mod error;
mod ports;

/// Port configuration validation.
pub mod validation;

pub use error::ConfigError;
pub use ports::{GraphPortsConfig, PortConfig};
pub use validation::{ValidationError, ValidationResult, validate_ports};

/// Re-export commonly used types from oscport-core
pub use oscport_core::{PortBuffer, PortBufferPool, PortBufferRef};
