//! Port configuration file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use oscport_core::{PortBufferPool, checked_required_capacity};

use crate::error::ConfigError;
use crate::validation::validate_ports;

/// OSC port layout of a processing graph.
///
/// Describes the cycle length shared by every port and how large each port's
/// buffer region must be. Loaded from TOML and turned into a
/// [`PortBufferPool`] with [`build_pool()`](Self::build_pool).
///
/// # TOML Format
///
/// ```toml
/// nframes = 256
/// default_buffer_size = 4096
///
/// [[ports]]
/// name = "osc_out"
///
/// [[ports]]
/// name = "osc_bus"
/// max_events = 64
/// max_payload_bytes = 8192
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphPortsConfig {
    /// Cycle length in frames. Event times must be below this.
    #[serde(default = "default_nframes")]
    pub nframes: u32,

    /// Buffer size for ports that do not size themselves.
    #[serde(default = "default_buffer_size")]
    pub default_buffer_size: usize,

    /// Ports in pool order.
    #[serde(default)]
    pub ports: Vec<PortConfig>,
}

fn default_nframes() -> u32 {
    256
}

fn default_buffer_size() -> usize {
    4096
}

/// Buffer sizing for a single port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortConfig {
    /// Port name, unique within the graph.
    pub name: String,

    /// Explicit region size in bytes. Wins over the worst-case fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_size: Option<usize>,

    /// Worst-case event count per cycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_events: Option<usize>,

    /// Worst-case total payload bytes per cycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload_bytes: Option<usize>,
}

impl PortConfig {
    /// Create a port that uses the default buffer size.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buffer_size: None,
            max_events: None,
            max_payload_bytes: None,
        }
    }

    /// Set an explicit buffer size in bytes.
    pub fn with_buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = Some(bytes);
        self
    }

    /// Size the buffer for a worst-case cycle load.
    pub fn with_worst_case(mut self, max_events: usize, max_payload_bytes: usize) -> Self {
        self.max_events = Some(max_events);
        self.max_payload_bytes = Some(max_payload_bytes);
        self
    }

    /// Region size this port will get.
    ///
    /// An explicit `buffer_size` wins; otherwise the worst-case fields are
    /// used when both are set; otherwise `default_size`. Returns `None` if
    /// the worst-case size overflows `usize`.
    pub fn effective_capacity(&self, default_size: usize) -> Option<usize> {
        match (self.buffer_size, self.max_events, self.max_payload_bytes) {
            (Some(bytes), _, _) => Some(bytes),
            (None, Some(events), Some(payload)) => checked_required_capacity(events, payload),
            _ => Some(default_size),
        }
    }
}

impl Default for GraphPortsConfig {
    fn default() -> Self {
        Self::new(default_nframes())
    }
}

impl GraphPortsConfig {
    /// Create an empty configuration for cycles of `nframes` frames.
    pub fn new(nframes: u32) -> Self {
        Self {
            nframes,
            default_buffer_size: default_buffer_size(),
            ports: Vec::new(),
        }
    }

    /// Set the default buffer size.
    pub fn with_default_buffer_size(mut self, bytes: usize) -> Self {
        self.default_buffer_size = bytes;
        self
    }

    /// Add a port.
    pub fn with_port(mut self, port: PortConfig) -> Self {
        self.ports.push(port);
        self
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config: GraphPortsConfig = toml::from_str(&content)?;
        tracing::debug!(
            "ports_load: {} ports, {} frames from {}",
            config.ports.len(),
            config.nframes,
            path.display()
        );
        Ok(config)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!("ports_save: {} ports to {}", self.ports.len(), path.display());
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(validate_ports(self)?)
    }

    /// Index of the named port in the pool, if present.
    pub fn port_index(&self, name: &str) -> Option<usize> {
        self.ports.iter().position(|p| p.name == name)
    }

    /// Effective region size of every port, in pool order.
    ///
    /// Sizes that overflow saturate at `usize::MAX`; [`validate()`](Self::validate)
    /// rejects them.
    pub fn capacities(&self) -> Vec<usize> {
        self.ports
            .iter()
            .map(|p| {
                p.effective_capacity(self.default_buffer_size)
                    .unwrap_or(usize::MAX)
            })
            .collect()
    }

    /// Total bytes the pool will allocate, saturating at `usize::MAX`.
    pub fn total_bytes(&self) -> usize {
        self.capacities()
            .iter()
            .fold(0, |total, &bytes| total.saturating_add(bytes))
    }

    /// Validate and allocate one formatted region per port.
    pub fn build_pool(&self) -> Result<PortBufferPool, ConfigError> {
        self.validate()?;
        let pool = PortBufferPool::with_capacities(&self.capacities(), self.nframes)?;
        tracing::debug!(
            "ports_build: {} ports, {} bytes",
            pool.count(),
            self.total_bytes()
        );
        Ok(pool)
    }
}
