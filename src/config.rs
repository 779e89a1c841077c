//! Port address configuration
//!
//! The PSG card decodes two 8-bit I/O addresses that vary between board
//! revisions. Defaults match the R5 RC2014 YM2149 card; other layouts are
//! loaded from a small JSON file and can be reloaded at runtime, after
//! which the driver picks up the new addresses on its next register write.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, SynthError};

/// Default register-select port (R5 RC2014 YM2149 card)
pub const DEFAULT_ADDR_PORT: u8 = 0xD8;

/// Default data port (R5 RC2014 YM2149 card)
pub const DEFAULT_DATA_PORT: u8 = 0xD0;

/// I/O addresses of the PSG card's two ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfig {
    /// Register-select port (OUT latches the address, IN reads data)
    pub addr_port: u8,
    /// Data port (write-only)
    pub data_port: u8,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            addr_port: DEFAULT_ADDR_PORT,
            data_port: DEFAULT_DATA_PORT,
        }
    }
}

impl PortConfig {
    /// Load port addresses from a JSON config file.
    ///
    /// Missing file is not an error to the caller who wants defaults; use
    /// [`PortConfig::load_or_default`] for that. A present but malformed
    /// file is an error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: PortConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file, falling back to defaults when the file is absent
    /// or unreadable.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("using default ports ({err})");
                Self::default()
            }
        }
    }

    /// Write the configuration back out as JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Check the addresses are usable.
    ///
    /// The only hard constraint: the two ports must differ, since the card
    /// needs distinct address and data strobes.
    pub fn validate(&self) -> Result<()> {
        if self.addr_port == self.data_port {
            return Err(SynthError::ConfigError(format!(
                "addr_port and data_port are both 0x{:02X}",
                self.addr_port
            )));
        }
        Ok(())
    }
}
