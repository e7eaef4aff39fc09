//! Fuel table configuration

use crate::{scaled_percent, BurningError, DurationLookup, FuelTable, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Environment variable naming a JSON fuel table file
pub const FUEL_TABLE_ENV: &str = "BURNING_FUEL_TABLE";

/// Environment variable scaling every duration, in percent
pub const DURATION_SCALE_ENV: &str = "BURNING_DURATION_SCALE_PERCENT";

/// Fuel table configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelTableConfig {
    /// JSON file with `{ "kind": ticks }` entries; the vanilla table when unset
    pub table_path: Option<PathBuf>,
    /// Percentage applied to every duration (100 = unchanged)
    pub scale_percent: Option<u32>,
}

impl FuelTableConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let table_path = std::env::var_os(FUEL_TABLE_ENV).map(PathBuf::from);
        let scale_percent = match std::env::var(DURATION_SCALE_ENV) {
            Ok(raw) => Some(raw.trim().parse().map_err(|_| BurningError::InvalidConfig {
                key: DURATION_SCALE_ENV.to_string(),
                reason: format!("expected a non-negative integer, got {raw:?}"),
            })?),
            Err(_) => None,
        };
        Ok(Self {
            table_path,
            scale_percent,
        })
    }

    /// Resolve the configured lookup
    pub fn load(&self) -> Result<Arc<dyn DurationLookup>> {
        let table = match &self.table_path {
            Some(path) => FuelTable::from_path(path)?,
            None => FuelTable::vanilla(),
        };
        let lookup: Arc<dyn DurationLookup> = match self.scale_percent {
            Some(0) => {
                return Err(BurningError::InvalidConfig {
                    key: DURATION_SCALE_ENV.to_string(),
                    reason: "scale must be positive".to_string(),
                })
            }
            Some(100) | None => Arc::new(table),
            Some(percent) => Arc::new(table.with(scaled_percent(percent))),
        };
        Ok(lookup)
    }
}

impl FuelTable {
    /// Parse a table from JSON of the form `{ "coal": 1600, ... }`
    pub fn from_json(json: &str) -> Result<Self> {
        let table: FuelTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Read and parse a JSON table from a file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| BurningError::FuelTableIo {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let table = Self::from_json(&json)?;
        info!(path = %path.display(), fuels = table.len(), "Loaded fuel table");
        Ok(table)
    }

    fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(BurningError::EmptyFuelTable);
        }
        if let Some((kind, _)) = self.iter().find(|(_, ticks)| *ticks == 0) {
            return Err(BurningError::invalid_fuel(kind.name(), "burn duration must be positive"));
        }
        Ok(())
    }
}
