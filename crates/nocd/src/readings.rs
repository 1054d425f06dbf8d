//! Static optical reading table
//!
//! Per-NE port readings loaded from a TOML table, standing in for the
//! vendor NMS query. Unknown network elements yield an empty list,
//! which the evaluator reads as "no anomalies measured".

use anyhow::{Context, Result};
use noc_common::measurement::{OpticalPortReading, OpticalReadingSource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// On-disk layout: a flat reading list, grouped by NE at load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpticalReadingsConfig {
    pub schema_version: u32,
    #[serde(default)]
    pub readings: Vec<OpticalPortReading>,
}

impl Default for OpticalReadingsConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            readings: default_readings(),
        }
    }
}

pub struct StaticOpticalReadings {
    by_ne: HashMap<String, Vec<OpticalPortReading>>,
}

impl StaticOpticalReadings {
    pub fn from_config(config: OpticalReadingsConfig) -> Self {
        let mut by_ne: HashMap<String, Vec<OpticalPortReading>> = HashMap::new();
        for reading in config.readings {
            by_ne.entry(reading.ne_name.clone()).or_default().push(reading);
        }
        Self { by_ne }
    }

    pub fn with_defaults() -> Self {
        Self::from_config(OpticalReadingsConfig::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read optical readings: {}", path.display()))?;
        let config: OpticalReadingsConfig = toml::from_str(&contents)
            .with_context(|| format!("failed to parse optical readings: {}", path.display()))?;
        Ok(Self::from_config(config))
    }
}

impl OpticalReadingSource for StaticOpticalReadings {
    fn fetch_readings(&self, ne_name: &str) -> Result<Vec<OpticalPortReading>> {
        Ok(self.by_ne.get(ne_name).cloned().unwrap_or_default())
    }
}

fn reading(
    ne_name: &str,
    port: &str,
    board_name: &str,
    slot_id: &str,
    input_power: &str,
    output_power: &str,
) -> OpticalPortReading {
    OpticalPortReading {
        ne_name: ne_name.to_string(),
        port: port.to_string(),
        board_name: board_name.to_string(),
        slot_id: slot_id.to_string(),
        input_power: input_power.to_string(),
        output_power: output_power.to_string(),
    }
}

/// Demo table used until a live NMS feed is wired in: one element with
/// a clearly degraded port, one healthy.
fn default_readings() -> Vec<OpticalPortReading> {
    vec![
        reading("深圳10号线禾花站皮飞DE-HLW", "0", "MRRU", "60", "-41.2", "-3.5"),
        reading("深圳10号线禾花站皮飞DE-HLW", "1", "MRRU", "61", "-19.8", "-2.9"),
        reading("南头站宏站NT-01", "0", "AAU", "2", "-18.4", "-4.1"),
    ]
}
