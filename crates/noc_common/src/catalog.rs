//! Rule Catalog - rule sets and measurement tables for diagnosis replay
//!
//! Data-driven: the catalog loads from a TOML file when one is deployed
//! and otherwise falls back to the compiled-in defaults below. Once
//! built it never mutates; a reload swaps in a whole new catalog behind
//! a fresh `Arc`. Lookup misses are configuration errors, kept apart
//! from diagnosis outcomes.

use crate::error::CatalogError;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Rule set replayed for base-station out-of-service alarms (基站退服).
pub const RULE_SET_BASE_STATION: &str = "TF-001";
/// Rule set replayed for cell out-of-service alarms (小区退服).
pub const RULE_SET_CELL: &str = "TF-002";

/// Name of the live optical-power measurement, special-cased by the
/// evaluator to consult per-port readings instead of a static table.
pub const OPTICAL_POWER: &str = "OPTICAL_POWER";

// ============================================================================
// Catalog Types
// ============================================================================

/// Which measurement table a step's reference keys into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    Numeric,
    Enumerated,
}

/// Reference from a step to a named measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementRef {
    pub kind: MeasurementKind,
    pub name: String,
}

/// One conclusion/solution pair inside an enumerated measurement.
/// Its 1-based position in the list acts as the severity index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MmlContent {
    pub conclusion: String,
    pub solution_code: String,
}

/// Ordered content catalog for one enumerated measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumeratedMeasurement {
    pub key: String,
    pub contents: Vec<MmlContent>,
}

/// Static descriptor for one numeric measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericMeasurement {
    pub key: String,
    pub low: i32,
    pub high: i32,
    pub normal_label: String,
    pub error_label: String,
}

/// One diagnostic checkpoint inside a rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// 1-based id, contiguous and ascending within the rule set
    pub id: u32,
    /// Description template; may embed GJ/JT placeholder tokens
    pub description: String,
    /// Current-state templates, resolved the same way
    #[serde(default)]
    pub current_states: Vec<String>,
    /// Measurement consulted for this step's verdict
    pub measurement: MeasurementRef,
}

/// Named, ordered sequence of diagnostic steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub name: String,
    pub steps: Vec<Step>,
}

// ============================================================================
// Catalog Configuration (TOML)
// ============================================================================

/// On-disk catalog layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCatalogConfig {
    /// Schema version
    pub schema_version: u32,
    /// Rule sets
    #[serde(default)]
    pub rule_sets: Vec<RuleSet>,
    /// Enumerated measurement tables
    #[serde(default)]
    pub enumerated: Vec<EnumeratedMeasurement>,
    /// Numeric measurement descriptors
    #[serde(default)]
    pub numeric: Vec<NumericMeasurement>,
}

impl Default for RuleCatalogConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            rule_sets: default_rule_sets(),
            enumerated: default_enumerated(),
            numeric: default_numeric(),
        }
    }
}

// ============================================================================
// Rule Catalog
// ============================================================================

/// All rule sets and measurement tables, immutable after load.
/// Concurrent readers are always safe.
#[derive(Debug)]
pub struct RuleCatalog {
    rule_sets: HashMap<String, RuleSet>,
    enumerated: HashMap<String, EnumeratedMeasurement>,
    numeric: HashMap<String, NumericMeasurement>,
}

impl RuleCatalog {
    /// Build the compiled-in default catalog.
    pub fn with_defaults() -> Self {
        // Defaults are validated by the same path as file loads; a
        // defect there is a bug in this crate, hence the expect.
        Self::from_config(RuleCatalogConfig::default())
            .expect("built-in rule catalog must validate")
    }

    /// Build and validate a catalog from configuration.
    pub fn from_config(config: RuleCatalogConfig) -> Result<Self> {
        let enumerated: HashMap<_, _> = config
            .enumerated
            .into_iter()
            .map(|entry| (entry.key.clone(), entry))
            .collect();
        let numeric: HashMap<_, _> = config
            .numeric
            .into_iter()
            .map(|entry| (entry.key.clone(), entry))
            .collect();

        for entry in enumerated.values() {
            if entry.contents.is_empty() {
                bail!("enumerated measurement '{}' has no contents", entry.key);
            }
        }

        let mut rule_sets = HashMap::new();
        for rule_set in config.rule_sets {
            validate_rule_set(&rule_set, &enumerated, &numeric)?;
            rule_sets.insert(rule_set.name.clone(), rule_set);
        }

        Ok(Self {
            rule_sets,
            enumerated,
            numeric,
        })
    }

    /// Load a catalog from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read rule catalog: {}", path.display()))?;
        let config: RuleCatalogConfig = toml::from_str(&contents)
            .with_context(|| format!("failed to parse rule catalog: {}", path.display()))?;
        Self::from_config(config)
    }

    /// Look up a rule set by exact name.
    pub fn rule_set(&self, name: &str) -> Result<&RuleSet, CatalogError> {
        self.rule_sets
            .get(name)
            .ok_or_else(|| CatalogError::RuleSetNotFound(name.to_string()))
    }

    /// Look up an enumerated measurement by key.
    pub fn enumerated(&self, key: &str) -> Result<&EnumeratedMeasurement, CatalogError> {
        self.enumerated
            .get(key)
            .ok_or_else(|| CatalogError::MeasurementNotFound(key.to_string()))
    }

    /// Look up a numeric measurement descriptor by key.
    pub fn numeric(&self, key: &str) -> Result<&NumericMeasurement, CatalogError> {
        self.numeric
            .get(key)
            .ok_or_else(|| CatalogError::MeasurementNotFound(key.to_string()))
    }

    /// Names of all loaded rule sets (diagnostics / listing).
    pub fn rule_set_names(&self) -> Vec<&str> {
        self.rule_sets.keys().map(String::as_str).collect()
    }
}

/// Step ids must run 1..=n ascending and every measurement reference
/// must resolve against the matching table at load time.
fn validate_rule_set(
    rule_set: &RuleSet,
    enumerated: &HashMap<String, EnumeratedMeasurement>,
    numeric: &HashMap<String, NumericMeasurement>,
) -> Result<()> {
    if rule_set.steps.is_empty() {
        bail!("rule set '{}' has no steps", rule_set.name);
    }

    for (position, step) in rule_set.steps.iter().enumerate() {
        let expected = position as u32 + 1;
        if step.id != expected {
            bail!(
                "rule set '{}': step id {} at position {} (ids must run 1..={} ascending)",
                rule_set.name,
                step.id,
                position + 1,
                rule_set.steps.len()
            );
        }

        let known = match step.measurement.kind {
            MeasurementKind::Enumerated => enumerated.contains_key(&step.measurement.name),
            // The live optical measurement needs no static descriptor
            MeasurementKind::Numeric => {
                step.measurement.name == OPTICAL_POWER
                    || numeric.contains_key(&step.measurement.name)
            }
        };
        if !known {
            bail!(
                "rule set '{}' step {}: unknown measurement '{}'",
                rule_set.name,
                step.id,
                step.measurement.name
            );
        }
    }

    Ok(())
}

// ============================================================================
// Default Catalog
// ============================================================================

fn enumerated_ref(name: &str) -> MeasurementRef {
    MeasurementRef {
        kind: MeasurementKind::Enumerated,
        name: name.to_string(),
    }
}

fn step(id: u32, description: &str, states: &[&str], measurement: MeasurementRef) -> Step {
    Step {
        id,
        description: description.to_string(),
        current_states: states.iter().map(|s| s.to_string()).collect(),
        measurement,
    }
}

fn default_rule_sets() -> Vec<RuleSet> {
    let power_steps = |offset: u32| {
        vec![
            step(
                offset + 1,
                "核查网元GJ00014所在机房（GJ00010）市电供电情况",
                &["告警对象：GJ00014", "设备厂家：GJ00011"],
                enumerated_ref("POWER_SUPPLY"),
            ),
            step(
                offset + 2,
                "检查机房（GJ00010）开关电源整流模块运行状态",
                &["所属机房：GJ00010"],
                enumerated_ref("RECTIFIER"),
            ),
            step(
                offset + 3,
                "复核机房动力环境监控，确认供电链路整体状态",
                &["网络分类：GJ00017"],
                enumerated_ref("POWER_SYSTEM"),
            ),
        ]
    };

    let base_station = RuleSet {
        name: RULE_SET_BASE_STATION.to_string(),
        steps: {
            let mut steps = power_steps(0);
            steps.push(step(
                4,
                "检查基站GJ00014至汇聚机房JT00012方向的传输光缆状态",
                &["告警对象：GJ00014"],
                enumerated_ref("TRANSMISSION"),
            ));
            steps.push(step(
                5,
                "核查传输网管中站点JT00013的光缆中断告警",
                &[],
                enumerated_ref("TRANSMISSION"),
            ));
            steps.push(step(
                6,
                "检查PTN/SPN至BBU端链路（板件、端口、机房内尾纤）",
                &["设备厂家：GJ00011"],
                enumerated_ref("PTN_SPN_LINK"),
            ));
            steps.push(step(
                7,
                "查询网元GJ00014的RRU链路光功率（厂家：GJ00011）",
                &["告警对象：GJ00014"],
                enumerated_ref("RRU_LINK"),
            ));
            steps.push(step(
                8,
                "检查时钟盒/GPS链路状态",
                &[],
                enumerated_ref("RRU_LINK"),
            ));
            steps.push(step(
                9,
                "检查BBU侧设备运行状态",
                &["设备厂家：GJ00011"],
                enumerated_ref("RRU_LINK"),
            ));
            steps
        },
    };

    let cell = RuleSet {
        name: RULE_SET_CELL.to_string(),
        steps: {
            let mut steps = power_steps(0);
            steps.push(step(
                4,
                "核查小区资源与配置（LICENSE、频点、功率、基带能力）",
                &["告警标准名：GJ00008"],
                enumerated_ref("CELL_CONFIG"),
            ));
            steps.push(step(
                5,
                "查询网元GJ00014的RRU链路光功率",
                &["告警对象：GJ00014"],
                enumerated_ref("RRU_LINK"),
            ));
            steps
        },
    };

    vec![base_station, cell]
}

fn contents(pairs: &[(&str, &str)]) -> Vec<MmlContent> {
    pairs
        .iter()
        .map(|(conclusion, solution_code)| MmlContent {
            conclusion: conclusion.to_string(),
            solution_code: solution_code.to_string(),
        })
        .collect()
}

fn default_enumerated() -> Vec<EnumeratedMeasurement> {
    vec![
        EnumeratedMeasurement {
            key: "POWER_SUPPLY".to_string(),
            contents: contents(&[("市电电力故障", "FA00005")]),
        },
        EnumeratedMeasurement {
            key: "RECTIFIER".to_string(),
            contents: contents(&[("整流模块故障", "FA00006")]),
        },
        EnumeratedMeasurement {
            key: "POWER_SYSTEM".to_string(),
            contents: contents(&[("市电电力故障", "FA00005"), ("整流模块故障", "FA00006")]),
        },
        EnumeratedMeasurement {
            key: "TRANSMISSION".to_string(),
            contents: contents(&[("传输光缆故障", "FA00013")]),
        },
        EnumeratedMeasurement {
            key: "PTN_SPN_LINK".to_string(),
            contents: contents(&[(
                "PTN/SPN至BBU端故障（PTN/SPN板件、端口；机房内尾纤；传输光缆；BBU端主控板、光模块）",
                "FA00017",
            )]),
        },
        EnumeratedMeasurement {
            key: "RRU_LINK".to_string(),
            contents: contents(&[
                ("传输光缆故障", "FA00013"),
                ("光模块、尾纤、传输故障", "FA00007"),
                ("时钟盒/GPS故障", "FA00014"),
                ("BBU侧设备故障", "FA00015"),
                ("RRU端故障", "FA00001"),
            ]),
        },
        EnumeratedMeasurement {
            key: "CELL_CONFIG".to_string(),
            contents: contents(&[
                ("LICENSE资源不足", "FA00008"),
                ("频点配置错误", "FA00009"),
                ("功率配置错误", "FA00010"),
                ("基带单元能力不足", "FA00011"),
                ("基带板件故障", "FA00012"),
            ]),
        },
    ]
}

fn default_numeric() -> Vec<NumericMeasurement> {
    vec![
        NumericMeasurement {
            key: OPTICAL_POWER.to_string(),
            low: -35,
            high: 0,
            normal_label: "光功率正常".to_string(),
            error_label: "光功率越限".to_string(),
        },
        NumericMeasurement {
            key: "VSWR".to_string(),
            low: 10,
            high: 15,
            normal_label: "驻波比正常".to_string(),
            error_label: "天馈驻波比异常".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_catalog_loads() {
        let catalog = RuleCatalog::with_defaults();
        assert!(catalog.rule_set(RULE_SET_BASE_STATION).is_ok());
        assert!(catalog.rule_set(RULE_SET_CELL).is_ok());
        assert_eq!(catalog.rule_set(RULE_SET_BASE_STATION).unwrap().steps.len(), 9);
        assert_eq!(catalog.rule_set(RULE_SET_CELL).unwrap().steps.len(), 5);
    }

    #[test]
    fn test_unknown_rule_set_is_catalog_error() {
        let catalog = RuleCatalog::with_defaults();
        let err = catalog.rule_set("TF-999").unwrap_err();
        assert!(matches!(err, CatalogError::RuleSetNotFound(name) if name == "TF-999"));
    }

    #[test]
    fn test_unknown_measurement_is_catalog_error() {
        let catalog = RuleCatalog::with_defaults();
        assert!(matches!(
            catalog.enumerated("NO_SUCH_TABLE"),
            Err(CatalogError::MeasurementNotFound(_))
        ));
        assert!(matches!(
            catalog.numeric("NO_SUCH_TABLE"),
            Err(CatalogError::MeasurementNotFound(_))
        ));
    }

    #[test]
    fn test_step_ids_must_be_contiguous() {
        let mut config = RuleCatalogConfig::default();
        config.rule_sets[0].steps[3].id = 9;
        assert!(RuleCatalog::from_config(config).is_err());
    }

    #[test]
    fn test_unknown_step_measurement_rejected() {
        let mut config = RuleCatalogConfig::default();
        config.rule_sets[0].steps[0].measurement.name = "MISSING".to_string();
        assert!(RuleCatalog::from_config(config).is_err());
    }

    #[test]
    fn test_empty_enumerated_contents_rejected() {
        let mut config = RuleCatalogConfig::default();
        config.enumerated[0].contents.clear();
        assert!(RuleCatalog::from_config(config).is_err());
    }

    #[test]
    fn test_catalog_roundtrips_through_toml() {
        let config = RuleCatalogConfig::default();
        let toml_text = toml::to_string_pretty(&config).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml_text.as_bytes()).unwrap();

        let catalog = RuleCatalog::load_from_file(file.path()).unwrap();
        assert!(catalog.rule_set(RULE_SET_CELL).is_ok());
        assert_eq!(catalog.enumerated("RRU_LINK").unwrap().contents.len(), 5);
    }
}
