//! Alarm work order model
//!
//! A work order is an immutable snapshot of one alarm record. The
//! `GJxxxxx` columns carry the standardized alarm fields used by the
//! rule templates; access goes through `field()` so unknown codes are
//! an explicit `None` rather than a reflection miss.

use serde::{Deserialize, Serialize};

/// One alarm work order under diagnosis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkOrder {
    /// Unique work order id, e.g. "CMCC-GD-GZCL-20250628-000781"
    pub work_order_id: String,

    /// Creation timestamp as recorded upstream
    #[serde(default)]
    pub created_time: Option<String>,

    /// GJ00008 - alarm standard name (告警标准名)
    #[serde(rename = "GJ00008", default)]
    pub gj00008: Option<String>,

    /// GJ00010 - machine room (所属机房)
    #[serde(rename = "GJ00010", default)]
    pub gj00010: Option<String>,

    /// GJ00011 - equipment vendor (设备厂家)
    #[serde(rename = "GJ00011", default)]
    pub gj00011: Option<String>,

    /// GJ00014 - alarm object (告警对象)
    #[serde(rename = "GJ00014", default)]
    pub gj00014: Option<String>,

    /// GJ00017 - network level-2 classification (网络2级分类)
    #[serde(rename = "GJ00017", default)]
    pub gj00017: Option<String>,

    /// GJ00021 - NMS alarm clear time (网管告警消除时间)
    #[serde(rename = "GJ00021", default)]
    pub gj00021: Option<String>,

    /// Work order subject (工单主题)
    #[serde(default)]
    pub order_subject: Option<String>,

    /// Processing status (处理中 / 已归档 / ...)
    #[serde(default)]
    pub order_status: Option<String>,

    /// Processing region
    #[serde(default)]
    pub process_region: Option<String>,

    /// Alarm severity level
    #[serde(default)]
    pub warning_level: Option<String>,

    /// Network level-1 classification
    #[serde(default)]
    pub network_level_1: Option<String>,

    /// Network level-3 classification
    #[serde(default)]
    pub network_level_3: Option<String>,

    /// Alarm source / NMS system name
    #[serde(default)]
    pub source_name: Option<String>,

    /// Province-level region name
    #[serde(default)]
    pub city_name_1: Option<String>,

    /// City-level region name
    #[serde(default)]
    pub city_name_2: Option<String>,

    /// Network element name (网元名称); keys the optical readings
    #[serde(default)]
    pub ne_name: Option<String>,

    /// Original alarm id on the NMS side
    #[serde(default)]
    pub nms_alarm_id: Option<String>,

    /// Free-form alarm details blob; see `details::parse_details`
    #[serde(default)]
    pub details: Option<String>,
}

impl WorkOrder {
    /// Look up a standardized alarm field by its `GJxxxxx` code.
    ///
    /// Returns `None` for codes outside the known field set; the
    /// placeholder resolver then leaves the token as literal text.
    pub fn field(&self, code: &str) -> Option<&str> {
        match code {
            "GJ00008" => self.gj00008.as_deref(),
            "GJ00010" => self.gj00010.as_deref(),
            "GJ00011" => self.gj00011.as_deref(),
            "GJ00014" => self.gj00014.as_deref(),
            "GJ00017" => self.gj00017.as_deref(),
            "GJ00021" => self.gj00021.as_deref(),
            _ => None,
        }
    }

    /// Parse the free-form details blob into structured form.
    ///
    /// `None` when there is no blob or it carries no key/value
    /// structure; the caller shows the raw text in that case.
    pub fn parsed_details(&self) -> Option<serde_json::Map<String, serde_json::Value>> {
        crate::details::parse_details(self.details.as_deref()?)
    }
}

/// Work order record store. Blocking calls; retry and timeout policy
/// belongs to the implementation, not the engine.
pub trait WorkOrderStore: Send + Sync {
    /// Fetch one work order by id. `Ok(None)` when no such record.
    fn fetch(&self, work_order_id: &str) -> anyhow::Result<Option<WorkOrder>>;

    /// List out-of-service work orders, newest first, optionally
    /// narrowed by a keyword on the alarm standard name. Returns the
    /// total matching count plus one page.
    fn list(&self, keyword: &str, offset: u64, limit: u64)
        -> anyhow::Result<(u64, Vec<WorkOrder>)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WorkOrder {
        WorkOrder {
            work_order_id: "CMCC-GD-GZCL-20250628-000781".to_string(),
            gj00008: Some("小区退服告警".to_string()),
            gj00011: Some("华为".to_string()),
            gj00014: Some("深圳10号线禾花站皮飞DE-HLW".to_string()),
            ne_name: Some("深圳10号线禾花站皮飞DE-HLW".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_field_lookup_known_codes() {
        let order = sample();
        assert_eq!(order.field("GJ00008"), Some("小区退服告警"));
        assert_eq!(order.field("GJ00011"), Some("华为"));
    }

    #[test]
    fn test_field_lookup_absent_value() {
        let order = sample();
        // Known code, but nothing recorded on this order
        assert_eq!(order.field("GJ00010"), None);
    }

    #[test]
    fn test_field_lookup_unknown_code() {
        let order = sample();
        assert_eq!(order.field("GJ99999"), None);
        assert_eq!(order.field("JT00012"), None);
    }

    #[test]
    fn test_serde_uses_alarm_field_codes() {
        let order = sample();
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains("\"GJ00008\""));
        assert!(!json.contains("gj00008"));

        let back: WorkOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.gj00008.as_deref(), Some("小区退服告警"));
    }

    #[test]
    fn test_parsed_details() {
        let mut order = sample();
        assert!(order.parsed_details().is_none());

        order.details = Some("告警网管：FMC\n告警名称：小区退服告警".to_string());
        let parsed = order.parsed_details().unwrap();
        assert_eq!(parsed["告警网管"], serde_json::json!("FMC"));
    }
}
