//! Result service boundary: simulated-performance values by name and code.
//!
//! The simulation engine is a black box behind this trait: given an object
//! name and a batch of numeric metric codes, return a value per code.
//! Queries are batched per node (one call per node, not per metric) because
//! the underlying service wraps an external process and every round trip is
//! expensive. The engine's "no data" sentinel is translated to `None` here,
//! at the adapter, so node logic only ever sees `Option<f64>`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

/// The engine's magic "no data" value. Anything this close to the sentinel
/// is noise, not data.
pub const NO_DATA_SENTINEL: f64 = -99999.0;

/// One metric in a batched query. `report_key` and `row_key` address the
/// engine's report tables; the numeric `code` identifies the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricRequest {
    pub code: i64,
    pub report_key: &'static str,
    pub row_key: &'static str,
}

pub const fn metric(code: i64, report_key: &'static str, row_key: &'static str) -> MetricRequest {
    MetricRequest {
        code,
        report_key,
        row_key,
    }
}

// Metric codes, grouped by subsystem. The numbering is stable across
// releases; downstream result files key on these.
pub const CONSTRUCTION_U_FACTOR: MetricRequest = metric(2101, "LV-D", "U-VALUE");
pub const SYSTEM_SUPPLY_AIRFLOW: MetricRequest = metric(2201, "SV-A", "SUPPLY-FLOW");
pub const SYSTEM_SUPPLY_FAN_KW: MetricRequest = metric(2202, "SV-A", "SUPPLY-FAN-KW");
pub const SYSTEM_COOLING_CAPACITY: MetricRequest = metric(2203, "SV-A", "COOL-CAP");
pub const SYSTEM_HEATING_CAPACITY: MetricRequest = metric(2204, "SV-A", "HEAT-CAP");
pub const SYSTEM_OUTDOOR_AIRFLOW: MetricRequest = metric(2205, "SV-A", "OA-FLOW");
pub const ZONE_SUPPLY_AIRFLOW: MetricRequest = metric(2301, "SV-A", "ZONE-SUPPLY-FLOW");
pub const ZONE_EXHAUST_AIRFLOW: MetricRequest = metric(2302, "SV-A", "ZONE-EXHAUST-FLOW");
pub const ZONE_HEATING_CAPACITY: MetricRequest = metric(2303, "SV-A", "ZONE-HEAT-CAP");
pub const ZONE_EXHAUST_FAN_KW: MetricRequest = metric(2304, "SV-A", "ZONE-EXHAUST-KW");
pub const PUMP_FLOW: MetricRequest = metric(2401, "PV-A", "FLOW");
pub const PUMP_HEAD: MetricRequest = metric(2402, "PV-A", "HEAD");
pub const PUMP_KW: MetricRequest = metric(2403, "PV-A", "KW");
pub const BOILER_CAPACITY: MetricRequest = metric(2501, "PV-A", "BOILER-CAP");
pub const BOILER_AUX_KW: MetricRequest = metric(2502, "PV-A", "BOILER-AUX-KW");
pub const CHILLER_CAPACITY: MetricRequest = metric(2601, "PV-A", "CHILLER-CAP");
pub const HEAT_REJECTION_FAN_KW: MetricRequest = metric(2701, "PV-A", "TOWER-FAN-KW");
pub const DWH_CAPACITY: MetricRequest = metric(2801, "PV-A", "DWH-CAP");
pub const ANNUAL_SITE_ENERGY: MetricRequest = metric(2901, "BEPS", "TOTAL-SITE");
pub const ANNUAL_LIGHTING_ENERGY: MetricRequest = metric(2902, "BEPS", "LIGHTS");
pub const ANNUAL_EQUIPMENT_ENERGY: MetricRequest = metric(2903, "BEPS", "EQUIP");
pub const ANNUAL_HEATING_ENERGY: MetricRequest = metric(2904, "BEPS", "HEATING");
pub const ANNUAL_COOLING_ENERGY: MetricRequest = metric(2905, "BEPS", "COOLING");
pub const ANNUAL_FAN_ENERGY: MetricRequest = metric(2906, "BEPS", "FANS");
pub const ANNUAL_PUMP_ENERGY: MetricRequest = metric(2907, "BEPS", "PUMPS");
pub const ANNUAL_SWH_ENERGY: MetricRequest = metric(2908, "BEPS", "DHW");

/// Batched, synchronous result queries. Implementations must return one
/// entry per requested code; a miss or engine failure is `None`, never an
/// error — a failed query degrades to an absent field.
pub trait ResultService {
    fn query(
        &self,
        node_name: &str,
        requests: &[MetricRequest],
    ) -> BTreeMap<i64, Option<f64>>;
}

/// A service with no data: every query misses. Useful when translating a
/// model that was never simulated.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyResultService;

impl ResultService for EmptyResultService {
    fn query(
        &self,
        _node_name: &str,
        requests: &[MetricRequest],
    ) -> BTreeMap<i64, Option<f64>> {
        requests.iter().map(|r| (r.code, None)).collect()
    }
}

/// File-backed results: `{ "<node name>": { "<code>": value } }`.
///
/// Values equal to the sentinel are translated to `None` on read, before
/// node logic ever sees them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct JsonResultService {
    by_name: BTreeMap<String, BTreeMap<String, f64>>,
}

impl JsonResultService {
    pub fn from_path(path: &Path) -> Result<Self, anyhow::Error> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn from_str(text: &str) -> Result<Self, anyhow::Error> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn insert(&mut self, node_name: &str, code: i64, value: f64) {
        self.by_name
            .entry(node_name.to_string())
            .or_default()
            .insert(code.to_string(), value);
    }
}

impl ResultService for JsonResultService {
    fn query(
        &self,
        node_name: &str,
        requests: &[MetricRequest],
    ) -> BTreeMap<i64, Option<f64>> {
        let row = self.by_name.get(node_name);
        let mut out = BTreeMap::new();
        for request in requests {
            let raw = row.and_then(|r| r.get(&request.code.to_string())).copied();
            let value = raw.filter(|v| (*v - NO_DATA_SENTINEL).abs() > 1e-6);
            if raw.is_some() && value.is_none() {
                debug!(node_name, code = request.code, "sentinel translated to no-data");
            }
            out.insert(request.code, value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_service_misses_everything() {
        let svc = EmptyResultService;
        let out = svc.query("Anything", &[PUMP_FLOW, PUMP_KW]);
        assert_eq!(out.len(), 2);
        assert!(out.values().all(Option::is_none));
    }

    #[test]
    fn json_service_translates_sentinel() {
        let svc = JsonResultService::from_str(
            r#"{ "P1": { "2401": 120.0, "2402": -99999.0 } }"#,
        )
        .unwrap();
        let out = svc.query("P1", &[PUMP_FLOW, PUMP_HEAD, PUMP_KW]);
        assert_eq!(out[&2401], Some(120.0));
        assert_eq!(out[&2402], None); // sentinel
        assert_eq!(out[&2403], None); // absent
    }

    #[test]
    fn unknown_node_misses() {
        let svc = JsonResultService::from_str(r#"{}"#).unwrap();
        let out = svc.query("P1", &[PUMP_FLOW]);
        assert_eq!(out[&2401], None);
    }
}
