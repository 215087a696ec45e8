//! Failure-tolerant field coercion and unit conversion.
//!
//! BDL keywords are loosely typed: a numeric keyword may arrive as a number,
//! as numeric text, or not at all. Population rules never treat a malformed
//! or missing field as an error; every helper here returns `Option`, and
//! `None` propagates as "attribute absent" through the sparse-document
//! assembly policy.
//!
//! Conversions go from BDL's inch-pound units to the SI units the report
//! schema uses.

use crate::record::{FieldValue, Record};

/// Read a field as `f64`, tolerating numeric text.
pub fn try_f64(record: &Record, key: &str) -> Option<f64> {
    record.get(key).and_then(FieldValue::as_num)
}

/// Read a field as `i64`. Values with a fractional part are rejected rather
/// than rounded; a truncated schedule index is worse than a missing one.
pub fn try_i64(record: &Record, key: &str) -> Option<i64> {
    let n = try_f64(record, key)?;
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

/// Read a field as a trimmed string.
pub fn try_str<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record.get(key).and_then(FieldValue::as_str).map(str::trim)
}

/// Read a repeated keyword as a list of strings. A scalar value is treated
/// as a one-element list, matching how BDL collapses single-entry repeats.
pub fn try_str_list(record: &Record, key: &str) -> Vec<String> {
    match record.get(key) {
        Some(FieldValue::List(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.trim().to_string()))
            .collect(),
        Some(FieldValue::Str(s)) => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// Read a repeated keyword as a list of numbers, dropping malformed entries.
pub fn try_f64_list(record: &Record, key: &str) -> Vec<f64> {
    match record.get(key) {
        Some(FieldValue::List(items)) => items.iter().filter_map(FieldValue::as_num).collect(),
        Some(v) => v.as_num().into_iter().collect(),
        None => Vec::new(),
    }
}

// ============================================================================
// Unit conversions (IP → SI)
// ============================================================================

pub fn ft_to_m(ft: f64) -> f64 {
    ft * 0.3048
}

pub fn sqft_to_m2(sqft: f64) -> f64 {
    sqft * 0.092_903_04
}

pub fn cuft_to_m3(cuft: f64) -> f64 {
    cuft * 0.028_316_846_592
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) / 1.8
}

/// Temperature *difference* (ranges, approaches, deltas) — no offset.
pub fn delta_f_to_c(df: f64) -> f64 {
    df / 1.8
}

pub fn btuh_to_watts(btuh: f64) -> f64 {
    btuh * 0.293_071_07
}

pub fn kbtuh_to_watts(kbtuh: f64) -> f64 {
    btuh_to_watts(kbtuh * 1000.0)
}

pub fn gpm_to_l_per_s(gpm: f64) -> f64 {
    gpm * 0.063_090_196
}

pub fn cfm_to_l_per_s(cfm: f64) -> f64 {
    cfm * 0.471_947_44
}

pub fn ft_head_to_pa(ft: f64) -> f64 {
    // Water column at standard density.
    ft * 2_989.066_92
}

/// Thermal resistance: (h·ft²·°F)/Btu → (m²·K)/W.
pub fn r_ip_to_si(r: f64) -> f64 {
    r * 0.176_110_18
}

/// Thermal conductance/U-factor: Btu/(h·ft²·°F) → W/(m²·K).
pub fn u_ip_to_si(u: f64) -> f64 {
    u * 5.678_263_34
}

/// Conductivity: Btu/(h·ft·°F) → W/(m·K).
pub fn conductivity_ip_to_si(k: f64) -> f64 {
    k * 1.730_734_66
}

pub fn lb_per_cuft_to_kg_per_m3(d: f64) -> f64 {
    d * 16.018_463_37
}

/// Specific heat: Btu/(lb·°F) → J/(kg·K).
pub fn btu_per_lb_f_to_j_per_kg_k(c: f64) -> f64 {
    c * 4_186.8
}

/// Pump/fan specific power: W per gpm → W per (L/s).
pub fn w_per_gpm_to_w_per_l_s(w: f64) -> f64 {
    w / 0.063_090_196
}

/// Power density: W/ft² → W/m².
pub fn w_per_sqft_to_w_per_m2(w: f64) -> f64 {
    w / 0.092_903_04
}

pub fn gal_to_l(gal: f64) -> f64 {
    gal * 3.785_411_784
}
