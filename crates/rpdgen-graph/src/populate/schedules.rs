//! Schedule rules: day and week building blocks plus the annual expansion
//! to 8760 hourly values against the model calendar.

use rpdgen_bdl::{coerce, CommandKind, Record};
use rpdgen_schema::doc::{self, ScheduleType};
use tracing::warn;

use crate::model::{Calendar, ModelRoot, HOLIDAY_SLOT};
use crate::node::Node;
use crate::populate::attrs::{
    AnnualScheduleAttrs, ComputedAttrs, DayScheduleAttrs, WeekScheduleAttrs,
};

/// Cumulative day counts at the start of each month, non-leap year.
const MONTH_OFFSETS: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

fn schedule_type(record: &Record) -> Option<ScheduleType> {
    coerce::try_str(record, "TYPE").map(|t| match t {
        "FRACTION" => ScheduleType::Fraction,
        "MULTIPLIER" => ScheduleType::Multiplier,
        "ON/OFF" | "ON-OFF" => ScheduleType::OnOff,
        "TEMPERATURE" => ScheduleType::Temperature,
        _ => ScheduleType::Other,
    })
}

pub fn compute_day(node: &Node) -> ComputedAttrs {
    let values = coerce::try_f64_list(&node.record, "VALUES");
    let hourly = if values.len() == 24 {
        values
    } else {
        if !values.is_empty() {
            warn!(
                schedule = %node.unique_name,
                count = values.len(),
                "day schedule does not have 24 values"
            );
        }
        Vec::new()
    };
    ComputedAttrs::DaySchedule(DayScheduleAttrs {
        schedule_type: schedule_type(&node.record),
        hourly,
    })
}

pub fn compute_week(node: &Node, model: &ModelRoot) -> ComputedAttrs {
    let day_schedules: Vec<String> = coerce::try_str_list(&node.record, "DAY-SCHEDULES")
        .into_iter()
        .inspect(|name| {
            if model.registry.resolve(name).is_none() {
                warn!(week = %node.unique_name, day = %name, "unknown day schedule");
            }
        })
        .collect();
    ComputedAttrs::WeekSchedule(WeekScheduleAttrs {
        schedule_type: schedule_type(&node.record),
        day_schedules,
    })
}

pub fn compute_annual(node: &Node, model: &ModelRoot) -> ComputedAttrs {
    ComputedAttrs::AnnualSchedule(AnnualScheduleAttrs {
        schedule_type: schedule_type(&node.record),
        hourly_values: expand_annual(node, model).unwrap_or_default(),
    })
}

/// Expand an annual schedule to 8760 values. Any unresolved piece (no
/// calendar, a missing week or day schedule, a short value list) degrades
/// the whole expansion to absent rather than producing a partial year.
fn expand_annual(node: &Node, model: &ModelRoot) -> Option<Vec<f64>> {
    let calendar = model.calendar.as_ref()?;

    let weeks = coerce::try_str_list(&node.record, "WEEK-SCHEDULES");
    if weeks.is_empty() {
        return None;
    }
    let months = coerce::try_f64_list(&node.record, "MONTH");
    let days = coerce::try_f64_list(&node.record, "DAY");
    let throughs = segment_ends(node, &weeks, &months, &days)?;

    let mut hourly = Vec::with_capacity(8760);
    for doy in 1..=calendar.days() as i64 {
        let segment = throughs.iter().position(|end| doy <= *end)?;
        let week = model.registry.resolve(&weeks[segment])?;
        if week.kind != CommandKind::WeekSchedulePd {
            return None;
        }
        let day_name = day_for_slot(week, calendar, doy)?;
        let day = model.registry.resolve(&day_name)?;
        if day.kind != CommandKind::DaySchedulePd {
            return None;
        }
        let values = coerce::try_f64_list(&day.record, "VALUES");
        if values.len() != 24 {
            warn!(schedule = %node.unique_name, day = %day_name, "day schedule incomplete");
            return None;
        }
        hourly.extend_from_slice(&values);
    }
    Some(hourly)
}

/// Per-segment through-dates as day of year. A single segment with no
/// MONTH/DAY keywords covers the whole year; otherwise each segment needs a
/// through-date and the last must reach December 31st.
fn segment_ends(node: &Node, weeks: &[String], months: &[f64], days: &[f64]) -> Option<Vec<i64>> {
    if weeks.len() == 1 && months.is_empty() {
        return Some(vec![365]);
    }
    if months.len() != weeks.len() || days.len() != weeks.len() {
        warn!(schedule = %node.unique_name, "WEEK-SCHEDULES/MONTH/DAY lengths disagree");
        return None;
    }
    let mut ends = Vec::with_capacity(weeks.len());
    for (month, day) in months.iter().zip(days) {
        let month = *month as i64;
        let day = *day as i64;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            warn!(schedule = %node.unique_name, month, day, "through-date out of range");
            return None;
        }
        ends.push(MONTH_OFFSETS[(month - 1) as usize] + day);
    }
    if ends.last() != Some(&365) {
        warn!(schedule = %node.unique_name, "segments do not cover the year");
        return None;
    }
    Some(ends)
}

/// The day schedule a week assigns to `doy`'s calendar slot. A week without
/// a holiday entry falls back to its Sunday schedule for holidays.
fn day_for_slot(week: &Node, calendar: &Calendar, doy: i64) -> Option<String> {
    let names = coerce::try_str_list(&week.record, "DAY-SCHEDULES");
    let slot = calendar.day_slots[(doy - 1) as usize];
    match names.get(slot) {
        Some(name) => Some(name.clone()),
        None if slot == HOLIDAY_SLOT => names.get(6).cloned(),
        None => None,
    }
}

pub fn assemble_schedule(node: &Node) -> doc::Schedule {
    let (schedule_type, hourly_values) = match &node.computed {
        ComputedAttrs::AnnualSchedule(attrs) => {
            (attrs.schedule_type, attrs.hourly_values.clone())
        }
        _ => (None, Vec::new()),
    };
    doc::Schedule {
        id: node.unique_name.clone(),
        schedule_type,
        hourly_values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_graph;
    use crate::populate::run_phase1;
    use crate::results::EmptyResultService;
    use rpdgen_bdl::{FieldValue, JsonRecordSource};

    fn num_list(values: &[f64]) -> FieldValue {
        FieldValue::List(values.iter().copied().map(FieldValue::Num).collect())
    }

    fn str_list(values: &[&str]) -> FieldValue {
        FieldValue::List(
            values
                .iter()
                .map(|s| FieldValue::Str(s.to_string()))
                .collect(),
        )
    }

    fn schedule_model(with_run_period: bool) -> ModelRoot {
        let mut records = vec![
            (
                CommandKind::DaySchedulePd,
                vec![
                    Record::new("WD")
                        .with_str("TYPE", "FRACTION")
                        .with_field("VALUES", num_list(&[1.0; 24])),
                    Record::new("WE")
                        .with_str("TYPE", "FRACTION")
                        .with_field("VALUES", num_list(&[0.0; 24])),
                ],
            ),
            (
                CommandKind::WeekSchedulePd,
                vec![Record::new("Wk").with_str("TYPE", "FRACTION").with_field(
                    "DAY-SCHEDULES",
                    str_list(&["WD", "WD", "WD", "WD", "WD", "WE", "WE", "WE"]),
                )],
            ),
            (
                CommandKind::SchedulePd,
                vec![Record::new("Ann")
                    .with_str("TYPE", "FRACTION")
                    .with_field("WEEK-SCHEDULES", str_list(&["Wk"]))],
            ),
        ];
        if with_run_period {
            records.push((
                CommandKind::RunPeriod,
                vec![Record::new("RP").with_num("BEGIN-YEAR", 2018.0)],
            ));
        }
        let mut model = build_graph(&JsonRecordSource::from_records(records)).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();
        model
    }

    #[test]
    fn annual_expansion_follows_the_calendar() {
        let model = schedule_model(true);
        let ann = model.registry.resolve("Ann").unwrap();
        let ComputedAttrs::AnnualSchedule(attrs) = &ann.computed else {
            panic!("annual attrs");
        };
        assert_eq!(attrs.hourly_values.len(), 8760);
        // 2018-01-01 is a Monday, 2018-01-06 a Saturday.
        assert_eq!(attrs.hourly_values[0], 1.0);
        assert_eq!(attrs.hourly_values[5 * 24], 0.0);
        assert_eq!(attrs.hourly_values[6 * 24], 0.0);
    }

    #[test]
    fn no_calendar_means_unexpanded_schedule() {
        let model = schedule_model(false);
        let ann = model.registry.resolve("Ann").unwrap();
        let ComputedAttrs::AnnualSchedule(attrs) = &ann.computed else {
            panic!("annual attrs");
        };
        assert!(attrs.hourly_values.is_empty());
        assert_eq!(attrs.schedule_type, Some(ScheduleType::Fraction));
    }

    #[test]
    fn short_day_schedule_voids_the_expansion() {
        let source = JsonRecordSource::from_records([
            (
                CommandKind::RunPeriod,
                vec![Record::new("RP").with_num("BEGIN-YEAR", 2018.0)],
            ),
            (
                CommandKind::DaySchedulePd,
                vec![Record::new("Short").with_field("VALUES", num_list(&[1.0; 12]))],
            ),
            (
                CommandKind::WeekSchedulePd,
                vec![Record::new("Wk").with_field("DAY-SCHEDULES", str_list(&["Short"; 8]))],
            ),
            (
                CommandKind::SchedulePd,
                vec![Record::new("Ann").with_field("WEEK-SCHEDULES", str_list(&["Wk"]))],
            ),
        ]);
        let mut model = build_graph(&source).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();
        let ann = model.registry.resolve("Ann").unwrap();
        let ComputedAttrs::AnnualSchedule(attrs) = &ann.computed else {
            panic!("annual attrs");
        };
        assert!(attrs.hourly_values.is_empty());
    }

    #[test]
    fn multi_segment_through_dates() {
        let source = JsonRecordSource::from_records([
            (
                CommandKind::RunPeriod,
                vec![Record::new("RP").with_num("BEGIN-YEAR", 2018.0)],
            ),
            (
                CommandKind::DaySchedulePd,
                vec![
                    Record::new("On").with_field("VALUES", num_list(&[1.0; 24])),
                    Record::new("Off").with_field("VALUES", num_list(&[0.0; 24])),
                ],
            ),
            (
                CommandKind::WeekSchedulePd,
                vec![
                    Record::new("WkOn").with_field("DAY-SCHEDULES", str_list(&["On"; 8])),
                    Record::new("WkOff").with_field("DAY-SCHEDULES", str_list(&["Off"; 8])),
                ],
            ),
            (
                CommandKind::SchedulePd,
                vec![Record::new("Ann")
                    .with_field("WEEK-SCHEDULES", str_list(&["WkOn", "WkOff"]))
                    .with_field("MONTH", num_list(&[6.0, 12.0]))
                    .with_field("DAY", num_list(&[30.0, 31.0]))],
            ),
        ]);
        let mut model = build_graph(&source).unwrap();
        run_phase1(&mut model, &EmptyResultService).unwrap();
        let ann = model.registry.resolve("Ann").unwrap();
        let ComputedAttrs::AnnualSchedule(attrs) = &ann.computed else {
            panic!("annual attrs");
        };
        assert_eq!(attrs.hourly_values.len(), 8760);
        // June 30th is day 181; July 1st switches to the off week.
        assert_eq!(attrs.hourly_values[180 * 24], 1.0);
        assert_eq!(attrs.hourly_values[181 * 24], 0.0);
    }
}
