use chrono::NaiveDate;
use polars::prelude::*;
use slot_booking::{
    BookingPolicy, BookingRecord, FreeTimeRecord, Interval, PolicyError, bookings_frame,
    free_time_frame,
};
use std::fs;
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn default_policy_matches_the_booking_rules() {
    let policy = BookingPolicy::default();
    assert_eq!(policy.slot_duration(), chrono::Duration::hours(3));
    assert_eq!(policy.step(), chrono::Duration::minutes(15));
    assert_eq!(policy.display_min_gap(), chrono::Duration::hours(3));
    assert_eq!(policy.report_min_gap(), chrono::Duration::hours(1));
    assert!(policy.validate().is_ok());
}

#[test]
fn policy_json_fills_missing_fields_with_defaults() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(tmp.path(), r#"{ "slot_minutes": 120 }"#).unwrap();
    let policy = BookingPolicy::from_json_file(tmp.path()).unwrap();
    assert_eq!(policy.slot_minutes, 120);
    assert_eq!(policy.step_minutes, 15);
}

#[test]
fn policy_rejects_out_of_range_values() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(tmp.path(), r#"{ "step_minutes": 0 }"#).unwrap();
    let err = BookingPolicy::from_json_file(tmp.path()).unwrap_err();
    assert!(matches!(
        err,
        PolicyError::OutOfRange {
            field: "step_minutes",
            value: 0,
            ..
        }
    ));

    let too_long = BookingPolicy {
        slot_minutes: 1440,
        ..BookingPolicy::default()
    };
    assert!(too_long.save_json_file(tmp.path()).is_err());
}

#[test]
fn policy_save_then_load() {
    let tmp = NamedTempFile::new().unwrap();
    let policy = BookingPolicy {
        slot_minutes: 90,
        step_minutes: 30,
        display_min_gap_minutes: 90,
        report_min_gap_minutes: 45,
    };
    policy.save_json_file(tmp.path()).unwrap();
    assert_eq!(BookingPolicy::from_json_file(tmp.path()).unwrap(), policy);
}

#[test]
fn bookings_frame_has_typed_date_column() {
    let bookings = vec![
        BookingRecord {
            project: "Choir".into(),
            date: d(2025, 3, 10),
            slot: Interval::parse("09:00 - 12:00").unwrap(),
            instrument: "Viola".into(),
            person: "Kim".into(),
        },
        BookingRecord {
            project: "Choir".into(),
            date: d(2025, 3, 11),
            slot: Interval::parse("12:00 - 15:00").unwrap(),
            instrument: "Oboe".into(),
            person: "Robin".into(),
        },
    ];
    let df = bookings_frame(&bookings).unwrap();
    assert_eq!(df.height(), 2);
    let names: Vec<&str> = df.get_columns().iter().map(|c| c.name().as_str()).collect();
    assert_eq!(names, vec!["project", "date", "time_range", "instrument", "person"]);
    assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
    assert_eq!(
        df.column("time_range").unwrap().str().unwrap().get(1),
        Some("12:00 - 15:00")
    );
}

#[test]
fn free_time_frame_reports_gap_minutes() {
    let report = vec![FreeTimeRecord {
        project: "Band".into(),
        date: d(2025, 3, 10),
        gap: Interval::parse("14:00 - 20:00").unwrap(),
    }];
    let df = free_time_frame(&report).unwrap();
    assert_eq!(df.column("minutes").unwrap().i64().unwrap().get(0), Some(360));

    let empty = free_time_frame(&[]).unwrap();
    assert_eq!(empty.height(), 0);
    assert_eq!(empty.width(), 4);
}
