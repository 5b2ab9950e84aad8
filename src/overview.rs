use crate::records::{BookingRecord, FreeTimeRecord};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Bookings as a table: project, date, time_range, instrument, person.
pub fn bookings_frame(bookings: &[BookingRecord]) -> PolarsResult<DataFrame> {
    let projects: Vec<&str> = bookings.iter().map(|b| b.project.as_str()).collect();
    let dates: Vec<NaiveDate> = bookings.iter().map(|b| b.date).collect();
    let ranges: Vec<String> = bookings.iter().map(|b| b.slot.to_string()).collect();
    let instruments: Vec<&str> = bookings.iter().map(|b| b.instrument.as_str()).collect();
    let people: Vec<&str> = bookings.iter().map(|b| b.person.as_str()).collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("project"), projects).into_column(),
        date_series("date", &dates)?.into_column(),
        Series::new(PlSmallStr::from_static("time_range"), ranges).into_column(),
        Series::new(PlSmallStr::from_static("instrument"), instruments).into_column(),
        Series::new(PlSmallStr::from_static("person"), people).into_column(),
    ])
}

/// Free-time report as a table: project, date, time_range, minutes.
pub fn free_time_frame(report: &[FreeTimeRecord]) -> PolarsResult<DataFrame> {
    let projects: Vec<&str> = report.iter().map(|r| r.project.as_str()).collect();
    let dates: Vec<NaiveDate> = report.iter().map(|r| r.date).collect();
    let ranges: Vec<String> = report.iter().map(|r| r.gap.to_string()).collect();
    let minutes: Vec<i64> = report.iter().map(|r| r.gap.duration().num_minutes()).collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("project"), projects).into_column(),
        date_series("date", &dates)?.into_column(),
        Series::new(PlSmallStr::from_static("time_range"), ranges).into_column(),
        Series::new(PlSmallStr::from_static("minutes"), minutes).into_column(),
    ])
}

fn date_series(name: &str, dates: &[NaiveDate]) -> PolarsResult<Series> {
    let days: Vec<i32> = dates
        .iter()
        .map(|date| date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
        .collect();
    Series::new(name.into(), days).cast(&DataType::Date)
}
