// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::occupancy::{
    BucketCounts, CategoryGroups, OccupancyView, StatusBuckets, compute_status_buckets,
};
use crate::store::{load_bookings, load_rooms};
use crate::utils::{maybe_print_json, opt_arg, parse_date, pretty_table, today};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub date: NaiveDate,
    pub counts: BucketCounts,
    pub buckets: StatusBuckets,
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let report = build(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }

    let c = &report.counts;
    println!(
        "{}: {} rooms, {} available, {} checked in, {} confirmed, {} blocked, occupancy {}%",
        report.date, c.total, c.available, c.checked_in, c.confirmed, c.blocked, c.occupancy_rate
    );
    let mut rows = Vec::new();
    push_rows(&mut rows, "Checked in", &report.buckets.checked_in);
    push_rows(&mut rows, "Confirmed", &report.buckets.confirmed);
    push_rows(&mut rows, "Blocked", &report.buckets.blocked);
    push_rows(&mut rows, "Available", &report.buckets.available);
    println!(
        "{}",
        pretty_table(&["Status", "Category", "Room", "Booking", "Guest"], rows)
    );
    Ok(())
}

pub fn build(conn: &Connection, sub: &clap::ArgMatches) -> Result<StatusReport> {
    let date = match opt_arg(sub, "date") {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };
    let view = match sub.get_one::<String>("view").map(String::as_str) {
        Some("grid") => OccupancyView::RoomGrid,
        _ => OccupancyView::Dashboard,
    };
    let rooms = load_rooms(conn)?;
    let bookings = load_bookings(conn)?;
    let buckets = compute_status_buckets(&bookings, &rooms, date, view);
    tracing::debug!(
        %date,
        ?view,
        rooms = rooms.len(),
        bookings = bookings.len(),
        "status computed"
    );
    Ok(StatusReport {
        date,
        counts: buckets.counts(),
        buckets,
    })
}

fn push_rows(rows: &mut Vec<Vec<String>>, label: &str, groups: &CategoryGroups) {
    for (category, chips) in groups {
        for chip in chips {
            rows.push(vec![
                label.to_string(),
                category.clone(),
                chip.room_no.clone(),
                chip.booking_id.map(|id| id.to_string()).unwrap_or_default(),
                chip.guest_name.clone().unwrap_or_default(),
            ]);
        }
    }
}
