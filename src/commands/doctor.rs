// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::availability::StayRange;
use crate::billing::{back_solve_rate, line_amount};
use crate::models::{Booking, BookingStatus, Room};
use crate::store::{load_bookings, load_rooms};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = diagnose(&load_bookings(conn)?, &load_rooms(conn)?);
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn diagnose(bookings: &[Booking], rooms: &[Room]) -> Vec<Issue> {
    let mut issues = Vec::new();
    let live: Vec<&Booking> = bookings
        .iter()
        .filter(|b| b.booking_status != BookingStatus::Cancelled)
        .collect();

    // 1) Two live bookings holding the same room on overlapping dates
    for (i, a) in live.iter().enumerate() {
        for b in &live[i + 1..] {
            if !StayRange::of(a).overlaps(&StayRange::of(b)) {
                continue;
            }
            for room in a.rooms.iter().filter(|r| b.has_room(&r.room_no)) {
                issues.push(Issue {
                    kind: "double_booking",
                    detail: format!("room {}: bookings {} and {}", room.room_no, a.id, b.id),
                });
            }
        }
    }

    // 2) Rooms on bookings that are not in the room list
    let known: HashSet<&str> = rooms.iter().map(|r| r.room_no.as_str()).collect();
    for b in bookings {
        for r in b.rooms.iter().filter(|r| !known.contains(r.room_no.as_str())) {
            issues.push(Issue {
                kind: "unknown_room",
                detail: format!("booking {}: room {}", b.id, r.room_no),
            });
        }
    }

    // 3) Charges whose amount no longer matches rate, qty and gst
    for b in bookings {
        for t in b.tokens() {
            let expected = line_amount(t.rate, t.qty, t.gst);
            let reverse_ok = back_solve_rate(t.amount, t.qty, t.gst).is_ok_and(|r| r == t.rate);
            if expected != t.amount && !reverse_ok {
                issues.push(Issue {
                    kind: "charge_drift",
                    detail: format!(
                        "booking {} charge {}: amount {} but rate/qty/gst give {}",
                        b.id, t.id, t.amount, expected
                    ),
                });
            }
        }
    }

    // 4) Stays that ended without a check-out
    for b in &live {
        if b.checked_in && !b.checked_out && b.checkout_date < crate::utils::today() {
            issues.push(Issue {
                kind: "overdue_checkout",
                detail: format!("booking {} was due out {}", b.id, b.checkout_date),
            });
        }
    }
    issues
}
