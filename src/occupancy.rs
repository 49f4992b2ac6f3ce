// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Booking, BookingStatus, Room};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Which screen is asking. The two disagree on whether a checked-out day-use
/// booking still occupies its room on its own date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyView {
    /// "Today" summary: the same-day rule runs before checked-out bookings are dropped.
    Dashboard,
    /// Room grid for a selected date: checked-out bookings are dropped first.
    RoomGrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    CheckedIn,
    Confirmed,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomChip {
    pub room_no: String,
    pub booking_id: Option<i64>,
    pub guest_name: Option<String>,
}

pub type CategoryGroups = BTreeMap<String, Vec<RoomChip>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusBuckets {
    pub available: CategoryGroups,
    pub checked_in: CategoryGroups,
    pub confirmed: CategoryGroups,
    pub blocked: CategoryGroups,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub total: usize,
    pub available: usize,
    pub checked_in: usize,
    pub confirmed: usize,
    pub blocked: usize,
    pub occupancy_rate: u32,
}

impl StatusBuckets {
    /// Per-bucket room counts. The total also covers rooms that bookings hold
    /// but the room list no longer carries, so the buckets always add up.
    pub fn counts(&self) -> BucketCounts {
        let count = |g: &CategoryGroups| g.values().map(Vec::len).sum::<usize>();
        let (available, checked_in) = (count(&self.available), count(&self.checked_in));
        let (confirmed, blocked) = (count(&self.confirmed), count(&self.blocked));
        let total = available + checked_in + confirmed + blocked;
        BucketCounts {
            total,
            available,
            checked_in,
            confirmed,
            blocked,
            occupancy_rate: occupancy_rate(checked_in, total),
        }
    }

    fn group_mut(&mut self, bucket: Bucket) -> &mut CategoryGroups {
        match bucket {
            Bucket::CheckedIn => &mut self.checked_in,
            Bucket::Confirmed => &mut self.confirmed,
            Bucket::Blocked => &mut self.blocked,
        }
    }
}

fn bucket_by_status(b: &Booking) -> Option<Bucket> {
    if b.checked_in {
        return Some(Bucket::CheckedIn);
    }
    match b.booking_status {
        BookingStatus::Confirmed => Some(Bucket::Confirmed),
        BookingStatus::Blocked => Some(Bucket::Blocked),
        BookingStatus::Cancelled => None,
    }
}

/// Bucket a single booking's rooms fall into on `date`, if any.
pub fn classify(b: &Booking, date: NaiveDate, view: OccupancyView) -> Option<Bucket> {
    let same_day_hit = b.checkin_date == b.checkout_date && date == b.checkin_date;
    let in_range = b.checkin_date <= date && date < b.checkout_date;

    if view == OccupancyView::RoomGrid && b.checked_out {
        return None;
    }
    if same_day_hit {
        return bucket_by_status(b);
    }
    if b.checked_out {
        return None;
    }
    if in_range {
        return bucket_by_status(b);
    }
    None
}

/// Classify every room for `date`, grouped by category name.
///
/// Bookings are evaluated in order; a room already claimed by an earlier
/// booking keeps its first bucket.
pub fn compute_status_buckets(
    bookings: &[Booking],
    rooms: &[Room],
    date: NaiveDate,
    view: OccupancyView,
) -> StatusBuckets {
    let category_of: HashMap<&str, &str> = rooms
        .iter()
        .filter_map(|r| r.category_name().map(|c| (r.room_no.as_str(), c)))
        .collect();

    let mut out = StatusBuckets::default();
    let mut occupied: HashSet<String> = HashSet::new();

    for b in bookings {
        let Some(bucket) = classify(b, date, view) else {
            continue;
        };
        for room in &b.rooms {
            if !occupied.insert(room.room_no.clone()) {
                continue;
            }
            let category = category_of
                .get(room.room_no.as_str())
                .copied()
                .or(room.category.as_deref())
                .unwrap_or(UNCATEGORIZED);
            out.group_mut(bucket)
                .entry(category.to_string())
                .or_default()
                .push(RoomChip {
                    room_no: room.room_no.clone(),
                    booking_id: Some(b.id),
                    guest_name: Some(b.guest_name.clone()),
                });
        }
    }

    for room in rooms {
        if occupied.contains(&room.room_no) {
            continue;
        }
        out.available
            .entry(room.category_name().unwrap_or(UNCATEGORIZED).to_string())
            .or_default()
            .push(RoomChip {
                room_no: room.room_no.clone(),
                booking_id: None,
                guest_name: None,
            });
    }
    out
}

/// Checked-in rooms as a whole percentage of all rooms; 0 when there are no rooms.
pub fn occupancy_rate(checked_in_rooms: usize, total_rooms: usize) -> u32 {
    if total_rooms == 0 {
        return 0;
    }
    let scaled = (checked_in_rooms * 200 + total_rooms) / (total_rooms * 2);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}
