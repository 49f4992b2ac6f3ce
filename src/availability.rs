// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Booking, BookingStatus, Room};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde::Serialize;

/// Half-open stay `[checkin, checkout)`. A stay with equal dates is a day-use booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StayRange {
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
}

impl StayRange {
    pub fn new(checkin: NaiveDate, checkout: NaiveDate) -> Result<Self> {
        if checkout < checkin {
            return Err(anyhow!(
                "Check-out {} is before check-in {}",
                checkout,
                checkin
            ));
        }
        Ok(Self { checkin, checkout })
    }

    pub fn of(booking: &Booking) -> Self {
        Self {
            checkin: booking.checkin_date,
            checkout: booking.checkout_date,
        }
    }

    /// Exclusive end of the days the stay holds. A day-use holds its own date.
    fn held_until(&self) -> NaiveDate {
        if self.checkout == self.checkin {
            self.checkin.succ_opt().unwrap_or(self.checkin)
        } else {
            self.checkout
        }
    }

    /// True when `self` (the candidate) collides with `existing`.
    ///
    /// A day-use on `d` is tested as `[d, d+1)`: it clashes with a stay that
    /// checks in on `d`, but not with one that checks out on `d`.
    pub fn overlaps(&self, existing: &StayRange) -> bool {
        let (start, end) = (self.checkin, self.held_until());
        let (other_start, other_end) = (existing.checkin, existing.held_until());
        let starts_inside = start >= other_start && start < other_end;
        let ends_inside = end > other_start && end <= other_end;
        let contains = start <= other_start && end >= other_end;
        starts_inside || ends_inside || contains
    }
}

/// Decide whether a room is free for `requested`, given the bookings that hold it.
///
/// Cancelled bookings and the booking identified by `exclude_booking_id` (the
/// one being edited) never block the room.
pub fn is_room_available<'a, I>(
    room_bookings: I,
    requested: &StayRange,
    exclude_booking_id: Option<i64>,
) -> bool
where
    I: IntoIterator<Item = &'a Booking>,
{
    room_bookings.into_iter().all(|b| {
        if Some(b.id) == exclude_booking_id || b.booking_status == BookingStatus::Cancelled {
            return true;
        }
        !requested.overlaps(&StayRange::of(b))
    })
}

/// Rooms from `rooms` that no booking in `bookings` holds during `requested`.
pub fn available_rooms<'a>(
    rooms: &'a [Room],
    bookings: &[Booking],
    requested: &StayRange,
    exclude_booking_id: Option<i64>,
) -> Vec<&'a Room> {
    rooms
        .iter()
        .filter(|room| {
            let holding = bookings.iter().filter(|b| b.has_room(&room.room_no));
            is_room_available(holding, requested, exclude_booking_id)
        })
        .collect()
}
