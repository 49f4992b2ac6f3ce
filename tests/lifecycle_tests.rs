// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use frontdesk::lifecycle::{LifecycleError, cancel, check_in, check_out, confirm, invoice};
use frontdesk::models::{Booking, BookingStatus};
use rust_decimal::Decimal;

fn booking(status: BookingStatus) -> Booking {
    Booking {
        id: 42,
        guest_name: "R. Iyer".into(),
        guest_phone: Some("98450 00000".into()),
        checkin_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        checkout_date: NaiveDate::from_ymd_opt(2024, 4, 3).unwrap(),
        booking_status: status,
        checked_in: false,
        checked_out: false,
        rooms: vec![],
        room_tokens: vec![],
        service_tokens: vec![],
        food_tokens: vec![],
        payment_tokens: vec![],
        advance_payment: Decimal::ZERO,
        invoice_no: None,
        version: 0,
        remote_id: None,
    }
}

#[test]
fn full_stay_runs_through_to_invoice() {
    let mut b = booking(BookingStatus::Blocked);
    confirm(&mut b).unwrap();
    assert_eq!(b.booking_status, BookingStatus::Confirmed);
    check_in(&mut b).unwrap();
    check_out(&mut b).unwrap();
    invoice(&mut b, "INV-2024-0001".into()).unwrap();
    assert_eq!(b.invoice_no.as_deref(), Some("INV-2024-0001"));

    assert_eq!(
        invoice(&mut b, "INV-2024-0002".into()),
        Err(LifecycleError::AlreadyInvoiced {
            id: 42,
            invoice_no: "INV-2024-0001".into()
        })
    );
}

#[test]
fn cancel_is_terminal_and_only_before_checkin() {
    let mut b = booking(BookingStatus::Confirmed);
    cancel(&mut b).unwrap();
    assert_eq!(cancel(&mut b), Err(LifecycleError::Cancelled(42)));
    assert_eq!(check_in(&mut b), Err(LifecycleError::Cancelled(42)));
    assert_eq!(confirm(&mut b), Err(LifecycleError::Cancelled(42)));

    let mut arrived = booking(BookingStatus::Confirmed);
    check_in(&mut arrived).unwrap();
    assert_eq!(cancel(&mut arrived), Err(LifecycleError::AlreadyCheckedIn(42)));
}

#[test]
fn checkout_needs_checkin_and_invoice_needs_checkout() {
    let mut b = booking(BookingStatus::Confirmed);
    assert_eq!(check_out(&mut b), Err(LifecycleError::NotCheckedIn(42)));
    check_in(&mut b).unwrap();
    assert_eq!(check_in(&mut b), Err(LifecycleError::AlreadyCheckedIn(42)));
    assert_eq!(invoice(&mut b, "X".into()), Err(LifecycleError::NotCheckedOut(42)));
    assert!(b.invoice_no.is_none());
    check_out(&mut b).unwrap();
    assert_eq!(check_out(&mut b), Err(LifecycleError::AlreadyCheckedOut(42)));
}

#[test]
fn blocked_hold_can_check_in_directly() {
    let mut b = booking(BookingStatus::Blocked);
    check_in(&mut b).unwrap();
    assert!(b.checked_in);
    assert_eq!(b.booking_status, BookingStatus::Blocked);
    assert_eq!(
        confirm(&mut booking(BookingStatus::Confirmed)),
        Err(LifecycleError::AlreadyConfirmed(42))
    );
}
