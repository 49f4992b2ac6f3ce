// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::ArgMatches;
use frontdesk::billing::BillingError;
use frontdesk::commands::{bookings, payments, rooms, status, tokens};
use frontdesk::lifecycle::LifecycleError;
use frontdesk::models::BookingStatus;
use frontdesk::store::{self, StoreError};
use frontdesk::{cli, db};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    store::upsert_category(&conn, "Deluxe", dec("1000"), dec("12")).unwrap();
    store::upsert_room(&conn, "101", Some("Deluxe"), 2).unwrap();
    store::upsert_room(&conn, "102", Some("Deluxe"), 2).unwrap();
    store::upsert_room(&conn, "201", None, 3).unwrap();
    conn
}

/// Matches for the deepest subcommand in `args`.
fn leaf(args: &[&str]) -> ArgMatches {
    let mut m = cli::build_cli().get_matches_from(args);
    while let Some((_, sub)) = m.subcommand() {
        let next = sub.clone();
        m = next;
    }
    m
}

/// Matches one level below the binary, as `main` hands them to a command.
fn group(args: &[&str]) -> ArgMatches {
    let matches = cli::build_cli().get_matches_from(args);
    match matches.subcommand() {
        Some((_, sub)) => sub.clone(),
        None => panic!("no subcommand in {:?}", args),
    }
}

fn book(conn: &Connection, guest: &str, from: &str, to: &str, room: &str) -> anyhow::Result<i64> {
    bookings::add(
        conn,
        &leaf(&[
            "frontdesk", "booking", "add", "--guest", guest, "--from", from, "--to", to, "--room",
            room,
        ]),
    )
}

fn stay_through_checkout(conn: &Connection, id: i64) {
    let id = id.to_string();
    for step in ["checkin", "checkout"] {
        bookings::handle(conn, &group(&["frontdesk", "booking", step, "--id", &id])).unwrap();
    }
}

#[test]
fn new_booking_snapshots_rooms_and_prices_the_stay() {
    let conn = setup();
    let id = bookings::add(
        &conn,
        &leaf(&[
            "frontdesk", "booking", "add", "--guest", "Asha", "--from", "2024-01-10", "--to",
            "2024-01-12", "--room", "101", "--room", "201", "--advance", "500",
        ]),
    )
    .unwrap();

    let b = store::load_booking(&conn, id).unwrap();
    assert_eq!(b.booking_status, BookingStatus::Confirmed);
    assert_eq!(b.rooms.len(), 2);
    assert_eq!(b.rooms[0].category.as_deref(), Some("Deluxe"));
    assert_eq!(b.rooms[1].category, None);
    assert_eq!(b.advance_payment, dec("500"));
    // only the categorised room gets an automatic charge
    assert_eq!(b.room_tokens.len(), 1);
    let t = &b.room_tokens[0];
    assert_eq!(t.room_no.as_deref(), Some("101"));
    assert_eq!(t.rate, dec("2000"));
    assert_eq!(t.qty, dec("1"));
    assert_eq!(t.gst, dec("12"));
    assert_eq!(t.amount, dec("2240.00"));
}

#[test]
fn overlapping_booking_is_rejected_and_adjacent_accepted() {
    let conn = setup();
    book(&conn, "Asha", "2024-01-10", "2024-01-15", "101").unwrap();

    let err = book(&conn, "Bala", "2024-01-12", "2024-01-16", "101").unwrap_err();
    assert!(err.to_string().contains("not available"));
    book(&conn, "Bala", "2024-01-15", "2024-01-18", "101").unwrap();
    book(&conn, "Chen", "2024-01-12", "2024-01-16", "102").unwrap();
    assert!(book(&conn, "Dev", "2024-01-12", "2024-01-13", "999").is_err());
    assert!(book(&conn, "Eve", "2024-01-13", "2024-01-12", "102").is_err());
}

#[test]
fn cancelling_frees_the_room() {
    let conn = setup();
    let id = book(&conn, "Asha", "2024-01-10", "2024-01-15", "101").unwrap();
    bookings::handle(
        &conn,
        &group(&["frontdesk", "booking", "cancel", "--id", &id.to_string()]),
    )
    .unwrap();
    book(&conn, "Bala", "2024-01-11", "2024-01-12", "101").unwrap();

    let free = rooms::query_available(
        &conn,
        &leaf(&["frontdesk", "room", "available", "--from", "2024-01-12", "--to", "2024-01-14"]),
    )
    .unwrap();
    let nos: Vec<&str> = free.iter().map(|r| r.room_no.as_str()).collect();
    assert_eq!(nos, vec!["101", "102", "201"]);

    let deluxe_only = rooms::query_available(
        &conn,
        &leaf(&[
            "frontdesk", "room", "available", "--from", "2024-01-11", "--to", "2024-01-12",
            "--category", "Deluxe",
        ]),
    )
    .unwrap();
    assert_eq!(deluxe_only.len(), 1);
    assert_eq!(deluxe_only[0].room_no, "102");
}

#[test]
fn list_filters_by_date_guest_and_status() {
    let conn = setup();
    book(&conn, "Asha Rao", "2024-01-10", "2024-01-12", "101").unwrap();
    book(&conn, "Bala", "2024-01-12", "2024-01-14", "101").unwrap();
    let day_use = book(&conn, "asha k", "2024-01-12", "2024-01-12", "102").unwrap();
    bookings::handle(
        &conn,
        &group(&["frontdesk", "booking", "cancel", "--id", &day_use.to_string()]),
    )
    .unwrap();

    let by_date = leaf(&["frontdesk", "booking", "list", "--date", "2024-01-12"]);
    let on_12 = bookings::query_rows(&conn, &by_date).unwrap();
    let guests: Vec<&str> = on_12.iter().map(|b| b.guest_name.as_str()).collect();
    assert_eq!(guests, vec!["Bala", "asha k"]);

    let by_guest = leaf(&["frontdesk", "booking", "list", "--guest", "^asha"]);
    let ashas = bookings::query_rows(&conn, &by_guest).unwrap();
    assert_eq!(ashas.len(), 2);

    let cancelled = bookings::query_rows(
        &conn,
        &leaf(&["frontdesk", "booking", "list", "--status", "cancelled"]),
    )
    .unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].id, day_use);
}

#[test]
fn charges_follow_the_rate_amount_rule() {
    let conn = setup();
    let id = book(&conn, "Asha", "2024-01-10", "2024-01-11", "101").unwrap();
    let bid = id.to_string();

    let laundry = tokens::add(
        &conn,
        &leaf(&[
            "frontdesk", "token", "add", "--booking", &bid, "--kind", "service", "--item",
            "Laundry", "--rate", "1000", "--qty", "2", "--gst", "18",
        ]),
    )
    .unwrap();
    assert_eq!(laundry.amount, dec("2360.00"));

    let edited = tokens::edit(
        &conn,
        &leaf(&[
            "frontdesk", "token", "edit", "--id", &laundry.id.to_string(), "--field", "amount",
            "--value", "2000",
        ]),
    )
    .unwrap();
    assert_eq!(edited.rate, dec("847.46"));

    // room charge without --gst uses the category's
    let extra = tokens::add(
        &conn,
        &leaf(&[
            "frontdesk", "token", "add", "--booking", &bid, "--kind", "room", "--item", "Extra bed",
            "--rate", "500", "--room", "101",
        ]),
    )
    .unwrap();
    assert_eq!(extra.gst, dec("12"));
    assert_eq!(extra.amount, dec("560.00"));

    let wrong_room = tokens::add(
        &conn,
        &leaf(&[
            "frontdesk", "token", "add", "--booking", &bid, "--kind", "room", "--item", "X",
            "--rate", "1", "--room", "102",
        ]),
    );
    assert!(wrong_room.is_err());

    let b = store::load_booking(&conn, id).unwrap();
    assert_eq!(b.service_tokens.len(), 1);
    assert_eq!(b.service_tokens[0].amount, dec("2000"));
    assert_eq!(b.room_tokens.len(), 2);
}

#[test]
fn stale_writer_gets_a_conflict() {
    let conn = setup();
    let id = book(&conn, "Asha", "2024-01-10", "2024-01-11", "101").unwrap();
    let mut stale = store::load_booking(&conn, id).unwrap();

    payments::add(
        &conn,
        &leaf(&["frontdesk", "payment", "add", "--booking", &id.to_string(), "--amount", "100"]),
    )
    .unwrap();

    stale.guest_name = "Overwritten".into();
    let err = store::save_booking(&conn, &mut stale).unwrap_err();
    assert_eq!(
        err.downcast_ref::<StoreError>(),
        Some(&StoreError::Conflict {
            id,
            expected: stale.version
        })
    );
    assert_eq!(store::load_booking(&conn, id).unwrap().guest_name, "Asha");

    let mut fresh = store::load_booking(&conn, id).unwrap();
    fresh.guest_name = "Asha R".into();
    store::save_booking(&conn, &mut fresh).unwrap();
    assert_eq!(fresh.version, stale.version + 2);
}

#[test]
fn negative_advance_is_rejected_before_anything_is_stored() {
    let conn = setup();
    let err = bookings::add(
        &conn,
        &leaf(&[
            "frontdesk", "booking", "add", "--guest", "Asha", "--from", "2024-01-10", "--to",
            "2024-01-11", "--room", "101", "--advance=-500",
        ]),
    )
    .unwrap_err();
    assert_eq!(
        err.downcast_ref::<BillingError>(),
        Some(&BillingError::Negative {
            field: "advance",
            value: dec("-500")
        })
    );
    assert!(store::load_bookings(&conn).unwrap().is_empty());
}

#[test]
fn payments_must_be_positive_and_reduce_the_balance() {
    let conn = setup();
    let id = book(&conn, "Asha", "2024-01-10", "2024-01-11", "101").unwrap();
    let bid = id.to_string();

    let zero = payments::add(
        &conn,
        &leaf(&["frontdesk", "payment", "add", "--booking", &bid, "--amount", "0"]),
    )
    .unwrap_err();
    assert!(matches!(
        zero.downcast_ref::<BillingError>(),
        Some(BillingError::NotPositive { .. })
    ));

    let p = payments::add(
        &conn,
        &leaf(&[
            "frontdesk", "payment", "add", "--booking", &bid, "--amount", "240", "--mode", "UPI",
            "--date", "2024-01-10",
        ]),
    )
    .unwrap();
    assert_eq!(p.mode, "upi");

    let b = store::load_booking(&conn, id).unwrap();
    let bill = frontdesk::billing::Bill::for_booking(&b);
    assert_eq!(bill.total.payable, dec("1120"));
    assert_eq!(bill.balance_due, dec("880.00"));
}

#[test]
fn invoice_requires_checkout_and_freezes_billing() {
    let conn = setup();
    let id = book(&conn, "Asha", "2024-01-10", "2024-01-11", "101").unwrap();
    let bid = id.to_string();

    let early = bookings::handle(&conn, &group(&["frontdesk", "booking", "invoice", "--id", &bid]))
        .unwrap_err();
    assert_eq!(
        early.downcast_ref::<LifecycleError>(),
        Some(&LifecycleError::NotCheckedOut(id))
    );

    stay_through_checkout(&conn, id);
    bookings::handle(&conn, &group(&["frontdesk", "booking", "invoice", "--id", &bid])).unwrap();
    let b = store::load_booking(&conn, id).unwrap();
    let invoice_no = b.invoice_no.clone().unwrap();
    // the rejected attempt did not consume a number
    assert!(invoice_no.starts_with("INV-"));
    assert!(invoice_no.ends_with("-0001"));

    let charge = tokens::add(
        &conn,
        &leaf(&[
            "frontdesk", "token", "add", "--booking", &bid, "--kind", "food", "--item", "Tea",
            "--rate", "20",
        ]),
    )
    .unwrap_err();
    assert_eq!(
        charge.downcast_ref::<BillingError>(),
        Some(&BillingError::Frozen(invoice_no.clone()))
    );
    let token_id = b.room_tokens[0].id.to_string();
    assert!(
        tokens::edit(
            &conn,
            &leaf(&[
                "frontdesk", "token", "edit", "--id", &token_id, "--field", "qty", "--value", "2",
            ]),
        )
        .is_err()
    );
    assert!(
        payments::add(
            &conn,
            &leaf(&["frontdesk", "payment", "add", "--booking", &bid, "--amount", "10"]),
        )
        .is_err()
    );
}

#[test]
fn conflicting_invoice_write_does_not_consume_a_number() {
    let conn = setup();
    let id = book(&conn, "Asha", "2024-01-10", "2024-01-11", "101").unwrap();
    stay_through_checkout(&conn, id);
    let mut stale = store::load_booking(&conn, id).unwrap();
    payments::add(
        &conn,
        &leaf(&["frontdesk", "payment", "add", "--booking", &id.to_string(), "--amount", "100"]),
    )
    .unwrap();

    let err = bookings::issue_invoice(&conn, &mut stale).unwrap_err();
    assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::Conflict { .. })));
    assert!(store::load_booking(&conn, id).unwrap().invoice_no.is_none());

    let mut fresh = store::load_booking(&conn, id).unwrap();
    let invoice_no = bookings::issue_invoice(&conn, &mut fresh).unwrap();
    assert!(invoice_no.ends_with("-0001"));
    assert_eq!(store::load_booking(&conn, id).unwrap().invoice_no, Some(invoice_no));
}

#[test]
fn status_reflects_stored_bookings() {
    let conn = setup();
    let arrived = book(&conn, "Asha", "2024-01-10", "2024-01-12", "101").unwrap();
    bookings::handle(
        &conn,
        &group(&["frontdesk", "booking", "checkin", "--id", &arrived.to_string()]),
    )
    .unwrap();
    bookings::add(
        &conn,
        &leaf(&[
            "frontdesk", "booking", "add", "--guest", "Bala", "--from", "2024-01-11", "--to",
            "2024-01-11", "--room", "102", "--status", "blocked",
        ]),
    )
    .unwrap();

    let report = status::build(
        &conn,
        &group(&["frontdesk", "status", "--date", "2024-01-11", "--view", "grid"]),
    )
    .unwrap();
    assert_eq!(report.counts.total, 3);
    assert_eq!(report.counts.checked_in, 1);
    assert_eq!(report.counts.blocked, 1);
    assert_eq!(report.counts.available, 1);
    assert_eq!(report.counts.occupancy_rate, 33);
    assert_eq!(report.buckets.available["Uncategorized"][0].room_no, "201");
}
