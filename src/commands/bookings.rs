// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::availability::{StayRange, is_room_available};
use crate::billing::{Bill, new_token, non_negative, parse_amount, round2};
use crate::lifecycle::{self, LifecycleError};
use crate::models::{Booking, BookingStatus, ChargeToken, RoomRef, TokenKind};
use crate::occupancy::UNCATEGORIZED;
use crate::store::{
    insert_booking, load_booking, load_bookings, load_room, next_invoice_no, save_booking,
};
use crate::utils::{
    arg, arg_id, fmt_money, guest_matcher, maybe_print_json, opt_arg, parse_date, pretty_table,
    today,
};
use anyhow::{Result, anyhow};
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            add(conn, sub)?;
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("cancel", sub)) => transition(conn, sub, "cancelled", lifecycle::cancel)?,
        Some(("confirm", sub)) => transition(conn, sub, "confirmed", lifecycle::confirm)?,
        Some(("checkin", sub)) => transition(conn, sub, "checked in", lifecycle::check_in)?,
        Some(("checkout", sub)) => transition(conn, sub, "checked out", lifecycle::check_out)?,
        Some(("invoice", sub)) => invoice(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Create a booking after re-checking every requested room. Returns the new id.
pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<i64> {
    let guest = arg(sub, "guest")?;
    let range = StayRange::new(parse_date(arg(sub, "from")?)?, parse_date(arg(sub, "to")?)?)?;
    let status = arg(sub, "status")?.parse::<BookingStatus>()?;
    if status == BookingStatus::Cancelled {
        return Err(anyhow!("A new booking cannot start out cancelled"));
    }
    let advance = non_negative("advance", parse_amount(arg(sub, "advance")?)?)?;
    let room_nos: Vec<&str> = sub
        .get_many::<String>("room")
        .map(|v| v.map(|s| s.trim()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    if room_nos.is_empty() {
        return Err(anyhow!("At least one --room is required"));
    }

    let existing = load_bookings(conn)?;
    let mut rooms = Vec::new();
    let mut room_tokens = Vec::new();
    let nights = (range.checkout - range.checkin).num_days().max(1);
    for room_no in room_nos {
        let room = load_room(conn, room_no)?;
        let holding = existing.iter().filter(|b| b.has_room(room_no));
        if !is_room_available(holding, &range, None) {
            tracing::warn!(
                room = room_no,
                from = %range.checkin,
                to = %range.checkout,
                "room unavailable"
            );
            return Err(anyhow!(
                "Room {} is not available from {} to {}",
                room_no,
                range.checkin,
                range.checkout
            ));
        }
        if let Some(cat) = &room.category {
            let label = if nights == 1 { "night" } else { "nights" };
            room_tokens.push(new_token(
                TokenKind::Room,
                Some(room.room_no.clone()),
                &format!("Room {} ({}) x {} {}", room.room_no, cat.name, nights, label),
                round2(cat.tariff * Decimal::from(nights)),
                Decimal::ONE,
                cat.gst,
            )?);
        }
        rooms.push(RoomRef {
            room_no: room.room_no.clone(),
            category: room.category_name().map(str::to_string),
        });
    }

    let booking = Booking {
        id: 0,
        guest_name: guest.to_string(),
        guest_phone: opt_arg(sub, "phone").map(str::to_string),
        checkin_date: range.checkin,
        checkout_date: range.checkout,
        booking_status: status,
        checked_in: false,
        checked_out: false,
        rooms,
        room_tokens,
        service_tokens: Vec::new(),
        food_tokens: Vec::new(),
        payment_tokens: Vec::new(),
        advance_payment: advance,
        invoice_no: None,
        version: 0,
        remote_id: None,
    };
    let id = insert_booking(conn, &booking)?;
    println!(
        "Booking {} for {}: {} to {} ({})",
        id,
        booking.guest_name,
        booking.checkin_date,
        booking.checkout_date,
        booking.booking_status
    );
    Ok(id)
}

fn stays_on(b: &Booking, date: NaiveDate) -> bool {
    (b.checkin_date <= date && date < b.checkout_date)
        || (b.checkin_date == b.checkout_date && b.checkin_date == date)
}

/// Bookings matching the `list` filters, ordered by check-in date.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Booking>> {
    let date = opt_arg(sub, "date").map(parse_date).transpose()?;
    let guest = opt_arg(sub, "guest").map(guest_matcher).transpose()?;
    let status = opt_arg(sub, "status")
        .map(str::parse::<BookingStatus>)
        .transpose()?;

    let rows = load_bookings(conn)?
        .into_iter()
        .filter(|b| date.is_none_or(|d| stays_on(b, d)))
        .filter(|b| guest.as_ref().is_none_or(|re| re.is_match(&b.guest_name)))
        .filter(|b| status.is_none_or(|s| b.booking_status == s))
        .collect();
    Ok(rows)
}

fn stage(b: &Booking) -> &'static str {
    match (b.checked_in, b.checked_out) {
        (_, true) => "checked out",
        (true, false) => "in house",
        (false, false) => "due",
    }
}

fn room_list(b: &Booking) -> String {
    b.rooms
        .iter()
        .map(|r| r.room_no.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|b| {
                vec![
                    b.id.to_string(),
                    b.guest_name.clone(),
                    b.checkin_date.to_string(),
                    b.checkout_date.to_string(),
                    room_list(b),
                    b.booking_status.to_string(),
                    stage(b).to_string(),
                    b.invoice_no.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Guest", "Check-in", "Check-out", "Rooms", "Status", "Stage", "Invoice"],
                rows,
            )
        );
    }
    Ok(())
}

pub(crate) fn token_rows(tokens: &[&ChargeToken]) -> Vec<Vec<String>> {
    tokens
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.kind.to_string(),
                t.room_no.clone().unwrap_or_default(),
                t.item.clone(),
                fmt_money(&t.rate),
                t.qty.to_string(),
                format!("{}%", t.gst),
                fmt_money(&t.amount),
            ]
        })
        .collect()
}

pub(crate) const TOKEN_HEADERS: [&str; 8] =
    ["ID", "Kind", "Room", "Item", "Rate", "Qty", "GST", "Amount"];

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let b = load_booking(conn, arg_id(sub, "id")?)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &b)? {
        return Ok(());
    }
    let rooms = b
        .rooms
        .iter()
        .map(|r| {
            format!(
                "{} ({})",
                r.room_no,
                r.category.as_deref().unwrap_or(UNCATEGORIZED)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    let details = vec![
        vec!["Guest".to_string(), b.guest_name.clone()],
        vec!["Phone".to_string(), b.guest_phone.clone().unwrap_or_default()],
        vec![
            "Stay".to_string(),
            format!("{} to {} ({} nights)", b.checkin_date, b.checkout_date, b.nights()),
        ],
        vec!["Rooms".to_string(), rooms],
        vec!["Status".to_string(), format!("{} / {}", b.booking_status, stage(&b))],
        vec!["Invoice".to_string(), b.invoice_no.clone().unwrap_or_default()],
    ];
    let id_label = b.id.to_string();
    println!("{}", pretty_table(&["Booking", id_label.as_str()], details));

    let tokens: Vec<&ChargeToken> = b.tokens().collect();
    if !tokens.is_empty() {
        println!("{}", pretty_table(&TOKEN_HEADERS, token_rows(&tokens)));
    }
    let bill = Bill::for_booking(&b);
    println!(
        "Payable {}  Advance {}  Paid {}  Balance {}",
        fmt_money(&bill.total.payable),
        fmt_money(&bill.advance),
        fmt_money(&bill.paid),
        fmt_money(&bill.balance_due)
    );
    Ok(())
}

fn transition(
    conn: &Connection,
    sub: &clap::ArgMatches,
    verb: &str,
    step: fn(&mut Booking) -> Result<(), LifecycleError>,
) -> Result<()> {
    let id = arg_id(sub, "id")?;
    let mut b = load_booking(conn, id)?;
    if let Err(err) = step(&mut b) {
        tracing::warn!(booking_id = id, error = %err, "transition rejected");
        return Err(err.into());
    }
    save_booking(conn, &mut b)?;
    tracing::info!(booking_id = id, "booking {}", verb);
    println!("Booking {} {}", id, verb);
    Ok(())
}

/// Draw the next invoice number and stamp it on `b`. The number is only
/// consumed when the booking write succeeds.
pub fn issue_invoice(conn: &Connection, b: &mut Booking) -> Result<String> {
    lifecycle::ensure_invoiceable(b)?;
    let tx = conn.unchecked_transaction()?;
    let invoice_no = next_invoice_no(&tx, today().year())?;
    lifecycle::invoice(b, invoice_no.clone())?;
    save_booking(&tx, b)?;
    tx.commit()?;
    Ok(invoice_no)
}

fn invoice(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg_id(sub, "id")?;
    let mut b = load_booking(conn, id)?;
    let invoice_no = issue_invoice(conn, &mut b)?;
    let bill = Bill::for_booking(&b);
    tracing::info!(booking_id = id, invoice = %invoice_no, "invoice generated");
    println!(
        "Invoice {} for booking {}: payable {}, balance {}",
        invoice_no,
        id,
        fmt_money(&bill.total.payable),
        fmt_money(&bill.balance_due)
    );
    Ok(())
}
