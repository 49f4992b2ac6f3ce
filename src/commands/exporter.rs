// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::billing::Bill;
use crate::store::load_bookings;
use crate::utils::{arg, fmt_money};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("bookings", sub)) => export_bookings(conn, sub),
        _ => Ok(()),
    }
}

#[derive(Debug, Serialize)]
struct BookingExport {
    id: i64,
    guest: String,
    phone: String,
    checkin: String,
    checkout: String,
    rooms: String,
    status: String,
    checked_in: bool,
    checked_out: bool,
    payable: String,
    paid: String,
    balance: String,
    invoice: String,
}

fn export_bookings(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = arg(sub, "format")?.to_lowercase();
    let out = arg(sub, "out")?;
    if fmt != "csv" && fmt != "json" {
        return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
    }

    let rows: Vec<BookingExport> = load_bookings(conn)?
        .iter()
        .map(|b| {
            let bill = Bill::for_booking(b);
            BookingExport {
                id: b.id,
                guest: b.guest_name.clone(),
                phone: b.guest_phone.clone().unwrap_or_default(),
                checkin: b.checkin_date.to_string(),
                checkout: b.checkout_date.to_string(),
                rooms: b
                    .rooms
                    .iter()
                    .map(|r| r.room_no.as_str())
                    .collect::<Vec<_>>()
                    .join(";"),
                status: b.booking_status.to_string(),
                checked_in: b.checked_in,
                checked_out: b.checked_out,
                payable: fmt_money(&bill.total.payable),
                paid: fmt_money(&(bill.advance + bill.paid)),
                balance: fmt_money(&bill.balance_due),
                invoice: b.invoice_no.clone().unwrap_or_default(),
            }
        })
        .collect();

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        for row in &rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
    } else {
        std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
    }
    tracing::info!(bookings = rows.len(), out, format = %fmt, "bookings exported");
    println!("Exported {} bookings to {}", rows.len(), out);
    Ok(())
}
