// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::billing::{Bill, Totals};
use crate::store::load_booking;
use crate::utils::{arg_id, fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let booking = load_booking(conn, arg_id(sub, "booking")?)?;
    let bill = Bill::for_booking(&booking);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &bill)? {
        return Ok(());
    }
    println!("{}", render(&bill));
    Ok(())
}

fn totals_row(label: &str, t: &Totals) -> Vec<String> {
    vec![
        label.to_string(),
        fmt_money(&t.subtotal),
        fmt_money(&t.sgst()),
        fmt_money(&t.cgst()),
        fmt_money(&t.payable),
    ]
}

pub fn render(bill: &Bill) -> comfy_table::Table {
    let mut rows = vec![
        totals_row("Room", &bill.room),
        totals_row("Service", &bill.service),
        totals_row("Food", &bill.food),
        totals_row("Total", &bill.total),
    ];
    for (label, v) in [
        ("Advance", &bill.advance),
        ("Payments", &bill.paid),
        ("Balance due", &bill.balance_due),
    ] {
        let mut row = vec![label.to_string(), String::new(), String::new(), String::new()];
        row.push(fmt_money(v));
        rows.push(row);
    }
    pretty_table(&["Charges", "Subtotal", "SGST", "CGST", "Payable"], rows)
}
