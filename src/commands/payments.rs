// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::billing::{BillingError, ensure_not_frozen, parse_amount};
use crate::models::PaymentToken;
use crate::store::{self, load_booking, load_payments};
use crate::utils::{
    arg, arg_id, fmt_money, maybe_print_json, opt_arg, parse_date, pretty_table, today,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            add(conn, sub)?;
        }
        Some(("list", sub)) => {
            let payments = load_payments(conn, arg_id(sub, "booking")?)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &payments)? {
                let rows = payments
                    .iter()
                    .map(|p| {
                        vec![
                            p.id.to_string(),
                            p.date.to_string(),
                            p.mode.clone(),
                            fmt_money(&p.amount),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["ID", "Date", "Mode", "Amount"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<PaymentToken> {
    let booking = load_booking(conn, arg_id(sub, "booking")?)?;
    ensure_not_frozen(booking.invoice_no.as_deref())?;
    let amount = parse_amount(arg(sub, "amount")?)?;
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(BillingError::NotPositive {
            field: "payment amount",
            value: amount,
        }
        .into());
    }
    let date = match opt_arg(sub, "date") {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };
    let mut payment = PaymentToken {
        id: 0,
        date,
        mode: arg(sub, "mode")?.to_lowercase(),
        amount,
    };
    payment.id = store::add_payment(conn, booking.id, booking.version, &payment)?;
    tracing::info!(booking_id = booking.id, payment_id = payment.id, "payment recorded");
    println!(
        "Recorded {} payment of {} on {} for booking {}",
        payment.mode,
        fmt_money(&payment.amount),
        payment.date,
        booking.id
    );
    Ok(payment)
}
