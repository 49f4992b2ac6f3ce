// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::billing::{Bill, ensure_not_frozen, new_token, parse_amount};
use crate::commands::bill::render;
use crate::models::TokenKind;
use crate::store::{self, TokenOwner, close_order, insert_order, load_order, next_invoice_no};
use crate::utils::{arg, arg_id, fmt_money, maybe_print_json, opt_arg, parse_date, today};
use anyhow::Result;
use chrono::Datelike;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("open", sub)) => {
            open(conn, sub)?;
        }
        Some(("add", sub)) => add_item(conn, sub)?,
        Some(("bill", sub)) => {
            let order = load_order(conn, arg_id(sub, "order")?)?;
            let bill = Bill::for_order(&order);
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &bill)? {
                println!("Table {} (order {})", order.table_no, order.id);
                println!("{}", render(&bill));
            }
        }
        Some(("close", sub)) => close(conn, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn open(conn: &Connection, sub: &clap::ArgMatches) -> Result<i64> {
    let table = arg(sub, "table")?;
    let date = match opt_arg(sub, "date") {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };
    let id = insert_order(conn, table, opt_arg(sub, "guest"), date)?;
    tracing::info!(order_id = id, table, "restaurant order opened");
    println!("Opened order {} for table {}", id, table);
    Ok(id)
}

fn add_item(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let order = load_order(conn, arg_id(sub, "order")?)?;
    ensure_not_frozen(order.invoice_no.as_deref())?;
    let token = new_token(
        TokenKind::Food,
        None,
        arg(sub, "item")?,
        parse_amount(arg(sub, "rate")?)?,
        parse_amount(arg(sub, "qty")?)?,
        parse_amount(arg(sub, "gst")?)?,
    )?;
    let id = store::add_token(conn, TokenOwner::Order(order.id), None, &token)?;
    println!(
        "Added {} x {} to order {} (charge {}) = {}",
        token.qty,
        token.item,
        order.id,
        id,
        fmt_money(&token.amount)
    );
    Ok(())
}

fn close(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let order = load_order(conn, arg_id(sub, "order")?)?;
    ensure_not_frozen(order.invoice_no.as_deref())?;
    let tx = conn.unchecked_transaction()?;
    let invoice_no = next_invoice_no(&tx, today().year())?;
    close_order(&tx, order.id, &invoice_no)?;
    tx.commit()?;
    let bill = Bill::for_order(&order);
    tracing::info!(order_id = order.id, invoice = %invoice_no, "restaurant order closed");
    println!(
        "Invoice {} for table {}: payable {}",
        invoice_no,
        order.table_no,
        fmt_money(&bill.total.payable)
    );
    Ok(())
}
