// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::billing::{TokenEdit, ensure_not_frozen, new_token, parse_amount, recompute_token};
use crate::commands::bookings::{TOKEN_HEADERS, token_rows};
use crate::models::{ChargeToken, TokenKind};
use crate::store::{
    self, TokenOwner, load_booking, load_order, load_room, load_token, load_tokens,
};
use crate::utils::{arg, arg_id, fmt_money, maybe_print_json, opt_arg, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            add(conn, sub)?;
        }
        Some(("edit", sub)) => {
            edit(conn, sub)?;
        }
        Some(("rm", sub)) => remove(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Add a charge to a booking. Room charges without `--gst` take the room category's rate.
pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<ChargeToken> {
    let booking = load_booking(conn, arg_id(sub, "booking")?)?;
    ensure_not_frozen(booking.invoice_no.as_deref())?;

    let kind = arg(sub, "kind")?.parse::<TokenKind>()?;
    let item = arg(sub, "item")?;
    let rate = parse_amount(arg(sub, "rate")?)?;
    let qty = parse_amount(arg(sub, "qty")?)?;
    let room_no = opt_arg(sub, "room").map(str::to_string);
    if let Some(r) = &room_no {
        if !booking.has_room(r) {
            return Err(anyhow!("Room {} is not part of booking {}", r, booking.id));
        }
    }
    let gst = match (opt_arg(sub, "gst"), kind, &room_no) {
        (Some(raw), _, _) => parse_amount(raw)?,
        (None, TokenKind::Room, Some(r)) => load_room(conn, r)?
            .category
            .map(|c| c.gst)
            .unwrap_or(Decimal::ZERO),
        (None, _, _) => Decimal::ZERO,
    };

    let mut token = new_token(kind, room_no, item, rate, qty, gst)?;
    token.id = store::add_token(
        conn,
        TokenOwner::Booking(booking.id),
        Some(booking.version),
        &token,
    )?;
    tracing::info!(booking_id = booking.id, token_id = token.id, kind = %kind, "charge added");
    println!(
        "Added {} charge {} '{}' = {}",
        kind,
        token.id,
        token.item,
        fmt_money(&token.amount)
    );
    Ok(token)
}

fn frozen_check(conn: &Connection, owner: TokenOwner) -> Result<Option<i64>> {
    match owner {
        TokenOwner::Booking(id) => {
            let b = load_booking(conn, id)?;
            ensure_not_frozen(b.invoice_no.as_deref())?;
            Ok(Some(b.version))
        }
        TokenOwner::Order(id) => {
            let o = load_order(conn, id)?;
            ensure_not_frozen(o.invoice_no.as_deref())?;
            Ok(None)
        }
    }
}

/// Edit one field of a charge and recompute the dependent one.
pub fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<ChargeToken> {
    let (owner, token) = load_token(conn, arg_id(sub, "id")?)?;
    let version = frozen_check(conn, owner)?;
    let edit = TokenEdit::parse(arg(sub, "field")?, arg(sub, "value")?)?;
    let next = recompute_token(&token, edit)?;
    store::update_token(conn, owner, version, &next)?;
    tracing::info!(token_id = next.id, derived = ?edit.derives(), "charge edited");
    println!(
        "Charge {}: rate {} x {} + GST {}% = {}",
        next.id,
        fmt_money(&next.rate),
        next.qty,
        next.gst,
        fmt_money(&next.amount)
    );
    Ok(next)
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (owner, token) = load_token(conn, arg_id(sub, "id")?)?;
    let version = frozen_check(conn, owner)?;
    store::delete_token(conn, owner, version, token.id)?;
    tracing::info!(token_id = token.id, "charge removed");
    println!("Removed charge {} '{}'", token.id, token.item);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let tokens = load_tokens(conn, TokenOwner::Booking(arg_id(sub, "booking")?))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &tokens)? {
        let refs: Vec<&ChargeToken> = tokens.iter().collect();
        println!("{}", pretty_table(&TOKEN_HEADERS, token_rows(&refs)));
    }
    Ok(())
}
