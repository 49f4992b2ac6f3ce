// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Charge tokens and bill totals.
//!
//! Every token keeps `amount = round2(rate * qty * (1 + gst/100))`. Editing
//! `rate`, `qty` or `gst` recomputes `amount`; editing `amount` back-solves
//! `rate` with `qty` and `gst` held. GST is always split evenly into SGST and
//! CGST (intrastate supply).

use crate::models::{Booking, ChargeToken, RestaurantOrder, TokenKind};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::iter::Sum;
use std::ops::Add;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BillingError {
    #[error("{field} cannot be negative (got {value})")]
    Negative { field: &'static str, value: Decimal },
    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: Decimal },
    #[error("cannot back-solve a rate from an amount when qty is zero")]
    ZeroQuantity,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("unknown token field '{0}' (use rate|qty|gst|amount)")]
    UnknownField(String),
    #[error("billing is frozen: invoice {0} has already been generated")]
    Frozen(String),
}

/// The field a staff member edited, carrying its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenEdit {
    Rate(Decimal),
    Qty(Decimal),
    Gst(Decimal),
    Amount(Decimal),
}

/// What an edit forces to be recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derived {
    Amount,
    Rate,
}

impl TokenEdit {
    pub fn parse(field: &str, raw: &str) -> Result<Self, BillingError> {
        let value = parse_amount(raw)?;
        match field.trim().to_ascii_lowercase().as_str() {
            "rate" => Ok(TokenEdit::Rate(value)),
            "qty" | "quantity" => Ok(TokenEdit::Qty(value)),
            "gst" => Ok(TokenEdit::Gst(value)),
            "amount" => Ok(TokenEdit::Amount(value)),
            other => Err(BillingError::UnknownField(other.to_string())),
        }
    }

    pub fn derives(&self) -> Derived {
        match self {
            TokenEdit::Rate(_) | TokenEdit::Qty(_) | TokenEdit::Gst(_) => Derived::Amount,
            TokenEdit::Amount(_) => Derived::Rate,
        }
    }

    fn checked(self) -> Result<Self, BillingError> {
        let (field, value) = match self {
            TokenEdit::Rate(v) => ("rate", v),
            TokenEdit::Qty(v) => ("qty", v),
            TokenEdit::Gst(v) => ("gst", v),
            TokenEdit::Amount(v) => ("amount", v),
        };
        non_negative(field, value)?;
        Ok(self)
    }
}

pub fn parse_amount(raw: &str) -> Result<Decimal, BillingError> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| BillingError::NotANumber(raw.to_string()))
}

pub fn non_negative(field: &'static str, value: Decimal) -> Result<Decimal, BillingError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(BillingError::Negative { field, value });
    }
    Ok(value)
}

pub fn round2(x: Decimal) -> Decimal {
    x.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn gst_factor(gst: Decimal) -> Decimal {
    Decimal::ONE + gst / Decimal::ONE_HUNDRED
}

/// Forward direction of the token invariant.
pub fn line_amount(rate: Decimal, qty: Decimal, gst: Decimal) -> Decimal {
    round2(qty * rate * gst_factor(gst))
}

/// Reverse direction of the token invariant.
pub fn back_solve_rate(
    amount: Decimal,
    qty: Decimal,
    gst: Decimal,
) -> Result<Decimal, BillingError> {
    if qty.is_zero() {
        return Err(BillingError::ZeroQuantity);
    }
    Ok(round2(amount / qty / gst_factor(gst)))
}

pub fn new_token(
    kind: TokenKind,
    room_no: Option<String>,
    item: &str,
    rate: Decimal,
    qty: Decimal,
    gst: Decimal,
) -> Result<ChargeToken, BillingError> {
    let rate = round2(non_negative("rate", rate)?);
    let qty = non_negative("qty", qty)?;
    let gst = non_negative("gst", gst)?;
    Ok(ChargeToken {
        id: 0,
        kind,
        room_no,
        item: item.to_string(),
        rate,
        qty,
        gst,
        amount: line_amount(rate, qty, gst),
    })
}

/// Apply one edit to a token and restore the rate/amount invariant.
pub fn recompute_token(token: &ChargeToken, edit: TokenEdit) -> Result<ChargeToken, BillingError> {
    let edit = edit.checked()?;
    let mut next = token.clone();
    match edit {
        TokenEdit::Rate(v) => next.rate = v,
        TokenEdit::Qty(v) => next.qty = v,
        TokenEdit::Gst(v) => next.gst = v,
        TokenEdit::Amount(v) => next.amount = v,
    }
    match edit.derives() {
        Derived::Amount => {
            next.rate = round2(next.rate);
            next.amount = line_amount(next.rate, next.qty, next.gst);
        }
        Derived::Rate => {
            next.rate = back_solve_rate(next.amount, next.qty, next.gst)?;
            next.amount = round2(next.amount);
        }
    }
    Ok(next)
}

pub fn ensure_not_frozen(invoice_no: Option<&str>) -> Result<(), BillingError> {
    match invoice_no {
        Some(no) => Err(BillingError::Frozen(no.to_string())),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub payable: Decimal,
}

impl Totals {
    pub fn sgst(&self) -> Decimal {
        self.tax / Decimal::TWO
    }

    pub fn cgst(&self) -> Decimal {
        self.tax / Decimal::TWO
    }
}

impl Add for Totals {
    type Output = Totals;

    fn add(self, rhs: Totals) -> Totals {
        Totals {
            subtotal: self.subtotal + rhs.subtotal,
            tax: self.tax + rhs.tax,
            payable: self.payable + rhs.payable,
        }
    }
}

impl Sum for Totals {
    fn sum<I: Iterator<Item = Totals>>(iter: I) -> Totals {
        iter.fold(Totals::default(), Add::add)
    }
}

pub fn aggregate<'a, I>(tokens: I) -> Totals
where
    I: IntoIterator<Item = &'a ChargeToken>,
{
    tokens
        .into_iter()
        .map(|t| {
            let base = t.rate * t.qty;
            let tax = base * t.gst / Decimal::ONE_HUNDRED;
            Totals {
                subtotal: base,
                tax,
                payable: base + tax,
            }
        })
        .sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bill {
    pub room: Totals,
    pub service: Totals,
    pub food: Totals,
    pub total: Totals,
    pub advance: Decimal,
    pub paid: Decimal,
    pub balance_due: Decimal,
}

impl Bill {
    pub fn for_booking(b: &Booking) -> Self {
        let room = aggregate(&b.room_tokens);
        let service = aggregate(&b.service_tokens);
        let food = aggregate(&b.food_tokens);
        let total = room + service + food;
        let paid: Decimal = b.payment_tokens.iter().map(|p| p.amount).sum();
        Bill {
            room,
            service,
            food,
            total,
            advance: b.advance_payment,
            paid,
            balance_due: round2(total.payable - b.advance_payment - paid),
        }
    }

    pub fn for_order(o: &RestaurantOrder) -> Self {
        let food = aggregate(&o.food_tokens);
        Bill {
            room: Totals::default(),
            service: Totals::default(),
            food,
            total: food,
            advance: Decimal::ZERO,
            paid: Decimal::ZERO,
            balance_due: round2(food.payable),
        }
    }
}
