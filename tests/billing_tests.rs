// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use frontdesk::billing::{
    Bill, BillingError, Derived, TokenEdit, aggregate, back_solve_rate, ensure_not_frozen,
    line_amount, new_token, recompute_token, round2,
};
use frontdesk::models::{Booking, BookingStatus, PaymentToken, RestaurantOrder, TokenKind};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn empty_booking() -> Booking {
    let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    Booking {
        id: 1,
        guest_name: "A. Guest".into(),
        guest_phone: None,
        checkin_date: day,
        checkout_date: day,
        booking_status: BookingStatus::Confirmed,
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
fn amount_follows_rate_qty_and_gst() {
    let room = Some("101".into());
    let t = new_token(TokenKind::Room, room, "Room 101", dec("1000"), dec("2"), dec("18")).unwrap();
    assert_eq!(t.amount, dec("2360.00"));
}

#[test]
fn editing_amount_back_solves_rate() {
    let t = new_token(TokenKind::Room, None, "Room", dec("1000"), dec("2"), dec("18")).unwrap();
    let edited = recompute_token(&t, TokenEdit::Amount(dec("2000"))).unwrap();
    assert_eq!(edited.rate, dec("847.46"));
    assert_eq!(edited.qty, dec("2"));
    assert_eq!(edited.gst, dec("18"));
    assert_eq!(edited.amount, dec("2000"));

    // re-deriving the amount lands within a cent of the typed value
    let forward = line_amount(edited.rate, edited.qty, edited.gst);
    assert!((forward - dec("2000")).abs() <= dec("0.01"));
}

#[test]
fn editing_rate_qty_or_gst_recomputes_amount() {
    let t =
        new_token(TokenKind::Service, None, "Laundry", dec("100"), dec("1"), dec("18")).unwrap();
    assert_eq!(recompute_token(&t, TokenEdit::Qty(dec("3"))).unwrap().amount, dec("354.00"));
    assert_eq!(recompute_token(&t, TokenEdit::Gst(dec("5"))).unwrap().amount, dec("105.00"));
    assert_eq!(recompute_token(&t, TokenEdit::Rate(dec("99.999"))).unwrap().rate, dec("100.00"));
}

#[test]
fn edit_parsing_names_the_derived_field() {
    assert_eq!(TokenEdit::parse("amount", " 2000 ").unwrap(), TokenEdit::Amount(dec("2000")));
    assert_eq!(TokenEdit::parse("Quantity", "2").unwrap().derives(), Derived::Amount);
    assert_eq!(TokenEdit::parse("amount", "1").unwrap().derives(), Derived::Rate);
    assert!(matches!(TokenEdit::parse("price", "1"), Err(BillingError::UnknownField(_))));
    assert!(matches!(TokenEdit::parse("rate", "abc"), Err(BillingError::NotANumber(_))));
    assert!(matches!(TokenEdit::parse("rate", "NaN"), Err(BillingError::NotANumber(_))));
}

#[test]
fn rejects_negative_values_and_zero_qty_reverse_solve() {
    assert!(matches!(
        new_token(TokenKind::Food, None, "Tea", dec("-1"), dec("1"), dec("5")),
        Err(BillingError::Negative { field: "rate", .. })
    ));
    let t = new_token(TokenKind::Food, None, "Tea", dec("20"), dec("0"), dec("5")).unwrap();
    assert_eq!(t.amount, dec("0"));
    assert_eq!(
        recompute_token(&t, TokenEdit::Amount(dec("50"))),
        Err(BillingError::ZeroQuantity)
    );
    assert!(matches!(
        recompute_token(&t, TokenEdit::Gst(dec("-5"))),
        Err(BillingError::Negative { field: "gst", .. })
    ));
    assert_eq!(
        back_solve_rate(dec("10"), Decimal::ZERO, dec("5")),
        Err(BillingError::ZeroQuantity)
    );
}

#[test]
fn round2_is_half_away_from_zero() {
    assert_eq!(round2(dec("2.345")), dec("2.35"));
    assert_eq!(round2(dec("-2.345")), dec("-2.35"));
    assert_eq!(round2(dec("2.344")), dec("2.34"));
}

#[test]
fn totals_split_gst_evenly() {
    let tokens = vec![
        new_token(TokenKind::Room, None, "Room", dec("1000"), dec("2"), dec("12")).unwrap(),
        new_token(TokenKind::Room, None, "Extra bed", dec("333.33"), dec("1"), dec("12")).unwrap(),
    ];
    let totals = aggregate(&tokens);
    assert_eq!(totals.subtotal, dec("2333.33"));
    assert_eq!(totals.payable, totals.subtotal + totals.tax);
    assert_eq!(totals.sgst() + totals.cgst(), totals.tax);
    assert_eq!(totals.sgst(), totals.cgst());
}

#[test]
fn bill_balance_subtracts_advance_and_payments() {
    let mut b = empty_booking();
    b.room_tokens
        .push(new_token(TokenKind::Room, None, "Room", dec("1000"), dec("2"), dec("18")).unwrap());
    b.service_tokens.push(
        new_token(TokenKind::Service, None, "Laundry", dec("100"), dec("1"), dec("18")).unwrap(),
    );
    b.food_tokens
        .push(new_token(TokenKind::Food, None, "Dinner", dec("400"), dec("1"), dec("5")).unwrap());
    b.advance_payment = dec("500");
    b.payment_tokens.push(PaymentToken {
        id: 1,
        date: b.checkin_date,
        mode: "upi".into(),
        amount: dec("1000"),
    });

    let bill = Bill::for_booking(&b);
    assert_eq!(bill.room.payable, dec("2360"));
    assert_eq!(bill.service.payable, dec("118"));
    assert_eq!(bill.food.payable, dec("420"));
    assert_eq!(bill.total.payable, dec("2898"));
    assert_eq!(bill.paid, dec("1000"));
    assert_eq!(bill.balance_due, dec("1398.00"));
}

#[test]
fn overpaid_bill_goes_negative() {
    let mut b = empty_booking();
    b.advance_payment = dec("100");
    assert_eq!(Bill::for_booking(&b).balance_due, dec("-100"));
}

#[test]
fn restaurant_bill_has_food_only() {
    let order = RestaurantOrder {
        id: 3,
        table_no: "T4".into(),
        guest_name: None,
        opened_on: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        food_tokens: vec![
            new_token(TokenKind::Food, None, "Dosa", dec("80"), dec("2"), dec("5")).unwrap(),
        ],
        invoice_no: None,
    };
    let bill = Bill::for_order(&order);
    assert_eq!(bill.room.payable, Decimal::ZERO);
    assert_eq!(bill.balance_due, dec("168.00"));
}

#[test]
fn invoiced_billing_is_frozen() {
    assert!(ensure_not_frozen(None).is_ok());
    assert_eq!(
        ensure_not_frozen(Some("INV-2024-0001")),
        Err(BillingError::Frozen("INV-2024-0001".into()))
    );
}

proptest! {
    #[test]
    fn reverse_then_forward_stays_within_a_cent(
        cents in 1i64..10_000_000,
        qty in 1i64..20,
        gst in prop::sample::select(vec![0i64, 5, 12, 18, 28]),
    ) {
        let amount = Decimal::new(cents, 2);
        let (qty, gst) = (Decimal::from(qty), Decimal::from(gst));
        let rate = back_solve_rate(amount, qty, gst).unwrap();
        let forward = line_amount(rate, qty, gst);
        // half a cent of rate error per unit, scaled by qty and gst
        let tolerance = Decimal::new(5, 3) * qty * (Decimal::ONE + gst / Decimal::ONE_HUNDRED)
            + Decimal::new(1, 2);
        prop_assert!((forward - amount).abs() <= tolerance);
    }

    #[test]
    fn aggregate_is_additive(
        a in 0i64..1_000_000,
        b in 0i64..1_000_000,
        qty in 1i64..10,
    ) {
        let qty = Decimal::from(qty);
        let t1 = new_token(TokenKind::Food, None, "a", Decimal::new(a, 2), qty, dec("5")).unwrap();
        let t2 = new_token(TokenKind::Food, None, "b", Decimal::new(b, 2), qty, dec("5")).unwrap();
        let both = aggregate([&t1, &t2]);
        prop_assert_eq!(both, aggregate([&t1]) + aggregate([&t2]));
        prop_assert_eq!(both.sgst() + both.cgst(), both.tax);
    }
}
