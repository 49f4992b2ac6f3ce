// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomCategory {
    pub name: String,
    pub tariff: Decimal,
    pub gst: Decimal, // percent
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub room_no: String,
    pub category: Option<RoomCategory>,
    pub occupancy_count: i64,
}

impl Room {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

/// Snapshot of a room as it was when the booking was taken.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomRef {
    pub room_no: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Confirmed,
    Blocked,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Blocked => "Blocked",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "blocked" => Ok(BookingStatus::Blocked),
            "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
            other => Err(anyhow::anyhow!(
                "Unknown booking status '{}' (use confirmed|blocked|cancelled)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Room,
    Service,
    Food,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Room => "room",
            TokenKind::Service => "service",
            TokenKind::Food => "food",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "room" => Ok(TokenKind::Room),
            "service" => Ok(TokenKind::Service),
            "food" => Ok(TokenKind::Food),
            other => Err(anyhow::anyhow!(
                "Unknown token kind '{}' (use room|service|food)",
                other
            )),
        }
    }
}

/// A room, service or food charge on a bill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChargeToken {
    #[serde(default)]
    pub id: i64,
    pub kind: TokenKind,
    #[serde(default)]
    pub room_no: Option<String>,
    pub item: String,
    pub rate: Decimal,
    pub qty: Decimal,
    pub gst: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentToken {
    #[serde(default)]
    pub id: i64,
    pub date: NaiveDate,
    pub mode: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub guest_name: String,
    #[serde(default)]
    pub guest_phone: Option<String>,
    pub checkin_date: NaiveDate,
    pub checkout_date: NaiveDate,
    pub booking_status: BookingStatus,
    pub checked_in: bool,
    pub checked_out: bool,
    #[serde(default)]
    pub rooms: Vec<RoomRef>,
    #[serde(default)]
    pub room_tokens: Vec<ChargeToken>,
    #[serde(default)]
    pub service_tokens: Vec<ChargeToken>,
    #[serde(default)]
    pub food_tokens: Vec<ChargeToken>,
    #[serde(default)]
    pub payment_tokens: Vec<PaymentToken>,
    #[serde(default)]
    pub advance_payment: Decimal,
    #[serde(default)]
    pub invoice_no: Option<String>,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub remote_id: Option<i64>,
}

impl Booking {
    pub fn has_room(&self, room_no: &str) -> bool {
        self.rooms.iter().any(|r| r.room_no == room_no)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &ChargeToken> {
        self.room_tokens
            .iter()
            .chain(self.service_tokens.iter())
            .chain(self.food_tokens.iter())
    }

    pub fn tokens_mut(&mut self, kind: TokenKind) -> &mut Vec<ChargeToken> {
        match kind {
            TokenKind::Room => &mut self.room_tokens,
            TokenKind::Service => &mut self.service_tokens,
            TokenKind::Food => &mut self.food_tokens,
        }
    }

    pub fn nights(&self) -> i64 {
        (self.checkout_date - self.checkin_date).num_days()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestaurantOrder {
    pub id: i64,
    pub table_no: String,
    #[serde(default)]
    pub guest_name: Option<String>,
    pub opened_on: NaiveDate,
    #[serde(default)]
    pub food_tokens: Vec<ChargeToken>,
    #[serde(default)]
    pub invoice_no: Option<String>,
}
