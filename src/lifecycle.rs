// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Booking, BookingStatus};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("booking {0} is cancelled")]
    Cancelled(i64),
    #[error("booking {0} is already checked in")]
    AlreadyCheckedIn(i64),
    #[error("booking {0} is not checked in yet")]
    NotCheckedIn(i64),
    #[error("booking {0} is already checked out")]
    AlreadyCheckedOut(i64),
    #[error("booking {0} is already confirmed")]
    AlreadyConfirmed(i64),
    #[error("booking {0} must be checked out before invoicing")]
    NotCheckedOut(i64),
    #[error("booking {id} already has invoice {invoice_no}")]
    AlreadyInvoiced { id: i64, invoice_no: String },
}

/// `Confirmed/Blocked -> Cancelled`, only before check-in. Terminal.
pub fn cancel(b: &mut Booking) -> Result<(), LifecycleError> {
    if b.booking_status == BookingStatus::Cancelled {
        return Err(LifecycleError::Cancelled(b.id));
    }
    if b.checked_in {
        return Err(LifecycleError::AlreadyCheckedIn(b.id));
    }
    b.booking_status = BookingStatus::Cancelled;
    Ok(())
}

/// Turn a blocked (tentative) hold into a confirmed booking.
pub fn confirm(b: &mut Booking) -> Result<(), LifecycleError> {
    match b.booking_status {
        BookingStatus::Cancelled => Err(LifecycleError::Cancelled(b.id)),
        BookingStatus::Confirmed => Err(LifecycleError::AlreadyConfirmed(b.id)),
        BookingStatus::Blocked => {
            b.booking_status = BookingStatus::Confirmed;
            Ok(())
        }
    }
}

pub fn check_in(b: &mut Booking) -> Result<(), LifecycleError> {
    if b.booking_status == BookingStatus::Cancelled {
        return Err(LifecycleError::Cancelled(b.id));
    }
    if b.checked_in {
        return Err(LifecycleError::AlreadyCheckedIn(b.id));
    }
    b.checked_in = true;
    Ok(())
}

pub fn check_out(b: &mut Booking) -> Result<(), LifecycleError> {
    if !b.checked_in {
        return Err(LifecycleError::NotCheckedIn(b.id));
    }
    if b.checked_out {
        return Err(LifecycleError::AlreadyCheckedOut(b.id));
    }
    b.checked_out = true;
    Ok(())
}

pub fn ensure_invoiceable(b: &Booking) -> Result<(), LifecycleError> {
    if let Some(existing) = &b.invoice_no {
        return Err(LifecycleError::AlreadyInvoiced {
            id: b.id,
            invoice_no: existing.clone(),
        });
    }
    if !b.checked_out {
        return Err(LifecycleError::NotCheckedOut(b.id));
    }
    Ok(())
}

/// Freeze billing by assigning an invoice number. Requires check-out.
pub fn invoice(b: &mut Booking, invoice_no: String) -> Result<(), LifecycleError> {
    ensure_invoiceable(b)?;
    b.invoice_no = Some(invoice_no);
    Ok(())
}
