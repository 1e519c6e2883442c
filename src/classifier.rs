//! Pure booking rules: status display, bucket membership and cancellation
//! eligibility. Every function takes the reference instant explicitly.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::booking::{Booking, BookingStatus};

/// Guests may cancel up to this many hours before check-in (exclusive).
pub const CANCELLATION_WINDOW_HOURS: i64 = 48;

pub fn cancellation_window() -> Duration {
    Duration::hours(CANCELLATION_WINDOW_HOURS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Upcoming,
    Past,
    Cancelled,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Upcoming, Bucket::Past, Bucket::Cancelled];

    pub fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Past => "Past",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Semantic color a status badge is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Warning,
    Success,
    Danger,
    Info,
    /// Status not recognised by this client.
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayStatus {
    pub label: String,
    pub color: ColorTag,
}

pub fn display_status(status: &BookingStatus) -> DisplayStatus {
    let (label, color) = match status {
        BookingStatus::Pending => ("Pending", ColorTag::Warning),
        BookingStatus::Confirmed => ("Confirmed", ColorTag::Success),
        BookingStatus::Cancelled => ("Cancelled", ColorTag::Danger),
        BookingStatus::Completed => ("Completed", ColorTag::Info),
        BookingStatus::Unknown(raw) => {
            return DisplayStatus {
                label: raw.clone(),
                color: ColorTag::Neutral,
            };
        }
    };

    DisplayStatus {
        label: label.to_string(),
        color,
    }
}

/// A stay in progress (check-in <= now <= check-out) counts as upcoming
/// until check-out passes.
pub fn bucket_of(booking: &Booking, now: DateTime<Utc>) -> Bucket {
    if booking.status == BookingStatus::Cancelled {
        return Bucket::Cancelled;
    }
    if booking.check_out < now || booking.status == BookingStatus::Completed {
        return Bucket::Past;
    }
    Bucket::Upcoming
}

pub fn is_cancellable(booking: &Booking, now: DateTime<Utc>) -> bool {
    is_cancellable_within(booking, now, cancellation_window())
}

pub fn is_cancellable_within(booking: &Booking, now: DateTime<Utc>, window: Duration) -> bool {
    let open_status = matches!(
        booking.status,
        BookingStatus::Pending | BookingStatus::Confirmed
    );
    open_status && booking.check_in - now > window
}

/// Last instant at which the booking is still cancellable is strictly
/// before this.
pub fn cancellation_deadline(booking: &Booking, window: Duration) -> DateTime<Utc> {
    booking.check_in - window
}

/// Whole nights, rounded up. Assumes `check_in < check_out`.
pub fn nights_between(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> i64 {
    let stay = check_out - check_in;
    let whole = stay.num_days();
    if stay > Duration::days(whole) {
        whole + 1
    } else {
        whole
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    ViewDetails,
    Cancel,
    LeaveReview,
    MessageHost,
}

pub fn available_actions(
    booking: &Booking,
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<BookingAction> {
    let mut actions = vec![BookingAction::ViewDetails];

    if is_cancellable_within(booking, now, window) {
        actions.push(BookingAction::Cancel);
    }
    if booking.status == BookingStatus::Completed && !booking.has_reviewed {
        actions.push(BookingAction::LeaveReview);
    }
    if booking.status != BookingStatus::Cancelled {
        actions.push(BookingAction::MessageHost);
    }

    actions
}
