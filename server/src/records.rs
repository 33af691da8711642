//! Bookings and quotes fetched from the backing table store
//!
//! Both record types are read-only from the client's point of view. Status
//! values are closed enumerations: rows carrying any other status fail to
//! deserialize.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of an equipment rental booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Badge text, e.g. `IN PROGRESS`
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }
}

/// Lifecycle of a service quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Approved,
    Rejected,
    Expired,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        }
    }

    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }
}

/// Equipment rental booking row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    /// References to rented equipment items
    #[serde(default)]
    pub equipment_items: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: BookingStatus,
    /// Total in AED
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Short reference shown to clients, e.g. `Booking #1a2b3c4d`
    pub fn reference(&self) -> String {
        format!("Booking #{}", short_id(&self.id))
    }

    /// Clients may only cancel bookings that have not been confirmed yet
    pub fn is_cancellable(&self) -> bool {
        self.status == BookingStatus::Pending
    }

    /// Number of rental days, counting both ends
    pub fn rental_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Service quote row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_type: String,
    pub project_description: String,
    #[serde(default)]
    pub estimated_amount: Option<f64>,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
}

impl Quote {
    pub fn is_acceptable(&self) -> bool {
        self.status == QuoteStatus::Approved
    }

    /// Whether the validity deadline has passed at `now`
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.is_some_and(|deadline| deadline < now)
    }
}

/// Row to insert into the `bookings` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub equipment_items: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_amount: f64,
}

/// Row to insert into the `quotes` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuote {
    pub user_id: Uuid,
    pub service_type: String,
    pub project_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_amount: Option<f64>,
}

/// Order rows newest first (the order every list view uses)
pub fn newest_first<T>(rows: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
}

/// Format an AED amount with thousands separators, e.g. `AED 15,400`
pub fn format_aed(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    if fraction == 0 {
        format!("AED {}{}", sign, grouped)
    } else {
        let fraction = format!("{:02}", fraction);
        format!("AED {}{}.{}", sign, grouped, fraction.trim_end_matches('0'))
    }
}

fn short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}
