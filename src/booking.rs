use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Booking state as reported by the store. Never inferred locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    /// A status this client does not know about yet.
    Unknown(String),
}

impl BookingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<String> for BookingStatus {
    fn from(raw: String) -> Self {
        match raw.to_lowercase().as_str() {
            "pending" => Self::Pending,
            "confirmed" => Self::Confirmed,
            "cancelled" => Self::Cancelled,
            "completed" => Self::Completed,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSummary {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    pub id: u64,
    pub title: String,
    pub area: String,
    pub city: String,
    pub host: HostSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl PropertySummary {
    /// "Area, City" line shown under the title.
    pub fn location(&self) -> String {
        match (self.area.is_empty(), self.city.is_empty()) {
            (false, false) => format!("{}, {}", self.area, self.city),
            (true, _) => self.city.clone(),
            (false, true) => self.area.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: u64,
    pub status: BookingStatus,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub guests: u32,
    pub total_amount: f64,
    pub property: PropertySummary,
    #[serde(default)]
    pub has_reviewed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_keeps_raw_value() {
        let status: BookingStatus = serde_json::from_str("\"on_hold\"").unwrap();
        assert_eq!(status, BookingStatus::Unknown("on_hold".to_string()));
        assert_eq!(status.to_string(), "on_hold");
    }

    #[test]
    fn status_parsing_ignores_case() {
        let status: BookingStatus = serde_json::from_str("\"Confirmed\"").unwrap();
        assert_eq!(status, BookingStatus::Confirmed);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"confirmed\"");
    }

    #[test]
    fn booking_deserializes_from_camel_case() {
        let booking: Booking = serde_json::from_value(serde_json::json!({
            "id": 7,
            "status": "pending",
            "checkIn": "2025-03-01T14:00:00Z",
            "checkOut": "2025-03-04T11:00:00+03:00",
            "guests": 2,
            "totalAmount": 1250.5,
            "property": {
                "id": 3,
                "title": "Pearl Tower Studio",
                "area": "The Pearl",
                "city": "Doha",
                "host": { "id": 9, "name": "Mariam" }
            }
        }))
        .unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(!booking.has_reviewed);
        assert_eq!(booking.property.photo, None);
        assert_eq!(booking.property.location(), "The Pearl, Doha");
        assert_eq!(booking.check_out.to_rfc3339(), "2025-03-04T08:00:00+00:00");
    }
}
