use std::str::FromStr;

use crate::errors::internal::ValidationError;
use crate::types::db::ticket::TicketStatus;

/// Parse one of the enumerated wire values, rejecting anything else
pub fn parse_choice<T: FromStr>(field: &'static str, value: &str) -> Result<T, ValidationError> {
    T::from_str(value.trim()).map_err(|_| ValidationError::invalid_choice(field, value))
}

/// Trimmed value, or an error naming the missing field
pub fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::empty(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// `JIAI` + 7 → `JIAI-00007`; wider numbers keep all their digits
pub fn format_ticket_id(prefix: &str, number: i64) -> String {
    format!("{}-{:05}", prefix, number)
}

/// New `resolved_at` after moving to `status` at time `now`
///
/// Set on entering resolved (kept if already set), cleared for every other status.
pub fn resolved_at_after(status: TicketStatus, current: Option<i64>, now: i64) -> Option<i64> {
    match status {
        TicketStatus::Resolved => Some(current.unwrap_or(now)),
        _ => None,
    }
}

/// Mean of `resolved - created` in hours, rounded to two decimals; 0 when empty
pub fn average_resolution_hours(spans: &[(i64, i64)]) -> f64 {
    if spans.is_empty() {
        return 0.0;
    }

    let total_seconds: i64 = spans.iter().map(|(created, resolved)| resolved - created).sum();
    let hours = total_seconds as f64 / spans.len() as f64 / 3600.0;
    (hours * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::db::ticket::{TicketCategory, TicketPriority};

    #[test]
    fn test_parse_choice_accepts_wire_values() {
        assert_eq!(parse_choice::<TicketStatus>("status", "in_progress"), Ok(TicketStatus::InProgress));
        assert_eq!(parse_choice::<TicketCategory>("category", "network"), Ok(TicketCategory::Network));
        assert_eq!(parse_choice::<TicketPriority>("priority", " urgent "), Ok(TicketPriority::Urgent));
    }

    #[test]
    fn test_parse_choice_rejects_unknown_values() {
        assert_eq!(
            parse_choice::<TicketStatus>("status", "done"),
            Err(ValidationError::invalid_choice("status", "done"))
        );
        assert!(parse_choice::<TicketStatus>("status", "InProgress").is_err());
        assert!(parse_choice::<TicketCategory>("category", "").is_err());
    }

    #[test]
    fn test_wire_strings_round_trip_through_display() {
        assert_eq!(TicketStatus::InProgress.to_string(), "in_progress");
        assert_eq!(TicketCategory::Access.to_string(), "access");
        assert_eq!(TicketPriority::High.to_string(), "high");
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("title", "  VPN down "), Ok("VPN down".to_string()));
        assert_eq!(require_text("title", "   "), Err(ValidationError::empty("title")));
    }

    #[test]
    fn test_format_ticket_id() {
        assert_eq!(format_ticket_id("JIAI", 1), "JIAI-00001");
        assert_eq!(format_ticket_id("JIAI", 42), "JIAI-00042");
        assert_eq!(format_ticket_id("HD", 123456), "HD-123456");
    }

    #[test]
    fn test_resolved_at_rule() {
        assert_eq!(resolved_at_after(TicketStatus::Resolved, None, 100), Some(100));
        assert_eq!(resolved_at_after(TicketStatus::Resolved, Some(50), 100), Some(50));
        for status in [TicketStatus::Open, TicketStatus::InProgress, TicketStatus::Closed, TicketStatus::Escalated] {
            assert_eq!(resolved_at_after(status, Some(50), 100), None);
        }
    }

    #[test]
    fn test_average_resolution_hours() {
        assert_eq!(average_resolution_hours(&[]), 0.0);
        assert_eq!(average_resolution_hours(&[(0, 7200), (1000, 8200), (50, 7250)]), 2.0);
        assert_eq!(average_resolution_hours(&[(0, 3600), (0, 10800)]), 2.0);
        assert_eq!(average_resolution_hours(&[(0, 1000)]), 0.28);
    }
}
