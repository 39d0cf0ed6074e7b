use chrono::{DateTime, Utc};
use lembra_domain::User;

/// Event moments shown to users are rendered in their own timezone
pub fn format_event_time(starts_at: DateTime<Utc>, user: &User) -> String {
    starts_at
        .with_timezone(&user.tz())
        .format("%d/%m/%Y %H:%M")
        .to_string()
}
