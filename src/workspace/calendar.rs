use chrono::{Duration, NaiveDateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use super::GoogleWorkspace;
use crate::error::{HandlerResult, WorkspaceError};
use crate::tools::schema::ToolArgs;

/// Upper bound the Calendar API accepts for `maxResults`.
const MAX_EVENTS: f64 = 2500.0;

/// Furthest back a listing window may start, in days.
const MAX_DAYS_BACK: f64 = 36_500.0;

#[derive(Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<Event>,
}

#[derive(Deserialize)]
struct Event {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    start: Option<EventTime>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedEvent {
    #[serde(default)]
    html_link: String,
}

impl GoogleWorkspace {
    pub(super) async fn list_calendar_events(&self, token: &str, args: &ToolArgs) -> HandlerResult {
        let max_results = args.number("max_results")?.clamp(1.0, MAX_EVENTS) as u32;
        let days_back = args.number("days_back")?.clamp(0.0, MAX_DAYS_BACK) as i64;
        let time_min = Duration::try_days(days_back)
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .ok_or_else(|| {
                WorkspaceError::Validation(format!("days_back {days_back} is out of range"))
            })?
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let request = self
            .request(
                Method::GET,
                &self.api.calendar_base,
                &["calendars", "primary", "events"],
                token,
            )?
            .query(&[
                ("timeMin", time_min),
                ("maxResults", max_results.to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ]);
        let events: EventList = self.call(request).await?;

        if events.items.is_empty() {
            return Ok("No events found.".to_string());
        }
        Ok(events
            .items
            .iter()
            .map(|event| {
                let start = event
                    .start
                    .as_ref()
                    .and_then(|s| s.date_time.as_deref().or(s.date.as_deref()))
                    .unwrap_or("unknown time");
                let summary = event.summary.as_deref().unwrap_or("(no title)");
                format!("- {}: {} (ID: {})", start, summary, event.id)
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    pub(super) async fn create_calendar_event(&self, token: &str, args: &ToolArgs) -> HandlerResult {
        let start = event_time(args.str("start_time")?, "start_time")?;
        let end = event_time(args.str("end_time")?, "end_time")?;
        let time_zone = &self.api.time_zone;

        let body = json!({
            "summary": args.str("summary")?,
            "description": args.str("description")?,
            "start": { "dateTime": start, "timeZone": time_zone },
            "end": { "dateTime": end, "timeZone": time_zone },
        });
        let request = self
            .request(
                Method::POST,
                &self.api.calendar_base,
                &["calendars", "primary", "events"],
                token,
            )?
            .json(&body);
        let created: CreatedEvent = self.call(request).await?;
        Ok(format!("Event created: {}", created.html_link))
    }
}

/// Normalizes a local wall-clock time to `YYYY-MM-DDTHH:MM:SS`.
///
/// Minute precision input gets `:00` seconds appended.
fn event_time(value: &str, field: &str) -> Result<String, WorkspaceError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
        .map_err(|_| {
            WorkspaceError::Validation(format!(
                "field '{field}' must look like YYYY-MM-DDTHH:MM, got '{value}'"
            ))
        })
}
