//! Text rendering of workflow results.

use chrono::{DateTime, Local, TimeZone};
use qr_checkin::{Alert, SessionPhase, ValidationOutcome, WorkflowSnapshot};

const VALIDATED_AT_FORMAT: &str = "%-I:%M %p, %d-%m-%Y";

/// Lines shown for a snapshot; empty while nothing needs to be shown.
pub fn snapshot_lines(snapshot: &WorkflowSnapshot) -> Vec<String> {
    match snapshot.phase {
        SessionPhase::Processing => vec!["Looking up...".to_owned()],
        SessionPhase::Done | SessionPhase::Idle => outcome_lines(&snapshot.outcome, &Local),
        SessionPhase::AwaitingPermission | SessionPhase::Scanning => Vec::new(),
    }
}

/// Result block of an outcome, with validation times shown in `tz`.
pub fn outcome_lines<Tz>(outcome: &ValidationOutcome, tz: &Tz) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if !outcome.has_result() {
        return Vec::new();
    }
    let record = outcome.record();
    let user = match &record.id {
        Some(id) => format!("User: ({id}) {}", record.full_name()),
        None => format!("User: {}", record.full_name()),
    };
    let mut lines = vec![user];
    if !outcome.is_found() {
        return lines;
    }
    if let Some(email) = &record.email {
        lines.push(format!("Email: {email}"));
    }
    lines.push(if outcome.was_already_validated() {
        validated_line(outcome.validated_at(), tz)
    } else {
        "Ready to validate. Type 'confirm' to check in.".to_owned()
    });
    lines
}

fn validated_line<Tz>(at: Option<DateTime<chrono::Utc>>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match at {
        Some(at) => format!(
            "This entry was already validated at {}.",
            at.with_timezone(tz).format(VALIDATED_AT_FORMAT)
        ),
        None => "This entry was already validated.".to_owned(),
    }
}

pub fn alert_lines(alert: &Alert) -> Vec<String> {
    vec![
        format!("{}: {}", alert.title, alert.subtitle),
        alert.message.clone(),
    ]
}
