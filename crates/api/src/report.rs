// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Printable complaint reports and CSV export.

use complaint_desk_domain::{Complaint, ManagerNote};
use std::borrow::Cow;
use complaint_desk_persistence::format_timestamp;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::error;

use crate::error::ApiError;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

/// Column headers of the CSV export.
pub const CSV_HEADERS: [&str; 13] = [
    "ticket",
    "status",
    "category",
    "subcategory",
    "passenger_name",
    "passenger_phone",
    "passenger_email",
    "route",
    "trip_date",
    "departure_time",
    "pnr",
    "created_by",
    "created_at",
];

/// One history line of a report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReportHistoryLine {
    pub at: String,
    pub author: String,
    pub action: Option<String>,
    /// The note text, or a retraction marker.
    pub text: String,
}

/// Structured, printable view of one complaint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ComplaintReport {
    pub ticket: String,
    pub status: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub passenger_name: String,
    pub passenger_phone: String,
    pub passenger_email: Option<String>,
    pub route: String,
    pub trip_date: String,
    pub departure_time: Option<String>,
    pub pnr: Option<String>,
    pub plate: Option<String>,
    pub description: String,
    pub attachment_names: Vec<String>,
    pub created_by: String,
    pub created_at: String,
    pub history: Vec<ReportHistoryLine>,
}

fn format_error(e: &impl std::fmt::Display) -> ApiError {
    error!("Report formatting failed: {}", e);
    ApiError::Internal {
        message: String::from("Failed to format report"),
    }
}

fn history_line(note: &ManagerNote) -> Result<ReportHistoryLine, ApiError> {
    let text: String = note.retraction.as_ref().map_or_else(
        || note.text.clone(),
        |retraction| format!("[retracted by {}]", retraction.retracted_by_name),
    );
    Ok(ReportHistoryLine {
        at: format_timestamp(note.created_at)?,
        author: note.author_name.clone(),
        action: note.action_type.map(|a| a.label().to_string()),
        text,
    })
}

/// Builds the printable report of a complaint.
///
/// Retracted notes keep their place in the history with their text
/// replaced by a marker.
///
/// # Errors
///
/// Returns an error if a date cannot be formatted.
pub fn build_report(complaint: &Complaint) -> Result<ComplaintReport, ApiError> {
    let details = &complaint.details;
    let departure_time: Option<String> = details
        .trip
        .departure_time
        .map(|t| t.format(TIME_FORMAT))
        .transpose()
        .map_err(|e| format_error(&e))?;

    Ok(ComplaintReport {
        ticket: complaint.ticket_display(),
        status: complaint.status.label().to_string(),
        category: details.category.label().to_string(),
        subcategory: details.subcategory.clone(),
        passenger_name: details.passenger.name.clone(),
        passenger_phone: details.passenger.phone.formatted(),
        passenger_email: details
            .passenger
            .email
            .as_ref()
            .map(|e| e.value().to_string()),
        route: details.trip.route.clone(),
        trip_date: details
            .trip
            .trip_date
            .format(DATE_FORMAT)
            .map_err(|e| format_error(&e))?,
        departure_time,
        pnr: details.trip.pnr.clone(),
        plate: details.trip.plate.clone(),
        description: details.description.clone(),
        attachment_names: details
            .attachments
            .iter()
            .map(|a| a.file_name().to_string())
            .collect(),
        created_by: complaint.created_by_name.clone(),
        created_at: format_timestamp(complaint.created_at)?,
        history: complaint
            .notes
            .iter()
            .map(history_line)
            .collect::<Result<Vec<_>, _>>()?,
    })
}

/// Prefixes cells a spreadsheet would evaluate as a formula with `'`.
fn neutralize_formula(cell: &str) -> Cow<'_, str> {
    if cell.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        Cow::Owned(format!("'{cell}"))
    } else {
        Cow::Borrowed(cell)
    }
}

/// Writes complaints as CSV, one row per complaint, with a header row.
///
/// Cells starting with a formula trigger are written with a leading `'`.
///
/// # Errors
///
/// Returns an error if a row cannot be written.
pub fn export_complaints_csv(complaints: &[Complaint]) -> Result<String, ApiError> {
    let mut writer: csv::Writer<Vec<u8>> = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_HEADERS)
        .map_err(|e| format_error(&e))?;

    for complaint in complaints {
        let details = &complaint.details;
        let trip_date: String = details
            .trip
            .trip_date
            .format(DATE_FORMAT)
            .map_err(|e| format_error(&e))?;
        let departure_time: String = match details.trip.departure_time {
            Some(t) => t.format(TIME_FORMAT).map_err(|e| format_error(&e))?,
            None => String::new(),
        };
        let created_at: String = format_timestamp(complaint.created_at)?;

        let ticket: String = complaint.ticket_display();
        let phone: String = details.passenger.phone.formatted();
        let row: [&str; 13] = [
            ticket.as_str(),
            complaint.status.as_str(),
            details.category.as_str(),
            details.subcategory.as_deref().unwrap_or_default(),
            details.passenger.name.as_str(),
            phone.as_str(),
            details
                .passenger
                .email
                .as_ref()
                .map_or("", |e| e.value()),
            details.trip.route.as_str(),
            trip_date.as_str(),
            departure_time.as_str(),
            details.trip.pnr.as_deref().unwrap_or_default(),
            complaint.created_by_name.as_str(),
            created_at.as_str(),
        ];
        writer
            .write_record(row.map(neutralize_formula).iter().map(|cell| cell.as_bytes()))
            .map_err(|e| format_error(&e))?;
    }

    let bytes: Vec<u8> = writer.into_inner().map_err(|e| format_error(&e))?;
    String::from_utf8(bytes).map_err(|e| format_error(&e))
}
