//! View models for the dashboard and entry pages.
//!
//! Everything the templates need is computed here, so the rendering rules
//! can be checked without parsing HTML.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ndadesk_core::{Nda, NdaStatus};

/// Date format used for every date cell.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Placeholder shown in the reminder column before any reminder.
pub const REMINDER_NOT_SENT: &str = "Not sent";

/// Placeholder shown instead of the table body when there are no records.
pub const EMPTY_PLACEHOLDER: &str = "No NDAs yet. Send your first one!";

/// Badge class for a status: `sent` is yellow, `signed` green, anything else
/// neutral.
pub fn status_class(status: &NdaStatus) -> &'static str {
    match status {
        NdaStatus::Sent => "badge-sent",
        NdaStatus::Signed => "badge-signed",
        NdaStatus::Other(_) => "badge-default",
    }
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

/// One table row, pre-formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NdaRow {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub sent_date: String,
    pub reminder: String,
    pub status: String,
    pub status_class: &'static str,
    pub locked: bool,
    /// `row-locked` for locked records, empty otherwise.
    pub row_class: &'static str,
    /// The reminder action is hidden, not disabled, on locked rows.
    pub show_reminder: bool,
    pub lock_label: &'static str,
    pub lock_class: &'static str,
    /// A mutation for this record is in flight; actions render disabled.
    pub pending: bool,
}

impl NdaRow {
    pub fn new(nda: &Nda, pending: bool) -> Self {
        Self {
            id: nda.id.to_string(),
            customer_name: nda.customer_name.clone(),
            customer_email: nda.customer_email.clone(),
            sent_date: format_date(nda.sent_date),
            reminder: nda
                .reminder_sent
                .map_or_else(|| REMINDER_NOT_SENT.to_owned(), format_date),
            status: nda.status.to_string(),
            status_class: status_class(&nda.status),
            locked: nda.locked,
            row_class: if nda.locked { "row-locked" } else { "" },
            show_reminder: nda.accepts_reminders(),
            lock_label: if nda.locked { "Unlock" } else { "Lock" },
            lock_class: if nda.locked { "action-unlock" } else { "action-lock" },
            pending,
        }
    }
}

/// Severity of a page alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Success,
    Error,
}

/// A message shown at the top of the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            message: message.into(),
        }
    }
}

/// Success acknowledgements carried across a redirect as a short code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NdaSent,
    ReminderSent,
}

impl Notice {
    pub fn code(self) -> &'static str {
        match self {
            Self::NdaSent => "nda_sent",
            Self::ReminderSent => "reminder_sent",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "nda_sent" => Some(Self::NdaSent),
            "reminder_sent" => Some(Self::ReminderSent),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::NdaSent => "NDA sent successfully!",
            Self::ReminderSent => "Reminder sent!",
        }
    }

    pub fn alert(self) -> Alert {
        Alert::success(self.message())
    }
}

/// Visibility and contents of the "send NDA" form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub visible: bool,
    pub customer_name: String,
    pub customer_email: String,
}

impl FormState {
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn open() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    /// An open form that keeps what the user typed.
    pub fn retained(customer_name: impl Into<String>, customer_email: impl Into<String>) -> Self {
        Self {
            visible: true,
            customer_name: customer_name.into(),
            customer_email: customer_email.into(),
        }
    }

    /// Label of the button that shows or hides the form.
    pub fn toggle_label(&self) -> &'static str {
        if self.visible { "Cancel" } else { "Send New NDA" }
    }
}

/// The dashboard page in its `ready` state.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardPage {
    pub user_email: Option<String>,
    pub rows: Vec<NdaRow>,
    pub form: FormState,
    pub toggle_label: &'static str,
    pub alerts: Vec<Alert>,
    pub empty_placeholder: &'static str,
}

impl DashboardPage {
    pub fn new(
        user_email: Option<String>,
        rows: Vec<NdaRow>,
        form: FormState,
        alerts: Vec<Alert>,
    ) -> Self {
        Self {
            user_email,
            rows,
            toggle_label: form.toggle_label(),
            form,
            alerts,
            empty_placeholder: EMPTY_PLACEHOLDER,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: &str) -> Option<&NdaRow> {
        self.rows.iter().find(|row| row.id == id)
    }
}

/// The sign-in page at the entry destination.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntryPage {
    pub email: String,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use ndadesk_core::{NdaId, NewNda, UserId};

    use super::*;

    fn nda(status: &str, locked: bool, reminder: Option<DateTime<Utc>>) -> Nda {
        let sent = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let mut nda = Nda::from_new(
            NdaId::new("n-1"),
            &NewNda::draft("Acme Co", "a@acme.com", UserId::new("u-1"), sent),
        );
        nda.status = NdaStatus::from(status);
        nda.locked = locked;
        nda.reminder_sent = reminder;
        nda
    }

    #[test]
    fn status_classes() {
        assert_eq!(status_class(&NdaStatus::Sent), "badge-sent");
        assert_eq!(status_class(&NdaStatus::Signed), "badge-signed");
        assert_eq!(status_class(&NdaStatus::from("voided")), "badge-default");
    }

    #[test]
    fn fresh_row() {
        let row = NdaRow::new(&nda("sent", false, None), false);
        assert_eq!(row.sent_date, "2024-03-01");
        assert_eq!(row.reminder, "Not sent");
        assert_eq!(row.status, "sent");
        assert_eq!(row.status_class, "badge-sent");
        assert_eq!(row.row_class, "");
        assert!(row.show_reminder);
        assert_eq!(row.lock_label, "Lock");
    }

    #[test]
    fn locked_rows_never_offer_reminders() {
        let reminded = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
        for status in ["sent", "signed", "voided"] {
            for reminder in [None, Some(reminded)] {
                let row = NdaRow::new(&nda(status, true, reminder), false);
                assert!(!row.show_reminder, "status={status} reminder={reminder:?}");
                assert_eq!(row.row_class, "row-locked");
                assert_eq!(row.lock_label, "Unlock");
            }
        }
    }

    #[test]
    fn reminder_date_is_formatted() {
        let reminded = Utc.with_ymd_and_hms(2024, 3, 4, 23, 59, 0).unwrap();
        let row = NdaRow::new(&nda("signed", false, Some(reminded)), false);
        assert_eq!(row.reminder, "2024-03-04");
        assert_eq!(row.status_class, "badge-signed");
    }

    #[test]
    fn notice_codes_round_trip() {
        for notice in [Notice::NdaSent, Notice::ReminderSent] {
            assert_eq!(Notice::from_code(notice.code()), Some(notice));
        }
        assert_eq!(Notice::from_code("bogus"), None);
        assert_eq!(Notice::NdaSent.message(), "NDA sent successfully!");
    }

    #[test]
    fn form_toggle_label() {
        assert_eq!(FormState::hidden().toggle_label(), "Send New NDA");
        assert_eq!(FormState::open().toggle_label(), "Cancel");
        let page = DashboardPage::new(None, vec![], FormState::open(), vec![]);
        assert_eq!(page.toggle_label, "Cancel");
        assert!(page.is_empty());
    }
}
