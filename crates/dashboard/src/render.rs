//! HTML rendering with embedded `MiniJinja` templates.

use minijinja::{Environment, context};

use crate::error::DashboardError;
use crate::view::{DashboardPage, EntryPage};

/// Fuel limit for template evaluation.
const FUEL_LIMIT: u64 = 100_000;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("entry.html", include_str!("../templates/entry.html")),
];

/// Renders view models to HTML. Templates are compiled once at
/// construction; `.html` names get `MiniJinja`'s HTML auto-escaping.
#[derive(Debug)]
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, DashboardError> {
        let mut env = Environment::new();
        env.set_fuel(Some(FUEL_LIMIT));
        for &(name, source) in TEMPLATES {
            env.add_template(name, source).map_err(|e| {
                DashboardError::Render(format!("syntax error in template '{name}': {e}"))
            })?;
        }
        Ok(Self { env })
    }

    pub fn dashboard(&self, page: &DashboardPage) -> Result<String, DashboardError> {
        self.render("dashboard.html", context! { page => page })
    }

    pub fn entry(&self, page: &EntryPage) -> Result<String, DashboardError> {
        self.render("entry.html", context! { page => page })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, DashboardError> {
        self.env
            .get_template(name)
            .and_then(|tmpl| tmpl.render(ctx))
            .map_err(|e| DashboardError::Render(format!("error rendering '{name}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use ndadesk_core::{Nda, NdaId, NewNda, UserId};

    use super::*;
    use crate::view::{Alert, FormState, NdaRow};

    fn row(id: &str, locked: bool) -> NdaRow {
        let sent = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut nda = Nda::from_new(
            NdaId::new(id),
            &NewNda::draft("Acme Co", "a@acme.com", UserId::new("u-1"), sent),
        );
        nda.locked = locked;
        NdaRow::new(&nda, false)
    }

    #[test]
    fn empty_dashboard_shows_placeholder() {
        let renderer = Renderer::new().unwrap();
        let page = DashboardPage::new(
            Some("admin@example.com".into()),
            vec![],
            FormState::hidden(),
            vec![],
        );
        let html = renderer.dashboard(&page).unwrap();
        assert!(html.contains("No NDAs yet. Send your first one!"));
        assert!(!html.contains("<tr class=\"nda-row"));
        assert!(html.contains("Send New NDA"));
        assert!(!html.contains("id=\"send-nda-form\""));
    }

    #[test]
    fn rows_and_actions() {
        let renderer = Renderer::new().unwrap();
        let page = DashboardPage::new(
            None,
            vec![row("open-1", false), row("locked-1", true)],
            FormState::hidden(),
            vec![],
        );
        let html = renderer.dashboard(&page).unwrap();
        assert_eq!(html.matches("<tr class=\"nda-row").count(), 2);
        assert!(html.contains("/dashboard/ndas/open-1/reminder"));
        assert!(!html.contains("/dashboard/ndas/locked-1/reminder"));
        assert!(html.contains("/dashboard/ndas/locked-1/lock"));
        assert!(html.contains("row-locked"));
        assert!(html.contains("badge-sent"));
        assert!(html.contains(">Unlock<"));
    }

    #[test]
    fn open_form_keeps_values_and_escapes() {
        let renderer = Renderer::new().unwrap();
        let page = DashboardPage::new(
            None,
            vec![],
            FormState::retained("<b>Acme</b>", "a@acme.com"),
            vec![Alert::error("Error: duplicate key")],
        );
        let html = renderer.dashboard(&page).unwrap();
        assert!(html.contains("id=\"send-nda-form\""));
        assert!(html.contains("&lt;b&gt;Acme&lt;"));
        assert!(!html.contains("<b>Acme"));
        assert!(html.contains("value=\"a@acme.com\""));
        assert!(html.contains("Error: duplicate key"));
        assert!(html.contains(">Cancel<"));
    }

    #[test]
    fn entry_page_shows_error() {
        let renderer = Renderer::new().unwrap();
        let html = renderer
            .entry(&EntryPage {
                email: "admin@example.com".into(),
                error: Some("Invalid login credentials".into()),
            })
            .unwrap();
        assert!(html.contains("Invalid login credentials"));
        assert!(html.contains("action=\"/login\""));
    }
}
