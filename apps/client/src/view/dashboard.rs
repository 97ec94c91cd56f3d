use tracing::warn;

use crate::models::jobs::ApplicationSummary;
use crate::state::AppState;
use crate::view::Frame;

/// Dashboard body: application statistics plus the AI assistant and CV
/// analysis entry points.
#[derive(Debug, Default)]
pub struct Dashboard {
    summary: ApplicationSummary,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> &ApplicationSummary {
        &self.summary
    }

    /// Refreshes the statistics. Any failure shows zeros.
    pub async fn load(&mut self, state: &AppState) {
        let Some(token) = state.session.current_session().token().map(str::to_string) else {
            self.summary = ApplicationSummary::default();
            return;
        };

        self.summary = match state.jobs.application_tracker(&token).await {
            Ok(tracker) => tracker.summary,
            Err(e) => {
                warn!("Failed to fetch dashboard stats: {e}");
                ApplicationSummary::default()
            }
        };
    }

    pub fn render(&self, state: &AppState) -> Frame {
        let session = state.session.current_session();
        let name = session.user().map(|u| u.name.as_str()).unwrap_or_default();

        let mut frame = Frame::new(state.i18n.direction());
        frame.push(format!("== {} ==", state.t("dashboard")));
        frame.push(format!("{}, {}!", state.t("welcome"), name));
        frame.push(format!(
            "  {}: {}",
            state.t("total_applications"),
            self.summary.total_applications
        ));
        frame.push(format!(
            "  {}: {}%",
            state.t("success_rate"),
            self.summary.success_rate
        ));
        frame.push(format!(
            "  {}: {}",
            state.t("recent_applications"),
            self.summary.recent_applications
        ));
        for (status, count) in &self.summary.status_counts {
            let label = state.t(&format!("status_{status}"));
            frame.push(format!("    {label}: {count}"));
        }
        frame.push(format!("  [{}] {}", state.t("ai_assistant"), state.t("start_chat")));
        frame.push(format!("  [{}] {}", state.t("cv_analysis"), state.t("upload_cv")));
        frame
    }
}
