//! Reports and CSV export, independent of the poll cycle.

use super::core::EventSender;
use crate::api::RigApi;
use crate::api::error::ApiError;
use crate::error_classifier::{ErrorClassifier, LogLevel};
use crate::events::EventType;
use crate::store::DashboardStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct ReportController {
    api: Arc<dyn RigApi>,
    store: DashboardStore,
    events: EventSender,
    export_dir: PathBuf,
    classifier: ErrorClassifier,
}

impl ReportController {
    pub fn new(
        api: Arc<dyn RigApi>,
        store: DashboardStore,
        events: EventSender,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            api,
            store,
            events,
            export_dir,
            classifier: ErrorClassifier::new(),
        }
    }

    /// Fetches a fresh report and makes it the current one.
    /// On failure the previous report stays and the error is only logged.
    pub async fn generate_report(&self) -> Result<(), ApiError> {
        self.events.send_report_event(
            "Generating report".to_string(),
            EventType::Waiting,
            LogLevel::Debug,
        );
        match self.api.report().await {
            Ok(report) => {
                self.store.set_report(report);
                self.events.send_report_event(
                    "Report generated".to_string(),
                    EventType::Success,
                    LogLevel::Info,
                );
                Ok(())
            }
            Err(e) => {
                self.events.send_report_event(
                    format!("Report generation failed: {}", e),
                    EventType::Error,
                    self.classifier.classify_api_error(&e),
                );
                Err(e)
            }
        }
    }

    /// Starts a background CSV download into the export directory.
    ///
    /// Never fails here; a failed download only shows up in the activity log.
    /// The handle resolves to the written path, for callers that want to wait.
    pub fn export_csv(&self) -> JoinHandle<Option<PathBuf>> {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        let dir = self.export_dir.clone();
        let classifier = self.classifier.clone();

        events.send_report_event(
            format!("Exporting CSV to {}", dir.display()),
            EventType::Waiting,
            LogLevel::Debug,
        );
        tokio::spawn(async move {
            match api.export_csv(&dir).await {
                Ok(path) => {
                    events.send_report_event(
                        format!("CSV exported to {}", path.display()),
                        EventType::Success,
                        LogLevel::Info,
                    );
                    Some(path)
                }
                Err(e) => {
                    events.send_report_event(
                        format!("CSV export failed: {}", e),
                        EventType::Error,
                        classifier.classify_api_error(&e),
                    );
                    None
                }
            }
        })
    }
}
