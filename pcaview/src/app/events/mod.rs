use std::{path::PathBuf, thread::JoinHandle};

use app_core::{
    event::{AppEvent, EventState},
    string_error::ErrorStringExt,
};
use derive_new::new;

use super::{components::ArtifactKind, EguiApp};
use crate::state::{artifact::Toggle, color_groups::GroupChoice};

pub const NO_DATA_MSG: &str = "Please upload data first";

// ---------------------------------------------------------------------------
//
//
// EventQueue
//
//
// ---------------------------------------------------------------------------

/// The EventQueue stores events that are processed each iteration
/// of the application GUI event loop.
pub struct EventQueue<EguiApp> {
    /// Stores events for later processing.
    queue: Vec<Box<dyn AppEvent<App = EguiApp>>>,
    /// Temporarily stores events that have not yet finished running.
    tmp_backlog: Vec<Box<dyn AppEvent<App = EguiApp>>>,
}

impl<EguiApp> EventQueue<EguiApp> {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            tmp_backlog: Vec::new(),
        }
    }

    pub fn queue_event(&mut self, event: Box<dyn AppEvent<App = EguiApp>>) {
        self.queue.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty() && self.tmp_backlog.is_empty()
    }
}

impl EguiApp {
    /// Applies queued events in the order they were queued. Events queued
    /// while applying run next frame, after the busy ones.
    pub fn run_events(&mut self) {
        let queued = std::mem::take(&mut self.event_queue.queue);
        for mut event in queued {
            match event.apply(self) {
                Ok(EventState::Finished) => {
                    self.request_redraw();
                }
                Ok(EventState::Busy) => {
                    self.event_queue.tmp_backlog.push(event);
                }
                Err(err) => {
                    log::error!("event failed: {}", err)
                }
            }
        }

        let mut backlog = std::mem::take(&mut self.event_queue.tmp_backlog);
        backlog.append(&mut self.event_queue.queue);
        self.event_queue.queue = backlog;
    }
}

// ---------------------------------------------------------------------------
//
//
// Events
//
//
// ---------------------------------------------------------------------------

#[derive(new)]
pub struct AssignSample {
    sample_name: String,
    choice: GroupChoice,
}

#[derive(new)]
pub struct ChangeGroupColor {
    group_index: usize,
    color: String,
}

#[derive(new)]
pub struct AddGroup {}

#[derive(new)]
pub struct RemoveGroup {
    group_index: usize,
}

/// Collapses the groups to the defaults and repaints every sample.
#[derive(new)]
pub struct ResetGroups {}

#[derive(new)]
pub struct ToggleArtifact {
    kind: ArtifactKind,
}

/// Loads the file picked in a file dialog.
#[derive(new)]
pub struct OpenFileRequested {
    thread_handle: Option<JoinHandle<Option<PathBuf>>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportSource {
    Data,
    Loadings,
    Contributors,
}

/// Writes one of the shown tables to the CSV file picked in a dialog.
#[derive(new)]
pub struct ExportTableRequested {
    source: ExportSource,
    thread_handle: Option<JoinHandle<Option<PathBuf>>>,
}

// ---------------------------------------------------------------------------
//
//
// apply()
//
//
// ---------------------------------------------------------------------------

impl AppEvent for AssignSample {
    type App = EguiApp;

    fn apply(&mut self, app: &mut Self::App) -> Result<EventState, String> {
        app.color_groups.assign_sample_to_group(
            &self.sample_name,
            &self.choice,
            app.artifacts.pca.active_payload_mut(),
        );
        Ok(EventState::Finished)
    }
}

impl AppEvent for ChangeGroupColor {
    type App = EguiApp;

    fn apply(&mut self, app: &mut Self::App) -> Result<EventState, String> {
        if !app.color_groups.change_group_color(
            self.group_index,
            &self.color,
            app.artifacts.pca.active_payload_mut(),
        ) {
            return Err(format!("no group at index {}", self.group_index));
        }
        Ok(EventState::Finished)
    }
}

impl AppEvent for AddGroup {
    type App = EguiApp;

    fn apply(&mut self, app: &mut Self::App) -> Result<EventState, String> {
        app.color_groups.add_group();
        Ok(EventState::Finished)
    }
}

impl AppEvent for RemoveGroup {
    type App = EguiApp;

    fn apply(&mut self, app: &mut Self::App) -> Result<EventState, String> {
        app.color_groups.remove_group(
            self.group_index,
            &app.config.default_color,
            app.artifacts.pca.active_payload_mut(),
        );
        Ok(EventState::Finished)
    }
}

impl AppEvent for ResetGroups {
    type App = EguiApp;

    fn apply(&mut self, app: &mut Self::App) -> Result<EventState, String> {
        app.color_groups
            .reset_all(&app.config.default_color, app.artifacts.pca.active_payload_mut());
        Ok(EventState::Finished)
    }
}

impl AppEvent for ToggleArtifact {
    type App = EguiApp;

    fn apply(&mut self, app: &mut Self::App) -> Result<EventState, String> {
        let action = app.artifacts.toggle(
            self.kind,
            &app.dataset,
            &mut app.color_groups,
            &app.config.default_color,
        );
        log::debug!("toggled {}: {:?}", self.kind, action);
        if action == Toggle::NeedsData {
            app.alert = Some(NO_DATA_MSG.to_string());
        }
        Ok(EventState::Finished)
    }
}

impl AppEvent for OpenFileRequested {
    type App = EguiApp;

    fn apply(&mut self, app: &mut Self::App) -> Result<EventState, String> {
        if let Some(handle) = self.thread_handle.take_if(|handle| handle.is_finished()) {
            match handle.join() {
                Ok(Some(path)) => app.dataset.load_file(path),
                Ok(None) => (),
                Err(err) => {
                    log::error!("unable to pick file: {:?}", err)
                }
            };
            Ok(EventState::Finished)
        } else {
            Ok(EventState::Busy)
        }
    }
}

impl AppEvent for ExportTableRequested {
    type App = EguiApp;

    fn apply(&mut self, app: &mut Self::App) -> Result<EventState, String> {
        let Some(handle) = self.thread_handle.take_if(|handle| handle.is_finished()) else {
            return Ok(EventState::Busy);
        };
        let path = match handle.join() {
            Ok(Some(path)) => path,
            Ok(None) => return Ok(EventState::Finished),
            Err(err) => return Err(format!("unable to pick export path: {:?}", err)),
        };
        let table = match self.source {
            ExportSource::Data => app.dataset.current().map(|table| table.as_ref()),
            ExportSource::Loadings => app.artifacts.loadings.payload(),
            ExportSource::Contributors => app
                .artifacts
                .contributors
                .payload()
                .map(|answer| &answer.top_five_contributors),
        };
        let Some(table) = table else {
            return Err(format!("nothing to export for {:?}", self.source));
        };
        table
            .save_csv(&path)
            .err_to_string("unable to export table")?;
        log::info!("exported {} rows to {:?}", table.len(), path);
        Ok(EventState::Finished)
    }
}
