use std::{path::PathBuf, sync::Arc};

use app_core::{
    backend::{BackendEventLoop, BackendLink},
    string_error::ErrorStringExt,
};
use table_io::Table;

use super::LoadedTable;
use crate::{state::artifact::DataRevision, BackendAppState};

impl super::Dataset {
    /// Reads a delimited text file on the backend thread.
    pub fn load_file(&mut self, path: PathBuf) {
        log::debug!("loading dataset from {:?}", path);
        BackendLink::request_parameter_update(
            &mut self.incoming,
            "load dataset from file",
            move |_: &mut BackendEventLoop<BackendAppState>| {
                let source = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                Some(
                    Table::from_path(&path)
                        .map(|table| LoadedTable::new(source, table))
                        .err_to_string("unable to load dataset"),
                )
            },
            &self.request_tx,
        );
    }

    /// Asks the PCA service for a random dataset.
    pub fn generate(&mut self) {
        BackendLink::request_parameter_update(
            &mut self.incoming,
            "generate random dataset",
            |b: &mut BackendEventLoop<BackendAppState>| {
                Some(
                    b.state
                        .gateway()
                        .generate_data()
                        .map(|table| LoadedTable::new("random data".to_string(), table))
                        .err_to_string("unable to generate data"),
                )
            },
            &self.request_tx,
        );
    }

    /// Fetches the dataset stored on the PCA service under `id`.
    pub fn fetch_stored(&mut self, id: &str) {
        let id = id.trim().to_owned();
        if id.is_empty() {
            log::warn!("no dataset ID given");
            return;
        }
        BackendLink::request_parameter_update(
            &mut self.incoming,
            "fetch stored dataset",
            move |b: &mut BackendEventLoop<BackendAppState>| {
                Some(
                    b.state
                        .gateway()
                        .data_from_db(&id)
                        .map(|table| LoadedTable::new(format!("stored dataset '{id}'"), table))
                        .err_to_string("unable to fetch stored dataset"),
                )
            },
            &self.request_tx,
        );
    }

    /// Takes over a dataset once the backend delivered it. Returns true if
    /// something changed.
    pub fn try_update(&mut self) -> bool {
        if !self.incoming.try_update() {
            return false;
        }
        match self.incoming.value_mut().take() {
            Some(Ok(LoadedTable { source, table })) => self.set_table(source, table),
            Some(Err(err)) => {
                log::error!("{}", err);
                self.last_error = Some(err);
            }
            None => (),
        }
        true
    }

    pub fn set_table(&mut self, source: String, table: Table) {
        log::info!("using {} ({} samples)", source, table.len());
        self.revision = self.revision.next();
        self.current = Some(Arc::new(table));
        self.source = source;
        self.last_error = None;
    }

    pub fn is_loading(&self) -> bool {
        !self.incoming.is_up_to_date()
    }

    /// True if there is at least one row to analyse.
    pub fn has_data(&self) -> bool {
        self.current.as_ref().is_some_and(|table| !table.is_empty())
    }

    /// Revision of the current data, `None` while there is nothing to
    /// analyse.
    pub fn revision(&self) -> Option<DataRevision> {
        self.has_data().then_some(self.revision)
    }

    pub fn current(&self) -> Option<&Arc<Table>> {
        self.current.as_ref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
