mod logic;
mod ui;

use std::sync::Arc;

use app_core::frontend::UIParameter;
use derive_new::new;
use table_io::Table;

use crate::{app::DynRequestSender, state::artifact::DataRevision};

/// The dataset PCA artifacts are computed from.
pub struct Dataset {
    incoming: UIParameter<Option<Result<LoadedTable, String>>>,
    current: Option<Arc<Table>>,
    source: String,
    revision: DataRevision,
    last_error: Option<String>,
    request_tx: DynRequestSender,
}

/// A table read on the backend, with a description of where it came from.
#[derive(Debug, new)]
pub struct LoadedTable {
    source: String,
    table: Table,
}

impl Dataset {
    pub fn new(request_tx: DynRequestSender) -> Self {
        Self {
            incoming: UIParameter::new(None),
            current: None,
            source: String::new(),
            revision: DataRevision::default(),
            last_error: None,
            request_tx,
        }
    }
}
