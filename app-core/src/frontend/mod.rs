mod ui_parameter;

pub use ui_parameter::{RequestSeq, UIParameter};
