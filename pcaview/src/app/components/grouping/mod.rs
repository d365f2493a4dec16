mod ui;

/// Side panel to sort samples into colored groups.
#[derive(Debug, Default)]
pub struct GroupPanel {
    reset_modal_open: bool,
}
