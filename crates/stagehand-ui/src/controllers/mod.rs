//! Controllers for the staging panel's contexts.

mod buttons;
mod commit_input;
mod jump;
mod staged_files;

pub use buttons::ButtonController;
pub use commit_input::CommitInputController;
pub use jump::{jump_bindings, SIDE_WINDOWS};
pub use staged_files::StagedFilesController;
