mod control;
mod status;

pub use control::{run_control, run_logs};
pub use status::run_status;
