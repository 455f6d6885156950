mod action_plan;
mod architecture;
mod dev_module;
mod idea;
mod message;
mod patch;
mod status;

pub use action_plan::*;
pub use architecture::*;
pub use dev_module::*;
pub use idea::*;
pub use message::*;
pub use patch::*;
pub use status::*;

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the precision the store keeps, so a record read back
/// compares equal to the one that was written.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
