mod dispatch;
mod types;
mod types_stage;
mod types_template;

pub use dispatch::dispatch;
pub use types::{Cli, Commands};
