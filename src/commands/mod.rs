pub mod common;
pub mod init;
pub mod progress;
pub mod stage;
pub mod template;

pub use common::Workspace;
