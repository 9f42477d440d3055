pub mod data_dir;
pub mod locking;

pub use data_dir::DataDir;
