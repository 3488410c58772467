pub mod error;
pub mod google_drive;
pub mod settings;
pub mod workflow;

pub use error::Error;
