pub mod enums;
pub mod patient;
pub mod plan;

pub use enums::*;
pub use patient::*;
pub use plan::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}
