pub mod aggregate;
pub mod correlation;
pub mod error;
