//! Account records and identity validation

pub mod models;
pub mod validation;

// Re-export commonly used types
pub use models::{Account, AccountFilter, AccountStatus, NewAccount, Role};
pub use validation::{EmailAddress, MobileNumber, NationalId, ValidationError};
