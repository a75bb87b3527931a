//! Credential encoding, redacted token secrets, and the persisted cache record.

pub mod credentials;
pub mod record;
pub mod secret;

pub use credentials::*;
pub use record::*;
pub use secret::*;
