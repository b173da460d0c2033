//! Share domain entities.

pub mod code;
pub mod expiration;
pub mod file;
pub mod model;

pub use code::ShareCode;
pub use expiration::ExpirationPolicy;
pub use file::FileRecord;
pub use model::{NewShareEntry, ShareEntry};
