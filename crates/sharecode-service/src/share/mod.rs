//! Share lifecycle: code generation, registry operations, and blob purging.

pub mod code;
pub mod purge;
pub mod registry;

pub use code::{CodeSource, FixedCodeSource, TimeRandomCodeSource};
pub use purge::{BlobPurger, PurgeOutcome};
pub use registry::{GetMode, ShareRegistry};
