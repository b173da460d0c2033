//! Blob store provider implementations.

pub mod local;
pub mod memory;
pub mod uploadthing;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use uploadthing::UploadThingBlobStore;
