//! Entry types.

mod id;
mod kernel;

pub use id::Id;
pub use kernel::EntryKernel;
