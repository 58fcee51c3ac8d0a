//! Template stores: where template text comes from.

mod directory;
mod layered;
mod memory;

pub use directory::DirectoryTemplates;
pub use layered::LayeredTemplates;
pub use memory::InMemoryTemplates;
