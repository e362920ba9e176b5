//! Domain logic - pure version and tag rules independent of git operations

pub mod branch;
pub mod metadata;
pub mod tag;
pub mod version;

pub use branch::BranchContext;
pub use metadata::Metadata;
pub use tag::Tag;
pub use version::{Version, VersionPart};
