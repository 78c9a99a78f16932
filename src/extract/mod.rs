//! Text-level slicing of manifests.
//!
//! - [`sections`]: pulls recognized dependency tables out of a document.
//! - [`groups`]: splits one table into blank-line separated, bracket-aware groups.

pub mod groups;
pub mod sections;

pub use groups::GroupSplitter;
pub use sections::SectionExtractor;
