//! Rewrites deprecated design tokens in JavaScript and TypeScript modules.
//!
//! Usages are found on props of tracked components (`<Box background="card">`),
//! in arguments of tracked style functions (`atoms({ boxShadow: ... })`) and in
//! member chains into the theme variables (`vars.borderColor.standard`).
//! Values are followed through local variables; anything that cannot be
//! followed safely is reported as a [`Warning`] instead of rewritten.

pub mod batch;
pub mod bindings;
pub mod code_frame;
pub mod config;
pub mod deprecations;
pub mod error;
pub mod resolver;
pub mod rewrite;
pub mod transform;
pub mod visitors;
pub mod warning;

pub use batch::{BatchReport, FileReport};
pub use code_frame::{render_code_frame, SourceSpan};
pub use config::CodemodConfig;
pub use deprecations::{DeprecationNode, DeprecationTable};
pub use error::CodemodError;
pub use transform::{Codemod, FormatFilter, TransformOutput};
pub use warning::{Warning, WarningKind};
