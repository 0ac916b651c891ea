//! Incoming and outgoing call hierarchies for a single call site.
//!
//! Given a call site, this crate asks a symbol resolution service which
//! callable the site names and then walks the service's "who calls this" or
//! "what does this call" relation transitively, producing a deduplicated,
//! cycle-safe tree annotated with subtree heights.
//!
//! # Core Types
//!
//! - [`CallableEntity`] - A function, method or other callable located by
//!   file and byte span
//! - [`HierarchyNode`] - A node of the presented tree
//! - [`HierarchyBuilder`] - The depth-first traversal, one per direction
//! - [`CallHierarchy`] - Public entry points wrapping the built tree under a
//!   synthetic call-site root
//!
//! # Services
//!
//! The [`ResolutionService`] trait abstracts over the program analysis that
//! answers resolution queries. [`LspResolutionService`] implements it on top
//! of a language server's `textDocument/callHierarchy` support.
//!
//! # Example
//!
//! ```ignore
//! use callscope_hierarchy::{CallHierarchy, CallSite, LspResolutionService, TextSpan};
//!
//! let service = LspResolutionService::new(lsp_client);
//! let mut hierarchy = CallHierarchy::from_config(service, &config);
//!
//! let site = CallSite::new("/src/app.ts", TextSpan::new(120, 9), "render()");
//! if let Some(tree) = hierarchy.incoming(&site) {
//!     for node in tree.root().descendants() {
//!         // Present node
//!     }
//! }
//! ```

mod builder;
mod entity;
mod error;
mod hierarchy;
mod lsp;
pub mod metrics;
mod node;
mod resolver;
mod service;
mod source;
mod uri;

pub use builder::{BuildOutcome, Direction, HierarchyBuilder, TraversalLimits};
pub use entity::{CallableEntity, EntityKey, SymbolKind, TextSpan};
pub use error::{BuildFailure, ServiceError};
pub use hierarchy::{CALL_SITE_ID, CallHierarchy};
pub use lsp::{CallHierarchyClient, LspResolutionService};
pub use node::{
    Descendants, HierarchyNode, HierarchyTree, LineCharacter, NodeDetails, NodeId, SourceRange,
};
pub use resolver::{CallSite, Resolution, resolve};
pub use service::{IncomingCall, OutgoingCall, ResolutionService, ServicePosition};
pub use source::SourceText;
pub use uri::{path_to_uri, uri_to_path};

#[cfg(test)]
mod tests;
