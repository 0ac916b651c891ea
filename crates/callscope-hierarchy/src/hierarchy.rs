//! Public entry points: call site in, presented hierarchy out.

use std::sync::Arc;

use callscope_config::Config;
use tracing::{debug, warn};

use crate::builder::{Direction, HierarchyBuilder, TraversalLimits, present_span};
use crate::entity::SymbolKind;
use crate::error::ServiceError;
use crate::node::{HierarchyNode, HierarchyTree, NodeDetails, NodeId};
use crate::resolver::{self, CallSite};
use crate::service::ResolutionService;

const HIERARCHY_TARGET: &str = "callscope_hierarchy::hierarchy";

/// Id of the synthetic call-site root.
pub const CALL_SITE_ID: NodeId = 0;

/// Incoming and outgoing hierarchies backed by one resolution service.
///
/// Every request runs its own traversal session, so nothing carries over from
/// one hierarchy to the next.
#[derive(Debug)]
pub struct CallHierarchy<S> {
    service: S,
    limits: TraversalLimits,
}

impl<S> CallHierarchy<S> {
    /// Creates hierarchies over `service` with the given limits.
    #[must_use]
    pub const fn new(service: S, limits: TraversalLimits) -> Self {
        Self { service, limits }
    }

    /// Creates hierarchies over `service` with limits read from `config`.
    #[must_use]
    pub const fn from_config(service: S, config: &Config) -> Self {
        Self::new(service, TraversalLimits::from_config(config))
    }

    /// Returns the traversal limits.
    #[must_use]
    pub const fn limits(&self) -> TraversalLimits {
        self.limits
    }

    /// Returns the underlying service.
    #[must_use]
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// Consumes the hierarchy and returns the service.
    #[must_use]
    pub fn into_service(self) -> S {
        self.service
    }
}

impl<S: ResolutionService> CallHierarchy<S> {
    /// Builds the tree of everything that transitively calls the callable
    /// named at `site`.
    ///
    /// Returns `None` when no hierarchy is available.
    pub fn incoming(&mut self, site: &CallSite) -> Option<HierarchyTree> {
        self.hierarchy(site, Direction::Incoming)
    }

    /// Builds the tree of everything the callable named at `site`
    /// transitively calls.
    ///
    /// Returns `None` when no hierarchy is available.
    pub fn outgoing(&mut self, site: &CallSite) -> Option<HierarchyTree> {
        self.hierarchy(site, Direction::Outgoing)
    }

    fn hierarchy(&mut self, site: &CallSite, direction: Direction) -> Option<HierarchyTree> {
        let entity = resolver::resolve(&mut self.service, site).into_entity()?;

        let outcome =
            HierarchyBuilder::new(direction, self.limits).build(&mut self.service, &entity);
        let partial = outcome.is_partial();
        let Some(subtree) = outcome.into_node() else {
            debug!(
                target: HIERARCHY_TARGET,
                call_site = %site,
                %direction,
                "no hierarchy available"
            );
            return None;
        };

        let details = match call_site_details(&mut self.service, site) {
            Ok(details) => details,
            Err(error) => {
                warn!(
                    target: HIERARCHY_TARGET,
                    call_site = %site,
                    %error,
                    "failed to map call site range"
                );
                return None;
            }
        };

        let mut root = HierarchyNode::new(CALL_SITE_ID, details, true, Vec::new());
        root.push_child(Arc::new(subtree));
        Some(HierarchyTree::new(root, partial))
    }
}

fn call_site_details<S: ResolutionService>(
    service: &mut S,
    site: &CallSite,
) -> Result<NodeDetails, ServiceError> {
    let source = service.source_file(site.file())?;
    let range = present_span(service, &source, site.span())?;
    Ok(NodeDetails {
        name: site.name().to_owned(),
        kind: SymbolKind::CallSite,
        modifiers: None,
        container: None,
        file: site.file().to_owned(),
        range,
        selection_range: range,
    })
}
