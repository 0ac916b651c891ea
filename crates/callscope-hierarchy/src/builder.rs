//! Depth-first construction of incoming and outgoing call hierarchies.
//!
//! One [`HierarchyBuilder::build`] call runs one traversal session. The
//! session owns the id counter, the cache of finished nodes and the set of
//! ancestors still being expanded; none of it outlives the call.
//!
//! A finished entity is never expanded twice in the same session: reaching
//! it again shares the cached node. Edges back to the entity itself or to an
//! ancestor that is still being expanded are dropped, so cyclic call graphs
//! terminate. Recursion depth is bounded by the stack of the calling thread,
//! measured before each expansion, and by an optional user cap. Running out
//! of either unwinds to the outermost call, which salvages the most recently
//! completed subtree when there is one.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use callscope_config::Config;
use tracing::{debug, error, warn};

use crate::entity::{CallableEntity, EntityKey, TextSpan};
use crate::error::{BuildFailure, ServiceError};
use crate::node::{HierarchyNode, LineCharacter, NodeDetails, NodeId, SourceRange};
use crate::service::ResolutionService;

const BUILDER_TARGET: &str = "callscope_hierarchy::builder";

/// Id of the first entity expanded by a session. Id 0 belongs to the
/// synthetic call-site root.
const FIRST_ENTITY_ID: NodeId = 1;

/// Stack that must remain free before another expansion starts. Covers one
/// expansion frame plus the service calls made from it.
const STACK_RED_ZONE: usize = 256 * 1024;

/// Depth cap used when the platform cannot report the remaining stack.
const UNMEASURED_STACK_LIMIT: usize = 256;

/// Which relation a hierarchy follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Follow callers: who calls this entity.
    Incoming,
    /// Follow callees: what this entity calls.
    Outgoing,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        };
        f.write_str(label)
    }
}

/// Resource limits applied to one traversal.
///
/// The remaining stack of the building thread is always checked. A recursion
/// cap can additionally stop a traversal at a fixed depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalLimits {
    recursion_limit: Option<usize>,
}

impl TraversalLimits {
    /// Creates limits that stop after `recursion_limit` nested expansions.
    #[must_use]
    pub const fn new(recursion_limit: usize) -> Self {
        Self {
            recursion_limit: Some(recursion_limit),
        }
    }

    /// Creates limits bounded only by the available stack.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            recursion_limit: None,
        }
    }

    /// Reads the limits from the shared configuration. A configured limit of
    /// zero leaves the depth uncapped.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        match config.recursion_limit() {
            0 => Self::unbounded(),
            limit => Self::new(limit),
        }
    }

    /// Returns the recursion cap, if any.
    #[must_use]
    pub const fn recursion_limit(&self) -> Option<usize> {
        self.recursion_limit
    }
}

/// Result of one build.
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// The whole reachable hierarchy was built.
    Built(HierarchyNode),
    /// The stack or the recursion cap ran out; this is the last subtree that
    /// completed.
    PartialBuilt(HierarchyNode),
    /// Nothing usable could be built.
    Unbuildable(BuildFailure),
}

impl BuildOutcome {
    /// Returns the built node for `Built` and `PartialBuilt`.
    #[must_use]
    pub fn into_node(self) -> Option<HierarchyNode> {
        match self {
            Self::Built(node) | Self::PartialBuilt(node) => Some(node),
            Self::Unbuildable(_) => None,
        }
    }

    /// Returns whether the outcome is a salvaged partial tree.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::PartialBuilt(_))
    }
}

/// Builds hierarchies in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyBuilder {
    direction: Direction,
    limits: TraversalLimits,
}

impl HierarchyBuilder {
    /// Creates a builder following `direction`.
    #[must_use]
    pub const fn new(direction: Direction, limits: TraversalLimits) -> Self {
        Self { direction, limits }
    }

    /// Creates a builder that expands callers.
    #[must_use]
    pub const fn incoming(limits: TraversalLimits) -> Self {
        Self::new(Direction::Incoming, limits)
    }

    /// Creates a builder that expands callees.
    #[must_use]
    pub const fn outgoing(limits: TraversalLimits) -> Self {
        Self::new(Direction::Outgoing, limits)
    }

    /// Returns the direction this builder follows.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Builds the hierarchy rooted at `root`.
    ///
    /// Failures never escape: service errors and stack exhaustion are logged
    /// and reported through the outcome.
    pub fn build<S: ResolutionService>(
        &self,
        service: &mut S,
        root: &CallableEntity,
    ) -> BuildOutcome {
        let mut session = Traversal::new(service, *self);
        let first_id = session.allocate_id();
        let expanded = session.expand(root, root.key(), first_id);
        let salvaged = session.last_completed.take();
        drop(session);

        match expanded {
            Ok(node) => BuildOutcome::Built(Arc::unwrap_or_clone(node)),
            Err(ExpandError::Exhausted { depth }) => {
                warn!(
                    target: BUILDER_TARGET,
                    direction = %self.direction,
                    root = %root.key(),
                    depth,
                    recovered = salvaged.is_some(),
                    "traversal stack exhausted"
                );
                salvaged.map_or(
                    BuildOutcome::Unbuildable(BuildFailure::ResourceExhaustion { depth }),
                    |node| BuildOutcome::PartialBuilt(Arc::unwrap_or_clone(node)),
                )
            }
            Err(ExpandError::Service { entity, source }) => {
                error!(
                    target: BUILDER_TARGET,
                    direction = %self.direction,
                    root = %root.key(),
                    entity = %entity,
                    error = %source,
                    "hierarchy expansion failed"
                );
                BuildOutcome::Unbuildable(BuildFailure::Service { entity, source })
            }
        }
    }
}

/// Failure that aborts a whole traversal.
enum ExpandError {
    Exhausted { depth: usize },
    Service { entity: String, source: ServiceError },
}

impl ExpandError {
    fn service(entity: &CallableEntity, source: ServiceError) -> Self {
        Self::Service {
            entity: format!("{} ({})", entity.name(), entity.key()),
            source,
        }
    }
}

/// State of one in-flight build.
struct Traversal<'s, S> {
    service: &'s mut S,
    direction: Direction,
    recursion_limit: Option<usize>,
    depth: usize,
    next_id: NodeId,
    cache: HashMap<EntityKey, Arc<HierarchyNode>>,
    in_progress: HashSet<EntityKey>,
    last_completed: Option<Arc<HierarchyNode>>,
}

impl<'s, S: ResolutionService> Traversal<'s, S> {
    fn new(service: &'s mut S, builder: HierarchyBuilder) -> Self {
        Self {
            service,
            direction: builder.direction,
            recursion_limit: builder.limits.recursion_limit(),
            depth: 0,
            next_id: FIRST_ENTITY_ID,
            cache: HashMap::new(),
            in_progress: HashSet::new(),
            last_completed: None,
        }
    }

    const fn allocate_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Returns the node for a related entity, expanding it on first sight.
    ///
    /// `None` means the edge closes a cycle through an ancestor.
    fn visit(
        &mut self,
        entity: &CallableEntity,
        key: EntityKey,
    ) -> Result<Option<Arc<HierarchyNode>>, ExpandError> {
        if let Some(cached) = self.cache.get(&key) {
            return Ok(Some(Arc::clone(cached)));
        }
        if self.in_progress.contains(&key) {
            debug!(
                target: BUILDER_TARGET,
                entity = %key,
                "dropping edge back to an ancestor"
            );
            return Ok(None);
        }
        let id = self.allocate_id();
        self.expand(entity, key, id).map(Some)
    }

    fn expand(
        &mut self,
        entity: &CallableEntity,
        key: EntityKey,
        id: NodeId,
    ) -> Result<Arc<HierarchyNode>, ExpandError> {
        if self.stack_exhausted() {
            return Err(ExpandError::Exhausted { depth: self.depth });
        }

        let related = self.related(entity)?;
        let has_children = !related.is_empty();

        self.in_progress.insert(key.clone());
        self.depth = self.depth.saturating_add(1);
        let children = self.expand_all(&key, related);
        self.depth = self.depth.saturating_sub(1);
        self.in_progress.remove(&key);
        let children = children?;

        let details =
            entity_details(self.service, entity).map_err(|err| ExpandError::service(entity, err))?;
        let node = Arc::new(HierarchyNode::new(id, details, has_children, children));
        self.cache.insert(key, Arc::clone(&node));
        self.last_completed = Some(Arc::clone(&node));
        Ok(node)
    }

    fn stack_exhausted(&self) -> bool {
        if self
            .recursion_limit
            .is_some_and(|limit| self.depth >= limit)
        {
            return true;
        }
        stacker::remaining_stack().map_or(self.depth >= UNMEASURED_STACK_LIMIT, |left| {
            left < STACK_RED_ZONE
        })
    }

    fn expand_all(
        &mut self,
        parent: &EntityKey,
        related: Vec<CallableEntity>,
    ) -> Result<Vec<Arc<HierarchyNode>>, ExpandError> {
        let mut children = Vec::with_capacity(related.len());
        for target in related {
            let key = target.key();
            if key == *parent {
                debug!(target: BUILDER_TARGET, entity = %key, "dropping self-call");
                continue;
            }
            if let Some(child) = self.visit(&target, key)? {
                children.push(child);
            }
        }
        Ok(children)
    }

    fn related(&mut self, entity: &CallableEntity) -> Result<Vec<CallableEntity>, ExpandError> {
        let file = entity.file();
        let offset = entity.selection_span().start;
        let related = match self.direction {
            Direction::Incoming => self
                .service
                .callers_of(file, offset)
                .map(|calls| calls.into_iter().map(|call| call.from).collect()),
            Direction::Outgoing => self
                .service
                .callees_of(file, offset)
                .map(|calls| calls.into_iter().map(|call| call.to).collect()),
        };
        related.map_err(|err| ExpandError::service(entity, err))
    }
}

fn entity_details<S: ResolutionService>(
    service: &mut S,
    entity: &CallableEntity,
) -> Result<NodeDetails, ServiceError> {
    let source = service.source_file(entity.file())?;
    Ok(NodeDetails {
        name: entity.name().to_owned(),
        kind: entity.kind(),
        modifiers: entity.modifiers().map(str::to_owned),
        container: entity.container().map(str::to_owned),
        file: entity.file().to_owned(),
        range: present_span(service, &source, entity.span())?,
        selection_range: present_span(service, &source, entity.selection_span())?,
    })
}

/// Maps a byte span to a presented range: lines become 1-based, characters
/// stay 0-based.
pub(crate) fn present_span<S: ResolutionService>(
    service: &S,
    source: &S::Source,
    span: TextSpan,
) -> Result<SourceRange, ServiceError> {
    let start = service.line_and_character_of(source, span.start)?;
    let end = service.line_and_character_of(source, span.end())?;
    Ok(SourceRange::new(
        LineCharacter::from_service(start.line, start.character),
        LineCharacter::from_service(end.line, end.character),
    ))
}
