//! Authorization rules for task and dependency operations.
//!
//! Access decisions flow through a single lookup table keyed by resource
//! kind and action. Each entry is a plain predicate function, and callers
//! pass the actor and resource explicitly, so every decision is
//! reproducible from its inputs alone.

use crate::domain::{DependencyEdge, Task, UserId};
use std::collections::HashMap;
use std::fmt;

/// The user performing an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// User identity
    pub user: UserId,

    /// Administrators pass every ownership check
    pub is_admin: bool,
}

impl Actor {
    /// Create a regular (non-admin) actor
    pub fn new(user: impl Into<UserId>) -> Self {
        Self {
            user: user.into(),
            is_admin: false,
        }
    }

    /// Create an administrator actor
    pub fn admin(user: impl Into<UserId>) -> Self {
        Self {
            user: user.into(),
            is_admin: true,
        }
    }
}

/// Operations that require an access decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Read a resource
    View,

    /// Add or remove dependency edges
    EditDependencies,

    /// Change a task's status
    UpdateStatus,

    /// Delete a resource
    Delete,
}

impl fmt::Display for Action {
    /// Verb phrase used in access denial messages
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::View => "view",
            Action::EditDependencies => "edit dependencies on",
            Action::UpdateStatus => "update the status of",
            Action::Delete => "delete",
        };
        write!(f, "{}", s)
    }
}

/// Kind of resource, used as half of the policy table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A task record
    Task,

    /// A dependency edge
    Edge,
}

/// The resource an action targets.
///
/// Edges are always accessed through the task that owns them, so the
/// edge variant carries both.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// A task record
    Task(&'a Task),

    /// A dependency edge together with its owning task
    Edge {
        edge: &'a DependencyEdge,
        owning_task: &'a Task,
    },
}

impl Resource<'_> {
    /// The kind used to look up the policy entry
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Task(_) => ResourceKind::Task,
            Resource::Edge { .. } => ResourceKind::Edge,
        }
    }

    /// The user who owns this resource
    pub fn owner(&self) -> &UserId {
        match self {
            Resource::Task(task) => &task.owner,
            Resource::Edge { owning_task, .. } => &owning_task.owner,
        }
    }

    /// Human-readable name used in access denial messages
    pub fn describe(&self) -> String {
        match self {
            Resource::Task(task) => format!("task {}", task.id),
            Resource::Edge { edge, owning_task } => {
                format!("dependency {} on task {}", edge.id, owning_task.id)
            }
        }
    }
}

/// An access predicate. Returns true when the actor may perform the
/// action on the resource.
pub type Predicate = fn(&Actor, &Resource<'_>) -> bool;

fn allow_any(_actor: &Actor, _resource: &Resource<'_>) -> bool {
    true
}

fn owner_or_admin(actor: &Actor, resource: &Resource<'_>) -> bool {
    actor.is_admin || resource.owner() == &actor.user
}

/// Policy table mapping (resource kind, action) pairs to predicates.
///
/// A missing entry denies the action. The default table allows anyone to
/// view, and restricts mutations to the resource owner or an admin.
#[derive(Clone)]
pub struct AccessPolicy {
    rules: HashMap<(ResourceKind, Action), Predicate>,
}

impl AccessPolicy {
    /// Create an empty policy that denies everything
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Add or replace a rule, returning the modified policy
    pub fn with_rule(mut self, kind: ResourceKind, action: Action, predicate: Predicate) -> Self {
        self.rules.insert((kind, action), predicate);
        self
    }

    /// Decide whether the actor may perform the action on the resource
    pub fn authorize(&self, actor: &Actor, resource: &Resource<'_>, action: Action) -> bool {
        match self.rules.get(&(resource.kind(), action)) {
            Some(predicate) => predicate(actor, resource),
            None => false,
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new()
            .with_rule(ResourceKind::Task, Action::View, allow_any)
            .with_rule(ResourceKind::Edge, Action::View, allow_any)
            .with_rule(ResourceKind::Task, Action::EditDependencies, owner_or_admin)
            .with_rule(ResourceKind::Edge, Action::EditDependencies, owner_or_admin)
            .with_rule(ResourceKind::Task, Action::UpdateStatus, owner_or_admin)
            .with_rule(ResourceKind::Task, Action::Delete, owner_or_admin)
    }
}

impl fmt::Debug for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessPolicy")
            .field("rules", &self.rules.len())
            .finish()
    }
}
