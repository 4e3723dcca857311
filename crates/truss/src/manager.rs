//! Authorization-aware orchestration over a task store.
//!
//! The manager is the mutation surface the rest of the application goes
//! through. It resolves tasks, consults the [`AccessPolicy`], and delegates
//! to the store, which enforces the structural graph invariants on every
//! write. The store is handed in at construction, so every decision the
//! manager makes is reproducible from its explicit inputs.
//!
//! # Batch Semantics
//!
//! Bulk operations never abort early. The anchor task is resolved and
//! authorized once for the whole batch; after that every candidate is
//! evaluated independently and its outcome is collected, so a mixed batch
//! reports exactly which candidates failed and why. Successful candidates
//! are persisted immediately, which means later candidates in the same
//! batch see the edges created by earlier ones.

use crate::auth::{AccessPolicy, Action, Actor, Resource};
use crate::domain::{
    DependencyEdge, DependencyKind, DependencyStats, EdgeId, NewTask, StartCheck, Task,
    TaskFilter, TaskId, TaskStatus, UnsatisfiedDependency, UserId,
};
use crate::error::{Error, Result};
use crate::storage::TaskStore;

/// Outcome of a bulk add: the edges that were created plus one entry per
/// rejected candidate.
#[derive(Debug)]
pub struct BulkAddResult {
    pub created: Vec<DependencyEdge>,
    pub errors: Vec<BatchError>,
}

/// Outcome of a bulk remove: the edges that were removed plus one entry per
/// rejected candidate.
#[derive(Debug)]
pub struct BulkRemoveResult {
    pub removed: Vec<DependencyEdge>,
    pub errors: Vec<BatchError>,
}

/// A single rejected candidate in a bulk operation.
#[derive(Debug)]
pub struct BatchError {
    /// The candidate that failed: a task ID for adds, an edge ID for removals.
    pub target: String,
    pub error: Error,
}

/// Orchestrates task and dependency mutations with access checks.
///
/// All mutating operations take the acting user explicitly. The manager
/// resolves the affected task first, so a caller probing a missing task
/// gets [`Error::TaskNotFound`] rather than an access error, and an
/// unauthorized caller gets [`Error::AccessDenied`] before any write
/// happens.
pub struct DependencyManager {
    store: Box<dyn TaskStore>,
    policy: AccessPolicy,
}

impl std::fmt::Debug for DependencyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyManager")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl DependencyManager {
    /// Create a manager over `store` with the default access policy.
    pub fn new(store: Box<dyn TaskStore>) -> Self {
        Self {
            store,
            policy: AccessPolicy::default(),
        }
    }

    /// Create a manager with a caller-supplied access policy.
    pub fn with_policy(store: Box<dyn TaskStore>, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    /// Read access to the underlying store, for persistence helpers that
    /// operate on the trait object directly.
    pub fn store(&self) -> &dyn TaskStore {
        self.store.as_ref()
    }

    // ===== Task operations =====

    /// Create a new task owned by the acting user.
    pub async fn create_task(&mut self, actor: &Actor, title: String) -> Result<Task> {
        let new_task = NewTask {
            title,
            owner: actor.user.clone(),
        };
        self.store.create_task(new_task).await
    }

    /// Fetch a task, or fail with [`Error::TaskNotFound`].
    pub async fn get_task(&self, actor: &Actor, id: &TaskId) -> Result<Task> {
        let task = self.resolve(id).await?;
        self.check(actor, &Resource::Task(&task), Action::View)?;
        Ok(task)
    }

    /// Change a task's status. Only the owner (or an admin) may do this.
    pub async fn set_status(
        &mut self,
        actor: &Actor,
        id: &TaskId,
        status: TaskStatus,
    ) -> Result<Task> {
        let task = self.resolve(id).await?;
        self.check(actor, &Resource::Task(&task), Action::UpdateStatus)?;
        self.store.set_status(id, status).await
    }

    /// Delete a task. Fails with [`Error::HasDependents`] while other tasks
    /// still depend on it.
    pub async fn delete_task(&mut self, actor: &Actor, id: &TaskId) -> Result<()> {
        let task = self.resolve(id).await?;
        self.check(actor, &Resource::Task(&task), Action::Delete)?;
        self.store.delete_task(id).await
    }

    /// List tasks matching `filter`, most recently created first.
    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.store.list_tasks(filter).await
    }

    // ===== Dependency operations =====

    /// Record that `task_id` depends on `depends_on_id`.
    ///
    /// Checks run in a fixed order, so the caller always sees the most
    /// specific error: the dependent task must exist, the actor must be
    /// allowed to edit its dependencies, the edge must not be a self-loop,
    /// the dependency task must exist, the pair must not already be linked,
    /// and the new edge must not close a cycle.
    pub async fn add_dependency(
        &mut self,
        actor: &Actor,
        task_id: &TaskId,
        depends_on_id: &TaskId,
        kind: DependencyKind,
    ) -> Result<DependencyEdge> {
        let task = self.resolve(task_id).await?;
        self.check(actor, &Resource::Task(&task), Action::EditDependencies)?;
        self.add_edge_checked(task_id, depends_on_id, kind).await
    }

    /// Remove the dependency edge `edge_id` from `task_id`.
    ///
    /// An edge that exists but belongs to a different task is reported as
    /// [`Error::EdgeNotFound`], the same as a missing edge.
    pub async fn remove_dependency(
        &mut self,
        actor: &Actor,
        task_id: &TaskId,
        edge_id: &EdgeId,
    ) -> Result<DependencyEdge> {
        let task = self.resolve(task_id).await?;

        let edge = match self.store.get_edge(edge_id).await? {
            Some(edge) if edge.task_id == *task_id => edge,
            _ => {
                return Err(Error::EdgeNotFound {
                    edge_id: edge_id.clone(),
                    task_id: task_id.clone(),
                });
            }
        };

        self.check(
            actor,
            &Resource::Edge {
                edge: &edge,
                owning_task: &task,
            },
            Action::EditDependencies,
        )?;

        self.store.remove_edge(task_id, edge_id).await
    }

    /// Add dependencies on every task in `depends_on`, all with the same
    /// kind.
    ///
    /// The anchor task is resolved and authorized once; a failure there
    /// fails the whole call. Each candidate is then checked independently
    /// and rejected candidates land in `errors` while the rest are
    /// persisted, so one bad candidate never sinks the batch.
    pub async fn bulk_add(
        &mut self,
        actor: &Actor,
        task_id: &TaskId,
        depends_on: &[TaskId],
        kind: DependencyKind,
    ) -> Result<BulkAddResult> {
        let task = self.resolve(task_id).await?;
        self.check(actor, &Resource::Task(&task), Action::EditDependencies)?;

        let mut result = BulkAddResult {
            created: Vec::new(),
            errors: Vec::new(),
        };

        for depends_on_id in depends_on {
            match self.add_edge_checked(task_id, depends_on_id, kind).await {
                Ok(edge) => result.created.push(edge),
                Err(error) => result.errors.push(BatchError {
                    target: depends_on_id.to_string(),
                    error,
                }),
            }
        }

        Ok(result)
    }

    /// Remove every edge in `edge_ids` from `task_id`.
    ///
    /// Mirrors [`bulk_add`](Self::bulk_add): the anchor task is resolved
    /// and authorized once, then each edge is removed independently. An
    /// edge that is missing or belongs to a different task is reported as
    /// an error entry, never silently skipped.
    pub async fn bulk_remove(
        &mut self,
        actor: &Actor,
        task_id: &TaskId,
        edge_ids: &[EdgeId],
    ) -> Result<BulkRemoveResult> {
        let task = self.resolve(task_id).await?;
        self.check(actor, &Resource::Task(&task), Action::EditDependencies)?;

        let mut result = BulkRemoveResult {
            removed: Vec::new(),
            errors: Vec::new(),
        };

        for edge_id in edge_ids {
            let outcome = match self.store.get_edge(edge_id).await {
                Ok(Some(edge)) if edge.task_id == *task_id => {
                    self.store.remove_edge(task_id, edge_id).await
                }
                Ok(_) => Err(Error::EdgeNotFound {
                    edge_id: edge_id.clone(),
                    task_id: task_id.clone(),
                }),
                Err(error) => Err(error),
            };

            match outcome {
                Ok(edge) => result.removed.push(edge),
                Err(error) => result.errors.push(BatchError {
                    target: edge_id.to_string(),
                    error,
                }),
            }
        }

        Ok(result)
    }

    // ===== Queries =====

    /// Check whether a task is clear to start.
    ///
    /// A task can start when every one of its blocking edges points at a
    /// completed task. The returned [`StartCheck`] carries the unsatisfied
    /// blocking edges with the current status of each dependency, so the
    /// caller can tell the user exactly what is in the way.
    pub async fn can_start(&self, task_id: &TaskId) -> Result<StartCheck> {
        let task = self.resolve(task_id).await?;

        let mut unsatisfied = Vec::new();
        for edge in self.store.blocking_edges(task_id).await? {
            let dependency = self.resolve(&edge.depends_on_id).await?;
            if !dependency.status.satisfies_dependency() {
                unsatisfied.push(UnsatisfiedDependency {
                    edge,
                    dependency_status: dependency.status,
                });
            }
        }

        Ok(StartCheck {
            task_id: task.id,
            can_start: unsatisfied.is_empty(),
            unsatisfied,
        })
    }

    /// Dependency counts across all tasks owned by `owner`.
    ///
    /// `satisfied` and `unsatisfied` partition the full edge set;
    /// `blocking` counts edges of blocking kind independently.
    pub async fn stats(&self, owner: &UserId) -> Result<DependencyStats> {
        let filter = TaskFilter {
            owner: Some(owner.clone()),
            ..Default::default()
        };

        let mut stats = DependencyStats::default();
        for task in self.store.list_tasks(&filter).await? {
            for edge in self.store.outgoing_edges(&task.id).await? {
                stats.total += 1;
                if edge.kind.is_blocking() {
                    stats.blocking += 1;
                }
                let dependency = self.resolve(&edge.depends_on_id).await?;
                if dependency.status.satisfies_dependency() {
                    stats.satisfied += 1;
                } else {
                    stats.unsatisfied += 1;
                }
            }
        }

        Ok(stats)
    }

    /// Open tasks with no unsatisfied blocking dependencies, optionally
    /// limited to one owner. Completed and cancelled tasks are never
    /// listed, satisfied or not.
    pub async fn ready_tasks(&self, owner: Option<&UserId>) -> Result<Vec<Task>> {
        let filter = TaskFilter {
            owner: owner.cloned(),
            ..Default::default()
        };

        let mut ready = Vec::new();
        for task in self.store.list_tasks(&filter).await? {
            if !task.status.is_open() {
                continue;
            }
            if self.can_start(&task.id).await?.can_start {
                ready.push(task);
            }
        }

        Ok(ready)
    }

    /// Open tasks that cannot start yet, each paired with the tasks
    /// holding them up.
    pub async fn blocked_tasks(&self, owner: Option<&UserId>) -> Result<Vec<(Task, Vec<Task>)>> {
        let filter = TaskFilter {
            owner: owner.cloned(),
            ..Default::default()
        };

        let mut blocked = Vec::new();
        for task in self.store.list_tasks(&filter).await? {
            if !task.status.is_open() {
                continue;
            }
            let check = self.can_start(&task.id).await?;
            if check.can_start {
                continue;
            }

            let mut blockers = Vec::new();
            for unsatisfied in &check.unsatisfied {
                blockers.push(self.resolve(&unsatisfied.edge.depends_on_id).await?);
            }
            blocked.push((task, blockers));
        }

        Ok(blocked)
    }

    /// All outgoing dependency edges of a task.
    pub async fn dependencies(&self, id: &TaskId) -> Result<Vec<DependencyEdge>> {
        self.store.outgoing_edges(id).await
    }

    /// All edges pointing at a task, i.e. the tasks that depend on it.
    pub async fn dependents(&self, id: &TaskId) -> Result<Vec<DependencyEdge>> {
        self.store.incoming_edges(id).await
    }

    /// The transitive dependency tree of a task, breadth-first with depths.
    pub async fn dependency_tree(
        &self,
        id: &TaskId,
        max_depth: Option<usize>,
    ) -> Result<Vec<(DependencyEdge, usize)>> {
        self.store.dependency_tree(id, max_depth).await
    }

    // ===== Persistence =====

    /// Flush the store to its backing file, if it has one.
    pub async fn save(&self) -> Result<()> {
        self.store.save().await
    }

    /// Re-read the store from its backing file, if it has one.
    pub async fn reload(&mut self) -> Result<()> {
        self.store.reload().await
    }

    // ===== Internals =====

    async fn resolve(&self, id: &TaskId) -> Result<Task> {
        self.store
            .get_task(id)
            .await?
            .ok_or_else(|| Error::TaskNotFound(id.clone()))
    }

    fn check(&self, actor: &Actor, resource: &Resource<'_>, action: Action) -> Result<()> {
        if self.policy.authorize(actor, resource, action) {
            Ok(())
        } else {
            Err(Error::AccessDenied {
                actor: actor.user.clone(),
                action: action.to_string(),
                resource: resource.describe(),
            })
        }
    }

    /// Shared validation tail of single and bulk adds. Assumes the anchor
    /// task has already been resolved and the actor authorized.
    async fn add_edge_checked(
        &mut self,
        task_id: &TaskId,
        depends_on_id: &TaskId,
        kind: DependencyKind,
    ) -> Result<DependencyEdge> {
        if task_id == depends_on_id {
            return Err(Error::SelfDependency(task_id.clone()));
        }

        self.resolve(depends_on_id).await?;

        if self.store.find_edge(task_id, depends_on_id).await?.is_some() {
            return Err(Error::DuplicateDependency {
                task_id: task_id.clone(),
                depends_on_id: depends_on_id.clone(),
            });
        }

        if self.store.would_create_cycle(task_id, depends_on_id).await? {
            return Err(Error::CycleDetected {
                task_id: task_id.clone(),
                depends_on_id: depends_on_id.clone(),
            });
        }

        self.store.add_edge(task_id, depends_on_id, kind).await
    }
}
