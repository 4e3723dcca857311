//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use std::collections::HashMap;

use anyhow::Result;

use super::args::{
    BlockedArgs, CanStartArgs, DepAction, DepArgs, InitArgs, ReadyArgs, StatsArgs, TaskAction,
    TaskArgs,
};
use crate::auth::Actor;
use crate::domain::{DependencyEdge, TaskId, TaskStatus};
use crate::output::{DepTreeNode, OutputMode};

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;

    if !args.quiet {
        println!(
            "Initializing truss repository{}...",
            args.prefix
                .as_ref()
                .map(|p| format!(" with prefix '{}'", p))
                .unwrap_or_default()
        );
    }

    let result = init::init(&current_dir, args.prefix.as_deref(), args.actor.as_deref()).await?;

    if !args.quiet {
        println!("Initialized truss in {}", result.truss_dir.display());
        println!("  Config: {}", result.config_file.display());
        println!("  Tasks:  {}", result.tasks_file.display());
        println!("  Task prefix: {}", result.prefix);
        println!("  Default actor: {}", result.default_actor);
    }

    Ok(())
}

/// Execute the task command
pub async fn execute_task(
    app: &mut crate::app::App,
    actor: &Actor,
    args: &TaskArgs,
    output_mode: OutputMode,
) -> Result<()> {
    use crate::domain::{TaskFilter, UserId};
    use crate::output;

    match &args.action {
        TaskAction::Add { title } => {
            let task = app.manager_mut().create_task(actor, title.clone()).await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_task(&task, output_mode)?,
                OutputMode::Text => {
                    println!("Created task: {}", task.id);
                }
            }
        }
        TaskAction::List {
            status,
            owner,
            limit,
        } => {
            let filter = TaskFilter {
                status: status.map(|s| s.into()),
                owner: owner.clone().map(UserId::new),
                limit: Some(*limit),
            };

            let tasks = app.manager().list_tasks(&filter).await?;
            output::print_tasks(&tasks, output_mode)?;
        }
        TaskAction::Show { task_id } => {
            let id = TaskId::new(task_id.as_str());
            let task = app.manager().get_task(actor, &id).await?;
            let deps = app.manager().dependencies(&id).await?;
            let dependents = app.manager().dependents(&id).await?;

            output::print_task_details(&task, &deps, &dependents, output_mode)?;
        }
        TaskAction::Start { task_id } => {
            set_status_and_report(
                app,
                actor,
                task_id,
                TaskStatus::InProgress,
                "Started",
                output_mode,
            )
            .await?;
        }
        TaskAction::Done { task_id } => {
            set_status_and_report(
                app,
                actor,
                task_id,
                TaskStatus::Completed,
                "Completed",
                output_mode,
            )
            .await?;
        }
        TaskAction::Cancel { task_id } => {
            set_status_and_report(
                app,
                actor,
                task_id,
                TaskStatus::Cancelled,
                "Cancelled",
                output_mode,
            )
            .await?;
        }
        TaskAction::Reopen { task_id } => {
            set_status_and_report(
                app,
                actor,
                task_id,
                TaskStatus::Pending,
                "Reopened",
                output_mode,
            )
            .await?;
        }
        TaskAction::Delete { task_id, force } => {
            let id = TaskId::new(task_id.as_str());
            let task = app.manager().get_task(actor, &id).await?;

            // Confirm deletion unless --force is used
            if !force {
                eprint!("Delete task '{}' ({})? [y/N]: ", task.id, task.title);
                let mut input = String::new();
                std::io::stdin().read_line(&mut input)?;
                let response = input.trim().to_lowercase();
                if response != "y" && response != "yes" {
                    println!("Deletion cancelled.");
                    return Ok(());
                }
            }

            app.manager_mut().delete_task(actor, &id).await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => {
                    output::print_json(&serde_json::json!({
                        "deleted": task_id,
                        "status": "success"
                    }))?;
                }
                OutputMode::Text => {
                    println!("Deleted task: {}", task_id);
                }
            }
        }
    }

    Ok(())
}

/// Change a task's status and report the outcome.
async fn set_status_and_report(
    app: &mut crate::app::App,
    actor: &Actor,
    task_id: &str,
    status: TaskStatus,
    verb: &str,
    output_mode: OutputMode,
) -> Result<()> {
    use crate::output;

    let id = TaskId::new(task_id);
    let task = app.manager_mut().set_status(actor, &id, status).await?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_task(&task, output_mode)?,
        OutputMode::Text => {
            println!("{} task: {}", verb, task.id);
        }
    }

    Ok(())
}

/// Execute the dep command
///
/// # Batch Processing (for Add/Remove with several targets)
///
/// Each candidate is processed independently inside the manager:
/// - A rejected candidate lands in the error list and never rolls back the rest
/// - Accepted edges are persisted together after the batch completes
/// - Exit code is non-zero if any failures occurred
pub async fn execute_dep(
    app: &mut crate::app::App,
    actor: &Actor,
    args: &DepArgs,
    output_mode: OutputMode,
) -> Result<()> {
    use crate::domain::EdgeId;
    use crate::output;

    match &args.action {
        DepAction::Add {
            task_id,
            depends_on,
            kind,
        } => {
            let id = TaskId::new(task_id.as_str());

            if let [target] = depends_on.as_slice() {
                let dep_id = TaskId::new(target.as_str());
                let edge = app
                    .manager_mut()
                    .add_dependency(actor, &id, &dep_id, (*kind).into())
                    .await?;
                app.save().await?;

                match output_mode {
                    OutputMode::Json => {
                        output::print_json(&serde_json::json!({
                            "action": "add",
                            "edge": edge,
                            "status": "success"
                        }))?;
                    }
                    OutputMode::Text => {
                        println!(
                            "Added dependency: {} --[{}]--> {}  [{}]",
                            task_id, kind, target, edge.id
                        );
                    }
                }
            } else {
                let dep_ids: Vec<TaskId> = depends_on
                    .iter()
                    .map(|s| TaskId::new(s.as_str()))
                    .collect();

                let result = app
                    .manager_mut()
                    .bulk_add(actor, &id, &dep_ids, (*kind).into())
                    .await?;
                app.save().await?;

                output::print_bulk_add(&result, output_mode)?;

                if !result.errors.is_empty() {
                    anyhow::bail!(
                        "{} of {} dependency add(s) failed",
                        result.errors.len(),
                        depends_on.len()
                    );
                }
            }
        }
        DepAction::Remove { task_id, edge_ids } => {
            let id = TaskId::new(task_id.as_str());

            if let [target] = edge_ids.as_slice() {
                let edge_id = EdgeId::new(target.as_str());
                let edge = app
                    .manager_mut()
                    .remove_dependency(actor, &id, &edge_id)
                    .await?;
                app.save().await?;

                match output_mode {
                    OutputMode::Json => {
                        output::print_json(&serde_json::json!({
                            "action": "remove",
                            "edge": edge,
                            "status": "success"
                        }))?;
                    }
                    OutputMode::Text => {
                        println!(
                            "Removed dependency: {} --> {}  [{}]",
                            edge.task_id, edge.depends_on_id, edge.id
                        );
                    }
                }
            } else {
                let ids: Vec<EdgeId> = edge_ids.iter().map(|s| EdgeId::new(s.as_str())).collect();

                let result = app.manager_mut().bulk_remove(actor, &id, &ids).await?;
                app.save().await?;

                output::print_bulk_remove(&result, output_mode)?;

                if !result.errors.is_empty() {
                    anyhow::bail!(
                        "{} of {} dependency removal(s) failed",
                        result.errors.len(),
                        edge_ids.len()
                    );
                }
            }
        }
        DepAction::List { task_id, reverse } => {
            let id = TaskId::new(task_id.as_str());

            if *reverse {
                let dependents = app.manager().dependents(&id).await?;
                output::print_dependent_list(&dependents, output_mode)?;
            } else {
                let deps = app.manager().dependencies(&id).await?;
                output::print_dependency_list(&deps, output_mode)?;
            }
        }
        DepAction::Tree { task_id, depth } => {
            let id = TaskId::new(task_id.as_str());
            let task = app.manager().get_task(actor, &id).await?;
            let tree = app.manager().dependency_tree(&id, *depth).await?;
            let dependents = app.manager().dependents(&id).await?;

            // Statuses drive the per-node icons in the rendered tree
            let mut statuses: HashMap<TaskId, TaskStatus> = HashMap::new();
            for (edge, _) in &tree {
                if statuses.contains_key(&edge.depends_on_id) {
                    continue;
                }
                if let Some(dep) = app.manager().store().get_task(&edge.depends_on_id).await? {
                    statuses.insert(edge.depends_on_id.clone(), dep.status);
                }
            }

            let root = DepTreeNode {
                id: task.id.to_string(),
                kind: None,
                status: Some(task.status),
                title: Some(task.title.clone()),
                children: dep_tree_nodes(&tree, &statuses, &id, 1),
            };

            output::print_dep_tree_with_dependents(&root, &dependents, output_mode)?;
        }
    }

    Ok(())
}

/// Assemble nested tree nodes from a flat breadth-first edge list.
///
/// Each edge carries its dependent in `task_id`, so a child lands under
/// the node that first reached it in the traversal.
fn dep_tree_nodes(
    edges: &[(DependencyEdge, usize)],
    statuses: &HashMap<TaskId, TaskStatus>,
    parent: &TaskId,
    depth: usize,
) -> Vec<DepTreeNode> {
    edges
        .iter()
        .filter(|(edge, d)| *d == depth && edge.task_id == *parent)
        .map(|(edge, _)| DepTreeNode {
            id: edge.depends_on_id.to_string(),
            kind: Some(edge.kind),
            status: statuses.get(&edge.depends_on_id).copied(),
            title: None,
            children: dep_tree_nodes(edges, statuses, &edge.depends_on_id, depth + 1),
        })
        .collect()
}

/// Execute the can-start command
pub async fn execute_can_start(
    app: &crate::app::App,
    args: &CanStartArgs,
    output_mode: OutputMode,
) -> Result<()> {
    use crate::output;

    let id = TaskId::new(args.task_id.as_str());
    let check = app.manager().can_start(&id).await?;

    output::print_start_check(&check, output_mode)?;

    Ok(())
}

/// Execute the ready command
pub async fn execute_ready(
    app: &crate::app::App,
    args: &ReadyArgs,
    output_mode: OutputMode,
) -> Result<()> {
    use crate::domain::UserId;
    use crate::output;

    let owner = args.owner.clone().map(UserId::new);
    let tasks = app.manager().ready_tasks(owner.as_ref()).await?;

    match output_mode {
        OutputMode::Json => {
            output::print_tasks(&tasks, output_mode)?;
        }
        OutputMode::Text => {
            if tasks.is_empty() {
                println!("No ready tasks found.");
            } else {
                println!("Ready to work ({} task(s)):", tasks.len());
                println!();
                for task in &tasks {
                    output::print_task(task, output_mode)?;
                }
            }
        }
    }

    Ok(())
}

/// Execute the blocked command
pub async fn execute_blocked(
    app: &crate::app::App,
    args: &BlockedArgs,
    output_mode: OutputMode,
) -> Result<()> {
    use crate::domain::UserId;
    use crate::output;

    let owner = args.owner.clone().map(UserId::new);
    let blocked = app.manager().blocked_tasks(owner.as_ref()).await?;

    output::print_blocked_tasks(&blocked, output_mode)?;

    Ok(())
}

/// Execute the stats command
pub async fn execute_stats(
    app: &crate::app::App,
    actor: &Actor,
    args: &StatsArgs,
    output_mode: OutputMode,
) -> Result<()> {
    use crate::domain::UserId;
    use crate::output;

    let owner = match &args.owner {
        Some(o) => UserId::new(o.as_str()),
        None => actor.user.clone(),
    };

    let stats = app.manager().stats(&owner).await?;

    output::print_stats(owner.as_str(), &stats, output_mode)?;

    Ok(())
}
