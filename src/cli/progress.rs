//! Progress, activate and complete commands

use anyhow::Result;
use std::path::Path;

use advancements::{AdvancementPath, Completion, PlayerId, ProgressReport};

use super::open_context;

/// Show progress on one advancement, or on every advancement of a tree
pub async fn progress_command(
    data_dir: &Path,
    tree: &str,
    advancement: Option<&str>,
    player: PlayerId,
) -> Result<()> {
    let ctx = open_context(data_dir)?;

    let reports = match advancement {
        Some(advancement) => vec![ctx.report(player, &AdvancementPath::new(tree, advancement))?],
        None => ctx.tree_report(player, tree)?,
    };

    println!(
        "Player {}: {} of {} completed in '{}'\n",
        player,
        ctx.completed_in_tree(player, tree)?,
        ctx.manager().tree(tree).map_or(0, |t| t.len()),
        tree
    );
    for report in &reports {
        print_report(report);
    }

    ctx.shutdown()?;
    Ok(())
}

pub async fn activate_command(data_dir: &Path, path: &str, player: PlayerId) -> Result<()> {
    let ctx = open_context(data_dir)?;
    let path = AdvancementPath::parse(path)?;
    ctx.store().load(player)?;

    if ctx.activate(player, &path)? {
        println!("Activated {} for {}", path, player);
    } else {
        println!("{} was already active for {}", path, player);
    }

    ctx.player_quit(player)?;
    ctx.shutdown()?;
    Ok(())
}

pub async fn complete_command(data_dir: &Path, path: &str, player: PlayerId) -> Result<()> {
    let ctx = open_context(data_dir)?;
    let path = AdvancementPath::parse(path)?;
    ctx.store().load(player)?;

    let completion = ctx.complete(player, &path)?;
    print_completion(&path, &completion);

    ctx.player_quit(player)?;
    ctx.shutdown()?;
    Ok(())
}

pub(crate) fn print_report(report: &ProgressReport) {
    let status = if report.completed {
        "done"
    } else if report.active {
        "active"
    } else {
        "inactive"
    };
    println!(
        "  {} ({}) [{}] {}/{} {}",
        report.path,
        report.name,
        status,
        report.progress,
        report.amount,
        report.unit.as_deref().unwrap_or_default()
    );
}

pub(crate) fn print_completion(path: &AdvancementPath, completion: &Completion) {
    match completion {
        Completion::Inactive => println!("  {}: not active", path),
        Completion::AlreadyCompleted => println!("  {}: already completed", path),
        Completion::Pending { progress, amount } => {
            println!("  {}: {}/{}", path, progress, amount)
        }
        Completion::Blocked { progress, amount } => {
            println!("  {}: {}/{}, waiting on requirements", path, progress, amount)
        }
        Completion::Completed { tree_completed } => {
            println!("  {}: completed", path);
            if *tree_completed {
                println!("  tree '{}' completed", path.tree());
            }
        }
    }
}
