//! Event command implementation

use anyhow::Result;
use std::path::Path;

use advancements::{GameEvent, PlayerId};

use super::open_context;
use super::progress::print_completion;

/// Feed one event through the dispatcher and show which advancements moved
pub async fn event_command(
    data_dir: &Path,
    kind: &str,
    value: Option<&str>,
    player: PlayerId,
    amount: u64,
) -> Result<()> {
    let ctx = open_context(data_dir)?;
    ctx.player_join(player)?;

    let outcomes = ctx.handle_event(&GameEvent::new(player, kind, value, amount))?;
    if outcomes.is_empty() {
        println!("No advancement reacted to '{}'.", kind);
    } else {
        for (path, completion) in &outcomes {
            print_completion(path, completion);
        }
    }

    ctx.player_quit(player)?;
    ctx.shutdown()?;
    Ok(())
}
