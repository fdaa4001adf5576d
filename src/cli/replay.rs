//! Replay command implementation

use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

use advancements::{GameEvent, PlayerId};

use super::open_context;
use super::progress::print_completion;

/// Parse `kind [value] [amount]`
fn parse_line(player: PlayerId, line: &str) -> Result<Option<GameEvent>> {
    let mut parts = line.split_whitespace();
    let Some(kind) = parts.next() else {
        return Ok(None);
    };
    if kind.starts_with('#') {
        return Ok(None);
    }
    let value = parts.next();
    let amount = match parts.next() {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("Invalid amount '{}'", raw))?,
        None => 1,
    };
    Ok(Some(GameEvent::new(player, kind, value, amount)))
}

/// Read events from stdin until EOF, autosaving in the background
pub async fn replay_command(data_dir: &Path, player: PlayerId) -> Result<()> {
    let ctx = open_context(data_dir)?;
    let autosave = ctx.start_autosave();
    ctx.player_join(player)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut count = 0;
    while let Some(line) = lines.next_line().await? {
        let Some(event) = parse_line(player, &line)? else {
            continue;
        };
        for (path, completion) in ctx.handle_event(&event)? {
            print_completion(&path, &completion);
        }
        count += 1;
    }

    if let Some(handle) = autosave {
        handle.abort();
    }
    ctx.player_quit(player)?;
    ctx.shutdown()?;
    println!("Replayed {} events.", count);
    Ok(())
}
