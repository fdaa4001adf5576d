//! CLI command implementations

pub mod event;
pub mod init;
pub mod load;
pub mod progress;
pub mod replay;

use anyhow::Result;
use std::path::Path;

use advancements::AdvancementContext;

/// Open the data directory and load every tree
pub(crate) fn open_context(data_dir: &Path) -> Result<AdvancementContext> {
    let ctx = AdvancementContext::open(data_dir)?;
    ctx.reload()?;
    Ok(ctx)
}
