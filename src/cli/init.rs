//! Init command implementation

use anyhow::Result;
use std::path::Path;
use tracing::info;

use advancements::advancement::{EXAMPLE_TREE, EXAMPLE_TREE_FILE};
use advancements::config::{write_atomic, DataPaths, Settings};

/// Create the settings file and the example tree in `data_dir`
pub async fn init_command(data_dir: &Path, force: bool) -> Result<()> {
    let settings_path = DataPaths::settings_path(data_dir);
    let settings = if settings_path.exists() && !force {
        println!("Settings already exist at {}", settings_path.display());
        Settings::from_file(&settings_path)?
    } else {
        let settings = Settings::default();
        settings.save_to_file(&settings_path)?;
        println!("Created {}", settings_path.display());
        settings
    };

    let paths = DataPaths::resolve(data_dir, &settings);
    let example = paths.trees_dir.join(EXAMPLE_TREE_FILE);
    if example.exists() && !force {
        println!("Example tree already exists at {}", example.display());
    } else {
        write_atomic(&example, EXAMPLE_TREE)?;
        info!("Wrote example tree to {}", example.display());
        println!("Created {}", example.display());
    }

    println!("\nNext steps:");
    println!("  1. Add trees as YAML files to {}", paths.trees_dir.display());
    println!("  2. Run 'advancements load' to validate them");
    Ok(())
}
