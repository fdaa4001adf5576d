//! Materializes one advancement tree from one configuration unit
//!
//! The loader never touches the filesystem. Every defaulted value is reported
//! as a [`ConfigWarning`]; display and option defaults are also written into
//! a copy of the document, which is handed back for the caller to persist.

use serde_yaml::Mapping;

use super::advancement::{Advancement, DEFAULT_AMOUNT, Requirement, Reward};
use super::display::{
    AUTO_GUI_LOCATION, AdvancementDisplay, AdvancementFrame, DEFAULT_ADVANCEMENT_ICON,
    DEFAULT_NATIVE_GUI_BACKGROUND, DEFAULT_TREE_ICON, FALLBACK_ICON, ProgressDisplay,
    TreeDisplay, is_valid_icon, resolve_icon,
};
use super::error::{AdvancementError, ConfigWarning};
use super::path::{AdvancementPath, is_namespaced_key, validate_label};
use super::registry::TypeRegistries;
use super::tree::{AdvancementTree, AdvancementTreeOptions};
use super::types::{EMPTY_TYPE, NONE_TYPE};
use crate::config::{ConfigSection, ConfigUnit};

/// Output of a successful load
#[derive(Debug)]
pub struct LoadedTree {
    pub tree: AdvancementTree,
    pub warnings: Vec<ConfigWarning>,
    /// Document with defaults filled in, present only when something was added
    pub normalized: Option<Mapping>,
}

/// Build the tree described by `unit`
pub fn load_tree(
    unit: &ConfigUnit,
    registries: &TypeRegistries,
) -> Result<LoadedTree, AdvancementError> {
    let label = unit.id.as_str();
    validate_label(label)?;

    let mut document = unit.document.clone();
    let mut normalized = false;
    let mut warnings = Vec::new();

    let (advancements, options) = {
        let mut root = ConfigSection::new(&mut document, &mut normalized);
        let advancements = {
            let mut section = root.ensure_section("advancements");
            load_advancements(label, &mut section, registries, &mut warnings)
        };
        let options = {
            let mut section = root.ensure_section("options");
            load_options(label, &mut section, registries, &mut warnings)
        };
        (advancements, options)
    };

    Ok(LoadedTree {
        tree: AdvancementTree::new(label, advancements, options),
        warnings,
        normalized: normalized.then_some(document),
    })
}

fn load_advancements(
    tree: &str,
    section: &mut ConfigSection<'_>,
    registries: &TypeRegistries,
    warnings: &mut Vec<ConfigWarning>,
) -> Vec<Advancement> {
    let mut advancements = Vec::new();
    for label in section.keys() {
        let location = format!("{}.{}", tree, label);
        if !is_namespaced_key(&label) {
            warnings.push(ConfigWarning::skipped(
                &location,
                "advancement labels may only contain letters, numbers and underscores",
            ));
            continue;
        }
        // A bare `label:` is an advancement with every field defaulted
        if section.contains(&label) && section.section(&label).is_none() {
            warnings.push(ConfigWarning::skipped(&location, "expected a section"));
            continue;
        }
        let mut entry = section.ensure_section(&label);
        let path = AdvancementPath::new(tree, label.as_str());
        advancements.push(load_advancement(path, &mut entry, registries, warnings));
    }
    advancements
}

fn load_advancement(
    path: AdvancementPath,
    section: &mut ConfigSection<'_>,
    registries: &TypeRegistries,
    warnings: &mut Vec<ConfigWarning>,
) -> Advancement {
    let location = path.to_string();

    let kind = match section.get_string("type") {
        Some(kind) => kind.trim().to_ascii_lowercase(),
        None => {
            warnings.push(ConfigWarning::missing(&location, "type", Some(EMPTY_TYPE)));
            EMPTY_TYPE.to_string()
        }
    };
    if !registries.advancement_types.contains(&kind) {
        warnings.push(ConfigWarning::unknown_strategy(
            &location,
            registries.advancement_types.kind(),
            &kind,
        ));
    }

    let value = section.get_string("value");
    if value.is_none() {
        warnings.push(ConfigWarning::missing(&location, "value", None));
    }

    let amount = match section.get_int("amount") {
        Some(n) if n > 0 => n as u64,
        Some(n) => {
            warnings.push(ConfigWarning::invalid(
                &location,
                "amount",
                &n.to_string(),
                &DEFAULT_AMOUNT.to_string(),
            ));
            DEFAULT_AMOUNT
        }
        None => {
            let warning = match section.get_string("amount") {
                Some(raw) => ConfigWarning::invalid(
                    &location,
                    "amount",
                    &raw,
                    &DEFAULT_AMOUNT.to_string(),
                ),
                None => ConfigWarning::missing(
                    &location,
                    "amount",
                    Some(DEFAULT_AMOUNT.to_string().as_str()),
                ),
            };
            warnings.push(warning);
            DEFAULT_AMOUNT
        }
    };

    let rewards = load_rewards(&location, section, registries, warnings);
    let requirements = load_requirements(&location, section, registries, warnings);

    let default_unit = registries
        .advancement_types
        .resolve(Some(kind.as_str()))
        .default_unit()
        .to_string();
    let display = {
        let mut display = section.ensure_section("display");
        load_advancement_display(
            &location,
            path.advancement(),
            &default_unit,
            &mut display,
            warnings,
        )
    };

    Advancement {
        path,
        kind,
        value,
        amount,
        rewards,
        requirements,
        display,
    }
}

/// `rewards.<id>.{type,value}` under `section`, in file order
fn load_rewards(
    owner: &str,
    section: &mut ConfigSection<'_>,
    registries: &TypeRegistries,
    warnings: &mut Vec<ConfigWarning>,
) -> Vec<Reward> {
    let Some(mut rewards) = section.section("rewards") else {
        return Vec::new();
    };

    let mut loaded = Vec::new();
    for id in rewards.keys() {
        let location = format!("{}.rewards.{}", owner, id);
        let Some(reward) = rewards.section(&id) else {
            warnings.push(ConfigWarning::skipped(&location, "expected a section"));
            continue;
        };

        let mut kind = match reward.get_string("type") {
            Some(kind) => kind.trim().to_ascii_lowercase(),
            None => {
                warnings.push(ConfigWarning::missing(&location, "type", Some(NONE_TYPE)));
                NONE_TYPE.to_string()
            }
        };
        let value = reward.get_string("value");
        if value.is_none() {
            warnings.push(ConfigWarning::missing(&location, "value", Some(NONE_TYPE)));
            kind = NONE_TYPE.to_string();
        }
        if !registries.reward_types.contains(&kind) {
            warnings.push(ConfigWarning::unknown_strategy(
                &location,
                registries.reward_types.kind(),
                &kind,
            ));
        }
        loaded.push(Reward { kind, value });
    }
    loaded
}

fn load_requirements(
    owner: &str,
    section: &mut ConfigSection<'_>,
    registries: &TypeRegistries,
    warnings: &mut Vec<ConfigWarning>,
) -> Vec<Requirement> {
    let Some(mut requirements) = section.section("requirements") else {
        return Vec::new();
    };

    let mut loaded = Vec::new();
    for id in requirements.keys() {
        let location = format!("{}.requirements.{}", owner, id);
        let Some(requirement) = requirements.section(&id) else {
            warnings.push(ConfigWarning::skipped(&location, "expected a section"));
            continue;
        };

        let kind = match requirement.get_string("type") {
            Some(kind) => kind.trim().to_ascii_lowercase(),
            None => {
                warnings.push(ConfigWarning::missing(&location, "type", Some(NONE_TYPE)));
                NONE_TYPE.to_string()
            }
        };
        if !registries.requirement_types.contains(&kind) {
            warnings.push(ConfigWarning::unknown_strategy(
                &location,
                registries.requirement_types.kind(),
                &kind,
            ));
        }
        let value = requirement.get_string("value").unwrap_or_else(|| {
            warnings.push(ConfigWarning::missing(&location, "value", Some(NONE_TYPE)));
            NONE_TYPE.to_string()
        });

        let icon = match requirement.get_string("icon") {
            Some(icon) if !is_valid_icon(&icon) => {
                warnings.push(ConfigWarning::invalid(&location, "icon", &icon, "none"));
                None
            }
            icon => icon,
        };

        loaded.push(Requirement {
            kind,
            value,
            display_name: requirement.get_string("display_name"),
            message: requirement.get_string("message"),
            icon,
        });
    }
    loaded
}

fn load_advancement_display(
    location: &str,
    label: &str,
    default_unit: &str,
    display: &mut ConfigSection<'_>,
    warnings: &mut Vec<ConfigWarning>,
) -> AdvancementDisplay {
    let frame = display.string_or_insert("frame", AdvancementFrame::default().as_str());
    let frame = frame.parse().unwrap_or_else(|_| {
        warnings.push(ConfigWarning::invalid(
            location,
            "frame",
            &frame,
            AdvancementFrame::default().as_str(),
        ));
        AdvancementFrame::default()
    });

    let progress_display =
        display.string_or_insert("progress_display", ProgressDisplay::default().as_str());
    let progress_display = progress_display.parse().unwrap_or_else(|_| {
        warnings.push(ConfigWarning::invalid(
            location,
            "progress_display",
            &progress_display,
            ProgressDisplay::default().as_str(),
        ));
        ProgressDisplay::default()
    });

    AdvancementDisplay {
        name: display.string_or_insert("name", label),
        description: display.get_string("description"),
        icon: load_icon(location, display, DEFAULT_ADVANCEMENT_ICON, warnings),
        gui_location: display.string_or_insert("gui_location", AUTO_GUI_LOCATION),
        unit: Some(display.string_or_insert("unit", default_unit)),
        frame,
        announce: display.bool_or_insert("announce", true),
        toast: display.bool_or_insert("toast", true),
        progress_display,
    }
}

fn load_options(
    tree: &str,
    options: &mut ConfigSection<'_>,
    registries: &TypeRegistries,
    warnings: &mut Vec<ConfigWarning>,
) -> AdvancementTreeOptions {
    let location = format!("{}.options", tree);
    AdvancementTreeOptions {
        auto_active: options.bool_or_insert("auto_active", false),
        rewards: load_rewards(&location, options, registries, warnings),
        display: TreeDisplay {
            name: options.string_or_insert("display_name", tree),
            description: options.get_string("description"),
            icon: load_icon(&location, options, DEFAULT_TREE_ICON, warnings),
            gui_location: options.string_or_insert("gui_location", AUTO_GUI_LOCATION),
            native_gui: options.bool_or_insert("native_gui", true),
            native_gui_background: options
                .string_or_insert("native_gui_background", DEFAULT_NATIVE_GUI_BACKGROUND),
        },
    }
}

/// Icon with default write-back. Invalid identifiers stay in the file but
/// resolve to the fallback icon.
fn load_icon(
    location: &str,
    section: &mut ConfigSection<'_>,
    default: &str,
    warnings: &mut Vec<ConfigWarning>,
) -> String {
    let icon = section.string_or_insert("icon", default);
    if !is_valid_icon(&icon) {
        warnings.push(ConfigWarning::invalid(location, "icon", &icon, FALLBACK_ICON));
    }
    resolve_icon(&icon)
}
