//! Labels and dotted advancement paths

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::AdvancementError;

static NAMESPACED_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid namespaced key regex"));

/// Letters, digits and underscores only; never empty
pub fn is_namespaced_key(label: &str) -> bool {
    NAMESPACED_KEY.is_match(label)
}

pub fn validate_label(label: &str) -> Result<(), AdvancementError> {
    if is_namespaced_key(label) {
        Ok(())
    } else {
        Err(AdvancementError::InvalidLabel(label.to_string()))
    }
}

/// `treeLabel.advancementLabel`, uniquely addressing one advancement
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdvancementPath {
    tree: String,
    advancement: String,
}

impl AdvancementPath {
    pub fn new(tree: impl Into<String>, advancement: impl Into<String>) -> Self {
        Self {
            tree: tree.into(),
            advancement: advancement.into(),
        }
    }

    /// Split on the first dot. Anything other than exactly two non-empty
    /// components is an invalid reference.
    pub fn parse(path: &str) -> Result<Self, AdvancementError> {
        let Some((tree, advancement)) = path.split_once('.') else {
            return Err(AdvancementError::invalid_reference(path));
        };
        if tree.is_empty() || advancement.is_empty() || advancement.contains('.') {
            return Err(AdvancementError::invalid_reference(path));
        }
        Ok(Self::new(tree, advancement))
    }

    pub fn tree(&self) -> &str {
        &self.tree
    }

    pub fn advancement(&self) -> &str {
        &self.advancement
    }
}

impl fmt::Display for AdvancementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.tree, self.advancement)
    }
}

impl FromStr for AdvancementPath {
    type Err = AdvancementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_keys() {
        assert!(is_namespaced_key("mining"));
        assert!(is_namespaced_key("Stone_Age_2"));
        assert!(!is_namespaced_key(""));
        assert!(!is_namespaced_key("my tree"));
        assert!(!is_namespaced_key("mining.stone"));
        assert!(!is_namespaced_key("dash-ed"));
        assert!(validate_label("ok_label").is_ok());
        assert!(matches!(
            validate_label("bad label"),
            Err(AdvancementError::InvalidLabel(_))
        ));
    }

    #[test]
    fn test_parse_valid_path() {
        let path = AdvancementPath::parse("mining.stone").unwrap();
        assert_eq!(path.tree(), "mining");
        assert_eq!(path.advancement(), "stone");
        assert_eq!(path.to_string(), "mining.stone");
        assert_eq!("mining.stone".parse::<AdvancementPath>().unwrap(), path);
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        for bad in ["mining", "mining.", ".stone", "a.b.c", "", "."] {
            assert!(
                matches!(
                    AdvancementPath::parse(bad),
                    Err(AdvancementError::InvalidReference(_))
                ),
                "expected '{}' to be rejected",
                bad
            );
        }
    }
}
