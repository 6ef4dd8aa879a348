use anyhow::{Context, Result, anyhow};
use std::fmt;
use std::str::FromStr;

use crate::version::Requirement;

/// A package name with an optional requirement.
/// Format: "name" or "name:requirement", e.g. "b:>= 1, < 3"
#[derive(Debug, PartialEq, Clone)]
pub struct GemArg {
    pub name: String,
    pub requirement: Requirement,
}

impl fmt::Display for GemArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.requirement)
    }
}

impl FromStr for GemArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, requirement) = match s.split_once(':') {
            Some((name, req)) => {
                if req.trim().is_empty() {
                    return Err(anyhow!(
                        "Invalid format: requirement after : cannot be empty."
                    ));
                }
                let requirement = req
                    .parse::<Requirement>()
                    .with_context(|| format!("Invalid requirement in {:?}", s))?;
                (name, requirement)
            }
            None => (s, Requirement::default()),
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow!("Invalid format. Expected 'name' or 'name:requirement'."));
        }
        Ok(GemArg {
            name: name.to_string(),
            requirement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_only() {
        let arg: GemArg = "b".parse().unwrap();
        assert_eq!(arg.name, "b");
        assert_eq!(arg.requirement, Requirement::default());
    }

    #[test]
    fn test_parse_with_requirement() {
        let arg: GemArg = "b:>= 1, < 3".parse().unwrap();
        assert_eq!(arg.name, "b");
        assert_eq!(arg.requirement.to_string(), ">= 1, < 3");
        assert_eq!(arg.to_string(), "b:>= 1, < 3");
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<GemArg>().is_err());
        assert!(":>= 1".parse::<GemArg>().is_err());
        assert!("b:".parse::<GemArg>().is_err());
        assert!("b:>= banana".parse::<GemArg>().is_err());
    }
}
