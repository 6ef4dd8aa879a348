use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Version;

/// Comparison operator of a single constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    /// `~>`: at least the version, below its [`Version::bump`]
    Pessimistic,
}

impl Op {
    // Longest symbols first so ">=" is not read as ">".
    const PARSE_ORDER: [Op; 7] = [
        Op::Pessimistic,
        Op::Ge,
        Op::Le,
        Op::Ne,
        Op::Eq,
        Op::Gt,
        Op::Lt,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Lt => "<",
            Op::Ge => ">=",
            Op::Le => "<=",
            Op::Pessimistic => "~>",
        }
    }
}

/// One `(operator, version)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    pub op: Op,
    pub version: Version,
}

impl Constraint {
    pub fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    pub fn satisfied_by(&self, version: &Version) -> bool {
        let target = &self.version;
        match self.op {
            Op::Eq => version == target,
            Op::Ne => version != target,
            Op::Gt => version > target,
            Op::Lt => version < target,
            Op::Ge => version >= target,
            Op::Le => version <= target,
            Op::Pessimistic => {
                version >= target && target.bump().is_none_or(|upper| *version < upper)
            }
        }
    }

    fn is_default(&self) -> bool {
        self.op == Op::Ge && self.version == Version::zero()
    }
}

impl FromStr for Constraint {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (op, rest) = Op::PARSE_ORDER
            .iter()
            .find_map(|op| s.strip_prefix(op.symbol()).map(|rest| (*op, rest)))
            .unwrap_or((Op::Eq, s));

        let version = rest
            .parse()
            .with_context(|| format!("Illformed requirement {:?}", s))?;
        Ok(Constraint { op, version })
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.symbol(), self.version)
    }
}

/// A conjunction of constraints.
///
/// The empty requirement (see [`Requirement::none`]) is satisfied by no
/// version; it is what intersecting two incompatible exact requirements
/// produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Requirement {
    constraints: Vec<Constraint>,
    none: bool,
}

impl Requirement {
    pub fn new(constraints: Vec<Constraint>) -> Self {
        if constraints.is_empty() {
            return Self::default();
        }
        Self {
            constraints,
            none: false,
        }
    }

    pub fn exact(version: Version) -> Self {
        Self::new(vec![Constraint::new(Op::Eq, version)])
    }

    /// The requirement no version satisfies.
    pub fn none() -> Self {
        Self {
            constraints: Vec::new(),
            none: true,
        }
    }

    pub fn is_none(&self) -> bool {
        self.none
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The pinned version when this requirement is a single `=` constraint.
    pub fn exact_version(&self) -> Option<&Version> {
        match self.constraints.as_slice() {
            [Constraint { op: Op::Eq, version }] if !self.none => Some(version),
            _ => None,
        }
    }

    pub fn satisfied_by(&self, version: &Version) -> bool {
        !self.none && self.constraints.iter().all(|c| c.satisfied_by(version))
    }

    /// Combine two requirements into one satisfied only by versions
    /// satisfying both.
    ///
    /// An `=` constraint on either side narrows the result to that version,
    /// or to [`Requirement::none`] when the other constraints exclude it.
    pub fn intersect(&self, other: &Requirement) -> Requirement {
        if self.none || other.none {
            return Requirement::none();
        }

        let mut constraints = self.constraints.clone();
        for c in &other.constraints {
            if !constraints.contains(c) {
                constraints.push(c.clone());
            }
        }
        if constraints.len() > 1 {
            constraints.retain(|c| !c.is_default());
        }

        let pinned = constraints
            .iter()
            .find(|c| c.op == Op::Eq)
            .map(|c| c.version.clone());
        match pinned {
            Some(version) if constraints.iter().all(|c| c.satisfied_by(&version)) => {
                Requirement::exact(version)
            }
            Some(_) => Requirement::none(),
            None => Requirement::new(constraints),
        }
    }
}

impl Default for Requirement {
    /// `>= 0`, satisfied by every release.
    fn default() -> Self {
        Self {
            constraints: vec![Constraint::new(Op::Ge, Version::zero())],
            none: false,
        }
    }
}

impl FromStr for Requirement {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            bail!("Illformed requirement: empty");
        }
        let constraints = s
            .split(',')
            .map(str::parse::<Constraint>)
            .collect::<Result<Vec<Constraint>>>()?;
        Ok(Requirement::new(constraints))
    }
}

impl TryFrom<String> for Requirement {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Requirement> for String {
    fn from(value: Requirement) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.none {
            return f.write_str("< 0");
        }
        let parts: Vec<String> = self.constraints.iter().map(|c| c.to_string()).collect();
        f.write_str(&parts.join(", "))
    }
}
