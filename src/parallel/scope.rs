//! Parallel scope declarations

use bitflags::bitflags;
use std::fmt;

use crate::models::{keys, PropertyBag};

bitflags! {
    /// Declared concurrency eligibility of a node; the empty set is `None`
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ParallelScope: u8 {
        const SELF = 1;
        const CHILDREN = 1 << 1;
        const FIXTURES = 1 << 2;
        const ALL = Self::SELF.bits() | Self::CHILDREN.bits();
    }
}

impl ParallelScope {
    pub const NONE: ParallelScope = ParallelScope::empty();

    /// Whether the declaration is anything other than `None`
    pub fn is_parallel(&self) -> bool {
        !self.is_empty()
    }

    /// Parse `None`, `Self`, `Children`, `Fixtures`, `All` or a combination
    /// joined by `|`, `,` or `+`. Case-insensitive; `Default` means `None`.
    pub fn parse(s: &str) -> Option<Self> {
        s.split(['|', ',', '+'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .try_fold(ParallelScope::NONE, |scope, part| {
                let flag = match part.to_lowercase().as_str() {
                    "none" | "default" => ParallelScope::NONE,
                    "self" => ParallelScope::SELF,
                    "children" => ParallelScope::CHILDREN,
                    "fixtures" => ParallelScope::FIXTURES,
                    "all" => ParallelScope::ALL,
                    _ => return None,
                };
                Some(scope | flag)
            })
    }

    /// Scope declared in a property bag, read from the first value
    pub fn declared_in(properties: &PropertyBag) -> Option<Self> {
        let raw = properties.first(keys::PARALLEL_SCOPE)?;
        let scope = Self::parse(raw);
        if scope.is_none() {
            tracing::warn!("Ignoring unrecognised parallel scope '{}'", raw);
        }
        scope
    }
}

impl fmt::Display for ParallelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        let mut names = Vec::new();
        let mut rest = *self;
        if rest.contains(ParallelScope::ALL) {
            names.push("All");
            rest.remove(ParallelScope::ALL);
        }
        if rest.contains(ParallelScope::SELF) {
            names.push("Self");
        }
        if rest.contains(ParallelScope::CHILDREN) {
            names.push("Children");
        }
        if rest.contains(ParallelScope::FIXTURES) {
            names.push("Fixtures");
        }
        f.write_str(&names.join("|"))
    }
}

/// Serde support via the textual form
pub mod serde_scope {
    use super::ParallelScope;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(scope: &ParallelScope, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(scope)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ParallelScope, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ParallelScope::parse(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid parallel scope: {raw}")))
    }
}
