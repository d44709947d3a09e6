//! Known-flag registry.
//!
//! Flag strings have no separators, so the tokenizer can only segment runs of
//! letters against a table of known names. The registry holds that table:
//! which names exist, and which of them take a numeric parameter.
//!
//! Registries are cheap shared handles; cloning shares state. Parsers take a
//! `&FlagRegistry` so tests can build isolated tables instead of mutating the
//! process-wide default.

use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::error::{Error, Result};

/// Flags understood by the baseline engine.
pub const VANILLA_FLAGS: &[&str] = &[
    "g", "t", "B", "Y", "H", "h", "F", "L", "b", "C", "c", "D", "E", "P", "W", "G",
];

/// Flags added by Moresampler. `:e` is obsolete but still seen in projects.
pub const MORESAMPLER_FLAGS: &[&str] = &[
    "e", "A", "Mt", "Mb", "Md", "Mo", "ME", "Mm", "Ms", "Me", ":e", "MC", "MG", "MD",
];

/// Flags added by UtauGrowl.
pub const UTAUGROWL_FLAGS: &[&str] = &["w", "<", ">", "_", "%"];

/// The builtin subset that takes no numeric parameter.
const BUILTIN_NO_PARAM: &[&str] = &["G", "W", "N", "Me"];

#[derive(Debug, Clone, Default)]
pub(crate) struct RegistryTable {
    pub(crate) no_param: HashSet<String>,
    pub(crate) with_param: HashSet<String>,
}

/// Shared table of known flag names.
///
/// `Default` pre-populates the three vendor flag sets. Registration is
/// all-or-nothing: every candidate in a batch is validated against a staged
/// copy before anything is committed, so a rejected batch leaves the table
/// untouched. Reads (tokenizing) may run concurrently; writes are serialized
/// behind the lock.
#[derive(Debug, Clone)]
pub struct FlagRegistry {
    pub(crate) table: Arc<RwLock<RegistryTable>>,
}

impl FlagRegistry {
    /// Create a registry with no known flags.
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(RegistryTable::default())),
        }
    }

    /// The process-wide default registry, pre-populated with the vendor sets.
    pub fn global() -> &'static FlagRegistry {
        static GLOBAL: OnceLock<FlagRegistry> = OnceLock::new();
        GLOBAL.get_or_init(FlagRegistry::default)
    }

    pub fn is_no_param(&self, name: &str) -> bool {
        self.table.read().no_param.contains(name)
    }

    pub fn is_with_param(&self, name: &str) -> bool {
        self.table.read().with_param.contains(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        let table = self.table.read();
        table.no_param.contains(name) || table.with_param.contains(name)
    }

    /// Names that take no parameter.
    pub fn no_param_flags(&self) -> Vec<String> {
        self.table.read().no_param.iter().cloned().collect()
    }

    /// Names that take a numeric parameter.
    pub fn with_param_flags(&self) -> Vec<String> {
        self.table.read().with_param.iter().cloned().collect()
    }

    /// Register names that take no parameter.
    ///
    /// With `ignore_existing`, a name already registered as no-parameter is
    /// skipped instead of rejected. A name registered as a parameter flag is
    /// always rejected. Beyond duplicates, every candidate is checked against
    /// the segmentation grammar: prefix-greedy matching means a new name must
    /// not combine with an existing name into a third, or be the
    /// concatenation of two existing ones; either would silently change how
    /// old flag strings parse.
    pub fn register_no_param(&self, ignore_existing: bool, names: &[&str]) -> Result<()> {
        let mut table = self.table.write();
        let mut staged = table.clone();

        for &name in names {
            if staged.no_param.contains(name) {
                if ignore_existing {
                    continue;
                }
                return Err(Error::FlagRegistration(format!(
                    "flag {name:?} is already registered"
                )));
            }
            if staged.with_param.contains(name) {
                return Err(Error::FlagRegistration(format!(
                    "flag {name:?} is already registered as a parameter flag"
                )));
            }

            // cubic over a few dozen names; registration is rare
            for v in &staged.no_param {
                for v2 in &staged.no_param {
                    if format!("{name}{v2}") == *v || format!("{v2}{name}") == *v {
                        return Err(Error::FlagRegistration(format!(
                            "flag {name:?} next to {v2:?} would read as existing flag {v:?}"
                        )));
                    }
                    if format!("{v}{v2}") == name {
                        return Err(Error::FlagRegistration(format!(
                            "flag {name:?} is exactly {v:?} followed by {v2:?}"
                        )));
                    }
                }
            }
            for v in &staged.with_param {
                for v2 in &staged.with_param {
                    if format!("{name}{v2}") == *v {
                        return Err(Error::FlagRegistration(format!(
                            "flag {name:?} next to {v2:?} would read as existing flag {v:?}"
                        )));
                    }
                }
            }

            staged.no_param.insert(name.to_string());
        }

        debug!("registered {} no-parameter flags", names.len());
        *table = staged;
        Ok(())
    }

    /// Register names that take a numeric parameter.
    ///
    /// Parameter flags match by longest suffix, so only one shape of
    /// collision matters here: a no-parameter name directly in front of the
    /// candidate must not spell an existing parameter flag.
    pub fn register_with_param(&self, ignore_existing: bool, names: &[&str]) -> Result<()> {
        let mut table = self.table.write();
        let mut staged = table.clone();

        for &name in names {
            if staged.no_param.contains(name) {
                return Err(Error::FlagRegistration(format!(
                    "flag {name:?} is already registered as a no-parameter flag"
                )));
            }
            if staged.with_param.contains(name) {
                if ignore_existing {
                    continue;
                }
                return Err(Error::FlagRegistration(format!(
                    "flag {name:?} is already registered"
                )));
            }

            for v in &staged.with_param {
                for v2 in &staged.no_param {
                    if format!("{v2}{name}") == *v {
                        return Err(Error::FlagRegistration(format!(
                            "flag {name:?} behind {v2:?} would read as existing flag {v:?}"
                        )));
                    }
                }
            }

            staged.with_param.insert(name.to_string());
        }

        debug!("registered {} parameter flags", names.len());
        *table = staged;
        Ok(())
    }
}

impl Default for FlagRegistry {
    fn default() -> Self {
        let mut table = RegistryTable::default();
        for &name in BUILTIN_NO_PARAM {
            table.no_param.insert(name.to_string());
        }
        for &name in VANILLA_FLAGS
            .iter()
            .chain(MORESAMPLER_FLAGS)
            .chain(UTAUGROWL_FLAGS)
        {
            if !table.no_param.contains(name) {
                table.with_param.insert(name.to_string());
            }
        }
        Self {
            table: Arc::new(RwLock::new(table)),
        }
    }
}
