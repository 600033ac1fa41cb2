use std::collections::{HashMap, HashSet};

/// Appended to the emitted identifier of a repeated class or command name.
pub const DUPLICATE_SUFFIX: &str = "Duplicate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Class,
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub name:          String,
    pub disambiguated: bool,
}

/// `raw` for the first occurrence, `<raw>Duplicate` for the second and
/// `<raw>Duplicate{n-1}` for the n-th.
pub fn suffixed(raw: &str, occurrence: usize) -> String {
    match occurrence {
        0 | 1 => raw.to_string(),
        2 => format!("{}{}", raw, DUPLICATE_SUFFIX),
        n => format!("{}{}{}", raw, DUPLICATE_SUFFIX, n - 1),
    }
}

/// Class and command names seen so far in the pass, plus every identifier
/// the generated module already defines.
///
/// Occurrences are counted per raw schema name. A candidate is accepted only
/// when none of the identifiers it would emit is taken; otherwise the suffix
/// number keeps rising. Raw names that already end in the suffix, or that
/// differ only in case or separators, therefore still end up distinct.
#[derive(Debug, Default)]
pub struct NameRegistry {
    classes:  HashMap<String, usize>,
    commands: HashMap<String, usize>,
    taken:    HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> NameRegistry {
        NameRegistry::default()
    }

    /// Marks `identifier` as defined. Returns `false` if it already was.
    pub fn reserve(&mut self, identifier: &str) -> bool {
        self.taken.insert(identifier.to_string())
    }

    pub fn is_taken(&self, identifier: &str) -> bool {
        self.taken.contains(identifier)
    }

    /// Registers one more occurrence of `raw` and returns the name to emit
    /// for it. `identifiers` maps a candidate name to the identifiers the
    /// generated module would define for it; all of them are reserved.
    pub fn resolve<F>(&mut self, kind: NameKind, raw: &str, identifiers: F) -> ResolvedName
    where
        F: Fn(&str) -> Vec<String>,
    {
        let seen = match kind {
            NameKind::Class => &mut self.classes,
            NameKind::Command => &mut self.commands,
        };
        let count = seen.entry(raw.to_string()).or_insert(0);
        let mut occurrence = *count + 1;

        loop {
            let name = suffixed(raw, occurrence);
            let emitted = identifiers(&name);
            if emitted.iter().all(|ident| !self.taken.contains(ident)) {
                self.taken.extend(emitted);
                *count = occurrence;
                return ResolvedName {
                    name,
                    disambiguated: occurrence > 1,
                };
            }
            occurrence += 1;
        }
    }

    pub fn contains(&self, kind: NameKind, raw: &str) -> bool {
        match kind {
            NameKind::Class => self.classes.contains_key(raw),
            NameKind::Command => self.commands.contains_key(raw),
        }
    }
}
