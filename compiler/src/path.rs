/// One open structural element: the tag it was opened with and the name it
/// contributes to qualified identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    pub tag:  String,
    pub name: String,
}

/// Stack of open structural elements. Depth 0 holds the project, depth 1 the
/// class and depth 2 the command.
#[derive(Debug, Default)]
pub struct PathStack {
    entries: Vec<PathEntry>,
}

impl PathStack {
    pub fn new() -> PathStack {
        PathStack::default()
    }

    pub fn push(&mut self, tag: &str, name: &str) {
        self.entries.push(PathEntry {
            tag:  tag.to_string(),
            name: name.to_string(),
        });
    }

    /// Pops the innermost element. `None` on an empty stack; the caller
    /// decides whether that is a balance violation.
    pub fn pop(&mut self) -> Option<PathEntry> {
        self.entries.pop()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn innermost(&self) -> Option<&PathEntry> {
        self.entries.last()
    }

    /// Every entry below the project, concatenated.
    pub fn qualified_name(&self) -> String {
        self.entries.iter().skip(1).map(|e| e.name.as_str()).collect()
    }

    /// Every entry joined with `/`, for diagnostics.
    pub fn display(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }
}
