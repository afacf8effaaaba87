/// Repeated element that carries its own coordinate fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Entry {
    Dependency { managed: bool },
    Plugin,
}

/// Leaf element whose text the model cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field<'a> {
    Project(&'a str),
    Parent(&'a str),
    Entry(Entry, &'a str),
    Module,
}

impl Field<'_> {
    pub(crate) fn is_version(&self) -> bool {
        matches!(
            self,
            Self::Project("version") | Self::Parent("version") | Self::Entry(_, "version")
        )
    }
}

// The root element name is not matched here; strictness is checked by the reader.
fn names(stack: &[String]) -> Vec<&str> {
    stack.iter().skip(1).map(String::as_str).collect()
}

/// Entry element the stack currently ends at, if any.
pub(crate) fn entry_at(stack: &[String]) -> Option<Entry> {
    match names(stack).as_slice() {
        ["dependencies", "dependency"] => Some(Entry::Dependency { managed: false }),
        ["dependencyManagement", "dependencies", "dependency"] => {
            Some(Entry::Dependency { managed: true })
        }
        ["build", "plugins", "plugin"] => Some(Entry::Plugin),
        _ => None,
    }
}

/// Model field the stack currently ends at, if any.
pub(crate) fn field_at(stack: &[String]) -> Option<Field<'_>> {
    let names = names(stack);
    let leaf = stack.last()?.as_str();
    match names.as_slice() {
        [_] => Some(Field::Project(leaf)),
        ["parent", _] => Some(Field::Parent(leaf)),
        ["modules", "module"] => Some(Field::Module),
        [.., _] => entry_at(&stack[..stack.len() - 1]).map(|entry| Field::Entry(entry, leaf)),
        [] => None,
    }
}
