use std::collections::{HashMap, HashSet, VecDeque};

use crate::coordinate::ProjectKey;
use crate::error::VmanError;

/// Parent reference of a project being connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentLink {
    /// No parent declared
    None,
    /// Parent names the configured toolchain (matched ignoring version)
    Toolchain,
    /// Parent was loaded in the same session
    Loaded(ProjectKey),
    /// Parent is neither loaded nor the toolchain; no edge is created
    Unresolved(ProjectKey),
}

/// Incrementally built parent→child reachability index over loaded projects.
///
/// Seeded with the toolchain key as a root node, when one is configured.
#[derive(Debug, Default)]
pub struct AncestryGraph {
    toolchain: Option<ProjectKey>,
    nodes: HashSet<ProjectKey>,
    parents: HashMap<ProjectKey, ProjectKey>,
    children: HashMap<ProjectKey, Vec<ProjectKey>>,
}

impl AncestryGraph {
    #[must_use]
    pub fn new(toolchain: Option<ProjectKey>) -> Self {
        let mut graph = Self {
            toolchain: toolchain.clone(),
            ..Self::default()
        };
        if let Some(toolchain) = toolchain {
            graph.nodes.insert(toolchain);
        }
        graph
    }

    pub fn toolchain(&self) -> Option<&ProjectKey> {
        self.toolchain.as_ref()
    }

    /// Registers `key` and, when the link resolves, the edge from its parent.
    ///
    /// # Errors
    /// Returns [`VmanError::AncestryCycle`] if the edge would make `key` its own
    /// ancestor. The node is still registered; the edge is not.
    pub fn connect(&mut self, key: &ProjectKey, parent: &ParentLink) -> Result<(), VmanError> {
        self.nodes.insert(key.clone());

        let parent = match parent {
            ParentLink::Loaded(parent) => parent.clone(),
            ParentLink::Toolchain => match &self.toolchain {
                Some(toolchain) => toolchain.clone(),
                None => return Ok(()),
            },
            ParentLink::None | ParentLink::Unresolved(_) => return Ok(()),
        };

        if parent == *key || self.is_reachable(key, &parent) {
            return Err(VmanError::AncestryCycle {
                parent,
                child: key.clone(),
            });
        }
        if self.parents.get(key) == Some(&parent) {
            return Ok(());
        }
        if let Some(previous) = self.parents.insert(key.clone(), parent.clone())
            && let Some(siblings) = self.children.get_mut(&previous)
        {
            siblings.retain(|child| child != key);
        }
        self.nodes.insert(parent.clone());
        self.children.entry(parent).or_default().push(key.clone());
        Ok(())
    }

    pub fn contains(&self, key: &ProjectKey) -> bool {
        self.nodes.contains(key)
    }

    pub fn parent_of(&self, key: &ProjectKey) -> Option<&ProjectKey> {
        self.parents.get(key)
    }

    pub fn children_of(&self, key: &ProjectKey) -> &[ProjectKey] {
        self.children.get(key).map_or(&[], Vec::as_slice)
    }

    /// Whether `ancestor` is reachable by walking up from `key`.
    pub fn has_ancestor(&self, ancestor: &ProjectKey, key: &ProjectKey) -> bool {
        let mut current = self.parent_of(key);
        let mut steps = 0;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
            current = self.parent_of(parent);
        }
        false
    }

    pub fn has_toolchain_ancestor(&self, key: &ProjectKey) -> bool {
        self.toolchain
            .as_ref()
            .is_some_and(|toolchain| self.has_ancestor(toolchain, key))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // breadth-first over child edges
    fn is_reachable(&self, from: &ProjectKey, to: &ProjectKey) -> bool {
        let mut queue = VecDeque::from([from]);
        let mut visited = HashSet::new();
        while let Some(node) = queue.pop_front() {
            if node == to {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            for child in self.children_of(node) {
                queue.push_back(child);
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(value: &str) -> ProjectKey {
        value.parse().unwrap()
    }

    #[test]
    fn test_new_seeds_toolchain() {
        let graph = AncestryGraph::new(Some(key("org.tools:toolchain:1")));
        assert!(graph.contains(&key("org.tools:toolchain:1")));
        assert_eq!(graph.len(), 1);
        assert!(AncestryGraph::new(None).is_empty());
    }

    #[test]
    fn test_connect_loaded_parent() {
        let mut graph = AncestryGraph::new(None);
        graph
            .connect(&key("g:parent:1"), &ParentLink::None)
            .unwrap();
        graph
            .connect(&key("g:child:1"), &ParentLink::Loaded(key("g:parent:1")))
            .unwrap();

        assert!(graph.contains(&key("g:child:1")));
        assert_eq!(graph.parent_of(&key("g:child:1")), Some(&key("g:parent:1")));
        assert_eq!(graph.children_of(&key("g:parent:1")), &[key("g:child:1")]);
        assert!(graph.has_ancestor(&key("g:parent:1"), &key("g:child:1")));
    }

    #[test]
    fn test_connect_toolchain_parent() {
        let toolchain = key("org.tools:toolchain:1");
        let mut graph = AncestryGraph::new(Some(toolchain.clone()));
        graph
            .connect(&key("g:parent:1"), &ParentLink::Toolchain)
            .unwrap();
        graph
            .connect(&key("g:child:1"), &ParentLink::Loaded(key("g:parent:1")))
            .unwrap();

        assert!(graph.has_toolchain_ancestor(&key("g:child:1")));
        assert_eq!(graph.children_of(&toolchain), &[key("g:parent:1")]);
    }

    #[test]
    fn test_unresolved_parent_creates_no_edge() {
        let mut graph = AncestryGraph::new(None);
        graph
            .connect(&key("g:child:1"), &ParentLink::Unresolved(key("g:gone:1")))
            .unwrap();
        assert!(!graph.contains(&key("g:gone:1")));
        assert_eq!(graph.parent_of(&key("g:child:1")), None);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut graph = AncestryGraph::new(None);
        graph
            .connect(&key("g:b:1"), &ParentLink::Loaded(key("g:a:1")))
            .unwrap();
        graph
            .connect(&key("g:c:1"), &ParentLink::Loaded(key("g:b:1")))
            .unwrap();

        let result = graph.connect(&key("g:a:1"), &ParentLink::Loaded(key("g:c:1")));
        assert!(matches!(result, Err(VmanError::AncestryCycle { .. })));
        assert_eq!(graph.parent_of(&key("g:a:1")), None);
    }

    #[test]
    fn test_self_parent_is_rejected() {
        let mut graph = AncestryGraph::new(None);
        let result = graph.connect(&key("g:a:1"), &ParentLink::Loaded(key("g:a:1")));
        assert!(result.is_err());
    }

    #[test]
    fn test_reconnect_same_edge_is_noop() {
        let mut graph = AncestryGraph::new(None);
        let link = ParentLink::Loaded(key("g:a:1"));
        graph.connect(&key("g:b:1"), &link).unwrap();
        graph.connect(&key("g:b:1"), &link).unwrap();
        assert_eq!(graph.children_of(&key("g:a:1")).len(), 1);
    }
}
