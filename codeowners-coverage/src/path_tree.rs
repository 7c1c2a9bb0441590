use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NodeId(pub(crate) usize);

pub(crate) struct Node {
    pub(crate) children: HashMap<String, NodeId>,
    /// Indices of the inserted paths that end at this node.
    pub(crate) paths: Vec<usize>,
}

impl Node {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            paths: Vec::new(),
        }
    }
}

/// A prefix tree of `/`-separated paths. Paths sharing a directory share the
/// nodes for it, so each directory is only stepped through the NFA once.
pub(crate) struct PathTree {
    nodes: Vec<Node>,
}

impl PathTree {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::new()],
        }
    }

    pub(crate) fn from_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tree = Self::new();
        for (idx, path) in paths.into_iter().enumerate() {
            tree.insert(path, idx);
        }
        tree
    }

    pub(crate) fn root_id() -> NodeId {
        NodeId(0)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn insert(&mut self, path: &str, path_idx: usize) {
        let mut current_node = Self::root_id();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current_node = match self.nodes[current_node.0].children.get(segment) {
                Some(&node_id) => node_id,
                None => {
                    let node_id = NodeId(self.nodes.len());
                    self.nodes.push(Node::new());
                    self.nodes[current_node.0]
                        .children
                        .insert(segment.to_owned(), node_id);
                    node_id
                }
            };
        }
        self.nodes[current_node.0].paths.push(path_idx);
    }
}

impl Default for PathTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_directories() {
        let tree = PathTree::from_paths(["src/lib.rs", "src/main.rs", "README.md", "src/lib.rs"]);

        let root = tree.node(PathTree::root_id());
        assert_eq!(root.children.len(), 2);

        let src = tree.node(root.children["src"]);
        assert!(src.paths.is_empty());
        assert_eq!(tree.node(src.children["lib.rs"]).paths, vec![0, 3]);
        assert_eq!(tree.node(src.children["main.rs"]).paths, vec![1]);
        assert_eq!(tree.node(root.children["README.md"]).paths, vec![2]);
    }
}
