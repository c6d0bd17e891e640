use crate::engine::{NodeId, Scene};

/// Detached snapshot of one scene node and its subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedNode {
    pub id: NodeId,
    pub name: String,
    pub children: Vec<ProjectedNode>,
}

impl ProjectedNode {
    /// Number of nodes in this subtree, itself included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ProjectedNode::count).sum::<usize>()
    }
}

/// Converts the given roots and their descendants into plain nodes.
/// Ids that no longer resolve are skipped.
pub fn project(scene: &Scene, roots: &[NodeId]) -> Vec<ProjectedNode> {
    roots
        .iter()
        .filter_map(|id| {
            let node = scene.node(*id)?;
            Some(ProjectedNode {
                id: node.id(),
                name: node.name().to_string(),
                children: project(scene, node.children()),
            })
        })
        .collect()
}
