use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of an orientation node within a host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Host scene graph the orientation node's camera lives in.
///
/// The node calls [`attach`](Self::attach) when installed and
/// [`detach`](Self::detach) exactly once when replaced or shut down, so the
/// scene never keeps a reference to a node that no longer exists.
pub trait SceneHandle: Send {
    /// Add the node's point-of-view camera to the scene.
    fn attach(&mut self, node: NodeId);

    /// Remove the node from the scene.
    fn detach(&mut self, node: NodeId);
}
