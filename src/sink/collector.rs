use tracing::trace;

use crate::node::Node;

/// Gathers nodes in memory; safe to share between concurrently processed rows.
#[derive(Default)]
pub struct NodeCollector {
    queue: crossbeam::queue::SegQueue<Node>,
}

impl NodeCollector {
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drain the collected nodes in arrival order.
    pub fn collect(self) -> Vec<Node> {
        trace!(count = self.queue.len(), "collect all nodes");
        self.queue.into_iter().collect()
    }

    /// Drain the collected nodes, sorted by id.
    pub fn collect_sorted(self) -> Vec<Node> {
        let mut nodes = self.collect();
        nodes.sort_by(|a, b| a.id().cmp(b.id()));
        nodes
    }
}

impl super::NodeSink for NodeCollector {
    type Error = std::convert::Infallible;

    async fn create_node(&self, node: Node) -> Result<(), Self::Error> {
        trace!(id = %node.id(), node_type = node.internal().node_type.as_str(), "create node");
        self.queue.push(node);
        Ok(())
    }
}
