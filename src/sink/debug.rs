use tracing::info;

use crate::node::Node;

/// Logs every node instead of storing it.
#[derive(Default)]
pub struct DebugSink {}

impl super::NodeSink for DebugSink {
    type Error = std::convert::Infallible;

    async fn create_node(&self, node: Node) -> Result<(), Self::Error> {
        let internal = node.internal();
        info!(
            id = %node.id(),
            node_type = internal.node_type.as_str(),
            digest = %internal.content_digest,
            ?node,
            "create node"
        );
        Ok(())
    }
}
