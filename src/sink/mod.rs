//! Node sinks
//!
//! The sink is append-only and receives every node the pipeline builds.

use crate::node::Node;

pub mod collector;
pub mod debug;
pub mod jsonl;

pub use collector::NodeCollector;
pub use debug::DebugSink;
pub use jsonl::JsonLinesSink;

pub trait NodeSink {
    type Error;
    fn create_node(&self, node: Node) -> impl Future<Output = Result<(), Self::Error>>;
}
