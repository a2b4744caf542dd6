pub mod node_link;
pub mod store;

pub use node_link::{NodeLinkDocument, NodeLinkEdge, NodeLinkNode};
pub use store::{BlockEntry, BlockStatus, DagStore, InsertOutcome};
