pub mod node;
pub mod edge;
pub mod dag;

pub use node::{short_id, Anchor, NodeId, Position, TrackedInstance, VizNode, SHORT_ID_LEN};
pub use edge::{EdgeClass, VizEdge};
pub use dag::{Dag, DagStats, Vertex, VertexIdx};
