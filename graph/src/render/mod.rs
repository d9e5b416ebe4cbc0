pub mod view;
pub mod dot;

pub use view::{to_json, GraphView, LayoutHints, LinkView, NodeView, RenderOptions};
pub use dot::{to_dot, DotWriter};
