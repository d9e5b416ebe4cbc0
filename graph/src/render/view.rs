use crate::compact::CommitGraph;
use crate::core::{EdgeClass, VizNode};
use serde::Serialize;
use serde_json::{Map, Value};

/// Styling and force-layout knobs passed through to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Multiplier on `sqrt(path length)` for edge stroke width
    pub stroke_scale: f64,
    pub charge: f64,
    pub link_distance: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            stroke_scale: 4.0,
            charge: -3000.0,
            link_distance: 150.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutHints {
    pub width: f64,
    pub height: f64,
    pub charge: f64,
    pub link_distance: f64,
}

/// Serializable node as a d3-style force layout expects it
#[derive(Debug, Clone, Serialize)]
pub struct NodeView<'a> {
    pub id: usize,
    pub name: &'a str,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    pub fixed: bool,
    pub radius: f64,
    /// Instance fields beyond commit and name
    #[serde(flatten)]
    pub extra: Option<&'a Map<String, Value>>,
}

/// Serializable link; `source` and `target` index into `nodes`
#[derive(Debug, Clone, Serialize)]
pub struct LinkView<'a> {
    pub source: usize,
    pub target: usize,
    pub path: &'a [String],
    pub class: EdgeClass,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphView<'a> {
    pub nodes: Vec<NodeView<'a>>,
    pub links: Vec<LinkView<'a>>,
    pub layout: LayoutHints,
}

impl<'a> GraphView<'a> {
    pub fn new(graph: &'a CommitGraph, options: &RenderOptions) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .enumerate()
            .map(|(id, node)| {
                let position = node.position();
                NodeView {
                    id,
                    name: node.name(),
                    kind: node.class(),
                    commit: node.commit_id(),
                    x: position.map(|p| p.x),
                    y: position.map(|p| p.y),
                    fixed: position.is_some(),
                    radius: node.radius(),
                    extra: match node {
                        VizNode::Instance(instance) => Some(&instance.extra),
                        _ => None,
                    },
                }
            })
            .collect();

        let links = graph
            .edges()
            .iter()
            .map(|edge| LinkView {
                source: edge.source.0,
                target: edge.target.0,
                path: &edge.path,
                class: edge.class,
                stroke_width: edge.stroke_width(options.stroke_scale),
            })
            .collect();

        let canvas = graph.canvas();
        Self {
            nodes,
            links,
            layout: LayoutHints {
                width: canvas.width,
                height: canvas.height,
                charge: options.charge,
                link_distance: options.link_distance,
            },
        }
    }
}

/// Pretty-printed JSON for the renderer
pub fn to_json(graph: &CommitGraph, options: &RenderOptions) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&GraphView::new(graph, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact::{compact, Canvas};
    use crate::core::TrackedInstance;
    use serde_json::json;

    #[test]
    fn test_linear_chain_view() {
        let graph = compact(&[("A", "B"), ("B", "C"), ("C", "D")], &[], &Canvas::default()).unwrap();
        let value = serde_json::to_value(GraphView::new(&graph, &RenderOptions::default())).unwrap();

        assert_eq!(
            value["nodes"][0],
            json!({
                "id": 0,
                "name": "source",
                "kind": "anchor",
                "x": 20.0,
                "y": 300.0,
                "fixed": true,
                "radius": 10.0,
            })
        );
        assert_eq!(
            value["links"][0],
            json!({
                "source": 0,
                "target": 1,
                "path": ["A", "B", "C", "D"],
                "class": "commit",
                "stroke_width": 8.0,
            })
        );
        assert_eq!(value["layout"]["charge"], json!(-3000.0));
    }

    #[test]
    fn test_instance_fields_are_flattened() {
        let mut instance = TrackedInstance::new("B", "prod");
        instance.extra.insert("env".into(), json!("production"));
        let graph = compact(&[("A", "B")], &[instance], &Canvas::default()).unwrap();

        let value = serde_json::to_value(GraphView::new(&graph, &RenderOptions::default())).unwrap();
        let node = &value["nodes"][2];

        assert_eq!(node["kind"], json!("instance"));
        assert_eq!(node["commit"], json!("B"));
        assert_eq!(node["env"], json!("production"));
        assert_eq!(node["fixed"], json!(false));
        assert!(node.get("x").is_none());
    }
}
