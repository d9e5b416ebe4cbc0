use super::view::RenderOptions;
use crate::compact::CommitGraph;
use crate::core::{EdgeClass, VizNode};

/// Minimal Graphviz `digraph` builder
pub struct DotWriter {
    out: String,
}

impl DotWriter {
    pub fn new(name: &str) -> Self {
        let mut out = format!("digraph {} {{\n", quote(name));
        out.push_str("  rankdir=LR;\n");
        Self { out }
    }

    pub fn node(&mut self, id: usize, attrs: &[(&str, String)]) {
        self.out.push_str(&format!("  n{}{};\n", id, format_attrs(attrs)));
    }

    pub fn edge(&mut self, from: usize, to: usize, attrs: &[(&str, String)]) {
        self.out
            .push_str(&format!("  n{} -> n{}{};\n", from, to, format_attrs(attrs)));
    }

    pub fn finish(mut self) -> String {
        self.out.push_str("}\n");
        self.out
    }
}

fn format_attrs(attrs: &[(&str, String)]) -> String {
    if attrs.is_empty() {
        return String::new();
    }

    let body: Vec<String> = attrs
        .iter()
        .map(|(key, value)| format!("{}={}", key, quote(value)))
        .collect();
    format!(" [{}]", body.join(", "))
}

/// Double-quote a DOT ID, escaping embedded quotes and backslashes
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Render a compacted commit graph as DOT
pub fn to_dot(graph: &CommitGraph, options: &RenderOptions) -> String {
    let mut dot = DotWriter::new("commits");

    for (id, node) in graph.nodes().iter().enumerate() {
        let shape = match node {
            VizNode::Instance(_) => "box",
            VizNode::Commit { .. } => "ellipse",
            VizNode::Anchor { .. } => "doublecircle",
        };
        dot.node(
            id,
            &[
                ("label", node.name().to_string()),
                ("shape", shape.to_string()),
                ("class", node.class().to_string()),
            ],
        );
    }

    for edge in graph.edges() {
        let mut attrs = vec![("penwidth", format!("{:.2}", edge.stroke_width(options.stroke_scale)))];
        if !edge.path.is_empty() {
            attrs.push(("label", edge.path.len().to_string()));
        }
        if edge.class == EdgeClass::Anchor {
            attrs.push(("style", "dashed".to_string()));
        }
        dot.edge(edge.source.0, edge.target.0, &attrs);
    }

    dot.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact::{compact, Canvas};

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote(r#"a "b" \c"#), r#""a \"b\" \\c""#);
    }

    #[test]
    fn test_diamond_dot() {
        let graph = compact(
            &[("A", "B"), ("B", "C"), ("B", "D"), ("D", "E"), ("C", "E")],
            &[],
            &Canvas::default(),
        )
        .unwrap();
        let dot = to_dot(&graph, &RenderOptions::default());

        assert!(dot.starts_with("digraph \"commits\" {\n"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("n0 [label=\"source\", shape=\"doublecircle\", class=\"anchor\"];"));
        assert!(dot.contains("n2 [label=\"B\", shape=\"ellipse\", class=\"commit\"];"));
        assert!(dot.contains("n0 -> n2 [penwidth=\"4.00\", label=\"1\"];"));
        assert!(dot.contains("n3 -> n1 [penwidth=\"1.00\", style=\"dashed\"];"));
        assert_eq!(dot.matches(" -> ").count(), graph.edges().len());
    }
}
