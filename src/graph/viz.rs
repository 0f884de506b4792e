use std::collections::BTreeMap;

use crate::graph::FlowGraph;

/// Graphviz rendering that pins every node at its computed position
/// (`neato -n` honours `pos`). Graphviz's y axis points up, so rows are
/// flipped.
pub fn render_dot(graph: &FlowGraph) -> String {
    let mut out = String::from("digraph kinfolk {\n");
    out.push_str("  node [shape=box];\n");
    for node in &graph.nodes {
        out.push_str(&format!(
            "  \"{}\" [label=\"{}\", class=\"{}\", pos=\"{},{}!\"];\n",
            escape_dot(node.id.as_str()),
            escape_dot(&node.label),
            node.style_class.as_str(),
            node.position.x,
            // not `-y`: row 0 would print as -0
            0.0 - node.position.y
        ));
    }
    for edge in &graph.edges {
        let mut attrs = vec![format!("class=\"{}\"", edge.style_class.as_str())];
        if edge.style_class.is_dashed() {
            attrs.push("style=dashed".to_string());
        }
        if let Some(label) = &edge.label {
            attrs.push(format!("label=\"{}\"", escape_dot(label)));
        }
        if edge.animated {
            attrs.push("penwidth=2".to_string());
        }
        out.push_str(&format!(
            "  \"{}\" -> \"{}\" [{}];\n",
            escape_dot(edge.source.as_str()),
            escape_dot(edge.target.as_str()),
            attrs.join(", ")
        ));
    }
    out.push_str("}\n");
    out
}

/// Plain text view: one line per row of nodes, left to right, then the edges.
pub fn render_rows(graph: &FlowGraph) -> String {
    let mut rows: BTreeMap<i64, Vec<_>> = BTreeMap::new();
    for node in &graph.nodes {
        rows.entry(node.position.y.round() as i64)
            .or_default()
            .push(node);
    }

    let mut out = String::new();
    for (idx, nodes) in rows.values_mut().enumerate() {
        nodes.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
        let line = nodes
            .iter()
            .map(|node| format!("{} [{}]", node.label, node.id))
            .collect::<Vec<_>>()
            .join("  |  ");
        out.push_str(&format!("row {idx}: {line}\n"));
    }

    if !graph.edges.is_empty() {
        out.push_str("edges:\n");
        for edge in &graph.edges {
            let arrow = if edge.style_class.is_dashed() { "-->" } else { "->" };
            out.push_str(&format!(
                "  {} {} {} ({}",
                edge.source,
                arrow,
                edge.target,
                edge.style_class.as_str()
            ));
            if let Some(label) = &edge.label {
                out.push_str(&format!(" {label}"));
            }
            out.push_str(")\n");
        }
    }
    out
}

fn escape_dot(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use crate::core::member::Member;
    use crate::graph::family::{build_family_tree, FamilyLayout};
    use crate::graph::viz::{render_dot, render_rows};

    fn members() -> Vec<Member> {
        vec![
            Member::new("a", "Ann \"Nan\"", "Ek").with_spouse("b"),
            Member::new("b", "Bo", "Ek"),
            Member::new("c", "Cy", "Ek").with_mother("a"),
        ]
    }

    #[test]
    fn dot_output_escapes_labels_and_pins_positions() {
        let graph = build_family_tree(&members(), &FamilyLayout::default());
        let dot = render_dot(&graph);
        assert!(dot.starts_with("digraph kinfolk {\n"));
        assert!(dot.contains(r#""a" [label="Ann \"Nan\" Ek", class="default", pos="0,0!"];"#));
        assert!(dot.contains(r#""c" [label="Cy Ek", class="child", pos="0,-180!"];"#));
        assert!(dot.contains(r#""a" -> "c" [class="parent"];"#));
        assert!(dot.contains("penwidth=2"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn rows_are_listed_top_to_bottom() {
        let graph = build_family_tree(&members(), &FamilyLayout::default());
        let text = render_rows(&graph);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "row 0: Ann \"Nan\" Ek [a]  |  Bo Ek [b]");
        assert_eq!(lines[1], "row 1: Cy Ek [c]");
        assert_eq!(lines[2], "edges:");
        assert!(lines.contains(&"  a -> c (parent)"));
    }
}
