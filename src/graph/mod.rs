use std::collections::HashSet;

use serde::Serialize;

use crate::core::member::MemberId;

pub mod family;
pub mod focal;
pub mod integrity;
pub mod viz;

pub const SPOUSE_GLYPH: &str = "\u{2764}";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeClass {
    Default,
    Spouse,
    Child,
    #[serde(rename = "self")]
    Focal,
    Parent,
    Sibling,
}

impl NodeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeClass::Default => "default",
            NodeClass::Spouse => "spouse",
            NodeClass::Child => "child",
            NodeClass::Focal => "self",
            NodeClass::Parent => "parent",
            NodeClass::Sibling => "sibling",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeClass {
    Parent,
    Spouse,
    Child,
    Sibling,
}

impl EdgeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeClass::Parent => "parent",
            EdgeClass::Spouse => "spouse",
            EdgeClass::Child => "child",
            EdgeClass::Sibling => "sibling",
        }
    }

    pub fn is_dashed(&self) -> bool {
        matches!(self, EdgeClass::Sibling)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub id: MemberId,
    pub position: Position,
    pub label: String,
    pub style_class: NodeClass,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub id: String,
    pub source: MemberId,
    pub target: MemberId,
    pub style_class: EdgeClass,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub animated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FlowEdge {
    pub fn new(source: &MemberId, target: &MemberId, style_class: EdgeClass) -> Self {
        Self {
            id: format!(
                "e-{}-{}-{}",
                style_class.as_str(),
                escape_id_part(source.as_str()),
                escape_id_part(target.as_str())
            ),
            source: source.clone(),
            target: target.clone(),
            style_class,
            animated: false,
            label: None,
        }
    }

    pub fn spouse(source: &MemberId, target: &MemberId) -> Self {
        Self {
            animated: true,
            label: Some(SPOUSE_GLYPH.to_string()),
            ..Self::new(source, target, EdgeClass::Spouse)
        }
    }
}

/// Percent-encodes `%` and `-` so the `-` separators in edge ids stay
/// unambiguous for member ids that contain hyphens.
fn escape_id_part(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for ch in part.chars() {
        match ch {
            '%' => escaped.push_str("%25"),
            '-' => escaped.push_str("%2D"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Node/edge lists handed to a node-link diagram renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_node(
        &mut self,
        id: &MemberId,
        position: Position,
        label: impl Into<String>,
        style_class: NodeClass,
    ) {
        self.nodes.push(FlowNode {
            id: id.clone(),
            position,
            label: label.into(),
            style_class,
        });
    }

    /// Adds `edge` unless an edge of the same class between the same
    /// endpoints is already present.
    pub fn push_edge(&mut self, edge: FlowEdge) {
        if self.edges.iter().any(|existing| {
            existing.style_class == edge.style_class
                && existing.source == edge.source
                && existing.target == edge.target
        }) {
            return;
        }
        self.edges.push(edge);
    }

    pub fn node(&self, id: &MemberId) -> Option<&FlowNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn edges_of_class(&self, class: EdgeClass) -> impl Iterator<Item = &FlowEdge> {
        self.edges.iter().filter(move |edge| edge.style_class == class)
    }

    pub fn dangling_edges(&self) -> Vec<&FlowEdge> {
        let ids: HashSet<&MemberId> = self.nodes.iter().map(|node| &node.id).collect();
        self.edges
            .iter()
            .filter(|edge| !ids.contains(&edge.source) || !ids.contains(&edge.target))
            .collect()
    }

    pub fn is_well_formed(&self) -> bool {
        let mut seen = HashSet::new();
        let unique = self.nodes.iter().all(|node| seen.insert(&node.id));
        unique && self.dangling_edges().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::core::member::MemberId;
    use crate::graph::{EdgeClass, FlowEdge, FlowGraph, NodeClass, Position};

    #[test]
    fn push_edge_ignores_repeated_edges() {
        let mut graph = FlowGraph::new();
        let a = MemberId::new("a");
        let b = MemberId::new("b");
        graph.push_node(&a, Position::new(0.0, 0.0), "A", NodeClass::Default);
        graph.push_node(&b, Position::new(0.0, 180.0), "B", NodeClass::Child);
        graph.push_edge(FlowEdge::new(&a, &b, EdgeClass::Parent));
        graph.push_edge(FlowEdge::new(&a, &b, EdgeClass::Parent));
        assert_eq!(graph.edges.len(), 1);
        assert!(graph.is_well_formed());
    }

    #[test]
    fn hyphenated_ids_keep_edge_ids_distinct() {
        let mut graph = FlowGraph::new();
        let ids: Vec<MemberId> = ["a", "a-b", "c", "b-c"]
            .into_iter()
            .map(MemberId::new)
            .collect();
        for id in &ids {
            graph.push_node(id, Position::new(0.0, 0.0), id.as_str(), NodeClass::Default);
        }
        let first = FlowEdge::new(&ids[1], &ids[2], EdgeClass::Parent);
        let second = FlowEdge::new(&ids[0], &ids[3], EdgeClass::Parent);
        assert_eq!(first.id, "e-parent-a%2Db-c");
        assert_eq!(second.id, "e-parent-a-b%2Dc");
        graph.push_edge(first);
        graph.push_edge(second);
        assert_eq!(graph.edges.len(), 2);
        assert_ne!(graph.edges[0].id, graph.edges[1].id);
    }

    #[test]
    fn escapes_percent_signs_in_edge_ids() {
        let edge = FlowEdge::new(&MemberId::new("50%"), &MemberId::new("x"), EdgeClass::Child);
        assert_eq!(edge.id, "e-child-50%25-x");
    }

    #[test]
    fn dangling_edges_are_reported() {
        let mut graph = FlowGraph::new();
        let a = MemberId::new("a");
        graph.push_node(&a, Position::new(0.0, 0.0), "A", NodeClass::Default);
        graph.push_edge(FlowEdge::new(&a, &MemberId::new("ghost"), EdgeClass::Child));
        assert_eq!(graph.dangling_edges().len(), 1);
        assert!(!graph.is_well_formed());
    }

    #[test]
    fn serializes_to_renderer_contract() {
        let mut graph = FlowGraph::new();
        let a = MemberId::new("a");
        let b = MemberId::new("b");
        graph.push_node(&a, Position::new(0.0, 0.0), "A", NodeClass::Default);
        graph.push_node(&b, Position::new(220.0, 0.0), "B", NodeClass::Spouse);
        graph.push_edge(FlowEdge::spouse(&a, &b));
        graph.push_edge(FlowEdge::new(&a, &b, EdgeClass::Sibling));

        let value = serde_json::to_value(&graph).expect("serialize graph");
        assert_eq!(value["nodes"][1]["styleClass"], "spouse");
        assert_eq!(value["nodes"][1]["position"]["x"], 220.0);
        assert_eq!(value["edges"][0]["animated"], true);
        assert_eq!(value["edges"][0]["label"], "\u{2764}");
        assert!(value["edges"][1].get("animated").is_none());
        assert!(value["edges"][1].get("label").is_none());
    }
}
