use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::core::member::{Member, MemberId};
use crate::graph::{EdgeClass, FlowEdge, FlowGraph, NodeClass, Position};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FamilyLayout {
    #[serde(default = "default_column_spacing")]
    pub column_spacing: f64,
    #[serde(default = "default_row_spacing")]
    pub row_spacing: f64,
}

impl Default for FamilyLayout {
    fn default() -> Self {
        Self {
            column_spacing: default_column_spacing(),
            row_spacing: default_row_spacing(),
        }
    }
}

fn default_column_spacing() -> f64 {
    220.0
}

fn default_row_spacing() -> f64 {
    180.0
}

struct Placer<'a> {
    layout: &'a FamilyLayout,
    graph: FlowGraph,
    positioned: HashSet<&'a MemberId>,
}

impl<'a> Placer<'a> {
    fn place(&mut self, member: &'a Member, column: usize, row: usize, class: NodeClass) {
        let position = Position::new(
            column as f64 * self.layout.column_spacing,
            row as f64 * self.layout.row_spacing,
        );
        self.graph
            .push_node(&member.id, position, member.full_name(), class);
        self.positioned.insert(&member.id);
    }

    fn is_placed(&self, id: &MemberId) -> bool {
        self.positioned.contains(id)
    }
}

/// Lays out the whole family in two rows: parentless members (with their
/// spouses beside them) on top, everyone with a recorded parent below.
///
/// Never fails: references to unknown ids simply produce no edge, and each
/// distinct id yields exactly one node.
pub fn build_family_tree(members: &[Member], layout: &FamilyLayout) -> FlowGraph {
    if members.is_empty() {
        return FlowGraph::new();
    }

    let mut lookup: HashMap<&MemberId, &Member> = HashMap::new();
    for member in members {
        lookup.entry(&member.id).or_insert(member);
    }

    let (roots, children): (Vec<&Member>, Vec<&Member>) =
        members.iter().partition(|member| member.is_root());

    let mut placer = Placer {
        layout,
        graph: FlowGraph::new(),
        positioned: HashSet::new(),
    };

    let mut column = 0;
    for &root in &roots {
        if placer.is_placed(&root.id) {
            continue;
        }
        placer.place(root, column, 0, NodeClass::Default);
        column += 1;

        let spouse = root
            .spouse_id
            .as_ref()
            .and_then(|id| lookup.get(id).copied());
        if let Some(spouse) = spouse {
            if !placer.is_placed(&spouse.id) {
                placer.place(spouse, column, 0, NodeClass::Spouse);
                placer
                    .graph
                    .push_edge(FlowEdge::spouse(&root.id, &spouse.id));
                column += 1;
            }
        }
    }
    let mut next_top_column = column;

    let mut child_column = 0;
    for &child in &children {
        if placer.is_placed(&child.id) {
            continue;
        }
        placer.place(child, child_column, 1, NodeClass::Child);
        child_column += 1;
    }

    for child in &children {
        for parent in child.parent_ids() {
            if parent == &child.id || !placer.is_placed(parent) {
                continue;
            }
            placer
                .graph
                .push_edge(FlowEdge::new(parent, &child.id, EdgeClass::Parent));
        }
    }

    for member in members {
        if placer.is_placed(&member.id) {
            continue;
        }
        placer.place(member, next_top_column, 0, NodeClass::Default);
        next_top_column += 1;
    }

    tracing::debug!(
        members = members.len(),
        nodes = placer.graph.nodes.len(),
        edges = placer.graph.edges.len(),
        "built family tree"
    );
    placer.graph
}
