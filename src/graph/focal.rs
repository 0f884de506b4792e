use std::collections::HashSet;

use serde::Deserialize;

use crate::core::member::{Gender, Member, MemberId};
use crate::core::relations::{resolve_relatives, Relatives};
use crate::graph::{EdgeClass, FlowEdge, FlowGraph, NodeClass, Position};
use crate::store::{self, MemberRepository};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FocalLayout {
    pub center_x: f64,
    pub row_spacing: f64,
    pub parent_offset: f64,
    pub sibling_spacing: f64,
    pub spouse_offset: f64,
    pub child_spacing: f64,
}

impl Default for FocalLayout {
    fn default() -> Self {
        Self {
            center_x: 250.0,
            row_spacing: 150.0,
            parent_offset: 100.0,
            sibling_spacing: 150.0,
            spouse_offset: 180.0,
            child_spacing: 150.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Father,
    Mother,
    Sibling,
    Spouse,
    Child,
}

impl Role {
    pub fn word(self, gender: Gender) -> &'static str {
        match (self, gender) {
            (Role::Father, _) => "Father",
            (Role::Mother, _) => "Mother",
            (Role::Sibling, Gender::Male) => "Brother",
            (Role::Sibling, Gender::Female) => "Sister",
            (Role::Sibling, Gender::Unknown) => "Sibling",
            (Role::Spouse, Gender::Male) => "Husband",
            (Role::Spouse, Gender::Female) => "Wife",
            (Role::Spouse, Gender::Unknown) => "Spouse",
            (Role::Child, Gender::Male) => "Son",
            (Role::Child, Gender::Female) => "Daughter",
            (Role::Child, Gender::Unknown) => "Child",
        }
    }

    fn node_class(self) -> NodeClass {
        match self {
            Role::Father | Role::Mother => NodeClass::Parent,
            Role::Sibling => NodeClass::Sibling,
            Role::Spouse => NodeClass::Spouse,
            Role::Child => NodeClass::Child,
        }
    }
}

pub fn role_label(role: Role, member: &Member) -> String {
    format!("{}: {}", role.word(member.gender()), member.first_name)
}

struct FocalCanvas<'a> {
    focal: &'a MemberId,
    graph: FlowGraph,
    placed: HashSet<MemberId>,
}

impl FocalCanvas<'_> {
    /// Places a relative and links it to the focal node. Relatives already on
    /// the canvas (including the focal member itself) are skipped.
    fn relative(&mut self, member: &Member, role: Role, position: Position) {
        if !self.placed.insert(member.id.clone()) {
            tracing::debug!(member = %member.id, ?role, "skipping relative already placed");
            return;
        }
        self.graph.push_node(
            &member.id,
            position,
            role_label(role, member),
            role.node_class(),
        );
        let edge = match role {
            Role::Father | Role::Mother => {
                FlowEdge::new(&member.id, self.focal, EdgeClass::Parent)
            }
            Role::Spouse => FlowEdge::spouse(self.focal, &member.id),
            Role::Child => FlowEdge::new(self.focal, &member.id, EdgeClass::Child),
            Role::Sibling => FlowEdge::new(self.focal, &member.id, EdgeClass::Sibling),
        };
        self.graph.push_edge(edge);
    }
}

/// Arranges a member's immediate family around it: parents above, siblings
/// and spouse alongside, children below.
///
/// `relatives` must already be resolved by the caller; nothing is looked up
/// here. Each category is positioned independently of the others.
pub fn build_focal_graph(focal: &Member, relatives: &Relatives, layout: &FocalLayout) -> FlowGraph {
    let center = layout.center_x;
    let parent_row = 0.0;
    let focal_row = layout.row_spacing;
    let child_row = layout.row_spacing * 2.0;

    let mut canvas = FocalCanvas {
        focal: &focal.id,
        graph: FlowGraph::new(),
        placed: HashSet::from([focal.id.clone()]),
    };
    canvas.graph.push_node(
        &focal.id,
        Position::new(center, focal_row),
        focal.full_name(),
        NodeClass::Focal,
    );

    match (&relatives.father, &relatives.mother) {
        (Some(father), Some(mother)) => {
            canvas.relative(
                father,
                Role::Father,
                Position::new(center - layout.parent_offset, parent_row),
            );
            canvas.relative(
                mother,
                Role::Mother,
                Position::new(center + layout.parent_offset, parent_row),
            );
        }
        (Some(father), None) => {
            canvas.relative(father, Role::Father, Position::new(center, parent_row));
        }
        (None, Some(mother)) => {
            canvas.relative(mother, Role::Mother, Position::new(center, parent_row));
        }
        (None, None) => {}
    }

    let (before, after) = relatives.siblings.split_at(relatives.siblings.len() / 2);
    for (idx, sibling) in before.iter().enumerate() {
        let steps = (before.len() - idx) as f64;
        let x = center - steps * layout.sibling_spacing;
        canvas.relative(sibling, Role::Sibling, Position::new(x, focal_row));
    }
    for (idx, sibling) in after.iter().enumerate() {
        let x = center + layout.spouse_offset + (idx + 1) as f64 * layout.sibling_spacing;
        canvas.relative(sibling, Role::Sibling, Position::new(x, focal_row));
    }

    if let Some(spouse) = &relatives.spouse {
        canvas.relative(
            spouse,
            Role::Spouse,
            Position::new(center + layout.spouse_offset, focal_row),
        );
    }

    let midpoint = (relatives.children.len() as f64 - 1.0) / 2.0;
    for (idx, child) in relatives.children.iter().enumerate() {
        let x = center + (idx as f64 - midpoint) * layout.child_spacing;
        canvas.relative(child, Role::Child, Position::new(x, child_row));
    }

    canvas.graph
}

/// Reads the current snapshot from `repo` and builds the focal graph for `id`.
/// `None` when `id` is not in the snapshot.
pub fn focal_graph_from<R>(
    repo: &R,
    id: &MemberId,
    layout: &FocalLayout,
) -> store::Result<Option<FlowGraph>>
where
    R: MemberRepository + ?Sized,
{
    let members = repo.members()?;
    Ok(resolve_relatives(&members, id)
        .map(|(focal, relatives)| build_focal_graph(&focal, &relatives, layout)))
}
