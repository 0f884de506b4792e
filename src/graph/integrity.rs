use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::core::member::{Member, MemberId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Father,
    Mother,
    Spouse,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Father => "father",
            Relation::Mother => "mother",
            Relation::Spouse => "spouse",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub member: MemberId,
    pub relation: Relation,
    pub target: MemberId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfReference {
    pub member: MemberId,
    pub relation: Relation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsymmetricSpouse {
    pub member: MemberId,
    pub spouse: MemberId,
    pub spouse_points_to: Option<MemberId>,
}

/// Data-quality findings for a member snapshot. The builders tolerate every
/// one of these; the report only makes them visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub duplicates: Vec<MemberId>,
    pub dangling: Vec<DanglingReference>,
    pub self_references: Vec<SelfReference>,
    pub asymmetric_spouses: Vec<AsymmetricSpouse>,
    pub cycles: Vec<Vec<MemberId>>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty()
            && self.dangling.is_empty()
            && self.self_references.is_empty()
            && self.asymmetric_spouses.is_empty()
            && self.cycles.is_empty()
    }

    pub fn issue_count(&self) -> usize {
        self.duplicates.len()
            + self.dangling.len()
            + self.self_references.len()
            + self.asymmetric_spouses.len()
            + self.cycles.len()
    }
}

fn relations(member: &Member) -> impl Iterator<Item = (Relation, &MemberId)> {
    member
        .father_id
        .iter()
        .map(|id| (Relation::Father, id))
        .chain(member.mother_id.iter().map(|id| (Relation::Mother, id)))
        .chain(member.spouse_id.iter().map(|id| (Relation::Spouse, id)))
}

pub fn check_members(members: &[Member]) -> IntegrityReport {
    let mut report = IntegrityReport::default();

    let mut lookup: HashMap<&MemberId, &Member> = HashMap::new();
    let mut reported_duplicates = HashSet::new();
    for member in members {
        if lookup.contains_key(&member.id) {
            if reported_duplicates.insert(&member.id) {
                report.duplicates.push(member.id.clone());
            }
            continue;
        }
        lookup.insert(&member.id, member);
    }

    for member in members {
        for (relation, target) in relations(member) {
            if target == &member.id {
                report.self_references.push(SelfReference {
                    member: member.id.clone(),
                    relation,
                });
                continue;
            }
            let Some(resolved) = lookup.get(target) else {
                report.dangling.push(DanglingReference {
                    member: member.id.clone(),
                    relation,
                    target: target.clone(),
                });
                continue;
            };
            if relation == Relation::Spouse && resolved.spouse_id.as_ref() != Some(&member.id) {
                report.asymmetric_spouses.push(AsymmetricSpouse {
                    member: member.id.clone(),
                    spouse: target.clone(),
                    spouse_points_to: resolved.spouse_id.clone(),
                });
            }
        }
    }

    report.cycles = ancestry_cycles(members, &lookup);
    report
}

/// Groups of members that are, through parent references, their own
/// ancestors.
fn ancestry_cycles(members: &[Member], lookup: &HashMap<&MemberId, &Member>) -> Vec<Vec<MemberId>> {
    let mut graph: DiGraph<&MemberId, ()> = DiGraph::new();
    let mut index: HashMap<&MemberId, NodeIndex> = HashMap::new();
    let mut order: HashMap<&MemberId, usize> = HashMap::new();
    for (position, member) in members.iter().enumerate() {
        if index.contains_key(&member.id) {
            continue;
        }
        index.insert(&member.id, graph.add_node(&member.id));
        order.insert(&member.id, position);
    }

    for member in lookup.values() {
        let child = index[&member.id];
        for parent in member.parent_ids() {
            if parent == &member.id {
                continue;
            }
            if let Some(&parent_idx) = index.get(parent) {
                graph.update_edge(parent_idx, child, ());
            }
        }
    }

    let mut cycles: Vec<Vec<MemberId>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            let mut ids: Vec<&MemberId> = component.into_iter().map(|idx| graph[idx]).collect();
            ids.sort_by_key(|id| order.get(id).copied().unwrap_or(usize::MAX));
            ids.into_iter().cloned().collect()
        })
        .collect();
    cycles.sort_by_key(|cycle| {
        cycle
            .first()
            .and_then(|id| order.get(id).copied())
            .unwrap_or(usize::MAX)
    });
    cycles
}
