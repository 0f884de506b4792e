use serde::Serialize;

use crate::core::member::{Member, MemberId};

/// Relatives of a single member, already looked up from a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Relatives {
    pub father: Option<Member>,
    pub mother: Option<Member>,
    pub spouse: Option<Member>,
    pub children: Vec<Member>,
    pub siblings: Vec<Member>,
}

impl Relatives {
    pub fn is_empty(&self) -> bool {
        self.father.is_none()
            && self.mother.is_none()
            && self.spouse.is_none()
            && self.children.is_empty()
            && self.siblings.is_empty()
    }
}

pub fn find_member<'a>(members: &'a [Member], id: &MemberId) -> Option<&'a Member> {
    members.iter().find(|member| &member.id == id)
}

pub fn children_of(members: &[Member], parent: &MemberId) -> Vec<Member> {
    members
        .iter()
        .filter(|member| &member.id != parent && member.is_child_of(parent))
        .cloned()
        .collect()
}

pub fn siblings_of(members: &[Member], member: &Member) -> Vec<Member> {
    members
        .iter()
        .filter(|other| member.is_sibling_of(other))
        .cloned()
        .collect()
}

pub fn parents_of(members: &[Member], member: &Member) -> (Option<Member>, Option<Member>) {
    let lookup = |id: &Option<MemberId>| {
        id.as_ref()
            .filter(|id| *id != &member.id)
            .and_then(|id| find_member(members, id))
            .cloned()
    };
    (lookup(&member.father_id), lookup(&member.mother_id))
}

/// Resolves everything the focal graph needs for `id`.
///
/// Returns `None` when `id` is not in the snapshot. Dangling references on the
/// focal member resolve to `None` rather than failing.
pub fn resolve_relatives(members: &[Member], id: &MemberId) -> Option<(Member, Relatives)> {
    let focal = find_member(members, id)?.clone();
    let (father, mother) = parents_of(members, &focal);
    let spouse = focal
        .spouse_id
        .as_ref()
        .filter(|spouse| *spouse != &focal.id)
        .and_then(|spouse| find_member(members, spouse))
        .cloned();
    let children = children_of(members, &focal.id);
    let siblings = siblings_of(members, &focal);

    Some((
        focal,
        Relatives {
            father,
            mother,
            spouse,
            children,
            siblings,
        },
    ))
}
