use std::collections::HashMap;

use serde_json::json;

use crate::core::member::{Member, MemberId};
use crate::error::{KinfolkError, Result};
use crate::graph::FlowGraph;

pub fn render_template(template: &str, context: &serde_json::Value) -> Result<String> {
    let context = tera::Context::from_serialize(context)
        .map_err(|err| KinfolkError::Other(anyhow::Error::new(err)))?;
    tera::Tera::one_off(template, &context, false)
        .map_err(|err| KinfolkError::Other(anyhow::Error::new(err)))
}

pub fn member_context(member: &Member) -> serde_json::Value {
    json!({
        "id": member.id.as_str(),
        "first_name": member.first_name,
        "last_name": member.last_name,
        "full_name": member.full_name(),
        "gender": member.gender,
        "birth_date": member.birth_date,
    })
}

/// Replaces each node label with `template` rendered against the member the
/// node was built from. Nodes without a matching member keep their label.
pub fn relabel_nodes(graph: &mut FlowGraph, members: &[Member], template: &str) -> Result<()> {
    let mut lookup: HashMap<&MemberId, &Member> = HashMap::new();
    for member in members {
        lookup.entry(&member.id).or_insert(member);
    }
    for node in &mut graph.nodes {
        if let Some(member) = lookup.get(&node.id) {
            node.label = render_template(template, &member_context(member))?
                .trim()
                .to_string();
        }
    }
    Ok(())
}
