use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::discovery::{AgentListing, DiscoveredAgent, discover_agents};
use crate::error::{HistoryError, ResourceKind, Result};
use crate::models::AgentTreeNode;
use crate::parsers::{MalformedPolicy, count_entries};
use crate::tree::agent_type;
use crate::utils::paths::{session_dir_in, session_file_in};

/// Assemble the agent hierarchy of a session from a discovery listing.
///
/// Each agent's entry count takes one streaming pass over its file; those passes run in parallel
/// but results are attached in discovery order. An agent whose file can't be read is left out
/// with a warning, and its descendants move up to the nearest surviving ancestor (or the root).
/// Every other discovered agent appears exactly once.
pub fn build_agent_tree(
    session_id: &str,
    session_file: PathBuf,
    root_entry_count: usize,
    listing: &AgentListing,
    policy: MalformedPolicy,
) -> AgentTreeNode {
    let mut root = AgentTreeNode::root(session_id, session_file, root_entry_count);
    let agents = listing.agents();
    if agents.is_empty() {
        return root;
    }

    let counts: Vec<Option<usize>> = agents
        .par_iter()
        .map(|agent| match count_entries(&agent.path, policy) {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(agent = %agent.agent_id, error = %e, "Omitting unreadable agent from tree");
                None
            }
        })
        .collect();

    let parents = assign_parents(agents, &counts);

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); agents.len()];
    let mut top_level = Vec::new();
    for (i, parent) in parents.iter().enumerate() {
        if counts[i].is_none() {
            continue;
        }
        match parent {
            Some(p) => children[*p].push(i),
            None => top_level.push(i),
        }
    }

    let mut slots: Vec<Option<AgentTreeNode>> = agents
        .iter()
        .zip(&counts)
        .map(|(agent, count)| count.map(|n| agent_node(session_id, agent, n)))
        .collect();

    // Pre-order walk; consuming it backwards finishes every child before its parent.
    let mut order = Vec::with_capacity(agents.len());
    let mut stack: Vec<usize> = top_level.iter().rev().copied().collect();
    while let Some(i) = stack.pop() {
        order.push(i);
        stack.extend(children[i].iter().rev());
    }
    for &i in order.iter().rev() {
        let kids: Vec<AgentTreeNode> =
            children[i].iter().filter_map(|&c| slots[c].take()).collect();
        if let Some(node) = slots[i].as_mut() {
            node.children = kids;
        }
    }

    root.children = top_level.iter().filter_map(|&i| slots[i].take()).collect();
    debug!(session = session_id, agents = root.descendant_count(), "Built agent tree");
    root
}

/// Build the tree for a session stored in `project_dir`.
///
/// The session file must exist; a session without a `subagents` directory gets a lone root.
pub fn build_session_tree(
    project_dir: &Path,
    session_id: &str,
    policy: MalformedPolicy,
) -> Result<AgentTreeNode> {
    let session_file = session_file_in(project_dir, session_id);
    if !session_file.is_file() {
        return Err(HistoryError::not_found(ResourceKind::Session, session_id));
    }

    let root_entry_count = count_entries(&session_file, policy)?;
    let listing = discover_agents(&session_dir_in(project_dir, session_id))?;
    Ok(build_agent_tree(session_id, session_file, root_entry_count, &listing, policy))
}

fn agent_node(session_id: &str, agent: &DiscoveredAgent, entry_count: usize) -> AgentTreeNode {
    AgentTreeNode {
        agent_id: agent.agent_id.clone(),
        session_id: session_id.to_string(),
        agent_type: agent_type(&agent.agent_id).to_string(),
        entry_count,
        file_path: agent.path.clone(),
        children: Vec::new(),
    }
}

/// Parent slot for every agent; `None` attaches to the root.
///
/// Omitted owners are skipped over. An edge that would close a cycle (possible when agent ids
/// repeat at different depths) is dropped in favour of the root.
fn assign_parents(agents: &[DiscoveredAgent], counts: &[Option<usize>]) -> Vec<Option<usize>> {
    let mut first_by_id: HashMap<&str, usize> = HashMap::with_capacity(agents.len());
    for (i, agent) in agents.iter().enumerate() {
        first_by_id.entry(agent.agent_id.as_str()).or_insert(i);
    }

    let mut parents: Vec<Option<usize>> = vec![None; agents.len()];
    for i in 0..agents.len() {
        let mut owner = agents[i].parent_id.as_deref();
        let mut hops = 0;
        let mut chosen = None;
        while let Some(id) = owner {
            hops += 1;
            let Some(&j) = first_by_id.get(id) else { break };
            if j == i || hops > agents.len() {
                break;
            }
            if counts[j].is_some() {
                chosen = Some(j);
                break;
            }
            owner = agents[j].parent_id.as_deref();
        }

        if let Some(j) = chosen
            && !is_ancestor(&parents, i, j)
        {
            parents[i] = Some(j);
        }
    }
    parents
}

/// True if `candidate` is `node` or sits below it under the current assignment.
fn is_ancestor(parents: &[Option<usize>], node: usize, candidate: usize) -> bool {
    let mut current = Some(candidate);
    let mut hops = 0;
    while let Some(c) = current {
        if c == node {
            return true;
        }
        hops += 1;
        if hops > parents.len() {
            return true;
        }
        current = parents[c];
    }
    false
}
