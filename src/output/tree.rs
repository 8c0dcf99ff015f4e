use std::io::{self, Write};

use super::{Format, write_json};
use crate::models::AgentTreeNode;

/// Render a tree in `format`. Children are shown sorted by agent id.
///
/// `max_depth` limits how many agent levels are shown; 0 shows all.
pub fn write_tree<W: Write>(
    w: &mut W,
    tree: &AgentTreeNode,
    format: Format,
    max_depth: usize,
) -> io::Result<()> {
    let mut sorted = tree.clone();
    sorted.sort_children_by_id();
    if max_depth > 0 {
        prune(&mut sorted, max_depth);
    }

    match format {
        Format::Json => write_json(w, &sorted),
        Format::Dot => write_tree_dot(w, &sorted),
        _ => write_tree_ascii(w, &sorted),
    }
}

fn prune(root: &mut AgentTreeNode, max_depth: usize) {
    let mut stack: Vec<(&mut AgentTreeNode, usize)> = vec![(root, 0)];
    while let Some((node, depth)) = stack.pop() {
        if depth >= max_depth {
            node.children.clear();
            continue;
        }
        stack.extend(node.children.iter_mut().map(|c| (c, depth + 1)));
    }
}

fn label(node: &AgentTreeNode) -> String {
    if node.agent_type.is_empty() {
        node.agent_id.clone()
    } else {
        format!("{} ({})", node.agent_id, node.agent_type)
    }
}

/// Box-drawing rendering, children in stored order.
pub fn write_tree_ascii<W: Write>(w: &mut W, tree: &AgentTreeNode) -> io::Result<()> {
    writeln!(w, "Session: {}", tree.session_id)?;
    writeln!(w, "├── Main conversation ({} entries)", tree.entry_count)?;

    // (node, prefix, is_last)
    let mut stack: Vec<(&AgentTreeNode, String, bool)> = Vec::new();
    push_children(&mut stack, &tree.children, "");

    while let Some((node, prefix, is_last)) = stack.pop() {
        let connector = if is_last { "└── " } else { "├── " };
        writeln!(w, "{}{}{}", prefix, connector, label(node))?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        writeln!(w, "{}└── {} entries", child_prefix, node.entry_count)?;
        push_children(&mut stack, &node.children, &child_prefix);
    }
    Ok(())
}

fn push_children<'a>(
    stack: &mut Vec<(&'a AgentTreeNode, String, bool)>,
    children: &'a [AgentTreeNode],
    prefix: &str,
) {
    let last = children.len().saturating_sub(1);
    for (i, child) in children.iter().enumerate().rev() {
        stack.push((child, prefix.to_string(), i == last));
    }
}

/// Graphviz `digraph`, one box per node and an edge from each parent.
pub fn write_tree_dot<W: Write>(w: &mut W, tree: &AgentTreeNode) -> io::Result<()> {
    writeln!(w, "digraph AgentTree {{")?;
    writeln!(w, "  rankdir=TB;")?;
    writeln!(w, "  node [shape=box];")?;
    writeln!(w)?;

    let root_id = dot_id(&tree.session_id);
    writeln!(
        w,
        "  {} [label=\"Session\\n{}\\n({} entries)\"];",
        root_id, tree.session_id, tree.entry_count
    )?;

    let mut stack: Vec<(&AgentTreeNode, String)> =
        tree.children.iter().rev().map(|c| (c, root_id.clone())).collect();
    while let Some((node, parent_id)) = stack.pop() {
        let node_id = dot_id(&node.agent_id);
        let mut text = node.agent_id.clone();
        if !node.agent_type.is_empty() {
            text = format!("{}\\n({})", text, node.agent_type);
        }
        writeln!(w, "  {} [label=\"{}\\n{} entries\"];", node_id, text, node.entry_count)?;
        writeln!(w, "  {} -> {};", parent_id, node_id)?;
        stack.extend(node.children.iter().rev().map(|c| (c, node_id.clone())));
    }

    writeln!(w, "}}")
}

/// Quoted DOT identifier, so ids starting with digits or holding dashes stay valid.
fn dot_id(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\\\""))
}
