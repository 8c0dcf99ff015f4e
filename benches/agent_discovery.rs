use std::fs;
use std::hint::black_box;
use std::path::Path;

use claude_history::MalformedPolicy;
use claude_history::discovery::discover_agents;
use claude_history::tree::build_session_tree;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tempfile::TempDir;

const SESSION: &str = "679761ba-80c0-4cd3-a586-cc6a1fc56308";
const ENTRIES_PER_AGENT: usize = 20;

fn write_agent(dir: &Path, agent_id: &str) {
    let line = format!(r#"{{"type":"assistant","agentId":"{}"}}"#, agent_id);
    let content = vec![line; ENTRIES_PER_AGENT].join("\n");
    fs::write(dir.join(format!("agent-{}.jsonl", agent_id)), content).unwrap();
}

/// A session whose agents each spawn `fanout` agents, `depth` levels deep.
fn generate_agent_tree(fanout: usize, depth: usize) -> TempDir {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join(format!("{}.jsonl", SESSION)), r#"{"type":"user"}"#).unwrap();

    let mut level = vec![(project.path().join(SESSION).join("subagents"), String::new())];
    for _ in 0..depth {
        let mut next = Vec::new();
        for (dir, prefix) in &level {
            fs::create_dir_all(dir).unwrap();
            for i in 0..fanout {
                let agent_id = format!("{}{:x}", prefix, i);
                write_agent(dir, &agent_id);
                next.push((dir.join(format!("agent-{}", agent_id)).join("subagents"), agent_id));
            }
        }
        level = next;
    }

    project
}

fn bench_agent_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("agent_discovery");

    for (fanout, depth) in [(10, 1), (4, 3), (2, 8)].iter() {
        let project = generate_agent_tree(*fanout, *depth);
        let session_dir = project.path().join(SESSION);
        let label = format!("{}x{}", fanout, depth);

        group.bench_with_input(BenchmarkId::new("discover_agents", &label), &label, |b, _| {
            b.iter(|| discover_agents(black_box(&session_dir)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("build_session_tree", &label), &label, |b, _| {
            b.iter(|| {
                build_session_tree(black_box(project.path()), SESSION, MalformedPolicy::Skip)
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_agent_discovery);
criterion_main!(benches);
