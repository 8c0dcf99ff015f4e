/// End-to-end integration tests for the history store
///
/// These tests build a fake `~/.claude` tree and drive it through the public API:
/// discovery → session metadata → entries → agent trees
mod common;

use claude_history::discovery::{discover_agents, discover_projects, list_session_files};
use claude_history::models::SessionSource;
use claude_history::parsers::count_entries;
use claude_history::session::{summarize_session, truncate_prompt};
use claude_history::{
    EntryType, HistoryStore, MalformedPolicy, QueryScope, ScanControl, StoreConfig, scan_entries,
};
use claude_history::filters::AgentSearch;
use claude_history::{FilterOptions, HistoryError, read_entries};
use common::{
    ClaudeDirBuilder, EntryBuilder, PROJECT_NAME, PROJECT_PATH, SESSION_A, SESSION_B, agent_path,
    realistic_claude_dir, user_entries,
};
use serde_json::json;

fn store_for(builder: &ClaudeDirBuilder) -> HistoryStore {
    HistoryStore::new(StoreConfig::new(builder.path()))
}

#[test]
fn test_e2e_read_every_line() {
    let builder = ClaudeDirBuilder::new().with_session(PROJECT_NAME, SESSION_A, &user_entries(25));
    let path = builder.project_dir(PROJECT_NAME).join(format!("{}.jsonl", SESSION_A));

    let entries = read_entries(&path, MalformedPolicy::Skip).unwrap();
    assert_eq!(entries.len(), 25);
    assert_eq!(entries[0].text_content(), "message 0");
    assert_eq!(entries[24].text_content(), "message 24");
    assert_eq!(count_entries(&path, MalformedPolicy::Skip).unwrap(), 25);
}

#[test]
fn test_e2e_early_stop_visits_at_most_k() {
    let builder = ClaudeDirBuilder::new().with_session(PROJECT_NAME, SESSION_A, &user_entries(50));
    let path = builder.project_dir(PROJECT_NAME).join(format!("{}.jsonl", SESSION_A));

    for k in [1, 3, 49] {
        let mut seen = 0;
        let outcome = scan_entries(&path, MalformedPolicy::Skip, |_| {
            seen += 1;
            if seen == k { ScanControl::Stop } else { ScanControl::Continue }
        })
        .unwrap();

        assert!(outcome.was_stopped());
        assert_eq!(outcome.visited(), k);
        assert_eq!(seen, k);
    }

    let outcome = scan_entries(&path, MalformedPolicy::Skip, |_| ScanControl::Continue).unwrap();
    assert!(!outcome.was_stopped());
    assert_eq!(outcome.visited(), 50);
}

#[test]
fn test_e2e_list_sessions_newest_first() {
    let builder = realistic_claude_dir();
    let store = store_for(&builder);
    let project_dir = store.project_dir(PROJECT_PATH).unwrap();

    let sessions = store.list_sessions(&project_dir).unwrap();
    let ids: Vec<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec![SESSION_A, SESSION_B]);

    let newest = &sessions[0];
    assert_eq!(newest.source, SessionSource::Scan);
    assert_eq!(newest.message_count, 4);
    assert_eq!(newest.first_prompt, "Refactor the parser");
    assert_eq!(newest.created.unwrap().to_rfc3339(), "2026-01-15T09:59:00+00:00");
    assert_eq!(newest.modified.unwrap().to_rfc3339(), "2026-01-15T10:02:00+00:00");
}

#[test]
fn test_e2e_sessions_without_conversation_are_dropped() {
    let builder = ClaudeDirBuilder::new()
        .with_session(PROJECT_NAME, SESSION_A, &[EntryBuilder::system(), EntryBuilder::system()])
        .with_session(PROJECT_NAME, SESSION_B, &user_entries(1));
    let store = store_for(&builder);
    let project_dir = store.project_dir(PROJECT_PATH).unwrap();

    let sessions = store.list_sessions(&project_dir).unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, SESSION_B);
}

#[test]
fn test_e2e_metadata_is_idempotent() {
    let builder = realistic_claude_dir();
    let path = builder.project_dir(PROJECT_NAME).join(format!("{}.jsonl", SESSION_A));

    let first = summarize_session(&path, MalformedPolicy::Skip).unwrap();
    let second = summarize_session(&path, MalformedPolicy::Skip).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_e2e_index_takes_precedence_and_count_agrees() {
    let builder = realistic_claude_dir().with_index(
        PROJECT_NAME,
        json!({
            "version": 1,
            "entries": [{
                "sessionId": SESSION_A,
                "projectPath": PROJECT_PATH,
                "firstPrompt": "Indexed prompt",
                "summary": "Parser refactor",
                "messageCount": 4,
                "created": "2026-01-15T09:59:00Z",
                "modified": "2026-01-15T10:02:00Z"
            }]
        }),
    );
    let store = store_for(&builder);
    let project_dir = store.project_dir(PROJECT_PATH).unwrap();

    let indexed = store.find_session(&project_dir, SESSION_A).unwrap();
    assert_eq!(indexed.source, SessionSource::Index);
    assert_eq!(indexed.first_prompt, "Indexed prompt");
    assert_eq!(indexed.summary, "Parser refactor");

    let scanned = summarize_session(&indexed.file_path, MalformedPolicy::Skip).unwrap();
    assert_eq!(indexed.message_count, scanned.message_count);

    // Sessions missing from the index still come from a scan
    let other = store.find_session(&project_dir, SESSION_B).unwrap();
    assert_eq!(other.source, SessionSource::Scan);
}

#[test]
fn test_e2e_project_discovery() {
    let builder = ClaudeDirBuilder::new()
        .with_project("-Users-test-project1")
        .with_project("not-encoded")
        .with_session(PROJECT_NAME, SESSION_A, &user_entries(1));

    let projects = discover_projects(&builder.path()).unwrap();
    let names: Vec<&str> = projects.iter().map(|p| p.encoded_name.as_str()).collect();
    assert_eq!(names, vec!["-Users-test-project1", PROJECT_NAME]);
    assert_eq!(projects[0].project_path.to_str(), Some("/Users/test/project1"));
}

#[test]
fn test_e2e_session_file_naming() {
    let builder = ClaudeDirBuilder::new()
        .with_session(PROJECT_NAME, SESSION_A, &user_entries(1))
        .with_raw_file(PROJECT_NAME, "not-a-uuid.jsonl", "{}")
        .with_raw_file(PROJECT_NAME, "-work-app.jsonl", "{}")
        .with_raw_file(PROJECT_NAME, "sessions-index.json", "{}");

    let files = list_session_files(&builder.project_dir(PROJECT_NAME)).unwrap();
    assert_eq!(files.keys().collect::<Vec<_>>(), vec![SESSION_A]);
}

#[test]
fn test_e2e_agents_found_at_every_depth() {
    const DEPTH: usize = 6;
    let chain: Vec<String> = (0..DEPTH).map(|d| format!("d{}", d)).collect();

    let mut builder =
        ClaudeDirBuilder::new().with_session(PROJECT_NAME, SESSION_A, &user_entries(1));
    for end in 1..=DEPTH {
        let links: Vec<&str> = chain[..end].iter().map(String::as_str).collect();
        builder = builder.with_agent(PROJECT_NAME, SESSION_A, &links, &user_entries(end));
    }

    let session_dir = builder.project_dir(PROJECT_NAME).join(SESSION_A);
    let listing = discover_agents(&session_dir).unwrap();
    assert_eq!(listing.len(), DEPTH);

    let deepest = listing.get("d5").unwrap();
    assert_eq!(deepest.depth, DEPTH);
    assert_eq!(deepest.parent_id.as_deref(), Some("d4"));
    let links: Vec<&str> = chain.iter().map(String::as_str).collect();
    assert_eq!(deepest.path, agent_path(&session_dir, &links));
    assert_eq!(listing.get("d0").unwrap().parent_id, None);
}

#[test]
fn test_e2e_no_subagents_dir_means_no_agents() {
    let builder = ClaudeDirBuilder::new().with_session(PROJECT_NAME, SESSION_A, &user_entries(3));
    let listing = discover_agents(&builder.project_dir(PROJECT_NAME).join(SESSION_A)).unwrap();
    assert!(listing.is_empty());
}

#[test]
fn test_e2e_agent_tree() {
    let builder = realistic_claude_dir();
    let store = store_for(&builder);
    let project_dir = store.project_dir(PROJECT_PATH).unwrap();

    let tree = store.build_tree(&project_dir, SESSION_A).unwrap();
    assert!(tree.is_root());
    assert_eq!(tree.session_id, SESSION_A);
    assert_eq!(tree.entry_count, 4);
    assert_eq!(tree.descendant_count(), 3);

    let a1 = tree.find("a1").unwrap();
    assert_eq!(a1.entry_count, 2);
    assert_eq!(a1.children.len(), 1);
    assert_eq!(a1.children[0].agent_id, "b1");
    assert_eq!(a1.children[0].entry_count, 1);

    let explore = tree.find("aexplore-c2").unwrap();
    assert_eq!(explore.agent_type, "explore");
    assert!(explore.children.is_empty());
}

#[test]
fn test_e2e_query_scopes() {
    let builder = realistic_claude_dir();
    let store = store_for(&builder);
    let project_dir = store.project_dir(PROJECT_PATH).unwrap();
    let no_filters = FilterOptions::default();
    let session_id = SESSION_A.to_string();

    let session_only =
        QueryScope::Session { session_id: session_id.clone(), include_agents: false };
    assert_eq!(store.query(&project_dir, &session_only, &no_filters).unwrap().len(), 4);

    let with_agents = QueryScope::Session { session_id: session_id.clone(), include_agents: true };
    assert_eq!(store.query(&project_dir, &with_agents, &no_filters).unwrap().len(), 8);

    let agent = QueryScope::Agent { session_id, agent_id: "b1".to_string() };
    let entries = store.query(&project_dir, &agent, &no_filters).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].agent_id, "b1");

    let project = QueryScope::Project { include_agents: false };
    assert_eq!(store.query(&project_dir, &project, &no_filters).unwrap().len(), 6);
}

#[test]
fn test_e2e_prefix_resolution() {
    let builder = realistic_claude_dir();
    let store = store_for(&builder);
    let project_dir = store.project_dir(PROJECT_PATH).unwrap();

    assert_eq!(store.resolve_session_id(&project_dir, "6797").unwrap(), SESSION_A);
    assert_eq!(store.resolve_agent_id(&project_dir, SESSION_A, "aexp").unwrap(), "aexplore-c2");
    assert!(store.resolve_session_id(&project_dir, "ffff").unwrap_err().is_not_found());
}

#[test]
fn test_e2e_locate_session_and_agent_files() {
    let builder = realistic_claude_dir().with_session(
        "-work-other",
        "cd2e0000-0000-0000-0000-000000000000",
        &user_entries(1),
    );
    let store = store_for(&builder);
    let project_dir = store.project_dir(PROJECT_PATH).unwrap();

    assert_eq!(
        store.locate_session(SESSION_A).unwrap(),
        project_dir.join(format!("{}.jsonl", SESSION_A))
    );
    assert!(matches!(
        store.locate_session("cd2e").unwrap_err(),
        HistoryError::AmbiguousPrefix { .. }
    ));
    assert_eq!(
        store.agent_file(&project_dir, SESSION_A, "b1").unwrap(),
        agent_path(&project_dir.join(SESSION_A), &["a1", "b1"])
    );
    assert!(store.agent_file(&project_dir, SESSION_A, "zz").unwrap_err().is_not_found());
}

#[test]
fn test_e2e_find_agents_across_sessions_and_depths() {
    let builder = realistic_claude_dir();
    let store = store_for(&builder);
    let project_dir = store.project_dir(PROJECT_PATH).unwrap();

    let everything = store.find_agents(&project_dir, &AgentSearch::default()).unwrap();
    let mut found: Vec<(String, String)> =
        everything.iter().map(|m| (m.session_id.clone(), m.agent_id.clone())).collect();
    found.sort();
    let expected: Vec<(String, String)> = [
        (SESSION_A, ""),
        (SESSION_A, "a1"),
        (SESSION_A, "aexplore-c2"),
        (SESSION_A, "b1"),
        (SESSION_B, ""),
    ]
    .iter()
    .map(|(s, a)| (s.to_string(), a.to_string()))
    .collect();
    assert_eq!(found, expected);
    // Newest activity first; session B is a day older than everything in A
    assert_eq!(everything.last().unwrap().session_id, SESSION_B);

    let search = AgentSearch {
        explored: Some("**/*.rs".to_string()),
        start: Some("2026-01-15T00:00:00Z".parse().unwrap()),
        ..Default::default()
    };
    let readers = store.find_agents(&project_dir, &search).unwrap();
    assert_eq!(readers.len(), 1);
    assert_eq!(readers[0].agent_id, "a1");
    assert_eq!(readers[0].matched_files, vec!["/work/app/src/parser.rs"]);
}

#[test]
fn test_e2e_prompt_truncation_boundary() {
    let exact = "x".repeat(200);
    let over = "y".repeat(201);
    let builder = ClaudeDirBuilder::new()
        .with_session(PROJECT_NAME, SESSION_A, &[EntryBuilder::user().text(&exact)])
        .with_session(PROJECT_NAME, SESSION_B, &[EntryBuilder::user().text(&over)]);
    let store = store_for(&builder);
    let project_dir = store.project_dir(PROJECT_PATH).unwrap();

    assert_eq!(store.find_session(&project_dir, SESSION_A).unwrap().first_prompt, exact);

    let clipped = store.find_session(&project_dir, SESSION_B).unwrap().first_prompt;
    assert_eq!(clipped, format!("{}...", "y".repeat(200)));
    assert_eq!(clipped, truncate_prompt(&over));
}

#[test]
fn test_e2e_entry_types_survive_round_trip_through_store() {
    let builder = ClaudeDirBuilder::new().with_session(
        PROJECT_NAME,
        SESSION_A,
        &[
            EntryBuilder::user(),
            EntryBuilder::of_type("queue-operation"),
            EntryBuilder::of_type("brand-new-kind"),
        ],
    );
    let store = store_for(&builder);
    let project_dir = store.project_dir(PROJECT_PATH).unwrap();

    let types: Vec<EntryType> = store
        .session_entries(&project_dir, SESSION_A)
        .unwrap()
        .into_iter()
        .map(|e| e.entry_type)
        .collect();
    assert_eq!(
        types,
        vec![
            EntryType::User,
            EntryType::QueueOperation,
            EntryType::Other("brand-new-kind".to_string())
        ]
    );
}
