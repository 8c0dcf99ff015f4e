pub mod agents;
pub mod apply;
pub mod explored;
pub mod options;

pub use agents::{AgentMatcher, AgentSearch, find_agents};
pub use apply::{EntryFilter, apply_filters, count_by_type};
pub use explored::ExploredPattern;
pub use options::{FilterOptions, parse_end_bound, parse_start_bound};
