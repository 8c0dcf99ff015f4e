use anyhow::Result;

fn main() -> Result<()> {
    claude_history::cli::run()
}
