//! followharvest: walk a seed account's followers and store qualifying users' posts. Runs until killed.

use anyhow::Result;
use followharvest::engine::handle_run;
use std::path::Path;

fn main() -> Result<()> {
    handle_run(Path::new("."))
}
