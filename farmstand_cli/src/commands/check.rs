use anyhow::Result;
use farmstand_lib::Directory;

use crate::output::{build_dangling_rows, print_rows, OutputFormat};

pub fn run(directory: &Directory, format: &OutputFormat) -> Result<()> {
    let dangling = directory.dangling_references();
    if dangling.is_empty() {
        eprintln!("No dangling references");
        return Ok(());
    }

    eprintln!("{} dangling references", dangling.len());
    print_rows(&build_dangling_rows(&dangling), format)
}
