//! Safety utilities to prevent overwriting the chart input.
//!
//! The run writes two tables; these checks make sure neither lands on the
//! source CSV or on the other table.

use anyhow::{bail, Result};
use std::path::Path;

/// Validates that the output paths are safe to overwrite.
///
/// Checks:
/// - Matched and unmatched outputs must be different files
/// - Neither output can be the same as any of the provided source paths
pub fn validate_output_paths(matched: &Path, unmatched: &Path, source_paths: &[&Path]) -> Result<()> {
    if matched == unmatched {
        bail!(
            "Safety check failed: matched and unmatched outputs are both '{}'",
            matched.display()
        );
    }

    for output in [matched, unmatched] {
        for source in source_paths {
            if output == *source || same_file(output, source) {
                bail!(
                    "Safety check failed: output '{}' cannot be the same as source '{}'",
                    output.display(),
                    source.display()
                );
            }
        }
    }

    Ok(())
}

/// Compare canonical paths when both exist ("./a.csv" vs "a.csv").
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
