//! Predefined catalog scenarios

#![allow(dead_code)]

use super::workspace::TestWorkspace;

/// Scenario: one file per category
///
/// - `sdxl.json`: 1024x1024, 832x1216
/// - `sd15.json`: 768x512
/// - `custom.json`: 1536x640
pub fn create_standard_catalog() -> anyhow::Result<TestWorkspace> {
    let workspace = TestWorkspace::new()?;
    workspace.write_preset("sdxl.json", &[(1024, 1024), (832, 1216)])?;
    workspace.write_preset("sd15.json", &[(768, 512)])?;
    workspace.write_preset("custom.json", &[(1536, 640)])?;
    Ok(workspace)
}
