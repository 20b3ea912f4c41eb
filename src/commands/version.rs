//! `version`: tool and git versions

use anyhow::Result;

use crate::core::RunContext;

/// Prints the tool version and the `git version` line
pub async fn handle_version_command(ctx: &RunContext) -> Result<()> {
    let git_version = match ctx.git.version().await {
        Ok(version) => version,
        Err(e) => {
            tracing::warn!("could not query git: {e}");
            "unavailable".to_string()
        }
    };
    ctx.output.emit(&[
        env!("CARGO_PKG_NAME").to_string(),
        format!("  Version: {}", env!("CARGO_PKG_VERSION")),
        format!("  GIT: {git_version}"),
    ]);
    Ok(())
}
