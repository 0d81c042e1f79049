#![deny(clippy::all, clippy::pedantic)]

use ghost_admin::AdminClient;
use ghost_admin::cleanup::CleanupReport;

use crate::args::MembersCmd;
use crate::error::CliError;
use crate::print::print_json;

pub async fn handle(client: &AdminClient, cmd: MembersCmd, preserved: &str) -> Result<(), CliError> {
    match cmd {
        MembersCmd::List => list(client).await,
        MembersCmd::Delete { id, email } => {
            delete(client, &id, &email).await;
            Ok(())
        }
        MembersCmd::Cleanup { .. } => cleanup(client, preserved).await,
    }
}

async fn list(client: &AdminClient) -> Result<(), CliError> {
    let members = client.get_members().await?;
    print_json(&members)
}

// Never fails: a rejected deletion is reported, not raised.
async fn delete(client: &AdminClient, id: &str, email: &str) {
    let deletion = client.delete_member(id, email).await;
    println!("{deletion}");
}

async fn cleanup(client: &AdminClient, preserved: &str) -> Result<(), CliError> {
    let report = client.cleanup_members(preserved).await?;
    for line in report_lines(&report) {
        println!("{line}");
    }
    Ok(())
}

/// Progress lines for a finished cleanup, in the order they happened.
pub fn report_lines(report: &CleanupReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.targeted_count() * 2 + 2);
    lines.push(format!("Found {} members to delete", report.targeted_count()));
    for deletion in report.deletions() {
        lines.push(format!("\tDeleting {}", deletion.email));
        lines.push(deletion.to_string());
    }
    lines.push("Cleanup completed".to_string());
    lines
}
