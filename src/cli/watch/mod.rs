//! Watch command - follows the teams collection until Ctrl+C

use tracing::{info, warn};

use crate::infrastructure::team::{MirrorStatus, TeamMirror};

/// Run the watch command
pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap();
    let ctx = crate::create_app_context_with_config(&config).await?;

    let mirror = ctx.mirror();
    let mut changes = mirror.watch();
    mirror.subscribe().await?;
    info!(collection = %ctx.collection(), "Watching teams, press Ctrl+C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                if report(&mirror) {
                    break;
                }
            }
        }
    }

    let status = mirror.status();
    mirror.unsubscribe();
    info!("Stopped watching");

    match status {
        MirrorStatus::Error(message) => Err(anyhow::anyhow!("Subscription failed: {}", message)),
        _ => Ok(()),
    }
}

/// Log the mirror's current state; returns true once the subscription failed
fn report(mirror: &TeamMirror) -> bool {
    match mirror.status() {
        MirrorStatus::Synced => {
            info!(count = mirror.len(), "Teams updated");

            for team in mirror.teams() {
                let id = team.id().map(|id| id.to_string()).unwrap_or_default();
                println!("{}\t{}\t{}", id, team.title(), team.subtitle());
            }

            false
        }
        MirrorStatus::Error(message) => {
            warn!(error = %message, "Subscription failed");
            true
        }
        MirrorStatus::Subscribing | MirrorStatus::Unsubscribed => false,
    }
}
