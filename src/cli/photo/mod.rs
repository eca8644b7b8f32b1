//! Photo command - downloads a team's photo to a file

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::domain::TeamId;
use crate::infrastructure::team::load_team;

/// Photo command arguments
#[derive(Args, Debug, Clone)]
pub struct PhotoArgs {
    /// Team id
    pub id: String,

    /// Where to write the photo
    #[arg(long, short)]
    pub out: PathBuf,
}

/// Run the photo command
pub async fn run(args: PhotoArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let ctx = crate::create_app_context_with_config(&config).await?;

    let id = TeamId::new(args.id)?;
    let team = load_team(ctx.documents.as_ref(), ctx.collection(), &id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Team '{}' not found", id))?;

    let bytes = ctx
        .photos
        .hydrate(&team)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Team '{}' has no photo", id))?;

    tokio::fs::write(&args.out, &bytes).await?;
    info!(team_id = %id, path = %args.out.display(), size = bytes.len(), "Photo written");

    Ok(())
}
