//! Save command - runs the two-phase save and prints the team id

use std::path::PathBuf;

use bytes::Bytes;
use clap::Args;
use tracing::{error, warn};

use crate::domain::{Coordinate, Team, TeamId};
use crate::infrastructure::team::{load_team, SavePhase};

/// Save command arguments
#[derive(Args, Debug, Clone, Default)]
pub struct SaveArgs {
    /// Update this existing team instead of creating one
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub organization: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    #[arg(long)]
    pub project: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// JPEG file to upload as the team photo
    #[arg(long)]
    pub photo: Option<PathBuf>,

    /// Act as this user
    #[arg(long, conflicts_with = "token")]
    pub actor: Option<String>,

    /// Act as the subject of this ID token
    #[arg(long)]
    pub token: Option<String>,
}

impl SaveArgs {
    /// Overwrite the team's fields with every value given on the command line
    pub fn apply_to(&self, team: &mut Team) {
        if let Some(name) = &self.name {
            team.set_name(name.clone());
        }
        if let Some(organization) = &self.organization {
            team.set_organization(organization.clone());
        }

        let current = team.location();
        team.set_location(Coordinate::new(
            self.lat.unwrap_or(current.latitude),
            self.lon.unwrap_or(current.longitude),
        ));

        if let Some(project) = &self.project {
            team.set_project_name(project.clone());
        }
        if let Some(description) = &self.description {
            team.set_project_description(description.clone());
        }
    }
}

/// Run the save command
pub async fn run(args: SaveArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let ctx = crate::create_app_context_with_config(&config).await?;

    let mut team = match &args.id {
        Some(id) => {
            let id = TeamId::new(id.as_str())?;
            load_team(ctx.documents.as_ref(), ctx.collection(), &id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Team '{}' not found", id))?
        }
        None => Team::new(),
    };
    args.apply_to(&mut team);

    let photo = match &args.photo {
        Some(path) => Some(Bytes::from(tokio::fs::read(path).await?)),
        None => None,
    };

    let actor = ctx.actor_provider(args.actor.as_deref(), args.token.as_deref())?;

    match ctx.saver.save(&mut team, actor.as_ref(), photo).await {
        Ok(id) => {
            println!("{}", id);
            Ok(())
        }
        Err(e) if e.phase() == SavePhase::Photo => {
            if let Some(id) = team.id() {
                println!("{}", id);
            }
            warn!(error = %e.error(), "Team saved without its photo; retry the upload");
            Err(e.into())
        }
        Err(e) => {
            error!(error = %e.error(), "Team was not saved");
            Err(e.into())
        }
    }
}
