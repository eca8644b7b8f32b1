//! Show command - prints a stored team as JSON

use clap::Args;
use serde_json::Value;

use crate::domain::{Team, TeamId};
use crate::infrastructure::team::load_team;

/// Show command arguments
#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Team id
    pub id: String,
}

/// Run the show command
pub async fn run(args: ShowArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let ctx = crate::create_app_context_with_config(&config).await?;

    let id = TeamId::new(args.id)?;
    let team = load_team(ctx.documents.as_ref(), ctx.collection(), &id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Team '{}' not found", id))?;

    println!("{}", serde_json::to_string_pretty(&render(&team))?);
    Ok(())
}

/// The stored fields plus the document id
pub fn render(team: &Team) -> Value {
    let mut fields = team.to_fields();

    if let Some(id) = team.id() {
        fields.insert("id".to_string(), Value::String(id.to_string()));
    }

    Value::Object(fields)
}
