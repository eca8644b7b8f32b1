use crate::domain::document::DocumentStore;
use crate::domain::team::{Team, TeamId};
use crate::domain::DomainError;

/// Load a single team by id, `None` if the store has no such document
pub async fn load_team(
    store: &dyn DocumentStore,
    collection: &str,
    id: &TeamId,
) -> Result<Option<Team>, DomainError> {
    let fields = store.get(collection, id.as_str()).await?;

    Ok(fields.map(|fields| Team::from_document(id.clone(), &fields)))
}
