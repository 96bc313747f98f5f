//! Portfolio content shipped with the binary. It seeds the database and backs
//! the in-memory repositories when no database is configured.

use crate::{
    entities::{
        event::{EventDraft, NewEventRequest},
        project::{NewProjectRequest, ProjectDraft},
    },
    errors::AppError,
};

const PROJECTS_JSON: &str = include_str!("../content/projects.json");
const EVENTS_JSON: &str = include_str!("../content/events.json");

pub fn project_drafts() -> Result<Vec<ProjectDraft>, AppError> {
    let requests: Vec<NewProjectRequest> = serde_json::from_str(PROJECTS_JSON)
        .map_err(|e| AppError::InternalError(format!("Invalid projects content: {}", e)))?;

    requests.into_iter().map(ProjectDraft::try_from).collect()
}

pub fn event_drafts() -> Result<Vec<EventDraft>, AppError> {
    let requests: Vec<NewEventRequest> = serde_json::from_str(EVENTS_JSON)
        .map_err(|e| AppError::InternalError(format!("Invalid events content: {}", e)))?;

    requests.into_iter().map(EventDraft::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn projects_content_is_valid() {
        let drafts = project_drafts().unwrap();
        assert_eq!(drafts.len(), 6);

        let slugs: HashSet<_> = drafts.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs.len(), drafts.len());

        let featured: Vec<_> = drafts.iter().filter(|d| d.featured).map(|d| d.slug.as_str()).collect();
        assert_eq!(featured, vec!["t1dubb"]);
    }

    #[test]
    fn events_content_is_valid() {
        let drafts = event_drafts().unwrap();
        assert_eq!(drafts.len(), 4);
        assert_eq!(drafts.iter().filter(|d| d.featured).count(), 3);
    }
}
