//! Process-local repositories. Used when no database is configured and by
//! the integration tests; contents are lost on restart.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    content,
    entities::{
        contact::{ContactMessage, ContactStats, ContactSubmission},
        event::{Event, EventDraft, EventFilter, EventStatus},
        pagination::{CountBucket, Pagination},
        project::{Project, ProjectDraft, ProjectFilter, ProjectStatus},
    },
    errors::AppError,
    repositories::{contact::ContactRepository, event::EventRepository, project::ProjectRepository},
};

fn project_listing_order(a: &Project, b: &Project) -> Ordering {
    b.featured
        .cmp(&a.featured)
        .then(a.order.cmp(&b.order))
        .then(b.created_at.cmp(&a.created_at))
}

fn event_listing_order(a: &Event, b: &Event) -> Ordering {
    b.featured
        .cmp(&a.featured)
        .then(b.date.cmp(&a.date))
        .then(a.order.cmp(&b.order))
}

fn count_buckets<'a, I: Iterator<Item = &'a str>>(keys: I) -> Vec<CountBucket> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    let mut buckets: Vec<CountBucket> = counts
        .into_iter()
        .map(|(key, count)| CountBucket { key: key.to_string(), count })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    buckets
}

#[derive(Default)]
pub struct MemoryProjectRepo {
    projects: RwLock<Vec<Project>>,
}

impl MemoryProjectRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drafts(drafts: Vec<ProjectDraft>) -> Self {
        let now = Utc::now();
        let projects = drafts
            .into_iter()
            .map(|draft| draft.into_project(Uuid::new_v4(), now))
            .collect();
        MemoryProjectRepo { projects: RwLock::new(projects) }
    }

    /// Repository pre-filled with the bundled portfolio content.
    pub fn seeded() -> Result<Self, AppError> {
        Ok(Self::with_drafts(content::project_drafts()?))
    }

    fn ensure_unique_slug(projects: &[Project], slug: &str, exclude: Option<Uuid>) -> Result<(), AppError> {
        if projects.iter().any(|p| p.slug == slug && Some(p.id) != exclude) {
            return Err(AppError::DuplicateKey("slug".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectRepository for MemoryProjectRepo {
    async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, AppError> {
        let mut projects = self.projects.write();
        Self::ensure_unique_slug(&projects, &draft.slug, None)?;

        let project = draft.clone().into_project(Uuid::new_v4(), Utc::now());
        projects.push(project.clone());
        Ok(project)
    }

    async fn get_project_by_id(&self, id: &Uuid) -> Result<Project, AppError> {
        self.projects
            .read()
            .iter()
            .find(|p| p.id == *id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Project not found".into()))
    }

    async fn get_project_by_slug(&self, slug: &str) -> Result<Project, AppError> {
        self.projects
            .read()
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Project not found".into()))
    }

    async fn list_projects(&self, filter: &ProjectFilter, page: Pagination) -> Result<(Vec<Project>, i64), AppError> {
        let mut matching: Vec<Project> = self
            .projects
            .read()
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by(project_listing_order);

        Ok((page.slice(&matching), matching.len() as i64))
    }

    async fn get_featured_projects(&self) -> Result<Vec<Project>, AppError> {
        let mut featured: Vec<Project> = self
            .projects
            .read()
            .iter()
            .filter(|p| p.featured && p.status == ProjectStatus::Published)
            .cloned()
            .collect();
        featured.sort_by_key(|p| p.order);
        Ok(featured)
    }

    async fn count_by_category(&self) -> Result<Vec<CountBucket>, AppError> {
        let projects = self.projects.read();
        Ok(count_buckets(
            projects
                .iter()
                .filter(|p| p.status == ProjectStatus::Published)
                .map(|p| p.category.as_ref()),
        ))
    }

    async fn save_project(&self, project: &Project) -> Result<Project, AppError> {
        let mut projects = self.projects.write();
        Self::ensure_unique_slug(&projects, &project.slug, Some(project.id))?;

        let slot = projects
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(|| AppError::NotFound("Project not found".into()))?;
        *slot = project.clone();
        Ok(project.clone())
    }

    async fn delete_project(&self, id: &Uuid) -> Result<(), AppError> {
        let mut projects = self.projects.write();
        let before = projects.len();
        projects.retain(|p| p.id != *id);

        if projects.len() == before {
            return Err(AppError::NotFound("Project not found".into()));
        }
        Ok(())
    }

    async fn replace_all_projects(&self, drafts: &[ProjectDraft]) -> Result<usize, AppError> {
        let now = Utc::now();
        *self.projects.write() = drafts
            .iter()
            .cloned()
            .map(|draft| draft.into_project(Uuid::new_v4(), now))
            .collect();
        Ok(drafts.len())
    }
}

#[derive(Default)]
pub struct MemoryEventRepo {
    events: RwLock<Vec<Event>>,
}

impl MemoryEventRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drafts(drafts: Vec<EventDraft>) -> Self {
        let now = Utc::now();
        let events = drafts
            .into_iter()
            .map(|draft| draft.into_event(Uuid::new_v4(), now))
            .collect();
        MemoryEventRepo { events: RwLock::new(events) }
    }

    pub fn seeded() -> Result<Self, AppError> {
        Ok(Self::with_drafts(content::event_drafts()?))
    }
}

#[async_trait]
impl EventRepository for MemoryEventRepo {
    async fn create_event(&self, draft: &EventDraft) -> Result<Event, AppError> {
        let event = draft.clone().into_event(Uuid::new_v4(), Utc::now());
        self.events.write().push(event.clone());
        Ok(event)
    }

    async fn get_event_by_id(&self, id: &Uuid) -> Result<Event, AppError> {
        self.events
            .read()
            .iter()
            .find(|e| e.id == *id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Event not found".into()))
    }

    async fn list_events(&self, filter: &EventFilter, page: Pagination) -> Result<(Vec<Event>, i64), AppError> {
        let mut matching: Vec<Event> = self
            .events
            .read()
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        matching.sort_by(event_listing_order);

        Ok((page.slice(&matching), matching.len() as i64))
    }

    async fn get_featured_events(&self) -> Result<Vec<Event>, AppError> {
        let mut featured: Vec<Event> = self
            .events
            .read()
            .iter()
            .filter(|e| e.featured && e.status == EventStatus::Completed)
            .cloned()
            .collect();
        featured.sort_by(|a, b| a.order.cmp(&b.order).then(b.date.cmp(&a.date)));
        Ok(featured)
    }

    async fn count_by_type(&self) -> Result<Vec<CountBucket>, AppError> {
        let events = self.events.read();
        Ok(count_buckets(
            events
                .iter()
                .filter(|e| e.status == EventStatus::Completed)
                .map(|e| e.event_type.as_ref()),
        ))
    }

    async fn save_event(&self, event: &Event) -> Result<Event, AppError> {
        let mut events = self.events.write();
        let slot = events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| AppError::NotFound("Event not found".into()))?;
        *slot = event.clone();
        Ok(event.clone())
    }

    async fn delete_event(&self, id: &Uuid) -> Result<(), AppError> {
        let mut events = self.events.write();
        let before = events.len();
        events.retain(|e| e.id != *id);

        if events.len() == before {
            return Err(AppError::NotFound("Event not found".into()));
        }
        Ok(())
    }

    async fn replace_all_events(&self, drafts: &[EventDraft]) -> Result<usize, AppError> {
        let now = Utc::now();
        *self.events.write() = drafts
            .iter()
            .cloned()
            .map(|draft| draft.into_event(Uuid::new_v4(), now))
            .collect();
        Ok(drafts.len())
    }
}

#[derive(Default)]
pub struct MemoryContactRepo {
    contacts: RwLock<Vec<ContactMessage>>,
}

impl MemoryContactRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for MemoryContactRepo {
    async fn create_contact(&self, submission: &ContactSubmission) -> Result<ContactMessage, AppError> {
        let message = ContactMessage::from_submission(submission.clone(), Uuid::new_v4(), Utc::now());
        self.contacts.write().push(message.clone());
        Ok(message)
    }

    async fn get_contact_by_id(&self, id: &Uuid) -> Result<ContactMessage, AppError> {
        self.contacts
            .read()
            .iter()
            .find(|c| c.id == *id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Contact message not found".into()))
    }

    async fn list_contacts(&self, status: Option<&str>, page: Pagination) -> Result<(Vec<ContactMessage>, i64), AppError> {
        let mut matching: Vec<ContactMessage> = self
            .contacts
            .read()
            .iter()
            .filter(|c| status.is_none_or(|s| c.status.as_ref() == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok((page.slice(&matching), matching.len() as i64))
    }

    async fn save_contact(&self, message: &ContactMessage) -> Result<ContactMessage, AppError> {
        let mut contacts = self.contacts.write();
        let slot = contacts
            .iter_mut()
            .find(|c| c.id == message.id)
            .ok_or_else(|| AppError::NotFound("Contact message not found".into()))?;
        *slot = message.clone();
        Ok(message.clone())
    }

    async fn delete_contact(&self, id: &Uuid) -> Result<(), AppError> {
        let mut contacts = self.contacts.write();
        let before = contacts.len();
        contacts.retain(|c| c.id != *id);

        if contacts.len() == before {
            return Err(AppError::NotFound("Contact message not found".into()));
        }
        Ok(())
    }

    async fn contact_stats(&self, since: DateTime<Utc>) -> Result<ContactStats, AppError> {
        let contacts = self.contacts.read();
        let mut by_status = BTreeMap::new();
        for contact in contacts.iter() {
            *by_status.entry(contact.status.to_string()).or_insert(0) += 1;
        }

        Ok(ContactStats {
            total: contacts.len() as i64,
            today: contacts.iter().filter(|c| c.created_at >= since).count() as i64,
            by_status,
        })
    }
}
