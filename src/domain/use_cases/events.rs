use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    entities::{
        event::{EventDraft, EventListQuery, EventResponse, NewEventRequest, UpdateEventRequest},
        pagination::{with_total_bucket, CountBucket, Paginated},
    },
    errors::AppError,
    repositories::event::EventRepository,
    utils::valid_uuid::valid_uuid,
};

const NOT_FOUND: &str = "Event not found";

pub struct EventHandler<R>
where
    R: EventRepository + ?Sized,
{
    pub event_repo: Arc<R>,
}

impl<R> EventHandler<R>
where
    R: EventRepository + ?Sized,
{
    pub fn new(event_repo: Arc<R>) -> Self {
        EventHandler { event_repo }
    }

    pub async fn list_events(&self, query: &EventListQuery) -> Result<Paginated<EventResponse>, AppError> {
        let page = query.pagination();
        let (events, total) = self.event_repo.list_events(&query.filter(), page).await?;

        Ok(Paginated::new(events, total, page).map(EventResponse::from))
    }

    /// Events are addressed by id only.
    pub async fn get_event(&self, id: &str) -> Result<EventResponse, AppError> {
        let id = valid_uuid(id, NOT_FOUND)?;
        let event = self.event_repo.get_event_by_id(&id).await?;
        Ok(event.into())
    }

    pub async fn featured_events(&self) -> Result<Vec<EventResponse>, AppError> {
        let events = self.event_repo.get_featured_events().await?;
        Ok(events.into_iter().map(EventResponse::from).collect())
    }

    pub async fn types(&self) -> Result<Vec<CountBucket>, AppError> {
        let buckets = self.event_repo.count_by_type().await?;
        let total = buckets.iter().map(|b| b.count).sum();
        Ok(with_total_bucket("all", total, buckets))
    }

    pub async fn create_event(&self, request: NewEventRequest) -> Result<EventResponse, AppError> {
        let draft = EventDraft::try_from(request)?;
        let event = self.event_repo.create_event(&draft).await?;

        tracing::info!(event_id = %event.id, "Event created");
        Ok(event.into())
    }

    pub async fn update_event(&self, id: &str, request: UpdateEventRequest) -> Result<EventResponse, AppError> {
        let id = valid_uuid(id, NOT_FOUND)?;
        let request = request.normalized();
        request.validate()?;

        let mut event = self.event_repo.get_event_by_id(&id).await?;
        event.apply_update(request, Utc::now())?;
        let saved = self.event_repo.save_event(&event).await?;

        Ok(saved.into())
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), AppError> {
        let id = valid_uuid(id, NOT_FOUND)?;
        self.event_repo.delete_event(&id).await?;

        tracing::info!(event_id = %id, "Event deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entities::event::EventType, repositories::memory::MemoryEventRepo};

    fn handler() -> EventHandler<MemoryEventRepo> {
        EventHandler::new(Arc::new(MemoryEventRepo::seeded().unwrap()))
    }

    #[tokio::test]
    async fn malformed_id_is_not_found() {
        let err = handler().get_event("cairo-ai-hackathon").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == NOT_FOUND));
    }

    #[tokio::test]
    async fn types_lead_with_all_bucket() {
        let buckets = handler().types().await.unwrap();
        assert_eq!(buckets[0], CountBucket { key: "all".into(), count: 4 });
        assert_eq!(buckets[1], CountBucket { key: "conference".into(), count: 2 });
    }

    #[tokio::test]
    async fn type_filter_narrows_listing() {
        let query = EventListQuery { event_type: Some("hackathon".into()), ..Default::default() };
        let page = handler().list_events(&query).await.unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].event.event_type, EventType::Hackathon);
        assert_eq!(page.data[0].formatted_date, "Mar 2024");
    }

    #[tokio::test]
    async fn featured_events_follow_order() {
        let featured = handler().featured_events().await.unwrap();
        let orders: Vec<i32> = featured.iter().map(|e| e.event.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }
}
