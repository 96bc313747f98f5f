use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantNames};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    entities::{
        option_fields::OptionField,
        pagination::Pagination,
        validation::{clean_list, new_validation_error, trim_opt, validate_enum, validate_url},
    },
    errors::AppError,
};

const MAX_TITLE_LENGTH: u64 = 150;
const MAX_ROLE_LENGTH: u64 = 100;
const MAX_DESCRIPTION_LENGTH: u64 = 500;
const MAX_LONG_DESCRIPTION_LENGTH: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, Display, AsRefStr, VariantNames)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventType {
    #[default]
    Hackathon,
    Accelerator,
    Conference,
    Workshop,
    Competition,
    Meetup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display, AsRefStr, VariantNames)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    #[default]
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub role: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub description: String,
    pub long_description: Option<String>,
    pub highlights: Vec<String>,
    pub tech_stack: Vec<String>,
    pub achievement: Option<String>,
    pub date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: String,
    pub is_virtual: bool,
    pub organizer: Option<String>,
    pub team_size: Option<i32>,
    pub project_name: Option<String>,
    pub project_url: Option<String>,
    pub certificate_url: Option<String>,
    pub image: Option<String>,
    pub featured: bool,
    pub order: i32,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub role: String,
    pub event_type: String,
    pub description: String,
    pub long_description: Option<String>,
    pub highlights: Vec<String>,
    pub tech_stack: Vec<String>,
    pub achievement: Option<String>,
    pub date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: String,
    pub is_virtual: bool,
    pub organizer: Option<String>,
    pub team_size: Option<i32>,
    pub project_name: Option<String>,
    pub project_url: Option<String>,
    pub certificate_url: Option<String>,
    pub image: Option<String>,
    pub featured: bool,
    pub sort_order: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub role: String,
    pub event_type: EventType,
    pub description: String,
    pub long_description: Option<String>,
    pub highlights: Vec<String>,
    pub tech_stack: Vec<String>,
    pub achievement: Option<String>,
    pub date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: String,
    pub is_virtual: bool,
    pub organizer: Option<String>,
    pub team_size: Option<i32>,
    pub project_name: Option<String>,
    pub project_url: Option<String>,
    pub certificate_url: Option<String>,
    pub image: Option<String>,
    pub featured: bool,
    pub order: i32,
    pub status: EventStatus,
}

/// Event with its display-only fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    #[serde(flatten)]
    pub event: Event,
    pub formatted_date: String,
    pub duration: Option<String>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        EventResponse {
            formatted_date: formatted_date(event.date),
            duration: event_duration(event.date, event.end_date),
            event,
        }
    }
}

/// `Mar 2024`
pub fn formatted_date(date: DateTime<Utc>) -> String {
    date.format("%b %Y").to_string()
}

pub fn event_duration(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Option<String> {
    let end = end?;
    let day = 60 * 60 * 24;
    let seconds = (end - start).num_seconds().max(0);
    let days = (seconds + day - 1) / day;
    Some(format!("{} day{}", days, if days == 1 { "" } else { "s" }))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventListQuery {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub featured: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub event_type: Option<String>,
    pub featured_only: bool,
}

impl EventListQuery {
    pub fn filter(&self) -> EventFilter {
        EventFilter {
            event_type: self
                .event_type
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty() && *t != "all")
                .map(str::to_string),
            featured_only: self.featured.as_deref() == Some("true"),
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::from_params(self.page.as_deref(), self.limit.as_deref())
    }
}

impl EventFilter {
    /// Only completed events are listed.
    pub fn matches(&self, event: &Event) -> bool {
        event.status == EventStatus::Completed
            && self.event_type.as_deref().is_none_or(|t| event.event_type.as_ref() == t)
            && (!self.featured_only || event.featured)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEventRequest {
    #[validate(
        required(message = "Event title is required"),
        length(max = MAX_TITLE_LENGTH, message = "Title cannot exceed 150 characters")
    )]
    pub title: Option<String>,

    #[validate(
        required(message = "Role is required"),
        length(max = MAX_ROLE_LENGTH, message = "Role cannot exceed 100 characters")
    )]
    pub role: Option<String>,

    #[serde(rename = "type")]
    #[validate(custom(function = "validate_event_type"))]
    pub event_type: Option<String>,

    #[validate(
        required(message = "Description is required"),
        length(max = MAX_DESCRIPTION_LENGTH, message = "Description cannot exceed 500 characters")
    )]
    pub description: Option<String>,

    #[validate(length(max = MAX_LONG_DESCRIPTION_LENGTH, message = "Long description cannot exceed 2000 characters"))]
    pub long_description: Option<String>,

    pub highlights: Option<Vec<String>>,
    pub tech_stack: Option<Vec<String>>,
    pub achievement: Option<String>,

    #[validate(required(message = "Event date is required"))]
    pub date: Option<DateTime<Utc>>,

    pub end_date: Option<DateTime<Utc>>,

    #[validate(required(message = "Location is required"))]
    pub location: Option<String>,

    pub is_virtual: Option<bool>,
    pub organizer: Option<String>,

    #[validate(range(min = 1, message = "Team size must be at least 1"))]
    pub team_size: Option<i32>,

    pub project_name: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub project_url: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub certificate_url: Option<String>,

    pub image: Option<String>,
    pub featured: Option<bool>,
    pub order: Option<i32>,

    #[validate(custom(function = "validate_event_status"))]
    pub status: Option<String>,
}

impl NewEventRequest {
    pub fn normalized(self) -> Self {
        NewEventRequest {
            title: trim_opt(self.title),
            role: trim_opt(self.role),
            event_type: trim_opt(self.event_type),
            description: trim_opt(self.description),
            long_description: trim_opt(self.long_description),
            highlights: self.highlights.map(clean_list),
            tech_stack: self.tech_stack.map(clean_list),
            achievement: trim_opt(self.achievement),
            date: self.date,
            end_date: self.end_date,
            location: trim_opt(self.location),
            is_virtual: self.is_virtual,
            organizer: trim_opt(self.organizer),
            team_size: self.team_size,
            project_name: trim_opt(self.project_name),
            project_url: trim_opt(self.project_url),
            certificate_url: trim_opt(self.certificate_url),
            image: trim_opt(self.image),
            featured: self.featured,
            order: self.order,
            status: trim_opt(self.status),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH, message = "Title must be between 1 and 150 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = MAX_ROLE_LENGTH, message = "Role must be between 1 and 100 characters"))]
    pub role: Option<String>,

    #[serde(rename = "type")]
    #[validate(custom(function = "validate_event_type"))]
    pub event_type: Option<String>,

    #[validate(length(min = 1, max = MAX_DESCRIPTION_LENGTH, message = "Description must be between 1 and 500 characters"))]
    pub description: Option<String>,

    #[validate(length(max = MAX_LONG_DESCRIPTION_LENGTH, message = "Long description cannot exceed 2000 characters"))]
    pub long_description: OptionField<String>,

    pub highlights: Option<Vec<String>>,
    pub tech_stack: Option<Vec<String>>,
    pub achievement: OptionField<String>,
    pub date: Option<DateTime<Utc>>,
    pub end_date: OptionField<DateTime<Utc>>,

    #[validate(length(min = 1, message = "Location is required"))]
    pub location: Option<String>,

    pub is_virtual: Option<bool>,
    pub organizer: OptionField<String>,

    #[validate(custom(function = "validate_team_size_field"))]
    pub team_size: OptionField<i32>,

    pub project_name: OptionField<String>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub project_url: OptionField<String>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub certificate_url: OptionField<String>,

    pub image: OptionField<String>,
    pub featured: Option<bool>,
    pub order: Option<i32>,

    #[validate(custom(function = "validate_event_status"))]
    pub status: Option<String>,
}

impl UpdateEventRequest {
    pub fn normalized(self) -> Self {
        UpdateEventRequest {
            title: self.title.map(|s| s.trim().to_string()),
            role: self.role.map(|s| s.trim().to_string()),
            event_type: self.event_type.map(|s| s.trim().to_string()),
            description: self.description.map(|s| s.trim().to_string()),
            long_description: self.long_description.trimmed(),
            highlights: self.highlights.map(clean_list),
            tech_stack: self.tech_stack.map(clean_list),
            achievement: self.achievement.trimmed(),
            date: self.date,
            end_date: self.end_date,
            location: self.location.map(|s| s.trim().to_string()),
            is_virtual: self.is_virtual,
            organizer: self.organizer.trimmed(),
            team_size: self.team_size,
            project_name: self.project_name.trimmed(),
            project_url: self.project_url.trimmed(),
            certificate_url: self.certificate_url.trimmed(),
            image: self.image.trimmed(),
            featured: self.featured,
            order: self.order,
            status: self.status.map(|s| s.trim().to_string()),
        }
    }
}

pub fn validate_event_type(value: &str) -> Result<(), ValidationError> {
    validate_enum::<EventType>(value, "event type")
}

pub fn validate_event_status(value: &str) -> Result<(), ValidationError> {
    validate_enum::<EventStatus>(value, "status")
}

fn validate_team_size_field(value: &OptionField<i32>) -> Result<(), ValidationError> {
    match value {
        OptionField::SetToValue(size) if *size < 1 => {
            Err(new_validation_error("range", "Team size must be at least 1"))
        }
        _ => Ok(()),
    }
}

fn validate_optional_url_field(value: &OptionField<String>) -> Result<(), ValidationError> {
    if let OptionField::SetToValue(url) = value {
        validate_url(url)?;
    }
    Ok(())
}

fn parse_enum<E: std::str::FromStr>(value: &str, field: &str) -> Result<E, AppError> {
    value
        .parse::<E>()
        .map_err(|_| AppError::BadRequest(format!("Invalid {}: {}", field, value)))
}

impl TryFrom<NewEventRequest> for EventDraft {
    type Error = AppError;

    fn try_from(value: NewEventRequest) -> Result<Self, Self::Error> {
        let value = value.normalized();
        value.validate()?;

        let date = value
            .date
            .ok_or_else(|| AppError::BadRequest("Event date is required".into()))?;

        Ok(EventDraft {
            title: value.title.unwrap_or_default(),
            role: value.role.unwrap_or_default(),
            event_type: value
                .event_type
                .as_deref()
                .map(|t| parse_enum(t, "type"))
                .transpose()?
                .unwrap_or_default(),
            description: value.description.unwrap_or_default(),
            long_description: value.long_description,
            highlights: value.highlights.unwrap_or_default(),
            tech_stack: value.tech_stack.unwrap_or_default(),
            achievement: value.achievement,
            date,
            end_date: value.end_date,
            location: value.location.unwrap_or_default(),
            is_virtual: value.is_virtual.unwrap_or(false),
            organizer: value.organizer,
            team_size: value.team_size,
            project_name: value.project_name,
            project_url: value.project_url,
            certificate_url: value.certificate_url,
            image: value.image,
            featured: value.featured.unwrap_or(false),
            order: value.order.unwrap_or(0),
            status: value
                .status
                .as_deref()
                .map(|s| parse_enum(s, "status"))
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

impl EventDraft {
    pub fn into_event(self, id: Uuid, now: DateTime<Utc>) -> Event {
        Event {
            id,
            title: self.title,
            role: self.role,
            event_type: self.event_type,
            description: self.description,
            long_description: self.long_description,
            highlights: self.highlights,
            tech_stack: self.tech_stack,
            achievement: self.achievement,
            date: self.date,
            end_date: self.end_date,
            location: self.location,
            is_virtual: self.is_virtual,
            organizer: self.organizer,
            team_size: self.team_size,
            project_name: self.project_name,
            project_url: self.project_url,
            certificate_url: self.certificate_url,
            image: self.image,
            featured: self.featured,
            order: self.order,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<EventRow> for Event {
    type Error = AppError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let event_type = row.event_type.parse().map_err(|_| {
            AppError::InternalError(format!("Stored event {} has invalid type: {}", row.id, row.event_type))
        })?;
        let status = row.status.parse().map_err(|_| {
            AppError::InternalError(format!("Stored event {} has invalid status: {}", row.id, row.status))
        })?;

        Ok(Event {
            id: row.id,
            title: row.title,
            role: row.role,
            event_type,
            description: row.description,
            long_description: row.long_description,
            highlights: row.highlights,
            tech_stack: row.tech_stack,
            achievement: row.achievement,
            date: row.date,
            end_date: row.end_date,
            location: row.location,
            is_virtual: row.is_virtual,
            organizer: row.organizer,
            team_size: row.team_size,
            project_name: row.project_name,
            project_url: row.project_url,
            certificate_url: row.certificate_url,
            image: row.image,
            featured: row.featured,
            order: row.sort_order,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl Event {
    pub fn apply_update(&mut self, update: UpdateEventRequest, now: DateTime<Utc>) -> Result<(), AppError> {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(event_type) = update.event_type.as_deref() {
            self.event_type = parse_enum(event_type, "type")?;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        update.long_description.apply_to(&mut self.long_description);
        if let Some(highlights) = update.highlights {
            self.highlights = highlights;
        }
        if let Some(tech_stack) = update.tech_stack {
            self.tech_stack = tech_stack;
        }
        update.achievement.apply_to(&mut self.achievement);
        if let Some(date) = update.date {
            self.date = date;
        }
        update.end_date.apply_to(&mut self.end_date);
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(is_virtual) = update.is_virtual {
            self.is_virtual = is_virtual;
        }
        update.organizer.apply_to(&mut self.organizer);
        update.team_size.apply_to(&mut self.team_size);
        update.project_name.apply_to(&mut self.project_name);
        update.project_url.apply_to(&mut self.project_url);
        update.certificate_url.apply_to(&mut self.certificate_url);
        update.image.apply_to(&mut self.image);
        if let Some(featured) = update.featured {
            self.featured = featured;
        }
        if let Some(order) = update.order {
            self.order = order;
        }
        if let Some(status) = update.status.as_deref() {
            self.status = parse_enum(status, "status")?;
        }
        self.updated_at = now;
        Ok(())
    }
}
