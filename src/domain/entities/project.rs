use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use strum::{AsRefStr, Display, EnumString, VariantNames};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    entities::{
        option_fields::OptionField,
        pagination::Pagination,
        validation::{
            clean_list, field_error, trim_opt, validate_enum, validate_slug, validate_url,
            MAX_SLUG_LENGTH, MIN_SLUG_LENGTH,
        },
    },
    errors::AppError,
};

// ───── Constants ──────────────────────────────────────────────────────
const MAX_TITLE_LENGTH: u64 = 100;
const MAX_TAGLINE_LENGTH: u64 = 200;
const MAX_DESCRIPTION_LENGTH: u64 = 500;
const MAX_LONG_DESCRIPTION_LENGTH: u64 = 2000;
const MAX_OUTCOME_LENGTH: u64 = 1000;

// ───── Enumerations ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, AsRefStr, VariantNames)]
pub enum ProjectCategory {
    #[serde(rename = "Full-Stack")]
    #[strum(serialize = "Full-Stack")]
    FullStack,
    Frontend,
    Backend,
    Mobile,
    DevOps,
    #[serde(rename = "AI/ML")]
    #[strum(serialize = "AI/ML")]
    AiMl,
    Blockchain,
    Desktop,
    #[serde(rename = "AI")]
    #[strum(serialize = "AI")]
    Ai,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr, VariantNames)]
pub enum ProjectType {
    Startup,
    #[serde(rename = "AI")]
    #[strum(serialize = "AI")]
    Ai,
    #[serde(rename = "Desktop App")]
    #[strum(serialize = "Desktop App")]
    DesktopApp,
    #[serde(rename = "Web App")]
    #[strum(serialize = "Web App")]
    WebApp,
    #[serde(rename = "Mobile App")]
    #[strum(serialize = "Mobile App")]
    MobileApp,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display, AsRefStr, VariantNames)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProjectStatus {
    Draft,
    #[default]
    Published,
    Archived,
}

// ───── Domain Models ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseStudy {
    pub problem: Option<String>,
    pub solution: Option<String>,
    pub highlights: Vec<String>,
}

impl CaseStudy {
    fn cleaned(self) -> Self {
        CaseStudy {
            problem: trim_opt(self.problem),
            solution: trim_opt(self.solution),
            highlights: clean_list(self.highlights),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub tagline: Option<String>,
    pub description: String,
    pub long_description: Option<String>,
    pub tech_stack: Vec<String>,
    pub image: String,
    pub images: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub category: ProjectCategory,
    #[serde(rename = "type")]
    pub project_type: Option<ProjectType>,
    pub featured: bool,
    pub order: i32,
    pub status: ProjectStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub highlights: Vec<String>,
    pub case_study: Option<CaseStudy>,
    pub outcome: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub tagline: Option<String>,
    pub description: String,
    pub long_description: Option<String>,
    pub tech_stack: Vec<String>,
    pub image: String,
    pub images: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub category: String,
    pub project_type: Option<String>,
    pub featured: bool,
    pub sort_order: i32,
    pub status: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub highlights: Vec<String>,
    pub case_study: Option<Json<CaseStudy>>,
    pub outcome: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated, fully typed project ready to be persisted.
#[derive(Debug, Clone)]
pub struct ProjectDraft {
    pub title: String,
    pub slug: String,
    pub tagline: Option<String>,
    pub description: String,
    pub long_description: Option<String>,
    pub tech_stack: Vec<String>,
    pub image: String,
    pub images: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub category: ProjectCategory,
    pub project_type: Option<ProjectType>,
    pub featured: bool,
    pub order: i32,
    pub status: ProjectStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub highlights: Vec<String>,
    pub case_study: Option<CaseStudy>,
    pub outcome: Option<String>,
}

// ───── API Response Models ──────────────────────────────────────────

/// Project as rendered by the API, with its derived `duration`.
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    #[serde(flatten)]
    pub project: Project,
    pub duration: Option<String>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        let duration = project_duration(project.start_date, project.end_date, Utc::now());
        ProjectResponse { project, duration }
    }
}

/// Whole months (30-day) from start to end, or to `now` while ongoing.
pub fn project_duration(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<String> {
    let start = start?;
    let end = end.unwrap_or(now);
    let seconds = (end - start).num_seconds().max(0);
    let month = 60 * 60 * 24 * 30;
    let months = (seconds + month - 1) / month;
    Some(format!("{} month{}", months, if months == 1 { "" } else { "s" }))
}

// ───── Listing ──────────────────────────────────────────────────────

/// Raw `GET /api/projects` query. Values stay strings so that malformed
/// paging or unknown categories degrade to defaults or empty results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectListQuery {
    pub category: Option<String>,
    pub featured: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub category: Option<String>,
    pub featured_only: bool,
}

impl ProjectListQuery {
    pub fn filter(&self) -> ProjectFilter {
        ProjectFilter {
            category: self
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty() && *c != "All")
                .map(str::to_string),
            featured_only: self.featured.as_deref() == Some("true"),
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::from_params(self.page.as_deref(), self.limit.as_deref())
    }
}

impl ProjectFilter {
    /// Listing only ever shows published projects.
    pub fn matches(&self, project: &Project) -> bool {
        project.status == ProjectStatus::Published
            && self.category.as_deref().is_none_or(|c| project.category.as_ref() == c)
            && (!self.featured_only || project.featured)
    }
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProjectRequest {
    #[validate(
        required(message = "Project title is required"),
        length(max = MAX_TITLE_LENGTH, message = "Title cannot exceed 100 characters")
    )]
    pub title: Option<String>,

    #[validate(
        length(min = MIN_SLUG_LENGTH, max = MAX_SLUG_LENGTH, message = "Slug must be between 2 and 80 characters"),
        custom(function = "validate_slug")
    )]
    pub slug: Option<String>,

    #[validate(length(max = MAX_TAGLINE_LENGTH, message = "Tagline cannot exceed 200 characters"))]
    pub tagline: Option<String>,

    #[validate(
        required(message = "Project description is required"),
        length(max = MAX_DESCRIPTION_LENGTH, message = "Description cannot exceed 500 characters")
    )]
    pub description: Option<String>,

    #[validate(length(max = MAX_LONG_DESCRIPTION_LENGTH, message = "Long description cannot exceed 2000 characters"))]
    pub long_description: Option<String>,

    #[validate(
        required(message = "At least one technology is required"),
        length(min = 1, message = "At least one technology is required")
    )]
    pub tech_stack: Option<Vec<String>>,

    #[validate(required(message = "Project image URL is required"))]
    pub image: Option<String>,

    pub images: Option<Vec<String>>,

    #[validate(custom(function = "validate_url"))]
    pub live_url: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub github_url: Option<String>,

    #[validate(
        required(message = "Category is required"),
        custom(function = "validate_category")
    )]
    pub category: Option<String>,

    #[serde(rename = "type")]
    #[validate(custom(function = "validate_project_type"))]
    pub project_type: Option<String>,

    pub featured: Option<bool>,
    pub order: Option<i32>,

    #[validate(custom(function = "validate_project_status"))]
    pub status: Option<String>,

    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub highlights: Option<Vec<String>>,
    pub case_study: Option<CaseStudy>,

    #[validate(length(max = MAX_OUTCOME_LENGTH, message = "Outcome cannot exceed 1000 characters"))]
    pub outcome: Option<String>,
}

impl NewProjectRequest {
    /// Trims every string the way the stored document expects; blank
    /// strings count as missing.
    pub fn normalized(self) -> Self {
        NewProjectRequest {
            title: trim_opt(self.title),
            slug: trim_opt(self.slug).map(|s| s.to_lowercase()),
            tagline: trim_opt(self.tagline),
            description: trim_opt(self.description),
            long_description: trim_opt(self.long_description),
            tech_stack: self.tech_stack.map(clean_list),
            image: trim_opt(self.image),
            images: self.images.map(clean_list),
            live_url: trim_opt(self.live_url),
            github_url: trim_opt(self.github_url),
            category: trim_opt(self.category),
            project_type: trim_opt(self.project_type),
            featured: self.featured,
            order: self.order,
            status: trim_opt(self.status),
            start_date: self.start_date,
            end_date: self.end_date,
            highlights: self.highlights.map(clean_list),
            case_study: self.case_study.map(CaseStudy::cleaned),
            outcome: trim_opt(self.outcome),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH, message = "Title must be between 1 and 100 characters"))]
    pub title: Option<String>,

    #[validate(
        length(min = MIN_SLUG_LENGTH, max = MAX_SLUG_LENGTH, message = "Slug must be between 2 and 80 characters"),
        custom(function = "validate_slug")
    )]
    pub slug: Option<String>,

    #[validate(length(max = MAX_TAGLINE_LENGTH, message = "Tagline cannot exceed 200 characters"))]
    pub tagline: OptionField<String>,

    #[validate(length(min = 1, max = MAX_DESCRIPTION_LENGTH, message = "Description must be between 1 and 500 characters"))]
    pub description: Option<String>,

    #[validate(length(max = MAX_LONG_DESCRIPTION_LENGTH, message = "Long description cannot exceed 2000 characters"))]
    pub long_description: OptionField<String>,

    #[validate(length(min = 1, message = "At least one technology is required"))]
    pub tech_stack: Option<Vec<String>>,

    #[validate(length(min = 1, message = "Project image URL is required"))]
    pub image: Option<String>,

    pub images: Option<Vec<String>>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub live_url: OptionField<String>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub github_url: OptionField<String>,

    #[validate(custom(function = "validate_category"))]
    pub category: Option<String>,

    #[serde(rename = "type")]
    #[validate(custom(function = "validate_optional_project_type"))]
    pub project_type: OptionField<String>,

    pub featured: Option<bool>,
    pub order: Option<i32>,

    #[validate(custom(function = "validate_project_status"))]
    pub status: Option<String>,

    pub start_date: OptionField<DateTime<Utc>>,
    pub end_date: OptionField<DateTime<Utc>>,
    pub highlights: Option<Vec<String>>,
    pub case_study: OptionField<CaseStudy>,

    #[validate(length(max = MAX_OUTCOME_LENGTH, message = "Outcome cannot exceed 1000 characters"))]
    pub outcome: OptionField<String>,
}

impl UpdateProjectRequest {
    pub fn normalized(self) -> Self {
        UpdateProjectRequest {
            title: self.title.map(|s| s.trim().to_string()),
            slug: self.slug.map(|s| s.trim().to_lowercase()),
            tagline: self.tagline.trimmed(),
            description: self.description.map(|s| s.trim().to_string()),
            long_description: self.long_description.trimmed(),
            tech_stack: self.tech_stack.map(clean_list),
            image: self.image.map(|s| s.trim().to_string()),
            images: self.images.map(clean_list),
            live_url: self.live_url.trimmed(),
            github_url: self.github_url.trimmed(),
            category: self.category.map(|s| s.trim().to_string()),
            project_type: self.project_type.trimmed(),
            featured: self.featured,
            order: self.order,
            status: self.status.map(|s| s.trim().to_string()),
            start_date: self.start_date,
            end_date: self.end_date,
            highlights: self.highlights.map(clean_list),
            case_study: self.case_study.map_value(CaseStudy::cleaned),
            outcome: self.outcome.trimmed(),
        }
    }
}

// ───── Validation Helpers ───────────────────────────────────────────

pub fn validate_category(value: &str) -> Result<(), ValidationError> {
    validate_enum::<ProjectCategory>(value, "category")
}

pub fn validate_project_type(value: &str) -> Result<(), ValidationError> {
    validate_enum::<ProjectType>(value, "project type")
}

pub fn validate_project_status(value: &str) -> Result<(), ValidationError> {
    validate_enum::<ProjectStatus>(value, "status")
}

pub fn validate_optional_project_type(value: &OptionField<String>) -> Result<(), ValidationError> {
    if let OptionField::SetToValue(kind) = value {
        validate_project_type(kind)?;
    }
    Ok(())
}

pub fn validate_optional_url_field(value: &OptionField<String>) -> Result<(), ValidationError> {
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

// ───── Conversions ──────────────────────────────────────────────────

impl TryFrom<NewProjectRequest> for ProjectDraft {
    type Error = AppError;

    fn try_from(value: NewProjectRequest) -> Result<Self, Self::Error> {
        let value = value.normalized();
        value.validate()?;

        // Required fields were checked above
        let title = value.title.unwrap_or_default();
        let slug = match value.slug {
            Some(s) => s,
            None => {
                let generated = slug::slugify(&title);
                if generated.len() < MIN_SLUG_LENGTH as usize {
                    return Err(field_error(
                        "slug",
                        "slug_too_short",
                        "Generated slug is too short; please provide a custom slug",
                    )
                    .into());
                }
                generated
            }
        };

        Ok(ProjectDraft {
            title,
            slug,
            tagline: value.tagline,
            description: value.description.unwrap_or_default(),
            long_description: value.long_description,
            tech_stack: value.tech_stack.unwrap_or_default(),
            image: value.image.unwrap_or_default(),
            images: value.images.unwrap_or_default(),
            live_url: value.live_url,
            github_url: value.github_url,
            category: parse_enum(value.category.as_deref().unwrap_or_default(), "category")?,
            project_type: value
                .project_type
                .as_deref()
                .map(|t| parse_enum(t, "type"))
                .transpose()?,
            featured: value.featured.unwrap_or(false),
            order: value.order.unwrap_or(0),
            status: value
                .status
                .as_deref()
                .map(|s| parse_enum(s, "status"))
                .transpose()?
                .unwrap_or_default(),
            start_date: value.start_date,
            end_date: value.end_date,
            highlights: value.highlights.unwrap_or_default(),
            case_study: value.case_study,
            outcome: value.outcome,
        })
    }
}

impl ProjectDraft {
    pub fn into_project(self, id: Uuid, now: DateTime<Utc>) -> Project {
        Project {
            id,
            title: self.title,
            slug: self.slug,
            tagline: self.tagline,
            description: self.description,
            long_description: self.long_description,
            tech_stack: self.tech_stack,
            image: self.image,
            images: self.images,
            live_url: self.live_url,
            github_url: self.github_url,
            category: self.category,
            project_type: self.project_type,
            featured: self.featured,
            order: self.order,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            highlights: self.highlights,
            case_study: self.case_study,
            outcome: self.outcome,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<ProjectRow> for Project {
    type Error = AppError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, value: &str| {
            AppError::InternalError(format!("Stored project {} has invalid {}: {}", row.id, field, value))
        };

        Ok(Project {
            category: row.category.parse().map_err(|_| corrupt("category", &row.category))?,
            project_type: match row.project_type.as_deref() {
                Some(t) => Some(t.parse().map_err(|_| corrupt("type", t))?),
                None => None,
            },
            status: row.status.parse().map_err(|_| corrupt("status", &row.status))?,
            id: row.id,
            title: row.title,
            slug: row.slug,
            tagline: row.tagline,
            description: row.description,
            long_description: row.long_description,
            tech_stack: row.tech_stack,
            image: row.image,
            images: row.images,
            live_url: row.live_url,
            github_url: row.github_url,
            featured: row.featured,
            order: row.sort_order,
            start_date: row.start_date,
            end_date: row.end_date,
            highlights: row.highlights,
            case_study: row.case_study.map(|j| j.0),
            outcome: row.outcome,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl Project {
    /// Applies a validated update. Absent keys leave the stored value alone.
    pub fn apply_update(&mut self, update: UpdateProjectRequest, now: DateTime<Utc>) -> Result<(), AppError> {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(slug) = update.slug {
            self.slug = slug;
        }
        update.tagline.apply_to(&mut self.tagline);
        if let Some(description) = update.description {
            self.description = description;
        }
        update.long_description.apply_to(&mut self.long_description);
        if let Some(tech_stack) = update.tech_stack {
            self.tech_stack = tech_stack;
        }
        if let Some(image) = update.image {
            self.image = image;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        update.live_url.apply_to(&mut self.live_url);
        update.github_url.apply_to(&mut self.github_url);
        if let Some(category) = update.category.as_deref() {
            self.category = parse_enum(category, "category")?;
        }
        match update.project_type {
            OptionField::Unchanged => {}
            OptionField::SetToNull => self.project_type = None,
            OptionField::SetToValue(t) => self.project_type = Some(parse_enum(&t, "type")?),
        }
        if let Some(featured) = update.featured {
            self.featured = featured;
        }
        if let Some(order) = update.order {
            self.order = order;
        }
        if let Some(status) = update.status.as_deref() {
            self.status = parse_enum(status, "status")?;
        }
        update.start_date.apply_to(&mut self.start_date);
        update.end_date.apply_to(&mut self.end_date);
        if let Some(highlights) = update.highlights {
            self.highlights = highlights;
        }
        update.case_study.apply_to(&mut self.case_study);
        update.outcome.apply_to(&mut self.outcome);
        self.updated_at = now;
        Ok(())
    }
}
