use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod content;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;
pub mod shared_repos;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{db, email, limiter, probe, utils};

use constants::START_TIME;
use db::Storage;
use once_cell::sync::Lazy;
use email::Mailer;
use limiter::SubmissionLimiter;
use probe::HttpAssetProbe;
use repositories::{contact::ContactRepository, event::EventRepository, project::ProjectRepository};
use settings::AppConfig;
use shared_repos::SharedRepositories;
use use_cases::{
    contact::{ContactEmailSettings, ContactHandler},
    discovery::GalleryDiscovery,
    events::EventHandler,
    gallery::GalleryHandler,
    projects::ProjectHandler,
};
use utils::sandbox::ImageSandbox;

pub type AppProjectHandler = ProjectHandler<dyn ProjectRepository>;
pub type AppEventHandler = EventHandler<dyn EventRepository>;
pub type AppContactHandler = ContactHandler<dyn ContactRepository>;

pub struct AppState {
    pub project_handler: AppProjectHandler,
    pub event_handler: AppEventHandler,
    pub contact_handler: AppContactHandler,
    pub gallery_handler: GalleryHandler,
    pub storage: Storage,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        repos: SharedRepositories,
        storage: Storage,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Lazy::force(&START_TIME);

        let limiter = (config.contact_rate_limit > 0)
            .then(|| SubmissionLimiter::new(config.contact_rate_limit, config.contact_rate_window()));
        let contact_handler = ContactHandler::new(
            repos.contact_repo,
            mailer,
            limiter,
            ContactEmailSettings {
                admin_email: config.admin_email.clone(),
                owner_name: config.owner_name.clone(),
            },
        );

        AppState {
            project_handler: ProjectHandler::new(repos.project_repo),
            event_handler: EventHandler::new(repos.event_repo),
            contact_handler,
            gallery_handler: GalleryHandler::new(
                ImageSandbox::new(config.images_root.clone()),
                gallery_discovery(config),
            ),
            storage,
            config: config.clone(),
        }
    }

    pub fn in_memory(config: &AppConfig, mailer: Arc<dyn Mailer>) -> Result<Self, errors::AppError> {
        let repos = SharedRepositories::in_memory()?;
        Ok(Self::new(config, repos, Storage::InMemory, mailer))
    }

    pub fn limiter(&self) -> Option<SubmissionLimiter> {
        self.contact_handler.limiter.clone()
    }
}

fn gallery_discovery(config: &AppConfig) -> Option<GalleryDiscovery> {
    let settings = config.discovery()?;
    match HttpAssetProbe::new(&settings.base_url, settings.probe_timeout) {
        Ok(probe) => Some(GalleryDiscovery::new(Arc::new(probe), settings)),
        Err(e) => {
            tracing::warn!(error = %e, "Gallery discovery disabled");
            None
        }
    }
}
