use crate::{
    entities::gallery::{merge_images, GalleryQuery, GalleryResponse, GallerySource},
    errors::AppError,
    use_cases::discovery::GalleryDiscovery,
    utils::sandbox::ImageSandbox,
};

pub struct GalleryHandler {
    pub sandbox: ImageSandbox,
    pub discovery: Option<GalleryDiscovery>,
}

impl GalleryHandler {
    pub fn new(sandbox: ImageSandbox, discovery: Option<GalleryDiscovery>) -> Self {
        GalleryHandler { sandbox, discovery }
    }

    pub async fn list(&self, folder: Option<&str>) -> Result<Vec<String>, AppError> {
        let folder = required_folder(folder)?;
        self.sandbox.list_images(folder).await
    }

    /// Listed images when the folder has any, otherwise whatever discovery
    /// has found so far, merged with the caller's own images.
    pub async fn gallery(&self, query: &GalleryQuery) -> Result<GalleryResponse, AppError> {
        let provided = query.provided_images();

        let folder = match query.folder.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
            Some(raw) => Some(ImageSandbox::normalize(strip_images_prefix(raw))?),
            None => None,
        };

        let mut primary = Vec::new();
        let mut source = None;
        let mut complete = true;

        if let Some(folder) = &folder {
            let folder = folder.to_string_lossy().replace('\\', "/");
            match self.sandbox.list_images(&folder).await {
                Ok(images) if !images.is_empty() => {
                    primary = images;
                    source = Some(GallerySource::Listing);
                }
                Ok(_) | Err(AppError::NotFound(_)) => {
                    if let Some(discovery) = &self.discovery {
                        let snapshot = discovery.snapshot(&folder, query.title.as_deref());
                        complete = snapshot.complete;
                        if !snapshot.images.is_empty() {
                            source = Some(GallerySource::Discovery);
                        }
                        primary = snapshot.images;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        let images = merge_images(&primary, &provided);
        let source = source.unwrap_or(if images.is_empty() {
            GallerySource::Empty
        } else {
            GallerySource::Provided
        });

        Ok(GalleryResponse { success: true, count: images.len(), images, source, complete })
    }
}

fn required_folder(folder: Option<&str>) -> Result<&str, AppError> {
    folder
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::BadRequest("Folder parameter is required".into()))
}

/// Galleries are often addressed by their public path (`/images/events/x`).
fn strip_images_prefix(folder: &str) -> &str {
    folder
        .strip_prefix("/images/")
        .or_else(|| folder.strip_prefix("images/"))
        .unwrap_or(folder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn handler() -> (tempfile::TempDir, GalleryHandler) {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("projects").join("t1dubb");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("Hero.png"), b"x").unwrap();
        fs::create_dir_all(dir.path().join("events").join("empty")).unwrap();

        let handler = GalleryHandler::new(ImageSandbox::new(dir.path()), None);
        (dir, handler)
    }

    #[tokio::test]
    async fn list_requires_folder() {
        let (_dir, handler) = handler();
        let err = handler.list(Some("  ")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Folder parameter is required"));
    }

    #[tokio::test]
    async fn listing_merges_with_provided() {
        let (_dir, handler) = handler();
        let query = GalleryQuery {
            folder: Some("/images/projects/t1dubb".into()),
            title: None,
            images: Some("/images/projects/t1dubb/hero.PNG, /images/extra.jpg".into()),
        };

        let gallery = handler.gallery(&query).await.unwrap();
        assert_eq!(gallery.source, GallerySource::Listing);
        assert_eq!(
            gallery.images,
            vec!["/images/projects/t1dubb/Hero.png".to_string(), "/images/extra.jpg".to_string()]
        );
        assert!(gallery.complete);
    }

    #[tokio::test]
    async fn empty_folder_without_discovery_is_empty_success() {
        let (_dir, handler) = handler();
        let query = GalleryQuery { folder: Some("events/empty".into()), ..Default::default() };

        let gallery = handler.gallery(&query).await.unwrap();
        assert_eq!(gallery.source, GallerySource::Empty);
        assert_eq!(gallery.count, 0);
    }

    #[tokio::test]
    async fn missing_folder_falls_back_to_provided() {
        let (_dir, handler) = handler();
        let query = GalleryQuery {
            folder: Some("events/unknown".into()),
            title: None,
            images: Some("/images/a.jpg".into()),
        };

        let gallery = handler.gallery(&query).await.unwrap();
        assert_eq!(gallery.source, GallerySource::Provided);
        assert_eq!(gallery.images, vec!["/images/a.jpg".to_string()]);
    }

    #[tokio::test]
    async fn escaping_folder_is_forbidden() {
        let (_dir, handler) = handler();
        let query = GalleryQuery { folder: Some("../../etc".into()), ..Default::default() };
        assert!(matches!(handler.gallery(&query).await, Err(AppError::Forbidden(_))));
    }
}
