use std::path::{Component, Path, PathBuf};

use crate::{entities::gallery::is_image_file, errors::AppError};

/// Read-only view of the public image directory. Every lookup is confined to
/// `root`, both lexically and after symlinks are resolved.
#[derive(Debug, Clone)]
pub struct ImageSandbox {
    root: PathBuf,
}

impl ImageSandbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ImageSandbox { root: root.into() }
    }

    /// Collapses `.` and `..` without touching the filesystem. Absolute paths
    /// and anything climbing above the root are rejected.
    pub fn normalize(folder: &str) -> Result<PathBuf, AppError> {
        let mut normalized = PathBuf::new();
        for component in Path::new(folder).components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(access_denied());
                    }
                }
                Component::RootDir | Component::Prefix(_) => return Err(access_denied()),
            }
        }
        Ok(normalized)
    }

    /// Resolves `folder` to an existing directory inside the root.
    pub async fn resolve_dir(&self, folder: &str) -> Result<(PathBuf, String), AppError> {
        let relative = Self::normalize(folder)?;
        let candidate = self.root.join(&relative);

        let not_found = || AppError::NotFound("Folder not found".into());
        let resolved = tokio::fs::canonicalize(&candidate).await.map_err(|_| not_found())?;
        let root = tokio::fs::canonicalize(&self.root).await.map_err(|_| not_found())?;

        if !resolved.starts_with(&root) {
            return Err(access_denied());
        }

        let metadata = tokio::fs::metadata(&resolved).await.map_err(|_| not_found())?;
        if !metadata.is_dir() {
            return Err(AppError::BadRequest("Path is not a directory".into()));
        }

        let url_folder = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");

        Ok((resolved, url_folder))
    }

    /// Image files directly inside `folder`, sorted by name, as public URLs
    /// (`/images/<folder>/<file>`).
    pub async fn list_images(&self, folder: &str) -> Result<Vec<String>, AppError> {
        let (dir, url_folder) = self.resolve_dir(folder).await?;

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_image_file(&name) {
                continue;
            }
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(true) {
                continue;
            }
            names.push(name);
        }
        names.sort();

        Ok(names
            .into_iter()
            .map(|name| {
                if url_folder.is_empty() {
                    format!("/images/{}", name)
                } else {
                    format!("/images/{}/{}", url_folder, name)
                }
            })
            .collect())
    }
}

fn access_denied() -> AppError {
    AppError::Forbidden("Access denied".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> (tempfile::TempDir, ImageSandbox) {
        let dir = tempfile::tempdir().unwrap();
        let projects = dir.path().join("projects").join("t1dubb");
        fs::create_dir_all(&projects).unwrap();
        for name in ["b.PNG", "a.jpg", "notes.txt", "c.webp"] {
            fs::write(projects.join(name), b"x").unwrap();
        }
        fs::write(dir.path().join("file.jpg"), b"x").unwrap();
        let sandbox = ImageSandbox::new(dir.path());
        (dir, sandbox)
    }

    #[test]
    fn normalize_rejects_escapes() {
        assert!(ImageSandbox::normalize("../../etc").is_err());
        assert!(ImageSandbox::normalize("/etc").is_err());
        assert!(ImageSandbox::normalize("projects/../../x").is_err());
        assert_eq!(ImageSandbox::normalize("projects/./a/../b").unwrap(), PathBuf::from("projects/b"));
    }

    #[tokio::test]
    async fn lists_only_images_sorted() {
        let (_dir, sandbox) = fixture();
        let images = sandbox.list_images("projects/t1dubb").await.unwrap();
        assert_eq!(
            images,
            vec![
                "/images/projects/t1dubb/a.jpg".to_string(),
                "/images/projects/t1dubb/b.PNG".to_string(),
                "/images/projects/t1dubb/c.webp".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn missing_and_non_directory_paths() {
        let (_dir, sandbox) = fixture();
        assert!(matches!(sandbox.list_images("nope").await, Err(AppError::NotFound(_))));
        assert!(matches!(sandbox.list_images("file.jpg").await, Err(AppError::BadRequest(_))));
        assert!(matches!(sandbox.list_images("../../etc").await, Err(AppError::Forbidden(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_out_of_the_root_are_forbidden() {
        let (dir, sandbox) = fixture();
        let outside = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("escape")).unwrap();

        assert!(matches!(sandbox.list_images("escape").await, Err(AppError::Forbidden(_))));
    }
}
