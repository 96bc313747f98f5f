use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

pub(crate) static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Where the images of a resolved gallery came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GallerySource {
    Listing,
    Discovery,
    Provided,
    Empty,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageListQuery {
    pub folder: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GalleryQuery {
    pub folder: Option<String>,
    pub title: Option<String>,
    /// Comma separated list of image paths supplied by the caller.
    pub images: Option<String>,
}

impl GalleryQuery {
    pub fn provided_images(&self) -> Vec<String> {
        self.images
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct ImageListResponse {
    pub success: bool,
    pub images: Vec<String>,
    pub count: usize,
}

impl ImageListResponse {
    pub fn new(images: Vec<String>) -> Self {
        ImageListResponse { success: true, count: images.len(), images }
    }
}

#[derive(Debug, Serialize)]
pub struct GalleryResponse {
    pub success: bool,
    pub images: Vec<String>,
    pub count: usize,
    pub source: GallerySource,
    /// `false` while a background discovery for the folder is still running.
    pub complete: bool,
}

pub fn is_image_file(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Identity used to collapse duplicates: case-insensitive, without one
/// trailing slash, with whitespace runs collapsed.
pub fn merge_key(path: &str) -> String {
    let lowered = path.to_lowercase();
    let stripped = lowered.strip_suffix('/').unwrap_or(&lowered);
    WHITESPACE_RUN.replace_all(stripped, " ").trim().to_string()
}

/// Primary entries first, then the extra ones; the first spelling of each key
/// wins. Blank entries are dropped.
pub fn merge_images<'a, P, E>(primary: P, extra: E) -> Vec<String>
where
    P: IntoIterator<Item = &'a String>,
    E: IntoIterator<Item = &'a String>,
{
    let mut seen = HashSet::new();
    primary
        .into_iter()
        .chain(extra)
        .filter(|path| !path.trim().is_empty())
        .filter(|path| seen.insert(merge_key(path)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn merge_key_normalizes() {
        assert_eq!(merge_key("/images/A/Screenshot  (1).PNG/"), "/images/a/screenshot (1).png");
        assert_eq!(merge_key("  /x.jpg "), "/x.jpg");
        assert_eq!(merge_key("/images/p//"), "/images/p/");
    }

    #[test]
    fn merge_keeps_first_spelling_and_order() {
        let listed = strings(&["/images/p/a.png", "/images/p/B.png"]);
        let provided = strings(&["/images/p/b.png", "/images/p/c.png", "/images/p/A.PNG/"]);
        let merged = merge_images(&listed, &provided);
        assert_eq!(merged, strings(&["/images/p/a.png", "/images/p/B.png", "/images/p/c.png"]));
    }

    #[test]
    fn merge_is_idempotent() {
        let listed = strings(&["/a.png", "/b  c.png", "/A.png"]);
        let provided = strings(&["/b c.png", "/d.png"]);
        let once = merge_images(&listed, &provided);
        let twice = merge_images(&once, &provided);
        assert_eq!(once, twice);
        assert_eq!(merge_images(&once, &Vec::new()), once);
    }

    #[test]
    fn image_extensions_are_case_insensitive() {
        assert!(is_image_file("IMG_1001.JPG"));
        assert!(is_image_file("hero.webp"));
        assert!(!is_image_file("notes.txt"));
        assert!(!is_image_file("jpg"));
    }

    #[test]
    fn provided_images_split_on_commas() {
        let query = GalleryQuery { images: Some(" /a.png, ,/b.png ".into()), ..Default::default() };
        assert_eq!(query.provided_images(), strings(&["/a.png", "/b.png"]));
    }
}
