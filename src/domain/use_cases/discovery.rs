use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::NaiveDate;
use dashmap::{mapref::entry::Entry, DashMap};
use futures::future::join_all;
use tracing::{debug, info};

use crate::{entities::gallery::WHITESPACE_RUN, probe::AssetProbe};

const SCREENSHOT_EXTENSIONS: &[&str] = &["png", "jpg", "JPG", "PNG"];
const IMG_EXTENSIONS: &[&str] = &["JPG", "jpg", "PNG", "png"];
const CAPTURE_EXTENSIONS: &[&str] = &["jpeg", "jpg"];
const COMMON_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "JPG", "JPEG", "PNG", "WEBP"];
const KNOWN_FILES: &[&str] = &[
    "sddefault.jpg",
    "162A0661.JPG",
    "162A1002 (1).png",
    "162A1002(1).png",
    "screencapture-localhost-3000-2025-12-01-01_36_30.png",
];

/// Day, hour and minutes for which `WhatsApp Image <date> at hh.mm.ss`
/// names are generated, every second of each minute.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureWindow {
    pub date: NaiveDate,
    pub hour: u32,
    pub minutes: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    pub base_url: String,
    pub batch_size: usize,
    pub probe_timeout: Duration,
    pub batch_delay: Duration,
    pub capture: CaptureWindow,
}

/// Hits found so far for one folder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverySnapshot {
    pub images: Vec<String>,
    pub complete: bool,
}

/// File names worth probing in a folder, in priority order, without
/// duplicates.
pub fn candidate_names(title: Option<&str>, capture: &CaptureWindow) -> Vec<String> {
    let mut names = Vec::new();

    for n in 1020..=1220 {
        names.extend(SCREENSHOT_EXTENSIONS.iter().map(|ext| format!("Screenshot ({n}).{ext}")));
    }
    for n in 1000..=2000 {
        names.extend(IMG_EXTENSIONS.iter().map(|ext| format!("IMG_{n}.{ext}")));
    }

    let date = capture.date.format("%Y-%m-%d");
    for minute in &capture.minutes {
        for second in 0..60 {
            let stamp = format!("WhatsApp Image {date} at {:02}.{:02}.{:02}", capture.hour, minute, second);
            for ext in CAPTURE_EXTENSIONS {
                names.push(format!("{stamp}.{ext}"));
                names.push(format!("{stamp} (1).{ext}"));
            }
        }
    }

    names.extend(KNOWN_FILES.iter().map(|name| name.to_string()));

    for n in 1..=100 {
        for ext in COMMON_EXTENSIONS {
            names.push(format!("{n}.{ext}"));
            names.push(format!("image{n}.{ext}"));
            names.push(format!("img{n}.{ext}"));
        }
    }

    let title_slug = title_slug(title.unwrap_or("Gallery"));
    for ext in COMMON_EXTENSIONS {
        for stem in ["main", "hero", "cover", title_slug.as_str()] {
            if !stem.is_empty() {
                names.push(format!("{stem}.{ext}"));
            }
        }
    }

    let mut seen = HashSet::new();
    names.retain(|name| seen.insert(name.clone()));
    names
}

/// Lowercased, each whitespace run replaced by one hyphen. Edge runs are
/// kept as hyphens too.
fn title_slug(title: &str) -> String {
    WHITESPACE_RUN.replace_all(&title.to_lowercase(), "-").into_owned()
}

fn asset_path(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        format!("/images/{name}")
    } else {
        format!("/images/{folder}/{name}")
    }
}

/// Probes candidate names against the asset host, at most one run per
/// folder for the lifetime of the process.
#[derive(Clone)]
pub struct GalleryDiscovery {
    probe: Arc<dyn AssetProbe>,
    settings: DiscoverySettings,
    registry: Arc<DashMap<String, DiscoverySnapshot>>,
}

impl GalleryDiscovery {
    pub fn new(probe: Arc<dyn AssetProbe>, settings: DiscoverySettings) -> Self {
        GalleryDiscovery { probe, settings, registry: Arc::new(DashMap::new()) }
    }

    /// Current snapshot for `folder`, starting a background run the first
    /// time the folder is asked for.
    pub fn snapshot(&self, folder: &str, title: Option<&str>) -> DiscoverySnapshot {
        match self.registry.entry(folder.to_string()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                entry.insert(DiscoverySnapshot::default());

                let paths: Vec<String> = candidate_names(title, &self.settings.capture)
                    .iter()
                    .map(|name| asset_path(folder, name))
                    .collect();
                info!(folder, candidates = paths.len(), "Starting gallery discovery");

                let discovery = self.clone();
                let folder = folder.to_string();
                tokio::spawn(async move { discovery.run(&folder, paths).await });

                DiscoverySnapshot::default()
            }
        }
    }

    pub fn tracked_folders(&self) -> usize {
        self.registry.len()
    }

    /// Probes `paths` batch by batch, publishing hits after every batch.
    /// Hits keep the order of `paths` whatever order the probes finish in.
    pub async fn run(&self, folder: &str, paths: Vec<String>) -> DiscoverySnapshot {
        let batches: Vec<&[String]> = paths.chunks(self.settings.batch_size.max(1)).collect();
        let batch_count = batches.len();

        for (index, batch) in batches.into_iter().enumerate() {
            let results = join_all(batch.iter().map(|path| self.probe_one(path))).await;
            let hits: Vec<String> = batch
                .iter()
                .zip(results)
                .filter_map(|(path, found)| found.then(|| path.clone()))
                .collect();

            if !hits.is_empty() {
                debug!(folder, batch = index + 1, found = hits.len(), "Discovery batch found images");
                self.registry.entry(folder.to_string()).or_default().images.extend(hits);
            }

            if index + 1 < batch_count && !self.settings.batch_delay.is_zero() {
                tokio::time::sleep(self.settings.batch_delay).await;
            }
        }

        let mut snapshot = self.registry.entry(folder.to_string()).or_default();
        snapshot.complete = true;
        info!(folder, found = snapshot.images.len(), "Gallery discovery complete");
        snapshot.clone()
    }

    async fn probe_one(&self, path: &str) -> bool {
        tokio::time::timeout(self.settings.probe_timeout, self.probe.exists(path))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn window() -> CaptureWindow {
        CaptureWindow {
            date: NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
            hour: 20,
            minutes: vec![9, 10, 11, 12, 13, 14, 38, 39],
        }
    }

    fn settings(batch_size: usize, probe_timeout: Duration) -> DiscoverySettings {
        DiscoverySettings {
            base_url: "https://cdn.example.com".into(),
            batch_size,
            probe_timeout,
            batch_delay: Duration::from_millis(1),
            capture: window(),
        }
    }

    /// Answers after a delay derived from the path, so probes finish out of
    /// order.
    struct ScatteredProbe {
        present: HashSet<String>,
    }

    #[async_trait]
    impl AssetProbe for ScatteredProbe {
        async fn exists(&self, path: &str) -> bool {
            let mut hasher = DefaultHasher::new();
            path.hash(&mut hasher);
            tokio::time::sleep(Duration::from_millis(hasher.finish() % 7)).await;
            self.present.contains(path)
        }
    }

    struct HangingProbe;

    #[async_trait]
    impl AssetProbe for HangingProbe {
        async fn exists(&self, _path: &str) -> bool {
            tokio::time::sleep(Duration::from_secs(60)).await;
            true
        }
    }

    #[test]
    fn candidates_cover_every_family_once() {
        let names = candidate_names(Some("Cairo AI  Hackathon"), &window());
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());

        assert_eq!(names[0], "Screenshot (1020).png");
        assert!(names.contains(&"IMG_2000.PNG".to_string()));
        assert!(names.contains(&"WhatsApp Image 2026-01-06 at 20.38.59 (1).jpeg".to_string()));
        assert!(names.contains(&"162A1002 (1).png".to_string()));
        assert!(names.contains(&"img100.WEBP".to_string()));
        assert!(names.contains(&"cairo-ai-hackathon.jpeg".to_string()));
        assert!(!names.iter().any(|n| n.starts_with("WhatsApp Image 2026-01-06 at 20.15")));
    }

    #[test]
    fn title_slug_keeps_edge_whitespace_as_hyphens() {
        assert_eq!(title_slug("Cairo AI  Hackathon"), "cairo-ai-hackathon");
        assert_eq!(title_slug(" Demo Day "), "-demo-day-");
    }

    #[test]
    fn title_defaults_to_gallery() {
        let names = candidate_names(None, &window());
        assert!(names.contains(&"gallery.png".to_string()));
    }

    #[tokio::test]
    async fn hits_keep_candidate_order() {
        let paths: Vec<String> = (1..=40).map(|n| format!("/images/p/{n}.jpg")).collect();
        let present: HashSet<String> = paths.iter().filter(|p| p.len() % 2 == 0).cloned().collect();
        let expected: Vec<String> = paths.iter().filter(|p| present.contains(*p)).cloned().collect();

        let discovery = GalleryDiscovery::new(
            Arc::new(ScatteredProbe { present }),
            settings(7, Duration::from_millis(500)),
        );
        let snapshot = discovery.run("p", paths).await;

        assert!(snapshot.complete);
        assert_eq!(snapshot.images, expected);
    }

    #[tokio::test]
    async fn timed_out_probes_count_as_absent() {
        let discovery = GalleryDiscovery::new(Arc::new(HangingProbe), settings(10, Duration::from_millis(5)));
        let snapshot = discovery.run("p", vec!["/images/p/1.jpg".into()]).await;

        assert!(snapshot.complete);
        assert!(snapshot.images.is_empty());
    }

    #[tokio::test]
    async fn folder_is_discovered_once() {
        let discovery = GalleryDiscovery::new(
            Arc::new(ScatteredProbe { present: HashSet::new() }),
            settings(200, Duration::from_millis(5)),
        );

        let first = discovery.snapshot("events/x", None);
        let second = discovery.snapshot("events/x", None);

        assert!(first.images.is_empty());
        assert!(!second.complete || second.images.is_empty());
        assert_eq!(discovery.tracked_folders(), 1);
    }
}
