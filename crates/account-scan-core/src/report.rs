use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{Instrument, debug, info, info_span};

use crate::error::Result;
use crate::graph::ImageFetcher;
use crate::model::{ProfileRecord, Relation, UserId};

/// Attributes listed for every profile in a report.
pub const DEFAULT_FIELDS: [&str; 9] = [
    "name",
    "screen_name",
    "id",
    "location",
    "profile_location",
    "description",
    "followers_count",
    "friends_count",
    "following",
];

/// Renders profiles as a Markdown report with locally cached profile images.
///
/// Images live under `<images_root>/<id>/<file name>` and are downloaded the first time a
/// profile is rendered. Reports are written to `<reports_root>/<target id>.md`.
pub struct ReportRenderer<'a, F> {
    images: &'a F,
    images_root: PathBuf,
    reports_root: PathBuf,
    fields: Vec<String>,
}

impl<'a, F: ImageFetcher> ReportRenderer<'a, F> {
    pub fn new(
        images: &'a F,
        images_root: impl Into<PathBuf>,
        reports_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            images,
            images_root: images_root.into(),
            reports_root: reports_root.into(),
            fields: DEFAULT_FIELDS.iter().map(|field| field.to_string()).collect(),
        }
    }

    /// Replace the attributes listed per profile.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn image_path(&self, record: &ProfileRecord) -> Option<PathBuf> {
        record.image_file_name().map(|name| {
            self.images_root
                .join(record.id.to_string())
                .join(name)
        })
    }

    pub fn report_path(&self, target: UserId) -> PathBuf {
        self.reports_root.join(format!("{target}.md"))
    }

    /// Download the profile image of `record` unless it is already cached. Returns the local
    /// path, or `None` for profiles without an image.
    pub async fn ensure_image(&self, record: &ProfileRecord) -> Result<Option<PathBuf>> {
        let (Some(url), Some(path)) = (
            record.profile_image_url_https.as_deref(),
            self.image_path(record),
        ) else {
            return Ok(None);
        };

        if path.is_file() {
            return Ok(Some(path));
        }

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let bytes = self
            .images
            .fetch_image(url)
            .instrument(info_span!("fetch_image", id = %record.id))
            .await?;

        // An interrupted download must not be mistaken for a cached image
        let mut staging = path.clone().into_os_string();
        staging.push(".partial");
        fs::write(&staging, &bytes)?;
        fs::rename(&staging, &path)?;

        debug!(id = %record.id, path = %path.display(), "profile image cached");
        Ok(Some(path))
    }

    /// One profile section of the report.
    pub async fn render_record(&self, record: &ProfileRecord) -> Result<String> {
        let mut section = String::from("* * *\n");

        for key in &self.fields {
            let value = record.field(key).unwrap_or_else(|| "None".to_string());
            section.push_str(&format!("- {key: <17} : {value}\n"));
        }

        let urls = record.expanded_urls().join("\n");
        section.push_str(&format!("- {: <17} : {urls}\n", "urls"));

        let account_url = record.account_url();
        section.push_str(&format!("- account url : [{account_url}]({account_url})\n"));

        if let Some(image) = self.ensure_image(record).await? {
            section.push_str(&format!(
                "\n\n<img src=\"{}\" width=\"200px\">\n",
                self.link_from_report(&image)?
            ));
        }

        Ok(section)
    }

    /// The full report: the target account first, then every filtered profile.
    pub async fn render(
        &self,
        target: &ProfileRecord,
        filtered: &[ProfileRecord],
        relation: Relation,
    ) -> Result<String> {
        let mut report = String::from("# Target Account\n");
        report.push_str(&self.render_record(target).await?);
        report.push_str(&format!("\n\n## Filtered {relation} information\n\n"));

        let mut sections = Vec::with_capacity(filtered.len());
        for record in filtered {
            sections.push(self.render_record(record).await?);
        }
        report.push_str(&sections.join("\n"));

        Ok(report)
    }

    /// Persist `report` for `target`, replacing an earlier report.
    pub fn write_report(&self, target: UserId, report: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.reports_root)?;

        let path = self.report_path(target);
        fs::write(&path, report)?;

        info!(path = %path.display(), "report written");
        Ok(path)
    }

    /// Link to `image` as seen from a report. Both ends are canonicalized so `..` and symlinks
    /// in the configured roots resolve before the paths are compared.
    fn link_from_report(&self, image: &Path) -> Result<String> {
        fs::create_dir_all(&self.reports_root)?;

        let from = fs::canonicalize(&self.reports_root)?;
        let to = fs::canonicalize(image)?;
        Ok(relative_link(&from, &to))
    }
}

/// `to` expressed relative to the directory `from`, with `/` separators.
fn relative_link(from: &Path, to: &Path) -> String {
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let parents = from.iter().skip(common).map(|_| "..".to_string());
    let rest = to
        .iter()
        .skip(common)
        .map(|component| component.as_os_str().to_string_lossy().into_owned());

    parents.chain(rest).collect::<Vec<_>>().join("/")
}

/// Plain text rendering of one profile for terminal output.
pub fn render_plain(record: &ProfileRecord, fields: &[&str]) -> String {
    let mut block = format!("{}\n", "#".repeat(50));

    for key in fields {
        let value = record.field(key).unwrap_or_else(|| "None".to_string());
        block.push_str(&format!("# {key: <17} : {value}\n"));
    }

    let urls = record.expanded_urls().join("\n");
    block.push_str(&format!("# {: <17} : {urls}\n", "urls"));
    block.push_str(&format!("# account url : {}", record.account_url()));

    block
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use assert_fs::prelude::{FileWriteStr, PathChild};

    use super::{DEFAULT_FIELDS, ReportRenderer, relative_link, render_plain};
    use crate::model::{ExpandedUrl, Relation, UrlEntity, UserId};
    use crate::test_utils::{FakeGraph, profile};

    #[test]
    fn test_relative_link() {
        assert_eq!(
            relative_link(
                Path::new("/work/markdown"),
                Path::new("/work/profile_jpg/1/a.jpg")
            ),
            "../profile_jpg/1/a.jpg"
        );
        assert_eq!(
            relative_link(Path::new("/work"), Path::new("/work/img/a.jpg")),
            "img/a.jpg"
        );
    }

    #[tokio::test]
    async fn test_render_record_layout() {
        let temp = assert_fs::TempDir::new().expect("Failed to create temp dir");
        let graph = FakeGraph::default();
        let renderer = ReportRenderer::new(
            &graph,
            temp.path().join("profile_jpg"),
            temp.path().join("markdown"),
        );

        let mut record = profile(1, "Alice", 10, 20);
        record.entities.url = Some(UrlEntity {
            urls: vec![ExpandedUrl {
                expanded_url: Some("https://alice.example".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        });

        let section = renderer.render_record(&record).await.unwrap();

        assert!(section.starts_with("* * *\n- name              : Alice\n"));
        assert!(section.contains("- followers_count   : 10\n"));
        assert!(section.contains("- profile_location  : None\n"));
        assert!(section.contains("- urls              : https://alice.example\n"));
        assert!(section.contains(
            "- account url : [https://twitter.com/user1](https://twitter.com/user1)\n"
        ));
        assert!(section.contains("<img src=\"../profile_jpg/1/img1_normal.jpg\" width=\"200px\">"));
    }

    #[tokio::test]
    async fn test_images_are_fetched_once() {
        let temp = assert_fs::TempDir::new().expect("Failed to create temp dir");
        let graph = FakeGraph::default();
        let renderer = ReportRenderer::new(
            &graph,
            temp.path().join("profile_jpg"),
            temp.path().join("markdown"),
        );
        let record = profile(9, "Nine", 1, 1);

        let first = renderer.ensure_image(&record).await.unwrap().unwrap();
        let second = renderer.ensure_image(&record).await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(
            std::fs::read_to_string(&first).unwrap(),
            "image bytes of https://pbs.twimg.com/profile_images/9/img9_normal.jpg"
        );
        assert_eq!(graph.image_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_existing_image_is_not_refetched() {
        let temp = assert_fs::TempDir::new().expect("Failed to create temp dir");
        temp.child("profile_jpg/4/img4_normal.jpg")
            .write_str("already here")
            .expect("Failed to write image");

        let graph = FakeGraph::default();
        let renderer = ReportRenderer::new(
            &graph,
            temp.path().join("profile_jpg"),
            temp.path().join("markdown"),
        );

        renderer.render_record(&profile(4, "Four", 1, 1)).await.unwrap();

        assert!(graph.image_requests().is_empty());
    }

    #[tokio::test]
    async fn test_image_link_with_parent_dir_in_reports_root() {
        let temp = assert_fs::TempDir::new().expect("Failed to create temp dir");
        let graph = FakeGraph::default();
        let renderer = ReportRenderer::new(
            &graph,
            temp.path().join("work").join("profile_jpg"),
            temp.path().join("work").join("..").join("out"),
        );

        let section = renderer.render_record(&profile(1, "One", 1, 1)).await.unwrap();

        let src = section
            .split("<img src=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap();
        assert_eq!(src, "../work/profile_jpg/1/img1_normal.jpg");
        assert!(temp.path().join("out").join(src).is_file());
    }

    #[tokio::test]
    async fn test_interrupted_download_is_refetched() {
        let temp = assert_fs::TempDir::new().expect("Failed to create temp dir");
        temp.child("profile_jpg/6/img6_normal.jpg.partial")
            .write_str("trunc")
            .expect("Failed to write partial image");

        let graph = FakeGraph::default();
        let renderer = ReportRenderer::new(
            &graph,
            temp.path().join("profile_jpg"),
            temp.path().join("markdown"),
        );

        let path = renderer
            .ensure_image(&profile(6, "Six", 1, 1))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(graph.image_requests().len(), 1);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "image bytes of https://pbs.twimg.com/profile_images/6/img6_normal.jpg"
        );
        assert!(!temp.path().join("profile_jpg/6/img6_normal.jpg.partial").exists());
    }

    #[tokio::test]
    async fn test_record_without_image() {
        let temp = assert_fs::TempDir::new().expect("Failed to create temp dir");
        let graph = FakeGraph::default();
        let renderer = ReportRenderer::new(&graph, temp.path(), temp.path());

        let mut record = profile(5, "Five", 1, 1);
        record.profile_image_url_https = None;

        let section = renderer.render_record(&record).await.unwrap();

        assert!(!section.contains("<img"));
        assert!(graph.image_requests().is_empty());
    }

    #[tokio::test]
    async fn test_render_and_write_report() {
        let temp = assert_fs::TempDir::new().expect("Failed to create temp dir");
        let graph = FakeGraph::default();
        let renderer = ReportRenderer::new(
            &graph,
            temp.path().join("profile_jpg"),
            temp.path().join("markdown"),
        );

        let target = profile(100, "Target", 5000, 10);
        let filtered = vec![profile(1, "First", 1, 1), profile(2, "Second", 1, 1)];

        let report = renderer
            .render(&target, &filtered, Relation::Friends)
            .await
            .unwrap();

        assert!(report.starts_with("# Target Account\n* * *\n- name              : Target\n"));
        assert!(report.contains("\n\n## Filtered friends information\n\n* * *\n"));
        let first = report.find("First").unwrap();
        let second = report.find("Second").unwrap();
        assert!(first < second);
        assert_eq!(graph.image_requests().len(), 3);

        let path = renderer.write_report(UserId(100), &report).unwrap();
        assert_eq!(path, temp.path().join("markdown").join("100.md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), report);

        // regenerating overwrites
        renderer.write_report(UserId(100), "fresh").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh");
    }

    #[tokio::test]
    async fn test_custom_fields() {
        let temp = assert_fs::TempDir::new().expect("Failed to create temp dir");
        let graph = FakeGraph::default();
        let renderer =
            ReportRenderer::new(&graph, temp.path(), temp.path()).with_fields(["screen_name"]);

        let section = renderer
            .render_record(&profile(3, "Three", 1, 1))
            .await
            .unwrap();

        assert!(section.starts_with("* * *\n- screen_name       : user3\n- urls "));
    }

    #[test]
    fn test_render_plain() {
        let block = render_plain(&profile(7, "Seven", 3, 4), &DEFAULT_FIELDS);

        assert!(block.starts_with(&format!("{}\n# name              : Seven\n", "#".repeat(50))));
        assert!(block.contains("# friends_count     : 4\n"));
        assert!(block.ends_with("# account url : https://twitter.com/user7"));
    }
}
