use std::path::PathBuf;

use account_scan_core::{BatchPolicy, FilterCriteria};
use anyhow::Context;

use crate::cli::Cli;

pub const DATA_DIR_VAR: &str = "ACCOUNT_SCAN_DATA_DIR";
pub const IMAGES_DIR_VAR: &str = "ACCOUNT_SCAN_IMAGES_DIR";
pub const REPORTS_DIR_VAR: &str = "ACCOUNT_SCAN_REPORTS_DIR";
pub const PAGES_VAR: &str = "ACCOUNT_SCAN_PAGES";

/// Settings of one run. Built from defaults, then environment overrides, then CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub images_dir: PathBuf,
    pub reports_dir: PathBuf,
    /// Identifier pages requested per scan
    pub pages: usize,
    pub open_report: bool,
    pub print_records: bool,
    pub criteria: FilterCriteria,
    pub policy: BatchPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            images_dir: PathBuf::from("profile_jpg"),
            reports_dir: PathBuf::from("markdown"),
            pages: 1,
            open_report: true,
            print_records: false,
            criteria: FilterCriteria::default(),
            policy: BatchPolicy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = lookup(DATA_DIR_VAR) {
            config.data_dir = dir.into();
        }
        if let Some(dir) = lookup(IMAGES_DIR_VAR) {
            config.images_dir = dir.into();
        }
        if let Some(dir) = lookup(REPORTS_DIR_VAR) {
            config.reports_dir = dir.into();
        }
        if let Some(pages) = lookup(PAGES_VAR) {
            config.pages = pages
                .trim()
                .parse()
                .with_context(|| format!("{PAGES_VAR} must be a page count, got `{pages}`"))?;
        }

        Ok(config)
    }

    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(dir) = &cli.global.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(dir) = &cli.global.images_dir {
            self.images_dir = dir.clone();
        }
        if let Some(dir) = &cli.global.reports_dir {
            self.reports_dir = dir.clone();
        }
        if let Some(pages) = cli.pages {
            self.pages = pages;
        }
        if cli.no_open {
            self.open_report = false;
        }
        if cli.print {
            self.print_records = true;
        }
        self
    }
}
