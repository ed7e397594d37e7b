//! Configuration options for a sitemap run.

use std::path::PathBuf;

use crate::errors::{Result, SitemapError};

/// Maximum number of URLs per sitemap page (the sitemaps.org protocol limit).
pub const DEFAULT_MAX_RECORDS_PER_PAGE: usize = 50_000;

/// Name of the only page when a run produces a single file; also the name of the index.
pub const DEFAULT_SINGLE_FILE_NAME: &str = "sitemap.xml";

/// Name pattern for pages when a run produces more than one file.
pub const DEFAULT_MULTI_FILE_PATTERN: &str = "sitemap_%d.xml";

/// Placeholder replaced by the page number in the multi-file pattern.
pub const PAGE_NUMBER_PLACEHOLDER: &str = "%d";

/// File naming rule for sitemap pages and the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNames {
    single: String,
    multi_pattern: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            single: DEFAULT_SINGLE_FILE_NAME.to_string(),
            multi_pattern: DEFAULT_MULTI_FILE_PATTERN.to_string(),
        }
    }
}

impl FileNames {
    /// Validates custom names: the pattern needs exactly one `%d` and neither name may
    /// contain a path separator.
    pub fn new(single: impl Into<String>, multi_pattern: impl Into<String>) -> Result<Self> {
        let names = Self {
            single: single.into(),
            multi_pattern: multi_pattern.into(),
        };
        names.validate()?;
        Ok(names)
    }

    fn validate(&self) -> Result<()> {
        for name in [&self.single, &self.multi_pattern] {
            if name.trim().is_empty() {
                return Err(SitemapError::config("sitemap file names cannot be empty"));
            }
            if name.contains(['/', '\\']) {
                return Err(SitemapError::config(format!(
                    "sitemap file name \"{name}\" must not contain a path separator"
                )));
            }
        }
        if self.multi_pattern.matches(PAGE_NUMBER_PLACEHOLDER).count() != 1 {
            return Err(SitemapError::config(format!(
                "multi-file pattern \"{}\" must contain the {PAGE_NUMBER_PLACEHOLDER} placeholder exactly once",
                self.multi_pattern
            )));
        }
        if self.single == self.multi_pattern {
            return Err(SitemapError::config("single and multi-file names must differ"));
        }
        if self.is_page_name(&self.single) {
            return Err(SitemapError::config(format!(
                "single-file name \"{}\" collides with a page name produced by \"{}\"",
                self.single, self.multi_pattern
            )));
        }
        Ok(())
    }

    /// True if `name` is what the multi-file pattern yields for some page number.
    fn is_page_name(&self, name: &str) -> bool {
        let Some((prefix, suffix)) = self.multi_pattern.split_once(PAGE_NUMBER_PLACEHOLDER) else {
            return false;
        };
        name.strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(suffix))
            .is_some_and(|number| {
                !number.is_empty() && !number.starts_with('0') && number.bytes().all(|b| b.is_ascii_digit())
            })
    }

    pub fn single(&self) -> &str {
        &self.single
    }

    pub fn multi_pattern(&self) -> &str {
        &self.multi_pattern
    }

    /// Name of page `index` (1-based).
    ///
    /// The first page keeps the single-file name unless the caller knows more pages follow.
    /// Every other page, and any page written with `has_more`, uses the numbered pattern.
    pub fn filename_for(&self, index: usize, has_more: bool) -> String {
        if has_more || index > 1 {
            self.multi_pattern
                .replacen(PAGE_NUMBER_PLACEHOLDER, &index.to_string(), 1)
        } else {
            self.single.clone()
        }
    }
}

/// Configuration options for the Runner.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Print progress to stdout
    pub verbose: bool,
    /// Accept relative output directories (discouraged)
    pub allow_relative_paths: bool,
    /// Base for relative output directories (default: the process working directory)
    pub relative_root: Option<PathBuf>,
    /// Capacity of one sitemap page (default: 50000)
    pub max_records_per_page: usize,
    /// Page and index file names
    pub file_names: FileNames,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            allow_relative_paths: false,
            relative_root: None,
            max_records_per_page: DEFAULT_MAX_RECORDS_PER_PAGE,
            file_names: FileNames::default(),
        }
    }
}

impl RunnerOptions {
    /// Creates a new builder for RunnerOptions.
    pub fn builder() -> RunnerOptionsBuilder {
        RunnerOptionsBuilder::default()
    }

    /// Checks the values a builder cannot enforce on its own.
    pub fn validate(&self) -> Result<()> {
        if self.max_records_per_page == 0 {
            return Err(SitemapError::config("maximum records per page must be a positive number"));
        }
        self.file_names.validate()
    }
}

/// Builder for RunnerOptions.
#[derive(Debug, Clone, Default)]
pub struct RunnerOptionsBuilder {
    verbose: bool,
    allow_relative_paths: bool,
    relative_root: Option<PathBuf>,
    max_records_per_page: Option<usize>,
    single_file_name: Option<String>,
    multi_file_pattern: Option<String>,
}

impl RunnerOptionsBuilder {
    /// Turns on progress output.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Allows relative output directories.
    pub fn allow_relative_paths(mut self, allow: bool) -> Self {
        self.allow_relative_paths = allow;
        self
    }

    /// Sets the directory relative output paths are resolved against.
    pub fn relative_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.relative_root = Some(root.into());
        self
    }

    /// Sets the page capacity.
    pub fn max_records_per_page(mut self, max: usize) -> Self {
        self.max_records_per_page = Some(max);
        self
    }

    /// Sets the name used for a lone page and for the index.
    pub fn single_file_name(mut self, name: impl Into<String>) -> Self {
        self.single_file_name = Some(name.into());
        self
    }

    /// Sets the numbered page pattern; must contain `%d`.
    pub fn multi_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.multi_file_pattern = Some(pattern.into());
        self
    }

    /// Builds the RunnerOptions. Values are validated by `Runner::new`.
    pub fn build(self) -> RunnerOptions {
        RunnerOptions {
            verbose: self.verbose,
            allow_relative_paths: self.allow_relative_paths,
            relative_root: self.relative_root,
            max_records_per_page: self.max_records_per_page.unwrap_or(DEFAULT_MAX_RECORDS_PER_PAGE),
            file_names: FileNames {
                single: self
                    .single_file_name
                    .unwrap_or_else(|| DEFAULT_SINGLE_FILE_NAME.to_string()),
                multi_pattern: self
                    .multi_file_pattern
                    .unwrap_or_else(|| DEFAULT_MULTI_FILE_PATTERN.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_for() {
        let names = FileNames::default();
        assert_eq!(names.filename_for(1, false), "sitemap.xml");
        assert_eq!(names.filename_for(1, true), "sitemap_1.xml");
        assert_eq!(names.filename_for(2, false), "sitemap_2.xml");
        assert_eq!(names.filename_for(7, true), "sitemap_7.xml");
    }

    #[test]
    fn test_custom_file_names() {
        let names = FileNames::new("products.xml", "products-%d.xml").unwrap();
        assert_eq!(names.filename_for(1, false), "products.xml");
        assert_eq!(names.filename_for(3, false), "products-3.xml");
    }

    #[test]
    fn test_invalid_file_names() {
        assert!(matches!(FileNames::new("a.xml", "b.xml"), Err(SitemapError::Config(_))));
        assert!(matches!(FileNames::new("a.xml", "b_%d_%d.xml"), Err(SitemapError::Config(_))));
        assert!(matches!(FileNames::new("dir/a.xml", "b_%d.xml"), Err(SitemapError::Config(_))));
        assert!(matches!(FileNames::new("", "b_%d.xml"), Err(SitemapError::Config(_))));
    }

    #[test]
    fn test_single_name_cannot_be_a_page_name() {
        assert!(matches!(
            FileNames::new("sitemap_2.xml", "sitemap_%d.xml"),
            Err(SitemapError::Config(_))
        ));
        assert!(matches!(FileNames::new("10.xml", "%d.xml"), Err(SitemapError::Config(_))));

        let options = RunnerOptions::builder().single_file_name("sitemap_1.xml").build();
        assert!(matches!(options.validate(), Err(SitemapError::Config(_))));

        // Never produced: page numbers have no leading zeros and are never empty.
        assert!(FileNames::new("sitemap_02.xml", "sitemap_%d.xml").is_ok());
        assert!(FileNames::new("sitemap_.xml", "sitemap_%d.xml").is_ok());
        assert!(FileNames::new("sitemap_index.xml", "sitemap_%d.xml").is_ok());
    }

    #[test]
    fn test_builder_defaults() {
        let options = RunnerOptions::builder().build();
        assert!(!options.verbose);
        assert!(!options.allow_relative_paths);
        assert_eq!(options.max_records_per_page, DEFAULT_MAX_RECORDS_PER_PAGE);
        assert_eq!(options.file_names, FileNames::default());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder_values_are_validated() {
        let options = RunnerOptions::builder().max_records_per_page(0).build();
        assert!(matches!(options.validate(), Err(SitemapError::Config(_))));

        let options = RunnerOptions::builder().multi_file_pattern("pages.xml").build();
        assert!(matches!(options.validate(), Err(SitemapError::Config(_))));

        let options = RunnerOptions::builder()
            .verbose(true)
            .max_records_per_page(10)
            .single_file_name("index.xml")
            .multi_file_pattern("page-%d.xml")
            .build();
        assert!(options.validate().is_ok());
        assert_eq!(options.file_names.filename_for(1, true), "page-1.xml");
    }
}
