//! Batches entries into capacity-limited pages and writes the index for multi-page runs.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::RunnerOptions;
use crate::errors::{Result, SitemapError};
use crate::notify::Notifier;
use crate::sitemap::Sitemap;
use crate::sitemap_index::SitemapIndex;
use crate::sitemap_url::{Frequency, SitemapUrl};
use crate::url_utils::{ensure_trailing_slash, is_valid_web_url};

/// Progress is reported every this many entries of a page.
const PROGRESS_EVERY: usize = 10_000;

/// Destination of the verbose progress lines. Stdout unless replaced.
struct Progress {
    enabled: bool,
    out: Box<dyn Write + Send>,
}

impl Progress {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            out: Box::new(io::stdout()),
        }
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if !self.enabled {
            return;
        }
        if let Err(e) = writeln!(self.out, "{args}") {
            tracing::warn!(error = %e, "could not write progress output");
        }
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress").field("enabled", &self.enabled).finish_non_exhaustive()
    }
}

/// Drives a sitemap run from configuration to the final write.
///
/// A runner is configured once both the output directory and the web base URL are set,
/// either through [`Runner::with_locations`] or the two setters. Entries are pushed one at a
/// time; when the current page is full it is written and a new page is started. [`Runner::end`]
/// consumes the runner, so a finished run cannot be flushed twice.
///
/// ```no_run
/// # use core_sitemap::{Frequency, Runner, RunnerOptions};
/// # fn example() -> core_sitemap::Result<()> {
/// let mut runner = Runner::with_locations(
///     "/var/www/example.com/sitemaps",
///     "https://example.com/sitemaps/",
///     RunnerOptions::builder().verbose(true).build(),
/// )?;
/// runner.push_url("https://example.com/", &core_sitemap::dates::time_now(), 1.0, Frequency::Always, true)?;
/// let summary = runner.end()?;
/// println!("wrote {} page(s)", summary.page_count());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Runner {
    options: RunnerOptions,
    output_dir: Option<PathBuf>,
    web_base_url: Option<String>,
    page_count: usize,
    total_records: usize,
    current_page: Option<Sitemap>,
    page_locations: Vec<String>,
    written_files: Vec<PathBuf>,
    progress: Progress,
}

impl Runner {
    /// Creates an unconfigured runner. Fails if the options are invalid.
    pub fn new(options: RunnerOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            output_dir: None,
            web_base_url: None,
            page_count: 0,
            total_records: 0,
            current_page: None,
            page_locations: Vec::new(),
            written_files: Vec::new(),
            progress: Progress::new(options.verbose),
            options,
        })
    }

    /// Creates a runner and sets both locations.
    pub fn with_locations(output_dir: impl AsRef<Path>, web_base_url: &str, options: RunnerOptions) -> Result<Self> {
        let mut runner = Self::new(options)?;
        runner.set_output_dir(output_dir)?;
        runner.set_web_base_url(web_base_url)?;
        Ok(runner)
    }

    /// Sets the directory sitemaps are written to, creating it when missing.
    ///
    /// The path must be absolute unless relative paths were allowed, in which case it is
    /// resolved against the configured relative root (or the working directory).
    pub fn set_output_dir(&mut self, output_dir: impl AsRef<Path>) -> Result<()> {
        let requested = output_dir.as_ref();
        if requested.as_os_str().is_empty() {
            return Err(SitemapError::config("the output directory cannot be empty"));
        }

        let resolved = if requested.is_absolute() {
            requested.to_path_buf()
        } else if self.options.allow_relative_paths {
            let root = match &self.options.relative_root {
                Some(root) => root.clone(),
                None => std::env::current_dir().map_err(|e| SitemapError::io(requested, e))?,
            };
            root.join(requested)
        } else {
            return Err(SitemapError::config(format!(
                "please provide an absolute output directory (got \"{}\"); relative paths must be explicitly allowed",
                requested.display()
            )));
        };

        if !resolved.exists() {
            std::fs::create_dir_all(&resolved).map_err(|e| SitemapError::io(&resolved, e))?;
            tracing::debug!(path = %resolved.display(), "created output directory");
        }

        let metadata = std::fs::metadata(&resolved).map_err(|e| SitemapError::io(&resolved, e))?;
        if !metadata.is_dir() {
            return Err(SitemapError::config(format!(
                "the output path \"{}\" is not a directory",
                resolved.display()
            )));
        }
        ensure_writable(&resolved)?;

        self.output_dir = Some(resolved);
        Ok(())
    }

    /// Sets the public URL of the output directory, e.g. `https://example.com/sitemaps/`.
    pub fn set_web_base_url(&mut self, web_base_url: &str) -> Result<()> {
        if !is_valid_web_url(web_base_url) {
            return Err(SitemapError::config(format!(
                "the web location \"{web_base_url}\" is not a valid URL, expected something like https://example.com/sitemaps/"
            )));
        }
        self.web_base_url = Some(ensure_trailing_slash(web_base_url));
        Ok(())
    }

    /// Sends verbose progress lines to `out` instead of stdout.
    pub fn set_progress_writer(&mut self, out: impl Write + Send + 'static) {
        self.progress.out = Box::new(out);
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    pub fn is_verbose(&self) -> bool {
        self.options.verbose
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn web_base_url(&self) -> Option<&str> {
        self.web_base_url.as_deref()
    }

    /// Number of pages started so far.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Number of entries accepted so far.
    pub fn total_records(&self) -> usize {
        self.total_records
    }

    /// The page currently being filled, if any entry was pushed yet.
    pub fn current_page(&self) -> Option<&Sitemap> {
        self.current_page.as_ref()
    }

    /// Public addresses of the pages written so far, in creation order.
    pub fn page_locations(&self) -> &[String] {
        &self.page_locations
    }

    fn locations(&self) -> Result<(PathBuf, String)> {
        let output_dir = self.output_dir.clone().ok_or_else(|| {
            SitemapError::config("please set the output directory with `set_output_dir` before adding URLs")
        })?;
        let web_base_url = self.web_base_url.clone().ok_or_else(|| {
            SitemapError::config("please set the web base URL with `set_web_base_url` before adding URLs")
        })?;
        Ok((output_dir, web_base_url))
    }

    fn start_page(&mut self, output_dir: PathBuf, web_base_url: String) -> Sitemap {
        self.page_count += 1;
        self.progress.line(format_args!("Starting Sitemap {}", self.page_count));
        Sitemap::new(self.page_count, output_dir, web_base_url, self.options.file_names.clone())
    }

    fn write_page(&mut self, page: &Sitemap, has_more: bool) -> Result<PathBuf> {
        let path = page.path(has_more);
        self.progress.line(format_args!(
            "\tWriting Sitemap {} to {}",
            page.sequence_index(),
            path.display()
        ));
        page.write(has_more)
    }

    /// Validates the fields as a SitemapUrl and pushes it.
    pub fn push_url(
        &mut self,
        loc: &str,
        lastmod: &str,
        priority: f64,
        frequency: Frequency,
        has_mobile: bool,
    ) -> Result<()> {
        self.locations()?;
        let url = SitemapUrl::new(loc, lastmod, priority, frequency, has_mobile)?;
        self.push(url)
    }

    /// Adds an entry to the current page, first rotating to a new page when it is full.
    pub fn push(&mut self, url: SitemapUrl) -> Result<()> {
        let (output_dir, web_base_url) = self.locations()?;

        let mut page = match self.current_page.take() {
            Some(page) => page,
            None => self.start_page(output_dir.clone(), web_base_url.clone()),
        };

        if page.size() > 0 && page.size() % PROGRESS_EVERY == 0 {
            self.progress.line(format_args!("\t\tAdded {} URLs", with_thousands(page.size())));
        }

        if page.size() >= self.options.max_records_per_page {
            let path = match self.write_page(&page, true) {
                Ok(path) => path,
                Err(e) => {
                    self.current_page = Some(page);
                    return Err(e);
                }
            };
            self.written_files.push(path);
            self.page_locations.push(page.web_address(true));
            tracing::debug!(page = page.sequence_index(), "sitemap page full, rotating");
            page = self.start_page(output_dir, web_base_url);
        }

        page.add_url(url);
        self.current_page = Some(page);
        self.total_records += 1;
        Ok(())
    }

    /// Notifies a search engine about `web_base_url + single file name`.
    pub fn ping_notify(&self, notifier: &dyn Notifier) -> Result<()> {
        let web_base_url = self.web_base_url.as_deref().ok_or_else(|| {
            SitemapError::config("please set the web base URL with `set_web_base_url` before pinging")
        })?;
        ping(notifier, web_base_url, self.options.file_names.single(), self.options.verbose);
        Ok(())
    }

    /// Writes the last page and, for multi-page runs, the index.
    ///
    /// A run without any entries still writes one empty page. On failure the runner comes
    /// back inside the [`EndError`] with every entry still held, so the cause can be fixed
    /// and `end` called again.
    pub fn end(mut self) -> std::result::Result<RunSummary, EndError> {
        match self.finish() {
            Ok((web_base_url, index_location)) => Ok(self.into_summary(web_base_url, index_location)),
            Err(error) => Err(EndError {
                runner: Box::new(self),
                error,
            }),
        }
    }

    fn finish(&mut self) -> Result<(String, Option<String>)> {
        let (output_dir, web_base_url) = self.locations()?;

        let page = match self.current_page.take() {
            Some(page) => page,
            None => self.start_page(output_dir.clone(), web_base_url.clone()),
        };
        let path = match self.write_page(&page, false) {
            Ok(path) => path,
            Err(e) => {
                self.current_page = Some(page);
                return Err(e);
            }
        };
        self.written_files.push(path);
        self.page_locations.push(page.web_address(false));

        let index_location = if self.page_count > 1 {
            let index = SitemapIndex::new(
                &output_dir,
                self.options.file_names.single(),
                self.page_locations.clone(),
            );
            self.progress
                .line(format_args!("Writing Sitemap Index to {}", index.path().display()));
            match index.write() {
                Ok(path) => self.written_files.push(path),
                Err(e) => {
                    self.written_files.pop();
                    self.page_locations.pop();
                    self.current_page = Some(page);
                    return Err(e);
                }
            }
            Some(format!("{}{}", web_base_url, self.options.file_names.single()))
        } else {
            None
        };

        self.progress.line(format_args!(
            "Remember to update your robots.txt to include the sitemap for easier discovery"
        ));
        if let Err(e) = self.progress.out.flush() {
            tracing::warn!(error = %e, "could not flush progress output");
        }
        tracing::info!(
            pages = self.page_count,
            urls = self.total_records,
            "sitemap run complete"
        );
        Ok((web_base_url, index_location))
    }

    fn into_summary(self, web_base_url: String, index_location: Option<String>) -> RunSummary {
        RunSummary {
            page_count: self.page_count,
            total_records: self.total_records,
            page_locations: self.page_locations,
            index_location,
            written_files: self.written_files,
            web_base_url,
            single_file_name: self.options.file_names.single().to_string(),
            verbose: self.options.verbose,
        }
    }
}

/// A failed [`Runner::end`]. Holds the unfinished runner so the run can be retried.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct EndError {
    runner: Box<Runner>,
    #[source]
    error: SitemapError,
}

impl EndError {
    pub fn error(&self) -> &SitemapError {
        &self.error
    }

    /// The runner as it was before `end`, with its unwritten entries.
    pub fn into_runner(self) -> Runner {
        *self.runner
    }
}

impl From<EndError> for SitemapError {
    fn from(e: EndError) -> Self {
        e.error
    }
}

/// Creates and removes a scratch file so permission problems show up before any page is written.
fn ensure_writable(dir: &Path) -> Result<()> {
    tempfile::Builder::new()
        .prefix(".sitemap-write-check")
        .tempfile_in(dir)
        .map(drop)
        .map_err(|e| {
            SitemapError::config(format!(
                "you don't have the permissions to write to \"{}\": {e}",
                dir.display()
            ))
        })
}

/// `12345678` as `12,345,678`.
fn with_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn ping(notifier: &dyn Notifier, web_base_url: &str, file_name: &str, verbose: bool) {
    let sitemap_url = format!("{web_base_url}{file_name}");
    if verbose {
        println!("*** PINGING FOR {sitemap_url}");
    }
    notifier.notify(&sitemap_url);
}

/// Outcome of a finished run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    page_count: usize,
    total_records: usize,
    page_locations: Vec<String>,
    index_location: Option<String>,
    written_files: Vec<PathBuf>,
    web_base_url: String,
    single_file_name: String,
    verbose: bool,
}

impl RunSummary {
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn total_records(&self) -> usize {
        self.total_records
    }

    /// Public addresses of every page, in creation order.
    pub fn page_locations(&self) -> &[String] {
        &self.page_locations
    }

    /// Public address of the index, present only for multi-page runs.
    pub fn index_location(&self) -> Option<&str> {
        self.index_location.as_deref()
    }

    /// Every file written by the run, pages first, index last.
    pub fn written_files(&self) -> &[PathBuf] {
        &self.written_files
    }

    /// Public address search engines should read: the index, or the lone page.
    pub fn entry_point(&self) -> String {
        format!("{}{}", self.web_base_url, self.single_file_name)
    }

    /// Notifies a search engine about the entry point.
    pub fn ping_notify(&self, notifier: &dyn Notifier) -> Result<()> {
        ping(notifier, &self.web_base_url, &self.single_file_name, self.verbose);
        Ok(())
    }
}
