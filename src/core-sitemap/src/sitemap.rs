//! One sitemap page: accumulates entries in memory and writes them as a single file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indoc::indoc;
use subst::substitute;

use crate::config::FileNames;
use crate::errors::{Result, SitemapError};
use crate::sitemap_url::SitemapUrl;

const URLSET_DOCUMENT: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:xhtml="http://www.w3.org/1999/xhtml" xmlns:mobile="http://www.google.com/schemas/sitemap-mobile/1.0">
    ${ELEMENTS}</urlset>
"#};

/// A single page file of a sitemap run.
///
/// Writing does not close the page; the [`Runner`](crate::Runner) drops it after the
/// final write so nothing can be appended to an already flushed page.
#[derive(Debug)]
pub struct Sitemap {
    sequence_index: usize,
    urls: Vec<SitemapUrl>,
    output_dir: PathBuf,
    web_base_url: String,
    file_names: FileNames,
}

impl Sitemap {
    /// `web_base_url` is expected to end with `/`.
    pub fn new(
        sequence_index: usize,
        output_dir: impl Into<PathBuf>,
        web_base_url: impl Into<String>,
        file_names: FileNames,
    ) -> Self {
        Self {
            sequence_index,
            urls: Vec::new(),
            output_dir: output_dir.into(),
            web_base_url: web_base_url.into(),
            file_names,
        }
    }

    /// Appends an entry.
    pub fn add_url(&mut self, url: SitemapUrl) {
        self.urls.push(url);
    }

    /// Number of entries added so far.
    pub fn size(&self) -> usize {
        self.urls.len()
    }

    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }

    pub fn urls(&self) -> &[SitemapUrl] {
        &self.urls
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File name of this page given whether more pages follow it.
    pub fn filename(&self, has_more: bool) -> String {
        self.file_names.filename_for(self.sequence_index, has_more)
    }

    /// Where [`Sitemap::write`] puts the file.
    pub fn path(&self, has_more: bool) -> PathBuf {
        self.output_dir.join(self.filename(has_more))
    }

    /// Public URL of this page.
    pub fn web_address(&self, has_more: bool) -> String {
        format!("{}{}", self.web_base_url, self.filename(has_more))
    }

    /// Builds the complete `<urlset>` document.
    pub fn render(&self) -> Result<String> {
        let mut elements = String::new();
        for url in &self.urls {
            elements.push_str(&url.to_xml()?);
        }

        let xml = substitute(URLSET_DOCUMENT, &{
            let mut v = HashMap::new();
            v.insert("ELEMENTS".to_string(), elements);
            v
        })?;
        Ok(xml)
    }

    /// Renders the page and writes it in one go, replacing any previous file.
    ///
    /// The output directory is trusted to exist and be writable.
    pub fn write(&self, has_more: bool) -> Result<PathBuf> {
        let path = self.path(has_more);
        let xml = self.render()?;
        std::fs::write(&path, xml).map_err(|e| SitemapError::io(&path, e))?;

        tracing::debug!(
            page = self.sequence_index,
            urls = self.urls.len(),
            path = %path.display(),
            "wrote sitemap page"
        );
        Ok(path)
    }
}
