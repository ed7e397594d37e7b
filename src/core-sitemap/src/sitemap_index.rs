//! The sitemap index: one file listing every page of a multi-page run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indoc::indoc;
use quick_xml::escape::escape;
use subst::substitute;

use crate::dates::time_now;
use crate::errors::{Result, SitemapError};

const SITEMAP_INDEX_DOCUMENT: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
    ${ELEMENTS}</sitemapindex>
"#};

const SITEMAP_ELEMENT: &str = indoc! {"
    <sitemap>
      <loc>${LOC}</loc>
      <lastmod>${LASTMOD}</lastmod>
    </sitemap>
"};

/// Index file referencing the public locations of generated pages.
#[derive(Debug, Clone)]
pub struct SitemapIndex {
    locations: Vec<String>,
    output_dir: PathBuf,
    filename: String,
}

impl SitemapIndex {
    pub fn new(output_dir: impl Into<PathBuf>, filename: impl Into<String>, locations: Vec<String>) -> Self {
        Self {
            locations,
            output_dir: output_dir.into(),
            filename: filename.into(),
        }
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn path(&self) -> PathBuf {
        self.output_dir.join(&self.filename)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Renders the index, stamping every entry with `lastmod`.
    pub fn render_at(&self, lastmod: &str) -> Result<String> {
        let lastmod = escape(lastmod).into_owned();
        let mut elements = String::new();
        for location in &self.locations {
            elements.push_str(&substitute(SITEMAP_ELEMENT, &{
                let mut v = HashMap::new();
                v.insert("LOC".to_string(), escape(location.as_str()).into_owned());
                v.insert("LASTMOD".to_string(), lastmod.clone());
                v
            })?);
        }

        let xml = substitute(SITEMAP_INDEX_DOCUMENT, &{
            let mut v = HashMap::new();
            v.insert("ELEMENTS".to_string(), elements);
            v
        })?;
        Ok(xml)
    }

    /// Writes the index file. Entries carry the time of this call as their `lastmod`.
    pub fn write(&self) -> Result<PathBuf> {
        let path = self.path();
        let xml = self.render_at(&time_now())?;
        std::fs::write(&path, xml).map_err(|e| SitemapError::io(&path, e))?;

        tracing::debug!(entries = self.locations.len(), path = %path.display(), "wrote sitemap index");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations() -> Vec<String> {
        vec![
            "https://example.com/maps/sitemap_1.xml".to_string(),
            "https://example.com/maps/sitemap_2.xml".to_string(),
        ]
    }

    #[test]
    fn test_render_at() {
        let index = SitemapIndex::new("/tmp", "sitemap.xml", locations());
        assert_eq!(
            index.render_at("2024-01-31T12:00:00+00:00").unwrap(),
            indoc! {r#"
                <?xml version="1.0" encoding="UTF-8"?>
                <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                <sitemap>
                  <loc>https://example.com/maps/sitemap_1.xml</loc>
                  <lastmod>2024-01-31T12:00:00+00:00</lastmod>
                </sitemap>
                <sitemap>
                  <loc>https://example.com/maps/sitemap_2.xml</loc>
                  <lastmod>2024-01-31T12:00:00+00:00</lastmod>
                </sitemap>
                </sitemapindex>
            "#}
        );
    }

    #[test]
    fn test_write() {
        let dir = tempfile::tempdir().unwrap();
        let index = SitemapIndex::new(dir.path(), "index.xml", locations());
        let path = index.write().unwrap();

        assert_eq!(path, dir.path().join("index.xml"));
        let xml = std::fs::read_to_string(path).unwrap();
        assert_eq!(xml.matches("<sitemap>").count(), 2);
        assert!(xml.find("sitemap_1.xml").unwrap() < xml.find("sitemap_2.xml").unwrap());
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let index = SitemapIndex::new(dir.path().join("missing"), "sitemap.xml", locations());
        assert!(matches!(index.write(), Err(SitemapError::Io { .. })));
    }
}
