//! End-to-end runs of the Runner against a scratch directory.
//!
//! Generated files are read back with quick-xml to check:
//! - page counts and file names for single and multi-page runs
//! - page capacity is never exceeded
//! - the index lists every page in creation order
//! - configuration and validation failures surface as the right error kind

use std::collections::HashMap;
use std::path::Path;

use core_sitemap::{Frequency, Runner, RunnerOptions, SitemapError, SitemapUrl, ValidationError};
use quick_xml::Reader;
use quick_xml::events::Event;

const LASTMOD: &str = "2024-01-31T12:00:00+00:00";
const BASE_URL: &str = "https://example.com/sitemaps/";

/// Reads every `entry_tag` element of an XML file as a map of child element name to text.
fn read_entries(path: &Path, entry_tag: &str) -> Vec<HashMap<String, String>> {
    let xml = std::fs::read_to_string(path).unwrap();
    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<HashMap<String, String>> = None;
    let mut field: Option<String> = None;

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) => {
                let name = String::from_utf8(e.name().as_ref().to_vec()).unwrap();
                if name == entry_tag {
                    current = Some(HashMap::new());
                } else {
                    field = Some(name);
                }
            }
            Event::Text(text) => {
                if let (Some(entry), Some(name)) = (current.as_mut(), field.as_ref()) {
                    entry.insert(name.clone(), text.unescape().unwrap().into_owned());
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == entry_tag.as_bytes() {
                    entries.push(current.take().unwrap());
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    entries
}

fn runner(dir: &Path, max_records: usize) -> Runner {
    Runner::with_locations(
        dir,
        BASE_URL,
        RunnerOptions::builder().max_records_per_page(max_records).build(),
    )
    .unwrap()
}

fn push_n(runner: &mut Runner, n: usize) {
    for i in 0..n {
        runner
            .push_url(&format!("https://example.com/page/{i}"), LASTMOD, 0.5, Frequency::Daily, false)
            .unwrap();
    }
}

fn xml_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_small_run_writes_single_sitemap() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = runner(dir.path(), 50_000);
    push_n(&mut runner, 3);
    let summary = runner.end().unwrap();

    assert_eq!(xml_files(dir.path()), ["sitemap.xml"]);
    assert_eq!(summary.page_count(), 1);
    assert!(summary.index_location().is_none());

    let urls = read_entries(&dir.path().join("sitemap.xml"), "url");
    assert_eq!(urls.len(), 3);
    assert_eq!(urls[0]["loc"], "https://example.com/page/0");
    assert_eq!(urls[2]["loc"], "https://example.com/page/2");
}

#[test]
fn test_one_over_capacity_writes_two_pages_and_index() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = runner(dir.path(), 50_000);
    push_n(&mut runner, 50_001);
    let summary = runner.end().unwrap();

    assert_eq!(xml_files(dir.path()), ["sitemap.xml", "sitemap_1.xml", "sitemap_2.xml"]);
    assert_eq!(summary.page_count(), 2);
    assert_eq!(summary.total_records(), 50_001);

    assert_eq!(read_entries(&dir.path().join("sitemap_1.xml"), "url").len(), 50_000);
    assert_eq!(read_entries(&dir.path().join("sitemap_2.xml"), "url").len(), 1);

    let index = read_entries(&dir.path().join("sitemap.xml"), "sitemap");
    let locs: Vec<&str> = index.iter().map(|entry| entry["loc"].as_str()).collect();
    assert_eq!(
        locs,
        [
            "https://example.com/sitemaps/sitemap_1.xml",
            "https://example.com/sitemaps/sitemap_2.xml",
        ]
    );
    assert!(index.iter().all(|entry| core_sitemap::dates::is_valid_iso8601(&entry["lastmod"])));
}

#[test]
fn test_page_count_is_ceiling_and_capacity_holds() {
    for (n, m) in [(0, 3), (1, 3), (3, 3), (4, 3), (10, 3), (9, 1), (7, 100)] {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = runner(dir.path(), m);
        push_n(&mut runner, n);
        let summary = runner.end().unwrap();

        let expected_pages = if n == 0 { 1 } else { n.div_ceil(m) };
        assert_eq!(summary.page_count(), expected_pages, "n={n} m={m}");

        let mut total = 0;
        for i in 1..=expected_pages {
            let name = if expected_pages == 1 {
                "sitemap.xml".to_string()
            } else {
                format!("sitemap_{i}.xml")
            };
            let count = read_entries(&dir.path().join(name), "url").len();
            assert!(count <= m, "n={n} m={m} page {i} has {count}");
            total += count;
        }
        assert_eq!(total, n);

        let has_index = expected_pages > 1;
        assert_eq!(summary.index_location().is_some(), has_index, "n={n} m={m}");
        if has_index {
            let index = read_entries(&dir.path().join("sitemap.xml"), "sitemap");
            assert_eq!(index.len(), expected_pages);
        }
    }
}

#[test]
fn test_custom_file_names() {
    let dir = tempfile::tempdir().unwrap();
    let options = RunnerOptions::builder()
        .max_records_per_page(2)
        .single_file_name("products.xml")
        .multi_file_pattern("products-%d.xml")
        .build();
    let mut runner = Runner::with_locations(dir.path(), "https://example.com/sitemaps", options).unwrap();
    push_n(&mut runner, 3);
    let summary = runner.end().unwrap();

    assert_eq!(xml_files(dir.path()), ["products-1.xml", "products-2.xml", "products.xml"]);
    assert_eq!(summary.entry_point(), "https://example.com/sitemaps/products.xml");
}

#[test]
fn test_record_fields_round_trip_through_xml() {
    let dir = tempfile::tempdir().unwrap();
    let mut runner = runner(dir.path(), 100);
    let url = SitemapUrl::builder("https://example.com/search?q=a&b=c", "2023-06-01T08:15:00-04:00")
        .priority(0.66)
        .frequency(Frequency::Monthly)
        .mobile(true)
        .alternate("en", "https://example.com/en/search")
        .alternate("de", "https://example.com/de/search")
        .build()
        .unwrap();
    runner.push(url).unwrap();
    runner.end().unwrap();

    let path = dir.path().join("sitemap.xml");
    let urls = read_entries(&path, "url");
    assert_eq!(urls.len(), 1);
    assert_eq!(urls[0]["loc"], "https://example.com/search?q=a&b=c");
    assert_eq!(urls[0]["lastmod"], "2023-06-01T08:15:00-04:00");
    assert_eq!(urls[0]["changefreq"], "monthly");
    assert_eq!(urls[0]["priority"], "0.7");

    let xml = std::fs::read_to_string(path).unwrap();
    let en = xml.find(r#"hreflang="en""#).unwrap();
    let de = xml.find(r#"hreflang="de""#).unwrap();
    assert!(en < de);
    assert!(xml.contains("<mobile:mobile/>"));
}

#[test]
fn test_invalid_location_is_a_validation_error() {
    let result = SitemapUrl::new("not a url", LASTMOD, 0.5, Frequency::Daily, false);
    assert!(matches!(result, Err(ValidationError::InvalidUrl(_))));

    let dir = tempfile::tempdir().unwrap();
    let mut runner = runner(dir.path(), 10);
    let result = runner.push_url("not a url", LASTMOD, 0.5, Frequency::Daily, false);
    assert!(matches!(result, Err(SitemapError::Validation(ValidationError::InvalidUrl(_)))));
    assert_eq!(runner.total_records(), 0);
}

#[test]
fn test_priority_bounds() {
    let result = SitemapUrl::new("https://example.com/", LASTMOD, 1.5, Frequency::Daily, false);
    assert!(matches!(result, Err(ValidationError::InvalidPriority(_))));

    let url = SitemapUrl::new("https://example.com/", LASTMOD, 0.97, Frequency::Daily, false).unwrap();
    assert_eq!(url.priority(), 1.0);
}

#[test]
fn test_relative_output_dir_is_a_config_error() {
    let result = Runner::with_locations("relative/sitemaps", BASE_URL, RunnerOptions::default());
    assert!(matches!(result, Err(SitemapError::Config(_))));
}

#[test]
fn test_existing_files_are_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("sitemap.xml"), "stale").unwrap();

    let mut runner = runner(dir.path(), 10);
    push_n(&mut runner, 1);
    runner.end().unwrap();

    let xml = std::fs::read_to_string(dir.path().join("sitemap.xml")).unwrap();
    assert!(!xml.contains("stale"));
    assert_eq!(read_entries(&dir.path().join("sitemap.xml"), "url").len(), 1);
}
