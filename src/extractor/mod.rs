//! Single-pass HTML metadata extraction.
//!
//! The document is parsed once and every element is visited once, in
//! document order. Each visit is offered to every registered
//! [`FieldMatcher`]; matchers only look at the element and the field(s) they
//! own, so first-wins fields keep document-order semantics without any
//! re-scan of the tree.

mod matchers;

use scraper::{ElementRef, Html};

use crate::models::{ImageDescriptor, MetadataRecord};

pub use matchers::{DimensionMatcher, FaviconMatcher, MetaContentMatcher, TitleMatcher};

/// Fields collected during one scan, before they are folded into a
/// [`MetadataRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFields {
    pub title: String,
    pub description: String,
    pub favicon: String,
    pub site_name: String,
    /// The single in-progress Open Graph image.
    pub image: ImageDescriptor,
}

impl PageFields {
    /// Finish the scan: the in-progress image is appended exactly once,
    /// whether or not any `og:image*` tag fired.
    pub fn into_record(self, url: &str, domain: &str) -> MetadataRecord {
        MetadataRecord {
            title: self.title,
            description: self.description,
            images: vec![self.image],
            site_name: self.site_name,
            favicon: self.favicon,
            duration_ms: 0,
            domain: domain.to_string(),
            url: url.to_string(),
        }
    }
}

/// Something that reacts to elements as the scan walks the document.
pub trait FieldMatcher: Send + Sync {
    /// Called once per element, in document order.
    fn on_element(&self, element: ElementRef<'_>, fields: &mut PageFields);
}

pub struct Extractor {
    matchers: Vec<Box<dyn FieldMatcher>>,
}

impl Extractor {
    pub fn new(matchers: Vec<Box<dyn FieldMatcher>>) -> Self {
        Self { matchers }
    }

    /// Full matcher set for a fetched page. `domain` is used to make
    /// favicon hrefs absolute.
    pub fn page(domain: &str) -> Self {
        Self::new(vec![
            Box::new(TitleMatcher),
            Box::new(MetaContentMatcher::description()),
            Box::new(FaviconMatcher::new(domain)),
            Box::new(MetaContentMatcher::site_name()),
            Box::new(MetaContentMatcher::image_url()),
            Box::new(MetaContentMatcher::image_alt()),
            Box::new(MetaContentMatcher::image_type()),
            Box::new(DimensionMatcher::width()),
            Box::new(DimensionMatcher::height()),
        ])
    }

    /// Narrow pass over a domain root: `og:title` only, captured as the
    /// site name.
    pub fn site_name_fallback() -> Self {
        Self::new(vec![Box::new(MetaContentMatcher::og_title_as_site_name())])
    }

    /// Scan `html` once. Malformed markup never fails; anything the parser
    /// cannot make sense of simply leaves fields at their defaults.
    pub fn scan(&self, html: &str) -> PageFields {
        let document = Html::parse_document(html);
        let mut fields = PageFields::default();

        for element in document.root_element().descendants().filter_map(ElementRef::wrap) {
            for matcher in &self.matchers {
                matcher.on_element(element, &mut fields);
            }
        }

        fields
    }
}

/// Run the full page extractor and build the record for `url`.
pub fn extract_metadata(html: &str, url: &str, domain: &str) -> MetadataRecord {
    Extractor::page(domain).scan(html).into_record(url, domain)
}
