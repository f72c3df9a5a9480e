use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use url::Url;

use super::{FieldMatcher, PageFields};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="description"]"#));
static ICON: Lazy<Selector> = Lazy::new(|| {
    selector(
        r#"link[rel="icon"], link[rel="shortcut icon"], link[rel="apple-touch-icon"], link[rel="apple-touch-icon-precomposed"]"#,
    )
});
static OG_SITE_NAME: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:site_name"]"#));
static OG_TITLE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:title"]"#));
static OG_IMAGE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:image"]"#));
static OG_IMAGE_ALT: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:image:alt"]"#));
static OG_IMAGE_TYPE: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[property="og:image:type"]"#));
static OG_IMAGE_WIDTH: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[property="og:image:width"]"#));
static OG_IMAGE_HEIGHT: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[property="og:image:height"]"#));

fn content(element: &ElementRef<'_>) -> String {
    element.value().attr("content").unwrap_or_default().to_string()
}

// ── Title ──────────────────────────────────────────────────────────────────

/// `<title>` text. The first non-empty title is kept.
pub struct TitleMatcher;

impl FieldMatcher for TitleMatcher {
    fn on_element(&self, element: ElementRef<'_>, fields: &mut PageFields) {
        if !fields.title.is_empty() || !TITLE.matches(&element) {
            return;
        }
        fields.title = element.text().collect::<String>().trim().to_string();
    }
}

// ── Meta content ───────────────────────────────────────────────────────────

/// Copies a meta tag's `content` attribute into one string field. Every
/// match overwrites the previous one.
pub struct MetaContentMatcher {
    selector: &'static Selector,
    field: fn(&mut PageFields) -> &mut String,
}

impl MetaContentMatcher {
    pub fn description() -> Self {
        Self {
            selector: &DESCRIPTION,
            field: |f| &mut f.description,
        }
    }

    pub fn site_name() -> Self {
        Self {
            selector: &OG_SITE_NAME,
            field: |f| &mut f.site_name,
        }
    }

    pub fn og_title_as_site_name() -> Self {
        Self {
            selector: &OG_TITLE,
            field: |f| &mut f.site_name,
        }
    }

    pub fn image_url() -> Self {
        Self {
            selector: &OG_IMAGE,
            field: |f| &mut f.image.url,
        }
    }

    pub fn image_alt() -> Self {
        Self {
            selector: &OG_IMAGE_ALT,
            field: |f| &mut f.image.alt,
        }
    }

    pub fn image_type() -> Self {
        Self {
            selector: &OG_IMAGE_TYPE,
            field: |f| &mut f.image.mime_type,
        }
    }
}

impl FieldMatcher for MetaContentMatcher {
    fn on_element(&self, element: ElementRef<'_>, fields: &mut PageFields) {
        if self.selector.matches(&element) {
            *(self.field)(fields) = content(&element);
        }
    }
}

// ── Image dimensions ───────────────────────────────────────────────────────

/// Parses `og:image:width` / `og:image:height` as an integer. A value that
/// does not parse leaves the field untouched.
pub struct DimensionMatcher {
    selector: &'static Selector,
    field: fn(&mut PageFields) -> &mut u32,
}

impl DimensionMatcher {
    pub fn width() -> Self {
        Self {
            selector: &OG_IMAGE_WIDTH,
            field: |f| &mut f.image.width,
        }
    }

    pub fn height() -> Self {
        Self {
            selector: &OG_IMAGE_HEIGHT,
            field: |f| &mut f.image.height,
        }
    }
}

impl FieldMatcher for DimensionMatcher {
    fn on_element(&self, element: ElementRef<'_>, fields: &mut PageFields) {
        if !self.selector.matches(&element) {
            return;
        }
        if let Ok(value) = content(&element).trim().parse::<u32>() {
            *(self.field)(fields) = value;
        }
    }
}

// ── Favicon ────────────────────────────────────────────────────────────────

/// First icon-like `<link>` in document order, made absolute against the
/// page's domain.
pub struct FaviconMatcher {
    domain: String,
    base: Option<Url>,
}

impl FaviconMatcher {
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            base: Url::parse(domain).ok(),
        }
    }

    fn resolve(&self, href: &str) -> String {
        self.base
            .as_ref()
            .and_then(|base| base.join(href).ok())
            .map(String::from)
            .unwrap_or_else(|| format!("{}{}", self.domain, href))
    }
}

impl FieldMatcher for FaviconMatcher {
    fn on_element(&self, element: ElementRef<'_>, fields: &mut PageFields) {
        if !fields.favicon.is_empty() || !ICON.matches(&element) {
            return;
        }
        let href = element.value().attr("href").map(str::trim).unwrap_or_default();
        // A missing or blank href is skipped rather than resolving to the bare
        // domain, so a later icon link can still supply the favicon.
        if !href.is_empty() {
            fields.favicon = self.resolve(href);
        }
    }
}
