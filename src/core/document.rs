use crate::error::Result;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// A tolerant HTML tree with CSS-selector querying.
///
/// Parsing never fails on broken markup; empty input is an empty tree.
/// The tree is not `Send`, so keep it out of `.await` points.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(html: &str) -> Result<Self> {
        Ok(Self {
            html: Html::parse_document(html),
        })
    }

    pub fn select(&self, css: &str) -> Vec<Element<'_>> {
        match compile(css) {
            Some(selector) => self.html.select(&selector).map(Element::from).collect(),
            None => Vec::new(),
        }
    }

    pub fn select_first(&self, css: &str) -> Option<Element<'_>> {
        let selector = compile(css)?;
        self.html.select(&selector).next().map(Element::from)
    }

    /// Tries each selector in order and returns the first non-empty text.
    pub fn first_text(&self, selectors: &[String]) -> Option<String> {
        selectors
            .iter()
            .filter_map(|css| self.select_first(css))
            .map(|el| el.text())
            .find(|text| !text.is_empty())
    }
}

fn compile(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            debug!("invalid selector '{}': {:?}", css, e);
            None
        }
    }
}

#[derive(Clone, Copy)]
pub struct Element<'a> {
    inner: ElementRef<'a>,
}

impl<'a> From<ElementRef<'a>> for Element<'a> {
    fn from(inner: ElementRef<'a>) -> Self {
        Self { inner }
    }
}

impl<'a> Element<'a> {
    /// Attribute value, treating blank values as absent.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.inner
            .value()
            .attr(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// First non-blank attribute among `names`.
    pub fn attr_any(&self, names: &[String]) -> Option<&'a str> {
        names.iter().find_map(|name| self.attr(name))
    }

    /// Descendant text with whitespace collapsed.
    pub fn text(&self) -> String {
        collapse_whitespace(&self.inner.text().collect::<Vec<_>>().join(" "))
    }

    /// Text of direct child text nodes only.
    pub fn own_text(&self) -> String {
        let own: Vec<&str> = self
            .inner
            .children()
            .filter_map(|child| child.value().as_text().map(|t| &**t))
            .collect();
        collapse_whitespace(&own.join(" "))
    }

    pub fn name(&self) -> &'a str {
        self.inner.value().name()
    }

    pub fn select(&self, css: &str) -> Vec<Element<'a>> {
        match compile(css) {
            Some(selector) => self.inner.select(&selector).map(Element::from).collect(),
            None => Vec::new(),
        }
    }

    pub fn select_first(&self, css: &str) -> Option<Element<'a>> {
        let selector = compile(css)?;
        self.inner.select(&selector).next().map(Element::from)
    }

    /// Nearest ancestor (not the element itself) matching `css`.
    pub fn closest(&self, css: &str) -> Option<Element<'a>> {
        let selector = compile(css)?;
        self.inner
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|ancestor| selector.matches(ancestor))
            .map(Element::from)
    }

    pub fn same_node(&self, other: &Element<'_>) -> bool {
        self.inner.id() == other.inner.id()
    }

    pub fn inner_html(&self) -> String {
        self.inner.inner_html()
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
