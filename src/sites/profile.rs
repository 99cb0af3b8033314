use crate::core::{Category, Document, Element};
use crate::utils::same_site;
use url::Url;

/// Where a field is read from: an element found by `selector` (empty selector
/// means the element itself), then either the first non-blank of `attrs` or,
/// when `attrs` is empty, its text.
#[derive(Debug, Clone)]
pub struct FieldSource {
    pub selector: String,
    pub attrs: Vec<String>,
}

impl FieldSource {
    pub fn text(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(selector: &str, attrs: &[&str]) -> Self {
        Self {
            selector: selector.to_string(),
            attrs: attrs.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn read_in(&self, scope: &Element<'_>) -> Option<String> {
        if self.selector.is_empty() {
            return self.read(scope);
        }
        scope
            .select(&self.selector)
            .iter()
            .find_map(|el| self.read(el))
    }

    pub fn read_doc(&self, doc: &Document) -> Option<String> {
        doc.select(&self.selector).iter().find_map(|el| self.read(el))
    }

    fn read(&self, el: &Element<'_>) -> Option<String> {
        if self.attrs.is_empty() {
            Some(el.text()).filter(|t| !t.is_empty())
        } else {
            el.attr_any(&self.attrs).map(str::to_string)
        }
    }
}

/// First value produced by any of `sources`, in order.
pub fn read_first_in(sources: &[FieldSource], scope: &Element<'_>) -> Option<String> {
    sources.iter().find_map(|s| s.read_in(scope))
}

pub fn read_first_doc(sources: &[FieldSource], doc: &Document) -> Option<String> {
    sources.iter().find_map(|s| s.read_doc(doc))
}

#[derive(Debug, Clone)]
pub struct CatalogSelectors {
    /// One element per listing item
    pub item: String,
    pub title: Vec<FieldSource>,
    pub link: Vec<FieldSource>,
    pub poster: Vec<FieldSource>,
    pub year: Option<FieldSource>,
    /// Badge text consulted for kind classification
    pub badge: Option<FieldSource>,
}

#[derive(Debug, Clone)]
pub struct DetailSelectors {
    /// Primary heading candidates, tried after structured data
    pub heading: Vec<String>,
    pub poster: Vec<FieldSource>,
    pub backdrop: Vec<FieldSource>,
    pub plot: Vec<String>,
    pub tags: String,
    pub cast: String,
    pub year: Option<String>,
    pub duration: Option<String>,
    pub trailer: Vec<FieldSource>,
    /// Movie player sources, in priority order
    pub player: Vec<FieldSource>,
    /// Separate page listing a series' episodes
    pub episode_frame: Option<FieldSource>,
}

/// Known episode markup conventions.
#[derive(Debug, Clone)]
pub enum EpisodeConvention {
    /// Season headers carrying `data-season-number` and `data-season-id`, with
    /// episode items sharing the season id and carrying `data-episode-id`.
    SeasonDataAttributes { seasons: String },
    /// Player buttons with the stream address in `data-url`, optionally
    /// annotated with `data-season` / `data-episode`. Buttons without their own
    /// season take it from the enclosing `season_container` (its `data-season`,
    /// else its position among containers).
    PlayerButtons {
        buttons: String,
        season_container: Option<String>,
    },
    /// Plain anchors to per-episode pages.
    AnchorList { anchors: String },
}

/// Everything needed to drive the generic extractors for one site.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub name: String,
    pub base_url: String,
    /// `(label, path)` pairs, paths relative to `base_url`
    pub categories: Vec<(String, String)>,
    /// Later-page address; `{url}` is the category URL without trailing slash
    pub page_template: String,
    /// `{base}` and `{query}` placeholders
    pub search_template: String,
    pub catalog: CatalogSelectors,
    pub detail: DetailSelectors,
    pub episodes: Vec<EpisodeConvention>,
    /// Expands bare numeric episode ids into resolvable URLs (`{id}` placeholder)
    pub episode_ref_template: Option<String>,
}

impl SiteProfile {
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn category_list(&self) -> Vec<Category> {
        self.categories
            .iter()
            .map(|(label, path)| Category {
                label: label.clone(),
                url: format!("{}{}", self.base_url, path),
            })
            .collect()
    }

    /// Address of `page` of a category; pages 0 and 1 are the category itself.
    pub fn page_url(&self, category_url: &str, page: u32) -> String {
        if page <= 1 {
            return category_url.to_string();
        }
        self.page_template
            .replace("{url}", category_url.trim_end_matches('/'))
            .replace("{page}", &page.to_string())
    }

    pub fn search_url(&self, query: &str) -> String {
        self.search_template
            .replace("{base}", &self.base_url)
            .replace("{query}", &urlencoding::encode(query.trim()))
    }

    /// Expands a bare numeric episode id, or a page of this site whose path
    /// ends in one, through `episode_ref_template`.
    pub fn episode_ref(&self, token: &str) -> String {
        let Some(template) = &self.episode_ref_template else {
            return token.to_string();
        };
        match self.episode_id(token) {
            Some(id) => template.replace("{id}", id),
            None => token.to_string(),
        }
    }

    fn episode_id<'t>(&self, token: &'t str) -> Option<&'t str> {
        let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        if numeric(token) {
            return Some(token);
        }

        let url = Url::parse(token).ok()?;
        let base = Url::parse(&self.base_url).ok()?;
        if !same_site(&url, &base) {
            return None;
        }
        let id = token
            .split(['?', '#'])
            .next()?
            .trim_end_matches('/')
            .rsplit('/')
            .next()?;
        numeric(id).then_some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::superflix;

    #[test]
    fn test_page_url() {
        let profile = superflix::profile();
        let category = format!("{}/filmes", profile.base_url);
        assert_eq!(profile.page_url(&category, 0), category);
        assert_eq!(profile.page_url(&category, 1), category);
        assert_eq!(profile.page_url(&category, 3), format!("{}/filmes/page/3", profile.base_url));
    }

    #[test]
    fn test_search_url_encodes_query() {
        let profile = superflix::profile().with_base_url("https://sf.example/");
        assert_eq!(profile.search_url(" o poderoso chefão "), "https://sf.example/?s=o%20poderoso%20chef%C3%A3o");
    }

    #[test]
    fn test_episode_ref_template_only_for_numeric_ids() {
        let mut profile = superflix::profile();
        profile.episode_ref_template = Some("https://player.example/episodio/{id}".to_string());
        assert_eq!(profile.episode_ref("123"), "https://player.example/episodio/123");
        assert_eq!(profile.episode_ref("https://a.example/e/1"), "https://a.example/e/1");
    }

    #[test]
    fn test_episode_ref_rewrites_own_numeric_pages() {
        let profile = crate::sites::ultracine::profile().with_base_url("https://uc.example");
        assert_eq!(
            profile.episode_ref("https://www.uc.example/episodio/lost/4521/"),
            "https://assistirseriesonline.icu/episodio/4521"
        );
        assert_eq!(profile.episode_ref("https://uc.example/serie/lost/"), "https://uc.example/serie/lost/");
        assert_eq!(profile.episode_ref("https://other.example/e/4521"), "https://other.example/e/4521");
    }

    #[test]
    fn test_field_source_reads_self_and_attrs() {
        let doc = Document::parse(r#"<a class="card" href="/x" title="X (2001)"><img data-src="/p.jpg"></a>"#).unwrap();
        let card = doc.select_first("a.card").unwrap();
        assert_eq!(FieldSource::attr("", &["title"]).read_in(&card).as_deref(), Some("X (2001)"));
        assert_eq!(
            FieldSource::attr("img", &["src", "data-src"]).read_in(&card).as_deref(),
            Some("/p.jpg")
        );
        assert_eq!(FieldSource::text("h2").read_in(&card), None);
    }
}
