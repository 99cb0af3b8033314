use crate::sites::profile::{CatalogSelectors, DetailSelectors, EpisodeConvention, FieldSource, SiteProfile};

pub const NAME: &str = "SuperFlix";
pub const BASE_URL: &str = "https://superflix21.lol";

/// Tailwind card grid; movie players are an `iframe#player`, series expose one
/// `button[data-url]` per episode.
pub fn profile() -> SiteProfile {
    SiteProfile {
        name: NAME.to_string(),
        base_url: BASE_URL.to_string(),
        categories: vec![
            ("Lançamentos".to_string(), "/lancamentos".to_string()),
            ("Últimos Filmes".to_string(), "/filmes".to_string()),
            ("Últimas Séries".to_string(), "/series".to_string()),
            ("Últimos Animes".to_string(), "/animes".to_string()),
        ],
        page_template: "{url}/page/{page}".to_string(),
        search_template: "{base}/?s={query}".to_string(),
        catalog: CatalogSelectors {
            item: "a.card".to_string(),
            title: vec![FieldSource::attr("", &["title"]), FieldSource::text(".card-title")],
            link: vec![FieldSource::attr("", &["href"])],
            poster: vec![FieldSource::attr("img.card-img", &["src", "data-src"])],
            year: None,
            badge: Some(FieldSource::text(".badge")),
        },
        detail: DetailSelectors {
            heading: vec!["h1.text-3xl".to_string(), "h1".to_string()],
            poster: vec![FieldSource::attr("div.poster img", &["src", "data-src"])],
            backdrop: vec![FieldSource::attr("div.backdrop img", &["src", "data-src"])],
            plot: vec!["p.text-gray-400".to_string()],
            tags: "a[href*='/genero/']".to_string(),
            cast: "a[href*='/ator/']".to_string(),
            year: None,
            duration: Some("span.duration".to_string()),
            trailer: vec![FieldSource::attr("a[href*='youtube.com/watch']", &["href"])],
            player: vec![
                FieldSource::attr("iframe#player", &["src", "data-src"]),
                FieldSource::attr("button[data-url]", &["data-url"]),
                FieldSource::attr("iframe", &["src", "data-src"]),
            ],
            episode_frame: None,
        },
        episodes: vec![
            EpisodeConvention::PlayerButtons {
                buttons: "button[data-url]".to_string(),
                season_container: Some("[data-season], div.season-panel".to_string()),
            },
            EpisodeConvention::AnchorList {
                anchors: "#episodes a[href], .episodes a[href]".to_string(),
            },
        ],
        episode_ref_template: None,
    }
}
