use crate::sites::profile::{CatalogSelectors, DetailSelectors, EpisodeConvention, FieldSource, SiteProfile};

pub const NAME: &str = "Vizer";
pub const BASE_URL: &str = "https://vizer.tv";

pub fn profile() -> SiteProfile {
    SiteProfile {
        name: NAME.to_string(),
        base_url: BASE_URL.to_string(),
        categories: vec![
            ("Filmes".to_string(), "/filmes-online".to_string()),
            ("Séries".to_string(), "/series-online".to_string()),
            ("Lançamentos".to_string(), "/lancamentos".to_string()),
        ],
        page_template: "{url}/page/{page}".to_string(),
        search_template: "{base}/?s={query}".to_string(),
        catalog: CatalogSelectors {
            item: "div.item".to_string(),
            title: vec![FieldSource::text("h2"), FieldSource::text(".title")],
            link: vec![FieldSource::attr("a", &["href"])],
            poster: vec![FieldSource::attr("img", &["src", "data-src"])],
            year: Some(FieldSource::text(".year")),
            badge: Some(FieldSource::text(".type")),
        },
        detail: DetailSelectors {
            heading: vec!["h1".to_string(), ".title".to_string()],
            poster: vec![
                FieldSource::attr(".poster img", &["src", "data-src"]),
                FieldSource::attr("img", &["data-src"]),
            ],
            backdrop: vec![FieldSource::attr(".backdrop img", &["src", "data-src"])],
            plot: vec![".sinopse".to_string(), ".description".to_string()],
            tags: ".genres a".to_string(),
            cast: ".cast a".to_string(),
            year: Some(".year".to_string()),
            duration: Some(".duration".to_string()),
            trailer: Vec::new(),
            player: vec![
                FieldSource::attr("iframe", &["src", "data-src"]),
                FieldSource::attr("video source, source", &["src"]),
            ],
            episode_frame: None,
        },
        episodes: vec![EpisodeConvention::AnchorList {
            anchors: ".episodios a".to_string(),
        }],
        episode_ref_template: None,
    }
}
