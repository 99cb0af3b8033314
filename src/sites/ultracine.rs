use crate::sites::profile::{CatalogSelectors, DetailSelectors, EpisodeConvention, FieldSource, SiteProfile};

pub const NAME: &str = "UltraCine";
pub const BASE_URL: &str = "https://ultracine.org";

/// WordPress theme. Series episodes live on a separate player site embedded
/// by iframe, keyed by numeric episode ids.
pub fn profile() -> SiteProfile {
    let categories = [
        ("Lançamentos", "lancamentos"),
        ("Ação", "acao"),
        ("Animação", "animacao"),
        ("Comédia", "comedia"),
        ("Crime", "crime"),
        ("Documentário", "documentario"),
        ("Drama", "drama"),
        ("Família", "familia"),
        ("Fantasia", "fantasia"),
        ("Ficção Científica", "ficcao-cientifica"),
        ("Guerra", "guerra"),
        ("Kids", "kids"),
        ("Mistério", "misterio"),
        ("Romance", "romance"),
        ("Terror", "terror"),
        ("Thriller", "thriller"),
    ];

    SiteProfile {
        name: NAME.to_string(),
        base_url: BASE_URL.to_string(),
        categories: categories
            .iter()
            .map(|(label, slug)| (label.to_string(), format!("/category/{}/", slug)))
            .collect(),
        page_template: "{url}/page/{page}/".to_string(),
        search_template: "{base}/?s={query}".to_string(),
        catalog: CatalogSelectors {
            item: "div.aa-cn div#movies-a ul.post-lst li".to_string(),
            title: vec![FieldSource::text("header.entry-header h2.entry-title")],
            link: vec![FieldSource::attr("a.lnk-blk", &["href"])],
            poster: vec![FieldSource::attr("div.post-thumbnail figure img", &["src", "data-src"])],
            year: Some(FieldSource::text("span.year")),
            badge: Some(FieldSource::text("span.post-ql")),
        },
        detail: DetailSelectors {
            heading: vec!["aside.fg1 header.entry-header h1.entry-title".to_string(), "h1.entry-title".to_string()],
            poster: vec![FieldSource::attr("div.post-thumbnail figure img", &["src", "data-src"])],
            backdrop: vec![FieldSource::attr("div.bghd img.TPostBg", &["src", "data-src"])],
            plot: vec!["aside.fg1 div.description p".to_string()],
            tags: "aside.fg1 header.entry-header div.entry-meta span.genres a".to_string(),
            cast: "aside.fg1 ul.cast-lst p a".to_string(),
            year: Some("aside.fg1 header.entry-header div.entry-meta span.year".to_string()),
            duration: Some("aside.fg1 header.entry-header div.entry-meta span.duration".to_string()),
            trailer: vec![FieldSource::attr("div.mdl-cn div.video iframe", &["src", "data-src"])],
            player: vec![
                FieldSource::attr("iframe[src*='assistirseriesonline']", &["src"]),
                FieldSource::attr("iframe[data-src*='assistirseriesonline']", &["data-src"]),
                FieldSource::attr("div.video-player iframe", &["src", "data-src"]),
            ],
            episode_frame: Some(FieldSource::attr(
                "iframe[src*='assistirseriesonline'], iframe[data-src*='assistirseriesonline']",
                &["src", "data-src"],
            )),
        },
        episodes: vec![EpisodeConvention::SeasonDataAttributes {
            seasons: "header.header ul.header-navigation li".to_string(),
        }],
        episode_ref_template: Some("https://assistirseriesonline.icu/episodio/{id}".to_string()),
    }
}
