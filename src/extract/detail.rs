use crate::core::{ContentKind, DetailRecord, Document, Element, EpisodeRef};
use crate::error::{Result, ScrapeError};
use crate::extract::jsonld::{self, StructuredData};
use crate::extract::title::{classify_kind, clean_page_title, find_year, parse_duration, split_title_year};
use crate::sites::profile::{read_first_doc, EpisodeConvention, SiteProfile};
use crate::utils::{absolutize, absolutize_ref, first_number, upgrade_poster};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static SEASON_X_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})\s*x\s*(\d{1,4})\b").expect("static regex"));
static SEASON_IN_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)temporada[-_/]?(\d+)").expect("static regex"));
static EPISODE_IN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)epis[oó]dio[-_/\s]*(\d+)").expect("static regex"));

/// The result of reading a detail page before any follow-up request.
#[derive(Debug, Clone)]
pub struct DetailPage {
    pub record: DetailRecord,
    /// Separate page still to be fetched for the episode list
    pub episode_frame: Option<String>,
}

pub struct DetailExtractor<'a> {
    profile: &'a SiteProfile,
}

impl<'a> DetailExtractor<'a> {
    pub fn new(profile: &'a SiteProfile) -> Self {
        Self { profile }
    }

    /// Builds a record from a detail page. Fails with `NotFound` when no title
    /// can be located by structured data, heading or `<title>`.
    pub fn extract(&self, html: &str, url: &Url) -> Result<DetailPage> {
        let doc = Document::parse(html)?;
        let selectors = &self.profile.detail;
        let structured = jsonld::extract(&doc).unwrap_or_default();

        let raw_title = self
            .title(&doc, &structured)
            .ok_or_else(|| ScrapeError::NotFound(format!("no title on {}", url)))?;
        let (title, title_year) = split_title_year(&raw_title);

        let year = title_year
            .or_else(|| structured.date_published.as_deref().and_then(find_year))
            .or_else(|| {
                selectors
                    .year
                    .as_deref()
                    .and_then(|css| doc.select_first(css))
                    .and_then(|el| find_year(&el.text()))
            });

        let poster_url = structured
            .image
            .clone()
            .or_else(|| read_first_doc(&selectors.poster, &doc))
            .or_else(|| meta_content(&doc, "meta[property='og:image']"))
            .and_then(|src| absolutize(url, &src))
            .map(|src| upgrade_poster(&src));

        let backdrop_url = read_first_doc(&selectors.backdrop, &doc)
            .and_then(|src| absolutize(url, &src))
            .map(|src| upgrade_poster(&src));

        let plot = structured
            .description
            .clone()
            .or_else(|| doc.first_text(&selectors.plot))
            .or_else(|| meta_content(&doc, "meta[name='description']"));

        let mut tags: BTreeSet<String> = structured.genres.iter().map(|g| g.trim().to_string()).collect();
        tags.extend(doc.select(&selectors.tags).iter().map(|el| el.text()));
        tags.retain(|t| !t.is_empty());

        let mut cast: Vec<String> = Vec::new();
        let listed = doc.select(&selectors.cast).iter().map(|el| el.text()).collect::<Vec<_>>();
        for name in structured.actors.iter().cloned().chain(listed) {
            let name = name.trim().to_string();
            if !name.is_empty() && !cast.contains(&name) {
                cast.push(name);
            }
        }

        let duration_minutes = selectors
            .duration
            .as_deref()
            .and_then(|css| doc.select_first(css))
            .and_then(|el| parse_duration(&el.own_text()).or_else(|| parse_duration(&el.text())))
            .or_else(|| structured.duration.as_deref().and_then(parse_duration));

        let trailer_url = read_first_doc(&selectors.trailer, &doc).and_then(|src| absolutize(url, &src));

        let badge = match structured.kind.as_deref() {
            Some("TVSeries") | Some("TVSeason") => Some("serie"),
            _ => None,
        };
        let mut kind = classify_kind(url.as_str(), badge, &title);

        let episodes = self.episodes_in(&doc, url);
        if !episodes.is_empty() && kind == ContentKind::Movie {
            kind = ContentKind::Series;
        }

        let playback_ref = if kind.is_episodic() {
            None
        } else {
            Some(
                read_first_doc(&selectors.player, &doc)
                    .map(|src| absolutize_ref(url, &src))
                    .unwrap_or_else(|| url.to_string()),
            )
        };

        let episode_frame = if kind.is_episodic() && episodes.is_empty() {
            selectors
                .episode_frame
                .as_ref()
                .and_then(|source| source.read_doc(&doc))
                .and_then(|src| absolutize(url, &src))
        } else {
            None
        };

        Ok(DetailPage {
            record: DetailRecord {
                title,
                url: url.to_string(),
                kind,
                poster_url,
                backdrop_url,
                plot,
                tags,
                cast,
                year,
                duration_minutes,
                trailer_url,
                playback_ref,
                episodes,
            },
            episode_frame,
        })
    }

    /// Episode list from a separately fetched page.
    pub fn episodes(&self, html: &str, page_url: &Url) -> Result<Vec<EpisodeRef>> {
        let doc = Document::parse(html)?;
        Ok(self.episodes_in(&doc, page_url))
    }

    fn title(&self, doc: &Document, structured: &StructuredData) -> Option<String> {
        structured
            .name
            .clone()
            .or_else(|| doc.first_text(&self.profile.detail.heading))
            .or_else(|| {
                doc.select_first("title")
                    .map(|el| clean_page_title(&el.text(), &self.profile.name))
                    .filter(|t| !t.is_empty())
            })
    }

    /// Tries each convention in order, stopping at the first that yields episodes.
    fn episodes_in(&self, doc: &Document, page_url: &Url) -> Vec<EpisodeRef> {
        for convention in &self.profile.episodes {
            let found = match convention {
                EpisodeConvention::SeasonDataAttributes { seasons } => self.season_attributes(doc, seasons),
                EpisodeConvention::PlayerButtons {
                    buttons,
                    season_container,
                } => self.player_buttons(doc, buttons, season_container.as_deref(), page_url),
                EpisodeConvention::AnchorList { anchors } => self.anchor_list(doc, anchors, page_url),
            };
            let found = dedup(found);
            if !found.is_empty() {
                debug!("{:?} yielded {} episodes", convention, found.len());
                return found;
            }
        }
        Vec::new()
    }

    fn season_attributes(&self, doc: &Document, seasons: &str) -> Vec<EpisodeRef> {
        let mut episodes = Vec::new();
        for (index, season) in doc.select(seasons).iter().enumerate() {
            let Some(season_id) = season.attr("data-season-id") else {
                continue;
            };
            if season_id.contains(['\'', '"', '\\']) {
                continue;
            }
            let season_number = season
                .attr("data-season-number")
                .and_then(first_number)
                .unwrap_or(index as u32 + 1);

            let items = doc.select(&format!("[data-season-id='{}'][data-episode-id]", season_id));
            for (position, item) in items.iter().enumerate() {
                let Some(episode_id) = item.attr("data-episode-id") else {
                    continue;
                };
                let label = item
                    .select_first("a")
                    .map(|a| a.text())
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| item.text());
                let (number, name) = match label.split_once(" - ") {
                    Some((head, tail)) => (first_number(head), Some(tail.trim().to_string())),
                    None => (first_number(&label), Some(label.clone())),
                };

                episodes.push(EpisodeRef {
                    season_number,
                    episode_number: number.unwrap_or(position as u32 + 1),
                    title: name.filter(|n| !n.is_empty()),
                    playback_ref: self.profile.episode_ref(episode_id),
                });
            }
        }
        episodes
    }

    fn player_buttons(
        &self,
        doc: &Document,
        buttons: &str,
        season_container: Option<&str>,
        page_url: &Url,
    ) -> Vec<EpisodeRef> {
        let containers = season_container.map(|css| doc.select(css)).unwrap_or_default();
        let container_season = |button: &Element<'_>| -> Option<u32> {
            let css = season_container?;
            let container = button.closest(css)?;
            container.attr("data-season").and_then(first_number).or_else(|| {
                containers
                    .iter()
                    .position(|c| c.same_node(&container))
                    .map(|index| index as u32 + 1)
            })
        };

        let mut counters: HashMap<u32, u32> = HashMap::new();
        let mut episodes = Vec::new();
        for button in doc.select(buttons) {
            let Some(target) = button.attr("data-url") else {
                continue;
            };
            let text = button.text();
            let season_number = button
                .attr("data-season")
                .and_then(first_number)
                .or_else(|| container_season(&button))
                .unwrap_or(1);
            let counter = counters.entry(season_number).or_insert(0);
            *counter += 1;
            let episode_number = button
                .attr("data-episode")
                .and_then(first_number)
                .or_else(|| first_number(&text))
                .unwrap_or(*counter);

            episodes.push(EpisodeRef {
                season_number,
                episode_number,
                title: button
                    .attr("title")
                    .map(str::to_string)
                    .or_else(|| Some(text).filter(|t| !t.is_empty())),
                playback_ref: self.profile.episode_ref(&absolutize_ref(page_url, target)),
            });
        }
        episodes
    }

    fn anchor_list(&self, doc: &Document, anchors: &str, page_url: &Url) -> Vec<EpisodeRef> {
        let mut episodes = Vec::new();
        for (position, anchor) in doc.select(anchors).iter().enumerate() {
            let Some(href) = anchor.attr("href").and_then(|h| absolutize(page_url, h)) else {
                continue;
            };
            let text = anchor.text();

            let (season_number, episode_number) = match SEASON_X_EPISODE.captures(&text) {
                Some(caps) => (caps[1].parse().ok(), caps[2].parse().ok()),
                None => (
                    SEASON_IN_PATH.captures(&href).and_then(|c| c[1].parse().ok()),
                    EPISODE_IN_TEXT
                        .captures(&text)
                        .or_else(|| EPISODE_IN_TEXT.captures(&href))
                        .and_then(|c| c[1].parse().ok()),
                ),
            };

            episodes.push(EpisodeRef {
                season_number: season_number.unwrap_or(1),
                episode_number: episode_number.unwrap_or(position as u32 + 1),
                title: Some(text).filter(|t| !t.is_empty()),
                playback_ref: href,
            });
        }
        episodes
    }
}

fn meta_content(doc: &Document, css: &str) -> Option<String> {
    doc.select_first(css)
        .and_then(|el| el.attr("content"))
        .map(str::to_string)
}

/// Drops blank and repeated references and clamps numbering to start at 1.
fn dedup(episodes: Vec<EpisodeRef>) -> Vec<EpisodeRef> {
    let mut seen = BTreeSet::new();
    episodes
        .into_iter()
        .filter(|e| !e.playback_ref.trim().is_empty())
        .filter(|e| seen.insert(e.playback_ref.clone()))
        .map(|mut e| {
            e.season_number = e.season_number.max(1);
            e.episode_number = e.episode_number.max(1);
            e
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::{superflix, ultracine, vizer};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_title_priority_structured_data_first() {
        let profile = superflix::profile();
        let html = r#"<html><head><title>Outro - SuperFlix</title>
            <script type="application/ld+json">{"@type":"Movie","name":"Matrix (1999)"}</script></head>
            <body><h1 class="text-3xl">Cabeçalho</h1></body></html>"#;
        let page = DetailExtractor::new(&profile)
            .extract(html, &url("https://sf.example/filme/matrix-1999"))
            .unwrap();
        assert_eq!(page.record.title, "Matrix");
        assert_eq!(page.record.year, Some(1999));
    }

    #[test]
    fn test_title_falls_back_to_heading_then_title_tag() {
        let profile = superflix::profile();
        let extractor = DetailExtractor::new(&profile);

        let heading = r#"<html><head><title>X - SuperFlix</title></head><body><h1 class="text-3xl">Duna (2021)</h1></body></html>"#;
        let page = extractor.extract(heading, &url("https://sf.example/filme/duna")).unwrap();
        assert_eq!(page.record.title, "Duna");

        let title_tag = r#"<html><head><title>Assistir Tenet (2020) - SuperFlix</title></head><body></body></html>"#;
        let page = extractor.extract(title_tag, &url("https://sf.example/filme/tenet")).unwrap();
        assert_eq!(page.record.title, "Tenet");
        assert_eq!(page.record.year, Some(2020));
    }

    #[test]
    fn test_missing_title_is_not_found() {
        let profile = superflix::profile();
        let err = DetailExtractor::new(&profile)
            .extract("<html><body><p>nada</p></body></html>", &url("https://sf.example/filme/x"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_movie_playback_ref_prefers_player_iframe() {
        let profile = superflix::profile();
        let html = r#"<html><body><h1 class="text-3xl">Matrix (1999)</h1>
            <p class="text-gray-400">Um hacker descobre a verdade.</p>
            <a href="/genero/acao">Ação</a><a href="/genero/ficcao">Ficção</a><a href="/genero/acao">Ação</a>
            <iframe id="player" src="//fembed.sx/e/1421"></iframe></body></html>"#;
        let page = DetailExtractor::new(&profile)
            .extract(html, &url("https://sf.example/filme/matrix-1999"))
            .unwrap();
        let record = page.record;
        assert_eq!(record.kind, ContentKind::Movie);
        assert_eq!(record.playback_ref.as_deref(), Some("https://fembed.sx/e/1421"));
        assert_eq!(record.plot.as_deref(), Some("Um hacker descobre a verdade."));
        assert_eq!(record.tags.len(), 2);
        assert!(record.episodes.is_empty());
    }

    #[test]
    fn test_movie_without_player_uses_page_itself() {
        let profile = vizer::profile();
        let html = "<html><body><h1>Filme</h1></body></html>";
        let page = DetailExtractor::new(&profile)
            .extract(html, &url("https://vz.example/filme/x"))
            .unwrap();
        assert_eq!(page.record.playback_ref.as_deref(), Some("https://vz.example/filme/x"));
    }

    #[test]
    fn test_season_data_attribute_episodes() {
        let profile = ultracine::profile();
        let html = r#"<html><body>
            <header class="header"><ul class="header-navigation">
                <li data-season-number="1" data-season-id="s1">T1</li>
                <li data-season-number="2" data-season-id="s2">T2</li>
            </ul></header>
            <ul>
                <li data-season-id="s1" data-episode-id="1001"><a>1 - Piloto</a></li>
                <li data-season-id="s1" data-episode-id="1002"><a>2 - O Retorno</a></li>
                <li data-season-id="s2" data-episode-id="2001"><a>Especial</a></li>
                <li data-season-id="s2" data-episode-id=""><a>3 - Vazio</a></li>
            </ul></body></html>"#;
        let episodes = DetailExtractor::new(&profile)
            .episodes(html, &url("https://frame.example/serie/x"))
            .unwrap();

        assert_eq!(episodes.len(), 3);
        assert_eq!(episodes[0].season_number, 1);
        assert_eq!(episodes[0].episode_number, 1);
        assert_eq!(episodes[0].title.as_deref(), Some("Piloto"));
        assert!(episodes[0].playback_ref.ends_with("/episodio/1001"));
        assert_eq!(episodes[2].season_number, 2);
        assert_eq!(episodes[2].episode_number, 1);
        assert!(episodes.iter().all(|e| e.season_number >= 1 && e.episode_number >= 1));
    }

    #[test]
    fn test_player_button_episodes_make_series() {
        let profile = superflix::profile();
        let html = r#"<html><body><h1 class="text-3xl">Dark</h1>
            <button data-url="https://fembed.sx/e/11" data-season="1" data-episode="1">Play</button>
            <button data-url="https://fembed.sx/e/12" data-season="1">Episódio 2</button>
            <button data-url="https://fembed.sx/e/21" data-season="2">Play</button>
            <button data-url="https://fembed.sx/e/11" data-season="1">Duplicado</button>
            </body></html>"#;
        let page = DetailExtractor::new(&profile)
            .extract(html, &url("https://sf.example/serie/dark"))
            .unwrap();
        let record = page.record;
        assert_eq!(record.kind, ContentKind::Series);
        assert!(record.playback_ref.is_none());
        let numbers: Vec<(u32, u32)> = record.episodes.iter().map(|e| (e.season_number, e.episode_number)).collect();
        assert_eq!(numbers, vec![(1, 1), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_player_buttons_take_season_from_container() {
        let profile = superflix::profile();
        let extractor = DetailExtractor::new(&profile);
        let numbers = |html: &str| -> Vec<(u32, u32)> {
            extractor
                .extract(html, &url("https://sf.example/serie/dark"))
                .unwrap()
                .record
                .episodes
                .iter()
                .map(|e| (e.season_number, e.episode_number))
                .collect()
        };

        let by_attribute = r#"<html><body><h1 class="text-3xl">Dark</h1>
            <div id="season-tabs"><button>Temporada 1</button><button>Temporada 2</button></div>
            <div data-season="1">
                <button data-url="https://fembed.sx/e/11">Episódio 1</button>
                <button data-url="https://fembed.sx/e/12">Episódio 2</button>
            </div>
            <div data-season="2"><button data-url="https://fembed.sx/e/21">Episódio 1</button></div>
            </body></html>"#;
        assert_eq!(numbers(by_attribute), vec![(1, 1), (1, 2), (2, 1)]);

        let by_position = r#"<html><body><h1 class="text-3xl">Dark</h1>
            <div class="season-panel"><button data-url="https://fembed.sx/e/a">Play</button></div>
            <div class="season-panel"><button data-url="https://fembed.sx/e/b">Play</button>
                <button data-url="https://fembed.sx/e/c">Play</button></div>
            </body></html>"#;
        assert_eq!(numbers(by_position), vec![(1, 1), (2, 1), (2, 2)]);
    }

    #[test]
    fn test_anchor_list_episodes() {
        let profile = vizer::profile();
        let html = r#"<html><body><h1>Série</h1><div class="episodios">
            <a href="/serie/x/temporada-2/episodio-5">2x5 - Nome</a>
            <a href="/serie/x/ep-b">Outro</a></div></body></html>"#;
        let page = DetailExtractor::new(&profile)
            .extract(html, &url("https://vz.example/serie/x"))
            .unwrap();
        let episodes = page.record.episodes;
        assert_eq!(episodes.len(), 2);
        assert_eq!((episodes[0].season_number, episodes[0].episode_number), (2, 5));
        assert_eq!((episodes[1].season_number, episodes[1].episode_number), (1, 2));
        assert_eq!(episodes[1].playback_ref, "https://vz.example/serie/x/ep-b");
    }

    #[test]
    fn test_series_without_inline_episodes_reports_frame() {
        let profile = ultracine::profile();
        let html = r#"<html><body><aside class="fg1"><header class="entry-header"><h1 class="entry-title">Lost</h1></header></aside>
            <iframe data-src="https://assistirseriesonline.icu/serie/lost"></iframe></body></html>"#;
        let page = DetailExtractor::new(&profile)
            .extract(html, &url("https://uc.example/serie/lost/"))
            .unwrap();
        assert_eq!(page.record.kind, ContentKind::Series);
        assert_eq!(page.episode_frame.as_deref(), Some("https://assistirseriesonline.icu/serie/lost"));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let profile = superflix::profile();
        let html = r#"<html><body><h1 class="text-3xl">Matrix</h1>
            <a href="/genero/b">B</a><a href="/genero/a">A</a></body></html>"#;
        let extractor = DetailExtractor::new(&profile);
        let page_url = url("https://sf.example/filme/matrix");
        let first = extractor.extract(html, &page_url).unwrap().record;
        let second = extractor.extract(html, &page_url).unwrap().record;
        assert_eq!(first, second);
    }
}
