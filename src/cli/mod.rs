use crate::config::Config;
use crate::core::{CatalogEntry, DetailRecord, HttpFetcher, Provider, ProviderRegistry};
use crate::resolver::Resolution;
use crate::sites::builtin_registry;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "cinescrape")]
#[command(about = "Browse streaming catalogs and resolve playable links")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the built-in sites
    Sites,
    /// List a site's categories
    Categories {
        site: String,
    },
    /// List one page of a category
    Catalog {
        site: String,
        /// Category label or URL (see `categories`); defaults to the first one
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long, default_value = "1")]
        page: u32,
    },
    /// Search a site
    Search {
        site: String,
        query: String,
    },
    /// Show the detail record of a page
    Detail {
        url: String,
    },
    /// Resolve playable streams for a detail page or playback reference
    Links {
        /// Detail page URL or playback reference
        target: String,
        /// Site name; required when the target is not a page of a known site
        #[arg(short, long)]
        site: Option<String>,
        /// Resolve this episode (`SEASONxEPISODE`, e.g. `1x3`)
        #[arg(short, long)]
        episode: Option<String>,
    },
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref()).context("loading configuration")?;
        let fetcher = Arc::new(HttpFetcher::new(&config)?);
        let registry = builtin_registry(&config, fetcher);

        match &self.command {
            Command::Sites => {
                let sites: Vec<SiteLine> = registry
                    .providers
                    .iter()
                    .map(|p| SiteLine {
                        name: p.name(),
                        base_url: p.base_url(),
                    })
                    .collect();
                self.emit(&sites, |sites| {
                    for site in sites {
                        println!("{:<12} {}", site.name, site.base_url);
                    }
                })
            }
            Command::Categories { site } => {
                let categories = registry.get(site)?.categories();
                self.emit(&categories, |categories| {
                    for category in categories {
                        println!("{:<24} {}", category.label, category.url);
                    }
                })
            }
            Command::Catalog { site, category, page } => {
                let provider = registry.get(site)?;
                let url = category_url(provider, category.as_deref())?;
                let entries = provider.list_catalog(&url, *page).await?;
                self.emit(entries.as_slice(), print_entries)
            }
            Command::Search { site, query } => {
                let entries = registry.get(site)?.search(query).await?;
                self.emit(entries.as_slice(), print_entries)
            }
            Command::Detail { url } => {
                let provider = registry.for_url(url)?;
                match provider.load_detail(url).await {
                    Ok(record) => self.emit(&record, print_detail),
                    Err(e) if e.is_not_found() => {
                        println!("Details unavailable: {}", e);
                        Ok(())
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Command::Links { target, site, episode } => {
                let resolution = self.links(&registry, target, site.as_deref(), episode.as_deref()).await?;
                self.emit(&resolution, print_resolution)
            }
        }
    }

    async fn links(
        &self,
        registry: &ProviderRegistry,
        target: &str,
        site: Option<&str>,
        episode: Option<&str>,
    ) -> Result<Resolution> {
        let provider: &dyn Provider = match site {
            Some(name) => registry.get(name)?,
            None => registry
                .for_url(target)
                .context("cannot tell which site this is; pass --site")?,
        };

        let is_page = url::Url::parse(target)
            .map(|u| provider.suitable(&u))
            .unwrap_or(false);
        if !is_page {
            return Ok(provider.resolve_links(target).await);
        }

        let record = provider.load_detail(target).await?;
        let reference = match episode {
            Some(wanted) => {
                let (season, number) = parse_episode(wanted)
                    .with_context(|| format!("episode must look like 1x3, got '{}'", wanted))?;
                record
                    .episodes
                    .iter()
                    .find(|e| e.season_number == season && e.episode_number == number)
                    .map(|e| e.playback_ref.clone())
                    .with_context(|| format!("'{}' has no episode {}", record.title, wanted))?
            }
            None => match (&record.playback_ref, record.episodes.first()) {
                (Some(reference), _) => reference.clone(),
                (None, Some(first)) => first.playback_ref.clone(),
                (None, None) => anyhow::bail!("'{}' has nothing to play", record.title),
            },
        };

        Ok(provider.resolve_links(&reference).await)
    }

    fn emit<T: Serialize + ?Sized>(&self, value: &T, human: impl Fn(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct SiteLine<'a> {
    name: &'a str,
    base_url: &'a str,
}

fn category_url(provider: &dyn Provider, wanted: Option<&str>) -> Result<String> {
    let categories = provider.categories();
    match wanted {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => Ok(url.to_string()),
        Some(label) => categories
            .into_iter()
            .find(|c| c.label.eq_ignore_ascii_case(label))
            .map(|c| c.url)
            .with_context(|| format!("{} has no category '{}'", provider.name(), label)),
        None => categories
            .into_iter()
            .next()
            .map(|c| c.url)
            .with_context(|| format!("{} has no categories", provider.name())),
    }
}

fn parse_episode(text: &str) -> Option<(u32, u32)> {
    let lower = text.trim().to_ascii_lowercase();
    let (season, episode) = lower.split_once('x')?;
    Some((season.trim().parse().ok()?, episode.trim().parse().ok()?))
}

fn print_entries(entries: &[CatalogEntry]) {
    if entries.is_empty() {
        println!("No entries found.");
        return;
    }
    for entry in entries {
        let year = entry.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        println!("[{}] {}{}", entry.kind, entry.title, year);
        println!("    {}", entry.url);
    }
}

fn print_detail(record: &DetailRecord) {
    println!("Title: {}", record.title);
    println!("Kind: {}", record.kind);
    if let Some(year) = record.year {
        println!("Year: {}", year);
    }
    if let Some(minutes) = record.duration_minutes {
        println!("Duration: {}min", minutes);
    }
    if !record.tags.is_empty() {
        println!("Tags: {}", record.tags.iter().cloned().collect::<Vec<_>>().join(", "));
    }
    if !record.cast.is_empty() {
        println!("Cast: {}", record.cast.join(", "));
    }
    if let Some(plot) = &record.plot {
        println!("Plot: {}", plot);
    }
    if let Some(poster) = &record.poster_url {
        println!("Poster: {}", poster);
    }
    if let Some(reference) = &record.playback_ref {
        println!("Playback: {}", reference);
    }
    if !record.episodes.is_empty() {
        println!("Episodes: {}", record.episodes.len());
        for episode in &record.episodes {
            let title = episode.title.as_deref().unwrap_or("");
            println!(
                "  {}x{:02} {}  {}",
                episode.season_number, episode.episode_number, title, episode.playback_ref
            );
        }
    }
}

fn print_resolution(resolution: &Resolution) {
    if !resolution.is_playable() {
        let reason = if resolution.timed_out { " (timed out)" } else { "" };
        println!("No playable source found{}.", reason);
        println!("Tried: {}", resolution.attempted.join(", "));
        return;
    }

    let best = resolution.best().map(|c| c.url.as_str());
    for candidate in &resolution.candidates {
        let marker = if Some(candidate.url.as_str()) == best { "*" } else { " " };
        let language = candidate.language_label.as_deref().unwrap_or("-");
        println!(
            "{} [{}] {:<7} {:<10} {}",
            marker,
            candidate.source,
            candidate.quality.to_string(),
            language,
            candidate.url
        );
        if let Some(referer) = &candidate.referer {
            println!("      Referer: {}", referer);
        }
    }
}
