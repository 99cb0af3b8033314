use crate::core::Document;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The subset of schema.org `Movie` / `TVSeries` metadata the detail
/// extractor consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredData {
    pub name: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub date_published: Option<String>,
    pub duration: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Node {
    #[serde(rename = "@type", default, deserialize_with = "lenient")]
    kind: Option<OneOrMany<String>>,
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    image: Option<Image>,
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    genre: Option<OneOrMany<String>>,
    #[serde(default, deserialize_with = "lenient")]
    actor: Option<OneOrMany<Person>>,
    #[serde(rename = "datePublished")]
    date_published: Option<String>,
    #[serde(rename = "dateCreated")]
    date_created: Option<String>,
    duration: Option<String>,
}

/// Drops a field whose shape is unexpected instead of rejecting the node.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Image {
    Url(String),
    Object { url: String },
    List(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Person {
    Named { name: String },
    Plain(String),
}

const MEDIA_TYPES: &[&str] = &["Movie", "TVSeries", "TVSeason", "TVEpisode", "CreativeWork", "VideoObject"];

/// Reads the first media-like JSON-LD node from the page.
pub fn extract(doc: &Document) -> Option<StructuredData> {
    doc.select(r#"script[type="application/ld+json"]"#)
        .iter()
        .filter_map(|script| serde_json::from_str::<Value>(&script.inner_html()).ok())
        .flat_map(flatten)
        .filter_map(|value| serde_json::from_value::<Node>(value).ok())
        .find(|node| {
            node.name.is_some()
                && node
                    .kind
                    .as_ref()
                    .map(|k| match k {
                        OneOrMany::One(t) => MEDIA_TYPES.contains(&t.as_str()),
                        OneOrMany::Many(ts) => ts.iter().any(|t| MEDIA_TYPES.contains(&t.as_str())),
                    })
                    .unwrap_or(false)
        })
        .map(StructuredData::from)
}

/// Unwraps arrays and `@graph` containers into individual nodes.
fn flatten(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.into_iter().flat_map(flatten).collect(),
        Value::Object(mut map) => match map.remove("@graph") {
            Some(graph) => flatten(graph),
            None => vec![Value::Object(map)],
        },
        _ => Vec::new(),
    }
}

impl From<Node> for StructuredData {
    fn from(node: Node) -> Self {
        let image = node.image.and_then(|img| match img {
            Image::Url(url) | Image::Object { url } => Some(url),
            Image::List(urls) => urls.into_iter().next(),
        });

        Self {
            name: node.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            image,
            description: node.description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            genres: node.genre.map(OneOrMany::into_vec).unwrap_or_default(),
            actors: node
                .actor
                .map(OneOrMany::into_vec)
                .unwrap_or_default()
                .into_iter()
                .map(|p| match p {
                    Person::Named { name } | Person::Plain(name) => name,
                })
                .collect(),
            date_published: node.date_published.or(node.date_created),
            duration: node.duration,
            kind: node.kind.and_then(|k| k.into_vec().into_iter().next()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_movie_node_inside_graph() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@context":"https://schema.org","@graph":[
                {"@type":"WebSite","name":"SuperFlix"},
                {"@type":"Movie","name":"Matrix","image":{"url":"https://img.example/m.jpg"},
                 "genre":["Ação","Ficção"],"actor":[{"@type":"Person","name":"Keanu Reeves"},"Carrie-Anne Moss"],
                 "datePublished":"1999-03-31","duration":"PT2H16M"}
            ]}</script></head><body></body></html>"#;
        let doc = Document::parse(html).unwrap();
        let data = extract(&doc).unwrap();
        assert_eq!(data.name.as_deref(), Some("Matrix"));
        assert_eq!(data.image.as_deref(), Some("https://img.example/m.jpg"));
        assert_eq!(data.genres, vec!["Ação", "Ficção"]);
        assert_eq!(data.actors, vec!["Keanu Reeves", "Carrie-Anne Moss"]);
        assert_eq!(data.duration.as_deref(), Some("PT2H16M"));
    }

    #[test]
    fn test_ignores_broken_and_non_media_blocks() {
        let html = r#"<script type="application/ld+json">{ not json</script>
            <script type="application/ld+json">{"@type":"Organization","name":"X"}</script>"#;
        let doc = Document::parse(html).unwrap();
        assert!(extract(&doc).is_none());
    }
}
