//! Card source records and the catalog provider seam.
//!
//! Fetching from the remote card database is an external concern; this module parses its JSON
//! shape, turns a database web URL into an API query, and serves queries from a local dump.

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};

/// Card database API endpoint that [`CatalogQuery::api_url`] targets.
pub const CARD_API_BASE: &str = "https://db.ygoprodeck.com/api/v7/cardinfo.php";

const PAGING_PARAMS: &[&str] = &["num", "offset"];

/// One card as returned by the card database.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CardRecord {
    /// Display name; the work item identity.
    pub name: String,
    /// Effect or flavor text.
    pub desc: String,
    /// Machine card type, e.g. `Effect Monster`.
    #[serde(rename = "type")]
    pub card_type: String,
    /// Human-readable card type, e.g. `Effect Monster` or `Quick-Play Spell`.
    #[serde(rename = "humanReadableCardType", default)]
    pub readable_type: String,
    /// Artwork variants; the first is used.
    #[serde(default)]
    pub card_images: Vec<CardImage>,
}

/// Card artwork reference.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CardImage {
    /// Full-size artwork URL.
    pub image_url: String,
}

impl CardRecord {
    /// URL of the first artwork, if any.
    pub fn image_url(&self) -> Option<&str> {
        self.card_images.first().map(|i| i.image_url.as_str())
    }

    /// Human-readable type, falling back to the machine type.
    pub fn display_type(&self) -> &str {
        if self.readable_type.is_empty() {
            &self.card_type
        } else {
            &self.readable_type
        }
    }
}

#[derive(serde::Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    data: Vec<CardRecord>,
}

/// Query parameters for the card database.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    params: Vec<(String, String)>,
}

impl CatalogQuery {
    /// Empty query (matches everything).
    pub fn all() -> Self {
        Self::default()
    }

    /// Query for names containing `name`.
    pub fn by_name(name: &str) -> Self {
        Self {
            params: vec![("fname".to_string(), name.to_string())],
        }
    }

    /// Derive an API query from a database website search URL.
    ///
    /// Paging parameters (`num`, `offset`) are dropped and `name` becomes `fname`; everything else
    /// is forwarded unchanged.
    pub fn from_db_url(web_url: &str) -> ReelResult<Self> {
        let parsed = url::Url::parse(web_url.trim())
            .map_err(|e| ReelError::validation(format!("invalid database url '{web_url}': {e}")))?;
        let params = parsed
            .query_pairs()
            .filter(|(k, v)| {
                let key: &str = k;
                !PAGING_PARAMS.contains(&key) && !v.is_empty()
            })
            .map(|(k, v)| {
                let key = if k == "name" {
                    "fname".to_string()
                } else {
                    k.into_owned()
                };
                (key, v.into_owned())
            })
            .collect();
        Ok(Self { params })
    }

    /// Parameters in order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// URL-encoded query string.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }

    /// Full API request URL.
    pub fn api_url(&self) -> String {
        format!("{CARD_API_BASE}?{}", self.to_query_string())
    }

    fn matches(&self, card: &CardRecord) -> bool {
        self.params.iter().all(|(k, v)| match k.as_str() {
            "fname" => card.name.to_lowercase().contains(&v.to_lowercase()),
            "name" => card.name.eq_ignore_ascii_case(v),
            "type" => card.card_type.eq_ignore_ascii_case(v),
            _ => true,
        })
    }
}

/// Provider of ordered card records.
pub trait SourceProvider {
    /// Records matching `query`, in provider order.
    fn fetch(&self, query: &CatalogQuery) -> ReelResult<Vec<CardRecord>>;

    /// The card named exactly `name` (case-insensitive).
    ///
    /// Fails with [`ReelError::NotFound`] when there is no exact match; the message names the
    /// closest candidate when one exists.
    fn find_by_name(&self, name: &str) -> ReelResult<CardRecord> {
        let candidates = self.fetch(&CatalogQuery::by_name(name))?;
        if let Some(exact) = candidates
            .iter()
            .find(|c| c.name.to_uppercase() == name.to_uppercase())
        {
            return Ok(exact.clone());
        }
        match candidates.first() {
            Some(first) => Err(ReelError::not_found(format!(
                "no card named '{name}' (closest match: '{}')",
                first.name
            ))),
            None => Err(ReelError::not_found(format!("no card matching '{name}'"))),
        }
    }
}

/// Catalog served from a local copy of the database's JSON response.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JsonCatalog {
    cards: Vec<CardRecord>,
}

impl JsonCatalog {
    /// Catalog over `cards`.
    pub fn from_records(cards: Vec<CardRecord>) -> Self {
        Self { cards }
    }

    /// Parse a `{"data": [...]}` document.
    pub fn from_json(text: &str) -> ReelResult<Self> {
        let doc: CatalogDocument = serde_json::from_str(text)?;
        Ok(Self { cards: doc.data })
    }

    /// Read and parse a catalog file.
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read catalog '{}'", path.display()))?;
        Self::from_json(&text)
    }

    /// Every record.
    pub fn cards(&self) -> &[CardRecord] {
        &self.cards
    }
}

impl SourceProvider for JsonCatalog {
    fn fetch(&self, query: &CatalogQuery) -> ReelResult<Vec<CardRecord>> {
        for (k, _) in query.params() {
            if !matches!(k.as_str(), "fname" | "name" | "type") {
                tracing::debug!(param = %k, "query parameter not applied to local catalog");
            }
        }
        Ok(self
            .cards
            .iter()
            .filter(|c| query.matches(c))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[path = "../tests/unit/catalog/catalog.rs"]
mod tests;
