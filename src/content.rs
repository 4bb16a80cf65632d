use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};

use crate::config::{ContentConfig, ContentSourceType};
use crate::error::ContentError;

// Built-in deck used whenever the configured content source fails.
const DEFAULT_WORD_PAIRS: &[(&str, &str)] = &[
    ("Apple", "Fruit"),
    ("Guitar", "Instrument"),
    ("Glacier", "Ice"),
];

/// One round's secret word plus the related hint the impostor receives
/// instead of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordPair {
    pub word: String,
    pub hint: String,
}

pub struct WordPairParser;

impl WordPairParser {
    /// Parses a `[{word, hint}]` JSON document, dropping entries with a
    /// blank word or hint.
    #[tracing::instrument(skip(content), fields(content.length = content.len()))]
    pub fn parse(content: &str) -> Result<Vec<WordPair>, ContentError> {
        let pairs: Vec<WordPair> = serde_json::from_str(content)
            .map_err(|e| ContentError::Parse(format!("Failed to parse word list: {}", e)))?;

        let pairs: Vec<WordPair> = pairs
            .into_iter()
            .map(|p| WordPair {
                word: p.word.trim().to_string(),
                hint: p.hint.trim().to_string(),
            })
            .filter(|p| !p.word.is_empty() && !p.hint.is_empty())
            .collect();

        if pairs.is_empty() {
            return Err(ContentError::Parse(
                "Word list contains no usable entries".to_string(),
            ));
        }

        Ok(pairs)
    }
}

/// Supplies the `(word, hint)` pair for each round. Picks are uniform and
/// independent; repeats across rounds are allowed.
#[derive(Debug, Clone)]
pub struct WordDeck {
    pairs: Vec<WordPair>,
}

impl WordDeck {
    pub fn from_pairs(pairs: Vec<WordPair>) -> Self {
        Self { pairs }
    }

    pub fn fallback() -> Self {
        Self::from_pairs(
            DEFAULT_WORD_PAIRS
                .iter()
                .map(|(word, hint)| WordPair {
                    word: (*word).to_string(),
                    hint: (*hint).to_string(),
                })
                .collect(),
        )
    }

    /// Loads the configured word list. Any failure (missing file, fetch
    /// error, malformed JSON, empty list) degrades to the built-in deck.
    #[tracing::instrument(skip(config), fields(
        content.source_type = ?config.source_type,
        content.file_path = ?config.file_path,
        content.http_url = ?config.http_url
    ))]
    pub async fn load(config: &ContentConfig) -> Self {
        match load_raw_content(config)
            .await
            .and_then(|raw| WordPairParser::parse(&raw))
        {
            Ok(pairs) => {
                tracing::info!(words.count = pairs.len(), "Word list loaded");
                Self::from_pairs(pairs)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load word list, using built-in deck");
                Self::fallback()
            }
        }
    }

    pub fn next_round(&self) -> WordPair {
        match self.pairs.choose(&mut thread_rng()) {
            Some(pair) => pair.clone(),
            // Callers never hand over an empty list, but stay total.
            None => WordPair {
                word: DEFAULT_WORD_PAIRS[0].0.to_string(),
                hint: DEFAULT_WORD_PAIRS[0].1.to_string(),
            },
        }
    }
}

#[tracing::instrument(skip(config))]
async fn load_raw_content(config: &ContentConfig) -> Result<String, ContentError> {
    match config.source_type {
        ContentSourceType::File => {
            let path = config.file_path.as_ref().ok_or_else(|| {
                ContentError::Config("file_path required for the file source".to_string())
            })?;
            tracing::debug!(file.path = %path, "Loading word list from file");
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ContentError::FileRead {
                    path: path.clone(),
                    source: e,
                })
        }
        ContentSourceType::Http => {
            let url = config.http_url.as_ref().ok_or_else(|| {
                ContentError::Config("http_url required for the http source".to_string())
            })?;
            tracing::debug!(http.url = %url, "Fetching word list from URL");
            let response = reqwest::get(url).await.map_err(|e| ContentError::HttpFetch {
                url: url.clone(),
                source: e,
            })?;
            response.text().await.map_err(|e| ContentError::HttpFetch {
                url: url.clone(),
                source: e,
            })
        }
    }
}
