//! Extractive summaries: sentences are scored by the frequency of their
//! content words across the whole text, the best ones are kept in document
//! order and the result is clipped to a character bound.

use crate::types::{Article, BuildError, Result, SummaryConfig};
use crate::utils::{is_stop_word, text};
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

pub struct Summarizer {
    config: SummaryConfig,
    sentence_end: Regex,
}

impl Summarizer {
    pub fn new(config: SummaryConfig) -> Result<Self> {
        let sentence_end = Regex::new(r"[.!?]+[\)\]\x22']*\s+")
            .map_err(|e| BuildError::Summarize(e.to_string()))?;
        Ok(Self {
            config,
            sentence_end,
        })
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Summary of `body`. Fails when there is nothing to summarize.
    pub fn summarize(&self, body: &str) -> Result<String> {
        let body = text::collapse_whitespace(body);
        if body.is_empty() {
            return Err(BuildError::Summarize("empty text".to_string()));
        }

        let sentences = self.split_sentences(&body);
        let picked = if sentences.len() <= self.config.max_sentences {
            sentences
        } else {
            Self::top_sentences(&sentences, self.config.max_sentences)
        };

        let joined = picked.join(" ");
        let summary = if joined.is_empty() {
            text::truncate_chars(&body, self.config.max_chars)
        } else {
            text::truncate_chars(&joined, self.config.max_chars)
        };

        if summary.is_empty() {
            return Err(BuildError::Summarize("summary bound is zero".to_string()));
        }
        Ok(summary)
    }

    /// Fill `article.summary`, falling back to the title when the
    /// description yields nothing.
    pub fn summarize_article(&self, article: &mut Article) {
        article.summary = match self.summarize(&article.description) {
            Ok(summary) => summary,
            Err(e) => {
                debug!("Falling back to title for {}: {}", article.link, e);
                text::truncate_chars(&article.title, self.config.max_chars)
            }
        };
    }

    pub fn split_sentences<'a>(&self, body: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for m in self.sentence_end.find_iter(body) {
            let sentence = body[start..m.end()].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = m.end();
        }

        let tail = body[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail);
        }
        sentences
    }

    fn top_sentences<'a>(sentences: &[&'a str], count: usize) -> Vec<&'a str> {
        let mut frequencies: HashMap<String, usize> = HashMap::new();
        for sentence in sentences {
            for word in text::words(sentence).filter(|w| !is_stop_word(w)) {
                *frequencies.entry(word).or_insert(0) += 1;
            }
        }

        let mut scored: Vec<(usize, f64)> = sentences
            .iter()
            .enumerate()
            .map(|(idx, sentence)| {
                let words: Vec<String> = text::words(sentence).collect();
                if words.is_empty() {
                    return (idx, 0.0);
                }
                let total: usize = words
                    .iter()
                    .filter(|w| !is_stop_word(w))
                    .map(|w| frequencies.get(w).copied().unwrap_or(0))
                    .sum();
                (idx, total as f64 / words.len() as f64)
            })
            .collect();

        // Highest score first, earlier sentence wins ties
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let mut keep: Vec<usize> = scored.into_iter().take(count).map(|(idx, _)| idx).collect();
        keep.sort_unstable();
        keep.into_iter().map(|idx| sentences[idx]).collect()
    }
}
