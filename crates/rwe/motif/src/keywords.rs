use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

/// Keywords taken from each iteration caption.
pub const CAPTION_KEYWORDS: usize = 10;
/// Keywords considered per caption when building frequency tables.
pub const TABLE_KEYWORDS_PER_CAPTION: usize = 40;

const MIN_KEYWORD_LEN: usize = 3;

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-zA-Z][a-zA-Z\-']+").expect("static keyword pattern"))
}

/// Extract up to `max_words` distinct lowercase keywords from `text`,
/// dropping stopwords and tokens shorter than three characters.
pub fn tokenize_keywords(text: &str, stopwords: &BTreeSet<String>, max_words: usize) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut out: Vec<String> = Vec::new();
    if max_words == 0 {
        return out;
    }
    for m in word_pattern().find_iter(&lower) {
        let w = m.as_str();
        if w.len() < MIN_KEYWORD_LEN || stopwords.contains(w) {
            continue;
        }
        if !out.iter().any(|o| o == w) {
            out.push(w.to_string());
        }
        if out.len() >= max_words {
            break;
        }
    }
    out
}

/// A term and how many captions mentioned it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotifCount {
    pub term: String,
    pub count: usize,
}

/// Top `topn` caption keywords by frequency. Ties keep first-encountered order.
pub fn motif_counts<'a, I>(captions: I, stopwords: &BTreeSet<String>, topn: usize) -> Vec<MotifCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<MotifCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for caption in captions {
        for term in tokenize_keywords(caption, stopwords, TABLE_KEYWORDS_PER_CAPTION) {
            match index.get(&term) {
                Some(&i) => order[i].count += 1,
                None => {
                    index.insert(term.clone(), order.len());
                    order.push(MotifCount { term, count: 1 });
                }
            }
        }
    }
    // stable: equal counts keep insertion order
    order.sort_by(|a, b| b.count.cmp(&a.count));
    order.truncate(topn);
    order
}
