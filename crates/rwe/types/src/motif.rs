use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum number of motifs kept in the bank.
pub const MOTIF_CAPACITY: usize = 64;

/// Ordered, bounded set of lowercase motifs.
///
/// Insertion order is meaningful: new motifs are appended (or injected at the
/// front), and once the bank grows past [`MOTIF_CAPACITY`] the oldest entries
/// at the front are evicted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct MotifBank {
    motifs: Vec<String>,
}

fn normalize(motif: &str) -> Option<String> {
    let m = motif.trim().to_lowercase();
    if m.is_empty() {
        None
    } else {
        Some(m)
    }
}

impl MotifBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append motifs that are neither present nor banned, then evict from the
    /// front. Returns the motifs that were actually inserted, in order.
    pub fn add<I, S>(&mut self, motifs: I, banned: &BTreeSet<String>) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = Vec::new();
        for m in motifs {
            let Some(m) = normalize(m.as_ref()) else {
                continue;
            };
            if banned.contains(&m) || self.contains(&m) {
                continue;
            }
            self.motifs.push(m.clone());
            added.push(m);
        }
        self.evict();
        added
    }

    /// Insert a motif at the front unless already present.
    ///
    /// Eviction still trims from the front, so on a full bank the injected
    /// motif is the first to go.
    pub fn insert_front(&mut self, motif: &str) -> bool {
        let Some(m) = normalize(motif) else {
            return false;
        };
        if self.contains(&m) {
            return false;
        }
        self.motifs.insert(0, m);
        self.evict();
        true
    }

    /// Remove every banned motif.
    pub fn purge(&mut self, banned: &BTreeSet<String>) -> usize {
        let before = self.motifs.len();
        self.motifs.retain(|m| !banned.contains(&m.to_lowercase()));
        before - self.motifs.len()
    }

    pub fn contains(&self, motif: &str) -> bool {
        self.motifs.iter().any(|m| m == motif)
    }

    pub fn len(&self) -> usize {
        self.motifs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motifs.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.motifs
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.motifs.iter()
    }

    fn evict(&mut self) {
        if self.motifs.len() > MOTIF_CAPACITY {
            let excess = self.motifs.len() - MOTIF_CAPACITY;
            self.motifs.drain(..excess);
        }
    }
}

impl From<Vec<String>> for MotifBank {
    fn from(v: Vec<String>) -> Self {
        let mut bank = MotifBank::new();
        bank.add(v, &BTreeSet::new());
        bank
    }
}

impl From<MotifBank> for Vec<String> {
    fn from(b: MotifBank) -> Self {
        b.motifs
    }
}
