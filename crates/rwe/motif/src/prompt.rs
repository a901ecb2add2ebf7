use rand::seq::SliceRandom;
use rand::Rng;
use rwe_types::MotifBank;

/// Default number of motifs drawn into one prompt.
pub const PROMPT_MOTIFS: usize = 7;

/// Builds generation prompts from the motif bank and the current style.
#[derive(Clone, Debug)]
pub struct PromptComposer {
    max_motifs: usize,
}

impl PromptComposer {
    pub fn new() -> Self {
        Self {
            max_motifs: PROMPT_MOTIFS,
        }
    }

    pub fn with_max_motifs(mut self, n: usize) -> Self {
        self.max_motifs = n;
        self
    }

    /// Draw a random subset of the bank, shuffle it and append the style.
    /// The bank itself is not touched.
    pub fn compose<R: Rng + ?Sized>(&self, bank: &MotifBank, style: &str, rng: &mut R) -> String {
        let take = self.max_motifs.min(bank.len());
        let mut picked: Vec<&String> = bank.as_slice().choose_multiple(rng, take).collect();
        picked.shuffle(rng);
        let core = picked
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        match (core.is_empty(), style.trim().is_empty()) {
            (true, _) => style.to_string(),
            (false, true) => core,
            (false, false) => format!("{}, {}", core, style),
        }
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new()
    }
}
