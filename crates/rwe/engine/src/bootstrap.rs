use crate::engine::ReflectiveEngine;
use crate::error::EngineError;
use chrono::Utc;
use rwe_genesis::{analyze, GenesisFetcher};
use rwe_motif::tokenize_keywords;
use rwe_store::{load_image, path_string, write_embedding, write_json};
use rwe_types::{IterationRecord, GENESIS_BACKEND, GENESIS_TAG};
use tracing::{info, warn};

impl ReflectiveEngine {
    /// Seed the run from the configured genesis reference.
    ///
    /// Only runs on a fresh run (iteration 0, empty log) with genesis
    /// enabled. Any failure is logged and skipped; the run then starts from
    /// the configured defaults.
    pub async fn bootstrap_genesis(&mut self) -> Option<IterationRecord> {
        let reference = self.config.genesis.active_reference()?.to_string();
        if self.world.iteration > 0 {
            return None;
        }
        match self.log.is_empty() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                warn!(error = %e, "run log unreadable, skipping genesis");
                return None;
            }
        }

        info!(reference = %reference, "genesis bootstrap");
        match self.try_bootstrap(&reference).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(reference = %reference, error = %e, "genesis failed, continuing without it");
                None
            }
        }
    }

    async fn try_bootstrap(&mut self, reference: &str) -> Result<IterationRecord, EngineError> {
        let fetcher = match self.fetcher.take() {
            Some(f) => f,
            None => GenesisFetcher::new()?,
        };
        let fetched = fetcher.fetch(reference, &self.layout).await;
        self.fetcher = Some(fetcher);
        let source = fetched?;

        let image = load_image(&source.local_path)?;
        let caption = self.capabilities.captioner.caption(&image).await?;
        let embedding = self.capabilities.embedder.embed(&image).await?;
        if embedding.is_empty() {
            return Err(EngineError::EmptyEmbedding(0));
        }

        let genesis = &self.config.genesis;
        let keywords = tokenize_keywords(&caption, &self.config.stopwords, genesis.analysis_keywords);
        let mut world = self.world.clone();
        let motifs_added = world.motif_bank.add(&keywords, &self.config.banned_motifs);

        let embedding_path = self.layout.genesis_embedding();
        write_embedding(&embedding_path, &embedding)?;
        let local_path = path_string(&source.local_path);
        let analysis = analyze(&image, &caption, &keywords, &source.resolved, &local_path, genesis)?;
        write_json(&self.layout.genesis_analysis(), &analysis)?;

        let record = IterationRecord {
            iteration: 0,
            ts: Utc::now().timestamp(),
            prompt: format!("GENESIS: {}", reference),
            negative: world.negative.clone(),
            generation: None,
            image_path: local_path,
            caption,
            motifs_added,
            similarity_prev: None,
            novelty_prev: None,
            rule_change: GENESIS_TAG.to_string(),
            embedding_path: path_string(&embedding_path),
            interior_strikes: world.interior_strikes,
            backend: GENESIS_BACKEND.to_string(),
            used_img2img: false,
            img2img_strength: 0.0,
        };
        self.log.append(&record)?;
        self.state_store.save(&world)?;
        self.world = world;
        self.prev_embedding = Some(embedding);
        self.genesis_image = Some(image);

        info!(
            caption = %record.caption,
            keywords = %keywords.join(", "),
            brightness = analysis.brightness,
            contrast = analysis.contrast,
            palette = ?analysis.hex_palette(),
            "genesis analysed"
        );
        Ok(record)
    }
}
