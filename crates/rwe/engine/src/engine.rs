use crate::error::EngineError;
use chrono::{Local, Utc};
use image::DynamicImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rwe_capability::{Capabilities, GenerationRequest};
use rwe_genesis::GenesisFetcher;
use rwe_motif::{tokenize_keywords, NoveltySignal, PromptComposer, CAPTION_KEYWORDS};
use rwe_mutation::RuleMutationEngine;
use rwe_store::{
    artifact_stem, load_image, path_string, read_embedding, save_png, write_embedding, RunLayout,
    RunLog, WorldStateStore,
};
use rwe_types::{EngineConfig, GenerationParams, IterationRecord, SeedPolicy, WorldState};
use tracing::{debug, info, warn};

/// Upper bound for randomly drawn seeds.
pub const MAX_RANDOM_SEED: u64 = i32::MAX as u64;

/// The reflective iteration loop for one run directory.
///
/// Owns the only [`WorldState`] of the run. Each [`step`](Self::step) works
/// on a copy and commits it only after the iteration record has been
/// appended and the snapshot saved, so a failed step leaves both the
/// in-memory world and the on-disk checkpoint at the last completed
/// iteration.
pub struct ReflectiveEngine {
    pub(crate) config: EngineConfig,
    pub(crate) layout: RunLayout,
    pub(crate) capabilities: Capabilities,
    pub(crate) state_store: WorldStateStore,
    pub(crate) log: RunLog,
    pub(crate) world: WorldState,
    pub(crate) prev_embedding: Option<Vec<f32>>,
    pub(crate) genesis_image: Option<DynamicImage>,
    pub(crate) fetcher: Option<GenesisFetcher>,
    pub(crate) rng: StdRng,
    mutation: RuleMutationEngine,
    composer: PromptComposer,
}

impl ReflectiveEngine {
    /// Open (or start) the run under `layout`.
    ///
    /// Loads the saved world or builds a fresh one from `config`, records the
    /// generator's backend tag on first load, and restores the previous
    /// embedding and genesis style image of a resumed run.
    pub fn open(
        config: EngineConfig,
        layout: RunLayout,
        capabilities: Capabilities,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let layout = RunLayout::create(layout.root().to_path_buf())?;
        let state_store = WorldStateStore::new(layout.world_state());
        let log = RunLog::new(layout.run_log());

        let mut world = match state_store.load()? {
            Some(world) => world,
            None => WorldState::new(&config),
        };
        if world.backend_unset() {
            world.backend = capabilities.generator.backend_tag().to_string();
        }

        let records = log.read_all()?;
        if let Some(last) = records.last() {
            if last.iteration > world.iteration {
                warn!(
                    snapshot = world.iteration,
                    log = last.iteration,
                    "world snapshot trails the run log, continuing after the last record"
                );
                world.iteration = last.iteration;
            }
        }
        let prev_embedding = records.last().and_then(|r| restore_embedding(&layout, r));
        let genesis_image = if config.genesis.use_style && world.iteration < config.genesis.style_iterations
        {
            records
                .first()
                .filter(|r| r.is_genesis())
                .and_then(|r| load_image(&layout.resolve(&r.image_path)).ok())
        } else {
            None
        };

        info!(
            root = %layout.root().display(),
            iteration = world.iteration,
            backend = %world.backend,
            resumed = !records.is_empty(),
            "engine opened"
        );

        Ok(Self {
            mutation: RuleMutationEngine::new(&config),
            composer: PromptComposer::new(),
            config,
            layout,
            capabilities,
            state_store,
            log,
            world,
            prev_embedding,
            genesis_image,
            fetcher: None,
            rng: StdRng::from_entropy(),
        })
    }

    /// Reseed prompt composition, seed draws and mutation jitter.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_mutation_engine(mut self, mutation: RuleMutationEngine) -> Self {
        self.mutation = mutation;
        self
    }

    /// Fetcher used for a remote genesis reference.
    pub fn with_genesis_fetcher(mut self, fetcher: GenesisFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn layout(&self) -> &RunLayout {
        &self.layout
    }

    pub fn previous_embedding(&self) -> Option<&[f32]> {
        self.prev_embedding.as_deref()
    }

    pub fn has_genesis_image(&self) -> bool {
        self.genesis_image.is_some()
    }

    /// Genesis bootstrap followed by `iterations` steps.
    pub async fn run(&mut self, iterations: u64) -> Result<Vec<IterationRecord>, EngineError> {
        self.bootstrap_genesis().await;
        let mut records = Vec::with_capacity(iterations as usize);
        for _ in 0..iterations {
            records.push(self.step().await?);
        }
        info!(iterations, last = self.world.iteration, "run complete");
        Ok(records)
    }

    /// Produce, describe, mutate on and persist one artifact.
    pub async fn step(&mut self) -> Result<IterationRecord, EngineError> {
        let mut next = self.world.clone();
        next.iteration += 1;
        let iteration = next.iteration;

        let prompt = self
            .composer
            .compose(&next.motif_bank, &next.prompt_style, &mut self.rng);
        let seed = match next.seed {
            SeedPolicy::Fixed(seed) => seed,
            SeedPolicy::Random => self.rng.gen_range(0..=MAX_RANDOM_SEED),
        };
        let params = GenerationParams {
            width: next.width,
            height: next.height,
            steps: next.steps,
            cfg: next.cfg,
            seed,
        };
        let request = GenerationRequest::new(prompt.clone(), params.width, params.height)
            .with_negative(next.negative.clone())
            .with_steps(params.steps)
            .with_cfg(params.cfg)
            .with_seed(seed);

        let (image, img2img_strength) = self.generate(request, iteration).await?;
        let caption = self.capabilities.captioner.caption(&image).await?;
        let embedding = self.capabilities.embedder.embed(&image).await?;
        if embedding.is_empty() {
            return Err(EngineError::EmptyEmbedding(iteration));
        }
        if let Some(prev) = &self.prev_embedding {
            if prev.len() != embedding.len() {
                return Err(EngineError::EmbeddingDimension {
                    iteration,
                    expected: prev.len(),
                    found: embedding.len(),
                });
            }
        }
        let signal = self
            .prev_embedding
            .as_deref()
            .map(|prev| NoveltySignal::between(prev, &embedding));

        let keywords = tokenize_keywords(&caption, &self.config.stopwords, CAPTION_KEYWORDS);
        let mut motifs_added = next.motif_bank.add(&keywords, &self.config.banned_motifs);
        let outcome = self
            .mutation
            .mutate(&mut next, signal.map(|s| s.novelty), &caption, &mut self.rng);
        motifs_added.extend(outcome.motifs_added);

        let stem = artifact_stem(iteration, &Local::now());
        let image_path = self.layout.image_path(&stem);
        let embedding_path = self.layout.embedding_path(&stem);
        save_png(&image, &image_path)?;
        write_embedding(&embedding_path, &embedding)?;

        let record = IterationRecord {
            iteration,
            ts: Utc::now().timestamp(),
            prompt,
            negative: next.negative.clone(),
            generation: Some(params),
            image_path: path_string(&image_path),
            caption,
            motifs_added,
            similarity_prev: signal.map(|s| s.similarity),
            novelty_prev: signal.map(|s| s.novelty),
            rule_change: outcome.rule_change,
            embedding_path: path_string(&embedding_path),
            interior_strikes: next.interior_strikes,
            backend: next.backend.clone(),
            used_img2img: img2img_strength.is_some(),
            img2img_strength: img2img_strength.unwrap_or(0.0),
        };
        self.log.append(&record)?;
        self.state_store.save(&next)?;
        self.world = next;
        self.prev_embedding = Some(embedding);

        info!(
            iteration,
            file = %stem,
            caption = %record.caption,
            similarity = ?record.similarity_prev,
            novelty = ?record.novelty_prev,
            target = self.world.novelty_target,
            rule_change = %record.rule_change,
            motifs_added = record.motifs_added.len(),
            interior_strikes = record.interior_strikes,
            img2img = record.used_img2img,
            "iteration complete"
        );
        Ok(record)
    }

    /// Generate with the genesis image as init image while style transfer is
    /// active, falling back to text-to-image when that call fails. Returns
    /// the image and the init strength actually used.
    async fn generate(
        &self,
        request: GenerationRequest,
        iteration: u64,
    ) -> Result<(DynamicImage, Option<f64>), EngineError> {
        let generator = &self.capabilities.generator;
        let genesis = &self.config.genesis;
        let styled = self.genesis_image.as_ref().filter(|_| {
            genesis.use_style && iteration <= genesis.style_iterations && generator.supports_image_to_image()
        });
        if let Some(init) = styled {
            let styled = request.clone().with_init_image(init.clone(), genesis.style_strength);
            match generator.generate(&styled).await {
                Ok(image) => return Ok((image, Some(genesis.style_strength))),
                Err(e) => {
                    warn!(iteration, error = %e, "image-to-image failed, using text-to-image");
                }
            }
        }
        let image = generator.generate(&request.without_init_image()).await?;
        Ok((image, None))
    }
}

fn restore_embedding(layout: &RunLayout, record: &IterationRecord) -> Option<Vec<f32>> {
    if record.embedding_path.is_empty() {
        return None;
    }
    let path = layout.resolve(&record.embedding_path);
    match read_embedding(&path) {
        Ok(v) if !v.is_empty() => {
            debug!(iteration = record.iteration, dim = v.len(), "previous embedding restored");
            Some(v)
        }
        Ok(_) => None,
        Err(e) => {
            warn!(iteration = record.iteration, error = %e, "previous embedding unavailable");
            None
        }
    }
}
