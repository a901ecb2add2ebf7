use crate::error::EngineError;
use rwe_analysis::{ClusterSelector, EpochSegmenter};
use rwe_atlas::{AtlasBuilder, AtlasSummary};
use rwe_store::{read_json, write_json, RunLayout};
use rwe_types::{ClusterReport, Epoch, EpochReport};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::info;

/// Everything the offline pass derived from a closed run log.
#[derive(Clone, Debug)]
pub struct PostPassReport {
    pub clusters: ClusterReport,
    pub epochs: Vec<Epoch>,
    pub atlas: AtlasSummary,
}

/// Offline analysis of a finished run: clustering, epoch segmentation and
/// the atlas, in that order. Each stage reads what the previous one wrote,
/// so stages can also be re-run on their own.
#[derive(Clone, Debug)]
pub struct PostPass {
    layout: RunLayout,
    selector: ClusterSelector,
    segmenter: EpochSegmenter,
    stopwords: BTreeSet<String>,
    config_path: Option<PathBuf>,
}

impl PostPass {
    pub fn new(layout: RunLayout) -> Self {
        Self {
            layout,
            selector: ClusterSelector::new(),
            segmenter: EpochSegmenter::new(),
            stopwords: BTreeSet::new(),
            config_path: None,
        }
    }

    pub fn with_selector(mut self, selector: ClusterSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_segmenter(mut self, segmenter: EpochSegmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Stopwords for the atlas motif tables.
    pub fn with_stopwords(mut self, stopwords: BTreeSet<String>) -> Self {
        self.stopwords = stopwords;
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Write `clusters.json`.
    pub fn cluster(&self) -> Result<ClusterReport, EngineError> {
        Ok(self.selector.cluster_run(&self.layout)?)
    }

    /// Write `epochs.json` from an existing `clusters.json`.
    pub fn epochs(&self) -> Result<Vec<Epoch>, EngineError> {
        Ok(self.segmenter.segment_run(&self.layout)?)
    }

    /// Write sheets and the PDF from existing `clusters.json` and `epochs.json`.
    pub fn atlas(&self) -> Result<AtlasSummary, EngineError> {
        let report: ClusterReport = read_json(&self.layout.clusters())?;
        let epochs: EpochReport = read_json(&self.layout.epochs())?;
        Ok(self.atlas_builder().build(&report, &epochs.epochs)?)
    }

    fn atlas_builder(&self) -> AtlasBuilder {
        let builder = AtlasBuilder::new(self.layout.clone()).with_stopwords(self.stopwords.clone());
        match &self.config_path {
            Some(path) => builder.with_config_path(path.clone()),
            None => builder,
        }
    }

    /// All three stages.
    pub fn run(&self) -> Result<PostPassReport, EngineError> {
        let clusters = self.cluster()?;
        let epochs = self.segmenter.segment(&clusters.items);
        write_json(
            &self.layout.epochs(),
            &EpochReport {
                epochs: epochs.clone(),
            },
        )?;
        let atlas = self.atlas_builder().build(&clusters, &epochs)?;
        info!(
            k = clusters.k,
            epochs = epochs.len(),
            pdf = %atlas.pdf.display(),
            "post pass complete"
        );
        Ok(PostPassReport {
            clusters,
            epochs,
            atlas,
        })
    }
}
