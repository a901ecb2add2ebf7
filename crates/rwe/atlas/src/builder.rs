use crate::error::AtlasError;
use crate::pdf::{write_pdf, AtlasPage};
use crate::sheet::ContactSheet;
use crate::wrap::wrap_lines;
use chrono::Local;
use rwe_motif::{motif_counts, MotifCount};
use rwe_store::{read_json, RunLayout};
use rwe_types::{ClusterItem, ClusterReport, Epoch, EpochReport};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{info, warn};

/// Upper bound on images in the timeline sheet.
pub const TIMELINE_MAX: usize = 24;
/// Members shown per cluster or epoch sheet.
pub const SHEET_MEMBERS: usize = 12;
/// Terms per motif-frequency table.
pub const MOTIF_TABLE_SIZE: usize = 12;
pub const WRAP_WIDTH: usize = 95;

pub const ATLAS_TITLE: &str = "Reflective World Engine (RWE) - Atlas";

/// What a finished atlas produced.
#[derive(Clone, Debug)]
pub struct AtlasSummary {
    pub pdf: PathBuf,
    pub sheets: Vec<PathBuf>,
    /// Physical PDF pages.
    pub pages: usize,
}

/// Even sample across the run: every `ceil(n / max)`-th item.
pub fn timeline_sample(items: &[ClusterItem], max: usize) -> Vec<&ClusterItem> {
    let step = items.len().div_ceil(max.max(1)).max(1);
    items.iter().step_by(step).collect()
}

/// Items grouped by cluster label, ascending; members keep iteration order.
pub fn group_by_cluster(items: &[ClusterItem]) -> BTreeMap<usize, Vec<&ClusterItem>> {
    let mut groups: BTreeMap<usize, Vec<&ClusterItem>> = BTreeMap::new();
    for item in items {
        groups.entry(item.cluster).or_default().push(item);
    }
    groups
}

/// `"<label>: term(n), term(n), ..."`
pub fn motif_line(label: &str, counts: &[MotifCount]) -> String {
    let terms: Vec<String> = counts.iter().map(|c| format!("{}({})", c.term, c.count)).collect();
    format!("{}: {}", label, terms.join(", "))
}

/// Builds contact sheets and the paginated atlas for one run directory.
pub struct AtlasBuilder {
    layout: RunLayout,
    stopwords: BTreeSet<String>,
    config_path: Option<PathBuf>,
    sheet: ContactSheet,
}

impl AtlasBuilder {
    pub fn new(layout: RunLayout) -> Self {
        Self {
            layout,
            stopwords: BTreeSet::new(),
            config_path: None,
            sheet: ContactSheet::new(),
        }
    }

    pub fn with_stopwords(mut self, stopwords: BTreeSet<String>) -> Self {
        self.stopwords = stopwords;
        self
    }

    /// Config file named on the cover page.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_sheet(mut self, sheet: ContactSheet) -> Self {
        self.sheet = sheet;
        self
    }

    fn captions<'a>(&self, items: impl IntoIterator<Item = &'a ClusterItem>) -> Vec<MotifCount> {
        motif_counts(
            items.into_iter().map(|i| i.caption.as_str()),
            &self.stopwords,
            MOTIF_TABLE_SIZE,
        )
    }

    /// Render a sheet of `items`; `None` when none of their images load.
    fn render_sheet(
        &self,
        items: &[&ClusterItem],
        title: &str,
        name: &str,
    ) -> Result<Option<PathBuf>, AtlasError> {
        let paths: Vec<PathBuf> = items
            .iter()
            .map(|i| self.layout.resolve(&i.image_path))
            .collect();
        let out = self.layout.sheets_dir().join(name);
        match self.sheet.render(&paths, title, &out) {
            Ok(_) => Ok(Some(out)),
            Err(AtlasError::NoImages(_)) => {
                warn!(sheet = name, "no readable images, page omitted");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn cover_lines(&self, report: &ClusterReport, epochs: &[Epoch]) -> Vec<String> {
        let mut lines = vec![
            format!("Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S")),
            format!("Output dir: {}", self.layout.root().display()),
        ];
        if let Some(cfg) = &self.config_path {
            lines.push(format!("Config: {}", cfg.display()));
        }
        lines.push(format!("Clustering: {}, k={}", report.method, report.k));
        lines.push(format!("Epochs: {}", epochs.len()));
        lines
    }

    /// Write all sheets and the PDF under the layout's atlas directory.
    pub fn build(&self, report: &ClusterReport, epochs: &[Epoch]) -> Result<AtlasSummary, AtlasError> {
        if report.items.is_empty() {
            return Err(AtlasError::EmptyClusters);
        }
        let mut items = report.items.clone();
        items.sort_by_key(|i| i.iteration);
        std::fs::create_dir_all(self.layout.sheets_dir())?;

        let mut sheets = Vec::new();
        let mut pages = vec![AtlasPage::Cover {
            title: ATLAS_TITLE.to_string(),
            lines: self.cover_lines(report, epochs),
        }];

        let epoch_lines: Vec<String> = epochs
            .iter()
            .flat_map(|e| {
                let line = motif_line(&format!("Epoch {:02}", e.epoch_id), &self.captions(&e.items));
                wrap_lines(&line, WRAP_WIDTH)
            })
            .collect();
        pages.push(AtlasPage::Text {
            title: "Motif Index - Epochs".into(),
            lines: epoch_lines,
        });

        let groups = group_by_cluster(&items);
        let cluster_lines: Vec<String> = groups
            .iter()
            .flat_map(|(cl, members)| {
                let line = motif_line(&format!("Cluster {:02}", cl), &self.captions(members.iter().copied()));
                wrap_lines(&line, WRAP_WIDTH)
            })
            .collect();
        pages.push(AtlasPage::Text {
            title: "Motif Index - Clusters".into(),
            lines: cluster_lines,
        });

        let timeline = timeline_sample(&items, TIMELINE_MAX);
        if let Some(path) = self.render_sheet(&timeline, "RWE Atlas - Timeline (sampled)", "timeline.png")? {
            pages.push(AtlasPage::Sheet {
                title: "Timeline (sampled)".into(),
                image: path.clone(),
            });
            sheets.push(path);
        }

        for e in epochs {
            let top: Vec<String> = e
                .top_clusters
                .iter()
                .map(|c| format!("{}:{}", c.cluster, c.count))
                .collect();
            let mut lines = vec![format!(
                "Avg novelty: {:.3} | Top clusters: {}",
                e.avg_novelty,
                top.join(", ")
            )];
            lines.extend(wrap_lines(&motif_line("Top motifs", &self.captions(&e.items)), WRAP_WIDTH));
            pages.push(AtlasPage::Text {
                title: format!(
                    "Epoch {:02}: Iter {}-{} (n={})",
                    e.epoch_id, e.iteration_start, e.iteration_end, e.size
                ),
                lines,
            });

            let members: Vec<&ClusterItem> = e.items.iter().take(SHEET_MEMBERS).collect();
            let title = format!("Epoch {:02} (top {})", e.epoch_id, members.len());
            if let Some(path) = self.render_sheet(&members, &title, &format!("epoch_{:02}.png", e.epoch_id))? {
                pages.push(AtlasPage::Sheet {
                    title: format!("Epoch {:02} contact sheet", e.epoch_id),
                    image: path.clone(),
                });
                sheets.push(path);
            }
        }

        for (cl, members) in &groups {
            let members: Vec<&ClusterItem> = members.iter().take(SHEET_MEMBERS).copied().collect();
            let title = format!("Cluster {:02} (top {})", cl, members.len());
            if let Some(path) = self.render_sheet(&members, &title, &format!("cluster_{:02}.png", cl))? {
                pages.push(AtlasPage::Sheet {
                    title: format!("Cluster {:02} contact sheet", cl),
                    image: path.clone(),
                });
                sheets.push(path);
            }
        }

        let pdf = self.layout.atlas_pdf();
        let page_count = write_pdf(ATLAS_TITLE, &pages, &pdf)?;
        info!(path = %pdf.display(), pages = page_count, sheets = sheets.len(), "atlas written");
        Ok(AtlasSummary {
            pdf,
            sheets,
            pages: page_count,
        })
    }

    /// Build from `clusters.json` and `epochs.json` already in the run directory.
    pub fn build_run(&self) -> Result<AtlasSummary, AtlasError> {
        let report: ClusterReport = read_json(&self.layout.clusters())?;
        let epochs: EpochReport = read_json(&self.layout.epochs())?;
        self.build(&report, &epochs.epochs)
    }
}
