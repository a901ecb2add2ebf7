use crate::error::GenesisError;
use regex::Regex;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Url};
use rwe_store::RunLayout;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info};

/// HTML pages followed before an image must be reached.
pub const MAX_PAGE_HOPS: usize = 2;

const KNOWN_EXTENSIONS: [&str; 6] = ["png", "jpg", "gif", "webp", "bmp", "tiff"];

fn og_image() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)property=["']og:image["']\s+content=["']([^"']+)"#)
            .expect("static og:image pattern")
    })
}

fn wikimedia() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)https?://upload\.wikimedia\.org/[^"'\s>]+"#)
            .expect("static wikimedia pattern")
    })
}

fn srcset() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)srcset=["']([^"']+)"#)
            .expect("static srcset pattern")
    })
}

fn url_extension() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\.(png|jpg|jpeg|gif|webp|bmp|tiff)(?:\?|#|$)")
            .expect("static extension pattern")
    })
}

/// Image URL referenced by an HTML page: the `og:image` meta tag, then any
/// Wikimedia upload link, then the last candidate of the first `srcset`.
pub fn extract_image_url(html: &str) -> Option<String> {
    if let Some(c) = og_image().captures(html) {
        return Some(c[1].trim().to_string());
    }
    if let Some(m) = wikimedia().find(html) {
        return Some(m.as_str().trim().to_string());
    }
    let set = srcset().captures(html)?;
    set[1]
        .split(',')
        .filter_map(|p| p.split_whitespace().next())
        .last()
        .map(str::to_string)
}

/// File extension (without the dot) from the content type, then the URL,
/// defaulting to `jpg`.
pub fn guess_extension(url: &str, content_type: &str) -> String {
    let ct = content_type.to_lowercase();
    if let Some(sub) = ct.strip_prefix("image/") {
        let ext = sub.split(';').next().unwrap_or("").trim();
        if ext == "jpeg" {
            return "jpg".into();
        }
        if KNOWN_EXTENSIONS.contains(&ext) {
            return ext.to_string();
        }
    }
    if let Some(c) = url_extension().captures(&url.to_lowercase()) {
        let ext = &c[1];
        return if ext == "jpeg" { "jpg".into() } else { ext.to_string() };
    }
    "jpg".into()
}

fn is_html(content_type: &str) -> bool {
    let ct = content_type.to_lowercase();
    ct.starts_with("text/html") || ct.starts_with("application/xhtml")
}

pub fn is_remote(reference: &str) -> bool {
    let r = reference.trim().to_lowercase();
    r.starts_with("http://") || r.starts_with("https://")
}

/// Where the genesis image came from and where its bytes now live.
#[derive(Clone, Debug, PartialEq)]
pub struct GenesisSource {
    /// The configured reference.
    pub reference: String,
    /// The URL that finally served image bytes (equal to `reference` for files).
    pub resolved: String,
    pub local_path: PathBuf,
}

/// Resolves a genesis reference to a local image file in the run directory.
#[derive(Clone, Debug)]
pub struct GenesisFetcher {
    client: Client,
    max_hops: usize,
}

impl GenesisFetcher {
    pub fn new() -> Result<Self, GenesisError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            max_hops: MAX_PAGE_HOPS,
        })
    }

    pub fn with_max_hops(mut self, hops: usize) -> Self {
        self.max_hops = hops;
        self
    }

    /// Fetch a URL (following up to `max_hops` HTML pages) or copy a local
    /// file, storing the image as `genesis_source.<ext>`.
    pub async fn fetch(&self, reference: &str, layout: &RunLayout) -> Result<GenesisSource, GenesisError> {
        let reference = reference.trim();
        if is_remote(reference) {
            self.fetch_url(reference, layout).await
        } else {
            copy_local(reference, layout)
        }
    }

    async fn fetch_url(&self, reference: &str, layout: &RunLayout) -> Result<GenesisSource, GenesisError> {
        let mut url =
            Url::parse(reference).map_err(|_| GenesisError::InvalidUrl(reference.to_string()))?;
        for hop in 0..=self.max_hops {
            debug!(%url, hop, "genesis fetch");
            let resp = self
                .client
                .get(url.clone())
                .header(USER_AGENT, "RWE/0.4")
                .send()
                .await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(GenesisError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            let content_type = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            let body = resp.bytes().await?;

            if is_html(&content_type) {
                let html = String::from_utf8_lossy(&body);
                let found = extract_image_url(&html)
                    .ok_or_else(|| GenesisError::NoImageInPage(url.to_string()))?;
                url = url
                    .join(&found)
                    .map_err(|_| GenesisError::InvalidUrl(found.clone()))?;
                continue;
            }

            let ext = guess_extension(url.as_str(), &content_type);
            let local_path = layout.genesis_source(&ext);
            std::fs::create_dir_all(layout.root())?;
            std::fs::write(&local_path, &body)?;
            info!(url = %url, path = %local_path.display(), bytes = body.len(), "genesis image fetched");
            return Ok(GenesisSource {
                reference: reference.to_string(),
                resolved: url.to_string(),
                local_path,
            });
        }
        Err(GenesisError::TooManyHops(self.max_hops))
    }
}

fn copy_local(reference: &str, layout: &RunLayout) -> Result<GenesisSource, GenesisError> {
    let src = Path::new(reference);
    if !src.is_file() {
        return Err(GenesisError::NotFound(reference.to_string()));
    }
    let ext = guess_extension(reference, "");
    let local_path = layout.genesis_source(&ext);
    std::fs::create_dir_all(layout.root())?;
    std::fs::copy(src, &local_path)?;
    info!(source = reference, path = %local_path.display(), "genesis image copied");
    Ok(GenesisSource {
        reference: reference.to_string(),
        resolved: reference.to_string(),
        local_path,
    })
}
