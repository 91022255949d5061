use crate::config::RenderConfig;
use crate::domain::{HallTicketError, RenderError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use image::DynamicImage;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

/// Longest reference echoed back in errors and logs
const MAX_REFERENCE_DISPLAY: usize = 96;

/// Resolves an image reference into a decoded image
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Loads and decodes the image behind `reference`
    ///
    /// Implementations must not apply their own deadline; callers race the
    /// returned future against the per-ticket asset deadline.
    async fn load(&self, reference: &str) -> Result<DynamicImage>;
}

/// Loader for remote, inline (`data:`) and local image references
pub struct HttpAssetLoader {
    client: Client,
    allow_remote: bool,
}

impl HttpAssetLoader {
    /// Creates a loader honouring `render.allow_remote_images`
    pub fn new(config: &RenderConfig) -> Result<Self> {
        let client = Client::builder()
            // Upper bound only; the asset deadline is normally much shorter
            .timeout(Duration::from_millis(config.asset_timeout_ms.max(1000)))
            .build()
            .map_err(|e| {
                HallTicketError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            allow_remote: config.allow_remote_images,
        })
    }

    async fn fetch_remote(&self, reference: &str) -> Result<Vec<u8>> {
        if !self.allow_remote {
            return Err(RenderError::RemoteDisabled(short(reference)).into());
        }

        let response = self
            .client
            .get(reference)
            .send()
            .await
            .map_err(|e| fetch_error(reference, e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(
                reference,
                format!("URL returned status: {}", response.status()),
            ));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| fetch_error(reference, format!("Failed to read response body: {e}")))?;

        if data.is_empty() {
            return Err(fetch_error(reference, "Empty response from URL".to_string()));
        }

        Ok(data.to_vec())
    }

    async fn read_local(&self, reference: &str) -> Result<Vec<u8>> {
        let path = match url::Url::parse(reference) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map_err(|_| fetch_error(reference, "Invalid file URL".to_string()))?,
            _ => PathBuf::from(reference),
        };

        tokio::fs::read(&path)
            .await
            .map_err(|e| fetch_error(reference, e.to_string()))
    }
}

#[async_trait]
impl AssetLoader for HttpAssetLoader {
    async fn load(&self, reference: &str) -> Result<DynamicImage> {
        let reference = reference.trim();

        if reference.starts_with("data:") {
            let inline = reference.to_string();
            return decode_off_thread(short(reference), move || {
                decode_data_url(&inline).and_then(|bytes| decode_image(&inline, &bytes))
            })
            .await;
        }

        let bytes = if reference.starts_with("http://") || reference.starts_with("https://") {
            self.fetch_remote(reference).await?
        } else {
            self.read_local(reference).await?
        };

        let label = short(reference);
        decode_off_thread(label.clone(), move || decode_image(&label, &bytes)).await
    }
}

/// Runs CPU-bound decoding on the blocking pool
///
/// The returned future only waits on the task handle, so a caller racing it
/// against a deadline gets control back as soon as the deadline passes.
async fn decode_off_thread<F>(label: String, decode: F) -> Result<DynamicImage>
where
    F: FnOnce() -> Result<DynamicImage> + Send + 'static,
{
    tokio::task::spawn_blocking(decode).await.map_err(|e| {
        HallTicketError::from(RenderError::Decode {
            reference: label,
            message: format!("Decode task failed: {e}"),
        })
    })?
}

fn decode_image(reference: &str, bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| {
        RenderError::Decode {
            reference: short(reference),
            message: e.to_string(),
        }
        .into()
    })
}

/// Decodes the payload of a `data:[<mime>][;base64],<payload>` URL
pub fn decode_data_url(reference: &str) -> Result<Vec<u8>> {
    let rest = reference
        .strip_prefix("data:")
        .ok_or_else(|| fetch_error(reference, "Not a data URL".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| fetch_error(reference, "Malformed data URL".to_string()))?;

    if meta.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        general_purpose::STANDARD
            .decode(cleaned.as_bytes())
            .map_err(|e| fetch_error(reference, format!("Invalid base64 payload: {e}")))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

fn fetch_error(reference: &str, message: String) -> HallTicketError {
    RenderError::AssetFetch {
        reference: short(reference),
        message,
    }
    .into()
}

/// Reference trimmed for display; inline data URLs can be megabytes long
fn short(reference: &str) -> String {
    if reference.chars().count() <= MAX_REFERENCE_DISPLAY {
        reference.to_string()
    } else {
        let head: String = reference.chars().take(MAX_REFERENCE_DISPLAY).collect();
        format!("{head}...")
    }
}
