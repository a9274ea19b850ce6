//! Saving the full-resolution asset of an image to disk.
//!
//! The bytes are fetched into memory, written to a temporary file inside the
//! destination directory and persisted under the final name. The temporary
//! file is removed on any failure.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{error, info};

use vitrine_shared::ImageRecord;

use crate::error::{ClientError, Result};

/// File name an image is saved under: `<code>.jpg`, else the last segment of
/// its URL, else `download`.
pub fn file_name_for(image: &ImageRecord) -> String {
    let code = sanitize(image.code.trim());
    if !code.is_empty() {
        return format!("{code}.jpg");
    }

    let from_url = image
        .url
        .split(['/', '\\'])
        .last()
        .map(|segment| segment.split(['?', '#']).next().unwrap_or(""))
        .map(sanitize)
        .unwrap_or_default();
    if from_url.is_empty() {
        "download".to_string()
    } else {
        from_url
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}

/// Download `image` into `dest_dir`. Returns the saved path.
pub async fn download_image(
    http: &reqwest::Client,
    image: &ImageRecord,
    dest_dir: &Path,
    timeout: Duration,
) -> Result<PathBuf> {
    if image.url.trim().is_empty() {
        return Err(ClientError::MissingAsset);
    }

    let bytes = tokio::time::timeout(timeout, async {
        let resp = http.get(&image.url).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Status {
                status: resp.status().as_u16(),
                message: format!("asset fetch failed for {}", image.url),
            });
        }
        Ok(resp.bytes().await?)
    })
    .await
    .map_err(|_| ClientError::Timeout(timeout))??;

    let target = dest_dir.join(file_name_for(image));
    let dir = dest_dir.to_path_buf();
    let dest = target.clone();
    let size = bytes.len();

    let saved = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        std::fs::create_dir_all(&dir)?;
        let mut tmp = tempfile::Builder::new()
            .prefix(".vitrine-")
            .suffix(".part")
            .tempfile_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(&dest).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    if let Err(e) = saved {
        error!(path = %target.display(), error = %e, "failed to save download");
        return Err(e.into());
    }

    info!(id = %image.id, path = %target.display(), size, "image downloaded");
    Ok(target)
}
