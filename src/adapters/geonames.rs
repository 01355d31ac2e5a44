use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use std::io::{Cursor, Read};
use url::Url;

pub const DEFAULT_REFERENCE_URL: &str = "http://download.geonames.org/export/zip/US.zip";

/// 下載 GeoNames 壓縮檔，回傳 (`<檔名>.txt`, 其內容)
pub async fn fetch_reference_text(client: &Client, url_str: &str) -> Result<(String, Vec<u8>)> {
    let url = Url::parse(url_str).map_err(|e| EtlError::InvalidConfigValueError {
        field: "reference_url".to_string(),
        value: url_str.to_string(),
        reason: e.to_string(),
    })?;

    tracing::info!("🌐 Downloading postal code reference data from {}", url);
    let response = client.get(url.as_str()).send().await?.error_for_status()?;
    let archive = response.bytes().await?;
    tracing::debug!("Downloaded {} bytes, extracting", archive.len());

    let entry_name = expected_entry_name(&url);
    let data = extract_entry(&archive, &entry_name)?;
    Ok((entry_name, data))
}

/// `.../US.zip` -> `US.txt`
pub fn expected_entry_name(url: &Url) -> String {
    let filename = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("download.zip");
    let stem = filename.split('.').next().unwrap_or(filename);
    format!("{}.txt", stem)
}

pub fn extract_entry(archive: &[u8], entry_name: &str) -> Result<Vec<u8>> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;

    let names: Vec<String> = zip.file_names().map(str::to_string).collect();
    if !names.iter().any(|name| name == entry_name) {
        return Err(EtlError::ReferenceDataError {
            message: format!(
                "expected the archive to contain {}, but found: {:?}",
                entry_name, names
            ),
        });
    }

    let mut file = zip.by_name(entry_name)?;
    let mut data = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut data)?;
    Ok(data)
}
