use std::path::Path;

use tracing::{info, warn};

use crate::clients::ApiClient;
use crate::error::{AppError, Result};
use crate::models::UploadResponse;

const ALLOWED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Checks a file before it is sent: Excel extension, not empty, not larger
/// than `max_file_size`.
pub fn validate_upload(file_name: &str, size: usize, max_file_size: usize) -> Result<()> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    if !extension.is_some_and(|e| ALLOWED_EXTENSIONS.contains(&e.as_str())) {
        return Err(AppError::InvalidInput(
            "Unsupported file format, expected an Excel file (.xlsx or .xls)".to_string(),
        ));
    }
    if size == 0 {
        return Err(AppError::InvalidInput(format!("{} is empty", file_name)));
    }
    if size > max_file_size {
        return Err(AppError::InvalidInput(format!(
            "{} is {}KB, the limit is {}KB",
            file_name,
            size / 1024,
            max_file_size / 1024
        )));
    }
    Ok(())
}

/// Reads, validates and uploads a spreadsheet from disk.
pub async fn upload_path(api: &ApiClient, path: &Path, max_file_size: usize) -> Result<UploadResponse> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::InvalidInput(format!("not a file: {}", path.display())))?
        .to_string();

    let metadata = tokio::fs::metadata(path).await?;
    validate_upload(&file_name, metadata.len() as usize, max_file_size)?;

    let content = tokio::fs::read(path).await?;
    info!("Uploading {} ({}KB)", file_name, content.len() / 1024);
    let response = api.upload_file(&file_name, content).await?;

    if response.success {
        info!("Upload processed {} rows", response.processed_rows);
    } else {
        warn!("Upload rejected: {}", response.message);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 10 * 1024 * 1024;

    #[test]
    fn excel_files_within_limit_pass() {
        assert!(validate_upload("report.xlsx", 2048, LIMIT).is_ok());
        assert!(validate_upload("LEGACY.XLS", 2048, LIMIT).is_ok());
    }

    #[test]
    fn wrong_type_empty_or_oversized_files_fail() {
        assert!(validate_upload("report.csv", 2048, LIMIT).is_err());
        assert!(validate_upload("xlsx", 2048, LIMIT).is_err());
        assert!(validate_upload("report.xlsx", 0, LIMIT).is_err());
        assert!(validate_upload("report.xlsx", LIMIT + 1, LIMIT).is_err());
    }
}
