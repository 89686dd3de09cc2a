use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::clients::ApiClient;
use crate::error::Result;

fn partial_path(out: &Path) -> PathBuf {
    let mut name = out.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    out.with_file_name(name)
}

/// Streams a sheet export into `<out>.part` and moves it over `out` once the
/// download completed. A failed download leaves `out` as it was.
pub async fn download_to_path(api: &ApiClient, sheet_id: i64, keyword: Option<&str>, out: &Path) -> Result<u64> {
    let part = partial_path(out);
    let mut file = tokio::fs::File::create(&part).await?;

    let written = match api.download_rows(sheet_id, keyword, &mut file).await {
        Ok(written) => written,
        Err(e) => {
            drop(file);
            if let Err(rm) = tokio::fs::remove_file(&part).await {
                warn!("Could not remove {}: {}", part.display(), rm);
            }
            return Err(e);
        }
    };
    drop(file);

    tokio::fs::rename(&part, out).await?;
    info!("Exported sheet {} to {} ({} bytes)", sheet_id, out.display(), written);
    Ok(written)
}
