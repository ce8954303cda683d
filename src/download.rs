//! Saves generated variations to disk.

use crate::error::Result;
use crate::image::VariationProvider;
use crate::result::ResultSet;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// What [`save_results`] managed to write.
#[derive(Debug, Default)]
pub struct DownloadReport {
    /// Files written, in result order.
    pub saved: Vec<PathBuf>,
    /// Variations that could not be fetched or written.
    pub failed: usize,
}

/// Fetches every successful variation and writes it into `dir`.
///
/// Files are named `<stem>-<n>.<ext>`; a stem already used by an earlier
/// upload gets the first free `_<k>` suffix. A variation that fails to download is logged and
/// counted, the rest are still saved.
pub async fn save_results<P>(provider: &P, results: &ResultSet, dir: &Path) -> Result<DownloadReport>
where
    P: VariationProvider + ?Sized,
{
    std::fs::create_dir_all(dir)?;
    let mut report = DownloadReport::default();
    let mut used_stems: HashSet<String> = HashSet::new();

    for entry in results {
        let images = entry.result.images();
        if images.is_empty() {
            continue;
        }

        let stem = Path::new(&entry.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("emote");
        let stem = unique_stem(stem, &mut used_stems);

        for (i, image) in images.iter().enumerate() {
            let fetched = match provider.fetch(image).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    tracing::warn!(source = %entry.name, index = i + 1, "download failed: {e}");
                    report.failed += 1;
                    continue;
                }
            };

            let path = dir.join(format!("{stem}-{}.{}", i + 1, fetched.format.extension()));
            match fetched.save(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), bytes = fetched.size(), "saved variation");
                    report.saved.push(path);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "save failed: {e}");
                    report.failed += 1;
                }
            }
        }
    }

    Ok(report)
}

/// Claims `stem`, or `stem_2`, `stem_3`, ... if it is taken.
fn unique_stem(stem: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = stem.to_string();
    let mut k = 1;
    while used.contains(&candidate) {
        k += 1;
        candidate = format!("{stem}_{k}");
    }
    used.insert(candidate.clone());
    candidate
}
