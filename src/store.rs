use std::path::Path;

use anyhow::Context as _;
use tokio::fs;

use crate::formats::StoryRecord;

/// Refuses an existing output file unless `force` is set. Errors checking the
/// path are reported, not read as "absent".
pub async fn ensure_output_available(path: &Path, force: bool) -> anyhow::Result<()> {
    if force {
        return Ok(());
    }
    let exists = fs::try_exists(path)
        .await
        .with_context(|| format!("check output path: {}", path.display()))?;
    if exists {
        anyhow::bail!("output already exists (use --force): {}", path.display());
    }
    Ok(())
}

/// Writes `story` as pretty JSON. The file appears in one rename, so a failed
/// run never leaves a truncated record behind.
pub async fn write_story(path: &Path, story: &StoryRecord) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }

    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    let mut data = serde_json::to_vec_pretty(story).context("serialize story record")?;
    data.push(b'\n');

    fs::write(&tmp_path, &data)
        .await
        .with_context(|| format!("write tmp: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("rename tmp to final: {}", path.display()))?;
    Ok(())
}
