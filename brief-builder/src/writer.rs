use crate::renderer::RenderedPage;
use crate::types::{BuildError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Hand-authored directories copied verbatim by [`SiteWriter::sync_static`].
pub const STATIC_DIRS: &[&str] = &["assets", "legal", "articles"];

/// Hand-authored files copied verbatim by [`SiteWriter::sync_static`].
pub const STATIC_FILES: &[&str] = &[
    "about.html",
    "contact.html",
    "how-to.html",
    "robots.txt",
    "sitemap.xml",
];

/// Writes generated pages into the output tree. Only the paths it is handed
/// are replaced; anything else in the directory is never touched.
pub struct SiteWriter {
    output_dir: PathBuf,
}

impl SiteWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_error(path: &Path, source: std::io::Error) -> BuildError {
        BuildError::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    fn ensure_output_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|e| Self::write_error(&self.output_dir, e))
    }

    /// Replace `file_name` with `contents` by writing a sibling temp file
    /// and renaming it over the target. The page keeps the target's
    /// permissions, or gets world-readable ones if it is new.
    pub fn write_file(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let target = self.output_dir.join(file_name);

        let mut tmp = NamedTempFile::new_in(&self.output_dir)
            .map_err(|e| Self::write_error(&target, e))?;
        tmp.write_all(contents.as_bytes())
            .map_err(|e| Self::write_error(&target, e))?;
        tmp.flush().map_err(|e| Self::write_error(&target, e))?;
        if let Some(permissions) = page_permissions(&target) {
            tmp.as_file()
                .set_permissions(permissions)
                .map_err(|e| Self::write_error(&target, e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| Self::write_error(&target, e))?;
        tmp.persist(&target)
            .map_err(|e| Self::write_error(&target, e.error))?;

        Ok(target)
    }

    /// Write every page; the first failure aborts.
    pub fn write_pages(&self, pages: &[RenderedPage]) -> Result<Vec<PathBuf>> {
        self.ensure_output_dir()?;

        pages
            .iter()
            .map(|page| {
                let path = self.write_file(&page.file_name, &page.html)?;
                info!("Built {} ({} items)", page.file_name, page.articles);
                Ok(path)
            })
            .collect()
    }

    /// Refresh the hand-authored part of the site from `static_dir`.
    pub fn sync_static(&self, static_dir: &Path) -> Result<()> {
        self.ensure_output_dir()?;
        info!("Syncing static assets from {}", static_dir.display());

        for dir in STATIC_DIRS {
            let src = static_dir.join(dir);
            if !src.is_dir() {
                continue;
            }
            let dst = self.output_dir.join(dir);
            if dst.exists() {
                fs::remove_dir_all(&dst).map_err(|e| Self::write_error(&dst, e))?;
            }
            copy_dir(&src, &dst)?;
        }

        for file in STATIC_FILES {
            let src = static_dir.join(file);
            if !src.is_file() {
                warn!("Static file not found in {}: {}", static_dir.display(), file);
                continue;
            }
            let dst = self.output_dir.join(file);
            fs::copy(&src, &dst).map_err(|e| Self::write_error(&dst, e))?;
        }

        Ok(())
    }
}

/// Temp files are created owner-only; published pages must stay readable
/// by whoever serves the output tree.
fn page_permissions(target: &Path) -> Option<fs::Permissions> {
    match fs::metadata(target) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_page_permissions(),
    }
}

#[cfg(unix)]
fn default_page_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_page_permissions() -> Option<fs::Permissions> {
    None
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).map_err(|e| SiteWriter::write_error(dst, e))?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| SiteWriter::write_error(&target, e))?;
        }
    }
    Ok(())
}
