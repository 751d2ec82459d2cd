//! Stemcell upload with fallback sources

use crate::error::{ExecutionError, Result};
use crate::runner::{execute, Context};
use std::path::Path;

/// Upload candidates in order: newest cached tarball, primary URL, fallback URL
pub fn candidates(ctx: &Context) -> Vec<String> {
    let mut sources = Vec::new();

    if let Some(cached) = newest_cached(&ctx.workspace.stemcell_dir(&ctx.settings)) {
        sources.push(cached);
    }

    for url in [
        &ctx.settings.stemcell.primary_url,
        &ctx.settings.stemcell.fallback_url,
    ] {
        if !url.trim().is_empty() && !sources.contains(url) {
            sources.push(url.clone());
        }
    }

    sources
}

/// Highest-versioned `*.tgz` in the cache directory
fn newest_cached(dir: &Path) -> Option<String> {
    let pattern = dir.join("*.tgz");
    let pattern = pattern.to_str()?;

    glob::glob(pattern)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .max_by(|a, b| {
            version_key(a)
                .cmp(&version_key(b))
                .then_with(|| a.cmp(b))
        })
        .map(|p| p.display().to_string())
}

/// Numeric runs in the file name, compared as numbers
///
/// `bosh-stemcell-1.423-warden.tgz` gives `[1, 423]`.
fn version_key(path: &Path) -> Vec<u64> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    name.split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect()
}

/// Upload the first stemcell that the director accepts
pub fn upload_stemcell(ctx: &mut Context) -> Result<()> {
    let sources = candidates(ctx);

    for source in &sources {
        let inv = ctx
            .bosh()
            .args(["-n", "upload-stemcell", source.as_str()]);
        match execute(&inv, ctx) {
            Ok(()) => {
                ctx.print_info(&format!("Uploaded stemcell from {}", source));
                return Ok(());
            }
            Err(e) => {
                ctx.print_warn(&format!("Stemcell upload from {} failed: {}", source, e));
            }
        }
    }

    Err(ExecutionError::StemcellUnavailable(sources.join(", ")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::deploy::Workspace;
    use crate::runner::Verbosity;
    use std::fs;
    use tempfile::TempDir;

    fn ctx(root: &Path) -> Context {
        Context::new(Settings::default(), Workspace::new(root)).with_verbosity(Verbosity::Silent)
    }

    #[test]
    fn test_candidates_without_cache() {
        let temp = TempDir::new().unwrap();
        let ctx = ctx(temp.path());

        let sources = candidates(&ctx);
        assert_eq!(
            sources,
            vec![
                ctx.settings.stemcell.primary_url.clone(),
                ctx.settings.stemcell.fallback_url.clone()
            ]
        );
    }

    #[test]
    fn test_newest_cached_stemcell_comes_first() {
        let temp = TempDir::new().unwrap();
        let ctx = ctx(temp.path());
        let cache = ctx.workspace.stemcell_dir(&ctx.settings);
        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("stemcell-1.100.tgz"), "").unwrap();
        fs::write(cache.join("stemcell-1.200.tgz"), "").unwrap();
        fs::write(cache.join("notes.txt"), "").unwrap();

        let sources = candidates(&ctx);
        assert_eq!(sources.len(), 3);
        assert!(sources[0].ends_with("stemcell-1.200.tgz"));
    }

    #[test]
    fn test_cached_stemcell_compared_by_version() {
        let temp = TempDir::new().unwrap();
        let ctx = ctx(temp.path());
        let cache = ctx.workspace.stemcell_dir(&ctx.settings);
        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("bosh-stemcell-1.99-warden.tgz"), "").unwrap();
        fs::write(cache.join("bosh-stemcell-1.423-warden.tgz"), "").unwrap();

        let sources = candidates(&ctx);
        assert!(
            sources[0].ends_with("bosh-stemcell-1.423-warden.tgz"),
            "{:?}",
            sources
        );
    }

    #[test]
    fn test_version_key() {
        assert_eq!(
            version_key(Path::new("/c/bosh-stemcell-1.423-warden-boshlite-ubuntu-jammy-go_agent.tgz")),
            vec![1, 423]
        );
        assert!(version_key(Path::new("s-1.99.tgz")) < version_key(Path::new("s-1.423.tgz")));
        assert!(version_key(Path::new("notes.tgz")).is_empty());
    }

    #[test]
    fn test_duplicate_urls_are_tried_once() {
        let temp = TempDir::new().unwrap();
        let mut ctx = ctx(temp.path());
        ctx.settings.stemcell.fallback_url = ctx.settings.stemcell.primary_url.clone();

        assert_eq!(candidates(&ctx).len(), 1);
    }

    #[test]
    fn test_all_sources_failing() {
        let temp = TempDir::new().unwrap();
        let mut ctx = ctx(temp.path());
        ctx.settings.tools.bosh = "false".to_string();

        let err = upload_stemcell(&mut ctx).unwrap_err();
        assert!(err.to_string().contains("No stemcell could be uploaded"));
    }
}
