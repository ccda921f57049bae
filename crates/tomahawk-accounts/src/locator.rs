// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Account plugin discovery on the filesystem.
//!
//! The locator scans a fixed list of directories, non-recursively, for
//! shared libraries following the `libtomahawk_account_<name>` naming
//! convention. It only produces candidate paths; opening them is the
//! loader's job.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tomahawk_config::model::PluginsConfig;
use tracing::debug;

/// Substring every account plugin file name must contain.
pub const PLUGIN_MARKER: &str = "tomahawk_account_";

/// Prefix every account plugin file name must start with.
pub const PLUGIN_PREFIX: &str = "libtomahawk_account";

/// Shared library extensions accepted on any platform.
pub const LIBRARY_EXTENSIONS: &[&str] = &["so", "dylib", "dll"];

/// Install prefix baked in at build time; plugins live in `<prefix>/lib`.
pub const DEFAULT_INSTALL_PREFIX: &str = match option_env!("TOMAHAWK_INSTALL_PREFIX") {
    Some(prefix) => prefix,
    None => "/usr/local",
};

/// Returns true if `file_name` follows the account plugin naming convention.
pub fn is_plugin_file_name(file_name: &str) -> bool {
    file_name.starts_with(PLUGIN_PREFIX)
        && file_name.contains(PLUGIN_MARKER)
        && LIBRARY_EXTENSIONS
            .iter()
            .any(|ext| file_name.strip_suffix(ext).is_some_and(|stem| stem.ends_with('.')))
}

/// Scans plugin directories for account plugin libraries.
#[derive(Debug, Clone)]
pub struct PluginLocator {
    app_dir: PathBuf,
    install_prefix: PathBuf,
    extra_dirs: Vec<PathBuf>,
    bundle_fallback: bool,
}

impl PluginLocator {
    /// Create a locator rooted at the application's own directory.
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
            install_prefix: PathBuf::from(DEFAULT_INSTALL_PREFIX),
            extra_dirs: Vec::new(),
            bundle_fallback: cfg!(target_os = "macos"),
        }
    }

    /// Create a locator for the running executable, with config overrides applied.
    pub fn from_config(app_dir: impl Into<PathBuf>, config: &PluginsConfig) -> Self {
        let mut locator = Self::new(app_dir);
        if let Some(prefix) = &config.install_prefix {
            locator.install_prefix = PathBuf::from(prefix);
        }
        locator.extra_dirs = config.extra_dirs.iter().map(PathBuf::from).collect();
        if let Some(fallback) = config.bundle_fallback {
            locator.bundle_fallback = fallback;
        }
        locator
    }

    pub fn with_install_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.install_prefix = prefix.into();
        self
    }

    pub fn with_extra_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extra_dirs.push(dir.into());
        self
    }

    pub fn with_bundle_fallback(mut self, enabled: bool) -> Self {
        self.bundle_fallback = enabled;
        self
    }

    /// Directories scanned, in order. May contain duplicates and missing paths.
    ///
    /// 1. the application directory (walked up out of an app bundle's
    ///    `Contents/MacOS` when the bundle fallback is on)
    /// 2. `<install prefix>/lib`
    /// 3. `lib64` next to the directory from step 1
    /// 4. the application directory as given
    /// 5. configured extra directories
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        let base = self.base_dir();

        let mut dirs = vec![base.clone(), self.install_prefix.join("lib")];
        if let Some(parent) = base.parent() {
            dirs.push(parent.join("lib64"));
        }
        dirs.push(self.app_dir.clone());
        dirs.extend(self.extra_dirs.iter().cloned());
        dirs
    }

    fn base_dir(&self) -> PathBuf {
        if self.bundle_fallback
            && self.app_dir.file_name().is_some_and(|name| name == "MacOS")
            && let Some(bundle_parent) = self.app_dir.ancestors().nth(3)
        {
            return bundle_parent.to_path_buf();
        }
        self.app_dir.clone()
    }

    /// Find candidate plugin libraries.
    ///
    /// Paths are absolute and keep the file name that matched, even when it
    /// is a symlink. Two paths resolving to the same file count once. Order
    /// is by search directory then file name. Never fails: unreadable
    /// or missing directories are skipped.
    pub fn find_plugin_factories(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut paths = Vec::new();

        for dir in self.search_dirs() {
            debug!(dir = %dir.display(), "checking directory for account plugins");
            for path in plugin_files_in(&dir) {
                let absolute = std::path::absolute(&path).unwrap_or(path);
                // Dedup on the resolved file, but report the matched name.
                let key = std::fs::canonicalize(&absolute).unwrap_or_else(|_| absolute.clone());
                if seen.insert(key) {
                    paths.push(absolute);
                }
            }
        }

        paths
    }
}

/// Matching regular files directly inside `dir`, sorted by name.
fn plugin_files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file() || t.is_symlink()))
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(is_plugin_file_name)
        })
        .collect();
    files.sort();
    files
}
