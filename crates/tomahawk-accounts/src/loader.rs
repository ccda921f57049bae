// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Account plugin loading.
//!
//! Each candidate path from the locator goes through three steps:
//!
//! 1. [`is_library`]: a cheap extension and magic-number check, so that
//!    stray files never reach the dynamic loader.
//! 2. [`PluginLoader::load`]: open the library, check its ABI version, and
//!    call its factory entry point.
//! 3. Registration in the [`FactoryRegistry`] under the factory's own id.
//!
//! A failing candidate is logged and skipped; it never aborts discovery.

use std::io::Read;
use std::path::{Path, PathBuf};

use libloading::Library;
use tomahawk_core::traits::{AbiVersionFn, FactoryEntryFn};
use tomahawk_core::{
    ACCOUNT_PLUGIN_ABI_VERSION, AccountFactory, PLUGIN_ABI_SYMBOL, PLUGIN_ENTRY_SYMBOL,
    TomahawkError,
};
use tracing::{debug, info, warn};

use crate::locator::LIBRARY_EXTENSIONS;
use crate::registry::FactoryRegistry;

const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
const MACHO_MAGICS: [[u8; 4]; 6] = [
    [0xfe, 0xed, 0xfa, 0xce],
    [0xce, 0xfa, 0xed, 0xfe],
    [0xfe, 0xed, 0xfa, 0xcf],
    [0xcf, 0xfa, 0xed, 0xfe],
    [0xca, 0xfe, 0xba, 0xbe],
    [0xbe, 0xba, 0xfe, 0xca],
];
const PE_MAGIC: [u8; 2] = *b"MZ";

/// Returns true if `path` looks like a native shared library.
///
/// Accepts `.so` (including versioned `.so.N`), `.dylib` and `.dll` files
/// whose first bytes carry an ELF, Mach-O or PE signature.
pub fn is_library(path: &Path) -> bool {
    if !has_library_extension(path) {
        return false;
    }

    let mut header = [0u8; 4];
    let read = match std::fs::File::open(path).and_then(|mut f| f.read(&mut header)) {
        Ok(n) => n,
        Err(_) => return false,
    };
    let header = &header[..read];

    header == ELF_MAGIC
        || MACHO_MAGICS.iter().any(|magic| header == magic)
        || header.starts_with(&PE_MAGIC)
}

fn has_library_extension(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if LIBRARY_EXTENSIONS
        .iter()
        .any(|ext| path.extension().is_some_and(|e| e == *ext))
    {
        return true;
    }
    // libfoo.so.1 / libfoo.so.1.2
    match name.split_once(".so.") {
        Some((_, version)) => version
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit())),
        None => false,
    }
}

/// A factory freshly obtained from a plugin, with the library that backs it.
pub struct LoadedFactory {
    pub factory: Box<dyn AccountFactory>,
    /// Keeps the code behind `factory` mapped. `None` for built-in factories.
    pub library: Option<Library>,
}

impl std::fmt::Debug for LoadedFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFactory")
            .field("factory_id", &self.factory.factory_id())
            .field("dynamic", &self.library.is_some())
            .finish()
    }
}

/// Turns a candidate path into an account factory.
pub trait PluginLoader {
    fn load(&self, path: &Path) -> Result<LoadedFactory, TomahawkError>;
}

/// Loads account plugins from shared libraries via `libloading`.
#[derive(Debug, Clone)]
pub struct DynamicLoader {
    abi_version: u32,
}

impl DynamicLoader {
    pub fn new() -> Self {
        Self {
            abi_version: ACCOUNT_PLUGIN_ABI_VERSION,
        }
    }
}

impl Default for DynamicLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginLoader for DynamicLoader {
    fn load(&self, path: &Path) -> Result<LoadedFactory, TomahawkError> {
        // SAFETY: account plugins are trusted native code installed next to
        // the application. The entry point is only called once the ABI
        // version matches the trait layout this build expects.
        unsafe {
            let library = Library::new(path).map_err(|e| TomahawkError::PluginLoad {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

            let found = {
                let abi: libloading::Symbol<AbiVersionFn> = library
                    .get(PLUGIN_ABI_SYMBOL.as_bytes())
                    .map_err(|e| TomahawkError::InvalidPlugin {
                        path: path.to_path_buf(),
                        message: format!("missing `{PLUGIN_ABI_SYMBOL}`: {e}"),
                    })?;
                abi()
            };
            if found != self.abi_version {
                return Err(TomahawkError::AbiMismatch {
                    path: path.to_path_buf(),
                    expected: self.abi_version,
                    found,
                });
            }

            let factory = {
                let entry: libloading::Symbol<FactoryEntryFn> = library
                    .get(PLUGIN_ENTRY_SYMBOL.as_bytes())
                    .map_err(|e| TomahawkError::InvalidPlugin {
                        path: path.to_path_buf(),
                        message: format!("missing `{PLUGIN_ENTRY_SYMBOL}`: {e}"),
                    })?;
                entry()
            };

            Ok(LoadedFactory {
                factory,
                library: Some(library),
            })
        }
    }
}

/// Two plugins reported the same factory id; the later one replaced the earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryCollision {
    pub factory_id: String,
    pub replaced: Option<PathBuf>,
    pub by: PathBuf,
}

/// Outcome of loading a batch of candidates.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// `(factory id, path)` for every registered factory, in load order.
    pub loaded: Vec<(String, PathBuf)>,
    /// Candidates that failed to load, with the reason.
    pub failures: Vec<(PathBuf, TomahawkError)>,
    /// Candidates rejected by the library pre-check.
    pub skipped: Vec<PathBuf>,
    pub collisions: Vec<FactoryCollision>,
}

/// Load every candidate into `registry`.
///
/// Never fails as a whole: bad candidates end up in the report.
pub fn load_plugin_factories(
    paths: &[PathBuf],
    loader: &dyn PluginLoader,
    registry: &mut FactoryRegistry,
) -> LoadReport {
    let mut report = LoadReport::default();

    for path in paths {
        if !is_library(path) {
            debug!(path = %path.display(), "not a loadable library, skipping");
            report.skipped.push(path.clone());
            continue;
        }

        debug!(path = %path.display(), "trying to load account plugin");
        let loaded = match loader.load(path) {
            Ok(loaded) => loaded,
            Err(error) => {
                warn!(path = %path.display(), %error, "error loading account plugin");
                report.failures.push((path.clone(), error));
                continue;
            }
        };

        let factory_id = loaded.factory.factory_id().to_string();
        info!(
            path = %path.display(),
            factory_id = %factory_id,
            pretty_name = loaded.factory.pretty_name(),
            "loaded account plugin factory"
        );

        if let Some(previous) = registry.register(loaded, Some(path.clone())) {
            let replaced = previous.path().map(Path::to_path_buf);
            warn!(
                factory_id = %factory_id,
                replaced = ?replaced,
                by = %path.display(),
                "duplicate account factory id, last loaded wins"
            );
            report.collisions.push(FactoryCollision {
                factory_id: factory_id.clone(),
                replaced,
                by: path.clone(),
            });
        }
        report.loaded.push((factory_id, path.clone()));
    }

    report
}
