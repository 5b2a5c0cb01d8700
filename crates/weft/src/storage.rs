// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Component and template storage.
//!
//! [`Storage`] serves component definitions and template sources from a
//! directory tree through three independent TTL caches (parsed
//! definitions, parsed templates, raw file content). Two freshness
//! mechanisms run side by side:
//!
//! - entries expire after the configured TTL, with a background sweep
//!   dropping expired entries on the cleanup interval;
//! - with watching enabled, any filesystem change event evicts the
//!   changed path from all three caches, so the next access re-reads
//!   the file regardless of TTL.
//!
//! Every access resolves to an absolute path that must stay inside the
//! configured root; references that escape it fail instead of reading.
//! Read and parse failures are returned to the caller and never cached,
//! so a later call retries the read.
//!
//! # Examples
//!
//! ```rust,ignore
//! use weft::StorageOptions;
//!
//! let storage = StorageOptions::new("./components").watch(true).open()?;
//! let component = storage.component("pages.home")?;
//! ```

use std::fs;
use std::io;
use std::path::{Component as PathPart, Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::cache::TtlCache;
use crate::component::{name_to_path, Component};
use crate::error::{Result, WeftError};
use crate::template::Template;
use crate::watcher::Watcher;
use crate::whitespace;

/// Storage configuration.
///
/// Defaults: 5 minute cache expiration, 1 minute cleanup interval, no
/// whitespace normalization, no watching.
#[derive(Debug, Clone)]
pub struct StorageOptions {
    root: PathBuf,
    cache_expiration: Duration,
    cleanup_interval: Duration,
    remove_whitespace: bool,
    watch: bool,
}

impl StorageOptions {
    /// Creates options for a component root directory.
    pub fn new(root: impl Into<PathBuf>) -> StorageOptions {
        StorageOptions {
            root: root.into(),
            cache_expiration: Duration::from_secs(5 * 60),
            cleanup_interval: Duration::from_secs(60),
            remove_whitespace: false,
            watch: false,
        }
    }

    /// Sets cache entry time-to-live.
    pub fn cache_expiration(mut self, ttl: Duration) -> StorageOptions {
        self.cache_expiration = ttl;
        self
    }

    /// Sets the expired-entry sweep interval.
    pub fn cleanup_interval(mut self, interval: Duration) -> StorageOptions {
        self.cleanup_interval = interval;
        self
    }

    /// Enables whitespace normalization of raw files before caching.
    pub fn remove_whitespace(mut self, enable: bool) -> StorageOptions {
        self.remove_whitespace = enable;
        self
    }

    /// Enables watching the root for changes. Changed paths are evicted
    /// from all caches so the next access reflects the new content.
    pub fn watch(mut self, enable: bool) -> StorageOptions {
        self.watch = enable;
        self
    }

    /// Opens the storage. Shorthand for [`Storage::open`].
    pub fn open(self) -> Result<Storage> {
        Storage::open(self)
    }
}

/// Cached access to component definitions and template files under a
/// component root directory.
#[derive(Debug)]
pub struct Storage {
    inner: Arc<StorageInner>,
    watcher: Mutex<Option<Watcher>>,
    sweeper: Mutex<Option<Sweeper>>,
}

#[derive(Debug)]
struct StorageInner {
    root: PathBuf,
    remove_whitespace: bool,
    components: TtlCache<Arc<Component>>,
    templates: TtlCache<Template>,
    files: TtlCache<Arc<str>>,
}

impl Storage {
    /// Opens component storage rooted at the configured directory.
    ///
    /// Fails when the root cannot be resolved or, with watching
    /// enabled, when the filesystem watch cannot be established.
    pub fn open(opts: StorageOptions) -> Result<Storage> {
        let root = fs::canonicalize(&opts.root)?;
        let inner = Arc::new(StorageInner {
            root,
            remove_whitespace: opts.remove_whitespace,
            components: TtlCache::new(opts.cache_expiration),
            templates: TtlCache::new(opts.cache_expiration),
            files: TtlCache::new(opts.cache_expiration),
        });

        let sweeper = Sweeper::start(Arc::clone(&inner), opts.cleanup_interval);
        let watcher = if opts.watch {
            let caches = Arc::clone(&inner);
            Some(Watcher::start(&inner.root, move |path| {
                caches.invalidate(path);
            })?)
        } else {
            None
        };

        Ok(Storage {
            inner,
            watcher: Mutex::new(watcher),
            sweeper: Mutex::new(Some(sweeper)),
        })
    }

    /// Root directory the storage serves.
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Returns a component definition by name.
    ///
    /// Dots in the name map to path separators; the definition is read
    /// from `component.json` or `component.yaml` under the component's
    /// directory. A definition that omits its `name` inherits the
    /// lookup name. Parsed definitions are cached by definition path.
    pub fn component(&self, name: &str) -> Result<Arc<Component>> {
        let dir = self.resolve(&name_to_path(name))?;
        let candidates = [dir.join("component.json"), dir.join("component.yaml")];
        for path in &candidates {
            if let Some(cached) = self.inner.components.get(path) {
                return Ok(cached);
            }
        }
        for path in &candidates {
            match self.load_component(path, name) {
                Ok(component) => {
                    self.inner
                        .components
                        .insert(path.clone(), Arc::clone(&component));
                    return Ok(component);
                }
                Err(WeftError::NotFound(_)) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(WeftError::NotFound(format!("component {name:?}")))
    }

    /// Returns a parsed template by path relative to the root.
    ///
    /// Parsed templates are cached by absolute path; a cached entry is
    /// returned until it expires or the file changes.
    pub fn template(&self, path: &Path) -> Result<Template> {
        let path = self.resolve(path)?;
        if let Some(cached) = self.inner.templates.get(&path) {
            return Ok(cached);
        }
        let body = self.read(&path)?;
        let template = Template::parse(&body)?;
        self.inner.templates.insert(path, template.clone());
        Ok(template)
    }

    /// Returns raw file content as a literal-text template. The file is
    /// never parsed as a template.
    pub fn text(&self, path: &Path) -> Result<Template> {
        let path = self.resolve(path)?;
        let body = self.read(&path)?;
        Ok(Template::text(body))
    }

    /// Evicts a path from all caches.
    pub fn invalidate(&self, path: &Path) {
        self.inner.invalidate(path);
    }

    /// Drops all cached state.
    pub fn flush_cache(&self) {
        self.inner.flush();
    }

    /// Stops the watcher and sweep threads and drops all cached state.
    pub fn close(&self) {
        if let Ok(mut watcher) = self.watcher.lock() {
            watcher.take();
        }
        if let Ok(mut sweeper) = self.sweeper.lock() {
            sweeper.take();
        }
        self.inner.flush();
    }

    fn load_component(&self, path: &Path, name: &str) -> Result<Arc<Component>> {
        let body = self.read(path)?;
        let mut component: Component = if path.extension().is_some_and(|ext| ext == "yaml") {
            serde_yaml::from_str(&body).map_err(|err| WeftError::Definition {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?
        } else {
            serde_json::from_str(&body).map_err(|err| WeftError::Definition {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?
        };
        if component.name.is_empty() {
            component.name = name.to_string();
        }
        Ok(Arc::new(component))
    }

    /// Resolves a root-relative path to an absolute one, refusing paths
    /// that escape the root.
    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        let normalized = normalize(&self.inner.root.join(path));
        if !normalized.starts_with(&self.inner.root) {
            return Err(WeftError::DisallowedPath(path.to_path_buf()));
        }
        Ok(normalized)
    }

    /// Reads file content, serving the raw-file cache when possible.
    fn read(&self, path: &Path) -> Result<Arc<str>> {
        if let Some(cached) = self.inner.files.get(path) {
            return Ok(cached);
        }
        let body = match fs::read_to_string(path) {
            Ok(body) => body,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(WeftError::NotFound(path.display().to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        let body: Arc<str> = if self.inner.remove_whitespace {
            whitespace::clean(&body).into()
        } else {
            body.into()
        };
        self.inner.files.insert(path.to_path_buf(), Arc::clone(&body));
        Ok(body)
    }
}

impl Drop for Storage {
    fn drop(&mut self) {
        self.close();
    }
}

impl StorageInner {
    fn invalidate(&self, path: &Path) {
        tracing::debug!(path = %path.display(), "cache invalidate");
        self.files.remove(path);
        self.templates.remove(path);
        self.components.remove(path);
    }

    fn flush(&self) {
        self.files.clear();
        self.templates.clear();
        self.components.clear();
    }

    fn purge_expired(&self) {
        self.files.purge_expired();
        self.templates.purge_expired();
        self.components.purge_expired();
    }
}

/// Periodically purges expired cache entries until dropped.
#[derive(Debug)]
struct Sweeper {
    shutdown: Option<mpsc::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Sweeper {
    fn start(inner: Arc<StorageInner>, interval: Duration) -> Sweeper {
        let (shutdown, signal) = mpsc::channel::<()>();
        let thread = thread::spawn(move || loop {
            match signal.recv_timeout(interval) {
                Err(mpsc::RecvTimeoutError::Timeout) => inner.purge_expired(),
                _ => return,
            }
        });
        Sweeper {
            shutdown: Some(shutdown),
            thread: Some(thread),
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.shutdown.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Lexically normalizes a path, resolving `.` and `..` parts without
/// touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for part in path.components() {
        match part {
            PathPart::CurDir => {}
            PathPart::ParentDir => {
                out.pop();
            }
            part => out.push(part.as_os_str()),
        }
    }
    out
}
