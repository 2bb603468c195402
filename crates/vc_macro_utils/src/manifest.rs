use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// The parsed `Cargo.toml` of the crate invoking a proc-macro.
///
/// Derive macros emit absolute paths into the invoking crate, and that crate
/// may depend on `vc_field` directly or only through the `vc_probe` umbrella.
/// [`get_crate_path`](Manifest::get_crate_path) picks the path that resolves.
///
/// # Example
///
/// ```rust
/// # use vc_macro_utils::Manifest;
/// let p: syn::Path = Manifest::shared(|m| m.get_crate_path("vc_field"));
/// ```
///
/// Reading the manifest touches the file system, so the caller should resolve
/// a path once per macro invocation and pass it along.
///
/// # Resolution rules
///
/// 1. If the requested crate is listed in `dependencies`, return `::crate_name`.
/// 2. If the requested crate name begins with `vc_` and the target crate
///    depends on `vc_probe`, return `::vc_probe::short_name`
///    (e.g. `vc_field` -> `::vc_probe::field`).
/// 3. Repeat step 1-2 in `dev-dependencies`.
/// 4. Otherwise, fall back to the absolute path `::crate_name`.
///
/// ## Note
///
/// A crate that derives on its own types (e.g. `vc_field` in its tests)
/// hits rule 4; adding `extern crate self as vc_field;` to its root makes the
/// fallback path valid.
#[derive(Debug)]
pub struct Manifest {
    pub manifest: Document<Box<str>>,
    pub modified_time: SystemTime,
}

const UMBRELLA_NAME: &str = "vc_probe";
const CRATE_PREFIX: &str = "vc_";
const DEPENDENCY_TABLES: [&str; 2] = ["dependencies", "dev-dependencies"];

impl Manifest {
    /// Parse a manifest from its text.
    ///
    /// # Panics
    ///
    /// Panics if `text` is not valid TOML.
    pub fn parse(text: &str, modified_time: SystemTime) -> Self {
        let manifest = Document::parse(Box::from(text))
            .unwrap_or_else(|err| panic!("Failed to parse cargo manifest: {err}"));
        Self {
            manifest,
            modified_time,
        }
    }

    #[inline(never)]
    fn caller_manifest_path() -> PathBuf {
        let Some(dir) = env::var_os("CARGO_MANIFEST_DIR") else {
            panic!("CARGO_MANIFEST_DIR should be auto-defined by cargo.");
        };
        let path = PathBuf::from(dir).join("Cargo.toml");
        assert!(
            path.is_file(),
            "Cargo manifest does not exist at path {}",
            path.display(),
        );
        path
    }

    #[inline(never)]
    fn load(path: &Path, modified_time: SystemTime) -> Self {
        let text = std::fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("Unable to read cargo manifest: {}", path.display()));
        Self::parse(&text, modified_time)
    }

    fn dependency_path(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(absolute_path(&[name]));
        }
        let module = name.strip_prefix(CRATE_PREFIX)?;
        deps.contains_key(UMBRELLA_NAME)
            .then(|| absolute_path(&[UMBRELLA_NAME, module]))
    }

    /// Return a [`syn::Path`] for the package named `name` as resolved from this
    /// crate's Cargo.toml. See the type-level documentation for the resolution
    /// order.
    #[inline(never)]
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        DEPENDENCY_TABLES
            .iter()
            .filter_map(|table| match self.manifest.get(table) {
                Some(Item::Table(deps)) => Some(deps),
                _ => None,
            })
            .find_map(|deps| Self::dependency_path(deps, name))
            .unwrap_or_else(|| absolute_path(&[name]))
    }

    /// Run `func` with the [`Manifest`] of the caller's Cargo.toml.
    ///
    /// The parsed manifest is cached per path and re-read only when the file's
    /// modification time changes.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let path = Self::caller_manifest_path();
        let modified_time = std::fs::metadata(&path)
            .and_then(|metadata| metadata.modified())
            .unwrap_or_else(|_| panic!("Unable to stat cargo manifest: {}", path.display()));

        {
            let cache = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(manifest) = cache.get(&path)
                && manifest.modified_time == modified_time
            {
                return func(manifest);
            }
        }

        let manifest = Self::load(&path, modified_time);
        let result = func(&manifest);

        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);

        result
    }
}

/// Build `::a::b` from its segments.
fn absolute_path(segments: &[&str]) -> syn::Path {
    let text = format!("::{}", segments.join("::"));
    syn::parse_str(&text).unwrap_or_else(|_| panic!("`{text}` is not a valid path"))
}
