use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use proc_macro2::Span;
use toml_edit::{Document, Item, Table};

const FACADE_NAME: &str = "stow";
const FACADE_PREFIX: &str = "stow_";

/// The caller's `Cargo.toml`, used to find how a `stow` crate is reachable
/// from the code a proc-macro expands into.
///
/// # Resolution rules
///
/// For a requested crate such as `stow_persist`:
///
/// 1. listed in `dependencies` → `::stow_persist`;
/// 2. the facade `stow` is listed in `dependencies` → `::stow::persist`;
/// 3. rules 1 and 2 again against `dev-dependencies`;
/// 4. otherwise `::stow_persist`.
///
/// A crate that expands macros inside itself should declare
/// `extern crate self as stow_persist;` so the fallback path resolves.
///
/// ```rust
/// # use stow_macro_utils::Manifest;
/// let path: syn::Path = Manifest::shared(|m| m.get_crate_path("stow_persist"));
/// ```
#[derive(Debug)]
pub struct Manifest {
    document: Option<Document<Box<str>>>,
    modified_time: Option<SystemTime>,
}

impl Manifest {
    fn manifest_path() -> Option<PathBuf> {
        let mut path = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR")?);
        path.push("Cargo.toml");
        Some(path)
    }

    fn load(path: Option<&PathBuf>) -> Self {
        let Some(path) = path else {
            return Self {
                document: None,
                modified_time: None,
            };
        };
        let modified_time = std::fs::metadata(path).and_then(|m| m.modified()).ok();
        let document = std::fs::read_to_string(path)
            .ok()
            .and_then(|text| Document::parse(text.into_boxed_str()).ok());
        Self {
            document,
            modified_time,
        }
    }

    fn parse_path(text: &str) -> Option<syn::Path> {
        syn::parse_str(text).ok()
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Self::parse_path(&format!("::{name}"));
        }
        let module = name.strip_prefix(FACADE_PREFIX)?;
        if deps.contains_key(FACADE_NAME) {
            return Self::parse_path(&format!("::{FACADE_NAME}::{module}"));
        }
        None
    }

    fn find_in_table(&self, table: &str, name: &str) -> Option<syn::Path> {
        match self.document.as_ref()?.get(table) {
            Some(Item::Table(deps)) => Self::find_in_deps(deps, name),
            _ => None,
        }
    }

    /// Returns the path of the crate `name` as seen from the caller.
    ///
    /// See the type-level documentation for the resolution order.
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        self.find_in_table("dependencies", name)
            .or_else(|| self.find_in_table("dev-dependencies", name))
            .unwrap_or_else(|| {
                let mut path = syn::Path::from(syn::Ident::new(name, Span::call_site()));
                path.leading_colon = Some(Default::default());
                path
            })
    }

    /// Runs `func` against the caller's manifest.
    ///
    /// Parsed manifests are cached per path and re-read when the file's
    /// modification time changes.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let path = Self::manifest_path();
        let modified_time = path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).and_then(|m| m.modified()).ok());

        if let Some(path) = &path {
            let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(manifest) = manifests.get(path)
                && manifest.modified_time == modified_time
            {
                return func(manifest);
            }
        }

        let manifest = Self::load(path.as_ref());
        let result = func(&manifest);

        if let Some(path) = path {
            MANIFESTS
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(path, manifest);
        }
        result
    }
}
