//! Template document: load, bind, substitute, save

use crate::error::{Result, TemplateError};
use crate::options::{TemplateOptions, UnresolvedPolicy};
use crate::placeholder::{key_path_of, PlaceholderScan};
use keypath::{render_value, Bindings, KeyPathResolver, PathResolver, Value};
use regex_lite::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use store::{ArchiveStore, ZipStore, MAIN_DOCUMENT_PART};
use tempfile::TempPath;

/// A Word template loaded from disk
///
/// The source file is copied into a private working copy on open and never
/// modified. Each save writes a fresh archive next to the destination and
/// moves it into place only after it has been written completely, so a
/// failed save leaves the destination as it was. The working copy is removed
/// when the document is dropped.
pub struct TemplateDocument<S: ArchiveStore = ZipStore, R: KeyPathResolver = PathResolver> {
    source_path: PathBuf,
    working_copy: TempPath,
    main_part_name: String,
    main_part: String,
    bindings: Bindings,
    options: TemplateOptions,
    store: S,
    resolver: R,
}

impl TemplateDocument {
    /// Open a template with default options
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, TemplateOptions::default())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: TemplateOptions) -> Result<Self> {
        Self::open_with(path, options, ZipStore::new(), PathResolver)
    }
}

impl<S: ArchiveStore, R: KeyPathResolver> TemplateDocument<S, R> {
    /// Open a template using a specific archive store and resolver
    pub fn open_with(
        path: impl AsRef<Path>,
        options: TemplateOptions,
        store: S,
        resolver: R,
    ) -> Result<Self> {
        let source_path = path.as_ref().to_path_buf();
        let working_copy = store::create_working_copy(&source_path, options.temp_dir.as_deref())?;

        let mut handle = store.open(&working_copy)?;
        let read = read_main_part(&store, &mut handle, &options);
        let closed = store.close(handle);
        let (main_part_name, bytes) = read?;
        closed?;

        let main_part = String::from_utf8(bytes)?;

        tracing::info!(
            "Opened template {} (main part {}, {} placeholders)",
            source_path.display(),
            main_part_name,
            PlaceholderScan::new(&main_part).len()
        );

        Ok(Self {
            source_path,
            working_copy,
            main_part_name,
            main_part,
            bindings: Bindings::new(),
            options,
            store,
            resolver,
        })
    }

    /// Bind a value to a key, replacing any earlier value for the same key
    pub fn assign(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        if self.bindings.insert(key.clone(), value).is_some() {
            tracing::debug!("Rebound template variable {}", key);
        }
        self
    }

    /// Bind any serializable value; structs become nested objects
    pub fn assign_serialized<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<&mut Self> {
        let value = serde_json::to_value(value)?;
        Ok(self.assign(key, value))
    }

    /// Bind every pair in order
    pub fn assign_multiple<I, K, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in values {
            self.assign(key, value);
        }
        self
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Distinct placeholder key paths in the main part, in document order
    pub fn placeholders(&self) -> Vec<String> {
        PlaceholderScan::new(&self.main_part)
            .distinct()
            .into_iter()
            .map(|token| key_path_of(token).to_string())
            .collect()
    }

    /// Current main part text
    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    pub fn main_part_name(&self) -> &str {
        &self.main_part_name
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn working_copy_path(&self) -> &Path {
        &self.working_copy
    }

    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Replace text in the main part verbatim, returning the match count
    ///
    /// With `use_regex` the search string is a regular expression and the
    /// replacement may reference groups as `$1` or `${name}`.
    pub fn replace_raw(&mut self, search: &str, replace: &str, use_regex: bool) -> Result<usize> {
        let count = if use_regex {
            let regex = Regex::new(search).map_err(|e| TemplateError::InvalidPattern(e.to_string()))?;
            let count = regex.find_iter(&self.main_part).count();
            if count > 0 {
                self.main_part = regex.replace_all(&self.main_part, replace).into_owned();
            }
            count
        } else {
            if search.is_empty() {
                return Ok(0);
            }
            let count = self.main_part.matches(search).count();
            if count > 0 {
                self.main_part = self.main_part.replace(search, replace);
            }
            count
        };

        tracing::debug!("Raw replacement of {:?} matched {} times", search, count);
        Ok(count)
    }

    /// Main part text with every placeholder substituted
    ///
    /// Each distinct placeholder is resolved once; all its occurrences get
    /// the same text.
    pub fn render(&self) -> Result<String> {
        let scan = PlaceholderScan::new(&self.main_part);
        if scan.is_empty() {
            return Ok(self.main_part.clone());
        }

        let distinct = scan.distinct();
        let mut values: HashMap<&str, String> = HashMap::with_capacity(distinct.len());

        for token in distinct {
            let key_path = key_path_of(token);
            let text = match self
                .resolver
                .resolve(key_path, &self.bindings, self.options.case_insensitive)
            {
                Some(value) => render_value(value),
                None => match self.options.unresolved {
                    UnresolvedPolicy::Blank => {
                        tracing::warn!("No value bound for placeholder {}", token);
                        String::new()
                    }
                    UnresolvedPolicy::Fail => {
                        return Err(TemplateError::UnresolvedPlaceholder(key_path.to_string()));
                    }
                },
            };

            let text = if self.options.escape_values {
                store::docx::escape_xml(&text).into_owned()
            } else {
                text
            };
            values.insert(token, text);
        }

        Ok(scan.substitute(&values))
    }

    /// Substitute placeholders and write the document to `destination`
    ///
    /// An existing file at `destination` is replaced and keeps its
    /// permissions. On failure nothing is left at `destination` that was not
    /// there before. The document stays usable and may be saved again.
    ///
    /// The working copy is not moved to `destination`: it stays at
    /// [`working_copy_path`](Self::working_copy_path) until the document is
    /// dropped, and each save writes a fresh copy of it.
    pub fn save(&mut self, destination: impl AsRef<Path>) -> Result<()> {
        let destination = destination.as_ref();
        let rendered = self.render()?;

        let staged = self.build_output(destination, &rendered)?;
        store::persist_to(staged, destination)?;

        self.main_part = rendered;
        tracing::info!("Saved {} to {}", self.source_path.display(), destination.display());
        Ok(())
    }

    /// Substitute placeholders and stream the finished archive into `writer`
    pub fn write_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> Result<u64> {
        let rendered = self.render()?;

        let staged = self.build_output(&self.working_copy, &rendered)?;
        let mut file = File::open(&staged)?;
        let written = std::io::copy(&mut file, writer)?;
        writer.flush()?;

        self.main_part = rendered;
        tracing::debug!("Streamed {} bytes of {}", written, self.source_path.display());
        Ok(written)
    }

    /// Write a finished archive into a temporary file beside `beside`
    fn build_output(&self, beside: &Path, rendered: &str) -> Result<TempPath> {
        let staged = store::stage_beside(&self.working_copy, beside)?;

        let mut handle = self.store.open(&staged)?;
        self.store
            .write_entry(&mut handle, &self.main_part_name, rendered.as_bytes())?;
        self.store.close(handle)?;

        Ok(staged)
    }
}

impl<S: ArchiveStore, R: KeyPathResolver> std::fmt::Debug for TemplateDocument<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateDocument")
            .field("source_path", &self.source_path)
            .field("working_copy", &self.working_copy.to_path_buf())
            .field("main_part_name", &self.main_part_name)
            .field("bindings", &self.bindings.len())
            .field("options", &self.options)
            .finish()
    }
}

fn read_main_part<S: ArchiveStore>(
    store: &S,
    handle: &mut S::Handle,
    options: &TemplateOptions,
) -> Result<(String, Vec<u8>)> {
    let name = match &options.main_part {
        Some(name) => name.clone(),
        None => discover_main_part(store, handle),
    };
    let bytes = store.read_entry(handle, &name)?;
    Ok((name, bytes))
}

/// Main part named by the package relationships, or the conventional name
fn discover_main_part<S: ArchiveStore>(store: &S, handle: &mut S::Handle) -> String {
    let rels = match store.read_entry(handle, store::docx::ROOT_RELS_PART) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("No package relationships ({}), using {}", e, MAIN_DOCUMENT_PART);
            return MAIN_DOCUMENT_PART.to_string();
        }
    };

    match store::docx::main_document_part(&String::from_utf8_lossy(&rels)) {
        Ok(Some(name)) => name,
        Ok(None) => MAIN_DOCUMENT_PART.to_string(),
        Err(e) => {
            tracing::warn!("Unreadable package relationships: {}", e);
            MAIN_DOCUMENT_PART.to_string()
        }
    }
}
