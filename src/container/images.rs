//! Decoded images and their location index.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// One decoded image stored in a scratch directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
    /// Reference token used by the transcript (`Content-Location` / `src`)
    pub location: String,
    /// Hex digest of the decoded bytes
    pub hash: String,
    /// Normalized extension, e.g. `jpg`
    pub extension: String,
    /// Where the decoded bytes live
    pub path: PathBuf,
}

impl ImageAsset {
    /// Creates an asset stored as `<hash>.<extension>` inside `dir`.
    pub fn new(
        location: impl Into<String>,
        hash: impl Into<String>,
        extension: impl Into<String>,
        dir: &Path,
    ) -> Self {
        let hash = hash.into();
        let extension = extension.into();
        let path = dir.join(format!("{hash}.{extension}"));
        Self {
            location: location.into(),
            hash,
            extension,
            path,
        }
    }

    /// Content-addressed filename, `<hash>.<extension>`.
    pub fn filename(&self) -> String {
        format!("{}.{}", self.hash, self.extension)
    }

    /// Path relative to an output directory, `images/<filename>`.
    pub fn relative_path(&self) -> String {
        format!("images/{}", self.filename())
    }
}

/// Images of one source in the order their parts appeared.
///
/// A location key seen twice keeps its original position but points at the
/// later asset.
#[derive(Debug, Clone, Default)]
pub struct ImageMap {
    assets: Vec<ImageAsset>,
    by_location: HashMap<String, usize>,
}

impl ImageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an asset under its location key.
    pub fn insert(&mut self, asset: ImageAsset) {
        if let Some(&index) = self.by_location.get(&asset.location) {
            self.assets[index] = asset;
        } else {
            self.by_location
                .insert(asset.location.clone(), self.assets.len());
            self.assets.push(asset);
        }
    }

    /// Looks up the asset referenced by `location`.
    pub fn get(&self, location: &str) -> Option<&ImageAsset> {
        self.by_location.get(location).map(|&i| &self.assets[i])
    }

    /// Looks up the stored filename for `location`.
    pub fn filename(&self, location: &str) -> Option<String> {
        self.get(location).map(ImageAsset::filename)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageAsset> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl<'a> IntoIterator for &'a ImageMap {
    type Item = &'a ImageAsset;
    type IntoIter = std::slice::Iter<'a, ImageAsset>;

    fn into_iter(self) -> Self::IntoIter {
        self.assets.iter()
    }
}
