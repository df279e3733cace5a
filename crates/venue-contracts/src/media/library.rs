use super::MediaAsset;

/// Insertion-ordered collection of uploaded assets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaLibrary {
    assets: Vec<MediaAsset>,
}

impl MediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, asset: MediaAsset) {
        self.assets.push(asset);
    }

    pub fn extend(&mut self, assets: impl IntoIterator<Item = MediaAsset>) {
        self.assets.extend(assets);
    }

    /// Removes the asset at `index`, shifting later assets down by one.
    /// Out-of-range indices leave the library untouched.
    pub fn remove(&mut self, index: usize) -> Option<MediaAsset> {
        if index >= self.assets.len() {
            return None;
        }
        Some(self.assets.remove(index))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn assets(&self) -> &[MediaAsset] {
        self.assets.as_slice()
    }
}

impl FromIterator<MediaAsset> for MediaLibrary {
    fn from_iter<I: IntoIterator<Item = MediaAsset>>(iter: I) -> Self {
        Self {
            assets: iter.into_iter().collect(),
        }
    }
}
