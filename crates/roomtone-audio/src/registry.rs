//! Asset-registry contract of the audio engine host.
//!
//! The graph builders consume this trait; the engine host supplies the
//! real implementation. [`MemoryAssetRegistry`] is a faithful in-process
//! stand-in used by tests and headless sessions.

use std::collections::BTreeMap;

use crate::error::AssetError;
use crate::layout::ChannelLayout;
use crate::types::SamplerNodeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Registered from a URL and streamed at playback time.
    Streamed,
    /// Registered from an in-memory capture buffer.
    Buffered,
}

/// A registered playable asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundAsset {
    pub identifier: String,
    pub kind: AssetKind,
    pub layout: Option<ChannelLayout>,
}

pub trait AssetRegistry: Send {
    /// Register a streamed asset. `identifier` of `None` derives one from
    /// the URL. Unreadable or unsupported sources fail here.
    fn register_url(
        &mut self,
        url: &str,
        identifier: Option<&str>,
        layout: Option<ChannelLayout>,
    ) -> Result<SoundAsset, AssetError>;

    /// Register an in-memory buffer, e.g. one block of live capture.
    fn register_buffer(&mut self, data: &[u8], identifier: Option<&str>)
    -> Result<SoundAsset, AssetError>;

    /// Register a composite sound-event asset rooted at a sampler node.
    fn register_event_asset(
        &mut self,
        identifier: &str,
        sampler: SamplerNodeConfig,
    ) -> Result<(), AssetError>;

    fn contains(&self, identifier: &str) -> bool;
}

/// Formats the in-process registry accepts for streamed registration.
const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "flac", "mp3", "ogg", "aiff"];

#[derive(Debug, Default)]
pub struct MemoryAssetRegistry {
    assets: BTreeMap<String, SoundAsset>,
    event_assets: BTreeMap<String, SamplerNodeConfig>,
    next_id: u64,
}

impl MemoryAssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asset(&self, identifier: &str) -> Option<&SoundAsset> {
        self.assets.get(identifier)
    }

    pub fn event_asset(&self, identifier: &str) -> Option<&SamplerNodeConfig> {
        self.event_assets.get(identifier)
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    fn derive_identifier(&mut self, url: &str) -> String {
        let stem = url
            .rsplit('/')
            .next()
            .and_then(|name| name.split('.').next())
            .filter(|stem| !stem.is_empty());
        match stem {
            Some(stem) if !self.assets.contains_key(stem) => stem.to_string(),
            _ => {
                self.next_id += 1;
                format!("asset-{}", self.next_id)
            },
        }
    }

    fn insert(&mut self, asset: SoundAsset) -> Result<SoundAsset, AssetError> {
        if self.assets.contains_key(&asset.identifier) {
            return Err(AssetError::Duplicate {
                identifier: asset.identifier,
            });
        }
        self.assets.insert(asset.identifier.clone(), asset.clone());
        Ok(asset)
    }
}

impl AssetRegistry for MemoryAssetRegistry {
    fn register_url(
        &mut self,
        url: &str,
        identifier: Option<&str>,
        layout: Option<ChannelLayout>,
    ) -> Result<SoundAsset, AssetError> {
        if url.is_empty() {
            return Err(AssetError::Unreadable {
                url: url.to_string(),
            });
        }
        let extension = url.rsplit('.').next().map(str::to_ascii_lowercase);
        let supported = extension
            .as_deref()
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext));
        if !supported {
            return Err(AssetError::UnsupportedFormat {
                url: url.to_string(),
            });
        }
        let identifier = match identifier {
            Some(identifier) => identifier.to_string(),
            None => self.derive_identifier(url),
        };
        self.insert(SoundAsset {
            identifier,
            kind: AssetKind::Streamed,
            layout,
        })
    }

    fn register_buffer(
        &mut self,
        data: &[u8],
        identifier: Option<&str>,
    ) -> Result<SoundAsset, AssetError> {
        if data.is_empty() {
            return Err(AssetError::EmptyBuffer);
        }
        let identifier = match identifier {
            Some(identifier) => identifier.to_string(),
            None => {
                self.next_id += 1;
                format!("buffer-{}", self.next_id)
            },
        };
        self.insert(SoundAsset {
            identifier,
            kind: AssetKind::Buffered,
            layout: None,
        })
    }

    fn register_event_asset(
        &mut self,
        identifier: &str,
        sampler: SamplerNodeConfig,
    ) -> Result<(), AssetError> {
        if self.event_assets.contains_key(identifier) {
            return Err(AssetError::Duplicate {
                identifier: identifier.to_string(),
            });
        }
        self.event_assets.insert(identifier.to_string(), sampler);
        Ok(())
    }

    fn contains(&self, identifier: &str) -> bool {
        self.assets.contains_key(identifier) || self.event_assets.contains_key(identifier)
    }
}
