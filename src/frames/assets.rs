use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::UVec2;

use super::{FrameSource, MonoBitmap, Threshold};
use crate::error::{Error, Result};
use crate::pet::ClipCatalog;

/// Loads frames from `<root>/<clip>/frame_<index>.png`.
///
/// Each frame is converted to 8-bit luma, thresholded to 1-bit, and centered
/// on a white canvas of the configured size.
#[derive(Debug, Clone)]
pub struct AssetFrames {
    root: PathBuf,
    canvas: UVec2,
    threshold: Threshold,
}

impl AssetFrames {
    pub fn new(root: impl Into<PathBuf>, canvas: UVec2, threshold: Threshold) -> Self {
        Self {
            root: root.into(),
            canvas,
            threshold,
        }
    }

    pub fn frame_path(&self, clip: &str, index: u32) -> PathBuf {
        self.root.join(clip).join(format!("frame_{index}.png"))
    }

    fn threshold(&self, path: &Path) -> Result<MonoBitmap> {
        let luma = image::open(path)
            .map_err(|source| Error::AssetDecode {
                path: path.to_path_buf(),
                source,
            })?
            .to_luma8();

        let mut bw = MonoBitmap::blank(luma.width(), luma.height());
        for (x, y, px) in luma.enumerate_pixels() {
            if self.threshold.is_black(px.0[0]) {
                bw.set_black(x, y, true);
            }
        }
        Ok(bw)
    }
}

impl FrameSource for AssetFrames {
    fn load_frame(&self, clip: &str, index: u32) -> Result<MonoBitmap> {
        let path = self.frame_path(clip, index);
        if !path.is_file() {
            return Err(Error::AssetMissing {
                clip: clip.to_owned(),
                index,
                path,
            });
        }
        let bw = self.threshold(&path)?;
        if bw.ink() == 0 {
            log::warn!("{} has no black pixels after thresholding", path.display());
        }
        Ok(MonoBitmap::centered(self.canvas.x, self.canvas.y, &bw))
    }
}

/// Every catalog frame decoded up front. Startup fails on the first missing
/// asset instead of mid-animation; lookups never touch the disk afterwards.
pub struct FrameCache<S> {
    frames: HashMap<(String, u32), MonoBitmap>,
    source: S,
}

impl<S: FrameSource> FrameCache<S> {
    pub fn preload(source: S, catalog: &ClipCatalog) -> Result<Self> {
        let mut frames = HashMap::new();
        for spec in catalog.clips() {
            for index in 0..spec.frame_count {
                let bitmap = source.load_frame(&spec.name, index)?;
                frames.insert((spec.name.clone(), index), bitmap);
            }
        }
        let cache = Self { frames, source };
        log::info!(
            "Preloaded {} frames across {} clips",
            cache.frame_count(),
            catalog.len()
        );
        Ok(cache)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl<S: FrameSource> FrameSource for FrameCache<S> {
    fn load_frame(&self, clip: &str, index: u32) -> Result<MonoBitmap> {
        match self.frames.get(&(clip.to_owned(), index)) {
            Some(bitmap) => Ok(bitmap.clone()),
            // Not in the catalog; let the source produce the proper error.
            None => self.source.load_frame(clip, index),
        }
    }
}
