use std::path::PathBuf;

/// Top-level error for the pet player.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A frame file required by the catalog is absent.
    #[error("missing frame {index} of clip '{clip}' ({path})")]
    AssetMissing {
        clip: String,
        index: u32,
        path: PathBuf,
    },

    #[error("failed to decode {path}")]
    AssetDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("frame sink failed: {0}")]
    Sink(#[from] SinkError),

    #[error("touch sensor failed: {0}")]
    Sensor(#[from] SensorError),

    /// Event loop or window creation failed.
    #[error("preview window: {0}")]
    Window(String),

    /// Physical display mode requested on a platform without panel wiring.
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}

/// Invalid clip catalog contents. Detected once, at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog is missing required clip '{0}'")]
    MissingClip(&'static str),

    #[error("clip '{0}' has zero frames")]
    NoFrames(String),

    #[error("clip '{0}' has a non-positive duration")]
    BadDuration(String),

    #[error("clip '{0}' is defined twice")]
    Duplicate(String),
}

/// A display or window write failed. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("panel bus error: {0}")]
    Bus(String),

    #[error("panel stayed busy for {0:?}")]
    Busy(std::time::Duration),

    #[error("bitmap is {got_w}x{got_h}, panel expects {want_w}x{want_h}")]
    Geometry {
        got_w: u32,
        got_h: u32,
        want_w: u32,
        want_h: u32,
    },

    /// The preview window has been closed.
    #[error("preview window closed")]
    Closed,
}

/// Touch controller failure. Degrades the wake feature, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("touch bus error: {0}")]
    Bus(String),

    #[error("unexpected touch controller id {0:02x?}")]
    UnknownDevice([u8; 4]),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
