pub mod openexr;

use std::fmt;
use std::path::Path;

use crate::error::CodecError;

pub use openexr::{ExrCodec, ExrHeader};

/// Storage type of a channel's samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelType {
    U32,
    F16,
    F32,
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U32 => write!(f, "uint"),
            Self::F16 => write!(f, "half"),
            Self::F32 => write!(f, "float"),
        }
    }
}

/// Channel as listed in a file header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelInfo {
    pub name: String,
    pub pixel_type: PixelType,
}

/// A decoded channel. The buffer is owned by the codec's type and only
/// moved around by the merger, never inspected.
#[derive(Debug)]
pub struct ChannelEntry<B> {
    pub name: String,
    pub pixel_type: PixelType,
    pub buffer: B,
}

/// Image format service used by the merger.
///
/// Headers and buffers are released when dropped.
pub trait Codec: Send + Sync {
    type Header: Send;
    type Buffer: Send;

    /// Open `path` and parse its header.
    fn read_header(&self, path: &Path) -> Result<Self::Header, CodecError>;

    /// Channels described by a parsed header, in file order.
    fn channels(&self, header: &Self::Header) -> Vec<ChannelInfo>;

    /// Decode every channel of the file behind `header`.
    fn decode(
        &self,
        header: &Self::Header,
        path: &Path,
    ) -> Result<Vec<ChannelEntry<Self::Buffer>>, CodecError>;

    /// Write `channels` to `path`, taking dimensions, compression and
    /// attributes from `template`. Channels arrive sorted by name.
    fn encode(
        &self,
        template: &Self::Header,
        channels: Vec<ChannelEntry<Self::Buffer>>,
        path: &Path,
    ) -> Result<(), CodecError>;
}
