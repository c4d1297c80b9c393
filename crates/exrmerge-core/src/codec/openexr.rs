use std::path::Path;

use exr::image::read::read_first_flat_layer_from_file;
use exr::image::write::WritableImage;
use exr::image::{AnyChannel, AnyChannels, Blocks, Encoding, FlatSamples, Image, Layer};
use exr::math::Vec2;
use exr::meta::attribute::SampleType;
use exr::meta::header::{ImageAttributes, LayerAttributes};
use exr::meta::{BlockDescription, MetaData};
use tracing::debug;

use crate::error::CodecError;

use super::{ChannelEntry, ChannelInfo, Codec, PixelType};

/// Header of the first layer of an OpenEXR file, kept as the template for
/// writing merged output.
#[derive(Clone, Debug)]
pub struct ExrHeader {
    pub size: Vec2<usize>,
    pub encoding: Encoding,
    pub image_attributes: ImageAttributes,
    pub layer_attributes: LayerAttributes,
    pub channels: Vec<ChannelInfo>,
}

impl ExrHeader {
    pub fn width(&self) -> usize {
        self.size.width()
    }

    pub fn height(&self) -> usize {
        self.size.height()
    }
}

/// OpenEXR codec backed by the `exr` crate. Only the first layer of
/// multi-part files is read; deep data is rejected.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExrCodec {
    /// Reject files with minor header inconsistencies.
    pub pedantic: bool,
}

impl ExrCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

fn pixel_type(sample_type: SampleType) -> PixelType {
    match sample_type {
        SampleType::U32 => PixelType::U32,
        SampleType::F16 => PixelType::F16,
        SampleType::F32 => PixelType::F32,
    }
}

fn samples_type(samples: &FlatSamples) -> PixelType {
    match samples {
        FlatSamples::U32(_) => PixelType::U32,
        FlatSamples::F16(_) => PixelType::F16,
        FlatSamples::F32(_) => PixelType::F32,
    }
}

impl Codec for ExrCodec {
    type Header = ExrHeader;
    type Buffer = AnyChannel<FlatSamples>;

    fn read_header(&self, path: &Path) -> Result<ExrHeader, CodecError> {
        let meta = MetaData::read_from_file(path, self.pedantic)
            .map_err(|e| CodecError::Header(e.to_string()))?;
        let header = meta
            .headers
            .into_iter()
            .next()
            .ok_or_else(|| CodecError::Header("file has no layers".into()))?;

        if header.deep {
            return Err(CodecError::Header("deep data is not supported".into()));
        }

        let blocks = match &header.blocks {
            BlockDescription::ScanLines => Blocks::ScanLines,
            BlockDescription::Tiles(tiles) => Blocks::Tiles(tiles.tile_size),
        };
        let channels = header
            .channels
            .list
            .iter()
            .map(|c| ChannelInfo {
                name: c.name.to_string(),
                pixel_type: pixel_type(c.sample_type),
            })
            .collect();

        Ok(ExrHeader {
            size: header.layer_size,
            encoding: Encoding {
                compression: header.compression,
                blocks,
                line_order: header.line_order,
            },
            image_attributes: header.shared_attributes,
            layer_attributes: header.own_attributes,
            channels,
        })
    }

    fn channels(&self, header: &ExrHeader) -> Vec<ChannelInfo> {
        header.channels.clone()
    }

    fn decode(
        &self,
        _header: &ExrHeader,
        path: &Path,
    ) -> Result<Vec<ChannelEntry<Self::Buffer>>, CodecError> {
        let image = read_first_flat_layer_from_file(path)
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        let channels: Vec<_> = image
            .layer_data
            .channel_data
            .list
            .into_iter()
            .map(|channel| ChannelEntry {
                name: channel.name.to_string(),
                pixel_type: samples_type(&channel.sample_data),
                buffer: channel,
            })
            .collect();

        debug!(path = %path.display(), channels = channels.len(), "Decoded EXR");
        Ok(channels)
    }

    fn encode(
        &self,
        template: &ExrHeader,
        channels: Vec<ChannelEntry<Self::Buffer>>,
        path: &Path,
    ) -> Result<(), CodecError> {
        let list: Vec<AnyChannel<FlatSamples>> =
            channels.into_iter().map(|entry| entry.buffer).collect();

        let layer = Layer::new(
            template.size,
            template.layer_attributes.clone(),
            template.encoding.clone(),
            AnyChannels::sort(list.into()),
        );
        let image = Image::new(template.image_attributes.clone(), layer);

        image
            .write()
            .to_file(path)
            .map_err(|e| CodecError::Encode(e.to_string()))
    }
}
