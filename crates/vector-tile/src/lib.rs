//! Mapbox Vector Tile encoding for point layers.
//!
//! Tiles carry one layer of point features. Geometry is a single `MoveTo`
//! command with zigzag-encoded tile-local coordinates; attributes share the
//! layer's key and value tables.

pub mod encoder;
pub mod proto;

use thiserror::Error;

pub use encoder::{
    decode_tile, encode_center_point, encode_point_layer, read_point_layer, tile_local_position,
    AttributeValue, PointFeature,
};

/// HTTP content type for encoded tiles.
pub const CONTENT_TYPE: &str = "application/vnd.mapbox-vector-tile";

/// Tile-local coordinate range used unless a layer says otherwise.
pub const DEFAULT_EXTENT: u32 = 4096;

/// Vector tile specification version written into every layer.
pub const MVT_VERSION: u32 = 2;

/// Errors from encoding or reading tiles.
#[derive(Debug, Error)]
pub enum TileEncodeError {
    #[error("layer name must not be empty")]
    EmptyLayerName,

    #[error("invalid extent: {0}")]
    InvalidExtent(u32),

    #[error("layer not found: {0}")]
    MissingLayer(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),
}
