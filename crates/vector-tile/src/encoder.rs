//! Building and reading point layers.

use std::collections::HashMap;

use forecast_common::{GeoPoint, TileCoord};
use prost::Message;

use crate::proto::{Feature, GeomType, Layer, Tile, Value};
use crate::{TileEncodeError, DEFAULT_EXTENT, MVT_VERSION};

const CMD_MOVE_TO: u32 = 1;

/// A typed feature attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Float(f32),
    Double(f64),
    Int(i64),
    Bool(bool),
}

impl AttributeValue {
    fn to_proto(&self) -> Value {
        let mut value = Value::default();
        match self {
            AttributeValue::String(s) => value.string_value = Some(s.clone()),
            AttributeValue::Float(f) => value.float_value = Some(*f),
            AttributeValue::Double(d) => value.double_value = Some(*d),
            AttributeValue::Int(i) => value.int_value = Some(*i),
            AttributeValue::Bool(b) => value.bool_value = Some(*b),
        }
        value
    }

    fn from_proto(value: &Value) -> Option<Self> {
        if let Some(s) = &value.string_value {
            return Some(AttributeValue::String(s.clone()));
        }
        if let Some(f) = value.float_value {
            return Some(AttributeValue::Float(f));
        }
        if let Some(d) = value.double_value {
            return Some(AttributeValue::Double(d));
        }
        if let Some(i) = value.int_value.or(value.sint_value) {
            return Some(AttributeValue::Int(i));
        }
        if let Some(u) = value.uint_value {
            return Some(AttributeValue::Int(u as i64));
        }
        value.bool_value.map(AttributeValue::Bool)
    }

    /// Dedup key for the layer value table. Floats compare by bit pattern.
    fn table_key(&self) -> (u8, u64, Option<&str>) {
        match self {
            AttributeValue::String(s) => (0, 0, Some(s.as_str())),
            AttributeValue::Float(f) => (1, u64::from(f.to_bits()), None),
            AttributeValue::Double(d) => (2, d.to_bits(), None),
            AttributeValue::Int(i) => (3, *i as u64, None),
            AttributeValue::Bool(b) => (4, u64::from(*b), None),
        }
    }
}

/// A single point in tile-local coordinates with its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct PointFeature {
    pub id: Option<u64>,
    pub x: i32,
    pub y: i32,
    pub attributes: Vec<(String, AttributeValue)>,
}

impl PointFeature {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            id: None,
            x,
            y,
            attributes: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.push((key.into(), value));
        self
    }

    /// Look up an attribute by key.
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }
}

/// Position of a geographic point inside `tile`, scaled to `extent`.
///
/// The tile's north-west corner is `(0, 0)` and its south-east corner is
/// `(extent, extent)`.
pub fn tile_local_position(tile: &TileCoord, point: &GeoPoint, extent: u32) -> (i32, i32) {
    let (fx, fy) = tile.geo_to_fractional(point);
    let scale = f64::from(extent);
    let x = ((fx - f64::from(tile.x)) * scale).round();
    let y = ((fy - f64::from(tile.y)) * scale).round();
    (x as i32, y as i32)
}

/// Encode a single-layer tile of point features.
pub fn encode_point_layer(
    name: &str,
    extent: u32,
    features: &[PointFeature],
) -> Result<Vec<u8>, TileEncodeError> {
    if name.is_empty() {
        return Err(TileEncodeError::EmptyLayerName);
    }
    if extent == 0 {
        return Err(TileEncodeError::InvalidExtent(extent));
    }

    let mut keys: Vec<String> = Vec::new();
    let mut key_index: HashMap<String, u32> = HashMap::new();
    let mut values: Vec<Value> = Vec::new();
    let mut value_index: HashMap<(u8, u64, Option<String>), u32> = HashMap::new();
    let mut encoded = Vec::with_capacity(features.len());

    for feature in features {
        let mut tags = Vec::with_capacity(feature.attributes.len() * 2);
        for (key, value) in &feature.attributes {
            let k = *key_index.entry(key.clone()).or_insert_with(|| {
                keys.push(key.clone());
                (keys.len() - 1) as u32
            });

            let (kind, bits, text) = value.table_key();
            let v = *value_index
                .entry((kind, bits, text.map(str::to_string)))
                .or_insert_with(|| {
                    values.push(value.to_proto());
                    (values.len() - 1) as u32
                });

            tags.push(k);
            tags.push(v);
        }

        encoded.push(Feature {
            id: feature.id,
            tags,
            geometry_type: Some(GeomType::Point as i32),
            geometry: point_geometry(feature.x, feature.y),
        });
    }

    let tile = Tile {
        layers: vec![Layer {
            name: name.to_string(),
            features: encoded,
            keys,
            values,
            extent: Some(extent),
            version: MVT_VERSION,
        }],
    };

    Ok(tile.encode_to_vec())
}

/// Parse an encoded tile.
pub fn decode_tile(bytes: &[u8]) -> Result<Tile, TileEncodeError> {
    Ok(Tile::decode(bytes)?)
}

/// Read back the point features of a named layer.
pub fn read_point_layer(bytes: &[u8], name: &str) -> Result<Vec<PointFeature>, TileEncodeError> {
    let tile = decode_tile(bytes)?;
    let layer = tile
        .layers
        .iter()
        .find(|layer| layer.name == name)
        .ok_or_else(|| TileEncodeError::MissingLayer(name.to_string()))?;

    let mut points = Vec::with_capacity(layer.features.len());
    for feature in &layer.features {
        if feature.geometry_type.and_then(|t| GeomType::try_from(t).ok()) != Some(GeomType::Point) {
            continue;
        }
        let (x, y) = decode_point_geometry(&feature.geometry)?;

        let mut point = PointFeature::new(x, y);
        point.id = feature.id;
        for pair in feature.tags.chunks_exact(2) {
            let key = layer.keys.get(pair[0] as usize);
            let value = layer
                .values
                .get(pair[1] as usize)
                .and_then(AttributeValue::from_proto);
            if let (Some(key), Some(value)) = (key, value) {
                point.attributes.push((key.clone(), value));
            }
        }
        points.push(point);
    }

    Ok(points)
}

fn point_geometry(x: i32, y: i32) -> Vec<u32> {
    vec![command(CMD_MOVE_TO, 1), zigzag(x), zigzag(y)]
}

fn decode_point_geometry(geometry: &[u32]) -> Result<(i32, i32), TileEncodeError> {
    match geometry {
        [cmd, x, y, ..] if cmd & 0x7 == CMD_MOVE_TO && cmd >> 3 >= 1 => {
            Ok((unzigzag(*x), unzigzag(*y)))
        }
        _ => Err(TileEncodeError::InvalidGeometry(format!(
            "expected MoveTo point, got {geometry:?}"
        ))),
    }
}

fn command(id: u32, count: u32) -> u32 {
    (id & 0x7) | (count << 3)
}

fn zigzag(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

fn unzigzag(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Encode one point at the center of `tile` with the given attributes.
pub fn encode_center_point(
    tile: &TileCoord,
    name: &str,
    attributes: Vec<(String, AttributeValue)>,
) -> Result<Vec<u8>, TileEncodeError> {
    let (x, y) = tile_local_position(tile, &tile.center(), DEFAULT_EXTENT);
    let mut feature = PointFeature::new(x, y).with_id(1);
    feature.attributes = attributes;
    encode_point_layer(name, DEFAULT_EXTENT, &[feature])
}
