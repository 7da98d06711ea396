//! Feature-map examples in protobuf wire format
//!
//! Layout: `Example { Features features = 1 }`, `Features { map<string,
//! Feature> feature = 1 }`, `Feature { oneof { BytesList = 1, FloatList = 2,
//! Int64List = 3 } }`, each list holding `repeated value = 1`. Features are
//! written in name order so equal examples serialize to equal bytes.

use crate::error::{RecordError, RecordResult};
use std::collections::BTreeMap;

/// Feature holding the encoded image
pub const IMAGE_FEATURE: &str = "image";
/// Feature holding the image identifier
pub const NAME_FEATURE: &str = "imagename";

const WIRE_VARINT: u8 = 0;
const WIRE_FIXED64: u8 = 1;
const WIRE_LEN: u8 = 2;
const WIRE_FIXED32: u8 = 5;

/// One named value list
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Bytes(Vec<Vec<u8>>),
    Float(Vec<f32>),
    Int64(Vec<i64>),
}

impl Feature {
    /// Single byte string
    #[must_use]
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(vec![value.into()])
    }
}

/// Map from feature name to value list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Example {
    features: BTreeMap<String, Feature>,
}

impl Example {
    /// Create empty example
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With feature
    #[must_use]
    pub fn with_feature(mut self, name: impl Into<String>, feature: Feature) -> Self {
        self.insert(name, feature);
        self
    }

    /// Insert or replace a feature
    pub fn insert(&mut self, name: impl Into<String>, feature: Feature) {
        self.features.insert(name.into(), feature);
    }

    /// Feature by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Feature> {
        self.features.get(name)
    }

    /// First byte string of a bytes feature
    #[must_use]
    pub fn first_bytes(&self, name: &str) -> Option<&[u8]> {
        match self.features.get(name)? {
            Feature::Bytes(values) => values.first().map(Vec::as_slice),
            _ => None,
        }
    }

    /// Feature names in serialization order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    /// Number of features
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if there are no features
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Serialize to wire bytes
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut features = Vec::new();
        for (name, feature) in &self.features {
            let mut entry = Vec::new();
            put_len_delimited(&mut entry, 1, name.as_bytes());
            put_len_delimited(&mut entry, 2, &encode_feature(feature));
            put_len_delimited(&mut features, 1, &entry);
        }
        let mut out = Vec::with_capacity(features.len() + 8);
        put_len_delimited(&mut out, 1, &features);
        out
    }

    /// Parse wire bytes; unknown fields are skipped
    ///
    /// # Errors
    /// Returns [`RecordError::Malformed`] on truncated or inconsistent data
    pub fn decode(data: &[u8]) -> RecordResult<Self> {
        let mut example = Self::new();
        let mut wire = WireReader::new(data);
        while !wire.is_empty() {
            if let (1, WireValue::Len(features)) = wire.field()? {
                decode_features(features, &mut example)?;
            }
        }
        Ok(example)
    }
}

/// Identifier plus encoded image, the unit appended to a record file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordExample {
    pub name: String,
    pub image: Vec<u8>,
}

impl RecordExample {
    /// Create record example
    #[must_use]
    pub fn new(name: impl Into<String>, image: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
        }
    }

    /// As a two-feature [`Example`]
    #[must_use]
    pub fn to_example(&self) -> Example {
        Example::new()
            .with_feature(IMAGE_FEATURE, Feature::bytes(self.image.clone()))
            .with_feature(NAME_FEATURE, Feature::bytes(self.name.as_bytes()))
    }

    /// Serialize to wire bytes
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_example().encode()
    }

    /// Extract from an [`Example`]
    ///
    /// # Errors
    /// - [`RecordError::MissingFeature`] if either feature is absent
    /// - [`RecordError::Malformed`] if the name is not UTF-8
    pub fn from_example(example: &Example) -> RecordResult<Self> {
        let image = example
            .first_bytes(IMAGE_FEATURE)
            .ok_or(RecordError::MissingFeature(IMAGE_FEATURE))?;
        let name = example
            .first_bytes(NAME_FEATURE)
            .ok_or(RecordError::MissingFeature(NAME_FEATURE))?;
        let name = std::str::from_utf8(name)
            .map_err(|e| RecordError::malformed(format!("image name is not utf-8: {e}")))?;
        Ok(Self::new(name, image))
    }

    /// Parse wire bytes
    ///
    /// # Errors
    /// As [`Example::decode`] and [`from_example`](Self::from_example)
    pub fn from_bytes(data: &[u8]) -> RecordResult<Self> {
        Self::from_example(&Example::decode(data)?)
    }
}

fn encode_feature(feature: &Feature) -> Vec<u8> {
    let mut list = Vec::new();
    let field = match feature {
        Feature::Bytes(values) => {
            for value in values {
                put_len_delimited(&mut list, 1, value);
            }
            1
        }
        Feature::Float(values) => {
            if !values.is_empty() {
                let packed: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
                put_len_delimited(&mut list, 1, &packed);
            }
            2
        }
        Feature::Int64(values) => {
            if !values.is_empty() {
                let mut packed = Vec::new();
                for &v in values {
                    #[allow(clippy::cast_sign_loss)]
                    put_varint(&mut packed, v as u64);
                }
                put_len_delimited(&mut list, 1, &packed);
            }
            3
        }
    };
    let mut out = Vec::with_capacity(list.len() + 4);
    put_len_delimited(&mut out, field, &list);
    out
}

fn decode_features(data: &[u8], example: &mut Example) -> RecordResult<()> {
    let mut wire = WireReader::new(data);
    while !wire.is_empty() {
        let (1, WireValue::Len(entry)) = wire.field()? else {
            continue;
        };
        let mut name = None;
        let mut feature = None;
        let mut entry = WireReader::new(entry);
        while !entry.is_empty() {
            match entry.field()? {
                (1, WireValue::Len(key)) => {
                    let key = std::str::from_utf8(key)
                        .map_err(|e| RecordError::malformed(format!("feature name is not utf-8: {e}")))?;
                    name = Some(key.to_string());
                }
                (2, WireValue::Len(value)) => feature = Some(decode_feature(value)?),
                _ => {}
            }
        }
        let name = name.unwrap_or_default();
        let feature = feature.ok_or_else(|| RecordError::malformed(format!("feature '{name}' has no value")))?;
        example.insert(name, feature);
    }
    Ok(())
}

fn decode_feature(data: &[u8]) -> RecordResult<Feature> {
    let mut wire = WireReader::new(data);
    let mut decoded = None;
    while !wire.is_empty() {
        match wire.field()? {
            (1, WireValue::Len(list)) => decoded = Some(Feature::Bytes(decode_bytes_list(list)?)),
            (2, WireValue::Len(list)) => decoded = Some(Feature::Float(decode_float_list(list)?)),
            (3, WireValue::Len(list)) => decoded = Some(Feature::Int64(decode_int64_list(list)?)),
            _ => {}
        }
    }
    decoded.ok_or_else(|| RecordError::malformed("feature without a value list"))
}

fn decode_bytes_list(data: &[u8]) -> RecordResult<Vec<Vec<u8>>> {
    let mut wire = WireReader::new(data);
    let mut values = Vec::new();
    while !wire.is_empty() {
        if let (1, WireValue::Len(value)) = wire.field()? {
            values.push(value.to_vec());
        }
    }
    Ok(values)
}

fn decode_float_list(data: &[u8]) -> RecordResult<Vec<f32>> {
    let mut wire = WireReader::new(data);
    let mut values = Vec::new();
    while !wire.is_empty() {
        match wire.field()? {
            (1, WireValue::Len(packed)) => {
                if packed.len() % 4 != 0 {
                    return Err(RecordError::malformed("packed float list length is not a multiple of 4"));
                }
                values.extend(
                    packed
                        .chunks_exact(4)
                        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])),
                );
            }
            (1, WireValue::Fixed32(c)) => values.push(f32::from_le_bytes([c[0], c[1], c[2], c[3]])),
            _ => {}
        }
    }
    Ok(values)
}

#[allow(clippy::cast_possible_wrap)]
fn decode_int64_list(data: &[u8]) -> RecordResult<Vec<i64>> {
    let mut wire = WireReader::new(data);
    let mut values = Vec::new();
    while !wire.is_empty() {
        match wire.field()? {
            (1, WireValue::Len(packed)) => {
                let mut packed = WireReader::new(packed);
                while !packed.is_empty() {
                    values.push(packed.varint()? as i64);
                }
            }
            (1, WireValue::Varint(v)) => values.push(v as i64),
            _ => {}
        }
    }
    Ok(values)
}

#[allow(clippy::cast_possible_truncation)]
fn put_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

fn put_len_delimited(out: &mut Vec<u8>, field: u32, payload: &[u8]) {
    put_varint(out, u64::from(field << 3 | u32::from(WIRE_LEN)));
    put_varint(out, payload.len() as u64);
    out.extend_from_slice(payload);
}

enum WireValue<'a> {
    Varint(u64),
    Fixed64,
    Len(&'a [u8]),
    Fixed32(&'a [u8]),
}

struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn varint(&mut self) -> RecordResult<u64> {
        let mut value = 0u64;
        for shift in (0..64).step_by(7) {
            let byte = *self
                .data
                .get(self.pos)
                .ok_or_else(|| RecordError::malformed("truncated varint"))?;
            self.pos += 1;
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(RecordError::malformed("varint longer than 10 bytes"))
    }

    fn take(&mut self, len: usize) -> RecordResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| RecordError::malformed("field runs past end of message"))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn field(&mut self) -> RecordResult<(u32, WireValue<'a>)> {
        let key = self.varint()?;
        let field = (key >> 3) as u32;
        let value = match (key & 0x7) as u8 {
            WIRE_VARINT => WireValue::Varint(self.varint()?),
            WIRE_FIXED64 => {
                self.take(8)?;
                WireValue::Fixed64
            }
            WIRE_LEN => {
                let len = usize::try_from(self.varint()?)
                    .map_err(|_| RecordError::malformed("length does not fit in memory"))?;
                WireValue::Len(self.take(len)?)
            }
            WIRE_FIXED32 => WireValue::Fixed32(self.take(4)?),
            other => return Err(RecordError::malformed(format!("unsupported wire type {other}"))),
        };
        Ok((field, value))
    }
}
