//! Dictionary metadata and packed marker bytes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bits::{packed_len, unpack_bits, BitMatrix};

/// Dictionary construction and loading errors.
#[derive(thiserror::Error, Debug)]
pub enum DictionaryError {
    #[error("marker_size must be >= 1")]
    InvalidMarkerSize,
    #[error("marker {id} has {len} bytes, {needed} required")]
    ShortMarker { id: usize, len: usize, needed: usize },
    #[error("dictionary {name} declares marker_size {declared}, expected {expected}")]
    MarkerSizeMismatch {
        name: String,
        declared: usize,
        expected: usize,
    },
    #[error("unknown dictionary {0:?}")]
    Unknown(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Marker lookup errors.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("marker id {id} is outside the dictionary (0..{count})")]
    InvalidMarkerId { id: usize, count: usize },
}

/// Marker size of the standard OpenCV dictionaries, by name.
pub fn known_marker_size(name: &str) -> Option<usize> {
    let size = match name {
        "DICT_4X4_50" | "DICT_4X4_100" | "DICT_4X4_250" | "DICT_4X4_1000" => 4,
        "DICT_5X5_50" | "DICT_5X5_100" | "DICT_5X5_250" | "DICT_5X5_1000" => 5,
        "DICT_6X6_50" | "DICT_6X6_100" | "DICT_6X6_250" | "DICT_6X6_1000" => 6,
        "DICT_7X7_50" | "DICT_7X7_100" | "DICT_7X7_250" | "DICT_7X7_1000" => 7,
        "DICT_ARUCO_ORIGINAL" => 5,
        "DICT_APRILTAG_16h5" => 4,
        "DICT_APRILTAG_25h9" => 5,
        "DICT_APRILTAG_36h10" | "DICT_APRILTAG_36h11" => 6,
        _ => return None,
    };
    Some(size)
}

/// An immutable ArUco/AprilTag-style dictionary.
///
/// Each marker is stored as its packed bytes (see [`crate::BitMatrix::to_bytes`]
/// for the layout). Markers are indexed by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dictionary {
    name: String,
    marker_size: usize,
    markers: Vec<Vec<u8>>,
}

impl Dictionary {
    /// Validate and build a dictionary.
    pub fn new(
        name: impl Into<String>,
        marker_size: usize,
        markers: Vec<Vec<u8>>,
    ) -> Result<Self, DictionaryError> {
        let name = name.into();
        if marker_size == 0 {
            return Err(DictionaryError::InvalidMarkerSize);
        }
        if let Some(expected) = known_marker_size(&name) {
            if expected != marker_size {
                return Err(DictionaryError::MarkerSizeMismatch {
                    name,
                    declared: marker_size,
                    expected,
                });
            }
        }
        let needed = packed_len(marker_size);
        if let Some((id, bytes)) = markers.iter().enumerate().find(|(_, m)| m.len() < needed) {
            return Err(DictionaryError::ShortMarker {
                id,
                len: bytes.len(),
                needed,
            });
        }
        Ok(Self {
            name,
            marker_size,
            markers,
        })
    }

    /// Build a dictionary from decoded bit patterns.
    pub fn from_bit_matrices(
        name: impl Into<String>,
        marker_size: usize,
        markers: &[BitMatrix],
    ) -> Result<Self, DictionaryError> {
        if markers.iter().any(|m| m.size() != marker_size) {
            return Err(DictionaryError::InvalidMarkerSize);
        }
        Self::new(
            name,
            marker_size,
            markers.iter().map(BitMatrix::to_bytes).collect(),
        )
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Marker side length (number of inner bits per side).
    #[inline]
    pub fn marker_size(&self) -> usize {
        self.marker_size
    }

    /// Total number of inner bits per marker.
    #[inline]
    pub fn bit_count(&self) -> usize {
        self.marker_size * self.marker_size
    }

    /// Number of markers (valid ids are `0..len()`).
    #[inline]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Packed bytes of one marker.
    pub fn marker_bytes(&self, id: usize) -> Option<&[u8]> {
        self.markers.get(id).map(Vec::as_slice)
    }

    /// Decode the `N × N` bit matrix of marker `id`.
    pub fn marker_bits(&self, id: usize) -> Result<BitMatrix, DecodeError> {
        let bytes = self.marker_bytes(id).ok_or(DecodeError::InvalidMarkerId {
            id,
            count: self.markers.len(),
        })?;
        Ok(unpack_bits(bytes, self.marker_size))
    }
}

/// On-disk form of one dictionary entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct DictionaryData {
    marker_size: usize,
    markers: Vec<Vec<u8>>,
}

/// Named table of dictionaries.
///
/// JSON layout:
///
/// ```json
/// { "DICT_4X4_50": { "marker_size": 4, "markers": [[181, 50], [15, 154]] } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DictionarySet {
    entries: BTreeMap<String, Dictionary>,
}

impl DictionarySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a dictionary table from a JSON string.
    pub fn from_json_str(raw: &str) -> Result<Self, DictionaryError> {
        let table: BTreeMap<String, DictionaryData> = serde_json::from_str(raw)?;
        let mut set = Self::new();
        for (name, data) in table {
            let dict = Dictionary::new(name, data.marker_size, data.markers)?;
            set.insert(dict);
        }
        log::debug!("loaded {} dictionaries", set.entries.len());
        Ok(set)
    }

    /// Load a dictionary table from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Write the table to disk as JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DictionaryError> {
        let table: BTreeMap<&str, DictionaryData> = self
            .entries
            .iter()
            .map(|(name, d)| {
                (
                    name.as_str(),
                    DictionaryData {
                        marker_size: d.marker_size,
                        markers: d.markers.clone(),
                    },
                )
            })
            .collect();
        fs::write(path, serde_json::to_string(&table)?)?;
        Ok(())
    }

    /// Add or replace a dictionary under its own name.
    pub fn insert(&mut self, dict: Dictionary) -> Option<Dictionary> {
        self.entries.insert(dict.name.clone(), dict)
    }

    pub fn get(&self, name: &str) -> Option<&Dictionary> {
        self.entries.get(name)
    }

    /// Like [`DictionarySet::get`] but reports unknown names as an error.
    pub fn require(&self, name: &str) -> Result<&Dictionary, DictionaryError> {
        self.get(name)
            .ok_or_else(|| DictionaryError::Unknown(name.to_string()))
    }

    /// Dictionary names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
