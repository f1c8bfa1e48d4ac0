//! Identifier newtypes, UDIM tiles and UV bounding boxes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a face within its mesh.
pub type FaceId = usize;

/// First tile number of the UDIM convention (u tile 0, v tile 0).
pub const UDIM_BASE: u32 = 1001;

/// Number of tile columns per UDIM row.
pub const UDIM_COLUMNS: u32 = 10;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from any string-like value.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Opaque material identifier as reported by the scene.
    MaterialId
);

string_id!(
    /// Opaque mesh identifier, usually a `|`-separated DAG path.
    MeshId
);

string_id!(
    /// Name of a UV set on a mesh.
    UvSetId
);

impl MeshId {
    /// Last component of a `|`-separated DAG path.
    ///
    /// `"|root|body|bodyShape"` becomes `"bodyShape"`. Names without a
    /// separator are returned unchanged.
    pub fn short_name(&self) -> &str {
        self.0.rsplit('|').next().unwrap_or(&self.0)
    }
}

/// One face of one mesh.
///
/// Ordering is by mesh then face, which gives a canonical order for
/// unordered face pairs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FaceRef {
    /// Owning mesh.
    pub mesh: MeshId,
    /// Face index within the mesh.
    pub face: FaceId,
}

impl FaceRef {
    pub fn new(mesh: MeshId, face: FaceId) -> Self {
        Self { mesh, face }
    }
}

impl fmt::Display for FaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.f[{}]", self.mesh, self.face)
    }
}

/// A UDIM tile number (1001, 1002, ..., 1011, ...).
///
/// Tiles are only constructed for UVs inside the addressable UDIM range, so
/// the number is always at least [`UDIM_BASE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct UdimTile(u32);

impl UdimTile {
    /// Builds a tile from its zero-based column (u) and row (v).
    ///
    /// Returns `None` when the column is outside `0..10`.
    pub fn from_grid(column: u32, row: u32) -> Option<Self> {
        if column >= UDIM_COLUMNS {
            return None;
        }
        let row_offset = row.checked_mul(UDIM_COLUMNS)?;
        UDIM_BASE
            .checked_add(column)?
            .checked_add(row_offset)
            .map(UdimTile)
    }

    /// Tile containing the UV coordinate, `1001 + floor(u) + 10 * floor(v)`.
    ///
    /// Returns `None` for non-finite coordinates, negative tiles and u values
    /// at or beyond 10, none of which have a UDIM number.
    pub fn from_uv(u: f64, v: f64) -> Option<Self> {
        if !u.is_finite() || !v.is_finite() {
            return None;
        }
        let column = u.floor();
        let row = v.floor();
        if column < 0.0 || row < 0.0 || column >= f64::from(UDIM_COLUMNS) {
            return None;
        }
        if row > f64::from(u32::MAX) {
            return None;
        }
        Self::from_grid(column as u32, row as u32)
    }

    /// Parses a tile number, rejecting anything below 1001.
    pub fn from_number(number: u32) -> Option<Self> {
        (number >= UDIM_BASE).then_some(UdimTile(number))
    }

    /// The tile number.
    pub fn number(self) -> u32 {
        self.0
    }

    /// Zero-based u tile, `(tile - 1001) mod 10`.
    pub fn column(self) -> u32 {
        (self.0 - UDIM_BASE) % UDIM_COLUMNS
    }

    /// Zero-based v tile, `(tile - 1001) div 10`.
    pub fn row(self) -> u32 {
        (self.0 - UDIM_BASE) / UDIM_COLUMNS
    }
}

impl TryFrom<u32> for UdimTile {
    type Error = String;

    fn try_from(number: u32) -> Result<Self, Self::Error> {
        Self::from_number(number).ok_or_else(|| format!("{} is not a UDIM tile number", number))
    }
}

impl From<UdimTile> for u32 {
    fn from(tile: UdimTile) -> Self {
        tile.0
    }
}

impl fmt::Display for UdimTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis-aligned bounding box of a face in UV space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvBounds {
    pub u_min: f64,
    pub u_max: f64,
    pub v_min: f64,
    pub v_max: f64,
}

impl UvBounds {
    pub fn new(u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            v_min,
            v_max,
        }
    }

    /// Smallest box enclosing the points, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (u, v) = iter.next()?;
        let mut bounds = Self::new(u, u, v, v);
        for (u, v) in iter {
            bounds.u_min = bounds.u_min.min(u);
            bounds.u_max = bounds.u_max.max(u);
            bounds.v_min = bounds.v_min.min(v);
            bounds.v_max = bounds.v_max.max(v);
        }
        Some(bounds)
    }

    /// Tile of the minimum corner.
    pub fn origin_tile(&self) -> Option<UdimTile> {
        UdimTile::from_uv(self.u_min, self.v_min)
    }

    /// True when the minimum corner quantizes into `tile`.
    pub fn originates_in(&self, tile: UdimTile) -> bool {
        self.origin_tile() == Some(tile)
    }

    /// True when any part of the box, edges included, lies in `tile`.
    pub fn touches(&self, tile: UdimTile) -> bool {
        let column = f64::from(tile.column());
        let row = f64::from(tile.row());
        self.u_min.floor() <= column
            && self.u_max.floor() >= column
            && self.v_min.floor() <= row
            && self.v_max.floor() >= row
    }

    /// Strict box intersection shrunk by `tolerance` on every side.
    ///
    /// Boxes that only touch, or overlap by no more than `tolerance`, do not
    /// count.
    pub fn overlaps(&self, other: &UvBounds, tolerance: f64) -> bool {
        self.u_min < other.u_max - tolerance
            && self.u_max > other.u_min + tolerance
            && self.v_min < other.v_max - tolerance
            && self.v_max > other.v_min + tolerance
    }
}
