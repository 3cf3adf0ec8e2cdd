//! Server-builder floor plan: a square cell grid holding axis-aligned
//! rectangular components that may not overlap or leave the grid.

use serde::{Deserialize, Serialize};

use gpuviz_protocol::ThemeToken;

/// Default side length of the builder grid, in cells.
pub const DEFAULT_GRID_SIZE: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementKind {
    GpuServer,
    Storage,
    NetworkSwitch,
    CoolingUnit,
    Pdu,
}

impl PlacementKind {
    pub const ALL: [PlacementKind; 5] = [
        PlacementKind::GpuServer,
        PlacementKind::Storage,
        PlacementKind::NetworkSwitch,
        PlacementKind::CoolingUnit,
        PlacementKind::Pdu,
    ];

    /// Footprint `(width, height)` in cells.
    pub fn footprint(self) -> (u32, u32) {
        match self {
            Self::GpuServer => (2, 1),
            Self::Storage => (1, 1),
            Self::NetworkSwitch => (2, 1),
            Self::CoolingUnit => (2, 2),
            Self::Pdu => (1, 2),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::GpuServer => "GPU Server",
            Self::Storage => "Storage",
            Self::NetworkSwitch => "Network Switch",
            Self::CoolingUnit => "Cooling Unit",
            Self::Pdu => "PDU",
        }
    }

    pub fn theme_token(self) -> ThemeToken {
        match self {
            Self::GpuServer => ThemeToken::ComponentServer,
            Self::Storage => ThemeToken::ComponentStorage,
            Self::NetworkSwitch => ThemeToken::ComponentNetwork,
            Self::CoolingUnit => ThemeToken::ComponentCooling,
            Self::Pdu => ThemeToken::ComponentPower,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedComponent {
    pub id: u32,
    pub kind: PlacementKind,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PlacedComponent {
    fn overlaps(&self, x: i64, y: i64, w: i64, h: i64) -> bool {
        let (ox, oy) = (i64::from(self.x), i64::from(self.y));
        let (ow, oh) = (i64::from(self.width), i64::from(self.height));
        x < ox + ow && x + w > ox && y < oy + oh && y + h > oy
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.overlaps(i64::from(x), i64::from(y), 1, 1)
    }
}

/// Square placement grid.
///
/// Cells are addressed by signed coordinates so that a pointer hovering off
/// the left or top edge is simply an invalid position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementGrid {
    size: u32,
    components: Vec<PlacedComponent>,
    next_id: u32,
}

impl Default for PlacementGrid {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE)
    }
}

impl PlacementGrid {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            components: Vec::new(),
            next_id: 1,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn components(&self) -> &[PlacedComponent] {
        &self.components
    }

    /// Whether a `width × height` footprint fits at `(x, y)`: fully inside
    /// the grid and disjoint from every placed component.
    pub fn can_place(&self, x: i32, y: i32, width: u32, height: u32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        let (w, h) = (i64::from(width), i64::from(height));
        let size = i64::from(self.size);
        if x < 0 || y < 0 || x + w > size || y + h > size {
            return false;
        }
        !self.components.iter().any(|c| c.overlaps(x, y, w, h))
    }

    /// Place `kind` with its top-left cell at `(x, y)`. Returns the new
    /// component id, or `None` (leaving the grid untouched) when the
    /// footprint does not fit.
    pub fn place(&mut self, kind: PlacementKind, x: i32, y: i32) -> Option<u32> {
        let (width, height) = kind.footprint();
        if !self.can_place(x, y, width, height) {
            tracing::debug!(?kind, x, y, "placement rejected");
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.components.push(PlacedComponent {
            id,
            kind,
            x,
            y,
            width,
            height,
        });
        tracing::debug!(?kind, x, y, id, "component placed");
        Some(id)
    }

    pub fn remove(&mut self, id: u32) -> Option<PlacedComponent> {
        let index = self.components.iter().position(|c| c.id == id)?;
        Some(self.components.remove(index))
    }

    pub fn component_at(&self, x: i32, y: i32) -> Option<&PlacedComponent> {
        self.components.iter().find(|c| c.contains(x, y))
    }

    pub fn clear(&mut self) {
        self.components.clear();
    }

    /// Occupied fraction of the grid area.
    pub fn occupancy(&self) -> f64 {
        let area = f64::from(self.size) * f64::from(self.size);
        if area == 0.0 {
            return 0.0;
        }
        let used: u32 = self.components.iter().map(|c| c.width * c.height).sum();
        f64::from(used) / area
    }
}
