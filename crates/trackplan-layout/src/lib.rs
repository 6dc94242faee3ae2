//! # TrackPlan Layout
//!
//! Spatial composition engine for brick-built layouts. Pieces carry
//! connectors at fixed offsets; connectors dock to each other so that their
//! world poses coincide and face opposite ways. Pieces can be grouped,
//! nested, moved, rotated, cloned and spread over layers, and a whole layout
//! round-trips through a versioned JSON document.
//!
//! ## Core Components
//!
//! - **Catalog**: piece types with their size and connector specs
//! - **Pieces**: placed catalog entries with their own connectors
//! - **Connections**: symmetric links between connectors of two pieces
//! - **Groups**: temporary (selection) and permanent containers
//! - **Layers**: z-ordered piece lists with an index of open connectors
//! - **Serialization**: upgrade, validation and (de)serialization of layout files
//!
//! ## Architecture
//!
//! ```text
//! Layout
//!   ├── Pieces (arena)      ── Connections
//!   ├── Groups (arena)      ── members: pieces and groups
//!   ├── Layers              ── children, open connection index
//!   ├── ConnectionRegistry  (id -> piece, slot)
//!   ├── HitTestIndex        (quadtree by default)
//!   └── SceneSink           (renderer hook)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trackplan_layout::{Layout, PieceCatalog};
//!
//! let mut layout = Layout::new(Arc::new(PieceCatalog::standard()));
//! let first = layout.place_piece("straight")?;
//! let second = layout.place_next("straight")?;
//! layout.save("layout.tpl.json")?;
//! ```

pub mod catalog;
pub mod connection;
pub mod group;
pub mod layer;
pub mod layout;
pub mod offset;
pub mod piece;
pub mod registry;
pub mod scene;
pub mod serialization;
pub mod session;
pub mod settings;
pub mod spatial_index;

pub use catalog::{CatalogEntry, ConnectorSpec, PieceCatalog, PieceKind};
pub use connection::{Connection, ConnectionRef};
pub use group::Group;
pub use layer::{Layer, OpenConnectionIndex};
pub use layout::{Layout, ViewState, DEFAULT_LAYER_NAME};
pub use offset::ConnectorOffset;
pub use piece::{Piece, PieceData, ShapeKind};
pub use registry::ConnectionRegistry;
pub use scene::{NullScene, SceneSink};
pub use serialization::{
    is_valid_layout, upgrade_layout, validate_layout, ComponentData, ConnectionData, Fragment,
    FragmentRoot, GroupData, IdPolicy, LayerData, LayoutDate, LayoutDocument,
    LAYOUT_FILE_EXTENSION,
};
pub use session::{DragState, Session};
pub use settings::EditorSettings;
pub use spatial_index::{Bounds, HitTestIndex, SpatialIndex, SpatialIndexStats};
