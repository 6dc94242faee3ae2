//! The layout: every piece, group and layer of one plan, together with the
//! collaborators that observe them.
//!
//! All structural edits go through [`Layout`]. Pieces and groups live in id
//! keyed arenas; layers hold z-order and open-connection indexes; the
//! connection registry maps connector ids back to their owning slot. Each
//! public method leaves all of these consistent when it returns (see
//! [`Layout::audit`]).

mod audit;
mod connect;
mod drag;
mod groups;
mod pieces;
mod selection;
mod transform;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use trackplan_core::{GroupId, LayerId, LayoutError, PieceId, Result};

use crate::catalog::PieceCatalog;
use crate::group::Group;
use crate::layer::Layer;
use crate::piece::{Piece, PieceData};
use crate::registry::ConnectionRegistry;
use crate::scene::{NullScene, SceneSink};
use crate::session::Session;
use crate::settings::EditorSettings;
use crate::spatial_index::{Bounds, HitTestIndex, SpatialIndex};

/// Name given to the layer every new layout starts with.
pub const DEFAULT_LAYER_NAME: &str = "Layer 1";

/// Viewport stored alongside a layout (`x`, `y`, `zoom` in the file).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// A complete layout plan.
pub struct Layout {
    pub(crate) catalog: Arc<PieceCatalog>,
    pub(crate) settings: EditorSettings,
    pub(crate) pieces: HashMap<PieceId, Piece>,
    pub(crate) groups: HashMap<GroupId, Group>,
    pub(crate) layers: Vec<Layer>,
    pub(crate) active_layer: LayerId,
    next_layer: u32,
    pub(crate) registry: ConnectionRegistry,
    pub(crate) hit_index: Box<dyn HitTestIndex>,
    pub(crate) scene: Box<dyn SceneSink>,
    pub(crate) session: Session,
    pub view: ViewState,
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("pieces", &self.pieces.len())
            .field("groups", &self.groups.len())
            .field("layers", &self.layers)
            .field("active_layer", &self.active_layer)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Layout {
    /// Creates an empty layout with one layer, the bundled quadtree and no
    /// renderer.
    pub fn new(catalog: Arc<PieceCatalog>) -> Self {
        Self::with_collaborators(catalog, Box::new(SpatialIndex::default()), Box::new(NullScene))
    }

    /// Creates an empty layout with one layer and the given hit index and
    /// scene sink.
    pub fn with_collaborators(
        catalog: Arc<PieceCatalog>,
        hit_index: Box<dyn HitTestIndex>,
        scene: Box<dyn SceneSink>,
    ) -> Self {
        let mut layout = Self::without_layers(catalog, hit_index, scene);
        layout.active_layer = layout.add_layer(DEFAULT_LAYER_NAME);
        layout
    }

    /// A layout with no layers at all; only valid until the first layer is added.
    pub(crate) fn without_layers(
        catalog: Arc<PieceCatalog>,
        hit_index: Box<dyn HitTestIndex>,
        scene: Box<dyn SceneSink>,
    ) -> Self {
        Self {
            catalog,
            settings: EditorSettings::default(),
            pieces: HashMap::new(),
            groups: HashMap::new(),
            layers: Vec::new(),
            active_layer: LayerId(0),
            next_layer: 0,
            registry: ConnectionRegistry::new(),
            hit_index,
            scene,
            session: Session::default(),
            view: ViewState::default(),
        }
    }

    pub fn catalog(&self) -> &PieceCatalog {
        &self.catalog
    }

    pub fn catalog_handle(&self) -> Arc<PieceCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: EditorSettings) {
        self.settings = settings;
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn hit_index(&self) -> &dyn HitTestIndex {
        self.hit_index.as_ref()
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    /// All pieces, in no particular order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    /// The layer that receives newly placed pieces.
    pub fn active_layer(&self) -> LayerId {
        self.active_layer
    }

    pub fn set_active_layer(&mut self, id: LayerId) -> Result<()> {
        self.layer_index(id)?;
        self.active_layer = id;
        Ok(())
    }

    /// Appends a new, empty layer on top of the others.
    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        let id = LayerId(self.next_layer);
        self.next_layer += 1;
        self.layers.push(Layer::new(id, name));
        id
    }

    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> Result<()> {
        self.layer_mut(id)?.name = name.into();
        Ok(())
    }

    /// Hidden layers keep their pieces but are skipped by hit testing.
    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> Result<()> {
        self.layer_mut(id)?.visible = visible;
        Ok(())
    }

    /// Removes a layer and destroys every piece on it. The last layer cannot
    /// be removed.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<()> {
        let index = self.layer_index(id)?;
        if self.layers.len() == 1 {
            return Err(LayoutError::LastLayer.into());
        }
        for piece in self.layers[index].children.clone() {
            self.destroy_piece(piece)?;
        }
        self.layers.retain(|l| l.id() != id);
        if self.active_layer == id {
            if let Some(first) = self.layers.first() {
                self.active_layer = first.id();
            }
        }
        tracing::debug!("Removed {}", id);
        Ok(())
    }

    /// Pieces whose bounds intersect `area`, on any layer.
    pub fn hit_test(&self, area: &Bounds) -> Vec<PieceId> {
        self.hit_index.search(area)
    }

    /// Top-most piece under a point on a visible layer.
    pub fn piece_at(&self, x: f64, y: f64) -> Option<PieceId> {
        let hits = self.hit_index.search(&Bounds::new(x, y, x, y));
        self.layers
            .iter()
            .rev()
            .filter(|layer| layer.is_visible())
            .find_map(|layer| {
                layer
                    .children()
                    .iter()
                    .rev()
                    .find(|id| hits.contains(id))
                    .copied()
            })
    }

    /// Replaces a piece's geometry and style data.
    pub fn update_piece_data(&mut self, id: PieceId, data: PieceData) -> Result<()> {
        self.require_piece(id)?;
        let dragging = self.session.is_dragging_piece(&id);
        if !dragging {
            self.index_remove(id);
        }
        if let Some(piece) = self.pieces.get_mut(&id) {
            piece.data = data;
        }
        if !dragging {
            self.index_insert(id);
        }
        Ok(())
    }

    pub(crate) fn require_piece(&self, id: PieceId) -> std::result::Result<&Piece, LayoutError> {
        self.pieces.get(&id).ok_or(LayoutError::UnknownPiece(id))
    }

    pub(crate) fn require_group(&self, id: GroupId) -> std::result::Result<&Group, LayoutError> {
        self.groups.get(&id).ok_or(LayoutError::UnknownGroup(id))
    }

    pub(crate) fn layer_index(&self, id: LayerId) -> std::result::Result<usize, LayoutError> {
        self.layers
            .iter()
            .position(|l| l.id() == id)
            .ok_or(LayoutError::UnknownLayer(id))
    }

    pub(crate) fn layer_mut(&mut self, id: LayerId) -> std::result::Result<&mut Layer, LayoutError> {
        self.layers
            .iter_mut()
            .find(|l| l.id() == id)
            .ok_or(LayoutError::UnknownLayer(id))
    }

    pub(crate) fn index_insert(&mut self, id: PieceId) {
        if let Some(piece) = self.pieces.get(&id) {
            self.hit_index.insert(id, &piece.bounds());
        }
    }

    pub(crate) fn index_remove(&mut self, id: PieceId) {
        if let Some(piece) = self.pieces.get(&id) {
            self.hit_index.remove(id, &piece.bounds());
        }
    }
}
