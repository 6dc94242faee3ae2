//! Conversion between a [`Layout`] and its serialized form.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result as AnyResult};
use trackplan_core::constants::LAYOUT_FORMAT_VERSION;
use trackplan_core::{
    ConnectionError, ConnectionId, GroupId, LayerId, LayoutError, Node, Result, ValidationError,
};

use super::{ComponentData, ConnectionData, GroupData, LayerData, LayoutDate, LayoutDocument};
use crate::catalog::PieceCatalog;
use crate::group::Group;
use crate::layout::{Layout, ViewState, DEFAULT_LAYER_NAME};
use crate::piece::Piece;
use crate::scene::{NullScene, SceneSink};
use crate::spatial_index::{HitTestIndex, SpatialIndex};

/// How ids found in serialized data are treated when building pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPolicy {
    /// Reuse connection and group ids (loading a saved layout).
    Keep,
    /// Give every connection and group a fresh id (clone, paste, import).
    Regenerate,
}

/// The node a fragment was cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentRoot {
    /// A single piece: index into [`Fragment::components`].
    Component(usize),
    Group(GroupId),
}

/// A serialized sub-tree: the pieces and groups of one node, or of a layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    pub components: Vec<ComponentData>,
    pub groups: Vec<GroupData>,
    pub root: Option<FragmentRoot>,
}

impl Layout {
    /// Serializes one layer: its pieces in z-order and its non-empty
    /// permanent groups. Temporary groups are never written.
    pub fn serialize_layer(&self, id: LayerId) -> Result<LayerData> {
        let layer = &self.layers[self.layer_index(id)?];
        let permanent = |g: GroupId| self.groups.get(&g).is_some_and(Group::is_permanent);

        let components = layer
            .children()
            .iter()
            .filter_map(|id| self.pieces.get(id))
            .map(|piece| self.serialize_component(piece, &permanent))
            .collect();

        let mut seen = HashSet::new();
        let mut groups = Vec::new();
        for piece in layer.children().iter().filter_map(|id| self.pieces.get(id)) {
            let mut current = piece.group;
            while let Some(id) = current {
                let Some(group) = self.groups.get(&id) else {
                    break;
                };
                if group.is_permanent() && !group.is_empty() && seen.insert(id) {
                    let parent = group.parent.filter(|p| permanent(*p));
                    groups.push(GroupData {
                        uuid: id,
                        group: parent,
                        member_index: parent
                            .and_then(|p| self.member_index(p, Node::Group(id))),
                        temporary: false,
                    });
                }
                current = group.parent;
            }
        }

        Ok(LayerData {
            name: Some(layer.name().to_string()),
            visible: Some(layer.is_visible()),
            components,
            groups: (!groups.is_empty()).then_some(groups),
        })
    }

    /// Serializes a node with every group inside it, temporary ones
    /// included. Links to pieces outside the node are written as they are;
    /// rebuilding with [`IdPolicy::Regenerate`] leaves them open.
    pub fn serialize_node(&self, node: Node) -> Result<Fragment> {
        self.require_node(node)?;

        let mut subtree = HashSet::new();
        if let Node::Group(root) = node {
            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                if let Some(group) = self.groups.get(&id) {
                    if subtree.insert(id) {
                        stack.extend(group.members.iter().filter_map(Node::as_group));
                    }
                }
            }
        }
        let inside = |g: GroupId| subtree.contains(&g);

        let mut leaves = self.leaves(node);
        leaves.sort_by_key(|id| {
            self.pieces
                .get(id)
                .and_then(|p| {
                    let layer = self.layer_index(p.layer).ok()?;
                    Some((layer, self.layers[layer].z_index(id)?))
                })
                .unwrap_or((usize::MAX, usize::MAX))
        });
        let components = leaves
            .iter()
            .filter_map(|id| self.pieces.get(id))
            .map(|piece| self.serialize_component(piece, &inside))
            .collect();

        let mut groups: Vec<GroupData> = subtree
            .iter()
            .filter_map(|id| self.groups.get(id))
            .map(|group| {
                let parent = group.parent.filter(|p| inside(*p));
                GroupData {
                    uuid: group.id,
                    group: parent,
                    member_index: parent.and_then(|p| self.member_index(p, Node::Group(group.id))),
                    temporary: group.temporary,
                }
            })
            .collect();
        groups.sort_by_key(|g| g.uuid);

        let root = match node {
            Node::Piece(_) => FragmentRoot::Component(0),
            Node::Group(id) => FragmentRoot::Group(id),
        };
        Ok(Fragment {
            components,
            groups,
            root: Some(root),
        })
    }

    fn serialize_component(&self, piece: &Piece, keep_group: &dyn Fn(GroupId) -> bool) -> ComponentData {
        let group = piece.group.filter(|g| keep_group(*g));
        ComponentData {
            alias: piece.alias.clone(),
            pose: piece.pose,
            connections: piece
                .connections
                .iter()
                .map(|c| ConnectionData {
                    uuid: c.id,
                    other_connection: c.other.map(|o| o.to_string()).unwrap_or_default(),
                    offset: c.custom_offset.then_some(c.offset),
                })
                .collect(),
            group,
            member_index: group.and_then(|g| self.member_index(g, Node::Piece(piece.id))),
            width: Some(piece.data.width),
            height: Some(piece.data.height),
            units: piece.data.units,
            color: piece.data.color.clone(),
            shape: piece.data.shape,
            text: piece.data.text.clone(),
            font_size: piece.data.font_size,
        }
    }

    fn member_index(&self, group: GroupId, node: Node) -> Option<usize> {
        self.groups
            .get(&group)?
            .members()
            .iter()
            .position(|m| *m == node)
    }

    /// Builds a fragment into `layer` and returns the rebuilt root node.
    ///
    /// Everything is checked before anything is created: an unknown type, a
    /// connection count that differs from the catalog, or (with
    /// [`IdPolicy::Keep`]) an id already present in the layout rejects the
    /// whole fragment.
    ///
    /// Links are restored between connectors of the fragment. With
    /// [`IdPolicy::Keep`], a link to an open connector already in the layout
    /// is restored too; with [`IdPolicy::Regenerate`] such links stay open.
    pub fn deserialize_fragment(
        &mut self,
        fragment: &Fragment,
        layer: LayerId,
        policy: IdPolicy,
    ) -> Result<Option<Node>> {
        let layer_position = self.layer_index(layer)?;

        let mut group_ids: HashMap<GroupId, GroupId> = HashMap::new();
        for group in &fragment.groups {
            let id = match policy {
                IdPolicy::Keep => {
                    if self.groups.contains_key(&group.uuid) || group_ids.contains_key(&group.uuid) {
                        return Err(LayoutError::DuplicateGroup(group.uuid).into());
                    }
                    group.uuid
                }
                IdPolicy::Regenerate => GroupId::new(),
            };
            group_ids.insert(group.uuid, id);
        }

        let mut connection_ids: HashMap<ConnectionId, ConnectionId> = HashMap::new();
        for data in fragment.components.iter().flat_map(|c| c.connections.iter()) {
            let id = match policy {
                IdPolicy::Keep => {
                    if self.registry.contains(&data.uuid) || connection_ids.contains_key(&data.uuid) {
                        return Err(ConnectionError::DuplicateId(data.uuid).into());
                    }
                    data.uuid
                }
                IdPolicy::Regenerate => ConnectionId::new(),
            };
            connection_ids.insert(data.uuid, id);
        }

        let mut built = Vec::with_capacity(fragment.components.len());
        for (index, component) in fragment.components.iter().enumerate() {
            let entry = self.catalog.resolve(&component.alias)?;
            if !component.connections.is_empty()
                && component.connections.len() != entry.connectors.len()
            {
                return Err(ValidationError::InvalidComponent {
                    layer: layer_position,
                    component: index,
                    reason: format!(
                        "expected {} connections, found {}",
                        entry.connectors.len(),
                        component.connections.len()
                    ),
                }
                .into());
            }
            let mut piece = Piece::from_entry(entry, component.pose, layer);
            apply_component_data(&mut piece, component);
            for (conn, data) in piece.connections.iter_mut().zip(&component.connections) {
                if let Some(id) = connection_ids.get(&data.uuid) {
                    conn.id = *id;
                }
                if let Some(offset) = data.offset {
                    conn.offset = offset;
                    conn.custom_offset = true;
                }
            }
            built.push(piece);
        }

        for group in &fragment.groups {
            if let Some(id) = group_ids.get(&group.uuid) {
                self.groups.insert(*id, Group::new(*id, group.temporary));
            }
        }
        let mut memberships: Vec<(Option<usize>, GroupId, Node)> = fragment
            .groups
            .iter()
            .filter_map(|group| {
                let child = group_ids.get(&group.uuid).copied()?;
                let parent = group.group.and_then(|p| group_ids.get(&p).copied())?;
                Some((group.member_index, parent, Node::Group(child)))
            })
            .collect();

        let mut piece_ids = Vec::with_capacity(built.len());
        for (piece, component) in built.into_iter().zip(&fragment.components) {
            let id = self.insert_piece(piece);
            piece_ids.push(id);
            if let Some(group) = component.group.and_then(|g| group_ids.get(&g).copied()) {
                memberships.push((component.member_index, group, Node::Piece(id)));
            }
        }

        // saved member positions first; unindexed entries follow, groups before pieces
        memberships.sort_by_key(|(index, _, _)| index.unwrap_or(usize::MAX));
        for (_, parent, node) in memberships {
            if let Node::Group(child) = node {
                if self.is_ancestor(child, parent) {
                    tracing::warn!("Ignoring cyclic parent {} of group {}", parent, child);
                    continue;
                }
            }
            self.attach_member(parent, node);
        }

        for data in fragment.components.iter().flat_map(|c| c.connections.iter()) {
            let Some(partner) = data.partner() else {
                continue;
            };
            let Some(own) = connection_ids.get(&data.uuid).copied() else {
                continue;
            };
            let target = match (connection_ids.get(&partner), policy) {
                (Some(mapped), _) => *mapped,
                (None, IdPolicy::Keep) => partner,
                (None, IdPolicy::Regenerate) => continue,
            };
            let linkable = match (self.connection(own), self.connection(target)) {
                (Some(a), Some(b)) => a.is_open() && b.is_open() && a.owner != b.owner,
                _ => false,
            };
            let linkable = linkable && self.owner_layer(target) == Some(layer);
            if linkable {
                self.link(own, target);
            }
        }

        for id in group_ids.values() {
            self.prune_empty(*id);
        }

        let root = match fragment.root {
            Some(FragmentRoot::Component(index)) => piece_ids.get(index).map(|id| Node::Piece(*id)),
            Some(FragmentRoot::Group(group)) => group_ids
                .get(&group)
                .filter(|id| self.groups.contains_key(*id))
                .map(|id| Node::Group(*id)),
            None => None,
        };
        Ok(root)
    }

    /// Appends a serialized layer as a new layer.
    pub fn import_layer(&mut self, data: &LayerData, policy: IdPolicy) -> Result<LayerId> {
        let name = data
            .name
            .clone()
            .unwrap_or_else(|| format!("Layer {}", self.layers.len() + 1));
        let id = self.add_layer(name);
        if let Some(visible) = data.visible {
            self.layer_mut(id)?.visible = visible;
        }

        let fragment = Fragment {
            components: data.components.clone(),
            groups: data.groups.clone().unwrap_or_default(),
            root: None,
        };
        if let Err(err) = self.deserialize_fragment(&fragment, id, policy) {
            self.layers.retain(|l| l.id() != id);
            return Err(err);
        }
        Ok(id)
    }

    /// Serializes the whole layout.
    pub fn to_document(&self) -> Result<LayoutDocument> {
        let layers = self
            .layers
            .iter()
            .map(|layer| self.serialize_layer(layer.id()))
            .collect::<Result<Vec<_>>>()?;
        Ok(LayoutDocument {
            version: LAYOUT_FORMAT_VERSION,
            date: LayoutDate::now(),
            x: Some(self.view.x),
            y: Some(self.view.y),
            zoom: Some(self.view.zoom),
            layers,
            config: self.settings.clone(),
        })
    }

    /// Builds a layout from a validated document, with the bundled hit index
    /// and no renderer.
    pub fn from_document(document: &LayoutDocument, catalog: Arc<PieceCatalog>) -> Result<Self> {
        Self::from_document_with(
            document,
            catalog,
            Box::new(SpatialIndex::default()),
            Box::new(NullScene),
        )
    }

    /// Builds a layout from a validated document. Ids are kept as saved.
    pub fn from_document_with(
        document: &LayoutDocument,
        catalog: Arc<PieceCatalog>,
        hit_index: Box<dyn HitTestIndex>,
        scene: Box<dyn SceneSink>,
    ) -> Result<Self> {
        let mut layout = Layout::without_layers(catalog, hit_index, scene);
        layout.settings = document.config.clone();
        let defaults = ViewState::default();
        layout.view = ViewState {
            x: document.x.unwrap_or(defaults.x),
            y: document.y.unwrap_or(defaults.y),
            zoom: document.zoom.unwrap_or(defaults.zoom),
        };

        for layer in &document.layers {
            layout.import_layer(layer, IdPolicy::Keep)?;
        }
        match layout.layers.first() {
            Some(first) => layout.active_layer = first.id(),
            None => layout.active_layer = layout.add_layer(DEFAULT_LAYER_NAME),
        }
        Ok(layout)
    }

    /// Loads, upgrades and validates a layout file.
    pub fn load(path: impl AsRef<Path>, catalog: Arc<PieceCatalog>) -> AnyResult<Self> {
        let document = LayoutDocument::load_from_file(path.as_ref(), &catalog)?;
        Layout::from_document(&document, catalog)
            .with_context(|| format!("Failed to build layout from {}", path.as_ref().display()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> AnyResult<()> {
        self.to_document()
            .context("Failed to serialize layout")?
            .save_to_file(path)
    }
}

fn apply_component_data(piece: &mut Piece, component: &ComponentData) {
    let data = &mut piece.data;
    if let Some(width) = component.width {
        data.width = width;
    }
    if let Some(height) = component.height {
        data.height = height;
    }
    if component.units.is_some() {
        data.units = component.units;
    }
    if component.color.is_some() {
        data.color = component.color.clone();
    }
    if component.shape.is_some() {
        data.shape = component.shape;
    }
    if component.text.is_some() {
        data.text = component.text.clone();
    }
    if component.font_size.is_some() {
        data.font_size = component.font_size;
    }
}
