//! Group membership.
//!
//! Every membership change goes through `attach_member` / `detach_member`,
//! which update both sides of the relation.

use std::collections::HashSet;

use trackplan_core::{GroupError, GroupId, LayerId, LayoutError, Node, Result};

use super::Layout;
use crate::group::Group;

impl Layout {
    /// Creates an empty group.
    pub fn create_group(&mut self, temporary: bool) -> GroupId {
        let id = GroupId::new();
        self.groups.insert(id, Group::new(id, temporary));
        id
    }

    /// Creates a group holding `nodes`.
    ///
    /// Nothing changes unless every node exists and none already has an
    /// owner. A permanent group also requires all its pieces to share a layer.
    pub fn group_nodes(&mut self, nodes: &[Node], temporary: bool) -> Result<GroupId> {
        let mut seen = HashSet::new();
        let nodes: Vec<Node> = nodes.iter().copied().filter(|n| seen.insert(*n)).collect();
        for node in &nodes {
            self.require_node(*node)?;
            if let Some(owner) = self.owner_of(*node) {
                tracing::warn!("Cannot group {}: already in group {}", node, owner);
                return Err(GroupError::AlreadyGrouped {
                    member: *node,
                    owner,
                }
                .into());
            }
        }

        let id = GroupId::new();
        if !temporary && !self.shares_layer(&nodes) {
            tracing::warn!("Refusing permanent group spanning several layers");
            return Err(GroupError::CrossLayer(id).into());
        }
        self.groups.insert(id, Group::new(id, temporary));
        for node in nodes {
            self.attach_member(id, node);
        }
        Ok(id)
    }

    /// Adds a node to a group.
    ///
    /// # Errors
    /// * `SelfContainment` if `node` is the group or one of its ancestors
    /// * `AlreadyGrouped` if `node` already has an owner (logged, state unchanged)
    /// * `CrossLayer` if a permanent group would span layers
    pub fn add_to_group(&mut self, group: GroupId, node: Node) -> Result<()> {
        let temporary = self.require_group(group)?.temporary;
        self.require_node(node)?;

        if let Node::Group(candidate) = node {
            if self.is_ancestor(candidate, group) {
                tracing::warn!("Refusing to nest group {} inside itself", group);
                return Err(GroupError::SelfContainment(group).into());
            }
        }
        if let Some(owner) = self.owner_of(node) {
            tracing::warn!(
                "Cannot add {} to group {}: already in group {}",
                node,
                group,
                owner
            );
            return Err(GroupError::AlreadyGrouped {
                member: node,
                owner,
            }
            .into());
        }
        if !temporary && !self.shares_layer(&[Node::Group(group), node]) {
            tracing::warn!("Refusing to add {} to group {}: different layer", node, group);
            return Err(GroupError::CrossLayer(group).into());
        }

        self.attach_member(group, node);
        Ok(())
    }

    /// Removes a direct member and clears its back-reference.
    pub fn remove_from_group(&mut self, group: GroupId, node: Node) -> Result<()> {
        if !self.require_group(group)?.contains(&node) {
            return Err(GroupError::NotMember {
                member: node,
                group,
            }
            .into());
        }
        self.detach_member(group, node);
        Ok(())
    }

    /// Promotes a temporary group or demotes a permanent one. The id and the
    /// members are left exactly as they are.
    pub fn set_group_temporary(&mut self, group: GroupId, temporary: bool) -> Result<()> {
        self.require_group(group)?;
        if !temporary && !self.shares_layer(&[Node::Group(group)]) {
            return Err(GroupError::CrossLayer(group).into());
        }
        if let Some(g) = self.groups.get_mut(&group) {
            g.temporary = temporary;
        }
        Ok(())
    }

    /// Dissolves a group. Its members move up to the group's parent, or
    /// become free when it had none. Returns the former members.
    pub fn ungroup(&mut self, group: GroupId) -> Result<Vec<Node>> {
        let Group {
            members, parent, ..
        } = self.require_group(group)?.clone();

        if let Some(parent) = parent {
            self.detach_member(parent, Node::Group(group));
        }
        for member in &members {
            self.set_owner(*member, None);
        }
        self.groups.remove(&group);
        if let Some(parent) = parent {
            for member in &members {
                self.attach_member(parent, *member);
            }
            self.prune_empty(parent);
        }
        self.session.forget_node(Node::Group(group));
        Ok(members)
    }

    /// Dissolves a temporary group. Permanent groups are left alone and
    /// `false` is returned.
    pub fn discard_group(&mut self, group: GroupId) -> Result<bool> {
        if !self.require_group(group)?.temporary {
            return Ok(false);
        }
        self.ungroup(group)?;
        Ok(true)
    }

    /// Destroys a group together with every piece and group inside it.
    pub fn destroy_group(&mut self, group: GroupId) -> Result<()> {
        self.require_group(group)?;
        for piece in self.leaves(Node::Group(group)) {
            self.destroy_piece(piece)?;
        }
        // groups with no pieces survive the loop above
        if self.groups.contains_key(&group) {
            let mut stack = vec![group];
            let mut doomed = Vec::new();
            while let Some(id) = stack.pop() {
                if let Some(g) = self.groups.get(&id) {
                    stack.extend(g.members.iter().filter_map(Node::as_group));
                    doomed.push(id);
                }
            }
            if let Some(parent) = self.groups.get(&group).and_then(|g| g.parent) {
                self.detach_member(parent, Node::Group(group));
            }
            for id in doomed {
                self.groups.remove(&id);
                self.session.forget_node(Node::Group(id));
            }
        }
        Ok(())
    }

    /// The group a node directly belongs to.
    pub fn owner_of(&self, node: Node) -> Option<GroupId> {
        match node {
            Node::Piece(id) => self.pieces.get(&id).and_then(|p| p.group),
            Node::Group(id) => self.groups.get(&id).and_then(|g| g.parent),
        }
    }

    /// Outermost group enclosing a node, if any.
    pub fn root_group(&self, node: Node) -> Option<GroupId> {
        let mut root = None;
        let mut current = self.owner_of(node);
        while let Some(id) = current {
            root = Some(id);
            current = self.groups.get(&id).and_then(|g| g.parent);
        }
        root
    }

    /// Outermost permanent group enclosing a node, if any.
    pub fn outermost_permanent_group(&self, node: Node) -> Option<GroupId> {
        let mut found = None;
        let mut current = self.owner_of(node);
        while let Some(id) = current {
            let Some(group) = self.groups.get(&id) else {
                break;
            };
            if group.is_permanent() {
                found = Some(id);
            }
            current = group.parent;
        }
        found
    }

    pub(crate) fn require_node(&self, node: Node) -> std::result::Result<(), LayoutError> {
        match node {
            Node::Piece(id) => self.require_piece(id).map(|_| ()),
            Node::Group(id) => self.require_group(id).map(|_| ()),
        }
    }

    pub(crate) fn attach_member(&mut self, group: GroupId, node: Node) {
        if let Some(g) = self.groups.get_mut(&group) {
            g.members.push(node);
        }
        self.set_owner(node, Some(group));
    }

    pub(crate) fn detach_member(&mut self, group: GroupId, node: Node) {
        if let Some(g) = self.groups.get_mut(&group) {
            g.members.retain(|m| *m != node);
        }
        self.set_owner(node, None);
    }

    /// Removes `group` if it is empty, then its parent if that became empty,
    /// and so on upwards.
    pub(crate) fn prune_empty(&mut self, group: GroupId) {
        let mut current = Some(group);
        while let Some(id) = current {
            let Some(g) = self.groups.get(&id) else {
                break;
            };
            if !g.members.is_empty() {
                break;
            }
            let parent = g.parent;
            self.groups.remove(&id);
            if let Some(parent) = parent {
                self.detach_member(parent, Node::Group(id));
            }
            self.session.forget_node(Node::Group(id));
            current = parent;
        }
    }

    /// Dissolves every temporary group except `keep`.
    pub(crate) fn discard_temporary_groups(&mut self, keep: Option<GroupId>) {
        let temporary: Vec<GroupId> = self
            .groups
            .values()
            .filter(|g| g.temporary && Some(g.id) != keep)
            .map(|g| g.id)
            .collect();
        for id in temporary {
            if self.groups.contains_key(&id) {
                if let Err(err) = self.ungroup(id) {
                    tracing::warn!("Failed to discard group {}: {}", id, err);
                }
            }
        }
    }

    fn set_owner(&mut self, node: Node, owner: Option<GroupId>) {
        match node {
            Node::Piece(id) => {
                if let Some(piece) = self.pieces.get_mut(&id) {
                    piece.group = owner;
                }
            }
            Node::Group(id) => {
                if let Some(group) = self.groups.get_mut(&id) {
                    group.parent = owner;
                }
            }
        }
    }

    /// True when `candidate` is `group` or one of its ancestors.
    pub(crate) fn is_ancestor(&self, candidate: GroupId, group: GroupId) -> bool {
        let mut current = Some(group);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.groups.get(&id).and_then(|g| g.parent);
        }
        false
    }

    /// True when every leaf piece of `nodes` lives on one layer.
    fn shares_layer(&self, nodes: &[Node]) -> bool {
        let layers: HashSet<LayerId> = nodes
            .iter()
            .flat_map(|node| self.leaves(*node))
            .filter_map(|id| self.pieces.get(&id).map(|p| p.layer))
            .collect();
        layers.len() <= 1
    }
}
