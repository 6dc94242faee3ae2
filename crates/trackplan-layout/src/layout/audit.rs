//! Structural self-check.

use std::collections::HashSet;

use trackplan_core::{GroupId, LayerId, Node};

use super::Layout;

impl Layout {
    /// Checks every structural invariant and describes each violation.
    ///
    /// An empty result means: links are symmetric, every open connector is
    /// indexed exactly once on its own layer and no linked one is, the
    /// registry covers every connector, group back-references agree with
    /// member lists, groups are acyclic, permanent groups stay on one layer,
    /// and (outside a drag) the hit index holds every piece.
    pub fn audit(&self) -> Vec<String> {
        let mut problems = Vec::new();
        self.audit_pieces(&mut problems);
        self.audit_layers(&mut problems);
        self.audit_groups(&mut problems);

        let connectors: usize = self.pieces.values().map(|p| p.connections.len()).sum();
        if self.registry.len() != connectors {
            problems.push(format!(
                "registry has {} entries for {} connectors",
                self.registry.len(),
                connectors
            ));
        }
        if !self.session.is_dragging() && self.hit_index.len() != self.pieces.len() {
            problems.push(format!(
                "hit index has {} entries for {} pieces",
                self.hit_index.len(),
                self.pieces.len()
            ));
        }
        problems
    }

    fn audit_pieces(&self, problems: &mut Vec<String>) {
        for piece in self.pieces.values() {
            let Some(layer) = self.layer(piece.layer) else {
                problems.push(format!("piece {} is on missing {}", piece.id, piece.layer));
                continue;
            };
            let copies = layer.children.iter().filter(|c| **c == piece.id).count();
            if copies != 1 {
                problems.push(format!(
                    "piece {} appears {} times in {}",
                    piece.id, copies, piece.layer
                ));
            }

            for (index, conn) in piece.connections.iter().enumerate() {
                match self.registry.get(&conn.id) {
                    Some(slot) if slot.piece == piece.id && slot.index == index => {}
                    _ => problems.push(format!("connection {} is not registered", conn.id)),
                }
                if conn.owner != piece.id {
                    problems.push(format!("connection {} has the wrong owner", conn.id));
                }
                match conn.other {
                    None => {
                        if !layer.open.contains(&conn.id) {
                            problems.push(format!("open connection {} is not indexed", conn.id));
                        }
                    }
                    Some(other) => {
                        if layer.open.contains(&conn.id) {
                            problems.push(format!("linked connection {} is indexed", conn.id));
                        }
                        match self.connection(other) {
                            Some(partner) if partner.other == Some(conn.id) => {
                                if partner.owner == piece.id {
                                    problems.push(format!(
                                        "connection {} is linked to its own piece",
                                        conn.id
                                    ));
                                }
                            }
                            _ => problems.push(format!(
                                "link {} -> {} is not symmetric",
                                conn.id, other
                            )),
                        }
                    }
                }
            }

            if let Some(group) = piece.group {
                let listed = self
                    .groups
                    .get(&group)
                    .is_some_and(|g| g.contains(&Node::Piece(piece.id)));
                if !listed {
                    problems.push(format!(
                        "piece {} points at group {} which does not list it",
                        piece.id, group
                    ));
                }
            }
        }
    }

    fn audit_layers(&self, problems: &mut Vec<String>) {
        for layer in &self.layers {
            for child in &layer.children {
                if self.pieces.get(child).map(|p| p.layer) != Some(layer.id()) {
                    problems.push(format!("{} lists foreign piece {}", layer.id(), child));
                }
            }
            for id in layer.open.iter() {
                let owned_here = self
                    .registry
                    .get(id)
                    .and_then(|slot| self.pieces.get(&slot.piece))
                    .is_some_and(|p| p.layer == layer.id());
                if !owned_here {
                    problems.push(format!("{} indexes foreign connection {}", layer.id(), id));
                }
                if self.connection(*id).is_some_and(|c| !c.is_open()) {
                    problems.push(format!("{} indexes linked connection {}", layer.id(), id));
                }
            }
        }
    }

    fn audit_groups(&self, problems: &mut Vec<String>) {
        let mut owners: HashSet<Node> = HashSet::new();
        for group in self.groups.values() {
            for member in &group.members {
                if !owners.insert(*member) {
                    problems.push(format!("{} has more than one owner", member));
                }
                if self.owner_of(*member) != Some(group.id) {
                    problems.push(format!(
                        "{} is listed in group {} but does not point back",
                        member, group.id
                    ));
                }
            }
            if let Some(parent) = group.parent {
                let listed = self
                    .groups
                    .get(&parent)
                    .is_some_and(|p| p.contains(&Node::Group(group.id)));
                if !listed {
                    problems.push(format!("group {} has a stale parent {}", group.id, parent));
                }
            }
            if self.has_cycle(group.id) {
                problems.push(format!("group {} contains itself", group.id));
            }
            if group.is_permanent() {
                let layers: HashSet<LayerId> = self
                    .leaves(Node::Group(group.id))
                    .iter()
                    .filter_map(|id| self.pieces.get(id).map(|p| p.layer))
                    .collect();
                if layers.len() > 1 {
                    problems.push(format!("permanent group {} spans layers", group.id));
                }
            }
        }
    }

    fn has_cycle(&self, group: GroupId) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(group);
        while let Some(id) = current {
            if !seen.insert(id) {
                return true;
            }
            current = self.groups.get(&id).and_then(|g| g.parent);
        }
        false
    }
}
