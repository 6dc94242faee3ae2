//! Groups.

use trackplan_core::{GroupId, Node};

/// A composite node holding pieces and nested groups.
///
/// Membership is recorded on both sides: `members` here and the member's
/// `group` back-reference (a [`Piece::group`](crate::Piece::group) or the
/// nested group's `parent`). Both are ids into the layout arenas; neither
/// side owns the other.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub(crate) id: GroupId,
    pub(crate) temporary: bool,
    pub(crate) members: Vec<Node>,
    pub(crate) parent: Option<GroupId>,
}

impl Group {
    pub(crate) fn new(id: GroupId, temporary: bool) -> Self {
        Self {
            id,
            temporary,
            members: Vec::new(),
            parent: None,
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Temporary groups exist for multi-selection and are never persisted.
    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn is_permanent(&self) -> bool {
        !self.temporary
    }

    /// Direct members, in insertion order.
    pub fn members(&self) -> &[Node] {
        &self.members
    }

    pub fn contains(&self, node: &Node) -> bool {
        self.members.contains(node)
    }

    /// The group this one is nested in.
    pub fn parent(&self) -> Option<GroupId> {
        self.parent
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
