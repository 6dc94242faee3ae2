//! Rendering collaborator.
//!
//! The layout tells the scene graph when a piece comes into existence and when
//! it goes away. It never reads anything back.

use trackplan_core::PieceId;

use crate::piece::Piece;

pub trait SceneSink {
    /// A piece was created and needs a renderable node.
    fn attach(&mut self, piece: &Piece);

    /// A piece was destroyed; its node must be removed.
    fn detach(&mut self, id: PieceId);
}

/// Scene sink that renders nothing (headless use, tests, the CLI).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullScene;

impl SceneSink for NullScene {
    fn attach(&mut self, _piece: &Piece) {}

    fn detach(&mut self, _id: PieceId) {}
}
