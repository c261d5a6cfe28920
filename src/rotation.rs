use alloc::vec::Vec;

use crate::Dir;

/// The direction a pivot moved during a rotation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RotationKind {
    Left,
    Right,
}

impl RotationKind {
    pub(crate) fn toward(dir: Dir) -> RotationKind {
        match dir {
            Dir::Left => RotationKind::Left,
            Dir::Right => RotationKind::Right,
        }
    }
}

/// A single rotation applied while rebalancing.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rotation<K> {
    pub kind: RotationKind,
    /// Key of the node that moved down.
    pub pivot: K,
    /// Key of the node that took the pivot's place.
    pub new_root: K,
}

/// The rotations applied by one insert or remove call, in application order.
pub type Rotations<K> = Vec<Rotation<K>>;
