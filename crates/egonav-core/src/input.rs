//! User interactions understood by the explorer.

use serde::{Deserialize, Serialize};

/// What a pointer event landed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Target {
    Node(String),
    Edge(String),
    /// Empty canvas.
    Canvas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Space,
    Backspace,
    Delete,
    Escape,
}

/// One event fed to [`crate::explorer::Explorer::handle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Input {
    Click(Target),
    DoubleClick(Target),
    /// `None` when the pointer leaves every node and edge.
    Hover(Option<Target>),
    Key(Key),
    /// Click on row `n` of the current node's connection list.
    SelectConnection(usize),
    /// Restrict the connection list to one relation type, or lift the restriction.
    ConnectionFilter(Option<String>),
    /// Expand or collapse trail card `n`.
    ToggleCard(usize),
    CloseDetail,
    Search(String),
    ToggleEntityType(String),
    ToggleRelationType(String),
    ToggleCommunity(String),
    SetMinDegree(usize),
    Resize { width: f64, height: f64 },
}
