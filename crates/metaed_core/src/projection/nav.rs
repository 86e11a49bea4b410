//! Keyboard navigation over the visible tree.
//!
//! Navigation works on the flattened visible list (`TreeProjection::visible`),
//! recomputed for every key so it always reflects current expansion state.

use crate::model::element::ElementId;
use crate::projection::tree::{DisplayHandle, DisplayNode, TreeProjection};

/// Navigation keys understood by the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Delete,
}

impl NavKey {
    /// Maps host key names (`ArrowUp`, `Enter`, ...) to navigation keys.
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" | "Up" => Some(Self::Up),
            "ArrowDown" | "Down" => Some(Self::Down),
            "ArrowLeft" | "Left" => Some(Self::Left),
            "ArrowRight" | "Right" => Some(Self::Right),
            "Enter" => Some(Self::Enter),
            "Delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Effect of one navigation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Selection moved to this node.
    Selected(DisplayHandle),
    Expanded(DisplayHandle),
    Collapsed(DisplayHandle),
    /// Caller should run the delete action on this element.
    DeleteRequested(ElementId),
    /// Key had no effect (end of list, leaf node, nothing selected).
    Unchanged,
}

impl TreeProjection {
    /// Applies one navigation key to selection and expansion state.
    pub fn navigate(&mut self, key: NavKey) -> NavOutcome {
        let visible = self.visible();
        let Some(selected) = self.selection() else {
            return match key {
                NavKey::Up | NavKey::Down => visible
                    .first()
                    .map_or(NavOutcome::Unchanged, |first| self.move_to(*first)),
                _ => NavOutcome::Unchanged,
            };
        };
        let Some(node) = self.node(selected) else {
            return NavOutcome::Unchanged;
        };
        let has_children = node.has_children();
        let expanded = node.is_expanded();
        let parent = node.parent();
        let first_child = node.children().first().copied();
        let element = node.element();

        match key {
            NavKey::Down => {
                let position = visible.iter().position(|handle| *handle == selected);
                match position.and_then(|index| visible.get(index + 1)) {
                    Some(next) => self.move_to(*next),
                    None => NavOutcome::Unchanged,
                }
            }
            NavKey::Up => {
                let position = visible.iter().position(|handle| *handle == selected);
                match position.and_then(|index| index.checked_sub(1)) {
                    Some(previous) => self.move_to(visible[previous]),
                    None => NavOutcome::Unchanged,
                }
            }
            NavKey::Right => match (has_children, expanded, first_child) {
                (true, false, _) => self.expand(selected),
                (true, true, Some(child)) => self.move_to(child),
                _ => NavOutcome::Unchanged,
            },
            NavKey::Left => {
                if has_children && expanded {
                    self.collapse(selected)
                } else {
                    parent.map_or(NavOutcome::Unchanged, |parent| self.move_to(parent))
                }
            }
            NavKey::Enter if has_children => match self.toggle(selected) {
                Ok(true) => NavOutcome::Expanded(selected),
                Ok(false) => NavOutcome::Collapsed(selected),
                Err(_) => NavOutcome::Unchanged,
            },
            NavKey::Enter => NavOutcome::Unchanged,
            NavKey::Delete => match (parent, element) {
                (Some(_), Some(element)) => NavOutcome::DeleteRequested(element),
                _ => NavOutcome::Unchanged,
            },
        }
    }

    fn move_to(&mut self, handle: DisplayHandle) -> NavOutcome {
        match self.select(Some(handle)) {
            Ok(_) => NavOutcome::Selected(handle),
            Err(_) => NavOutcome::Unchanged,
        }
    }

    fn expand(&mut self, handle: DisplayHandle) -> NavOutcome {
        match self.set_expanded(handle, true) {
            Ok(()) => NavOutcome::Expanded(handle),
            Err(_) => NavOutcome::Unchanged,
        }
    }

    fn collapse(&mut self, handle: DisplayHandle) -> NavOutcome {
        match self.set_expanded(handle, false) {
            Ok(()) => NavOutcome::Collapsed(handle),
            Err(_) => NavOutcome::Unchanged,
        }
    }

    /// Indented text rendering of the visible tree, one node per line.
    ///
    /// Collapsed nodes with children are marked `+`, expanded ones `-`, and
    /// the selected node is prefixed with `>`.
    pub fn render_text(&self) -> String {
        let selected = self.selection();
        self.visible()
            .into_iter()
            .filter_map(|handle| self.node(handle).map(|node| (handle, node)))
            .map(|(handle, node)| {
                let cursor = if selected == Some(handle) { '>' } else { ' ' };
                format!(
                    "{cursor}{}{} {}",
                    "  ".repeat(self.depth(handle)),
                    expansion_marker(node),
                    node.label()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn expansion_marker(node: &DisplayNode) -> char {
    match (node.has_children(), node.is_expanded()) {
        (false, _) => '.',
        (true, true) => '-',
        (true, false) => '+',
    }
}
