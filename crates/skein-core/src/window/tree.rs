// Copyright 2026 The Skein Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The window split tree (spec §3 "Window tree", §4.F): a binary tree of
//! splits whose leaves are windows. Resizing the root (SIGWINCH) walks the
//! tree top-down, recomputing every rectangle from its split percentage;
//! no rectangle is ever stored independent of its ancestors' sizes.

use crate::arena::{Arena, Handle};
use crate::buffer::Buffer;
use crate::dirty::RefreshLevel;
use crate::error::{EngineError, EngineResult};
use crate::signal::{Bus, Signal, SignalSink};
use crate::window::scroll::RelativeScroll;
use crate::window::window::{Rect, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

pub enum NodeKind {
    Leaf { window: Handle<Window> },
    Split { orientation: Orientation, split_pct: u8, left: Handle<TreeNode>, right: Handle<TreeNode> },
}

pub struct TreeNode {
    pub parent: Option<Handle<TreeNode>>,
    pub kind: NodeKind,
}

/// Direction for directional window focus (spec §4.F "Directional focus").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

pub struct WindowTree<S: SignalSink> {
    nodes: Arena<TreeNode>,
    pub windows: Arena<Window>,
    root: Handle<TreeNode>,
    /// Windows in creation order; used by `switch_next`/`switch_previous`
    /// and to assign the next window number (spec §3 invariant: "window
    /// numbers are dense 1..N, reassigned on close").
    order: Vec<Handle<Window>>,
    current: Handle<Window>,
    signals: Bus<S>,
    /// The window currently occupying the whole root rectangle, if any
    /// (spec §4.F "Zoom"). While set, `resize_root` skips the normal
    /// split-tree relayout and just grows this window to fill the screen.
    zoomed: Option<Handle<Window>>,
    last_rect: Rect,
}

impl<S: SignalSink> WindowTree<S> {
    /// Builds a tree with a single window filling `rect` and showing
    /// `buffer`.
    pub fn new(rect: Rect, buffer: Handle<Buffer>, sink: S) -> Self {
        let mut nodes = Arena::new();
        let mut windows = Arena::new();
        let leaf = nodes.insert(TreeNode { parent: None, kind: NodeKind::Leaf { window: Handle::dangling() } });
        let window = windows.insert(Window::new(1, rect, buffer, leaf));
        if let Some(node) = nodes.get_mut(leaf) {
            node.kind = NodeKind::Leaf { window };
        }
        WindowTree {
            nodes,
            windows,
            root: leaf,
            order: vec![window],
            current: window,
            signals: Bus::new(sink),
            zoomed: None,
            last_rect: rect,
        }
    }

    pub fn current(&self) -> Handle<Window> {
        self.current
    }

    pub fn get(&self, h: Handle<Window>) -> Option<&Window> {
        self.windows.get(h)
    }

    pub fn get_mut(&mut self, h: Handle<Window>) -> Option<&mut Window> {
        self.windows.get_mut(h)
    }

    pub fn order(&self) -> &[Handle<Window>] {
        &self.order
    }

    pub fn signals_mut(&mut self) -> &mut Bus<S> {
        &mut self.signals
    }

    fn leaf_of(&self, window: Handle<Window>) -> Option<Handle<TreeNode>> {
        self.windows.get(window).map(|w| w.tree_leaf)
    }

    /// Splits the window showing `target` into two, the new window taking
    /// `split_pct` percent of the resulting space and showing `new_buffer`
    /// (spec §4.F "Split"). Renumbers every window 1..N in tree order.
    pub fn split(
        &mut self,
        target: Handle<Window>,
        orientation: Orientation,
        split_pct: u8,
        new_buffer: Handle<Buffer>,
    ) -> EngineResult<Handle<Window>> {
        if !(1..100).contains(&split_pct) {
            return Err(EngineError::Validation("split percentage must be between 1 and 99".into()));
        }
        let leaf = self.leaf_of(target).ok_or_else(|| EngineError::NotFound("window".into()))?;
        let parent = self.nodes.get(leaf).and_then(|n| n.parent);

        let target_rect = self.windows.get(target).map(|w| w.rect).unwrap();
        let (rect_a, rect_b) = split_rect(target_rect, orientation, split_pct);

        let new_leaf_a = self.nodes.insert(TreeNode { parent: None, kind: NodeKind::Leaf { window: target } });
        let new_window = Window::new(0, rect_b, new_buffer, Handle::dangling());
        let new_window_handle = self.windows.insert(new_window);
        let new_leaf_b =
            self.nodes.insert(TreeNode { parent: None, kind: NodeKind::Leaf { window: new_window_handle } });

        let split_node = self.nodes.insert(TreeNode {
            parent,
            kind: NodeKind::Split { orientation, split_pct, left: new_leaf_a, right: new_leaf_b },
        });
        if let Some(n) = self.nodes.get_mut(new_leaf_a) {
            n.parent = Some(split_node);
        }
        if let Some(n) = self.nodes.get_mut(new_leaf_b) {
            n.parent = Some(split_node);
        }

        if let Some(p) = parent {
            replace_child(&mut self.nodes, p, leaf, split_node);
        } else {
            self.root = split_node;
        }
        self.nodes.remove(leaf);

        if let Some(w) = self.windows.get_mut(target) {
            w.tree_leaf = new_leaf_a;
            w.rect = rect_a;
            w.chat_rect = rect_a;
        }
        if let Some(w) = self.windows.get_mut(new_window_handle) {
            w.tree_leaf = new_leaf_b;
        }

        let insert_at = self.order.iter().position(|w| *w == target).map(|i| i + 1).unwrap_or(self.order.len());
        self.order.insert(insert_at, new_window_handle);
        self.renumber();
        self.current = new_window_handle;
        self.signals.emit(Signal::WindowOpened(new_window_handle));
        Ok(new_window_handle)
    }

    pub fn split_horizontal(&mut self, target: Handle<Window>, split_pct: u8, buffer: Handle<Buffer>) -> EngineResult<Handle<Window>> {
        self.split(target, Orientation::Horizontal, split_pct, buffer)
    }

    pub fn split_vertical(&mut self, target: Handle<Window>, split_pct: u8, buffer: Handle<Buffer>) -> EngineResult<Handle<Window>> {
        self.split(target, Orientation::Vertical, split_pct, buffer)
    }

    /// Merges `target` into its sibling, collapsing the parent split node
    /// (spec §4.F "Merge"). The sibling takes over the full rectangle.
    pub fn merge(&mut self, target: Handle<Window>) -> EngineResult<()> {
        if self.order.len() <= 1 {
            return Err(EngineError::Validation("cannot merge the only window".into()));
        }
        self.signals.emit(Signal::WindowClosing(target));
        if self.zoomed == Some(target) {
            self.zoomed = None;
        }
        let leaf = self.leaf_of(target).ok_or_else(|| EngineError::NotFound("window".into()))?;
        let parent = self.nodes.get(leaf).and_then(|n| n.parent).ok_or_else(|| EngineError::Validation("window has no sibling".into()))?;
        let (left, right) = match &self.nodes.get(parent).unwrap().kind {
            NodeKind::Split { left, right, .. } => (*left, *right),
            NodeKind::Leaf { .. } => unreachable!("parent must be a split node"),
        };
        let sibling_leaf = if left == leaf { right } else { left };
        let grandparent = self.nodes.get(parent).and_then(|n| n.parent);

        if let Some(gp) = grandparent {
            replace_child(&mut self.nodes, gp, parent, sibling_leaf);
            if let Some(n) = self.nodes.get_mut(sibling_leaf) {
                n.parent = Some(gp);
            }
        } else {
            self.root = sibling_leaf;
            if let Some(n) = self.nodes.get_mut(sibling_leaf) {
                n.parent = None;
            }
        }

        let was_rect = self.windows.get(target).map(|w| w.rect);
        self.nodes.remove(leaf);
        self.nodes.remove(parent);
        self.windows.remove(target);
        self.order.retain(|w| *w != target);
        self.renumber();

        if let Some(rect) = was_rect {
            self.relayout_subtree(sibling_leaf, rect);
        }

        if self.current == target {
            self.current = *self.order.first().expect("at least one window remains");
        }
        self.signals.emit(Signal::WindowClosed(target));
        Ok(())
    }

    /// Collapses the whole tree to a single window, keeping `keep`'s buffer
    /// (spec §4.F "merge_all").
    pub fn merge_all(&mut self, keep: Handle<Window>) -> EngineResult<()> {
        let others: Vec<Handle<Window>> = self.order.iter().copied().filter(|w| *w != keep).collect();
        for w in others {
            if self.windows.is_valid(w) {
                self.merge(w)?;
            }
        }
        Ok(())
    }

    /// Recomputes every rectangle from the root down (spec §4.F "Resize /
    /// SIGWINCH"): the only place rectangles are derived bottom-up is the
    /// split percentages themselves, never a stored absolute size.
    pub fn resize_root(&mut self, rect: Rect) {
        self.last_rect = rect;
        if let Some(zoomed) = self.zoomed {
            if let Some(w) = self.windows.get_mut(zoomed) {
                w.resize(rect);
            }
        } else {
            let root = self.root;
            self.relayout_subtree(root, rect);
        }
        self.signals.emit(Signal::SignalSigwinch);
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoomed.is_some()
    }

    /// Toggles full-screen zoom on the current window (spec §4.F "Zoom").
    /// Zooming grows the window to the whole root rectangle without
    /// touching the split tree underneath; unzooming just relayouts the
    /// tree as it would be after any ordinary resize.
    pub fn zoom_toggle(&mut self) -> EngineResult<()> {
        if let Some(w) = self.zoomed {
            self.signals.emit(Signal::WindowUnzoom(w));
            let root = self.root;
            let rect = self.last_rect;
            self.relayout_subtree(root, rect);
            self.zoomed = None;
            self.signals.emit(Signal::WindowUnzoomed(w));
            return Ok(());
        }
        if self.order.len() <= 1 {
            return Err(EngineError::Validation("cannot zoom the only window".into()));
        }
        let w = self.current;
        self.signals.emit(Signal::WindowZoom(w));
        let rect = self.last_rect;
        if let Some(win) = self.windows.get_mut(w) {
            win.resize(rect);
        }
        self.zoomed = Some(w);
        self.signals.emit(Signal::WindowZoomed(w));
        Ok(())
    }

    /// Moves `window`'s scroll position by a relative scroll command (spec
    /// §4.F "Scroll commands"). Time-based units are treated as line counts
    /// — this store has no per-line timestamp index to resolve them against.
    pub fn scroll_relative(&mut self, window: Handle<Window>, scroll: RelativeScroll, total_lines: usize) -> EngineResult<()> {
        let win = self.windows.get_mut(window).ok_or_else(|| EngineError::NotFound("window".into()))?;
        let max_line = total_lines.saturating_sub(1);
        let state = win.current_scroll_mut();
        let delta = scroll.amount.max(0);
        let current = state.start_line as i64;
        let moved = if scroll.backward { current - delta } else { current + delta };
        state.start_line = moved.clamp(0, max_line as i64) as usize;
        state.scrolling = state.start_line != 0 || state.start_col != 0;
        win.refresh.ask(RefreshLevel::ChatRows);
        self.signals.emit(Signal::WindowScrolled(window));
        Ok(())
    }

    fn relayout_subtree(&mut self, node: Handle<TreeNode>, rect: Rect) {
        let kind_is_split = matches!(self.nodes.get(node).map(|n| &n.kind), Some(NodeKind::Split { .. }));
        if kind_is_split {
            let (orientation, split_pct, left, right) = match &self.nodes.get(node).unwrap().kind {
                NodeKind::Split { orientation, split_pct, left, right } => (*orientation, *split_pct, *left, *right),
                _ => unreachable!(),
            };
            let (rect_a, rect_b) = split_rect(rect, orientation, split_pct);
            self.relayout_subtree(left, rect_a);
            self.relayout_subtree(right, rect_b);
        } else if let NodeKind::Leaf { window } = self.nodes.get(node).unwrap().kind {
            if let Some(w) = self.windows.get_mut(window) {
                w.resize(rect);
            }
        }
    }

    fn renumber(&mut self) {
        for (i, w) in self.order.iter().enumerate() {
            if let Some(win) = self.windows.get_mut(*w) {
                win.number = (i + 1) as i64;
            }
        }
    }

    pub fn switch_next(&mut self) -> Handle<Window> {
        let idx = self.order.iter().position(|w| *w == self.current).unwrap_or(0);
        self.current = self.order[(idx + 1) % self.order.len()];
        self.signals.emit(Signal::WindowSwitch(self.current));
        self.current
    }

    pub fn switch_previous(&mut self) -> Handle<Window> {
        let idx = self.order.iter().position(|w| *w == self.current).unwrap_or(0);
        self.current = self.order[(idx + self.order.len() - 1) % self.order.len()];
        self.signals.emit(Signal::WindowSwitch(self.current));
        self.current
    }

    pub fn switch_to(&mut self, target: Handle<Window>) -> EngineResult<()> {
        if !self.windows.is_valid(target) {
            return Err(EngineError::NotFound("window".into()));
        }
        self.current = target;
        self.signals.emit(Signal::WindowSwitch(self.current));
        Ok(())
    }

    /// Picks the window geometrically closest in `direction` from the
    /// current one, preferring the smallest perpendicular-axis offset on
    /// ties (spec §4.F "Directional focus").
    pub fn switch_direction(&mut self, direction: Direction) -> Option<Handle<Window>> {
        let cur = self.windows.get(self.current)?.rect;
        let mut best: Option<(Handle<Window>, u32, u32)> = None;
        for &candidate in &self.order {
            if candidate == self.current {
                continue;
            }
            let r = self.windows.get(candidate)?.rect;
            let eligible = match direction {
                Direction::Up => r.y + r.height <= cur.y,
                Direction::Down => r.y >= cur.y + cur.height,
                Direction::Left => r.x + r.width <= cur.x,
                Direction::Right => r.x >= cur.x + cur.width,
            };
            if !eligible {
                continue;
            }
            let primary = match direction {
                Direction::Up => cur.y - (r.y + r.height),
                Direction::Down => r.y - (cur.y + cur.height),
                Direction::Left => cur.x - (r.x + r.width),
                Direction::Right => r.x - (cur.x + cur.width),
            } as u32;
            let perpendicular = match direction {
                Direction::Up | Direction::Down => (r.x as i32 - cur.x as i32).unsigned_abs(),
                Direction::Left | Direction::Right => (r.y as i32 - cur.y as i32).unsigned_abs(),
            };
            if best.map(|(_, p, s)| (primary, perpendicular) < (p, s)).unwrap_or(true) {
                best = Some((candidate, primary, perpendicular));
            }
        }
        if let Some((w, _, _)) = best {
            self.current = w;
            self.signals.emit(Signal::WindowSwitch(w));
        }
        best.map(|(w, _, _)| w)
    }
}

fn replace_child(nodes: &mut Arena<TreeNode>, parent: Handle<TreeNode>, old: Handle<TreeNode>, new: Handle<TreeNode>) {
    if let Some(n) = nodes.get_mut(parent) {
        if let NodeKind::Split { left, right, .. } = &mut n.kind {
            if *left == old {
                *left = new;
            } else if *right == old {
                *right = new;
            }
        }
    }
}

fn split_rect(rect: Rect, orientation: Orientation, split_pct: u8) -> (Rect, Rect) {
    match orientation {
        Orientation::Horizontal => {
            let top_height = (rect.height as u32 * split_pct as u32 / 100).max(1) as u16;
            let top_height = top_height.min(rect.height.saturating_sub(1)).max(1);
            let a = Rect { x: rect.x, y: rect.y, width: rect.width, height: top_height };
            let b = Rect { x: rect.x, y: rect.y + top_height, width: rect.width, height: rect.height - top_height };
            (a, b)
        }
        Orientation::Vertical => {
            let left_width = (rect.width as u32 * split_pct as u32 / 100).max(1) as u16;
            let left_width = left_width.min(rect.width.saturating_sub(1)).max(1);
            let a = Rect { x: rect.x, y: rect.y, width: left_width, height: rect.height };
            let b = Rect { x: rect.x + left_width, y: rect.y, width: rect.width - left_width, height: rect.height };
            (a, b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena as GenericArena;
    use crate::buffer::Buffer as CoreBuffer;
    use crate::config::EngineConfig;
    use crate::signal::RecordingSink;

    fn make_buffer_handle(arena: &mut GenericArena<CoreBuffer>) -> Handle<CoreBuffer> {
        let config = EngineConfig::default();
        arena.insert(CoreBuffer::new(1, "core", "weechat", crate::buffer::BufferKind::Formatted, &config))
    }

    #[test]
    fn split_then_merge_restores_single_window() {
        let mut buffers = GenericArena::new();
        let b = make_buffer_handle(&mut buffers);
        let full = Rect { x: 0, y: 0, width: 80, height: 24 };
        let mut tree = WindowTree::new(full, b, RecordingSink::default());
        let root_win = tree.current();

        let new_win = tree.split_horizontal(root_win, 50, b).unwrap();
        assert_eq!(tree.order().len(), 2);
        assert_eq!(tree.get(root_win).unwrap().rect.height, 12);
        assert_eq!(tree.get(new_win).unwrap().rect.y, 12);

        tree.merge(new_win).unwrap();
        assert_eq!(tree.order().len(), 1);
        assert_eq!(tree.get(root_win).unwrap().rect, full);
    }

    #[test]
    fn resize_root_recomputes_split_rects() {
        let mut buffers = GenericArena::new();
        let b = make_buffer_handle(&mut buffers);
        let full = Rect { x: 0, y: 0, width: 80, height: 24 };
        let mut tree = WindowTree::new(full, b, RecordingSink::default());
        let root_win = tree.current();
        let new_win = tree.split_vertical(root_win, 30, b).unwrap();

        tree.resize_root(Rect { x: 0, y: 0, width: 100, height: 40 });
        assert_eq!(tree.get(root_win).unwrap().rect.width, 30);
        assert_eq!(tree.get(new_win).unwrap().rect.width, 70);
        assert_eq!(tree.get(root_win).unwrap().rect.height, 40);
    }

    #[test]
    fn switch_next_wraps_around() {
        let mut buffers = GenericArena::new();
        let b = make_buffer_handle(&mut buffers);
        let full = Rect { x: 0, y: 0, width: 80, height: 24 };
        let mut tree = WindowTree::new(full, b, RecordingSink::default());
        let root_win = tree.current();
        let new_win = tree.split_horizontal(root_win, 50, b).unwrap();
        assert_eq!(tree.current(), new_win);
        let next = tree.switch_next();
        assert_eq!(next, root_win);
        let next2 = tree.switch_next();
        assert_eq!(next2, new_win);
    }

    #[test]
    fn directional_focus_picks_window_below() {
        let mut buffers = GenericArena::new();
        let b = make_buffer_handle(&mut buffers);
        let full = Rect { x: 0, y: 0, width: 80, height: 24 };
        let mut tree = WindowTree::new(full, b, RecordingSink::default());
        let top = tree.current();
        let bottom = tree.split_horizontal(top, 50, b).unwrap();
        tree.switch_to(top).unwrap();
        let found = tree.switch_direction(Direction::Down);
        assert_eq!(found, Some(bottom));
    }

    #[test]
    fn zoom_toggle_fills_root_then_restores_split() {
        let mut buffers = GenericArena::new();
        let b = make_buffer_handle(&mut buffers);
        let full = Rect { x: 0, y: 0, width: 80, height: 24 };
        let mut tree = WindowTree::new(full, b, RecordingSink::default());
        let root_win = tree.current();
        tree.split_horizontal(root_win, 50, b).unwrap();
        tree.switch_to(root_win).unwrap();

        assert!(!tree.is_zoomed());
        tree.zoom_toggle().unwrap();
        assert!(tree.is_zoomed());
        assert_eq!(tree.get(root_win).unwrap().rect, full);

        tree.zoom_toggle().unwrap();
        assert!(!tree.is_zoomed());
        assert_eq!(tree.get(root_win).unwrap().rect.height, 12);
    }

    #[test]
    fn zoom_toggle_rejects_the_only_window() {
        let mut buffers = GenericArena::new();
        let b = make_buffer_handle(&mut buffers);
        let full = Rect { x: 0, y: 0, width: 80, height: 24 };
        let mut tree = WindowTree::new(full, b, RecordingSink::default());
        assert!(tree.zoom_toggle().is_err());
    }

    #[test]
    fn scroll_relative_clamps_to_available_lines() {
        let mut buffers = GenericArena::new();
        let b = make_buffer_handle(&mut buffers);
        let full = Rect { x: 0, y: 0, width: 80, height: 24 };
        let mut tree = WindowTree::new(full, b, RecordingSink::default());
        let win = tree.current();

        let back = RelativeScroll { backward: true, amount: 5, unit: crate::window::scroll::ScrollUnit::Lines };
        tree.scroll_relative(win, back, 100).unwrap();
        assert_eq!(tree.get(win).unwrap().current_scroll().start_line, 95);
        assert!(tree.get(win).unwrap().current_scroll().scrolling);

        let forward_overshoot =
            RelativeScroll { backward: false, amount: 1000, unit: crate::window::scroll::ScrollUnit::Lines };
        tree.scroll_relative(win, forward_overshoot, 100).unwrap();
        assert_eq!(tree.get(win).unwrap().current_scroll().start_line, 99);
    }

    #[test]
    fn merging_the_zoomed_window_clears_zoom() {
        let mut buffers = GenericArena::new();
        let b = make_buffer_handle(&mut buffers);
        let full = Rect { x: 0, y: 0, width: 80, height: 24 };
        let mut tree = WindowTree::new(full, b, RecordingSink::default());
        let root_win = tree.current();
        let new_win = tree.split_horizontal(root_win, 50, b).unwrap();
        tree.switch_to(new_win).unwrap();
        tree.zoom_toggle().unwrap();
        assert!(tree.is_zoomed());

        tree.merge(new_win).unwrap();
        assert!(!tree.is_zoomed());
        assert_eq!(tree.order().len(), 1);
    }
}
