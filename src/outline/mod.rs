//! Scene outline
//!
//! A retained, collapsible tree built from a [`ProjectedNode`] snapshot. Each
//! entry has a text label bound to the node id and, when the node has
//! children, a toggle control whose `open` attribute decides whether the
//! children container is visible. Every call to [`OutlineView::render_tree`]
//! rebuilds the whole tree with all containers collapsed.

pub mod projection;

pub use projection::{project, ProjectedNode};

use crate::engine::NodeId;

pub const GLYPH_COLLAPSED: char = '+';
pub const GLYPH_EXPANDED: char = '-';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToggleControl {
    open: bool,
}

impl ToggleControl {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn glyph(&self) -> char {
        if self.open {
            GLYPH_EXPANDED
        } else {
            GLYPH_COLLAPSED
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    id: NodeId,
    label: String,
    title: String,
    control: Option<ToggleControl>,
    children: Vec<OutlineEntry>,
}

impl OutlineEntry {
    fn from_projected(node: &ProjectedNode) -> Self {
        let children: Vec<OutlineEntry> =
            node.children.iter().map(OutlineEntry::from_projected).collect();
        Self {
            id: node.id,
            label: node.name.clone(),
            title: node.name.clone(),
            control: (!children.is_empty()).then(ToggleControl::default),
            children,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// `None` for leaves, which have no toggle control.
    pub fn glyph(&self) -> Option<char> {
        self.control.map(|control| control.glyph())
    }

    pub fn children(&self) -> &[OutlineEntry] {
        &self.children
    }

    pub fn children_visible(&self) -> bool {
        self.control.is_some_and(|control| control.is_open())
    }

    fn find(&self, id: NodeId) -> Option<&OutlineEntry> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    fn find_mut(&mut self, id: NodeId) -> Option<&mut OutlineEntry> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    #[cfg(test)]
    fn collect_visible<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(&self.label);
        if self.children_visible() {
            for child in &self.children {
                child.collect_visible(out);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineAction {
    Toggle(NodeId),
    Select(NodeId),
}

#[derive(Debug, Default)]
pub struct OutlineView {
    entries: Vec<OutlineEntry>,
    selected: Option<NodeId>,
}

impl OutlineView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the previous outline.
    pub fn render_tree(&mut self, nodes: &[ProjectedNode]) {
        self.entries = nodes.iter().map(OutlineEntry::from_projected).collect();
        if let Some(selected) = self.selected {
            if self.entry(selected).is_none() {
                self.selected = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.selected = None;
    }

    pub fn roots(&self) -> &[OutlineEntry] {
        &self.entries
    }

    pub fn entry(&self, id: NodeId) -> Option<&OutlineEntry> {
        self.entries.iter().find_map(|entry| entry.find(id))
    }

    /// Flips the control's open state. Returns the new state, or `None` when
    /// the id has no control.
    pub fn on_toggle(&mut self, control: NodeId) -> Option<bool> {
        let entry = self
            .entries
            .iter_mut()
            .find_map(|entry| entry.find_mut(control))?;
        let toggle = entry.control.as_mut()?;
        toggle.open = !toggle.open;
        Some(toggle.open)
    }

    #[cfg(test)]
    pub fn glyph(&self, id: NodeId) -> Option<char> {
        self.entry(id)?.glyph()
    }

    #[cfg(test)]
    pub fn is_expanded(&self, id: NodeId) -> Option<bool> {
        self.entry(id)?.control.map(|control| control.is_open())
    }

    /// Records the selection and hands the id on.
    pub fn on_node_select(&mut self, id: NodeId) -> NodeId {
        self.selected = Some(id);
        id
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Labels currently shown, depth first.
    #[cfg(test)]
    pub fn visible_labels(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for entry in &self.entries {
            entry.collect_visible(&mut out);
        }
        out
    }

    pub fn show(&self, ui: &mut egui::Ui) -> Option<OutlineAction> {
        let mut action = None;
        for entry in &self.entries {
            show_entry(ui, entry, self.selected, &mut action);
        }
        action
    }
}

fn show_entry(
    ui: &mut egui::Ui,
    entry: &OutlineEntry,
    selected: Option<NodeId>,
    action: &mut Option<OutlineAction>,
) {
    ui.horizontal(|ui| {
        match entry.glyph() {
            Some(glyph) => {
                if ui.small_button(glyph.to_string()).clicked() {
                    *action = Some(OutlineAction::Toggle(entry.id));
                }
            }
            None => ui.add_space(ui.spacing().interact_size.y),
        }
        let response = ui
            .selectable_label(selected == Some(entry.id), entry.label())
            .on_hover_text(entry.title());
        if response.clicked() {
            *action = Some(OutlineAction::Select(entry.id));
        }
    });
    if entry.children_visible() {
        ui.indent(entry.id.0, |ui| {
            for child in &entry.children {
                show_entry(ui, child, selected, action);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u32, name: &str, children: Vec<ProjectedNode>) -> ProjectedNode {
        ProjectedNode {
            id: NodeId(id),
            name: name.to_string(),
            children,
        }
    }

    fn two_roots() -> Vec<ProjectedNode> {
        vec![
            node(
                1,
                "frame",
                vec![
                    node(2, "left", vec![]),
                    node(3, "middle", vec![]),
                    node(4, "right", vec![]),
                ],
            ),
            node(5, "lamp", vec![]),
        ]
    }

    #[test]
    fn render_shows_roots_collapsed() {
        let mut view = OutlineView::new();
        view.render_tree(&two_roots());

        assert_eq!(view.roots().len(), 2);
        assert_eq!(view.glyph(NodeId(1)), Some('+'));
        assert_eq!(view.glyph(NodeId(5)), None);
        assert_eq!(view.is_expanded(NodeId(1)), Some(false));
        assert_eq!(view.visible_labels(), vec!["frame", "lamp"]);
        assert_eq!(view.entry(NodeId(3)).unwrap().title(), "middle");
    }

    #[test]
    fn toggle_expands_and_flips_glyph() {
        let mut view = OutlineView::new();
        view.render_tree(&two_roots());

        assert_eq!(view.on_toggle(NodeId(1)), Some(true));
        assert_eq!(view.glyph(NodeId(1)), Some('-'));
        assert_eq!(
            view.visible_labels(),
            vec!["frame", "left", "middle", "right", "lamp"]
        );
        assert_eq!(view.entry(NodeId(1)).unwrap().children().len(), 3);
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut view = OutlineView::new();
        view.render_tree(&two_roots());
        let before_glyph = view.glyph(NodeId(1));
        let before_labels: Vec<String> =
            view.visible_labels().into_iter().map(String::from).collect();

        view.on_toggle(NodeId(1));
        view.on_toggle(NodeId(1));

        assert_eq!(view.glyph(NodeId(1)), before_glyph);
        assert_eq!(view.visible_labels(), before_labels);
    }

    #[test]
    fn toggle_without_control_is_ignored() {
        let mut view = OutlineView::new();
        view.render_tree(&two_roots());
        assert_eq!(view.on_toggle(NodeId(5)), None);
        assert_eq!(view.on_toggle(NodeId(99)), None);
        assert_eq!(view.visible_labels(), vec!["frame", "lamp"]);
    }

    #[test]
    fn rerender_resets_expansion_and_stale_selection() {
        let mut view = OutlineView::new();
        view.render_tree(&two_roots());
        view.on_toggle(NodeId(1));
        assert_eq!(view.on_node_select(NodeId(3)), NodeId(3));

        view.render_tree(&two_roots());
        assert_eq!(view.is_expanded(NodeId(1)), Some(false));
        assert_eq!(view.selected(), Some(NodeId(3)));

        view.render_tree(&[node(7, "other", vec![])]);
        assert_eq!(view.selected(), None);
        assert_eq!(view.visible_labels(), vec!["other"]);
    }
}
