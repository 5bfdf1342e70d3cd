use std::{collections::HashSet, mem};

use tracing::debug;

use super::{Minimap, TreeEvent, ViewportConfig, ZoomLevel};
use crate::{
    family::{PersonId, ViewFilter, ViewMode},
    geometry::{Point, Rect, Size},
};

/// Pointer or touch gesture in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    /// Pan follows the pointer; `grab` is the pointer position minus the pan
    /// at the time the drag started.
    Dragging { grab: Point },
    /// Two-finger zoom relative to the finger distance at the start.
    Pinching { distance: f64, scale: f64 },
}

/// Input understood by [`ViewportState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportAction {
    ZoomIn,
    ZoomOut,
    /// Positive deltas zoom out, negative deltas zoom in.
    Wheel { delta: f64 },
    /// Multiply the scale by `ratio`.
    Pinch { ratio: f64 },
    Reset,
    Resize(Size),
    PanBy(Point),
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    TouchStart(Vec<Point>),
    TouchMove(Vec<Point>),
    TouchEnd,
    /// Center the viewport on a content point.
    CenterOn(Point),
    MinimapClick { point: Point, minimap: Minimap },
    SelectNode { person_id: PersonId, screen: Point },
    ToggleCollapse(PersonId),
    SetCollapsed(HashSet<PersonId>),
    ExpandAll,
    /// `fallback_focus` becomes the selection when a focused mode is chosen
    /// and nothing is selected yet.
    SetViewMode {
        mode: ViewMode,
        fallback_focus: Option<PersonId>,
    },
    SetBranchRoot(Option<PersonId>),
}

/// Everything the viewer keeps between frames. Content space is layout space
/// shifted by the layout's `x_offset`; `screen = pan + scale * content`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    pub scale: f64,
    pub pan: Point,
    pub size: Size,
    pub gesture: Gesture,
    pub collapsed: HashSet<PersonId>,
    pub selected: Option<PersonId>,
    pub view_mode: ViewMode,
    pub branch_root: Option<PersonId>,
}

impl ViewportState {
    pub fn new(size: Size, config: &ViewportConfig) -> Self {
        Self {
            scale: config.initial_scale_for(size.width),
            pan: Point::default(),
            size,
            gesture: Gesture::Idle,
            collapsed: HashSet::new(),
            selected: None,
            view_mode: ViewMode::All,
            branch_root: None,
        }
    }

    pub fn zoom_level(&self) -> ZoomLevel {
        ZoomLevel::from_scale(self.scale)
    }

    /// The visible part of content space.
    pub fn view_box(&self) -> Rect {
        Rect::new(
            -self.pan.x / self.scale,
            -self.pan.y / self.scale,
            self.size.width / self.scale,
            self.size.height / self.scale,
        )
    }

    pub fn to_screen(&self, content: Point) -> Point {
        self.pan + content.scaled(self.scale)
    }

    pub fn to_content(&self, screen: Point) -> Point {
        (screen - self.pan).scaled(1.0 / self.scale)
    }

    /// Visibility filter for the current mode, focus and branch root.
    pub fn filter(&self) -> ViewFilter {
        ViewFilter {
            mode: self.view_mode,
            focus: self.selected.clone(),
            branch_root: self.branch_root.clone(),
        }
    }

    pub const fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    /// Apply one action and return the new state with any events to forward.
    #[must_use]
    pub fn apply(
        mut self,
        action: ViewportAction,
        config: &ViewportConfig,
    ) -> (Self, Vec<TreeEvent>) {
        let mut events = Vec::new();
        match action {
            ViewportAction::ZoomIn => self.scale = config.clamp(self.scale + config.zoom_step),
            ViewportAction::ZoomOut => self.scale = config.clamp(self.scale - config.zoom_step),
            ViewportAction::Wheel { delta } => {
                if delta > 0.0 {
                    self.scale = config.clamp(self.scale - config.wheel_step);
                } else if delta < 0.0 {
                    self.scale = config.clamp(self.scale + config.wheel_step);
                }
            }
            ViewportAction::Pinch { ratio } => {
                if ratio.is_finite() && ratio > 0.0 {
                    self.scale = config.clamp(self.scale * ratio);
                }
            }
            ViewportAction::Reset => {
                self.scale = config.initial_scale_for(self.size.width);
                self.pan = Point::default();
            }
            ViewportAction::Resize(size) => self.size = size,
            ViewportAction::PanBy(delta) => self.pan = self.pan + delta,
            ViewportAction::PointerDown(at) => {
                self.gesture = Gesture::Dragging {
                    grab: at - self.pan,
                };
            }
            ViewportAction::PointerMove(at) => self.drag_to(at),
            ViewportAction::PointerUp | ViewportAction::TouchEnd => self.gesture = Gesture::Idle,
            ViewportAction::TouchStart(touches) => self.start_touch(&touches),
            ViewportAction::TouchMove(touches) => self.move_touch(&touches, config),
            ViewportAction::CenterOn(content) => self.center_on(content),
            ViewportAction::MinimapClick { point, minimap } => {
                if let Some(content) = minimap.to_content(point) {
                    self.center_on(content);
                }
            }
            ViewportAction::SelectNode { person_id, screen } => {
                self.selected = Some(person_id.clone());
                events.push(TreeEvent::NodeSelected { person_id, screen });
            }
            ViewportAction::ToggleCollapse(id) => {
                if !self.collapsed.remove(&id) {
                    self.collapsed.insert(id.clone());
                }
                events.push(TreeEvent::CollapseToggled(id));
            }
            ViewportAction::SetCollapsed(collapsed) => self.collapsed = collapsed,
            ViewportAction::ExpandAll => self.collapsed.clear(),
            ViewportAction::SetViewMode {
                mode,
                fallback_focus,
            } => {
                self.view_mode = mode;
                if mode != ViewMode::All && self.selected.is_none() {
                    self.selected = fallback_focus;
                }
                events.push(TreeEvent::ViewModeChanged(mode));
            }
            ViewportAction::SetBranchRoot(root) => {
                let previous = mem::replace(&mut self.branch_root, root);
                if previous != self.branch_root {
                    events.push(TreeEvent::BranchRootChanged(self.branch_root.clone()));
                }
            }
        }

        debug!(
            scale = self.scale,
            pan_x = self.pan.x,
            pan_y = self.pan.y,
            events = events.len(),
            "Applied viewport action"
        );
        (self, events)
    }

    fn center_on(&mut self, content: Point) {
        self.pan = Point::new(
            self.size.width / 2.0 - content.x * self.scale,
            self.size.height / 2.0 - content.y * self.scale,
        );
    }

    fn drag_to(&mut self, at: Point) {
        if let Gesture::Dragging { grab } = self.gesture {
            self.pan = at - grab;
        }
    }

    fn start_touch(&mut self, touches: &[Point]) {
        self.gesture = match touches {
            [one] => Gesture::Dragging {
                grab: *one - self.pan,
            },
            [a, b, ..] if a.distance(*b) > 0.0 => Gesture::Pinching {
                distance: a.distance(*b),
                scale: self.scale,
            },
            _ => Gesture::Idle,
        };
    }

    fn move_touch(&mut self, touches: &[Point], config: &ViewportConfig) {
        match (self.gesture, touches) {
            (Gesture::Dragging { .. }, [one]) => self.drag_to(*one),
            (Gesture::Pinching { distance, scale }, [a, b, ..]) => {
                self.scale = config.clamp(scale * a.distance(*b) / distance);
            }
            // Finger count changed mid-gesture; restart from here.
            _ => self.start_touch(touches),
        }
    }
}
