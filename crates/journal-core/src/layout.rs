//! Entries sidebar geometry.
//!
//! The sidebar sits on the right of the page with its resize handle on the
//! left edge, so dragging left widens it. Inside the sidebar a second handle
//! splits the height between the entry list and the selected entry.

pub const MIN_SIDEBAR_WIDTH: f64 = 250.0;
pub const MAX_SIDEBAR_WIDTH: f64 = 800.0;
pub const DEFAULT_SIDEBAR_WIDTH: f64 = 500.0;
/// Smallest height either half of the split may shrink to
pub const MIN_PANE_HEIGHT: f64 = 100.0;
pub const SPLIT_HANDLE_HEIGHT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneSplit {
    pub list_height: f64,
    pub detail_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Width { start_x: f64, start_width: f64 },
    Split { start_y: f64, start_list_height: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaneLayout {
    collapsed: bool,
    sidebar_width: f64,
    /// `None` until the user first drags the split handle
    split: Option<PaneSplit>,
    drag: Option<Drag>,
}

impl Default for PaneLayout {
    fn default() -> Self {
        Self {
            collapsed: true,
            sidebar_width: DEFAULT_SIDEBAR_WIDTH,
            split: None,
            drag: None,
        }
    }
}

impl PaneLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_sidebar(&mut self) {
        self.collapsed = !self.collapsed;
        if self.collapsed {
            self.drag = None;
        }
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        if self.collapsed != collapsed {
            self.toggle_sidebar();
        }
    }

    pub const fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub const fn sidebar_width(&self) -> f64 {
        self.sidebar_width
    }

    pub const fn split(&self) -> Option<PaneSplit> {
        self.split
    }

    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Start resizing the sidebar from the pointer's x position.
    pub fn begin_width_drag(&mut self, x: f64) {
        if self.collapsed {
            return;
        }
        self.drag = Some(Drag::Width {
            start_x: x,
            start_width: self.sidebar_width,
        });
    }

    /// Start moving the split handle. `list_height` is the list's rendered
    /// height when the drag begins.
    pub fn begin_split_drag(&mut self, y: f64, list_height: f64) {
        if self.collapsed {
            return;
        }
        self.drag = Some(Drag::Split {
            start_y: y,
            start_list_height: list_height,
        });
    }

    /// Apply a pointer move to the active drag; ignored when none is active.
    pub fn pointer_moved(&mut self, x: f64, y: f64, container_height: f64) {
        match self.drag {
            Some(Drag::Width {
                start_x,
                start_width,
            }) => {
                self.sidebar_width = (start_width + start_x - x)
                    .clamp(MIN_SIDEBAR_WIDTH, MAX_SIDEBAR_WIDTH);
            }
            Some(Drag::Split {
                start_y,
                start_list_height,
            }) => {
                // The lower bound wins when the container is too short for both.
                let list_height = (start_list_height + y - start_y)
                    .min(container_height - MIN_PANE_HEIGHT)
                    .max(MIN_PANE_HEIGHT);
                self.split = Some(PaneSplit {
                    list_height,
                    detail_height: (container_height - list_height - SPLIT_HANDLE_HEIGHT)
                        .max(0.0),
                });
            }
            None => {}
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }
}
