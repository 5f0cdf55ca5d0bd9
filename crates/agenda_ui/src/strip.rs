//! Horizontally paged strip shared by the week bar, the month grid and the
//! day timeline.
//!
//! Pages are laid out lazily around a continuous page offset, so windows of
//! hundreds of pages cost two child uis per frame. The strip reports drags
//! and settles as events; the paging state machines in `agenda_core` decide
//! what those mean.

use egui::{self, Id, Sense, Ui, UiBuilder, Vec2};

/// Settle animation length, matching a platform page fling.
const SETTLE_TIME: f32 = 0.18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripEvent {
    DragBegan,
    /// Whole-page delta relative to the page the drag started on.
    DragMoved { page_delta: i64 },
    /// The strip came to rest on `index`. Fired both for user flings and for
    /// programmatic animated scrolls.
    Settled { index: usize },
}

pub struct PagedStrip {
    id: Id,
    /// Continuous page offset; page `k` fills the viewport at offset `k`.
    offset: f32,
    settle_target: Option<f32>,
    drag_origin: Option<f32>,
    /// Deferred scroll applied on the next `show`.
    pending: Option<(usize, bool)>,
}

impl PagedStrip {
    pub fn new(id: Id, index: usize) -> Self {
        Self {
            id,
            offset: index as f32,
            settle_target: None,
            drag_origin: None,
            pending: None,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.settle_target.is_some() || self.drag_origin.is_some()
    }

    /// Request a scroll; it happens inside the next `show`, once the page
    /// window it refers to is actually laid out.
    pub fn scroll_to(&mut self, index: usize, animated: bool) {
        self.pending = Some((index, animated));
    }

    pub fn show(
        &mut self,
        ui: &mut Ui,
        size: Vec2,
        page_count: usize,
        interactive: bool,
        mut render_page: impl FnMut(&mut Ui, usize),
    ) -> Vec<StripEvent> {
        let mut events = Vec::new();
        if page_count == 0 {
            return events;
        }
        let max_offset = (page_count - 1) as f32;

        if let Some((index, animated)) = self.pending.take() {
            let target = (index as f32).min(max_offset);
            if animated {
                self.settle_target = Some(target);
            } else {
                self.offset = target;
                self.settle_target = None;
                // pin the stored animation value so no stale tween plays
                ui.ctx().animate_value_with_time(self.id, target, 0.0);
            }
        }

        let sense = if interactive {
            Sense::drag()
        } else {
            Sense::hover()
        };
        let (rect, response) = ui.allocate_exact_size(size, sense);

        if response.drag_started() {
            self.drag_origin = Some(self.offset);
            self.settle_target = None;
            ui.ctx().animate_value_with_time(self.id, self.offset, 0.0);
            events.push(StripEvent::DragBegan);
        }

        if let Some(origin) = self.drag_origin {
            if response.dragged() {
                self.offset =
                    (self.offset - response.drag_delta().x / size.x).clamp(0.0, max_offset);
                ui.ctx().animate_value_with_time(self.id, self.offset, 0.0);
                events.push(StripEvent::DragMoved {
                    page_delta: (self.offset - origin).round() as i64,
                });
            }
            if response.drag_stopped() {
                self.drag_origin = None;
                self.settle_target = Some(self.offset.round().clamp(0.0, max_offset));
            }
        }

        if let Some(target) = self.settle_target {
            self.offset = ui.ctx().animate_value_with_time(self.id, target, SETTLE_TIME);
            if (self.offset - target).abs() < 0.005 {
                self.offset = target;
                self.settle_target = None;
                events.push(StripEvent::Settled {
                    index: target as usize,
                });
            }
            ui.ctx().request_repaint();
        }

        for page in visible_pages(self.offset, page_count).into_iter().flatten() {
            let x = rect.left() + (page as f32 - self.offset) * size.x;
            let page_rect =
                egui::Rect::from_min_size(egui::pos2(x, rect.top()), size);
            if !page_rect.intersects(rect) {
                continue;
            }
            let mut child = ui.new_child(
                UiBuilder::new()
                    .id_salt(("strip_page", self.id, page))
                    .max_rect(page_rect),
            );
            child.set_clip_rect(rect.intersect(ui.clip_rect()));
            render_page(&mut child, page);
        }

        events
    }
}

/// The one or two pages straddling the viewport at a continuous offset.
fn visible_pages(offset: f32, page_count: usize) -> [Option<usize>; 2] {
    let first = offset.floor() as i64;
    [first, first + 1].map(|page| {
        (page >= 0 && (page as usize) < page_count && (page as f32 - offset).abs() < 1.0)
            .then_some(page as usize)
    })
}
