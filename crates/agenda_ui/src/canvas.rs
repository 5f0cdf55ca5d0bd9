//! A single day's time canvas: 24 hour rows, event cards, and the
//! create/drag/resize gestures on top of them.
//!
//! The canvas is a vertical scroll view. Scrolling is suspended the moment a
//! create, drag or resize gesture wins arbitration in
//! [`CanvasState`], and resumes when the gesture ends.

use agenda_core::event::TimedEvent;
use agenda_core::interaction::{CanvasEffect, CanvasState, GestureTarget, ResizeEdge};
use agenda_core::timegrid::{minutes_to_y, DEFAULT_ROW_HEIGHT, MINUTES_PER_DAY};
use chrono::NaiveDate;
use egui::{
    self, vec2, Align2, Color32, CornerRadius, FontId, Pos2, Rect, ScrollArea, Sense, Stroke, Ui,
};

/// Press-and-hold duration before a gesture activates.
const LONG_PRESS_SECS: f64 = 0.35;
/// A press that wanders further than this before activating is a scroll.
const LONG_PRESS_TOLERANCE: f32 = 8.0;

const TIME_COL_WIDTH: f32 = 56.0;
const CARD_INSET: f32 = 6.0;
const HANDLE_RADIUS: f32 = 6.0;

struct CardRects {
    id: String,
    card: Rect,
    top_handle: Rect,
    bottom_handle: Rect,
}

pub struct DayCanvas {
    state: CanvasState,
    row_height: f32,
    long_press_fired: bool,
    reveal_minute: Option<i32>,
}

impl DayCanvas {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            state: CanvasState::new(day, DEFAULT_ROW_HEIGHT),
            row_height: DEFAULT_ROW_HEIGHT,
            long_press_fired: false,
            reveal_minute: None,
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.state.day()
    }

    pub fn gesture_active(&self) -> bool {
        self.state.gesture_active()
    }

    /// Scroll the canvas so `minute` sits in the upper third of the view.
    pub fn reveal(&mut self, minute: i32) {
        self.reveal_minute = Some(minute);
    }

    pub fn reconcile(&mut self, events: &[TimedEvent]) {
        self.state.reconcile(events);
    }

    /// The page is being recycled or the gesture framework lost track of a
    /// touch; drop back to neutral.
    pub fn force_reset(&mut self) {
        self.long_press_fired = false;
        self.state.force_reset();
    }

    pub fn show(
        &mut self,
        ui: &mut Ui,
        events: &[TimedEvent],
        now_minute: Option<i32>,
    ) -> Vec<CanvasEffect> {
        let mut effects = Vec::new();
        let total_height = minutes_to_y(self.row_height, MINUTES_PER_DAY);

        let mut scroll = ScrollArea::vertical()
            .id_salt(("day_canvas", self.day()))
            .auto_shrink([false, false])
            .enable_scrolling(self.state.scroll_enabled() && !self.long_press_fired);
        if let Some(minute) = self.reveal_minute.take() {
            let offset =
                (minutes_to_y(self.row_height, minute) - ui.available_height() / 3.0).max(0.0);
            scroll = scroll.vertical_scroll_offset(offset);
        }

        scroll.show(ui, |ui| {
            ui.horizontal(|ui| {
                let (time_rect, _) = ui.allocate_exact_size(
                    vec2(TIME_COL_WIDTH, total_height),
                    Sense::hover(),
                );
                self.paint_time_column(ui, time_rect);

                let (grid_rect, background) = ui.allocate_exact_size(
                    vec2(ui.available_width(), total_height),
                    Sense::click(),
                );
                let painter = ui.painter_at(grid_rect);
                self.paint_hour_lines(ui, &painter, grid_rect);

                let cards = self.layout_cards(grid_rect, events);
                let mut on_card = false;
                for card in &cards {
                    let selected = self.state.selected_event() == Some(card.id.as_str());
                    self.paint_card(ui, &painter, card, events, selected);

                    let id = ui.make_persistent_id(("event_card", self.day(), &card.id));
                    let response = ui.interact(card.card, id, Sense::click_and_drag());
                    on_card |= response.hovered() || response.is_pointer_button_down_on();

                    if selected && response.drag_started() && !self.state.gesture_active() {
                        self.state.begin_drag(&card.id, events);
                    }
                    if response.clicked() {
                        self.state.tap(&GestureTarget::Event(card.id.clone()));
                    }

                    if selected {
                        for (edge, handle_rect) in [
                            (ResizeEdge::Top, card.top_handle),
                            (ResizeEdge::Bottom, card.bottom_handle),
                        ] {
                            let id = ui.make_persistent_id((
                                "resize_handle",
                                self.day(),
                                &card.id,
                                matches!(edge, ResizeEdge::Top),
                            ));
                            let response = ui.interact(handle_rect, id, Sense::drag());
                            on_card |=
                                response.hovered() || response.is_pointer_button_down_on();
                            if response.drag_started() && !self.state.gesture_active() {
                                self.state.begin_resize(&card.id, edge, events);
                            }
                        }
                    }
                }
                self.state.set_pointer_on_event(on_card);

                if background.clicked() {
                    self.state.tap(&GestureTarget::Background);
                }

                if let Some((start, duration)) = self.state.draft() {
                    self.paint_draft(ui, &painter, grid_rect, start, duration);
                }
                if let Some(minute) = now_minute {
                    self.paint_now_marker(&painter, grid_rect, minute);
                }

                effects.extend(self.pump_pointer(ui, grid_rect, &cards, events));
            });
        });

        effects
    }

    /// Raw pointer tracking shared by every gesture: long-press activation,
    /// live pan translation, and release.
    fn pump_pointer(
        &mut self,
        ui: &Ui,
        grid_rect: Rect,
        cards: &[CardRects],
        events: &[TimedEvent],
    ) -> Vec<CanvasEffect> {
        let mut effects = Vec::new();
        let (down, released, origin, latest, held_for) = ui.input(|i| {
            (
                i.pointer.primary_down(),
                i.pointer.any_released(),
                i.pointer.press_origin(),
                i.pointer.latest_pos(),
                i.pointer.press_start_time().map(|t0| i.time - t0),
            )
        });

        if down && !self.long_press_fired && !self.state.gesture_active() {
            if let (Some(origin), Some(latest), Some(held)) = (origin, latest, held_for) {
                let wandered = (latest - origin).length() > LONG_PRESS_TOLERANCE;
                if grid_rect.contains(origin) && held >= LONG_PRESS_SECS && !wandered {
                    self.long_press_fired = true;
                    let target = hit_target(cards, origin);
                    let y = origin.y - grid_rect.top();
                    effects.extend(self.state.long_press(target, y, events));
                }
            }
            if held_for.is_some() {
                // keep polling until the press either activates or ends
                ui.ctx().request_repaint();
            }
        }

        if self.state.gesture_active() && down {
            if let (Some(origin), Some(latest)) = (origin, latest) {
                self.state.pan_update(latest.y - origin.y);
            }
        }

        if released {
            if self.state.gesture_active() {
                effects.extend(self.state.end_gesture());
            }
            self.long_press_fired = false;
        }

        effects
    }

    fn layout_cards(&self, grid_rect: Rect, events: &[TimedEvent]) -> Vec<CardRects> {
        let mut cards = Vec::with_capacity(events.len());
        for event in events {
            let (start, duration) = self.state.effective_span(event);
            let top = grid_rect.top() + minutes_to_y(self.row_height, start);
            let bottom = grid_rect.top() + minutes_to_y(self.row_height, start + duration);
            let card = Rect::from_min_max(
                egui::pos2(grid_rect.left() + CARD_INSET, top + 1.0),
                egui::pos2(grid_rect.right() - CARD_INSET, bottom - 1.0),
            );
            let handle = vec2(HANDLE_RADIUS * 4.0, HANDLE_RADIUS * 2.0 + 8.0);
            cards.push(CardRects {
                id: event.id.clone(),
                card,
                top_handle: Rect::from_center_size(card.center_top(), handle),
                bottom_handle: Rect::from_center_size(card.center_bottom(), handle),
            });
        }
        cards
    }

    fn paint_time_column(&self, ui: &Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        for hour in 0..24 {
            let y = rect.top() + hour as f32 * self.row_height;
            painter.text(
                egui::pos2(rect.right() - 6.0, y),
                Align2::RIGHT_TOP,
                format!("{hour:02}:00"),
                FontId::proportional(11.0),
                ui.visuals().weak_text_color(),
            );
        }
    }

    fn paint_hour_lines(&self, ui: &Ui, painter: &egui::Painter, rect: Rect) {
        let stroke = Stroke::new(0.5, ui.visuals().weak_text_color());
        for hour in 0..=24 {
            let y = rect.top() + hour as f32 * self.row_height;
            painter.line_segment(
                [egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)],
                stroke,
            );
        }
    }

    fn paint_card(
        &self,
        ui: &Ui,
        painter: &egui::Painter,
        card: &CardRects,
        events: &[TimedEvent],
        selected: bool,
    ) {
        let fill = if selected {
            ui.visuals().selection.bg_fill
        } else {
            ui.visuals().extreme_bg_color
        };
        let stroke = if selected {
            ui.visuals().selection.stroke
        } else {
            Stroke::new(1.0, ui.visuals().weak_text_color())
        };
        painter.rect_filled(card.card, CornerRadius::same(6), fill);
        painter.rect_stroke(card.card, CornerRadius::same(6), stroke, egui::StrokeKind::Inside);

        if let Some(event) = events.iter().find(|e| e.id == card.id) {
            let clip = painter.with_clip_rect(card.card.shrink(1.0));
            clip.text(
                card.card.left_top() + vec2(6.0, 3.0),
                Align2::LEFT_TOP,
                &event.title,
                FontId::proportional(12.0),
                ui.visuals().strong_text_color(),
            );
            // the label tracks the live override, not the stale data
            let (start, duration) = self.state.effective_span(event);
            clip.text(
                card.card.left_top() + vec2(6.0, 18.0),
                Align2::LEFT_TOP,
                time_range_label(start, duration),
                FontId::proportional(10.0),
                ui.visuals().weak_text_color(),
            );
        }

        if selected {
            for center in [card.top_handle.center(), card.bottom_handle.center()] {
                painter.circle_filled(center, HANDLE_RADIUS, ui.visuals().selection.bg_fill);
                painter.circle_stroke(
                    center,
                    HANDLE_RADIUS,
                    Stroke::new(1.5, ui.visuals().extreme_bg_color),
                );
            }
        }
    }

    fn paint_draft(
        &self,
        ui: &Ui,
        painter: &egui::Painter,
        grid_rect: Rect,
        start: i32,
        duration: i32,
    ) {
        let top = grid_rect.top() + minutes_to_y(self.row_height, start);
        let bottom = grid_rect.top() + minutes_to_y(self.row_height, start + duration);
        let rect = Rect::from_min_max(
            egui::pos2(grid_rect.left() + CARD_INSET, top),
            egui::pos2(grid_rect.right() - CARD_INSET, bottom),
        );
        let fill = ui.visuals().selection.bg_fill.gamma_multiply(0.4);
        painter.rect_filled(rect, CornerRadius::same(6), fill);
        painter.rect_stroke(
            rect,
            CornerRadius::same(6),
            ui.visuals().selection.stroke,
            egui::StrokeKind::Inside,
        );
    }

    fn paint_now_marker(&self, painter: &egui::Painter, grid_rect: Rect, minute: i32) {
        let y = grid_rect.top() + minutes_to_y(self.row_height, minute);
        let color = Color32::from_rgb(219, 68, 55);
        painter.line_segment(
            [egui::pos2(grid_rect.left(), y), egui::pos2(grid_rect.right(), y)],
            Stroke::new(1.5, color),
        );

        let pill = Rect::from_center_size(egui::pos2(grid_rect.left() + 21.0, y), vec2(38.0, 16.0));
        painter.rect_filled(pill, CornerRadius::same(8), color);
        painter.text(
            pill.center(),
            Align2::CENTER_CENTER,
            format!("{:02}:{:02}", minute / 60, minute % 60),
            FontId::proportional(10.0),
            Color32::WHITE,
        );
    }
}

/// "HH:MM – HH:MM" for a card's meta row; a span ending at the day boundary
/// reads 24:00.
fn time_range_label(start: i32, duration: i32) -> String {
    let hhmm = |m: i32| format!("{:02}:{:02}", m / 60, m % 60);
    format!("{} – {}", hhmm(start), hhmm(start + duration))
}

fn hit_target(cards: &[CardRects], pos: Pos2) -> GestureTarget {
    for card in cards {
        // handles extend past the card, so test them first
        if card.top_handle.contains(pos) {
            return GestureTarget::Handle(card.id.clone(), ResizeEdge::Top);
        }
        if card.bottom_handle.contains(pos) {
            return GestureTarget::Handle(card.id.clone(), ResizeEdge::Bottom);
        }
        if card.card.contains(pos) {
            return GestureTarget::Event(card.id.clone());
        }
    }
    GestureTarget::Background
}
