//! The paged week strip: seven day cells per page, one page per week.

use agenda_core::date::{iso_day, week_days};
use agenda_core::selection::{SelectionSource, SelectionStore};
use agenda_core::week_pager::{WeekPager, WeekScroll, DEFAULT_WEEKS_AFTER, DEFAULT_WEEKS_BEFORE};
use chrono::{Datelike, NaiveDate};
use egui::{self, vec2, Align2, CornerRadius, FontId, Sense, Stroke, Ui};
use tracing::debug;

use crate::strip::{PagedStrip, StripEvent};

pub const WEEK_STRIP_HEIGHT: f32 = 64.0;

const WEEKDAY_LETTERS: [&str; 7] = ["M", "T", "W", "T", "F", "S", "S"];

pub struct WeekStripView {
    pager: WeekPager,
    strip: PagedStrip,
    seen_generation: u64,
}

impl WeekStripView {
    pub fn new(store: &SelectionStore) -> Self {
        let pager = WeekPager::new(store.selected(), DEFAULT_WEEKS_BEFORE, DEFAULT_WEEKS_AFTER);
        let strip = PagedStrip::new(egui::Id::new("week_strip"), pager.focused_index());
        Self {
            pager,
            strip,
            seen_generation: store.generation(),
        }
    }

    /// Chevron navigation from the top bar. One week per press, same
    /// deterministic day rule as a swipe.
    pub fn step(&mut self, forward: bool, store: &mut SelectionStore) {
        let (request, day) = self.pager.step(forward, store.selected());
        self.strip.scroll_to(request.index, request.animated);
        store.set_selected(day, SelectionSource::Calendar);
        self.seen_generation = store.generation();
    }

    pub fn show(&mut self, ui: &mut Ui, store: &mut SelectionStore, today: NaiveDate) {
        self.follow_selection(store);

        let size = vec2(ui.available_width(), WEEK_STRIP_HEIGHT);
        let page_count = self.pager.pages().len();
        let week_starts: Vec<NaiveDate> = self.pager.pages().to_vec();
        let selected = store.selected();

        let mut tapped = None;
        let events = self.strip.show(ui, size, page_count, true, |ui, index| {
            if let Some(day) = week_row(ui, week_starts[index], selected, today) {
                tapped = Some(day);
            }
        });

        if let Some(day) = tapped {
            debug!(day = %iso_day(day), "week strip day tapped");
            store.set_selected(day, SelectionSource::Calendar);
            self.seen_generation = store.generation();
            // a tap on a not-yet-committed neighboring page still needs the
            // strip brought onto the containing week
            if let WeekScroll::InWindow(request) = self.pager.scroll_to_date(day, true) {
                self.strip.scroll_to(request.index, request.animated);
            }
        }

        for event in events {
            if let StripEvent::Settled { index } = event {
                if index != self.pager.focused_index() {
                    let day = self.pager.commit_swipe(index, store.selected());
                    store.set_selected(day, SelectionSource::Calendar);
                    self.seen_generation = store.generation();
                }
            }
        }
    }

    /// React to selection changes made elsewhere; our own calendar-origin
    /// writes are skipped, which is what breaks the feedback loop.
    fn follow_selection(&mut self, store: &SelectionStore) {
        let Some(change) = store.changed_since(self.seen_generation) else {
            return;
        };
        self.seen_generation = change.generation;
        if change.source == SelectionSource::Calendar {
            return;
        }

        let animated = change.source != SelectionSource::Init;
        match self.pager.scroll_to_date(change.day, animated) {
            WeekScroll::InWindow(request) => {
                self.strip.scroll_to(request.index, request.animated);
            }
            WeekScroll::Rebuilt => {
                // pages are rebuilt this frame, so the deferred focus can
                // resolve immediately
                if let Some(request) = self.pager.take_pending_scroll() {
                    self.strip.scroll_to(request.index, false);
                }
            }
        }
    }
}

/// One week page: seven equal cells. Returns the tapped day, if any.
fn week_row(
    ui: &mut Ui,
    week_start: NaiveDate,
    selected: NaiveDate,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let mut tapped = None;
    let rect = ui.max_rect();
    let cell_width = rect.width() / 7.0;
    let painter = ui.painter_at(rect);

    for (offset, day) in week_days(week_start).into_iter().enumerate() {
        let cell = egui::Rect::from_min_size(
            egui::pos2(rect.left() + offset as f32 * cell_width, rect.top()),
            vec2(cell_width, rect.height()),
        );
        let id = ui.make_persistent_id(("week_cell", day));
        let response = ui.interact(cell, id, Sense::click());

        painter.text(
            egui::pos2(cell.center().x, cell.top() + 6.0),
            Align2::CENTER_TOP,
            WEEKDAY_LETTERS[offset],
            FontId::proportional(11.0),
            ui.visuals().weak_text_color(),
        );

        let badge = egui::Rect::from_center_size(
            egui::pos2(cell.center().x, cell.bottom() - 18.0),
            vec2(28.0, 28.0),
        );
        if day == selected {
            painter.rect_filled(badge, CornerRadius::same(14), ui.visuals().selection.bg_fill);
        } else if day == today {
            painter.rect_stroke(
                badge,
                CornerRadius::same(14),
                Stroke::new(1.0, ui.visuals().selection.stroke.color),
                egui::StrokeKind::Inside,
            );
        }
        let number_color = if day == selected {
            ui.visuals().selection.stroke.color
        } else {
            ui.visuals().strong_text_color()
        };
        painter.text(
            badge.center(),
            Align2::CENTER_CENTER,
            day.day().to_string(),
            FontId::proportional(14.0),
            number_color,
        );

        if response.clicked() {
            tapped = Some(day);
        }
    }

    tapped
}
