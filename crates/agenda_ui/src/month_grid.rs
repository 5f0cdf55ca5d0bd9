//! The expandable month grid: a three-page strip recycled around the
//! cursor month, with a six-week day matrix per page.

use agenda_core::date::{iso_day, month_grid_days, month_start};
use agenda_core::month_pager::{MonthPager, MONTH_CENTER_INDEX, MONTH_PAGE_COUNT};
use agenda_core::selection::{SelectionSource, SelectionStore};
use chrono::{Datelike, NaiveDate};
use egui::{self, vec2, Align2, CornerRadius, FontId, Sense, Stroke, Ui};
use std::time::Instant;
use tracing::debug;

use crate::strip::{PagedStrip, StripEvent};

pub const MONTH_GRID_HEIGHT: f32 = 280.0;

pub struct MonthGridView {
    pager: MonthPager,
    strip: PagedStrip,
}

impl MonthGridView {
    pub fn new(month: NaiveDate) -> Self {
        Self {
            pager: MonthPager::new(month),
            strip: PagedStrip::new(egui::Id::new("month_grid"), MONTH_CENTER_INDEX),
        }
    }

    /// Called when the grid expands open: recenter on the selected month.
    pub fn open_at(&mut self, selected: NaiveDate, now: Instant) {
        self.pager.open_at(selected, now);
        self.strip.scroll_to(MONTH_CENTER_INDEX, false);
    }

    /// Returns true when a day was tapped, so the host can collapse the grid.
    pub fn show(
        &mut self,
        ui: &mut Ui,
        store: &mut SelectionStore,
        today: NaiveDate,
        now: Instant,
    ) -> bool {
        if self.pager.is_resetting() && !self.strip.is_moving() {
            // the unanimated recenter from the last commit has rendered
            self.pager.finish_reset();
        }

        let size = vec2(ui.available_width(), MONTH_GRID_HEIGHT);
        let months = self.pager.pages();
        let selected = store.selected();

        let mut tapped = None;
        let events = self.strip.show(ui, size, MONTH_PAGE_COUNT, true, |ui, index| {
            if let Some(day) = month_page(ui, months[index], selected, today) {
                tapped = Some(day);
            }
        });

        for event in events {
            if let StripEvent::Settled { index } = event {
                if let Some(day) = self.pager.on_momentum_end(index, store.selected(), now) {
                    store.set_selected(day, SelectionSource::Calendar);
                    // recycle: snap back to center with the new cursor month
                    self.strip.scroll_to(MONTH_CENTER_INDEX, false);
                }
            }
        }

        if let Some(day) = tapped {
            debug!(day = %iso_day(day), "month grid day tapped");
            store.set_selected(day, SelectionSource::Calendar);
            if month_start(day) != self.pager.cursor_month() {
                // an outside-month cell was tapped; follow it
                self.open_at(day, now);
            }
            return true;
        }
        false
    }
}

/// One month page: a 7x6 matrix including the leading and trailing days of
/// the neighboring months. Returns the tapped day, if any.
fn month_page(
    ui: &mut Ui,
    month: NaiveDate,
    selected: NaiveDate,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let mut tapped = None;
    let rect = ui.max_rect();
    let cell = vec2(rect.width() / 7.0, rect.height() / 6.0);
    let painter = ui.painter_at(rect);

    for (i, day) in month_grid_days(month).into_iter().enumerate() {
        let (row, col) = (i / 7, i % 7);
        let cell_rect = egui::Rect::from_min_size(
            egui::pos2(
                rect.left() + col as f32 * cell.x,
                rect.top() + row as f32 * cell.y,
            ),
            cell,
        );
        let id = ui.make_persistent_id(("month_cell", month, day));
        let response = ui.interact(cell_rect, id, Sense::click());

        let in_month = day.month() == month.month();
        let badge = egui::Rect::from_center_size(cell_rect.center(), vec2(30.0, 30.0));
        if day == selected {
            painter.rect_filled(badge, CornerRadius::same(15), ui.visuals().selection.bg_fill);
        } else if day == today {
            painter.rect_stroke(
                badge,
                CornerRadius::same(15),
                Stroke::new(1.0, ui.visuals().selection.stroke.color),
                egui::StrokeKind::Inside,
            );
        }

        let color = if day == selected {
            ui.visuals().selection.stroke.color
        } else if in_month {
            ui.visuals().strong_text_color()
        } else {
            ui.visuals().weak_text_color()
        };
        painter.text(
            cell_rect.center(),
            Align2::CENTER_CENTER,
            day.day().to_string(),
            FontId::proportional(13.0),
            color,
        );

        if response.clicked() {
            tapped = Some(day);
        }
    }

    tapped
}
