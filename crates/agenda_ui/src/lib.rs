//! egui widgets for the agenda screen.
//!
//! [`AgendaView`] composes the pieces: a top bar, the paged week strip, the
//! expandable month grid and the horizontally pageable day timeline. All
//! coordination logic lives in `agenda_core`; this crate only translates
//! egui input into state machine calls and paints the result.

pub mod canvas;
pub mod month_grid;
pub mod strip;
pub mod timeline;
pub mod top_bar;
pub mod week_strip;

use agenda_core::event::{EventPatch, TimedEvent};
use agenda_core::interaction::CanvasEffect;
use agenda_core::selection::SelectionStore;
use chrono::{NaiveDate, NaiveTime};
use egui::Ui;
use std::time::Instant;

use month_grid::MonthGridView;
use timeline::TimelineView;
use top_bar::{top_bar, TopBarAction};
use week_strip::WeekStripView;

/// What the host application should do in response to a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgendaAction {
    CreateEvent {
        day: NaiveDate,
        start_minutes: i32,
        duration_minutes: i32,
    },
    UpdateEvent {
        day: NaiveDate,
        id: String,
        patch: EventPatch,
    },
    /// Best-effort tactile feedback for a gesture activation.
    Haptic,
}

pub struct AgendaView {
    store: SelectionStore,
    week_strip: WeekStripView,
    month_grid: MonthGridView,
    timeline: TimelineView,
    month_open: bool,
}

impl AgendaView {
    pub fn new(initial_day: NaiveDate) -> Self {
        let store = SelectionStore::new(initial_day);
        let week_strip = WeekStripView::new(&store);
        let month_grid = MonthGridView::new(initial_day);
        let timeline = TimelineView::new(&store);
        Self {
            store,
            week_strip,
            month_grid,
            timeline,
            month_open: false,
        }
    }

    pub fn selected_day(&self) -> NaiveDate {
        self.store.selected()
    }

    /// Register a host callback fired on every committed selection change.
    pub fn on_day_selected(&mut self, listener: impl FnMut(NaiveDate) + 'static) {
        self.store.subscribe(listener);
    }

    pub fn show(
        &mut self,
        ui: &mut Ui,
        events: &[TimedEvent],
        today: NaiveDate,
        time: NaiveTime,
    ) -> Vec<AgendaAction> {
        let now = Instant::now();

        match top_bar(ui, self.store.selected(), self.month_open) {
            Some(TopBarAction::PrevWeek) => self.week_strip.step(false, &mut self.store),
            Some(TopBarAction::NextWeek) => self.week_strip.step(true, &mut self.store),
            Some(TopBarAction::Today) => {
                self.timeline.press_today(&mut self.store, today, time);
            }
            Some(TopBarAction::ToggleMonth) => {
                self.month_open = !self.month_open;
                if self.month_open {
                    self.month_grid.open_at(self.store.selected(), now);
                }
            }
            None => {}
        }

        if self.month_open {
            if self.month_grid.show(ui, &mut self.store, today, now) {
                self.month_open = false;
            }
        } else {
            self.week_strip.show(ui, &mut self.store, today);
        }
        ui.separator();

        self.timeline
            .show(ui, &mut self.store, events, today, time)
            .into_iter()
            .map(|effect| match effect {
                CanvasEffect::HapticPop => AgendaAction::Haptic,
                CanvasEffect::Create {
                    day,
                    start_minutes,
                    duration_minutes,
                } => AgendaAction::CreateEvent {
                    day,
                    start_minutes,
                    duration_minutes,
                },
                CanvasEffect::Update { day, id, patch } => {
                    AgendaAction::UpdateEvent { day, id, patch }
                }
            })
            .collect()
    }
}
