//! The horizontally pageable day timeline: a paged strip of day canvases
//! kept centered on the day pager's cursor.

use agenda_core::day_pager::{DayPager, DayPagerCmd, NowMarker, TodayAction, DEFAULT_DAY_RANGE};
use agenda_core::event::TimedEvent;
use agenda_core::interaction::CanvasEffect;
use agenda_core::selection::SelectionStore;
use chrono::{NaiveDate, NaiveTime};
use egui::{self, vec2, Ui};
use std::collections::HashMap;
use std::time::Instant;

use crate::canvas::DayCanvas;
use crate::strip::{PagedStrip, StripEvent};

pub struct TimelineView {
    pager: DayPager,
    strip: PagedStrip,
    canvases: HashMap<NaiveDate, DayCanvas>,
    now_marker: NowMarker,
}

impl TimelineView {
    pub fn new(store: &SelectionStore) -> Self {
        let pager = DayPager::new(store, DEFAULT_DAY_RANGE, DEFAULT_DAY_RANGE);
        let strip = PagedStrip::new(egui::Id::new("day_timeline"), pager.center_index());
        Self {
            pager,
            strip,
            canvases: HashMap::new(),
            now_marker: NowMarker::default(),
        }
    }

    /// Today affordance from the top bar.
    pub fn press_today(&mut self, store: &mut SelectionStore, today: NaiveDate, time: NaiveTime) {
        match self.pager.press_today(store, today) {
            TodayAction::Jump => {}
            TodayAction::RevealNow => {
                let minute = (chrono::Timelike::hour(&time) * 60
                    + chrono::Timelike::minute(&time)) as i32;
                if let Some(canvas) = self.canvases.get_mut(&today) {
                    canvas.reveal(minute);
                }
            }
        }
    }

    pub fn show(
        &mut self,
        ui: &mut Ui,
        store: &mut SelectionStore,
        events: &[TimedEvent],
        today: NaiveDate,
        time: NaiveTime,
    ) -> Vec<CanvasEffect> {
        let now = Instant::now();

        if self.pager.is_resetting() && !self.strip.is_moving() {
            // the unanimated recenter from the previous frame has rendered
            self.pager.on_recentered();
        }

        if self.now_marker.tick(time) {
            ui.ctx().request_repaint();
        }

        match self.pager.poll(store, now) {
            Some(DayPagerCmd::AnimateStep { forward }) => {
                let step = if forward { 1 } else { -1 };
                let target = (self.pager.center_index() as i64 + step).max(0) as usize;
                self.strip.scroll_to(target, true);
            }
            Some(DayPagerCmd::SnapCenter) => {
                self.strip.scroll_to(self.pager.center_index(), false);
            }
            None => {}
        }

        let pages = self.pager.pages();
        self.retain_window_canvases(&pages);
        let gesture_active = self.canvases.values().any(|c| c.gesture_active());

        let size = vec2(ui.available_width(), ui.available_height());
        let mut effects = Vec::new();
        let center = self.pager.center_index() as i64;
        let canvases = &mut self.canvases;
        let now_minute = self.now_marker.minute();

        let strip_events = self.strip.show(
            ui,
            size,
            pages.len(),
            !gesture_active,
            |ui, index| {
                let day = pages[index];
                let canvas = canvases.entry(day).or_insert_with(|| DayCanvas::new(day));
                canvas.reconcile(events);
                let day_events: Vec<TimedEvent> =
                    events.iter().filter(|e| e.day == day).cloned().collect();
                let marker = (day == today).then_some(now_minute).flatten();
                effects.extend(canvas.show(ui, &day_events, marker));
            },
        );

        for event in strip_events {
            match event {
                StripEvent::DragBegan => self.pager.on_drag_begin(),
                StripEvent::DragMoved { page_delta } => {
                    self.pager.on_drag_offset(page_delta, store);
                }
                StripEvent::Settled { index } => {
                    let delta = index as i64 - center;
                    if let Some(DayPagerCmd::SnapCenter) =
                        self.pager.on_momentum_end(delta, store)
                    {
                        self.strip.scroll_to(self.pager.center_index(), false);
                    }
                }
            }
        }

        effects
    }

    /// Pages that left the window take their gesture state with them.
    fn retain_window_canvases(&mut self, pages: &[NaiveDate]) {
        self.canvases.retain(|day, canvas| {
            let keep = pages.contains(day);
            if !keep && canvas.gesture_active() {
                canvas.force_reset();
            }
            keep
        });
    }
}
