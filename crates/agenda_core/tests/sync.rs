//! End-to-end selection synchronization between the date picker pagers and
//! the day timeline, driven the way a host frame loop would drive them.

use std::time::{Duration, Instant};

use agenda_core::date::{parse_iso_day, week_start, weekday_offset};
use agenda_core::day_pager::{DayPager, DayPagerCmd, EXTERNAL_SYNC_DEBOUNCE};
use agenda_core::month_pager::MonthPager;
use agenda_core::selection::{SelectionSource, SelectionStore};
use agenda_core::week_pager::{WeekPager, WeekScroll};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn d(iso: &str) -> NaiveDate {
    parse_iso_day(iso).unwrap()
}

/// Minimal stand-in for the week strip view: tracks the focused week and
/// skips changes it caused itself, exactly like the real widget.
struct WeekStrip {
    pager: WeekPager,
    seen_generation: u64,
}

impl WeekStrip {
    fn new(store: &SelectionStore) -> Self {
        Self {
            pager: WeekPager::new(store.selected(), 8, 8),
            seen_generation: store.generation(),
        }
    }

    fn poll(&mut self, store: &SelectionStore) {
        let Some(change) = store.changed_since(self.seen_generation) else {
            return;
        };
        self.seen_generation = change.generation;
        if change.source == SelectionSource::Calendar {
            return;
        }
        if let WeekScroll::Rebuilt = self.pager.scroll_to_date(change.day, true) {
            self.pager.take_pending_scroll();
        }
    }

    fn tap_day(&mut self, day: NaiveDate, store: &mut SelectionStore) {
        store.set_selected(day, SelectionSource::Calendar);
        self.seen_generation = store.generation();
    }
}

/// Run frames until both sides go quiet, failing if they never do. A bounded
/// frame count is the feedback-loop detector: a calendar <-> timeline echo
/// would keep producing commands forever.
fn settle_frames(
    store: &mut SelectionStore,
    strip: &mut WeekStrip,
    day_pager: &mut DayPager,
    mut now: Instant,
) -> Instant {
    let mut quiet_frames = 0;
    for _ in 0..10 {
        strip.poll(store);
        let cmd = day_pager.poll(store, now);
        match cmd {
            Some(DayPagerCmd::AnimateStep { .. }) => {
                // the host animation finishes and reports momentum end
                day_pager.on_momentum_end(1, store);
                day_pager.on_recentered();
            }
            Some(DayPagerCmd::SnapCenter) => day_pager.on_recentered(),
            None => {}
        }
        now += EXTERNAL_SYNC_DEBOUNCE + Duration::from_millis(5);
        if cmd.is_none() && store.changed_since(strip.seen_generation).is_none() {
            // a debounced sync may still be pending on the first quiet frame
            quiet_frames += 1;
            if quiet_frames == 2 {
                return now;
            }
        } else {
            quiet_frames = 0;
        }
    }
    panic!("selection never settled: feedback loop between calendar and timeline");
}

#[test]
fn calendar_tap_lands_the_timeline_without_echo() {
    let mut store = SelectionStore::new(d("2024-06-10"));
    let mut strip = WeekStrip::new(&store);
    let mut day_pager = DayPager::new(&store, 5, 5);
    let now = Instant::now();

    strip.tap_day(d("2024-06-13"), &mut store);
    settle_frames(&mut store, &mut strip, &mut day_pager, now);

    assert_eq!(day_pager.cursor_day(), d("2024-06-13"));
    assert_eq!(store.selected(), d("2024-06-13"));
    // the tap is the only selection write in the whole exchange
    assert_eq!(store.last_source(), SelectionSource::Calendar);
}

#[test]
fn timeline_swipe_moves_the_week_strip_live_and_commits_once() {
    let mut store = SelectionStore::new(d("2024-06-10"));
    let mut strip = WeekStrip::new(&store);
    let mut day_pager = DayPager::new(&store, 5, 5);
    let now = Instant::now();

    day_pager.on_drag_begin();
    for delta in 1..=3 {
        day_pager.on_drag_offset(delta, &mut store);
        strip.poll(&store);
        // the strip highlight follows the preview under the finger
        assert_eq!(strip.pager.focused_week_start(), week_start(store.selected()));
    }
    day_pager.on_momentum_end(3, &mut store);
    day_pager.on_recentered();

    let generation = store.generation();
    settle_frames(&mut store, &mut strip, &mut day_pager, now);

    assert_eq!(store.selected(), d("2024-06-13"));
    assert_eq!(store.last_source(), SelectionSource::Timeline);
    assert_eq!(day_pager.cursor_day(), d("2024-06-13"));
    // no observer wrote anything back after the commit
    assert_eq!(store.generation(), generation);
}

#[test]
fn month_swipe_clamps_and_hard_lands_the_timeline() {
    let mut store = SelectionStore::new(d("2024-03-31"));
    let mut strip = WeekStrip::new(&store);
    let mut day_pager = DayPager::new(&store, 5, 5);
    let now = Instant::now();

    let mut month = MonthPager::new(store.selected());
    let next = month.on_momentum_end(2, store.selected(), now).unwrap();
    assert_eq!(next, d("2024-04-30"));
    strip.tap_day(next, &mut store);

    settle_frames(&mut store, &mut strip, &mut day_pager, now);

    // 30 days away: beyond the page window, so the pager hard-landed
    assert_eq!(day_pager.cursor_day(), d("2024-04-30"));
    assert!(!day_pager.is_resetting());
}

#[test]
fn week_paging_preserves_weekday_through_the_whole_pipeline() {
    let mut store = SelectionStore::new(d("2024-06-12")); // a Wednesday
    let mut strip = WeekStrip::new(&store);
    let mut day_pager = DayPager::new(&store, 5, 5);
    let now = Instant::now();

    let settled = strip.pager.focused_index() + 1;
    let next = strip.pager.commit_swipe(settled, store.selected());
    strip.tap_day(next, &mut store);

    settle_frames(&mut store, &mut strip, &mut day_pager, now);

    assert_eq!(store.selected(), d("2024-06-19"));
    assert_eq!(weekday_offset(store.selected()), 2);
    assert_eq!(day_pager.cursor_day(), d("2024-06-19"));
}

#[test]
fn host_subscribers_hear_commits_but_never_previews() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let seen: Rc<RefCell<Vec<NaiveDate>>> = Rc::default();
    let sink = seen.clone();

    let mut store = SelectionStore::new(d("2024-06-10"));
    store.subscribe(move |day| sink.borrow_mut().push(day));
    let mut day_pager = DayPager::new(&store, 5, 5);

    day_pager.on_drag_begin();
    day_pager.on_drag_offset(1, &mut store);
    day_pager.on_drag_offset(2, &mut store);
    day_pager.on_momentum_end(2, &mut store);

    assert_eq!(*seen.borrow(), vec![d("2024-06-12")]);
}
