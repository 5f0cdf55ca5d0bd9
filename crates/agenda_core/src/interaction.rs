//! Gesture arbitration for a single day canvas.
//!
//! Exactly one of background scroll, draft creation, event drag, or edge
//! resize may run at a time. The host recognizes raw gestures (long press,
//! pan translation, taps) and routes them here together with what sits under
//! the pointer; this machine decides what, if anything, they become. All
//! state transitions happen at gesture-begin time through one arbitration
//! check rather than flags scattered across handlers.
//!
//! Moves and resizes update an optimistic override live and commit once at
//! gesture end; the override outlives the gesture until the authoritative
//! event data catches up, so a committed drag never snaps back.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::event::{EventPatch, OverrideStore, TimedEvent};
use crate::timegrid::{
    snap_minutes, y_to_minutes, DEFAULT_CREATE_MIN, MINUTES_PER_DAY, MIN_EVENT_MIN, SNAP_STEP_MIN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Top,
    Bottom,
}

/// What the pointer was over when a gesture began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureTarget {
    Background,
    Event(String),
    Handle(String, ResizeEdge),
}

/// Effects for the host to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasEffect {
    /// Best-effort tactile feedback; hosts may ignore it entirely.
    HapticPop,
    Create {
        day: NaiveDate,
        start_minutes: i32,
        duration_minutes: i32,
    },
    Update {
        day: NaiveDate,
        id: String,
        patch: EventPatch,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Idle,
    Creating {
        origin: i32,
        current: i32,
    },
    Dragging {
        id: String,
        origin_start: i32,
        duration: i32,
        current_start: i32,
    },
    Resizing {
        id: String,
        edge: ResizeEdge,
        origin: (i32, i32),
        current: (i32, i32),
    },
}

/// Per-canvas gesture state. One instance per mounted day page.
pub struct CanvasState {
    day: NaiveDate,
    row_height: f32,
    mode: Mode,
    selected: Option<String>,
    pointer_on_event: bool,
    overrides: OverrideStore,
}

impl CanvasState {
    pub fn new(day: NaiveDate, row_height: f32) -> Self {
        Self {
            day,
            row_height,
            mode: Mode::Idle,
            selected: None,
            pointer_on_event: false,
            overrides: OverrideStore::default(),
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn selected_event(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn gesture_active(&self) -> bool {
        !matches!(self.mode, Mode::Idle)
    }

    /// The surrounding scroll container must suspend itself while any
    /// create/drag/resize gesture runs.
    pub fn scroll_enabled(&self) -> bool {
        !self.gesture_active()
    }

    /// The live draft, if a create gesture is in progress.
    pub fn draft(&self) -> Option<(i32, i32)> {
        match &self.mode {
            Mode::Creating { current, .. } => Some((*current, DEFAULT_CREATE_MIN)),
            _ => None,
        }
    }

    pub fn dragging_event(&self) -> Option<&str> {
        match &self.mode {
            Mode::Dragging { id, .. } | Mode::Resizing { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Override-aware start/duration for display.
    pub fn effective_span(&self, event: &TimedEvent) -> (i32, i32) {
        (
            self.overrides.effective_start(event),
            self.overrides.effective_duration(event),
        )
    }

    /// Track whether a pointer is physically on an event card or handle;
    /// deselection paths are disabled while it is.
    pub fn set_pointer_on_event(&mut self, on_event: bool) {
        self.pointer_on_event = on_event;
    }

    /// A long press activated at `y` over `target`. This is the single
    /// arbitration point: whatever it decides runs exclusively until the
    /// gesture ends.
    pub fn long_press(
        &mut self,
        target: GestureTarget,
        y: f32,
        events: &[TimedEvent],
    ) -> Vec<CanvasEffect> {
        if self.gesture_active() {
            return Vec::new();
        }

        match target {
            GestureTarget::Background => {
                if self.selected.is_some() {
                    // the overlay press clears selection instead of creating
                    self.selected = None;
                    return Vec::new();
                }

                let start = self.snap_draft_start(y_to_minutes(self.row_height, y));
                self.mode = Mode::Creating {
                    origin: start,
                    current: start,
                };
                debug!(start, "draft creation began");
                vec![CanvasEffect::HapticPop]
            }
            GestureTarget::Event(id) => {
                if self.selected.as_deref() == Some(id.as_str()) {
                    self.begin_drag(&id, events);
                } else {
                    // first long press selects only, without moving
                    self.selected = Some(id);
                }
                Vec::new()
            }
            GestureTarget::Handle(id, edge) => {
                self.begin_resize(&id, edge, events);
                Vec::new()
            }
        }
    }

    /// Begin moving an already-selected event. Used both by a long press on
    /// the selected card and by a small drag that starts on it.
    pub fn begin_drag(&mut self, id: &str, events: &[TimedEvent]) -> bool {
        if self.gesture_active() || self.selected.as_deref() != Some(id) {
            return false;
        }
        let Some(event) = events.iter().find(|e| e.id == id) else {
            return false;
        };

        let origin_start = self.overrides.effective_start(event);
        self.mode = Mode::Dragging {
            id: id.to_owned(),
            origin_start,
            duration: self.overrides.effective_duration(event),
            current_start: origin_start,
        };
        true
    }

    /// Begin resizing via an edge handle; only offered while selected.
    pub fn begin_resize(&mut self, id: &str, edge: ResizeEdge, events: &[TimedEvent]) -> bool {
        if self.gesture_active() || self.selected.as_deref() != Some(id) {
            return false;
        }
        let Some(event) = events.iter().find(|e| e.id == id) else {
            return false;
        };

        let origin = (
            self.overrides.effective_start(event),
            self.overrides.effective_duration(event),
        );
        self.mode = Mode::Resizing {
            id: id.to_owned(),
            edge,
            origin,
            current: origin,
        };
        true
    }

    /// Accumulated pan translation since gesture begin, in pixels.
    pub fn pan_update(&mut self, translation_y: f32) {
        let delta = y_to_minutes(self.row_height, translation_y);

        match &mut self.mode {
            Mode::Idle => {}
            Mode::Creating { origin, current } => {
                let start = snap_minutes(*origin + delta, SNAP_STEP_MIN)
                    .clamp(0, MINUTES_PER_DAY - DEFAULT_CREATE_MIN);
                *current = start;
            }
            Mode::Dragging {
                id,
                origin_start,
                duration,
                current_start,
            } => {
                let start = snap_minutes(*origin_start + delta, SNAP_STEP_MIN)
                    .clamp(0, MINUTES_PER_DAY - *duration);
                *current_start = start;
                self.overrides.set(id, EventPatch::start(start));
            }
            Mode::Resizing {
                id,
                edge,
                origin,
                current,
            } => {
                // events already below the duration floor can grow but
                // never shrink further
                let floor = MIN_EVENT_MIN.min(origin.1);
                *current = match edge {
                    ResizeEdge::Top => {
                        // end stays fixed, start moves
                        let end = origin.0 + origin.1;
                        let start =
                            snap_minutes(origin.0 + delta, SNAP_STEP_MIN).clamp(0, end - floor);
                        (start, end - start)
                    }
                    ResizeEdge::Bottom => {
                        // start stays fixed, duration moves
                        let cap = MINUTES_PER_DAY - origin.0;
                        let duration = snap_minutes(origin.1 + delta, SNAP_STEP_MIN)
                            .clamp(floor.min(cap), cap);
                        (origin.0, duration)
                    }
                };
                self.overrides.set(
                    id,
                    EventPatch {
                        start_minutes: (current.0 != origin.0).then_some(current.0),
                        duration_minutes: (current.1 != origin.1).then_some(current.1),
                    },
                );
            }
        }
    }

    /// Normal gesture end. Commits creates always, moves and resizes only
    /// when something actually changed; a no-movement gesture issues no
    /// callbacks at all.
    pub fn end_gesture(&mut self) -> Vec<CanvasEffect> {
        let mode = std::mem::replace(&mut self.mode, Mode::Idle);
        self.pointer_on_event = false;

        match mode {
            Mode::Idle => Vec::new(),
            Mode::Creating { current, .. } => vec![CanvasEffect::Create {
                day: self.day,
                start_minutes: current,
                duration_minutes: DEFAULT_CREATE_MIN,
            }],
            Mode::Dragging {
                id,
                origin_start,
                current_start,
                ..
            } => {
                if current_start == origin_start {
                    self.overrides.clear(&id);
                    return Vec::new();
                }
                // the override stays until authoritative data matches
                vec![CanvasEffect::Update {
                    day: self.day,
                    id,
                    patch: EventPatch::start(current_start),
                }]
            }
            Mode::Resizing {
                id,
                edge,
                origin,
                current,
            } => {
                if current == origin {
                    self.overrides.clear(&id);
                    return Vec::new();
                }
                let patch = match edge {
                    ResizeEdge::Top => EventPatch {
                        start_minutes: Some(current.0),
                        duration_minutes: Some(current.1),
                    },
                    ResizeEdge::Bottom => EventPatch {
                        start_minutes: None,
                        duration_minutes: Some(current.1),
                    },
                };
                vec![CanvasEffect::Update {
                    day: self.day,
                    id,
                    patch,
                }]
            }
        }
    }

    /// Abnormal gesture end. Drafts and uncommitted moves are discarded;
    /// resizes commit anyway, matching release semantics, because the event
    /// was already visually reshaped under the finger.
    pub fn cancel_gesture(&mut self) -> Vec<CanvasEffect> {
        match &self.mode {
            Mode::Resizing { .. } => self.end_gesture(),
            Mode::Dragging { id, .. } => {
                self.overrides.clear(&id.clone());
                self.mode = Mode::Idle;
                self.pointer_on_event = false;
                Vec::new()
            }
            _ => {
                self.mode = Mode::Idle;
                self.pointer_on_event = false;
                Vec::new()
            }
        }
    }

    /// A plain tap. Background taps clear selection unless a pointer is
    /// still on an event; event taps are inert (selection needs a long
    /// press) but never deselect.
    pub fn tap(&mut self, target: &GestureTarget) {
        if self.gesture_active() || self.pointer_on_event {
            return;
        }
        if matches!(target, GestureTarget::Background) {
            self.selected = None;
        }
    }

    /// Recovery path for a gesture framework that never delivered a normal
    /// end: drop everything back to neutral so no "touching" flag dangles.
    pub fn force_reset(&mut self) {
        if self.gesture_active() {
            warn!(day = %self.day, "force-resetting an active canvas gesture");
        }
        if let Mode::Dragging { id, .. } | Mode::Resizing { id, .. } = &self.mode {
            self.overrides.clear(&id.clone());
        }
        self.mode = Mode::Idle;
        self.selected = None;
        self.pointer_on_event = false;
    }

    /// Authoritative event data changed; retire overrides it now satisfies.
    pub fn reconcile(&mut self, events: &[TimedEvent]) {
        self.overrides.reconcile(events);
    }

    fn snap_draft_start(&self, minutes: i32) -> i32 {
        snap_minutes(minutes, SNAP_STEP_MIN).clamp(0, MINUTES_PER_DAY - DEFAULT_CREATE_MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::parse_iso_day;
    use crate::timegrid::DEFAULT_ROW_HEIGHT;
    use pretty_assertions::assert_eq;

    fn day() -> NaiveDate {
        parse_iso_day("2024-06-10").unwrap()
    }

    fn event(id: &str, start: i32, duration: i32) -> TimedEvent {
        TimedEvent {
            id: id.to_owned(),
            day: day(),
            start_minutes: start,
            duration_minutes: duration,
            title: "standup".to_owned(),
        }
    }

    fn canvas() -> CanvasState {
        CanvasState::new(day(), DEFAULT_ROW_HEIGHT)
    }

    fn select(canvas: &mut CanvasState, id: &str, events: &[TimedEvent]) {
        let fx = canvas.long_press(GestureTarget::Event(id.to_owned()), 0.0, events);
        assert!(fx.is_empty());
        canvas.end_gesture();
        assert_eq!(canvas.selected_event(), Some(id));
    }

    #[test]
    fn background_long_press_creates_with_default_duration() {
        let mut canvas = canvas();

        // y = 9.5 hours down the grid
        let fx = canvas.long_press(GestureTarget::Background, 9.5 * DEFAULT_ROW_HEIGHT, &[]);
        assert_eq!(fx, vec![CanvasEffect::HapticPop]);
        assert!(!canvas.scroll_enabled());
        assert_eq!(canvas.draft(), Some((570, 30)));

        let fx = canvas.end_gesture();
        assert_eq!(
            fx,
            vec![CanvasEffect::Create {
                day: day(),
                start_minutes: 570,
                duration_minutes: 30,
            }]
        );
        assert!(canvas.scroll_enabled());
    }

    #[test]
    fn draft_follows_the_finger_and_cancel_discards() {
        let mut canvas = canvas();
        canvas.long_press(GestureTarget::Background, 2.0 * DEFAULT_ROW_HEIGHT, &[]);
        canvas.pan_update(DEFAULT_ROW_HEIGHT); // one hour down
        assert_eq!(canvas.draft(), Some((180, 30)));

        assert_eq!(canvas.cancel_gesture(), Vec::new());
        assert_eq!(canvas.draft(), None);
        assert!(canvas.scroll_enabled());
    }

    #[test]
    fn first_long_press_selects_without_moving() {
        let events = [event("a", 540, 60)];
        let mut canvas = canvas();

        canvas.long_press(GestureTarget::Event("a".into()), 0.0, &events);
        assert_eq!(canvas.selected_event(), Some("a"));
        assert!(!canvas.gesture_active());
        assert_eq!(canvas.end_gesture(), Vec::new());
    }

    #[test]
    fn long_press_on_selected_event_begins_dragging() {
        let events = [event("a", 540, 60)];
        let mut canvas = canvas();
        select(&mut canvas, "a", &events);

        canvas.long_press(GestureTarget::Event("a".into()), 0.0, &events);
        assert!(canvas.gesture_active());
        assert_eq!(canvas.dragging_event(), Some("a"));

        canvas.pan_update(DEFAULT_ROW_HEIGHT / 2.0); // +30min
        assert_eq!(canvas.effective_span(&events[0]), (570, 60));

        let fx = canvas.end_gesture();
        assert_eq!(
            fx,
            vec![CanvasEffect::Update {
                day: day(),
                id: "a".into(),
                patch: EventPatch::start(570),
            }]
        );
        // optimistic override survives until data catches up
        assert_eq!(canvas.effective_span(&events[0]), (570, 60));
        canvas.reconcile(&[event("a", 570, 60)]);
        assert_eq!(canvas.effective_span(&event("a", 570, 60)), (570, 60));
    }

    #[test]
    fn no_movement_drag_issues_zero_callbacks() {
        let events = [event("a", 540, 60)];
        let mut canvas = canvas();
        select(&mut canvas, "a", &events);

        assert!(canvas.begin_drag("a", &events));
        canvas.pan_update(2.0); // under half a snap step
        assert_eq!(canvas.end_gesture(), Vec::new());
        assert_eq!(canvas.effective_span(&events[0]), (540, 60));
    }

    #[test]
    fn drag_clamps_to_the_day() {
        let events = [event("a", 1320, 90)]; // 22:00 for 90min
        let mut canvas = canvas();
        select(&mut canvas, "a", &events);
        canvas.begin_drag("a", &events);

        canvas.pan_update(10.0 * DEFAULT_ROW_HEIGHT);
        let (start, duration) = canvas.effective_span(&events[0]);
        assert_eq!((start, duration), (1350, 90));
        assert!(start + duration <= MINUTES_PER_DAY);

        canvas.pan_update(-40.0 * DEFAULT_ROW_HEIGHT);
        assert_eq!(canvas.effective_span(&events[0]).0, 0);
    }

    #[test]
    fn top_resize_holds_the_end_fixed() {
        let events = [event("a", 600, 60)];
        let mut canvas = canvas();
        select(&mut canvas, "a", &events);
        assert!(canvas.begin_resize("a", ResizeEdge::Top, &events));

        canvas.pan_update(-DEFAULT_ROW_HEIGHT / 2.0); // start 30min earlier
        assert_eq!(canvas.effective_span(&events[0]), (570, 90));

        // shrinking past the floor pins at the minimum duration
        canvas.pan_update(3.0 * DEFAULT_ROW_HEIGHT);
        assert_eq!(canvas.effective_span(&events[0]), (645, MIN_EVENT_MIN));

        let fx = canvas.end_gesture();
        assert_eq!(
            fx,
            vec![CanvasEffect::Update {
                day: day(),
                id: "a".into(),
                patch: EventPatch {
                    start_minutes: Some(645),
                    duration_minutes: Some(MIN_EVENT_MIN),
                },
            }]
        );
    }

    #[test]
    fn bottom_resize_clamps_to_day_end_and_commits_on_cancel() {
        let events = [event("a", 1380, 30)]; // 23:00
        let mut canvas = canvas();
        select(&mut canvas, "a", &events);
        assert!(canvas.begin_resize("a", ResizeEdge::Bottom, &events));

        canvas.pan_update(5.0 * DEFAULT_ROW_HEIGHT);
        assert_eq!(canvas.effective_span(&events[0]), (1380, 60));

        let fx = canvas.cancel_gesture();
        assert_eq!(
            fx,
            vec![CanvasEffect::Update {
                day: day(),
                id: "a".into(),
                patch: EventPatch {
                    start_minutes: None,
                    duration_minutes: Some(60),
                },
            }]
        );
    }

    #[test]
    fn resize_invariants_hold_for_every_intermediate_update() {
        let events = [event("a", 420, 45)];
        for edge in [ResizeEdge::Top, ResizeEdge::Bottom] {
            let mut canvas = canvas();
            select(&mut canvas, "a", &events);
            canvas.begin_resize("a", edge, &events);

            let mut y = -30.0 * DEFAULT_ROW_HEIGHT;
            while y < 30.0 * DEFAULT_ROW_HEIGHT {
                canvas.pan_update(y);
                let (start, duration) = canvas.effective_span(&events[0]);
                assert!(duration >= MIN_EVENT_MIN, "duration floor violated");
                assert!(start + duration <= MINUTES_PER_DAY, "day cap violated");
                assert!(start >= 0);
                y += 7.3;
            }
        }
    }

    #[test]
    fn top_resize_can_grow_but_not_shrink_a_sub_minimum_event() {
        let events = [event("a", 60, 10)];
        let mut canvas = canvas();
        select(&mut canvas, "a", &events);
        assert!(canvas.begin_resize("a", ResizeEdge::Top, &events));

        // already below the floor: dragging down pins instead of shrinking
        canvas.pan_update(0.0);
        assert_eq!(canvas.effective_span(&events[0]), (60, 10));
        canvas.pan_update(3.0 * DEFAULT_ROW_HEIGHT);
        assert_eq!(canvas.effective_span(&events[0]), (60, 10));

        // growing upward still works
        canvas.pan_update(-DEFAULT_ROW_HEIGHT);
        assert_eq!(canvas.effective_span(&events[0]), (0, 70));
    }

    #[test]
    fn bottom_resize_pins_a_short_event_ending_at_day_end() {
        let events = [event("a", 1430, 10)]; // 23:50 for 10min
        let mut canvas = canvas();
        select(&mut canvas, "a", &events);
        assert!(canvas.begin_resize("a", ResizeEdge::Bottom, &events));

        canvas.pan_update(0.0);
        assert_eq!(canvas.effective_span(&events[0]), (1430, 10));
        canvas.pan_update(5.0 * DEFAULT_ROW_HEIGHT);
        assert_eq!(canvas.effective_span(&events[0]), (1430, 10));

        // nothing changed, so nothing commits
        assert_eq!(canvas.end_gesture(), Vec::new());
    }

    #[test]
    fn background_press_while_selected_deselects_instead_of_creating() {
        let events = [event("a", 540, 60)];
        let mut canvas = canvas();
        select(&mut canvas, "a", &events);

        let fx = canvas.long_press(GestureTarget::Background, 100.0, &events);
        assert_eq!(fx, Vec::new());
        assert_eq!(canvas.selected_event(), None);
        assert_eq!(canvas.draft(), None);
    }

    #[test]
    fn tap_deselects_only_off_events_and_outside_gestures() {
        let events = [event("a", 540, 60)];
        let mut canvas = canvas();
        select(&mut canvas, "a", &events);

        canvas.set_pointer_on_event(true);
        canvas.tap(&GestureTarget::Background);
        assert_eq!(canvas.selected_event(), Some("a"));

        canvas.set_pointer_on_event(false);
        canvas.tap(&GestureTarget::Event("a".into()));
        assert_eq!(canvas.selected_event(), Some("a"));

        canvas.tap(&GestureTarget::Background);
        assert_eq!(canvas.selected_event(), None);
    }

    #[test]
    fn resize_handles_require_selection() {
        let events = [event("a", 540, 60)];
        let mut canvas = canvas();
        assert!(!canvas.begin_resize("a", ResizeEdge::Top, &events));

        select(&mut canvas, "a", &events);
        assert!(!canvas.begin_resize("b", ResizeEdge::Top, &events));
        assert!(canvas.begin_resize("a", ResizeEdge::Top, &events));
    }

    #[test]
    fn force_reset_always_recovers_to_neutral() {
        let events = [event("a", 540, 60)];
        let mut canvas = canvas();
        select(&mut canvas, "a", &events);
        canvas.begin_drag("a", &events);
        canvas.pan_update(DEFAULT_ROW_HEIGHT);
        canvas.set_pointer_on_event(true);

        canvas.force_reset();
        assert!(!canvas.gesture_active());
        assert!(canvas.scroll_enabled());
        assert_eq!(canvas.selected_event(), None);
        // the uncommitted override was discarded
        assert_eq!(canvas.effective_span(&events[0]), (540, 60));
    }

    #[test]
    fn only_one_gesture_runs_at_a_time() {
        let events = [event("a", 540, 60)];
        let mut canvas = canvas();
        select(&mut canvas, "a", &events);
        canvas.begin_drag("a", &events);

        // a second begin of any kind loses arbitration
        assert!(!canvas.begin_resize("a", ResizeEdge::Top, &events));
        let fx = canvas.long_press(GestureTarget::Background, 0.0, &events);
        assert_eq!(fx, Vec::new());
        assert_eq!(canvas.draft(), None);
        assert_eq!(canvas.dragging_event(), Some("a"));
    }
}
