//! The shared selected-day store.
//!
//! There is exactly one selected calendar day in the whole app and two
//! independently-paging views (the week strip and the day timeline) that
//! both read and write it. Every mutation is tagged with its origin so each
//! observer can skip changes it caused itself; that tag, not value equality,
//! is what prevents calendar <-> timeline feedback loops.

use chrono::NaiveDate;
use tracing::debug;

use crate::date::iso_day;

/// Origin of a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    /// Initial state, or programmatic resets at startup.
    Init,
    /// Week strip or month grid.
    Calendar,
    /// Committed day-timeline swipe.
    Timeline,
    /// Live preview while a timeline swipe is still under the finger.
    TimelinePreview,
    /// The "today" affordance.
    TodayButton,
}

impl SelectionSource {
    /// Changes the day pager must not react to, because it produced them.
    pub fn is_timeline_origin(self) -> bool {
        matches!(self, Self::Timeline | Self::TimelinePreview)
    }

    /// Preview updates are not externally meaningful commits.
    pub fn is_preview(self) -> bool {
        matches!(self, Self::TimelinePreview)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Calendar => "calendar",
            Self::Timeline => "timeline",
            Self::TimelinePreview => "timeline_preview",
            Self::TodayButton => "today_button",
        }
    }
}

/// A committed change observed via [`SelectionStore::changed_since`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub day: NaiveDate,
    pub source: SelectionSource,
    pub generation: u64,
}

type Listener = Box<dyn FnMut(NaiveDate)>;

/// Single source of truth for the selected day.
///
/// Mutated only through [`set_selected`](Self::set_selected). The pagers
/// observe it by polling the generation counter once per frame, which is the
/// immediate-mode equivalent of synchronous notification: a committed change
/// is visible to every observer before the next frame renders, and observers
/// never call into each other. Host listeners registered with
/// [`subscribe`](Self::subscribe) run synchronously inside the mutation for
/// every non-preview change.
pub struct SelectionStore {
    selected: NaiveDate,
    last_source: SelectionSource,
    generation: u64,
    listeners: Vec<Listener>,
}

impl SelectionStore {
    pub fn new(initial: NaiveDate) -> Self {
        Self {
            selected: initial,
            last_source: SelectionSource::Init,
            generation: 0,
            listeners: Vec::new(),
        }
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn last_source(&self) -> SelectionSource {
        self.last_source
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The single mutation entry point. Writes that change neither the day
    /// nor the source are no-ops. A same-day write with a new source only
    /// promotes the tag (a timeline swipe that previewed its landing day
    /// still needs its commit recorded); observers filter on origin, so the
    /// re-announcement is harmless to them.
    pub fn set_selected(&mut self, day: NaiveDate, source: SelectionSource) {
        if day == self.selected && source == self.last_source {
            return;
        }

        debug!(
            day = %iso_day(day),
            source = source.as_str(),
            "selection changed"
        );

        let day_changed = day != self.selected;
        let was_preview = self.last_source.is_preview();
        self.selected = day;
        self.last_source = source;
        self.generation += 1;

        if !source.is_preview() && (day_changed || was_preview) {
            for listener in &mut self.listeners {
                listener(day);
            }
        }
    }

    /// Register a host callback fired on every non-preview change.
    pub fn subscribe(&mut self, listener: impl FnMut(NaiveDate) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// The latest change if anything happened after `seen_generation`.
    /// Intermediate changes are coalesced; only the newest state survives.
    pub fn changed_since(&self, seen_generation: u64) -> Option<SelectionChange> {
        (self.generation > seen_generation).then_some(SelectionChange {
            day: self.selected,
            source: self.last_source,
            generation: self.generation,
        })
    }
}
