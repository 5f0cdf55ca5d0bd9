//! Desktop shell for the agenda UI.
//!
//! Hosts [`AgendaView`] with an in-memory event store. Events can be seeded
//! from a JSON fixture passed as the first argument; create and update
//! actions from the UI are applied directly to the store, which is exactly
//! the authoritative-data role a real backend would play.

use std::path::Path;

use agenda_core::event::TimedEvent;
use agenda_core::{Error, Result};
use agenda_ui::{AgendaAction, AgendaView};
use chrono::Local;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

struct AgendaApp {
    view: AgendaView,
    events: Vec<TimedEvent>,
    next_id: u64,
}

impl AgendaApp {
    fn new(events: Vec<TimedEvent>) -> Self {
        let today = Local::now().date_naive();
        let mut view = AgendaView::new(today);
        view.on_day_selected(|day| debug!(%day, "day selected"));
        Self {
            view,
            events,
            next_id: 1,
        }
    }

    fn apply(&mut self, action: AgendaAction) {
        match action {
            AgendaAction::CreateEvent {
                day,
                start_minutes,
                duration_minutes,
            } => {
                let id = format!("local-{}", self.next_id);
                self.next_id += 1;
                info!(%day, start_minutes, id, "event created");
                self.events.push(TimedEvent {
                    id,
                    day,
                    start_minutes,
                    duration_minutes,
                    title: "New event".to_owned(),
                });
            }
            AgendaAction::UpdateEvent { id, patch, .. } => {
                let Some(event) = self.events.iter_mut().find(|e| e.id == id) else {
                    warn!(id, "update for an unknown event");
                    return;
                };
                if let Some(start) = patch.start_minutes {
                    event.start_minutes = start;
                }
                if let Some(duration) = patch.duration_minutes {
                    event.duration_minutes = duration;
                }
                info!(id, ?patch, "event updated");
            }
            AgendaAction::Haptic => {}
        }
    }
}

impl eframe::App for AgendaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Local::now();
        egui::CentralPanel::default().show(ctx, |ui| {
            let actions =
                self.view
                    .show(ui, &self.events, now.date_naive(), now.time());
            for action in actions {
                self.apply(action);
            }
        });
    }
}

fn load_events(path: &Path) -> Result<Vec<TimedEvent>> {
    let json = std::fs::read_to_string(path).map_err(|e| Error::Generic(e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| Error::Generic(e.to_string()))
}

fn setup_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("agenda_core=info,agenda_ui=info,agenda_app=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn main() -> Result<()> {
    setup_logging();

    let events = match std::env::args().nth(1) {
        Some(fixture) => load_events(Path::new(&fixture))?,
        None => Vec::new(),
    };
    info!(count = events.len(), "starting with seeded events");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([420.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Agenda",
        native_options,
        Box::new(|_cc| Ok(Box::new(AgendaApp::new(events)))),
    )
    .map_err(|e| Error::Generic(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_core::date::parse_iso_day_strict;
    use agenda_core::event::EventPatch;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn fixture_event() -> TimedEvent {
        TimedEvent {
            id: "a".to_owned(),
            day: parse_iso_day_strict("2024-06-10").unwrap(),
            start_minutes: 540,
            duration_minutes: 60,
            title: "standup".to_owned(),
        }
    }

    #[test]
    fn fixtures_load_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&vec![fixture_event()]).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let events = load_events(file.path()).unwrap();
        assert_eq!(events, vec![fixture_event()]);
    }

    #[test]
    fn missing_fixture_is_an_error() {
        assert!(load_events(Path::new("/nonexistent/events.json")).is_err());
    }

    #[test]
    fn create_and_update_actions_mutate_the_store() {
        let mut app = AgendaApp::new(vec![fixture_event()]);

        app.apply(AgendaAction::CreateEvent {
            day: parse_iso_day_strict("2024-06-11").unwrap(),
            start_minutes: 600,
            duration_minutes: 30,
        });
        assert_eq!(app.events.len(), 2);
        assert_eq!(app.events[1].id, "local-1");

        app.apply(AgendaAction::UpdateEvent {
            day: app.events[0].day,
            id: "a".to_owned(),
            patch: EventPatch {
                start_minutes: Some(570),
                duration_minutes: None,
            },
        });
        assert_eq!(app.events[0].start_minutes, 570);
        assert_eq!(app.events[0].duration_minutes, 60);
    }
}
