//! Header row: month title, week chevrons, today button and the month grid
//! expansion toggle.

use chrono::NaiveDate;
use egui::{self, Button, RichText, Ui};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopBarAction {
    PrevWeek,
    NextWeek,
    Today,
    ToggleMonth,
}

pub fn top_bar(ui: &mut Ui, selected: NaiveDate, month_open: bool) -> Option<TopBarAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        let title = selected.format("%B %Y").to_string();
        let arrow = if month_open { "⏶" } else { "⏷" };
        if ui
            .add(Button::new(RichText::new(format!("{title} {arrow}")).strong()).frame(false))
            .clicked()
        {
            action = Some(TopBarAction::ToggleMonth);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.add(Button::new("Today").frame(false)).clicked() {
                action = Some(TopBarAction::Today);
            }
            if ui.add(Button::new("›").frame(false)).clicked() {
                action = Some(TopBarAction::NextWeek);
            }
            if ui.add(Button::new("‹").frame(false)).clicked() {
                action = Some(TopBarAction::PrevWeek);
            }
        });
    });

    action
}
