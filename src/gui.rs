//! Desktop form: pick a spreadsheet, fill in definitions, save the dictionary.

use sheetdict::config::Labels;
use sheetdict::dictionary::{AnnotationRequest, Inspection, annotate, inspect};
use std::path::PathBuf;

/// Which screen the window shows.
pub enum Screen {
    Idle,
    Editing(Box<Form>),
}

/// Editable state for one inspected file.
pub struct Form {
    pub inspection: Inspection,
    pub subject: String,
    /// One entry per profiled column.
    pub definitions: Vec<String>,
}

impl Form {
    pub fn new(inspection: Inspection) -> Self {
        let definitions = inspection
            .columns
            .iter()
            .map(|c| c.definition.clone())
            .collect();
        Self {
            inspection,
            subject: String::new(),
            definitions,
        }
    }

    pub fn to_request(&self, output: PathBuf) -> AnnotationRequest {
        AnnotationRequest {
            inspection: self.inspection.clone(),
            subject: self.subject.clone(),
            definitions: self.definitions.clone(),
            output,
        }
    }

    fn suggested_file_name(&self) -> String {
        let stem = self
            .inspection
            .source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dictionary".to_owned());
        format!("{stem}_metadata.xlsx")
    }
}

enum Action {
    Open,
    Save,
    Cancel,
}

pub struct DictionaryApp {
    screen: Screen,
    labels: Labels,
}

impl Default for DictionaryApp {
    fn default() -> Self {
        Self {
            screen: Screen::Idle,
            labels: Labels::default(),
        }
    }
}

fn native_options() -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Sheetdict")
            .with_inner_size([760.0, 600.0]),
        ..Default::default()
    }
}

/// Open the desktop window; blocks until it is closed.
pub fn run() -> anyhow::Result<()> {
    eframe::run_native(
        "sheetdict",
        native_options(),
        Box::new(|_cc| Ok(Box::new(DictionaryApp::default()))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start desktop form: {e}"))
}

fn show_error(message: &str) {
    tracing::error!("{message}");
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title("Sheetdict")
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

fn show_info(message: &str) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Info)
        .set_title("Sheetdict")
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

impl DictionaryApp {
    fn open_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Spreadsheets", &["xls", "xlsx"])
            .pick_file()
        else {
            return;
        };

        match inspect(&path) {
            Ok(inspection) => self.screen = Screen::Editing(Box::new(Form::new(inspection))),
            Err(e) => {
                show_error(&e.to_string());
                self.screen = Screen::Idle;
            }
        }
    }

    fn save(&mut self) {
        let Screen::Editing(form) = &self.screen else {
            return;
        };

        let Some(output) = rfd::FileDialog::new()
            .add_filter("Excel workbook", &["xlsx"])
            .set_file_name(form.suggested_file_name())
            .save_file()
        else {
            return;
        };

        match annotate(&form.to_request(output)) {
            Ok(written) => show_info(&format!("Dictionary saved to {}", written.display())),
            Err(e) => show_error(&e.to_string()),
        }
        self.screen = Screen::Idle;
    }

    fn render_idle(ui: &mut egui::Ui) -> Option<Action> {
        let mut action = None;
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.heading("Spreadsheet data dictionary");
            ui.add_space(10.0);
            ui.label("Pick an .xls or .xlsx file to describe its columns.");
            ui.add_space(20.0);
            if ui.button("Open spreadsheet…").clicked() {
                action = Some(Action::Open);
            }
        });
        action
    }

    fn render_form(form: &mut Form, labels: &Labels, ui: &mut egui::Ui) -> Option<Action> {
        let mut action = None;

        ui.horizontal(|ui| {
            ui.heading(form.inspection.source.display().to_string());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Cancel").clicked() {
                    action = Some(Action::Cancel);
                }
                if ui.button("Save…").clicked() {
                    action = Some(Action::Save);
                }
            });
        });
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("metadata_grid")
                .num_columns(2)
                .spacing([15.0, 4.0])
                .striped(true)
                .show(ui, |ui| {
                    for entry in form.inspection.metadata.entries() {
                        ui.label(egui::RichText::new(entry.attribute.label(labels)).strong());
                        ui.label(entry.value.to_string());
                        ui.end_row();
                    }
                });

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&labels.subject).strong());
                ui.text_edit_singleline(&mut form.subject);
            });

            ui.add_space(10.0);
            ui.separator();

            egui::Grid::new("columns_grid")
                .num_columns(2)
                .spacing([15.0, 6.0])
                .show(ui, |ui| {
                    for (column, definition) in form
                        .inspection
                        .columns
                        .iter()
                        .zip(form.definitions.iter_mut())
                    {
                        ui.label(format!("{} ({})", column.name, column.kind));
                        ui.add(egui::TextEdit::singleline(definition).desired_width(400.0));
                        ui.end_row();
                    }
                });

            if form.inspection.columns.is_empty() {
                ui.label(egui::RichText::new("No columns found in the first sheet.").italics());
            }
        });

        action
    }
}

impl eframe::App for DictionaryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut action = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            action = match &mut self.screen {
                Screen::Idle => Self::render_idle(ui),
                Screen::Editing(form) => Self::render_form(form, &self.labels, ui),
            };
        });

        match action {
            Some(Action::Open) => self.open_file(),
            Some(Action::Save) => self.save(),
            Some(Action::Cancel) => self.screen = Screen::Idle,
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetdict::dictionary::{ColumnProfile, FileMetadata, ValueKind};

    fn inspection() -> Inspection {
        let metadata: FileMetadata = serde_json::from_value(serde_json::json!({
            "format": "modern",
            "entries": []
        }))
        .unwrap();
        Inspection {
            source: PathBuf::from("/data/sales.xlsx"),
            metadata,
            columns: vec![
                ColumnProfile::new("id", ValueKind::Integer),
                ColumnProfile::new("region", ValueKind::Text),
            ],
        }
    }

    #[test]
    fn test_form_starts_with_empty_definitions() {
        let form = Form::new(inspection());
        assert_eq!(form.definitions, ["", ""]);
        assert!(form.subject.is_empty());
    }

    #[test]
    fn test_form_to_request() {
        let mut form = Form::new(inspection());
        form.subject = "Sales".to_owned();
        if let Some(first) = form.definitions.first_mut() {
            first.push_str("Order id");
        }

        let request = form.to_request(PathBuf::from("/tmp/out"));
        assert_eq!(request.subject, "Sales");
        assert_eq!(request.definitions, ["Order id", ""]);
        assert_eq!(request.output, PathBuf::from("/tmp/out"));
        assert_eq!(request.inspection, form.inspection);
    }

    #[test]
    fn test_native_options_viewport() {
        let viewport = native_options().viewport;
        assert_eq!(viewport.title.as_deref(), Some("Sheetdict"));
        assert_eq!(viewport.inner_size, Some(egui::vec2(760.0, 600.0)));
    }

    #[test]
    fn test_suggested_file_name() {
        assert_eq!(Form::new(inspection()).suggested_file_name(), "sales_metadata.xlsx");
    }
}
