use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::stats::Summary;
use crate::state::{AppState, NO_DATA_MESSAGE, ResultsView};
use crate::ui::table;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Search Filters");
    ui.separator();

    if state.dataset.is_empty() {
        ui.label("No dataset loaded.");
        return;
    }

    let genres = state.genre_options.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Text queries ----
            let mut submitted = false;
            ui.strong("Artist Name");
            let resp = ui.add(
                egui::TextEdit::singleline(&mut state.inputs.artist_query)
                    .hint_text("Search by artist name..."),
            );
            submitted |= resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            ui.strong("Track Name");
            let resp = ui.add(
                egui::TextEdit::singleline(&mut state.inputs.track_query)
                    .hint_text("Search by track name..."),
            );
            submitted |= resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            ui.separator();

            // ---- Year range ----
            if let Some((lo, hi)) = state.year_bounds {
                ui.strong("Year Range");
                let mut from = state.inputs.year_min;
                if ui
                    .add(egui::Slider::new(&mut from, lo..=hi).text("From"))
                    .changed()
                {
                    state.set_year_min(from);
                }
                let mut to = state.inputs.year_max;
                if ui
                    .add(egui::Slider::new(&mut to, lo..=hi).text("To"))
                    .changed()
                {
                    state.set_year_max(to);
                }
                ui.separator();
            }

            // ---- Genres (collapsible multi-select) ----
            let header_text = format!("Genres  ({}/{})", state.inputs.genres.len(), genres.len());
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("genres")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_genres();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_genres();
                        }
                    });

                    for genre in &genres {
                        let mut checked = state.inputs.genres.contains(genre);
                        if ui.checkbox(&mut checked, genre.as_str()).changed() {
                            state.toggle_genre(genre);
                        }
                    }
                });
            ui.separator();

            // ---- Actions ----
            ui.horizontal(|ui: &mut Ui| {
                let search = egui::Button::new(RichText::new("Search Songs").strong())
                    .fill(ui.visuals().selection.bg_fill);
                if ui.add(search).clicked() {
                    submitted = true;
                }
                if ui.button("Clear").clicked() {
                    state.clear();
                }
            });

            if submitted {
                state.search();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Reload data").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!("Source: {}", state.config.data_path.display()));
        ui.separator();

        if !state.dataset.is_empty() {
            ui.label(format!("{} songs loaded", state.dataset.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – metrics and results
// ---------------------------------------------------------------------------

/// Render dataset metrics followed by either the preview or the search results.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(state.config.window_title.as_str());
    ui.label("Search and filter through your Spotify songs collection");
    ui.separator();

    let mut export_clicked = false;

    match state.view() {
        ResultsView::NoData(message) => {
            if state.load_error.is_some() {
                ui.label(RichText::new(message).color(Color32::RED));
            }
            ui.label(RichText::new(NO_DATA_MESSAGE).color(Color32::YELLOW));
            return;
        }
        ResultsView::Preview { rows, caption } => {
            if let Some(summary) = &state.summary {
                metrics(ui, summary, true);
            }
            ui.separator();
            ui.heading("All Songs Preview");
            ui.label("Use the filters on the left to search for specific songs, then click 'Search Songs'");
            table::song_table(ui, "preview", &state.dataset, &rows);
            if let Some(caption) = caption {
                ui.small(caption);
            }
        }
        ResultsView::NoMatches => {
            if let Some(summary) = &state.summary {
                metrics(ui, summary, true);
            }
            ui.separator();
            ui.heading("Search Results");
            ui.label(
                RichText::new("No songs found matching your criteria. Try adjusting your filters.")
                    .color(Color32::RED),
            );
        }
        ResultsView::Matches { indices, summary } => {
            if let Some(global) = &state.summary {
                metrics(ui, global, true);
            }
            ui.separator();
            ui.heading("Search Results");
            ui.label(
                RichText::new(format!(
                    "Found {} song(s) matching your criteria",
                    indices.len()
                ))
                .color(Color32::GREEN),
            );
            metrics(ui, &summary, false);
            if ui.button("📥 Download Filtered Results as CSV").clicked() {
                export_clicked = true;
            }
            table::song_table(ui, "results", &state.dataset, indices);
        }
    }

    if export_clicked {
        save_file_dialog(state);
    }
}

/// A row of headline numbers. `whole` selects the dataset-wide wording.
fn metrics(ui: &mut Ui, summary: &Summary, whole: bool) {
    let entries: Vec<(&str, String)> = if whole {
        vec![
            ("Total Songs", summary.total.to_string()),
            ("Unique Artists", summary.unique_artists.to_string()),
            ("Years Range", summary.year_range_label()),
            ("Genres", summary.unique_genres.to_string()),
        ]
    } else {
        vec![
            ("Artists in Results", summary.unique_artists.to_string()),
            ("Years Covered", summary.year_range_label()),
            ("Genres in Results", summary.unique_genres.to_string()),
        ]
    };

    ui.columns(entries.len(), |cols: &mut [Ui]| {
        for (col, (label, value)) in cols.iter_mut().zip(entries) {
            col.label(RichText::new(label).small());
            col.label(RichText::new(value).size(22.0).strong());
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save filtered songs")
        .set_file_name(&state.config.export_file_name)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_to(&path) {
            Ok(count) => log::info!("Exported {count} songs to {}", path.display()),
            Err(e) => log::error!("Export failed: {e:#}"),
        }
    }
}
