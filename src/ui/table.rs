use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{self, Dataset};

// ---------------------------------------------------------------------------
// Song table (central panel)
// ---------------------------------------------------------------------------

/// Friendly header for the well-known columns; anything else keeps its name.
pub fn column_label(column: &str) -> &str {
    match column {
        model::ID => "ID",
        model::ARTIST_NAME => "Artist",
        model::TRACK_NAME => "Track Name",
        model::TRACK_ID => "Track ID",
        model::YEAR => "Year",
        model::GENRE => "Genre",
        other => other,
    }
}

/// Render the rows at `rows` with every source column, in source order.
pub fn song_table(ui: &mut Ui, id: &str, dataset: &Dataset, rows: &[usize]) {
    let columns = &dataset.columns;
    let row_height = egui::TextStyle::Body.resolve(ui.style()).size + 6.0;

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(60.0).clip(true), columns.len())
            .min_scrolled_height(0.0)
            .header(row_height + 4.0, |mut header| {
                for col in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(column_label(col));
                    });
                }
            })
            .body(|body| {
                body.rows(row_height, rows.len(), |mut row| {
                    let song = &dataset.songs[rows[row.index()]];
                    for col in columns {
                        row.col(|ui: &mut Ui| {
                            ui.label(song.cell(col).to_string());
                        });
                    }
                });
            });
    });
}
