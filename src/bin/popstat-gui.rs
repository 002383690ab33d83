/*!
 * GUI application for popstat-rs - population dashboard on the CountriesNow API
 *
 * A cross-platform desktop application with four views:
 * - Explore: search the country list
 * - Country: latest population and a chart of the last 20 years
 * - Explore Cities: sortable, searchable city population table
 * - Compare: pick two countries and chart their populations side by side
 *
 * Platform support: Windows, macOS, Linux
 */

use anyhow::Result;
use eframe::egui;
use popstat_rs::chart::{self, ChartLine};
use popstat_rs::cities::Direction;
use popstat_rs::format::{format_compact, format_millions, format_population};
use popstat_rs::views::{
    CitiesView, CityTable, Comparison, CompareView, CountryDetail, CountryView, ExploreView, Load,
    fetch_city_table, fetch_comparison, fetch_country_detail,
};
use popstat_rs::{Client, Country, FetchError, PopulationSource, RankKey, storage};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Population Explorer - popstat-rs"),
        ..Default::default()
    };

    eframe::run_native(
        "Population Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(PopstatApp::new()))),
    )
}

enum Page {
    Explore(ExploreView),
    Country(CountryView),
    Cities(CitiesView),
    Compare(CompareView),
}

/// What a view asked for during this frame; applied after rendering.
#[derive(Debug, Clone, PartialEq)]
enum Action {
    Explore,
    Country(String),
    Cities(String),
    Compare,
    RunComparison,
    ExportTable,
    SaveChart,
}

/// Result of a background fetch.
enum Loaded {
    Countries(Result<Vec<Country>, FetchError>),
    Country(Result<CountryDetail, FetchError>),
    Cities(Result<CityTable, FetchError>),
    Comparison(Result<Comparison, FetchError>),
}

struct PopstatApp {
    client: Client,
    page: Page,
    export_dir: PathBuf,
    locale: String,

    status_message: String,
    error_message: String,

    // Background operation
    receiver: Option<mpsc::Receiver<Loaded>>,
}

impl PopstatApp {
    fn new() -> Self {
        // Default to user's home directory for exports
        let export_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let mut app = Self {
            client: Client::default(),
            page: Page::Explore(ExploreView::default()),
            export_dir,
            locale: "en".to_string(),
            status_message: String::new(),
            error_message: String::new(),
            receiver: None,
        };
        app.apply(Action::Explore);
        app
    }

    /// Run `job` on a worker thread. Only the latest job's result is kept.
    fn spawn<F>(&mut self, job: F)
    where
        F: FnOnce(&Client) -> Loaded + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        self.receiver = Some(receiver);
        let client = self.client.clone();
        thread::spawn(move || {
            let _ = sender.send(job(&client));
        });
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Explore => {
                self.clear_messages();
                self.page = Page::Explore(ExploreView::default());
                self.spawn(|c| Loaded::Countries(c.countries()));
            }
            Action::Country(iso2) => {
                self.clear_messages();
                self.page = Page::Country(CountryView::new(iso2.as_str()));
                self.spawn(move |c| Loaded::Country(fetch_country_detail(c, &iso2)));
            }
            Action::Cities(iso2) => {
                self.clear_messages();
                self.page = Page::Cities(CitiesView::new(iso2.as_str()));
                self.spawn(move |c| Loaded::Cities(fetch_city_table(c, &iso2)));
            }
            Action::Compare => {
                self.clear_messages();
                self.page = Page::Compare(CompareView::default());
                self.spawn(|c| Loaded::Countries(c.countries()));
            }
            Action::RunComparison => {
                let Page::Compare(view) = &mut self.page else {
                    return;
                };
                let Some((a, b)) = view.pair().map(|(a, b)| (a.to_string(), b.to_string()))
                else {
                    return;
                };
                view.begin();
                self.spawn(move |c| Loaded::Comparison(fetch_comparison(c, &a, &b)));
            }
            Action::ExportTable => self.export(false),
            Action::SaveChart => self.export(true),
        }
    }

    fn clear_messages(&mut self) {
        self.status_message.clear();
        self.error_message.clear();
    }

    fn check_operation_result(&mut self) {
        let Some(receiver) = &self.receiver else {
            return;
        };
        let Ok(loaded) = receiver.try_recv() else {
            return;
        };
        self.receiver = None;

        match (&mut self.page, loaded) {
            (Page::Explore(view), Loaded::Countries(r)) => view.finish(r),
            (Page::Compare(view), Loaded::Countries(r)) => view.finish_countries(r),
            (Page::Compare(view), Loaded::Comparison(r)) => view.finish(r),
            (Page::Country(view), Loaded::Country(r)) => view.finish(r),
            (Page::Cities(view), Loaded::Cities(r)) => view.finish(r),
            // Result for a page the user already left.
            _ => {}
        }
    }

    /// Export the current page's data (CSV) or chart (PNG) into a picked folder.
    fn export(&mut self, chart_only: bool) {
        let Some(dir) = rfd::FileDialog::new()
            .set_directory(&self.export_dir)
            .pick_folder()
        else {
            return;
        };
        self.export_dir = dir.clone();

        let result: Result<PathBuf> = match &self.page {
            Page::Country(view) => match view.detail.ready() {
                Some(d) if chart_only => {
                    let path = dir.join(format!("{}_population.png", d.country.iso2));
                    let mut recent = d.series.clone();
                    recent.points = view.chart_points();
                    chart::plot_series(&recent, &path, 1000, 600).map(|_| path)
                }
                Some(d) => {
                    let path = dir.join(format!("{}_population.csv", d.country.iso2));
                    storage::save_series_csv(&d.series, &path).map(|_| path)
                }
                None => return,
            },
            Page::Cities(view) => {
                let path = dir.join(format!("{}_cities.csv", view.iso2));
                storage::save_cities_csv(&view.rows(), &path).map(|_| path)
            }
            Page::Compare(view) => match view.showing() {
                Some(cmp) if chart_only => {
                    let path = dir.join("comparison.png");
                    chart::plot_comparison(cmp, &path, 1000, 600).map(|_| path)
                }
                Some(cmp) => {
                    let path = dir.join("comparison.csv");
                    storage::save_comparison_csv(cmp, &path).map(|_| path)
                }
                None => return,
            },
            Page::Explore(view) => {
                let path = dir.join("countries.csv");
                let visible: Vec<Country> = view.visible().into_iter().cloned().collect();
                storage::save_countries_csv(&visible, &path).map(|_| path)
            }
        };

        match result {
            Ok(path) => {
                self.status_message = format!("Saved {}", path.display());
                self.error_message.clear();
            }
            Err(err) => {
                self.error_message = format!("Export failed: {err}");
                self.status_message.clear();
            }
        }
    }
}

impl eframe::App for PopstatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_operation_result();

        // Request repaint if loading (for spinner animation)
        if self.receiver.is_some() {
            ctx.request_repaint();
        }

        let mut action: Option<Action> = None;

        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Population Explorer");
                ui.separator();
                if ui.button("Explore").clicked() {
                    action = Some(Action::Explore);
                }
                if ui.button("Compare").clicked() {
                    action = Some(Action::Compare);
                }
                ui.separator();
                ui.label("Locale:");
                egui::ComboBox::from_id_salt("locale")
                    .selected_text(self.locale.as_str())
                    .show_ui(ui, |ui| {
                        for tag in ["en", "de", "fr", "es", "it", "pt", "nl"] {
                            ui.selectable_value(&mut self.locale, tag.to_string(), tag);
                        }
                    });
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            if !self.status_message.is_empty() {
                ui.colored_label(egui::Color32::DARK_GREEN, self.status_message.as_str());
            }
            if !self.error_message.is_empty() {
                ui.colored_label(egui::Color32::RED, self.error_message.as_str());
            }
        });

        let locale = self.locale.clone();
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                let requested = match &mut self.page {
                    Page::Explore(view) => explore_ui(ui, view),
                    Page::Country(view) => country_ui(ui, view, &locale),
                    Page::Cities(view) => cities_ui(ui, view, &locale),
                    Page::Compare(view) => compare_ui(ui, view),
                };
                if requested.is_some() {
                    action = requested;
                }
            });
        });

        if let Some(action) = action {
            self.apply(action);
        }
    }
}

// ---------------------------------------------------------------------------
// Shared pieces

fn loading_ui(ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.spinner();
        ui.label("Loading...");
    });
}

fn not_found_ui(ui: &mut egui::Ui, message: &str) -> Option<Action> {
    let mut action = None;
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.heading("⚠ Not Found");
        ui.add_space(8.0);
        ui.label(message);
        ui.add_space(16.0);
        if ui.button("Back to Home").clicked() {
            action = Some(Action::Explore);
        }
    });
    action
}

/// Render a `Load`: spinner, "Not Found" panel, or the ready content.
fn load_ui<T>(
    ui: &mut egui::Ui,
    load: &Load<T>,
    ready: impl FnOnce(&mut egui::Ui) -> Option<Action>,
) -> Option<Action> {
    match load {
        Load::Loading => {
            loading_ui(ui);
            None
        }
        Load::Failed(message) => not_found_ui(ui, message),
        Load::Ready(_) => ready(ui),
    }
}

fn to_color32(idx: usize) -> egui::Color32 {
    let c = chart::series_color(idx);
    egui::Color32::from_rgb(c.0, c.1, c.2)
}

/// Line chart drawn with the painter; hover shows the nearest year's values.
fn line_chart_ui(ui: &mut egui::Ui, lines: &[ChartLine]) {
    let desired = egui::vec2(ui.available_width().max(200.0), 320.0);
    let (rect, response) = ui.allocate_exact_size(desired, egui::Sense::hover());
    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();
    let font = egui::FontId::proportional(12.0);
    painter.rect_filled(rect, 4.0, ui.visuals().extreme_bg_color);

    let present: Vec<(i32, u64)> = lines.iter().flat_map(|l| l.segments()).flatten().collect();
    if present.is_empty() {
        painter.text(rect.center(), egui::Align2::CENTER_CENTER, "No data", font, text_color);
        return;
    }

    let min_year = present.iter().map(|&(y, _)| y).min().unwrap_or(0);
    let max_year = present.iter().map(|&(y, _)| y).max().unwrap_or(0);
    let max_val = present.iter().map(|&(_, v)| v).max().unwrap_or(0).max(1) as f32 * 1.05;
    let year_span = (max_year - min_year).max(1) as f32;

    let plot = egui::Rect::from_min_max(
        rect.min + egui::vec2(60.0, 12.0),
        rect.max - egui::vec2(16.0, 28.0),
    );
    let to_screen = |year: i32, v: u64| {
        egui::pos2(
            plot.left() + (year - min_year) as f32 / year_span * plot.width(),
            plot.bottom() - v as f32 / max_val * plot.height(),
        )
    };

    let axis = egui::Stroke::new(1.0, ui.visuals().weak_text_color());
    painter.line_segment([plot.left_bottom(), plot.right_bottom()], axis);
    painter.line_segment([plot.left_bottom(), plot.left_top()], axis);

    for i in 0..=4 {
        let v = max_val * i as f32 / 4.0;
        let y = plot.bottom() - plot.height() * i as f32 / 4.0;
        painter.text(
            egui::pos2(plot.left() - 6.0, y),
            egui::Align2::RIGHT_CENTER,
            format_millions(v as f64, 1),
            font.clone(),
            text_color,
        );
    }
    for year in [min_year, min_year + (max_year - min_year) / 2, max_year] {
        painter.text(
            egui::pos2(to_screen(year, 0).x, plot.bottom() + 4.0),
            egui::Align2::CENTER_TOP,
            year.to_string(),
            font.clone(),
            text_color,
        );
    }

    for (idx, line) in lines.iter().enumerate() {
        let stroke = egui::Stroke::new(2.0, to_color32(idx));
        for seg in line.segments() {
            let pts: Vec<egui::Pos2> = seg.iter().map(|&(y, v)| to_screen(y, v)).collect();
            if pts.len() == 1 {
                painter.circle_filled(pts[0], 3.0, stroke.color);
            } else {
                painter.add(egui::Shape::line(pts, stroke));
            }
        }
    }

    if let Some(pos) = response.hover_pos() {
        let t = ((pos.x - plot.left()) / plot.width()).clamp(0.0, 1.0);
        let year = min_year + (t * year_span).round() as i32;
        let mut text = format!("Year: {year}");
        for line in lines {
            let value = line
                .points
                .iter()
                .find(|&&(y, _)| y == year)
                .and_then(|&(_, v)| v);
            let shown = value.map(|v| format_compact(v, 1)).unwrap_or_else(|| "NA".into());
            text.push_str(&format!("   {}: {}", line.label, shown));
        }
        let x = to_screen(year, 0).x;
        painter.line_segment([egui::pos2(x, plot.top()), egui::pos2(x, plot.bottom())], axis);
        painter.text(plot.left_top() + egui::vec2(8.0, 4.0), egui::Align2::LEFT_TOP, text, font, text_color);
    }

    ui.horizontal(|ui| {
        for (idx, line) in lines.iter().enumerate() {
            ui.colored_label(to_color32(idx), format!("━ {}", line.label));
        }
    });
}

// ---------------------------------------------------------------------------
// Pages

fn explore_ui(ui: &mut egui::Ui, view: &mut ExploreView) -> Option<Action> {
    let mut action = None;
    ui.heading("Explore Countries");
    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label("🔍");
        ui.text_edit_singleline(&mut view.search)
            .on_hover_text("Search countries...");
        if ui.button("Export").clicked() {
            action = Some(Action::ExportTable);
        }
    });
    ui.add_space(8.0);

    let listed = load_ui(ui, &view.countries, |ui| {
        let visible = view.visible();
        if visible.is_empty() {
            ui.label("No countries found matching your search.");
            return None;
        }
        let mut clicked = None;
        egui::Grid::new("countries").striped(true).show(ui, |ui| {
            for (i, country) in visible.iter().enumerate() {
                if ui
                    .selectable_label(false, format!("{}  ({})", country.name, country.iso2))
                    .clicked()
                {
                    clicked = Some(Action::Country(country.iso2.clone()));
                }
                if i % 3 == 2 {
                    ui.end_row();
                }
            }
        });
        clicked
    });
    listed.or(action)
}

fn country_ui(ui: &mut egui::Ui, view: &mut CountryView, locale: &str) -> Option<Action> {
    let Load::Ready(detail) = &view.detail else {
        return load_ui(ui, &view.detail, |_| None);
    };
    let mut action = None;
    let country = detail.country.clone();

    if ui.link("← Back to Explore").clicked() {
        action = Some(Action::Explore);
    }
    ui.heading(country.name.as_str());
    ui.horizontal(|ui| {
        ui.label(format!("ISO2: {}", country.iso2));
        if let Some(iso3) = &country.iso3 {
            ui.label(format!("ISO3: {iso3}"));
        }
        if !country.flag.is_empty() {
            ui.hyperlink_to("Flag", &country.flag);
        }
    });
    ui.add_space(8.0);

    if let Some(latest) = view.latest() {
        ui.label(egui::RichText::new("Latest Population").strong());
        ui.label(
            egui::RichText::new(format_population(latest.value, locale)).size(28.0),
        );
        ui.label(format!("Year: {}", latest.year));
    }
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        let label = if view.show_graph { "Hide Graph" } else { "View Graph" };
        if ui.button(label).clicked() {
            view.toggle_graph();
        }
        if ui.button("Explore Cities").clicked() {
            action = Some(Action::Cities(country.iso2.clone()));
        }
        if ui.button("Compare Countries").clicked() {
            action = Some(Action::Compare);
        }
        if ui.button("Export CSV").clicked() {
            action = Some(Action::ExportTable);
        }
        if ui.button("Save Chart").clicked() {
            action = Some(Action::SaveChart);
        }
    });

    if view.show_graph {
        ui.add_space(8.0);
        let line = ChartLine {
            label: country.name.clone(),
            points: view
                .chart_points()
                .into_iter()
                .map(|p| (p.year, Some(p.value)))
                .collect(),
        };
        line_chart_ui(ui, &[line]);
    }
    action
}

fn sort_header(ui: &mut egui::Ui, view: &mut CitiesView, key: RankKey, title: &str) {
    let marker = match view.sort.direction_for(key) {
        Some(Direction::Ascending) => " ▲",
        Some(Direction::Descending) => " ▼",
        None => "",
    };
    let text = egui::RichText::new(format!("{title}{marker}")).strong();
    if ui.selectable_label(false, text).clicked() {
        view.sort_by(key);
    }
}

fn cities_ui(ui: &mut egui::Ui, view: &mut CitiesView, locale: &str) -> Option<Action> {
    let Load::Ready(table) = &view.table else {
        return load_ui(ui, &view.table, |_| None);
    };
    let mut action = None;
    let country_name = table.country_name.clone();

    if ui.link("← Back to Country").clicked() {
        action = Some(Action::Country(view.iso2.clone()));
    }
    ui.heading(format!("Explore Cities in {country_name}"));
    ui.horizontal(|ui| {
        ui.label("🔍");
        ui.text_edit_singleline(&mut view.search)
            .on_hover_text("Search cities...");
        if ui.button("Export CSV").clicked() {
            action = Some(Action::ExportTable);
        }
    });
    ui.add_space(8.0);

    let rows = view.rows();
    egui::Grid::new("cities").striped(true).num_columns(3).show(ui, |ui| {
        sort_header(ui, view, RankKey::Name, "City Name");
        sort_header(ui, view, RankKey::Population, "Population");
        ui.label(egui::RichText::new("Year").strong());
        ui.end_row();

        for city in &rows {
            ui.label(city.city_name.as_str());
            ui.label(format_population(city.latest_value(), locale));
            ui.label(
                city.latest_count()
                    .map(|c| c.year.to_string())
                    .unwrap_or_default(),
            );
            ui.end_row();
        }
    });
    action
}

fn compare_ui(ui: &mut egui::Ui, view: &mut CompareView) -> Option<Action> {
    let mut back = false;
    if let Some(load) = &view.comparison {
        match load {
            Load::Loading => {
                loading_ui(ui);
                return None;
            }
            Load::Failed(message) => return not_found_ui(ui, message),
            Load::Ready(cmp) => {
                let mut action = None;
                ui.vertical_centered(|ui| {
                    ui.heading(cmp.title());
                    if let Some((first, last)) = cmp.year_range() {
                        ui.label(format!("Population comparison from {first} to {last}"));
                    }
                });
                ui.add_space(8.0);
                let a = ChartLine {
                    label: cmp.a.country_name.clone(),
                    points: cmp.merged.iter().map(|r| (r.year, r.value_a)).collect(),
                };
                let b = ChartLine {
                    label: cmp.b.country_name.clone(),
                    points: cmp.merged.iter().map(|r| (r.year, r.value_b)).collect(),
                };
                line_chart_ui(ui, &[a, b]);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    back = ui.button("Compare Other Countries").clicked();
                    if ui.button("Export CSV").clicked() {
                        action = Some(Action::ExportTable);
                    }
                    if ui.button("Save Chart").clicked() {
                        action = Some(Action::SaveChart);
                    }
                });
                if !back {
                    return action;
                }
            }
        }
    }
    if back {
        view.reset();
        return None;
    }

    if let Some(message) = view.countries.failure() {
        return not_found_ui(ui, message);
    }
    if view.countries.is_loading() {
        loading_ui(ui);
        return None;
    }

    let mut action = None;
    ui.heading("Compare Countries");
    ui.label("Select two countries to compare their population data.");
    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label("🔍");
        ui.text_edit_singleline(&mut view.search)
            .on_hover_text("Search countries...");
    });

    ui.label(egui::RichText::new("Selected Countries:").strong());
    for name in &view.selected {
        ui.label(format!("• {name}"));
    }
    if ui
        .add_enabled(view.can_compare(), egui::Button::new("Compare Selected Countries"))
        .clicked()
    {
        action = Some(Action::RunComparison);
    }
    ui.separator();

    let names: Vec<String> = view.visible().into_iter().map(|c| c.name.clone()).collect();
    egui::ScrollArea::vertical()
        .id_salt("compare_list")
        .max_height(400.0)
        .show(ui, |ui| {
            for name in names {
                let mut checked = view.is_selected(&name);
                if ui.checkbox(&mut checked, name.as_str()).changed() {
                    view.toggle_selection(&name);
                }
            }
        });
    action
}
