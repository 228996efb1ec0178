use eframe::egui::{self, Color32, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};
use serde_json::Value as JsonValue;

use super::{ChartError, ChartOptions, Visual};
use crate::color::{ColorMap, generate_palette};
use crate::data::model::{CellValue, Row};

// ---------------------------------------------------------------------------
// What to draw, resolved from the options bag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Table,
}

impl ChartKind {
    /// Guess the chart kind from an upstream template name such as
    /// `@flourish/scatter`.
    pub fn from_template(template: &str) -> Self {
        let t = template.to_ascii_lowercase();
        if t.contains("scatter") {
            ChartKind::Scatter
        } else if t.contains("table") {
            ChartKind::Table
        } else if t.contains("line") && !t.contains("bar") {
            ChartKind::Line
        } else {
            ChartKind::Bar
        }
    }
}

/// Column bindings of one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x: Option<String>,
    pub y: Vec<String>,
    pub series_by: Option<String>,
}

impl PlotSpec {
    /// Read `template`, a title and `bindings.data` from the settings.
    ///
    /// Bindings may name columns or give positional indices into
    /// `data.columns`. Without bindings the first non-numeric column is the
    /// x axis and every numeric column is plotted.
    pub fn resolve(options: &ChartOptions) -> Result<Self, ChartError> {
        let settings = &options.settings;
        let columns = &options.data.columns;

        let kind = settings
            .get("template")
            .and_then(JsonValue::as_str)
            .map(ChartKind::from_template)
            .unwrap_or(ChartKind::Bar);

        let title = settings
            .get("title")
            .or_else(|| settings.get("state").and_then(|s| s.pointer("/layout/title")))
            .and_then(JsonValue::as_str)
            .unwrap_or(options.container.as_str())
            .to_string();

        let bindings = settings.get("bindings").and_then(|b| b.get("data"));
        let binding = |keys: &[&str]| -> Result<Vec<String>, ChartError> {
            let Some(bindings) = bindings else {
                return Ok(Vec::new());
            };
            let mut resolved = Vec::new();
            for key in keys {
                match bindings.get(*key) {
                    Some(JsonValue::Array(items)) => {
                        for item in items {
                            resolved.push(resolve_column(item, columns, &options.container)?);
                        }
                    }
                    Some(JsonValue::Null) | None => {}
                    Some(item) => resolved.push(resolve_column(item, columns, &options.container)?),
                }
            }
            Ok(resolved)
        };

        let mut x = binding(&["x", "label"])?.into_iter().next();
        let mut y = binding(&["y", "value"])?;
        let series_by = binding(&["color", "series"])?.into_iter().next();

        if x.is_none() && y.is_empty() {
            let numeric: Vec<&String> = columns
                .iter()
                .filter(|c| is_numeric_column(&options.data.data, c))
                .collect();
            x = columns.iter().find(|c| !numeric.contains(c)).cloned();
            y = numeric
                .into_iter()
                .filter(|c| Some(*c) != x.as_ref())
                .cloned()
                .collect();
        }

        Ok(Self {
            kind,
            title,
            x,
            y,
            series_by,
        })
    }
}

fn resolve_column(item: &JsonValue, columns: &[String], id: &str) -> Result<String, ChartError> {
    let unknown = |what: String| ChartError::Render {
        id: id.to_string(),
        reason: format!("binding refers to unknown column {what}"),
    };
    match item {
        JsonValue::String(name) if columns.is_empty() || columns.contains(name) => Ok(name.clone()),
        JsonValue::String(name) => Err(unknown(format!("{name:?}"))),
        JsonValue::Number(n) => n
            .as_u64()
            .and_then(|i| columns.get(i as usize))
            .cloned()
            .ok_or_else(|| unknown(format!("#{n}"))),
        other => Err(unknown(other.to_string())),
    }
}

fn is_numeric_column(rows: &[Row], column: &str) -> bool {
    let mut any = false;
    for row in rows {
        match row.value(column) {
            CellValue::Number(_) => any = true,
            CellValue::Null => {}
            CellValue::Text(_) => return false,
        }
    }
    any
}

// ---------------------------------------------------------------------------
// Prepared series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: Color32,
    pub points: Vec<[f64; 2]>,
    /// Per-point hover labels (bars only).
    pub labels: Vec<String>,
}

fn build_series(spec: &PlotSpec, rows: &[Row]) -> Vec<Series> {
    let x_of = |i: usize, row: &Row| -> f64 {
        spec.x
            .as_deref()
            .and_then(|x| row.value(x).as_f64())
            .filter(|_| spec.kind != ChartKind::Bar)
            .unwrap_or(i as f64)
    };
    let label_of = |i: usize, row: &Row| -> String {
        spec.x
            .as_deref()
            .map(|x| row.value(x).to_string())
            .unwrap_or_else(|| format!("row {i}"))
    };

    if let (Some(group_col), Some(y)) = (&spec.series_by, spec.y.first()) {
        let mut groups: Vec<CellValue> = Vec::new();
        for row in rows {
            let g = row.value(group_col);
            if !groups.contains(g) {
                groups.push(g.clone());
            }
        }
        let colors = ColorMap::new(&groups);
        return groups
            .iter()
            .map(|group| {
                let (points, labels): (Vec<_>, Vec<_>) = rows
                    .iter()
                    .enumerate()
                    .filter(|(_, row)| row.value(group_col) == group)
                    .filter_map(|(i, row)| {
                        let v = row.value(y).as_f64()?;
                        Some(([x_of(i, row), v], label_of(i, row)))
                    })
                    .unzip();
                Series {
                    name: group.to_string(),
                    color: colors.color_for(group),
                    points,
                    labels,
                }
            })
            .collect();
    }

    let palette = generate_palette(spec.y.len());
    spec.y
        .iter()
        .zip(palette)
        .map(|(y, color)| {
            let (points, labels): (Vec<_>, Vec<_>) = rows
                .iter()
                .enumerate()
                .filter_map(|(i, row)| {
                    let v = row.value(y).as_f64()?;
                    Some(([x_of(i, row), v], label_of(i, row)))
                })
                .unzip();
            Series {
                name: y.clone(),
                color,
                points,
                labels,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// PlotVisual – the bundled Visual implementation
// ---------------------------------------------------------------------------

/// Draws a chart with `egui_plot` (bar, line, scatter) or `egui_extras`
/// (table).
#[derive(Debug, Clone)]
pub struct PlotVisual {
    container: String,
    spec: PlotSpec,
    columns: Vec<String>,
    rows: Vec<Row>,
    series: Vec<Series>,
}

impl Visual for PlotVisual {
    fn construct(options: &ChartOptions) -> Result<Self, ChartError> {
        let mut visual = PlotVisual {
            container: options.container.clone(),
            spec: PlotSpec::resolve(options)?,
            columns: Vec::new(),
            rows: Vec::new(),
            series: Vec::new(),
        };
        visual.update(options)?;
        Ok(visual)
    }

    fn update(&mut self, options: &ChartOptions) -> Result<(), ChartError> {
        self.container = options.container.clone();
        self.spec = PlotSpec::resolve(options)?;
        self.columns = options.data.columns.clone();
        self.rows = options.data.data.clone();
        self.series = build_series(&self.spec, &self.rows);
        log::debug!(
            "Chart {} redrawn with {} rows in {} series",
            self.container,
            self.rows.len(),
            self.series.len()
        );
        Ok(())
    }
}

impl PlotVisual {
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Render into the given ui.
    pub fn show(&self, ui: &mut Ui, height: f32) {
        ui.strong(&self.spec.title);
        match self.spec.kind {
            ChartKind::Table => self.show_table(ui, height),
            kind => self.show_plot(ui, kind, height),
        }
    }

    fn show_plot(&self, ui: &mut Ui, kind: ChartKind, height: f32) {
        let n_series = self.series.len().max(1) as f64;
        let bar_width = 0.8 / n_series;

        let mut plot = Plot::new(&self.container)
            .legend(Legend::default())
            .height(height)
            .allow_boxed_zoom(true)
            .allow_drag(true)
            .allow_scroll(false)
            .allow_zoom(true);
        if let Some(x) = &self.spec.x {
            plot = plot.x_axis_label(x.as_str());
        }
        if let [y] = self.spec.y.as_slice() {
            plot = plot.y_axis_label(y.as_str());
        }

        plot.show(ui, |plot_ui| {
            for (j, series) in self.series.iter().enumerate() {
                match kind {
                    ChartKind::Line => {
                        let points: PlotPoints = series.points.iter().copied().collect();
                        plot_ui.line(
                            Line::new(points)
                                .name(&series.name)
                                .color(series.color)
                                .width(1.5),
                        );
                    }
                    ChartKind::Scatter => {
                        let points: PlotPoints = series.points.iter().copied().collect();
                        plot_ui.points(
                            Points::new(points)
                                .name(&series.name)
                                .color(series.color)
                                .radius(3.0),
                        );
                    }
                    _ => {
                        let offset = (j as f64 - (n_series - 1.0) / 2.0) * bar_width;
                        let bars = series
                            .points
                            .iter()
                            .zip(&series.labels)
                            .map(|([x, y], label)| {
                                Bar::new(x + offset, *y).width(bar_width).name(label)
                            })
                            .collect();
                        plot_ui.bar_chart(BarChart::new(bars).name(&series.name).color(series.color));
                    }
                }
            }
        });
    }

    fn show_table(&self, ui: &mut Ui, height: f32) {
        ui.push_id(&self.container, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(height)
                .columns(Column::auto().resizable(true), self.columns.len())
                .header(20.0, |mut header| {
                    for col in &self.columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(col);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, self.rows.len(), |mut row| {
                        let record = &self.rows[row.index()];
                        for col in &self.columns {
                            row.col(|ui: &mut Ui| {
                                ui.label(record.value(col).to_string());
                            });
                        }
                    });
                });
        });
    }
}

/// Placeholder frame for a chart that is not built yet.
pub fn empty_chart(ui: &mut Ui, container: &str) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_height(120.0);
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(egui::RichText::new(container).weak());
        });
    });
}
