//! Visualization Updater
//!
//! Recomputes the two derived chart specifications whenever the table
//! changes. Charts project fixed, configured fields; nothing is inferred from
//! the table schema. Each chart fails independently: a chart that cannot be
//! built becomes a placeholder and the other one is unaffected.
//!
//! Specs are declarative. Binning, scaling and drawing belong to whatever
//! renders them.

use serde::Serialize;
use thiserror::Error;

use crate::config::{ChartFieldsConfig, ChartsConfig};
use crate::source::Value;
use crate::table::{Materialized, Table};

/// Kind of chart a spec describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Scatter,
    Histogram,
}

impl ChartKind {
    /// Noun used in placeholder messages
    fn label(&self) -> &'static str {
        match self {
            ChartKind::Scatter => "scatter plot",
            ChartKind::Histogram => "histogram",
        }
    }
}

/// How the renderer should combine `y` values that share a bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Sum,
}

/// One projected `(x, y)` pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: Value,
    pub y: Value,
}

/// Declarative chart description consumed by a rendering layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x_field: String,
    pub y_field: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
    pub points: Vec<ChartPoint>,
}

/// Either a chart or a message to show in its place
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartOutput {
    Chart { spec: ChartSpec },
    Placeholder { message: String },
}

impl ChartOutput {
    pub fn spec(&self) -> Option<&ChartSpec> {
        match self {
            ChartOutput::Chart { spec } => Some(spec),
            ChartOutput::Placeholder { .. } => None,
        }
    }

    pub fn placeholder_message(&self) -> Option<&str> {
        match self {
            ChartOutput::Placeholder { message } => Some(message),
            ChartOutput::Chart { .. } => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ChartOutput::Placeholder { .. })
    }
}

/// The scatter and histogram outputs, always produced together
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPair {
    pub scatter: ChartOutput,
    pub histogram: ChartOutput,
}

/// A chart that could not be constructed from the current table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("{chart}: field '{field}' is not a column of the table")]
    MissingField { chart: String, field: String },
}

/// Fixed projection for one chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartDefinition {
    pub kind: ChartKind,
    pub x_field: String,
    pub y_field: String,
    pub title: String,
}

impl ChartDefinition {
    pub fn new(kind: ChartKind, fields: &ChartFieldsConfig) -> Self {
        Self {
            kind,
            x_field: fields.x.clone(),
            y_field: fields.y.clone(),
            title: fields.title.clone(),
        }
    }

    pub fn no_data_message(&self) -> String {
        format!("No data available for {}", self.kind.label())
    }

    pub fn error_message(&self) -> String {
        format!("Error creating {}", self.kind.label())
    }

    /// Project the table onto this chart's fields
    pub fn build(&self, table: &Table) -> Result<ChartSpec, RenderError> {
        for field in [&self.x_field, &self.y_field] {
            if !table.has_column(field) {
                return Err(RenderError::MissingField {
                    chart: self.title.clone(),
                    field: field.clone(),
                });
            }
        }

        let points = table
            .rows()
            .iter()
            .map(|row| ChartPoint {
                x: row.get(&self.x_field).cloned().unwrap_or(Value::Null),
                y: row.get(&self.y_field).cloned().unwrap_or(Value::Null),
            })
            .collect();

        Ok(ChartSpec {
            kind: self.kind,
            x_field: self.x_field.clone(),
            y_field: self.y_field.clone(),
            title: self.title.clone(),
            aggregation: match self.kind {
                ChartKind::Histogram => Some(Aggregation::Sum),
                ChartKind::Scatter => None,
            },
            points,
        })
    }

    /// Build, turning absence of data or a render failure into a placeholder
    fn output(&self, table: Option<&Table>) -> ChartOutput {
        let Some(table) = table else {
            return ChartOutput::Placeholder {
                message: self.no_data_message(),
            };
        };

        match self.build(table) {
            Ok(spec) => ChartOutput::Chart { spec },
            Err(e) => {
                tracing::error!(chart = %self.title, error = %e, "Failed to build chart");
                ChartOutput::Placeholder {
                    message: self.error_message(),
                }
            }
        }
    }
}

/// Recomputes both charts from a table
#[derive(Debug, Clone)]
pub struct VisualizationUpdater {
    scatter: ChartDefinition,
    histogram: ChartDefinition,
}

impl Default for VisualizationUpdater {
    fn default() -> Self {
        Self::new(&ChartsConfig::default())
    }
}

impl VisualizationUpdater {
    pub fn new(config: &ChartsConfig) -> Self {
        Self {
            scatter: ChartDefinition::new(ChartKind::Scatter, &config.scatter),
            histogram: ChartDefinition::new(ChartKind::Histogram, &config.histogram),
        }
    }

    pub fn scatter(&self) -> &ChartDefinition {
        &self.scatter
    }

    pub fn histogram(&self) -> &ChartDefinition {
        &self.histogram
    }

    /// Recompute both charts for a materialized table
    pub fn update(&self, materialized: &Materialized) -> ChartPair {
        self.update_table(materialized.table())
    }

    /// Recompute both charts; `None` means there is no table to plot
    pub fn update_table(&self, table: Option<&Table>) -> ChartPair {
        ChartPair {
            scatter: self.scatter.output(table),
            histogram: self.histogram.output(table),
        }
    }

    /// Placeholders for when no table is available
    pub fn no_data(&self) -> ChartPair {
        self.update_table(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Record;
    use crate::table::Materializer;

    fn two_films() -> Materialized {
        let records = vec![
            Record::new()
                .field("Title", "A")
                .field("Year", 2001)
                .field("Worldwide gross", 100),
            Record::new()
                .field("Title", "B")
                .field("Year", 2002)
                .field("Worldwide gross", 200),
        ];
        Materializer::default().materialize(&records)
    }

    #[test]
    fn test_fixed_projections() {
        let charts = VisualizationUpdater::default().update(&two_films());

        let scatter = charts.scatter.spec().unwrap();
        assert_eq!(scatter.kind, ChartKind::Scatter);
        assert_eq!(scatter.x_field, "Title");
        assert_eq!(scatter.y_field, "Worldwide gross");
        assert_eq!(scatter.title, "Title vs Worldwide Gross");
        assert_eq!(
            scatter.points,
            vec![
                ChartPoint {
                    x: Value::from("A"),
                    y: Value::Integer(100)
                },
                ChartPoint {
                    x: Value::from("B"),
                    y: Value::Integer(200)
                },
            ]
        );
        assert_eq!(scatter.aggregation, None);

        let histogram = charts.histogram.spec().unwrap();
        assert_eq!(histogram.kind, ChartKind::Histogram);
        assert_eq!(histogram.x_field, "Year");
        assert_eq!(histogram.y_field, "Worldwide gross");
        assert_eq!(histogram.title, "Year vs Worldwide Gross");
        assert_eq!(histogram.aggregation, Some(Aggregation::Sum));
        assert_eq!(histogram.points[1].x, Value::Integer(2002));
    }

    #[test]
    fn test_no_data_yields_placeholders() {
        let charts = VisualizationUpdater::default().update(&Materialized::NoData);

        assert_eq!(
            charts.scatter.placeholder_message(),
            Some("No data available for scatter plot")
        );
        assert_eq!(
            charts.histogram.placeholder_message(),
            Some("No data available for histogram")
        );
    }

    #[test]
    fn test_charts_fail_independently() {
        // No "Year" column: the histogram cannot be built, the scatter can.
        let records = vec![Record::new()
            .field("Title", "A")
            .field("Worldwide gross", 100)];
        let materialized = Materializer::default().materialize(&records);

        let charts = VisualizationUpdater::default().update(&materialized);

        assert!(charts.scatter.spec().is_some());
        assert_eq!(
            charts.histogram.placeholder_message(),
            Some("Error creating histogram")
        );
    }

    #[test]
    fn test_build_reports_missing_field() {
        let updater = VisualizationUpdater::default();
        let table = Materializer::default()
            .materialize(&[Record::new().field("Title", "A")])
            .table()
            .cloned()
            .unwrap();

        assert_eq!(
            updater.scatter().build(&table),
            Err(RenderError::MissingField {
                chart: "Title vs Worldwide Gross".to_string(),
                field: "Worldwide gross".to_string(),
            })
        );
    }

    #[test]
    fn test_configured_fields() {
        let config = ChartsConfig {
            scatter: ChartFieldsConfig {
                x: "Year".into(),
                y: "Budget".into(),
                title: "Budget by year".into(),
            },
            ..ChartsConfig::default()
        };
        let records = vec![Record::new().field("Year", 2001).field("Budget", 5)];
        let materialized = Materializer::default().materialize(&records);

        let charts = VisualizationUpdater::new(&config).update(&materialized);
        let scatter = charts.scatter.spec().unwrap();
        assert_eq!(scatter.y_field, "Budget");
        assert_eq!(scatter.title, "Budget by year");
    }

    #[test]
    fn test_serialized_shape() {
        let charts = VisualizationUpdater::default().update(&two_films());
        let json = serde_json::to_value(&charts).unwrap();

        assert_eq!(json["scatter"]["type"], "chart");
        assert_eq!(json["scatter"]["spec"]["kind"], "scatter");
        assert_eq!(json["histogram"]["spec"]["aggregation"], "sum");

        let empty = serde_json::to_value(VisualizationUpdater::default().no_data()).unwrap();
        assert_eq!(empty["scatter"]["type"], "placeholder");
    }
}
