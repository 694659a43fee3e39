//! Table export formats

use std::str::FromStr;

use super::Table;

/// Supported download formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("Unsupported export format: {}", other)),
        }
    }
}

impl Table {
    /// Render the table as CSV, header first, columns in display order
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer.write_record(self.columns.iter().map(|c| c.name.as_str()))?;
        for row in &self.rows {
            writer.write_record(self.columns.iter().map(|c| {
                row.get(&c.id)
                    .map(|v| v.to_display_string())
                    .unwrap_or_default()
            }))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Render the rows as a JSON array of objects
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.rows)
    }

    /// Render in the requested format
    pub fn export(&self, format: ExportFormat) -> Result<String, String> {
        match format {
            ExportFormat::Csv => self.to_csv().map_err(|e| e.to_string()),
            ExportFormat::Json => self.to_json().map_err(|e| e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Record, Value};
    use crate::table::Materializer;

    fn table() -> Table {
        let records = vec![
            Record::new()
                .field("_id", Value::Identifier("a1".into()))
                .field("Title", "Up, Up and Away")
                .field("Year", 2009),
            Record::new()
                .field("_id", Value::Identifier("a2".into()))
                .field("Title", "Coco"),
        ];
        Materializer::default()
            .materialize(&records)
            .table()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_csv_export() {
        let csv = table().to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "_id,Title,Year");
        assert_eq!(lines[1], "a1,\"Up, Up and Away\",2009");
        assert_eq!(lines[2], "a2,Coco,");
    }

    #[test]
    fn test_json_export() {
        let json: serde_json::Value = serde_json::from_str(&table().to_json().unwrap()).unwrap();
        assert_eq!(json[0]["Year"], 2009);
        assert!(json[1]["Year"].is_null());
    }

    #[test]
    fn test_json_export_keeps_column_order() {
        let json = table().to_json().unwrap();
        let first_row = &json[..json.find('}').unwrap()];

        let positions: Vec<usize> = ["\"_id\"", "\"Title\"", "\"Year\""]
            .iter()
            .map(|key| first_row.find(key).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", first_row);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
