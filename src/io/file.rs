use std::path::Path;

use crate::error::Result;
use crate::model::ChartData;

/// Load a chart data set from a JSON file.
pub fn load_chart(path: &Path) -> Result<ChartData> {
    let json = std::fs::read_to_string(path)?;
    parse_chart(&json)
}

/// Parse a chart data set from JSON text.
pub fn parse_chart(json: &str) -> Result<ChartData> {
    let data: ChartData = serde_json::from_str(json)?;
    log::debug!(
        "loaded chart '{}': {} rows, {} tasks",
        data.name,
        data.rows.len(),
        data.tasks.len()
    );
    Ok(data)
}
