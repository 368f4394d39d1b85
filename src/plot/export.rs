use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::plot::builder::{ChartSpec, GraphSetModel};
use crate::settings::PLOTLY_CDN;
use crate::ui::html::{escape, script_json};

/// Standalone page showing one figure.
pub fn standalone_html(chart: &ChartSpec) -> Result<String, ExportError> {
    let data = script_json(&serde_json::to_string(&chart.figure.data)?);
    let layout = script_json(&serde_json::to_string(&chart.figure.layout)?);
    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{cdn}"></script>
</head>
<body>
<div id="chart" style="height:{height}px;"></div>
<script>
Plotly.newPlot("chart", {data}, {layout}, {{"responsive": true}});
</script>
</body>
</html>
"#,
        title = escape(&chart.export_name),
        cdn = PLOTLY_CDN,
        height = chart.height,
    ))
}

/// Write one chart to `{dir}/{export_name}.html`, creating `dir` if needed.
pub fn export_chart(chart: &ChartSpec, dir: &Path) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(format!("{}.html", chart.export_name));
    let html = standalone_html(chart)?;
    std::fs::write(&path, html).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::debug!("Exported chart '{}' to {:?}", chart.id, path);
    Ok(path)
}

/// Export every chart of a tab.
pub fn export_graph_set(model: &GraphSetModel, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    model
        .charts
        .iter()
        .map(|chart| export_chart(chart, dir))
        .collect()
}
