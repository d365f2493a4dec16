//! Chart payloads as returned by the PCA service: a list of series plus a
//! free-form layout object. Fields the viewer does not interpret are kept
//! so that a payload survives a serialization round trip unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use table_io::Table;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotPayload {
    #[serde(default)]
    pub data: Vec<Series>,
    #[serde(default)]
    pub layout: Value,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default)]
    pub x: Vec<AxisValue>,
    #[serde(default)]
    pub y: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Category axes carry labels (`"PC1"`), value axes numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Number(f64),
    Label(String),
}

/// Answer of the top-contributors endpoint.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TopContributors {
    pub top_five_contributors: Table,
    #[serde(rename = "loadingsPlotCoordinates", default)]
    pub loadings_plot_coordinates: Vec<Series>,
    #[serde(default)]
    pub layout: Value,
}

impl PlotPayload {
    pub fn series(&self, name: &str) -> Option<&Series> {
        self.data
            .iter()
            .find(|series| series.name.as_deref() == Some(name))
    }

    pub fn series_mut(&mut self, name: &str) -> Option<&mut Series> {
        self.data
            .iter_mut()
            .find(|series| series.name.as_deref() == Some(name))
    }

    /// Sets the marker color of the series called `name`. Returns false if
    /// there is no such series.
    pub fn set_marker_color(&mut self, name: &str, color: &str) -> bool {
        match self.series_mut(name) {
            Some(series) => {
                series.set_marker_color(color);
                true
            }
            None => false,
        }
    }

    pub fn paint_all(&mut self, color: &str) {
        for series in self.data.iter_mut() {
            series.set_marker_color(color);
        }
    }

    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.data.iter().filter_map(|series| series.name.as_deref())
    }

    /// Title of a 2D axis (`"xaxis"`, `"yaxis"`).
    pub fn axis_title(&self, axis: &str) -> Option<String> {
        axis_title(&self.layout, axis)
    }

    /// Title of an axis of the 3D scene (`"xaxis"`, `"yaxis"`, `"zaxis"`).
    pub fn scene_axis_title(&self, axis: &str) -> Option<String> {
        axis_title(self.layout.get("scene")?, axis)
    }

    pub fn height(&self) -> Option<f32> {
        self.layout
            .get("height")
            .and_then(Value::as_f64)
            .map(|h| h as f32)
    }

    pub fn show_legend(&self) -> bool {
        self.layout
            .get("showlegend")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Positions of vertical line shapes (`x0 == x1`), e.g. the 80 %
    /// cumulative variance marker of the scree plot.
    pub fn vertical_markers(&self) -> Vec<AxisValue> {
        let Some(shapes) = self.layout.get("shapes").and_then(Value::as_array) else {
            return Vec::new();
        };
        shapes
            .iter()
            .filter(|shape| shape.get("type").and_then(Value::as_str) == Some("line"))
            .filter(|shape| shape.get("x0") == shape.get("x1"))
            .filter_map(|shape| serde_json::from_value(shape.get("x0")?.clone()).ok())
            .collect()
    }
}

impl Series {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn marker_color(&self) -> Option<&str> {
        self.marker.as_ref()?.color.as_deref()
    }

    pub fn set_marker_color(&mut self, color: &str) {
        self.marker.get_or_insert_with(Marker::default).color = Some(color.to_owned());
    }

    pub fn marker_size(&self) -> Option<f64> {
        self.marker.as_ref()?.size
    }

    pub fn is_bar(&self) -> bool {
        self.kind.as_deref() == Some("bar")
    }

    /// Points of the series; category x values are placed at the index of
    /// their label in `categories`.
    pub fn points(&self, categories: &[String]) -> Vec<[f64; 2]> {
        self.x
            .iter()
            .zip(self.y.iter())
            .enumerate()
            .filter_map(|(i, (x, y))| Some([x.position(i, categories)?, *y]))
            .collect()
    }

    pub fn points_3d(&self) -> Vec<[f64; 3]> {
        let Some(zs) = &self.z else {
            return Vec::new();
        };
        self.x
            .iter()
            .zip(self.y.iter())
            .zip(zs.iter())
            .filter_map(|((x, y), z)| match x {
                AxisValue::Number(x) => Some([*x, *y, *z]),
                AxisValue::Label(_) => None,
            })
            .collect()
    }
}

impl AxisValue {
    /// Plot coordinate: numbers as they are, labels by category index, or
    /// the point index if the label is unknown.
    pub fn position(&self, index: usize, categories: &[String]) -> Option<f64> {
        match self {
            AxisValue::Number(x) => Some(*x),
            AxisValue::Label(label) => Some(
                categories
                    .iter()
                    .position(|cat| cat == label)
                    .unwrap_or(index) as f64,
            ),
        }
    }
}

/// Collects the category labels used on the x axis, in order of first
/// appearance.
pub fn categories<'a>(series: impl IntoIterator<Item = &'a Series>) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for value in series.into_iter().flat_map(|s| s.x.iter()) {
        if let AxisValue::Label(label) = value {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
    }
    labels
}

/// Title of `axis` in a figure layout. The service sends either a plain
/// string or an object with a `text` field.
pub fn axis_title(layout: &Value, axis: &str) -> Option<String> {
    match layout.get(axis)?.get("title")? {
        Value::String(text) => Some(text.clone()),
        Value::Object(obj) => obj.get("text")?.as_str().map(str::to_owned),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn pca_payload(names: &[&str]) -> PlotPayload {
        let data: Vec<Value> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                json!({
                    "type": "scatter",
                    "mode": "markers",
                    "name": name,
                    "x": [i as f64],
                    "y": [-(i as f64)],
                    "marker": {"size": 12, "color": "#272E3F", "line": {"color": "#000000", "width": 2}}
                })
            })
            .collect();
        serde_json::from_value(json!({
            "data": data,
            "layout": {
                "xaxis": {"title": "PC1 (74.19%)"},
                "yaxis": {"title": {"text": "PC2 (25.81%)"}},
                "showlegend": true,
                "height": 400
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_pca_payload_fields() {
        let mut payload = pca_payload(&["H2O_30m_A", "H2O_30m_B"]);
        assert_eq!(payload.axis_title("xaxis").as_deref(), Some("PC1 (74.19%)"));
        assert_eq!(payload.axis_title("yaxis").as_deref(), Some("PC2 (25.81%)"));
        assert_eq!(payload.height(), Some(400.0));
        assert_eq!(
            payload.series("H2O_30m_B").unwrap().points(&[]),
            vec![[1.0, -1.0]]
        );

        assert!(payload.set_marker_color("H2O_30m_A", "#FF0000"));
        assert!(!payload.set_marker_color("missing", "#FF0000"));
        let series = payload.series("H2O_30m_A").unwrap();
        assert_eq!(series.marker_color(), Some("#FF0000"));
        // Unknown marker fields stay in place.
        assert_eq!(
            serde_json::to_value(series).unwrap()["marker"]["line"]["width"],
            2
        );
    }

    #[test]
    fn test_scree_payload() {
        let payload: PlotPayload = serde_json::from_value(json!({
            "data": [
                {"type": "bar", "x": ["PC1", "PC2", "PC3"], "y": [61.2, 22.5, 9.1], "name": "Individual"},
                {"type": "scatter", "x": ["PC1", "PC2", "PC3"], "y": [61.2, 83.7, 92.8],
                 "mode": "lines+markers", "name": "Cumulative"}
            ],
            "layout": {
                "xaxis": {"title": "Principal component"},
                "showlegend": false,
                "shapes": [{"type": "line", "xref": "x", "yref": "paper",
                            "x0": "PC2", "y0": 0, "x1": "PC2", "y1": 1}]
            }
        }))
        .unwrap();
        let cats = categories(payload.data.iter());
        assert_eq!(cats, vec!["PC1", "PC2", "PC3"]);
        assert!(payload.data[0].is_bar());
        assert_eq!(payload.data[1].points(&cats)[2], [2.0, 92.8]);
        assert_eq!(
            payload.vertical_markers(),
            vec![AxisValue::Label("PC2".into())]
        );
        assert!(!payload.show_legend());
    }

    #[test]
    fn test_pca_3d_payload() {
        let payload: PlotPayload = serde_json::from_value(json!({
            "data": [{"type": "scatter3d", "name": "S1", "x": [1.0], "y": [2.0], "z": [3.0]}],
            "layout": {"scene": {"zaxis": {"title": "PC3 (5.00%)"}}}
        }))
        .unwrap();
        assert_eq!(payload.data[0].points_3d(), vec![[1.0, 2.0, 3.0]]);
        assert_eq!(
            payload.scene_axis_title("zaxis").as_deref(),
            Some("PC3 (5.00%)")
        );
        assert_eq!(payload.axis_title("xaxis"), None);
    }

    #[test]
    fn test_top_contributors() {
        let answer: TopContributors = serde_json::from_value(json!({
            "top_five_contributors": [
                {"Principal component": "PC1", "locus_tag": "gene_7", "Loadings": 0.41},
                {"Principal component": "PC1", "locus_tag": "gene_2", "Loadings": -0.38}
            ],
            "loadingsPlotCoordinates": [
                {"type": "scatter", "mode": "markers+text", "name": "gene_7",
                 "x": ["PC1"], "y": [0.41], "text": ["gene_7"], "textposition": "right"}
            ],
            "layout": {
                "xaxis": {"title": {"text": "Principal Component"}},
                "yaxis": {"title": "Loadings"}
            }
        }))
        .unwrap();
        assert_eq!(
            axis_title(&answer.layout, "xaxis").as_deref(),
            Some("Principal Component")
        );
        assert_eq!(axis_title(&answer.layout, "yaxis").as_deref(), Some("Loadings"));
        assert_eq!(answer.top_five_contributors.len(), 2);
        assert_eq!(
            answer.top_five_contributors.columns(),
            ["Principal component", "locus_tag", "Loadings"]
        );
        let series = &answer.loadings_plot_coordinates[0];
        assert_eq!(series.text.as_deref(), Some(&["gene_7".to_string()][..]));
        assert_eq!(series.extra["textposition"], "right");
    }
}
