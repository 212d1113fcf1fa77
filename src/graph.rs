use std::{io,fs};
use std::fs::File;
use std::io::Write;
use std::path::{Path,PathBuf};

use serde_json::{Value,json};
use tracing::{debug,info};

use super::chart::{ChartRenderer,ChartData};
use super::dataset::Measure;
use super::error::Result;
use super::format::slug;


/// Chart renderer writing one standalone Vega-Lite page per chart.
pub struct VegaRenderer {
    graph_path: PathBuf,
}

impl VegaRenderer {

    pub fn new(graph_path: &Path) -> Self {
	Self { graph_path: graph_path.to_path_buf() }
    }

    pub fn chart_path(&self, measure: Measure, chart: &ChartData) -> PathBuf {
	let region = match slug(&chart.region).as_str() {
	    "" => "region".to_string(),
	    region => region.to_string()
	};
	self.graph_path.join(format!("{}-{}.html", region, measure.name()))
    }

}

impl ChartRenderer for VegaRenderer {

    type Handle = PathBuf;

    fn draw(&mut self, measure: Measure, chart: &ChartData) -> Result<PathBuf> {
	let path = self.chart_path(measure, chart);
	page(&self.graph_path, &path, &chart.options.title, &spec(chart))?;
	info!("Wrote {}", path.display());
	Ok(path)
    }

    fn dispose(&mut self, path: PathBuf) -> Result<()> {
	debug!("Removing {}", path.display());
	match fs::remove_file(&path) {
	    Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
	    result => Ok(result?)
	}
    }

}


pub fn spec(chart: &ChartData) -> Value {

    let options = &chart.options;
    let interpolate = match options.tension > 0.0 {
	true => "monotone",
	false => "linear"
    };

    json!({
	"$schema": "https://vega.github.io/schema/vega-lite/v4.json",
	"height": "container",
	"width": "container",
	"title": options.title,
	"data": {
	    "values": chart.labels.iter().zip(chart.values.iter()).filter_map(
		|(day,val)| match val.is_finite() {
		    false => None,
		    true => Some(json!({
			"Day": day,
			"Value": val
		    }))
		}
	    ).collect::<Vec<_>>()
	},
	"encoding": {
	    "x": {
		"field": "Day",
		"type": "ordinal",
		"sort": null,
		"title": null,
		"axis": {
		    "gridColor": "rgba(200, 200, 200, 0.4)",
		    "gridWidth": 1,
		    "grid": true
		}
	    },
	    "y": {
		"field": "Value",
		"type": "quantitative",
		"title": null,
		"axis": {
		    "gridColor": "rgba(200, 200, 200, 1.0)",
		    "gridWidth": 1
		}
	    }
	},
	"layer": [
	    {
		"mark": {
		    "type": "area",
		    "interpolate": interpolate,
		    "line": {
			"color": options.line_color,
			"strokeWidth": 1
		    },
		    "color": {
			"gradient": "linear",
			"x1": 1, "y1": 0, "x2": 1, "y2": 1,
			"stops": options.fill.iter().map(
			    |(offset,color)| json!({"offset": offset, "color": color})
			).collect::<Vec<_>>()
		    }
		}
	    },
	    {
		"mark": {
		    "type": "point",
		    "filled": true,
		    "color": "white",
		    "stroke": options.line_color
		},
		"encoding": {
		    "tooltip": [
			{"field": "Day", "type": "ordinal"},
			{"field": "Value", "type": "quantitative", "format": ",.0f"}
		    ]
		}
	    }
	]
    })

}


fn page(graph_path: &Path, path: &Path, title: &str, spec: &Value) -> Result<()> {

    fs::create_dir_all(graph_path)?;
    let mut out = io::BufWriter::new(File::create(path)?);

    write!(out, "<!DOCTYPE html><html><head>")?;
    write!(out, "<meta charset=\"UTF-8\">")?;
    write!(out, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">")?;
    write!(out, "<title>{}</title>", escape_html(title))?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/vega@5\"></script>")?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/vega-lite@4\"></script>")?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/vega-embed\"></script>")?;
    write!(out, "</head>")?;
    write!(out, "<body>")?;
    write!(out, "<div id=\"vis\" style=\"overflow: hidden; position: absolute;top: 0; left: 0; right: 0; bottom: 0;\"></div>")?;
    write!(out, "<script type=\"text/javascript\">")?;
    write!(out, "var spec = ")?;

    write!(out, "{}", script_json(spec)?)?;

    write!(out, ";vegaEmbed('#vis', spec,{{\"actions\":false}}).then(function(result) {{")?;
    write!(out, "}}).catch(console.error);")?;
    write!(out, "</script>")?;
    write!(out, "</body></html>")?;
    out.flush()?;

    Ok(())

}


fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// JSON safe to embed in an inline script: markup characters can only occur
/// inside strings, where unicode escapes mean the same.
fn script_json(spec: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(spec)?
       .replace('&', "\\u0026").replace('<', "\\u003c").replace('>', "\\u003e"))
}
