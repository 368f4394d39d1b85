//! The dashboard page: tab strip, per-tab content and the client script.

use crate::config::HeaderInfo;
use crate::error::{Error, Result};
use crate::interaction::{range_message, NONE_CLICKED, NONE_SELECTED};
use crate::plot::{ChartSpec, SliderSpec, XRange};
use crate::settings::PLOTLY_CDN;
use crate::state::{AppState, TabState};
use crate::ui::html::{multiline, script_json, Node};

const SLIDER_INSTRUCTION: &str = "Click on current tab to refresh the x-axis slider and the graphs";

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 20px; }
.tabs { display: flex; border-bottom: 1px solid #d6d6d6; }
.tab { padding: 8px 20px; cursor: pointer; border: 1px solid #d6d6d6; border-bottom: none; background: #f9f9f9; }
.tab.selected { background: white; border-top: 2px solid #1975FA; }
.slider { margin: 10px 150px; font-size: 12px; }
.slider input[type=range] { width: 100%; }
.marks { display: flex; justify-content: space-between; }
.range-output { margin-top: 10px; }
.slider input[type=number], .slider button { margin: 8px 4px 0 0; }
.chart { padding: 20px; }
.readouts { display: flex; gap: 20px; }
.readout { border: thin lightgrey solid; overflow-x: scroll; min-width: 30%; padding: 4px; }
.error { color: darkred; }
.footer { margin-top: 20px; font-size: 12px; }
body.dark { background: #14141c; color: #dcdcdc; }
body.dark .tab { background: #22222c; border-color: #3a3a46; }
body.dark .tab.selected { background: #14141c; }
body.dark .readout { border-color: #3a3a46; }
"#;

const SCRIPT: &str = r#"
function post(url, body) {
  return fetch(url, {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify(body),
  }).then(r => r.json());
}

function setText(id, text) {
  const el = document.getElementById(id);
  if (el) el.textContent = text;
}

function initChart(el) {
  const id = el.dataset.chart;
  const figure = JSON.parse(el.textContent);
  const div = document.getElementById(id);
  const url = "/charts/" + encodeURIComponent(id);
  Plotly.newPlot(div, figure.data, figure.layout, { responsive: true }).then(() => {
    div.on("plotly_click", ev => {
      const p = ev.points[0];
      post(url + "/click", { x: p.x, y: p.y }).then(r => setText("click-" + id, r.message || r.error));
    });
    div.on("plotly_selected", ev => {
      const range = ev && ev.range ? ev.range : null;
      post(url + "/select", { range: range }).then(r => setText("select-" + id, r.message || r.error));
    });
    div.on("plotly_hover", ev => {
      if (div._syncing) return;
      const plots = Object.keys(div._fullLayout._plots);
      if (plots.length < 2) return;
      div._syncing = true;
      try {
        Plotly.Fx.hover(div, { xval: ev.xvals[0] }, plots);
      } finally {
        div._syncing = false;
      }
    });
  });
}

function numberOrNull(input) {
  return input.value === "" ? null : parseFloat(input.value);
}

function initSlider(block) {
  const base = "/tabs/" + block.dataset.tab;
  const lo = block.querySelector(".range-lo");
  const hi = block.querySelector(".range-hi");
  const start = block.querySelector(".start");
  const end = block.querySelector(".end");
  const out = block.querySelector(".range-output");

  const value = () => {
    const a = parseFloat(lo.value);
    const b = parseFloat(hi.value);
    return a <= b ? [a, b] : [b, a];
  };
  const update = r => {
    if (r.error) {
      out.textContent = r.error;
      return;
    }
    out.textContent = r.message;
    lo.value = r.value[0];
    hi.value = r.value[1];
    if (r.clear_inputs) {
      start.value = "";
      end.value = "";
    }
    r.charts.forEach(c => Plotly.react(c.id, c.figure.data, c.figure.layout));
  };

  lo.addEventListener("change", () => post(base + "/range", { value: value() }).then(update));
  hi.addEventListener("change", () => post(base + "/range", { value: value() }).then(update));
  block.querySelector(".submit").addEventListener("click", () =>
    post(base + "/range", {
      value: value(),
      start: numberOrNull(start),
      end: numberOrNull(end),
      submit: true,
    }).then(update));
  block.querySelector(".reset").addEventListener("click", () => post(base + "/reset", {}).then(update));
}

function initTab(root) {
  root.querySelectorAll("script.figure").forEach(initChart);
  root.querySelectorAll(".slider").forEach(initSlider);
}

function showTab(index) {
  fetch("/tabs/" + index).then(r => r.text()).then(html => {
    const content = document.getElementById("tabs-content");
    content.innerHTML = html;
    document.querySelectorAll(".tab").forEach(t =>
      t.classList.toggle("selected", t.dataset.tab === String(index)));
    initTab(content);
  });
}

document.addEventListener("DOMContentLoaded", () => {
  document.querySelectorAll(".tab").forEach(t =>
    t.addEventListener("click", () => showTab(t.dataset.tab)));
  initTab(document.getElementById("tabs-content"));
});
"#;

/// The whole page, with the first tab's content already in place.
pub fn render_page(state: &AppState) -> String {
    let tabs = Node::el("div").class("tabs").children(state.tabs.iter().map(|tab| {
        let class = if tab.index == 0 { "tab selected" } else { "tab" };
        Node::el("div")
            .class(class)
            .attr("data-tab", tab.index)
            .attr("title", format!("Tab {}", tab.index))
            .child(Node::text(&tab.label))
    }));

    let mut content = Node::el("div").id("tabs-content");
    if let Some(first) = state.tabs.first() {
        content = content.child(tab_content(state, first));
    }

    let head = Node::el("head")
        .child(Node::el("meta").attr("charset", "utf-8"))
        .child(Node::el("title").child(Node::text(&state.header.page_title)))
        .child(Node::el("script").attr("src", PLOTLY_CDN))
        .child(Node::el("style").child(Node::Raw(STYLE.to_string())));
    let body = Node::el("body")
        .class(state.theme.label().to_lowercase())
        .child(tabs)
        .child(content)
        .child(Node::el("script").child(Node::Raw(SCRIPT.to_string())));

    let html = Node::el("html").child(head).child(body);
    format!("<!DOCTYPE html>\n{}", html.render())
}

/// Content fragment of one tab, as served when the tab is selected.
pub fn render_tab(state: &AppState, index: usize) -> Result<String> {
    let tab = state.tabs.get(index).ok_or(Error::UnknownTab(index))?;
    Ok(tab_content(state, tab).render())
}

pub fn tab_content(state: &AppState, tab: &TabState) -> Node {
    let header = &state.header;
    let mut nodes = vec![text_block(header.page_top.as_deref(), "page-top")];
    if let Some(top) = &tab.spec.graph_top {
        nodes.push(text_block(Some(top), "graph-top"));
    }

    match &tab.model {
        Some(model) => {
            nodes.push(slider_block(tab.index, &model.slider, tab.range));
            for chart in &model.charts {
                nodes.push(chart_block(chart));
            }
        }
        None => {
            let message = tab.error.as_deref().unwrap_or("No charts built");
            nodes.push(
                Node::el("pre")
                    .class("error")
                    .child(Node::text(format!("Failed to build '{}': {}", tab.label, message))),
            );
        }
    }

    if let Some(bottom) = &tab.spec.graph_bottom {
        nodes.push(text_block(Some(bottom), "graph-bottom"));
    }
    nodes.push(
        Node::el("div")
            .class("footer")
            .children(multiline(&footer_text(header, &state.store.date_created))),
    );

    Node::el("div").class("tab-content").children(nodes)
}

/// `"{date} {PageBottom}"`, or nothing without a page-bottom text.
pub fn footer_text(header: &HeaderInfo, date_created: &str) -> String {
    match &header.page_bottom {
        Some(bottom) => format!("{date_created} {bottom}"),
        None => String::new(),
    }
}

fn text_block(text: Option<&str>, class: &str) -> Node {
    Node::el("div")
        .class(class)
        .children(text.map(multiline).unwrap_or_default())
}

fn slider_block(index: usize, slider: &SliderSpec, range: Option<XRange>) -> Node {
    let marks_id = format!("marks-{index}");
    let range_input = |class: &str, value: f64| {
        Node::el("input")
            .class(class)
            .attr("type", "range")
            .attr("min", slider.min)
            .attr("max", slider.max)
            .attr("step", slider.step)
            .attr("value", value)
            .attr("list", &marks_id)
    };
    let number_input = |class: &str, placeholder: &str| {
        Node::el("input")
            .class(class)
            .attr("type", "number")
            .attr("step", slider.step)
            .attr("placeholder", placeholder)
    };
    let shown = range.unwrap_or(XRange::new(slider.min, slider.max));

    Node::el("div")
        .class("slider")
        .attr("data-tab", index)
        .child(Node::el("p").child(Node::el("strong").child(Node::text(SLIDER_INSTRUCTION))))
        .child(range_input("range-lo", slider.min))
        .child(range_input("range-hi", slider.max))
        .child(
            Node::el("datalist").id(&marks_id).children(
                slider
                    .marks
                    .iter()
                    .map(|m| Node::el("option").attr("value", m.value).attr("label", &m.label)),
            ),
        )
        .child(
            Node::el("div").class("marks").children(
                slider
                    .marks
                    .iter()
                    .map(|m| Node::el("span").child(Node::text(&m.label))),
            ),
        )
        .child(
            Node::el("div")
                .class("range-output")
                .child(Node::text(range_message(shown))),
        )
        .child(number_input("start", "type start value"))
        .child(number_input("end", "type end value"))
        .child(Node::el("button").class("submit").attr("type", "submit").child(Node::text("Submit")))
        .child(Node::el("button").class("reset").child(Node::text("Reset slider")))
}

fn chart_block(chart: &ChartSpec) -> Node {
    // Serializing plain figure data cannot fail; an empty object keeps the page usable.
    let figure = serde_json::to_string(&chart.figure).unwrap_or_else(|_| "{}".to_string());

    let readout = |title: &str, prefix: &str, initial: &str| {
        Node::el("div")
            .child(Node::el("strong").child(Node::text(title)))
            .child(
                Node::el("pre")
                    .class("readout")
                    .id(format!("{prefix}-{}", chart.id))
                    .child(Node::text(initial)),
            )
    };
    let mut readouts = Node::el("div")
        .class("readouts")
        .child(readout("Click Data", "click", NONE_CLICKED));
    if chart.has_markers {
        readouts = readouts.child(readout(
            "Rectangle Tool Selection Data",
            "select",
            NONE_SELECTED,
        ));
    }

    Node::el("div")
        .child(
            Node::el("div")
                .class("chart")
                .id(&chart.id)
                .attr("style", format!("height:{}px;", chart.height)),
        )
        .child(
            Node::el("script")
                .class("figure")
                .attr("type", "application/json")
                .attr("data-chart", &chart.id)
                .child(Node::Raw(script_json(&figure))),
        )
        .child(readouts)
}
