//! Render a simulation as an HTML page with an SVG timing diagram.
//! One lane per button, one coloured bar per stretch of time in a state.

use bsp_buttons::{Millis, State, NUM_BUTTONS};

use crate::sim::{Outcome, Snapshot};

/// Height of one button lane.
const LANE: f64 = 36.0;
/// Gap between lanes.
const GAP: f64 = 8.0;
/// Space on the left for lane labels.
const LABEL_W: f64 = 90.0;
/// Horizontal pixels per millisecond.
const PX_PER_MS: f64 = 0.25;
/// Margin around the SVG content.
const MARGIN: f64 = 20.0;
/// Height of the time axis below the lanes.
const AXIS_H: f64 = 30.0;
/// Distance between axis labels.
const AXIS_STEP: Millis = 500;

/// A run of consecutive snapshots in which a button stayed in one state.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    from: Millis,
    to: Millis,
    state: Option<State>,
}

/// Collapse one button's column of the timeline into spans.
fn spans(timeline: &[Snapshot], button: usize) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    for snap in timeline {
        let state = snap.states[button];
        match spans.last_mut() {
            Some(last) if last.state == state => last.to = snap.at,
            _ => spans.push(Span {
                from: snap.at,
                to: snap.at,
                state,
            }),
        }
    }
    // Each span runs until the next one starts.
    for i in 1..spans.len() {
        spans[i - 1].to = spans[i].from;
    }
    spans
}

fn state_class(state: Option<State>) -> &'static str {
    match state {
        Some(State::Start) => "start",
        Some(State::Released) => "released",
        Some(State::ConfirmPress) | Some(State::ConfirmRelease) => "confirm",
        Some(State::Pressed) => "pressed",
        Some(State::Stuck) => "stuck",
        None => "halted",
    }
}

fn x_of(at: Millis) -> f64 {
    LABEL_W + at as f64 * PX_PER_MS
}

fn render_lane(outcome: &Outcome, button: usize) -> String {
    let y = button as f64 * (LANE + GAP);
    let mut svg = format!(
        r#"<g transform="translate(0, {y})"><text x="0" y="{}" class="lane-label">Button {button}</text>"#,
        LANE / 2.0 + 1.0
    );

    for span in spans(&outcome.timeline, button) {
        let x = x_of(span.from);
        let w = ((span.to - span.from) as f64 * PX_PER_MS).max(1.0);
        let name = span.state.map_or("halted", State::name);
        svg.push_str(&format!(
            r#"<rect x="{x}" y="0" width="{w}" height="{LANE}" class="span {}"><title>{name} {}..{} ms</title></rect>"#,
            state_class(span.state),
            span.from,
            span.to,
        ));
    }

    for note in outcome
        .notifications
        .iter()
        .filter(|n| n.event.instance() == button)
    {
        let x = x_of(note.at);
        svg.push_str(&format!(
            r#"<line x1="{x}" y1="-2" x2="{x}" y2="{}" class="mark"/><text x="{}" y="{}" class="mark-label">{}</text>"#,
            LANE + 2.0,
            x + 3.0,
            LANE - 4.0,
            html_escape(note.event.id.name()),
        ));
    }

    svg.push_str("</g>");
    svg
}

fn render_axis(end: Millis, y: f64) -> String {
    let mut svg = format!(r#"<g transform="translate(0, {y})">"#);
    let mut at = 0;
    while at <= end {
        let x = x_of(at);
        svg.push_str(&format!(
            r#"<line x1="{x}" y1="0" x2="{x}" y2="6" class="tick"/><text x="{x}" y="20" class="axis-label">{at}</text>"#
        ));
        at += AXIS_STEP;
    }
    svg.push_str("</g>");
    svg
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Generate the complete HTML document with inline SVG.
pub fn generate_html(outcome: &Outcome, title: &str) -> String {
    let end = outcome.timeline.last().map_or(0, |snap| snap.at);
    let lanes_h = NUM_BUTTONS as f64 * (LANE + GAP);
    let total_width = x_of(end) + 2.0 * MARGIN + 40.0;
    let total_height = lanes_h + AXIS_H + 2.0 * MARGIN;

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{}</title>
<style>
  body {{
    background: #1a1a2e;
    color: #eee;
    font-family: system-ui, -apple-system, sans-serif;
    padding: 2em;
  }}
  .span {{ stroke: #0d1117; stroke-width: 0.5; }}
  .span.start {{ fill: #30365e; }}
  .span.released {{ fill: #16213e; }}
  .span.confirm {{ fill: #b6a053; }}
  .span.pressed {{ fill: #53a8b6; }}
  .span.stuck {{ fill: #e94560; }}
  .span.halted {{ fill: #0d1117; stroke: #21262d; stroke-dasharray: 3 3; }}
  .lane-label {{
    fill: #eee;
    font-size: 13px;
    dominant-baseline: middle;
  }}
  .mark {{ stroke: #fff; stroke-width: 1.5; }}
  .mark-label {{ fill: #fff; font-size: 10px; }}
  .tick {{ stroke: #888; }}
  .axis-label {{
    fill: #888;
    font-family: "JetBrains Mono", "Fira Code", monospace;
    font-size: 10px;
    text-anchor: middle;
  }}
</style>
</head>
<body>
<h2>{}</h2>
<svg width="{total_width}" height="{total_height}" xmlns="http://www.w3.org/2000/svg">
<g transform="translate({MARGIN}, {MARGIN})">
"#,
        html_escape(title),
        html_escape(title),
    );

    for button in 0..NUM_BUTTONS {
        html.push_str(&render_lane(outcome, button));
        html.push('\n');
    }
    html.push_str(&render_axis(end, lanes_h));

    html.push_str("\n</g>\n</svg>\n</body>\n</html>\n");
    html
}
