//! Deterministic SVG placeholders used when a view cannot be generated.
//!
//! Geometry is fixed per view. The blueprint text is accepted so callers do
//! not need a special case, but it does not change the drawing.

use std::fmt::Write as _;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use venue_contracts::views::{FLOOR_PLAN_LABEL, MAIN_EVENT_SPACE_LABEL, SIDE_VIEW_LABEL};

use crate::codec;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const FONT: &str = "Helvetica, Arial, sans-serif";

/// Data URI (`image/svg+xml`) of the placeholder for `label`.
pub fn placeholder_for(label: &str, _blueprint_text: &str) -> String {
    let svg = placeholder_svg(label);
    codec::data_uri("image/svg+xml", &BASE64.encode(svg.as_bytes()))
}

pub fn placeholder_svg(label: &str) -> String {
    match label {
        FLOOR_PLAN_LABEL => floor_plan_svg(),
        MAIN_EVENT_SPACE_LABEL => main_event_space_svg(),
        SIDE_VIEW_LABEL => side_view_svg(),
        other => placeholder_card_svg(other),
    }
}

pub fn fallback_description(label: &str) -> String {
    match label {
        FLOOR_PLAN_LABEL => {
            "Schematic floor plan placeholder showing a typical stage, seating and bar layout."
                .to_string()
        }
        MAIN_EVENT_SPACE_LABEL => {
            "Illustrative main event space placeholder with evening lighting.".to_string()
        }
        SIDE_VIEW_LABEL => {
            "Illustrative side view placeholder with foreground, midground and background layers."
                .to_string()
        }
        other => format!("Placeholder for {other}."),
    }
}

fn open_svg(out: &mut String, background: &str) {
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    );
    let _ = write!(
        out,
        r#"<rect x="0" y="0" width="{WIDTH}" height="{HEIGHT}" fill="{background}"/>"#
    );
}

fn close_svg(out: &mut String) {
    out.push_str("</svg>");
}

fn text(out: &mut String, x: u32, y: u32, size: u32, fill: &str, content: &str) {
    let _ = write!(
        out,
        r#"<text x="{x}" y="{y}" font-family="{FONT}" font-size="{size}" fill="{fill}" text-anchor="middle">{}</text>"#,
        escape_xml(content)
    );
}

fn rect(out: &mut String, x: u32, y: u32, width: u32, height: u32, fill: &str, stroke: &str) {
    let _ = write!(
        out,
        r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{fill}" stroke="{stroke}" stroke-width="2"/>"#
    );
}

fn circle(out: &mut String, cx: u32, cy: u32, r: u32, fill: &str, stroke: &str) {
    let _ = write!(
        out,
        r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{fill}" stroke="{stroke}" stroke-width="2"/>"#
    );
}

fn floor_plan_svg() -> String {
    let mut out = String::new();
    open_svg(&mut out, "#ffffff");
    // Outer walls with a door gap on the south side.
    out.push_str(
        r##"<path d="M60 60 H740 V540 H460 M340 540 H60 Z" fill="none" stroke="#1f2937" stroke-width="6"/>"##,
    );
    out.push_str(
        r##"<path d="M340 540 A120 120 0 0 1 460 540" fill="none" stroke="#9ca3af" stroke-dasharray="6 4"/>"##,
    );
    rect(&mut out, 280, 80, 240, 70, "#e0e7ff", "#4338ca");
    text(&mut out, 400, 122, 18, "#312e81", "STAGE");
    rect(&mut out, 310, 170, 180, 100, "#fef3c7", "#b45309");
    text(&mut out, 400, 226, 16, "#78350f", "DANCE FLOOR");
    for row in 0..2u32 {
        for col in 0..4u32 {
            let cx = 160 + col * 160;
            let cy = 330 + row * 110;
            circle(&mut out, cx, cy, 34, "#f3f4f6", "#374151");
            for seat in 0..6u32 {
                let (dx, dy) = SEAT_OFFSETS[seat as usize];
                let sx = (cx as i32 + dx) as u32;
                let sy = (cy as i32 + dy) as u32;
                circle(&mut out, sx, sy, 7, "#d1d5db", "#6b7280");
            }
        }
    }
    rect(&mut out, 620, 440, 100, 80, "#dcfce7", "#15803d");
    text(&mut out, 670, 486, 16, "#14532d", "BAR");
    text(&mut out, 400, 580, 14, "#6b7280", "ENTRANCE");
    // North arrow and scale bar.
    out.push_str(r##"<path d="M710 130 L722 100 L734 130 Z" fill="#1f2937"/>"##);
    text(&mut out, 722, 92, 14, "#1f2937", "N");
    out.push_str(r##"<line x1="80" y1="575" x2="200" y2="575" stroke="#1f2937" stroke-width="3"/>"##);
    text(&mut out, 140, 594, 12, "#1f2937", "5 m");
    text(&mut out, 400, 40, 22, "#111827", "Floor Plan (schematic)");
    close_svg(&mut out);
    out
}

const SEAT_OFFSETS: [(i32, i32); 6] = [
    (0, -46),
    (40, -23),
    (40, 23),
    (0, 46),
    (-40, 23),
    (-40, -23),
];

fn main_event_space_svg() -> String {
    let mut out = String::new();
    open_svg(&mut out, "#1e1b4b");
    // Back wall, floor, ceiling in one-point perspective.
    out.push_str(r##"<polygon points="200,120 600,120 600,380 200,380" fill="#312e81"/>"##);
    out.push_str(r##"<polygon points="0,600 200,380 600,380 800,600" fill="#3f3f46"/>"##);
    out.push_str(r##"<polygon points="0,0 200,120 600,120 800,0" fill="#1e1b4b"/>"##);
    out.push_str(r##"<polygon points="0,0 200,120 200,380 0,600" fill="#27245e"/>"##);
    out.push_str(r##"<polygon points="800,0 600,120 600,380 800,600" fill="#27245e"/>"##);
    // String lights.
    for idx in 0..9u32 {
        let x = 120 + idx * 70;
        let y = if idx % 2 == 0 { 70 } else { 86 };
        circle(&mut out, x, y, 6, "#fde68a", "#f59e0b");
    }
    rect(&mut out, 300, 300, 200, 40, "#6d28d9", "#a78bfa");
    text(&mut out, 400, 326, 16, "#ede9fe", "STAGE");
    for col in 0..4u32 {
        let cx = 190 + col * 140;
        out.push_str(&format!(
            r##"<ellipse cx="{cx}" cy="470" rx="55" ry="18" fill="#f5f5f4" stroke="#a8a29e" stroke-width="2"/>"##
        ));
        circle(&mut out, cx, 452, 8, "#fca5a5", "#b91c1c");
    }
    text(&mut out, 400, 40, 22, "#fef3c7", "Main Event Space (19:00, illustrative)");
    close_svg(&mut out);
    out
}

fn side_view_svg() -> String {
    let mut out = String::new();
    open_svg(&mut out, "#0f172a");
    // Background: angled wall with stage and bar.
    out.push_str(r##"<polygon points="0,80 800,160 800,360 0,420" fill="#334155"/>"##);
    out.push_str(r##"<polygon points="520,250 760,270 760,330 520,330" fill="#7c3aed" opacity="0.8"/>"##);
    text(&mut out, 640, 305, 14, "#ede9fe", "STAGE");
    out.push_str(r##"<polygon points="60,300 220,290 220,360 60,370" fill="#15803d" opacity="0.8"/>"##);
    text(&mut out, 140, 338, 14, "#dcfce7", "BAR");
    // Floor.
    out.push_str(r##"<polygon points="0,420 800,360 800,600 0,600" fill="#44403c"/>"##);
    // Midground: tables receding toward the stage.
    for idx in 0..5u32 {
        let cx = 180 + idx * 120;
        let cy = 470 - idx * 18;
        let rx = 60 - idx * 6;
        out.push_str(&format!(
            r##"<ellipse cx="{cx}" cy="{cy}" rx="{rx}" ry="14" fill="#e7e5e4" stroke="#a8a29e" stroke-width="2"/>"##
        ));
    }
    // Foreground: place setting close to the camera.
    out.push_str(r##"<ellipse cx="120" cy="560" rx="110" ry="30" fill="#fafaf9" stroke="#d6d3d1" stroke-width="2"/>"##);
    circle(&mut out, 120, 556, 18, "#ffffff", "#a8a29e");
    circle(&mut out, 200, 540, 10, "#fcd34d", "#d97706");
    // Warm accent glow.
    circle(&mut out, 700, 120, 40, "#fde68a", "#fbbf24");
    text(&mut out, 400, 40, 22, "#f8fafc", "Side View (19:00, illustrative)");
    close_svg(&mut out);
    out
}

fn placeholder_card_svg(label: &str) -> String {
    let mut out = String::new();
    open_svg(&mut out, "#f3f4f6");
    rect(&mut out, 150, 200, 500, 200, "#ffffff", "#9ca3af");
    text(&mut out, 400, 295, 26, "#111827", label);
    text(&mut out, 400, 335, 16, "#6b7280", "Preview unavailable");
    close_svg(&mut out);
    out
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use venue_contracts::views::VIEW_SPECS;

    use super::*;

    #[test]
    fn placeholder_is_byte_identical_across_calls() {
        for spec in VIEW_SPECS {
            let first = placeholder_for(spec.label, "garden wedding for 120 guests");
            let second = placeholder_for(spec.label, "garden wedding for 120 guests");
            assert_eq!(first, second);
            assert!(first.starts_with("data:image/svg+xml;base64,"));
        }
    }

    #[test]
    fn blueprint_text_does_not_change_geometry() {
        assert_eq!(
            placeholder_for("Floor Plan", "gala dinner"),
            placeholder_for("Floor Plan", "techno rave")
        );
    }

    #[test]
    fn each_view_has_distinct_drawing() -> anyhow::Result<()> {
        let floor = placeholder_svg("Floor Plan");
        let main = placeholder_svg("Main Event Space");
        let side = placeholder_svg("Side View");
        assert!(floor.contains("Floor Plan (schematic)"));
        assert!(main.contains("19:00"));
        assert!(side.contains("Side View"));
        assert_ne!(floor, main);
        assert_ne!(main, side);

        let (mime, bytes) = crate::codec::decode_data_uri(&placeholder_for("Side View", ""))?;
        assert_eq!(mime, "image/svg+xml");
        assert_eq!(String::from_utf8(bytes)?, side);
        Ok(())
    }

    #[test]
    fn unknown_label_gets_escaped_card() {
        let svg = placeholder_svg("Aerial <Drone> & More");
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Aerial &lt;Drone&gt; &amp; More"));
        assert!(svg.contains("Preview unavailable"));
        assert_eq!(fallback_description("Aerial"), "Placeholder for Aerial.");
    }
}
