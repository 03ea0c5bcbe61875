//! SVG output for the renderer's current view.

use std::fmt::Write;

use crate::atlas::Ring;
use crate::config::OCEAN_FILL;
use crate::render::projection::FittedProjection;
use crate::render::MapRenderer;

/// Renders every region with its current style into a standalone SVG.
///
/// Regions carry `id="country-{id}"` plus `data-country-id` and
/// `data-country-name` attributes; the root records the map state in
/// `data-state`.
pub fn render_svg(renderer: &MapRenderer, width: u32, height: u32) -> String {
    let (w, h) = (f64::from(width), f64::from(height));
    let projection = FittedProjection::fit(
        renderer
            .regions()
            .iter()
            .flat_map(|r| r.region.polygons.iter())
            .flatten()
            .flatten(),
        w,
        h,
    );

    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" preserveAspectRatio="xMidYMid meet" data-state="{}">"#,
        renderer.state()
    );
    let _ = writeln!(
        out,
        r#"  <rect width="{width}" height="{height}" fill="{OCEAN_FILL}"/>"#
    );
    out.push_str("  <g>\n");

    for rendered in renderer.regions() {
        let d = match projection {
            Some(projection) => path_data(&projection, rendered.region.polygons.iter().flatten()),
            None => String::new(),
        };
        let style = rendered.style;
        let _ = writeln!(
            out,
            r#"    <path class="country {style}" id="country-{id}" data-country-id="{id}" data-country-name="{name}" d="{d}" fill="{fill}" stroke="{stroke}" stroke-width="{width}" fill-rule="evenodd"/>"#,
            id = escape_attr(&rendered.region.region_id),
            name = escape_attr(&rendered.region.display_name),
            fill = style.fill(),
            stroke = style.stroke(),
            width = style.stroke_width(),
        );
    }

    out.push_str("  </g>\n</svg>\n");
    out
}

fn path_data<'a>(projection: &FittedProjection, rings: impl Iterator<Item = &'a Ring>) -> String {
    let mut d = String::new();
    for ring in rings {
        for (i, &(lon, lat)) in ring.iter().enumerate() {
            let (x, y) = projection.project(lon, lat);
            let _ = write!(d, "{}{:.2},{:.2}", if i == 0 { "M" } else { "L" }, x, y);
        }
        if !ring.is_empty() {
            d.push('Z');
        }
    }
    d
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
