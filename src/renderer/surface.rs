//! Drawing surfaces. The renderer paints through the [`Surface`] trait;
//! [`SvgSurface`] accumulates SVG elements and produces the final string.

use crate::calibration::Point;

/// One step of a filled outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Cubic Bézier: two control points, then the end point
    CubicTo(Point, Point, Point),
    Close,
}

/// How an ellipse is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint<'a> {
    Fill(&'a str),
    /// Outline only: color and stroke width
    Stroke(&'a str, f64),
}

/// Canvas abstraction the overlay is drawn onto.
pub trait Surface {
    /// Drop everything drawn so far and resize to the canvas.
    fn clear(&mut self, width: f64, height: f64);
    fn line(&mut self, from: Point, to: Point, color: &str, width: f64);
    fn ellipse(&mut self, center: Point, rx: f64, ry: f64, rotation_deg: f64, paint: Paint);
    fn fill_path(&mut self, path: &[PathCommand], color: &str);
    /// Text centered on `at`.
    fn text(&mut self, at: Point, content: &str, size: f64, color: &str);
}

// ═══════════════════════════════════════════════════════════════════════
// SvgSurface
// ═══════════════════════════════════════════════════════════════════════

/// Surface that records SVG elements on a transparent background.
#[derive(Debug, Default)]
pub struct SvgSurface {
    elements: Vec<String>,
    width: f64,
    height: f64,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            elements: Vec::new(),
            width,
            height,
        }
    }

    /// Number of elements drawn since the last clear.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn build(&self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" width="{}" height="{}">"#,
            self.width, self.height, self.width, self.height
        );
        svg.push('\n');
        for el in &self.elements {
            svg.push_str("  ");
            svg.push_str(el);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.elements.clear();
        self.width = width;
        self.height = height;
    }

    fn line(&mut self, from: Point, to: Point, color: &str, width: f64) {
        self.elements.push(format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}" stroke-linecap="round"/>"#,
            from.x, from.y, to.x, to.y, color, width
        ));
    }

    fn ellipse(&mut self, center: Point, rx: f64, ry: f64, rotation_deg: f64, paint: Paint) {
        let (fill, stroke, stroke_width) = match paint {
            Paint::Fill(color) => (color, "none", 0.0),
            Paint::Stroke(color, w) => ("none", color, w),
        };
        self.elements.push(format!(
            r#"<ellipse cx="{:.2}" cy="{:.2}" rx="{:.2}" ry="{:.2}" fill="{}" stroke="{}" stroke-width="{:.2}" transform="rotate({:.1},{:.2},{:.2})"/>"#,
            center.x, center.y, rx, ry, fill, stroke, stroke_width, rotation_deg, center.x, center.y
        ));
    }

    fn fill_path(&mut self, path: &[PathCommand], color: &str) {
        let mut d = String::new();
        for cmd in path {
            if !d.is_empty() {
                d.push(' ');
            }
            match *cmd {
                PathCommand::MoveTo(p) => d.push_str(&format!("M{:.2},{:.2}", p.x, p.y)),
                PathCommand::LineTo(p) => d.push_str(&format!("L{:.2},{:.2}", p.x, p.y)),
                PathCommand::CubicTo(c1, c2, p) => d.push_str(&format!(
                    "C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
                    c1.x, c1.y, c2.x, c2.y, p.x, p.y
                )),
                PathCommand::Close => d.push('Z'),
            }
        }
        self.elements.push(format!(r#"<path d="{}" fill="{}"/>"#, d, color));
    }

    fn text(&mut self, at: Point, content: &str, size: f64, color: &str) {
        let escaped = content
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        self.elements.push(format!(
            r#"<text x="{:.2}" y="{:.2}" font-size="{:.1}" fill="{}" text-anchor="middle" dominant-baseline="central">{}</text>"#,
            at.x, at.y, size, color, escaped
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_resets_elements_and_size() {
        let mut svg = SvgSurface::new(10.0, 10.0);
        svg.line(Point::new(0.0, 0.0), Point::new(1.0, 1.0), "#000", 1.0);
        assert_eq!(svg.element_count(), 1);
        svg.clear(300.0, 200.0);
        assert_eq!(svg.element_count(), 0);
        assert!(svg.build().contains(r#"viewBox="0 0 300 200""#));
    }

    #[test]
    fn path_commands_serialize() {
        let mut svg = SvgSurface::new(10.0, 10.0);
        svg.fill_path(
            &[
                PathCommand::MoveTo(Point::new(1.0, 2.0)),
                PathCommand::CubicTo(Point::new(3.0, 4.0), Point::new(5.0, 6.0), Point::new(7.0, 8.0)),
                PathCommand::LineTo(Point::new(0.0, 0.0)),
                PathCommand::Close,
            ],
            "#111",
        );
        let out = svg.build();
        assert!(out.contains(r#"d="M1.00,2.00 C3.00,4.00 5.00,6.00 7.00,8.00 L0.00,0.00 Z""#), "{out}");
    }

    #[test]
    fn stroked_ellipse_is_hollow() {
        let mut svg = SvgSurface::new(10.0, 10.0);
        svg.ellipse(Point::new(5.0, 5.0), 3.0, 2.0, -20.0, Paint::Stroke("#123", 1.5));
        let out = svg.build();
        assert!(out.contains(r##"fill="none" stroke="#123""##), "{out}");
        assert!(out.contains("rotate(-20.0,5.00,5.00)"), "{out}");
    }
}
