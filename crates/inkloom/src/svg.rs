//! SVG in and out.
//!
//! Reading uses usvg for complete SVG resolution (CSS, transforms, shapes
//! turned into paths), then walks the tree collecting the outer ring of
//! every path as a region boundary.
//!
//! ## Curve Flattening
//!
//! SVG paths contain Bézier curves (cubic and quadratic). These must be
//! "flattened" into line segments before they can be used as a boundary.
//! We use lyon_geom for accurate curve approximation with a fixed
//! tolerance.
//!
//! Writing is plain string building: one `<line>` per segment.

use lyon_geom::{CubicBezierSegment, QuadraticBezierSegment, point};

use crate::error::{DoodleError, Result};
use crate::geometry::{Segment, Vec2};

/// Tolerance for curve flattening, in SVG user units.
const CURVE_TOLERANCE: f32 = 0.1;

/// Extract one boundary ring per closed path in the document.
///
/// Only the first subpath of each path is used. Rings with fewer than
/// three distinct vertices are skipped.
pub fn extract_regions_from_svg(svg_content: &str) -> Result<Vec<Vec<Vec2>>> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_content, &options)
        .map_err(|e| DoodleError::Svg(e.to_string()))?;

    let mut rings = Vec::new();
    extract_from_group(tree.root(), &mut rings);

    if rings.is_empty() {
        Err(DoodleError::NoRegions)
    } else {
        Ok(rings)
    }
}

fn extract_from_group(group: &usvg::Group, rings: &mut Vec<Vec<Vec2>>) {
    for child in group.children() {
        match child {
            usvg::Node::Group(group) => extract_from_group(group, rings),
            usvg::Node::Path(path) => {
                if let Some(ring) = path_to_ring(path) {
                    rings.push(ring);
                }
            }
            // Ignore text, images, etc.
            _ => {}
        }
    }
}

fn path_to_ring(path: &usvg::Path) -> Option<Vec<Vec2>> {
    use usvg::tiny_skia_path::PathSegment;

    // Path data is in local coordinates; map it into document space.
    let transform = path.abs_transform();
    let mut points: Vec<Vec2> = Vec::new();
    let mut last: Option<(f32, f32)> = None;

    let push = |points: &mut Vec<Vec2>, x: f32, y: f32| {
        let mut p = usvg::tiny_skia_path::Point::from_xy(x, y);
        transform.map_point(&mut p);
        points.push(Vec2::new(p.x as f64, p.y as f64));
    };

    for segment in path.data().segments() {
        match segment {
            PathSegment::MoveTo(p) => {
                if !points.is_empty() {
                    break;
                }
                push(&mut points, p.x, p.y);
                last = Some((p.x, p.y));
            }
            PathSegment::LineTo(p) => {
                push(&mut points, p.x, p.y);
                last = Some((p.x, p.y));
            }
            PathSegment::QuadTo(ctrl, p) => {
                if let Some((lx, ly)) = last {
                    let curve = QuadraticBezierSegment {
                        from: point(lx, ly),
                        ctrl: point(ctrl.x, ctrl.y),
                        to: point(p.x, p.y),
                    };
                    curve.for_each_flattened(CURVE_TOLERANCE, &mut |line| {
                        push(&mut points, line.to.x, line.to.y);
                    });
                } else {
                    push(&mut points, p.x, p.y);
                }
                last = Some((p.x, p.y));
            }
            PathSegment::CubicTo(ctrl1, ctrl2, p) => {
                if let Some((lx, ly)) = last {
                    let curve = CubicBezierSegment {
                        from: point(lx, ly),
                        ctrl1: point(ctrl1.x, ctrl1.y),
                        ctrl2: point(ctrl2.x, ctrl2.y),
                        to: point(p.x, p.y),
                    };
                    curve.for_each_flattened(CURVE_TOLERANCE, &mut |line| {
                        push(&mut points, line.to.x, line.to.y);
                    });
                } else {
                    push(&mut points, p.x, p.y);
                }
                last = Some((p.x, p.y));
            }
            PathSegment::Close => {}
        }
    }

    // Flattening and explicit closes repeat vertices.
    points.dedup_by(|a, b| (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6);
    if points.len() >= 2 {
        let first = points[0];
        if let Some(last) = points.last() {
            if (last.x - first.x).abs() < 1e-6 && (last.y - first.y).abs() < 1e-6 {
                points.pop();
            }
        }
    }

    (points.len() >= 3).then_some(points)
}

/// Render finished sections as an SVG document.
pub fn segments_to_svg(sections: &[Vec<Segment>], width: f64, height: f64, stroke_width: f32) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
<rect width="100%" height="100%" fill="white"/>
"#,
        w = width,
        h = height
    ));

    for (index, segments) in sections.iter().enumerate() {
        svg.push_str(&format!(
            "<g id=\"section-{}\" stroke=\"black\" stroke-width=\"{}\" stroke-linecap=\"round\" fill=\"none\">\n",
            index, stroke_width
        ));
        for s in segments {
            svg.push_str(&format!(
                "  <line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"/>\n",
                s.start.x, s.start.y, s.end.x, s.end.y
            ));
        }
        svg.push_str("</g>\n");
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_rect() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
                <rect x="10" y="10" width="80" height="80"/>
            </svg>
        "#;

        let rings = extract_regions_from_svg(svg).unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 4);
    }

    #[test]
    fn explicitly_closed_path_drops_repeated_start() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
                <path d="M 10,10 L 90,10 L 50,80 L 10,10 Z"/>
            </svg>
        "#;

        let rings = extract_regions_from_svg(svg).unwrap();
        assert_eq!(rings[0].len(), 3);
    }

    #[test]
    fn transforms_are_applied() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 200">
                <g transform="translate(100,0)">
                    <polygon points="0,0 10,0 10,10"/>
                </g>
            </svg>
        "#;

        let rings = extract_regions_from_svg(svg).unwrap();
        assert!(rings[0].iter().all(|p| p.x >= 100.0 - 1e-6));
    }

    #[test]
    fn no_regions_error() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
            </svg>
        "#;

        assert!(matches!(extract_regions_from_svg(svg), Err(DoodleError::NoRegions)));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(extract_regions_from_svg("not svg"), Err(DoodleError::Svg(_))));
    }

    #[test]
    fn circle_is_flattened() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
                <circle cx="50" cy="50" r="40"/>
            </svg>
        "#;

        let rings = extract_regions_from_svg(svg).unwrap();
        assert!(rings[0].len() > 20, "got {} points", rings[0].len());
    }

    #[test]
    fn export_writes_one_line_per_segment() {
        let sections = vec![
            vec![Segment::new(Vec2::ZERO, Vec2::new(10.0, 0.0))],
            vec![
                Segment::new(Vec2::ZERO, Vec2::new(0.0, 10.0)),
                Segment::new(Vec2::new(0.0, 10.0), Vec2::new(10.0, 10.0)),
            ],
        ];

        let svg = segments_to_svg(&sections, 20.0, 20.0, 2.0);
        assert_eq!(svg.matches("<line").count(), 3);
        assert!(svg.contains("section-1"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
