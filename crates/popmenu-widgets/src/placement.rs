//! Viewport-aware placement of the menu root.
//!
//! Placement is a two-pass operation: the freshly rendered root is parked
//! off-screen so it can be measured without flicker, then moved to the anchor
//! clamped so it stays `viewport_margin` units inside the viewport.

use crate::error::MenuError;
use popmenu_core::{MenuConfig, NodeId, Point, Size, Surface};

/// Clamp an anchor so a box of `size` stays inside `viewport` minus `margin`.
///
/// Each axis is only adjusted when the box would overflow the far edge, and
/// never past the near margin.
#[must_use]
pub fn clamp_to_viewport(anchor: Point, size: Size, viewport: Size, margin: f32) -> Point {
    let mut left = anchor.x;
    let mut top = anchor.y;
    if left + size.width > viewport.width - margin {
        left = margin.max(viewport.width - size.width - margin);
    }
    if top + size.height > viewport.height - margin {
        top = margin.max(viewport.height - size.height - margin);
    }
    Point::new(left, top)
}

/// Measure `root` off-screen and move it to the clamped anchor.
///
/// Returns the final position. A root that cannot be measured (detached or
/// zero-sized) is placed at the untransformed anchor.
pub fn place<S: Surface>(
    surface: &mut S,
    root: NodeId,
    anchor: Point,
    config: &MenuConfig,
) -> Result<Point, MenuError> {
    let offscreen = px(config.offscreen_offset);
    surface.set_style(root, "left", &offscreen)?;
    surface.set_style(root, "top", &offscreen)?;
    surface.set_style(root, "display", "block")?;
    surface.flush_layout();

    let position = match surface.bounding_rect(root) {
        Some(rect) if !rect.size().is_empty() => clamp_to_viewport(
            anchor,
            rect.size(),
            surface.viewport(),
            config.viewport_margin,
        ),
        measured => {
            tracing::warn!(%root, ?measured, "menu root not measurable, placing unclamped");
            anchor
        }
    };

    surface.set_style(root, "left", &px(position.x))?;
    surface.set_style(root, "top", &px(position.y))?;
    Ok(position)
}

fn px(value: f32) -> String {
    format!("{value}px")
}

#[cfg(test)]
mod tests {
    use super::*;
    use popmenu_test::Document;
    use proptest::prelude::*;

    #[test]
    fn test_clamp_bottom_right_overflow() {
        let placed = clamp_to_viewport(
            Point::new(250.0, 250.0),
            Size::new(200.0, 100.0),
            Size::new(300.0, 300.0),
            8.0,
        );
        assert_eq!(placed, Point::new(92.0, 192.0));
    }

    #[test]
    fn test_clamp_fits_unchanged() {
        let placed = clamp_to_viewport(
            Point::new(10.0, 20.0),
            Size::new(100.0, 50.0),
            Size::new(800.0, 600.0),
            8.0,
        );
        assert_eq!(placed, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_clamp_oversized_pins_to_margin() {
        let placed = clamp_to_viewport(
            Point::new(50.0, 50.0),
            Size::new(500.0, 400.0),
            Size::new(300.0, 300.0),
            8.0,
        );
        assert_eq!(placed, Point::new(8.0, 8.0));
    }

    #[test]
    fn test_clamp_exact_fit_at_margin() {
        // 92 + 200 == 300 - 8, not an overflow
        let placed = clamp_to_viewport(
            Point::new(92.0, 0.0),
            Size::new(200.0, 100.0),
            Size::new(300.0, 300.0),
            8.0,
        );
        assert_eq!(placed, Point::new(92.0, 0.0));
    }

    #[test]
    fn test_place_writes_styles() {
        let mut doc = Document::new(Size::new(300.0, 300.0));
        let root = doc.create_root();
        doc.set_measured_size(root, Size::new(200.0, 100.0));

        let placed = place(&mut doc, root, Point::new(250.0, 250.0), &MenuConfig::default()).unwrap();

        assert_eq!(placed, Point::new(92.0, 192.0));
        assert_eq!(doc.style(root, "left").as_deref(), Some("92px"));
        assert_eq!(doc.style(root, "top").as_deref(), Some("192px"));
        assert_eq!(doc.style(root, "display").as_deref(), Some("block"));
    }

    #[test]
    fn test_place_measures_off_screen() {
        let mut doc = Document::new(Size::new(300.0, 300.0));
        let root = doc.create_root();
        doc.set_measured_size(root, Size::new(200.0, 100.0));

        let _ = place(&mut doc, root, Point::new(0.0, 0.0), &MenuConfig::default()).unwrap();

        let history = doc.style_history(root, "left");
        assert_eq!(history.first().map(String::as_str), Some("-9999px"));
    }

    #[test]
    fn test_place_unmeasurable_falls_back_to_anchor() {
        let mut doc = Document::new(Size::new(300.0, 300.0));
        let root = doc.create_root();

        let placed = place(&mut doc, root, Point::new(290.0, 295.0), &MenuConfig::default()).unwrap();

        assert_eq!(placed, Point::new(290.0, 295.0));
        assert_eq!(doc.style(root, "left").as_deref(), Some("290px"));
    }

    #[test]
    fn test_place_detached_falls_back_to_anchor() {
        let mut doc = Document::new(Size::new(300.0, 300.0));
        let detached = doc.create_element("div").unwrap();
        doc.set_measured_size(detached, Size::new(200.0, 100.0));

        let placed = place(&mut doc, detached, Point::new(250.0, 250.0), &MenuConfig::default()).unwrap();
        assert_eq!(placed, Point::new(250.0, 250.0));
    }

    proptest! {
        #[test]
        fn prop_clamped_menu_stays_inside_margin(
            x in 0.0f32..2000.0,
            y in 0.0f32..2000.0,
            w in 1.0f32..280.0,
            h in 1.0f32..280.0,
        ) {
            let viewport = Size::new(300.0, 300.0);
            let placed = clamp_to_viewport(Point::new(x, y), Size::new(w, h), viewport, 8.0);
            prop_assert!(placed.x >= 8.0 || placed.x == x);
            prop_assert!(placed.x + w <= viewport.width - 8.0 + 0.001);
            prop_assert!(placed.y + h <= viewport.height - 8.0 + 0.001);
        }

        #[test]
        fn prop_never_moves_towards_far_edge(
            x in -100.0f32..400.0,
            y in -100.0f32..400.0,
            w in 1.0f32..500.0,
            h in 1.0f32..500.0,
        ) {
            let placed = clamp_to_viewport(Point::new(x, y), Size::new(w, h), Size::new(300.0, 300.0), 8.0);
            prop_assert!(placed.x <= x.max(8.0));
            prop_assert!(placed.y <= y.max(8.0));
        }
    }
}
