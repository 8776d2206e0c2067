// Built-in test scenes.
//
// Each scene draws into a fresh `Rgb32` buffer and exercises one family of
// operations, so renders can be compared across revisions.

use tinyraster::{Canvas, EndCap, ImageRef, Opacity, PointF, PointI, RectF, RectI, Rgb32, Rgb565};

use crate::Frame;

type SceneFn = fn(&mut Canvas<'_, Rgb32>);

const SCENES: &[(&str, SceneFn)] = &[
    ("shapes", draw_shapes),
    ("blit", draw_blit),
    ("fill", draw_fill),
];

pub fn available_scenes() -> impl Iterator<Item = &'static str> {
    SCENES.iter().map(|(name, _)| *name)
}

/// Render the named scene. `None` for an unknown name.
pub fn render_scene(name: &str, width: u32, height: u32) -> Option<Frame> {
    let draw = SCENES.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)?;
    let mut pixels = vec![Rgb32::WHITE; width as usize * height as usize];
    {
        let mut canvas = Canvas::new(&mut pixels[..], width as i32, height as i32);
        log::debug!("rendering scene '{}' at {}x{}", name, width, height);
        draw(&mut canvas);
    }
    Some(Frame::from_pixels(width, height, &pixels))
}

/// Map unit coordinates onto the canvas.
fn at(c: &Canvas<'_, Rgb32>, u: f32, v: f32) -> PointF {
    PointF::new(u * c.width() as f32, v * c.height() as f32)
}

fn unit(c: &Canvas<'_, Rgb32>) -> f32 {
    c.width().min(c.height()) as f32
}

// ============================================================================
// Scenes
// ============================================================================

fn draw_shapes(c: &mut Canvas<'_, Rgb32>) {
    let s = unit(c);
    let half = Opacity::Blend(0.5);

    // Bresenham row
    let p0 = at(c, 0.05, 0.05).round();
    let p1 = at(c, 0.3, 0.25).round();
    c.draw_line(p0, p1, Rgb32::BLACK, Opacity::Overwrite);
    c.draw_rect(RectI::new(p0.x, p1.y + 4, p1.x, p1.y + 20), Rgb32::NAVY, Opacity::Overwrite);
    c.fill_circle(at(c, 0.45, 0.15).round(), (s * 0.08) as i32, Rgb32::ORANGE, Rgb32::BLACK, Opacity::OPAQUE);
    c.fill_ellipse(
        at(c, 0.7, 0.15).round(),
        PointI::new((s * 0.12) as i32, (s * 0.06) as i32),
        Rgb32::TEAL,
        Rgb32::BLACK,
        Opacity::OPAQUE,
    );
    c.fill_triangle(
        at(c, 0.85, 0.05).round(),
        at(c, 0.95, 0.25).round(),
        at(c, 0.8, 0.25).round(),
        Rgb32::PURPLE,
        Rgb32::BLACK,
        Opacity::OPAQUE,
    );

    // Anti-aliased row
    c.draw_thick_line_aa(
        at(c, 0.05, 0.35),
        at(c, 0.3, 0.55),
        s * 0.02,
        EndCap::Rounded,
        EndCap::Arrow(3),
        Rgb32::RED,
        Opacity::OPAQUE,
    );
    c.fill_thick_circle_aa(at(c, 0.45, 0.45), s * 0.09, s * 0.015, Rgb32::YELLOW, Rgb32::MAROON, Opacity::OPAQUE);
    c.fill_circle_sector_aa(at(c, 0.45, 0.45), s * 0.09, 30.0, 120.0, Rgb32::BLUE, half);
    c.fill_round_rect_aa(
        RectF::new(0.6 * c.width() as f32, 0.35 * c.height() as f32, 0.9 * c.width() as f32, 0.55 * c.height() as f32),
        s * 0.04,
        Rgb32::GREEN,
        half,
    );
    c.draw_ellipse_aa(at(c, 0.75, 0.45), PointF::new(s * 0.16, s * 0.07), Rgb32::BLACK, Opacity::OPAQUE);

    // Polygons
    let star: Vec<PointF> = (0..10)
        .map(|i| {
            let a = i as f32 * std::f32::consts::PI / 5.0;
            let r = s * if i % 2 == 0 { 0.12 } else { 0.05 };
            at(c, 0.2, 0.8) + PointF::new(r * a.sin(), -r * a.cos())
        })
        .collect();
    c.fill_polygon_aa(&star, Rgb32::SALMON, Opacity::OPAQUE);
    c.draw_thick_polygon_aa(&star, 1.5, Rgb32::MAROON, Opacity::OPAQUE);
    c.fill_quad_aa(at(c, 0.45, 0.7), at(c, 0.6, 0.68), at(c, 0.62, 0.92), at(c, 0.43, 0.9), Rgb32::CYAN, half);
    c.fill_thick_triangle_aa(
        at(c, 0.7, 0.7),
        at(c, 0.95, 0.75),
        at(c, 0.8, 0.95),
        s * 0.015,
        Rgb32::OLIVE,
        Rgb32::BLACK,
        Opacity::OPAQUE,
    );
}

fn draw_blit(c: &mut Canvas<'_, Rgb32>) {
    c.fill_screen_v_gradient(Rgb32::SILVER, Rgb32::WHITE);

    // 16x16 checker sprite in another encoding, magenta as the key color.
    let mut sprite = [Rgb565::MAGENTA; 256];
    {
        let mut sc = Canvas::new(&mut sprite, 16, 16);
        for y in 0..16 {
            for x in 0..16 {
                if (x / 4 + y / 4) % 2 == 0 && (x - 8) * (x - 8) + (y - 8) * (y - 8) < 56 {
                    let col = if x < 8 { Rgb565::RED } else { Rgb565::BLUE };
                    sc.set_pixel::<false>(x, y, col);
                }
            }
        }
    }
    let img = ImageRef::new(&sprite, 16, 16);
    let anchor = PointF::new(8.0, 8.0);
    let s = unit(c) / 64.0;

    for i in 0..4 {
        let u = 0.15 + 0.23 * i as f32;
        let angle = 30.0 * i as f32;
        c.blit_affine(&img, anchor, at(c, u, 0.25), s * (1.0 + 0.5 * i as f32), angle, Opacity::OPAQUE);
        c.blit_affine_masked(&img, Rgb565::MAGENTA, anchor, at(c, u, 0.6), s * 1.5, -angle, Opacity::Blend(0.7));
    }

    let tri = [at(c, 0.1, 0.8), at(c, 0.4, 0.75), at(c, 0.25, 0.98)];
    c.draw_gradient_triangle(tri, [Rgb32::RED, Rgb32::GREEN, Rgb32::BLUE], Opacity::OPAQUE);
    let src = [PointF::new(0.0, 0.0), PointF::new(16.0, 0.0), PointF::new(16.0, 16.0), PointF::new(0.0, 16.0)];
    let dst = [at(c, 0.55, 0.75), at(c, 0.9, 0.78), at(c, 0.85, 0.98), at(c, 0.6, 0.95)];
    c.draw_textured_quad_masked(&img, Rgb565::MAGENTA, src, dst, Opacity::OPAQUE);
}

fn draw_fill(c: &mut Canvas<'_, Rgb32>) {
    let s = unit(c);
    c.draw_circle(at(c, 0.3, 0.5).round(), (s * 0.25) as i32, Rgb32::BLACK, Opacity::Overwrite);
    c.draw_circle(at(c, 0.3, 0.5).round(), (s * 0.1) as i32, Rgb32::BLACK, Opacity::Overwrite);
    let maze: Vec<PointI> = [
        (0.55, 0.1),
        (0.95, 0.1),
        (0.95, 0.9),
        (0.7, 0.9),
        (0.7, 0.4),
        (0.8, 0.4),
        (0.8, 0.75),
        (0.85, 0.75),
        (0.85, 0.2),
        (0.55, 0.2),
    ]
    .iter()
    .map(|&(u, v)| at(c, u, v).round())
    .collect();
    c.draw_polygon(&maze, Rgb32::BLACK, Opacity::Overwrite);

    let ring = at(c, 0.3, 0.5).round() + PointI::new((s * 0.17) as i32, 0);
    match c.flood_fill::<4096>(ring, Rgb32::ORANGE) {
        Ok(peak) => log::debug!("ring fill used {} stack bytes", peak),
        Err(e) => log::warn!("ring fill stopped: {}", e),
    }
    let corridor = at(c, 0.9, 0.5).round();
    if let Err(e) = c.flood_fill_bordered::<4096>(corridor, Rgb32::BLACK, Rgb32::TEAL) {
        log::warn!("corridor fill stopped: {}", e);
    }
}
