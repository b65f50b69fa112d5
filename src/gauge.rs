use iced::mouse;
use iced::widget::canvas::{self, Frame, Geometry, Path, Stroke, Text};
use iced::{Color, Point, Rectangle, Renderer, Theme};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Grams of CO₂ at which the carbon ring is full.
pub const CARBON_FULL_SCALE: f32 = 30.0;

#[derive(Debug, Clone, Copy)]
pub struct RingColors {
    pub bg: Color,
    pub label: Color,
    pub text: Color,
    pub track: Color,
}

/// Full-circle progress ring drawn via iced Canvas, filling clockwise from the top.
#[derive(Debug, Clone)]
pub struct ProgressRing {
    pub value: f32,
    pub max: f32,
    /// Text in the centre, already formatted.
    pub center: String,
    /// Smaller caption under the centre text.
    pub caption: String,
    pub color: Color,
    pub colors: RingColors,
    pub text_scale: f32,
}

impl ProgressRing {
    /// Ring for today's emissions: fraction of 30 g, coloured by level.
    pub fn carbon(grams: f32, color: Color, level: &str, colors: RingColors, text_scale: f32) -> Self {
        Self {
            value: grams,
            max: CARBON_FULL_SCALE,
            center: format!("{grams:.1}g"),
            caption: level.to_string(),
            color,
            colors,
            text_scale,
        }
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.value / self.max).clamp(0.0, 1.0)
    }
}

impl<Message: 'static> canvas::Program<Message> for ProgressRing {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let c = &self.colors;

        frame.fill(&Path::rectangle(Point::ORIGIN, bounds.size()), c.bg);

        let cx = bounds.width / 2.0;
        let cy = bounds.height / 2.0;
        let radius = (bounds.width.min(bounds.height) * 0.40).max(20.0);
        let thickness = (radius * 0.14).max(4.0);

        draw_arc(&mut frame, cx, cy, radius, thickness, -FRAC_PI_2, TAU, c.track);

        let pct = self.fraction();
        if pct > 0.001 {
            let sweep = TAU * pct;
            let glow = Color::from_rgba(self.color.r, self.color.g, self.color.b, 0.2);
            draw_arc(&mut frame, cx, cy, radius, thickness + 4.0, -FRAC_PI_2, sweep, glow);
            draw_arc(&mut frame, cx, cy, radius, thickness, -FRAC_PI_2, sweep, self.color);
        }

        let mut val_text = Text::from(self.center.clone());
        val_text.position = Point::new(cx, cy - radius * 0.08);
        val_text.color = c.text;
        val_text.size = ((radius * 0.38).max(12.0) * self.text_scale).into();
        val_text.font = iced::Font::MONOSPACE;
        val_text.horizontal_alignment = iced::alignment::Horizontal::Center;
        val_text.vertical_alignment = iced::alignment::Vertical::Center;
        frame.fill_text(val_text);

        let mut caption = Text::from(self.caption.clone());
        caption.position = Point::new(cx, cy + radius * 0.35);
        caption.color = c.label;
        caption.size = ((radius * 0.16).max(9.0) * self.text_scale).into();
        caption.horizontal_alignment = iced::alignment::Horizontal::Center;
        caption.vertical_alignment = iced::alignment::Vertical::Center;
        frame.fill_text(caption);

        vec![frame.into_geometry()]
    }
}

/// Thick arc approximated by short segments. Angles are in screen
/// coordinates (y down), so a positive sweep runs clockwise.
#[allow(clippy::too_many_arguments)]
fn draw_arc(frame: &mut Frame, cx: f32, cy: f32, radius: f32, thickness: f32, start: f32, sweep: f32, color: Color) {
    let segments = ((sweep.abs() / PI * 60.0) as usize).max(8);
    let step = sweep / segments as f32;
    let mut builder = canvas::path::Builder::new();
    for i in 0..=segments {
        let angle = start + step * i as f32;
        let p = Point::new(cx + radius * angle.cos(), cy + radius * angle.sin());
        if i == 0 {
            builder.move_to(p);
        } else {
            builder.line_to(p);
        }
    }
    frame.stroke(
        &builder.build(),
        Stroke::default()
            .with_color(color)
            .with_width(thickness)
            .with_line_cap(canvas::LineCap::Round),
    );
}

/// Small weekly trend line for the dashboard card. Baseline is zero.
#[derive(Debug, Clone)]
pub struct Sparkline {
    pub data: Vec<f32>,
    pub color: Color,
}

impl Sparkline {
    fn points(&self, w: f32, h: f32) -> Vec<Point> {
        let n = self.data.len();
        let max = self.data.iter().copied().fold(0.01_f32, f32::max);
        let pad = 2.0;
        self.data
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let x = i as f32 / (n.max(2) - 1) as f32 * w;
                Point::new(x, pad + (h - 2.0 * pad) * (1.0 - v.max(0.0) / max))
            })
            .collect()
    }
}

impl<Message: 'static> canvas::Program<Message> for Sparkline {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        if self.data.len() < 2 {
            return vec![frame.into_geometry()];
        }

        let (w, h) = (bounds.width, bounds.height);
        let points = self.points(w, h);

        let mut area = canvas::path::Builder::new();
        area.move_to(Point::new(0.0, h));
        for p in &points {
            area.line_to(*p);
        }
        area.line_to(Point::new(w, h));
        area.close();
        frame.fill(&area.build(), Color { a: 0.15, ..self.color });

        let mut line = canvas::path::Builder::new();
        for (i, p) in points.iter().enumerate() {
            if i == 0 {
                line.move_to(*p);
            } else {
                line.line_to(*p);
            }
        }
        frame.stroke(&line.build(), Stroke::default().with_color(self.color).with_width(1.5));

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> RingColors {
        RingColors {
            bg: Color::BLACK,
            label: Color::WHITE,
            text: Color::WHITE,
            track: Color::BLACK,
        }
    }

    #[test]
    fn test_carbon_ring_fraction() {
        let ring = ProgressRing::carbon(15.0, Color::WHITE, "Moderate", colors(), 1.0);
        assert!((ring.fraction() - 0.5).abs() < 1e-6);
        assert_eq!(ring.center, "15.0g");
        assert_eq!(ProgressRing::carbon(45.0, Color::WHITE, "High", colors(), 1.0).fraction(), 1.0);
    }

    #[test]
    fn test_zero_max_is_empty() {
        let mut ring = ProgressRing::carbon(5.0, Color::WHITE, "Low", colors(), 1.0);
        ring.max = 0.0;
        assert_eq!(ring.fraction(), 0.0);
    }

    #[test]
    fn test_sparkline_points_span_width() {
        let spark = Sparkline { data: vec![0.0, 5.0, 10.0], color: Color::WHITE };
        let pts = spark.points(100.0, 20.0);
        assert_eq!(pts[0].x, 0.0);
        assert_eq!(pts[2].x, 100.0);
        assert!(pts[2].y < pts[0].y);
    }
}
