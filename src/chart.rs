use iced::mouse;
use iced::widget::canvas::{self, Event, Frame, Geometry, Path, Stroke, Text};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

const PAD_LEFT: f32 = 36.0;
const PAD_RIGHT: f32 = 8.0;
const PAD_TOP: f32 = 22.0;
const PAD_BOTTOM: f32 = 20.0;

/// Hover state: the category index under the cursor.
#[derive(Debug, Clone, Default)]
pub struct ChartState {
    pub hover_idx: Option<usize>,
}

/// Colors the charts need from the active palette.
#[derive(Debug, Clone, Copy)]
pub struct ChartColors {
    pub bg: Color,
    pub border: Color,
    pub grid: Color,
    pub label: Color,
    pub text: Color,
}

/// One labelled category with its value and color.
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    pub label: String,
    pub value: f32,
    pub color: Color,
}

impl Datum {
    pub fn new(label: impl Into<String>, value: f32, color: Color) -> Self {
        Self {
            label: label.into(),
            value,
            color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartKind {
    /// Vertical bars, one per datum.
    Bars,
    /// Points joined by a line, each dot in its datum's color.
    Line { line_color: Color },
}

/// Category chart drawn via iced Canvas with hover tooltip support.
#[derive(Debug, Clone)]
pub struct CategoryChart {
    pub kind: ChartKind,
    pub data: Vec<Datum>,
    pub y_max: f32,
    pub title: String,
    /// Unit suffix for the tooltip (e.g. "g", "%").
    pub unit: String,
    pub colors: ChartColors,
    /// 0.0 to 1.0; values are drawn scaled by this while growing in.
    pub reveal: f32,
    pub text_scale: f32,
}

impl CategoryChart {
    fn x_for(&self, idx: usize, chart_w: f32) -> f32 {
        let n = self.data.len().max(1) as f32;
        match self.kind {
            ChartKind::Bars => PAD_LEFT + chart_w * (idx as f32 + 0.5) / n,
            ChartKind::Line { .. } if self.data.len() >= 2 => {
                PAD_LEFT + chart_w * idx as f32 / (self.data.len() - 1) as f32
            }
            ChartKind::Line { .. } => PAD_LEFT + chart_w / 2.0,
        }
    }

    fn index_at(&self, x: f32, chart_w: f32) -> Option<usize> {
        let n = self.data.len();
        if n == 0 || chart_w <= 0.0 || x < PAD_LEFT || x > PAD_LEFT + chart_w {
            return None;
        }
        let frac = (x - PAD_LEFT) / chart_w;
        let idx = match self.kind {
            ChartKind::Bars => (frac * n as f32).floor() as usize,
            ChartKind::Line { .. } => (frac * n.saturating_sub(1) as f32).round() as usize,
        };
        Some(idx.min(n - 1))
    }
}

impl<Message: 'static> canvas::Program<Message> for CategoryChart {
    type State = ChartState;

    fn update(
        &self,
        state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let chart_w = bounds.width - PAD_LEFT - PAD_RIGHT;
        let new_idx = match &event {
            Event::Mouse(mouse::Event::CursorMoved { .. }) => cursor
                .position_in(bounds)
                .and_then(|pos| self.index_at(pos.x, chart_w)),
            Event::Mouse(mouse::Event::CursorLeft) => None,
            _ => return (canvas::event::Status::Ignored, None),
        };
        if new_idx != state.hover_idx {
            state.hover_idx = new_idx;
        }
        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let c = &self.colors;
        let ts = self.text_scale;

        let chart_w = bounds.width - PAD_LEFT - PAD_RIGHT;
        let chart_h = bounds.height - PAD_TOP - PAD_BOTTOM;
        if chart_w <= 0.0 || chart_h <= 0.0 {
            return vec![frame.into_geometry()];
        }

        frame.fill(&Path::rectangle(Point::ORIGIN, bounds.size()), c.bg);
        let border = Path::rectangle(Point::new(0.5, 0.5), Size::new(bounds.width - 1.0, bounds.height - 1.0));
        frame.stroke(&border, Stroke::default().with_color(c.border).with_width(0.5));

        let mut title = Text::from(self.title.clone());
        title.position = Point::new(PAD_LEFT, 3.0);
        title.color = c.text;
        title.size = (12.0 * ts).into();
        frame.fill_text(title);

        // Y grid on round tick values
        let y_max = self.y_max.max(f32::EPSILON);
        let step = nice_tick_step(y_max, 5);
        let mut val = 0.0;
        while val <= y_max + step * 0.001 {
            let y = PAD_TOP + chart_h * (1.0 - val / y_max);
            let grid = Path::line(Point::new(PAD_LEFT, y), Point::new(PAD_LEFT + chart_w, y));
            frame.stroke(&grid, Stroke::default().with_color(c.grid).with_width(1.0));

            let mut label = Text::from(if step >= 1.0 { format!("{val:.0}") } else { format!("{val:.1}") });
            label.position = Point::new(4.0, y - 5.0);
            label.color = c.label;
            label.size = (10.0 * ts).into();
            frame.fill_text(label);
            val += step;
        }

        let reveal = self.reveal.clamp(0.0, 1.0);
        let y_of = |v: f32| PAD_TOP + chart_h * (1.0 - (v * reveal / y_max).clamp(0.0, 1.0));
        let n = self.data.len();

        match self.kind {
            ChartKind::Bars => {
                let slot = chart_w / n.max(1) as f32;
                let bar_w = (slot * 0.6).max(2.0);
                for (i, d) in self.data.iter().enumerate() {
                    let x = self.x_for(i, chart_w) - bar_w / 2.0;
                    let top = y_of(d.value);
                    let h = PAD_TOP + chart_h - top;
                    if h > 0.0 {
                        let alpha = if state.hover_idx == Some(i) { 1.0 } else { 0.85 };
                        frame.fill(
                            &Path::rectangle(Point::new(x, top), Size::new(bar_w, h)),
                            Color { a: alpha, ..d.color },
                        );
                    }
                }
            }
            ChartKind::Line { line_color } => {
                if n >= 2 {
                    let mut builder = canvas::path::Builder::new();
                    for (i, d) in self.data.iter().enumerate() {
                        let p = Point::new(self.x_for(i, chart_w), y_of(d.value));
                        if i == 0 {
                            builder.move_to(p);
                        } else {
                            builder.line_to(p);
                        }
                    }
                    let path = builder.build();
                    let glow = Color::from_rgba(line_color.r, line_color.g, line_color.b, 0.2);
                    frame.stroke(&path, Stroke::default().with_color(glow).with_width(4.0));
                    frame.stroke(&path, Stroke::default().with_color(line_color).with_width(2.0));
                }
                for (i, d) in self.data.iter().enumerate() {
                    let dot = Path::circle(Point::new(self.x_for(i, chart_w), y_of(d.value)), 4.0);
                    frame.fill(&dot, d.color);
                }
            }
        }

        // X labels, thinned so they do not overlap.
        let every = ((n as f32 * 42.0 * ts) / chart_w).ceil().max(1.0) as usize;
        for (i, d) in self.data.iter().enumerate().filter(|(i, _)| i % every == 0) {
            let mut label = Text::from(d.label.clone());
            label.position = Point::new(self.x_for(i, chart_w), PAD_TOP + chart_h + 4.0);
            label.color = c.label;
            label.size = (9.0 * ts).into();
            label.horizontal_alignment = iced::alignment::Horizontal::Center;
            frame.fill_text(label);
        }

        if let Some(idx) = state.hover_idx.filter(|i| *i < n) {
            let d = &self.data[idx];
            let x = self.x_for(idx, chart_w);
            let crosshair = Path::line(Point::new(x, PAD_TOP), Point::new(x, PAD_TOP + chart_h));
            frame.stroke(
                &crosshair,
                Stroke::default()
                    .with_color(Color::from_rgba(c.text.r, c.text.g, c.text.b, 0.35))
                    .with_width(1.0),
            );

            let tooltip = format!("{}: {}{}", d.label, format_value(d.value), self.unit);
            let text_w = tooltip.chars().count() as f32 * 6.6 * ts + 12.0;
            let tx = (x + 10.0).min(PAD_LEFT + chart_w - text_w).max(PAD_LEFT);
            let ty = PAD_TOP + 4.0;
            let box_path = Path::rectangle(Point::new(tx - 4.0, ty - 2.0), Size::new(text_w, 18.0 * ts));
            frame.fill(&box_path, Color::from_rgba(c.bg.r, c.bg.g, c.bg.b, 0.95));
            frame.stroke(&box_path, Stroke::default().with_color(d.color).with_width(0.8));

            let mut tt = Text::from(tooltip);
            tt.position = Point::new(tx, ty);
            tt.color = c.text;
            tt.size = (11.0 * ts).into();
            frame.fill_text(tt);
        }

        vec![frame.into_geometry()]
    }
}

fn format_value(v: f32) -> String {
    if v.fract().abs() < f32::EPSILON {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

/// Pick a "nice" tick step (1, 2, 5, 10, 20, 50, …) so that the range
/// is divided into at most `max_ticks` intervals.
pub fn nice_tick_step(range: f32, max_ticks: usize) -> f32 {
    let rough = range / max_ticks.max(1) as f32;
    let mag = 10f32.powf(rough.log10().floor());
    let norm = rough / mag;
    let nice = if norm <= 1.0 { 1.0 } else if norm <= 2.0 { 2.0 } else if norm <= 5.0 { 5.0 } else { 10.0 };
    (nice * mag).max(f32::EPSILON)
}

/// Upper bound for a chart axis: the data max rounded up to a tick, at least `floor`.
pub fn axis_max(values: impl IntoIterator<Item = f32>, floor: f32) -> f32 {
    let max = values.into_iter().fold(floor, f32::max);
    let step = nice_tick_step(max, 5);
    (max / step).ceil() * step
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(kind: ChartKind, n: usize) -> CategoryChart {
        let colors = ChartColors {
            bg: Color::BLACK,
            border: Color::BLACK,
            grid: Color::BLACK,
            label: Color::WHITE,
            text: Color::WHITE,
        };
        CategoryChart {
            kind,
            data: (0..n).map(|i| Datum::new(format!("{i}"), i as f32, Color::WHITE)).collect(),
            y_max: 10.0,
            title: String::new(),
            unit: String::new(),
            colors,
            reveal: 1.0,
            text_scale: 1.0,
        }
    }

    #[test]
    fn test_nice_tick_step() {
        assert_eq!(nice_tick_step(100.0, 5), 20.0);
        assert_eq!(nice_tick_step(30.0, 5), 10.0);
        assert_eq!(nice_tick_step(8.0, 5), 2.0);
    }

    #[test]
    fn test_axis_max_rounds_up() {
        assert_eq!(axis_max([3.2, 7.9], 1.0), 8.0);
        assert_eq!(axis_max([], 100.0), 100.0);
    }

    #[test]
    fn test_bar_hit_testing() {
        let c = chart(ChartKind::Bars, 7);
        assert_eq!(c.index_at(PAD_LEFT + 1.0, 70.0), Some(0));
        assert_eq!(c.index_at(PAD_LEFT + 69.0, 70.0), Some(6));
        assert_eq!(c.index_at(PAD_LEFT - 1.0, 70.0), None);
    }

    #[test]
    fn test_line_hit_testing_snaps() {
        let c = chart(ChartKind::Line { line_color: Color::WHITE }, 5);
        assert_eq!(c.index_at(PAD_LEFT + 24.0, 100.0), Some(1));
        assert_eq!(c.index_at(PAD_LEFT + 100.0, 100.0), Some(4));
        assert!(chart(ChartKind::Bars, 0).index_at(PAD_LEFT + 1.0, 100.0).is_none());
    }
}
