//! Immutable builder for the connector path of a flow layout.
//!
//! Commands are stored in absolute coordinates so drawers built in separate
//! local frames can be shifted with [`SvgDrawer::offset`] and concatenated
//! with [`SvgDrawer::merge`]. Every builder method consumes the drawer and
//! returns the extended one.

use std::fmt::Write as _;

use super::types::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    fn vector(self) -> (f32, f32) {
        match self {
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
        }
    }

    fn reversed(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Quarter circle ending at `to`; `clockwise` is the SVG sweep flag.
    Arc {
        radius: f32,
        clockwise: bool,
        to: Point,
    },
}

impl PathCommand {
    fn end(&self) -> Point {
        match self {
            Self::MoveTo(p) | Self::LineTo(p) => *p,
            Self::Arc { to, .. } => *to,
        }
    }

    fn offset(self, dx: f32, dy: f32) -> Self {
        match self {
            Self::MoveTo(p) => Self::MoveTo(p.offset(dx, dy)),
            Self::LineTo(p) => Self::LineTo(p.offset(dx, dy)),
            Self::Arc {
                radius,
                clockwise,
                to,
            } => Self::Arc {
                radius,
                clockwise,
                to: to.offset(dx, dy),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Extent {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Extent {
    fn at(p: Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    fn include(self, p: Point) -> Self {
        Self {
            min_x: self.min_x.min(p.x),
            min_y: self.min_y.min(p.y),
            max_x: self.max_x.max(p.x),
            max_y: self.max_y.max(p.y),
        }
    }

    fn union(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvgDrawer {
    cursor: Point,
    heading: Heading,
    commands: Vec<PathCommand>,
    extent: Option<Extent>,
    arc_radius: f32,
    arrow_width: f32,
    arrow_height: f32,
}

impl Default for SvgDrawer {
    fn default() -> Self {
        Self::empty()
    }
}

impl SvgDrawer {
    pub fn empty() -> Self {
        Self::with_style(15.0, 8.0, 6.0)
    }

    /// Empty drawer using the given arc radius and arrowhead size.
    pub fn with_style(arc_radius: f32, arrow_width: f32, arrow_height: f32) -> Self {
        Self {
            cursor: Point::default(),
            heading: Heading::Down,
            commands: Vec::new(),
            extent: None,
            arc_radius,
            arrow_width,
            arrow_height,
        }
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Relocates the cursor without drawing.
    pub fn move_to(mut self, x: f32, y: f32) -> Self {
        let target = Point::new(x, y);
        if let Some(PathCommand::MoveTo(last)) = self.commands.last_mut() {
            *last = target;
        } else {
            self.commands.push(PathCommand::MoveTo(target));
        }
        self.cursor = target;
        self
    }

    pub fn draw_horizontal_line(self, dx: f32) -> Self {
        let heading = if dx < 0.0 { Heading::Left } else { Heading::Right };
        let to = self.cursor.offset(dx, 0.0);
        self.line_to(to, heading)
    }

    pub fn draw_vertical_line(self, dy: f32) -> Self {
        let heading = if dy < 0.0 { Heading::Up } else { Heading::Down };
        let to = self.cursor.offset(0.0, dy);
        self.line_to(to, heading)
    }

    /// Quarter arc of the configured radius towards `left`/`up` on the two
    /// axes. Turns a vertical heading horizontal and vice versa.
    pub fn draw_arc(mut self, left: bool, up: bool) -> Self {
        let r = self.arc_radius;
        let dx = if left { -r } else { r };
        let dy = if up { -r } else { r };
        let next_heading = if self.heading.is_vertical() {
            if left { Heading::Left } else { Heading::Right }
        } else if up {
            Heading::Up
        } else {
            Heading::Down
        };
        let (hx, hy) = self.heading.vector();
        let (nx, ny) = next_heading.vector();
        // Screen y grows downward, so a positive cross product is a clockwise turn.
        let clockwise = hx * ny - hy * nx > 0.0;
        let to = self.cursor.offset(dx, dy);
        self.ensure_started();
        self.commands.push(PathCommand::Arc {
            radius: r,
            clockwise,
            to,
        });
        self.extend_to(to);
        self.cursor = to;
        self.heading = next_heading;
        self
    }

    /// Arrowhead with its tip at the cursor, pointing along the direction of
    /// travel, or against it when `reversed` is set.
    pub fn arrow(mut self, reversed: bool) -> Self {
        let heading = if reversed {
            self.heading.reversed()
        } else {
            self.heading
        };
        let tip = self.cursor;
        let (hx, hy) = heading.vector();
        let back = Point::new(tip.x - hx * self.arrow_height, tip.y - hy * self.arrow_height);
        let half = self.arrow_width / 2.0;
        let left_wing = Point::new(back.x - hy * half, back.y + hx * half);
        let right_wing = Point::new(back.x + hy * half, back.y - hx * half);
        self.commands.push(PathCommand::MoveTo(left_wing));
        self.commands.push(PathCommand::LineTo(tip));
        self.commands.push(PathCommand::LineTo(right_wing));
        self.commands.push(PathCommand::MoveTo(tip));
        self.extend_to(left_wing);
        self.extend_to(right_wing);
        self.extend_to(tip);
        self
    }

    /// Concatenates `other`'s path. Neither drawer is shifted; an empty drawer
    /// on either side leaves the other unchanged.
    pub fn merge(mut self, other: SvgDrawer) -> Self {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        self.extent = match (self.extent, other.extent) {
            (Some(a), Some(b)) => Some(a.union(b)),
            (a, b) => a.or(b),
        };
        self.commands.extend(other.commands);
        self.cursor = other.cursor;
        self.heading = other.heading;
        self
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            cursor: self.cursor.offset(dx, dy),
            commands: self
                .commands
                .into_iter()
                .map(|command| command.offset(dx, dy))
                .collect(),
            extent: self.extent.map(|extent| extent.offset(dx, dy)),
            ..self
        }
    }

    /// `f32::INFINITY` when nothing has been drawn, so it folds neutrally
    /// into a minimum.
    pub fn minimum_x(&self) -> f32 {
        self.extent.map_or(f32::INFINITY, |e| e.min_x)
    }

    pub fn maximum_x(&self) -> f32 {
        self.extent.map_or(f32::NEG_INFINITY, |e| e.max_x)
    }

    pub fn minimum_y(&self) -> f32 {
        self.extent.map_or(f32::INFINITY, |e| e.min_y)
    }

    pub fn maximum_y(&self) -> f32 {
        self.extent.map_or(f32::NEG_INFINITY, |e| e.max_y)
    }

    pub fn has_extent(&self) -> bool {
        self.extent.is_some()
    }

    /// SVG path data (`d` attribute) for everything drawn so far.
    pub fn to_path_data(&self) -> String {
        let mut d = String::new();
        for command in &self.commands {
            if !d.is_empty() {
                d.push(' ');
            }
            let _ = match command {
                PathCommand::MoveTo(p) => write!(d, "M {:.2} {:.2}", p.x, p.y),
                PathCommand::LineTo(p) => write!(d, "L {:.2} {:.2}", p.x, p.y),
                PathCommand::Arc {
                    radius,
                    clockwise,
                    to,
                } => write!(
                    d,
                    "A {radius:.2} {radius:.2} 0 0 {} {:.2} {:.2}",
                    u8::from(*clockwise),
                    to.x,
                    to.y
                ),
            };
        }
        d
    }

    fn line_to(mut self, to: Point, heading: Heading) -> Self {
        if to == self.cursor && !self.commands.is_empty() {
            self.heading = heading;
            return self;
        }
        self.ensure_started();
        self.commands.push(PathCommand::LineTo(to));
        self.extend_to(to);
        self.cursor = to;
        self.heading = heading;
        self
    }

    fn ensure_started(&mut self) {
        let needs_move = match self.commands.last() {
            None => true,
            Some(last) => last.end() != self.cursor,
        };
        if needs_move {
            self.commands.push(PathCommand::MoveTo(self.cursor));
        }
        let start = self.cursor;
        self.extend_to(start);
    }

    fn extend_to(&mut self, p: Point) {
        self.extent = Some(match self.extent {
            Some(extent) => extent.include(p),
            None => Extent::at(p),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SvgDrawer {
        SvgDrawer::empty()
            .move_to(10.0, 20.0)
            .draw_vertical_line(30.0)
            .draw_arc(false, false)
            .draw_horizontal_line(40.0)
            .arrow(false)
    }

    #[test]
    fn empty_drawer_has_neutral_bounds() {
        let drawer = SvgDrawer::empty();
        assert!(drawer.is_empty());
        assert_eq!(drawer.minimum_x(), f32::INFINITY);
        assert_eq!(drawer.maximum_y(), f32::NEG_INFINITY);
    }

    #[test]
    fn lines_track_cursor_and_bounds() {
        let drawer = SvgDrawer::empty()
            .move_to(5.0, 5.0)
            .draw_vertical_line(10.0)
            .draw_horizontal_line(-20.0);
        assert_eq!(drawer.cursor(), Point::new(-15.0, 15.0));
        assert_eq!(drawer.heading(), Heading::Left);
        assert_eq!(drawer.minimum_x(), -15.0);
        assert_eq!(drawer.maximum_x(), 5.0);
        assert_eq!(drawer.minimum_y(), 5.0);
        assert_eq!(drawer.maximum_y(), 15.0);
    }

    #[test]
    fn move_alone_does_not_touch_bounds() {
        let drawer = SvgDrawer::empty().move_to(100.0, 100.0).move_to(3.0, 4.0);
        assert!(!drawer.has_extent());
        assert_eq!(drawer.commands(), &[PathCommand::MoveTo(Point::new(3.0, 4.0))]);
    }

    #[test]
    fn arc_sweep_follows_turn_direction() {
        // Heading down and turning right is a counter-clockwise turn on screen.
        let right = SvgDrawer::empty().draw_vertical_line(10.0).draw_arc(false, false);
        let Some(PathCommand::Arc { clockwise, to, .. }) = right.commands().last() else {
            panic!("expected arc");
        };
        assert!(!clockwise);
        assert_eq!(*to, Point::new(15.0, 25.0));
        assert_eq!(right.heading(), Heading::Right);

        let left = SvgDrawer::empty().draw_vertical_line(10.0).draw_arc(true, false);
        let Some(PathCommand::Arc { clockwise, .. }) = left.commands().last() else {
            panic!("expected arc");
        };
        assert!(clockwise);

        // Heading right and turning down again is clockwise.
        let back_down = right.draw_horizontal_line(5.0).draw_arc(false, false);
        let Some(PathCommand::Arc { clockwise, .. }) = back_down.commands().last() else {
            panic!("expected arc");
        };
        assert!(clockwise);
        assert_eq!(back_down.heading(), Heading::Down);
    }

    #[test]
    fn arrow_points_along_heading() {
        let down = SvgDrawer::empty().draw_vertical_line(20.0).arrow(false);
        // Wings sit above the tip when travelling down.
        assert_eq!(down.minimum_y(), 0.0);
        assert_eq!(down.maximum_y(), 20.0);
        assert_eq!(down.minimum_x(), -4.0);
        assert_eq!(down.maximum_x(), 4.0);
        assert_eq!(down.cursor(), Point::new(0.0, 20.0));

        let reversed = SvgDrawer::empty().draw_vertical_line(20.0).arrow(true);
        assert_eq!(reversed.maximum_y(), 26.0);
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let drawer = sample();
        assert_eq!(SvgDrawer::empty().merge(drawer.clone()), drawer);
        assert_eq!(drawer.clone().merge(SvgDrawer::empty()), drawer);
    }

    #[test]
    fn merge_unions_bounds_and_keeps_both_paths() {
        let a = SvgDrawer::empty().draw_vertical_line(10.0);
        let b = SvgDrawer::empty().move_to(50.0, -5.0).draw_horizontal_line(10.0);
        let merged = a.clone().merge(b.clone());
        assert_eq!(merged.commands().len(), a.commands().len() + b.commands().len());
        assert_eq!(merged.minimum_x(), 0.0);
        assert_eq!(merged.maximum_x(), 60.0);
        assert_eq!(merged.minimum_y(), -5.0);
        assert_eq!(merged.maximum_y(), 10.0);
    }

    #[test]
    fn offsets_compose_linearly() {
        let drawer = sample();
        let twice = drawer.clone().offset(3.0, -7.0).offset(10.0, 2.0);
        let once = drawer.offset(13.0, -5.0);
        assert_eq!(twice, once);
    }

    #[test]
    fn path_data_uses_absolute_commands() {
        let drawer = SvgDrawer::empty().move_to(1.0, 2.0).draw_vertical_line(3.0);
        assert_eq!(drawer.to_path_data(), "M 1.00 2.00 L 1.00 5.00");
    }
}
