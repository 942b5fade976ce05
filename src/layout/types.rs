use serde::Serialize;

use crate::flow::Step;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A step card placed at its top-left corner. `content` is `None` for the
/// synthetic slot that stands in for an empty branch or loop body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedStep<'a> {
    pub x: f32,
    pub y: f32,
    pub content: Option<&'a Step>,
}

impl<'a> PositionedStep<'a> {
    pub fn new(x: f32, y: f32, content: Option<&'a Step>) -> Self {
        Self { x, y, content }
    }

    pub fn name(&self) -> Option<&'a str> {
        self.content.map(|step| step.name.as_str())
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    /// Fills an empty branch or loop slot.
    Big,
    Small,
}

/// Where a step inserted through a button lands relative to `step_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepLocation {
    After,
    InsideTrueBranch,
    InsideFalseBranch,
    InsideLoop,
    InsideBranch { output: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionButton {
    pub x: f32,
    pub y: f32,
    pub kind: ButtonKind,
    pub step_name: String,
    pub location: StepLocation,
}

impl PositionButton {
    pub fn size(&self, small: f32, big: f32) -> f32 {
        match self.kind {
            ButtonKind::Small => small,
            ButtonKind::Big => big,
        }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

/// Branch caption. `x` is the left edge of the measured text and `y` its
/// vertical centre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionLabel {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub label: String,
}

impl PositionLabel {
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

/// Extent of a layout. `left_side` and `right_side` are distances from the
/// root card's horizontal centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub width: f32,
    pub height: f32,
    pub left_side: f32,
    pub right_side: f32,
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}
