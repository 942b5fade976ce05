mod branch;
mod connector;
mod loop_on_items;
pub mod svg_drawer;
mod text;
pub(crate) mod types;
pub use svg_drawer::{Heading, PathCommand, SvgDrawer};
pub use types::*;

use branch::{BranchOutput, draw_branches};
use connector::draw_sequential_connector;
use loop_on_items::draw_loop;

use crate::config::LayoutConfig;
use crate::flow::{Step, StepKind};
use crate::theme::Theme;

/// Everything a layout pass needs besides the step being placed.
#[derive(Debug, Clone, Copy)]
pub struct DrawContext<'c> {
    pub config: &'c LayoutConfig,
    pub theme: &'c Theme,
    /// Name of the final step of the trigger's chain. Its outgoing connector
    /// is collapsed into a bare "add after" button.
    pub last_step_name: Option<&'c str>,
}

impl<'c> DrawContext<'c> {
    pub fn new(config: &'c LayoutConfig, theme: &'c Theme) -> Self {
        Self {
            config,
            theme,
            last_step_name: None,
        }
    }

    /// Context for laying out the flow that starts at `trigger`.
    pub fn for_trigger(trigger: &'c Step, config: &'c LayoutConfig, theme: &'c Theme) -> Self {
        Self {
            last_step_name: Some(trigger.last_in_chain().name.as_str()),
            ..Self::new(config, theme)
        }
    }

    pub fn is_last_step(&self, step: &Step) -> bool {
        self.last_step_name == Some(step.name.as_str())
    }

    pub(crate) fn svg(&self) -> SvgDrawer {
        SvgDrawer::with_style(
            self.config.arc_length,
            self.config.arrow_width,
            self.config.arrow_height,
        )
    }
}

/// Positioned steps, connector path, buttons and labels of a (sub)flow.
///
/// A drawer is a value: every method that looks like a mutation consumes it
/// and returns the updated drawer.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDrawer<'a> {
    pub steps: Vec<PositionedStep<'a>>,
    pub svg: SvgDrawer,
    pub buttons: Vec<PositionButton>,
    pub labels: Vec<PositionLabel>,
    card_width: f32,
    card_height: f32,
}

impl<'a> FlowDrawer<'a> {
    /// A drawer with nothing in it.
    pub fn blank(ctx: &DrawContext<'_>) -> Self {
        Self {
            steps: Vec::new(),
            svg: ctx.svg(),
            buttons: Vec::new(),
            labels: Vec::new(),
            card_width: ctx.config.card_width,
            card_height: ctx.config.card_height_with_padding(),
        }
    }

    /// Lays out `step` and everything that follows it, with the card of
    /// `step` at the local origin. `None` yields a single empty slot.
    pub fn construct(step: Option<&'a Step>, ctx: &DrawContext<'_>) -> Self {
        let Some(step) = step else {
            return Self::blank(ctx).append_step(PositionedStep::new(0.0, 0.0, None));
        };
        let drawer = Self::blank(ctx).append_step(PositionedStep::new(0.0, 0.0, Some(step)));

        let (piece, child_height) = match &step.kind {
            StepKind::Branch {
                on_success_action,
                on_failure_action,
            } => {
                let outputs = vec![
                    BranchOutput {
                        label: "True".to_string(),
                        location: StepLocation::InsideTrueBranch,
                        child: on_success_action.as_deref(),
                    },
                    BranchOutput {
                        label: "False".to_string(),
                        location: StepLocation::InsideFalseBranch,
                        child: on_failure_action.as_deref(),
                    },
                ];
                draw_branches(step, outputs, ctx)
            }
            StepKind::Router { children } => {
                let outputs = children
                    .iter()
                    .map(|(output, child)| BranchOutput {
                        label: output.clone(),
                        location: StepLocation::InsideBranch {
                            output: output.clone(),
                        },
                        child: child.as_deref(),
                    })
                    .collect();
                draw_branches(step, outputs, ctx)
            }
            StepKind::LoopOnItems { first_loop_action } => {
                draw_loop(step, first_loop_action.as_deref(), ctx)
            }
            StepKind::Trigger | StepKind::Action => draw_sequential_connector(step, ctx),
        };
        let drawer = drawer.merge_child(piece);

        match step.next_action.as_deref() {
            Some(next) => {
                let next = Self::construct(Some(next), ctx).offset(0.0, child_height);
                drawer.merge_child(next)
            }
            None => drawer,
        }
    }

    pub fn append_step(mut self, step: PositionedStep<'a>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn append_svg(mut self, svg: SvgDrawer) -> Self {
        self.svg = self.svg.merge(svg);
        self
    }

    pub fn append_button(mut self, button: PositionButton) -> Self {
        self.buttons.push(button);
        self
    }

    /// Adds a caption horizontally centred on `center`.
    pub fn append_label(mut self, label: &str, center: Point, ctx: &DrawContext<'_>) -> Self {
        let width = text::label_width(label, ctx.theme, ctx.config);
        self.labels.push(PositionLabel {
            x: center.x - width / 2.0,
            y: center.y,
            width,
            label: label.to_string(),
        });
        self
    }

    /// Appends everything in `child`. The child is expected to be offset into
    /// this drawer's frame already.
    pub fn merge_child(mut self, child: FlowDrawer<'a>) -> Self {
        self.steps.extend(child.steps);
        self.svg = self.svg.merge(child.svg);
        self.buttons.extend(child.buttons);
        self.labels.extend(child.labels);
        self
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            steps: self.steps.into_iter().map(|s| s.offset(dx, dy)).collect(),
            svg: self.svg.offset(dx, dy),
            buttons: self.buttons.into_iter().map(|b| b.offset(dx, dy)).collect(),
            labels: self.labels.into_iter().map(|l| l.offset(dx, dy)).collect(),
            ..self
        }
    }

    /// Extent of all cards and connectors. Sides are measured from the
    /// centre of the first card.
    pub fn bounding_box(&self) -> BoundingBox {
        let card_extents = self
            .steps
            .iter()
            .map(|s| (s.x, s.y, s.x + self.card_width, s.y + self.card_height));
        let (mut min_x, mut min_y, mut max_x, mut max_y) = card_extents.fold(
            (
                self.svg.minimum_x(),
                self.svg.minimum_y(),
                self.svg.maximum_x(),
                self.svg.maximum_y(),
            ),
            |(a, b, c, d), (x0, y0, x1, y1)| (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
        );
        if !min_x.is_finite() {
            (min_x, min_y, max_x, max_y) = (0.0, 0.0, 0.0, 0.0);
        }
        let root_center = self
            .steps
            .first()
            .map_or(self.card_width / 2.0, |s| s.x + self.card_width / 2.0);
        BoundingBox {
            width: max_x - min_x,
            height: max_y - min_y,
            left_side: root_center - min_x,
            right_side: max_x - root_center,
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn card_width(&self) -> f32 {
        self.card_width
    }

    pub fn card_height(&self) -> f32 {
        self.card_height
    }

    pub fn step(&self, name: &str) -> Option<&PositionedStep<'a>> {
        self.steps.iter().find(|s| s.name() == Some(name))
    }

    pub fn buttons_for<'b>(
        &'b self,
        step_name: &'b str,
    ) -> impl Iterator<Item = &'b PositionButton> {
        self.buttons.iter().filter(move |b| b.step_name == step_name)
    }
}

/// Lays out the flow starting at `trigger`.
pub fn compute_flow_layout<'a>(
    trigger: &'a Step,
    theme: &Theme,
    config: &LayoutConfig,
) -> FlowDrawer<'a> {
    let ctx = DrawContext::for_trigger(trigger, config, theme);
    let drawer = FlowDrawer::construct(Some(trigger), &ctx);
    let bbox = drawer.bounding_box();
    tracing::debug!(
        trigger = %trigger.name,
        steps = drawer.steps.len(),
        buttons = drawer.buttons.len(),
        width = bbox.width,
        height = bbox.height,
        "computed flow layout"
    );
    drawer
}
