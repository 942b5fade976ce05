//! Side-by-side layout of the chains owned by a branch or router step.
//!
//! Every output gets a slot: its chain is laid out on its own, the slots are
//! packed left to right with a fixed gutter and the packed row is centred
//! under the parent card. Each slot is entered through a labelled connector
//! and left through a connector that meets the others at a shared join point
//! below the tallest slot.

use crate::flow::Step;

use super::connector::{button_at, draw_after_composite, draw_s_curve};
use super::text::label_width;
use super::types::{BoundingBox, ButtonKind, Point, StepLocation};
use super::{DrawContext, FlowDrawer};

/// One output of a branching step.
#[derive(Debug, Clone)]
pub(super) struct BranchOutput<'a> {
    pub label: String,
    pub location: StepLocation,
    pub child: Option<&'a Step>,
}

/// Lays out the outputs of `step` below its card. The returned piece does not
/// contain the parent card itself; the height is where the next step starts.
pub(super) fn draw_branches<'a>(
    step: &Step,
    outputs: Vec<BranchOutput<'a>>,
    ctx: &DrawContext<'_>,
) -> (FlowDrawer<'a>, f32) {
    let config = ctx.config;
    let parent_x = config.card_center_x();
    let parent_bottom = config.card_height_with_padding();
    let step_to_child = config.vertical_space_between_step_and_child;
    let radius = config.arc_length;
    let slot_top = parent_bottom + step_to_child;
    let entry_bend_y = parent_bottom + step_to_child / 2.0;

    let children: Vec<FlowDrawer<'a>> = outputs
        .iter()
        .map(|output| FlowDrawer::construct(output.child, ctx))
        .collect();
    let boxes: Vec<BoundingBox> = children.iter().map(FlowDrawer::bounding_box).collect();
    let centers = sibling_centers(&boxes, parent_x, config.horizontal_space_between_branches);
    let maximum_height = boxes.iter().map(|b| b.max_y).fold(0.0, f32::max);
    let join_bend_y = slot_top + maximum_height + step_to_child / 2.0;
    let join = Point::new(parent_x, join_bend_y + radius);

    let mut piece = FlowDrawer::blank(ctx);
    for ((output, child), center_x) in outputs.into_iter().zip(children).zip(centers) {
        let is_empty = output.child.is_none();
        let slot_entry = Point::new(center_x, slot_top);

        let mut entry = draw_s_curve(
            ctx.svg(),
            Point::new(parent_x, parent_bottom),
            slot_entry,
            entry_bend_y,
            radius,
        );
        let button = if is_empty {
            let center = Point::new(center_x, slot_top + config.big_button_size / 2.0);
            button_at(center, ButtonKind::Big, step, output.location, ctx)
        } else {
            entry = entry.arrow(false);
            let center = Point::new(center_x, slot_top - (step_to_child / 2.0 - radius) / 2.0);
            button_at(center, ButtonKind::Small, step, output.location, ctx)
        };
        // A slot straight under the parent has no horizontal run to caption,
        // so its label goes beside the vertical connector instead of on it.
        let label_x = if (center_x - parent_x).abs() < f32::EPSILON {
            center_x + label_width(&output.label, ctx.theme, config) / 2.0 + config.label_gap
        } else {
            center_x
        };
        let label_center = Point::new(
            label_x,
            entry_bend_y - config.label_gap - config.label_font_size / 2.0,
        );

        // The exit starts under the slot's content: below the big button for
        // an empty slot, otherwise at the bottom of the laid out chain.
        let child_bottom = if is_empty {
            config.big_button_size
        } else {
            child.bounding_box().max_y
        };
        let exit = draw_s_curve(
            ctx.svg(),
            Point::new(center_x, slot_top + child_bottom),
            join,
            join_bend_y,
            radius,
        );

        piece = piece
            .append_svg(entry)
            .append_svg(exit)
            .append_button(button)
            .append_label(&output.label, label_center, ctx)
            .merge_child(child.offset(center_x - parent_x, slot_top));
    }

    let (after, height) = draw_after_composite(step, join, ctx);
    (piece.merge_child(after), height)
}

/// Horizontal centres of the slot roots so that the packed row of slots is
/// centred on `parent_x`.
pub(super) fn sibling_centers(boxes: &[BoundingBox], parent_x: f32, gutter: f32) -> Vec<f32> {
    let total_width = boxes.iter().map(|b| b.width).sum::<f32>()
        + gutter * boxes.len().saturating_sub(1) as f32;
    let mut left = parent_x - total_width / 2.0;
    boxes
        .iter()
        .map(|b| {
            let center = left + b.left_side.abs();
            left += b.width + gutter;
            center
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::theme::Theme;

    fn bbox(left_side: f32, right_side: f32) -> BoundingBox {
        BoundingBox {
            width: left_side + right_side,
            height: 100.0,
            left_side,
            right_side,
            min_x: -left_side,
            min_y: 0.0,
            max_x: right_side,
            max_y: 100.0,
        }
    }

    #[test]
    fn packed_slots_are_centred_under_parent() {
        let cases = [
            vec![bbox(130.0, 130.0), bbox(130.0, 130.0)],
            vec![bbox(130.0, 130.0), bbox(475.0, 130.0)],
            vec![bbox(300.0, 130.0), bbox(130.0, 520.0), bbox(130.0, 130.0)],
        ];
        for boxes in cases {
            let centers = sibling_centers(&boxes, 130.0, 80.0);
            let first = &boxes[0];
            let last = boxes.last().unwrap();
            let left_edge = centers[0] - first.left_side;
            let right_edge = centers[centers.len() - 1] + last.right_side;
            assert!(((left_edge + right_edge) / 2.0 - 130.0).abs() < 1e-3);
            for pair in centers.windows(2).zip(boxes.windows(2)) {
                let (c, b) = pair;
                let gap = (c[1] - b[1].left_side) - (c[0] + b[0].right_side);
                assert!((gap - 80.0).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn middle_router_label_clears_the_vertical_connector() {
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        let theme = Theme::modern();
        let ctx = DrawContext::new(&config, &theme);
        let step = Step::router("router", [("a", None::<Step>), ("b", None), ("c", None)]);
        let outputs = ["a", "b", "c"]
            .map(|output| BranchOutput {
                label: output.to_string(),
                location: StepLocation::InsideBranch {
                    output: output.to_string(),
                },
                child: None,
            })
            .to_vec();
        let (piece, _) = draw_branches(&step, outputs, &ctx);

        let parent_x = config.card_center_x();
        let middle = piece.labels.iter().find(|l| l.label == "b").unwrap();
        assert!(middle.x >= parent_x + config.label_gap - 1e-3);
        for side in piece.labels.iter().filter(|l| l.label != "b") {
            assert!(side.x > parent_x || side.x + side.width < parent_x, "{side:?}");
        }
    }

    #[test]
    fn empty_and_filled_slots_get_different_buttons() {
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        let theme = Theme::modern();
        let ctx = DrawContext::new(&config, &theme);
        let step = Step::branch("check", None, None);
        let yes = Step::action("yes");
        let outputs = vec![
            BranchOutput {
                label: "True".to_string(),
                location: StepLocation::InsideTrueBranch,
                child: Some(&yes),
            },
            BranchOutput {
                label: "False".to_string(),
                location: StepLocation::InsideFalseBranch,
                child: None,
            },
        ];
        let (piece, height) = draw_branches(&step, outputs, &ctx);

        let kinds: Vec<(ButtonKind, StepLocation)> = piece
            .buttons
            .iter()
            .filter(|b| b.step_name == "check" && b.location != StepLocation::After)
            .map(|b| (b.kind, b.location.clone()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (ButtonKind::Small, StepLocation::InsideTrueBranch),
                (ButtonKind::Big, StepLocation::InsideFalseBranch),
            ]
        );
        assert_eq!(piece.labels.len(), 2);
        assert!(height > config.card_height_with_padding());
    }
}
