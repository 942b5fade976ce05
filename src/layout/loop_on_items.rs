//! Layout of a loop step and its body.
//!
//! The body chain is centred under the loop card. A return path runs down
//! the left of the body, from just below the loop card to the loop's exit,
//! so the repetition is visible however tall the body grows.

use crate::flow::Step;

use super::connector::{button_at, draw_after_composite, draw_s_curve};
use super::svg_drawer::SvgDrawer;
use super::types::{ButtonKind, Point, StepLocation};
use super::{DrawContext, FlowDrawer};

/// Lays out `body` below the loop card. The returned piece does not contain
/// the loop card itself; the height is where the next step starts.
pub(super) fn draw_loop<'a>(
    step: &Step,
    body: Option<&'a Step>,
    ctx: &DrawContext<'_>,
) -> (FlowDrawer<'a>, f32) {
    let config = ctx.config;
    let parent_x = config.card_center_x();
    let parent_bottom = config.card_height_with_padding();
    let step_to_child = config.vertical_space_between_step_and_child;
    let radius = config.arc_length;
    let body_top = parent_bottom + step_to_child;

    let child = FlowDrawer::construct(body, ctx);
    let child_box = child.bounding_box();
    // Centre the whole body, not just its first card, under the loop card.
    let body_dx = (child_box.left_side - child_box.right_side) / 2.0;
    let body_x = parent_x + body_dx;

    let mut entry = draw_s_curve(
        ctx.svg(),
        Point::new(parent_x, parent_bottom),
        Point::new(body_x, body_top),
        parent_bottom + step_to_child / 2.0,
        radius,
    );
    let button = match body {
        None => {
            let center = Point::new(body_x, body_top + config.big_button_size / 2.0);
            button_at(center, ButtonKind::Big, step, StepLocation::InsideLoop, ctx)
        }
        Some(_) => {
            entry = entry.arrow(false);
            let center = Point::new(body_x, body_top - (step_to_child / 2.0 - radius) / 2.0);
            button_at(center, ButtonKind::Small, step, StepLocation::InsideLoop, ctx)
        }
    };

    let body_bottom = match body {
        None => config.big_button_size,
        Some(_) => child_box.max_y,
    };
    let exit_y = body_top + child_box.max_y + step_to_child / 2.0;
    let exit = Point::new(parent_x, exit_y);
    let closing = draw_s_curve(
        ctx.svg(),
        Point::new(body_x, body_top + body_bottom),
        exit,
        exit_y - radius,
        radius,
    );

    let left_x =
        (body_dx + child_box.min_x).min(0.0) - config.horizontal_space_between_branches / 2.0;
    let empty_side = draw_empty_side(
        ctx.svg(),
        Point::new(parent_x, parent_bottom + step_to_child / 4.0),
        exit,
        left_x,
        radius,
    );

    let piece = FlowDrawer::blank(ctx)
        .append_svg(entry)
        .append_svg(closing)
        .append_svg(empty_side)
        .append_button(button)
        .merge_child(child.offset(body_dx, body_top));

    let (after, height) = draw_after_composite(step, exit, ctx);
    (piece.merge_child(after), height)
}

/// Return path on the left of the body: out from `start` to `left_x`, down to
/// the level of `end`, and back in to `end`. The arrow on the way down points
/// up, the direction the loop travels.
fn draw_empty_side(
    svg: SvgDrawer,
    start: Point,
    end: Point,
    left_x: f32,
    radius: f32,
) -> SvgDrawer {
    let out = start.x - left_x - radius;
    let drop = end.y - start.y - 2.0 * radius;
    svg.move_to(start.x, start.y)
        .draw_horizontal_line(-out)
        .draw_arc(true, false)
        .draw_vertical_line(drop / 2.0)
        .arrow(true)
        .draw_vertical_line(drop / 2.0)
        .draw_arc(false, false)
        .draw_horizontal_line(end.x - left_x - radius)
}
