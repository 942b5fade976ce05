use crate::flow::Step;

use super::svg_drawer::SvgDrawer;
use super::types::{ButtonKind, Point, PositionButton, StepLocation};
use super::{DrawContext, FlowDrawer};

/// Button of the given kind centred on `center`.
pub(super) fn button_at(
    center: Point,
    kind: ButtonKind,
    step: &Step,
    location: StepLocation,
    ctx: &DrawContext<'_>,
) -> PositionButton {
    let size = match kind {
        ButtonKind::Small => ctx.config.small_button_size,
        ButtonKind::Big => ctx.config.big_button_size,
    };
    PositionButton {
        x: center.x - size / 2.0,
        y: center.y - size / 2.0,
        kind,
        step_name: step.name.clone(),
        location,
    }
}

/// Vertical line from the bottom of a plain step's card to where the next
/// step goes. Returns the piece and the vertical room it occupies, measured
/// from the card's top.
pub(super) fn draw_sequential_connector<'a>(
    step: &Step,
    ctx: &DrawContext<'_>,
) -> (FlowDrawer<'a>, f32) {
    let config = ctx.config;
    let center_x = config.card_center_x();
    let card_bottom = config.card_height_with_padding();

    if ctx.is_last_step(step) {
        let center = Point::new(center_x, config.card_height + config.card_bottom_padding / 2.0);
        let button = button_at(center, ButtonKind::Small, step, StepLocation::After, ctx);
        return (FlowDrawer::blank(ctx).append_button(button), card_bottom);
    }

    let gap = config.vertical_space_between_sequential_steps;
    let svg = ctx
        .svg()
        .move_to(center_x, card_bottom)
        .draw_vertical_line(gap)
        .arrow(false);
    let center = Point::new(center_x, card_bottom + gap / 2.0);
    let button = button_at(center, ButtonKind::Small, step, StepLocation::After, ctx);
    (
        FlowDrawer::blank(ctx).append_svg(svg).append_button(button),
        card_bottom + gap,
    )
}

/// Line leaving a branch or loop at its join point, with the "add after"
/// button sitting on the join. Returns the piece and the y where whatever
/// follows the composite starts.
pub(super) fn draw_after_composite<'a>(
    step: &Step,
    join: Point,
    ctx: &DrawContext<'_>,
) -> (FlowDrawer<'a>, f32) {
    let button = button_at(join, ButtonKind::Small, step, StepLocation::After, ctx);
    let piece = FlowDrawer::blank(ctx).append_button(button);
    if ctx.is_last_step(step) {
        return (piece, join.y);
    }
    let gap = ctx.config.vertical_space_between_sequential_steps;
    let svg = ctx
        .svg()
        .move_to(join.x, join.y)
        .draw_vertical_line(gap)
        .arrow(false);
    (piece.append_svg(svg), join.y + gap)
}

/// Routes a downward connector from `from` to `to`, turning horizontal at
/// `bend_y`. Corners are rounded when the horizontal run is long enough for
/// two arcs; otherwise they are square.
pub(super) fn draw_s_curve(
    svg: SvgDrawer,
    from: Point,
    to: Point,
    bend_y: f32,
    radius: f32,
) -> SvgDrawer {
    let svg = svg.move_to(from.x, from.y);
    let dx = to.x - from.x;
    if dx.abs() < f32::EPSILON {
        return svg.draw_vertical_line(to.y - from.y);
    }
    if dx.abs() < 2.0 * radius {
        return svg
            .draw_vertical_line(bend_y - from.y)
            .draw_horizontal_line(dx)
            .draw_vertical_line(to.y - bend_y);
    }
    let left = dx < 0.0;
    let run = dx.abs() - 2.0 * radius;
    svg.draw_vertical_line(bend_y - from.y - radius)
        .draw_arc(left, false)
        .draw_horizontal_line(if left { -run } else { run })
        .draw_arc(left, false)
        .draw_vertical_line(to.y - bend_y - radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s_curve_lands_on_target() {
        let from = Point::new(130.0, 90.0);
        for to_x in [130.0, 140.0, -200.0, 480.0] {
            let to = Point::new(to_x, 190.0);
            let svg = draw_s_curve(SvgDrawer::empty(), from, to, 140.0, 15.0);
            let end = svg.cursor();
            assert!((end.x - to.x).abs() < 1e-3, "x for {to_x}: {end:?}");
            assert!((end.y - to.y).abs() < 1e-3, "y for {to_x}: {end:?}");
            assert_eq!(svg.minimum_y(), 90.0);
            assert_eq!(svg.maximum_y(), 190.0);
        }
    }

    #[test]
    fn s_curve_uses_two_arcs_for_long_runs() {
        use crate::layout::svg_drawer::PathCommand;
        let svg = draw_s_curve(
            SvgDrawer::empty(),
            Point::new(0.0, 0.0),
            Point::new(-100.0, 100.0),
            50.0,
            15.0,
        );
        let arcs = svg
            .commands()
            .iter()
            .filter(|c| matches!(c, PathCommand::Arc { .. }))
            .count();
        assert_eq!(arcs, 2);
        assert_eq!(svg.minimum_x(), -100.0);
    }
}
