use ndarray::{ArrayView1, ArrayView2, Axis};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::full_palette;

use crate::metrics::DecisionBoundary;

const COLORS: [RGBColor; 5] = [
    full_palette::RED,
    full_palette::BLUE,
    full_palette::GREEN,
    full_palette::CYAN,
    full_palette::BLACK,
];

fn color(i: usize) -> RGBColor {
    COLORS[i % COLORS.len()]
}

pub struct MinMax<T> {
    pub min: T,
    pub max: T,
}

pub fn find_max_min<T: std::cmp::PartialOrd + Copy>(
    mut data: impl Iterator<Item = T>,
) -> Option<MinMax<T>> {
    let init = data.next()?;
    let mut min_max = MinMax {
        min: init,
        max: init,
    };

    for x in data {
        min_max = MinMax {
            min: if x < min_max.min { x } else { min_max.min },
            max: if x > min_max.max { x } else { min_max.max },
        };
    }

    Some(min_max)
}

fn padded(range: MinMax<f64>) -> std::ops::Range<f64> {
    let pad = ((range.max - range.min) * 0.05).max(1e-3);

    (range.min - pad)..(range.max + pad)
}

/// Loss per iteration on a log y-axis. Non-positive and non-finite losses
/// are skipped.
pub fn plot_loss_trace<DB>(
    losses: &[f64],
    label: &str,
    drawing_area: &DrawingArea<DB, Shift>,
) -> Result<(), Box<dyn std::error::Error>>
where
    DB: DrawingBackend,
    <DB as DrawingBackend>::ErrorType: 'static,
{
    drawing_area.fill(&WHITE)?;

    let points: Vec<(usize, f64)> = losses
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, l)| l.is_finite() && *l > 0.)
        .collect();

    let MinMax { min, max } =
        find_max_min(points.iter().map(|&(_, l)| l)).ok_or("no positive loss to plot")?;

    let mut chart_builder = ChartBuilder::on(drawing_area);

    let mut chart_context = chart_builder
        .caption(label, ("Arial", 20))
        .set_all_label_area_size(70)
        .margin(50)
        .build_cartesian_2d(0..losses.len(), (min * 0.9..max * 1.1).log_scale())?;

    chart_context
        .configure_mesh()
        .x_labels(10)
        .x_desc("Iteration")
        .y_labels(10)
        .y_desc(label)
        .y_label_formatter(&|y| format!("{:.1e}", y))
        .draw()?;

    chart_context.draw_series(LineSeries::new(points, BLUE.filled()))?;

    Ok(())
}

/// Scatter of a single feature against the target with one straight line
/// `(name, intercept, slope)` per fitted model.
pub fn plot_fit<DB>(
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
    lines: &[(&str, f64, f64)],
    caption: &str,
    drawing_area: &DrawingArea<DB, Shift>,
) -> Result<(), Box<dyn std::error::Error>>
where
    DB: DrawingBackend,
    <DB as DrawingBackend>::ErrorType: 'static,
{
    drawing_area.fill(&WHITE)?;

    let x_range = find_max_min(x.iter().copied()).ok_or("no data to plot")?;
    let (x_min, x_max) = (x_range.min, x_range.max);

    let line_ends = lines
        .iter()
        .flat_map(|&(_, b0, b1)| [b0 + b1 * x_min, b0 + b1 * x_max]);

    let y_range = find_max_min(y.iter().copied().chain(line_ends)).ok_or("no data to plot")?;

    let mut chart_builder = ChartBuilder::on(drawing_area);

    let mut chart_context = chart_builder
        .caption(caption, ("Arial", 20))
        .set_all_label_area_size(50)
        .margin(20)
        .build_cartesian_2d(padded(x_range), padded(y_range))?;

    chart_context
        .configure_mesh()
        .x_labels(10)
        .x_desc("x")
        .y_labels(10)
        .y_desc("y")
        .draw()?;

    chart_context
        .draw_series(
            x.iter()
                .zip(y.iter())
                .map(|(&x, &y)| Circle::new((x, y), 3, BLACK.mix(0.6).filled())),
        )?
        .label("data")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, BLACK.filled()));

    for (i, &(name, b0, b1)) in lines.iter().enumerate() {
        let line_color = color(i);

        chart_context
            .draw_series(LineSeries::new(
                [x_min, x_max].map(|x| (x, b0 + b1 * x)),
                line_color.stroke_width(2),
            ))?
            .label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_color));
    }

    chart_context
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE)
        .draw()?;

    Ok(())
}

/// Two-feature scatter coloured by label, with the logistic decision
/// boundary when it can be solved for the second feature.
pub fn plot_decision_boundary<DB>(
    x: ArrayView2<f64>,
    labels: ArrayView1<usize>,
    boundary: &DecisionBoundary,
    caption: &str,
    drawing_area: &DrawingArea<DB, Shift>,
) -> Result<(), Box<dyn std::error::Error>>
where
    DB: DrawingBackend,
    <DB as DrawingBackend>::ErrorType: 'static,
{
    if x.ncols() < 2 {
        return Err(format!("need two features to draw a boundary, got {}", x.ncols()).into());
    }

    if labels.len() != x.nrows() {
        return Err(format!("{} labels for {} rows", labels.len(), x.nrows()).into());
    }

    drawing_area.fill(&WHITE)?;

    let x1_range = find_max_min(x.column(0).iter().copied()).ok_or("no data to plot")?;
    let x2_range = find_max_min(x.column(1).iter().copied()).ok_or("no data to plot")?;
    let (x1_min, x1_max) = (x1_range.min, x1_range.max);

    let mut chart_builder = ChartBuilder::on(drawing_area);

    let mut chart_context = chart_builder
        .caption(caption, ("Arial", 20))
        .set_all_label_area_size(50)
        .margin(20)
        .build_cartesian_2d(padded(x1_range), padded(x2_range))?;

    chart_context
        .configure_mesh()
        .x_labels(10)
        .x_desc("x₁")
        .y_labels(10)
        .y_desc("x₂")
        .draw()?;

    let points = x
        .axis_iter(Axis(0))
        .zip(labels.iter())
        .map(|(row, &label)| Circle::new((row[0], row[1]), 3, color(label).filled()));

    chart_context.draw_series(points)?;

    if let Some((intercept, slope)) = boundary.solved() {
        chart_context
            .draw_series(LineSeries::new(
                [x1_min, x1_max].map(|x1| (x1, intercept + slope * x1)),
                BLACK.stroke_width(2),
            ))?
            .label("p = 0.5")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

        chart_context
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE)
            .draw()?;
    }

    Ok(())
}

pub fn plot_error_matrix<DB>(
    expected: &[usize],
    predictions: &[usize],
    cat_cnt: usize,
    category_formatter: &impl Fn(usize) -> String,
    caption: &str,
    drawing_area: &DrawingArea<DB, Shift>,
) -> Result<(), Box<dyn std::error::Error>>
where
    DB: DrawingBackend,
    <DB as DrawingBackend>::ErrorType: 'static,
{
    if cat_cnt < 2 {
        return Err(format!("confusion matrix needs at least two categories, got {cat_cnt}").into());
    }

    drawing_area.fill(&WHITE)?;

    let mut chart_builder = ChartBuilder::on(drawing_area);

    let mut chart_context = chart_builder
        .caption(caption, ("Arial", 20))
        .set_all_label_area_size(50)
        .margin(50)
        .build_cartesian_2d(
            (0..cat_cnt - 1).into_segmented(),
            (0..cat_cnt - 1).into_segmented(),
        )?;

    let label_formatter = |idx: &SegmentValue<usize>| match *idx {
        SegmentValue::Exact(v) => category_formatter(v),
        SegmentValue::CenterOf(v) => category_formatter(v),
        SegmentValue::Last => "N/A".to_string(),
    };

    chart_context
        .configure_mesh()
        .light_line_style(WHITE)
        .x_labels(cat_cnt)
        .x_desc("Predicted")
        .x_label_formatter(&label_formatter)
        .y_labels(cat_cnt)
        .y_desc("Expected")
        .y_label_formatter(&label_formatter)
        .draw()?;

    let mut matrix = vec![vec![0f64; cat_cnt]; cat_cnt];
    expected
        .iter()
        .zip(predictions.iter())
        .filter(|(&e, &p)| e < cat_cnt && p < cat_cnt)
        .for_each(|(&e, &p)| {
            matrix[e][p] += 1.0;
        });

    let max = matrix.iter().flatten().copied().fold(0., f64::max);

    if max > 0. {
        matrix.iter_mut().for_each(|row| {
            row.iter_mut().for_each(|v| *v /= max);
        });
    }

    chart_context.draw_series(matrix.iter().enumerate().flat_map(|(expected_id, row)| {
        row.iter().enumerate().map(move |(predicted_id, &v)| {
            Rectangle::new(
                [
                    (
                        SegmentValue::Exact(predicted_id),
                        SegmentValue::Exact(expected_id),
                    ),
                    (
                        SegmentValue::Exact(predicted_id + 1),
                        SegmentValue::Exact(expected_id + 1),
                    ),
                ],
                BLACK.mix(v).filled(),
            )
        })
    }))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn min_max_of_iterator() {
        let MinMax { min, max } = find_max_min([3., -1., 7., 2.].into_iter()).unwrap();

        assert_eq!(min, -1.);
        assert_eq!(max, 7.);
        assert!(find_max_min(std::iter::empty::<f64>()).is_none());
    }

    #[test]
    fn charts_render_to_svg() {
        let mut buffer = String::new();
        {
            let root = SVGBackend::with_string(&mut buffer, (800, 600)).into_drawing_area();
            let (left, right) = root.split_horizontally(400);

            let x = array![0., 1., 2.];
            let y = array![3.1, 4.9, 7.2];
            plot_fit(x.view(), y.view(), &[("fit", 3., 2.)], "fit", &left).unwrap();
            plot_loss_trace(&[4., 2., 1., 0.5], "loss", &right).unwrap();

            root.present().unwrap();
        }

        assert!(buffer.contains("<svg"));
    }

    #[test]
    fn classification_charts_render_to_svg() {
        let mut buffer = String::new();
        {
            let root = SVGBackend::with_string(&mut buffer, (800, 400)).into_drawing_area();
            let (left, right) = root.split_horizontally(400);

            let x = array![[-1., -1.], [1., 1.], [-0.5, 0.3]];
            let labels = array![0, 1, 0];
            let boundary = DecisionBoundary::new(0., 1., 1.);

            plot_decision_boundary(x.view(), labels.view(), &boundary, "boundary", &left)
                .unwrap();
            plot_error_matrix(
                &[0, 1, 0],
                &[0, 1, 1],
                2,
                &|c| format!("class {c}"),
                "confusion",
                &right,
            )
            .unwrap();

            root.present().unwrap();
        }

        assert!(buffer.contains("<svg"));
    }

    #[test]
    fn degenerate_classification_input_is_an_error() {
        let mut buffer = String::new();
        let root = SVGBackend::with_string(&mut buffer, (100, 100)).into_drawing_area();

        for cat_cnt in [0, 1] {
            assert!(
                plot_error_matrix(&[0], &[0], cat_cnt, &|c| c.to_string(), "m", &root).is_err()
            );
        }

        let boundary = DecisionBoundary::new(0., 1., 1.);

        let one_feature = array![[1.], [2.]];
        let labels = array![0, 1];
        assert!(
            plot_decision_boundary(one_feature.view(), labels.view(), &boundary, "b", &root)
                .is_err()
        );

        let x = array![[1., 2.], [3., 4.]];
        let too_few_labels = array![0];
        assert!(
            plot_decision_boundary(x.view(), too_few_labels.view(), &boundary, "b", &root)
                .is_err()
        );
    }

    #[test]
    fn empty_loss_trace_is_an_error() {
        let mut buffer = String::new();
        let root = SVGBackend::with_string(&mut buffer, (100, 100)).into_drawing_area();

        assert!(plot_loss_trace(&[], "loss", &root).is_err());
    }
}
