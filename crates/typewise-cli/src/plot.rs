//! Figures rendered to PNG with the plotters bitmap backend

use std::path::Path;

use plotters::prelude::*;
use typewise_analysis::trial::{Condition, Difficulty, Metric, Trial};

use crate::util::create_parent_dir;

const FIGURE_SIZE: (u32, u32) = (1200, 800);
const CAPTION_FONT: (&str, u32) = ("sans-serif", 24);

/// Difficulty x condition cells in plotting order, one x-axis segment each.
const CELLS: [(Difficulty, Condition); 4] = [
    (Difficulty::Easy, Condition::Auto),
    (Difficulty::Easy, Condition::Off),
    (Difficulty::Hard, Condition::Auto),
    (Difficulty::Hard, Condition::Off),
];

fn condition_color(condition: Condition) -> RGBColor {
    match condition {
        Condition::Auto => BLUE,
        Condition::Off => RED,
    }
}

fn cell_label(value: &SegmentValue<u32>) -> String {
    let index = match value {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => *i,
        SegmentValue::Last => return String::new(),
    };
    usize::try_from(index)
        .ok()
        .and_then(|i| CELLS.get(i))
        .map(|(difficulty, condition)| format!("({difficulty}, {condition})"))
        .unwrap_or_default()
}

fn cell_values(trials: &[Trial], metric: Metric) -> [Vec<f64>; 4] {
    CELLS.map(|(difficulty, condition)| {
        trials
            .iter()
            .filter(|t| t.prompt_type == difficulty && t.condition == condition)
            .map(|t| metric.value(t))
            .collect()
    })
}

/// Data range widened by 10% on both sides, or `0..1` without data.
#[expect(clippy::cast_possible_truncation)]
fn padded_range<I>(values: I) -> (f32, f32)
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return (0.0, 1.0);
    }
    let pad = if max > min { 0.1 * (max - min) } else { 0.5 };
    ((min - pad) as f32, (max + pad) as f32)
}

/// Box plot of `metric` for each difficulty x condition cell.
///
/// Cells without trials are left empty.
pub fn cell_boxplot(
    path: &Path,
    trials: &[Trial],
    metric: Metric,
    caption: &str,
) -> anyhow::Result<()> {
    let groups = cell_values(trials, metric);
    let (y_min, y_max) = padded_range(groups.iter().flatten().copied());

    create_parent_dir(path)?;
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..3u32).into_segmented(), y_min..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("(prompt_type, condition)")
        .y_desc(metric.label())
        .x_label_formatter(&cell_label)
        .draw()?;

    chart.draw_series(
        groups
            .iter()
            .zip(CELLS)
            .zip(0u32..)
            .filter(|((values, _), _)| !values.is_empty())
            .map(|((values, (_, condition)), index)| {
                Boxplot::new_vertical(SegmentValue::CenterOf(index), &Quartiles::new(values.as_slice()))
                    .width(60)
                    .style(condition_color(condition))
            }),
    )?;

    root.present()?;
    Ok(())
}

/// Bar chart of the mean of `metric` per difficulty x condition cell.
#[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn cell_mean_bars(path: &Path, trials: &[Trial], metric: Metric) -> anyhow::Result<()> {
    let means = cell_values(trials, metric).map(|values| {
        (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
    });
    let (_, y_max) = padded_range(means.iter().flatten().copied().chain([0.0]));

    create_parent_dir(path)?;
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Mean {} by Cell", metric.label()), CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..3u32).into_segmented(), 0.0f32..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("(prompt_type, condition)")
        .y_desc(format!("Mean {}", metric.label()))
        .x_label_formatter(&cell_label)
        .draw()?;

    for condition in Condition::ALL {
        let color = condition_color(condition);
        let bars = means
            .iter()
            .zip(CELLS)
            .zip(0u32..)
            .filter(|((_, (_, c)), _)| *c == condition)
            .filter_map(|((mean, _), index)| mean.map(|m| (index, m as f32)));
        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(color.filled())
                    .margin(20)
                    .data(bars),
            )?
            .label(condition.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Power against the number of pairs, with a horizontal line at the target power.
#[expect(clippy::cast_possible_truncation)]
pub fn power_curve(
    path: &Path,
    curve: &[(f64, f64)],
    effect_size: f64,
    target_power: f64,
) -> anyhow::Result<()> {
    let points = curve
        .iter()
        .map(|&(n, power)| (n as f32, power as f32))
        .collect::<Vec<_>>();
    let (x_min, x_max) = match (points.first(), points.last()) {
        (Some(first), Some(last)) if last.0 > first.0 => (first.0, last.0),
        _ => (0.0, 1.0),
    };
    let target = target_power as f32;

    create_parent_dir(path)?;
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Power Curve for Paired t-test (Autocorrect Effect)",
            CAPTION_FONT,
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0f32..1.0f32)?;

    chart
        .configure_mesh()
        .x_desc("Number of Paired Prompts")
        .y_desc("Statistical Power")
        .draw()?;

    chart
        .draw_series(LineSeries::new(points, &BLUE))?
        .label(format!("dz={effect_size:.2}"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(x_min, target), (x_max, target)],
            RED,
        )))?
        .label(format!("Target Power={target_power:.2}"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(difficulty: Difficulty, condition: Condition, wpm: f64) -> Trial {
        Trial {
            prompt: Some("p".to_owned()),
            prompt_type: difficulty,
            condition,
            ms: 1000.0,
            wpm,
            cer: 0.01,
            backspaces: None,
            repair_ms: None,
            trial: None,
        }
    }

    #[test]
    fn test_cell_labels() {
        assert_eq!(cell_label(&SegmentValue::CenterOf(0)), "(EASY, AUTO)");
        assert_eq!(cell_label(&SegmentValue::CenterOf(3)), "(HARD, OFF)");
        assert_eq!(cell_label(&SegmentValue::Exact(7)), "");
        assert_eq!(cell_label(&SegmentValue::Last), "");
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range([]), (0.0, 1.0));
        assert_eq!(padded_range([2.0]), (1.5, 2.5));
        let (lo, hi) = padded_range([0.0, 10.0, f64::NAN]);
        assert!((lo + 1.0).abs() < 1e-6 && (hi - 11.0).abs() < 1e-6);
    }

    #[test]
    fn test_figures_are_written() {
        let dir = tempfile::tempdir().unwrap();
        // HARD/OFF intentionally empty
        let trials = [
            trial(Difficulty::Easy, Condition::Auto, 41.0),
            trial(Difficulty::Easy, Condition::Auto, 45.0),
            trial(Difficulty::Easy, Condition::Off, 39.0),
            trial(Difficulty::Hard, Condition::Auto, 30.0),
        ];

        let boxplot = dir.path().join("nested").join("wpm_box.png");
        cell_boxplot(&boxplot, &trials, Metric::Wpm, "WPM by Difficulty × Condition").unwrap();
        assert!(boxplot.is_file());

        let bars = dir.path().join("wpm_bar.png");
        cell_mean_bars(&bars, &trials, Metric::Wpm).unwrap();
        assert!(bars.is_file());

        let curve = dir.path().join("power_curve.png");
        power_curve(&curve, &[(20.0, 0.19), (25.0, 0.23), (30.0, 0.27)], 0.25, 0.8).unwrap();
        assert!(curve.is_file());
    }
}
