//! Plain-text summaries for terminal output.

use ndarray::Array1;

use crate::benchmark::StrategyMetrics;
use crate::experiment::ExperimentResult;

fn format_vector(values: &Array1<f64>) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

/// Summary block of an adaptive experiment.
pub fn experiment_summary(title: &str, result: &ExperimentResult) -> String {
    let m = &result.metrics;
    let mut lines = vec![
        format!("==== {title} ===="),
        format!("Best Fitness Value: {:.6}", m.best_fitness),
        format!("Mean Best Fitness Across Runs: {:.6}", m.mean_best_fitness),
        format!("Standard Deviation of Fitness: {:.6}", m.std_best_fitness),
        format!(
            "Average Convergence Generation: {:.2}",
            m.avg_convergence_generation
        ),
        format!(
            "Fitness over all generations: mean {:.6}, max {:.6}, std {:.6}",
            result.mean_fitness, result.max_fitness, result.std_fitness
        ),
    ];
    if let Some(best) = &result.best {
        lines.push(format!(
            "Last run best: {:.6} at {}",
            best.fitness,
            format_vector(&best.solution)
        ));
    }
    if let Some(best) = &result.overall_best {
        lines.push(format!(
            "Overall best: {:.6} at {}",
            best.fitness,
            format_vector(&best.solution)
        ));
    }
    if let Some(summary) = &result.archive_summary {
        lines.push(format!(
            "Archive: {} entries, mean solution {}",
            result.archive_size,
            format_vector(summary)
        ));
    }
    lines.join("\n")
}

/// One line per strategy, in action order.
pub fn ranking_table(rows: &[StrategyMetrics]) -> String {
    let mut lines = vec![format!(
        "{:<20} {:>12} {:>8} {:>12} {:>9}",
        "Strategy", "AOV", "C_s", "Q_measure", "Avg Rank"
    )];
    lines.extend(rows.iter().map(|r| {
        format!(
            "{:<20} {:>12.4} {:>8.2} {:>12.4} {:>9.2}",
            r.strategy.name(),
            r.aov,
            r.convergence_speed,
            r.quality,
            r.average_rank
        )
    }));
    if let Some(best) = rows
        .iter()
        .reduce(|a, b| if b.average_rank < a.average_rank { b } else { a })
    {
        lines.push(format!("Best overall: {}", best.strategy));
    }
    lines.join("\n")
}
