use std::time::Duration;

use console::Style;
use exrmerge_core::batch::{available_parallelism, resolve_worker_count, BatchReport};
use exrmerge_core::config::BatchConfig;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    ok: Style,
    error: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            ok: Style::new().green(),
            error: Style::new().red().bold(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_batch_summary(config: &BatchConfig) {
    let s = Styles::new();
    let workers = resolve_worker_count(config.threads, available_parallelism());

    println!();
    println!("  {}", s.title.apply_to("EXR Merge"));
    println!("  {}", s.title.apply_to("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(&config.output)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Files"),
        s.value.apply_to(config.file_count())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Workers"),
        s.value.apply_to(workers)
    );
    println!();

    for (i, sequence) in config.sequences.iter().enumerate() {
        println!("  {}", s.header.apply_to(format!("Sequence {}", i + 1)));
        if let Some(first) = sequence.files.first() {
            println!(
                "    {:<12}{}",
                s.label.apply_to("First"),
                s.path.apply_to(first.display())
            );
        }
        println!(
            "    {:<12}{}",
            s.label.apply_to("Files"),
            s.value.apply_to(sequence.files.len())
        );
        if sequence.channels.is_empty() {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Channels"),
                s.disabled.apply_to("none")
            );
        } else {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Channels"),
                s.value.apply_to(sequence.channels.join(", "))
            );
        }
        println!();
    }
}

pub fn print_report(report: &BatchReport, jobs: usize, elapsed: Duration) {
    let s = Styles::new();
    let failed = report.errors.len();

    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(jobs)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Written"),
        s.ok.apply_to(jobs.saturating_sub(failed))
    );
    if failed > 0 {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Failed"),
            s.error.apply_to(failed)
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Time"),
        s.value.apply_to(format!("{:.1}s", elapsed.as_secs_f64()))
    );

    if failed > 0 {
        println!();
        println!("  {}", s.header.apply_to("Errors"));
        for err in &report.errors {
            println!("    {}", s.error.apply_to(err));
        }
    }
    println!();
}
