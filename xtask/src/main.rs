use camino::{Utf8Path, Utf8PathBuf};
use miette::{IntoDiagnostic, miette};
use rayon::prelude::*;
use std::fs;
use std::hint::black_box;
use std::process::Command;
use std::time::{Duration, Instant};
use tilestyle::{BackendKind, Feature, GeometryType, StyleContext, StyleParamKey, StyleValue};
use tilestyle_compare::{StyleCase, case_files, compare_outcome, load_case, run_case};
use tracing_subscriber::EnvFilter;

const DEFAULT_ITERATIONS: u32 = 10_000;

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo xtask <command>");
        eprintln!("Commands:");
        eprintln!("  bench [ITERATIONS]           Time feature property reads through each backend");
        eprintln!("  compare [DIR] [--html FILE]  Run every style case on every backend");
        eprintln!("  features                     Test the library under each feature set");
        std::process::exit(1);
    }

    match args[1].as_str() {
        "bench" => {
            let iterations = match args.get(2) {
                Some(n) => n.parse().into_diagnostic()?,
                None => DEFAULT_ITERATIONS,
            };
            bench(iterations)
        }
        "compare" => compare(&args[2..]),
        "features" => features(),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            std::process::exit(1);
        }
    }
}

fn workspace_root() -> Utf8PathBuf {
    Utf8Path::new(env!("CARGO_MANIFEST_DIR")).join("..")
}

// ============================================================================
// bench
// ============================================================================

fn message_feature() -> Feature {
    let mut feature = Feature::new(GeometryType::Points);
    feature.props.set("message", "Hello World!");
    feature.props.set("message2", "Hello World!");
    feature
}

fn report(label: &str, iterations: u32, elapsed: Duration) {
    let per_iter = elapsed.as_nanos() as f64 / f64::from(iterations.max(1));
    println!("{label:<24} {iterations:>8} iterations  {per_iter:>10.1} ns/iter");
}

fn bench(iterations: u32) -> miette::Result<()> {
    let feature = message_feature();
    let functions = vec![
        "function () { return feature.message; }".to_string(),
        "function () { return feature.message2; }".to_string(),
    ];

    for &kind in BackendKind::available() {
        let mut ctx = StyleContext::builder()
            .backend(kind)
            .build()
            .map_err(miette::Report::new)?;
        ctx.set_feature(&feature);
        if !ctx.set_functions(&functions) {
            return Err(miette!("{}: bench functions failed to compile", kind.name()));
        }

        let start = Instant::now();
        for _ in 0..iterations {
            let mut value = StyleValue::None;
            ctx.eval_style(0, StyleParamKey::TextSource, &mut value);
            black_box(&value);
        }
        report(&format!("{} get property", kind.name()), iterations, start.elapsed());
    }

    let start = Instant::now();
    for _ in 0..iterations {
        let mut value = StyleValue::None;
        match feature.props.get_string("message") {
            Some(message) => value = StyleValue::String(message.to_string()),
            None => eprintln!("message is not a string"),
        }
        black_box(&value);
    }
    report("direct get property", iterations, start.elapsed());
    Ok(())
}

// ============================================================================
// features
// ============================================================================

/// Feature sets the library must build and pass its tests under. Selecting
/// the package keeps this workspace's `tracing` request out of the build.
const FEATURE_SETS: &[&[&str]] = &[
    &[],
    &["--no-default-features", "--features", "boa"],
    &["--no-default-features", "--features", "rhai"],
    &["--no-default-features"],
    &["--features", "tracing"],
];

fn features() -> miette::Result<()> {
    let root = workspace_root();
    let mut failed = Vec::new();

    for set in FEATURE_SETS {
        let label = if set.is_empty() { "default".to_string() } else { set.join(" ") };
        println!("==> cargo test -p tilestyle {label}");
        let status = Command::new("cargo")
            .args(["test", "-p", "tilestyle"])
            .args(*set)
            .current_dir(&root)
            .status()
            .into_diagnostic()?;
        if !status.success() {
            failed.push(label);
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(miette!("failed feature sets: {}", failed.join(", ")))
    }
}

// ============================================================================
// compare
// ============================================================================

/// Outcome of one case on one backend
struct BackendOutcome {
    kind: BackendKind,
    /// `None` when the case does not apply to this backend
    actual: Option<String>,
    matched: bool,
}

struct CaseReport {
    name: String,
    source: String,
    expect: String,
    outcomes: Vec<BackendOutcome>,
}

impl CaseReport {
    fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.matched)
    }
}

/// Fresh context per compiled backend, owned by one worker
fn worker_contexts() -> Vec<(BackendKind, Option<StyleContext>)> {
    BackendKind::available()
        .iter()
        .map(|&kind| {
            let ctx = StyleContext::builder().backend(kind).build().ok();
            (kind, ctx)
        })
        .collect()
}

fn check(contexts: &mut [(BackendKind, Option<StyleContext>)], case: &StyleCase) -> CaseReport {
    let outcomes = contexts
        .iter_mut()
        .map(|(kind, ctx)| {
            let kind = *kind;
            if !case.applies_to(kind) {
                return BackendOutcome {
                    kind,
                    actual: None,
                    matched: true,
                };
            }
            let actual = match ctx {
                Some(ctx) => run_case(ctx, case),
                None => format!("backend {} unavailable", kind.name()),
            };
            let matched = compare_outcome(&case.expect, &actual).is_match();
            BackendOutcome {
                kind,
                actual: Some(actual),
                matched,
            }
        })
        .collect();

    CaseReport {
        name: case.name.clone(),
        source: case.source.clone(),
        expect: case.expect.clone(),
        outcomes,
    }
}

fn compare(args: &[String]) -> miette::Result<()> {
    let mut dir = workspace_root().join("tests/cases");
    let mut html_path = None;

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--html" => {
                let path = args.next().ok_or_else(|| miette!("--html needs a file name"))?;
                html_path = Some(Utf8PathBuf::from(path));
            }
            _ => dir = Utf8PathBuf::from(arg),
        }
    }

    let files = case_files(&dir)?;
    let cases = files
        .iter()
        .map(|path| load_case(path))
        .collect::<miette::Result<Vec<_>>>()?;

    let reports: Vec<CaseReport> = cases
        .par_iter()
        .map_init(worker_contexts, |contexts, case| check(contexts, case))
        .collect();

    for report in &reports {
        let status = if report.passed() { "ok  " } else { "FAIL" };
        println!("{status} {}", report.name);
        for outcome in report.outcomes.iter().filter(|o| !o.matched) {
            println!(
                "       {}: expected {}, got {}",
                outcome.kind.name(),
                report.expect,
                outcome.actual.as_deref().unwrap_or("-")
            );
        }
    }

    let total = reports.len();
    let passed = reports.iter().filter(|r| r.passed()).count();
    println!("\n{passed} / {total} cases agree on every backend");

    if let Some(path) = html_path {
        fs::write(&path, render_html(&reports, passed, total)).into_diagnostic()?;
        println!("Generated comparison at: {path}");
    }

    if passed == total {
        Ok(())
    } else {
        Err(miette!("{} case(s) failed", total - passed))
    }
}

fn render_html(reports: &[CaseReport], passed: usize, total: usize) -> String {
    let pass_rate = if total > 0 {
        (passed as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    let mut html = String::new();
    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Style backend comparison</title>
    <style>
        body {{
            font-family: system-ui, sans-serif;
            margin: 0;
            padding: 24px;
            background: #eee;
            color: #333;
        }}
        h1 {{
            font-weight: 600;
            font-size: 20px;
        }}
        table {{
            border-collapse: collapse;
            background: white;
            width: 100%;
        }}
        th, td {{
            text-align: left;
            padding: 6px 10px;
            border-bottom: 1px solid #eee;
            font-size: 12px;
            vertical-align: top;
        }}
        td.match {{
            background: #dcfce7;
            color: #166534;
        }}
        td.mismatch {{
            background: #fee2e2;
            color: #991b1b;
        }}
        td.skipped {{
            color: #999;
        }}
        pre {{
            margin: 0;
            font-size: 11px;
            white-space: pre-wrap;
        }}
    </style>
</head>
<body>
<h1>Style backend comparison: {pass_rate:.0}% ({passed} / {total} passing)</h1>
<table>
<tr><th>Case</th><th>Expected</th>"#
    ));

    for &kind in BackendKind::available() {
        html.push_str(&format!("<th>{}</th>", kind.name()));
    }
    html.push_str("<th>Source</th></tr>\n");

    for report in reports {
        html.push_str(&format!(
            "<tr id=\"{name}\"><td>{name}</td><td><code>{}</code></td>",
            html_escape(&report.expect),
            name = html_escape(&report.name),
        ));
        for outcome in &report.outcomes {
            let (class, text) = match (&outcome.actual, outcome.matched) {
                (None, _) => ("skipped", "skipped".to_string()),
                (Some(actual), true) => ("match", html_escape(actual)),
                (Some(actual), false) => ("mismatch", html_escape(actual)),
            };
            html.push_str(&format!("<td class=\"{class}\"><code>{text}</code></td>"));
        }
        html.push_str(&format!(
            "<td><pre>{}</pre></td></tr>\n",
            html_escape(&report.source)
        ));
    }

    html.push_str("</table>\n</body></html>");
    html
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
