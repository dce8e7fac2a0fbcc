use std::env;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use aivis_core::{Analyzer, FetchConfig, HttpFetcher, Mode, ReportView};
use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;
use url::Url;

const APP_NAME: &str = "aivis";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug)]
struct CliOptions {
    url: String,
    mode: Mode,
    json: bool,
    timeout: Option<Duration>,
    save_target: Option<PathBuf>,
}

#[derive(Debug)]
enum CliCommand {
    Run(CliOptions),
    Help,
    Version,
}

fn parse_arguments(args: &[String]) -> Result<CliCommand> {
    if args.is_empty() {
        return Ok(CliCommand::Help);
    }

    let mut url: Option<String> = None;
    let mut mode: Option<Mode> = None;
    let mut json = false;
    let mut timeout: Option<Duration> = None;
    let mut save_target: Option<PathBuf> = None;
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if matches!(arg.as_str(), "-h" | "--help") {
            return Ok(CliCommand::Help);
        }

        if matches!(arg.as_str(), "-v" | "--version") {
            return Ok(CliCommand::Version);
        }

        if matches!(arg.as_str(), "-q" | "--quick" | "-f" | "--full") {
            let requested = if matches!(arg.as_str(), "-q" | "--quick") {
                Mode::Quick
            } else {
                Mode::Full
            };
            if mode.is_some_and(|current| current != requested) {
                return Err(anyhow!("conflicting mode options supplied"));
            }
            mode = Some(requested);
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-j" | "--json") {
            json = true;
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-t" | "--timeout") || arg.starts_with("--timeout=") {
            let value = match arg.strip_prefix("--timeout=") {
                Some(value) => value.to_string(),
                None => {
                    i += 1;
                    args.get(i)
                        .cloned()
                        .ok_or_else(|| anyhow!("{arg} requires a number of seconds"))?
                }
            };
            let seconds = value
                .parse::<u64>()
                .ok()
                .filter(|&secs| secs > 0)
                .ok_or_else(|| anyhow!("invalid timeout '{value}': expected whole seconds > 0"))?;
            timeout = Some(Duration::from_secs(seconds));
            i += 1;
            continue;
        }

        if let Some(value) = arg
            .strip_prefix("--save=")
            .or_else(|| arg.strip_prefix("-s="))
        {
            if save_target.is_some() {
                return Err(anyhow!("--save specified multiple times"));
            }
            save_target = Some(if value.is_empty() {
                PathBuf::from(".")
            } else {
                PathBuf::from(value)
            });
            i += 1;
            continue;
        }

        if matches!(arg.as_str(), "-s" | "--save") {
            if save_target.is_some() {
                return Err(anyhow!("--save specified multiple times"));
            }
            let next_is_path = url.is_some()
                && args
                    .get(i + 1)
                    .map(|next| !next.starts_with('-'))
                    .unwrap_or(false);

            if next_is_path {
                save_target = Some(PathBuf::from(args[i + 1].clone()));
                i += 2;
            } else {
                save_target = Some(PathBuf::from("."));
                i += 1;
            }

            continue;
        }

        if arg.starts_with('-') {
            return Err(anyhow!("unknown flag: {arg}"));
        }

        if url.is_none() {
            url = Some(arg.clone());
        } else {
            return Err(anyhow!("unexpected additional argument: {}", arg));
        }

        i += 1;
    }

    let url = url.ok_or_else(|| anyhow!("missing <url> argument"))?;

    Ok(CliCommand::Run(CliOptions {
        url,
        mode: mode.unwrap_or_default(),
        json,
        timeout,
        save_target,
    }))
}

fn print_help() {
    println!("{APP_NAME} - How visible is your website to AI crawlers and assistants?");
    println!("Usage: {APP_NAME} [OPTIONS] <URL>\n");
    println!("Options:");
    println!("  -q, --quick             Show the 5 quick checks (default)");
    println!("  -f, --full              Show all 15 checks");
    println!("  -j, --json              Print the report as JSON");
    println!("  -t, --timeout <SECS>    Budget for each request (default 12)");
    println!("  -s, --save [PATH]       Save the report to a file");
    println!("  -v, --version           Show version information");
    println!("  -h, --help              Show this help message");
}

fn print_version() {
    println!("{APP_NAME} {VERSION}");
}

/// Log filter from `RUST_LOG`, or `default` when it is unset or invalid.
fn log_filter(rust_log: Option<&str>, default: &str) -> EnvFilter {
    rust_log
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(env::var("RUST_LOG").ok().as_deref(), "warn"))
        .with_writer(std::io::stderr)
        .init();

    let raw_args = env::args().skip(1).collect::<Vec<_>>();
    let options = match parse_arguments(&raw_args)? {
        CliCommand::Run(options) => options,
        CliCommand::Help => {
            print_help();
            return Ok(());
        }
        CliCommand::Version => {
            print_version();
            return Ok(());
        }
    };

    let mut fetch_config = FetchConfig::default();
    if let Some(timeout) = options.timeout {
        fetch_config.timeout = timeout;
    }
    let fetcher = HttpFetcher::new(&fetch_config)?;
    let analyzer = Analyzer::default().with_timeout(fetch_config.timeout);

    let report = analyzer
        .analyze(&fetcher, &options.url)
        .await
        .with_context(|| format!("cannot analyze '{}'", options.url))?;
    let view = report.view(options.mode);

    let output = if options.json {
        let mut json = serde_json::to_string_pretty(&view)?;
        json.push('\n');
        json
    } else {
        render_report(&view)
    };

    print!("{}", output);

    if let Some(save_base) = options.save_target {
        let analyzed_url = Url::parse(&view.url).context("invalid analyzed URL")?;
        let output_path = build_output_path(&save_base, &analyzed_url, options.json);
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }

        fs::write(&output_path, output.as_bytes())
            .with_context(|| format!("failed to write output file {}", output_path.display()))?;

        println!("\nWrote output to {}", output_path.display());
    }

    Ok(())
}

const DIVIDER: &str = "─────────────────────────────────────────────────────────────";
const LABEL_WIDTH: usize = 16;

fn push_section_header(buf: &mut String, icon: &str, title: &str) {
    let _ = writeln!(buf, "{DIVIDER}");
    let _ = writeln!(buf, "{icon} {title}");
    let _ = writeln!(buf, "{DIVIDER}");
}

fn push_key_value(buf: &mut String, label: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let _ = writeln!(buf, "• {:<width$} : {}", label, value, width = LABEL_WIDTH);
}

/// Render a report view in the divider/section text layout.
fn render_report(view: &ReportView) -> String {
    let mut output = String::new();

    push_section_header(&mut output, "🔎", &format!("AI Visibility: {}", view.url));
    push_key_value(&mut output, "Score", &format!("{}%", view.score));
    push_key_value(&mut output, "Interpretation", view.interpretation.as_str());
    push_key_value(
        &mut output,
        "Mode",
        &format!(
            "{} ({} of {} checks shown)",
            view.mode,
            view.checks.len(),
            view.total_checks
        ),
    );
    let passed = view.checks.iter().filter(|check| check.passed).count();
    push_key_value(
        &mut output,
        "Passed",
        &format!("{} of {}", passed, view.checks.len()),
    );
    let _ = writeln!(&mut output);

    push_section_header(&mut output, "📋", "Checks");
    for check in &view.checks {
        let icon = if check.passed { "✅" } else { "❌" };
        let _ = writeln!(&mut output, "{icon} {}", check.name);
        if !check.description.is_empty() {
            let _ = writeln!(&mut output, "   {}", check.description);
        }
    }

    let hidden = view.total_checks.saturating_sub(view.checks.len());
    if hidden > 0 {
        let _ = writeln!(&mut output);
        let _ = writeln!(
            &mut output,
            "🔒 {hidden} more checks are included in the score. Run with --full to see them."
        );
    }

    output
}

fn build_output_path(base: &Path, url: &Url, json: bool) -> PathBuf {
    let has_report_extension = base
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);

    if has_report_extension {
        base.to_path_buf()
    } else {
        base.join(derive_output_filename(url, json))
    }
}

fn derive_output_filename(url: &Url, json: bool) -> String {
    let host = url.host_str().unwrap_or("page");
    let mut path_component = url.path().trim_matches('/').replace('/', "_");
    if path_component.is_empty() {
        path_component = "index".to_string();
    }

    let mut parts = vec![sanitize_for_filename(host), sanitize_for_filename(&path_component)];
    if let Some(query) = url.query().filter(|query| !query.is_empty()) {
        parts.push(sanitize_for_filename(query));
    }

    let extension = if json { "json" } else { "txt" };
    format!("{}__aivis.{}", parts.join("__"), extension)
}

fn sanitize_for_filename(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
