use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::gateway::signal::{parse_success_signal, SuccessSignal};
use crate::gateway::{ClientOptions, GatewayClient};
use crate::model::{records_for_request, AnalysisRequest};
use crate::session::ViewSession;
use crate::table::SortSpec;

fn print_banner(no_color: bool) {
    let _ = no_color;
    const BANNER: &str = r#"
       __
  ____/ /_________ _____ _____ _____
 / __  / ___/ ___// __  / __  / __  |
/ /_/ / /__(__  )/ /_/ / /_/ / /_/ /
\__,_/\___/____/ \__, /\__,_/ .___/
                /____/      /_/
       v0.2.1 - DCS performance-gap analysis tool
    "#;
    print!("{}", BANNER);
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

#[derive(Clone, Debug)]
struct RunConfig {
    base_url: String,
    perf_id: String,
    timestamps: Vec<String>,
    timeout: u64,
    workers: usize,
    proxy: Option<String>,
    header: Option<String>,
    csrf_token: Option<String>,
    sort: Option<SortSpec>,
    page: i64,
    page_size: u32,
    max_visible: u32,
    output: Option<String>,
    output_format: Option<String>,
    no_color: bool,
    verbose: u8,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    let base_url = args
        .base_url
        .or(cfg.base_url)
        .unwrap_or_else(|| "http://localhost:8000".to_string());

    let perf_id = args
        .perf_id
        .or(cfg.perf_id)
        .map(|p| p.trim().to_string())
        .unwrap_or_default();
    if perf_id.is_empty() {
        return Err("a performance id is required (--pid or config perf_id)".to_string());
    }

    let timestamps = if args.timestamps.is_empty() {
        cfg.timestamps.unwrap_or_default()
    } else {
        args.timestamps
    };
    if timestamps.is_empty() {
        return Err("at least one timestamp is required (--ts or config timestamps)".to_string());
    }
    // config-sourced timestamps bypass CLI validation, so check the merged list
    for raw in timestamps.iter() {
        crate::utils::validate_timestamp(raw)
            .map_err(|e| format!("invalid timestamp '{raw}': {e}"))?;
    }

    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    let workers = args.workers.or(cfg.workers).unwrap_or(4);
    let proxy = args.proxy.or(cfg.proxy);
    let header = args.header.or(cfg.header);
    let csrf_token = args.csrf_token.or(cfg.csrf_token);

    let sort = match args.sort.or(cfg.sort) {
        Some(raw) => Some(
            crate::utils::parse_sort_spec(&raw)
                .map_err(|e| format!("invalid sort '{raw}': {e}"))?,
        ),
        None => None,
    };

    let page = args.page.or(cfg.page).unwrap_or(1);
    let page_size = args.page_size.or(cfg.page_size).unwrap_or(10);
    if page_size == 0 {
        return Err("page_size must be positive".to_string());
    }
    let max_visible = args.max_visible.or(cfg.max_visible).unwrap_or(5);
    if max_visible == 0 {
        return Err("max_visible must be positive".to_string());
    }

    let output = args.output.or(cfg.output);
    let output_format = args.output_format.or(cfg.output_format);

    Ok(RunConfig {
        base_url,
        perf_id,
        timestamps,
        timeout,
        workers,
        proxy,
        header,
        csrf_token,
        sort,
        page,
        page_size,
        max_visible,
        output,
        output_format,
        no_color,
        verbose: args.verbose,
    })
}

fn format_gap(gap: f64) -> String {
    let rendered = format!("{:>12}", format!("{gap:+.3}"));
    if gap > 0.0 {
        rendered.bright_green().to_string()
    } else if gap < 0.0 {
        rendered.bright_red().to_string()
    } else {
        rendered
    }
}

fn print_table_page(session: &ViewSession, max_visible: u32) {
    let header = format!(
        "{:>4}  {:<30} {:<8} {:>12} {:>12} {:>12}",
        "No", "Parameter", "UoM", "Reference", "Existing", "Gap"
    );
    println!("{}", header.bold());
    for record in session.page_records() {
        println!(
            "{:>4}  {:<30} {:<8} {:>12.3} {:>12.3} {}",
            record.sequence,
            record.parameter,
            record.unit_of_measure,
            record.reference_value,
            record.observed_value,
            format_gap(record.gap),
        );
    }

    let window = session.window();
    println!();
    println!(
        ":: Showing {}-{} of {} ::",
        window.range_start(),
        window.range_end(),
        window.total_count()
    );

    let strip: Vec<String> = session
        .visible_pages(max_visible)
        .into_iter()
        .map(|page| {
            if page == window.current_page() {
                format!("[{page}]").bold().to_string()
            } else {
                page.to_string()
            }
        })
        .collect();
    if !strip.is_empty() {
        println!(":: Page {} ::", strip.join(" "));
    }
}

async fn write_output_file(
    run: &RunConfig,
    request: &AnalysisRequest,
    session: &ViewSession,
) -> Result<(), String> {
    let outfile_path = match run.output.as_ref() {
        Some(path) => path,
        None => return Ok(()),
    };

    let output_format = run
        .output_format
        .as_deref()
        .and_then(crate::output::OutputFormat::parse)
        .or_else(|| crate::output::infer_format_from_path(outfile_path))
        .unwrap_or(crate::output::OutputFormat::Text);

    let records = crate::output::build_records(request, session.records());
    let rendered = match output_format {
        crate::output::OutputFormat::Text => crate::output::render_text(&records),
        crate::output::OutputFormat::Json => crate::output::render_json(&records),
        crate::output::OutputFormat::Xml => crate::output::render_xml(&records),
    };

    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(outfile_path)
        .await
        .map_err(|e| format!("failed to open output file: {e}"))?;
    outfile
        .write_all(&rendered)
        .await
        .map_err(|_| "failed to write output file".to_string())?;
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    print_banner(run.no_color);

    format_kv_line("perf id", &run.perf_id);
    format_kv_line("gateway", &run.base_url);
    format_kv_line("snapshots", &run.timestamps.len().to_string());
    if let Some(spec) = run.sort.as_ref() {
        format_kv_line(
            "sort",
            &format!("{}:{}", spec.field.label(), spec.direction.label()),
        );
    }
    if run.verbose > 0 {
        format_kv_line("timeout", &format!("{}s", run.timeout));
        format_kv_line("workers", &run.workers.to_string());
        if let Some(proxy) = run.proxy.as_deref() {
            format_kv_line("proxy", proxy);
        }
    }
    println!();

    let client = GatewayClient::build(&ClientOptions {
        base_url: run.base_url.clone(),
        timeout_seconds: run.timeout,
        proxy: run.proxy.clone(),
        csrf_token: run.csrf_token.clone(),
        header: run.header.clone(),
    })
    .map_err(|e| e.to_string())?;

    let requests: Vec<AnalysisRequest> = run
        .timestamps
        .iter()
        .map(|ts| AnalysisRequest::new(&run.perf_id, ts))
        .collect();

    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::with_template(":: {spinner} querying gateway [{pos}/{len}] :: {msg}")
            .map_err(|e| format!("failed to build progress style: {e}"))?,
    );
    pb.set_length(requests.len() as u64);

    let now = Instant::now();

    // Submissions are issued in timestamp order; completions arrive in any
    // order and the session discards the stale ones, so the table always
    // belongs to the newest submission.
    let mut session = ViewSession::new(run.page_size);
    let tokens: Vec<_> = requests.iter().map(|_| session.submit_begin()).collect();

    let mut pending = FuturesUnordered::new();
    for (idx, request) in requests.iter().enumerate() {
        let client = &client;
        pending.push(async move { (idx, client.fetch_analysis(request).await) });
    }

    let mut displayed: Option<usize> = None;
    while let Some((idx, result)) = pending.next().await {
        pb.inc(1);
        let request = &requests[idx];
        match result {
            Ok(envelope) => match parse_success_signal(&envelope.data) {
                SuccessSignal::Confirmed => {
                    pb.println(format!(
                        "{} {} :: {}",
                        "confirmed".bright_green().bold(),
                        request.timestamp,
                        envelope.message.as_deref().unwrap_or("data available"),
                    ));
                    if session.submit_complete(tokens[idx], records_for_request(request)) {
                        displayed = Some(idx);
                    }
                }
                SuccessSignal::Unconfirmed => {
                    // not a hard failure: the gateway answered but never
                    // confirmed the operation
                    pb.println(format!(
                        "{} {} :: gateway did not confirm the operation",
                        "unconfirmed".bright_yellow().bold(),
                        request.timestamp,
                    ));
                    session.submit_abort(tokens[idx]);
                }
            },
            Err(e) => {
                pb.println(format!(
                    "{} {} :: {}",
                    "failed".bright_red().bold(),
                    request.timestamp,
                    e
                ));
                session.submit_abort(tokens[idx]);
            }
        }
    }
    pb.finish_and_clear();
    println!();

    if session.records().is_empty() {
        println!(":: No results :: no snapshot confirmed, nothing to display ::");
        return Ok(());
    }

    if let Some(spec) = run.sort {
        session.apply_sort(spec);
    }
    session.go_to_page(run.page);

    let displayed_request = &requests[displayed.unwrap_or(requests.len() - 1)];
    format_kv_line("snapshot", &displayed_request.timestamp);
    println!();
    print_table_page(&session, run.max_visible);

    write_output_file(&run, displayed_request, &session).await?;

    let elapsed_time = now.elapsed();
    println!();
    println!(
        ":: Completed :: analysis took {}s ::",
        elapsed_time.as_secs()
    );

    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    if args.init_config {
        let path = match args.config.as_deref() {
            Some(p) => config::expand_tilde(p),
            None => config::default_config_path()
                .ok_or_else(|| "could not resolve home directory".to_string())?,
        };
        config::ensure_default_config_file(&path)?;
        println!(":: wrote default config to {}", path.display());
        return Ok(());
    }

    let cfg = match args.config.as_deref() {
        Some(p) => config::load_config(&config::expand_tilde(p), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(run.workers.max(1))
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use clap::Parser;
    use crate::table::{SortDirection, SortField};

    fn base_args() -> Vec<&'static str> {
        vec!["dcsgap", "-p", "PLTU-3", "-T", "2024-03-01 07:30:00"]
    }

    #[test]
    fn cli_wins_over_config() {
        let mut argv = base_args();
        argv.extend(["--ps", "25", "--timeout", "30"]);
        let args = CliArgs::parse_from(argv);
        let cfg = ConfigFile {
            page_size: Some(10),
            timeout: Some(10),
            ..Default::default()
        };
        let run = build_run_config(args, cfg).unwrap();
        assert_eq!(run.page_size, 25);
        assert_eq!(run.timeout, 30);
    }

    #[test]
    fn config_fills_missing_values() {
        let args = CliArgs::parse_from(base_args());
        let cfg = ConfigFile {
            base_url: Some("http://dash.plant.local".to_string()),
            sort: Some("gap:desc".to_string()),
            ..Default::default()
        };
        let run = build_run_config(args, cfg).unwrap();
        assert_eq!(run.base_url, "http://dash.plant.local");
        let spec = run.sort.unwrap();
        assert_eq!(spec.field, SortField::Gap);
        assert_eq!(spec.direction, SortDirection::Descending);
    }

    #[test]
    fn perf_id_is_required() {
        let args = CliArgs::parse_from(["dcsgap", "-T", "2024-03-01 07:30:00"]);
        assert!(build_run_config(args, ConfigFile::default()).is_err());
    }

    #[test]
    fn timestamps_from_config_are_validated() {
        let args = CliArgs::parse_from(["dcsgap", "-p", "PLTU-3"]);
        let cfg = ConfigFile {
            timestamps: Some(vec!["yesterday".to_string()]),
            ..Default::default()
        };
        assert!(build_run_config(args, cfg).is_err());
    }

    #[test]
    fn defaults_apply_without_config() {
        let args = CliArgs::parse_from(base_args());
        let run = build_run_config(args, ConfigFile::default()).unwrap();
        assert_eq!(run.base_url, "http://localhost:8000");
        assert_eq!(run.page, 1);
        assert_eq!(run.page_size, 10);
        assert_eq!(run.max_visible, 5);
        assert!(run.sort.is_none());
    }
}
