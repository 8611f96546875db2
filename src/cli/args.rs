use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dcsgap",
    version,
    about = "DCS performance-gap analysis tool",
    long_about = "Dcsgap pulls measurement snapshots for a performance id from a DCS gateway proxy and renders the reference-vs-existing comparison table with the computed gap per parameter.\n\nExamples:\n  dcsgap -p PLTU-3 -T \"2024-03-01 07:30:00\"\n  dcsgap -p PLTU-3 -T \"2024-03-01 07:30:00\" -s gap:desc --page 2\n  dcsgap -p PLTU-3 -T \"2024-03-01 07:30:00\" --config ~/.dcsgap/config.yml\n\nTip: Use --config to persist the gateway location and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'p',
        long = "pid",
        visible_alias = "perf-id",
        value_name = "ID",
        help_heading = "Input",
        help = "Performance id to analyze."
    )]
    pub perf_id: Option<String>,

    #[arg(
        short = 'T',
        long = "ts",
        visible_alias = "timestamp",
        value_name = "TIMESTAMP",
        action = ArgAction::Append,
        help_heading = "Input",
        help = "Snapshot timestamp \"YYYY-MM-DD HH:MM:SS\" (repeatable; the latest submission wins the table)."
    )]
    pub timestamps: Vec<String>,

    #[arg(
        short = 'b',
        long = "base",
        visible_alias = "base-url",
        value_name = "URL",
        help_heading = "Input",
        help = "Base URL of the backend proxy fronting the DCS gateway."
    )]
    pub base_url: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.dcsgap/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write the default config file if missing, then exit."
    )]
    pub init_config: bool,

    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'x',
        long = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "Route gateway calls through an HTTP proxy."
    )]
    pub proxy: Option<String>,

    #[arg(
        long = "csrf",
        visible_alias = "csrf-token",
        value_name = "TOKEN",
        help_heading = "HTTP",
        help = "CSRF token attached as X-CSRF-TOKEN on mutating requests."
    )]
    pub csrf_token: Option<String>,

    #[arg(
        short = 'H',
        long = "hdr",
        visible_alias = "header",
        value_name = "HEADER",
        help_heading = "HTTP",
        help = "Extra header sent with every request (\"Key: Value\")."
    )]
    pub header: Option<String>,

    #[arg(
        short = 's',
        long = "sort",
        value_name = "FIELD[:DIR]",
        help_heading = "Table",
        help = "Sort column: no, parameter, uom, reference, existing, gap; optional :asc/:desc."
    )]
    pub sort: Option<String>,

    #[arg(
        long = "page",
        value_name = "N",
        allow_negative_numbers = true,
        help_heading = "Table",
        help = "Page to display (out-of-range values clamp silently)."
    )]
    pub page: Option<i64>,

    #[arg(
        long = "ps",
        visible_alias = "page-size",
        value_name = "N",
        help_heading = "Table",
        help = "Rows per page."
    )]
    pub page_size: Option<u32>,

    #[arg(
        long = "mv",
        visible_alias = "max-visible",
        value_name = "N",
        help_heading = "Table",
        help = "Width of the page-number strip."
    )]
    pub max_visible: Option<u32>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the displayed snapshot's records to a file."
    )]
    pub output: Option<String>,

    #[arg(
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output file format: text, json, or xml (inferred from the extension when omitted)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'w',
        long = "workers",
        value_name = "N",
        help_heading = "Performance",
        help = "Tokio worker threads."
    )]
    pub workers: Option<usize>,
}
