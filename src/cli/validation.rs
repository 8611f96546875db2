use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    for raw in args.timestamps.iter() {
        crate::utils::validate_timestamp(raw).map_err(|e| format!("invalid --ts '{raw}': {e}"))?;
    }
    if let Some(raw) = args.sort.as_deref() {
        crate::utils::parse_sort_spec(raw).map_err(|e| format!("invalid --sort '{raw}': {e}"))?;
    }
    if let Some(raw) = args.header.as_deref() {
        crate::utils::parse_header_line(raw)
            .map_err(|e| format!("invalid --hdr '{raw}': {e}"))?;
    }
    if let Some(page_size) = args.page_size {
        if page_size == 0 {
            return Err("invalid --page-size, expected positive integer".to_string());
        }
    }
    if let Some(max_visible) = args.max_visible {
        if max_visible == 0 {
            return Err("invalid --max-visible, expected positive integer".to_string());
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid --timeout, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text, json, or xml"
            ));
        }
    }
    Ok(())
}
