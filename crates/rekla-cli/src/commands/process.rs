//! Process command - scan a single invoice file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use rekla_core::invoice::rules::format_norwegian_amount;
use rekla_core::models::{ParseResult, RawDocument, ReklaConfig};
use rekla_core::ocr::OcrSource;
use rekla_core::{InvoiceParser, InvoiceScanner, PureOcrEngine};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// OCR model directory (enables the OCR fallback)
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Skip OCR and use only the PDF text layer
    #[arg(long)]
    text_only: bool,

    /// Show the extraction confidence score
    #[arg(long)]
    show_confidence: bool,

    /// Print scan warnings to stderr
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Loading document...");
    pb.set_position(10);

    let document = read_document(&args.input)?;

    pb.set_message("Scanning invoice...");
    pb.set_position(40);

    let mut scanner = InvoiceScanner::new(config);
    if !args.text_only {
        if let Some(ocr) = build_ocr(args.model_dir.as_deref())? {
            scanner = scanner.with_ocr(ocr);
        }
    }

    let result = scanner.parse(&document)?;

    pb.set_position(90);
    pb.finish_with_message("Done");

    if args.show_warnings && !result.metadata.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &result.metadata.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {}%",
            style("ℹ").blue(),
            result.confidence
        );
        if let Some(time_ms) = result.metadata.processing_time_ms {
            println!("{} Processing time: {}ms", style("ℹ").blue(), time_ms);
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ReklaConfig> {
    match config_path {
        Some(path) => Ok(ReklaConfig::from_file(Path::new(path))?),
        None => Ok(ReklaConfig::default()),
    }
}

/// Map a file extension onto a raw document, reading the bytes.
pub fn read_document(path: &Path) -> anyhow::Result<RawDocument> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let bytes = fs::read(path)?;

    match extension.as_str() {
        "pdf" => Ok(RawDocument::pdf(bytes)),
        "png" | "jpg" | "jpeg" | "tiff" | "tif" | "bmp" => Ok(RawDocument::image(bytes)),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

/// Load the OCR engine when a model directory is available.
pub fn build_ocr(model_dir: Option<&Path>) -> anyhow::Result<Option<Box<dyn OcrSource>>> {
    let Some(dir) = model_dir else {
        debug!("no model directory given, OCR fallback disabled");
        return Ok(None);
    };

    if !dir.exists() {
        anyhow::bail!("Model directory not found: {}", dir.display());
    }

    let engine = PureOcrEngine::from_dir(dir)
        .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))?;

    Ok(Some(Box::new(engine)))
}

pub fn format_result(result: &ParseResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ParseResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "invoice_number",
        "invoice_date",
        "supplier_name",
        "customer_name",
        "work_cost",
        "parts_cost",
        "travel_cost",
        "overtime_cost",
        "vehicle_cost",
        "other_cost",
        "grand_total",
        "confidence",
    ])?;

    let fields = &result.fields;
    let totals = &result.totals;

    wtr.write_record([
        fields.invoice_number.clone().unwrap_or_default(),
        fields
            .invoice_date
            .map(|d| d.to_string())
            .unwrap_or_default(),
        fields.supplier_name.clone().unwrap_or_default(),
        fields.customer_name.clone().unwrap_or_default(),
        totals.work_cost.to_string(),
        totals.parts_cost.to_string(),
        totals.travel_cost.to_string(),
        totals.overtime_cost.to_string(),
        totals.vehicle_cost.to_string(),
        totals.other_cost.to_string(),
        totals.grand_total.to_string(),
        result.confidence.to_string(),
    ])?;

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(result: &ParseResult) -> String {
    let mut output = String::new();
    let fields = &result.fields;

    output.push_str(&format!(
        "Invoice: {}\n",
        fields.invoice_number.as_deref().unwrap_or("-")
    ));
    if let Some(date) = fields.invoice_date {
        output.push_str(&format!("Date: {}\n", date));
    }
    if let Some(supplier) = &fields.supplier_name {
        output.push_str(&format!("Supplier: {}\n", supplier));
    }
    if let Some(customer) = &fields.customer_name {
        output.push_str(&format!("Customer: {}\n", customer));
    }
    output.push('\n');

    if !result.rows.is_empty() {
        output.push_str("Rows:\n");
        for row in &result.rows {
            output.push_str(&format!(
                "  [{}] {}  {} x {} = {}\n",
                row.category.label(),
                row.description,
                row.quantity,
                format_norwegian_amount(row.unit_price),
                format_norwegian_amount(row.total_price)
            ));
        }
        output.push('\n');
    }

    let totals = &result.totals;
    output.push_str("Totals:\n");
    for (label, amount) in [
        ("Arbeid", totals.work_cost),
        ("Deler", totals.parts_cost),
        ("Reise", totals.travel_cost),
        ("Overtid", totals.overtime_cost),
        ("Servicebil", totals.vehicle_cost),
        ("Annet", totals.other_cost),
    ] {
        if !amount.is_zero() {
            output.push_str(&format!(
                "  {:<10} {}\n",
                label,
                format_norwegian_amount(amount)
            ));
        }
    }
    output.push_str(&format!(
        "  {:<10} {}\n",
        "Totalt",
        format_norwegian_amount(totals.grand_total)
    ));

    output
}
