use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use metaform_binding::record::from_json;
use metaform_binding::{
    AcceptingManager, CatalogLocalizer, Form, JsonRecord, Localizer, MemoryWidget, Monitor, StatusMessage,
    json_form_monitor, load_description,
};
use metaform_tui::{FormView, TerminalWidget, run_form};
use metaform_types::{FieldFormat, FieldMetadata, PrintMode, ValueType};
use metaform_util::{FormSettings, metaform_config_dir};
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "metaform.log";

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let (settings, settings_error) = match FormSettings::new() {
        Ok(settings) => (settings, None),
        Err(error) => (FormSettings::ephemeral(), Some(error)),
    };

    // The terminal view owns the screen, so its logs go to a file.
    let log_file = matches
        .subcommand_name()
        .filter(|name| *name == "edit")
        .map(|_| metaform_config_dir().join(LOG_FILE_NAME));
    init_tracing(&settings.snapshot().log_filter, log_file.as_deref())?;
    if let Some(error) = settings_error {
        warn!(%error, "settings unavailable; using defaults");
    }

    match matches.subcommand() {
        Some(("format", sub)) => run_format(sub),
        Some(("check", sub)) => run_check(sub, &settings),
        Some(("edit", sub)) => run_edit(sub, &settings),
        _ => {
            cli().print_help()?;
            Ok(())
        }
    }
}

fn init_tracing(default_filter: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
    Ok(())
}

fn cli() -> Command {
    let form = Arg::new("form")
        .long("form")
        .short('f')
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .help("Form description (JSON, or YAML by extension)");
    let values = Arg::new("values")
        .long("values")
        .short('v')
        .value_parser(clap::value_parser!(PathBuf))
        .help("JSON object holding the record");
    let catalog = Arg::new("catalog")
        .long("catalog")
        .short('c')
        .value_parser(clap::value_parser!(PathBuf))
        .help("String catalog with labels, tooltips and messages");
    let locale = Arg::new("locale")
        .long("locale")
        .short('l')
        .action(ArgAction::Set)
        .help("Locale to use instead of the configured one");

    Command::new("metaform")
        .about("Metadata-driven form fields from the command line")
        .subcommand(
            Command::new("format")
                .about("Parse a field format and show its canonical form")
                .arg(Arg::new("format").required(true).help("Format string, e.g. 10.2m>"))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .short('t')
                        .default_value("string")
                        .help("Declared value type (string, int, double, date, enum, ...)"),
                )
                .arg(
                    Arg::new("constants")
                        .long("constants")
                        .value_delimiter(',')
                        .action(ArgAction::Append)
                        .help("Enumeration constants for --type enum"),
                )
                .arg(Arg::new("value").long("value").help("Value to print with the format"))
                .arg(
                    Arg::new("creole")
                        .long("creole")
                        .action(ArgAction::SetTrue)
                        .help("Print the value as a Creole no-wiki block"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate a record against a form description")
                .arg(form.clone())
                .arg(values.clone())
                .arg(catalog.clone())
                .arg(locale.clone()),
        )
        .subcommand(
            Command::new("edit")
                .about("Edit a record in the terminal")
                .arg(form)
                .arg(values)
                .arg(catalog)
                .arg(locale)
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Where to write the edited record (stdout by default)"),
                ),
        )
}

fn run_format(matches: &ArgMatches) -> Result<()> {
    let source = matches.get_one::<String>("format").context("missing format")?;
    let type_name = matches.get_one::<String>("type").context("missing type")?;
    let constants: Vec<String> = matches
        .get_many::<String>("constants")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let value_type = parse_value_type(type_name, constants)?;
    let format = FieldFormat::parse(&value_type, source).with_context(|| format!("invalid format '{}'", source))?;

    let mut summary = format_summary(&format);
    if let Some(raw) = matches.get_one::<String>("value") {
        let mode = if matches.get_flag("creole") {
            PrintMode::CreoleText
        } else {
            PrintMode::SingleText
        };
        summary["printed"] = match parse_cli_value(&value_type, raw)? {
            Some(value) => Value::String(format.print(&value, mode)),
            None => Value::Null,
        };
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn parse_value_type(name: &str, constants: Vec<String>) -> Result<ValueType> {
    if name.eq_ignore_ascii_case("enum") {
        if constants.is_empty() {
            bail!("--type enum needs --constants");
        }
        return Ok(ValueType::Enum(constants));
    }
    serde_json::from_value(Value::String(name.to_ascii_lowercase()))
        .with_context(|| format!("unknown value type '{}'", name))
}

/// Command line values are JSON when they parse as JSON, plain strings otherwise.
fn parse_cli_value(value_type: &ValueType, raw: &str) -> Result<Option<metaform_types::FieldValue>> {
    let json = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok(from_json(value_type, &json)?)
}

fn format_summary(format: &FieldFormat) -> Value {
    json!({
        "canonical": format.to_format_string(),
        "content_type": format.content_type(),
        "alignment": format.alignment(),
        "length": format.length(),
        "height": format.height(),
        "precision": format.precision(),
        "mask": format.mask(),
        "mandatory": format.is_mandatory(),
        "read_only": format.is_read_only(false),
        "read_only_on_existent": format.is_read_only(true),
        "output": format.is_output(),
        "supports_nulls": format.supports_nulls(),
        "select_on_focus": format.select_on_focus(),
        "in_list": format.is_used_in_list(),
        "anchored": format.is_anchored(),
        "local_editor": format.has_local_editor(),
    })
}

fn load_record(path: Option<&PathBuf>) -> Result<JsonRecord> {
    let Some(path) = path else {
        return Ok(JsonRecord::new());
    };
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    match serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))? {
        Value::Object(record) => Ok(record),
        other => bail!("{} must hold a JSON object, found {}", path.display(), other),
    }
}

fn load_catalog(path: Option<&PathBuf>, locale: &str) -> Result<Rc<CatalogLocalizer>> {
    let catalog = match path {
        Some(path) => CatalogLocalizer::from_path(path).with_context(|| format!("loading catalog {}", path.display()))?,
        None => CatalogLocalizer::new(),
    };
    if catalog.current_locale() != locale
        && let Err(error) = catalog.set_locale(locale)
    {
        warn!(locale, %error, "keeping catalog locale");
    }
    debug!(locale = %catalog.current_locale(), "catalog ready");
    Ok(Rc::new(catalog))
}

fn requested_locale(matches: &ArgMatches, settings: &FormSettings) -> String {
    matches
        .get_one::<String>("locale")
        .cloned()
        .unwrap_or_else(|| settings.locale())
}

/// Outcome of checking one field.
#[derive(Debug, Clone, PartialEq)]
struct FieldReport {
    name: String,
    label: String,
    problem: Option<String>,
}

/// Load `record` into a headless form and run final validation on every field.
fn check_record(fields: &[FieldMetadata], record: JsonRecord, localizer: Rc<dyn Localizer>) -> Result<Vec<FieldReport>> {
    let conversion: Vec<Option<String>> = fields
        .iter()
        .map(|metadata| {
            record
                .get(metadata.name())
                .and_then(|value| from_json(metadata.value_type(), value).err())
                .map(|error| error.to_string())
        })
        .collect();

    let monitor = Rc::new(
        json_form_monitor(record, fields, AcceptingManager, localizer.clone()).with_tooltips_on_focus(false),
    );
    let shared: Rc<dyn Monitor> = monitor.clone();
    let mut form = Form::from_description(fields.iter().cloned(), shared, localizer, |_| MemoryWidget::new())?;
    form.show();

    let mut reports = Vec::with_capacity(fields.len());
    for (metadata, conversion) in fields.iter().zip(conversion) {
        let control = form
            .control_mut(metadata.name())
            .with_context(|| format!("field '{}' missing from the form", metadata.name()))?;
        let problem = match conversion {
            Some(problem) => Some(problem),
            None if control.on_final_validation() => None,
            None => Some(match monitor.status() {
                Some(StatusMessage::Error(message)) => message,
                _ => "rejected".to_string(),
            }),
        };
        reports.push(FieldReport {
            name: metadata.name().to_string(),
            label: control.label().to_string(),
            problem,
        });
    }
    Ok(reports)
}

fn run_check(matches: &ArgMatches, settings: &FormSettings) -> Result<()> {
    let form_path = matches.get_one::<PathBuf>("form").context("missing --form")?;
    let fields = load_description(form_path).with_context(|| format!("loading {}", form_path.display()))?;
    let record = load_record(matches.get_one::<PathBuf>("values"))?;
    let catalog = load_catalog(matches.get_one::<PathBuf>("catalog"), &requested_locale(matches, settings))?;

    let reports = check_record(&fields, record, catalog)?;
    for report in &reports {
        match &report.problem {
            None => println!("ok     {} ({})", report.label, report.name),
            Some(problem) => println!("FAILED {} ({}): {}", report.label, report.name, problem),
        }
    }
    let failed = reports.iter().filter(|report| report.problem.is_some()).count();
    info!(fields = reports.len(), failed, "record checked");
    if failed > 0 {
        bail!("{} of {} fields failed validation", failed, reports.len());
    }
    Ok(())
}

fn run_edit(matches: &ArgMatches, settings: &FormSettings) -> Result<()> {
    let form_path = matches.get_one::<PathBuf>("form").context("missing --form")?;
    let fields = load_description(form_path).with_context(|| format!("loading {}", form_path.display()))?;
    let record = load_record(matches.get_one::<PathBuf>("values"))?;
    let catalog = load_catalog(matches.get_one::<PathBuf>("catalog"), &requested_locale(matches, settings))?;
    let localizer: Rc<dyn Localizer> = catalog.clone();

    let monitor = Rc::new(
        json_form_monitor(record, &fields, AcceptingManager, localizer.clone())
            .with_tooltips_on_focus(settings.snapshot().tooltips_on_focus),
    );
    let shared: Rc<dyn Monitor> = monitor.clone();
    let form = Form::from_description(fields, shared, localizer, |_| TerminalWidget::new())?;
    let title = form_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "form".to_string());
    let mut view = FormView::new(title, form, monitor.clone()).with_catalog(catalog.clone());
    run_form(&mut view)?;

    let locale = catalog.current_locale();
    if locale != settings.locale() {
        settings.set_locale(locale).context("saving locale")?;
    }

    let output = serde_json::to_string_pretty(&*monitor.record())?;
    match matches.get_one::<PathBuf>("output") {
        Some(path) => fs::write(path, output).with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", output),
    }
    Ok(())
}
