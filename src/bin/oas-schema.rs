//! OAS Schema CLI
//!
//! Command-line interface for checking requests and responses against an
//! OpenAPI specification without running the host application.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use oas_schema::{
    body_schema, load_spec_auto, parameter_list, path_key, path_param_schema, query_schema,
    validate_request, ConfigError, GuardConfig, GuardError, HttpRequest, HttpResponse,
    ResponseOptions, ResponseValidator, SchemaStore,
};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oas-schema")]
#[command(about = "Validate requests and responses against an OpenAPI specification")]
#[command(version)]
struct Cli {
    /// Specification source: file path or URL (default: $OAS_FILE or schemas/oas.json)
    #[arg(long, global = true)]
    spec: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the lookup key and derived schemas for a route
    Schemas {
        /// Route template in <param> syntax (e.g. /books/<isbn>)
        route: String,

        /// HTTP method
        #[arg(long, short, default_value = "get")]
        method: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a request
    Request {
        /// Route template in <param> syntax (e.g. /books/<isbn>)
        route: String,

        /// HTTP method
        #[arg(long, short, default_value = "get")]
        method: String,

        /// Request URL carrying the query string (default: the route)
        #[arg(long)]
        url: Option<String>,

        /// Route variable as NAME=VALUE (repeatable)
        #[arg(long = "param", short = 'p', value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// File holding the request body
        #[arg(long)]
        body: Option<PathBuf>,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Validate a handler response
    Response {
        /// Route template in <param> syntax (e.g. /books/<isbn>)
        route: String,

        /// HTTP method
        #[arg(long, short, default_value = "get")]
        method: String,

        /// Status code the handler returned
        #[arg(long, short)]
        status: u16,

        /// JSON file holding the response payload
        #[arg(long, conflicts_with = "text")]
        body: Option<PathBuf>,

        /// Plain-text response payload
        #[arg(long)]
        text: Option<String>,

        /// Fail on mismatch
        #[arg(long)]
        emit_error: bool,

        /// Warn on mismatch
        #[arg(long)]
        emit_warning: bool,

        /// Log an error record on mismatch
        #[arg(long)]
        emit_log: bool,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let config = GuardConfig::from_env(Path::new("."));
    let source = cli.spec.unwrap_or_else(|| config.oas_file.clone());

    let result = match cli.command {
        Commands::Schemas {
            route,
            method,
            pretty,
        } => run_schemas(&source, &route, &method, pretty),

        Commands::Request {
            route,
            method,
            url,
            params,
            body,
            json,
        } => run_request(
            &source,
            RequestArgs {
                route,
                method,
                url,
                params,
                body,
                json_output: json,
            },
        ),

        Commands::Response {
            route,
            method,
            status,
            body,
            text,
            emit_error,
            emit_warning,
            emit_log,
            json,
        } => {
            let options = if emit_error || emit_warning || emit_log {
                ResponseOptions {
                    emit_error,
                    emit_warning,
                    emit_log,
                }
            } else {
                config.response
            };
            run_response(
                &source,
                ResponseArgs {
                    route,
                    method,
                    status,
                    body,
                    text,
                    options,
                    json_output: json,
                },
            )
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got `{}`", s))
}

fn load_store(source: &str, json_output: bool) -> Result<SchemaStore, u8> {
    load_spec_auto(source)
        .and_then(SchemaStore::from_value)
        .map_err(|e| {
            report_error(json_output, &format!("loading specification: {}", e));
            e.exit_code() as u8
        })
}

fn run_schemas(source: &str, route: &str, method: &str, pretty: bool) -> Result<(), u8> {
    let store = load_store(source, false)?;
    let key = path_key(route, store.base_path());
    let method = method.to_lowercase();

    let lookup = store
        .path_item(&key)
        .and_then(|item| Ok((item, store.operation(&key, &method)?)));
    let (path_item, operation) = lookup.map_err(|e: ConfigError| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let output = json!({
        "key": key,
        "path": path_param_schema(parameter_list(path_item)),
        "query": query_schema(parameter_list(operation)),
        "body": body_schema(parameter_list(operation)),
    });

    let rendered = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;
    println!("{}", rendered);
    Ok(())
}

struct RequestArgs {
    route: String,
    method: String,
    url: Option<String>,
    params: Vec<(String, String)>,
    body: Option<PathBuf>,
    json_output: bool,
}

fn run_request(source: &str, args: RequestArgs) -> Result<(), u8> {
    let RequestArgs {
        route,
        method,
        url,
        params,
        body,
        json_output,
    } = args;
    let store = load_store(source, json_output)?;

    let url = url.unwrap_or_else(|| route.clone());
    let mut request = HttpRequest::new(method, url, route);
    for (name, value) in params {
        request = request.view_arg(name, value);
    }
    if let Some(path) = body {
        let bytes = std::fs::read(&path).map_err(|e| {
            report_error(json_output, &format!("reading {}: {}", path.display(), e));
            3u8
        })?;
        request = request.body(bytes);
    }

    report_outcome(validate_request(&store, &request), json_output)
}

struct ResponseArgs {
    route: String,
    method: String,
    status: u16,
    body: Option<PathBuf>,
    text: Option<String>,
    options: ResponseOptions,
    json_output: bool,
}

fn run_response(source: &str, args: ResponseArgs) -> Result<(), u8> {
    let ResponseArgs {
        route,
        method,
        status,
        body,
        text,
        options,
        json_output,
    } = args;
    let store = load_store(source, json_output)?;

    let response = match (body, text) {
        (Some(path), _) => {
            let payload: Value = oas_schema::read_json(&path).map_err(|e| {
                report_error(json_output, &format!("loading payload: {}", e));
                e.exit_code() as u8
            })?;
            HttpResponse::json(status, payload)
        }
        (None, Some(text)) => HttpResponse::text(status, text),
        (None, None) => HttpResponse::new(status, Default::default()),
    };

    let request = HttpRequest::new(method, route.clone(), route);
    let validator = ResponseValidator::new(options);
    report_outcome(validator.validate(&store, &request, &response), json_output)
}

fn report_outcome(result: Result<(), GuardError>, json_output: bool) -> Result<(), u8> {
    match result {
        Ok(()) => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(GuardError::Config(e)) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
        Err(e) => {
            if json_output {
                let output = json!({
                    "valid": false,
                    "status": e.status_code(),
                    "error": e.to_string(),
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed: {}", e);
            }
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
