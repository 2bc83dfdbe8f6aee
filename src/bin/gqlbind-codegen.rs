//! generate typed graphql bindings from a schema and operation documents
//!
//! every `--query` file becomes one module under `<out>/src`, holding the
//! enums, input objects, variables, response shapes, and request functions
//! for the operations it declares. operations that fail validation are
//! reported and skipped; the rest of the file is still written.
//!
//! command help reference (kept in sync with `gqlbind-codegen --help`):
#[doc = concat!("```text\n", include_str!("gqlbind-codegen-help.txt"), "\n```")]
pub const CLI_HELP: &str = include_str!("gqlbind-codegen-help.txt");

use gqlbind::{generate, render_bindings, CodegenOptions, Schema};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Args {
    schema_path: PathBuf,
    query_paths: Vec<PathBuf>,
    out_dir: PathBuf,
    crate_name: Option<String>,
    gqlbind_path: Option<String>,
    crate_path: Option<String>,
    upload_scalar: Option<String>,
    log_level: String,
}

enum ParseArgsError {
    Help,
    Message(String),
}

fn main() {
    let args = match parse_args(std::env::args().collect()) {
        Ok(args) => args,
        Err(ParseArgsError::Help) => {
            print!("{CLI_HELP}");
            return;
        }
        Err(ParseArgsError::Message(err)) => {
            eprintln!("{err}\n\n{CLI_HELP}");
            std::process::exit(1);
        }
    };

    match EnvFilter::try_new(&args.log_level) {
        Ok(filter) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        Err(err) => {
            eprintln!("invalid --log-level: {err}");
            std::process::exit(1);
        }
    }

    let schema = match fs::read_to_string(&args.schema_path) {
        Ok(schema) => schema,
        Err(err) => {
            eprintln!(
                "failed to read {}: {err}",
                args.schema_path.display()
            );
            std::process::exit(1);
        }
    };

    let schema = match Schema::parse(&schema) {
        Ok(schema) => schema,
        Err(err) => {
            eprintln!("failed to parse schema: {err}");
            std::process::exit(1);
        }
    };

    match generate_modules(&args, &schema) {
        Ok(0) => {}
        Ok(failures) => {
            eprintln!("{failures} operation(s) skipped");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("codegen failed: {err}");
            std::process::exit(1);
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<Args, ParseArgsError> {
    let mut schema_path = None;
    let mut query_paths = Vec::new();
    let mut out_dir = None;
    let mut crate_name = None;
    let mut gqlbind_path = None;
    let mut crate_path = None;
    let mut upload_scalar = None;
    let mut log_level = None;

    let mut iter = args.into_iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--schema" => schema_path = iter.next().map(PathBuf::from),
            "--query" => query_paths.extend(iter.next().map(PathBuf::from)),
            "--out" => out_dir = iter.next().map(PathBuf::from),
            "--crate-name" => crate_name = iter.next(),
            "--gqlbind-path" => gqlbind_path = iter.next(),
            "--crate-path" => crate_path = iter.next(),
            "--upload-scalar" => upload_scalar = iter.next(),
            "--log-level" => log_level = iter.next(),
            "--help" | "-h" => return Err(ParseArgsError::Help),
            _ => return Err(ParseArgsError::Message(format!("unknown argument: {arg}"))),
        }
    }

    let schema_path =
        schema_path.ok_or_else(|| ParseArgsError::Message("--schema is required".to_string()))?;
    let out_dir =
        out_dir.ok_or_else(|| ParseArgsError::Message("--out is required".to_string()))?;
    if query_paths.is_empty() {
        return Err(ParseArgsError::Message(
            "at least one --query is required".to_string(),
        ));
    }

    Ok(Args {
        schema_path,
        query_paths,
        out_dir,
        crate_name,
        gqlbind_path,
        crate_path,
        upload_scalar,
        log_level: log_level.unwrap_or_else(|| "warn".to_string()),
    })
}

/// write one module per query file, returning the number of skipped operations
fn generate_modules(args: &Args, schema: &Schema) -> Result<usize, String> {
    let mut options = CodegenOptions::default();
    if let Some(path) = &args.crate_path {
        options = options.with_crate_path(path.clone());
    }
    if let Some(name) = &args.upload_scalar {
        options = options.with_upload_scalar(name.clone());
    }

    let src_dir = args.out_dir.join("src");
    fs::create_dir_all(&src_dir).map_err(|err| err.to_string())?;

    let mut failures = 0;
    let mut modules = Vec::new();
    for path in &args.query_paths {
        let source = fs::read_to_string(path)
            .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
        let generated = generate(schema, &source, &options)
            .map_err(|err| format!("{}: {err}", path.display()))?;

        for (operation, err) in &generated.failures {
            eprintln!("{}: operation `{operation}`: {err}", path.display());
        }
        failures += generated.failures.len();

        let module = module_name(path);
        let rendered = render_bindings(&generated.bindings, &options);
        fs::write(src_dir.join(format!("{module}.rs")), rendered).map_err(|err| err.to_string())?;
        info!(
            file = %path.display(),
            module = %module,
            operations = generated.bindings.len(),
            "wrote bindings"
        );
        modules.push(module);
    }

    if let Some(crate_name) = &args.crate_name {
        let mut cargo = String::new();
        cargo.push_str("[package]\n");
        cargo.push_str(&format!("name = \"{}\"\n", crate_name));
        cargo.push_str("version = \"0.1.0\"\n");
        cargo.push_str("edition = \"2021\"\n\n");
        cargo.push_str("[dependencies]\n");
        if let Some(path) = &args.gqlbind_path {
            cargo.push_str(&format!("gqlbind = {{ path = \"{}\" }}\n", path));
        } else {
            cargo.push_str(&format!("gqlbind = \"{}\"\n", env!("CARGO_PKG_VERSION")));
        }
        cargo.push_str("serde = { version = \"1\", features = [\"derive\"] }\n");
        cargo.push_str("serde_json = \"1\"\n");
        fs::write(args.out_dir.join("Cargo.toml"), cargo).map_err(|err| err.to_string())?;
    }

    fs::write(src_dir.join("lib.rs"), render_lib(&modules)).map_err(|err| err.to_string())?;

    Ok(failures)
}

fn render_lib(modules: &[String]) -> String {
    let mut out = String::new();
    out.push_str("//! generated graphql bindings\n\n");
    for module in modules {
        out.push_str(&format!("pub mod {module};\n"));
    }
    out
}

/// module name from a file stem, e.g. `get-user.graphql` -> `get_user`
fn module_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut out: String = stem
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() || out.starts_with(|ch: char| ch.is_ascii_digit()) {
        out.insert_str(0, "ops_");
    }
    out
}
