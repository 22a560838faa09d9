//! roledoc: write thematic-role documentation into source comments and
//! read it back.
//!
//! `decode` supports two modes:
//!
//! - **stdin mode**: `roledoc decode < comment.txt` prints the entries as JSON
//! - **file mode**: `roledoc decode -o out/ comments/*.txt` writes one JSON file per input

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use roledoc::parser::attach::apply;
use roledoc::parser::legacy::convert_plain;
use roledoc::{
    create_codec, find_grid_name, generate_artifact, generate_interface, generate_operation,
    Catalog, Codec, Comment, Decoded, Operation, Registry, SignatureElement,
};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "roledoc",
    about = "Write thematic-role documentation into source comments and read it back"
)]
struct Cli {
    /// Comment format: compact (default) or rich
    #[arg(short = 'f', long, default_value = "compact", global = true)]
    format: String,

    /// Role and addressee catalog (JSON). The built-in catalog is used if omitted.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Log debug messages to stderr
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode comments into documentation entries (JSON)
    Decode {
        /// Comment files (glob patterns supported). If omitted, reads from stdin.
        files: Vec<String>,

        /// Output directory (required when files are given)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Operation signature (JSON) the comments belong to
        #[arg(short = 's', long)]
        signature: Option<PathBuf>,

        /// Print the signature with the decoded entries attached
        #[arg(long, requires = "signature")]
        attach: bool,

        /// Treat the input as an ordinary comment without roles
        #[arg(long)]
        plain: bool,
    },

    /// Encode the entries attached to a signature into comments
    Encode {
        /// Signature (JSON): an operation, interface or artifact
        signature: PathBuf,

        /// Print comment lines without the /** */ frame
        #[arg(long)]
        bare: bool,
    },

    /// Print the thematic grid named by a comment read from stdin
    Grid,

    /// Print documentation-tool options declaring the custom tags and roles
    Options,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let catalog = load_catalog(cli.catalog.as_deref())?;
    let codec = create_codec(&cli.format, &catalog)?;

    match cli.command {
        Command::Decode {
            ref files,
            ref output,
            ref signature,
            attach,
            plain,
        } => {
            let operation = match signature {
                Some(path) => Some(load_operation(path)?),
                None => None,
            };
            let opts = DecodeOptions {
                codec: codec.as_ref(),
                catalog: &catalog,
                operation: operation.as_ref(),
                attach,
                plain,
            };
            if files.is_empty() {
                stdin_mode(&opts)
            } else {
                file_mode(&opts, files, output.as_deref())
            }
        }
        Command::Encode { ref signature, bare } => encode(codec.as_ref(), signature, bare),
        Command::Grid => {
            let input = read_stdin()?;
            if let Some(name) = find_grid_name(&Comment::parse(&input)) {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Options => {
            println!("{}", roledoc::taglet::taglet_options(&catalog.roles()));
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout only carries generated output.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read catalog: {}", path.display()))?;
            Catalog::from_json(&json)
                .with_context(|| format!("invalid catalog: {}", path.display()))
        }
        None => Ok(Catalog::builtin()),
    }
}

fn load_signature(path: &Path) -> Result<SignatureElement> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read signature: {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("invalid signature: {}", path.display()))
}

fn load_operation(path: &Path) -> Result<Operation> {
    match load_signature(path)? {
        SignatureElement::Operation(op) => Ok(op),
        other => bail!(
            "decode needs an operation signature, {} describes {}",
            path.display(),
            other.info().identifier
        ),
    }
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    Ok(input)
}

struct DecodeOptions<'a> {
    codec: &'a dyn Codec,
    catalog: &'a Catalog,
    operation: Option<&'a Operation>,
    attach: bool,
    plain: bool,
}

/// Decode one comment and render the JSON to print or write.
fn decode_to_json(opts: &DecodeOptions<'_>, input: &str) -> Result<String> {
    let comment = Comment::parse(input);
    let decoded = if opts.plain {
        Decoded {
            documentations: convert_plain(&comment, opts.catalog, opts.operation),
            additional_tags: Vec::new(),
        }
    } else {
        opts.codec.decode(&comment, opts.operation)?
    };

    let json = match opts.operation {
        Some(op) if opts.attach => {
            let mut op = op.clone();
            apply(&mut op, decoded)?;
            serde_json::to_string_pretty(&SignatureElement::Operation(op))?
        }
        _ => serde_json::to_string_pretty(&decoded)?,
    };
    Ok(json)
}

/// stdin mode: read one comment from stdin, write JSON to stdout.
fn stdin_mode(opts: &DecodeOptions<'_>) -> Result<()> {
    let input = read_stdin()?;
    println!("{}", decode_to_json(opts, &input)?);
    Ok(())
}

/// file mode: decode every input file into `<output>/<name>.json`.
fn file_mode(opts: &DecodeOptions<'_>, files: &[String], output: Option<&Path>) -> Result<()> {
    let output_dir = output.context("--output is required when files are given")?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;

    for path in expand_globs(files, COMMENT_EXTENSIONS)? {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let json = match decode_to_json(opts, &content) {
            Ok(json) => json,
            Err(e) => {
                warn!("skipping {}: {:#}", path.display(), e);
                continue;
            }
        };

        let name = derive_output_name(&path.to_string_lossy());
        let out_path = output_dir.join(format!("{}.json", name));
        debug!(input = %path.display(), output = %out_path.display(), "decoded");
        fs::write(&out_path, json + "\n")
            .with_context(|| format!("failed to write {}", out_path.display()))?;
    }
    Ok(())
}

fn encode(codec: &dyn Codec, signature: &Path, bare: bool) -> Result<()> {
    let frame = |comment: &Comment| {
        if bare {
            comment.render()
        } else {
            comment.render_block()
        }
    };

    match load_signature(signature)? {
        SignatureElement::Operation(op) => {
            print!("{}", frame(&generate_operation(&op, codec)?));
        }
        SignatureElement::Interface(iface) => {
            for (name, comment) in generate_interface(&iface, codec)? {
                print!("// {}\n{}\n", name, frame(&comment));
            }
        }
        SignatureElement::Artifact(artifact) => {
            for (name, comment) in generate_artifact(&artifact, codec)? {
                print!("// {}\n{}\n", name, frame(&comment));
            }
        }
        other => bail!(
            "cannot encode {}: expected an operation, interface or artifact",
            other.info().identifier
        ),
    }
    Ok(())
}

/// Comment sources picked up when a directory is given.
const COMMENT_EXTENSIONS: &[&str] = &["txt", "java", "rs"];

/// Resolve each argument to comment files: a file as is, a directory by
/// its entries with one of `extensions`, anything else as a glob pattern.
fn expand_globs(patterns: &[String], extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let has_extension = |p: &Path| {
        p.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.contains(&ext))
    };

    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        let found: Vec<PathBuf> = if path.is_file() {
            vec![path.to_path_buf()]
        } else if path.is_dir() {
            fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?
                .flatten()
                .map(|entry| entry.path())
                .filter(|p| p.is_file() && has_extension(p.as_path()))
                .collect()
        } else {
            glob::glob(pattern)
                .with_context(|| format!("invalid glob pattern: {}", pattern))?
                .filter_map(|r| r.ok())
                .filter(|p| p.is_file())
                .collect()
        };
        if found.is_empty() {
            warn!("no comment files in {}", pattern);
        }
        files.extend(found);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// "comments/save.txt" → "save", "src/Store.java" → "Store"
fn derive_output_name(source: &str) -> String {
    let filename = source.rsplit('/').next().unwrap_or(source);
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => filename.to_string(),
    }
}
