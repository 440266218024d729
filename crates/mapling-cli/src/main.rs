use mapling::MindMapNode;
use mapling::geom::size;
use mapling::view::MindMapView;
use serde::Serialize;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    View(mapling::ViewError),
    Export(mapling::ExportError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::View(err) => write!(f, "{err}"),
            CliError::Export(err) => write!(f, "{err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<mapling::ViewError> for CliError {
    fn from(value: mapling::ViewError) -> Self {
        Self::View(value)
    }
}

impl From<mapling::ExportError> for CliError {
    fn from(value: mapling::ExportError) -> Self {
        Self::Export(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    Layout,
    #[default]
    Render,
    Export,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    width: f64,
    height: f64,
    collapsed: Vec<String>,
    no_highlight: bool,
    plain_edges: bool,
    pretty: bool,
    out: Option<String>,
}

fn usage() -> &'static str {
    "mapling-cli\n\
\n\
USAGE:\n\
  mapling-cli layout [--pretty] [--width <w>] [--height <h>] [--collapsed <id>]... [<path>|-]\n\
  mapling-cli [render] [--width <w>] [--height <h>] [--collapsed <id>]... [--no-highlight] [--plain-edges] [--out <path>] [<path>|-]\n\
  mapling-cli export [--width <w>] [--height <h>] [--collapsed <id>]... [--no-highlight] [--plain-edges] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - Input is a mind-map tree as JSON: {\"id\", \"label\", \"children\": [...]}.\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - layout prints the computed layout as JSON.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - export writes a 3840x2160 PNG next to the input file (or ./mindmap.png for stdin).\n\
  - --collapsed may be repeated; ids without children are ignored.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        width: 1200.0,
        height: 800.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "export" => args.command = Command::Export,
            "--pretty" => args.pretty = true,
            "--no-highlight" => args.no_highlight = true,
            "--plain-edges" => args.plain_edges = true,
            "--width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.width = w.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.width.is_finite() && args.width > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.height = h.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.height.is_finite() && args.height > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--collapsed" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.collapsed.push(id.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn default_export_out_path(input: Option<&str>, filename: &str) -> std::path::PathBuf {
    match input {
        Some(path) if path != "-" => std::path::PathBuf::from(path).with_extension("png"),
        _ => std::path::PathBuf::from(filename),
    }
}

fn run() -> Result<(), CliError> {
    let argv: Vec<String> = std::env::args().collect();
    let args = parse_args(&argv)?;

    let text = read_input(args.input.as_deref())?;
    let tree: MindMapNode = serde_json::from_str(&text)?;

    let mut view = MindMapView::new(tree, size(args.width, args.height))?;
    if args.no_highlight {
        view.set_highlight_nodes(false);
    }
    if args.plain_edges {
        view.set_colored_edges(false);
    }
    for id in &args.collapsed {
        view.toggle_node(id)?;
    }

    match args.command {
        Command::Layout => write_json(view.layout(), args.pretty)?,
        Command::Render => {
            let svg = view.scene_svg();
            write_text(&svg, args.out.as_deref())?;
        }
        Command::Export => {
            let artifact = view.export_png()?;
            let out = match &args.out {
                Some(path) => std::path::PathBuf::from(path),
                None => default_export_out_path(args.input.as_deref(), &artifact.filename),
            };
            std::fs::write(&out, &artifact.bytes)?;
        }
    }

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
