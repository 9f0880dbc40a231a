#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the TileMaze editor and its map tools.

mod inspect;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tilemaze_persistence::{load_from_path, save_to_path, MapFormat};
use tilemaze_rendering::{Color, Presentation, RenderingBackend};
use tilemaze_rendering_macroquad::{KeyMap, MacroquadBackend};
use tracing::info;
use tracing_subscriber::EnvFilter;

use self::{
    inspect::MapSummary,
    session::{EditorSession, SessionConfig},
};

/// Tile-grid maze editor with legacy and binary map support.
#[derive(Debug, Parser)]
#[command(name = "tilemaze", version, about)]
struct CliArgs {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Opens the interactive editor.
    Edit(EditArgs),
    /// Re-encodes a map file in another format.
    Convert(ConvertArgs),
    /// Prints a summary of a map file.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct EditArgs {
    /// Map loaded at startup and by the load key.
    #[arg(long, value_name = "PATH")]
    map: Option<PathBuf>,
    /// Destination of the save key; defaults to the map path.
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,
    /// Grid width for a blank map.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    columns: Option<u32>,
    /// Grid height for a blank map.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    rows: Option<u32>,
    /// Agent speed in cells per second.
    #[arg(long)]
    speed: Option<f32>,
    /// TOML file replacing the default key bindings.
    #[arg(long, value_name = "PATH")]
    keymap: Option<PathBuf>,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long)]
    vsync: bool,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Map to read; the format follows its extension or contents.
    input: PathBuf,
    /// Path to write.
    output: PathBuf,
    /// Output format; inferred from the output extension when omitted.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Map to summarise.
    path: PathBuf,
    /// Emit the summary as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Pmap,
    Tmap,
}

impl From<FormatArg> for MapFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Pmap => MapFormat::Legacy,
            FormatArg::Tmap => MapFormat::Binary,
        }
    }
}

/// Entry point for the TileMaze command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    match args.command {
        CliCommand::Edit(args) => run_editor(args),
        CliCommand::Convert(args) => convert(args),
        CliCommand::Inspect(args) => inspect(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run_editor(args: EditArgs) -> Result<()> {
    let keymap = match &args.keymap {
        Some(path) => KeyMap::from_path(path)?,
        None => KeyMap::default(),
    };

    let mut session = EditorSession::new(SessionConfig {
        columns: args.columns,
        rows: args.rows,
        speed: args.speed,
        map_path: args.map,
        save_path: args.save,
    })?;
    let presentation = Presentation::new("TileMaze", Color::from_rgb_u8(0, 0, 0), session.scene()?);

    let mut backend = MacroquadBackend::new().with_keymap(keymap);
    if args.vsync {
        backend = backend.with_vsync(true);
    }

    info!("editor session started");
    backend.run(presentation, move |dt, input, scene| {
        session.advance(dt, input);
        session.populate_scene(scene);
    })
}

fn convert(args: ConvertArgs) -> Result<()> {
    let (image, source_format) = load_from_path(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let format = args
        .format
        .map(MapFormat::from)
        .or_else(|| MapFormat::from_path(&args.output))
        .unwrap_or(MapFormat::Binary);

    let written = save_to_path(&image, &args.output, format)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(?source_format, ?format, "map converted");
    println!("{}", written.display());
    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let (image, format) = load_from_path(&args.path)
        .with_context(|| format!("failed to read {}", args.path.display()))?;
    let summary = MapSummary::new(&args.path, format, &image);

    if args.json {
        let json =
            serde_json::to_string_pretty(&summary).context("failed to serialise map summary")?;
        println!("{json}");
    } else {
        print!("{summary}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn edit_flags_parse() {
        let args = CliArgs::try_parse_from([
            "tilemaze",
            "edit",
            "--map",
            "level.pmap",
            "--columns",
            "10",
            "--speed",
            "2.5",
            "--vsync",
        ])
        .expect("edit arguments should parse");

        let CliCommand::Edit(edit) = args.command else {
            panic!("expected the edit subcommand");
        };
        assert_eq!(edit.map, Some(PathBuf::from("level.pmap")));
        assert_eq!(edit.columns, Some(10));
        assert_eq!(edit.rows, None);
        assert_eq!(edit.speed, Some(2.5));
        assert!(edit.vsync);
    }

    #[test]
    fn zero_sized_grids_are_rejected() {
        let result = CliArgs::try_parse_from(["tilemaze", "edit", "--rows", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn convert_format_maps_to_codec_format() {
        let args = CliArgs::try_parse_from(["tilemaze", "convert", "a.tmap", "b", "--format", "pmap"])
            .expect("convert arguments should parse");

        let CliCommand::Convert(convert) = args.command else {
            panic!("expected the convert subcommand");
        };
        assert_eq!(convert.format.map(MapFormat::from), Some(MapFormat::Legacy));
        assert_eq!(convert.output, PathBuf::from("b"));
    }
}
