use std::{path::PathBuf, process::ExitCode};

use axial::Qr;
use clap::{Args, Parser, Subcommand};
use glam::DVec2;
use log::{error, info};

use hexforge::{
    mapforge::{render::Outline, terrain::{TerrainEdit, TerrainId}, Editor},
    Invalid, Result, Settings,
};

/// Paint terrain onto a hex map stored as JSON
#[derive(Parser)]
#[command(name = "mapforge", version, long_about = None)]
struct Cli {
    #[command(flatten)]
    files: Files,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Files {
    /// Directory data files and relative image paths are resolved against
    #[arg(long, global = true, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Hex circumradius in world units
    #[arg(long, global = true)]
    hex_size: Option<f64>,

    /// Terrain definitions file
    #[arg(long, global = true, value_name = "FILE")]
    terrains: Option<String>,

    /// Map cells file
    #[arg(long, global = true, value_name = "FILE")]
    map: Option<String>,
}

impl Files {
    fn settings(self) -> Settings {
        let mut settings = Settings::default();
        if let Some(dir) = self.base_dir { settings.base_dir = dir; }
        if let Some(size) = self.hex_size { settings.hex_size = size; }
        if let Some(file) = self.terrains { settings.terrains_file = file; }
        if let Some(file) = self.map { settings.map_file = file; }
        settings
    }
}

/// A canvas and the view onto it. Without an offset the world origin sits mid-canvas.
#[derive(Args)]
struct View {
    #[arg(long, default_value_t = 800.)]
    width: f64,
    #[arg(long, default_value_t = 600.)]
    height: f64,
    #[arg(long, requires = "offset_y")]
    offset_x: Option<f64>,
    #[arg(long, requires = "offset_x")]
    offset_y: Option<f64>,
    #[arg(long, default_value_t = 1.)]
    scale: f64,
}

impl View {
    fn canvas(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    fn apply(&self, editor: &mut Editor) {
        let offset = match (self.offset_x, self.offset_y) {
            (Some(x), Some(y)) => DVec2::new(x, y),
            _ => self.canvas() / 2.,
        };
        editor.set_view(offset, self.scale);
    }
}

#[derive(Subcommand)]
enum Command {
    /// List terrain types
    Terrains,

    /// Register a new terrain type
    AddTerrain { name: String, color: String },

    /// Change an existing terrain type; omitted fields keep their value
    EditTerrain {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// Image path; an empty string removes the image
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        walkable: Option<bool>,
        #[arg(long)]
        move_cost: Option<u32>,
    },

    /// Paint one cell
    #[command(allow_negative_numbers = true)]
    Paint {
        q: i32,
        r: i32,
        /// Terrain id; `-1` erases. Defaults to the startup brush
        #[arg(long, allow_hyphen_values = true)]
        id: Option<String>,
    },

    /// Erase one cell
    #[command(allow_negative_numbers = true)]
    Erase { q: i32, r: i32 },

    /// Remove every painted cell
    Clear,

    /// Describe what a view of the map would draw
    #[command(allow_negative_numbers = true)]
    Show {
        #[command(flatten)]
        view: View,
        /// Character export to overlay
        #[arg(long, value_name = "FILE")]
        characters: Option<PathBuf>,
    },

    /// Report the cell under a screen point
    #[command(allow_negative_numbers = true)]
    Pick {
        x: f64,
        y: f64,
        #[command(flatten)]
        view: View,
    },

    /// Cheapest walkable path between two cells
    #[command(allow_negative_numbers = true)]
    Route { q1: i32, r1: i32, q2: i32, r2: i32 },
}

impl Command {
    /// Whether the command writes a data file back.
    fn edits(&self) -> bool {
        matches!(self, Command::AddTerrain { .. } | Command::EditTerrain { .. }
            | Command::Paint { .. } | Command::Erase { .. } | Command::Clear)
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = cli.files.settings();
    let (terrains_path, map_path) = (settings.terrains_path(), settings.map_path());
    let mut editor = Editor::new(settings);
    if cli.command.edits() {
        editor.load_for_edit(&terrains_path, &map_path)?;
    } else {
        // failures are logged by the editor, which falls back to defaults
        editor.load_terrains(&terrains_path).ok();
        editor.load_map(&map_path).ok();
    }

    match cli.command {
        Command::Terrains => {
            let brush = editor.brush().cloned();
            for (id, terrain) in editor.registry().iter() {
                let marker = if Some(&id) == brush.as_ref() { "*" } else { " " };
                let walk = if terrain.properties.is_walkable { "walkable" } else { "blocked" };
                println!("{marker}{id:>3}  {:<12} {}  {walk:<8} cost {:<3} {}",
                    terrain.name, terrain.color, terrain.properties.move_cost, terrain.image.as_deref().unwrap_or("-"));
            }
        }
        Command::AddTerrain { name, color } => {
            let id = editor.add_terrain(&name, &color)?;
            editor.save_terrains(&terrains_path)?;
            println!("{id}");
        }
        Command::EditTerrain { id, name, color, image, walkable, move_cost } => {
            let id = TerrainId::from(id);
            let current = editor.registry().get(&id)
                .ok_or_else(|| Invalid::UnknownTerrain(id.to_string()))?;
            let edit = TerrainEdit {
                name: name.unwrap_or_else(|| current.name.clone()),
                color: color.unwrap_or_else(|| current.color.to_string()),
                image: image.or_else(|| current.image.clone()),
                walkable: walkable.unwrap_or(current.properties.is_walkable),
                move_cost,
            };
            editor.update_terrain(&id, edit)?;
            editor.save_terrains(&terrains_path)?;
        }
        Command::Paint { q, r, id } => {
            if let Some(id) = id { editor.select_brush(TerrainId::from(id))?; }
            if editor.paint(Qr::new(q, r)) {
                editor.save_map(&map_path)?;
            } else {
                info!("{q},{r} unchanged");
            }
        }
        Command::Erase { q, r } => {
            if editor.erase(Qr::new(q, r)) {
                editor.save_map(&map_path)?;
            } else {
                info!("{q},{r} was already empty");
            }
        }
        Command::Clear => {
            editor.clear_map();
            editor.save_map(&map_path)?;
        }
        Command::Show { view, characters } => {
            view.apply(&mut editor);
            if let Some(path) = characters { editor.load_characters(&path).ok(); }
            let frame = editor.frame(view.canvas());
            let range = frame.range;
            println!("q {}..={}  r {}..={}  ({} cells)", range.q_min, range.q_max, range.r_min, range.r_max, range.len());
            for hex in frame.hexes.iter().filter(|h| h.outline != Outline::Empty) {
                let id = editor.store().get(hex.qr).map(|id| id.as_str()).unwrap_or("-");
                println!("{:>8}  {id:>3}  at ({:.1}, {:.1})  outline {}", hex.qr.to_string(), hex.center.x, hex.center.y, hex.outline.color());
            }
            for ch in &frame.characters {
                println!("{:>8}  {}  at ({:.1}, {:.1})", ch.qr.to_string(), ch.id, ch.center.x, ch.center.y);
            }
        }
        Command::Pick { x, y, view } => {
            view.apply(&mut editor);
            let qr = editor.hex_at(DVec2::new(x, y));
            let id = editor.store().get(qr);
            let name = id.and_then(|id| editor.registry().get(id)).map(|t| t.name.as_str());
            match (id, name) {
                (Some(id), Some(name)) => println!("{qr}  {id} {name}"),
                (Some(id), None) => println!("{qr}  {id} (unknown terrain)"),
                (None, _) => println!("{qr}  empty"),
            }
        }
        Command::Route { q1, r1, q2, r2 } => {
            match editor.route(Qr::new(q1, r1), Qr::new(q2, r2)) {
                Some((path, cost)) => {
                    let steps: Vec<String> = path.iter().map(Qr::to_string).collect();
                    println!("cost {cost}: {}", steps.join(" -> "));
                }
                None => println!("no walkable route"),
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
