use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use log::error;

use hexforge::{
    charforge::Roster, common::character::Class, mapforge::images::ImageCache, Invalid, Result, Settings,
};

/// Create and edit the characters shown on hex maps
#[derive(Parser)]
#[command(name = "charforge", version, long_about = None)]
struct Cli {
    /// Directory relative file paths are resolved against
    #[arg(long, global = true, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Roster file
    #[arg(long, global = true, value_name = "FILE")]
    file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List characters
    List,

    /// Add a character with default stats
    New,

    /// Change a character; omitted fields keep their value
    #[command(allow_negative_numbers = true)]
    Set {
        id: String,
        #[arg(long)]
        name: Option<String>,
        /// Warrior, Mage, Rogue, Cleric, Ranger, or any other name
        #[arg(long)]
        class: Option<String>,
        #[arg(long)]
        hp: Option<u32>,
        #[arg(long)]
        attack: Option<u32>,
        #[arg(long)]
        defense: Option<u32>,
        #[arg(long)]
        speed: Option<u32>,
        #[arg(long)]
        q: Option<i32>,
        #[arg(long)]
        r: Option<i32>,
        /// Sprite image path; an empty string removes it
        #[arg(long)]
        sprite: Option<String>,
    },

    /// Remove a character
    Delete { id: String },

    /// Report the size of a character's sprite preview
    Preview { id: String },

    /// Write the roster in the form the map editor loads
    Export {
        /// Defaults to the standard export file in the base directory
        path: Option<PathBuf>,
    },
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::default();
    if let Some(dir) = cli.base_dir { settings.base_dir = dir; }
    if let Some(file) = cli.file { settings.characters_file = file; }
    let mut roster = match cli.command {
        Command::List => Roster::open(settings.characters_path()),
        // anything else must not act on a roster it could not read
        _ => Roster::load(settings.characters_path())?,
    };

    match cli.command {
        Command::List => {
            for (id, ch) in roster.iter() {
                let s = ch.stats;
                println!("{id}  {:<20} {:<8} hp {:<4} atk {:<3} def {:<3} spd {:<3} at {}",
                    ch.name, ch.class.as_str(), s.hp, s.attack, s.defense, s.speed, ch.position);
            }
        }
        Command::New => {
            let id = roster.new_character();
            roster.save()?;
            println!("{id}");
        }
        Command::Set { id, name, class, hp, attack, defense, speed, q, r, sprite } => {
            let mut ch = roster.get(&id).cloned().ok_or_else(|| Invalid::UnknownCharacter(id.clone()))?;
            if let Some(name) = name { ch.name = name; }
            if let Some(class) = class { ch.class = Class::from(class); }
            if let Some(hp) = hp { ch.stats.hp = hp; }
            if let Some(attack) = attack { ch.stats.attack = attack; }
            if let Some(defense) = defense { ch.stats.defense = defense; }
            if let Some(speed) = speed { ch.stats.speed = speed; }
            if let Some(q) = q { ch.position.q = q; }
            if let Some(r) = r { ch.position.r = r; }
            if let Some(sprite) = sprite { ch.sprite = sprite.trim().to_owned(); }
            roster.update(&id, ch)?;
            roster.save()?;
        }
        Command::Delete { id } => {
            roster.delete(&id)?;
            roster.save()?;
        }
        Command::Preview { id } => {
            let mut images = ImageCache::new(settings.base_dir.clone());
            match roster.preview(&id, &mut images)? {
                Some(img) => println!("{id}  {}x{}", img.width(), img.height()),
                None => println!("{id}  no sprite to preview"),
            }
        }
        Command::Export { path } => {
            let path = path.map_or_else(|| settings.export_path(), |p| settings.resolve(p));
            roster.export(&path)?;
            println!("{}", path.display());
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
