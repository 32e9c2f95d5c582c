use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tickboy_common::shades_to_rgb24;
use tickboy_gb::{Cartridge, EmulatorConfig, FrameOutcome, GameBoy};

pub const USAGE: &str =
    "usage: tickboy <rom> [--frames N] [--dump out.rgb] [--unlimited] [--break ADDR]...";

const DEFAULT_FRAMES: u64 = 600;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub rom: PathBuf,
    pub frames: u64,
    /// Write the last frame as raw 160x144 RGB24.
    pub dump: Option<PathBuf>,
    pub frame_limit: bool,
    pub breakpoints: Vec<u16>,
}

impl Options {
    /// Parse arguments without the program name.
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut args = args.into_iter();
        let mut rom = None;
        let mut frames = DEFAULT_FRAMES;
        let mut dump = None;
        let mut frame_limit = true;
        let mut breakpoints = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--frames" => {
                    let value = args.next().context("--frames needs a count")?;
                    frames = value
                        .parse::<u64>()
                        .with_context(|| format!("invalid frame count '{value}'"))?;
                }
                "--dump" => {
                    dump = Some(PathBuf::from(args.next().context("--dump needs a path")?));
                }
                "--unlimited" => frame_limit = false,
                "--break" => {
                    let value = args.next().context("--break needs an address")?;
                    breakpoints.push(parse_address(&value)?);
                }
                flag if flag.starts_with("--") => bail!("unknown option '{flag}'\n{USAGE}"),
                path => {
                    if rom.is_some() {
                        bail!("more than one ROM given\n{USAGE}");
                    }
                    rom = Some(PathBuf::from(path));
                }
            }
        }

        Ok(Self {
            rom: rom.with_context(|| format!("no ROM path given\n{USAGE}"))?,
            frames,
            dump,
            frame_limit,
            breakpoints,
        })
    }
}

/// Accepts `0150`, `0x0150` or `$0150`; always hexadecimal.
fn parse_address(value: &str) -> Result<u16> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix('$'))
        .unwrap_or(value);
    u16::from_str_radix(digits, 16).with_context(|| format!("invalid address '{value}'"))
}

fn save_path(rom: &Path) -> PathBuf {
    rom.with_extension("sav")
}

pub fn run(options: &Options) -> Result<()> {
    let rom = std::fs::read(&options.rom)
        .with_context(|| format!("failed to read ROM '{}'", options.rom.display()))?;
    let mut cartridge = Cartridge::from_rom(rom)
        .with_context(|| format!("failed to load cartridge '{}'", options.rom.display()))?;

    let save = save_path(&options.rom);
    if cartridge.has_battery() && save.exists() {
        let data = std::fs::read(&save)
            .with_context(|| format!("failed to read save '{}'", save.display()))?;
        cartridge
            .load_save_data(&data)
            .with_context(|| format!("save file '{}' does not fit", save.display()))?;
        log::info!("Loaded save data from '{}'", save.display());
    }

    let config = EmulatorConfig::builder()
        .frame_limit(options.frame_limit)
        .breakpoints(options.breakpoints.clone())
        .build();
    let mut gb = GameBoy::new(config);
    gb.set_serial_listener(Box::new(|c: char| print!("{c}")));
    gb.load_cartridge(cartridge);

    for _ in 0..options.frames {
        match gb.run_frame()? {
            FrameOutcome::Completed => {}
            FrameOutcome::Breakpoint(addr) => {
                let snapshot = gb.snapshot();
                log::info!("Breakpoint at {addr:04X}");
                for instruction in &snapshot.instructions {
                    log::info!("  {:04X}  {}", instruction.address, instruction.mnemonic);
                }
                gb.resume();
            }
            FrameOutcome::Paused => break,
        }
    }
    log::info!(
        "Ran {} frames ({} cycles)",
        gb.clock().frame_count(),
        gb.clock().total_cycles()
    );

    if let Some(path) = &options.dump {
        let mut rgb = Vec::new();
        shades_to_rgb24(gb.frame(), &mut rgb);
        std::fs::write(path, &rgb)
            .with_context(|| format!("failed to write frame dump '{}'", path.display()))?;
    }

    if let Some(cart) = gb.cartridge().filter(|cart| cart.has_battery()) {
        std::fs::write(&save, cart.save_data())
            .with_context(|| format!("failed to write save '{}'", save.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_all_options() {
        let options = Options::parse(args(&[
            "game.gb",
            "--frames",
            "30",
            "--dump",
            "out.rgb",
            "--unlimited",
            "--break",
            "0x0150",
            "--break",
            "$C000",
        ]))
        .expect("valid arguments");

        assert_eq!(options.rom, PathBuf::from("game.gb"));
        assert_eq!(options.frames, 30);
        assert_eq!(options.dump, Some(PathBuf::from("out.rgb")));
        assert!(!options.frame_limit);
        assert_eq!(options.breakpoints, vec![0x0150, 0xC000]);
    }

    #[test]
    fn defaults_without_flags() {
        let options = Options::parse(args(&["game.gb"])).expect("valid arguments");
        assert_eq!(options.frames, DEFAULT_FRAMES);
        assert!(options.frame_limit);
        assert!(options.dump.is_none());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Options::parse(args(&[])).is_err());
        assert!(Options::parse(args(&["a.gb", "b.gb"])).is_err());
        assert!(Options::parse(args(&["a.gb", "--frames"])).is_err());
        assert!(Options::parse(args(&["a.gb", "--break", "zz"])).is_err());
        assert!(Options::parse(args(&["a.gb", "--bogus"])).is_err());
    }

    #[test]
    fn save_file_sits_next_to_rom() {
        assert_eq!(save_path(Path::new("roms/game.gb")), PathBuf::from("roms/game.sav"));
    }
}
