use std::{
    error::Error,
    io::{BufRead, Write},
    path::PathBuf,
};

use clap::{Parser, Subcommand};
use emath::pos2;
use palette_generator::{
    Clipboard, ClipboardError, Confirm, ExportFormat, GeneratorConfig, HueId, JsonFileStore,
    MemoryLocation, Notifier, PaletteGenerator, PermalinkState, RandomIds, Services, Toast,
    ToastKind,
};
use palette_widgets::{
    hue_circle::DEFAULT_THICKNESS, CurveEditor, CurveHandle, DragController, HueCircle,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File the palette is persisted in.
    #[arg(long, default_value = "palette.json")]
    store: PathBuf,

    /// Base address of permalinks.
    #[arg(long, default_value = "https://example.com/palette/")]
    url: String,

    /// JSON file overriding the default settings and timings.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Handle {
    Min,
    Max,
}

#[derive(Subcommand)]
enum Command {
    /// Print the palette.
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Copy the palette in the given format.
    Export { format: ExportFormat },
    /// Copy a link to the palette.
    Permalink,
    /// Replace the palette by the one in a permalink, or in its fragment.
    Restore { link: String },
    /// Append a hue, 0° unless given.
    AddHue { value: Option<String> },
    /// Set the hue at `index`. Values that are not integers in [0, 360] are ignored.
    SetHue { index: usize, value: String },
    /// Name the hue at `index`. An empty name removes it.
    RenameHue { index: usize, name: String },
    MoveHue { from: usize, to: usize },
    DeleteHue { index: usize },
    /// Set the number of colors per hue.
    Steps { steps: u32 },
    /// Set the saturation and lightness ranges.
    Range {
        #[arg(long)]
        min_saturation: Option<f64>,
        #[arg(long)]
        max_saturation: Option<f64>,
        #[arg(long)]
        min_lightness: Option<f64>,
        #[arg(long)]
        max_lightness: Option<f64>,
    },
    /// Restore the default palette.
    Reset {
        /// Don't ask for confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Render the hue ring to a PNG.
    Ring {
        output: PathBuf,
        #[arg(long, default_value_t = 200.0)]
        size: f32,
        #[arg(long, default_value_t = DEFAULT_THICKNESS)]
        thickness: f32,
    },
    /// Drag the handle of the hue circle, for the hue at `index`, to the point (x, y).
    DragHue {
        index: usize,
        x: f32,
        y: f32,
        #[arg(long, default_value_t = 200.0)]
        size: f32,
    },
    /// Render the saturation/lightness curve to an SVG.
    Chart {
        output: PathBuf,
        #[arg(long, default_value_t = 320.0)]
        width: f32,
        #[arg(long, default_value_t = 240.0)]
        height: f32,
    },
    /// Drag a handle of the curve editor to the point (x, y).
    DragCurve {
        #[arg(value_enum)]
        handle: Handle,
        x: f32,
        y: f32,
        #[arg(long, default_value_t = 320.0)]
        width: f32,
        #[arg(long, default_value_t = 240.0)]
        height: f32,
    },
}

/// Copied text goes to standard output.
struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", text)?;
        stdout.flush()?;
        Ok(())
    }
}

struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, toast: Toast) {
        let description = toast.description.unwrap_or_default();
        match toast.kind {
            ToastKind::Error => log::error!("{} {}", toast.message, description),
            ToastKind::Warning => log::warn!("{} {}", toast.message, description),
            _ => log::info!("{} {}", toast.message, description),
        }
    }
}

struct TerminalConfirm {
    assume_yes: bool,
}

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{} [y/N] ", message);
        let mut answer = String::new();
        if let Err(err) = std::io::stdin().lock().read_line(&mut answer) {
            log::error!("failed to read answer: {}", err);
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

fn hue_id(generator: &PaletteGenerator, index: usize) -> Result<HueId, Box<dyn Error>> {
    let hues = generator.state().hues();
    match hues.get(index) {
        Some(hue) => Ok(hue.id.clone()),
        None => Err(format!("no hue at index {}, there are {}", index, hues.len()).into()),
    }
}

fn show(generator: &PaletteGenerator, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        let value = serde_json::json!({
            "settings": generator.state().settings(),
            "palette": generator.palette(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let state = generator.state();
    println!(
        "{} steps, saturation {} to {}, lightness {} to {}",
        state.steps(),
        state.min().0,
        state.max().0,
        state.min().1,
        state.max().1
    );
    for (i, (hue, swatch)) in state
        .hues()
        .iter()
        .zip(generator.palette().swatches())
        .enumerate()
    {
        let colors: Vec<String> = swatch.iter().map(|color| color.hex()).collect();
        println!("{:>2} {:>10} {:>5}° {}", i, hue.label(), hue.value, colors.join(" "));
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::default(),
    };

    let href = match &cli.command {
        Command::Restore { link } => {
            // fail loudly here, the generator would only log it
            PermalinkState::decode(link)?;
            let fragment = link.split_once('#').map_or(link.as_str(), |(_, hash)| hash);
            format!("{}#{}", cli.url, fragment)
        }
        _ => cli.url.clone(),
    };

    let services = Services {
        store: Box::new(JsonFileStore::open(&cli.store)?),
        clipboard: Box::new(StdoutClipboard),
        notifier: Box::new(LogNotifier),
        confirm: Box::new(TerminalConfirm {
            assume_yes: matches!(cli.command, Command::Reset { yes: true }),
        }),
        location: Box::new(MemoryLocation::new(href)),
    };
    let ids = Box::new(RandomIds::from_entropy());
    let mut generator = PaletteGenerator::new(config, services, ids);

    match cli.command {
        Command::Show { json } => show(&generator, json)?,
        Command::Export { format } => generator.copy_palette(format),
        Command::Permalink => generator.copy_permalink(),
        Command::Restore { .. } => show(&generator, false)?,
        Command::AddHue { value } => {
            let id = generator.add_hue();
            if let Some(value) = value {
                if !generator.update_hue(&id, &value) {
                    log::warn!("ignoring hue value '{}'", value);
                }
            }
        }
        Command::SetHue { index, value } => {
            let id = hue_id(&generator, index)?;
            if !generator.update_hue(&id, &value) {
                log::warn!("ignoring hue value '{}'", value);
            }
        }
        Command::RenameHue { index, name } => {
            let id = hue_id(&generator, index)?;
            generator.rename_hue(&id, &name);
        }
        Command::MoveHue { from, to } => generator.move_hue(from, to),
        Command::DeleteHue { index } => {
            let id = hue_id(&generator, index)?;
            if !generator.delete_hue(&id) {
                log::warn!("the last hue can't be deleted");
            }
        }
        Command::Steps { steps } => generator.set_steps(steps),
        Command::Range {
            min_saturation,
            max_saturation,
            min_lightness,
            max_lightness,
        } => {
            let (min_s, min_l) = generator.state().min();
            let (max_s, max_l) = generator.state().max();
            generator.set_saturation_range(
                min_saturation.unwrap_or(min_s),
                max_saturation.unwrap_or(max_s),
            );
            generator.set_lightness_range(
                min_lightness.unwrap_or(min_l),
                max_lightness.unwrap_or(max_l),
            );
        }
        Command::Reset { .. } => {
            if !generator.reset() {
                log::info!("reset cancelled");
            }
        }
        Command::Ring {
            output,
            size,
            thickness,
        } => {
            let circle = HueCircle::new(DragController::new(), size, size, thickness)?;
            circle.ring().save(&output)?;
            log::info!(
                "wrote {}x{} hue ring to {}",
                circle.raster_size(),
                circle.raster_size(),
                output.display()
            );
        }
        Command::DragHue { index, x, y, size } => {
            let id = hue_id(&generator, index)?;
            generator.select(Some(id));

            let drag = DragController::new();
            let mut circle = HueCircle::new(drag, size, size, DEFAULT_THICKNESS)?;
            circle.sync(generator.state());
            let handle = circle.handle_center(circle.hue());
            circle.pointer_down(handle);
            if let Some(hue) = circle.pointer_move(pos2(x, y)) {
                generator.set_hue_circle_hue(hue);
            }
            circle.pointer_up();
            println!("{}", generator.state().hue_circle_hue());
        }
        Command::Chart {
            output,
            width,
            height,
        } => {
            let budget = generator.config().frame_budget();
            let mut editor = CurveEditor::new(DragController::new(), width, height, budget)?;
            editor.sync(generator.state());
            let chart = editor.frame().unwrap_or_else(|| editor.draw());
            std::fs::write(&output, chart.to_svg())?;
            log::info!("wrote chart to {}", output.display());
        }
        Command::DragCurve {
            handle,
            x,
            y,
            width,
            height,
        } => {
            let handle = match handle {
                Handle::Min => CurveHandle::Min,
                Handle::Max => CurveHandle::Max,
            };
            let budget = generator.config().frame_budget();
            let mut editor = CurveEditor::new(DragController::new(), width, height, budget)?;
            editor.sync(generator.state());
            editor.pointer_down(editor.handle_center(handle));
            if let Some(edit) = editor.pointer_move(pos2(x, y)) {
                match edit.handle {
                    CurveHandle::Min => generator.set_min(edit.saturation, edit.lightness),
                    CurveHandle::Max => generator.set_max(edit.saturation, edit.lightness),
                }
                println!("{} {}", edit.saturation, edit.lightness);
            }
            editor.pointer_up();
        }
    }

    generator.flush();
    log::debug!("permalink: {}", generator.permalink());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(Cli::parse()) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
