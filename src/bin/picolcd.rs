//! Command-line control of an attached picoLCD panel

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use picolcd::{
    Builder, ImageOptions, MonoFontRasterizer, PicoLcd, PushTextOptions, StdDelay, TextOptions,
    UsbConnector, load_png,
};

#[derive(Debug, Parser)]
#[clap(name = "picolcd")]
#[clap(about = "Drive a picoLCD USB display", long_about = None)]
struct Cli {
    /// Contrast level to apply after connecting
    #[clap(long)]
    contrast: Option<u8>,

    /// Backlight level to apply after connecting
    #[clap(long, default_value_t = 0xFF)]
    backlight: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Blank the display
    Clear,

    /// Set the backlight level
    #[clap(arg_required_else_help = true)]
    Backlight {
        /// Level from 0 (off) to 255 (full)
        level: u8,
    },

    /// Fade the backlight out and in once
    Flash,

    /// Draw text on the character grid
    #[clap(arg_required_else_help = true)]
    Text {
        /// Grid row
        #[clap(long, default_value_t = 0)]
        row: i32,
        /// Grid column
        #[clap(long, default_value_t = 0)]
        col: i32,
        /// Bitmap font, named by cell size (e.g. 6x10)
        #[clap(long)]
        font: Option<String>,
        /// Clear behind the text first
        #[clap(long)]
        erase: bool,
        text: String,
    },

    /// Append text terminal-style, scrolling when full
    #[clap(arg_required_else_help = true)]
    Push {
        /// Blank columns between characters
        #[clap(long, default_value_t = 1)]
        spacing: u16,
        text: String,
    },

    /// Draw a PNG image
    #[clap(arg_required_else_help = true)]
    Image {
        #[clap(long, default_value_t = 0)]
        x: i32,
        #[clap(long, default_value_t = 0)]
        y: i32,
        /// Lightness cut-off from 0.0 to 1.0; dithers when omitted
        #[clap(long)]
        threshold: Option<f32>,
        /// Swap on and off pixels
        #[clap(long)]
        invert: bool,
        /// Lightness multiplier for dithering
        #[clap(long, default_value_t = 1.0)]
        brightness: f32,
        path: PathBuf,
    },

    /// Set or clear one pixel
    #[clap(arg_required_else_help = true)]
    Pixel {
        x: i32,
        y: i32,
        /// Turn the pixel off instead of on
        #[clap(long)]
        off: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut builder = Builder::new().clear_on_connect(false).backlight(cli.backlight);
    if let Some(level) = cli.contrast {
        builder = builder.contrast(level);
    }
    let config = builder.build()?;
    let mut lcd = PicoLcd::open(UsbConnector::new(), config).context("opening picoLCD")?;
    if let Some(profile) = lcd.profile() {
        info!("Found {}", profile.name());
    }

    let mut fonts = MonoFontRasterizer::default();
    match cli.command {
        Commands::Clear => lcd.clear()?,
        Commands::Backlight { level } => lcd.set_backlight(level)?,
        Commands::Flash => lcd.flash(&mut StdDelay)?,
        Commands::Text {
            row,
            col,
            font,
            erase,
            text,
        } => {
            let options = TextOptions {
                font,
                erase_behind: erase,
                ..TextOptions::default()
            };
            lcd.draw_text(&mut fonts, row, col, &text, &options)?;
        }
        Commands::Push { spacing, text } => {
            let options = PushTextOptions {
                spacing_x: spacing,
                ..PushTextOptions::default()
            };
            lcd.push_text(&mut fonts, &text, options)?;
        }
        Commands::Image {
            x,
            y,
            threshold,
            invert,
            brightness,
            path,
        } => {
            let image = load_png(&path).with_context(|| format!("reading {}", path.display()))?;
            let options = ImageOptions {
                threshold,
                invert,
                brightness,
            };
            lcd.draw_image((x, y), &image, options)?;
        }
        Commands::Pixel { x, y, off } => {
            lcd.set_pixel(x, y, !off, true, false)?;
        }
    }
    Ok(())
}
