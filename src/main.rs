//! ascii-camera: live webcam feed as a terminal glyph mosaic.

use std::process::ExitCode;

use clap::Parser;
use log::error;

use ascii_camera::camera::{list_devices, CameraSettings, CameraSource};
use ascii_camera::session::{Session, SessionConfig};
use ascii_camera::terminal::TerminalDisplay;

/// Live webcam feed rendered as ASCII art in the terminal
#[derive(Parser)]
#[command(name = "ascii-camera", version)]
#[command(about = "Render a live webcam feed as a terminal glyph mosaic")]
struct Args {
    /// Camera device index
    #[arg(short, long, default_value_t = 0)]
    device: u32,

    /// Disable the horizontal selfie mirror
    #[arg(long)]
    no_mirror: bool,

    /// List available camera devices and exit
    #[arg(long)]
    list_devices: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    if args.list_devices {
        return match list_devices() {
            Ok(devices) if devices.is_empty() => {
                println!("No cameras found");
                ExitCode::SUCCESS
            }
            Ok(devices) => {
                for device in devices {
                    println!("{}", device);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let settings = CameraSettings {
        device_index: args.device,
        ..Default::default()
    };

    let source = match CameraSource::open(settings) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: could not open camera: {}", e);
            eprintln!("  - check that a camera is connected");
            eprintln!("  - check that no other app is using it");
            return ExitCode::FAILURE;
        }
    };

    let display = match TerminalDisplay::new() {
        Ok(display) => display,
        Err(e) => {
            eprintln!("Error: could not initialize terminal: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = SessionConfig {
        mirror: !args.no_mirror,
        ..Default::default()
    };

    let mut session = Session::new(source, display, config);
    let result = session.run();
    drop(session);

    match result {
        Ok(()) => {
            println!("Camera closed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("session failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
