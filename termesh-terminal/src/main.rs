/// termesh - render an STL mesh as rotating, lit ASCII art
///
/// Controls:
///   - 1-8: Light from one of eight angles
///   - qwertyuiop / asdfghjkl; / zxcvbnm,./: Light from one of ten angles
///   - Any other key: Stop the light orbiting
///   - Esc / Ctrl-C: Quit

use clap::{CommandFactory, Parser};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use termesh_core::{normalize::normalize_mesh, stl, RenderConfig};
use termesh_terminal::TerminalApp;

#[derive(Debug, Parser)]
#[command(name = "termesh", version, about = "Render an STL mesh in the terminal")]
struct Args {
    /// Binary or ASCII STL file
    path: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let config = RenderConfig::default();

    let mut mesh = match stl::load_stl(&args.path) {
        Ok(mesh) => mesh,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("{}", Args::command().render_usage());
            return ExitCode::FAILURE;
        }
    };
    normalize_mesh(&mut mesh, config.target_size);
    info!("Rendering {} triangles", mesh.len());

    let result = TerminalApp::new(mesh, config).and_then(|mut app| app.run());
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
