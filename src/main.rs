mod app;
mod audio;
mod config;
mod error;
mod karaoke;
mod library;
mod lyrics;
mod runtime;
mod ui;
mod visualizer;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
