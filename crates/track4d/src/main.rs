//! Command-line entry point of the benchmark.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use track4d::{
    init_logging, run, ApproachTable, ArtifactSink, BenchmarkConfig, FileSource, NullSink,
    VisualSink,
};

#[derive(Parser, Debug)]
#[command(name = "track4d-bench", version, about = "Benchmark a 4D surface-tracking approach", long_about = None)]
struct Args {
    /// JSON configuration file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Registration approach to benchmark
    #[arg(short, long)]
    approach: Option<String>,

    /// Produce overview and heat-map artifacts
    #[arg(long, overrides_with = "no_plot")]
    plot: bool,

    /// Skip overview and heat-map artifacts
    #[arg(long, overrides_with = "plot")]
    no_plot: bool,

    /// Export trajectories and the run report
    #[arg(long, overrides_with = "no_export")]
    export: bool,

    /// Skip exporting trajectories and the run report
    #[arg(long, overrides_with = "export")]
    no_export: bool,

    /// Folder receiving exported artifacts
    #[arg(long)]
    export_folder: Option<PathBuf>,

    /// Folder holding the mesh sequence
    #[arg(long)]
    mesh_path: Option<PathBuf>,

    /// Ground-truth landmark file
    #[arg(long)]
    landmark_path: Option<PathBuf>,

    /// Synthetic landmark file for the virtual-landmark evaluation
    #[arg(long)]
    test_landmark_path: Option<PathBuf>,

    /// First native frame to load
    #[arg(long)]
    start: Option<usize>,

    /// Native frame to stop before
    #[arg(long)]
    end: Option<usize>,

    /// Step between loaded native frames
    #[arg(long)]
    stride: Option<usize>,

    /// List the registered approaches and exit
    #[arg(long)]
    list_approaches: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Resolves a `--flag` / `--no-flag` pair; `None` keeps the configured value.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl Args {
    fn into_config(self) -> track4d::Result<BenchmarkConfig> {
        let mut config = match &self.config {
            Some(path) => BenchmarkConfig::from_file(path)?,
            None => BenchmarkConfig::default(),
        };
        if let Some(approach) = self.approach {
            config.approach = approach;
        }
        if let Some(plot) = switch(self.plot, self.no_plot) {
            config.plot = plot;
        }
        if let Some(export) = switch(self.export, self.no_export) {
            config.export = export;
        }
        if let Some(folder) = self.export_folder {
            config.export_folder = folder;
        }
        if let Some(path) = self.mesh_path {
            config.mesh_path = path;
        }
        if let Some(path) = self.landmark_path {
            config.landmark_path = path;
        }
        if let Some(path) = self.test_landmark_path {
            config.test_landmark_path = path;
        }
        if let Some(start) = self.start {
            config.window.start = start;
        }
        if let Some(end) = self.end {
            config.window.end = end;
        }
        if let Some(stride) = self.stride {
            config.window.stride = stride;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });

    let table = ApproachTable::with_defaults();
    if args.list_approaches {
        for name in table.names() {
            if let Ok(approach) = table.resolve(name) {
                println!("{name}\t{:?}", approach.strategy);
            }
        }
        return ExitCode::SUCCESS;
    }

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut artifacts = ArtifactSink::new(config.export_folder.clone());
    let mut discard = NullSink;
    let sink: &mut dyn VisualSink = if config.export || config.plot {
        &mut artifacts
    } else {
        &mut discard
    };

    match run(config, &table, &FileSource, sink) {
        Ok(report) => {
            println!("{}", report.summary());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("benchmark failed: {e}");
            ExitCode::FAILURE
        }
    }
}
