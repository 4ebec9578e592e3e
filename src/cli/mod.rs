// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes to Layer 2. Printing
// of final results happens here; the work happens below.
//
//   digit-cnn train    — train, evaluate, export
//   digit-cnn export   — export again from a checkpoint
//   digit-cnn summary  — print the layer table
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, ExportArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "digit-cnn",
    version,
    about = "Train a small MNIST convnet with Burn and export its weights as raw f32 files."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)  => run_train(args),
            Commands::Export(args) => run_export(args),
            Commands::Summary      => run_summary(),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training: {} epochs, batch size {}", args.epochs, args.batch_size);

    let report = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Training complete. Test accuracy {:.2}%, {} weight files written.",
        report.test.accuracy * 100.0,
        report.manifest.files.len(),
    );
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<()> {
    use crate::application::export_use_case::ExportUseCase;

    let manifest = ExportUseCase::new(args.artifact_dir, args.export_dir, args.target).execute()?;

    println!(
        "Exported {} files ({} bytes) for target '{}'.",
        manifest.files.len(),
        manifest.total_bytes(),
        manifest.target,
    );
    Ok(())
}

fn run_summary() -> Result<()> {
    use crate::application::summary_use_case::SummaryUseCase;
    use crate::ml::model::DigitCnnConfig;

    let summary = SummaryUseCase::new(DigitCnnConfig::new()).execute();
    println!("{summary}");
    Ok(())
}
