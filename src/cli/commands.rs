// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `export`, `summary`
// and their flags. Layout and target flags are parsed through
// the domain types' FromStr impls.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::domain::layout::{ExportTarget, ImageLayout};
use crate::ml::model::DigitCnnConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the digit classifier, evaluate it and export its weights
    Train(TrainArgs),

    /// Export weights again from a saved checkpoint
    Export(ExportArgs),

    /// Print the layer table and parameter count
    Summary,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory with raw MNIST IDX files. Omit to use Burn's MNIST download
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Where checkpoints, train_config.json and metrics.csv go
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// Where the .dat files go [default: <artifact-dir>/weights]
    #[arg(long)]
    pub export_dir: Option<String>,

    /// Samples per optimizer step
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Full passes over the training set
    #[arg(long, default_value_t = 12)]
    pub epochs: usize,

    /// Seeds weight init, dropout, shuffling and subsets
    #[arg(long, default_value_t = 1337)]
    pub seed: u64,

    /// channels-last (NHWC) or channels-first (NCHW)
    #[arg(long, default_value_t = ImageLayout::ChannelsLast)]
    pub image_layout: ImageLayout,

    /// Runtime the weights are exported for: mps, keras or native
    #[arg(long, default_value_t = ExportTarget::Mps)]
    pub target: ExportTarget,

    /// Train on a random subset of this many images
    #[arg(long)]
    pub train_limit: Option<usize>,

    /// Evaluate on a random subset of this many images
    #[arg(long)]
    pub test_limit: Option<usize>,

    /// Data loader worker threads
    #[arg(long, default_value_t = 1)]
    pub num_workers: usize,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:     a.data_dir,
            artifact_dir: a.artifact_dir,
            export_dir:   a.export_dir,
            batch_size:   a.batch_size,
            epochs:       a.epochs,
            seed:         a.seed,
            image_layout: a.image_layout,
            target:       a.target,
            train_limit:  a.train_limit,
            test_limit:   a.test_limit,
            num_workers:  a.num_workers,
            model:        DigitCnnConfig::new(),
        }
    }
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Artifact directory of a finished `train` run
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// Where the .dat files go [default: the run's export directory]
    #[arg(long)]
    pub export_dir: Option<String>,

    /// mps, keras or native [default: the run's target]
    #[arg(long)]
    pub target: Option<ExportTarget>,
}
