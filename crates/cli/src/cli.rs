use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "ras")]
#[command(about = "HEC-RAS automation from the command line")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: text (default) or json
	#[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	/// Configuration file (defaults to $RAS_CONFIG, then the user config directory)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Window polling interval in milliseconds
	#[arg(long, global = true, value_name = "MS")]
	pub poll_ms: Option<u64>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// List the HEC-RAS releases installed on this machine
	Versions,

	/// Show the operations a release supports
	Capabilities {
		/// Release tag (4.1, 5.0, 5.0.7 or RASxx)
		tag: String,

		/// Compare against another release instead of listing
		#[arg(long, value_name = "TAG")]
		diff: Option<String>,
	},

	/// Open a project and report its current files
	Open {
		project: PathBuf,

		/// Release to launch
		#[arg(long = "ras", value_name = "TAG")]
		version: Option<String>,
	},

	/// Run a plan of a project
	Compute {
		project: PathBuf,

		#[arg(long = "ras", value_name = "TAG")]
		version: Option<String>,

		/// Plan to make current before computing
		#[arg(long, value_name = "TITLE")]
		plan: Option<String>,

		/// Keep the computation window visible
		#[arg(long)]
		show_window: bool,
	},

	/// Call any vendor operation by name
	Call {
		project: PathBuf,

		/// Operation name, e.g. Geometry_GetRivers
		operation: String,

		/// Input arguments as a JSON array
		#[arg(long, value_name = "JSON", default_value = "[]")]
		args: String,

		#[arg(long = "ras", value_name = "TAG")]
		version: Option<String>,
	},

	/// Kill every running HEC-RAS process
	Kill,
}

impl Commands {
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Versions => "versions",
			Commands::Capabilities { .. } => "capabilities",
			Commands::Open { .. } => "open",
			Commands::Compute { .. } => "compute",
			Commands::Call { .. } => "call",
			Commands::Kill => "kill",
		}
	}
}
