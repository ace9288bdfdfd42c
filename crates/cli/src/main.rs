use clap::Parser;
use ras::default_backend;
use ras_cli::cli::Cli;
use ras_cli::error::CliError;
use ras_cli::output::{CommandResult, OutputFormat, ResultBuilder, print_error_stderr, print_result};
use ras_cli::{commands, logging};
use tracing::error;

fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let format = cli.format;
	let command = cli.command.name();
	let backend = default_backend();
	if let Err(err) = commands::dispatch(cli, backend.as_ref()) {
		handle_error(command, format, &err);
		std::process::exit(1);
	}
}

fn handle_error(command: &str, format: OutputFormat, err: &CliError) {
	error!(target = "ras", error = %err, "command failed");
	let command_error = err.to_command_error();
	match format {
		OutputFormat::Json => {
			let result: CommandResult<()> = ResultBuilder::new(command).error(command_error).build();
			print_result(&result, format);
		}
		OutputFormat::Text => print_error_stderr(&command_error),
	}
}
