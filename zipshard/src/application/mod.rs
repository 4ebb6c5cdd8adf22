pub mod devices;
pub mod handlers;
pub mod prompt;

use crate::presentation::cli::{Cli, Commands, RestoreCommands};
use clap::Parser;
use handlers::BackupArgs;
use zipshard_core::Result;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Backup {
            folders,
            output,
            password,
            workers,
            chunk_size,
            min_files_for_chunking,
            level,
            codec,
            buffer_batches,
            config,
            scratch_dir,
            store,
            no_prompt,
        } => handlers::handle_backup(
            BackupArgs {
                folders,
                output,
                password,
                workers,
                chunk_size,
                min_files_for_chunking,
                level,
                codec: codec.map(Into::into),
                buffer_batches,
                config,
                scratch_dir,
                store,
                no_prompt,
            },
            &cli.registry,
        ),
        Commands::Store { archive } => handlers::handle_store(&archive, &cli.registry),
        Commands::Restore(cmd) => match cmd {
            RestoreCommands::Local {
                zip_path,
                output_dir,
                password,
            } => handlers::handle_restore_local(zip_path, output_dir, password),
            RestoreCommands::Fragments {
                filename,
                output_dir,
                password,
            } => handlers::handle_restore_fragments(&cli.registry, filename, output_dir, password),
        },
        Commands::Devices => handlers::handle_devices(),
    }
}
