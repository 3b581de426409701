//! Build command - generate documents, zip the module and optionally install it.

use std::path::PathBuf;

use clap::Args;
use fgmodule::ModulePackager;

use crate::commands::common::ModuleArgs;
use crate::error::CliError;

/// Arguments for `fgmodule build`.
#[derive(Debug, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub module: ModuleArgs,

    /// Directory to write the .mod archive to (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub archive_dir: Option<PathBuf>,

    /// Fantasy Grounds modules directory to move the finished archive into
    #[arg(long, value_name = "DIR")]
    pub install: Option<PathBuf>,
}

/// Run the build command.
pub fn run(args: BuildArgs) -> Result<(), CliError> {
    let (config, targets) = args.module.resolve()?;
    let archive_dir = args
        .archive_dir
        .or(targets.archive_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let install_dir = args.install.or(targets.install_dir);

    let packager = ModulePackager::new(config)?;
    let report = packager.package(&archive_dir)?;

    println!(
        "Built {} v{}",
        packager.module().name,
        report.version
    );
    println!("  Assets:   {}", report.catalog_entries);
    println!("  Archive:  {}", report.archive.path.display());
    println!("  Entries:  {}", report.archive.entries.len());
    println!("  Size:     {} bytes", report.archive.size);
    println!("  SHA-256:  {}", report.archive.checksum);

    if let Some(dir) = install_dir {
        let installed = packager.install(&report.archive, &dir)?;
        println!("Installed to {}", installed.display());
    }

    Ok(())
}
