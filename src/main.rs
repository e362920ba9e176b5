use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use git_tag_version::builder::PackageBuilder;
use git_tag_version::cli::orchestration::{self, BuildWorkflowArgs};
use git_tag_version::domain::VersionPart;
use git_tag_version::{config, logging, ui};

#[derive(clap::Parser)]
#[command(
    name = "git-tag-version",
    version,
    about = "Build packages with versions derived from git tags"
)]
struct Args {
    #[arg(
        short,
        long,
        default_value = ".",
        help = "Directory containing the package to build"
    )]
    package_dir: PathBuf,

    #[arg(
        short,
        long,
        help = "Directory to store build artifacts (default: <package-dir>/dist)"
    )]
    output_dir: Option<PathBuf>,

    #[arg(
        long,
        value_name = "VERSION",
        help = "Override the version instead of using git tags"
    )]
    version_override: Option<String>,

    #[arg(long, help = "Use the current version as-is instead of deriving one")]
    no_auto_bump: bool,

    #[arg(long, help = "Build a development version even on a tagged commit")]
    force_dev: bool,

    #[arg(long, help = "Do not clean the output directory before building")]
    no_clean: bool,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,

    #[arg(long, help = "Show version info without building")]
    info: bool,

    #[arg(long, help = "Print the current version with its patch bumped")]
    get_bumped_version: bool,

    #[arg(
        long,
        num_args = 2,
        value_names = ["MAJOR", "MINOR"],
        help = "Print the next untagged patch version for MAJOR.MINOR"
    )]
    get_next_patch_version: Option<Vec<u32>>,

    #[arg(long, value_name = "PART", help = "Print the current version bumped by major, minor or patch")]
    bump: Option<VersionPart>,

    #[arg(long, help = "List major.minor-only tags")]
    list_floating: bool,

    #[arg(long, value_name = "VERSION", help = "Create the tag for VERSION")]
    create_tag: Option<String>,

    #[arg(long, value_name = "VERSION", help = "Delete the tag for VERSION")]
    delete_tag: Option<String>,

    #[arg(long, help = "Also push tag creation or deletion to the remote")]
    push: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    let resolver = orchestration::open_resolver(&args.package_dir, &config);

    if args.info {
        ui::display_metadata(&resolver.get_metadata());
        return Ok(());
    }

    if args.get_bumped_version || args.bump.is_some() {
        let part = args.bump.unwrap_or(VersionPart::Patch);
        let current = resolver.get_version();
        match resolver.bump_version(&current, part) {
            Ok(bumped) => println!("{}", bumped),
            Err(e) => {
                ui::display_error(&format!("Cannot bump '{}': {}", current, e));
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    if let Some(pair) = args.get_next_patch_version.as_deref() {
        if let [major, minor] = pair {
            match resolver.next_patch_for(*major, *minor) {
                Some(next) => println!("{}", next),
                None => {
                    ui::display_error(&format!("No patch version left for {}.{}", major, minor));
                    std::process::exit(1);
                }
            }
        }
        return Ok(());
    }

    if args.list_floating {
        ui::display_list("floating tags", &resolver.get_major_minor_tags());
        return Ok(());
    }

    if args.create_tag.is_some() || args.delete_tag.is_some() {
        let mut ok = true;
        if let Some(version) = args.create_tag.as_deref() {
            if resolver.create_tag(version, args.push) {
                ui::display_success(&format!("Created tag for {}", version));
            } else {
                ui::display_error(&format!("Failed to create tag for {}", version));
                ok = false;
            }
        }
        if let Some(version) = args.delete_tag.as_deref() {
            if resolver.delete_tag(version, args.push) {
                ui::display_success(&format!("Deleted tag for {}", version));
            } else {
                ui::display_error(&format!("Failed to delete tag for {}", version));
                ok = false;
            }
        }
        if !ok {
            std::process::exit(1);
        }
        return Ok(());
    }

    let workflow_args = BuildWorkflowArgs {
        package_dir: args.package_dir.clone(),
        output_dir: args.output_dir.clone(),
        version_override: args.version_override.clone(),
        auto_bump: !args.no_auto_bump,
        force_dev: args.force_dev,
        clean: !args.no_clean,
    };
    let builder = PackageBuilder::new(args.package_dir.clone(), args.output_dir.clone())
        .with_backend(config.build.clone());

    ui::display_status(&format!(
        "Building package in {}",
        args.package_dir.display()
    ));
    match orchestration::run_build_workflow(&resolver, &builder, &workflow_args, &config.tags) {
        Ok(result) => {
            if result.tag_created {
                ui::display_success(&format!("Created release tag v{}", result.version));
            }
            for tag in &result.removed_floating_tags {
                ui::display_status(&format!("Removed floating tag {}", tag));
            }
            ui::display_success(&format!(
                "Built package version {} in {}",
                result.version,
                result.output_dir.display()
            ));
            Ok(())
        }
        Err(e) => {
            ui::display_error(&format!("Error building package: {:#}", e));
            std::process::exit(1);
        }
    }
}
