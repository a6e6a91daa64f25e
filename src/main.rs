// main.rs - CLI entry point

use scenemerge::cli::{parse_args, usage, validate_args, Args, Config, Invocation};
use scenemerge::core::run_merge;
use scenemerge::error::MergeError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let argv: Vec<String> = std::env::args().collect();
    std::process::exit(run(&argv));
}

/// Run one invocation and return the process exit status
fn run(argv: &[String]) -> i32 {
    let result = parse_args(argv).and_then(|invocation| match invocation {
        Invocation::Run(args) => run_main(args),
        Invocation::Help(text) => {
            print!("{}", text);
            Ok(())
        }
    });

    match result {
        Ok(()) => 0,
        Err(e) => {
            match &e {
                MergeError::Usage => print!("{}", usage()),
                MergeError::OutputOpen { .. } | MergeError::OutputWrite { .. } => {
                    eprintln!("[ERROR]: Failed to write output data!!! ({})", e)
                }
                _ => eprintln!("[ERROR]: {}", e),
            }
            e.exit_code()
        }
    }
}

fn run_main(args: Args) -> Result<(), MergeError> {
    // Handle generate config first
    if args.generate_config {
        println!("{}", Config::generate_sample());
        println!("Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    let resolved = args.resolve().map_err(MergeError::Config)?;
    let validated = validate_args(&resolved)?;

    // Print short info
    println!("[INFO]: Output file={}", validated.output);
    println!("[INFO]: Input files:");
    for input in &validated.inputs {
        println!("[INFO]: Input file={}", input);
    }
    for (input, reason) in &validated.suspicious_inputs {
        log::warn!("Input '{}' will be skipped: {}", input, reason);
    }

    let handler = scenemerge::scene::init();
    let options = validated.into_options(&resolved);
    let report = run_merge(&handler, &options)?;

    if !report.all_loaded() {
        log::warn!(
            "{} of {} input files were skipped",
            report.failed.len(),
            options.inputs.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenemerge::error::EXIT_FAILURE;
    use std::fs;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_arguments_exit_code() {
        assert_eq!(run(&argv(&["scenemerge"])), EXIT_FAILURE);
        assert_eq!(run(&argv(&["scenemerge", "out.osb"])), EXIT_FAILURE);
    }

    #[test]
    fn test_dash_prefixed_path() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.osb");
        let output = output.to_str().unwrap();

        assert_eq!(run(&argv(&["scenemerge", output, "-a.osg"])), EXIT_FAILURE);
        assert!(!dir.path().join("out.osb").exists());

        // the unreadable input is skipped, the output is still written
        assert_eq!(run(&argv(&["scenemerge", "--", output, "-a.osg"])), 0);
        assert!(dir.path().join("out.osb").exists());
    }

    #[test]
    fn test_unwritable_output_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.osg");
        fs::write(&input, "#OSG V1.0\nNode { core Group { } }\n").unwrap();
        let output = dir.path().join("no_such_dir").join("out.osb");

        let status = run(&argv(&[
            "scenemerge",
            output.to_str().unwrap(),
            input.to_str().unwrap(),
        ]));
        assert_eq!(status, EXIT_FAILURE);
        assert!(!output.exists());
    }

    #[test]
    fn test_help_and_sample_config_succeed() {
        assert_eq!(run(&argv(&["scenemerge", "--help"])), 0);
        assert_eq!(run(&argv(&["scenemerge", "--generate-config"])), 0);
    }
}
