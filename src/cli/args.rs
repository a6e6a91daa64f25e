// args.rs - Command line arguments definition

use argh::{EarlyExit, FromArgs};

use crate::error::MergeError;

#[derive(FromArgs, Debug, Default)]
/// scenemerge - merge scene files under one group node and dump them as a single binary scene
pub struct Args {
    /// output file followed by one or more input files (.osg or .osb)
    #[argh(positional)]
    pub files: Vec<String>,

    /// compress the output payload with LZ4
    #[argh(switch)]
    pub compress: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}

/// What the command line asks for
#[derive(Debug)]
pub enum Invocation {
    Run(Args),
    /// `--help` and friends: print this and exit successfully
    Help(String),
}

/// Parse a full argv (program name first). Anything argh rejects, such as a
/// path starting with `-` without a preceding `--`, is a usage error.
pub fn parse_args(argv: &[String]) -> Result<Invocation, MergeError> {
    let (cmd, rest) = match argv.split_first() {
        Some((cmd, rest)) => (cmd.as_str(), rest),
        None => ("scenemerge", &[][..]),
    };
    let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

    match Args::from_args(&[cmd], &rest) {
        Ok(args) => Ok(Invocation::Run(args)),
        Err(EarlyExit {
            output,
            status: Ok(()),
        }) => Ok(Invocation::Help(output)),
        Err(EarlyExit { output, .. }) => {
            eprintln!("[ERROR]: {}", output.trim_end());
            Err(MergeError::Usage)
        }
    }
}

/// Usage text shown when OUTPUT or INPUT is missing
pub fn usage() -> String {
    "USAGE: scenemerge OUTPUT INPUT1 ...\n\
     Merges the input files to one single scene file which is dumped as OUTPUT.\n\
     Put -- before the files if a path starts with '-'.\n"
        .to_string()
}
