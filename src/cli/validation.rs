// validation.rs - Input validation utilities

use crate::cli::merge::ResolvedArgs;
use crate::core::{check_extension, MergeOptions};
use crate::error::MergeError;

pub struct ValidationResult {
    pub output: String,
    pub inputs: Vec<String>,
    /// Inputs whose extension will make the loader skip them
    pub suspicious_inputs: Vec<(String, MergeError)>,
}

impl ValidationResult {
    pub fn into_options(self, resolved: &ResolvedArgs) -> MergeOptions {
        MergeOptions {
            output: self.output,
            inputs: self.inputs,
            compress: resolved.compress,
            root_name: resolved.root_name.clone(),
        }
    }
}

/// Validate the invocation shape: OUTPUT plus at least one INPUT.
/// Extension problems are collected, not raised; the loader skips those files.
pub fn validate_args(args: &ResolvedArgs) -> Result<ValidationResult, MergeError> {
    let (output, inputs) = match args.files.split_first() {
        Some((output, inputs)) if !inputs.is_empty() => (output.clone(), inputs.to_vec()),
        _ => return Err(MergeError::Usage),
    };

    let mut suspicious_inputs = Vec::new();
    for input in &inputs {
        match check_extension(input) {
            Ok(ext) => log::debug!("Input '{}' has extension .{}", input, ext),
            Err(e) => suspicious_inputs.push((input.clone(), e)),
        }
    }

    Ok(ValidationResult {
        output,
        inputs,
        suspicious_inputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(files: &[&str]) -> ResolvedArgs {
        ResolvedArgs {
            files: files.iter().map(|f| f.to_string()).collect(),
            ..ResolvedArgs::default()
        }
    }

    #[test]
    fn test_too_few_arguments() {
        assert!(matches!(validate_args(&resolved(&[])), Err(MergeError::Usage)));
        assert!(matches!(
            validate_args(&resolved(&["out.osb"])),
            Err(MergeError::Usage)
        ));
    }

    #[test]
    fn test_output_then_inputs() {
        let result = validate_args(&resolved(&["out.osb", "a.osg", "B.OSB"])).unwrap();

        assert_eq!(result.output, "out.osb");
        assert_eq!(result.inputs, vec!["a.osg", "B.OSB"]);
        assert!(result.suspicious_inputs.is_empty());
    }

    #[test]
    fn test_bad_extensions_are_not_fatal() {
        let result = validate_args(&resolved(&["out", "a.txt", "noext", "c.osg"])).unwrap();

        assert_eq!(result.inputs.len(), 3);
        assert_eq!(result.suspicious_inputs.len(), 2);
        assert!(matches!(
            result.suspicious_inputs[1].1,
            MergeError::MissingExtension(_)
        ));
    }

    #[test]
    fn test_into_options() {
        let mut args = resolved(&["out.osb", "a.osg"]);
        args.compress = true;
        args.root_name = Some("world".to_string());

        let options = validate_args(&args).unwrap().into_options(&args);
        assert_eq!(options.output, "out.osb");
        assert_eq!(options.inputs, vec!["a.osg"]);
        assert!(options.compress);
        assert_eq!(options.root_name.as_deref(), Some("world"));
    }
}
