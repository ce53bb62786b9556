//! Command line arguments for tfconv.

use clap::{Args, Parser, ValueEnum, ValueHint};
use clap_complete::Shell;
use tfconv::{Encoding, Source};

/// Convert Terraform configuration between JSON, YAML component descriptors and HCL.
///
/// JSON input and the template of a YAML component descriptor are rendered as HCL. HCL input is
/// parsed and converted back to JSON. The input encoding is detected from the file extension
/// unless set explicitly.
#[derive(Parser, Debug)]
#[command(name = "tfconv", version)]
pub struct Options {
    /// Input source.
    ///
    /// Pass a file path or '-' to read from stdin. Data piped to stdin is picked up
    /// automatically when no source is given.
    #[arg(name = "SOURCE", value_hint = ValueHint::AnyPath)]
    pub source: Option<Source>,

    #[clap(flatten)]
    pub input: InputOptions,

    #[clap(flatten)]
    pub output: OutputOptions,

    /// If provided, outputs the completion file for the given shell.
    #[arg(value_enum, long, value_name = "SHELL")]
    pub generate_completion: Option<Shell>,
}

/// Options that configure how input is read and decoded.
#[derive(Args, Debug)]
pub struct InputOptions {
    /// Base64 encoded document to convert instead of reading from SOURCE.
    #[arg(
        short = 'd',
        long,
        value_name = "BASE64",
        conflicts_with = "SOURCE",
        help_heading = "Input Options"
    )]
    pub data: Option<String>,

    /// Set the input encoding. If absent, the encoding is detected from the file extension,
    /// falling back to JSON.
    #[arg(value_enum, short = 'i', long, help_heading = "Input Options")]
    pub input_encoding: Option<Encoding>,

    /// The Terraform document flavor of the input.
    ///
    /// Expression detection only applies to `tf` documents. Values in `tfvars` and `yml`
    /// documents are always emitted as literals.
    #[arg(
        value_enum,
        short = 'T',
        long,
        value_name = "TYPE",
        default_value = "tf",
        help_heading = "Input Options"
    )]
    pub file_type: FileType,

    /// Render the component descriptor's tfvars section instead of its Terraform template.
    ///
    /// Only meaningful for YAML input.
    #[arg(long, help_heading = "Input Options")]
    pub tfvars: bool,
}

/// Options that configure how output is encoded.
#[derive(Args, Debug)]
pub struct OutputOptions {
    /// Set the output encoding.
    ///
    /// Defaults to HCL for JSON and YAML input, and to JSON for HCL input.
    #[arg(value_enum, short = 'o', long, help_heading = "Output Options")]
    pub output_encoding: Option<Encoding>,

    /// Produce HCL1 compatible output.
    ///
    /// Numbers and booleans are quoted and string values are never emitted as bare expressions.
    #[arg(long, help_heading = "Output Options")]
    pub hcl1: bool,

    /// Emit compact instead of pretty JSON.
    #[arg(short = 'c', long, help_heading = "Output Options")]
    pub compact: bool,

    /// Ensure the output ends with a newline.
    #[arg(short = 'n', long, help_heading = "Output Options")]
    pub newline: bool,
}

/// The Terraform document flavor of the input.
#[derive(ValueEnum, Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileType {
    /// A Terraform configuration document.
    Tf,
    /// A variable values document.
    Tfvars,
    /// A TerraHub component descriptor.
    Yml,
}
