//! The tfconv command line program.

#![deny(missing_docs)]

mod args;

use crate::args::{FileType, Options};
use anyhow::{anyhow, Context as _, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::{Command, CommandFactory, Parser};
use clap_complete::{generate, Shell};
use serde_json::Value;
use std::io::{self, IsTerminal, Write};
use tfconv::component::Descriptor;
use tfconv::render::{reformat, RendererBuilder};
use tfconv::{convert, detect_encoding, Encoding};

fn print_completions(cmd: &mut Command, shell: Shell) {
    generate(shell, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

fn read_input(opts: &Options) -> Result<(String, Encoding)> {
    if let Some(data) = &opts.input.data {
        let bytes = BASE64
            .decode(data.trim())
            .context("failed to decode base64 input")?;
        let text = String::from_utf8(bytes).context("base64 input is not valid UTF-8")?;
        let encoding = opts.input.input_encoding.unwrap_or(Encoding::Json);

        return Ok((text, encoding));
    }

    let source = match &opts.source {
        Some(source) => source.clone(),
        None if !io::stdin().is_terminal() => tfconv::Source::Stdin,
        None => return Err(anyhow!("input file or data expected")),
    };

    let encoding =
        detect_encoding(opts.input.input_encoding, source.as_path()).unwrap_or(Encoding::Json);
    let text = source
        .read_to_string()
        .with_context(|| format!("failed to read `{source}`"))?;

    Ok((text, encoding))
}

fn decode(text: &str, encoding: Encoding, opts: &Options) -> Result<Value> {
    match encoding {
        Encoding::Json => serde_json::from_str(text).context("failed to parse JSON input"),
        Encoding::Yaml => {
            let descriptor =
                Descriptor::from_str(text).context("failed to parse component descriptor")?;

            if opts.input.tfvars {
                Ok(descriptor.tfvars()?)
            } else {
                Ok(descriptor.terraform_template())
            }
        }
        Encoding::Hcl => convert::from_str(text).context("failed to parse HCL input"),
        _ => Err(anyhow!("unsupported input encoding `{encoding}`")),
    }
}

fn serialize(value: &Value, encoding: Encoding, opts: &Options) -> Result<String> {
    match encoding {
        Encoding::Json => {
            if opts.output.compact {
                Ok(serde_json::to_string(value)?)
            } else {
                Ok(serde_json::to_string_pretty(value)?)
            }
        }
        Encoding::Hcl => {
            let renderer = RendererBuilder::new()
                .quote_scalars(opts.output.hcl1)
                .detect_expressions(opts.input.file_type == FileType::Tf)
                .build();

            Ok(reformat(&renderer.render(value)))
        }
        other => Err(anyhow!("serializing to `{other}` is not supported")),
    }
}

fn run(opts: &Options) -> Result<()> {
    let (text, encoding) = read_input(opts)?;
    let value = decode(&text, encoding, opts)?;

    let output_encoding = opts.output.output_encoding.unwrap_or(match encoding {
        Encoding::Hcl => Encoding::Json,
        _ => Encoding::Hcl,
    });

    let mut out = serialize(&value, output_encoding, opts)?;

    if opts.output.newline && !out.ends_with('\n') {
        out.push('\n');
    }

    io::stdout().write_all(out.as_bytes())?;

    Ok(())
}

fn main() -> Result<()> {
    let opts = Options::parse();

    if let Some(shell) = opts.generate_completion {
        print_completions(&mut Options::command(), shell);
        return Ok(());
    }

    run(&opts)
}
