use clap::ValueEnum;
use std::fmt;
use std::path::Path;

/// Encodings supported by this crate.
///
/// JSON and YAML are handled by serde based deserializers while HCL parsing is delegated to the
/// `hcl-rs` crate.
#[non_exhaustive]
#[derive(ValueEnum, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Encoding {
    /// JavaScript Object Notation, including Terraform's JSON configuration representation.
    Json,
    /// YAML, used by TerraHub component descriptors.
    #[clap(alias = "yml")]
    Yaml,
    /// HashiCorp Configuration Language.
    #[clap(alias = "tf")]
    Hcl,
}

impl Encoding {
    /// Creates an `Encoding` from a path by looking at the file extension.
    ///
    /// Returns `None` if the extension is absent or if the extension does not match any of the
    /// supported encodings.
    pub fn from_path<P>(path: P) -> Option<Encoding>
    where
        P: AsRef<Path>,
    {
        let ext = path.as_ref().extension()?.to_str()?;

        match ext {
            "json" => Some(Encoding::Json),
            "yaml" | "yml" => Some(Encoding::Yaml),
            "tf" | "tfvars" | "hcl" => Some(Encoding::Hcl),
            _ => None,
        }
    }

    /// Returns the name of the `Encoding`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Json => "json",
            Encoding::Yaml => "yaml",
            Encoding::Hcl => "hcl",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

/// Chooses a suitable `Encoding` from the provided `Option` values.
///
/// If encoding is `Some` it is returned. Otherwise it attempts to create the `Encoding` from the
/// provided path.
pub fn detect_encoding<P>(encoding: Option<Encoding>, path: Option<P>) -> Option<Encoding>
where
    P: AsRef<Path>,
{
    encoding.or_else(|| path.and_then(Encoding::from_path))
}
