use clap::Args;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A `DIR/NAME` reference into a store container. The last segment is the blob name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRef {
    pub directory: String,
    pub name: String,
}

impl FromStr for BlobRef {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim_matches('/');
        let (directory, name) = match raw.rsplit_once('/') {
            Some((directory, name)) => (directory, name),
            None => ("", raw),
        };
        if name.is_empty() {
            return Err(format!("'{}' does not name a blob", raw));
        }
        Ok(BlobRef {
            directory: directory.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.directory.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.directory, self.name)
        }
    }
}

/// `DIR/NAME=NAMESPACE#CLASS` as given to `--module`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleArg {
    pub blob: BlobRef,
    pub namespace: String,
    pub class_name: String,
}

impl FromStr for ModuleArg {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (blob, binding) = raw
            .split_once('=')
            .ok_or_else(|| format!("'{}' must look like DIR/NAME=NAMESPACE#CLASS", raw))?;
        // Namespace URIs may contain '#', the class name never does.
        let (namespace, class_name) = binding
            .rsplit_once('#')
            .ok_or_else(|| format!("'{}' is missing the #CLASS suffix", raw))?;
        if namespace.is_empty() || class_name.is_empty() {
            return Err(format!("'{}' needs both a namespace and a class", raw));
        }
        Ok(ModuleArg {
            blob: blob.parse()?,
            namespace: namespace.to_string(),
            class_name: class_name.to_string(),
        })
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to the service config file (default: ./xslmapper.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Listen address, overriding [server].bind
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,
}

#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Template inside the mappers container
    #[arg(long, value_name = "DIR/NAME")]
    pub template: BlobRef,

    /// Input XML document ('-' reads stdin)
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// Extension module to register, repeatable
    #[arg(long = "module", value_name = "DIR/NAME=NAMESPACE#CLASS")]
    pub modules: Vec<ModuleArg>,

    /// Emit the result base64-encoded
    #[arg(long, help_heading = "Output Options")]
    pub base64: bool,

    /// Write the result here instead of stdout
    #[arg(long, value_name = "FILE", help_heading = "Output Options")]
    pub output: Option<PathBuf>,

    /// Path to the service config file (default: ./xslmapper.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CheckTemplateArgs {
    /// Local stylesheet file to compile
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}
