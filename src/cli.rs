use clap::Parser;

use crate::bundle::{BundleItem, BundleRequest, DEFAULT_CONCURRENCY, Scope};

#[derive(Parser, Debug)]
#[command(name = "stowzip")]
#[command(version)]
#[command(about = "Bundle local and remote files into a stored ZIP archive", long_about = None)]
#[command(after_help = "Examples:\n  \
  stowzip a.csv b.csv                         write data-<date>-all.zip\n  \
  stowzip -s -n forecasts -b https://example.com /csv/2024-01.csv\n  \
  stowzip -p /csv/a.csv::january.csv | unzip -l /dev/stdin")]
pub struct Cli {
    /// Resources to include, as SOURCE or SOURCE::NAME
    #[arg(value_name = "RESOURCES")]
    pub resources: Vec<String>,

    /// Archive name prefix
    #[arg(short = 'n', long = "name", value_name = "PREFIX", env = "STOWZIP_NAME")]
    pub name: Option<String>,

    /// Prefix prepended to every resource (URL root or directory)
    #[arg(
        short = 'b',
        long = "base",
        value_name = "BASE",
        env = "STOWZIP_BASE",
        default_value = ""
    )]
    pub base: String,

    /// Mark the archive as a selected subset rather than all items
    #[arg(short = 's', long = "selected")]
    pub selected: bool,

    /// Write the archive into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Write the archive to stdout, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Overwrite an existing archive WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Number of concurrent downloads
    #[arg(short = 'j', long = "jobs", value_name = "N", default_value_t = DEFAULT_CONCURRENCY)]
    pub jobs: usize,

    /// List included and skipped entries
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    pub fn scope(&self) -> Scope {
        if self.selected { Scope::Selected } else { Scope::All }
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        if self.is_very_quiet() {
            "error"
        } else if self.is_quiet() {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    pub fn request(&self) -> BundleRequest {
        let items = self.resources.iter().map(|r| parse_resource(r)).collect();
        let mut request = BundleRequest::new(items).with_scope(self.scope());
        request.name = self.name.clone();
        request
    }
}

/// Parse `SOURCE` or `SOURCE::NAME`.
///
/// The split only happens when NAME looks like a file name, so URLs such as
/// `http://[::1]/a.csv` are left intact.
pub fn parse_resource(arg: &str) -> BundleItem {
    match arg.rsplit_once("::") {
        Some((source, name))
            if !source.is_empty() && !name.is_empty() && !name.contains(['/', ']']) =>
        {
            BundleItem::new(source).with_filename(name)
        }
        _ => BundleItem::new(arg),
    }
}
