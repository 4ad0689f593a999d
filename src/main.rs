use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use pciids_lookup::{load, render, OutputFormat, ParsePolicy, Query, RegistrySource, REMOTE_URL};

/// Lookup vendor and device names using PCI IDs.
///
/// Pass in either a vendor ID, a pair of vendor and device IDs, or two pairs:
/// vendor and device IDs followed by sub-vendor and sub-device IDs.
#[derive(structopt::StructOpt)]
#[structopt(
    name = "pciids",
    after_help = "EXAMPLES:\n    pciids 1ed5\n    pciids 1d0f efa1\n    pciids 10de 2206 10de 1467"
)]
struct Args {
    /// Debug output
    #[structopt(long)]
    debug: bool,

    /// Enable output in JSON
    #[structopt(long)]
    json: bool,

    /// Fail on the first malformed registry line instead of skipping it
    #[structopt(long)]
    strict: bool,

    /// Read the registry from this file instead of downloading it
    #[structopt(long = "pci-ids-file", env = "PCIIDS_LOCAL_PATH", parse(from_os_str))]
    pci_ids_file: Option<PathBuf>,

    /// Registry URL to download
    #[structopt(long, env = "PCIIDS_REMOTE_URL")]
    url: Option<String>,

    /// Download timeout in seconds
    #[structopt(long, default_value = "30")]
    timeout: u64,

    /// 1, 2 or 4 PCI IDs: vendor [device [subvendor subdevice]]
    #[structopt(name = "ID")]
    ids: Vec<String>,
}

impl Args {
    fn source(&self) -> RegistrySource {
        match &self.pci_ids_file {
            Some(path) => RegistrySource::local(path),
            None => RegistrySource::remote(self.url.as_deref().unwrap_or(REMOTE_URL))
                .with_timeout(Duration::from_secs(self.timeout)),
        }
    }
}

fn setup_logging(debug: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if debug {
        tracing_subscriber::filter::LevelFilter::DEBUG
    } else {
        tracing_subscriber::filter::LevelFilter::WARN
    };
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[paw::main]
fn main(args: Args) -> Result<()> {
    setup_logging(args.debug);

    let query = Query::from_ids(&args.ids)?;
    let policy = if args.strict {
        ParsePolicy::Strict
    } else {
        ParsePolicy::Lenient
    };

    let source = args.source();
    debug!("using {:?}", source);
    let data = load(&source, policy).context("cannot load the PCI ID registry")?;
    let ids = data.query(&query);

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let rendered = render(&ids, format).context("cannot render JSON")?;
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    Ok(())
}
