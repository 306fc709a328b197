mod banner;
mod report;

use std::path::PathBuf;

use buildstamp::{ArtifactRef, ManifestResolver, MissingManifestPolicy, ResolverConfig};
use clap::{ArgGroup, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use report::Report;

#[derive(Parser, Debug)]
#[command(name = "buildstamp", version, about = "Print the build version recorded in a packaging manifest")]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .args(["class_name", "archive", "classes_dir"])
))]
struct Args {
    /// Fully qualified name of a type, used to locate its manifest
    #[arg(long, requires = "location")]
    class_name: Option<String>,

    /// Resource location the type was loaded from
    /// (e.g. `jar:file:/opt/app.jar!/com/example/App.class`)
    #[arg(long, requires = "class_name")]
    location: Option<String>,

    /// Archive whose manifest should be read
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Root of a directory of compiled output
    #[arg(long)]
    classes_dir: Option<PathBuf>,

    /// How to report a manifest that does not exist
    #[arg(long, value_enum, default_value_t = OnMissing::Placeholder)]
    on_missing: OnMissing,

    /// Prefix for log messages
    #[arg(long)]
    log_prefix: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Extra main-section attribute to print (repeatable)
    #[arg(long = "attribute", value_name = "NAME")]
    attributes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OnMissing {
    Placeholder,
    Empty,
}

impl Args {
    fn artifact(&self) -> anyhow::Result<ArtifactRef> {
        match (&self.class_name, &self.location, &self.archive, &self.classes_dir) {
            (Some(name), Some(location), _, _) => Ok(ArtifactRef::for_type(name, location)),
            (_, _, Some(archive), _) => Ok(ArtifactRef::archive(archive)),
            (_, _, _, Some(dir)) => Ok(ArtifactRef::directory(dir)),
            _ => anyhow::bail!("one of --class-name/--location, --archive or --classes-dir is required"),
        }
    }

    fn resolver_config(&self) -> ResolverConfig {
        let policy = match self.on_missing {
            OnMissing::Placeholder => MissingManifestPolicy::Placeholder,
            OnMissing::Empty => MissingManifestPolicy::Empty,
        };

        let config = ResolverConfig::default().with_missing_manifest(policy);
        match &self.log_prefix {
            Some(prefix) => config.with_log_prefix(prefix),
            None => config,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let artifact = args.artifact()?;
    let resolver = ManifestResolver::new(artifact, args.resolver_config());
    let build = resolver.build_info();

    banner::log_banner(args.log_prefix.as_deref().unwrap_or(""), &build);

    let report = Report::new(build).with_attributes(resolver.artifact(), &args.attributes);
    if args.json {
        println!("{}", report.render_json()?);
    } else {
        println!("{}", report.render_text());
    }

    Ok(())
}
