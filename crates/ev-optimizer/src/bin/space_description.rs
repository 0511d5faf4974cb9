use anyhow::{bail, Context};
use ev_space::catalogue::space_for;
use ev_space::ParameterSpace;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (format, source) = match args.as_slice() {
        [format, source] => (format.as_str(), source.as_str()),
        _ => bail!("usage: space-description <irace|yaml> <family-or-yaml-file>"),
    };

    let space = if source.ends_with(".yaml") || source.ends_with(".yml") {
        ParameterSpace::from_yaml_file(source)
    } else {
        space_for(source)
    }
    .with_context(|| format!("failed to load parameter space {source}"))?;

    let text = match format {
        "irace" => space.irace_description()?,
        "yaml" => space.to_yaml()?,
        other => bail!("unknown description format '{other}'"),
    };
    print!("{text}");
    Ok(())
}
