use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use cuegen::protocol::{BootParams, ChannelGraphics, HostProfile, OverlaySequence, Payload};
use cuegen::runtime::manifest::ManifestRuntime;
use cuegen::runtime::LiveInstance;
use cuegen::synth::RenderBackend;
use cuegen::{PresetOptions, PresetShape, PropertyType, Schema, SchemaExtractor, SynthOptions};
use sha2::Digest as _;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cuegen", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List artboards and state machines of an animation manifest.
    Inspect(InspectArgs),
    /// Extract the view-model schema as JSON.
    Schema(SchemaArgs),
    /// Generate a playout HTML document from a schema.
    Synth(SynthArgs),
    /// Export an XML preset listing the schema defaults.
    Preset(PresetArgs),
    /// Print the flat key/value mapping an update payload normalizes to.
    Normalize(NormalizeArgs),
    /// Drive a generated document's protocol against an animation manifest.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Animation manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SchemaArgs {
    /// Animation manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Artboard to extract; falls back to the first one.
    #[arg(long)]
    artboard: Option<String>,

    /// State machine to select; falls back to the first one.
    #[arg(long)]
    state_machine: Option<String>,

    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SynthArgs {
    /// Schema JSON.
    #[arg(long)]
    schema: PathBuf,

    /// Output HTML path.
    #[arg(long)]
    out: PathBuf,

    /// Synthesizer options JSON; flags below override it.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Target host.
    #[arg(long, value_enum)]
    profile: Option<ProfileChoice>,

    /// Runtime build.
    #[arg(long, value_enum)]
    backend: Option<BackendChoice>,

    /// Inline this file into the document as base64.
    #[arg(long)]
    embed: Option<PathBuf>,

    /// Source path referenced when not embedding.
    #[arg(long)]
    external_path: Option<String>,

    /// Trigger fired on play.
    #[arg(long)]
    enter: Option<String>,

    /// Trigger fired on stop.
    #[arg(long)]
    exit: Option<String>,

    /// Trigger fired on next.
    #[arg(long)]
    advance: Option<String>,

    /// First-play guard window in milliseconds.
    #[arg(long)]
    grace_ms: Option<u64>,

    /// Document title.
    #[arg(long)]
    title: Option<String>,
}

#[derive(Parser, Debug)]
struct PresetArgs {
    /// Schema JSON.
    #[arg(long)]
    schema: PathBuf,

    /// Output XML path.
    #[arg(long)]
    out: PathBuf,

    /// Preset options JSON; flags below override it.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Document shape.
    #[arg(long, value_enum)]
    shape: Option<ShapeChoice>,

    /// Layer index.
    #[arg(long)]
    layer: Option<u32>,

    /// Output channel.
    #[arg(long)]
    channel: Option<u32>,

    /// Mark the item as sending JSON data.
    #[arg(long)]
    send_as_json: bool,
}

#[derive(Parser, Debug)]
struct NormalizeArgs {
    /// Payload text; read from `--file` when omitted.
    payload: Option<String>,

    /// File holding the payload.
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Generated HTML document.
    #[arg(long)]
    document: PathBuf,

    /// Animation manifest the document's source stands for.
    #[arg(long)]
    manifest: PathBuf,

    /// Synthesizer options the document was generated with.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Update payload; repeat for several, applied in order before `play`.
    #[arg(long = "payload")]
    payloads: Vec<String>,

    /// Boot URL query; `vm.<Name>` values apply on both profiles, timer keys on streaming-overlay.
    #[arg(long)]
    query: Option<String>,

    /// Milliseconds of virtual time to run after the commands.
    #[arg(long, default_value_t = 0)]
    run_ms: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileChoice {
    ChannelGraphics,
    StreamingOverlay,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Raster,
    Accelerated,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ShapeChoice {
    TemplateData,
    Items,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Schema(args) => cmd_schema(args),
        Command::Synth(args) => cmd_synth(args),
        Command::Preset(args) => cmd_preset(args),
        Command::Normalize(args) => cmd_normalize(args),
        Command::Replay(args) => cmd_replay(args),
    }
}

fn read_bytes(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read '{}'", path.display()))
}

fn read_schema(path: &Path) -> anyhow::Result<Schema> {
    Schema::from_path(path).with_context(|| format!("load schema '{}'", path.display()))
}

fn write_output(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let source = read_bytes(&args.in_path)?;
    let layout = SchemaExtractor::new(ManifestRuntime)
        .inspect(&source)
        .with_context(|| format!("inspect '{}'", args.in_path.display()))?;
    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}

fn cmd_schema(args: SchemaArgs) -> anyhow::Result<()> {
    let source = read_bytes(&args.in_path)?;
    let schema = SchemaExtractor::new(ManifestRuntime)
        .build_schema(
            &source,
            args.artboard.as_deref(),
            args.state_machine.as_deref(),
        )
        .with_context(|| format!("extract schema from '{}'", args.in_path.display()))?;
    let json = schema.to_json_pretty()?;
    match args.out {
        Some(out) => write_output(&out, json.as_bytes()),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn load_synth_options(path: Option<&Path>) -> anyhow::Result<SynthOptions> {
    match path {
        Some(p) => SynthOptions::from_path(p)
            .with_context(|| format!("load synthesizer options '{}'", p.display())),
        None => Ok(SynthOptions::default()),
    }
}

fn cmd_synth(args: SynthArgs) -> anyhow::Result<()> {
    let schema = read_schema(&args.schema)?;
    let mut options = load_synth_options(args.options.as_deref())?;

    if let Some(profile) = args.profile {
        options.host_profile = match profile {
            ProfileChoice::ChannelGraphics => HostProfile::ChannelGraphics,
            ProfileChoice::StreamingOverlay => HostProfile::StreamingOverlay,
        };
    }
    if let Some(backend) = args.backend {
        options.render_backend = match backend {
            BackendChoice::Raster => RenderBackend::Raster,
            BackendChoice::Accelerated => RenderBackend::Accelerated,
        };
    }
    if let Some(path) = args.embed.as_deref() {
        options.embed_bytes(&read_bytes(path)?);
    }
    if let Some(p) = args.external_path {
        options.external_path = Some(p);
    }
    if let Some(t) = args.enter {
        options.trigger_bindings.enter = Some(t);
    }
    if let Some(t) = args.exit {
        options.trigger_bindings.exit = Some(t);
    }
    if let Some(t) = args.advance {
        options.trigger_bindings.advance = Some(t);
    }
    if let Some(ms) = args.grace_ms {
        options.first_play_grace_ms = ms;
    }
    if let Some(title) = args.title {
        options.title = Some(title);
    }

    let doc = cuegen::synthesize(&schema, &options)?;
    write_output(&args.out, doc.as_str().as_bytes())?;
    eprintln!("sha256 {}", sha256_hex(doc.as_str().as_bytes()));
    Ok(())
}

fn cmd_preset(args: PresetArgs) -> anyhow::Result<()> {
    let schema = read_schema(&args.schema)?;
    let mut options = match args.options.as_deref() {
        Some(p) => PresetOptions::from_path(p)
            .with_context(|| format!("load preset options '{}'", p.display()))?,
        None => PresetOptions::default(),
    };
    if let Some(shape) = args.shape {
        options.shape = match shape {
            ShapeChoice::TemplateData => PresetShape::TemplateData,
            ShapeChoice::Items => PresetShape::Items,
        };
    }
    if let Some(layer) = args.layer {
        options.video_layer = layer;
    }
    if let Some(channel) = args.channel {
        options.channel = channel;
    }
    if args.send_as_json {
        options.send_as_json = true;
    }

    let xml = cuegen::export_preset(&schema, &options);
    write_output(&args.out, xml.as_bytes())
}

fn cmd_normalize(args: NormalizeArgs) -> anyhow::Result<()> {
    let text = match (args.payload, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("read payload '{}'", path.display()))?,
        (None, None) => anyhow::bail!("pass a payload or --file"),
    };
    let flat = cuegen::protocol::normalize(&Payload::from(text))?;
    let map: serde_json::Map<String, serde_json::Value> = flat
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(())
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.document)
        .with_context(|| format!("read document '{}'", args.document.display()))?;
    let schema = cuegen::read_baked_schema(&text)
        .with_context(|| format!("read schema from '{}'", args.document.display()))?;
    let options = load_synth_options(args.options.as_deref())?;
    let source = read_bytes(&args.manifest)?;
    let model = ManifestRuntime
        .model_for(&source, schema.artboard())
        .with_context(|| format!("load manifest '{}'", args.manifest.display()))?;
    let load = async {
        Ok::<Box<dyn LiveInstance>, cuegen::CuegenError>(Box::new(model.instance()))
    };

    let config = options.controller_config(&schema);
    let params = BootParams::from_query(args.query.as_deref().unwrap_or_default());
    let state = match options.host_profile {
        HostProfile::ChannelGraphics => {
            let mut surface = ChannelGraphics::boot(&schema, config, &params);
            for payload in &args.payloads {
                surface.update(payload.as_str());
            }
            pollster::block_on(surface.bind_when_loaded(load));
            surface.play();
            surface.advance_by(args.run_ms);
            surface.controller().state()
        }
        HostProfile::StreamingOverlay => {
            if !args.payloads.is_empty() {
                tracing::warn!("streaming-overlay documents take no update payloads; ignored");
            }
            let mut sequence = OverlaySequence::boot(&schema, config, &params);
            pollster::block_on(sequence.bind_when_loaded(load));
            sequence.advance_by(args.run_ms);
            sequence.controller().state()
        }
    };

    let mut values = BTreeMap::new();
    let mut fires = BTreeMap::new();
    for p in schema.properties() {
        if p.ty == PropertyType::Trigger {
            fires.insert(p.name.clone(), model.fire_count(&p.name));
        } else if let Some(v) = model.value(&p.name) {
            values.insert(p.name.clone(), v);
        }
    }
    let report = serde_json::json!({
        "state": format!("{state:?}").to_lowercase(),
        "playing": model.is_playing(),
        "values": values,
        "fires": fires,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = sha2::Sha256::new();
    h.update(bytes);
    let digest = h.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
