use anyhow::Context;
use humanliker_lib::models::PipelineRequest;
use humanliker_lib::services::config_store::{ConfigStore, HumanizerConfig};
use humanliker_lib::services::pipeline::Humanizer;
use humanliker_lib::services::randomness::RngSource;
use humanliker_lib::services::step_recorder::ChannelRecorder;
use std::io::Read;
use std::path::PathBuf;

const VALUE_FLAGS: [&str; 7] = ["--text", "--language", "--persona", "--mode", "--seed", "--config", "--out"];

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

/// First argument that is neither a flag nor a flag's value.
fn positional_arg(args: &[String]) -> Option<String> {
    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        if VALUE_FLAGS.contains(&arg.as_str()) {
            i += 2;
            continue;
        }
        if !arg.starts_with("--") {
            return Some(arg.clone());
        }
        i += 1;
    }
    None
}

fn config_store(args: &[String]) -> Option<ConfigStore> {
    match parse_arg_value(args, "--config") {
        Some(path) => Some(ConfigStore::from_file(PathBuf::from(path))),
        None => ConfigStore::default_config_dir().map(ConfigStore::new),
    }
}

/// Stored config with the command-line defaults applied on top.
fn load_config(args: &[String], store: Option<&ConfigStore>) -> anyhow::Result<HumanizerConfig> {
    let config = match store {
        Some(store) => store
            .load()
            .with_context(|| format!("loading {}", store.config_file().display()))?,
        None => HumanizerConfig::default(),
    };
    let seed = match parse_arg_value(args, "--seed") {
        Some(s) => Some(s.parse::<u64>().with_context(|| format!("invalid --seed: {}", s))?),
        None => None,
    };
    Ok(config.with_overrides(
        parse_arg_value(args, "--language"),
        parse_arg_value(args, "--persona"),
        parse_arg_value(args, "--mode"),
        seed,
    ))
}

fn read_input(args: &[String]) -> anyhow::Result<String> {
    if let Some(text) = parse_arg_value(args, "--text") {
        return Ok(text);
    }
    if let Some(path) = positional_arg(args) {
        return std::fs::read_to_string(&path).with_context(|| format!("read file failed: {}", path));
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("read stdin failed")?;
    Ok(text)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        eprintln!(
            "Usage:\n  humanize [<file>] [--text <s>] [--language <code>] [--persona <key>] [--mode <key>] [--seed <n>] [--config <path>] [--steps] [--out <json_path>]\n  humanize --save-config [--language <code>] [--persona <key>] [--mode <key>] [--seed <n>] [--config <path>]\n\nNotes:\n  - Reads stdin when neither <file> nor --text is given.\n  - --save-config stores the given flags as the new defaults (previous file is backed up) and exits.\n  - HUMANLIKER_DISABLE_FILE_LOG=1 keeps logs on the console only."
        );
        return Ok(());
    }

    humanliker_lib::init_logging();

    let store = config_store(&args);
    let config = load_config(&args, store.as_ref())?;

    if has_flag(&args, "--save-config") {
        let store = store.context("no config directory available; pass --config <path>")?;
        store
            .save(&config)
            .with_context(|| format!("saving {}", store.config_file().display()))?;
        eprintln!("Saved config: {}", store.config_file().display());
        return Ok(());
    }

    let catalog = config.build_catalog();
    let text = read_input(&args)?;
    let seed = config.seed;

    let request = PipelineRequest {
        text,
        language: config.defaults.language.clone(),
        persona_key: Some(config.defaults.persona.clone()),
        mode: Some(config.defaults.mode.clone()),
    };

    let show_steps = has_flag(&args, "--steps");
    let (recorder, drain) = ChannelRecorder::spawn(move |step| {
        if show_steps {
            eprintln!(
                "[{:02}] {:<16} {:<5} {}",
                step.step_order,
                step.step_name,
                if step.success { "ok" } else { "FAIL" },
                step.detail
            );
        }
    });

    let humanizer = Humanizer::new(&catalog, &recorder);
    let result = match seed {
        Some(seed) => humanizer.run(&request, &mut RngSource::seeded(seed)),
        None => humanizer.run(&request, &mut RngSource::from_entropy()),
    };
    drop(humanizer);
    drop(recorder);
    let recorded = drain.await.context("step recorder task failed")?;

    let result = result?;

    println!("{}", result.output_text);
    eprintln!();
    eprintln!("Trace: {}", result.trace_id);
    eprintln!("Language: {}  Persona: {}  Mode: {}", result.language, result.persona, result.mode);
    eprintln!(
        "Human: {}  Risk: {}  Fidelity: {:.2}  Shift: {:.3}{}",
        result.human_score,
        result.risk_score,
        result.persona_fidelity,
        result.semantic_shift,
        if result.degraded { "  (degraded)" } else { "" }
    );
    eprintln!("Steps recorded: {}  Input: {}", recorded, preview(&request.text, 60));

    if let Some(out_path) = parse_arg_value(&args, "--out") {
        let json = serde_json::to_string_pretty(&result).context("serialize result failed")?;
        std::fs::write(&out_path, json).with_context(|| format!("write output failed: {}", out_path))?;
        eprintln!("Wrote: {}", out_path);
    }

    Ok(())
}
