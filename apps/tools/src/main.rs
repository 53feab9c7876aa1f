use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lwv_client_core::{
    FixedPaths, HttpBridge, OperationOutcome, SessionStore, StatsOutcome, WorkflowController,
};
use lwv_scene::{
    project,
    projector::view_window,
    svg::{render_svg, SvgStyle},
};
use lwv_shared::{
    domain::PrimitiveId,
    geometry::{decode_nets, primitive_count, Net},
    protocol::{NetsPayload, SettingsPatch, WireNet},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lwv-tools", about = "Scripting helpers for the trace width variation engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a saved `get_nets` response and summarise it.
    Inspect { nets: PathBuf },
    /// Render a saved `get_nets` response as SVG.
    Svg {
        nets: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
        /// Primitive to highlight.
        #[arg(long)]
        select: Option<String>,
    },
    /// Open a design on a running engine, generate variation and report.
    Run {
        #[arg(long)]
        engine_url: String,
        #[arg(long)]
        edb: PathBuf,
        /// Setting override as `field=value`; may repeat.
        #[arg(long = "set")]
        set: Vec<String>,
        /// Primitive whose stats to print after generation.
        #[arg(long)]
        stats: Option<String>,
        /// Save the design here once generation finishes.
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

/// Accepts either the `{"nets": [...]}` payload or a bare net array.
fn read_nets(path: &Path) -> Result<Vec<Net>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let wire = match serde_json::from_str::<NetsPayload>(&raw) {
        Ok(payload) => payload.nets,
        Err(_) => serde_json::from_str::<Vec<WireNet>>(&raw)
            .with_context(|| format!("{} is not a nets payload", path.display()))?,
    };
    Ok(decode_nets(wire)?)
}

fn parse_settings(assignments: &[String]) -> Result<SettingsPatch> {
    assignments.iter().try_fold(SettingsPatch::default(), |patch, raw| {
        let next = SettingsPatch::parse_assignment(raw)
            .with_context(|| format!("invalid --set {raw}"))?;
        Ok(patch.and(&next))
    })
}

fn parse_id(raw: &str) -> Result<PrimitiveId> {
    PrimitiveId::parse_input(raw).context("primitive id must not be empty")
}

async fn run_engine(
    engine_url: &str,
    edb: PathBuf,
    set: &[String],
    stats: Option<&str>,
    save: Option<PathBuf>,
) -> Result<()> {
    let patch = parse_settings(set)?;
    let prompt = FixedPaths {
        open: Some(edb),
        save,
    };
    let saving = prompt.save.is_some();
    let bridge = HttpBridge::new(engine_url, prompt)?;
    let controller = WorkflowController::new(Arc::new(bridge), SessionStore::default());

    match controller.open().await? {
        OperationOutcome::Opened { path, nets } => {
            println!("opened {} ({nets} nets)", path.display());
        }
        other => anyhow::bail!("open did not load a design: {other:?}"),
    }

    let settings = controller.store().update_settings(&patch);
    tracing::info!(?settings, "generating");
    if let Some(raw) = stats {
        controller.select_primitive(Some(parse_id(raw)?));
    }

    if let OperationOutcome::Generated { nets, stats } = controller.generate().await? {
        println!("generated variation ({nets} nets)");
        match stats {
            StatsOutcome::Failed(message) => eprintln!("stats refresh failed: {message}"),
            StatsOutcome::Applied { present: false } => println!("no variation data for selection"),
            _ => {}
        }
    }

    if let Some(stats) = controller.store().snapshot().stats {
        let (lo, hi) = stats.width_range();
        println!(
            "primitive {}: mean width {} range {lo}..{hi} arc length {} samples {}",
            stats.primitive_id(),
            stats.mu_w(),
            stats.arc_length(),
            stats.len()
        );
    }

    if saving {
        if let OperationOutcome::Saved { path } = controller.save().await? {
            println!("saved {}", path.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Inspect { nets } => {
            let nets = read_nets(&nets)?;
            let window = view_window(&nets);
            println!("nets={} primitives={}", nets.len(), primitive_count(&nets));
            println!("view_box={}", window.to_view_box());
            for net in &nets {
                println!("  {} ({} primitives)", net.name, net.primitives.len());
            }
        }
        Command::Svg { nets, out, select } => {
            let nets = read_nets(&nets)?;
            let selected = select.as_deref().map(parse_id).transpose()?;
            let svg = render_svg(&project(&nets, selected.as_ref()), &SvgStyle::default());
            match out {
                Some(path) => {
                    fs::write(&path, svg).with_context(|| format!("writing {}", path.display()))?;
                    println!("wrote {}", path.display());
                }
                None => print!("{svg}"),
            }
        }
        Command::Run {
            engine_url,
            edb,
            set,
            stats,
            save,
        } => run_engine(&engine_url, edb, &set, stats.as_deref(), save).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lwv-tools-{}-{name}", std::process::id()));
        fs::write(&path, contents).expect("write nets file");
        path
    }

    const NETS: &str = r#"[{"name":"GND","primitives":[
        {"id":7,"type":"Path","layer":"TOP","width":0.2,"points":[[0.0,0.0],[1.0,2.0]]},
        {"id":"via-1","type":"Path","layer":"BOTTOM","width":0.2,"points":[]}
    ]}]"#;

    #[test]
    fn reads_the_get_nets_payload_shape() {
        let path = write_temp("payload.json", &format!(r#"{{"nets":{NETS}}}"#));
        let nets = read_nets(&path);
        let _ = fs::remove_file(&path);

        let nets = nets.expect("payload");
        assert_eq!(nets.len(), 1);
        assert_eq!(nets[0].name, "GND");
        assert_eq!(primitive_count(&nets), 2);
        assert_eq!(nets[0].primitives[1].id, PrimitiveId::Text("via-1".to_string()));
    }

    #[test]
    fn reads_a_bare_net_array() {
        let path = write_temp("array.json", NETS);
        let nets = read_nets(&path);
        let _ = fs::remove_file(&path);

        assert_eq!(primitive_count(&nets.expect("array")), 2);
    }

    #[test]
    fn rejects_files_that_are_not_nets() {
        let path = write_temp("garbage.json", r#"{"nets": 3}"#);
        let err = read_nets(&path);
        let _ = fs::remove_file(&path);

        let err = err.expect_err("not nets");
        assert!(format!("{err:#}").contains("is not a nets payload"));
        assert!(read_nets(Path::new("/nonexistent/lwv-nets.json")).is_err());
    }

    #[test]
    fn malformed_points_fail_to_decode() {
        let path = write_temp(
            "malformed.json",
            r#"[{"name":"N","primitives":[
                {"id":1,"type":"Path","layer":"TOP","width":0.1,"points":[[0.0]]}
            ]}]"#,
        );
        let err = read_nets(&path);
        let _ = fs::remove_file(&path);

        assert!(err.is_err());
    }

    #[test]
    fn repeated_set_flags_merge_with_later_values_winning() {
        let patch = parse_settings(&[
            "sigma_w=12".to_string(),
            "L_c = 250".to_string(),
            "sigma_w=20".to_string(),
        ])
        .expect("settings");

        assert_eq!(patch.sigma_w, Some(20.0));
        assert_eq!(patch.l_c, Some(250.0));
        assert_eq!(patch.w_min, None);
        assert!(parse_settings(&[]).expect("empty").is_empty());
    }

    #[test]
    fn bad_set_flags_are_rejected_with_context() {
        let err = parse_settings(&["sigma_w=10".to_string(), "bogus=1".to_string()])
            .expect_err("unknown field");
        assert!(format!("{err:#}").contains("invalid --set bogus=1"));
        assert!(parse_settings(&["w_max".to_string()]).is_err());
        assert!(parse_settings(&["n_resample=-3".to_string()]).is_err());
    }
}
