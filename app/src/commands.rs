//! Subcommand dispatch and the interactive prompt.

use std::path::PathBuf;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::bootstrap::load_dotenv;
use crate::cli::{Cli, Command, ExportOverrides};
use crate::config::AppConfig;
use crate::config::app_config::{default_settings_file, describe, resolve_settings};
use crate::services::{clock, export, preview, qr_sheet};
use crate::session::Session;

/// Run the parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    load_dotenv();
    let config_file = cli.config.clone().or_else(default_settings_file);
    if let Some(path) = &config_file {
        tracing::debug!(path = %path.display(), "Using settings file");
    }

    if let Command::Settings = cli.command {
        let settings = resolve_settings(config_file.as_deref(), |key| std::env::var(key).ok())?;
        println!("{}", serde_json::to_string_pretty(&describe(&settings))?);
        return Ok(());
    }

    let mut config = AppConfig::load(config_file.as_deref())?;
    match cli.command {
        Command::Generate { id, svg } => generate(Session::new(config), &id, svg).await,
        Command::Export { id, overrides } => {
            apply(&overrides, &mut config)?;
            let session = Session::new(config);
            if session.generate(&id).await.is_none() {
                anyhow::bail!("identifier {id:?} contains no digits");
            }
            let path = export::export_current(&session).await?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Interactive { overrides } => {
            apply(&overrides, &mut config)?;
            let session = Session::new(config);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            run_interactive(&session, stdin, &mut stdout).await?;
            Ok(())
        }
        Command::Qr { out } => {
            let session = Session::new(config);
            match out {
                Some(path) => {
                    let path = qr_sheet::write_qr_png(&session, &path).await?;
                    println!("{}", path.display());
                }
                None => print!("{}", qr_sheet::qr_text(&session).await?),
            }
            Ok(())
        }
        Command::Clock { ticks } => {
            let tz = label_engine::clock::parse_timezone(&config.timezone);
            let mut stdout = tokio::io::stdout();
            let interrupted = tokio::select! {
                res = clock::run_clock(tz, ticks, &mut stdout) => {
                    res?;
                    false
                }
                _ = tokio::signal::ctrl_c() => true,
            };
            if interrupted {
                stdout.write_all(b"\n").await?;
            }
            Ok(())
        }
        Command::Settings => Ok(()),
    }
}

fn apply(overrides: &ExportOverrides, config: &mut AppConfig) -> anyhow::Result<()> {
    overrides.apply(config).map_err(anyhow::Error::msg)
}

async fn generate(session: Session, id: &str, svg: Option<PathBuf>) -> anyhow::Result<()> {
    let Some(encoded) = session.generate(id).await else {
        anyhow::bail!("identifier {id:?} contains no digits");
    };
    println!("{}", encoded.upc);
    print!("{}", preview::preview_text(&encoded.upc));
    if let Some(path) = svg {
        preview::write_svg(&encoded.upc, &path)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

const HELP: &str = "Type an employee ID and press Enter to generate.\n\
:export  write the label for the last ID\n\
:qr      show the badge-sheet QR code\n\
:qr PATH save the badge-sheet QR code as PNG\n\
:clock   show the current time\n\
:quit    exit\n";

/// Prompt loop. Export failures are reported and the loop continues.
pub async fn run_interactive<R, W>(session: &Session, reader: R, writer: &mut W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    writer.write_all(HELP.as_bytes()).await?;

    loop {
        writer.write_all(b"> ").await?;
        writer.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let reply = match line.trim() {
            ":quit" | ":q" => break,
            ":help" => HELP.to_string(),
            ":export" => match export::export_current(session).await {
                Ok(path) => format!("saved {}\n", path.display()),
                Err(e) => format!("export failed: {e}\n"),
            },
            ":qr" => match qr_sheet::qr_text(session).await {
                Ok(text) => text,
                Err(e) => format!("qr failed: {e}\n"),
            },
            cmd if cmd.starts_with(":qr ") => {
                let path = PathBuf::from(cmd[":qr ".len()..].trim());
                match qr_sheet::write_qr_png(session, &path).await {
                    Ok(path) => format!("saved {}\n", path.display()),
                    Err(e) => format!("qr failed: {e}\n"),
                }
            }
            ":clock" => format!("{}\n", clock::clock_line(&session.config().timezone)),
            cmd if cmd.starts_with(':') => format!("unknown command {cmd} (try :help)\n"),
            input => match session.generate(input).await {
                Some(encoded) => format!(
                    "id {}\nupc {}\n{}",
                    encoded.raw_id,
                    encoded.upc,
                    preview::preview_text(&encoded.upc)
                ),
                None => "cleared (export disabled)\n".to_string(),
            },
        };
        writer.write_all(reply.as_bytes()).await?;
    }
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use label_engine::UpcARenderer;

    use super::*;
    use crate::session::testing::{small_config, test_session};

    async fn drive(session: &Session, input: &str) -> String {
        let mut out = Vec::new();
        run_interactive(session, input.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn echoes_sanitised_input_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let session = test_session(small_config(dir.path()), Arc::new(UpcARenderer));

        let out = drive(&session, "ab-12 3\n:export\n:quit\n").await;

        assert!(out.contains("id 123\n"));
        assert!(out.contains("upc 000000001236\n"));
        assert!(out.contains("saved "));
        assert!(dir.path().join("EMPLOYEE_ID_123.png").exists());
    }

    #[tokio::test]
    async fn empty_line_clears_and_export_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let session = test_session(small_config(dir.path()), Arc::new(UpcARenderer));

        let out = drive(&session, "42\n\n:export\n:clock\n").await;

        assert!(out.contains("cleared (export disabled)"));
        assert!(out.contains("export failed: Nothing to export"));
        // loop kept going after the failure and ended at EOF
        assert!(out.contains(" AM\n") || out.contains(" PM\n"));
        assert_eq!(session.current().await, None);
    }

    #[tokio::test]
    async fn qr_commands_share_one_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = small_config(dir.path());
        config.qr_logo = None;
        let session = test_session(config, Arc::new(UpcARenderer));
        let png = dir.path().join("sheet.png");

        let out = drive(&session, &format!(":qr\n:qr\n:qr {}\n", png.display())).await;

        assert_eq!(session.qr_builds(), 1);
        let sheet = session.qr_sheet().await.unwrap();
        assert_eq!(out.matches(sheet.terminal.as_str()).count(), 2);
        assert_eq!(session.qr_builds(), 1);
        assert!(out.contains(&format!("saved {}", png.display())));
        assert!(image::open(&png).is_ok());
    }

    #[tokio::test]
    async fn unknown_commands_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let session = test_session(small_config(dir.path()), Arc::new(UpcARenderer));
        let out = drive(&session, ":frobnicate\n").await;
        assert!(out.contains("unknown command :frobnicate"));
    }
}
