//! Advisor command implementations (insight, ask, chat)

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Result;
use finsight_core::{Advisor, AdvisorConfig, AdvisorModel, Error, Session};

use super::{connect_advisor, open_session, resolve_model};

pub async fn cmd_insight(
    config: &AdvisorConfig,
    file: &Path,
    model: Option<&str>,
    preview_rows: Option<usize>,
) -> Result<()> {
    let advisor = connect_advisor(config)?;
    let model = resolve_model(model, config)?;
    let session = open_session(file, preview_rows.unwrap_or(config.preview_rows))?;

    println!("🧠 Asking {} for an analysis...", model);
    let insight = advisor.insight(&session, model).await?;

    println!();
    println!("{}", insight.trim());
    Ok(())
}

pub async fn cmd_ask(
    config: &AdvisorConfig,
    file: &Path,
    model: Option<&str>,
    question: &str,
) -> Result<()> {
    let advisor = connect_advisor(config)?;
    let model = resolve_model(model, config)?;
    let mut session = open_session(file, config.preview_rows)?;

    let reply = advisor.ask(&mut session, question, model).await?;
    println!("{}", reply.trim());
    Ok(())
}

pub async fn cmd_chat(config: &AdvisorConfig, file: &Path, model: Option<&str>) -> Result<()> {
    let advisor = connect_advisor(config)?;
    let model = resolve_model(model, config)?;
    let mut session = open_session(file, config.preview_rows)?;

    println!("💬 Chatting with {} about {}", model, file.display());
    println!("   /reset clears the conversation, /quit exits");
    println!();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_chat(&advisor, &mut session, model, stdin.lock(), stdout.lock()).await
}

/// Read questions line by line until EOF or `/quit`
///
/// Validation and advisor errors are reported and the loop continues; only
/// I/O errors end it.
pub async fn run_chat<R: BufRead, W: Write>(
    advisor: &Advisor,
    session: &mut Session,
    model: AdvisorModel,
    input: R,
    mut output: W,
) -> Result<()> {
    let mut lines = input.lines();

    loop {
        write!(output, "you> ")?;
        output.flush()?;

        let Some(line) = lines.next() else {
            writeln!(output)?;
            break;
        };
        let line = line?;

        match line.trim() {
            "/quit" | "/exit" => break,
            "/reset" => {
                session.on_reset_chat();
                writeln!(output, "Conversation cleared.")?;
                continue;
            }
            _ => {}
        }

        match advisor.ask(session, &line, model).await {
            Ok(reply) => writeln!(output, "advisor> {}\n", reply.trim())?,
            Err(e @ Error::Validation(_)) => writeln!(output, "⚠️  {}", e)?,
            Err(e) => writeln!(output, "❌ {}", e)?,
        }
    }

    Ok(())
}
