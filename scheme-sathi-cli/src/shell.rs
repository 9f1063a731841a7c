//! Interactive session console

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input};
use scheme_sathi_core::{Message, SessionHandle, SessionRecord, SessionSummary, UserDetails};

/// One line of console input
#[derive(Debug, PartialEq, Eq)]
pub enum ShellCommand {
    UserMessage(String),
    BotMessage(String),
    Voice(String),
    Profile,
    Proxy,
    Save,
    New,
    Clear,
    Load(String),
    Delete(String),
    History,
    Show,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

/// Parse a console line. Anything not starting with `/` is a user message.
pub fn parse_line(line: &str) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ShellCommand::UserMessage(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let needs_arg = |make: fn(String) -> ShellCommand, usage: &str| {
        if arg.is_empty() {
            ShellCommand::Invalid(format!("usage: {}", usage))
        } else {
            make(arg.to_string())
        }
    };

    match name.to_ascii_lowercase().as_str() {
        "bot" => needs_arg(ShellCommand::BotMessage, "/bot <text>"),
        "voice" => needs_arg(ShellCommand::Voice, "/voice <text>"),
        "load" => needs_arg(ShellCommand::Load, "/load <session-id>"),
        "delete" => needs_arg(ShellCommand::Delete, "/delete <session-id>"),
        "profile" => ShellCommand::Profile,
        "proxy" => ShellCommand::Proxy,
        "save" => ShellCommand::Save,
        "new" => ShellCommand::New,
        "clear" => ShellCommand::Clear,
        "history" => ShellCommand::History,
        "show" => ShellCommand::Show,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => ShellCommand::Invalid(format!("unknown command /{}", other)),
    }
}

/// Run the console until `/quit` or end of input
pub async fn run_shell(handle: SessionHandle) -> Result<()> {
    println!("{}", style("Scheme Sathi session console").bold().cyan());
    println!("Type a message to record it, or /help for commands.\n");
    print_session(&handle.current_session().await?.0);

    loop {
        let line: String = match Input::new()
            .with_prompt(">")
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => line,
            Err(_) => break,
        };

        match parse_line(&line) {
            ShellCommand::Empty => {}
            ShellCommand::UserMessage(text) => {
                handle.append_chat_message(Message::user(text)).await?;
            }
            ShellCommand::BotMessage(text) => {
                handle.append_chat_message(Message::bot(text)).await?;
            }
            ShellCommand::Voice(text) => {
                handle.append_voice_interaction(text).await?;
            }
            ShellCommand::Profile => {
                let details = prompt_details()?;
                handle.update_profile_fields(details).await?;
                println!("{}", style("Profile updated.").green());
            }
            ShellCommand::Proxy => {
                let details = prompt_details()?;
                handle.update_proxy_details(details).await?;
                println!("{}", style("Details saved for someone else.").green());
            }
            ShellCommand::Save => {
                let record = handle.save_current_session().await?;
                println!(
                    "{} {}",
                    style("Saved session").green(),
                    style(&record.id).bold()
                );
            }
            ShellCommand::New => {
                if let Some(id) = handle.create_new_session().await? {
                    println!("Previous session auto-saved as {}", style(id).bold());
                }
                println!("{}", style("Started a new session.").green());
                print_session(&handle.current_session().await?.0);
            }
            ShellCommand::Clear => {
                handle.clear_current_session().await?;
                println!("{}", style("Current session discarded.").yellow());
            }
            ShellCommand::Load(id) => {
                if handle.load_session(id.as_str()).await? {
                    print_session(&handle.current_session().await?.0);
                } else {
                    println!("{} {}", style("No saved session").red(), id);
                }
            }
            ShellCommand::Delete(id) => {
                if handle.delete_session(id.as_str()).await? {
                    println!("{} {}", style("Deleted").green(), id);
                } else {
                    println!("{} {}", style("No saved session").red(), id);
                }
            }
            ShellCommand::History => print_summaries(&handle.list_sessions().await?),
            ShellCommand::Show => {
                let (current, modified) = handle.current_session().await?;
                print_session(&current);
                if modified {
                    println!("{}", style("(unsaved changes)").yellow());
                }
            }
            ShellCommand::Help => print_help(),
            ShellCommand::Invalid(msg) => println!("{}", style(msg).red()),
            ShellCommand::Quit => break,
        }
    }

    if handle.has_unsaved_content().await? {
        let save = Confirm::new()
            .with_prompt("Save the current session before leaving?")
            .default(true)
            .interact()
            .unwrap_or(false);
        if save {
            let record = handle.save_current_session().await?;
            println!("Saved session {}", style(record.id).bold());
        }
    }
    Ok(())
}

fn prompt_details() -> Result<UserDetails> {
    let ask = |prompt: &str| -> Result<String> {
        let value: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(value.trim().to_string())
    };

    Ok(UserDetails {
        full_name: ask("Full name")?,
        age: ask("Age")?,
        national_id_number: ask("National ID number")?,
        annual_income: ask("Annual income")?,
        occupation: ask("Occupation")?,
        state: ask("State")?,
        district: ask("District")?,
    })
}

fn print_help() {
    println!("{}", style("Commands").bold());
    for (cmd, what) in [
        ("<text>", "record a user chat message"),
        ("/bot <text>", "record an assistant reply"),
        ("/voice <text>", "record a voice interaction"),
        ("/profile", "enter your own profile details"),
        ("/proxy", "enter details for someone else"),
        ("/save", "save and keep editing"),
        ("/new", "start a new session (auto-saves unsaved content)"),
        ("/clear", "discard the current session"),
        ("/load <id>", "resume a saved session"),
        ("/delete <id>", "delete a saved session"),
        ("/history", "list saved sessions"),
        ("/show", "print the current session"),
        ("/quit", "leave the console"),
    ] {
        println!("  {:<16} {}", style(cmd).cyan(), what);
    }
}

/// Print a session transcript
pub fn print_session(record: &SessionRecord) {
    println!(
        "{} {} ({}, {} interactions)",
        style("Session").bold(),
        style(&record.id).bold(),
        record.session_type,
        record.interaction_count()
    );
    if let Some(details) = &record.user_details {
        let fields = [
            ("Name", &details.full_name),
            ("Age", &details.age),
            ("National ID", &details.national_id_number),
            ("Income", &details.annual_income),
            ("Occupation", &details.occupation),
            ("State", &details.state),
            ("District", &details.district),
        ];
        for (label, value) in fields {
            if !value.is_empty() {
                println!("  {}: {}", label, value);
            }
        }
    }
    for message in &record.chat_history {
        let who = match message.sender {
            scheme_sathi_core::Sender::User => style("you").green(),
            scheme_sathi_core::Sender::Bot => style("sathi").cyan(),
        };
        println!(
            "  [{}] {}: {}",
            message.timestamp.format("%H:%M"),
            who,
            message.text
        );
    }
    for voice in &record.voice_interactions {
        println!("  {} {}", style("voice:").magenta(), voice);
    }
}

/// Print the history listing
pub fn print_summaries(summaries: &[SessionSummary]) {
    if summaries.is_empty() {
        println!("No saved sessions.");
        return;
    }

    println!("{}", style("Saved Sessions").bold().cyan());
    for summary in summaries {
        println!(
            "  {}  {}  {:<8}  {:>3} interactions  {}",
            style(&summary.id).bold(),
            summary.timestamp.format("%Y-%m-%d %H:%M"),
            summary.session_type,
            summary.total_interactions,
            summary
                .full_name
                .as_deref()
                .or(summary.preview.as_deref())
                .unwrap_or("-")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_user_message() {
        assert_eq!(
            parse_line("  Am I eligible for PM Kisan?  "),
            ShellCommand::UserMessage("Am I eligible for PM Kisan?".to_string())
        );
        assert_eq!(parse_line("   "), ShellCommand::Empty);
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            parse_line("/voice ration card status"),
            ShellCommand::Voice("ration card status".to_string())
        );
        assert_eq!(
            parse_line("/LOAD abc-123"),
            ShellCommand::Load("abc-123".to_string())
        );
        assert!(matches!(parse_line("/delete"), ShellCommand::Invalid(_)));
    }

    #[test]
    fn test_bare_commands() {
        assert_eq!(parse_line("/save"), ShellCommand::Save);
        assert_eq!(parse_line("/new"), ShellCommand::New);
        assert_eq!(parse_line("/exit"), ShellCommand::Quit);
        assert!(matches!(parse_line("/dance"), ShellCommand::Invalid(_)));
    }
}
