mod cli;
mod commands;

use clap::Parser;
use cli::{CaptureArgs, Cli, Commands, GoalAction};
use recollect_core::EntryType;
use recollect_store::StateKind;

fn main() -> anyhow::Result<()> {
    // stderr keeps hook stdout machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => commands::init::run(force),
        Commands::Import {
            path,
            execute,
            interactive,
        } => commands::import::run(path.as_deref(), execute, interactive),
        Commands::Status => commands::status::run(),
        Commands::Note(args) => capture(EntryType::Note, args),
        Commands::Decision(args) => capture(EntryType::Decision, args),
        Commands::Gotcha(args) => capture(EntryType::Gotcha, args),
        Commands::Preference(args) => capture(EntryType::Preference, args),
        Commands::Discovery(args) => capture(EntryType::Discovery, args),
        Commands::Goal { action } => match action {
            GoalAction::Add { content } => commands::goals::run_add(StateKind::Goal, &content),
            GoalAction::List => commands::goals::run_list_goals(),
            GoalAction::Done { text } => commands::goals::run_done(StateKind::Goal, &text),
            GoalAction::Clear => commands::goals::run_clear(StateKind::Goal),
        },
        Commands::Next { text, done: false } => commands::goals::run_add(StateKind::NextStep, &text),
        Commands::Next { text, done: true } => commands::goals::run_done(StateKind::NextStep, &text),
        Commands::State => commands::goals::run_state(),
        Commands::Read {
            entry_type,
            tag,
            limit,
            full,
        } => commands::display::run_read(entry_type.as_deref(), tag, limit, full),
        Commands::Recent { limit } => commands::display::run_recent(limit),
        Commands::Context { days } => commands::display::run_context(days),
        Commands::Search {
            query,
            entry_type,
            limit,
        } => commands::search::run_search(&query, entry_type.as_deref(), limit),
        Commands::Why { query, limit } => commands::search::run_why(&query, limit),
        Commands::Show { id } => commands::entries::run_show(&id),
        Commands::Edit {
            id,
            content,
            reasoning,
            entry_type,
            tags,
        } => commands::entries::run_edit(&id, content, reasoning, entry_type.as_deref(), tags),
        Commands::Delete { id } => commands::entries::run_delete(&id),
        Commands::Sessions { limit } => commands::sessions::run(limit),
        Commands::Version => commands::version::run(),
        Commands::HookSessionStart => commands::hooks::hook_session_start(),
        Commands::HookSessionEnd => commands::hooks::hook_session_end(),
    }
}

fn capture(entry_type: EntryType, args: CaptureArgs) -> anyhow::Result<()> {
    commands::capture::run(entry_type, &args.content, args.reasoning, args.tags, args.files)
}
