use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use aarambh_core::model::{
    AnswerOption, AttemptRecording, CourseDraft, LessonDraft, QuizDraft, ResourceKind, Role,
    UserId, UserSession,
};
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{
    AdminError, AdminService, AppServices, AuthBackend, Clock, GoTrueAuth, GoTrueConfig, ResourceDraft,
    ServiceOptions,
};
use storage::local::{JsonFileStore, KeyValueStore};
use storage::repository::{RoleRepository, Storage};
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

const LOCAL_USER_KEY: &str = "profile.local_user_id";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUserId { raw: String },
    InvalidDbUrl { raw: String },
    InvalidRecording { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user-id value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidRecording { raw } => {
                write!(f, "invalid --attempts value: {raw} (per-question|per-session)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui   [--db <sqlite_url>] [--local-store <path>] [--user-id <uuid>]");
    eprintln!("                           [--attempts per-question|per-session]");
    eprintln!("  cargo run -p app -- seed [--db <sqlite_url>] [--local-store <path>] [--user-id <uuid>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://aarambh.sqlite3");
    eprintln!("  --local-store aarambh-local.json");
    eprintln!("  --attempts per-question");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  AARAMBH_DB_URL, AARAMBH_LOCAL_STORE, AARAMBH_USER_ID, AARAMBH_ATTEMPT_RECORDING,");
    eprintln!("  AARAMBH_SHUFFLE_QUIZZES, AARAMBH_AUTH_URL, AARAMBH_AUTH_ANON_KEY,");
    eprintln!("  AARAMBH_EMAIL, AARAMBH_PASSWORD, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    local_store: PathBuf,
    user_id: Option<UserId>,
    options: ServiceOptions,
}

fn parse_user_id(raw: String) -> Result<UserId, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidUserId { raw })
}

fn parse_recording(raw: String) -> Result<AttemptRecording, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidRecording { raw })
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("AARAMBH_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("aarambh.sqlite3".into()), normalize_sqlite_url);
        let mut local_store = std::env::var("AARAMBH_LOCAL_STORE")
            .map_or_else(|_| PathBuf::from("aarambh-local.json"), PathBuf::from);
        let mut user_id = std::env::var("AARAMBH_USER_ID")
            .ok()
            .map(parse_user_id)
            .transpose()?;
        let mut attempt_recording = std::env::var("AARAMBH_ATTEMPT_RECORDING")
            .ok()
            .map(parse_recording)
            .transpose()?
            .unwrap_or_default();
        let shuffle_quizzes = env_flag("AARAMBH_SHUFFLE_QUIZZES");

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--local-store" => {
                    local_store = PathBuf::from(require_value(args, "--local-store")?);
                }
                "--user-id" => {
                    user_id = Some(parse_user_id(require_value(args, "--user-id")?)?);
                }
                "--attempts" => {
                    attempt_recording = parse_recording(require_value(args, "--attempts")?)?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            local_store,
            user_id,
            options: ServiceOptions {
                attempt_recording,
                shuffle_quizzes,
            },
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// The offline profile id: the explicit one, else the one remembered in the
/// local store, else a fresh id that is remembered from now on.
fn local_user_id(
    local: &dyn KeyValueStore,
    explicit: Option<UserId>,
) -> Result<UserId, Box<dyn std::error::Error>> {
    if let Some(id) = explicit {
        local.set(LOCAL_USER_KEY, &id.to_string())?;
        return Ok(id);
    }
    if let Some(id) = local
        .get(LOCAL_USER_KEY)?
        .and_then(|raw| raw.parse::<UserId>().ok())
    {
        return Ok(id);
    }
    let id = UserId::random();
    local.set(LOCAL_USER_KEY, &id.to_string())?;
    Ok(id)
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand launches the UI.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();
    prepare_sqlite_file(&parsed.db_url)?;
    let local: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(parsed.local_store.clone())?);
    let user_id = local_user_id(local.as_ref(), parsed.user_id)?;

    match cmd {
        Command::Ui => {
            let auth = GoTrueConfig::from_env()
                .map(|config| Arc::new(GoTrueAuth::new(config)) as Arc<dyn AuthBackend>);
            let services = AppServices::new_sqlite(
                &parsed.db_url,
                Arc::clone(&local),
                Clock::system(),
                auth,
                parsed.options,
            )
            .await?;
            start_session(&services, user_id).await;

            let app: Arc<dyn UiApp> = Arc::new(services);
            let context = build_app_context(&app);

            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title(app.app_name())
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Seed => {
            let storage = Storage::sqlite(&parsed.db_url).await?;
            storage.roles.set_role(user_id, Role::Admin).await?;
            let services =
                AppServices::new(Clock::system(), &storage, local, None, parsed.options);
            let admin = services.sessions().local(user_id).await?;
            seed_demo(&services.admin(), &admin).await?;
            eprintln!("seeded demo data (db={}, admin={user_id})", parsed.db_url);
            Ok(())
        }
    }
}

/// Password sign-in when credentials are configured, else an offline session.
async fn start_session(services: &AppServices, user_id: UserId) {
    let sessions = services.sessions();
    if !sessions.has_backend() {
        if let Err(err) = sessions.local(user_id).await {
            tracing::warn!(%err, "could not start local session");
        }
        return;
    }
    if let (Ok(email), Ok(password)) = (
        std::env::var("AARAMBH_EMAIL"),
        std::env::var("AARAMBH_PASSWORD"),
    ) && let Err(err) = sessions.sign_in(&email, &password).await
    {
        tracing::warn!(%err, "sign-in failed; sign in from the account page");
    }
}

async fn seed_demo(
    admin: &AdminService,
    session: &UserSession,
) -> Result<(), Box<dyn std::error::Error>> {
    for (name, description) in [
        ("Mathematics", "Numbers, algebra and geometry"),
        ("Science", "Physics, chemistry and biology"),
    ] {
        match admin
            .create_subject(session, name, Some(description.to_string()))
            .await
        {
            Ok(_) | Err(AdminError::DuplicateSubject) => {}
            Err(other) => return Err(other.into()),
        }
    }

    let course = admin
        .create_course(
            session,
            CourseDraft {
                title: "Foundations of Algebra".into(),
                description: Some("Variables, expressions and simple equations.".into()),
                subject: Some("Mathematics".into()),
            },
        )
        .await?;
    for (order, (title, content)) in [
        (
            "What is a variable?",
            "A **variable** stands for a number we do not know yet.",
        ),
        (
            "Solving x + a = b",
            "Subtract `a` from both sides:\n\n- x + 3 = 5\n- x = 2",
        ),
    ]
    .into_iter()
    .enumerate()
    {
        admin
            .create_lesson(
                session,
                LessonDraft {
                    course_id: Some(course.id()),
                    title: title.into(),
                    content: content.into(),
                    order_number: i64::try_from(order)? + 1,
                },
            )
            .await?;
    }

    for (subject, question, options, correct) in [
        (
            "Mathematics",
            "What is 7 × 8?",
            ["54", "56", "58", "64"],
            AnswerOption::B,
        ),
        (
            "Mathematics",
            "Solve: x + 3 = 5",
            ["1", "2", "3", "8"],
            AnswerOption::B,
        ),
        (
            "Science",
            "Which gas do plants absorb?",
            ["Oxygen", "Nitrogen", "Carbon dioxide", "Helium"],
            AnswerOption::C,
        ),
    ] {
        admin
            .create_quiz(
                session,
                QuizDraft {
                    subject: subject.into(),
                    question: question.into(),
                    options: options.map(String::from),
                    correct: Some(correct),
                },
            )
            .await?;
    }

    admin
        .create_resource(
            session,
            ResourceDraft {
                title: "Khan Academy: Algebra basics".into(),
                subject: "Mathematics".into(),
                kind: ResourceKind::Video,
                url: "https://www.khanacademy.org/math/algebra-basics".into(),
            },
        )
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::local::MemoryStore;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(ToString::to_string);
        Args::parse(&mut iter)
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&["--db", "sqlite::memory:", "--attempts", "per-session"]).unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.options.attempt_recording, AttemptRecording::PerSession);
    }

    #[test]
    fn bad_flags_are_rejected() {
        assert!(matches!(parse(&["--db"]), Err(ArgsError::MissingValue { .. })));
        assert!(matches!(
            parse(&["--user-id", "nope"]),
            Err(ArgsError::InvalidUserId { .. })
        ));
        assert!(matches!(
            parse(&["--attempts", "never"]),
            Err(ArgsError::InvalidRecording { .. })
        ));
        assert!(matches!(parse(&["--wat"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/app.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/app.sqlite3"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
    }

    #[test]
    fn local_user_id_is_remembered() {
        let store = MemoryStore::new();
        let first = local_user_id(&store, None).unwrap();
        assert_eq!(local_user_id(&store, None).unwrap(), first);

        let explicit = UserId::random();
        assert_eq!(local_user_id(&store, Some(explicit)).unwrap(), explicit);
        assert_eq!(local_user_id(&store, None).unwrap(), explicit);
    }
}
