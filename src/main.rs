use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;

use fxstream_client::app::AppContext;
use fxstream_client::config;
use fxstream_client::dashboard::Notice;
use fxstream_client::form::BatchDraft;
use fxstream_client::model::{Batch, Language, Mode};

#[derive(Debug, Parser)]
#[command(author, version, about = "Browse and manage course batches")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a learner account (does not sign in)
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Forget the saved session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List batches (all batches for admins, or the public catalogue)
    Batches {
        /// Use the public catalogue instead of the admin list
        #[arg(long)]
        public: bool,
        #[arg(long, default_value = "")]
        search: String,
        /// Public catalogue only
        #[arg(long)]
        language: Option<Language>,
        /// Public catalogue only
        #[arg(long)]
        mode: Option<Mode>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create a batch (admin)
    Create {
        #[command(flatten)]
        fields: BatchFields,
    },
    /// Edit a batch; omitted fields keep their current values (admin)
    Update {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        fields: BatchFields,
    },
    /// Delete a batch (admin)
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Enroll the signed-in user in a public batch
    Enroll {
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, clap::Args)]
struct BatchFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    duration: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    /// YYYY-MM-DD
    #[arg(long)]
    start_date: Option<String>,
    #[arg(long)]
    slots: Option<u32>,
    #[arg(long)]
    thumbnail: Option<String>,
    #[arg(long)]
    mode: Option<Mode>,
    #[arg(long)]
    language: Option<Language>,
}

impl BatchFields {
    fn apply_to(self, mut draft: BatchDraft) -> BatchDraft {
        if let Some(v) = self.name {
            draft.title = v;
        }
        if let Some(v) = self.description {
            draft.description = v;
        }
        if let Some(v) = self.duration {
            draft.duration = v;
        }
        if let Some(v) = self.price {
            draft.price = v;
        }
        if let Some(v) = self.start_date {
            draft.start_date = v;
        }
        if let Some(v) = self.slots {
            draft.max_students = v;
        }
        if let Some(v) = self.thumbnail {
            draft.image = v;
        }
        if let Some(v) = self.mode {
            draft.mode = v;
        }
        if let Some(v) = self.language {
            draft.language = v;
        }
        draft
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    cfg.ensure_dirs()?;

    let ctx = AppContext::from_config(&cfg).await?;
    let ok = run(&ctx, args.command).await?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn run(ctx: &AppContext, command: Command) -> Result<bool> {
    let session = &ctx.session;
    match command {
        Command::Login { email, password } => {
            if session.login(&email, &password).await {
                let name = session
                    .current_user()
                    .map(|u| u.full_name)
                    .unwrap_or_default();
                Ok(report(&Notice::success(format!("Welcome back, {}!", name))))
            } else {
                Ok(report(&Notice::error("Login failed. Check your email and password.")))
            }
        }
        Command::Signup {
            name,
            email,
            password,
            phone,
        } => {
            if session
                .signup(&name, &email, &password, phone.as_deref())
                .await
            {
                Ok(report(&Notice::success(
                    "Account created. Run `login` to sign in.",
                )))
            } else {
                Ok(report(&Notice::error("Signup failed.")))
            }
        }
        Command::Logout => {
            session.logout().await?;
            Ok(report(&Notice::success("Signed out.")))
        }
        Command::Whoami => match session.current_user() {
            Some(user) => {
                println!("{} <{}> ({})", user.full_name, user.email, user.role.as_str());
                Ok(true)
            }
            None => {
                println!("not signed in");
                Ok(false)
            }
        },
        Command::Batches {
            public,
            search,
            language,
            mode,
            json,
        } => {
            let batches: Vec<Batch> = if public {
                let mut view = ctx.learner_dashboard();
                if let Some(notice) = view.load().await {
                    return Ok(report(&notice));
                }
                view.set_filter(&search, language, mode);
                view.visible().into_iter().cloned().collect()
            } else {
                if !require_admin(ctx) {
                    return Ok(false);
                }
                if language.is_some() || mode.is_some() {
                    warn!("--language and --mode only apply with --public");
                }
                let mut view = ctx.admin_dashboard();
                if let Some(notice) = view.load().await {
                    return Ok(report(&notice));
                }
                view.set_search(&search);
                view.visible().into_iter().cloned().collect()
            };
            print_batches(&batches, json)?;
            Ok(true)
        }
        Command::Create { fields } => {
            if !require_admin(ctx) {
                return Ok(false);
            }
            let draft = fields.apply_to(BatchDraft::default());
            let mut view = ctx.admin_dashboard();
            Ok(report(&view.create(&draft).await))
        }
        Command::Update { id, fields } => {
            if !require_admin(ctx) {
                return Ok(false);
            }
            let mut view = ctx.admin_dashboard();
            if let Some(notice) = view.load().await {
                return Ok(report(&notice));
            }
            let Some(current) = view.begin_edit(&id) else {
                return Ok(report(&Notice::error(format!("Batch {} not found.", id))));
            };
            let draft = fields.apply_to(current);
            Ok(report(&view.submit_edit(&draft).await))
        }
        Command::Delete { id } => {
            if !require_admin(ctx) {
                return Ok(false);
            }
            let mut view = ctx.admin_dashboard();
            Ok(report(&view.delete(&id).await))
        }
        Command::Enroll { id } => {
            let Some(user) = session.current_user() else {
                return Ok(report(&Notice::error("Please log in to enroll.")));
            };
            let mut view = ctx.learner_dashboard();
            if let Some(notice) = view.load().await {
                return Ok(report(&notice));
            }
            Ok(report(&view.enroll(&user, &id)))
        }
    }
}

fn require_admin(ctx: &AppContext) -> bool {
    if ctx.session.is_admin() {
        return true;
    }
    report(&Notice::error("Admin access required. Log in with an admin account."))
}

/// Print the notice and return whether it reports success.
fn report(notice: &Notice) -> bool {
    if notice.is_success() {
        println!("{}: {}", notice.title, notice.description);
    } else {
        eprintln!("{}: {}", notice.title, notice.description);
    }
    notice.is_success()
}

fn print_batches(batches: &[Batch], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(batches)?);
        return Ok(());
    }
    if batches.is_empty() {
        println!("no batches");
        return Ok(());
    }
    for b in batches {
        println!("{}", batch_line(b));
    }
    Ok(())
}

/// One table row: id, name, price, seats with fill progress, then the schedule.
fn batch_line(b: &Batch) -> String {
    let start = b
        .start_day()
        .map(|d| d.to_string())
        .unwrap_or_else(|| b.start_date.clone());
    let seats = if b.is_full() {
        "full".to_string()
    } else {
        format!("{} left", b.seats_left())
    };
    format!(
        "{}  {}  ₹{}  {}/{} ({:.0}%, {})  {}  {}  starts {}  ({})",
        b.id,
        b.name,
        b.price,
        b.filled_slots,
        b.total_slots,
        b.fill_ratio() * 100.0,
        seats,
        b.mode,
        b.language,
        start,
        b.duration,
    )
}
