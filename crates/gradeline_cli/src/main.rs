//! Gradeline CLI - reports over a Canvas-style LMS REST API.

mod commands;
mod config;
mod export;
mod progress;
mod shutdown;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use console::Term;
use gradeline::{AssignmentBucket, CourseEnrollmentType};
use tracing_subscriber::EnvFilter;

use crate::commands::shared::{parse_bucket, parse_course_enrollment_type};
use crate::export::OutputFormat;

#[derive(Parser)]
#[command(name = "gradeline")]
#[command(version)]
#[command(about = "Read-only reports over an LMS REST API")]
#[command(
    long_about = "Gradeline walks paginated, rate-limited LMS endpoints and joins accounts, \
courses, sections, teachers, assignments and submissions into flat report rows, \
exported as CSV, JSON or a terminal table."
)]
#[command(after_long_help = r#"EXAMPLES
    Assignments still needing grading across an account:
        $ gradeline assignments --account 111

    Same, four courses at a time, split into Adelaide and Perth files:
        $ gradeline assignments --account 111 -c 4 --split-campus

    Assignment results of one student as JSON:
        $ gradeline results --user S100 --format json

    Generate shell completions:
        $ gradeline completions bash > ~/.local/share/bash-completion/completions/gradeline

CONFIGURATION
    Gradeline reads configuration from (later wins):
      1. ~/.config/gradeline/config.toml (or $XDG_CONFIG_HOME/gradeline/config.toml)
      2. ./gradeline.toml
      3. Environment variables (GRADELINE_* prefix, `__` between section and key)
      4. Legacy CANVAS_* environment variables
      5. Command-line flags
    A .env file in the current directory is loaded first.

ENVIRONMENT VARIABLES
    GRADELINE_CANVAS__BASE_URL       API root, e.g. https://lms.example.edu/api/v1
    GRADELINE_CANVAS__ACCESS_TOKEN   Personal access token
    GRADELINE_CANVAS__PAGE_SIZE      Items per page (default: 100)
    GRADELINE_REPORT__TIME_ZONE      Zone timestamps are rendered in (default: Australia/Perth)
    CANVAS_BASE_URL, CANVAS_ACCESS_TOKEN, CANVAS_PAGE_SIZE
                                     Legacy names, still honoured
"#)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionOptions,

    #[command(subcommand)]
    command: Commands,
}

/// Connection overrides, applied on top of the loaded configuration.
#[derive(Debug, Clone, Default, Args)]
struct ConnectionOptions {
    /// API root including /api/v1 (overrides config)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Access token (overrides config)
    #[arg(long, global = true)]
    access_token: Option<String>,

    /// Items per page (overrides config)
    #[arg(long, global = true)]
    page_size: Option<u32>,
}

/// Where and how report rows are written.
#[derive(Debug, Clone, Args)]
struct OutputOptions {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Retry override accepted by every report.
#[derive(Debug, Clone, Args)]
struct RetryArgs {
    /// Retries per failed page or lookup, 0 disables (default from config or 0)
    #[arg(long)]
    retries: Option<usize>,
}

/// Zone override for reports that render timestamps.
#[derive(Debug, Clone, Args)]
struct ZoneArgs {
    /// Time zone for timestamps, e.g. Australia/Adelaide (default from config)
    #[arg(long)]
    time_zone: Option<String>,
}

/// Options of the account-wide reports, which fan out over courses.
#[derive(Debug, Clone, Args)]
struct ReportArgs {
    /// Courses processed at once (default from config or 1)
    #[arg(short = 'c', long)]
    concurrency: Option<usize>,

    #[command(flatten)]
    zone: ZoneArgs,

    #[command(flatten)]
    retry: RetryArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Assignments that still need grading, one row per section
    Assignments {
        /// Account whose student courses are reported
        #[arg(long, required_unless_present = "course")]
        account: Option<u64>,

        /// Report a single course instead of a whole account (wins over --account)
        #[arg(long)]
        course: Option<u64>,

        /// Assignment bucket (past, overdue, undated, ungraded, unsubmitted, upcoming, future)
        #[arg(short, long, default_value = "ungraded", value_parser = parse_bucket)]
        bucket: AssignmentBucket,

        /// Write Adelaide and Perth sections to separate files
        #[arg(long)]
        split_campus: bool,

        #[command(flatten)]
        report: ReportArgs,

        #[command(flatten)]
        output: OutputOptions,
    },
    /// Assignment analytics of one student across their courses
    Results {
        /// Student SIS id
        #[arg(short, long)]
        user: String,

        #[command(flatten)]
        zone: ZoneArgs,

        #[command(flatten)]
        retry: RetryArgs,

        #[command(flatten)]
        output: OutputOptions,
    },
    /// Current grade of every enrollment of one student
    Enrollments {
        /// Student SIS id
        #[arg(short, long)]
        user: String,

        #[command(flatten)]
        retry: RetryArgs,

        #[command(flatten)]
        output: OutputOptions,
    },
    /// Submissions without a grade across an account's courses
    Submissions {
        /// Account whose student courses are scanned
        #[arg(long)]
        account: u64,

        #[command(flatten)]
        report: ReportArgs,

        #[command(flatten)]
        output: OutputOptions,
    },
    /// List an account's courses
    Courses {
        #[arg(long)]
        account: u64,

        /// Enrollment role the courses are filtered by
        #[arg(short, long, default_value = "student", value_parser = parse_course_enrollment_type)]
        enrollment_type: CourseEnrollmentType,

        #[command(flatten)]
        output: OutputOptions,
    },
    /// List grading standards of an account or a course
    GradingStandards {
        #[arg(long, required_unless_present = "course")]
        account: Option<u64>,

        /// Course whose standards are listed (wins over --account)
        #[arg(long)]
        course: Option<u64>,

        #[command(flatten)]
        output: OutputOptions,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Progress bars replace info-level logs on a terminal
    let default_filter = if Term::stderr().is_term() {
        "gradeline=warn,gradeline_cli=warn"
    } else {
        "gradeline=info,gradeline_cli=info"
    };
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(default_filter),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(());
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(());
        }
        _ => {}
    }

    // Configuration (defaults -> files -> env -> legacy env -> flags)
    let mut config = config::Config::load();
    config.apply_connection_overrides(
        cli.connection.base_url.clone(),
        cli.connection.access_token.clone(),
        cli.connection.page_size,
    );

    let client = commands::shared::build_client(&config)?;
    shutdown::setup_shutdown_handler(client.cancellation_token().clone());

    match cli.command {
        Commands::Assignments {
            account,
            course,
            bucket,
            split_campus,
            report,
            output,
        } => {
            commands::assignments::handle_assignments(
                client,
                &config,
                commands::assignments::AssignmentsTarget::from_args(account, course)?,
                bucket,
                split_campus,
                &report,
                &output,
            )
            .await?;
        }
        Commands::Results {
            user,
            zone,
            retry,
            output,
        } => {
            commands::results::handle_results(client, &config, &user, &zone, &retry, &output)
                .await?;
        }
        Commands::Enrollments {
            user,
            retry,
            output,
        } => {
            commands::results::handle_enrollments(client, &config, &user, &retry, &output)
                .await?;
        }
        Commands::Submissions {
            account,
            report,
            output,
        } => {
            commands::submissions::handle_submissions(client, &config, account, &report, &output)
                .await?;
        }
        Commands::Courses {
            account,
            enrollment_type,
            output,
        } => {
            commands::listings::handle_courses(client, &config, account, enrollment_type, &output)
                .await?;
        }
        Commands::GradingStandards {
            account,
            course,
            output,
        } => {
            commands::listings::handle_grading_standards(client, account, course, &output)
                .await?;
        }
        Commands::Completions { .. } | Commands::Man { .. } => {}
    }

    Ok(())
}
