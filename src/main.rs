use std::path::PathBuf;
use std::time::Duration;

use bevy::app::{AppExit, ScheduleRunnerPlugin};
use bevy::prelude::*;
use clap::Parser;

use shapeforge::action_log::format_duration;
use shapeforge::config::{ConfigPlugin, ConfigResetNotification};
use shapeforge::constants::HEADLESS_FRAMES_PER_SECOND;
use shapeforge::document::{SessionDocument, load_document, save_document};
use shapeforge::session::{
    EditorSession, EngineNotification, ReplayFinished, ReplayProgress, SessionPlugin,
    SessionSystems,
};

/// Replay a recorded geometry session without a window
#[derive(Parser, Debug)]
#[command(name = "shapeforge", version, about)]
struct Args {
    /// Session document to replay
    document: PathBuf,

    /// Seek to this action before playing
    #[arg(long, value_name = "N")]
    from: Option<u32>,

    /// Write the compacted document here once playback ends
    #[arg(long, value_name = "OUT")]
    export: Option<PathBuf>,
}

/// Document and options handed from the command line to the app
#[derive(Resource)]
struct ReplayJob {
    document: Option<SessionDocument>,
    from: Option<u32>,
    export: Option<PathBuf>,
}

/// Set up file logging for debug builds
#[cfg(debug_assertions)]
fn setup_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use std::fs::OpenOptions;
    use std::io::Write;
    use tracing_subscriber::prelude::*;

    let logs_dir = shapeforge::paths::logs_dir();
    if std::fs::create_dir_all(&logs_dir).is_err() {
        eprintln!("Failed to create logs directory");
        return None;
    }

    let log_file_path = logs_dir.join("shapeforge.log");

    // Append session separator to existing log file
    if let Ok(mut file) = OpenOptions::new().append(true).open(&log_file_path) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let separator = "=".repeat(80);
        let _ = writeln!(
            file,
            "\n\n{}\n=== New Replay Started at {} ===\n{}\n",
            separator, timestamp, separator
        );
    }

    let file_appender = tracing_appender::rolling::never(&logs_dir, "shapeforge.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Configure file layer (no ANSI colors for file output)
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(true)
        .with_level(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,shapeforge=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Some(guard)
}

#[cfg(not(debug_assertions))]
fn setup_logging() -> Option<()> {
    use tracing_subscriber::prelude::*;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,shapeforge=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_ansi(true))
        .init();

    None
}

/// Load the document into the session and start playing
fn begin_replay(
    mut job: ResMut<ReplayJob>,
    mut session: ResMut<EditorSession>,
    reset_notification: Res<ConfigResetNotification>,
    mut exit: MessageWriter<AppExit>,
) {
    let Some(document) = job.document.take() else {
        return;
    };
    if let Some(reason) = &reset_notification.reason {
        warn!("{}", reason);
    }

    if let Err(e) = session.open_document(document) {
        error!("Failed to open session: {}", e);
        exit.write(AppExit::error());
        return;
    }

    let total = session.log().total_actions;
    let duration = session.log().duration();
    info!(
        "Replaying {} actions recorded over {}",
        total,
        format_duration(duration)
    );
    for segment in session.timeline() {
        debug!(
            "{}: {} actions in {}",
            segment.name.as_deref().unwrap_or("(start)"),
            segment.actions.len(),
            format_duration(segment.duration)
        );
    }

    let started = session.start_replay().and_then(|()| match job.from {
        Some(action_index) => session.seek(action_index),
        None => Ok(()),
    });
    if let Err(e) = started.and_then(|()| session.play()) {
        error!("Cannot replay session: {}", e);
        exit.write(AppExit::error());
    }
}

fn report_progress(
    mut progress: MessageReader<ReplayProgress>,
    mut notifications: MessageReader<EngineNotification>,
) {
    for event in progress.read() {
        info!(
            "Action {}/{}: {}",
            event.action_index, event.total_actions, event.name
        );
    }
    for notification in notifications.read() {
        warn!("{}", notification.message);
    }
}

fn finish_replay(
    mut finished: MessageReader<ReplayFinished>,
    job: Res<ReplayJob>,
    mut session: ResMut<EditorSession>,
    mut exit: MessageWriter<AppExit>,
) {
    if finished.read().count() == 0 {
        return;
    }

    if let Some(path) = &job.export {
        let document = session.export_document();
        if let Err(e) = save_document(path, &document) {
            error!("Failed to export session: {}", e);
            exit.write(AppExit::error());
            return;
        }
    }

    info!("Replay complete");
    exit.write(AppExit::Success);
}

fn main() -> AppExit {
    // Keep the guard alive for the duration of the program
    let _log_guard = setup_logging();
    let args = Args::parse();

    if let Err(e) = shapeforge::paths::ensure_directories() {
        warn!("Failed to create application directories: {}", e);
    }

    let document = match load_document(&args.document) {
        Ok(document) => document,
        Err(e) => {
            error!("{}", e);
            return AppExit::error();
        }
    };

    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / HEADLESS_FRAMES_PER_SECOND,
            ))),
        )
        .add_plugins(ConfigPlugin)
        .add_plugins(SessionPlugin)
        .insert_resource(ReplayJob {
            document: Some(document),
            from: args.from,
            export: args.export,
        })
        .add_systems(Update, begin_replay.before(SessionSystems))
        .add_systems(
            Update,
            (report_progress, finish_replay).chain().after(SessionSystems),
        )
        .run()
}
