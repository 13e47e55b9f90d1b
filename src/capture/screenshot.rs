use std::{
    env, io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
    thread::{self, JoinHandle},
};

use crate::backend::BackendError;

/// A capture tool invocation that leaves its result on the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl CaptureCommand {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
        }
    }
}

/// Linux tools in preference order, each in region + clipboard mode.
const LINUX_TOOLS: &[(&str, &[&str])] = &[
    ("gnome-screenshot", &["-a", "-c"]),
    ("spectacle", &["-r", "-b", "-c"]),
    ("flameshot", &["gui", "-c"]),
];

/// Pick the capture command for `os` (as in `std::env::consts::OS`).
///
/// `is_available` answers whether a program can be found; it is only
/// consulted on Linux, where the tool varies by desktop.
pub fn capture_command_for(
    os: &str,
    is_available: impl Fn(&str) -> bool,
) -> Option<CaptureCommand> {
    match os {
        "windows" => Some(CaptureCommand::new("cmd", &["/c", "start", "ms-screencapture:"])),
        "macos" => Some(CaptureCommand::new("screencapture", &["-i", "-c"])),
        _ => LINUX_TOOLS
            .iter()
            .find(|(program, _)| is_available(program))
            .map(|(program, args)| CaptureCommand::new(program, args)),
    }
}

/// Launch the platform capture UI without waiting for the user to finish.
pub fn launch() -> Result<CaptureCommand, BackendError> {
    let command = capture_command_for(env::consts::OS, |program| find_in_path(program).is_some())
        .ok_or(BackendError::NoScreenshotTool)?;

    // Detached: the reaper thread outlives this call.
    spawn_reaped(&command).map_err(BackendError::ScreenshotLaunch)?;

    log::info!("Launched screenshot tool: {} {}", command.program, command.args.join(" "));
    Ok(command)
}

/// Spawn `command` and wait for it on a background thread so the exited tool
/// never lingers as a zombie.
pub fn spawn_reaped(command: &CaptureCommand) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = Command::new(&command.program).args(&command.args).spawn()?;
    let program = command.program.clone();

    thread::Builder::new()
        .name("screenshot-reaper".into())
        .spawn(move || {
            let status = child.wait();
            match &status {
                Ok(status) => log::debug!("{program} exited with {status}"),
                Err(err) => log::warn!("Failed to wait for {program}: {err}"),
            }
            status
        })
}

fn find_in_path(program: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
