// Write side: module load/unload through pactl.
//
// Exit codes follow pactl's conventions: 0 when the server accepted the request,
// 1 when it rejected it (bad id, name already taken, unknown module). Anything else
// means pactl itself did not run as expected; spawn failures are reported with the
// codes a shell would have used (127 not found, 126 not executable).
use crate::settings::Settings;
use std::fmt;
use std::io;
use std::process::{Child, Command, Stdio};
use std::thread;
use tracing::{debug, error, info, warn};

const EXIT_NOT_FOUND: i32 = 127;
const EXIT_CANNOT_EXECUTE: i32 = 126;
const EXIT_SIGNAL_BASE: i32 = 128;

/// A program and its argument vector. Never passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs an invocation to completion and reports its exit code.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> i32;
}

/// `std::process` runner. Blocks until the program exits.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn spawn_failure_code(err: &io::Error) -> i32 {
        match err.kind() {
            io::ErrorKind::NotFound => EXIT_NOT_FOUND,
            _ => EXIT_CANNOT_EXECUTE,
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> i32 {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to run {}: {}", invocation.program, e);
                return Self::spawn_failure_code(&e);
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!("{} stdout: {}", invocation.program, stdout.trim());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("{} stderr: {}", invocation.program, stderr.trim());
        }

        if let Some(code) = output.status.code() {
            return code;
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = output.status.signal() {
                return EXIT_SIGNAL_BASE + signal;
            }
        }
        EXIT_SIGNAL_BASE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    /// The server rejected the request (exit code 1).
    Failure,
    /// Any other exit code.
    Unexpected(i32),
}

impl CommandOutcome {
    pub fn from_exit_code(code: i32) -> Self {
        match code {
            0 => CommandOutcome::Success,
            1 => CommandOutcome::Failure,
            other => CommandOutcome::Unexpected(other),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success)
    }
}

/// Issues the module commands and logs their outcome.
#[derive(Debug, Clone)]
pub struct CommandService<R> {
    runner: R,
    settings: Settings,
}

impl CommandService<SystemRunner> {
    pub fn system(settings: Settings) -> Self {
        Self::new(SystemRunner, settings)
    }
}

impl<R: CommandRunner> CommandService<R> {
    pub fn new(runner: R, settings: Settings) -> Self {
        Self { runner, settings }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn pactl(&self) -> Invocation {
        Invocation::new(self.settings.pactl.as_str())
    }

    fn execute(&self, action: &str, invocation: Invocation) -> CommandOutcome {
        debug!("Running: {}", invocation);
        let outcome = CommandOutcome::from_exit_code(self.runner.run(&invocation));
        match outcome {
            CommandOutcome::Success => debug!("{} successful", action),
            CommandOutcome::Failure => warn!("{} failed!", action),
            CommandOutcome::Unexpected(code) => {
                error!("{} failed with an unexpected error: {}", action, code)
            }
        }
        outcome
    }

    /// Pipe `source_id` into `sink_id`.
    pub fn create_loopback(&self, source_id: &str, sink_id: &str) -> CommandOutcome {
        info!("Creating a loopback");
        debug!("Creating a loopback with source {} and sink {}", source_id, sink_id);
        let invocation = self
            .pactl()
            .arg("load-module")
            .arg("module-loopback")
            .arg(format!("sink={}", sink_id))
            .arg(format!("source={}", source_id))
            .arg(format!("latency_msec={}", self.settings.loopback_latency_msec));
        self.execute(
            &format!("Creation of loopback with source {} and sink {}", source_id, sink_id),
            invocation,
        )
    }

    /// Null sink whose name doubles as its description.
    pub fn create_virtual_sink(&self, name: &str) -> CommandOutcome {
        info!("Creating a virtual sink");
        debug!("Creating a virtual sink with name {}", name);
        let invocation = self
            .pactl()
            .arg("load-module")
            .arg("module-null-sink")
            .arg(format!("sink_name={}", name))
            .arg(format!("sink_properties=device.description={}", name))
            .arg(format!("rate={}", self.settings.null_sink_rate));
        self.execute(&format!("Creation of virtual sink with name {}", name), invocation)
    }

    pub fn create_remapped_source(&self, display_name: &str, source_id: &str) -> CommandOutcome {
        info!("Creating a remapped source");
        debug!(
            "Creating a remapped source with the name of {} from ID of {}",
            display_name, source_id
        );
        let invocation = self
            .pactl()
            .arg("load-module")
            .arg("module-remap-source")
            .arg(format!("master={}", source_id))
            .arg(format!("source_name={}", display_name))
            .arg(format!("source_properties=device.description={}", display_name));
        self.execute(
            &format!(
                "Creation of remapped source with name {} and ID of {}",
                display_name, source_id
            ),
            invocation,
        )
    }

    pub fn delete_module(&self, module_id: &str) -> CommandOutcome {
        info!("Removing module");
        debug!("Removing module with an ID of {}", module_id);
        let invocation = self.pactl().arg("unload-module").arg(module_id);
        self.execute(&format!("Removal of module with ID of {}", module_id), invocation)
    }

    /// Launch the configured mixer without waiting for it. A detached thread
    /// collects its exit status once it closes.
    pub fn open_volume_control(&self) -> bool {
        info!("Opening {}", self.settings.volume_control);
        match Command::new(&self.settings.volume_control)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                debug!("{} spawned with PID: {}", self.settings.volume_control, child.id());
                reap(self.settings.volume_control.clone(), child);
                true
            }
            Err(e) => {
                warn!("Failed to open {}: {}", self.settings.volume_control, e);
                false
            }
        }
    }
}

fn reap(program: String, mut child: Child) -> thread::JoinHandle<()> {
    thread::spawn(move || match child.wait() {
        Ok(status) => debug!("{} exited: {}", program, status),
        Err(e) => warn!("Failed to wait for {}: {}", program, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    /// Shared buffer the fmt subscriber writes into.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn logged<T>(body: impl FnOnce() -> T) -> (T, String) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(Level::DEBUG)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, body);
        (result, captured.text())
    }

    /// Records invocations and answers with a fixed exit code.
    struct FakeRunner {
        exit_code: i32,
        calls: RefCell<Vec<Invocation>>,
    }

    impl FakeRunner {
        fn exiting(exit_code: i32) -> Self {
            Self {
                exit_code,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, invocation: &Invocation) -> i32 {
            self.calls.borrow_mut().push(invocation.clone());
            self.exit_code
        }
    }

    fn service(exit_code: i32) -> CommandService<FakeRunner> {
        CommandService::new(FakeRunner::exiting(exit_code), Settings::default())
    }

    fn issued(service: &CommandService<FakeRunner>) -> Vec<String> {
        service.runner().calls.borrow().iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(CommandOutcome::from_exit_code(0), CommandOutcome::Success);
        assert_eq!(CommandOutcome::from_exit_code(1), CommandOutcome::Failure);
        assert_eq!(CommandOutcome::from_exit_code(127), CommandOutcome::Unexpected(127));
        assert!(CommandOutcome::from_exit_code(0).is_success());
        assert!(!CommandOutcome::from_exit_code(1).is_success());
        assert!(!CommandOutcome::from_exit_code(127).is_success());
    }

    #[test]
    fn test_create_loopback_command() {
        let service = service(0);
        assert_eq!(service.create_loopback("3", "7"), CommandOutcome::Success);
        assert_eq!(
            issued(&service),
            vec!["pactl load-module module-loopback sink=7 source=3 latency_msec=1".to_string()]
        );
    }

    #[test]
    fn test_create_virtual_sink_command() {
        let service = service(1);
        assert_eq!(service.create_virtual_sink("vsink"), CommandOutcome::Failure);
        assert_eq!(
            issued(&service)[0],
            "pactl load-module module-null-sink sink_name=vsink sink_properties=device.description=vsink rate=48000"
        );
    }

    #[test]
    fn test_create_remapped_source_command() {
        let service = service(0);
        service.create_remapped_source("DeskMic", "4");
        assert_eq!(
            issued(&service)[0],
            "pactl load-module module-remap-source master=4 source_name=DeskMic source_properties=device.description=DeskMic"
        );
    }

    #[test]
    fn test_delete_module_unexpected_code() {
        let service = service(127);
        assert_eq!(service.delete_module("22"), CommandOutcome::Unexpected(127));
        assert_eq!(issued(&service)[0], "pactl unload-module 22");
    }

    #[test]
    fn test_user_text_stays_one_argument() {
        let service = service(0);
        service.create_virtual_sink("a; rm -rf ~");
        let calls = service.runner().calls.borrow();
        assert_eq!(calls[0].program, "pactl");
        assert_eq!(calls[0].args.len(), 5);
        assert_eq!(calls[0].args[2], "sink_name=a; rm -rf ~");
    }

    #[test]
    fn test_settings_shape_commands() {
        let settings = Settings {
            pactl: "/usr/bin/pactl".to_string(),
            loopback_latency_msec: 20,
            null_sink_rate: 44100,
            ..Settings::default()
        };
        let service = CommandService::new(FakeRunner::exiting(0), settings);
        service.create_loopback("1", "2");
        service.create_virtual_sink("x");
        let calls = issued(&service);
        assert_eq!(calls[0], "/usr/bin/pactl load-module module-loopback sink=2 source=1 latency_msec=20");
        assert!(calls[1].ends_with("rate=44100"));
    }

    #[test]
    fn test_system_runner_missing_program() {
        let code = SystemRunner.run(&Invocation::new("palt-definitely-not-a-program"));
        assert_eq!(code, EXIT_NOT_FOUND);
        assert_eq!(CommandOutcome::from_exit_code(code), CommandOutcome::Unexpected(127));
    }

    #[test]
    fn test_rejected_request_logs_a_warning() {
        let service = service(1);
        let (outcome, log) = logged(|| service.delete_module("22"));
        assert_eq!(outcome, CommandOutcome::Failure);
        assert!(log.contains("WARN"));
        assert!(log.contains("Removal of module with ID of 22 failed!"));
        assert!(!log.contains("ERROR"));
    }

    #[test]
    fn test_unexpected_exit_logs_an_error() {
        let service = service(127);
        let (outcome, log) = logged(|| service.delete_module("22"));
        assert_eq!(outcome, CommandOutcome::Unexpected(127));
        assert!(log.contains("ERROR"));
        assert!(log.contains("failed with an unexpected error: 127"));
        assert!(!log.contains("WARN"));
    }

    #[test]
    fn test_successful_request_logs_no_problem() {
        let service = service(0);
        let (_, log) = logged(|| service.create_virtual_sink("vsink"));
        assert!(log.contains("successful"));
        assert!(!log.contains("WARN"));
        assert!(!log.contains("ERROR"));
    }

    #[test]
    fn test_missing_volume_control_reports_failure() {
        let settings = Settings {
            volume_control: "palt-definitely-not-a-mixer".to_string(),
            ..Settings::default()
        };
        let service = CommandService::new(FakeRunner::exiting(0), settings);
        assert!(!service.open_volume_control());
    }

    #[cfg(unix)]
    #[test]
    fn test_volume_control_launches() {
        let settings = Settings {
            volume_control: "true".to_string(),
            ..Settings::default()
        };
        let service = CommandService::new(FakeRunner::exiting(0), settings);
        assert!(service.open_volume_control());
    }

    #[cfg(unix)]
    #[test]
    fn test_exited_child_is_reaped() {
        let child = Command::new("true").spawn().unwrap();
        assert!(reap("true".to_string(), child).join().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_exit_codes() {
        assert_eq!(SystemRunner.run(&Invocation::new("true")), 0);
        assert_eq!(SystemRunner.run(&Invocation::new("false")), 1);
        let code = SystemRunner.run(&Invocation::new("sh").arg("-c").arg("exit 3"));
        assert_eq!(code, 3);
    }
}
