// ── System services ───────────────────────────────────────────────────────────
//
// `System` owns every process-lifetime OS resource (instance lock, IPC
// endpoint, console, key hook, screensaver state) and is the only thing the
// host talks to.  Pure logic lives in the sub-modules and is unit-tested;
// OS calls go through `platform::native`.
//
// Error policy: anything that reaches `fatal` ends the process.  Settings the
// OS refuses (priority, key hook) are reported and left unchanged.

pub mod args;
pub mod clipboard;
pub mod console;
pub mod files;
pub mod ipc;
pub mod settings;
pub mod timer;

use std::fs::OpenOptions;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::error::{Error, Result};
use crate::platform::native;

use self::args::CommandLine;
use self::clipboard::ClipboardProvider;
use self::console::LineEditor;
use self::ipc::IpcMessage;
use self::settings::{Priority, SysSettings};
use self::timer::Clock;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Lower bound for the hunk, in bytes.
pub const MINIMUM_MEMORY: u64 = 0x0c0_0000;
/// Upper bound for the hunk unless `-mem` overrides it.
pub const MAXIMUM_MEMORY: u64 = 0x200_0000;

/// Sleep while paused, minimised or not drawing.
pub const PAUSE_SLEEP: Duration = Duration::from_millis(50);
/// Sleep while merely unfocused.
pub const NOT_FOCUS_SLEEP: Duration = Duration::from_millis(20);
/// Per-frame wait of a dedicated server.
pub const DEDICATED_SLEEP: Duration = Duration::from_millis(1);

const DEDICATED_TITLE: &str = "ezqds";

// ── Shared types ──────────────────────────────────────────────────────────────

/// Physical memory figures reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStatus {
    pub avail_phys: u64,
    pub total_phys: u64,
}

/// Keys the low-level hook takes away from the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookedKey {
    LeftWin,
    RightWin,
    Menu,
    PrintScreen,
}

/// What the host reports about its window each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppState {
    pub active: bool,
    pub minimized: bool,
    pub paused: bool,
    pub block_drawing: bool,
}

/// How long to idle before the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleSleep {
    pub duration: Duration,
    /// Nothing will be visible, so the next screen update can be skipped.
    pub skip_update: bool,
}

/// Result of `System::init`.
pub enum Startup {
    /// This process owns the client; run the main loop.
    Run(Box<System>),
    /// Another client is running and the `+qwurl` argument was handed to it.
    Forwarded,
}

// ── Pure policy ───────────────────────────────────────────────────────────────

/// Hunk size: all available physical memory, raised to the minimum, raised
/// again to half of the total, then capped at the maximum.
pub fn heap_size(avail_phys: u64, total_phys: u64) -> u64 {
    let mut size = avail_phys;
    if size < MINIMUM_MEMORY {
        size = MINIMUM_MEMORY;
    }
    if size < total_phys / 2 {
        size = total_phys / 2;
    }
    size.min(MAXIMUM_MEMORY)
}

/// Main-loop idle policy.
pub fn idle_sleep(state: &AppState, dedicated: bool, inactive_sleep: bool) -> Option<IdleSleep> {
    if dedicated {
        return Some(IdleSleep {
            duration: DEDICATED_SLEEP,
            skip_update: false,
        });
    }
    if !inactive_sleep {
        return None;
    }
    if (state.paused && !state.active) || state.minimized || state.block_drawing {
        Some(IdleSleep {
            duration: PAUSE_SLEEP,
            skip_update: true,
        })
    } else if !state.active {
        Some(IdleSleep {
            duration: NOT_FOCUS_SLEEP,
            skip_update: false,
        })
    } else {
        None
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// Start the logger.  `RUST_LOG` picks the level (default `info`);
/// `-condebug <file>` appends to that file instead of stderr.
pub fn init_logging(args: &CommandLine) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(path) = args.value_of("-condebug") {
        if !path.starts_with('-') && !path.starts_with('+') {
            match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => {
                    builder.target(env_logger::Target::Pipe(Box::new(file)));
                }
                Err(e) => eprintln!("-condebug: cannot open {path}: {e}"),
            }
        }
    }

    let _ = builder.try_init();
}

// ── Threads ───────────────────────────────────────────────────────────────────

/// Start a named worker at the highest normal thread priority.
pub fn spawn_thread<F>(name: &str, f: F) -> Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    let handle = std::thread::Builder::new()
        .name(name.to_owned())
        .spawn(f)?;
    native::process::raise_thread_priority(&handle);
    Ok(handle)
}

// ── Single instance ───────────────────────────────────────────────────────────

/// Outcome of the single-instance check.
#[derive(Debug)]
pub(crate) enum Claim<L> {
    /// No check: dedicated server, or `-allowmultiple` in a debug build.
    Skipped,
    /// This process holds the lock.
    Owned(L),
    /// Another client holds it; hand this `+qwurl` link over and exit.
    Forward(String),
}

/// Decide the single-instance outcome.  `acquire` is only called when the
/// check applies; `Error::AlreadyRunning` without a `+qwurl` is fatal.
pub(crate) fn claim_instance<L>(
    args: &CommandLine,
    dedicated: bool,
    acquire: impl FnOnce() -> Result<L>,
) -> Result<Claim<L>> {
    if dedicated || (cfg!(debug_assertions) && args.has("-allowmultiple")) {
        return Ok(Claim::Skipped);
    }
    match acquire() {
        Ok(lock) => Ok(Claim::Owned(lock)),
        Err(Error::AlreadyRunning) => match args.value_of("+qwurl") {
            Some(url) => Ok(Claim::Forward(url.to_owned())),
            None => Err(Error::AlreadyRunning),
        },
        Err(e) => Err(e),
    }
}

// ── System ────────────────────────────────────────────────────────────────────

pub struct System {
    args: CommandLine,
    dedicated: bool,
    settings: SysSettings,
    clock: Clock,
    heap_size: u64,

    console: Option<native::console::Console>,
    line_editor: LineEditor,
    clipboard: native::clipboard::SystemClipboard,

    instance: Option<native::instance::InstanceLock>,
    ipc: Option<native::ipc::IpcServer>,

    key_hook: Option<native::keyhook::KeyHook>,
    hooked_tx: Sender<(HookedKey, bool)>,
    hooked_rx: Receiver<(HookedKey, bool)>,

    commands_rx: Receiver<String>,
    screensaver_disabled: bool,
}

impl System {
    /// Bring up every OS-facing service the client needs.
    pub fn init(args: CommandLine, settings: SysSettings) -> Result<Startup> {
        let dedicated = args.has("-dedicated");

        let mut console = None;
        let (commands_tx, commands_rx) = crossbeam_channel::unbounded();
        if dedicated {
            let mut c = native::console::Console::open(true)?;
            c.set_title(DEDICATED_TITLE);
            native::console::install_ctrl_handler(commands_tx)?;
            console = Some(c);
        } else {
            match native::console::Console::open(false) {
                Ok(c) => console = Some(c),
                Err(e) => log::warn!("no console input: {e}"),
            }
        }

        let instance = match claim_instance(&args, dedicated, native::instance::InstanceLock::acquire)? {
            Claim::Skipped => None,
            Claim::Owned(lock) => Some(lock),
            Claim::Forward(url) => {
                native::ipc::send(&ipc::encode(&url)?)?;
                log::info!("forwarded {url} to the running client");
                return Ok(Startup::Forwarded);
            }
        };

        let screensaver_disabled = !dedicated && native::events::suppress_screensaver();

        let ipc = if instance.is_some() {
            match native::ipc::IpcServer::bind() {
                Ok(server) => Some(server),
                Err(e) => {
                    log::warn!("IPC endpoint unavailable: {e}");
                    None
                }
            }
        } else {
            None
        };

        let clock = Clock::for_args(args.has("-nohwtimer"));

        let heap_size = match native::process::memory_status() {
            Some(m) => heap_size(m.avail_phys, m.total_phys),
            None => MAXIMUM_MEMORY,
        };
        log::info!("hunk size {} KiB", heap_size / 1024);

        let (hooked_tx, hooked_rx) = crossbeam_channel::unbounded();

        let mut sys = Self {
            args,
            dedicated,
            settings,
            clock,
            heap_size,
            console,
            line_editor: LineEditor::new(),
            clipboard: Default::default(),
            instance,
            ipc,
            key_hook: None,
            hooked_tx,
            hooked_rx,
            commands_rx,
            screensaver_disabled,
        };
        sys.apply_settings();
        Ok(Startup::Run(Box::new(sys)))
    }

    /// Push persisted settings to the OS.  Failures are reported and the
    /// offending setting is reset.
    fn apply_settings(&mut self) {
        let wanted = self.settings.clone();
        if wanted.high_priority != 0 {
            self.settings.high_priority = 0;
            let _ = self.set_high_priority(wanted.high_priority);
        }
        if wanted.disable_win_keys {
            self.settings.disable_win_keys = false;
            let _ = self.set_disable_win_keys(true);
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn args(&self) -> &CommandLine {
        &self.args
    }

    pub fn is_dedicated(&self) -> bool {
        self.dedicated
    }

    pub fn settings(&self) -> &SysSettings {
        &self.settings
    }

    pub fn heap_size(&self) -> u64 {
        self.heap_size
    }

    pub fn clipboard(&mut self) -> &mut dyn ClipboardProvider {
        &mut self.clipboard
    }

    /// Seconds since the first call.
    pub fn double_time(&mut self) -> f64 {
        self.clock.double_time()
    }

    // ── Output ────────────────────────────────────────────────────────────────

    /// Console output.  A dedicated server prints to its console; a client
    /// routes the text through the logger.
    pub fn printf(&mut self, text: &str) {
        match (&mut self.console, self.dedicated) {
            (Some(console), true) => {
                if let Err(e) = console.print(text) {
                    log::warn!("console write failed: {e}");
                }
            }
            _ => log::info!("{}", text.trim_end()),
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Next complete console line, if any.  Commands queued by the Ctrl+C
    /// handler come first.
    pub fn console_input(&mut self) -> Result<Option<String>> {
        if let Ok(cmd) = self.commands_rx.try_recv() {
            return Ok(Some(cmd));
        }
        let Some(console) = self.console.as_mut() else {
            return Ok(None);
        };
        let events = console.read_events()?;
        self.line_editor
            .poll(events, &mut self.clipboard, console.echo())
    }

    /// Next decoded IPC message, if any.
    pub fn read_ipc(&mut self) -> Result<Option<IpcMessage>> {
        let Some(server) = self.ipc.as_mut() else {
            return Ok(None);
        };
        while let Some(bytes) = server.try_recv()? {
            if let Some(msg) = ipc::decode(&bytes) {
                return Ok(Some(msg));
            }
        }
        Ok(None)
    }

    /// Pump the OS message queue.  `false` means the OS asked us to quit.
    pub fn send_key_events(&mut self) -> bool {
        native::events::pump_messages()
    }

    /// Key events captured by the Windows-key hook since the last call.
    pub fn hooked_keys(&mut self) -> Vec<(HookedKey, bool)> {
        self.hooked_rx.try_iter().collect()
    }

    /// Tell the key hook whether the client currently has focus.
    pub fn set_active(&mut self, active: bool) {
        if let Some(hook) = &self.key_hook {
            hook.set_active(active);
        }
    }

    // ── Idle ──────────────────────────────────────────────────────────────────

    /// Apply the idle policy for this frame.  Returns `true` when the next
    /// screen update should be skipped.
    pub fn idle(&mut self, state: &AppState) -> bool {
        let Some(sleep) = idle_sleep(state, self.dedicated, self.settings.inactive_sleep) else {
            if self.settings.yield_cpu {
                std::thread::yield_now();
            }
            return false;
        };
        if self.dedicated {
            std::thread::sleep(sleep.duration);
        } else {
            native::events::sleep_until_input(sleep.duration);
        }
        sleep.skip_update
    }

    // ── Settings ──────────────────────────────────────────────────────────────

    /// Change the process priority class.
    pub fn set_priority(&mut self, priority: Priority) -> Result<()> {
        native::process::set_priority(priority)?;
        log::debug!("priority class {}", priority.as_str());
        Ok(())
    }

    /// `sys_highpriority`: `1` high, `-1` low, else normal.  The value is
    /// kept only if the OS accepts the new priority class.
    pub fn set_high_priority(&mut self, value: i32) -> Result<()> {
        let priority = Priority::from_high_priority(value);
        match self.set_priority(priority) {
            Ok(()) => {
                self.settings.high_priority = value;
                self.printf(&format!("Process priority set to {}\n", priority.as_str()));
                Ok(())
            }
            Err(e) => {
                self.printf("Changing process priority failed\n");
                log::warn!("set_priority({priority:?}): {e}");
                Err(e)
            }
        }
    }

    /// `sys_disableWinKeys`: install or remove the low-level key hook.
    pub fn set_disable_win_keys(&mut self, on: bool) -> Result<()> {
        if on && self.key_hook.is_none() {
            match native::keyhook::KeyHook::install(self.hooked_tx.clone()) {
                Ok(hook) => self.key_hook = Some(hook),
                Err(e) => {
                    self.printf("Failed to install winkey hook.\n");
                    log::warn!("key hook: {e}");
                    return Err(e);
                }
            }
        } else if !on {
            self.key_hook = None;
        }
        self.settings.disable_win_keys = on;
        Ok(())
    }

    pub fn set_inactive_sleep(&mut self, on: bool) {
        self.settings.inactive_sleep = on;
    }

    pub fn set_yield_cpu(&mut self, on: bool) {
        self.settings.yield_cpu = on;
    }

    /// Persist the current settings.
    pub fn save_settings(&self) -> Result<()> {
        self.settings.save()
    }

    // ── Shutdown ──────────────────────────────────────────────────────────────

    /// Release OS resources in reverse order of acquisition.
    fn release(&mut self) {
        self.key_hook = None;
        self.ipc = None;
        self.instance = None;
        if self.screensaver_disabled {
            native::events::restore_screensaver();
            self.screensaver_disabled = false;
        }
    }

    /// Normal exit: release everything and end the process with status 0.
    pub fn quit(mut self) -> ! {
        if let Err(e) = self.save_settings() {
            log::warn!("could not save settings: {e}");
        }
        self.release();
        log::info!("shutdown complete");
        std::process::exit(0);
    }

    /// Fatal error: report `err`, release everything, exit with status 1.
    pub fn fatal(mut self, err: &Error) -> ! {
        log::error!("{err}");
        if self.dedicated {
            self.printf(&format!("ERROR: {err}\n"));
        } else {
            native::dialog::show_error_dialog(&err.to_string());
        }
        self.release();
        std::process::exit(1);
    }
}

/// Fatal error before a `System` exists.
pub fn fatal_early(err: &Error) -> ! {
    log::error!("{err}");
    native::dialog::show_error_dialog(&err.to_string());
    std::process::exit(1);
}
