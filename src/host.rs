// ── Host ──────────────────────────────────────────────────────────────────────
//
// The game side of the main loop.  `run` drives any `Host` the way the client
// frame loop does: pump OS messages, apply the idle policy, measure the frame
// time, run one frame.  `ConsoleHost` is the host shipped with the binary: a
// command console over the system services and the matrix stack, fed by the
// dedicated console and by IPC messages from later launches.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::render::{Mat4, MatrixMode, MatrixStack};
use crate::sys::ipc::IpcMessage;
use crate::sys::settings::Priority;
use crate::sys::{files, AppState, System};

const DEFAULT_PORT: u16 = 27500;
const DEFAULT_WIDTH: f32 = 640.0;
const DEFAULT_HEIGHT: f32 = 480.0;

// ── Loop ──────────────────────────────────────────────────────────────────────

/// What the loop does after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub trait Host {
    /// Run one frame.  `frame_time` is the wall time since the previous
    /// frame in seconds; `skip_update` means nothing would be visible.
    fn frame(&mut self, sys: &mut System, frame_time: f64, skip_update: bool) -> Result<Flow>;

    /// Focus and visibility, consulted by the idle policy.
    fn app_state(&self) -> AppState;

    /// Called once after the last frame, including on fatal errors.
    fn shutdown(&mut self, sys: &mut System);
}

/// Run frames until the host or the OS asks to stop.
pub fn run(sys: &mut System, host: &mut dyn Host) -> Result<()> {
    let mut oldtime = sys.double_time();
    loop {
        if !sys.send_key_events() {
            log::info!("quit requested by the OS");
            return Ok(());
        }

        let state = host.app_state();
        sys.set_active(state.active);
        let skip_update = sys.idle(&state);

        let newtime = sys.double_time();
        let flow = host.frame(sys, newtime - oldtime, skip_update)?;
        oldtime = newtime;

        if flow == Flow::Quit {
            return Ok(());
        }
    }
}

// ── qw:// links ───────────────────────────────────────────────────────────────

/// A parsed `qw://host[:port][/command]` link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QwUrl {
    pub host: String,
    pub port: u16,
    /// Trailing path, e.g. `observe` or `join`.
    pub command: Option<String>,
}

impl QwUrl {
    pub fn parse(url: &str) -> Option<Self> {
        let rest = url
            .get(..5)
            .filter(|p| p.eq_ignore_ascii_case("qw://"))
            .map(|_| &url[5..])?;

        let (addr, command) = match rest.split_once('/') {
            Some((a, c)) => (a, Some(c.trim_end_matches('/'))),
            None => (rest, None),
        };
        let (host, port) = match addr.rsplit_once(':') {
            Some((h, p)) => (h, p.parse().ok()?),
            None => (addr, DEFAULT_PORT),
        };
        if host.is_empty() {
            return None;
        }
        Some(Self {
            host: host.to_owned(),
            port,
            command: command.filter(|c| !c.is_empty()).map(str::to_owned),
        })
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Commands that need the `System`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SysCommand {
    HighPriority(Option<i32>),
    Priority(Priority),
    YieldCpu(Option<bool>),
    InactiveSleep(Option<bool>),
    DisableWinKeys(Option<bool>),
    Copy(String),
    Paste,
    Status,
}

/// Outcome of executing one console line.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    Print(String),
    Sys(SysCommand),
    Quit,
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "on" | "true" => Some(true),
        "0" | "off" | "false" => Some(false),
        _ => None,
    }
}

fn parse_floats<const N: usize>(args: &[&str]) -> Option<[f32; N]> {
    if args.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, a) in out.iter_mut().zip(args) {
        *slot = a.parse().ok()?;
    }
    Some(out)
}

const HELP: &str = "\
commands:
  quit | echo <text> | time | pause | status
  connect <qw://url> | copy <text> | paste
  dir <pattern> | ls [path] | cd <path> | pwd | mkdir <path> | rm <file> | fullpath <path>
  matrix <modelview|projection> [show|raw|load m0..m15|project x y z|identity|push|pop|
                                 rotate a x y z|translate x y z|scale x y z]
  matrix 2d | matrix frustum <l> <r> <b> <t> <n> <f>
  priority <0-3> | sys_highpriority [-1|0|1] | sys_yieldcpu [0|1] | sys_inactivesleep [0|1] | sys_disablewinkeys [0|1]
";

// ── ConsoleHost ───────────────────────────────────────────────────────────────

pub struct ConsoleHost {
    matrices: MatrixStack,
    base: PathBuf,
    width: f32,
    height: f32,
    realtime: f64,
    frames: u64,
    paused: bool,
}

impl ConsoleHost {
    /// `base` is the directory file commands resolve against.
    pub fn new(base: PathBuf, width: f32, height: f32) -> Self {
        let mut host = Self {
            matrices: MatrixStack::new(),
            base,
            width,
            height,
            realtime: 0.0,
            frames: 0,
            paused: false,
        };
        host.setup_2d();
        host
    }

    /// Host for the process command line: `-width`/`-height` size the 2D
    /// projection, file commands start in the current directory.
    pub fn for_system(sys: &System) -> Result<Self> {
        let dim = |parm: &str, default: f32| {
            sys.args()
                .value_of(parm)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };
        Ok(Self::new(
            files::getcwd()?,
            dim("-width", DEFAULT_WIDTH),
            dim("-height", DEFAULT_HEIGHT),
        ))
    }

    pub fn matrices(&self) -> &MatrixStack {
        &self.matrices
    }

    /// Screen-space projection: origin top-left, y down, one unit per pixel.
    fn setup_2d(&mut self) {
        self.matrices.identity_projection();
        self.matrices
            .orthographic_projection(0.0, self.width, self.height, 0.0, -99999.0, 99999.0);
        self.matrices.identity_model_view();
    }

    /// Per-frame 2D pass.  The console's own matrices are saved around it
    /// and come back unchanged.
    fn update_screen(&mut self) -> Result<()> {
        self.matrices.push(MatrixMode::Projection);
        self.matrices.push(MatrixMode::ModelView);
        self.setup_2d();
        // 2D drawing goes here; a console host has nothing to draw.
        self.matrices.pop(MatrixMode::ModelView)?;
        self.matrices.pop(MatrixMode::Projection)?;
        Ok(())
    }

    // ── Execution ─────────────────────────────────────────────────────────────

    /// Execute one console line.  Anything needing OS services comes back as
    /// `Action::Sys` for the caller to apply.
    pub fn execute(&mut self, line: &str) -> Action {
        let line = line.trim();
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        match cmd.to_ascii_lowercase().as_str() {
            "" => Action::None,
            "quit" | "exit" => Action::Quit,
            "help" => Action::Print(HELP.to_owned()),
            "echo" => Action::Print(format!("{rest}\n")),
            "time" => Action::Print(format!(
                "{:.3}s, {} frames\n",
                self.realtime, self.frames
            )),
            "pause" => {
                self.paused = !self.paused;
                Action::Print(if self.paused { "paused\n" } else { "unpaused\n" }.to_owned())
            }
            "status" => Action::Sys(SysCommand::Status),
            "connect" => match args.first() {
                Some(url) => self.connect(url),
                None => Action::Print("usage: connect <qw://host[:port][/command]>\n".to_owned()),
            },
            "copy" => Action::Sys(SysCommand::Copy(rest.to_owned())),
            "paste" => Action::Sys(SysCommand::Paste),

            "dir" => self.dir(args.first().copied().unwrap_or("*")),
            "ls" => self.ls(args.first().copied()),
            "cd" => self.cd(args.first().copied()),
            "pwd" => Action::Print(format!("{}\n", self.base.display())),
            "mkdir" => self.path_op("mkdir", &args, files::mkdir),
            "rm" => self.path_op("rm", &args, files::remove),
            "fullpath" => match args.first() {
                Some(p) => match files::full_path(&self.base.join(p)) {
                    Ok(full) => Action::Print(format!("{}\n", full.display())),
                    Err(e) => Action::Print(format!("fullpath: {e}\n")),
                },
                None => Action::Print("usage: fullpath <path>\n".to_owned()),
            },

            "matrix" => self.matrix(&args),

            "sys_highpriority" => match args.first() {
                None => Action::Sys(SysCommand::HighPriority(None)),
                Some(v) => match v.parse::<i32>() {
                    Ok(n) => Action::Sys(SysCommand::HighPriority(Some(n))),
                    Err(_) => Action::Print(format!("sys_highpriority: bad value \"{v}\"\n")),
                },
            },
            "priority" => match args.first().and_then(|v| v.parse().ok()).and_then(Priority::from_level) {
                Some(p) => Action::Sys(SysCommand::Priority(p)),
                None => Action::Print("usage: priority <0-3> (idle, normal, high, realtime)\n".to_owned()),
            },
            "sys_yieldcpu" => self.toggle(cmd, &args, SysCommand::YieldCpu),
            "sys_inactivesleep" => self.toggle(cmd, &args, SysCommand::InactiveSleep),
            "sys_disablewinkeys" => self.toggle(cmd, &args, SysCommand::DisableWinKeys),

            _ => Action::Print(format!("Unknown command \"{cmd}\"\n")),
        }
    }

    fn toggle(&self, cmd: &str, args: &[&str], make: fn(Option<bool>) -> SysCommand) -> Action {
        match args.first() {
            None => Action::Sys(make(None)),
            Some(v) => match parse_bool(v) {
                Some(b) => Action::Sys(make(Some(b))),
                None => Action::Print(format!("{cmd}: bad value \"{v}\"\n")),
            },
        }
    }

    fn connect(&self, url: &str) -> Action {
        match QwUrl::parse(url) {
            Some(u) => {
                log::info!("connect {}:{}", u.host, u.port);
                let mut out = format!("Connecting to {}:{}...\n", u.host, u.port);
                if let Some(c) = &u.command {
                    let _ = writeln!(out, "then: {c}");
                }
                Action::Print(out)
            }
            None => Action::Print(format!("Invalid qw:// link \"{url}\"\n")),
        }
    }

    // ── File commands ─────────────────────────────────────────────────────────

    fn dir(&self, pattern: &str) -> Action {
        let mut out = String::new();
        let mut count = 0usize;
        let res = files::enumerate_files(&self.base, pattern, |name, size| {
            if name.ends_with('/') {
                let _ = writeln!(out, "{name:<32} <DIR>");
            } else {
                let _ = writeln!(out, "{name:<32} {size:>10}");
            }
            count += 1;
            true
        });
        match res {
            Ok(_) => {
                let _ = writeln!(out, "{count} file(s)");
                Action::Print(out)
            }
            Err(e) => Action::Print(format!("dir: {e}\n")),
        }
    }

    fn ls(&self, path: Option<&str>) -> Action {
        let dir = path.map_or_else(|| self.base.clone(), |p| self.base.join(p));
        let entries = match files::read_dir(&dir) {
            Ok(it) => it,
            Err(e) => return Action::Print(format!("ls: {}: {e}\n", dir.display())),
        };
        let mut entries: Vec<_> = entries.filter(|d| !d.hidden).collect();
        entries.sort_by(|a, b| b.directory.cmp(&a.directory).then_with(|| a.name.cmp(&b.name)));

        let mut out = String::new();
        for d in entries {
            let when = d
                .modified
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".repeat(16));
            if d.directory {
                let _ = writeln!(out, "{when}  {:>10}  {}/", "<DIR>", d.name);
            } else {
                let _ = writeln!(out, "{when}  {:>10}  {}", d.size, d.name);
            }
        }
        Action::Print(out)
    }

    fn cd(&mut self, path: Option<&str>) -> Action {
        let Some(path) = path else {
            return Action::Print(format!("{}\n", self.base.display()));
        };
        let target = self.base.join(path);
        match files::chdir(&target).and_then(|()| files::getcwd()) {
            Ok(cwd) => {
                self.base = cwd;
                Action::None
            }
            Err(e) => Action::Print(format!("cd: {path}: {e}\n")),
        }
    }

    fn path_op(&self, cmd: &str, args: &[&str], op: fn(&Path) -> Result<()>) -> Action {
        let Some(path) = args.first() else {
            return Action::Print(format!("usage: {cmd} <path>\n"));
        };
        match op(&self.base.join(path)) {
            Ok(()) => Action::None,
            Err(e) => Action::Print(format!("{cmd}: {path}: {e}\n")),
        }
    }

    // ── Matrix commands ───────────────────────────────────────────────────────

    fn matrix(&mut self, args: &[&str]) -> Action {
        const USAGE: &str = "usage: matrix <modelview|projection|2d|frustum> ...\n";

        match args {
            ["2d"] => {
                self.setup_2d();
                return Action::None;
            }
            ["frustum", rest @ ..] => {
                return match parse_floats::<6>(rest) {
                    Some([l, r, b, t, n, f]) => {
                        self.matrices.frustum(
                            f64::from(l),
                            f64::from(r),
                            f64::from(b),
                            f64::from(t),
                            f64::from(n),
                            f64::from(f),
                        );
                        Action::None
                    }
                    None => Action::Print("usage: matrix frustum <l> <r> <b> <t> <n> <f>\n".to_owned()),
                };
            }
            _ => {}
        }

        let Some(mode) = args.first().and_then(|m| MatrixMode::parse(m)) else {
            return Action::Print(USAGE.to_owned());
        };
        let op = args.get(1).copied().unwrap_or("show");
        let rest = args.get(2..).unwrap_or(&[]);

        match op {
            "show" => {
                self.matrices.debug_matrix(mode, "matrix");
                Action::Print(format!(
                    "{} (depth {}):\n{}\n",
                    mode.as_str(),
                    self.matrices.depth(mode),
                    self.matrices.get(mode)
                ))
            }
            "raw" => {
                let cols = self.matrices.get(mode).to_cols_array();
                let text: Vec<String> = cols.iter().map(|v| format!("{v}")).collect();
                Action::Print(format!("{}\n", text.join(" ")))
            }
            "load" => match parse_floats::<16>(rest) {
                Some(cols) => {
                    self.matrices.set(mode, Mat4::from_cols_array(&cols));
                    Action::None
                }
                None => Action::Print("usage: matrix <mode> load <16 column-major floats>\n".to_owned()),
            },
            "project" => match parse_floats::<3>(rest) {
                Some([x, y, z]) => {
                    let mvp = *self.matrices.projection() * *self.matrices.model_view();
                    let [cx, cy, cz, cw] = mvp.transform_point(x, y, z);
                    Action::Print(format!("clip ({cx:.4}, {cy:.4}, {cz:.4}, {cw:.4})\n"))
                }
                None => Action::Print("usage: matrix <mode> project <x> <y> <z>\n".to_owned()),
            },
            "identity" => {
                self.matrices.set(mode, Mat4::IDENTITY);
                Action::None
            }
            "push" => {
                self.matrices.push(mode);
                Action::None
            }
            "pop" => match self.matrices.pop(mode) {
                Ok(()) => Action::None,
                Err(e) => Action::Print(format!("matrix pop: {e}\n")),
            },
            "rotate" => match parse_floats::<4>(rest) {
                Some([a, x, y, z]) => {
                    self.matrices.rotate(mode, a, x, y, z);
                    Action::None
                }
                None => Action::Print("usage: matrix <mode> rotate <angle> <x> <y> <z>\n".to_owned()),
            },
            "translate" => match parse_floats::<3>(rest) {
                Some([x, y, z]) => {
                    self.matrices.translate(mode, x, y, z);
                    Action::None
                }
                None => Action::Print("usage: matrix <mode> translate <x> <y> <z>\n".to_owned()),
            },
            "scale" => match parse_floats::<3>(rest) {
                Some([x, y, z]) => {
                    self.matrices.scale(mode, x, y, z);
                    Action::None
                }
                None => Action::Print("usage: matrix <mode> scale <x> <y> <z>\n".to_owned()),
            },
            _ => Action::Print(USAGE.to_owned()),
        }
    }

    // ── System commands ───────────────────────────────────────────────────────

    fn apply(&mut self, sys: &mut System, cmd: SysCommand) {
        match cmd {
            SysCommand::HighPriority(None) => {
                let v = sys.settings().high_priority;
                sys.printf(&format!("sys_highpriority is \"{v}\"\n"));
            }
            SysCommand::HighPriority(Some(v)) => {
                if sys.set_high_priority(v).is_ok() {
                    self.persist(sys);
                }
            }
            SysCommand::Priority(p) => match sys.set_priority(p) {
                Ok(()) => sys.printf(&format!("Process priority set to {}\n", p.as_str())),
                Err(e) => sys.printf(&format!("priority: {e}\n")),
            },
            SysCommand::YieldCpu(None) => {
                let v = u8::from(sys.settings().yield_cpu);
                sys.printf(&format!("sys_yieldcpu is \"{v}\"\n"));
            }
            SysCommand::YieldCpu(Some(on)) => {
                sys.set_yield_cpu(on);
                self.persist(sys);
            }
            SysCommand::InactiveSleep(None) => {
                let v = u8::from(sys.settings().inactive_sleep);
                sys.printf(&format!("sys_inactivesleep is \"{v}\"\n"));
            }
            SysCommand::InactiveSleep(Some(on)) => {
                sys.set_inactive_sleep(on);
                self.persist(sys);
            }
            SysCommand::DisableWinKeys(None) => {
                let v = u8::from(sys.settings().disable_win_keys);
                sys.printf(&format!("sys_disablewinkeys is \"{v}\"\n"));
            }
            SysCommand::DisableWinKeys(Some(on)) => {
                if sys.set_disable_win_keys(on).is_ok() {
                    self.persist(sys);
                }
            }
            SysCommand::Copy(text) => {
                if let Err(e) = sys.clipboard().set_text(&text) {
                    sys.printf(&format!("copy: {e}\n"));
                }
            }
            SysCommand::Paste => {
                let text = sys.clipboard().get_text().unwrap_or_default();
                sys.printf(&format!("{text}\n"));
            }
            SysCommand::Status => {
                let mode = if sys.is_dedicated() { "dedicated" } else { "client" };
                let msg = format!(
                    "{mode}, hunk {} KiB, up {:.1}s, {} frames{}\n",
                    sys.heap_size() / 1024,
                    self.realtime,
                    self.frames,
                    if self.paused { ", paused" } else { "" }
                );
                sys.printf(&msg);
            }
        }
    }

    fn persist(&self, sys: &mut System) {
        if let Err(e) = sys.save_settings() {
            log::warn!("could not save settings: {e}");
        }
    }

    fn run_line(&mut self, sys: &mut System, line: &str) -> Flow {
        match self.execute(line) {
            Action::None => {}
            Action::Print(text) => sys.printf(&text),
            Action::Sys(cmd) => self.apply(sys, cmd),
            Action::Quit => return Flow::Quit,
        }
        Flow::Continue
    }
}

impl Host for ConsoleHost {
    fn frame(&mut self, sys: &mut System, frame_time: f64, skip_update: bool) -> Result<Flow> {
        self.realtime += frame_time;
        self.frames += 1;

        while let Some(msg) = sys.read_ipc()? {
            let line = match msg {
                IpcMessage::Connect(url) => format!("connect {url}"),
                IpcMessage::Command(cmd) => cmd,
            };
            if self.run_line(sys, &line) == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }

        while let Some(line) = sys.console_input()? {
            if self.run_line(sys, &line) == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }

        for (key, down) in sys.hooked_keys() {
            log::debug!("hooked key {key:?} {}", if down { "down" } else { "up" });
        }

        if !skip_update {
            self.update_screen()?;
        }
        Ok(Flow::Continue)
    }

    fn app_state(&self) -> AppState {
        // No window of its own, so it idles like an unfocused client.
        AppState {
            active: false,
            minimized: false,
            paused: self.paused,
            block_drawing: false,
        }
    }

    fn shutdown(&mut self, _sys: &mut System) {
        log::info!("host shutdown after {} frames", self.frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn host() -> ConsoleHost {
        ConsoleHost::new(PathBuf::from("."), 640.0, 480.0)
    }

    fn printed(action: Action) -> String {
        match action {
            Action::Print(s) => s,
            other => panic!("expected Print, got {other:?}"),
        }
    }

    #[test]
    fn qw_urls_parse() {
        assert_eq!(
            QwUrl::parse("qw://qw.example.net:28000/observe"),
            Some(QwUrl {
                host: "qw.example.net".to_owned(),
                port: 28000,
                command: Some("observe".to_owned()),
            })
        );
        assert_eq!(
            QwUrl::parse("QW://10.0.0.1/"),
            Some(QwUrl {
                host: "10.0.0.1".to_owned(),
                port: DEFAULT_PORT,
                command: None,
            })
        );
        assert_eq!(QwUrl::parse("http://x"), None);
        assert_eq!(QwUrl::parse("qw://:27500"), None);
        assert_eq!(QwUrl::parse("qw://host:notaport"), None);
    }

    #[test]
    fn basic_commands() {
        let mut h = host();
        assert_eq!(h.execute("  "), Action::None);
        assert_eq!(h.execute("QUIT"), Action::Quit);
        assert_eq!(printed(h.execute("echo hello   world")), "hello   world\n");
        assert_eq!(printed(h.execute("frobnicate 1")), "Unknown command \"frobnicate\"\n");
        assert_eq!(printed(h.execute("pause")), "paused\n");
        assert!(h.app_state().paused);
    }

    #[test]
    fn sys_commands_are_deferred() {
        let mut h = host();
        assert_eq!(
            h.execute("sys_highpriority -1"),
            Action::Sys(SysCommand::HighPriority(Some(-1)))
        );
        assert_eq!(
            h.execute("sys_highpriority"),
            Action::Sys(SysCommand::HighPriority(None))
        );
        assert_eq!(
            h.execute("sys_inactiveSleep 0"),
            Action::Sys(SysCommand::InactiveSleep(Some(false)))
        );
        assert_eq!(
            h.execute("sys_disableWinKeys on"),
            Action::Sys(SysCommand::DisableWinKeys(Some(true)))
        );
        assert!(matches!(h.execute("sys_yieldcpu maybe"), Action::Print(_)));
        assert_eq!(
            h.execute("priority 2"),
            Action::Sys(SysCommand::Priority(Priority::High))
        );
        assert!(matches!(h.execute("priority 9"), Action::Print(_)));
        assert_eq!(
            h.execute("copy connect 1.2.3.4"),
            Action::Sys(SysCommand::Copy("connect 1.2.3.4".to_owned()))
        );
    }

    #[test]
    fn starts_with_screen_projection() {
        let h = host();
        let top_left = h.matrices().projection().transform_point(0.0, 0.0, 0.0);
        assert_relative_eq!(top_left[0], -1.0, epsilon = 1e-5);
        assert_relative_eq!(top_left[1], 1.0, epsilon = 1e-5);
        let bottom_right = h.matrices().projection().transform_point(640.0, 480.0, 0.0);
        assert_relative_eq!(bottom_right[0], 1.0, epsilon = 1e-5);
        assert_relative_eq!(bottom_right[1], -1.0, epsilon = 1e-5);
    }

    #[test]
    fn matrix_commands_drive_the_stack() {
        let mut h = host();
        assert_eq!(h.execute("matrix mv push"), Action::None);
        assert_eq!(h.execute("matrix mv translate 1 2 3"), Action::None);
        assert_eq!(h.matrices().model_view().get(0, 3), 1.0);
        assert_eq!(h.matrices().depth(MatrixMode::ModelView), 1);

        let shown = printed(h.execute("matrix modelview"));
        assert!(shown.starts_with("modelview (depth 1):"));

        assert_eq!(h.execute("matrix mv pop"), Action::None);
        assert_eq!(*h.matrices().model_view(), Mat4::IDENTITY);
        assert!(printed(h.execute("matrix mv pop")).starts_with("matrix pop:"));

        assert!(matches!(h.execute("matrix mv rotate 90 0 0"), Action::Print(_)));
        assert!(matches!(h.execute("matrix sideways"), Action::Print(_)));
    }

    #[test]
    fn screen_pass_leaves_console_matrices_alone() {
        let mut h = host();
        h.execute("matrix mv translate 1 2 3");
        h.execute("matrix projection identity");
        let (mv, proj) = (*h.matrices().model_view(), *h.matrices().projection());

        h.update_screen().expect("screen pass");
        h.update_screen().expect("screen pass");

        assert_eq!(*h.matrices().model_view(), mv);
        assert_eq!(*h.matrices().projection(), proj);
        assert_eq!(h.matrices().model_view().get(0, 3), 1.0);
        assert_eq!(h.matrices().depth(MatrixMode::ModelView), 0);
        assert_eq!(h.matrices().depth(MatrixMode::Projection), 0);
    }

    #[test]
    fn raw_load_and_project() {
        let mut h = host();
        let cols = "1 0 0 0 0 1 0 0 0 0 1 0 5 6 7 1";
        assert_eq!(h.execute(&format!("matrix mv load {cols}")), Action::None);
        assert_eq!(printed(h.execute("matrix mv raw")), format!("{cols}\n"));

        h.execute("matrix projection identity");
        assert_eq!(
            printed(h.execute("matrix mv project 1 1 1")),
            "clip (6.0000, 7.0000, 8.0000, 1.0000)\n"
        );
        assert!(matches!(h.execute("matrix mv load 1 2 3"), Action::Print(_)));
    }

    #[test]
    fn matrix_frustum_and_reset() {
        let mut h = host();
        h.execute("matrix projection identity");
        assert_eq!(h.execute("matrix frustum -1 1 -1 1 1 100"), Action::None);
        assert_relative_eq!(h.matrices().projection().get(3, 2), -1.0);
        h.execute("matrix 2d");
        assert_relative_eq!(h.matrices().projection().get(3, 2), 0.0);
    }

    #[test]
    fn dir_lists_matches_under_base() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(tmp.path().join("maps")).expect("mkdir");
        std::fs::write(tmp.path().join("maps/dm4.bsp"), [0u8; 10]).expect("write");
        std::fs::write(tmp.path().join("maps/dm6.bsp"), [0u8; 20]).expect("write");

        let mut h = ConsoleHost::new(tmp.path().to_path_buf(), 640.0, 480.0);
        let out = printed(h.execute("dir maps/*.BSP"));
        assert!(out.contains("maps/dm4.bsp"));
        assert!(out.contains("maps/dm6.bsp"));
        assert!(out.ends_with("2 file(s)\n"));

        assert_eq!(h.execute("mkdir demos/old"), Action::None);
        assert!(tmp.path().join("demos/old").is_dir());
        assert_eq!(h.execute("rm maps/dm4.bsp"), Action::None);
        assert!(printed(h.execute("rm maps/dm4.bsp")).starts_with("rm: maps/dm4.bsp:"));

        let listing = printed(h.execute("ls"));
        assert!(listing.contains("demos/"));
        assert!(listing.contains("maps/"));
    }
}
